//! `casfetch`: resolve chemical registry numbers against PubChem.
//!
//! ## Commands
//!
//! - `run`: resolve every record of an ingredient list and write a report
//! - `lookup`: resolve a single registry number
//! - `record`: print the complete document of the first candidate
//! - `full-data`: fetch the complete document of every record of a list

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use casfetch_api::PubChemClient;
use casfetch_engine::{
    FullRecordEntry, FullRecordFetcher, ResolutionPipeline, RunReport, basic_info, validate_ingredients,
};
use casfetch_types::{FetchConfig, Ingredient, RawIngredient, RegistryNumber, RunSummary};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(name = "casfetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve chemical registry numbers to PubChem identifiers", long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every record of an ingredient list
    Run {
        /// JSON array of records with `inci`/`name` and `cas`/`registry_number`
        #[arg(short, long)]
        input: PathBuf,

        /// Report destination (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve one registry number
    Lookup {
        registry_number: String,

        /// Name recorded with the input
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Print the complete record of the first candidate
    Record { registry_number: String },

    /// Fetch the complete record of every record of an ingredient list
    FullData {
        /// JSON array of records with `inci`/`name` and `cas`/`registry_number`
        #[arg(short, long)]
        input: PathBuf,

        /// Output destination (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Report written by `run`.
#[derive(Serialize)]
struct ReportFile {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: RunReport,
}

/// Output of `full-data`.
#[derive(Serialize)]
struct FullDataFile {
    generated_at: DateTime<Utc>,
    total: usize,
    retrieved: usize,
    entries: Vec<FullRecordEntry>,
}

impl FullDataFile {
    fn new(entries: Vec<FullRecordEntry>) -> Self {
        Self {
            generated_at: Utc::now(),
            total: entries.len(),
            retrieved: entries.iter().filter(|entry| entry.has_record()).count(),
            entries,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = FetchConfig::load(cli.config.as_deref()).context("load configuration")?;
    let client = PubChemClient::from_config(&config)?;

    match cli.command {
        Commands::Run { input, output } => run(client, &config, &input, output.as_deref()).await,
        Commands::Lookup { registry_number, name } => lookup(client, &config, &registry_number, name).await,
        Commands::Record { registry_number } => record(client, &config, &registry_number).await,
        Commands::FullData { input, output } => full_data(client, &config, &input, output.as_deref()).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(client: PubChemClient, config: &FetchConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let ingredients = load_ingredients(input).await?;
    if ingredients.is_empty() {
        bail!("no records with a valid registry number in {}", input.display());
    }

    let pipeline = ResolutionPipeline::new(client, config);
    let report = pipeline.run(ingredients).await;
    log_summary(&report.summary);

    let file = ReportFile {
        generated_at: Utc::now(),
        report,
    };
    write_output(&file, output).await
}

async fn full_data(client: PubChemClient, config: &FetchConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let ingredients = load_ingredients(input).await?;
    if ingredients.is_empty() {
        bail!("no records with a valid registry number in {}", input.display());
    }

    let pipeline = ResolutionPipeline::new(client, config);
    let file = FullDataFile::new(pipeline.fetch_full_records(ingredients).await);
    let rate = if file.total == 0 { 0.0 } else { file.retrieved as f64 * 100.0 / file.total as f64 };
    info!(
        total = file.total,
        retrieved = file.retrieved,
        failed = file.total - file.retrieved,
        success_rate = %format!("{rate:.1}%"),
        "full records"
    );
    write_output(&file, output).await
}

async fn write_output(value: &impl Serialize, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("write output to {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn load_ingredients(path: &Path) -> Result<Vec<Ingredient>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let raw: Vec<RawIngredient> = serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(validate_ingredients(raw))
}

fn log_summary(summary: &RunSummary) {
    info!(
        total = summary.total,
        primary = summary.primary,
        secondary = summary.secondary,
        unresolved = summary.unresolved,
        with_structure = summary.with_structure,
        success_rate = %format!("{:.1}%", summary.success_rate()),
        "summary"
    );
}

async fn lookup(client: PubChemClient, config: &FetchConfig, registry_number: &str, name: String) -> Result<()> {
    let registry_number = RegistryNumber::parse(registry_number)?;
    let pipeline = ResolutionPipeline::new(client, config);
    let outcome = pipeline.resolve_one(Ingredient::new(name, registry_number)).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn record(client: PubChemClient, config: &FetchConfig, registry_number: &str) -> Result<()> {
    let registry_number = RegistryNumber::parse(registry_number)?;
    let pipeline = ResolutionPipeline::new(client.clone(), config);
    let candidates = pipeline.resolver().resolve_number(&registry_number).await?;
    let fetcher = FullRecordFetcher::new(client);

    let (identifier, document) = match (candidates.primary.first(), candidates.secondary.first()) {
        (Some(cid), _) => (json!({"cid": cid}), fetcher.compound(*cid).await),
        (None, Some(sid)) => (json!({"sid": sid}), fetcher.substance(*sid).await),
        (None, None) => bail!("no PubChem identifier found for {registry_number}"),
    };
    let Some(document) = document else {
        bail!("full record unavailable for {registry_number}");
    };

    let rendered = json!({
        "registry_number": registry_number,
        "identifier": identifier,
        "basic_info": basic_info(&document),
        "record": document,
    });
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use casfetch_engine::RecordIdentifier;
    use casfetch_types::{Cid, UnresolvedReason};

    use super::*;

    #[tokio::test]
    async fn load_ingredients_keeps_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingredients.json");
        std::fs::write(
            &path,
            r#"[
                {"inci": "FORMALDEHYDE", "cas": "50-00-0", "function": "PRESERVATIVE"},
                {"inci": "PARFUM", "cas": "-"},
                {"name": "WATER", "registry_number": "7732-18-5"}
            ]"#,
        )
        .unwrap();

        let ingredients = load_ingredients(&path).await.unwrap();
        let numbers: Vec<_> = ingredients.iter().map(|ingredient| ingredient.registry_number.as_str()).collect();
        assert_eq!(numbers, ["50-00-0", "7732-18-5"]);
    }

    #[test]
    fn report_file_flattens_report() {
        let file = ReportFile {
            generated_at: Utc::now(),
            report: RunReport {
                outcomes: Vec::new(),
                summary: RunSummary::default(),
            },
        };
        let value = serde_json::to_value(&file).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["summary"]["total"], 0);
        assert!(value["outcomes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn full_data_file_counts_retrieved_records() {
        let input = Ingredient::new("FORMALDEHYDE", RegistryNumber::parse("50-00-0").unwrap());
        let entries = vec![
            FullRecordEntry {
                input: input.clone(),
                identifier: Some(RecordIdentifier::Cid(Cid(712))),
                unresolved: None,
                basic_info: None,
                record: Some(json!({"PC_Compounds": [{}]})),
            },
            FullRecordEntry {
                input,
                identifier: None,
                unresolved: Some(UnresolvedReason::NotFound),
                basic_info: None,
                record: None,
            },
        ];
        let value = serde_json::to_value(FullDataFile::new(entries)).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["retrieved"], 1);
        assert_eq!(value["entries"][0]["identifier"], json!({"cid": 712}));
        assert_eq!(value["entries"][1]["record"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn write_output_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.json");
        write_output(&json!({"total": 0}), Some(&path)).await.unwrap();
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["total"], 0);
    }

    #[test]
    fn parses_full_data() {
        let cli = Cli::try_parse_from(["casfetch", "full-data", "--input", "in.json", "-o", "out.json"]).unwrap();
        match cli.command {
            Commands::FullData { input, output } => {
                assert_eq!(input, PathBuf::from("in.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected full-data"),
        }
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["casfetch", "--verbose", "lookup", "50-00-0", "--name", "FORMALDEHYDE"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Lookup { ref registry_number, .. } if registry_number == "50-00-0"));
    }
}
