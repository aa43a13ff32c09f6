//! Runtime configuration shared by every pipeline component.
//!
//! The configuration is an explicit value handed to each component when it
//! is constructed. It is read from an optional YAML or JSON file
//! (`~/.config/casfetch/config.yaml` on most platforms) and then patched by
//! environment overrides. A missing file yields the defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CASFETCH_CONFIG";

/// Environment variable overriding the PubChem REST base URL.
pub const API_BASE_ENV: &str = "CASFETCH_API_BASE";

/// Default config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const DEFAULT_API_BASE: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Hosts (and their subdomains) accepted for non-local base URLs.
const ALLOWED_API_DOMAINS: &[&str] = &["ncbi.nlm.nih.gov"];

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Error surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error for {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    BaseUrl(#[from] BaseUrlError),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Error returned by [`validate_base_url`].
#[derive(Debug, Error)]
pub enum BaseUrlError {
    #[error("invalid API base URL '{url}': {source}")]
    Unparsable {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL must include a host")]
    MissingHost,
    #[error("API base URL must use https for non-localhost hosts; got '{0}://'")]
    InsecureScheme(String),
    #[error("API base URL host '{0}' is not allowed; must be {ALLOWED_API_DOMAINS:?}, a subdomain, or localhost")]
    HostNotAllowed(String),
}

/// Tunables for the resolution pipeline.
///
/// Durations are expressed in (fractional) seconds in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// PubChem PUG-REST root, without trailing slash.
    pub api_base: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Per-attempt request timeout.
    pub timeout_secs: f64,
    /// Total attempts per request, including the first.
    pub max_retry: u32,
    /// Candidates kept per resolution.
    pub candidate_limit: usize,
    /// Compound ids per batched property request.
    pub chunk_size: usize,
    /// Synonym registry numbers kept per compound.
    pub max_synonym: usize,
    /// Pause after each property chunk and each substance record.
    pub property_pause_secs: f64,
    /// Pause after each association lookup in a worker.
    pub association_pause_secs: f64,
    /// Pause between lookup strategies and between inputs.
    pub lookup_pause_secs: f64,
    /// Concurrent association workers.
    pub workers: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: format!("casfetch/{} (PubChem registry resolver)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 12.0,
            max_retry: 4,
            candidate_limit: 5,
            chunk_size: 25,
            max_synonym: 4,
            property_pause_secs: 2.0,
            association_pause_secs: 3.0,
            lookup_pause_secs: 2.0,
            workers: 2,
        }
    }
}

impl FetchConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`, then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let mut config = match fs::read_to_string(&resolved) {
            Ok(data) => Self::from_str_any(&data).map_err(|source| ConfigError::Parse {
                path: resolved.clone(),
                source,
            })?,
            // An explicit path must exist; the default one is optional.
            Err(error) if error.kind() == std::io::ErrorKind::NotFound && path.is_none() => {
                debug!(path = %resolved.display(), "no config file; using defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Io { path: resolved, source }),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML or JSON (JSON is a subset of YAML).
    pub fn from_str_any(data: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(data)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = env::var(API_BASE_ENV) {
            let trimmed = base.trim();
            if !trimmed.is_empty() {
                self.api_base = trimmed.trim_end_matches('/').to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.api_base)?;
        if self.max_retry == 0 {
            return Err(ConfigError::Invalid("max_retry must be at least 1".into()));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        for (name, secs) in [
            ("timeout_secs", self.timeout_secs),
            ("property_pause_secs", self.property_pause_secs),
            ("association_pause_secs", self.association_pause_secs),
            ("lookup_pause_secs", self.lookup_pause_secs),
        ] {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::Invalid(format!("{name} must be a non-negative number of seconds")));
            }
        }
        if self.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    pub fn property_pause(&self) -> Duration {
        Duration::from_secs_f64(self.property_pause_secs)
    }

    pub fn association_pause(&self) -> Duration {
        Duration::from_secs_f64(self.association_pause_secs)
    }

    pub fn lookup_pause(&self) -> Duration {
        Duration::from_secs_f64(self.lookup_pause_secs)
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("casfetch")
        .join(CONFIG_FILE_NAME)
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be an allowed NCBI
///   domain or a subdomain of one
pub fn validate_base_url(base: &str) -> Result<(), BaseUrlError> {
    let parsed = Url::parse(base).map_err(|source| BaseUrlError::Unparsable {
        url: base.to_string(),
        source,
    })?;

    let host_name = parsed.host_str().ok_or(BaseUrlError::MissingHost)?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host_name.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(BaseUrlError::InsecureScheme(parsed.scheme().to_string()));
    }

    let is_allowed_domain = ALLOWED_API_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(BaseUrlError::HostNotAllowed(host_name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_constants() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(12));
        assert_eq!(config.max_retry, 4);
        assert_eq!(config.candidate_limit, 5);
        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.max_synonym, 4);
        assert_eq!(config.workers, 2);
        assert_eq!(config.property_pause(), Duration::from_secs(2));
        assert_eq!(config.association_pause(), Duration::from_secs(3));
        assert_eq!(config.lookup_pause(), Duration::from_secs(2));
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_unusable_durations() {
        for yaml in [
            "timeout_secs: 0",
            "timeout_secs: -1",
            "lookup_pause_secs: 1.0e20",
            "property_pause_secs: -0.5",
            "association_pause_secs: .nan",
        ] {
            let config = FetchConfig::from_str_any(yaml).unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{yaml}");
        }
        let config = FetchConfig::from_str_any("lookup_pause_secs: 0\ntimeout_secs: 0.2").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = FetchConfig::from_str_any("chunk_size: 10\nlookup_pause_secs: 0.5\n").unwrap();
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.lookup_pause(), Duration::from_millis(500));
        assert_eq!(config.max_retry, 4);
    }

    #[test]
    fn json_is_accepted() {
        let config = FetchConfig::from_str_any(r#"{"workers": 4, "max_synonym": 2}"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_synonym, 2);
    }

    #[test]
    fn load_reads_explicit_file_and_env_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("casfetch.yaml");
        fs::write(&path, "max_retry: 2\n").unwrap();

        temp_env::with_var(API_BASE_ENV, Some("http://localhost:8080/rest/pug/"), || {
            let config = FetchConfig::load(Some(&path)).unwrap();
            assert_eq!(config.max_retry, 2);
            assert_eq!(config.api_base, "http://localhost:8080/rest/pug");
        });
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let error = FetchConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn default_path_honors_env_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/casfetch-test.yaml"), || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/casfetch-test.yaml"));
        });
    }

    #[test]
    fn validate_rejects_zero_chunk_and_negative_pause() {
        let config = FetchConfig {
            chunk_size: 0,
            ..FetchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = FetchConfig {
            property_pause_secs: -1.0,
            ..FetchConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn base_url_rules() {
        assert!(validate_base_url(DEFAULT_API_BASE).is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
        assert!(matches!(
            validate_base_url("http://pubchem.ncbi.nlm.nih.gov/rest/pug"),
            Err(BaseUrlError::InsecureScheme(_))
        ));
        assert!(matches!(
            validate_base_url("https://example.com/rest/pug"),
            Err(BaseUrlError::HostNotAllowed(_))
        ));
        assert!(matches!(validate_base_url("not a url"), Err(BaseUrlError::Unparsable { .. })));
    }
}
