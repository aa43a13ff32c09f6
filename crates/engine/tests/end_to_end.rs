use std::sync::Arc;

use casfetch_api::PubChemClient;
use casfetch_api::testing::{RecordingSleeper, ScriptedTransport};
use casfetch_engine::{ResolutionPipeline, validate_ingredients};
use casfetch_types::{AssociationTag, Cid, FetchConfig, Ingredient, RawIngredient, RegistryNumber, ResolutionOutcome, UnresolvedReason};
use serde_json::json;

fn formaldehyde_remote() -> ScriptedTransport {
    ScriptedTransport::new()
        .json("compound/xref/RN/50-00-0/cids/JSON", json!({"IdentifierList": {"CID": [712]}}))
        .json(
            "compound/cid/712/property/Title,CanonicalSMILES,IsomericSMILES/JSON",
            json!({"PropertyTable": {"Properties": [
                {"CID": 712, "Title": "Formaldehyde", "ConnectivitySMILES": "C=O", "SMILES": "C=O"}
            ]}}),
        )
        .json(
            "compound/cid/712/xrefs/RN/JSON",
            json!({"InformationList": {"Information": [{"CID": 712, "RN": ["50-00-0"]}]}}),
        )
        .json(
            "compound/cid/712/synonyms/JSON",
            json!({"InformationList": {"Information": [{"CID": 712, "Synonym": ["formaldehyde", "methanal", "8005-38-7", "50-00-0"]}]}}),
        )
}

fn pipeline(transport: ScriptedTransport) -> (ResolutionPipeline, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let config = FetchConfig::default();
    let client = PubChemClient::new(transport.clone(), Arc::new(RecordingSleeper::new()), &config);
    (ResolutionPipeline::new(client, &config), transport)
}

fn ingredient(name: &str, rn: &str) -> Ingredient {
    Ingredient::new(name, RegistryNumber::parse(rn).expect("valid registry number"))
}

#[tokio::test]
async fn formaldehyde_resolves_to_compound_712() {
    let (pipeline, transport) = pipeline(formaldehyde_remote());

    let outcome = pipeline.resolve_one(ingredient("FORMALDEHYDE", "50-00-0")).await;

    let (cid, properties, registry_number, associations) = match outcome {
        ResolutionOutcome::Primary {
            cid,
            properties,
            registry_number,
            associations,
        } => (cid, properties, registry_number, associations),
        other => panic!("expected a compound, got {other:?}"),
    };
    assert_eq!(cid, Cid(712));
    assert_eq!(properties.title.as_deref(), Some("Formaldehyde"));
    assert_eq!(properties.canonical_smiles.as_deref(), Some("C=O"));
    assert_eq!(registry_number.as_str(), "50-00-0");
    let tags: Vec<_> = associations.iter().map(|pair| (pair.registry_number.as_str(), pair.tag)).collect();
    assert_eq!(
        tags,
        vec![
            ("50-00-0", AssociationTag::Preferred),
            ("8005-38-7", AssociationTag::Synonym),
            ("50-00-0", AssociationTag::Synonym),
        ]
    );
    assert_eq!(transport.count_where(|path| path.contains("/name/")), 0, "strategy 1 should short-circuit");
}

#[tokio::test]
async fn repeated_resolution_is_identical() {
    let (pipeline, _) = pipeline(formaldehyde_remote());
    let first = pipeline.resolve_one(ingredient("FORMALDEHYDE", "50-00-0")).await;
    let second = pipeline.resolve_one(ingredient("FORMALDEHYDE", "50-00-0")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn exhausted_input_does_not_stop_the_run() {
    let transport = formaldehyde_remote().status("compound/xref/RN/64-17-5/cids/JSON", 429);
    let (pipeline, _) = pipeline(transport);
    let inputs = validate_ingredients(vec![
        RawIngredient {
            name: "ETHANOL".into(),
            registry_number: Some("64-17-5".into()),
            function: None,
        },
        RawIngredient {
            name: "NOTHING".into(),
            registry_number: Some("n/a".into()),
            function: None,
        },
        RawIngredient {
            name: "FORMALDEHYDE".into(),
            registry_number: Some("50-00-0".into()),
            function: Some("PRESERVATIVE".into()),
        },
    ]);

    let report = pipeline.run(inputs).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(
        &report.outcomes[0].outcome,
        ResolutionOutcome::Unresolved(UnresolvedReason::FetchFailed { message }) if message.contains("rate limit")
    ));
    assert!(matches!(report.outcomes[1].outcome, ResolutionOutcome::Primary { cid: Cid(712), .. }));
    assert_eq!(report.outcomes[1].input.function.as_deref(), Some("PRESERVATIVE"));
    assert_eq!((report.summary.total, report.summary.primary, report.summary.unresolved), (2, 1, 1));
    assert_eq!(report.summary.with_structure, 1);

    let value = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(value["outcomes"][1]["outcome"]["source"], "primary");
    assert_eq!(value["outcomes"][1]["outcome"]["registry_number"], "50-00-0");
}
