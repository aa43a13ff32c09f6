//! Properties of depositor substances, the fallback namespace.

use casfetch_api::{PubChemClient, SubstanceRecord};
use casfetch_types::{PropertyRecord, Sid};
use tracing::{debug, info, warn};

/// Reads whatever descriptive fields a substance record exposes.
#[derive(Clone)]
pub struct SubstancePropertyFetcher {
    client: PubChemClient,
}

impl SubstancePropertyFetcher {
    pub fn new(client: PubChemClient) -> Self {
        Self { client }
    }

    /// Never fails: any error yields an empty record.
    pub async fn fetch_one(&self, sid: Sid) -> PropertyRecord {
        let substance = match self.client.fetch_substance(sid).await {
            Ok(Some(substance)) => substance,
            Ok(None) => {
                debug!(%sid, "substance response carried no record");
                return PropertyRecord::default();
            }
            Err(error) => {
                warn!(%sid, %error, "substance fetch failed");
                return PropertyRecord::default();
            }
        };

        let mut record = substance_properties(&substance);
        match self.client.fetch_substance_cids(sid).await {
            Ok(cids) => record.related_cids = cids,
            Err(error) => debug!(%sid, %error, "no related compounds"),
        }

        if record.has_structure() {
            info!(%sid, "substance carries a structure");
        }
        record
    }
}

/// Title, structure strings and InChI from a substance record.
///
/// Only the first structure entry is read. Labels are compared upper-cased
/// and a later property overwrites an earlier one of the same kind.
pub fn substance_properties(substance: &SubstanceRecord) -> PropertyRecord {
    let mut record = PropertyRecord {
        title: substance
            .source_name()
            .map(str::to_owned)
            .or_else(|| substance.synonyms.first().cloned()),
        ..PropertyRecord::default()
    };

    let Some(structure) = substance.compound.first() else {
        return record;
    };
    for prop in &structure.props {
        let (Some(label), Some(value)) = (prop.label(), prop.string_value()) else {
            continue;
        };
        let label = label.to_uppercase();
        if label.contains("SMILES") {
            if label.contains("CANONICAL") || !label.contains("ISOMERIC") {
                record.canonical_smiles = Some(value.to_owned());
            }
            if label.contains("ISOMERIC") {
                record.isomeric_smiles = Some(value.to_owned());
            }
        } else if label.contains("INCHI") {
            record.inchi = Some(value.to_owned());
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use casfetch_api::testing::{RecordingSleeper, ScriptedTransport};
    use casfetch_types::{Cid, FetchConfig};
    use serde_json::{Value, json};

    use super::*;

    fn prop(label: &str, value: &str) -> Value {
        json!({"urn": {"label": label}, "value": {"sval": value}})
    }

    fn parse(value: Value) -> SubstanceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn fetcher(transport: ScriptedTransport) -> (SubstancePropertyFetcher, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let client = PubChemClient::new(transport.clone(), Arc::new(RecordingSleeper::new()), &FetchConfig::default());
        (SubstancePropertyFetcher::new(client), transport)
    }

    #[test]
    fn title_prefers_source_name_over_synonym() {
        let record = substance_properties(&parse(json!({"source": {"db": {"name": "ChemIDplus"}}, "synonyms": ["GLYCERETH-26"]})));
        assert_eq!(record.title.as_deref(), Some("ChemIDplus"));

        let record = substance_properties(&parse(json!({"synonyms": ["GLYCERETH-26", "other"]})));
        assert_eq!(record.title.as_deref(), Some("GLYCERETH-26"));
    }

    #[test]
    fn structure_labels_are_sorted_by_kind() {
        let record = substance_properties(&parse(json!({
            "compound": [{"props": [
                prop("SMILES", "CCO"),
                prop("Isomeric SMILES", "C[C@H](O)N"),
                prop("InChI", "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3"),
                prop("Molecular Formula", "C2H6O"),
            ]}]
        })));
        assert_eq!(record.canonical_smiles.as_deref(), Some("CCO"));
        assert_eq!(record.isomeric_smiles.as_deref(), Some("C[C@H](O)N"));
        assert_eq!(record.inchi.as_deref(), Some("InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3"));
    }

    #[test]
    fn canonical_isomeric_label_fills_both() {
        let record = substance_properties(&parse(json!({"compound": [{"props": [prop("canonical isomeric smiles", "N")]}]})));
        assert_eq!(record.canonical_smiles.as_deref(), Some("N"));
        assert_eq!(record.isomeric_smiles.as_deref(), Some("N"));
    }

    #[tokio::test]
    async fn fetch_one_adds_related_compounds() {
        let (fetcher, _) = fetcher(
            ScriptedTransport::new()
                .json("substance/sid/42/JSON", json!({"PC_Substances": [{"synonyms": ["POLYSORBATE 20"]}]}))
                .json("substance/sid/42/cids/JSON", json!({"IdentifierList": {"CID": [443314]}})),
        );
        let record = fetcher.fetch_one(Sid(42)).await;
        assert_eq!(record.title.as_deref(), Some("POLYSORBATE 20"));
        assert_eq!(record.related_cids, vec![Cid(443314)]);
        assert!(!record.has_structure());
    }

    #[tokio::test]
    async fn related_lookup_failure_is_silent() {
        let (fetcher, transport) =
            fetcher(ScriptedTransport::new().json("substance/sid/42/JSON", json!({"PC_Substances": [{"synonyms": ["X"]}]})));
        let record = fetcher.fetch_one(Sid(42)).await;
        assert_eq!(record.title.as_deref(), Some("X"));
        assert!(record.related_cids.is_empty());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn failures_yield_empty_record() {
        let (fetcher, transport) = fetcher(ScriptedTransport::new().json("substance/sid/7/JSON", json!({"PC_Substances": []})));
        assert!(fetcher.fetch_one(Sid(7)).await.is_empty());
        assert!(fetcher.fetch_one(Sid(8)).await.is_empty());
        assert_eq!(transport.request_count(), 2);
    }
}
