//! Complete compound and substance documents.

use casfetch_api::PubChemClient;
use casfetch_types::{Cid, Ingredient, Sid, UnresolvedReason};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Downloads full records as untyped JSON.
#[derive(Clone)]
pub struct FullRecordFetcher {
    client: PubChemClient,
}

impl FullRecordFetcher {
    pub fn new(client: PubChemClient) -> Self {
        Self { client }
    }

    /// The compound document, or `None` on failure or an unexpected shape.
    pub async fn compound(&self, cid: Cid) -> Option<Value> {
        match self.client.fetch_compound_document(cid).await {
            Ok(document) if has_entries(&document, "PC_Compounds") => {
                debug!(%cid, "compound record fetched");
                Some(document)
            }
            Ok(_) => {
                warn!(%cid, "compound record has no PC_Compounds entry");
                None
            }
            Err(error) => {
                warn!(%cid, %error, "compound record fetch failed");
                None
            }
        }
    }

    /// The substance document, or `None` on failure or an unexpected shape.
    pub async fn substance(&self, sid: Sid) -> Option<Value> {
        match self.client.fetch_substance_document(sid).await {
            Ok(document) if has_entries(&document, "PC_Substances") => {
                debug!(%sid, "substance record fetched");
                Some(document)
            }
            Ok(_) => {
                warn!(%sid, "substance record has no PC_Substances entry");
                None
            }
            Err(error) => {
                warn!(%sid, %error, "substance record fetch failed");
                None
            }
        }
    }
}

fn has_entries(document: &Value, key: &str) -> bool {
    document.get(key).and_then(Value::as_array).is_some_and(|entries| !entries.is_empty())
}

/// Identifier a full record was fetched for, serialized as `{"cid": n}` or
/// `{"sid": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordIdentifier {
    Cid(Cid),
    Sid(Sid),
}

/// Full record of one input, or why there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullRecordEntry {
    pub input: Ingredient,
    pub identifier: Option<RecordIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<UnresolvedReason>,
    pub basic_info: Option<BasicInfo>,
    pub record: Option<Value>,
}

impl FullRecordEntry {
    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }
}

/// Short summary of a full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum BasicInfo {
    Compound {
        #[serde(skip_serializing_if = "Option::is_none")]
        molecular_formula: Option<String>,
        atom_count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        bond_count: Option<usize>,
    },
    Substance {
        source: String,
    },
}

/// Summarize a document returned by [`FullRecordFetcher`].
pub fn basic_info(document: &Value) -> Option<BasicInfo> {
    if let Some(compound) = document.pointer("/PC_Compounds/0") {
        let molecular_formula = compound
            .get("props")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find(|prop| {
                prop.pointer("/urn/label")
                    .and_then(Value::as_str)
                    .is_some_and(|label| label.contains("Molecular Formula"))
            })
            .and_then(|prop| prop.pointer("/value/sval"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        let atom_count = compound.pointer("/atoms/element").and_then(Value::as_array).map_or(0, Vec::len);
        let bond_count = compound
            .get("bonds")
            .map(|bonds| bonds.get("aid1").and_then(Value::as_array).map_or(0, Vec::len));
        return Some(BasicInfo::Compound {
            molecular_formula,
            atom_count,
            bond_count,
        });
    }
    let substance = document.pointer("/PC_Substances/0")?;
    let source = substance
        .pointer("/source/db/name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_owned();
    Some(BasicInfo::Substance { source })
}
