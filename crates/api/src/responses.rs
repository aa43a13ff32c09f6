//! Response shapes for the endpoints the client calls.
//!
//! Every field is optional or defaulted: an absent field means "no data"
//! and never fails decoding. Unknown fields are ignored.

use casfetch_types::{Cid, PropertyRecord};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct IdentifierListResponse {
    #[serde(rename = "IdentifierList")]
    pub identifier_list: Option<IdentifierList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdentifierList {
    #[serde(rename = "CID", default)]
    pub cids: Vec<u64>,
    #[serde(rename = "SID", default)]
    pub sids: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyTableResponse {
    #[serde(rename = "PropertyTable")]
    pub property_table: Option<PropertyTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyTable {
    #[serde(rename = "Properties", default)]
    pub properties: Vec<PropertyRow>,
}

/// One compound row of the batched property table.
///
/// PubChem now answers `CanonicalSMILES`/`IsomericSMILES` requests with
/// `ConnectivitySMILES`/`SMILES`; both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRow {
    #[serde(rename = "CID")]
    pub cid: u64,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "CanonicalSMILES", alias = "ConnectivitySMILES", default)]
    pub canonical_smiles: Option<String>,
    #[serde(rename = "IsomericSMILES", alias = "SMILES", default)]
    pub isomeric_smiles: Option<String>,
}

impl PropertyRow {
    pub fn cid(&self) -> Cid {
        Cid(self.cid)
    }
}

impl From<PropertyRow> for PropertyRecord {
    fn from(row: PropertyRow) -> Self {
        Self {
            title: row.title,
            canonical_smiles: row.canonical_smiles,
            isomeric_smiles: row.isomeric_smiles,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InformationListResponse {
    #[serde(rename = "InformationList")]
    pub information_list: Option<InformationList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InformationList {
    #[serde(rename = "Information", default)]
    pub information: Vec<Information>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Information {
    #[serde(rename = "CID", default)]
    pub cid: Option<u64>,
    #[serde(rename = "RN", default)]
    pub registry_numbers: Vec<String>,
    #[serde(rename = "Synonym", default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubstanceResponse {
    #[serde(rename = "PC_Substances", default)]
    pub substances: Vec<SubstanceRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubstanceRecord {
    #[serde(default)]
    pub source: Option<SubstanceSource>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub compound: Vec<SubstanceCompound>,
}

impl SubstanceRecord {
    /// Name of the depositing database, when present.
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref()?.db.as_ref()?.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubstanceSource {
    #[serde(default)]
    pub db: Option<SourceDb>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDb {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubstanceCompound {
    #[serde(default)]
    pub props: Vec<InfoDataProp>,
}

/// A labelled property of a deposited structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoDataProp {
    #[serde(default)]
    pub urn: Option<PropUrn>,
    #[serde(default)]
    pub value: Option<PropValue>,
}

impl InfoDataProp {
    pub fn label(&self) -> Option<&str> {
        self.urn.as_ref()?.label.as_deref()
    }

    pub fn string_value(&self) -> Option<&str> {
        self.value.as_ref()?.sval.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropUrn {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropValue {
    #[serde(default)]
    pub sval: Option<String>,
}
