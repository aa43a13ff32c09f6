//! Descriptive data attached to resolved candidates.

use serde::{Deserialize, Serialize};

use crate::{Cid, RegistryNumber};

/// Descriptive fields for one candidate.
///
/// Compound records fill `title` and the two structure strings. Substance
/// records may fill any subset, frequently none of the structure fields,
/// and may list related compound identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Display name of the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Canonical (connectivity-only) SMILES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_smiles: Option<String>,
    /// Isomeric SMILES including stereochemistry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isomeric_smiles: Option<String>,
    /// InChI string, substance records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inchi: Option<String>,
    /// Compound identifiers the substance was standardized into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_cids: Vec<Cid>,
}

impl PropertyRecord {
    /// True when at least one structure string is present.
    pub fn has_structure(&self) -> bool {
        self.canonical_smiles.is_some() || self.isomeric_smiles.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// How a registry number is attached to a compound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationTag {
    /// Listed as a registry cross-reference of the compound.
    Preferred,
    /// Found among the compound's synonyms.
    Synonym,
}

/// A registry number associated with a compound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryAssociation {
    pub registry_number: RegistryNumber,
    pub tag: AssociationTag,
}

impl RegistryAssociation {
    pub fn preferred(registry_number: RegistryNumber) -> Self {
        Self {
            registry_number,
            tag: AssociationTag::Preferred,
        }
    }

    pub fn synonym(registry_number: RegistryNumber) -> Self {
        Self {
            registry_number,
            tag: AssociationTag::Synonym,
        }
    }

    pub fn is_preferred(&self) -> bool {
        self.tag == AssociationTag::Preferred
    }
}
