//! Candidate identifiers in the two PubChem namespaces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compound identifier (the primary namespace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(pub u64);

/// Substance identifier (the secondary namespace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sid(pub u64);

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier namespace a candidate belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Rich, standardized compound records.
    Primary,
    /// Depositor-submitted substance records; sparse and fallback only.
    Secondary,
}

/// Result of one resolution attempt.
///
/// At most one of the two lists is non-empty; both are capped at the
/// configured candidate limit and keep the order the remote service returned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub primary: Vec<Cid>,
    pub secondary: Vec<Sid>,
}

impl CandidateSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn primary(mut cids: Vec<Cid>, limit: usize) -> Self {
        cids.truncate(limit);
        Self {
            primary: cids,
            secondary: Vec::new(),
        }
    }

    pub fn secondary(mut sids: Vec<Sid>, limit: usize) -> Self {
        sids.truncate(limit);
        Self {
            primary: Vec::new(),
            secondary: sids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    /// Namespace of the populated list, if any.
    pub fn namespace(&self) -> Option<Namespace> {
        if !self.primary.is_empty() {
            Some(Namespace::Primary)
        } else if !self.secondary.is_empty() {
            Some(Namespace::Secondary)
        } else {
            None
        }
    }
}
