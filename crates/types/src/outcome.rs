//! Inputs and per-input results of a resolution run.

use serde::{Deserialize, Serialize};

use crate::{Cid, PropertyRecord, RegistryAssociation, RegistryNumber, Sid};

/// An inbound record as read from the ingredient list.
///
/// Field names follow the source data (`inci`, `cas`, `function`); the
/// descriptive names are accepted as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawIngredient {
    #[serde(default, alias = "inci")]
    pub name: String,
    #[serde(default, alias = "cas")]
    pub registry_number: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
}

/// A validated input ready for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub registry_number: RegistryNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, registry_number: RegistryNumber) -> Self {
        Self {
            name: name.into(),
            registry_number,
            function: None,
        }
    }
}

/// Why an input could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// Every lookup strategy came back empty.
    NotFound,
    /// Retries were exhausted on a rate-limited or failing endpoint.
    FetchFailed { message: String },
}

/// Final result for one input. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Resolved to a compound.
    Primary {
        cid: Cid,
        properties: PropertyRecord,
        /// Representative registry number chosen among `associations`.
        registry_number: RegistryNumber,
        /// Every registry number gathered for the compound, with its tag.
        associations: Vec<RegistryAssociation>,
    },
    /// Resolved only to a depositor substance.
    Secondary { sid: Sid, properties: PropertyRecord },
    Unresolved(UnresolvedReason),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved(_))
    }

    pub fn properties(&self) -> Option<&PropertyRecord> {
        match self {
            Self::Primary { properties, .. } | Self::Secondary { properties, .. } => Some(properties),
            Self::Unresolved(_) => None,
        }
    }
}

/// One input paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOutcome {
    pub input: Ingredient,
    pub outcome: ResolutionOutcome,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub primary: usize,
    pub secondary: usize,
    pub unresolved: usize,
    /// Resolved inputs carrying at least one structure string.
    pub with_structure: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[InputOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for entry in outcomes {
            match &entry.outcome {
                ResolutionOutcome::Primary { .. } => summary.primary += 1,
                ResolutionOutcome::Secondary { .. } => summary.secondary += 1,
                ResolutionOutcome::Unresolved(_) => summary.unresolved += 1,
            }
            if entry.outcome.properties().is_some_and(PropertyRecord::has_structure) {
                summary.with_structure += 1;
            }
        }
        summary
    }

    /// Share of inputs resolved in either namespace, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.primary + self.secondary) as f64 * 100.0 / self.total as f64
    }
}
