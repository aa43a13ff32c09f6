//! Shared types for the casfetch workspace.
//!
//! - [`RegistryNumber`]: validated CAS registry numbers
//! - [`Cid`] / [`Sid`] / [`CandidateSet`]: identifiers in the two PubChem namespaces
//! - [`PropertyRecord`] / [`RegistryAssociation`]: data gathered for a candidate
//! - [`ResolutionOutcome`]: the per-input result handed to persistence
//! - [`FetchConfig`]: tunables passed to every component

pub mod candidate;
pub mod config;
pub mod outcome;
pub mod record;
pub mod registry_number;

pub use candidate::{CandidateSet, Cid, Namespace, Sid};
pub use config::{BaseUrlError, ConfigError, FetchConfig, validate_base_url};
pub use outcome::{Ingredient, InputOutcome, RawIngredient, ResolutionOutcome, RunSummary, UnresolvedReason};
pub use record::{AssociationTag, PropertyRecord, RegistryAssociation};
pub use registry_number::{InvalidRegistryNumber, RegistryNumber};
