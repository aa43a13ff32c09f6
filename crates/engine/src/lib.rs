//! # Casfetch Engine
//!
//! Resolves chemical registry numbers to PubChem identifiers and collects
//! descriptive data for each one.
//!
//! ## Stages
//!
//! - **`input`**: drops records without a well-formed registry number
//! - **`resolver`**: six lookups in fixed order, first non-empty wins
//! - **`properties`** / **`substance`**: descriptive fields for compounds
//!   (batched) and substances (one by one)
//! - **`associations`**: registry numbers attached to each compound,
//!   gathered by a small worker pool
//! - **`reconcile`**: one representative registry number per compound
//! - **`pipeline`**: the stages above, in order, over a list of inputs
//! - **`full_record`**: complete documents for one identifier or a whole list
//!
//! ## Usage
//!
//! ```no_run
//! use casfetch_api::PubChemClient;
//! use casfetch_engine::ResolutionPipeline;
//! use casfetch_types::{FetchConfig, Ingredient, RegistryNumber};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = FetchConfig::default();
//! let pipeline = ResolutionPipeline::new(PubChemClient::from_config(&config)?, &config);
//! let input = Ingredient::new("FORMALDEHYDE", RegistryNumber::parse("50-00-0")?);
//! println!("{:?}", pipeline.resolve_one(input).await);
//! # Ok(())
//! # }
//! ```

pub mod associations;
pub mod full_record;
pub mod input;
pub mod pipeline;
pub mod properties;
pub mod reconcile;
pub mod resolver;
pub mod substance;

pub use associations::AssociationFetcher;
pub use full_record::{BasicInfo, FullRecordEntry, FullRecordFetcher, RecordIdentifier, basic_info};
pub use input::validate_ingredients;
pub use pipeline::{ResolutionPipeline, RunReport};
pub use properties::BatchPropertyFetcher;
pub use reconcile::choose;
pub use resolver::{IdentifierResolver, LookupStrategy};
pub use substance::{SubstancePropertyFetcher, substance_properties};
