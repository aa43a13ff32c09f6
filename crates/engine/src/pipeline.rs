//! End-to-end resolution of validated inputs.

use std::time::Duration;

use casfetch_api::PubChemClient;
use casfetch_types::{
    Cid, FetchConfig, Ingredient, InputOutcome, PropertyRecord, ResolutionOutcome, RunSummary, Sid, UnresolvedReason,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::associations::AssociationFetcher;
use crate::full_record::{self, FullRecordEntry, FullRecordFetcher, RecordIdentifier};
use crate::properties::BatchPropertyFetcher;
use crate::reconcile;
use crate::resolver::IdentifierResolver;
use crate::substance::SubstancePropertyFetcher;

/// Outcomes in input order plus their counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<InputOutcome>,
    pub summary: RunSummary,
}

/// First candidate picked for an input.
enum Lookup {
    Primary(Cid),
    Secondary(Sid),
    Unresolved(UnresolvedReason),
}

/// Resolver, fetchers and reconciler wired together over one client.
#[derive(Clone)]
pub struct ResolutionPipeline {
    client: PubChemClient,
    resolver: IdentifierResolver,
    properties: BatchPropertyFetcher,
    substances: SubstancePropertyFetcher,
    associations: AssociationFetcher,
    records: FullRecordFetcher,
    lookup_pause: Duration,
    item_pause: Duration,
}

impl ResolutionPipeline {
    pub fn new(client: PubChemClient, config: &FetchConfig) -> Self {
        Self {
            resolver: IdentifierResolver::new(client.clone(), config),
            properties: BatchPropertyFetcher::new(client.clone(), config),
            substances: SubstancePropertyFetcher::new(client.clone()),
            associations: AssociationFetcher::new(client.clone(), config),
            records: FullRecordFetcher::new(client.clone()),
            lookup_pause: config.lookup_pause(),
            item_pause: config.property_pause(),
            client,
        }
    }

    pub fn resolver(&self) -> &IdentifierResolver {
        &self.resolver
    }

    /// Resolve every input. A failing input never stops the others.
    pub async fn run(&self, inputs: Vec<Ingredient>) -> RunReport {
        info!(inputs = inputs.len(), "resolving registry numbers");
        let mut lookups = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let lookup = self.lookup(input).await;
            info!(
                input = index + 1,
                total = inputs.len(),
                name = %input.name,
                rn = %input.registry_number,
                found = !matches!(lookup, Lookup::Unresolved(_)),
                "lookup finished"
            );
            if !matches!(lookup, Lookup::Unresolved(_)) {
                self.client.sleeper().sleep(self.lookup_pause).await;
            }
            lookups.push(lookup);
        }

        let cids: Vec<Cid> = lookups
            .iter()
            .filter_map(|lookup| match lookup {
                Lookup::Primary(cid) => Some(*cid),
                _ => None,
            })
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let sids: IndexSet<Sid> = lookups
            .iter()
            .filter_map(|lookup| match lookup {
                Lookup::Secondary(sid) => Some(*sid),
                _ => None,
            })
            .collect();

        let properties = self.properties.fetch(&cids).await;
        let mut substance_properties: IndexMap<Sid, PropertyRecord> = IndexMap::with_capacity(sids.len());
        for sid in sids {
            let record = self.substances.fetch_one(sid).await;
            substance_properties.insert(sid, record);
            self.client.sleeper().sleep(self.item_pause).await;
        }
        let associations = self.associations.fetch_parallel(&cids).await;

        let outcomes: Vec<InputOutcome> = inputs
            .into_iter()
            .zip(lookups)
            .map(|(input, lookup)| {
                let outcome = match lookup {
                    Lookup::Primary(cid) => {
                        let pairs = associations.get(&cid).cloned().unwrap_or_default();
                        let registry_number = reconcile::choose(&IndexMap::from([(cid, pairs.clone())]), input.registry_number.as_str())
                            .map(|(_, rn)| rn)
                            .unwrap_or_else(|| input.registry_number.clone());
                        ResolutionOutcome::Primary {
                            cid,
                            properties: properties.get(&cid).cloned().unwrap_or_default(),
                            registry_number,
                            associations: pairs,
                        }
                    }
                    Lookup::Secondary(sid) => ResolutionOutcome::Secondary {
                        sid,
                        properties: substance_properties.get(&sid).cloned().unwrap_or_default(),
                    },
                    Lookup::Unresolved(reason) => ResolutionOutcome::Unresolved(reason),
                };
                InputOutcome { input, outcome }
            })
            .collect();

        let summary = RunSummary::from_outcomes(&outcomes);
        info!(
            total = summary.total,
            primary = summary.primary,
            secondary = summary.secondary,
            unresolved = summary.unresolved,
            with_structure = summary.with_structure,
            "run finished"
        );
        RunReport { outcomes, summary }
    }

    /// Run the same stages for a single input.
    pub async fn resolve_one(&self, input: Ingredient) -> ResolutionOutcome {
        self.run(vec![input])
            .await
            .outcomes
            .pop()
            .map(|entry| entry.outcome)
            .unwrap_or(ResolutionOutcome::Unresolved(UnresolvedReason::NotFound))
    }

    /// Resolve every input, then download the complete document of each
    /// first candidate. Inputs without a candidate keep their reason.
    pub async fn fetch_full_records(&self, inputs: Vec<Ingredient>) -> Vec<FullRecordEntry> {
        info!(inputs = inputs.len(), "resolving registry numbers for full records");
        let mut lookups = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let lookup = self.lookup(input).await;
            if !matches!(lookup, Lookup::Unresolved(_)) {
                self.client.sleeper().sleep(self.lookup_pause).await;
            }
            lookups.push(lookup);
        }

        let mut entries = Vec::with_capacity(inputs.len());
        for (input, lookup) in inputs.into_iter().zip(lookups) {
            let (identifier, record) = match lookup {
                Lookup::Primary(cid) => (RecordIdentifier::Cid(cid), self.records.compound(cid).await),
                Lookup::Secondary(sid) => (RecordIdentifier::Sid(sid), self.records.substance(sid).await),
                Lookup::Unresolved(reason) => {
                    entries.push(FullRecordEntry {
                        input,
                        identifier: None,
                        unresolved: Some(reason),
                        basic_info: None,
                        record: None,
                    });
                    continue;
                }
            };
            self.client.sleeper().sleep(self.lookup_pause).await;
            entries.push(FullRecordEntry {
                input,
                identifier: Some(identifier),
                unresolved: None,
                basic_info: record.as_ref().and_then(full_record::basic_info),
                record,
            });
        }

        let retrieved = entries.iter().filter(|entry| entry.has_record()).count();
        info!(total = entries.len(), retrieved, failed = entries.len() - retrieved, "full records fetched");
        entries
    }

    async fn lookup(&self, input: &Ingredient) -> Lookup {
        match self.resolver.resolve_number(&input.registry_number).await {
            Ok(found) => match (found.primary.first(), found.secondary.first()) {
                (Some(cid), _) => Lookup::Primary(*cid),
                (None, Some(sid)) => Lookup::Secondary(*sid),
                (None, None) => Lookup::Unresolved(UnresolvedReason::NotFound),
            },
            Err(error) => {
                warn!(name = %input.name, rn = %input.registry_number, %error, "lookup gave up");
                Lookup::Unresolved(UnresolvedReason::FetchFailed {
                    message: error.to_string(),
                })
            }
        }
    }
}
