//! Registry number → candidate identifiers, by a fixed chain of lookups.

use std::time::Duration;

use casfetch_api::{FetchError, PubChemClient, endpoints};
use casfetch_types::{CandidateSet, FetchConfig, Namespace, RegistryNumber};
use tracing::{debug, info};

/// One remote lookup tried by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupStrategy {
    CompoundByXref,
    CompoundByName,
    SubstanceCidsByName,
    SubstanceCidsByXref,
    SubstanceSidsByName,
    SubstanceSidsByXref,
}

impl LookupStrategy {
    /// Strategies in the order they are tried. Never reordered.
    pub const ORDER: [Self; 6] = [
        Self::CompoundByXref,
        Self::CompoundByName,
        Self::SubstanceCidsByName,
        Self::SubstanceCidsByXref,
        Self::SubstanceSidsByName,
        Self::SubstanceSidsByXref,
    ];

    pub fn path(self, rn: &RegistryNumber) -> String {
        match self {
            Self::CompoundByXref => endpoints::compound_cids_by_xref(rn),
            Self::CompoundByName => endpoints::compound_cids_by_name(rn.as_str()),
            Self::SubstanceCidsByName => endpoints::substance_cids_by_name(rn.as_str()),
            Self::SubstanceCidsByXref => endpoints::substance_cids_by_xref(rn),
            Self::SubstanceSidsByName => endpoints::substance_sids_by_name(rn.as_str()),
            Self::SubstanceSidsByXref => endpoints::substance_sids_by_xref(rn),
        }
    }

    /// Namespace the strategy's identifiers belong to.
    pub fn namespace(self) -> Namespace {
        match self {
            Self::SubstanceSidsByName | Self::SubstanceSidsByXref => Namespace::Secondary,
            _ => Namespace::Primary,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CompoundByXref => "compound-by-xref",
            Self::CompoundByName => "compound-by-name",
            Self::SubstanceCidsByName => "substance-cids-by-name",
            Self::SubstanceCidsByXref => "substance-cids-by-xref",
            Self::SubstanceSidsByName => "substance-sids-by-name",
            Self::SubstanceSidsByXref => "substance-sids-by-xref",
        }
    }
}

/// Maps a registry number to candidate identifiers.
///
/// The first strategy returning a non-empty list wins. Not-found and other
/// permanent failures, as well as undecodable bodies, count as an empty
/// result for that strategy. Exhausted retries abort the resolution.
#[derive(Clone)]
pub struct IdentifierResolver {
    client: PubChemClient,
    candidate_limit: usize,
    pause: Duration,
}

impl IdentifierResolver {
    pub fn new(client: PubChemClient, config: &FetchConfig) -> Self {
        Self {
            client,
            candidate_limit: config.candidate_limit,
            pause: config.lookup_pause(),
        }
    }

    /// Resolve free-form input. Malformed numbers resolve to an empty set
    /// without any request.
    pub async fn resolve(&self, input: &str) -> Result<CandidateSet, FetchError> {
        match RegistryNumber::parse(input) {
            Ok(rn) => self.resolve_number(&rn).await,
            Err(error) => {
                debug!(%error, "skipping lookup");
                Ok(CandidateSet::empty())
            }
        }
    }

    pub async fn resolve_number(&self, rn: &RegistryNumber) -> Result<CandidateSet, FetchError> {
        for (index, strategy) in LookupStrategy::ORDER.into_iter().enumerate() {
            if index > 0 {
                self.client.sleeper().sleep(self.pause).await;
            }
            match self.attempt(strategy, rn).await {
                Ok(found) if !found.is_empty() => {
                    info!(%rn, strategy = strategy.label(), primary = found.primary.len(), secondary = found.secondary.len(), "resolved");
                    return Ok(found);
                }
                Ok(_) => debug!(%rn, strategy = strategy.label(), "no candidates"),
                Err(error) if error.is_exhausted() => return Err(error),
                Err(error) => debug!(%rn, strategy = strategy.label(), %error, "lookup failed; trying next strategy"),
            }
        }
        info!(%rn, "no candidates from any strategy");
        Ok(CandidateSet::empty())
    }

    async fn attempt(&self, strategy: LookupStrategy, rn: &RegistryNumber) -> Result<CandidateSet, FetchError> {
        let path = strategy.path(rn);
        match strategy.namespace() {
            Namespace::Primary => Ok(CandidateSet::primary(self.client.fetch_cids(&path).await?, self.candidate_limit)),
            Namespace::Secondary => Ok(CandidateSet::secondary(self.client.fetch_sids(&path).await?, self.candidate_limit)),
        }
    }
}
