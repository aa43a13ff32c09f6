//! PubChem PUG-REST client.
//!
//! This crate provides a small, typed client for the PubChem endpoints the
//! resolver needs. It focuses on:
//!
//! - A [`Transport`] seam performing one GET per call (`reqwest` in
//!   production, a scripted fake in tests)
//! - A [`RetryExecutor`] that classifies each attempt as permanent,
//!   rate-limited or transient and backs off accordingly
//! - Typed response shapes where every field access is fallible
//!
//! The primary entry point is [`PubChemClient`]. Build one with
//! [`PubChemClient::from_config`], or with [`PubChemClient::new`] to supply
//! your own transport and sleeper.
//!
//! # Example
//!
//! ```ignore
//! use casfetch_api::PubChemClient;
//! use casfetch_types::{FetchConfig, RegistryNumber};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = PubChemClient::from_config(&FetchConfig::default())?;
//! let rn = RegistryNumber::parse("50-00-0")?;
//! let cids = client
//!     .fetch_cids(&casfetch_api::endpoints::compound_cids_by_xref(&rn))
//!     .await?;
//! println!("{cids:?}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Result;
use casfetch_types::{Cid, FetchConfig, Sid};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub mod endpoints;
pub mod error;
pub mod responses;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use error::{FetchError, MalformedResponse};
pub use responses::{PropertyRow, SubstanceRecord};
pub use retry::{FailureKind, RetryDecision, RetryExecutor, backoff, classify_status};
pub use transport::{FetchRequest, ReqwestTransport, Sleeper, TokioSleeper, Transport, TransportError, TransportResponse};

use responses::{IdentifierListResponse, InformationListResponse, PropertyTableResponse, SubstanceResponse};

/// Typed access to the PubChem endpoints, every call routed through the
/// retry policy.
///
/// Cheap to clone; clones share the transport and sleeper.
#[derive(Clone)]
pub struct PubChemClient {
    executor: RetryExecutor,
}

impl PubChemClient {
    pub fn new(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>, config: &FetchConfig) -> Self {
        Self {
            executor: RetryExecutor::new(transport, sleeper, config.max_retry),
        }
    }

    /// Client backed by `reqwest` and the tokio timer.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), Arc::new(TokioSleeper), config))
    }

    /// The sleeper requests wait on; callers use it for their own pacing.
    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        self.executor.sleeper()
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.decode(FetchRequest::get(path)).await
    }

    /// Same as [`get_json`](Self::get_json) with a streamed body.
    pub async fn get_json_streamed<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.decode(FetchRequest::streamed(path)).await
    }

    async fn decode<T: DeserializeOwned>(&self, request: FetchRequest) -> Result<T, FetchError> {
        let body = self.executor.execute(&request).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::from(MalformedResponse::new(request.path, source, &body)))
    }

    /// Compound ids from an identifier-list endpoint. Empty when the
    /// response carries no `IdentifierList.CID`.
    pub async fn fetch_cids(&self, path: &str) -> Result<Vec<Cid>, FetchError> {
        let response: IdentifierListResponse = self.get_json(path).await?;
        let cids: Vec<Cid> = response
            .identifier_list
            .map(|list| list.cids.into_iter().map(Cid).collect())
            .unwrap_or_default();
        debug!(%path, count = cids.len(), "compound ids received");
        Ok(cids)
    }

    /// Substance ids from an identifier-list endpoint.
    pub async fn fetch_sids(&self, path: &str) -> Result<Vec<Sid>, FetchError> {
        let response: IdentifierListResponse = self.get_json(path).await?;
        let sids: Vec<Sid> = response
            .identifier_list
            .map(|list| list.sids.into_iter().map(Sid).collect())
            .unwrap_or_default();
        debug!(%path, count = sids.len(), "substance ids received");
        Ok(sids)
    }

    /// Title and SMILES rows for `cids` in one request. The table may list
    /// fewer rows than ids requested.
    pub async fn fetch_properties(&self, cids: &[Cid]) -> Result<Vec<PropertyRow>, FetchError> {
        let response: PropertyTableResponse = self.get_json(&endpoints::compound_properties(cids)).await?;
        Ok(response.property_table.map(|table| table.properties).unwrap_or_default())
    }

    /// Registry-number cross-references of a compound (first information entry).
    pub async fn fetch_registry_xrefs(&self, cid: Cid) -> Result<Vec<String>, FetchError> {
        let response: InformationListResponse = self.get_json(&endpoints::compound_registry_xrefs(cid)).await?;
        Ok(first_information(response).map(|info| info.registry_numbers).unwrap_or_default())
    }

    /// Synonyms of a compound (first information entry).
    pub async fn fetch_synonyms(&self, cid: Cid) -> Result<Vec<String>, FetchError> {
        let response: InformationListResponse = self.get_json(&endpoints::compound_synonyms(cid)).await?;
        Ok(first_information(response).map(|info| info.synonyms).unwrap_or_default())
    }

    /// The deposited substance record, if the response contains one.
    pub async fn fetch_substance(&self, sid: Sid) -> Result<Option<SubstanceRecord>, FetchError> {
        let response: SubstanceResponse = self.get_json(&endpoints::substance_record(sid)).await?;
        Ok(response.substances.into_iter().next())
    }

    /// Compounds a substance was standardized into.
    pub async fn fetch_substance_cids(&self, sid: Sid) -> Result<Vec<Cid>, FetchError> {
        self.fetch_cids(&endpoints::substance_cids(sid)).await
    }

    /// Complete compound document, streamed.
    pub async fn fetch_compound_document(&self, cid: Cid) -> Result<Value, FetchError> {
        self.get_json_streamed(&endpoints::compound_record(cid)).await
    }

    /// Complete substance document, streamed.
    pub async fn fetch_substance_document(&self, sid: Sid) -> Result<Value, FetchError> {
        self.get_json_streamed(&endpoints::substance_record(sid)).await
    }
}

fn first_information(response: InformationListResponse) -> Option<responses::Information> {
    response.information_list?.information.into_iter().next()
}
