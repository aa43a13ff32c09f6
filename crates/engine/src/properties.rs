//! Chunked compound property retrieval with per-id fallback.

use std::time::Duration;

use casfetch_api::PubChemClient;
use casfetch_types::{Cid, FetchConfig, PropertyRecord};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Fetches title and structure strings for many compounds.
///
/// One batched request per chunk. When a chunk fails as a whole, each of
/// its ids is requested on its own and failures there only drop that id.
/// A fixed pause follows every chunk.
#[derive(Clone)]
pub struct BatchPropertyFetcher {
    client: PubChemClient,
    chunk_size: usize,
    pause: Duration,
}

impl BatchPropertyFetcher {
    pub fn new(client: PubChemClient, config: &FetchConfig) -> Self {
        Self {
            client,
            chunk_size: config.chunk_size.max(1),
            pause: config.property_pause(),
        }
    }

    /// Properties keyed by id. A missing id means no data was available.
    pub async fn fetch(&self, cids: &[Cid]) -> IndexMap<Cid, PropertyRecord> {
        let mut records = IndexMap::new();
        if cids.is_empty() {
            return records;
        }

        let total_chunks = cids.len().div_ceil(self.chunk_size);
        info!(ids = cids.len(), chunks = total_chunks, "fetching compound properties");

        for (index, chunk) in cids.chunks(self.chunk_size).enumerate() {
            let chunk_number = index + 1;
            match self.client.fetch_properties(chunk).await {
                Ok(rows) => {
                    debug!(chunk = chunk_number, total_chunks, rows = rows.len(), "chunk fetched");
                    for row in rows {
                        records.insert(row.cid(), PropertyRecord::from(row));
                    }
                }
                Err(error) => {
                    warn!(chunk = chunk_number, total_chunks, %error, "chunk failed; fetching ids one by one");
                    self.fetch_each(chunk, &mut records).await;
                }
            }
            self.client.sleeper().sleep(self.pause).await;
        }

        info!(requested = cids.len(), fetched = records.len(), "compound properties done");
        records
    }

    async fn fetch_each(&self, chunk: &[Cid], records: &mut IndexMap<Cid, PropertyRecord>) {
        for &cid in chunk {
            match self.client.fetch_properties(&[cid]).await {
                Ok(rows) => match rows.into_iter().next() {
                    Some(row) => {
                        records.insert(cid, PropertyRecord::from(row));
                    }
                    None => debug!(%cid, "no property row"),
                },
                Err(error) => warn!(%cid, %error, "property fetch failed"),
            }
        }
    }
}
