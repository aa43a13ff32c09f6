//! Registry numbers attached to compounds, gathered by a small worker pool.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use casfetch_api::PubChemClient;
use casfetch_types::{Cid, FetchConfig, RegistryAssociation, RegistryNumber};
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct AssociationFetcher {
    client: PubChemClient,
    max_synonym: usize,
    workers: usize,
    pause: Duration,
}

impl AssociationFetcher {
    pub fn new(client: PubChemClient, config: &FetchConfig) -> Self {
        Self {
            client,
            max_synonym: config.max_synonym,
            workers: config.workers.max(1),
            pause: config.association_pause(),
        }
    }

    /// Preferred cross-references, then up to `max_synonym` registry numbers
    /// found among the synonyms. Failures contribute nothing.
    pub async fn fetch_pairs(&self, cid: Cid) -> Vec<RegistryAssociation> {
        let mut pairs: Vec<RegistryAssociation> = match self.client.fetch_registry_xrefs(cid).await {
            Ok(numbers) => valid_numbers(&numbers).map(RegistryAssociation::preferred).collect(),
            Err(error) => {
                debug!(%cid, %error, "registry cross-references unavailable");
                Vec::new()
            }
        };
        debug!(%cid, preferred = pairs.len(), "preferred registry numbers");

        if pairs.len() < 1 + self.max_synonym {
            match self.client.fetch_synonyms(cid).await {
                Ok(synonyms) => {
                    let before = pairs.len();
                    pairs.extend(valid_numbers(&synonyms).take(self.max_synonym).map(RegistryAssociation::synonym));
                    debug!(%cid, synonyms = pairs.len() - before, "synonym registry numbers");
                }
                Err(error) => debug!(%cid, %error, "synonyms unavailable"),
            }
        }
        pairs
    }

    /// Associations for every id, keyed in input order.
    ///
    /// The ids are split into at most `workers` contiguous runs, one task
    /// each. Each task pauses after every id.
    pub async fn fetch_parallel(&self, cids: &[Cid]) -> IndexMap<Cid, Vec<RegistryAssociation>> {
        if cids.is_empty() {
            return IndexMap::new();
        }
        let per_worker = cids.len().div_ceil(self.workers);
        let gathered: Arc<Mutex<HashMap<Cid, Vec<RegistryAssociation>>>> = Arc::new(Mutex::new(HashMap::new()));
        info!(ids = cids.len(), workers = cids.len().div_ceil(per_worker), "gathering registry numbers");

        let handles: Vec<_> = cids
            .chunks(per_worker)
            .map(|run| {
                let fetcher = self.clone();
                let gathered = Arc::clone(&gathered);
                let run = run.to_vec();
                tokio::spawn(async move { fetcher.work(run, gathered).await })
            })
            .collect();
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(%error, "association worker stopped early");
            }
        }

        let mut gathered = gathered.lock().await;
        let associations: IndexMap<_, _> = cids.iter().filter_map(|cid| gathered.remove(cid).map(|pairs| (*cid, pairs))).collect();
        info!(fetched = associations.len(), "registry numbers gathered");
        associations
    }

    async fn work(&self, run: Vec<Cid>, gathered: Arc<Mutex<HashMap<Cid, Vec<RegistryAssociation>>>>) {
        for cid in run {
            let pairs = self.fetch_pairs(cid).await;
            debug!(%cid, count = pairs.len(), "registry numbers fetched");
            gathered.lock().await.insert(cid, pairs);
            self.client.sleeper().sleep(self.pause).await;
        }
    }
}

fn valid_numbers(candidates: &[String]) -> impl Iterator<Item = RegistryNumber> + '_ {
    candidates.iter().filter_map(|text| RegistryNumber::parse(text).ok())
}

#[cfg(test)]
mod tests {
    use casfetch_api::testing::{RecordingSleeper, ScriptedTransport};
    use casfetch_types::AssociationTag;
    use serde_json::json;

    use super::*;

    fn fetcher(transport: ScriptedTransport) -> (AssociationFetcher, Arc<ScriptedTransport>, Arc<RecordingSleeper>) {
        let transport = Arc::new(transport);
        let sleeper = Arc::new(RecordingSleeper::new());
        let config = FetchConfig::default();
        let client = PubChemClient::new(transport.clone(), sleeper.clone(), &config);
        (AssociationFetcher::new(client, &config), transport, sleeper)
    }

    fn numbers(pairs: &[RegistryAssociation]) -> Vec<(&str, AssociationTag)> {
        pairs.iter().map(|pair| (pair.registry_number.as_str(), pair.tag)).collect()
    }

    #[tokio::test]
    async fn preferred_then_capped_synonyms() {
        let (fetcher, _, _) = fetcher(
            ScriptedTransport::new()
                .json(
                    "compound/cid/712/xrefs/RN/JSON",
                    json!({"InformationList": {"Information": [{"CID": 712, "RN": ["50-00-0", "not-a-number"]}]}}),
                )
                .json(
                    "compound/cid/712/synonyms/JSON",
                    json!({"InformationList": {"Information": [{"CID": 712, "Synonym": [
                        "formaldehyde", "50-00-0", "8005-38-7", "8013-13-6", "112068-71-0", "30525-89-4", "methanal"
                    ]}]}}),
                ),
        );
        let pairs = fetcher.fetch_pairs(Cid(712)).await;
        assert_eq!(
            numbers(&pairs),
            vec![
                ("50-00-0", AssociationTag::Preferred),
                ("50-00-0", AssociationTag::Synonym),
                ("8005-38-7", AssociationTag::Synonym),
                ("8013-13-6", AssociationTag::Synonym),
                ("112068-71-0", AssociationTag::Synonym),
            ]
        );
    }

    #[tokio::test]
    async fn enough_preferred_numbers_skip_synonyms() {
        let (fetcher, transport, _) = fetcher(ScriptedTransport::new().json(
            "compound/cid/1/xrefs/RN/JSON",
            json!({"InformationList": {"Information": [{"RN": ["50-00-0", "64-17-5", "67-56-1", "67-63-0", "71-23-8"]}]}}),
        ));
        assert_eq!(fetcher.fetch_pairs(Cid(1)).await.len(), 5);
        assert_eq!(transport.paths(), vec!["compound/cid/1/xrefs/RN/JSON"]);
    }

    #[tokio::test]
    async fn failures_contribute_nothing() {
        let (fetcher, transport, _) = fetcher(ScriptedTransport::new());
        assert!(fetcher.fetch_pairs(Cid(9)).await.is_empty());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn parallel_fetch_covers_every_id_in_input_order() {
        let mut transport = ScriptedTransport::new();
        for cid in 1..=5u64 {
            transport = transport.json(
                format!("compound/cid/{cid}/xrefs/RN/JSON"),
                json!({"InformationList": {"Information": [{"RN": [format!("{}-00-0", 10 + cid)]}]}}),
            );
        }
        let (fetcher, transport, sleeper) = fetcher(transport);
        let cids: Vec<Cid> = (1..=5).map(Cid).collect();

        let associations = fetcher.fetch_parallel(&cids).await;

        assert_eq!(associations.keys().copied().collect::<Vec<_>>(), cids);
        assert_eq!(numbers(&associations[&Cid(3)]), vec![("13-00-0", AssociationTag::Preferred)]);
        assert_eq!(transport.count_where(|path| path.ends_with("xrefs/RN/JSON")), 5);
        assert_eq!(sleeper.waits(), vec![Duration::from_secs(3); 5]);
    }

    #[tokio::test]
    async fn parallel_fetch_of_nothing_is_empty() {
        let (fetcher, transport, _) = fetcher(ScriptedTransport::new());
        assert!(fetcher.fetch_parallel(&[]).await.is_empty());
        assert_eq!(transport.request_count(), 0);
    }
}
