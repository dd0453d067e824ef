//! Mock metadata fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::searcher::{MetadataError, MetadataFetcher, VideoDetails, MAX_DETAIL_BATCH};

/// Mock implementation of the MetadataFetcher trait.
///
/// Answers detail lookups from an in-memory catalogue. Ids missing from the
/// catalogue are absent from the response, like the real API.
#[derive(Clone)]
pub struct MockMetadataFetcher {
    catalogue: Arc<RwLock<HashMap<String, VideoDetails>>>,
    /// Id lists of every batch received, in order.
    batches: Arc<RwLock<Vec<Vec<String>>>>,
    /// If set, the next batch will fail with this error.
    next_error: Arc<RwLock<Option<MetadataError>>>,
    /// 1-based batch number -> error.
    batch_errors: Arc<RwLock<HashMap<usize, MetadataError>>>,
    latency: Arc<RwLock<Option<Duration>>>,
    batch_unit_cost: u32,
}

impl std::fmt::Debug for MockMetadataFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMetadataFetcher")
            .field("catalogue", &"<catalogue>")
            .field("batches", &"<batches>")
            .field("batch_unit_cost", &self.batch_unit_cost)
            .finish()
    }
}

impl Default for MockMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataFetcher {
    pub fn new() -> Self {
        Self {
            catalogue: Arc::new(RwLock::new(HashMap::new())),
            batches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            batch_errors: Arc::new(RwLock::new(HashMap::new())),
            latency: Arc::new(RwLock::new(None)),
            batch_unit_cost: 9,
        }
    }

    /// Charge `cost` units per detail batch instead of the default 9.
    pub fn with_batch_unit_cost(mut self, cost: u32) -> Self {
        self.batch_unit_cost = cost;
        self
    }

    /// Add (or replace) detail records in the catalogue.
    pub async fn add_details(&self, details: Vec<VideoDetails>) {
        let mut catalogue = self.catalogue.write().await;
        for record in details {
            catalogue.insert(record.video_id.clone(), record);
        }
    }

    /// Get the id lists of every batch received.
    pub async fn recorded_batches(&self) -> Vec<Vec<String>> {
        self.batches.read().await.clone()
    }

    /// Configure the next batch to fail with the given error.
    pub async fn set_next_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail the `batch`-th call (1-based) with `error`.
    pub async fn fail_on_batch(&self, batch: usize, error: MetadataError) {
        self.batch_errors.write().await.insert(batch, error);
    }

    /// Delay every batch by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }
}

#[async_trait]
impl MetadataFetcher for MockMetadataFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn batch_unit_cost(&self) -> u32 {
        self.batch_unit_cost
    }

    async fn fetch_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetails>, MetadataError> {
        if video_ids.len() > MAX_DETAIL_BATCH {
            return Err(MetadataError::BatchTooLarge {
                requested: video_ids.len(),
                limit: MAX_DETAIL_BATCH,
            });
        }

        let batch = {
            let mut batches = self.batches.write().await;
            batches.push(video_ids.to_vec());
            batches.len()
        };

        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(err) = self.batch_errors.write().await.remove(&batch) {
            return Err(err);
        }

        let catalogue = self.catalogue.read().await;
        Ok(video_ids
            .iter()
            .filter_map(|id| catalogue.get(id).cloned())
            .collect())
    }
}
