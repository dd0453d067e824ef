//! Mock classifier for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::classifier::{
    ClassificationRequest, ClassificationResult, Classifier, ClassifierError,
};

/// Mock implementation of the Classifier trait.
///
/// Queued errors are returned first, one per call. After that every request
/// is tagged with its configured tags, or with the request keyword when none
/// were configured.
#[derive(Clone, Default)]
pub struct MockClassifier {
    errors: Arc<RwLock<VecDeque<ClassifierError>>>,
    tags: Arc<RwLock<HashMap<String, Vec<String>>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<Vec<ClassificationRequest>>>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch-level error for the next call.
    pub async fn push_error(&self, error: ClassifierError) {
        self.errors.write().await.push_back(error);
    }

    /// Tags returned for `video_id`.
    pub async fn set_tags(&self, video_id: &str, tags: Vec<String>) {
        self.tags.write().await.insert(video_id.to_string(), tags);
    }

    /// Make `video_id` fail at item level.
    pub async fn set_item_failure(&self, video_id: &str, reason: &str) {
        self.failures
            .write()
            .await
            .insert(video_id.to_string(), reason.to_string());
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn recorded_calls(&self) -> Vec<Vec<ClassificationRequest>> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify_batch(
        &self,
        requests: &[ClassificationRequest],
    ) -> Result<Vec<ClassificationResult>, ClassifierError> {
        self.calls.write().await.push(requests.to_vec());

        if let Some(err) = self.errors.write().await.pop_front() {
            return Err(err);
        }

        let tags = self.tags.read().await;
        let failures = self.failures.read().await;
        Ok(requests
            .iter()
            .map(|req| match failures.get(&req.video_id) {
                Some(reason) => ClassificationResult::failed(req.video_id.clone(), reason.clone()),
                None => ClassificationResult::tagged(
                    req.video_id.clone(),
                    tags.get(&req.video_id)
                        .cloned()
                        .unwrap_or_else(|| vec![req.keyword.clone()]),
                ),
            })
            .collect())
    }
}
