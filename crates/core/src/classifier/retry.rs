//! Bounded exponential-backoff retry for classifier calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::metrics;

use super::types::{ClassificationRequest, ClassificationResult, Classifier, ClassifierError};

/// Retry configuration for back-pressure errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    1000 // 1 second
}

fn default_max_backoff() -> u64 {
    30_000 // 30 seconds
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based). A larger server hint wins,
    /// but nothing exceeds `max_backoff_ms`.
    pub fn delay_for(&self, retry: u32, retry_after_ms: Option<u64>) -> Duration {
        let exp = self.initial_backoff_ms as f64 * self.multiplier.max(1.0).powi(retry as i32);
        let computed = if exp.is_finite() {
            (exp as u64).min(self.max_backoff_ms)
        } else {
            self.max_backoff_ms
        };
        let ms = retry_after_ms
            .map_or(computed, |hint| hint.max(computed))
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Wraps a classifier so overload and rate-limit errors are retried.
pub struct RetryingClassifier<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: Classifier> RetryingClassifier<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: Classifier> Classifier for RetryingClassifier<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn classify_batch(
        &self,
        requests: &[ClassificationRequest],
    ) -> Result<Vec<ClassificationResult>, ClassifierError> {
        let mut retry = 0;
        loop {
            match self.inner.classify_batch(requests).await {
                Ok(results) => return Ok(results),
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    let delay = self.policy.delay_for(retry, e.retry_after_ms());
                    warn!(
                        classifier = self.inner.name(),
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Classifier busy, backing off"
                    );
                    metrics::CLASSIFIER_RETRIES
                        .with_label_values(&[self.inner.name()])
                        .inc();
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
