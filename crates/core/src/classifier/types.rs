//! Types for the downstream classification collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::QualifiedVideo;

/// One video handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// Keyword the video was curated for.
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ClassificationRequest {
    pub fn from_video(video: &QualifiedVideo, keyword: &str, category: Option<&str>) -> Self {
        Self {
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            keyword: keyword.to_string(),
            category: category.map(str::to_string),
        }
    }
}

/// Per-item classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationOutcome {
    Tagged { tags: Vec<String> },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub video_id: String,
    #[serde(flatten)]
    pub outcome: ClassificationOutcome,
}

impl ClassificationResult {
    pub fn tagged(video_id: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            video_id: video_id.into(),
            outcome: ClassificationOutcome::Tagged { tags },
        }
    }

    pub fn failed(video_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            outcome: ClassificationOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn tags(&self) -> Option<&[String]> {
        match &self.outcome {
            ClassificationOutcome::Tagged { tags } => Some(tags),
            ClassificationOutcome::Failed { .. } => None,
        }
    }
}

/// Errors for a whole classification batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("Classifier overloaded")]
    Overloaded {
        /// Server-suggested wait, if any.
        retry_after_ms: Option<u64>,
    },

    #[error("Classifier rate limit hit")]
    RateLimited,

    #[error("Classifier request failed: {0}")]
    RequestFailed(String),

    #[error("Classifier returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl ClassifierError {
    /// Only back-pressure signals are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClassifierError::Overloaded { .. } | ClassifierError::RateLimited
        )
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ClassifierError::Overloaded { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}

/// Batch tagging service applied to a finished run's result set.
#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Classify `requests`. Item-level failures are reported per result;
    /// `Err` means the whole batch failed.
    async fn classify_batch(
        &self,
        requests: &[ClassificationRequest],
    ) -> Result<Vec<ClassificationResult>, ClassifierError>;
}
