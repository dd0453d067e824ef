//! Types for the video search and metadata lookup system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Hard page-size ceiling of the search API.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Hard ceiling on identifiers per metadata request.
pub const MAX_DETAIL_BATCH: usize = 50;

/// Which page of a keyword search to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Continuation token from the previous response; `None` for the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    /// Requested number of results (capped at [`MAX_PAGE_SIZE`]).
    pub page_size: u32,
}

impl SearchPage {
    /// First page of a search.
    pub fn first(page_size: u32) -> Self {
        Self {
            continuation_token: None,
            page_size,
        }
    }

    /// Page size clamped to what the API accepts.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// A thumbnail rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Thumbnails keyed by rendition name ("default", "medium", "high", ...).
pub type Thumbnails = HashMap<String, Thumbnail>;

/// A search hit, not yet checked against any eligibility rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReference {
    pub video_id: String,
    pub title: String,
    /// Snippet description as returned by the search endpoint.
    #[serde(default)]
    pub description: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub candidates: Vec<CandidateReference>,
    /// Token for the next page; `None` when the platform has no more pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Platform's estimate of total matching results.
    pub total_available: u64,
    /// Budget units charged for this call.
    pub units_consumed: u32,
}

/// Geographic availability restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRestriction {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

impl RegionRestriction {
    pub fn is_restricted(&self) -> bool {
        !self.allowed.is_empty() || !self.blocked.is_empty()
    }
}

/// Full detail record for one video.
///
/// Optional fields the platform may omit are defaulted at parse time so
/// downstream code never sees nulls. `duration_seconds`, `embeddable` and
/// `privacy_status` stay optional: when any of them is missing the record is
/// malformed and can never be admitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddable: Option<bool>,
    /// "public", "unlisted" or "private".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
    /// "processed", "uploaded", "failed", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_status: Option<String>,
    #[serde(default)]
    pub has_captions: bool,
    #[serde(default)]
    pub licensed_content: bool,
    #[serde(default)]
    pub region_restriction: RegionRestriction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl VideoDetails {
    /// Whether every field the eligibility gate depends on is present.
    pub fn is_well_formed(&self) -> bool {
        !self.video_id.is_empty()
            && self.duration_seconds.is_some()
            && self.embeddable.is_some()
            && self.privacy_status.is_some()
    }

    pub fn is_public(&self) -> bool {
        self.privacy_status.as_deref() == Some("public")
    }

    pub fn is_processed(&self) -> bool {
        self.upload_status.as_deref() == Some("processed")
    }
}

/// Errors from the search endpoint. All of them mean "search unavailable".
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search keyword must not be empty")]
    InvalidKeyword,

    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Search quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Search request timed out")]
    Timeout,
}

/// Errors from the metadata endpoint. All of them mean "metadata unavailable".
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Metadata backend API error: {0}")]
    ApiError(String),

    #[error("Metadata quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Metadata request timed out")]
    Timeout,

    #[error("Batch of {requested} identifiers exceeds limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },
}

/// Trait for keyword search backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Budget units charged per search call, regardless of result count.
    fn unit_cost(&self) -> u32;

    /// Fetch one page of results for `keyword`.
    async fn search(&self, keyword: &str, page: &SearchPage)
        -> Result<SearchResponse, SearchError>;
}

/// Trait for bulk video detail lookups.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Budget units charged per batch call.
    fn batch_unit_cost(&self) -> u32;

    /// Largest batch accepted by [`fetch_details`](Self::fetch_details).
    fn max_batch_size(&self) -> usize {
        MAX_DETAIL_BATCH
    }

    /// Fetch detail records for `video_ids`. Unknown ids are simply absent
    /// from the returned list.
    async fn fetch_details(&self, video_ids: &[String])
        -> Result<Vec<VideoDetails>, MetadataError>;
}
