use serde::{Deserialize, Serialize};

use crate::classifier::RetryPolicy;
use crate::filter::FilterCriteria;
use crate::orchestrator::OrchestratorConfig;
use crate::pagination::PaginationConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub youtube: YouTubeConfig,
    /// Default admission criteria; callers may override per run.
    #[serde(default)]
    pub filter: FilterCriteria,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// YouTube Data API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YouTubeConfig {
    /// API key for the Data API
    pub api_key: String,
    /// API root (default: "https://www.googleapis.com/youtube/v3")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for a search call in seconds (default: 10)
    #[serde(default = "default_call_timeout")]
    pub search_timeout_secs: u64,
    /// Timeout for a detail batch call in seconds (default: 10)
    #[serde(default = "default_call_timeout")]
    pub detail_timeout_secs: u64,
    /// Quota units charged per search call (default: 100)
    #[serde(default = "default_search_unit_cost")]
    pub search_unit_cost: u32,
    /// Quota units charged per detail batch (default: 9)
    #[serde(default = "default_detail_unit_cost")]
    pub detail_unit_cost: u32,
    /// `videoDuration` search hint: "short", "medium", "long" or "any"
    #[serde(default = "default_video_duration")]
    pub video_duration: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub relevance_language: Option<String>,
    /// `safeSearch`: "none", "moderate" or "strict"
    #[serde(default)]
    pub safe_search: Option<String>,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            search_timeout_secs: default_call_timeout(),
            detail_timeout_secs: default_call_timeout(),
            search_unit_cost: default_search_unit_cost(),
            detail_unit_cost: default_detail_unit_cost(),
            video_duration: default_video_duration(),
            region_code: None,
            relevance_language: None,
            safe_search: None,
        }
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_call_timeout() -> u64 {
    10
}

fn default_search_unit_cost() -> u32 {
    100
}

fn default_detail_unit_cost() -> u32 {
    9
}

fn default_video_duration() -> Option<String> {
    Some("short".to_string())
}

/// Classifier collaborator configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Sanitized config for logging and reports (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub youtube: SanitizedYouTubeConfig,
    pub filter: FilterCriteria,
    pub pagination: PaginationConfig,
    pub orchestrator: OrchestratorConfig,
    pub classifier: ClassifierConfig,
}

/// Sanitized YouTube config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedYouTubeConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub search_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub search_unit_cost: u32,
    pub detail_unit_cost: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let yt = &config.youtube;
        Self {
            youtube: SanitizedYouTubeConfig {
                base_url: yt.base_url.clone(),
                api_key_configured: !yt.api_key.is_empty(),
                search_timeout_secs: yt.search_timeout_secs,
                detail_timeout_secs: yt.detail_timeout_secs,
                search_unit_cost: yt.search_unit_cost,
                detail_unit_cost: yt.detail_unit_cost,
                video_duration: yt.video_duration.clone(),
                region_code: yt.region_code.clone(),
            },
            filter: config.filter.clone(),
            pagination: config.pagination.clone(),
            orchestrator: config.orchestrator.clone(),
            classifier: config.classifier.clone(),
        }
    }
}
