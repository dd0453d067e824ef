//! Types for the continue/stop pagination decision.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target and budget for one curation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Stop once this many unique videos are admitted (default: 40).
    #[serde(default = "default_target_results")]
    pub target_results: u32,
    /// Hard ceiling on search pages per run (default: 3).
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Units per search call, used for efficiency statistics (default: 100).
    /// A `Curator` replaces it with its searcher's price.
    #[serde(default = "default_search_unit_cost")]
    pub search_unit_cost: u32,
    /// Units per detail batch, used for efficiency statistics (default: 9).
    /// A `Curator` replaces it with its fetcher's price.
    #[serde(default = "default_detail_unit_cost")]
    pub detail_unit_cost: u32,
}

fn default_target_results() -> u32 {
    40
}

fn default_max_pages() -> u32 {
    3
}

fn default_search_unit_cost() -> u32 {
    100
}

fn default_detail_unit_cost() -> u32 {
    9
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            target_results: default_target_results(),
            max_pages: default_max_pages(),
            search_unit_cost: default_search_unit_cost(),
            detail_unit_cost: default_detail_unit_cost(),
        }
    }
}

impl PaginationConfig {
    pub fn new(target_results: u32, max_pages: u32) -> Self {
        Self {
            target_results,
            max_pages,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InvalidPagination> {
        if self.target_results == 0 {
            return Err(InvalidPagination("target_results cannot be 0".to_string()));
        }
        if self.max_pages == 0 {
            return Err(InvalidPagination("max_pages cannot be 0".to_string()));
        }
        Ok(())
    }

    /// Units one full page costs (one search call plus one detail batch).
    pub fn units_per_page(&self) -> u64 {
        u64::from(self.search_unit_cost) + u64::from(self.detail_unit_cost)
    }
}

/// Malformed pagination bounds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid pagination config: {0}")]
pub struct InvalidPagination(pub String);

/// Counters the orchestrator maintains between pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Unique videos admitted so far.
    pub qualified_count: u32,
    pub pages_searched: u32,
    /// Raw search hits processed so far.
    pub raw_candidates: u32,
    /// Whether the last search response carried a continuation token.
    pub has_next_token: bool,
}

/// Why a curation run stopped, or why it is continuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    TargetAchieved,
    MaxPagesReached,
    NoMorePagesAvailable,
    ConsecutiveEmptyResults,
    /// Not a stop: `needed` more videos are wanted.
    ContinueSearch { needed: u32 },
    SearchFailed,
    MetadataFailed,
    Cancelled,
}

impl StopReason {
    /// Machine-readable code, e.g. `target_achieved` or `continue_search_need_20_more`.
    pub fn code(&self) -> String {
        let code = match self {
            StopReason::TargetAchieved => "target_achieved",
            StopReason::MaxPagesReached => "max_pages_reached",
            StopReason::NoMorePagesAvailable => "no_more_pages_available",
            StopReason::ConsecutiveEmptyResults => "consecutive_empty_results",
            StopReason::SearchFailed => "search_failed",
            StopReason::MetadataFailed => "metadata_failed",
            StopReason::Cancelled => "cancelled",
            StopReason::ContinueSearch { needed } => {
                return format!("continue_search_need_{}_more", needed)
            }
        };
        code.to_string()
    }

    /// Whether the run ended because a dependency failed or was cancelled
    /// rather than by the pagination policy.
    pub fn is_abnormal(&self) -> bool {
        matches!(
            self,
            StopReason::SearchFailed | StopReason::MetadataFailed | StopReason::Cancelled
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for StopReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reason = match s {
            "target_achieved" => StopReason::TargetAchieved,
            "max_pages_reached" => StopReason::MaxPagesReached,
            "no_more_pages_available" => StopReason::NoMorePagesAvailable,
            "consecutive_empty_results" => StopReason::ConsecutiveEmptyResults,
            "search_failed" => StopReason::SearchFailed,
            "metadata_failed" => StopReason::MetadataFailed,
            "cancelled" => StopReason::Cancelled,
            other => {
                let needed = other
                    .strip_prefix("continue_search_need_")
                    .and_then(|rest| rest.strip_suffix("_more"))
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| format!("unknown stop reason: {}", other))?;
                StopReason::ContinueSearch { needed }
            }
        };
        Ok(reason)
    }
}

impl Serialize for StopReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for StopReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

/// Operator-facing hint for tuning the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    TargetMet,
    RelaxCriteria,
    IncreasePageBudget,
    TryDifferentKeyword,
    ContinueSearching,
}

/// Efficiency figures derived from a [`PaginationState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationStats {
    pub api_units_used: u64,
    /// `qualified / target` as a ratio.
    pub target_achievement: f64,
    pub target_achievement_pct: f64,
    /// `qualified / max(raw_candidates, 1)`.
    pub success_rate: f64,
    /// Videos yielded per budget unit.
    pub efficiency: f64,
    pub average_results_per_page: f64,
    pub recommended_action: RecommendedAction,
}

/// Output of one pagination decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaginationDecision {
    pub should_continue: bool,
    pub reason: StopReason,
    pub stats: PaginationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaginationConfig::default();
        assert_eq!(config.target_results, 40);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.units_per_page(), 109);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_bounds_are_invalid() {
        assert!(PaginationConfig::new(0, 3).validate().is_err());
        assert!(PaginationConfig::new(10, 0).validate().is_err());
    }

    #[test]
    fn test_stop_reason_codes() {
        assert_eq!(StopReason::TargetAchieved.code(), "target_achieved");
        assert_eq!(StopReason::MaxPagesReached.code(), "max_pages_reached");
        assert_eq!(
            StopReason::NoMorePagesAvailable.code(),
            "no_more_pages_available"
        );
        assert_eq!(
            StopReason::ConsecutiveEmptyResults.code(),
            "consecutive_empty_results"
        );
        assert_eq!(
            StopReason::ContinueSearch { needed: 20 }.code(),
            "continue_search_need_20_more"
        );
        assert_eq!(StopReason::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_stop_reason_parse() {
        assert_eq!(
            "continue_search_need_7_more".parse::<StopReason>().unwrap(),
            StopReason::ContinueSearch { needed: 7 }
        );
        assert_eq!(
            "search_failed".parse::<StopReason>().unwrap(),
            StopReason::SearchFailed
        );
        assert!("continue_search_need_x_more".parse::<StopReason>().is_err());
        assert!("bogus".parse::<StopReason>().is_err());
    }

    #[test]
    fn test_stop_reason_serializes_as_code() {
        let json = serde_json::to_string(&StopReason::ContinueSearch { needed: 3 }).unwrap();
        assert_eq!(json, "\"continue_search_need_3_more\"");

        let parsed: StopReason = serde_json::from_str("\"metadata_failed\"").unwrap();
        assert_eq!(parsed, StopReason::MetadataFailed);
    }

    #[test]
    fn test_abnormal_reasons() {
        assert!(StopReason::SearchFailed.is_abnormal());
        assert!(StopReason::Cancelled.is_abnormal());
        assert!(!StopReason::TargetAchieved.is_abnormal());
        assert!(!StopReason::ConsecutiveEmptyResults.is_abnormal());
    }
}
