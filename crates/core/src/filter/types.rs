//! Types for candidate admission and quality scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::searcher::{
    CandidateReference, MetadataError, RegionRestriction, Thumbnails, VideoDetails,
};

use super::quality::QualityGrade;

/// Admission thresholds for one curation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Minimum view count (default: 1000).
    #[serde(default = "default_min_view_count")]
    pub min_view_count: u64,
    /// Minimum `(likes + comments) / views` (default: 0.02).
    #[serde(default = "default_min_engagement_rate")]
    pub min_engagement_rate: f64,
    /// Shortest admissible video, inclusive (default: 15).
    #[serde(default = "default_min_duration")]
    pub min_duration_seconds: u32,
    /// Longest admissible video, inclusive (default: 60).
    #[serde(default = "default_max_duration")]
    pub max_duration_seconds: u32,
    #[serde(default = "default_true")]
    pub require_embeddable: bool,
    #[serde(default = "default_true")]
    pub require_public: bool,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Cap on the final result set (default: 50).
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_view_count() -> u64 {
    1000
}

fn default_min_engagement_rate() -> f64 {
    0.02
}

fn default_min_duration() -> u32 {
    15
}

fn default_max_duration() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    50
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_view_count: default_min_view_count(),
            min_engagement_rate: default_min_engagement_rate(),
            min_duration_seconds: default_min_duration(),
            max_duration_seconds: default_max_duration(),
            require_embeddable: true,
            require_public: true,
            sort_by: SortBy::default(),
            max_results: default_max_results(),
        }
    }
}

impl FilterCriteria {
    /// Reject criteria no video could ever satisfy consistently.
    pub fn validate(&self) -> Result<(), InvalidCriteria> {
        if self.min_duration_seconds > self.max_duration_seconds {
            return Err(InvalidCriteria(format!(
                "min_duration_seconds ({}) exceeds max_duration_seconds ({})",
                self.min_duration_seconds, self.max_duration_seconds
            )));
        }
        if !self.min_engagement_rate.is_finite() || self.min_engagement_rate < 0.0 {
            return Err(InvalidCriteria(format!(
                "min_engagement_rate must be a non-negative number, got {}",
                self.min_engagement_rate
            )));
        }
        if self.max_results == 0 {
            return Err(InvalidCriteria("max_results cannot be 0".to_string()));
        }
        Ok(())
    }
}

/// Malformed filter criteria.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid filter criteria: {0}")]
pub struct InvalidCriteria(pub String);

/// Result ordering, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    EngagementRate,
    ViewCount,
    LikeCount,
    Recency,
}

impl SortBy {
    /// Stable descending sort. Videos without a publish date sort last
    /// under [`SortBy::Recency`].
    pub fn sort(self, videos: &mut [QualifiedVideo]) {
        videos.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(self, a: &QualifiedVideo, b: &QualifiedVideo) -> Ordering {
        match self {
            SortBy::EngagementRate => b.engagement_rate.total_cmp(&a.engagement_rate),
            SortBy::ViewCount => b.view_count.cmp(&a.view_count),
            SortBy::LikeCount => b.like_count.cmp(&a.like_count),
            SortBy::Recency => match (a.published_at, b.published_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// An admitted, enriched video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedVideo {
    pub video_id: String,
    pub title: String,
    /// Search-result description when available (see [`QualifiedVideo::merge`]).
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    pub duration_seconds: u32,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub engagement_rate: f64,
    pub quality_grade: QualityGrade,
    pub embeddable: bool,
    pub public: bool,
    pub processed: bool,
    pub has_captions: bool,
    pub licensed_content: bool,
    pub region_restriction: RegionRestriction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl QualifiedVideo {
    /// Merge the search-page record and the detail record.
    ///
    /// The detail record wins on overlapping fields unless its value is
    /// empty. Description is the exception: the search copy wins, because
    /// consumers expect the search-originated text.
    pub fn merge(
        search: Option<&CandidateReference>,
        details: VideoDetails,
        duration_seconds: u32,
        engagement_rate: f64,
    ) -> Self {
        let pick = |detail: String, fallback: Option<&String>| -> String {
            if detail.is_empty() {
                fallback.cloned().unwrap_or_default()
            } else {
                detail
            }
        };

        let public = details.is_public();
        let processed = details.is_processed();
        let description = match search {
            Some(s) if !s.description.is_empty() => s.description.clone(),
            _ => details.description,
        };
        let thumbnails = if details.thumbnails.is_empty() {
            search.map(|s| s.thumbnails.clone()).unwrap_or_default()
        } else {
            details.thumbnails
        };

        Self {
            title: pick(details.title, search.map(|s| &s.title)),
            channel_id: pick(details.channel_id, search.map(|s| &s.channel_id)),
            channel_title: pick(details.channel_title, search.map(|s| &s.channel_title)),
            published_at: details.published_at.or(search.and_then(|s| s.published_at)),
            description,
            thumbnails,
            video_id: details.video_id,
            tags: details.tags,
            category_id: details.category_id,
            default_language: details.default_language,
            duration_seconds,
            view_count: details.view_count,
            like_count: details.like_count,
            comment_count: details.comment_count,
            engagement_rate,
            quality_grade: QualityGrade::from_metrics(engagement_rate, details.view_count),
            embeddable: details.embeddable.unwrap_or(false),
            public,
            processed,
            has_captions: details.has_captions,
            licensed_content: details.licensed_content,
            region_restriction: details.region_restriction,
            definition: details.definition,
        }
    }
}

/// Cumulative pass-through counts at each gate stage.
///
/// Each counter is the number of items still alive after that stage, so the
/// sequence is non-increasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total_candidates: u32,
    pub details_received: u32,
    pub embeddable_pass: u32,
    pub public_pass: u32,
    pub duration_pass: u32,
    pub view_count_pass: u32,
    pub engagement_pass: u32,
}

impl FilterStats {
    /// Add another page's counters into this one.
    pub fn accumulate(&mut self, other: &FilterStats) {
        self.total_candidates += other.total_candidates;
        self.details_received += other.details_received;
        self.embeddable_pass += other.embeddable_pass;
        self.public_pass += other.public_pass;
        self.duration_pass += other.duration_pass;
        self.view_count_pass += other.view_count_pass;
        self.engagement_pass += other.engagement_pass;
    }
}

/// Result of filtering one page of candidates.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Admitted videos, sorted and truncated per the criteria.
    pub qualified: Vec<QualifiedVideo>,
    pub stats: FilterStats,
    pub detail_batches: u32,
    pub units_consumed: u32,
}

/// Errors from the quality filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("metadata unavailable after {units_consumed} units: {source}")]
    MetadataUnavailable {
        #[source]
        source: MetadataError,
        /// Units already spent on batches that succeeded before the failure.
        units_consumed: u32,
        detail_batches: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn video(id: &str, rate: f64, views: u64, day: Option<u32>) -> QualifiedVideo {
        QualifiedVideo {
            video_id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            channel_id: "c".to_string(),
            channel_title: "C".to_string(),
            thumbnails: Thumbnails::new(),
            published_at: day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()),
            tags: vec![],
            category_id: None,
            default_language: None,
            duration_seconds: 30,
            view_count: views,
            like_count: views / 10,
            comment_count: 0,
            engagement_rate: rate,
            quality_grade: QualityGrade::from_metrics(rate, views),
            embeddable: true,
            public: true,
            processed: true,
            has_captions: false,
            licensed_content: false,
            region_restriction: RegionRestriction::default(),
            definition: None,
        }
    }

    fn ids(videos: &[QualifiedVideo]) -> Vec<&str> {
        videos.iter().map(|v| v.video_id.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_are_valid() {
        assert!(FilterCriteria::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_duration_window_is_invalid() {
        let criteria = FilterCriteria {
            min_duration_seconds: 90,
            max_duration_seconds: 30,
            ..FilterCriteria::default()
        };
        let err = criteria.validate().unwrap_err();
        assert!(err.to_string().contains("min_duration_seconds"));
    }

    #[test]
    fn test_negative_or_nan_engagement_is_invalid() {
        let mut criteria = FilterCriteria {
            min_engagement_rate: -0.1,
            ..FilterCriteria::default()
        };
        assert!(criteria.validate().is_err());

        criteria.min_engagement_rate = f64::NAN;
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_zero_max_results_is_invalid() {
        let criteria = FilterCriteria {
            max_results: 0,
            ..FilterCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_sort_by_engagement_descending() {
        let mut videos = vec![
            video("low", 0.01, 100, None),
            video("high", 0.09, 100, None),
            video("mid", 0.05, 100, None),
        ];
        SortBy::EngagementRate.sort(&mut videos);
        assert_eq!(ids(&videos), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_sort_by_recency_puts_undated_last() {
        let mut videos = vec![
            video("undated", 0.1, 100, None),
            video("old", 0.1, 100, Some(1)),
            video("new", 0.1, 100, Some(20)),
        ];
        SortBy::Recency.sort(&mut videos);
        assert_eq!(ids(&videos), vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut videos = vec![
            video("a", 0.05, 300, None),
            video("b", 0.05, 200, None),
            video("c", 0.07, 100, None),
            video("d", 0.05, 100, None),
        ];
        SortBy::EngagementRate.sort(&mut videos);
        let once = videos.clone();
        SortBy::EngagementRate.sort(&mut videos);

        assert_eq!(ids(&once), vec!["c", "a", "b", "d"]);
        assert_eq!(videos, once);
    }

    #[test]
    fn test_sort_by_serialization() {
        assert_eq!(
            serde_json::to_string(&SortBy::ViewCount).unwrap(),
            "\"view_count\""
        );
        let parsed: SortBy = serde_json::from_str("\"like_count\"").unwrap();
        assert_eq!(parsed, SortBy::LikeCount);
    }

    #[test]
    fn test_merge_prefers_search_description_and_detail_title() {
        let search = CandidateReference {
            video_id: "v1".to_string(),
            title: "Search title".to_string(),
            description: "search text".to_string(),
            channel_id: "chan".to_string(),
            channel_title: "Channel".to_string(),
            thumbnails: Thumbnails::new(),
            published_at: None,
        };
        let details = VideoDetails {
            video_id: "v1".to_string(),
            title: "Detail title".to_string(),
            description: "detail text".to_string(),
            channel_id: String::new(),
            channel_title: String::new(),
            thumbnails: Thumbnails::new(),
            published_at: None,
            tags: vec![],
            category_id: None,
            default_language: None,
            duration_seconds: Some(30),
            view_count: 1000,
            like_count: 50,
            comment_count: 0,
            embeddable: Some(true),
            privacy_status: Some("public".to_string()),
            upload_status: None,
            has_captions: false,
            licensed_content: false,
            region_restriction: RegionRestriction::default(),
            definition: None,
        };

        let merged = QualifiedVideo::merge(Some(&search), details, 30, 0.05);

        assert_eq!(merged.title, "Detail title");
        assert_eq!(merged.description, "search text");
        assert_eq!(merged.channel_id, "chan");
        assert_eq!(merged.channel_title, "Channel");
        assert!(merged.public);
        assert!(!merged.processed);
    }

    #[test]
    fn test_merge_without_search_record_keeps_detail_fields_and_flags() {
        let mut thumbnails = Thumbnails::new();
        thumbnails.insert(
            "default".to_string(),
            crate::searcher::Thumbnail {
                url: "https://i.test/v2.jpg".to_string(),
                width: Some(120),
                height: Some(90),
            },
        );
        let details = VideoDetails {
            video_id: "v2".to_string(),
            title: "Detail title".to_string(),
            description: "detail text".to_string(),
            channel_id: "chan".to_string(),
            channel_title: "Channel".to_string(),
            thumbnails,
            published_at: None,
            tags: vec![],
            category_id: None,
            default_language: None,
            duration_seconds: Some(30),
            view_count: 1000,
            like_count: 50,
            comment_count: 0,
            embeddable: Some(true),
            privacy_status: Some("public".to_string()),
            upload_status: Some("processed".to_string()),
            has_captions: false,
            licensed_content: false,
            region_restriction: RegionRestriction::default(),
            definition: None,
        };

        let merged = QualifiedVideo::merge(None, details, 30, 0.05);

        assert_eq!(merged.description, "detail text");
        assert_eq!(merged.thumbnails["default"].url, "https://i.test/v2.jpg");
        assert!(merged.public);
        assert!(merged.processed);
        assert!(merged.embeddable);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = FilterStats::default();
        let page = FilterStats {
            total_candidates: 10,
            details_received: 9,
            embeddable_pass: 8,
            public_pass: 7,
            duration_pass: 6,
            view_count_pass: 5,
            engagement_pass: 4,
        };
        total.accumulate(&page);
        total.accumulate(&page);
        assert_eq!(total.total_candidates, 20);
        assert_eq!(total.engagement_pass, 8);
    }
}
