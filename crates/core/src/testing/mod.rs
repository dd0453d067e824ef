//! Testing utilities and mock implementations for end-to-end tests.
//!
//! This module provides mock implementations of every external service
//! trait, so whole curation runs can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipcurator_core::testing::{fixtures, MockMetadataFetcher, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! let fetcher = MockMetadataFetcher::new();
//!
//! // One page of five candidates, all eligible
//! let ids = fixtures::ids("v", 5);
//! searcher.push_page(fixtures::candidates(&ids), None).await;
//! fetcher.add_details(fixtures::eligible_details(&ids)).await;
//!
//! // Hand both to a Curator...
//! ```

mod mock_classifier;
mod mock_metadata_fetcher;
mod mock_searcher;

pub use mock_classifier::MockClassifier;
pub use mock_metadata_fetcher::MockMetadataFetcher;
pub use mock_searcher::{MockSearcher, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::filter::{QualifiedVideo, QualityGrade};
    use crate::searcher::{
        CandidateReference, RegionRestriction, Thumbnail, Thumbnails, VideoDetails,
    };

    /// `count` ids of the form `{prefix}{n}`.
    pub fn ids(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn thumbnails(id: &str) -> Thumbnails {
        let mut thumbs = Thumbnails::new();
        thumbs.insert(
            "default".to_string(),
            Thumbnail {
                url: format!("https://i.ytimg.com/vi/{}/default.jpg", id),
                width: Some(120),
                height: Some(90),
            },
        );
        thumbs
    }

    /// Create a search hit with reasonable defaults.
    pub fn candidate(id: &str) -> CandidateReference {
        CandidateReference {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            description: format!("Description of {}", id),
            channel_id: "UC-mock-channel".to_string(),
            channel_title: "Mock Channel".to_string(),
            thumbnails: thumbnails(id),
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn candidates(ids: &[String]) -> Vec<CandidateReference> {
        ids.iter().map(|id| candidate(id)).collect()
    }

    /// Create a well-formed, embeddable, public, processed detail record.
    pub fn video_details(
        id: &str,
        duration_seconds: u32,
        views: u64,
        likes: u64,
        comments: u64,
    ) -> VideoDetails {
        VideoDetails {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            description: format!("Full description of {}", id),
            channel_id: "UC-mock-channel".to_string(),
            channel_title: "Mock Channel".to_string(),
            thumbnails: thumbnails(id),
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            tags: vec!["shorts".to_string()],
            category_id: Some("22".to_string()),
            default_language: Some("en".to_string()),
            duration_seconds: Some(duration_seconds),
            view_count: views,
            like_count: likes,
            comment_count: comments,
            embeddable: Some(true),
            privacy_status: Some("public".to_string()),
            upload_status: Some("processed".to_string()),
            has_captions: false,
            licensed_content: false,
            region_restriction: RegionRestriction::default(),
            definition: Some("hd".to_string()),
        }
    }

    /// Records that pass the default criteria (30s, 10k views, 5% engagement).
    pub fn eligible_details(ids: &[String]) -> Vec<VideoDetails> {
        ids.iter()
            .map(|id| video_details(id, 30, 10_000, 450, 50))
            .collect()
    }

    /// Records that fail the default criteria at the duration gate.
    pub fn ineligible_details(ids: &[String]) -> Vec<VideoDetails> {
        ids.iter()
            .map(|id| video_details(id, 600, 10_000, 450, 50))
            .collect()
    }

    /// Create an admitted video with the given engagement and views.
    pub fn qualified_video(id: &str, engagement_rate: f64, views: u64) -> QualifiedVideo {
        QualifiedVideo {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            description: String::new(),
            channel_id: "UC-mock-channel".to_string(),
            channel_title: "Mock Channel".to_string(),
            thumbnails: thumbnails(id),
            published_at: None,
            tags: vec![],
            category_id: None,
            default_language: None,
            duration_seconds: 30,
            view_count: views,
            like_count: (views as f64 * engagement_rate) as u64,
            comment_count: 0,
            engagement_rate,
            quality_grade: QualityGrade::from_metrics(engagement_rate, views),
            embeddable: true,
            public: true,
            processed: true,
            has_captions: false,
            licensed_content: false,
            region_restriction: RegionRestriction::default(),
            definition: None,
        }
    }
}
