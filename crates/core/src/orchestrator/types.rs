//! Types for the curation orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::classifier::ClassificationRequest;
use crate::filter::{
    FilterCriteria, FilterStats, InvalidCriteria, QualifiedVideo, QualityDistribution, SortBy,
};
use crate::pagination::{InvalidPagination, PaginationConfig, PaginationDecision, StopReason};

use super::report::CurationReport;

/// Errors surfaced by a curation run. Everything that happens after the
/// first page is attempted is absorbed into the run's stop reason instead.
#[derive(Debug, Error)]
pub enum CurationError {
    /// Empty or whitespace-only keyword.
    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error(transparent)]
    InvalidCriteria(#[from] InvalidCriteria),

    #[error(transparent)]
    InvalidPagination(#[from] InvalidPagination),
}

/// Budget units spent during a run, split by endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLedger {
    pub search_calls: u32,
    pub search_units: u64,
    pub detail_batches: u32,
    pub detail_units: u64,
    /// Calls that failed or timed out; they add no units.
    pub failed_calls: u32,
}

impl CostLedger {
    pub fn record_search(&mut self, units: u32) {
        self.search_calls += 1;
        self.search_units += u64::from(units);
    }

    pub fn record_details(&mut self, batches: u32, units: u32) {
        self.detail_batches += batches;
        self.detail_units += u64::from(units);
    }

    pub fn record_failure(&mut self) {
        self.failed_calls += 1;
    }

    pub fn total_units(&self) -> u64 {
        self.search_units + self.detail_units
    }
}

/// Run-scoped accumulator that admits each video id at most once.
#[derive(Debug, Default)]
pub(crate) struct ResultSet {
    seen: HashSet<String>,
    videos: Vec<QualifiedVideo>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append videos not already admitted, preserving arrival order.
    /// Returns how many were new.
    pub fn merge(&mut self, page: Vec<QualifiedVideo>) -> u32 {
        let mut added = 0;
        for video in page {
            if self.seen.insert(video.video_id.clone()) {
                self.videos.push(video);
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// Sort once over the fully merged set and apply the result cap.
    pub fn into_sorted(self, sort_by: SortBy, max_results: usize) -> Vec<QualifiedVideo> {
        let mut videos = self.videos;
        sort_by.sort(&mut videos);
        videos.truncate(max_results);
        videos
    }
}

/// What happened on one search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-based page number.
    pub page: u32,
    pub raw_candidates: u32,
    /// Admitted by the filter on this page.
    pub qualified: u32,
    /// Admitted and not seen on an earlier page.
    pub newly_admitted: u32,
    pub units: u64,
    /// Decision taken after this page, if the page completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<StopReason>,
}

/// The outcome of one curation run, frozen once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationRun {
    pub run_id: Uuid,
    pub keyword: String,
    pub criteria: FilterCriteria,
    pub pagination: PaginationConfig,
    /// Admitted videos, sorted by `criteria.sort_by` and capped at `criteria.max_results`.
    pub videos: Vec<QualifiedVideo>,
    pub ledger: CostLedger,
    pub pages_searched: u32,
    pub raw_candidates: u32,
    /// Admissions dropped because an earlier page already produced the same id.
    pub duplicates_dropped: u32,
    pub filter_stats: FilterStats,
    pub pages: Vec<PageSummary>,
    pub stop_reason: StopReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_decision: Option<PaginationDecision>,
    pub quality_distribution: QualityDistribution,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl CurationRun {
    /// Summary suitable for operators and logs.
    pub fn report(&self) -> CurationReport {
        CurationReport::from_run(self)
    }

    /// Whether the run ended on a dependency failure or cancellation.
    pub fn ended_abnormally(&self) -> bool {
        self.stop_reason.is_abnormal()
    }

    /// Inputs for the downstream classifier, one per admitted video.
    pub fn classification_requests(&self, category: Option<&str>) -> Vec<ClassificationRequest> {
        self.videos
            .iter()
            .map(|v| ClassificationRequest::from_video(v, &self.keyword, category))
            .collect()
    }
}
