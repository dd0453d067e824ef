//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Curation runs (outcomes, pages, budget units, yield)
//! - Quality filter (rejections per gate)
//! - External services (YouTube Data API, classifier)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Curation Run Metrics
// =============================================================================

/// Finished curation runs by stop reason.
pub static CURATION_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("curator_runs_total", "Total curation runs finished"),
        &["stop_reason"], // "target_achieved", "search_failed", "cancelled", ...
    )
    .unwrap()
});

/// Curation run duration in seconds.
pub static CURATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "curator_run_duration_seconds",
            "Duration of a curation run",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["stop_reason"],
    )
    .unwrap()
});

/// Search pages fetched successfully.
pub static PAGES_SEARCHED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("curator_pages_searched_total", "Total search pages fetched").unwrap()
});

/// Raw candidates returned by search.
pub static CANDIDATES_PROCESSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "curator_candidates_processed_total",
        "Total raw search candidates processed",
    )
    .unwrap()
});

/// Videos in final result sets.
pub static VIDEOS_QUALIFIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "curator_videos_qualified_total",
        "Total videos admitted into final result sets",
    )
    .unwrap()
});

/// Budget units spent by endpoint kind.
pub static API_UNITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("curator_api_units_total", "Total API budget units consumed"),
        &["kind"], // "search", "detail"
    )
    .unwrap()
});

/// Candidates per search page.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "curator_search_results",
            "Number of candidates returned per search page",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0]),
    )
    .unwrap()
});

// =============================================================================
// Filter Metrics
// =============================================================================

/// Candidates rejected, by the first gate they failed.
pub static FILTER_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "curator_filter_rejections_total",
            "Total candidates rejected by the quality filter",
        ),
        &["gate"], // "embeddable", "public", "duration", "view_count", "engagement", "missing_details"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "curator_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "curator_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Classifier retries after back-pressure errors.
pub static CLASSIFIER_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "curator_classifier_retries_total",
            "Total classifier batch retries",
        ),
        &["classifier"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Runs
        Box::new(CURATION_RUNS.clone()),
        Box::new(CURATION_DURATION.clone()),
        Box::new(PAGES_SEARCHED.clone()),
        Box::new(CANDIDATES_PROCESSED.clone()),
        Box::new(VIDEOS_QUALIFIED.clone()),
        Box::new(API_UNITS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Filter
        Box::new(FILTER_REJECTIONS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(CLASSIFIER_RETRIES.clone()),
    ]
}
