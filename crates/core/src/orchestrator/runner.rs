//! Curation loop implementation.
//!
//! One run is a single logical task: search a page, filter it, merge the
//! admissions, ask the pagination policy whether to go on. Pages are strictly
//! sequential because page n+1's token only exists once page n has returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::filter::{FilterCriteria, FilterError, FilterStats, QualityDistribution, QualityFilter};
use crate::metrics;
use crate::pagination::{decide, PaginationConfig, PaginationDecision, PaginationState, StopReason};
use crate::searcher::{MetadataFetcher, SearchPage, Searcher};

use super::config::OrchestratorConfig;
use super::types::{CostLedger, CurationError, CurationRun, PageSummary, ResultSet};

/// Mutable per-run state, owned exclusively by one `curate` call.
struct RunState {
    run_id: Uuid,
    keyword: String,
    started_at: chrono::DateTime<Utc>,
    clock: Instant,
    results: ResultSet,
    pagination: PaginationState,
    ledger: CostLedger,
    filter_stats: FilterStats,
    pages: Vec<PageSummary>,
    duplicates_dropped: u32,
    last_decision: Option<PaginationDecision>,
    continuation_token: Option<String>,
}

impl RunState {
    fn new(keyword: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            keyword: keyword.to_string(),
            started_at: Utc::now(),
            clock: Instant::now(),
            results: ResultSet::new(),
            pagination: PaginationState::default(),
            ledger: CostLedger::default(),
            filter_stats: FilterStats::default(),
            pages: Vec::new(),
            duplicates_dropped: 0,
            last_decision: None,
            continuation_token: None,
        }
    }

    fn finish(
        self,
        stop_reason: StopReason,
        criteria: &FilterCriteria,
        pagination: &PaginationConfig,
    ) -> CurationRun {
        let videos = self
            .results
            .into_sorted(criteria.sort_by, criteria.max_results);
        let quality_distribution = QualityDistribution::from_videos(&videos);
        let elapsed = self.clock.elapsed();

        CurationRun {
            run_id: self.run_id,
            keyword: self.keyword,
            criteria: criteria.clone(),
            pagination: pagination.clone(),
            videos,
            ledger: self.ledger,
            pages_searched: self.pagination.pages_searched,
            raw_candidates: self.pagination.raw_candidates,
            duplicates_dropped: self.duplicates_dropped,
            filter_stats: self.filter_stats,
            pages: self.pages,
            stop_reason,
            last_decision: self.last_decision,
            quality_distribution,
            started_at: self.started_at,
            finished_at: Utc::now(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Drives search → filter → merge → decide for one keyword at a time.
///
/// Holds no per-run state, so a single `Curator` can serve concurrent runs
/// for independent keywords.
pub struct Curator {
    config: OrchestratorConfig,
    searcher: Arc<dyn Searcher>,
    filter: QualityFilter,
}

impl Curator {
    pub fn new(
        config: OrchestratorConfig,
        searcher: Arc<dyn Searcher>,
        fetcher: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            config,
            searcher,
            filter: QualityFilter::new(fetcher),
        }
    }

    /// Run a curation to completion.
    pub async fn curate(
        &self,
        keyword: &str,
        criteria: &FilterCriteria,
        pagination: &PaginationConfig,
    ) -> Result<CurationRun, CurationError> {
        self.curate_with_cancel(keyword, criteria, pagination, &CancellationToken::new())
            .await
    }

    /// Run a curation that stops early when `cancel` fires.
    ///
    /// Only input validation fails; every later failure ends the run with a
    /// partial result and an explicit stop reason.
    pub async fn curate_with_cancel(
        &self,
        keyword: &str,
        criteria: &FilterCriteria,
        pagination: &PaginationConfig,
        cancel: &CancellationToken,
    ) -> Result<CurationRun, CurationError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CurationError::EmptyKeyword);
        }
        criteria.validate()?;
        pagination.validate()?;
        // Efficiency stats are priced the way the providers charge the ledger.
        let pagination = &PaginationConfig {
            search_unit_cost: self.searcher.unit_cost(),
            detail_unit_cost: self.filter.batch_unit_cost(),
            ..pagination.clone()
        };

        let mut run = RunState::new(keyword);
        info!(
            run_id = %run.run_id,
            keyword = keyword,
            target = pagination.target_results,
            max_pages = pagination.max_pages,
            searcher = self.searcher.name(),
            "Starting curation run"
        );

        let stop_reason = self.drive(&mut run, criteria, pagination, cancel).await;
        let result = run.finish(stop_reason, criteria, pagination);
        record_metrics(&result);

        info!(
            run_id = %result.run_id,
            keyword = %result.keyword,
            stop_reason = %result.stop_reason,
            pages = result.pages_searched,
            videos = result.videos.len(),
            units = result.ledger.total_units(),
            duration_ms = result.duration_ms,
            "Curation run finished"
        );

        Ok(result)
    }

    /// The page loop. Returns the reason the run ended.
    async fn drive(
        &self,
        run: &mut RunState,
        criteria: &FilterCriteria,
        pagination: &PaginationConfig,
        cancel: &CancellationToken,
    ) -> StopReason {
        loop {
            let page_number = run.pagination.pages_searched + 1;

            // Suspension point 1: search call.
            if cancel.is_cancelled() {
                return StopReason::Cancelled;
            }
            let page = SearchPage {
                continuation_token: run.continuation_token.clone(),
                page_size: self.config.page_size,
            };
            let searched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return StopReason::Cancelled,
                r = self.searcher.search(&run.keyword, &page) => r,
            };
            let response = match searched {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        run_id = %run.run_id,
                        page = page_number,
                        error = %e,
                        "Search failed, ending run with partial results"
                    );
                    run.ledger.record_failure();
                    return StopReason::SearchFailed;
                }
            };

            let raw = response.candidates.len() as u32;
            run.ledger.record_search(response.units_consumed);
            run.pagination.pages_searched += 1;
            run.pagination.raw_candidates += raw;
            run.pagination.has_next_token = response.next_token.is_some();
            metrics::SEARCH_RESULTS.observe(f64::from(raw));

            // Suspension point 2: metadata lookup. The page was searched, so
            // it stays in the page log even when nothing was filtered.
            let cancelled_page = PageSummary {
                page: page_number,
                raw_candidates: raw,
                qualified: 0,
                newly_admitted: 0,
                units: u64::from(response.units_consumed),
                reason: Some(StopReason::Cancelled),
            };
            if cancel.is_cancelled() {
                run.pages.push(cancelled_page);
                return StopReason::Cancelled;
            }
            let filtered = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    run.pages.push(cancelled_page);
                    return StopReason::Cancelled;
                }
                r = self.filter.filter(&response.candidates, criteria) => r,
            };
            let outcome = match filtered {
                Ok(outcome) => outcome,
                Err(FilterError::MetadataUnavailable {
                    source,
                    units_consumed,
                    detail_batches,
                }) => {
                    warn!(
                        run_id = %run.run_id,
                        page = page_number,
                        error = %source,
                        "Metadata lookup failed, ending run with partial results"
                    );
                    run.ledger.record_details(detail_batches, units_consumed);
                    run.ledger.record_failure();
                    run.pages.push(PageSummary {
                        page: page_number,
                        raw_candidates: raw,
                        qualified: 0,
                        newly_admitted: 0,
                        units: u64::from(response.units_consumed) + u64::from(units_consumed),
                        reason: Some(StopReason::MetadataFailed),
                    });
                    return StopReason::MetadataFailed;
                }
            };

            run.ledger
                .record_details(outcome.detail_batches, outcome.units_consumed);
            run.filter_stats.accumulate(&outcome.stats);

            let qualified = outcome.qualified.len() as u32;
            let added = run.results.merge(outcome.qualified);
            run.duplicates_dropped += qualified - added;
            run.pagination.qualified_count = run.results.len() as u32;

            let decision = decide(&run.pagination, pagination);
            run.pages.push(PageSummary {
                page: page_number,
                raw_candidates: raw,
                qualified,
                newly_admitted: added,
                units: u64::from(response.units_consumed) + u64::from(outcome.units_consumed),
                reason: Some(decision.reason),
            });
            run.last_decision = Some(decision);

            debug!(
                run_id = %run.run_id,
                page = page_number,
                raw = raw,
                qualified = qualified,
                new = added,
                total = run.pagination.qualified_count,
                reason = %decision.reason,
                "Page processed"
            );

            if !decision.should_continue {
                return decision.reason;
            }
            run.continuation_token = response.next_token;

            // Suspension point 3: inter-page delay.
            if cancel.is_cancelled() {
                return StopReason::Cancelled;
            }
            let delay = self.config.inter_page_delay();
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return StopReason::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

fn record_metrics(run: &CurationRun) {
    let reason = run.stop_reason.code();
    metrics::CURATION_RUNS.with_label_values(&[&reason]).inc();
    metrics::CURATION_DURATION
        .with_label_values(&[&reason])
        .observe(run.duration_ms as f64 / 1000.0);
    metrics::PAGES_SEARCHED.inc_by(u64::from(run.pages_searched));
    metrics::CANDIDATES_PROCESSED.inc_by(u64::from(run.raw_candidates));
    metrics::VIDEOS_QUALIFIED.inc_by(run.videos.len() as u64);
    metrics::API_UNITS
        .with_label_values(&["search"])
        .inc_by(run.ledger.search_units);
    metrics::API_UNITS
        .with_label_values(&["detail"])
        .inc_by(run.ledger.detail_units);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::SearchError;
    use crate::testing::{fixtures, MockMetadataFetcher, MockSearcher};

    fn curator(searcher: MockSearcher, fetcher: MockMetadataFetcher) -> Curator {
        let config = OrchestratorConfig {
            inter_page_delay_ms: 0,
            ..OrchestratorConfig::default()
        };
        Curator::new(config, Arc::new(searcher), Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_empty_keyword_rejected_before_any_call() {
        let searcher = MockSearcher::new();
        let c = curator(searcher.clone(), MockMetadataFetcher::new());

        let result = c
            .curate("  ", &FilterCriteria::default(), &PaginationConfig::default())
            .await;

        assert!(matches!(result, Err(CurationError::EmptyKeyword)));
        assert_eq!(searcher.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_criteria_rejected_before_any_call() {
        let searcher = MockSearcher::new();
        let c = curator(searcher.clone(), MockMetadataFetcher::new());
        let criteria = FilterCriteria {
            min_duration_seconds: 100,
            max_duration_seconds: 10,
            ..FilterCriteria::default()
        };

        let result = c
            .curate("cats", &criteria, &PaginationConfig::default())
            .await;

        assert!(matches!(result, Err(CurationError::InvalidCriteria(_))));
        assert_eq!(searcher.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_search_failure_on_first_page() {
        let searcher = MockSearcher::new();
        searcher.set_next_error(SearchError::Timeout).await;
        let c = curator(searcher, MockMetadataFetcher::new());

        let run = c
            .curate("cats", &FilterCriteria::default(), &PaginationConfig::default())
            .await
            .unwrap();

        assert_eq!(run.stop_reason, StopReason::SearchFailed);
        assert_eq!(run.pages_searched, 0);
        assert!(run.videos.is_empty());
        assert_eq!(run.ledger.failed_calls, 1);
        assert_eq!(run.ledger.total_units(), 0);
    }

    #[tokio::test]
    async fn test_single_page_without_token() {
        let searcher = MockSearcher::new();
        let fetcher = MockMetadataFetcher::new();
        let ids = fixtures::ids("v", 5);
        searcher.push_page(fixtures::candidates(&ids), None).await;
        fetcher.add_details(fixtures::eligible_details(&ids)).await;
        let c = curator(searcher, fetcher);

        let run = c
            .curate("cats", &FilterCriteria::default(), &PaginationConfig::default())
            .await
            .unwrap();

        assert_eq!(run.stop_reason, StopReason::NoMorePagesAvailable);
        assert_eq!(run.pages_searched, 1);
        assert_eq!(run.videos.len(), 5);
        assert_eq!(run.ledger.search_units, 100);
        assert_eq!(run.ledger.detail_units, 9);
        assert_eq!(run.quality_distribution.total(), 5);
    }
}
