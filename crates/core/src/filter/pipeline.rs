//! Bulk detail lookup, eligibility gating and ranking for one page of candidates.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::metrics;
use crate::searcher::{CandidateReference, MetadataFetcher, MAX_DETAIL_BATCH};

use super::gate::evaluate;
use super::types::{FilterCriteria, FilterError, FilterOutcome, FilterStats, QualifiedVideo};

/// Turns candidate references into ranked, admitted videos.
///
/// Stateless across calls; one instance can serve any number of runs.
#[derive(Clone)]
pub struct QualityFilter {
    fetcher: Arc<dyn MetadataFetcher>,
}

impl QualityFilter {
    pub fn new(fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self { fetcher }
    }

    /// Identifiers per detail call.
    pub fn batch_size(&self) -> usize {
        self.fetcher.max_batch_size().clamp(1, MAX_DETAIL_BATCH)
    }

    /// Units charged per detail call.
    pub fn batch_unit_cost(&self) -> u32 {
        self.fetcher.batch_unit_cost()
    }

    /// Fetch details for `candidates`, gate them against `criteria`, then
    /// sort and truncate the admitted set.
    ///
    /// Any failed batch fails the whole call; the error reports the units
    /// already spent so the caller's ledger stays accurate.
    pub async fn filter(
        &self,
        candidates: &[CandidateReference],
        criteria: &FilterCriteria,
    ) -> Result<FilterOutcome, FilterError> {
        let mut stats = FilterStats {
            total_candidates: candidates.len() as u32,
            ..FilterStats::default()
        };

        // Search-page records keyed by id, first occurrence wins.
        let mut by_id: HashMap<&str, &CandidateReference> = HashMap::new();
        let mut ids: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if by_id.insert(candidate.video_id.as_str(), candidate).is_none() {
                ids.push(candidate.video_id.clone());
            }
        }

        let mut details = Vec::with_capacity(ids.len());
        let mut detail_batches = 0u32;
        let mut units_consumed = 0u32;
        for batch in ids.chunks(self.batch_size()) {
            match self.fetcher.fetch_details(batch).await {
                Ok(mut records) => {
                    detail_batches += 1;
                    units_consumed += self.fetcher.batch_unit_cost();
                    details.append(&mut records);
                }
                Err(e) => {
                    warn!(
                        provider = self.fetcher.name(),
                        batch_size = batch.len(),
                        error = %e,
                        "Detail batch failed"
                    );
                    return Err(FilterError::MetadataUnavailable {
                        source: e,
                        units_consumed,
                        detail_batches,
                    });
                }
            }
        }
        stats.details_received = details.len() as u32;

        let mut qualified = Vec::new();
        for record in details {
            // Records the search page never asked for are ignored.
            let Some(search) = by_id.remove(record.video_id.as_str()) else {
                continue;
            };
            match evaluate(&record, criteria, &mut stats) {
                Ok(admission) => qualified.push(QualifiedVideo::merge(
                    Some(search),
                    record,
                    admission.duration_seconds,
                    admission.engagement_rate,
                )),
                Err(stage) => {
                    metrics::FILTER_REJECTIONS
                        .with_label_values(&[stage.as_str()])
                        .inc();
                }
            }
        }

        // Candidates with no detail record never reached a gate.
        let missing = by_id.len();
        if missing > 0 {
            metrics::FILTER_REJECTIONS
                .with_label_values(&["missing_details"])
                .inc_by(missing as u64);
        }

        criteria.sort_by.sort(&mut qualified);
        qualified.truncate(criteria.max_results);

        debug!(
            candidates = stats.total_candidates,
            details = stats.details_received,
            qualified = qualified.len(),
            batches = detail_batches,
            "Filtered candidate page"
        );

        Ok(FilterOutcome {
            qualified,
            stats,
            detail_batches,
            units_consumed,
        })
    }
}
