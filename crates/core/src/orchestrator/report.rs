//! Operator-facing summary of a finished run.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::filter::{QualityDistribution, QualityGrade};
use crate::pagination::{RecommendedAction, StopReason};

use super::types::CurationRun;

/// Flat, serializable digest of a [`CurationRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationReport {
    pub run_id: Uuid,
    pub keyword: String,
    pub stop_reason: StopReason,
    pub pages_searched: u32,
    pub max_pages: u32,
    pub raw_candidates: u32,
    pub qualified: usize,
    pub target_results: u32,
    /// `qualified / max(raw_candidates, 1)`.
    pub success_rate: f64,
    pub search_units: u64,
    pub detail_units: u64,
    pub total_units: u64,
    pub failed_calls: u32,
    pub duplicates_dropped: u32,
    pub average_engagement: f64,
    pub quality_distribution: QualityDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<RecommendedAction>,
    pub duration_ms: u64,
}

impl CurationReport {
    pub fn from_run(run: &CurationRun) -> Self {
        let qualified = run.videos.len();
        let average_engagement = if qualified == 0 {
            0.0
        } else {
            run.videos.iter().map(|v| v.engagement_rate).sum::<f64>() / qualified as f64
        };

        Self {
            run_id: run.run_id,
            keyword: run.keyword.clone(),
            stop_reason: run.stop_reason,
            pages_searched: run.pages_searched,
            max_pages: run.pagination.max_pages,
            raw_candidates: run.raw_candidates,
            qualified,
            target_results: run.pagination.target_results,
            success_rate: qualified as f64 / f64::from(run.raw_candidates.max(1)),
            search_units: run.ledger.search_units,
            detail_units: run.ledger.detail_units,
            total_units: run.ledger.total_units(),
            failed_calls: run.ledger.failed_calls,
            duplicates_dropped: run.duplicates_dropped,
            average_engagement,
            quality_distribution: run.quality_distribution.clone(),
            recommended_action: run.last_decision.map(|d| d.stats.recommended_action),
            duration_ms: run.duration_ms,
        }
    }

    /// Share of videos graded A or better.
    pub fn top_grade_share(&self) -> f64 {
        if self.qualified == 0 {
            return 0.0;
        }
        let top = self.quality_distribution.count(QualityGrade::APlus)
            + self.quality_distribution.count(QualityGrade::A);
        top as f64 / self.qualified as f64
    }
}

impl fmt::Display for CurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Curation report for \"{}\" ({})", self.keyword, self.run_id)?;
        writeln!(f, "  stop reason:   {}", self.stop_reason)?;
        writeln!(
            f,
            "  pages:         {}/{}",
            self.pages_searched, self.max_pages
        )?;
        writeln!(
            f,
            "  yield:         {}/{} target from {} candidates ({:.1}% success)",
            self.qualified,
            self.target_results,
            self.raw_candidates,
            self.success_rate * 100.0
        )?;
        writeln!(
            f,
            "  units:         {} total ({} search, {} detail)",
            self.total_units, self.search_units, self.detail_units
        )?;
        if self.failed_calls > 0 {
            writeln!(f, "  failed calls:  {}", self.failed_calls)?;
        }
        if self.duplicates_dropped > 0 {
            writeln!(f, "  duplicates:    {}", self.duplicates_dropped)?;
        }
        writeln!(
            f,
            "  engagement:    {:.2}% average",
            self.average_engagement * 100.0
        )?;

        let grades: Vec<String> = self
            .quality_distribution
            .iter()
            .map(|(grade, count)| format!("{}={}", grade, count))
            .collect();
        writeln!(
            f,
            "  grades:        {} ({:.0}% A or better)",
            grades.join(" "),
            self.top_grade_share() * 100.0
        )?;

        if let Some(action) = self.recommended_action {
            writeln!(f, "  next step:     {:?}", action)?;
        }
        write!(f, "  duration:      {}ms", self.duration_ms)
    }
}
