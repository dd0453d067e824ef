//! Ordered, short-circuiting eligibility gate.

use crate::searcher::VideoDetails;

use super::quality::engagement_rate;
use super::types::{FilterCriteria, FilterStats};

/// The gate stage at which an item was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStage {
    /// Not embeddable, or the detail record is malformed.
    Embeddable,
    Public,
    Duration,
    ViewCount,
    Engagement,
}

impl GateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStage::Embeddable => "embeddable",
            GateStage::Public => "public",
            GateStage::Duration => "duration",
            GateStage::ViewCount => "view_count",
            GateStage::Engagement => "engagement",
        }
    }
}

/// Values computed while an item passes the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Admission {
    pub duration_seconds: u32,
    pub engagement_rate: f64,
}

/// Run one detail record through the five stages in order, bumping the
/// cumulative counter of every stage it survives.
pub fn evaluate(
    details: &VideoDetails,
    criteria: &FilterCriteria,
    stats: &mut FilterStats,
) -> Result<Admission, GateStage> {
    let (Some(duration_seconds), Some(embeddable)) = (details.duration_seconds, details.embeddable)
    else {
        return Err(GateStage::Embeddable);
    };
    if !details.is_well_formed() || (criteria.require_embeddable && !embeddable) {
        return Err(GateStage::Embeddable);
    }
    stats.embeddable_pass += 1;

    if criteria.require_public && !details.is_public() {
        return Err(GateStage::Public);
    }
    stats.public_pass += 1;

    if duration_seconds < criteria.min_duration_seconds
        || duration_seconds > criteria.max_duration_seconds
    {
        return Err(GateStage::Duration);
    }
    stats.duration_pass += 1;

    if details.view_count < criteria.min_view_count {
        return Err(GateStage::ViewCount);
    }
    stats.view_count_pass += 1;

    let rate = engagement_rate(details.like_count, details.comment_count, details.view_count);
    if rate < criteria.min_engagement_rate {
        return Err(GateStage::Engagement);
    }
    stats.engagement_pass += 1;

    Ok(Admission {
        duration_seconds,
        engagement_rate: rate,
    })
}
