//! Candidate admission and quality scoring.
//!
//! The `QualityFilter` enriches one page of search hits with full detail
//! records, runs each through a fixed-order eligibility gate, computes the
//! engagement rate and reporting grade, and returns the admitted set ranked
//! by the requested criterion.

mod gate;
mod pipeline;
mod quality;
mod types;

pub use gate::{evaluate, Admission, GateStage};
pub use pipeline::QualityFilter;
pub use quality::{engagement_rate, QualityDistribution, QualityGrade};
pub use types::*;
