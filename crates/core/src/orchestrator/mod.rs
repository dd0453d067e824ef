//! Curation orchestrator.
//!
//! Drives one keyword through search, filtering and pagination:
//! - **Search**: one page at a time, continuation tokens chained in order
//! - **Filter**: each page's candidates enriched and gated in bulk
//! - **Decide**: the pagination policy picks continue or stop after every page
//!
//! Dependency failures and cancellation end a run with partial results and
//! an explicit stop reason; only invalid input is reported as an error.

mod config;
mod report;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use report::CurationReport;
pub use runner::Curator;
pub use types::{CostLedger, CurationError, CurationRun, PageSummary};
