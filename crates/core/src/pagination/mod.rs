//! Page-by-page continue/stop policy.
//!
//! `decide` is a pure function of the run's counters and its target/budget
//! configuration, so it can be exercised exhaustively without any I/O.

mod controller;
mod types;

pub use controller::{compute_stats, decide};
pub use types::*;
