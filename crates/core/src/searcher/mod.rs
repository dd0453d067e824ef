//! Keyword search and video detail lookup.
//!
//! This module provides the `Searcher` and `MetadataFetcher` traits the
//! curation pipeline is written against, plus a YouTube Data API backend
//! implementing both.

mod duration;
mod types;
mod youtube;

pub use duration::parse_iso8601_duration;
pub use types::*;
pub use youtube::YouTubeClient;
