//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the curation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Results requested per search page (max 50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between consecutive search pages (milliseconds), to stay under
    /// the platform's rate limits.
    #[serde(default = "default_inter_page_delay")]
    pub inter_page_delay_ms: u64,
}

fn default_page_size() -> u32 {
    50
}

fn default_inter_page_delay() -> u64 {
    1000 // 1 second
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            inter_page_delay_ms: default_inter_page_delay(),
        }
    }
}

impl OrchestratorConfig {
    pub fn inter_page_delay(&self) -> Duration {
        Duration::from_millis(self.inter_page_delay_ms)
    }
}
