//! Mock searcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::searcher::{
    CandidateReference, SearchError, SearchPage, SearchResponse, Searcher,
};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The keyword that was searched.
    pub keyword: String,
    /// The page request, including the continuation token.
    pub page: SearchPage,
    /// When the search was made, on the tokio clock.
    pub timestamp: Instant,
}

/// One scripted result page.
#[derive(Debug, Clone)]
struct ScriptedPage {
    candidates: Vec<CandidateReference>,
    next_token: Option<String>,
}

/// Mock implementation of the Searcher trait.
///
/// Serves a scripted sequence of pages:
/// - The first call (no token) gets page 0
/// - A call carrying page n's `next_token` gets page n+1
/// - An unknown token is an API error
///
/// Errors can be injected for the next call or for a specific call number,
/// and an artificial latency can be added to exercise cancellation.
///
/// # Example
///
/// ```rust,ignore
/// use clipcurator_core::testing::{MockSearcher, fixtures};
///
/// let searcher = MockSearcher::new();
/// searcher.script_pages(vec![
///     fixtures::candidates(&fixtures::ids("a", 50)),
///     fixtures::candidates(&fixtures::ids("b", 50)),
/// ], false).await;
///
/// // Second call fails
/// searcher.fail_on_call(2, SearchError::Timeout).await;
/// ```
#[derive(Clone)]
pub struct MockSearcher {
    pages: Arc<RwLock<Vec<ScriptedPage>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
    /// 1-based call number -> error.
    call_errors: Arc<RwLock<HashMap<usize, SearchError>>>,
    latency: Arc<RwLock<Option<Duration>>>,
    unit_cost: u32,
}

impl std::fmt::Debug for MockSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearcher")
            .field("pages", &"<pages>")
            .field("searches", &"<searches>")
            .field("unit_cost", &self.unit_cost)
            .finish()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a mock searcher with no pages; searches return an empty,
    /// final page.
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            call_errors: Arc::new(RwLock::new(HashMap::new())),
            latency: Arc::new(RwLock::new(None)),
            unit_cost: 100,
        }
    }

    /// Charge `cost` units per search instead of the default 100.
    pub fn with_unit_cost(mut self, cost: u32) -> Self {
        self.unit_cost = cost;
        self
    }

    /// Append a page. `next_token` is what the page hands out for the next call.
    pub async fn push_page(&self, candidates: Vec<CandidateReference>, next_token: Option<&str>) {
        self.pages.write().await.push(ScriptedPage {
            candidates,
            next_token: next_token.map(str::to_string),
        });
    }

    /// Replace the script with `pages`, chained with generated tokens.
    /// When `more_available` is true the last page also carries a token
    /// (which leads nowhere).
    pub async fn script_pages(&self, pages: Vec<Vec<CandidateReference>>, more_available: bool) {
        let count = pages.len();
        let scripted = pages
            .into_iter()
            .enumerate()
            .map(|(i, candidates)| ScriptedPage {
                candidates,
                next_token: (i + 1 < count || more_available).then(|| format!("token-{}", i + 1)),
            })
            .collect();
        *self.pages.write().await = scripted;
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of search calls attempted.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail the `call`-th search (1-based) with `error`.
    pub async fn fail_on_call(&self, call: usize, error: SearchError) {
        self.call_errors.write().await.insert(call, error);
    }

    /// Delay every search by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = Some(latency);
    }

    fn page_index(pages: &[ScriptedPage], token: Option<&str>) -> Option<usize> {
        match token {
            None => Some(0),
            Some(token) => pages
                .iter()
                .position(|p| p.next_token.as_deref() == Some(token))
                .map(|i| i + 1),
        }
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    fn unit_cost(&self) -> u32 {
        self.unit_cost
    }

    async fn search(&self, keyword: &str, page: &SearchPage) -> Result<SearchResponse, SearchError> {
        let call = {
            let mut searches = self.searches.write().await;
            searches.push(RecordedSearch {
                keyword: keyword.to_string(),
                page: page.clone(),
                timestamp: Instant::now(),
            });
            searches.len()
        };

        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(err) = self.call_errors.write().await.remove(&call) {
            return Err(err);
        }
        if keyword.trim().is_empty() {
            return Err(SearchError::InvalidKeyword);
        }

        let pages = self.pages.read().await;
        if pages.is_empty() {
            return Ok(SearchResponse {
                candidates: Vec::new(),
                next_token: None,
                total_available: 0,
                units_consumed: self.unit_cost,
            });
        }

        let index = Self::page_index(&pages, page.continuation_token.as_deref());
        let Some(scripted) = index.and_then(|i| pages.get(i)) else {
            return Err(SearchError::ApiError(format!(
                "unknown page token: {:?}",
                page.continuation_token
            )));
        };

        let total_available = pages.iter().map(|p| p.candidates.len() as u64).sum();
        let candidates = scripted
            .candidates
            .iter()
            .take(page.effective_page_size() as usize)
            .cloned()
            .collect();

        Ok(SearchResponse {
            candidates,
            next_token: scripted.next_token.clone(),
            total_available,
            units_consumed: self.unit_cost,
        })
    }
}
