use crate::{models::Repository, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Trait for search providers - makes testing easier and keeps things flexible
///
/// The GitHub provider is the real one; tests swap in mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Repository>>;
}

/// Where the current search stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// No query, nothing shown, nothing in flight
    #[default]
    Idle,
    Loading,
    Success(Vec<Repository>),
    Error(String),
}

impl SearchState {
    /// Results to show; empty unless the last search succeeded
    pub fn repositories(&self) -> &[Repository] {
        match self {
            SearchState::Success(repos) => repos,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A finished request, tagged with the submission it belongs to
#[derive(Debug)]
pub struct SearchOutcome {
    pub seq: u64,
    pub query: String,
    pub result: Result<Vec<Repository>>,
}

/// Drives searches and keeps `state` in line with the newest query
///
/// Every submission bumps a sequence number. Requests run as tokio tasks
/// and report back through a channel; an outcome whose number is not the
/// latest is thrown away, and the task behind a superseded request is
/// aborted so it stops burning a connection.
pub struct SearchController {
    provider: Arc<dyn SearchProvider>,
    state: SearchState,
    latest_seq: u64,
    in_flight: Option<AbortHandle>,
    outcomes_tx: mpsc::UnboundedSender<SearchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            state: SearchState::Idle,
            latest_seq: 0,
            in_flight: None,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Start searching for `query`, superseding anything in flight
    ///
    /// Blank queries reset to idle without touching the network. Must be
    /// called from within a tokio runtime.
    pub fn submit(&mut self, query: &str) -> u64 {
        self.abort_in_flight();
        self.latest_seq += 1;
        let seq = self.latest_seq;

        if query.trim().is_empty() {
            debug!("Blank query, back to idle");
            self.state = SearchState::Idle;
            return seq;
        }

        info!("Searching for: {}", query);
        self.state = SearchState::Loading;

        let provider = Arc::clone(&self.provider);
        let tx = self.outcomes_tx.clone();
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            let result = provider.search(&query).await;
            // Receiver gone means the controller is gone; nobody cares
            let _ = tx.send(SearchOutcome { seq, query, result });
        });

        self.in_flight = Some(handle.abort_handle());
        seq
    }

    /// Fold a finished request into the state
    ///
    /// Returns false (and changes nothing) for stale outcomes.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            debug!(
                "Dropping stale results for '{}' (#{}, latest #{})",
                outcome.query, outcome.seq, self.latest_seq
            );
            return false;
        }

        self.in_flight = None;
        self.state = match outcome.result {
            Ok(repos) => {
                info!("Found {} repositories for '{}'", repos.len(), outcome.query);
                SearchState::Success(repos)
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", outcome.query, e);
                SearchState::Error(e.to_string())
            }
        };
        true
    }

    /// Wait for the next finished request, stale or not
    ///
    /// Cancel-safe, so it can sit in a `select!` loop.
    pub async fn next_outcome(&mut self) -> Option<SearchOutcome> {
        self.outcomes_rx.recv().await
    }

    /// Wait until the latest submission has landed in `state`
    pub async fn settle(&mut self) {
        while self.state.is_loading() {
            match self.outcomes_rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => break,
            }
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
