//! Debounced search session.
//!
//! Typed queries wait for a quiet period before a request goes out; page
//! changes go out immediately. Every issued request takes a sequence number
//! and only the response carrying the latest number may touch the state, so
//! a slow reply to a superseded request can never overwrite a newer result.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use marquee_api::{MetadataClient, MetadataService, MovieSummary, SearchOptions, SearchOutcome};
use marquee_core::view::{Pagination, Tab};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Quiet period after the last keystroke before searching.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const NO_RESULTS: &str = "No movies found";
const NETWORK_ERROR: &str = "An error occurred while searching for movies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Observable search state.
///
/// While `Loading`, the previous results stay in place until the new
/// response lands. `Error` always comes with empty results and a zero count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub page: u32,
    pub options: SearchOptions,
    pub results: Vec<MovieSummary>,
    pub total_count: u64,
    pub status: SearchStatus,
    pub error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            options: SearchOptions::default(),
            results: Vec::new(),
            total_count: 0,
            status: SearchStatus::Idle,
            error: None,
        }
    }
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }

    /// Whether a response (success or failure) has settled the state.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, SearchStatus::Ready | SearchStatus::Error)
    }

    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::for_tab(Tab::Search, self.page, self.total_count)
    }
}

struct Control {
    /// Latest issued request; responses with any other number are stale.
    seq: u64,
    /// Bumped whenever a pending debounce is superseded; a timer only fires
    /// if it still holds the latest generation.
    generation: u64,
    pending: Option<JoinHandle<()>>,
    query: String,
    options: SearchOptions,
}

impl Control {
    /// Abort the debounce timer. A timer already past its sleep sees the
    /// new generation and does nothing.
    fn supersede_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.generation += 1;
    }
}

struct Shared<S> {
    client: Arc<MetadataClient<S>>,
    state: watch::Sender<SearchState>,
    control: Mutex<Control>,
}

impl<S> Shared<S> {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: MetadataService + 'static> Shared<S> {
    /// Start a request now. Must run inside a Tokio runtime.
    fn issue(self: &Arc<Self>, query: String, page: u32, options: SearchOptions) {
        let seq = self.begin(&mut self.control(), &query, page, &options);
        self.spawn_fetch(seq, query, page, options);
    }

    /// Take the next sequence number and enter `Loading`, keeping the
    /// current results on screen.
    fn begin(&self, control: &mut Control, query: &str, page: u32, options: &SearchOptions) -> u64 {
        control.seq += 1;
        self.state.send_modify(|s| {
            s.status = SearchStatus::Loading;
            s.error = None;
            s.query = query.to_string();
            s.page = page;
            s.options = options.clone();
        });
        control.seq
    }

    fn spawn_fetch(self: &Arc<Self>, seq: u64, query: String, page: u32, options: SearchOptions) {
        tracing::debug!(seq, query = %query, page, "Issuing search");

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = shared.client.search(&query, page, &options).await;
            shared.apply(seq, result);
        });
    }

    fn apply(&self, seq: u64, result: Result<SearchOutcome, S::Error>) {
        let control = self.control();
        if control.seq != seq {
            tracing::debug!(seq, latest = control.seq, "Discarding stale search response");
            return;
        }

        self.state.send_modify(|s| match result {
            Ok(SearchOutcome::Found {
                movies,
                total_results,
            }) => {
                s.status = SearchStatus::Ready;
                s.total_count = total_results.trim().parse().unwrap_or(0);
                s.results = movies;
                s.error = None;
            }
            Ok(SearchOutcome::Failed { reason }) => {
                s.status = SearchStatus::Error;
                s.results.clear();
                s.total_count = 0;
                s.error = Some(if reason.trim().is_empty() {
                    NO_RESULTS.to_string()
                } else {
                    reason
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Search failed");
                s.status = SearchStatus::Error;
                s.results.clear();
                s.total_count = 0;
                s.error = Some(NETWORK_ERROR.to_string());
            }
        });
    }
}

/// Owns the search state and the single mutation surface over it.
///
/// Calls must be made from within a Tokio runtime. Dropping the session
/// cancels a pending debounce and invalidates in-flight requests.
pub struct SearchSession<S> {
    shared: Arc<Shared<S>>,
    debounce: Duration,
}

impl<S: MetadataService + 'static> SearchSession<S> {
    pub fn new(client: Arc<MetadataClient<S>>) -> Self {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(client: Arc<MetadataClient<S>>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            shared: Arc::new(Shared {
                client,
                state,
                control: Mutex::new(Control {
                    seq: 0,
                    generation: 0,
                    pending: None,
                    query: String::new(),
                    options: SearchOptions::default(),
                }),
            }),
            debounce,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Search for `query`, debounced. Only the last call inside the window
    /// sends a request, always for page 1. A blank query resets to idle
    /// right away without touching the network.
    pub fn search(&self, query: &str, options: SearchOptions) {
        let mut control = self.shared.control();
        control.supersede_pending();
        control.query = query.to_string();
        control.options = options.clone();

        if query.trim().is_empty() {
            // Anything still in flight belongs to an older query.
            control.seq += 1;
            self.shared.state.send_replace(SearchState {
                query: query.to_string(),
                options,
                ..SearchState::default()
            });
            return;
        }

        let generation = control.generation;
        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        let query = query.to_string();
        control.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let seq = {
                let mut control = shared.control();
                if control.generation != generation {
                    return;
                }
                shared.begin(&mut control, &query, 1, &options)
            };
            shared.spawn_fetch(seq, query, 1, options);
        }));
    }

    /// Search for `query` at `page` right away, skipping the debounce window.
    /// Any pending debounced search is dropped.
    pub fn search_now(&self, query: &str, options: SearchOptions, page: u32) {
        if query.trim().is_empty() {
            self.search(query, options);
            return;
        }
        {
            let mut control = self.shared.control();
            control.supersede_pending();
            control.query = query.to_string();
            control.options = options.clone();
        }
        self.shared.issue(query.to_string(), page.max(1), options);
    }

    /// Re-run the current query at `page` immediately (no debounce). A
    /// pending debounced search is dropped; the latest typed query wins.
    pub fn change_page(&self, page: u32) {
        let (query, options) = {
            let mut control = self.shared.control();
            control.supersede_pending();
            (control.query.clone(), control.options.clone())
        };
        if query.trim().is_empty() {
            self.search(&query, options);
            return;
        }
        self.shared.issue(query, page.max(1), options);
    }

    /// Replace the filter options and re-run the current query at page 1
    /// immediately. A pending debounced search is dropped so it cannot
    /// land later with the old options.
    pub fn set_options(&self, options: SearchOptions) {
        let query = {
            let mut control = self.shared.control();
            control.supersede_pending();
            control.options = options.clone();
            control.query.clone()
        };
        if query.trim().is_empty() {
            return;
        }
        self.shared.issue(query, 1, options);
    }

    /// Drop a pending debounced search, if any. In-flight requests are left
    /// to finish; their responses are ignored. A `Loading` state goes back
    /// to `Idle` with no results, since nothing will settle it.
    pub fn cancel_pending(&self) {
        let mut control = self.shared.control();
        control.supersede_pending();
        control.seq += 1;
        self.shared.state.send_if_modified(|s| {
            if !s.is_loading() {
                return false;
            }
            s.status = SearchStatus::Idle;
            s.results.clear();
            s.total_count = 0;
            s.error = None;
            true
        });
    }
}

impl<S> Drop for SearchSession<S> {
    fn drop(&mut self) {
        let mut control = self.shared.control();
        control.supersede_pending();
        control.seq += 1;
    }
}
