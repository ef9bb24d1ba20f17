use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use marquee_api::{DetailOutcome, MetadataClient, MetadataService, MovieDetail};
use tokio::sync::watch;

const NOT_FOUND: &str = "Movie not found";
const NO_DETAILS: &str = "Movie details not found";
const NETWORK_ERROR: &str = "An error occurred while fetching movie details";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    pub id: Option<String>,
    pub movie: Option<MovieDetail>,
    pub status: DetailStatus,
    pub error: Option<String>,
}

/// Loads one title's full record. A newer `load` supersedes an older one
/// still in flight.
pub struct DetailSession<S> {
    client: Arc<MetadataClient<S>>,
    state: watch::Sender<DetailState>,
    seq: AtomicU64,
}

impl<S: MetadataService> DetailSession<S> {
    pub fn new(client: Arc<MetadataClient<S>>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            client,
            state,
            seq: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    /// Load the record for `id` and return the settled state. A missing or
    /// blank id fails without a request.
    pub async fn load(&self, id: Option<&str>) -> DetailState {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            self.state.send_replace(DetailState {
                status: DetailStatus::Error,
                error: Some(NOT_FOUND.to_string()),
                ..Default::default()
            });
            return self.state();
        };

        self.state.send_replace(DetailState {
            id: Some(id.to_string()),
            status: DetailStatus::Loading,
            ..Default::default()
        });

        let result = self.client.details(id).await;
        if self.seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(id, "Discarding stale detail response");
            return self.state();
        }

        let next = match result {
            Ok(DetailOutcome::Found(movie)) => DetailState {
                id: Some(id.to_string()),
                movie: Some(*movie),
                status: DetailStatus::Ready,
                error: None,
            },
            Ok(DetailOutcome::Failed { reason }) => DetailState {
                id: Some(id.to_string()),
                movie: None,
                status: DetailStatus::Error,
                error: Some(if reason.trim().is_empty() {
                    NO_DETAILS.to_string()
                } else {
                    reason
                }),
            },
            Err(e) => {
                tracing::warn!(id, error = %e, "Detail fetch failed");
                DetailState {
                    id: Some(id.to_string()),
                    movie: None,
                    status: DetailStatus::Error,
                    error: Some(NETWORK_ERROR.to_string()),
                }
            }
        };
        self.state.send_replace(next.clone());
        next
    }
}
