//! Application wiring: one metadata client, one store, both collections, and
//! factories for the search and detail sessions.

pub mod detail;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use marquee_api::omdb::{OmdbClient, PlotLength};
use marquee_api::{DetailOutcome, MetadataClient, MetadataService, MovieSummary};
use marquee_core::collection::PersistedCollection;
use marquee_core::config::{AppConfig, API_KEY_ENV};
use marquee_core::storage::SqliteStore;
use marquee_core::view::{self, FilterConfig, Tab};

pub use detail::{DetailSession, DetailState, DetailStatus};
pub use search::{SearchSession, SearchState, SearchStatus};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("metadata request failed: {0}")]
    Api(String),

    #[error("{0}")]
    NotFound(String),
}

type Collection = PersistedCollection<Arc<SqliteStore>>;

pub struct Runtime<S> {
    config: AppConfig,
    client: Arc<MetadataClient<S>>,
    favorites: Collection,
    watch_later: Collection,
}

impl Runtime<OmdbClient> {
    /// Build the production runtime from config: OMDb over HTTP and the
    /// on-disk database. A missing API key only logs a warning; network
    /// commands check with [`require_api_key`] first.
    pub fn from_config(config: AppConfig) -> Result<Self, RuntimeError> {
        let api_key = config.resolved_api_key().unwrap_or_else(|| {
            tracing::warn!("No OMDb API key configured, remote lookups will be rejected");
            String::new()
        });
        let plot = PlotLength::parse(&config.api.plot).unwrap_or_else(|| {
            tracing::warn!(plot = %config.api.plot, "Unknown plot length, using full");
            PlotLength::default()
        });
        let omdb = OmdbClient::with_base_url(config.api.base_url.clone(), api_key).plot(plot);

        let db_path = config
            .ensure_db_path()
            .map_err(|e| RuntimeError::Storage(e.to_string()))?;
        let store = SqliteStore::open(&db_path).map_err(|e| RuntimeError::Storage(e.to_string()))?;
        tracing::info!(path = %db_path.display(), "Opened database");

        Ok(Self::new(config, MetadataClient::new(omdb), Arc::new(store)))
    }
}

/// Fail early when remote lookups would be rejected for lack of a key.
pub fn require_api_key(config: &AppConfig) -> Result<String, RuntimeError> {
    config.resolved_api_key().ok_or_else(|| {
        RuntimeError::Config(format!(
            "no OMDb API key; set api.api_key in the config file or {API_KEY_ENV}"
        ))
    })
}

impl<S: MetadataService + 'static> Runtime<S> {
    pub fn new(config: AppConfig, client: MetadataClient<S>, store: Arc<SqliteStore>) -> Self {
        let favorites = PersistedCollection::favorites(Arc::clone(&store));
        let watch_later = PersistedCollection::watch_later(store);
        Self {
            config,
            client: Arc::new(client),
            favorites,
            watch_later,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<MetadataClient<S>> {
        &self.client
    }

    /// New search session sharing this runtime's cache. Requires a Tokio
    /// runtime.
    pub fn search_session(&self) -> SearchSession<S> {
        let debounce = Duration::from_millis(self.config.search.debounce_ms);
        SearchSession::with_debounce(Arc::clone(&self.client), debounce)
    }

    pub fn detail_session(&self) -> DetailSession<S> {
        DetailSession::new(Arc::clone(&self.client))
    }

    pub fn favorites(&self) -> &Collection {
        &self.favorites
    }

    pub fn watch_later(&self) -> &Collection {
        &self.watch_later
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn is_watch_later(&self, id: &str) -> bool {
        self.watch_later.contains(id)
    }

    /// Displayed list for `tab` given the latest search results.
    pub fn compose(&self, tab: Tab, search: &SearchState, filter: &FilterConfig) -> Vec<MovieSummary> {
        view::compose(
            tab,
            &search.results,
            self.favorites.items(),
            self.watch_later.items(),
            filter,
        )
    }

    pub fn toggle_favorite(&mut self, movie: MovieSummary) -> Result<bool, RuntimeError> {
        self.favorites
            .toggle(movie)
            .map_err(|e| RuntimeError::Storage(e.to_string()))
    }

    pub fn add_watch_later(&mut self, movie: MovieSummary) -> Result<bool, RuntimeError> {
        self.watch_later
            .add(movie)
            .map_err(|e| RuntimeError::Storage(e.to_string()))
    }

    pub fn remove_watch_later(&mut self, id: &str) -> Result<bool, RuntimeError> {
        self.watch_later
            .remove(id)
            .map_err(|e| RuntimeError::Storage(e.to_string()))
    }

    /// Flip watch-later membership, mirroring the favorites toggle.
    pub fn toggle_watch_later(&mut self, movie: MovieSummary) -> Result<bool, RuntimeError> {
        if self.watch_later.contains(&movie.id) {
            self.remove_watch_later(&movie.id).map(|_| false)
        } else {
            self.add_watch_later(movie).map(|_| true)
        }
    }

    /// Find a summary for `id`: from either collection first, otherwise by
    /// fetching its details.
    pub async fn resolve_summary(&self, id: &str) -> Result<MovieSummary, RuntimeError> {
        if let Some(movie) = self.favorites.get(id).or_else(|| self.watch_later.get(id)) {
            return Ok(movie.clone());
        }
        match self.client.details(id).await {
            Ok(DetailOutcome::Found(detail)) => Ok(detail.summary),
            Ok(DetailOutcome::Failed { reason }) => Err(RuntimeError::NotFound(reason)),
            Err(e) => Err(RuntimeError::Api(e.to_string())),
        }
    }

    pub async fn toggle_favorite_by_id(&mut self, id: &str) -> Result<(MovieSummary, bool), RuntimeError> {
        let movie = self.resolve_summary(id).await?;
        let now_favorite = self.toggle_favorite(movie.clone())?;
        Ok((movie, now_favorite))
    }

    pub async fn add_watch_later_by_id(&mut self, id: &str) -> Result<(MovieSummary, bool), RuntimeError> {
        let movie = self.resolve_summary(id).await?;
        let inserted = self.add_watch_later(movie.clone())?;
        Ok((movie, inserted))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use marquee_api::{MediaKind, MovieDetail, SearchOutcome, SearchQuery, SortField};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    #[derive(Default)]
    struct FakeService {
        detail_calls: AtomicUsize,
    }

    fn summary(id: &str, title: &str) -> MovieSummary {
        MovieSummary {
            id: id.into(),
            title: title.into(),
            year: "1979".into(),
            kind: MediaKind::Movie,
            poster: "N/A".into(),
        }
    }

    impl MetadataService for FakeService {
        type Error = Offline;

        async fn search_titles(&self, _query: &SearchQuery) -> Result<SearchOutcome, Offline> {
            Ok(SearchOutcome::Found {
                movies: vec![summary("tt0078748", "Alien"), summary("tt0090605", "Aliens")],
                total_results: "2".into(),
            })
        }

        async fn title_details(&self, id: &str) -> Result<DetailOutcome, Offline> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if id != "tt0078748" {
                return Ok(DetailOutcome::Failed {
                    reason: "Incorrect IMDb ID.".into(),
                });
            }
            let na = || "N/A".to_string();
            Ok(DetailOutcome::Found(Box::new(MovieDetail {
                summary: summary(id, "Alien"),
                rated: na(),
                released: na(),
                runtime: na(),
                genre: na(),
                director: "Ridley Scott".into(),
                writer: na(),
                actors: na(),
                plot: na(),
                language: na(),
                country: na(),
                awards: na(),
                metascore: na(),
                imdb_rating: na(),
                imdb_votes: na(),
            })))
        }
    }

    fn runtime(store: Arc<SqliteStore>) -> Runtime<FakeService> {
        Runtime::new(
            AppConfig::default(),
            MetadataClient::new(FakeService::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_toggle_favorite_by_id_fetches_once() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let mut rt = runtime(Arc::clone(&store));

        let (movie, now) = rt.toggle_favorite_by_id("tt0078748").await.unwrap();
        assert!(now);
        assert_eq!(movie.title, "Alien");
        assert!(rt.is_favorite("tt0078748"));

        // Second toggle resolves from the collection itself.
        let (_, now) = rt.toggle_favorite_by_id("tt0078748").await.unwrap();
        assert!(!now);
        assert_eq!(rt.client().service().detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let mut rt = runtime(store);
        let err = rt.add_watch_later_by_id("tt0000000").await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotFound(ref r) if r == "Incorrect IMDb ID."));
        assert!(rt.watch_later().is_empty());
    }

    #[tokio::test]
    async fn test_collections_persist_across_runtimes() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        {
            let mut rt = runtime(Arc::clone(&store));
            rt.add_watch_later(summary("tt0090605", "Aliens")).unwrap();
            assert!(rt.toggle_watch_later(summary("tt0078748", "Alien")).unwrap());
        }
        let mut rt = runtime(store);
        assert_eq!(rt.watch_later().len(), 2);
        assert!(!rt.toggle_watch_later(summary("tt0078748", "Alien")).unwrap());
        assert!(rt.is_watch_later("tt0090605"));
        assert!(!rt.is_watch_later("tt0078748"));
    }

    #[tokio::test]
    async fn test_compose_uses_collections_for_their_tabs() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let mut rt = runtime(store);
        rt.toggle_favorite(summary("tt2", "Zulu")).unwrap();
        rt.toggle_favorite(summary("tt1", "Alpha")).unwrap();

        let search = SearchState {
            results: vec![summary("tt9", "Searched")],
            ..Default::default()
        };
        let filter = FilterConfig {
            sort: Some(SortField::Title),
            ..Default::default()
        };
        let titles: Vec<String> = rt
            .compose(Tab::Favorites, &search, &filter)
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, ["Alpha", "Zulu"]);
        assert_eq!(rt.compose(Tab::Search, &search, &filter).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_session_uses_configured_debounce() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let mut config = AppConfig::default();
        config.search.debounce_ms = 50;
        let rt = Runtime::new(config, MetadataClient::new(FakeService::default()), store);

        let session = rt.search_session();
        session.search("alien", Default::default());
        tokio::time::sleep(Duration::from_millis(60)).await;
        let mut rx = session.subscribe();
        let state = rx.wait_for(|s| s.is_settled()).await.unwrap().clone();
        assert_eq!(state.total_count, 2);
        assert_eq!(rt.client().cached_entries(), 1);
    }
}
