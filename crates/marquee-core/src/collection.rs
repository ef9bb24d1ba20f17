//! Persisted movie collections (favorites and watch-later).
//!
//! Each collection mirrors itself into a [`KeyValueStore`] under a fixed key.
//! Writes are write-through: every mutation serializes and stores the whole
//! list immediately, with no diffing or batching.

use marquee_api::MovieSummary;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::MarqueeError;
use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "movie-search-app-favorites";
pub const WATCH_LATER_KEY: &str = "movie-search-app-watch-later";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Favorites,
    WatchLater,
}

impl CollectionKind {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Favorites => FAVORITES_KEY,
            Self::WatchLater => WATCH_LATER_KEY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::WatchLater => "watch later",
        }
    }
}

/// Ordered, id-unique list of movies backed by a key-value store.
pub struct PersistedCollection<S> {
    kind: CollectionKind,
    store: S,
    items: Vec<MovieSummary>,
    notify: watch::Sender<Vec<MovieSummary>>,
}

impl<S: KeyValueStore> PersistedCollection<S> {
    pub fn favorites(store: S) -> Self {
        Self::load(CollectionKind::Favorites, store)
    }

    pub fn watch_later(store: S) -> Self {
        Self::load(CollectionKind::WatchLater, store)
    }

    /// Read the collection from storage. Never fails: a missing key, an
    /// unreadable store, or an unexpected shape all yield an empty list.
    pub fn load(kind: CollectionKind, store: S) -> Self {
        let items = match store.get(kind.storage_key()) {
            Ok(Some(raw)) => decode(kind, &raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(collection = kind.label(), error = %e, "Failed to read collection, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(collection = kind.label(), count = items.len(), "Collection loaded");
        let (notify, _) = watch::channel(items.clone());
        Self {
            kind,
            store,
            items,
            notify,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|m| m.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&MovieSummary> {
        self.items.iter().find(|m| m.id == id)
    }

    /// Receiver notified with the full list after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<MovieSummary>> {
        self.notify.subscribe()
    }

    /// Remove the movie if present, otherwise append it. Returns whether the
    /// movie is in the collection afterwards.
    pub fn toggle(&mut self, movie: MovieSummary) -> Result<bool, MarqueeError> {
        let now_contained = if self.contains(&movie.id) {
            self.items.retain(|m| m.id != movie.id);
            false
        } else {
            self.items.push(movie);
            true
        };
        self.persist()?;
        Ok(now_contained)
    }

    /// Append the movie unless its id is already present. Returns whether it
    /// was inserted. The collection is written either way.
    pub fn add(&mut self, movie: MovieSummary) -> Result<bool, MarqueeError> {
        let inserted = !self.contains(&movie.id);
        if inserted {
            self.items.push(movie);
        }
        self.persist()?;
        Ok(inserted)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, MarqueeError> {
        let before = self.items.len();
        self.items.retain(|m| m.id != id);
        let removed = self.items.len() != before;
        self.persist()?;
        Ok(removed)
    }

    fn persist(&self) -> Result<(), MarqueeError> {
        self.notify.send_replace(self.items.clone());
        let json = serde_json::to_string(&self.items)?;
        self.store
            .set(self.kind.storage_key(), &json)
            .inspect_err(|e| {
                tracing::error!(collection = self.kind.label(), error = %e, "Failed to save collection");
            })
    }
}

fn decode(kind: CollectionKind, raw: &str) -> Vec<MovieSummary> {
    match serde_json::from_str::<Vec<MovieSummary>>(raw) {
        Ok(items) => dedup(items),
        Err(e) => {
            if is_legacy_id_list(raw) {
                tracing::info!(collection = kind.label(), "Discarding legacy id-only collection");
            } else {
                tracing::warn!(collection = kind.label(), error = %e, "Unreadable collection, resetting");
            }
            Vec::new()
        }
    }
}

/// Older builds stored a bare list of identifier strings.
fn is_legacy_id_list(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => !values.is_empty() && values.iter().all(Value::is_string),
        _ => false,
    }
}

/// Drop repeated ids from hand-edited or older data, keeping first occurrences.
fn dedup(items: Vec<MovieSummary>) -> Vec<MovieSummary> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use marquee_api::MediaKind;

    use super::*;
    use crate::storage::SqliteStore;

    /// Wraps a store and counts writes.
    struct CountingStore {
        inner: SqliteStore,
        writes: Cell<usize>,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: SqliteStore::open_memory().unwrap(),
                writes: Cell::new(0),
            }
        }
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, MarqueeError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), MarqueeError> {
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }
    }

    fn movie(id: &str, title: &str) -> MovieSummary {
        MovieSummary {
            id: id.into(),
            title: title.into(),
            year: "2010".into(),
            kind: MediaKind::Movie,
            poster: "N/A".into(),
        }
    }

    #[test]
    fn test_toggle_pair_restores_content_with_two_writes() {
        let store = CountingStore::new();
        let mut favorites = PersistedCollection::favorites(&store);
        favorites.add(movie("tt1", "Alpha")).unwrap();
        favorites.add(movie("tt2", "Beta")).unwrap();
        let before = favorites.items().to_vec();
        let writes_before = store.writes.get();

        assert!(favorites.toggle(movie("tt3", "Gamma")).unwrap());
        assert!(favorites.contains("tt3"));
        assert!(!favorites.toggle(movie("tt3", "Gamma")).unwrap());

        assert_eq!(favorites.items(), before.as_slice());
        assert_eq!(store.writes.get() - writes_before, 2);
    }

    #[test]
    fn test_mutations_survive_reload() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let mut later = PersistedCollection::watch_later(store.clone());
        later.add(movie("tt1", "Alpha")).unwrap();
        later.add(movie("tt2", "Beta")).unwrap();
        later.add(movie("tt1", "Alpha")).unwrap();
        later.remove("tt2").unwrap();
        later.add(movie("tt3", "Gamma")).unwrap();

        let reloaded = PersistedCollection::watch_later(store.clone());
        let ids: Vec<_> = reloaded.items().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["tt1", "tt3"]);

        // Favorites live under their own key.
        let favorites = PersistedCollection::favorites(store);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_add_duplicate_still_writes() {
        let store = CountingStore::new();
        let mut later = PersistedCollection::watch_later(&store);
        assert!(later.add(movie("tt1", "Alpha")).unwrap());
        assert!(!later.add(movie("tt1", "Alpha")).unwrap());
        assert_eq!(later.len(), 1);
        assert_eq!(store.writes.get(), 2);
    }

    #[test]
    fn test_legacy_id_list_loads_empty() {
        let store = SqliteStore::open_memory().unwrap();
        store.set(FAVORITES_KEY, r#"["tt0372784","tt1375666"]"#).unwrap();
        let favorites = PersistedCollection::favorites(&store);
        assert!(favorites.is_empty());
        assert!(is_legacy_id_list(r#"["tt0372784"]"#));
    }

    #[test]
    fn test_garbage_loads_empty() {
        let store = SqliteStore::open_memory().unwrap();
        store.set(WATCH_LATER_KEY, "{not json").unwrap();
        let later = PersistedCollection::watch_later(&store);
        assert!(later.is_empty());

        store.set(WATCH_LATER_KEY, r#"{"imdbID":"tt1"}"#).unwrap();
        let later = PersistedCollection::watch_later(&store);
        assert!(later.is_empty());
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let store = SqliteStore::open_memory().unwrap();
        let mut favorites = PersistedCollection::favorites(&store);
        let mut rx = favorites.subscribe();
        favorites.toggle(movie("tt1", "Alpha")).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
