use std::sync::{Mutex, MutexGuard};

use crate::cache::{ResponseCache, SearchKey};
use crate::sort::sort_movies;
use crate::traits::{DetailOutcome, MetadataService, SearchOptions, SearchOutcome, SearchQuery};

/// Caching front for a [`MetadataService`].
///
/// Construct one per application and share it (usually behind an `Arc`).
/// Only successful outcomes are cached; logical failures and transport
/// errors always go back to the service on the next identical call.
pub struct MetadataClient<S> {
    service: S,
    cache: Mutex<ResponseCache>,
}

impl<S: MetadataService> MetadataClient<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            cache: Mutex::new(ResponseCache::new()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of cached responses.
    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Search one page of titles, sorting client-side when requested.
    #[tracing::instrument(name = "search", skip(self, query, options), fields(query = %query))]
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        options: &SearchOptions,
    ) -> Result<SearchOutcome, S::Error> {
        if query.trim().is_empty() {
            return Ok(SearchOutcome::Failed {
                reason: "Please enter a search term".into(),
            });
        }
        let page = page.max(1);
        let key = SearchKey::new(query, page, options);

        let cached = self.cache().search(&key).cloned();
        if let Some(hit) = cached {
            tracing::debug!("Search cache hit");
            return Ok(hit);
        }

        let request = SearchQuery {
            query: query.to_string(),
            page,
            year: options.year.clone(),
            kind: options.kind,
        };
        let mut outcome = self.service.search_titles(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Search request failed");
            e
        })?;

        if let (SearchOutcome::Found { movies, .. }, Some(field)) = (&mut outcome, options.sort) {
            sort_movies(movies, field, options.direction);
        }
        if outcome.is_found() {
            self.cache().insert_search(key, outcome.clone());
        }

        Ok(outcome)
    }

    /// Fetch the full record for one title. Keyed by id only.
    #[tracing::instrument(name = "details", skip(self))]
    pub async fn details(&self, id: &str) -> Result<DetailOutcome, S::Error> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(DetailOutcome::Failed {
                reason: "Movie not found".into(),
            });
        }

        let cached = self.cache().detail(id).cloned();
        if let Some(hit) = cached {
            tracing::debug!("Detail cache hit");
            return Ok(DetailOutcome::Found(Box::new(hit)));
        }

        let outcome = self.service.title_details(id).await.map_err(|e| {
            tracing::warn!(error = %e, "Detail request failed");
            e
        })?;

        if let DetailOutcome::Found(detail) = &outcome {
            self.cache().insert_detail(id.to_string(), detail.as_ref().clone());
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::traits::{MediaKind, MovieDetail, MovieSummary, SortDirection, SortField};

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Offline;

    /// Backend that counts calls and can be switched offline.
    #[derive(Default)]
    struct FakeService {
        search_calls: AtomicUsize,
        detail_calls: AtomicUsize,
        offline: std::sync::atomic::AtomicBool,
    }

    fn movie(id: &str, title: &str, year: &str) -> MovieSummary {
        MovieSummary {
            id: id.into(),
            title: title.into(),
            year: year.into(),
            kind: MediaKind::Movie,
            poster: "N/A".into(),
        }
    }

    impl MetadataService for FakeService {
        type Error = Offline;

        async fn search_titles(&self, query: &SearchQuery) -> Result<SearchOutcome, Offline> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Offline);
            }
            if query.query == "nothing" {
                return Ok(SearchOutcome::Failed {
                    reason: "Movie not found!".into(),
                });
            }
            Ok(SearchOutcome::Found {
                movies: vec![movie("tt2", "Zeta", "2001"), movie("tt1", "Alpha", "1999")],
                total_results: "2".into(),
            })
        }

        async fn title_details(&self, id: &str) -> Result<DetailOutcome, Offline> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Offline);
            }
            Ok(DetailOutcome::Found(Box::new(MovieDetail {
                summary: movie(id, "Alpha", "1999"),
                rated: "PG".into(),
                released: "N/A".into(),
                runtime: "90 min".into(),
                genre: "Drama".into(),
                director: "N/A".into(),
                writer: "N/A".into(),
                actors: "N/A".into(),
                plot: "N/A".into(),
                language: "English".into(),
                country: "USA".into(),
                awards: "N/A".into(),
                metascore: "N/A".into(),
                imdb_rating: "7.0".into(),
                imdb_votes: "1,000".into(),
            })))
        }
    }

    #[tokio::test]
    async fn test_details_served_from_cache() {
        let client = MetadataClient::new(FakeService::default());
        let first = client.details("tt1").await.unwrap();
        let second = client.details("tt1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.service().detail_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_cached() {
        let client = MetadataClient::new(FakeService::default());
        client.service().offline.store(true, Ordering::SeqCst);
        assert!(client.search("alpha", 1, &SearchOptions::default()).await.is_err());

        client.service().offline.store(false, Ordering::SeqCst);
        let outcome = client.search("alpha", 1, &SearchOptions::default()).await.unwrap();
        assert!(outcome.is_found());
        assert_eq!(client.service().search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_logical_failure_is_returned_not_cached() {
        let client = MetadataClient::new(FakeService::default());
        for _ in 0..2 {
            let outcome = client.search("nothing", 1, &SearchOptions::default()).await.unwrap();
            assert_eq!(
                outcome,
                SearchOutcome::Failed {
                    reason: "Movie not found!".into()
                }
            );
        }
        assert_eq!(client.service().search_calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_sort_applied_before_caching() {
        let client = MetadataClient::new(FakeService::default());
        let options = SearchOptions {
            sort: Some(SortField::Title),
            direction: SortDirection::Ascending,
            ..Default::default()
        };
        let outcome = client.search("alpha", 1, &options).await.unwrap();
        let SearchOutcome::Found { movies, .. } = outcome else {
            panic!("expected results");
        };
        assert_eq!(movies[0].title, "Alpha");

        // Same query and page, different sort: separate cache entry.
        client.search("alpha", 1, &SearchOptions::default()).await.unwrap();
        client.search("alpha", 1, &options).await.unwrap();
        assert_eq!(client.service().search_calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.cached_entries(), 2);
    }

    #[tokio::test]
    async fn test_blank_inputs_skip_the_service() {
        let client = MetadataClient::new(FakeService::default());
        let outcome = client.search("   ", 1, &SearchOptions::default()).await.unwrap();
        assert!(!outcome.is_found());
        let detail = client.details("").await.unwrap();
        assert!(matches!(detail, DetailOutcome::Failed { .. }));
        assert_eq!(client.service().search_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.service().detail_calls.load(Ordering::SeqCst), 0);
    }
}
