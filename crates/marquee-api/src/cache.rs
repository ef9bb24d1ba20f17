use std::collections::HashMap;

use crate::traits::{MediaKind, MovieDetail, SearchOptions, SearchOutcome, SortDirection, SortField};

/// Identity of a cached search. Sort parameters are part of the key even
/// though sorting happens client-side, so the same page sorted two ways is
/// cached twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub query: String,
    pub page: u32,
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

impl SearchKey {
    pub fn new(query: &str, page: u32, options: &SearchOptions) -> Self {
        Self {
            query: query.to_string(),
            page,
            year: options.year.clone(),
            kind: options.kind,
            sort: options.sort,
            direction: options.direction,
        }
    }
}

/// Unbounded in-memory cache of successful responses. No eviction: entries
/// live as long as the owning client.
#[derive(Debug, Default)]
pub struct ResponseCache {
    searches: HashMap<SearchKey, SearchOutcome>,
    details: HashMap<String, MovieDetail>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self, key: &SearchKey) -> Option<&SearchOutcome> {
        self.searches.get(key)
    }

    pub fn insert_search(&mut self, key: SearchKey, outcome: SearchOutcome) {
        self.searches.insert(key, outcome);
    }

    pub fn detail(&self, id: &str) -> Option<&MovieDetail> {
        self.details.get(id)
    }

    pub fn insert_detail(&mut self, id: String, detail: MovieDetail) {
        self.details.insert(id, detail);
    }

    /// Number of cached entries across both maps.
    pub fn len(&self) -> usize {
        self.searches.len() + self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.searches.clear();
        self.details.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_partitions_search_key() {
        let plain = SearchKey::new("batman", 1, &SearchOptions::default());
        let sorted = SearchKey::new(
            "batman",
            1,
            &SearchOptions {
                sort: Some(SortField::Year),
                ..Default::default()
            },
        );
        assert_ne!(plain, sorted);

        let mut cache = ResponseCache::new();
        cache.insert_search(
            plain.clone(),
            SearchOutcome::Found {
                movies: vec![],
                total_results: "0".into(),
            },
        );
        assert!(cache.search(&plain).is_some());
        assert!(cache.search(&sorted).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
