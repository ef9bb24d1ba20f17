//! Tab-scoped view composition: pick the base list for the active tab, then
//! filter and sort it. Everything here is a pure function of its inputs.

use marquee_api::sort::sort_movies;
use marquee_api::{MediaKind, MovieSummary, SearchOptions, SortDirection, SortField};

/// Fixed number of results per remote page.
pub const PAGE_SIZE: u64 = 10;

/// Maximum number of page buttons shown at once.
const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Search,
    Favorites,
    WatchLater,
}

impl Tab {
    pub const ALL: &[Tab] = &[Self::Search, Self::Favorites, Self::WatchLater];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Favorites => "favorites",
            Self::WatchLater => "watchLater",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Some(Self::Search),
            "favorites" | "fav" => Some(Self::Favorites),
            "watchlater" | "watch-later" | "later" => Some(Self::WatchLater),
            _ => None,
        }
    }

    /// Only the search tab is paginated; the collections show in full.
    pub fn is_paginated(self) -> bool {
        self == Self::Search
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search => write!(f, "Search"),
            Self::Favorites => write!(f, "Favorites"),
            Self::WatchLater => write!(f, "Watch Later"),
        }
    }
}

/// Client-side filter and sort applied on top of a tab's base list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Exact match against the year string.
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.kind.is_none() && self.sort.is_none()
    }

    /// The same refinements expressed as remote search options.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            year: self.year.clone(),
            kind: self.kind,
            sort: self.sort,
            direction: self.direction,
        }
    }
}

impl From<&SearchOptions> for FilterConfig {
    fn from(options: &SearchOptions) -> Self {
        Self {
            year: options.year.clone(),
            kind: options.kind,
            sort: options.sort,
            direction: options.direction,
        }
    }
}

/// Filter then stable-sort a list according to `config`.
pub fn apply_filters(movies: &[MovieSummary], config: &FilterConfig) -> Vec<MovieSummary> {
    let mut out: Vec<MovieSummary> = movies
        .iter()
        .filter(|m| config.year.as_deref().map_or(true, |y| m.year == y))
        .filter(|m| config.kind.map_or(true, |k| m.kind == k))
        .cloned()
        .collect();

    if let Some(field) = config.sort {
        sort_movies(&mut out, field, config.direction);
    }
    out
}

/// Derive the list to display for `tab`. The favorites and watch-later tabs
/// show their own collections regardless of the current search results.
pub fn compose(
    tab: Tab,
    search_results: &[MovieSummary],
    favorites: &[MovieSummary],
    watch_later: &[MovieSummary],
    config: &FilterConfig,
) -> Vec<MovieSummary> {
    let base = match tab {
        Tab::Search => search_results,
        Tab::Favorites => favorites,
        Tab::WatchLater => watch_later,
    };
    apply_filters(base, config)
}

/// `ceil(total / PAGE_SIZE)`.
pub fn page_count(total_results: u64) -> u32 {
    total_results.div_ceil(PAGE_SIZE).try_into().unwrap_or(u32::MAX)
}

/// Pagination control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// `None` for unpaginated tabs and when there is nothing to page through.
    pub fn for_tab(tab: Tab, current: u32, total_results: u64) -> Option<Self> {
        if !tab.is_paginated() {
            return None;
        }
        let total_pages = page_count(total_results);
        if total_pages == 0 {
            return None;
        }
        Some(Self {
            current: current.clamp(1, total_pages),
            total_pages,
        })
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    /// Window of at most five page numbers around the current page,
    /// shifted to stay within `1..=total_pages`.
    pub fn visible_pages(&self) -> std::ops::RangeInclusive<u32> {
        if self.total_pages <= MAX_VISIBLE_PAGES {
            return 1..=self.total_pages;
        }
        let half = MAX_VISIBLE_PAGES / 2;
        let mut start = self.current.saturating_sub(half).max(1);
        let end = (start + MAX_VISIBLE_PAGES - 1).min(self.total_pages);
        if end - start + 1 < MAX_VISIBLE_PAGES {
            start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
        }
        start..=end
    }
}
