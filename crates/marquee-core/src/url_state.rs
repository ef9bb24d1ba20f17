//! Shareable view state as flat query-string pairs.

use marquee_api::{MediaKind, SearchOptions, SortDirection, SortField};
use url::form_urlencoded;

use crate::view::{FilterConfig, Tab};

const KEY_QUERY: &str = "q";
const KEY_PAGE: &str = "page";
const KEY_TAB: &str = "tab";
const KEY_YEAR: &str = "year";
const KEY_TYPE: &str = "type";
const KEY_SORT: &str = "sortBy";
const KEY_ORDER: &str = "sortOrder";

/// Everything needed to reproduce a view from a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub query: String,
    pub page: u32,
    pub tab: Tab,
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            tab: Tab::default(),
            year: None,
            kind: None,
            sort: None,
            direction: SortDirection::default(),
        }
    }
}

impl ViewParams {
    /// Flat key-value pairs, omitting anything at its default.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.query.is_empty() {
            pairs.push((KEY_QUERY, self.query.clone()));
        }
        if self.page > 1 {
            pairs.push((KEY_PAGE, self.page.to_string()));
        }
        if self.tab != Tab::default() {
            pairs.push((KEY_TAB, self.tab.as_str().to_string()));
        }
        if let Some(ref year) = self.year {
            pairs.push((KEY_YEAR, year.clone()));
        }
        if let Some(kind) = self.kind {
            pairs.push((KEY_TYPE, kind.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push((KEY_SORT, sort.as_str().to_string()));
        }
        if self.direction != SortDirection::default() {
            pairs.push((KEY_ORDER, self.direction.as_str().to_string()));
        }
        pairs
    }

    /// Rebuild from pairs. Unknown keys are ignored and invalid values fall
    /// back to their defaults.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                KEY_QUERY => params.query = value.to_string(),
                KEY_PAGE => params.page = value.trim().parse().unwrap_or(1).max(1),
                KEY_TAB => params.tab = Tab::parse(value).unwrap_or_default(),
                KEY_YEAR => params.year = Some(value.trim().to_string()).filter(|y| !y.is_empty()),
                KEY_TYPE => params.kind = MediaKind::parse(value),
                KEY_SORT => params.sort = SortField::parse(value),
                KEY_ORDER => params.direction = SortDirection::parse(value).unwrap_or_default(),
                _ => {}
            }
        }
        params
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// Decode a query string, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            year: self.year.clone(),
            kind: self.kind,
            sort: self.sort,
            direction: self.direction,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        self.filter_config().search_options()
    }

    /// Apply a filter config back onto the params.
    pub fn set_filter(&mut self, config: &FilterConfig) {
        self.year = config.year.clone();
        self.kind = config.kind;
        self.sort = config.sort;
        self.direction = config.direction;
    }
}
