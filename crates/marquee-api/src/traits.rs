//! Trait definitions and shared types for movie metadata services.
//!
//! The OMDb backend implements [`MetadataService`]; the cached
//! [`MetadataClient`](crate::client::MetadataClient) and everything above it
//! only ever see these types.

use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel the remote service uses for "value absent".
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns `None` when `value` is the [`NOT_AVAILABLE`] sentinel.
pub fn present(value: &str) -> Option<&str> {
    if value == NOT_AVAILABLE {
        None
    } else {
        Some(value)
    }
}

/// A raw metadata backend (no caching, no sorting).
pub trait MetadataService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search titles by name, one page at a time.
    fn search_titles(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<SearchOutcome, Self::Error>> + Send;

    /// Look up a single title by its identifier.
    fn title_details(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<DetailOutcome, Self::Error>> + Send;
}

/// Parameters sent to the backend for a title search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub page: u32,
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
}

/// The kind of media a title refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Episode,
}

impl MediaKind {
    pub const ALL: &[MediaKind] = &[Self::Movie, Self::Series, Self::Episode];

    /// Wire representation (`movie`, `series`, `episode`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Episode => "episode",
        }
    }

    /// Case-insensitive parse; `None` for anything outside the three kinds.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown media type: {s}"))
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search result card. Serialized with the remote field names so stored
/// copies mirror what the service returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year as reported; may be a range like `2010–2015` or `N/A`.
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Type")]
    pub kind: MediaKind,
    #[serde(rename = "Poster")]
    pub poster: String,
}

impl MovieSummary {
    /// Poster URL, unless the service reported none.
    pub fn poster_url(&self) -> Option<&str> {
        present(&self.poster)
    }
}

/// Full record for a single title. Text fields keep the `N/A` sentinel verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub summary: MovieSummary,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub metascore: String,
    pub imdb_rating: String,
    pub imdb_votes: String,
}

/// Outcome of a title search. The service reports logical failure in the
/// body, so a successful HTTP exchange can still be `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        movies: Vec<MovieSummary>,
        /// Total match count as the service reported it.
        total_results: String,
    },
    Failed {
        reason: String,
    },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Outcome of a detail lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Found(Box<MovieDetail>),
    Failed { reason: String },
}

/// Field used to order results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Year,
    Title,
}

impl SortField {
    pub const ALL: &[SortField] = &[Self::Year, Self::Title];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Title => "title",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Some(Self::Year),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown sort field: {s}"))
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown sort order: {s}"))
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional search refinements. Year and kind go to the service; sorting is
/// applied client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse_is_case_insensitive() {
        assert_eq!(MediaKind::parse("Movie"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::parse(" SERIES "), Some(MediaKind::Series));
        assert_eq!(MediaKind::parse("game"), None);
    }

    #[test]
    fn test_present_hides_sentinel() {
        assert_eq!(present("N/A"), None);
        assert_eq!(present(""), Some(""));
        assert_eq!(present("Christopher Nolan"), Some("Christopher Nolan"));
    }

    #[test]
    fn test_summary_serializes_with_remote_names() {
        let movie = MovieSummary {
            id: "tt1375666".into(),
            title: "Inception".into(),
            year: "2010".into(),
            kind: MediaKind::Movie,
            poster: "N/A".into(),
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["imdbID"], "tt1375666");
        assert_eq!(json["Type"], "movie");
        assert!(movie.poster_url().is_none());
    }
}
