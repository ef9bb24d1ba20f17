use serde::Deserialize;

use crate::traits::{
    DetailOutcome, MediaKind, MovieDetail, MovieSummary, SearchOutcome, NOT_AVAILABLE,
};

/// Value of the `Response` field on success. Anything else is a failure.
const RESPONSE_TRUE: &str = "True";

// ── Search responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Search", default)]
    pub search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

// ── Detail responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbDetailResponse {
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default)]
    pub metascore: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: Option<String>,
}

// ── Conversions to shared trait types ───────────────────────────

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn failure_reason(error: Option<String>, fallback: &str) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl OmdbSearchItem {
    /// `None` for kinds outside movie/series/episode (e.g. `game`).
    pub fn into_summary(self) -> Option<MovieSummary> {
        let kind = self.kind.as_deref().and_then(MediaKind::parse);
        let Some(kind) = kind else {
            tracing::debug!(id = %self.imdb_id, kind = ?self.kind, "Skipping unsupported media type");
            return None;
        };
        Some(MovieSummary {
            id: self.imdb_id,
            title: self.title,
            year: or_na(self.year),
            kind,
            poster: or_na(self.poster),
        })
    }
}

impl OmdbSearchResponse {
    /// Items of unsupported kinds are dropped from the page, but
    /// `total_results` stays as the service reported it. The count spans
    /// every page of the result set, so it cannot be corrected from one
    /// page, and pagination must keep following the service's numbering.
    pub fn into_outcome(self) -> SearchOutcome {
        if self.response != RESPONSE_TRUE {
            return SearchOutcome::Failed {
                reason: failure_reason(self.error, "No movies found"),
            };
        }
        SearchOutcome::Found {
            movies: self
                .search
                .unwrap_or_default()
                .into_iter()
                .filter_map(OmdbSearchItem::into_summary)
                .collect(),
            total_results: self.total_results.unwrap_or_else(|| "0".to_string()),
        }
    }
}

impl OmdbDetailResponse {
    pub fn into_outcome(self) -> DetailOutcome {
        if self.response != RESPONSE_TRUE {
            return DetailOutcome::Failed {
                reason: failure_reason(self.error, "Movie details not found"),
            };
        }
        let (Some(id), Some(title)) = (self.imdb_id, self.title) else {
            return DetailOutcome::Failed {
                reason: "Movie details not found".into(),
            };
        };
        // Detail lookups by id can land on any kind; treat unknown ones as movies
        // so the record is still viewable.
        let kind = self
            .kind
            .as_deref()
            .and_then(MediaKind::parse)
            .unwrap_or(MediaKind::Movie);

        DetailOutcome::Found(Box::new(MovieDetail {
            summary: MovieSummary {
                id,
                title,
                year: or_na(self.year),
                kind,
                poster: or_na(self.poster),
            },
            rated: or_na(self.rated),
            released: or_na(self.released),
            runtime: or_na(self.runtime),
            genre: or_na(self.genre),
            director: or_na(self.director),
            writer: or_na(self.writer),
            actors: or_na(self.actors),
            plot: or_na(self.plot),
            language: or_na(self.language),
            country: or_na(self.country),
            awards: or_na(self.awards),
            metascore: or_na(self.metascore),
            imdb_rating: or_na(self.imdb_rating),
            imdb_votes: or_na(self.imdb_votes),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_response() {
        let json = r#"{
            "Search": [
                {
                    "Title": "Batman Begins",
                    "Year": "2005",
                    "imdbID": "tt0372784",
                    "Type": "movie",
                    "Poster": "https://m.media-amazon.com/images/M/batman.jpg"
                },
                {
                    "Title": "Batman: The Animated Series",
                    "Year": "1992–1995",
                    "imdbID": "tt0103359",
                    "Type": "series",
                    "Poster": "N/A"
                },
                {
                    "Title": "Batman: Arkham City",
                    "Year": "2011",
                    "imdbID": "tt1568322",
                    "Type": "game",
                    "Poster": "N/A"
                }
            ],
            "totalResults": "599",
            "Response": "True"
        }"#;

        let resp: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        let SearchOutcome::Found {
            movies,
            total_results,
        } = resp.into_outcome()
        else {
            panic!("expected success");
        };
        assert_eq!(total_results, "599");
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, "tt0372784");
        assert_eq!(movies[1].kind, MediaKind::Series);
        assert_eq!(movies[1].year, "1992–1995");
        assert!(movies[1].poster_url().is_none());
    }

    #[test]
    fn test_skipped_kinds_keep_reported_total() {
        let json = r#"{
            "Search": [
                {"Title": "Tetris", "Year": "1984", "imdbID": "tt0000001", "Type": "game", "Poster": "N/A"},
                {"Title": "Tetris", "Year": "2023", "imdbID": "tt12758060", "Type": "movie", "Poster": "N/A"}
            ],
            "totalResults": "12",
            "Response": "True"
        }"#;

        let resp: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        let SearchOutcome::Found {
            movies,
            total_results,
        } = resp.into_outcome()
        else {
            panic!("expected success");
        };
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, "tt12758060");
        assert_eq!(total_results, "12");
    }

    #[test]
    fn test_false_response_is_failure() {
        let json = r#"{"Response":"False","Error":"Movie not found!"}"#;
        let resp: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_outcome(),
            SearchOutcome::Failed {
                reason: "Movie not found!".into()
            }
        );

        let json = r#"{"Response":"False"}"#;
        let resp: OmdbSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_outcome(),
            SearchOutcome::Failed {
                reason: "No movies found".into()
            }
        );
    }

    #[test]
    fn test_deserialize_detail_response() {
        let json = r#"{
            "Title": "Inception",
            "Year": "2010",
            "Rated": "PG-13",
            "Released": "16 Jul 2010",
            "Runtime": "148 min",
            "Genre": "Action, Adventure, Sci-Fi",
            "Director": "Christopher Nolan",
            "Writer": "Christopher Nolan",
            "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page",
            "Plot": "A thief who steals corporate secrets through dream-sharing technology...",
            "Language": "English, Japanese, French",
            "Country": "United States, United Kingdom",
            "Awards": "N/A",
            "Poster": "https://m.media-amazon.com/images/M/inception.jpg",
            "Ratings": [{"Source": "Internet Movie Database", "Value": "8.8/10"}],
            "Metascore": "74",
            "imdbRating": "8.8",
            "imdbVotes": "2,500,000",
            "imdbID": "tt1375666",
            "Type": "movie",
            "Response": "True"
        }"#;

        let resp: OmdbDetailResponse = serde_json::from_str(json).unwrap();
        let DetailOutcome::Found(detail) = resp.into_outcome() else {
            panic!("expected success");
        };
        assert_eq!(detail.summary.id, "tt1375666");
        assert_eq!(detail.director, "Christopher Nolan");
        assert_eq!(detail.awards, NOT_AVAILABLE);
        assert_eq!(detail.imdb_rating, "8.8");
    }

    #[test]
    fn test_detail_failure_keeps_reason() {
        let json = r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
        let resp: OmdbDetailResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.into_outcome(),
            DetailOutcome::Failed {
                reason: "Incorrect IMDb ID.".into()
            }
        );
    }
}
