//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use marquee_api::{present, MovieDetail, MovieSummary};
use marquee_core::view::{Pagination, Tab};
use marquee_runtime::{SearchState, SearchStatus};

const FAVORITE_MARK: char = '★';
const LATER_MARK: char = '◷';

pub fn imdb_url(id: &str) -> String {
    format!("https://www.imdb.com/title/{id}/")
}

/// One numbered result row with collection markers.
pub fn movie_line(index: usize, movie: &MovieSummary, favorite: bool, later: bool) -> String {
    let fav = if favorite { FAVORITE_MARK } else { ' ' };
    let lat = if later { LATER_MARK } else { ' ' };
    let year = present(&movie.year).unwrap_or("?");
    format!(
        "{index:>3}. {fav}{lat} {} ({year}) [{}] {}",
        movie.title, movie.kind, movie.id
    )
}

/// Numbered listing. `marks` reports (favorite, watch-later) for an id.
pub fn movie_list(movies: &[MovieSummary], marks: impl Fn(&str) -> (bool, bool)) -> String {
    let mut out = String::new();
    for (i, movie) in movies.iter().enumerate() {
        let (favorite, later) = marks(&movie.id);
        let _ = writeln!(out, "{}", movie_line(i + 1, movie, favorite, later));
    }
    out
}

/// `‹ 1 [2] 3 4 5 ›  page 2 of 9`
pub fn pagination_line(pagination: &Pagination) -> String {
    let mut out = String::new();
    out.push(if pagination.has_previous() { '‹' } else { ' ' });
    for page in pagination.visible_pages() {
        if page == pagination.current {
            let _ = write!(out, " [{page}]");
        } else {
            let _ = write!(out, " {page}");
        }
    }
    out.push(' ');
    out.push(if pagination.has_next() { '›' } else { ' ' });
    let _ = write!(
        out,
        "  page {} of {}",
        pagination.current, pagination.total_pages
    );
    out
}

/// Heading for a tab's listing.
pub fn tab_heading(tab: Tab, shown: usize, state: &SearchState) -> String {
    match tab {
        Tab::Search if state.total_count > 0 => {
            format!(
                "{tab}: \"{}\" ({} results, showing {shown})",
                state.query, state.total_count
            )
        }
        Tab::Search => format!("{tab}: \"{}\"", state.query),
        _ => format!("{tab} ({shown})"),
    }
}

/// Status line for a search that has not produced a listing.
pub fn search_status(state: &SearchState) -> Option<String> {
    match state.status {
        SearchStatus::Idle => Some("Type a title to search.".to_string()),
        SearchStatus::Loading => Some(format!(
            "Searching for \"{}\" (page {})...",
            state.query, state.page
        )),
        SearchStatus::Error => Some(
            state
                .error
                .clone()
                .unwrap_or_else(|| "No movies found".to_string()),
        ),
        SearchStatus::Ready => None,
    }
}

/// Full detail view. Fields the service reported as `N/A` are left out.
pub fn detail(movie: &MovieDetail, favorite: bool, later: bool) -> String {
    let mut out = String::new();
    let summary = &movie.summary;
    let _ = writeln!(out, "{} ({})", summary.title, summary.year);

    let facts: Vec<&str> = [&movie.rated, &movie.runtime, &movie.genre]
        .into_iter()
        .filter_map(|s| present(s))
        .collect();
    if !facts.is_empty() {
        let _ = writeln!(out, "{}", facts.join(" · "));
    }

    let mut marks = Vec::new();
    if favorite {
        marks.push(format!("{FAVORITE_MARK} favorite"));
    }
    if later {
        marks.push(format!("{LATER_MARK} watch later"));
    }
    if !marks.is_empty() {
        let _ = writeln!(out, "{}", marks.join("  "));
    }

    if let Some(plot) = present(&movie.plot) {
        let _ = writeln!(out, "\n{plot}\n");
    }

    let rows = [
        ("Director", &movie.director),
        ("Writer", &movie.writer),
        ("Actors", &movie.actors),
        ("Released", &movie.released),
        ("Language", &movie.language),
        ("Country", &movie.country),
        ("Awards", &movie.awards),
    ];
    for (label, value) in rows {
        if let Some(value) = present(value) {
            let _ = writeln!(out, "{label:<9} {value}");
        }
    }

    let mut ratings = Vec::new();
    if let Some(rating) = present(&movie.imdb_rating) {
        match present(&movie.imdb_votes) {
            Some(votes) => ratings.push(format!("IMDb {rating}/10 ({votes} votes)")),
            None => ratings.push(format!("IMDb {rating}/10")),
        }
    }
    if let Some(score) = present(&movie.metascore) {
        ratings.push(format!("Metascore {score}"));
    }
    if !ratings.is_empty() {
        let _ = writeln!(out, "{:<9} {}", "Ratings", ratings.join(", "));
    }

    if let Some(poster) = summary.poster_url() {
        let _ = writeln!(out, "{:<9} {poster}", "Poster");
    }
    let _ = write!(out, "{:<9} {}", "IMDb", imdb_url(&summary.id));
    out
}
