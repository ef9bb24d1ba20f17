use std::cmp::Ordering;

use crate::traits::{MovieSummary, SortDirection, SortField};

/// Stable in-place sort. Descending reverses the comparator, so ties keep
/// their original relative order in both directions. Years without digits
/// (`N/A`) sort last either way.
pub fn sort_movies(movies: &mut [MovieSummary], field: SortField, direction: SortDirection) {
    let directed = |ord: Ordering| match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };
    movies.sort_by(|a, b| match field {
        SortField::Year => match (year_key(&a.year), year_key(&b.year)) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
    });
}

/// Leading digits of a year string: `"2010–2015"` → 2010, `"N/A"` → `None`.
pub fn year_key(year: &str) -> Option<u32> {
    let trimmed = year.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MediaKind;

    fn movie(title: &str, year: &str) -> MovieSummary {
        MovieSummary {
            id: format!("tt-{title}"),
            title: title.into(),
            year: year.into(),
            kind: MediaKind::Movie,
            poster: "N/A".into(),
        }
    }

    fn titles(movies: &[MovieSummary]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_title_ascending_and_descending() {
        let mut movies = vec![movie("Zeta", "2001"), movie("Alpha", "2002")];
        sort_movies(&mut movies, SortField::Title, SortDirection::Ascending);
        assert_eq!(titles(&movies), ["Alpha", "Zeta"]);

        sort_movies(&mut movies, SortField::Title, SortDirection::Descending);
        assert_eq!(titles(&movies), ["Zeta", "Alpha"]);
    }

    #[test]
    fn test_year_sort_is_numeric() {
        let mut movies = vec![
            movie("B", "2010–2015"),
            movie("A", "999"),
            movie("C", "1994"),
        ];
        sort_movies(&mut movies, SortField::Year, SortDirection::Ascending);
        assert_eq!(titles(&movies), ["A", "C", "B"]);
    }

    #[test]
    fn test_year_sort_is_stable_on_ties() {
        let mut movies = vec![
            movie("First", "2000"),
            movie("Second", "2000"),
            movie("Older", "1990"),
        ];
        sort_movies(&mut movies, SortField::Year, SortDirection::Descending);
        assert_eq!(titles(&movies), ["First", "Second", "Older"]);
    }

    #[test]
    fn test_unparseable_years_sort_last() {
        let mut movies = vec![movie("Unknown", "N/A"), movie("Known", "2020")];
        sort_movies(&mut movies, SortField::Year, SortDirection::Ascending);
        assert_eq!(titles(&movies), ["Known", "Unknown"]);

        let mut movies = vec![
            movie("Unknown", "N/A"),
            movie("Old", "1950"),
            movie("New", "2020"),
        ];
        sort_movies(&mut movies, SortField::Year, SortDirection::Descending);
        assert_eq!(titles(&movies), ["New", "Old", "Unknown"]);
    }

    #[test]
    fn test_year_key() {
        assert_eq!(year_key("2010"), Some(2010));
        assert_eq!(year_key("2010–2015"), Some(2010));
        assert_eq!(year_key("N/A"), None);
        assert_eq!(year_key(""), None);
    }
}
