//! Film list and display helpers.

use std::collections::BTreeSet;

use chrono::DateTime;

use super::types::Film;

/// Formats epoch milliseconds as a long UTC date, e.g. `January 1, 2023`.
///
/// Returns `"-"` when the timestamp is out of range.
#[must_use]
pub fn format_date(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || String::from("-"),
        |date| date.format("%B %-d, %Y").to_string(),
    )
}

/// Films tagged with `genre`; an empty genre keeps every film.
#[must_use]
pub fn filter_films_by_genre<'a>(films: &'a [Film], genre: &str) -> Vec<&'a Film> {
    films
        .iter()
        .filter(|film| genre.is_empty() || film.genre.iter().any(|g| g == genre))
        .collect()
}

/// Case-insensitive search over title, description and genres.
///
/// A blank query keeps every film.
#[must_use]
pub fn search_films<'a>(films: &'a [Film], query: &str) -> Vec<&'a Film> {
    if query.trim().is_empty() {
        return films.iter().collect();
    }
    let needle = query.to_lowercase();
    films
        .iter()
        .filter(|film| {
            film.title.to_lowercase().contains(&needle)
                || film.description.to_lowercase().contains(&needle)
                || film.genre.iter().any(|g| g.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Review ID derived from its author and film.
#[must_use]
pub fn generate_review_id(user_id: &str, film_id: &str) -> String {
    format!("{user_id}-{film_id}")
}

/// Every genre used by `films`, sorted and deduplicated.
#[must_use]
pub fn unique_genres(films: &[Film]) -> Vec<String> {
    films
        .iter()
        .flat_map(|film| film.genre.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Cuts `text` to `max_chars` characters and appends `...` when it was longer.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return String::from(text);
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::fake::film;

    fn films() -> Vec<Film> {
        vec![
            film("1", "The Matrix", &["Action", "Sci-Fi"]),
            film("2", "Amélie", &["Comedy", "Romance"]),
            film("3", "Heat", &["Action", "Crime"]),
        ]
    }

    #[test]
    fn test_format_date() {
        // Arrange & Act & Assert
        assert_eq!(format_date(1_672_531_200_000), "January 1, 2023");
        assert_eq!(format_date(1_006_041_600_000), "November 18, 2001");
    }

    #[test]
    fn test_format_date_out_of_range() {
        // Arrange & Act & Assert
        assert_eq!(format_date(i64::MAX), "-");
    }

    #[test]
    fn test_filter_films_by_genre() {
        // Arrange
        let films = films();

        // Act
        let action = filter_films_by_genre(&films, "Action");
        let all = filter_films_by_genre(&films, "");

        // Assert
        let ids: Vec<&str> = action.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_search_films_is_case_insensitive() {
        // Arrange
        let films = films();

        // Act
        let by_title = search_films(&films, "matrix");
        let by_genre = search_films(&films, "ROMANCE");
        let by_description = search_films(&films, "about heat");

        // Assert
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "1");
        assert_eq!(by_genre[0].id, "2");
        assert_eq!(by_description[0].id, "3");
    }

    #[test]
    fn test_search_films_blank_query_keeps_all() {
        // Arrange
        let films = films();

        // Act & Assert
        assert_eq!(search_films(&films, "   ").len(), 3);
    }

    #[test]
    fn test_generate_review_id() {
        // Arrange & Act & Assert
        assert_eq!(generate_review_id("1", "2"), "1-2");
    }

    #[test]
    fn test_unique_genres_sorted() {
        // Arrange
        let films = films();

        // Act
        let genres = unique_genres(&films);

        // Assert
        assert_eq!(
            genres,
            vec!["Action", "Comedy", "Crime", "Romance", "Sci-Fi"]
        );
    }

    #[test]
    fn test_truncate_text() {
        // Arrange & Act & Assert
        assert_eq!(truncate_text("Hello World", 5), "Hello...");
        assert_eq!(truncate_text("Hello", 5), "Hello");
        assert_eq!(truncate_text("Amélie Poulain", 3), "Amé...");
    }
}
