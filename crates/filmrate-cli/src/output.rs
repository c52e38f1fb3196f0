//! Tabular output of films, reviews and users.

use filmrate_api::film::{
    Film, FilmDetail, Pagination, RatingSummary, Review, ReviewWithUser, UserSession, format_date,
    truncate_text,
};

/// Longest title shown in the film table.
const TITLE_WIDTH: usize = 40;

/// Longest comment shown in the review table.
const COMMENT_WIDTH: usize = 60;

/// Prints one page of films followed by the paging footer.
pub fn print_films_page(films: &[Film], pagination: Pagination) {
    if films.is_empty() {
        tracing::info!("No films found");
    } else {
        tracing::info!("ID\tRating\tReviews\tReleased\t\tTitle");
        for film in films {
            tracing::info!(
                "{}\t{:.1}\t{}\t{}\t{}",
                film.id,
                film.average_rating,
                film.rating_count,
                format_date(film.release_date),
                truncate_text(&film.title, TITLE_WIDTH),
            );
        }
    }
    tracing::info!(
        "Page {}/{} ({} films, {} per page)",
        pagination.current_page,
        pagination.total_pages,
        pagination.total,
        pagination.page_size,
    );
}

/// Prints a film's details and its reviews.
pub fn print_film_detail(film: &Film, reviews: &[ReviewWithUser]) {
    tracing::info!("{} [{}]", film.title, film.id);
    if !film.genre.is_empty() {
        tracing::info!("Genres: {}", film.genre.join(", "));
    }
    tracing::info!("Released: {}", format_date(film.release_date));
    tracing::info!(
        "Rating: {:.1} / 5 ({} reviews)",
        film.average_rating,
        film.rating_count
    );
    if !film.description.is_empty() {
        tracing::info!("{}", film.description);
    }

    if reviews.is_empty() {
        tracing::info!("No reviews yet");
        return;
    }
    tracing::info!("Reviews ({}):", reviews.len());
    for entry in reviews {
        let author = entry
            .user
            .as_ref()
            .map_or("(unknown user)", |u| u.username.as_str());
        tracing::info!(
            "  {}\t{}\t{}\t{}",
            stars(entry.review.score),
            author,
            format_date(entry.review.timestamp),
            truncate_text(&entry.review.comment, COMMENT_WIDTH),
        );
    }
}

/// Prints a loaded detail view, or a notice when the film is missing.
pub fn print_detail(detail: &FilmDetail) {
    match &detail.film {
        Some(film) => print_film_detail(film, &detail.reviews),
        None => tracing::info!("Film {} not found", detail.film_id),
    }
}

/// Prints reviews as a table.
pub fn print_reviews(reviews: &[Review]) {
    if reviews.is_empty() {
        tracing::info!("No reviews found");
        return;
    }
    tracing::info!("ID\tFilm\tUser\tScore\tDate\t\t\tComment");
    for review in reviews {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            review.id,
            review.film_id,
            review.user_id,
            review.score,
            format_date(review.timestamp),
            truncate_text(&review.comment, COMMENT_WIDTH),
        );
    }
    tracing::info!("Total: {} reviews", reviews.len());
}

/// Prints genre names, one per line.
pub fn print_genres(genres: &[String]) {
    if genres.is_empty() {
        tracing::info!("No genres found");
        return;
    }
    for genre in genres {
        tracing::info!("{}", genre);
    }
    tracing::info!("Total: {} genres", genres.len());
}

/// Prints a film's recomputed rating.
pub fn print_rating_summary(film_id: &str, summary: &RatingSummary) {
    tracing::info!(
        "Film {} now rated {:.1} ({} reviews, {} points)",
        film_id,
        summary.average,
        summary.count,
        summary.total,
    );
}

/// Prints the logged-in user.
pub fn print_session(session: &UserSession) {
    tracing::info!(
        "Logged in as {} <{}> (id {})",
        session.username,
        session.email,
        session.id
    );
}

/// Star bar for a 1-5 score, e.g. `★★★☆☆`.
fn stars(score: u8) -> String {
    let filled = usize::from(score.min(5));
    let empty = 5usize.saturating_sub(filled);
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}
