//! Film rating API client module.
//!
//! Talks to the film rating REST backend (`/films`, `/reviews`, `/users`)
//! and keeps the client-side state derived from it.

mod api;
mod browser;
mod client;
mod detail;
mod error;
#[cfg(test)]
mod fake;
mod params;
mod rating;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{FilmApi, LocalFilmApi};
#[allow(clippy::module_name_repetitions)]
pub use browser::{FetchOptions, FilmBrowser, Pagination};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_BASE_URL, FilmClient, FilmClientBuilder, backoff_delay};
#[allow(clippy::module_name_repetitions)]
pub use detail::{FilmDetail, load_film, load_reviews_with_users};
pub use error::{ApiError, Result};
pub use params::{DEFAULT_PAGE_SIZE, FilmsParams, reviews_endpoint, users_by_name_endpoint};
pub use rating::{
    MAX_SCORE, MIN_SCORE, RatingSummary, ReviewDraft, SubmittedReview, calculate_average_rating,
    refresh_film_rating, round_to_one_decimal, submit_review,
};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    Film, FilmsPage, NewReview, RatingUpdate, Review, ReviewPatch, ReviewWithUser, User,
    UserSession,
};
pub use util::{
    filter_films_by_genre, format_date, generate_review_id, search_films, truncate_text,
    unique_genres,
};
