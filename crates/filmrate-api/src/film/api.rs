//! `FilmApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::Result;
use super::params::FilmsParams;
use super::types::{Film, FilmsPage, NewReview, RatingUpdate, Review, ReviewPatch, User};

/// Film rating API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(FilmApi: Send)]
pub trait LocalFilmApi {
    /// Lists films matching the search, genre and paging parameters.
    ///
    /// # Errors
    ///
    /// Returns the transport, status or decode error unchanged.
    async fn get_films(&self, params: &FilmsParams) -> Result<FilmsPage>;

    /// Fetches a single film.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` on 404, a generic failure otherwise.
    async fn get_film(&self, id: &str) -> Result<Film>;

    /// Checks a username and password against the user list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCredentials` when no user matches.
    async fn login(&self, username: &str, password: &str) -> Result<User>;

    /// Fetches a single user.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn get_user(&self, id: &str) -> Result<User>;

    /// Lists reviews, optionally only those of one film.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn get_reviews(&self, film_id: Option<&str>) -> Result<Vec<Review>>;

    /// Creates a review.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn create_review(&self, review: &NewReview) -> Result<Review>;

    /// Partially updates a review.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review>;

    /// Deletes a review.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn delete_review(&self, id: &str) -> Result<()>;

    /// Writes new aggregate rating fields to a film.
    ///
    /// # Errors
    ///
    /// Returns a generic failure if the request fails.
    async fn update_film_rating(&self, film_id: &str, rating: &RatingUpdate) -> Result<Film>;
}
