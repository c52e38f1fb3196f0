//! Film detail loading: the film and its reviews with their authors.

use futures::future::join_all;
use tracing::instrument;

use super::api::LocalFilmApi;
use super::error::Result;
use super::types::{Film, Review, ReviewWithUser};

/// Loads a film, logging and swallowing any failure.
///
/// Returns `None` for an empty id without sending a request.
#[instrument(skip_all)]
pub async fn load_film(api: &(impl LocalFilmApi + Sync), id: &str) -> Option<Film> {
    if id.is_empty() {
        return None;
    }
    match api.get_film(id).await {
        Ok(film) => Some(film),
        Err(err) => {
            tracing::debug!(film_id = id, error = %err, "film not loaded");
            None
        }
    }
}

/// Loads a film's reviews and their authors, newest first.
///
/// Authors are fetched concurrently. A review whose author cannot be
/// loaded is kept with `user: None`.
///
/// # Errors
///
/// Returns an error if the reviews themselves cannot be fetched.
#[instrument(skip_all)]
pub async fn load_reviews_with_users(
    api: &(impl LocalFilmApi + Sync),
    film_id: &str,
) -> Result<Vec<ReviewWithUser>> {
    let reviews = api.get_reviews(Some(film_id)).await?;

    let mut joined = join_all(reviews.into_iter().map(|review| join_user(api, review))).await;
    joined.sort_by(|a, b| b.review.timestamp.cmp(&a.review.timestamp));

    Ok(joined)
}

async fn join_user(api: &(impl LocalFilmApi + Sync), review: Review) -> ReviewWithUser {
    let user = match api.get_user(&review.user_id).await {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::warn!(user_id = %review.user_id, error = %err, "failed to fetch review author");
            None
        }
    };
    ReviewWithUser { review, user }
}

/// A film with its reviews, as shown on the detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmDetail {
    /// Requested film ID.
    pub film_id: String,
    /// The film, if it could be loaded.
    pub film: Option<Film>,
    /// Reviews with authors, newest first.
    pub reviews: Vec<ReviewWithUser>,
}

impl FilmDetail {
    /// Loads the film and its reviews.
    ///
    /// Failures leave `film` as `None` or `reviews` empty.
    pub async fn load(api: &(impl LocalFilmApi + Sync), film_id: &str) -> Self {
        let mut detail = Self {
            film_id: String::from(film_id),
            film: None,
            reviews: Vec::new(),
        };
        detail.film = load_film(api, film_id).await;
        if !film_id.is_empty() {
            detail.reload_reviews(api).await;
        }
        detail
    }

    /// Reloads reviews and the film after a review was submitted.
    ///
    /// A film that fails to reload keeps its previous value.
    pub async fn reload(&mut self, api: &(impl LocalFilmApi + Sync)) {
        self.reload_reviews(api).await;
        match api.get_film(&self.film_id).await {
            Ok(film) => self.film = Some(film),
            Err(err) => {
                tracing::warn!(film_id = %self.film_id, error = %err, "failed to fetch updated film");
            }
        }
    }

    async fn reload_reviews(&mut self, api: &(impl LocalFilmApi + Sync)) {
        match load_reviews_with_users(api, &self.film_id).await {
            Ok(reviews) => self.reviews = reviews,
            Err(err) => {
                tracing::warn!(film_id = %self.film_id, error = %err, "failed to fetch reviews");
            }
        }
    }
}
