//! Rating aggregation and review submission.

use tracing::instrument;

use super::api::LocalFilmApi;
use super::error::{ApiError, Result};
use super::types::{Film, NewReview, RatingUpdate, Review};

/// Lowest accepted star score.
pub const MIN_SCORE: u8 = 1;

/// Highest accepted star score.
pub const MAX_SCORE: u8 = 5;

/// Mean score of `reviews`, or `0.0` when there are none.
#[must_use]
pub fn calculate_average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.score)).sum();
    let count = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
    f64::from(total) / f64::from(count)
}

/// Rounds to one decimal place, halves away from zero.
#[must_use]
pub fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate rating fields of a film.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Number of reviews.
    pub count: u32,
    /// Sum of all scores.
    pub total: u32,
    /// Mean score rounded to one decimal.
    pub average: f64,
}

impl RatingSummary {
    /// Computes the summary of a film's reviews.
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = u32::try_from(reviews.len()).unwrap_or(u32::MAX);
        let total = reviews
            .iter()
            .fold(0u32, |acc, r| acc.saturating_add(u32::from(r.score)));
        Self {
            count,
            total,
            average: round_to_one_decimal(calculate_average_rating(reviews)),
        }
    }

    /// Body for `PATCH /films/:id`.
    #[must_use]
    pub const fn to_update(&self) -> RatingUpdate {
        RatingUpdate {
            rating_count: self.count,
            total_rating: self.total,
            average_rating: self.average,
        }
    }
}

/// A review as entered by the user, before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Film being rated.
    pub film_id: String,
    /// Star score.
    pub score: u8,
    /// Comment text.
    pub comment: String,
}

impl ReviewDraft {
    /// Checks the score range and that the comment is not blank.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.film_id.trim().is_empty() {
            return Err(ApiError::Invalid(String::from("film id is required")));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(ApiError::Invalid(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        if self.comment.trim().is_empty() {
            return Err(ApiError::Invalid(String::from("please enter a comment")));
        }
        Ok(())
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReview {
    /// The stored review.
    pub review: Review,
    /// Aggregate written to the film.
    pub summary: RatingSummary,
    /// The film after the update.
    pub film: Film,
}

/// Creates a review and writes the film's new aggregate rating.
///
/// The aggregate is recomputed from every review of the film, so the
/// result reflects reviews submitted by others in the meantime.
///
/// # Errors
///
/// - The draft is invalid or `user_id` is empty (`ApiError::Invalid`).
/// - Creating the review, reading the reviews or updating the film fails.
#[instrument(skip_all)]
pub async fn submit_review(
    api: &(impl LocalFilmApi + Sync),
    user_id: &str,
    draft: &ReviewDraft,
) -> Result<SubmittedReview> {
    if user_id.trim().is_empty() {
        return Err(ApiError::Invalid(String::from("please log in first")));
    }
    draft.validate()?;

    let new_review = NewReview {
        user_id: String::from(user_id),
        film_id: draft.film_id.clone(),
        score: draft.score,
        comment: String::from(draft.comment.trim()),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    let review = api.create_review(&new_review).await?;
    tracing::debug!(review_id = %review.id, film_id = %draft.film_id, "review created");

    let (summary, film) = refresh_film_rating(api, &draft.film_id).await?;

    Ok(SubmittedReview {
        review,
        summary,
        film,
    })
}

/// Recomputes a film's aggregate rating from its current reviews.
///
/// # Errors
///
/// Returns an error if reading the reviews or updating the film fails.
#[instrument(skip_all)]
pub async fn refresh_film_rating(
    api: &(impl LocalFilmApi + Sync),
    film_id: &str,
) -> Result<(RatingSummary, Film)> {
    let reviews = api.get_reviews(Some(film_id)).await?;
    let summary = RatingSummary::from_reviews(&reviews);
    tracing::debug!(
        film_id,
        count = summary.count,
        total = summary.total,
        average = summary.average,
        "film rating recomputed"
    );
    let film = api.update_film_rating(film_id, &summary.to_update()).await?;
    Ok((summary, film))
}
