//! In-memory `LocalFilmApi` used by workflow tests.

use parking_lot::Mutex;

use super::api::LocalFilmApi;
use super::error::{ApiError, Result};
use super::params::FilmsParams;
use super::types::{Film, FilmsPage, NewReview, RatingUpdate, Review, ReviewPatch, User};

/// Backing records and call log of `FakeFilmApi`.
#[derive(Debug, Default)]
pub struct FakeState {
    pub films: Vec<Film>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
    /// Every `get_films` call, in order.
    pub film_queries: Vec<FilmsParams>,
    /// Every rating update, in order.
    pub rating_updates: Vec<(String, RatingUpdate)>,
    /// When set, `get_films` fails with a 500.
    pub fail_films: bool,
    /// When set, `get_film` fails with a 500.
    pub fail_film: bool,
    /// When set, `create_review` fails with a 500.
    pub fail_create: bool,
    /// Users whose lookup fails.
    pub broken_users: Vec<String>,
    next_review_id: u32,
}

/// In-memory film API.
#[derive(Debug, Default)]
pub struct FakeFilmApi {
    pub state: Mutex<FakeState>,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        status_text: String::from("Internal Server Error"),
    }
}

pub fn film(id: &str, title: &str, genre: &[&str]) -> Film {
    Film {
        id: String::from(id),
        title: String::from(title),
        description: format!("About {title}"),
        genre: genre.iter().map(|g| String::from(*g)).collect(),
        release_date: 1_672_531_200_000,
        rating_count: 0,
        total_rating: 0,
        average_rating: 0.0,
        poster_url: String::new(),
    }
}

pub fn review(id: &str, user_id: &str, film_id: &str, score: u8, timestamp: i64) -> Review {
    Review {
        id: String::from(id),
        user_id: String::from(user_id),
        film_id: String::from(film_id),
        score,
        comment: format!("review {id}"),
        timestamp,
    }
}

pub fn user(id: &str, username: &str) -> User {
    User {
        id: String::from(id),
        username: String::from(username),
        password: String::from("password123"),
        email: format!("{username}@example.com"),
    }
}

impl FakeFilmApi {
    pub fn with_films(films: Vec<Film>) -> Self {
        let api = Self::default();
        api.state.lock().films = films;
        api
    }
}

impl LocalFilmApi for FakeFilmApi {
    async fn get_films(&self, params: &FilmsParams) -> Result<FilmsPage> {
        let mut state = self.state.lock();
        state.film_queries.push(params.clone());
        if state.fail_films {
            return Err(server_error());
        }
        let matching: Vec<Film> = state
            .films
            .iter()
            .filter(|f| {
                params
                    .genre
                    .as_deref()
                    .is_none_or(|g| g.is_empty() || f.genre.iter().any(|fg| fg == g))
            })
            .cloned()
            .collect();
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let size = usize::try_from(params.effective_page_size()).unwrap_or(usize::MAX);
        let skip = usize::try_from(params.effective_page().saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(size);
        let data = matching.into_iter().skip(skip).take(size).collect();
        Ok(FilmsPage::from_response(data, Some(total), params))
    }

    async fn get_film(&self, id: &str) -> Result<Film> {
        let state = self.state.lock();
        if state.fail_film {
            return Err(server_error().during("fetch film details"));
        }
        state
            .films
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(ApiError::NotFound("film"))
    }

    async fn login(&self, username: &str, password: &str) -> Result<User> {
        let state = self.state.lock();
        state
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
            .ok_or(ApiError::InvalidCredentials)
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let state = self.state.lock();
        if state.broken_users.iter().any(|u| u == id) {
            return Err(server_error().during("fetch user"));
        }
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| {
                ApiError::Status {
                    status: 404,
                    status_text: String::from("Not Found"),
                }
                .during("fetch user")
            })
    }

    async fn get_reviews(&self, film_id: Option<&str>) -> Result<Vec<Review>> {
        let state = self.state.lock();
        Ok(state
            .reviews
            .iter()
            .filter(|r| film_id.is_none_or(|id| r.film_id == id))
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(server_error().during("create review"));
        }
        state.next_review_id = state.next_review_id.saturating_add(1);
        let created = Review {
            id: format!("new-{}", state.next_review_id),
            user_id: review.user_id.clone(),
            film_id: review.film_id.clone(),
            score: review.score,
            comment: review.comment.clone(),
            timestamp: review.timestamp,
        };
        state.reviews.push(created.clone());
        Ok(created)
    }

    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review> {
        let mut state = self.state.lock();
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::NotFound("review"))?;
        if let Some(score) = patch.score {
            review.score = score;
        }
        if let Some(comment) = &patch.comment {
            review.comment.clone_from(comment);
        }
        if let Some(timestamp) = patch.timestamp {
            review.timestamp = timestamp;
        }
        Ok(review.clone())
    }

    async fn delete_review(&self, id: &str) -> Result<()> {
        self.state.lock().reviews.retain(|r| r.id != id);
        Ok(())
    }

    async fn update_film_rating(&self, film_id: &str, rating: &RatingUpdate) -> Result<Film> {
        let mut state = self.state.lock();
        state
            .rating_updates
            .push((String::from(film_id), rating.clone()));
        let film = state
            .films
            .iter_mut()
            .find(|f| f.id == film_id)
            .ok_or(ApiError::NotFound("film"))?;
        film.rating_count = rating.rating_count;
        film.total_rating = rating.total_rating;
        film.average_rating = rating.average_rating;
        Ok(film.clone())
    }
}
