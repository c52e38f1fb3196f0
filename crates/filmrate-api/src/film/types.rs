//! Film API records.

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts an identifier sent either as a JSON string or as an integer.
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// --- Films ---

/// A film with its aggregate rating.
///
/// Decoding accepts the legacy catalog names (`movieName`, `des`, `sort`,
/// `publichTime`, `commentCount`, `totalCommentNum`, `fraction`). A record
/// may carry both spellings of a field; the camelCase one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFilm")]
pub struct Film {
    /// Film ID.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Genre names.
    pub genre: Vec<String>,
    /// Release date (epoch milliseconds).
    pub release_date: i64,
    /// Number of reviews.
    pub rating_count: u32,
    /// Sum of all review scores.
    pub total_rating: u32,
    /// Mean score, rounded to one decimal.
    pub average_rating: f64,
    /// Poster image URL.
    pub poster_url: String,
}

/// Wire form of [`Film`] with both field spellings kept apart.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilm {
    #[serde(deserialize_with = "de_id")]
    id: String,
    title: Option<String>,
    movie_name: Option<String>,
    description: Option<String>,
    des: Option<String>,
    genre: Option<Vec<String>>,
    sort: Option<Vec<String>>,
    release_date: Option<i64>,
    publich_time: Option<i64>,
    rating_count: Option<u32>,
    comment_count: Option<u32>,
    total_rating: Option<u32>,
    total_comment_num: Option<u32>,
    average_rating: Option<f64>,
    fraction: Option<f64>,
    poster_url: Option<String>,
}

impl From<RawFilm> for Film {
    fn from(raw: RawFilm) -> Self {
        Self {
            id: raw.id,
            title: raw.title.or(raw.movie_name).unwrap_or_default(),
            description: raw.description.or(raw.des).unwrap_or_default(),
            genre: raw.genre.or(raw.sort).unwrap_or_default(),
            release_date: raw.release_date.or(raw.publich_time).unwrap_or_default(),
            rating_count: raw.rating_count.or(raw.comment_count).unwrap_or_default(),
            total_rating: raw.total_rating.or(raw.total_comment_num).unwrap_or_default(),
            average_rating: raw.average_rating.or(raw.fraction).unwrap_or_default(),
            poster_url: raw.poster_url.unwrap_or_default(),
        }
    }
}

/// Body of `PATCH /films/:id` after a rating change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUpdate {
    /// Number of reviews.
    pub rating_count: u32,
    /// Sum of all review scores.
    pub total_rating: u32,
    /// Mean score, rounded to one decimal.
    pub average_rating: f64,
}

/// One page of films with paging totals.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmsPage {
    /// Films on this page.
    pub data: Vec<Film>,
    /// Total number of matching films.
    pub total: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u32,
    /// Page number of `data` (1-based).
    pub current_page: u32,
}

// --- Reviews ---

/// A user's score and comment for a film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review ID.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Author user ID.
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
    /// Reviewed film ID.
    #[serde(deserialize_with = "de_id")]
    pub film_id: String,
    /// Star score (1-5).
    pub score: u8,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Creation time (epoch milliseconds).
    #[serde(default)]
    pub timestamp: i64,
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Author user ID.
    pub user_id: String,
    /// Reviewed film ID.
    pub film_id: String,
    /// Star score (1-5).
    pub score: u8,
    /// Free-text comment.
    pub comment: String,
    /// Creation time (epoch milliseconds).
    pub timestamp: i64,
}

/// Body of `PATCH /reviews/:id`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    /// New film ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub film_id: Option<String>,
    /// New score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// New comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// New timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// A review together with its author, if the author could be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewWithUser {
    /// The review.
    pub review: Review,
    /// Author record.
    pub user: Option<User>,
}

// --- Users ---

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Login name.
    pub username: String,
    /// Plain-text password, only used to check a login.
    #[serde(default)]
    pub password: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

/// The logged-in user without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// User ID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
}

impl From<User> for UserSession {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
