//! `FilmClient` - film rating API client implementation.

use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::instrument;
use url::Url;

use super::api::LocalFilmApi;
use super::error::{ApiError, Result};
use super::params::{FilmsParams, reviews_endpoint, users_by_name_endpoint};
use super::types::{Film, FilmsPage, NewReview, RatingUpdate, Review, ReviewPatch, User};
use crate::cache::{CacheStats, DEFAULT_TTL, TtlCache};

/// Default base URL of the film API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of retries after the first failed attempt.
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

/// Default delay before the first retry; doubles on every further retry.
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Response header carrying the total number of matching items.
const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Cached GET response.
#[derive(Debug, Clone)]
struct CachedResponse {
    /// Decoded JSON body.
    body: serde_json::Value,
    /// `X-Total-Count` header value.
    total_count: Option<u64>,
}

/// Decoded response body with its paging header.
#[derive(Debug)]
struct Fetched<T> {
    /// Decoded body.
    data: T,
    /// `X-Total-Count` header value.
    total_count: Option<u64>,
}

/// Film rating API client.
///
/// GET responses are cached in memory; successful mutations drop the
/// cached responses they affect.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FilmClient {
    /// HTTP client (reqwest, gzip enabled, request timeout applied).
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Number of retries after a transport failure.
    retry_attempts: u32,
    /// Delay before the first retry.
    retry_base_delay: Duration,
    /// Response cache keyed by method, endpoint and body.
    cache: TtlCache<CachedResponse>,
}

/// Builder for `FilmClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FilmClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    retry_attempts: Option<u32>,
    retry_base_delay: Option<Duration>,
    cache_ttl: Option<Duration>,
}

impl FilmClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
            retry_attempts: None,
            retry_base_delay: None,
            cache_ttl: None,
        }
    }

    /// Overrides the base URL (default: `http://localhost:3001`).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the per-request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times a failed transport is retried (default: 2).
    #[must_use]
    pub const fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Sets the delay before the first retry (default: 1s).
    #[must_use]
    pub const fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Sets how long GET responses stay cached (default: 5min).
    #[must_use]
    pub const fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - The base URL cannot carry a path (e.g. `mailto:`).
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<FilmClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?,
        };
        if base_url.cannot_be_a_base() {
            bail!("base URL cannot be used as a base: {base_url}");
        }

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("failed to build HTTP client")?;

        Ok(FilmClient {
            http_client,
            base_url,
            retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            retry_base_delay: self.retry_base_delay.unwrap_or(DEFAULT_RETRY_BASE_DELAY),
            cache: TtlCache::new(self.cache_ttl.unwrap_or(DEFAULT_TTL)),
        })
    }
}

/// Delay before retry number `retry + 1`: `base * 2^retry`.
#[must_use]
pub fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
}

/// Builds the cache key for a request.
fn cache_key(method: &Method, endpoint: &str, body: Option<&serde_json::Value>) -> String {
    let body = body.map(ToString::to_string).unwrap_or_default();
    format!("{}:{endpoint}:{body}", method.as_str())
}

/// Serializes a request body.
fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Invalid(format!("failed to encode request body: {e}")))
}

/// Reads the `X-Total-Count` header.
fn total_count(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(TOTAL_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

impl FilmClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> FilmClientBuilder {
        FilmClientBuilder::new()
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("response cache cleared");
    }

    /// Drops every cached response whose key contains `endpoint`.
    ///
    /// Returns the number of dropped responses.
    pub fn clear_cache_for_endpoint(&self, endpoint: &str) -> usize {
        let removed = self.cache.delete_matching(endpoint);
        tracing::debug!(endpoint, removed, "cached responses invalidated");
        removed
    }

    /// Current cache size and keys.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Starts periodic removal of expired cache entries.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn_cache_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        self.cache.spawn_cleanup(interval)
    }

    /// Joins the base URL and an endpoint such as `/films?q=x`.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{endpoint}"))
            .map_err(|e| ApiError::Invalid(format!("invalid request URL {endpoint}: {e}")))
    }

    /// Sends a request, retrying transport failures with exponential backoff.
    ///
    /// Non-success statuses are returned as `ApiError::Status` without retry.
    async fn send_with_retry(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let mut retries = 0u32;
        loop {
            let mut request = self
                .http_client
                .request(method.clone(), url.clone())
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(method = %method, url = %url, "film API request");

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(ApiError::Status {
                            status: status.as_u16(),
                            status_text: String::from(status.canonical_reason().unwrap_or("")),
                        });
                    }
                    return Ok(response);
                }
                Err(err) if retries < self.retry_attempts => {
                    let delay = backoff_delay(self.retry_base_delay, retries);
                    retries = retries.saturating_add(1);
                    tracing::warn!(
                        retry = retries,
                        max_retries = self.retry_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "film API request failed. Retrying..."
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(ApiError::from_transport(err)),
            }
        }
    }

    /// Performs a request and decodes the JSON body.
    ///
    /// GET responses are served from and stored into the cache.
    #[instrument(skip_all)]
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Fetched<T>> {
        let key = cache_key(&method, endpoint, body.as_ref());
        let cacheable = method == Method::GET;

        if cacheable && let Some(cached) = self.cache.get(&key) {
            tracing::debug!(endpoint, "cache hit");
            let data = serde_json::from_value(cached.body)
                .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))?;
            return Ok(Fetched {
                data,
                total_count: cached.total_count,
            });
        }

        let url = self.endpoint_url(endpoint)?;
        let response = match self.send_with_retry(&method, &url, body.as_ref()).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(endpoint, error = %err, "film API request failed");
                return Err(err);
            }
        };

        let total_count = total_count(&response);
        let text = response
            .text()
            .await
            .map_err(ApiError::from_transport)?;
        let value: serde_json::Value = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))?
        };
        let data = serde_json::from_value(value.clone())
            .map_err(|e| ApiError::Decode(format!("{endpoint}: {e}")))?;

        if cacheable {
            self.cache.set(
                key,
                CachedResponse {
                    body: value,
                    total_count,
                },
            );
        }

        Ok(Fetched { data, total_count })
    }
}

impl LocalFilmApi for FilmClient {
    #[instrument(skip_all)]
    async fn get_films(&self, params: &FilmsParams) -> Result<FilmsPage> {
        let endpoint = params.to_endpoint();
        let fetched: Fetched<Vec<Film>> = self.request(Method::GET, &endpoint, None).await?;
        Ok(FilmsPage::from_response(
            fetched.data,
            fetched.total_count,
            params,
        ))
    }

    #[instrument(skip_all)]
    async fn get_film(&self, id: &str) -> Result<Film> {
        let endpoint = format!("/films/{id}");
        match self.request(Method::GET, &endpoint, None).await {
            Ok(fetched) => Ok(fetched.data),
            Err(err) if err.status() == Some(404) => Err(ApiError::NotFound("film")),
            Err(err) => Err(err.during("fetch film details")),
        }
    }

    #[instrument(skip_all)]
    async fn login(&self, username: &str, password: &str) -> Result<User> {
        let endpoint = users_by_name_endpoint(username);
        let fetched: Fetched<Vec<User>> = self
            .request(Method::GET, &endpoint, None)
            .await
            .map_err(|err| err.during("log in"))?;

        fetched
            .data
            .into_iter()
            .find(|user| user.username == username && user.password == password)
            .ok_or(ApiError::InvalidCredentials)
    }

    #[instrument(skip_all)]
    async fn get_user(&self, id: &str) -> Result<User> {
        let endpoint = format!("/users/{id}");
        self.request(Method::GET, &endpoint, None)
            .await
            .map(|fetched| fetched.data)
            .map_err(|err| err.during("fetch user"))
    }

    #[instrument(skip_all)]
    async fn get_reviews(&self, film_id: Option<&str>) -> Result<Vec<Review>> {
        let endpoint = reviews_endpoint(film_id);
        self.request(Method::GET, &endpoint, None)
            .await
            .map(|fetched| fetched.data)
            .map_err(|err| err.during("fetch reviews"))
    }

    #[instrument(skip_all)]
    async fn create_review(&self, review: &NewReview) -> Result<Review> {
        let body = to_body(review)?;
        let fetched: Fetched<Review> = self
            .request(Method::POST, "/reviews", Some(body))
            .await
            .map_err(|err| err.during("create review"))?;

        self.clear_cache_for_endpoint("/reviews");
        self.clear_cache_for_endpoint(&format!("/films/{}", review.film_id));

        Ok(fetched.data)
    }

    #[instrument(skip_all)]
    async fn update_review(&self, id: &str, patch: &ReviewPatch) -> Result<Review> {
        let body = to_body(patch)?;
        let endpoint = format!("/reviews/{id}");
        let fetched: Fetched<Review> = self
            .request(Method::PATCH, &endpoint, Some(body))
            .await
            .map_err(|err| err.during("update review"))?;

        self.clear_cache_for_endpoint("/reviews");
        if let Some(film_id) = patch.film_id.as_deref() {
            self.clear_cache_for_endpoint(&format!("/films/{film_id}"));
        }

        Ok(fetched.data)
    }

    #[instrument(skip_all)]
    async fn delete_review(&self, id: &str) -> Result<()> {
        let endpoint = format!("/reviews/{id}");
        let _: Fetched<serde_json::Value> = self
            .request(Method::DELETE, &endpoint, None)
            .await
            .map_err(|err| err.during("delete review"))?;

        self.clear_cache_for_endpoint("/reviews");

        Ok(())
    }

    #[instrument(skip_all)]
    async fn update_film_rating(&self, film_id: &str, rating: &RatingUpdate) -> Result<Film> {
        let body = to_body(rating)?;
        let endpoint = format!("/films/{film_id}");
        let fetched: Fetched<Film> = self
            .request(Method::PATCH, &endpoint, Some(body))
            .await
            .map_err(|err| err.during("update film rating"))?;

        self.clear_cache_for_endpoint(&endpoint);
        self.clear_cache_for_endpoint("/films");

        Ok(fetched.data)
    }
}
