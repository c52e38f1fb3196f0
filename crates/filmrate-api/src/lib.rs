//! API client library for filmrate.
//!
//! Provides a cached, retrying client for the film rating REST API along with
//! the client-side state kept between requests (film list paging, film detail,
//! rating aggregation).

/// In-memory TTL cache.
pub mod cache;

/// Film rating API client.
pub mod film;
