//! Film API request parameters and endpoint construction.

use url::form_urlencoded::Serializer;

use super::types::{Film, FilmsPage};

/// Page size used when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Search, genre filter and paging for `GET /films`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilmsParams {
    /// Full-text search (`q`).
    pub search: Option<String>,
    /// Genre filter (`sort_like`).
    pub genre: Option<String>,
    /// 1-based page number (`_page`).
    pub page: Option<u32>,
    /// Items per page (`_limit`).
    pub page_size: Option<u32>,
}

impl FilmsParams {
    /// Creates empty parameters (first page, no filter).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search text.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the genre filter.
    #[must_use]
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the page number.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Builds the endpoint path with its query string.
    ///
    /// Empty strings and zero numbers are left out.
    ///
    /// Example: `"/films?q=action&sort_like=Action&_page=2&_limit=10"`
    #[must_use]
    pub fn to_endpoint(&self) -> String {
        let mut query = Serializer::new(String::new());
        let mut has_pairs = false;

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("q", search);
            has_pairs = true;
        }
        if let Some(genre) = self.genre.as_deref().filter(|g| !g.is_empty()) {
            query.append_pair("sort_like", genre);
            has_pairs = true;
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            query.append_pair("_page", &page.to_string());
            has_pairs = true;
        }
        if let Some(page_size) = self.page_size.filter(|s| *s > 0) {
            query.append_pair("_limit", &page_size.to_string());
            has_pairs = true;
        }

        if has_pairs {
            format!("/films?{}", query.finish())
        } else {
            String::from("/films")
        }
    }

    /// Requested page size, or the default.
    #[must_use]
    pub fn effective_page_size(&self) -> u32 {
        self.page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Requested page, or the first page.
    #[must_use]
    pub fn effective_page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }
}

impl FilmsPage {
    /// Assembles a page from the response body and the `X-Total-Count` header.
    ///
    /// Without the header the number of returned films is used as the total.
    #[must_use]
    pub fn from_response(data: Vec<Film>, total_count: Option<u64>, params: &FilmsParams) -> Self {
        let total = total_count.unwrap_or_else(|| u64::try_from(data.len()).unwrap_or(u64::MAX));
        let page_size = u64::from(params.effective_page_size());
        let pages = total.div_ceil(page_size).max(1);
        Self {
            data,
            total,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            current_page: params.effective_page(),
        }
    }
}

/// Builds the reviews endpoint, optionally filtered by film.
#[must_use]
pub fn reviews_endpoint(film_id: Option<&str>) -> String {
    match film_id {
        Some(id) => {
            let query = Serializer::new(String::new())
                .append_pair("filmId", id)
                .finish();
            format!("/reviews?{query}")
        }
        None => String::from("/reviews"),
    }
}

/// Builds the user lookup endpoint used by login.
#[must_use]
pub fn users_by_name_endpoint(username: &str) -> String {
    let query = Serializer::new(String::new())
        .append_pair("username", username)
        .finish();
    format!("/users?{query}")
}
