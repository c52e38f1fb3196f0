//! Film list state: current page, search and genre filter between fetches.

use tracing::instrument;

use super::api::LocalFilmApi;
use super::params::{DEFAULT_PAGE_SIZE, FilmsParams};
use super::types::Film;

/// Paging state of the film list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page currently shown (1-based).
    pub current_page: u32,
    /// Number of pages (at least 1).
    pub total_pages: u32,
    /// Number of matching films.
    pub total: u64,
    /// Films per page.
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Overrides for a single fetch. Unset fields keep the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Search text; `Some("")` clears the search for this fetch.
    pub search: Option<String>,
    /// Genre filter; `Some("")` clears the filter for this fetch.
    pub sort: Option<String>,
    /// Page to load.
    pub page: Option<u32>,
    /// Films per page.
    pub page_size: Option<u32>,
}

/// Film list with the search and genre filter it was loaded with.
#[derive(Debug)]
pub struct FilmBrowser<'a, A> {
    api: &'a A,
    films: Vec<Film>,
    loading: bool,
    error: Option<String>,
    pagination: Pagination,
    search: String,
    sort: String,
}

impl<'a, A: LocalFilmApi + Sync> FilmBrowser<'a, A> {
    /// Creates an empty browser. Nothing is fetched until `fetch` is called.
    #[must_use]
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            films: Vec::new(),
            loading: false,
            error: None,
            pagination: Pagination::default(),
            search: String::new(),
            sort: String::new(),
        }
    }

    /// Creates an empty browser with a custom page size.
    #[must_use]
    pub fn with_page_size(api: &'a A, page_size: u32) -> Self {
        let mut browser = Self::new(api);
        if page_size > 0 {
            browser.pagination.page_size = page_size;
        }
        browser
    }

    /// Films of the last successful fetch.
    #[must_use]
    pub fn films(&self) -> &[Film] {
        &self.films
    }

    /// Whether a fetch is in progress.
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current paging state.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Remembered search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Remembered genre filter.
    #[must_use]
    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Loads a page of films.
    ///
    /// Explicit options win over the current state. Search and genre fall
    /// back to the remembered values when those are non-empty. On failure the
    /// previous films are kept and `error` holds the message.
    #[instrument(skip_all)]
    pub async fn fetch(&mut self, options: FetchOptions) {
        self.loading = true;
        self.error = None;

        let page = options.page.unwrap_or(self.pagination.current_page);
        let page_size = options.page_size.unwrap_or(self.pagination.page_size);
        let search = options
            .search
            .or_else(|| Some(self.search.clone()).filter(|s| !s.is_empty()));
        let sort = options
            .sort
            .or_else(|| Some(self.sort.clone()).filter(|s| !s.is_empty()));

        let params = FilmsParams {
            search,
            genre: sort,
            page: Some(page),
            page_size: Some(page_size),
        };

        match self.api.get_films(&params).await {
            Ok(response) => {
                tracing::debug!(
                    count = response.data.len(),
                    total = response.total,
                    page = response.current_page,
                    "film list loaded"
                );
                self.films = response.data;
                self.pagination = Pagination {
                    current_page: response.current_page,
                    total_pages: response.total_pages,
                    total: response.total,
                    page_size: params.effective_page_size(),
                };
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load film list");
                self.error = Some(err.to_string());
            }
        }

        self.loading = false;
    }

    /// Loads another page with the current search and page size.
    pub async fn change_page(&mut self, page: u32) {
        self.fetch(FetchOptions {
            page: Some(page),
            ..FetchOptions::default()
        })
        .await;
    }

    /// Changes the page size and goes back to the first page.
    pub async fn change_page_size(&mut self, page_size: u32) {
        self.fetch(FetchOptions {
            page: Some(1),
            page_size: Some(page_size),
            ..FetchOptions::default()
        })
        .await;
    }

    /// Remembers the given search and genre filter and loads the first page.
    ///
    /// `None` keeps the remembered value; `Some("")` clears it.
    pub async fn refetch(&mut self, search: Option<String>, sort: Option<String>) {
        if let Some(search) = &search {
            self.search.clone_from(search);
        }
        if let Some(sort) = &sort {
            self.sort.clone_from(sort);
        }
        self.fetch(FetchOptions {
            search,
            sort,
            page: Some(1),
            page_size: None,
        })
        .await;
    }
}
