use serde::Deserialize;

use crate::{
    error::Error,
    models::Post,
    repository::RepositoryState,
};

/// Fixed page size for the public listing.
pub const POSTS_PER_PAGE: u32 = 10;

/// ListingQuery
///
/// Accepted query parameters for the public listing endpoint (GET /?page=N).
/// The page number is deserialized as a raw string so that malformed values
/// degrade to the default page instead of a 400 rejection.
#[derive(Debug, Deserialize, Default)]
pub struct ListingQuery {
    pub page: Option<String>,
}

/// requested_page
///
/// Parses the raw page parameter. Absent, non-numeric, or zero values all default
/// to page 1. No upper bound is enforced: a page beyond the end simply yields an
/// empty window.
pub fn requested_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Pagination
///
/// The (offset, limit) window derived from a requested page number and a fixed
/// page size. This is the single home of the window arithmetic; both repository
/// implementations delegate to it.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page,
        }
    }

    /// Number of records skipped before the window: `(page - 1) * per_page`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// True iff another page exists after this window: `page * per_page < total`.
    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.page) * u64::from(self.per_page) < total
    }
}

/// Listing
///
/// The shaped result handed to the index view: the window of posts plus the
/// pagination fields the template needs (current page, next page or none).
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub posts: Vec<Post>,
    pub current_page: u32,
    pub next_page: Option<u32>,
}

/// front_page
///
/// Composition layer for the public listing: parses the page parameter, delegates
/// the windowed query to the repository, and shapes the result for rendering.
/// No business logic beyond parameter extraction and shaping lives here.
pub async fn front_page(repo: &RepositoryState, query: &ListingQuery) -> Result<Listing, Error> {
    let page = requested_page(query.page.as_deref());
    let window = repo.list_page(page, POSTS_PER_PAGE).await?;

    Ok(Listing {
        next_page: window.has_next_page.then(|| page + 1),
        current_page: page,
        posts: window.items,
    })
}

/// search_results
///
/// Forwards the raw search term untouched to the repository; sanitization is the
/// repository's concern.
pub async fn search_results(repo: &RepositoryState, raw_term: &str) -> Result<Vec<Post>, Error> {
    repo.search(raw_term).await
}
