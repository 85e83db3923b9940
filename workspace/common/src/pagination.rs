//! Page-number pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 5;
/// Largest page size a client can request. Bigger requests are clamped.
pub const MAX_PAGE_SIZE: u64 = 10;

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Builds a request from optional query parameters, applying the defaults
    /// and clamping the page size into `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// 0-based index of the requested page.
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    /// A page is out of range when it lies past the last page. The first page
    /// of an empty collection is always in range.
    pub fn is_out_of_range(&self, total_pages: u64) -> bool {
        self.page > 1 && self.page > total_pages
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results together with the totals needed to navigate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Paginated<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// 1-based page number
    pub page: u64,
    /// Number of items per page
    pub page_size: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(request: PageRequest, count: u64, total_pages: u64, results: Vec<T>) -> Self {
        Self {
            count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
            results,
        }
    }

    /// Converts every item on the page, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
