//! Shared pagination shapes.
//!
//! Two paging strategies coexist behind the same response shape: storage-level
//! paging (sea-orm `PaginatorTrait`) for queries the database can order, and
//! in-memory sort-then-slice for the severity-sorted views that are filtered
//! and ordered in application code.

use serde::{Deserialize, Serialize};

fn default_size() -> u64 {
    20
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

impl PageParams {
    /// Page size clamped away from zero so total_pages stays well defined.
    pub fn effective_size(&self) -> u64 {
        self.size.max(1)
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, params: &PageParams, total_elements: u64) -> Self {
        let size = params.effective_size();
        Self {
            content,
            page: params.page,
            size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// Slices one page out of an already-sorted full result set.
    ///
    /// A start offset past the end yields an empty page with the true totals,
    /// matching the storage-level paginator.
    pub fn from_sorted(items: Vec<T>, params: &PageParams) -> Self {
        let size = params.effective_size();
        let total = items.len() as u64;
        let start = params.page.saturating_mul(size).min(total) as usize;
        let end = (start as u64).saturating_add(size).min(total) as usize;
        let content = items.into_iter().skip(start).take(end - start).collect();
        Self::new(content, params, total)
    }

    /// Converts the page content while keeping the paging envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u64, size: u64) -> PageParams {
        PageParams { page, size }
    }

    #[test]
    fn test_first_page_slice() {
        let page = PageResponse::from_sorted(vec![1, 2, 3, 4, 5], &params(0, 2));
        assert_eq!(page.content, vec![1, 2]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_last_partial_page() {
        let page = PageResponse::from_sorted(vec![1, 2, 3, 4, 5], &params(2, 2));
        assert_eq!(page.content, vec![5]);
    }

    #[test]
    fn test_page_past_end_is_empty_with_totals() {
        let page = PageResponse::from_sorted(vec![1, 2, 3], &params(7, 2));
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let page = PageResponse::from_sorted(vec![1, 2, 3], &params(0, 0));
        assert_eq!(page.size, 1);
        assert_eq!(page.content, vec![1]);
        assert_eq!(page.total_pages, 3);
    }
}
