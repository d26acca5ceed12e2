use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// 1-based page selection. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Self { page, per_page }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts one page out of the full list. Asking for a page past the end yields an empty page, not an error.
    pub fn paginate(all: Vec<T>, pagination: Pagination) -> Self {
        let Pagination { page, per_page } = Pagination::new(Some(pagination.page), Some(pagination.per_page));
        let total_items = all.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let items = all.into_iter().skip((page - 1) * per_page).take(per_page).collect();
        Self { items, page, per_page, total_items, total_pages }
    }
}
