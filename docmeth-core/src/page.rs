//! Page-number pagination on top of the [`paginate`](crate::modifier::paginate) modifier.

use serde::{Deserialize, Serialize};

use crate::{cursor::ResultCursor, modifier};

/// Parameters for walking a result set page by page.
///
/// Pages are 1-indexed (page 1 is the first page); a page number of 0 is treated as 1.
///
/// # Example
///
/// ```ignore
/// use docmeth::page::PaginationParams;
///
/// let params = PaginationParams::new(2, 50);
/// assert_eq!(params.offset(), 50);
///
/// ops::all_op(&record, params.modifier(), &mut rows, []).await?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl PaginationParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    pub fn builder() -> PaginationParamsBuilder {
        PaginationParamsBuilder::new()
    }

    /// Number of rows to skip to reach this page, saturating at `usize::MAX`.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Returns a modifier limiting a cursor to this page.
    pub fn modifier(&self) -> impl Fn(&mut ResultCursor) + Clone + Send + Sync {
        modifier::paginate(self.per_page, self.offset())
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 10 }
    }
}

/// Builder for [`PaginationParams`]; unset values fall back to page 1, 10 per page.
#[derive(Debug, Default)]
pub struct PaginationParamsBuilder {
    page: Option<usize>,
    per_page: Option<usize>,
}

impl PaginationParamsBuilder {
    pub fn new() -> Self {
        Self { page: None, per_page: None }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> PaginationParams {
        let defaults = PaginationParams::default();

        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}
