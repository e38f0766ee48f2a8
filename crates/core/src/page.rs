//! Pagination request/response types shared by every list operation.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A normalized list request: pagination, optional substring search and an
/// optional sort field. Equality filters are typed per entity and live next
/// to the store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            sort_by: None,
            sort_order: SortOrder::Desc,
        }
    }
}

impl PageRequest {
    /// Build a request from raw query inputs, clamping out-of-range values to
    /// the defaults (page >= 1, limit > 0). Blank search strings are dropped.
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        search: Option<String>,
        sort_by: Option<String>,
        sort_order: Option<SortOrder>,
    ) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT),
            search: search.filter(|s| !s.trim().is_empty()),
            sort_by: sort_by.filter(|s| !s.trim().is_empty()),
            sort_order: sort_order.unwrap_or_default(),
        }
    }

    /// Zero-based offset of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

/// Pagination metadata nested in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of results plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Page<T> {
    /// Slice one page out of the full (already filtered and sorted) result
    /// set and compute the metadata from the total count.
    pub fn slice(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len() as u64;
        let limit = request.limit.max(1);
        let total_pages = total.div_ceil(limit as u64) as u32;
        let page = request.page.max(1);

        let data: Vec<T> = items
            .into_iter()
            .skip(request.offset())
            .take(limit as usize)
            .collect();

        Self {
            data,
            pagination: PageMeta {
                page,
                limit,
                total,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1 && total > 0,
            },
        }
    }
}
