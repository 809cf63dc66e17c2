use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 1-based page request. Out-of-range page numbers are clamped to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.page - 1).saturating_mul(self.per_page),
            limit: self.per_page,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// Row window handed to the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let num_pages = (total.saturating_add(request.per_page - 1) / request.per_page).max(1);
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            num_pages,
            has_next: request.page < num_pages,
            has_previous: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_numbers() {
        let request = PageRequest::new(Some(0), 10);
        assert_eq!(request.page, 1);
        assert_eq!(request.window(), PageWindow { offset: 0, limit: 10 });
        assert_eq!(PageRequest::new(Some(3), 10).window().offset, 20);
    }

    #[test]
    fn page_info_counts_partial_pages() {
        let info = PageInfo::new(&PageRequest::new(Some(2), 10), 21);
        assert_eq!(info.num_pages, 3);
        assert!(info.has_next);
        assert!(info.has_previous);

        let empty = PageInfo::new(&PageRequest::new(None, 10), 0);
        assert_eq!(empty.num_pages, 1);
        assert!(!empty.has_next);
    }

    #[test]
    fn huge_page_numbers_saturate_the_offset() {
        let request = PageRequest::new(Some(i64::MAX), 10);
        assert_eq!(request.window(), PageWindow { offset: i64::MAX, limit: 10 });

        let info = PageInfo::new(&request, 3);
        assert_eq!(info.num_pages, 1);
        assert!(!info.has_next);
        assert!(info.has_previous);
    }
}
