use serde::{Deserialize, Serialize};

use crate::config;

/// 1-indexed page parameters shared by all listing endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// Resolve page/limit against configured defaults and the per-page cap.
    pub fn resolve(&self) -> (i64, i64) {
        let api = &config::config().api;
        self.resolve_with(api.default_page_size, api.max_page_size)
    }

    pub fn resolve_with(&self, default_limit: i64, max_limit: i64) -> (i64, i64) {
        let page = match self.page {
            Some(p) if p > 0 => p,
            _ => 1,
        };
        let limit = match self.limit {
            Some(l) if l > 0 => l.min(max_limit),
            _ => default_limit,
        };
        (page, limit)
    }

    /// Saturating so an absurd caller-supplied page cannot overflow.
    pub fn offset(page: i64, limit: i64) -> i64 {
        page.saturating_sub(1).saturating_mul(limit)
    }
}

/// Pagination block reported alongside every listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            current_page: page,
            per_page: limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let params = PageParams { page: None, limit: None };
        assert_eq!(params.resolve_with(20, 100), (1, 20));
    }

    #[test]
    fn zero_and_negative_values_fall_back_to_defaults() {
        let params = PageParams { page: Some(0), limit: Some(-5) };
        assert_eq!(params.resolve_with(20, 100), (1, 20));
    }

    #[test]
    fn limit_is_capped() {
        let params = PageParams { page: Some(2), limit: Some(500) };
        assert_eq!(params.resolve_with(20, 100), (2, 100));
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(PageParams::offset(1, 20), 0);
        assert_eq!(PageParams::offset(3, 20), 40);
    }

    #[test]
    fn offset_saturates_on_huge_page() {
        assert_eq!(PageParams::offset(i64::MAX, 100), i64::MAX);
        assert!(PageParams::offset(i64::MAX - 1, 20) > 0);
    }

    #[test]
    fn page_info_rounds_total_pages_up() {
        let info = PageInfo::new(1, 20, 41);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn page_info_on_last_page() {
        let info = PageInfo::new(3, 20, 41);
        assert!(!info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn page_info_empty_result() {
        let info = PageInfo::new(1, 20, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn exact_multiple_does_not_overcount() {
        let info = PageInfo::new(2, 20, 40);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next);
    }
}
