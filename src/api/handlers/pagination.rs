//! Page/limit handling shared by the listing, search and query endpoints.
//!
//! Query parameters are parsed leniently: a missing or unparseable `page` or
//! `limit` falls back to its default instead of rejecting the request.

use serde::Deserialize;
use utoipa::IntoParams;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a request may ask for
pub const MAX_LIMIT: i64 = 1000;

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamp raw values: `page < 1` becomes 1, `limit < 1` becomes the default,
    /// and `limit` is capped at [`MAX_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        Self { page, limit }
    }

    /// Documents to skip before this page
    pub fn skip(&self) -> u64 {
        ((self.page - 1) as u64).saturating_mul(self.limit as u64)
    }

    /// Number of pages needed for `total` documents
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

/// `page`/`limit` query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default: 1)
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Page size (default: 10, max: 1000)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(parse_int(self.page.as_deref()), parse_int(self.limit.as_deref()))
    }
}

/// Parse an integer parameter, treating junk as absent
pub fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let pagination = PageQuery::default().pagination();
        assert_eq!(pagination, Pagination { page: 1, limit: DEFAULT_LIMIT });
        assert_eq!(pagination.skip(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 10 });
        assert_eq!(Pagination::new(Some(-3), Some(5000)), Pagination { page: 1, limit: MAX_LIMIT });
    }

    #[test]
    fn test_skip_and_total_pages() {
        let pagination = Pagination::new(Some(3), Some(20));
        assert_eq!(pagination.skip(), 40);
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(40), 2);
        assert_eq!(pagination.total_pages(41), 3);
    }

    #[test]
    fn test_lenient_parsing() {
        let query = PageQuery { page: Some("two".into()), limit: Some(" 25 ".into()) };
        assert_eq!(query.pagination(), Pagination { page: 1, limit: 25 });
    }
}
