//! Pagination utilities for list endpoints

/// Page size when the client does not ask for one
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page a client may request
pub const MAX_LIMIT: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]` and the limit to `[1, MAX_LIMIT]`.
///
/// # Examples
/// ```
/// use catalog_server::pagination::calculate_pagination;
///
/// // 45 results at 20 per page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(45, 99, 20);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, requested_limit: i64) -> Pagination {
    let limit = requested_limit.clamp(1, MAX_LIMIT);
    let total_pages = (total_results + limit - 1) / limit;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * limit;

    Pagination {
        page,
        limit,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let p = calculate_pagination(45, 1, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_empty_results() {
        let p = calculate_pagination(0, 1, 20);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_page_below_one_clamped() {
        let p = calculate_pagination(45, -3, 20);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_limit_clamped() {
        assert_eq!(calculate_pagination(500, 1, 1000).limit, MAX_LIMIT);
        assert_eq!(calculate_pagination(500, 1, 0).limit, 1);
    }

    #[test]
    fn test_exact_multiple() {
        let p = calculate_pagination(40, 2, 20);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 20);
    }
}
