//! Paging for list endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters shared by paged list endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: i64,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "Per page must be between 1 and 100"))]
    pub per_page: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn pagination(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page.max(1),
            per_page: self.limit(),
            total,
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

/// Pagination info for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// A page of items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 20);
        assert_eq!(query.offset(), 0);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_offset() {
        let query = ListQuery { page: 3, per_page: 25 };
        assert_eq!(query.offset(), 50);
        assert_eq!(query.limit(), 25);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ListQuery { page: 0, per_page: 20 }.validate().is_err());
        assert!(ListQuery { page: 1, per_page: 101 }.validate().is_err());
    }

    #[test]
    fn test_pagination_echoes_query() {
        let query = ListQuery { page: 2, per_page: 10 };
        assert_eq!(
            query.pagination(42),
            Pagination {
                page: 2,
                per_page: 10,
                total: 42
            }
        );
    }
}
