/// Pagination helpers for list endpoints

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Normalized page coordinates; out-of-range input falls back to defaults.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn from_query(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p > 0 => p,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) if s > 0 => s,
            _ => DEFAULT_PAGE_SIZE,
        };

        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total_items: i64, pagination: Pagination) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + pagination.page_size - 1) / pagination.page_size
        };

        Self {
            data,
            total_items,
            total_pages,
            current_page: pagination.page,
            page_size: pagination.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_or_invalid_input() {
        let p = Pagination::from_query(None, None);
        assert_eq!(p.page, DEFAULT_PAGE);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);

        let p = Pagination::from_query(Some(0), Some(-5));
        assert_eq!(p.page, DEFAULT_PAGE);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_limit() {
        let p = Pagination::from_query(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::from_query(Some(1), Some(10));

        assert_eq!(Paginated::<i32>::new(vec![], 0, p).total_pages, 0);
        assert_eq!(Paginated::<i32>::new(vec![], 10, p).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 11, p).total_pages, 2);
    }
}
