//! Pagination
//!
//! Page numbers are 1-based. Handlers fill absent values with defaults before
//! a [`PageRequest`] reaches the repository.

use serde::{Deserialize, Serialize};

use crate::error::app_error::{AppError, AppResult};
use crate::order::{DEFAULT_ORDER, OrderClause, parse_orders};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Both values must be at least 1 and `page_size` at most [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, page_size: u32) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        if page_size < 1 {
            return Err(AppError::validation("page_size must be at least 1"));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "page_size must be at most {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Treat missing or zero values as "use the default".
    pub fn with_defaults(page: Option<u32>, page_size: Option<u32>) -> AppResult<Self> {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page, page_size)
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub const fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }
}

/// Query-string parameters shared by every list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
    /// Comma-separated `"column direction"` pairs
    pub order: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> AppResult<PageRequest> {
        PageRequest::with_defaults(self.page, self.page_size)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().filter(|k| !k.is_empty())
    }

    pub fn orders(&self, allowed_columns: &[&'static str]) -> Vec<OrderClause> {
        parse_orders(
            self.order.as_deref().unwrap_or_default(),
            allowed_columns,
            DEFAULT_ORDER,
        )
    }
}
