//! Page-number pagination for list endpoints.

use serde::Serialize;

/// Which slice of a result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Resolve the `?page=` parameter against `total` rows.
    ///
    /// A missing or non-numeric page gives the first page; a number outside
    /// `1..=num_pages` gives the last page. An empty result still has one
    /// (empty) page.
    pub fn resolve(page: Option<&str>, total: i64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total = total.max(0);
        let num_pages = if total == 0 {
            1
        } else {
            (total as u64).div_ceil(u64::from(page_size)) as u32
        };

        let number = match page.map(|p| p.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n > num_pages as i64 => num_pages,
            Some(Ok(n)) => n as u32,
        };

        Self {
            number,
            num_pages,
            total,
            limit: page_size as i64,
            offset: (number as i64 - 1) * page_size as i64,
        }
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            page: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.number < self.num_pages,
            has_previous: self.number > 1,
        }
    }
}

/// One page of results as returned to clients.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub num_pages: u32,
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
}
