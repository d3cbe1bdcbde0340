//! Offset pagination for post listings.
//!
//! Listings are sliced into fixed pages of [`POSTS_PER_PAGE`] items. A request
//! never fails because of its page number: missing or garbled numbers fall back
//! to the first page and any number outside `1..=num_pages` lands on the last page.

use serde::Serialize;

pub const POSTS_PER_PAGE: u32 = 10;

/// The page a visitor asked for, as read from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(i64);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Parse a raw query value; anything that is not an integer means page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or(Self::FIRST)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// A resolved page: which rows to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub offset: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    per_page: u32,
}

impl Paginator {
    pub fn new(total: u64, per_page: u32) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    pub fn for_posts(total: u64) -> Self {
        Self::new(total, POSTS_PER_PAGE)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages; an empty collection still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn window(&self, requested: PageNumber) -> PageWindow {
        let last = self.num_pages();
        let number = u32::try_from(requested.get())
            .ok()
            .filter(|number| (1..=last).contains(number))
            .unwrap_or(last);
        PageWindow {
            number,
            offset: u64::from(number - 1) * u64::from(self.per_page),
            limit: self.per_page,
        }
    }

    /// Wrap the rows fetched for `window` with navigation metadata.
    pub fn page<T>(&self, window: PageWindow, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            items,
            number: window.number,
            num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> Option<u32> {
        self.has_next().then_some(self.number + 1)
    }

    pub fn previous_number(&self) -> Option<u32> {
        self.has_previous().then_some(self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 when empty.
    pub fn start_index(&self) -> u64 {
        if self.items.is_empty() {
            return 0;
        }
        u64::from(self.number - 1) * u64::from(self.per_page) + 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            per_page: self.per_page,
        }
    }
}
