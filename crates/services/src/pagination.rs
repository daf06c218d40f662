//! # Pagination
//!
//! Page-number pagination with paginator-style clamping: a missing or
//! malformed page number means the first page, a number past the end means
//! the last page, and an empty listing still has one (empty) page.

use domains::Page;

/// Fixed page size for every feed.
pub const PAGE_SIZE: u64 = 10;

/// A requested page number as it arrives from a query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest(Option<i64>);

impl PageRequest {
    pub fn first() -> Self {
        Self(Some(1))
    }

    pub fn number(n: i64) -> Self {
        Self(Some(n))
    }

    /// Parses a raw `?page=` value. Anything that is not an integer counts
    /// as "no page given". `"last"` is accepted like the paginator does.
    /// Integers too large for `i64` saturate, so they still clamp to an end.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => Self(Some(i64::MAX)),
            Some(s) => Self(s.parse().ok().or_else(|| saturated(s))),
            None => Self(None),
        }
    }
}

fn saturated(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Resolves a [`PageRequest`] against a total item count.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self { count, per_page: per_page.max(1) }
    }

    pub fn num_pages(&self) -> u32 {
        let pages = self.count.div_ceil(self.per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Clamps the request into `1..=num_pages`.
    pub fn clamp(&self, request: PageRequest) -> u32 {
        let last = i64::from(self.num_pages());
        match request.0 {
            None => 1,
            Some(n) if n < 1 => 1,
            Some(n) if n > last => self.num_pages(),
            // n is within 1..=last, which fits in u32
            Some(n) => n as u32,
        }
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn offset(&self, number: u32) -> u64 {
        u64::from(number.saturating_sub(1)) * self.per_page
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page { items, number, num_pages: self.num_pages(), count: self.count }
    }
}
