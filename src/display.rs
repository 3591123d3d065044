// ABOUTME: Display helpers: shortened addresses and hashes, timestamps, and pagination arithmetic.
// ABOUTME: Pure functions shared by the TUI and log output.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Shorten an address to `0x1234...abcd` form.
///
/// Strings too short to benefit from shortening are returned unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// First `len` characters of a hash, with an ellipsis when truncated.
pub fn short_hash(hash: &str, len: usize) -> String {
    if hash.chars().count() <= len {
        return hash.to_string();
    }
    let head: String = hash.chars().take(len).collect();
    format!("{}...", head)
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM` UTC.
///
/// Accepts RFC 3339 and the naive ISO form the backend stores; anything else
/// is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

/// Zero-based page cursor over a list of known total length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl Pagination {
    pub fn new(per_page: usize, total: usize) -> Self {
        Self {
            page: 0,
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }

    pub fn offset(&self) -> usize {
        self.page * self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Move forward one page if there is one. Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page if possible. Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a page, clamped to the last valid page.
    pub fn goto(&mut self, page: usize) {
        self.page = page.min(self.total_pages().saturating_sub(1));
    }

    /// Update the total, keeping the current page in range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.goto(self.page);
    }

    /// `page X of Y` label, 1-based, or `no pages` when empty.
    pub fn label(&self) -> String {
        if self.total_pages() == 0 {
            "no pages".to_string()
        } else {
            format!("page {} of {}", self.page + 1, self.total_pages())
        }
    }
}
