//! Page window bookkeeping.

/// Current page within a result set of `total_count` items.
///
/// Once a total has been recorded, `page` satisfies `1 <= page <= total_pages()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
    total_count: u64,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `max(ceil(total_count / page_size), 1)`
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_count.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Record a new total. Returns true when the page had to be clamped down.
    pub fn set_total(&mut self, total_count: u64) -> bool {
        self.total_count = total_count;
        let last = self.total_pages();
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    /// Move to `page`, clamped to `[1, total_pages]`. Returns true if the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        let target = page.clamp(1, self.total_pages());
        let changed = target != self.page;
        self.page = target;
        changed
    }

    /// Jump to `page` before the total is known. The next `set_total` clamps it.
    pub fn seek(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Back to page 1. Returns true if the page changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.page != 1;
        self.page = 1;
        changed
    }
}
