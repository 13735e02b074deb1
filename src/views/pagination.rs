//! Pagination controllers.
//!
//! `ServerPager` follows the server's page block and only moves where the
//! server says it can. `ClientPager` slices an in-memory collection with a
//! fixed page size.

use std::ops::Range;

use crate::types::PageMeta;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPager {
    requested: u32,
    meta: PageMeta,
}

impl Default for ServerPager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerPager {
    pub fn new() -> Self {
        Self {
            requested: 1,
            meta: PageMeta::default(),
        }
    }

    /// Start at a given page, e.g. from `--page`.
    pub fn at(page: u32) -> Self {
        Self {
            requested: page.max(1),
            meta: PageMeta::default(),
        }
    }

    /// Page to request next. Part of the cache key.
    pub fn requested(&self) -> u32 {
        self.requested
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Adopt the page block from the latest response.
    pub fn update(&mut self, meta: PageMeta) {
        self.requested = meta.page.max(1);
        self.meta = meta;
    }

    pub fn has_next(&self) -> bool {
        self.meta.has_next
    }

    pub fn has_prev(&self) -> bool {
        self.meta.has_prev
    }

    /// Advance if the server reported a next page. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        if !self.meta.has_next {
            return false;
        }
        self.requested = self.meta.page.saturating_add(1);
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.meta.has_prev || self.meta.page <= 1 {
            return false;
        }
        self.requested = self.meta.page - 1;
        true
    }

    /// Back to the first page, e.g. after changing the type filter.
    pub fn reset(&mut self) {
        self.requested = 1;
        self.meta = PageMeta::default();
    }

    pub fn label(&self, noun: &str) -> String {
        format!(
            "Page {} of {} • {} total {}",
            self.meta.page, self.meta.total_pages, self.meta.total, noun
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPager {
    /// 1-based.
    page: usize,
    page_size: usize,
    total_items: usize,
}

impl ClientPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Total pages for the current item count. An empty collection still has one page.
    pub fn total_pages(&self) -> usize {
        if self.total_items == 0 {
            1
        } else {
            self.total_items.div_ceil(self.page_size)
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped into range.
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Record the collection size; pulls the page back into range if it shrank.
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.page = self.page.clamp(1, self.total_pages());
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Index range for the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Current page window of `items`. Also records `items.len()` as the total.
    pub fn slice<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.set_total(items.len());
        &items[self.page_range()]
    }

    /// `Page X of Y • Showing n of m <noun>`.
    pub fn label(&self, noun: &str) -> String {
        format!(
            "Page {} of {} • Showing {} of {} {}",
            self.page,
            self.total_pages(),
            self.page_range().len(),
            self.total_items,
            noun
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_items_page_size_ten() {
        let items: Vec<u32> = (1..=23).collect();
        let mut pager = ClientPager::new(10);

        assert_eq!(pager.slice(&items), &items[0..10]);
        assert_eq!(pager.total_pages(), 3);
        assert!(pager.has_next());
        assert!(!pager.has_prev());

        pager.go_to(3);
        let last = pager.slice(&items);
        assert_eq!(last, &[21, 22, 23]);
        assert!(!pager.has_next());
        assert!(pager.has_prev());
        assert_eq!(pager.label("calls"), "Page 3 of 3 • Showing 3 of 23 calls");
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for (n, p, pages) in [(1, 10, 1), (10, 10, 1), (11, 10, 2), (30, 10, 3), (7, 3, 3)] {
            let mut pager = ClientPager::new(p);
            pager.set_total(n);
            assert_eq!(pager.total_pages(), pages, "n={n} p={p}");
        }
    }

    #[test]
    fn test_next_and_prev_stop_at_bounds() {
        let mut pager = ClientPager::new(10);
        pager.set_total(15);
        assert!(!pager.prev());
        assert!(pager.next());
        assert!(!pager.next());
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn test_shrinking_collection_clamps_page() {
        let mut pager = ClientPager::new(10);
        pager.set_total(23);
        pager.go_to(3);

        pager.set_total(12);
        assert_eq!(pager.page(), 2);

        pager.set_total(0);
        assert_eq!(pager.page(), 1);
        assert!(!pager.has_next());
        assert_eq!(pager.page_range(), 0..0);
    }

    #[test]
    fn test_reset_returns_to_first_page() {
        let mut pager = ClientPager::new(5);
        pager.set_total(20);
        pager.go_to(4);
        pager.reset();
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_server_pager_trusts_meta() {
        let mut pager = ServerPager::new();
        pager.update(PageMeta {
            page: 2,
            total_pages: 5,
            has_next: true,
            has_prev: true,
            total: 47,
        });
        assert_eq!(pager.label("calls"), "Page 2 of 5 • 47 total calls");

        assert!(pager.next());
        assert_eq!(pager.requested(), 3);

        pager.update(PageMeta {
            page: 5,
            total_pages: 5,
            has_next: false,
            has_prev: true,
            total: 47,
        });
        assert!(!pager.next());
        assert!(pager.prev());
        assert_eq!(pager.requested(), 4);
    }

    #[test]
    fn test_server_pager_first_page() {
        let mut pager = ServerPager::at(0);
        assert_eq!(pager.requested(), 1);
        assert!(!pager.prev());
        assert!(!pager.next());
    }
}
