//! Page arithmetic and the page-number window

use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// `ceil(row_count / page_size)`, zero for an empty set
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1))
}

impl Pagination {
    /// A page size of zero is treated as one
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, row_count: usize) -> usize {
        total_pages(row_count, self.page_size)
    }

    /// Move to `page`, clamped into `[1, max(total_pages, 1)]`
    pub fn set_page(&mut self, page: usize, row_count: usize) {
        let last = self.total_pages(row_count).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn set_page_size(&mut self, page_size: usize, row_count: usize) {
        self.page_size = page_size.max(1);
        self.clamp(row_count);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Re-clamp after the row count changed
    pub fn clamp(&mut self, row_count: usize) {
        self.set_page(self.current_page, row_count);
    }

    pub fn next(&mut self, row_count: usize) {
        self.set_page(self.current_page + 1, row_count);
    }

    pub fn previous(&mut self, row_count: usize) {
        self.set_page(self.current_page.saturating_sub(1), row_count);
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, row_count: usize) {
        self.set_page(usize::MAX, row_count);
    }

    /// Index range of the current page within a list of `row_count` rows
    pub fn page_range(&self, row_count: usize) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(row_count);
        let end = (start + self.page_size).min(row_count);
        start..end
    }

    pub fn page_window(&self, row_count: usize) -> Vec<PageItem> {
        page_window(self.current_page, self.total_pages(row_count))
    }
}

/// One slot of the page-number control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// First and last page, the current page and its neighbours, with an
/// ellipsis standing in at `current - 2` and `current + 2`.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    for page in 1..=total {
        if page == 1 || page == total || (page + 1 >= current && page <= current + 1) {
            items.push(PageItem::Page(page));
        } else if page + 2 == current || page == current + 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(15, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_is_clamped() {
        let mut p = Pagination::new(10);
        p.set_page(5, 15);
        assert_eq!(p.current_page(), 2);
        p.set_page(0, 15);
        assert_eq!(p.current_page(), 1);
        p.set_page(3, 0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_page_size_change_clamps() {
        let mut p = Pagination::new(5);
        p.set_page(4, 20);
        assert_eq!(p.current_page(), 4);
        p.set_page_size(10, 20);
        assert_eq!(p.current_page(), 2);
        p.set_page_size(0, 20);
        assert_eq!(p.page_size(), 1);
    }

    #[test]
    fn test_page_range() {
        let mut p = Pagination::new(10);
        assert_eq!(p.page_range(15), 0..10);
        p.next(15);
        assert_eq!(p.page_range(15), 10..15);
        p.next(15);
        assert_eq!(p.current_page(), 2);
        p.previous(15);
        p.previous(15);
        assert_eq!(p.current_page(), 1);
        assert_eq!(Pagination::new(10).page_range(0), 0..0);
    }

    #[test]
    fn test_page_window_middle() {
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_page_window_edges() {
        assert_eq!(page_window(1, 5), vec![Page(1), Page(2), Ellipsis, Page(5)]);
        assert_eq!(page_window(5, 5), vec![Page(1), Ellipsis, Page(4), Page(5)]);
        assert_eq!(page_window(2, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(page_window(1, 1), vec![Page(1)]);
        assert!(page_window(1, 0).is_empty());
    }
}
