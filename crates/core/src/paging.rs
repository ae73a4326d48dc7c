use std::fmt;

/// Windows at or below this many pages are shown in full.
const FULL_WINDOW_MAX: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{n}"),
            PageItem::Ellipsis => f.write_str("…"),
        }
    }
}

/// Ellipsis-compressed page sequence for a listing with `total_pages` pages.
///
/// Always starts at `1` and ends at `total_pages` (empty when there are no
/// pages), with at most one ellipsis on each side of `current_page`.
pub fn compute_page_window(current_page: u32, total_pages: u32) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total_pages <= FULL_WINDOW_MAX {
        return (1..=total_pages).map(Page).collect();
    }

    if current_page <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total_pages)]
    } else if current_page >= total_pages - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(total_pages - 3),
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current_page - 1),
            Page(current_page),
            Page(current_page + 1),
            Ellipsis,
            Page(total_pages),
        ]
    }
}

pub fn total_pages(total_items: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Current page within a listing whose size is learned from the source.
///
/// Navigation outside `1..=total_pages` is a no-op. Before the first total is
/// known only page 1 is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    per_page: u32,
    current: u32,
    total_pages: u32,
}

impl Pager {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            current: 1,
            total_pages: 0,
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.current - 1) * u64::from(self.per_page)
    }

    /// Paging controls are only worth showing with more than one page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    pub fn set_total_items(&mut self, total_items: u64) {
        self.total_pages = total_pages(total_items, self.per_page);
        self.current = self.current.clamp(1, self.total_pages.max(1));
    }

    pub fn can_prev(&self) -> bool {
        self.current > 1
    }

    pub fn can_next(&self) -> bool {
        self.current < self.total_pages
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn go_to(&mut self, page: u32) -> bool {
        if page == 0 || page > self.total_pages.max(1) || page == self.current {
            return false;
        }
        self.current = page;
        true
    }

    pub fn window(&self) -> Vec<PageItem> {
        compute_page_window(self.current, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::PageItem::{Ellipsis, Page};
    use super::*;

    #[test]
    fn small_totals_are_listed_in_full() {
        for current in 1..=5 {
            assert_eq!(
                compute_page_window(current, 5),
                vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
            );
        }
        assert!(compute_page_window(1, 0).is_empty());
        assert_eq!(compute_page_window(1, 7).len(), 7);
    }

    #[test]
    fn window_near_start() {
        assert_eq!(
            compute_page_window(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
        assert_eq!(compute_page_window(3, 10), compute_page_window(1, 10));
    }

    #[test]
    fn window_near_end() {
        assert_eq!(
            compute_page_window(10, 10),
            vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(compute_page_window(8, 10), compute_page_window(10, 10));
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(
            compute_page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn ellipsis_renders_as_single_glyph() {
        assert_eq!(Ellipsis.to_string(), "…");
        assert_eq!(Page(12).to_string(), "12");
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(6, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn pager_navigation_is_noop_at_boundaries() {
        let mut pager = Pager::new(10);
        assert!(!pager.prev());
        assert!(!pager.next());

        pager.set_total_items(25);
        assert_eq!(pager.total_pages(), 3);
        assert!(pager.is_visible());
        assert!(!pager.prev());
        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.current(), 3);
        assert_eq!(pager.offset(), 20);
        assert!(!pager.next());
        assert!(!pager.go_to(4));
        assert!(pager.go_to(1));
    }

    #[test]
    fn shrinking_total_clamps_current_page() {
        let mut pager = Pager::new(10);
        pager.set_total_items(100);
        assert!(pager.go_to(9));
        pager.set_total_items(15);
        assert_eq!(pager.current(), 2);
        pager.set_total_items(0);
        assert_eq!(pager.current(), 1);
        assert!(!pager.is_visible());
    }
}
