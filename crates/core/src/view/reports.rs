use crate::domain::report::{Report, ReportPage};
use crate::envelope::EnvelopeError;
use crate::paging::{total_pages, PageItem, Pager};
use crate::source::{DataSource, ReportQuery};
use crate::view::latest::{Delivery, LatestSlot, ScreenState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const REPORTS_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportList {
    pub reports: Vec<Report>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    /// Empty when everything fits on one page.
    pub window: Vec<PageItem>,
}

/// Paged report history.
pub struct ReportsScreen {
    source: Arc<dyn DataSource>,
    pager: Mutex<Pager>,
    slot: LatestSlot<ReportList>,
}

impl ReportsScreen {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_page_size(source, REPORTS_PER_PAGE)
    }

    pub fn with_page_size(source: Arc<dyn DataSource>, per_page: u32) -> Self {
        Self {
            source,
            pager: Mutex::new(Pager::new(per_page)),
            slot: LatestSlot::new(),
        }
    }

    fn pager(&self) -> MutexGuard<'_, Pager> {
        self.pager.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_page(&self) -> u32 {
        self.pager().current()
    }

    pub fn total_pages(&self) -> u32 {
        self.pager().total_pages()
    }

    pub fn state(&self) -> ScreenState<ReportList> {
        self.slot.get()
    }

    pub fn close(&self) {
        self.slot.close();
    }

    /// Load `page`. A page past the end settles on the last page instead, so
    /// `Empty` only ever means there are no reports at all.
    pub async fn load_page(&self, page: u32) -> Delivery {
        let mut page = page.max(1);
        let ticket = self.slot.issue();
        let per_page = self.pager().per_page();

        let mut fetched = self.fetch(page, per_page).await;
        if let Ok(result) = &fetched {
            let last = total_pages(result.total, per_page);
            if result.reports.is_empty() && last > 0 && page > last {
                tracing::debug!(requested = page, last, "report page past the end");
                page = last;
                fetched = self.fetch(page, per_page).await;
            }
        }

        let result = match fetched {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(page, error = %err, "report page fetch failed");
                return self.slot.deliver(ticket, ScreenState::Failed(err));
            }
        };

        // Only the current page may move the pager.
        self.slot.deliver_with(ticket, || {
            let mut pager = self.pager();
            pager.set_total_items(result.total);
            pager.go_to(page);
            if result.reports.is_empty() {
                return ScreenState::Empty;
            }
            ScreenState::Ready(ReportList {
                total: result.total,
                page: pager.current(),
                total_pages: pager.total_pages(),
                window: if pager.is_visible() { pager.window() } else { Vec::new() },
                reports: result.reports,
            })
        })
    }

    async fn fetch(&self, page: u32, per_page: u32) -> Result<ReportPage, EnvelopeError> {
        let query = ReportQuery {
            limit: Some(per_page),
            offset: Some((page - 1).saturating_mul(per_page)),
        };
        self.source.reports(&query).await.into_result()
    }

    pub async fn reload(&self) -> Delivery {
        let page = self.current_page();
        self.load_page(page).await
    }

    /// `None` when already on the last page.
    pub async fn next(&self) -> Option<Delivery> {
        let target = {
            let pager = self.pager();
            if !pager.can_next() {
                return None;
            }
            pager.current() + 1
        };
        Some(self.load_page(target).await)
    }

    /// `None` when already on the first page.
    pub async fn prev(&self) -> Option<Delivery> {
        let target = {
            let pager = self.pager();
            if !pager.can_prev() {
                return None;
            }
            pager.current() - 1
        };
        Some(self.load_page(target).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::PageItem::{Ellipsis, Page};
    use crate::source::fixture::Fixture;
    use crate::source::{SimulatedDataSource, SimulatedLatency};
    use chrono::{TimeZone, Utc};

    fn screen(per_page: u32) -> ReportsScreen {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        let source = SimulatedDataSource::new(Fixture::load(as_of).unwrap(), SimulatedLatency::none());
        ReportsScreen::with_page_size(Arc::new(source), per_page)
    }

    #[tokio::test]
    async fn first_page_fits_everything_and_hides_controls() {
        let s = screen(REPORTS_PER_PAGE);
        assert_eq!(s.load_page(1).await, Delivery::Applied);
        let list = s.state().ready().cloned().unwrap();
        assert_eq!(list.reports.len(), 6);
        assert_eq!(list.total_pages, 1);
        assert!(list.window.is_empty());
        assert!(s.next().await.is_none());
        assert!(s.prev().await.is_none());
    }

    #[tokio::test]
    async fn navigation_moves_through_pages_and_stops_at_bounds() {
        let s = screen(1);
        s.load_page(1).await;
        assert_eq!(s.total_pages(), 6);
        assert!(s.prev().await.is_none());

        for expected in 2..=6 {
            assert_eq!(s.next().await, Some(Delivery::Applied));
            assert_eq!(s.current_page(), expected);
        }
        assert!(s.next().await.is_none());

        let list = s.state().ready().cloned().unwrap();
        assert_eq!(list.reports[0].id, "report-2025-10");
        assert_eq!(
            list.window,
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6)]
        );
        assert!(!list.window.contains(&Ellipsis));
    }

    #[tokio::test]
    async fn page_past_the_end_shows_the_last_page() {
        let s = screen(REPORTS_PER_PAGE);
        assert_eq!(s.load_page(3).await, Delivery::Applied);
        let list = s.state().ready().cloned().unwrap();
        assert_eq!(list.total, 6);
        assert_eq!(list.page, 1);
        assert_eq!(list.reports.len(), 6);
        assert_eq!(s.current_page(), 1);

        let s = screen(4);
        s.load_page(9).await;
        let list = s.state().ready().cloned().unwrap();
        assert_eq!(list.page, 2);
        assert_eq!(list.reports.len(), 2);
        assert_eq!(s.current_page(), 2);
    }

    #[tokio::test]
    async fn no_reports_at_all_is_empty() {
        let as_of = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        let mut fixture = Fixture::load(as_of).unwrap();
        fixture.reports.clear();
        let s = ReportsScreen::new(Arc::new(SimulatedDataSource::new(fixture, SimulatedLatency::none())));
        s.load_page(2).await;
        assert_eq!(s.state(), ScreenState::Empty);
    }
}
