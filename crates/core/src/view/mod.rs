pub mod dashboard;
pub mod latest;
pub mod reports;

pub use dashboard::{Dashboard, DashboardView};
pub use latest::{Delivery, LatestSlot, ScreenState, Ticket};
pub use reports::{ReportList, ReportsScreen, REPORTS_PER_PAGE};
