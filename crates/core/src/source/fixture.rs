use crate::aggregate::{aggregate_sectors, DEFAULT_TOP_N};
use crate::domain::analysis::{AnalysisResult, PerformanceMetrics};
use crate::domain::report::Report;
use crate::domain::signal::{Horizon, Signal};
use crate::domain::wire::RawSignal;
use anyhow::{Context, Result};
use chrono::{DateTime, Months, Utc};
use serde::Deserialize;

const STANDARD_FIXTURE: &str = include_str!("../../fixtures/signals.json");
const REPORT_MONTHS: u32 = 6;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    performance: PerformanceMetrics,
    signals: Vec<RawSignal>,
}

/// In-memory data set behind the simulated source.
///
/// Signals go through the same validated construction as live responses and
/// are kept ranked by expected return, highest first.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub as_of: DateTime<Utc>,
    pub performance: PerformanceMetrics,
    pub signals: Vec<Signal>,
    pub reports: Vec<Report>,
}

impl Fixture {
    pub fn standard() -> Result<Self> {
        Self::load(Utc::now())
    }

    pub fn load(as_of: DateTime<Utc>) -> Result<Self> {
        Self::from_json(STANDARD_FIXTURE, as_of)
    }

    pub fn from_json(json: &str, as_of: DateTime<Utc>) -> Result<Self> {
        let file: FixtureFile =
            serde_json::from_str(json).context("fixture is not valid JSON for the fixture schema")?;

        let mut signals = Vec::with_capacity(file.signals.len());
        for (idx, raw) in file.signals.into_iter().enumerate() {
            let signal = raw
                .validate_and_into_signal()
                .with_context(|| format!("invalid fixture signal #{}", idx + 1))?;
            signals.push(signal);
        }
        signals.sort_by(|a, b| b.expected_return.total_cmp(&a.expected_return));

        let mut fixture = Self {
            as_of,
            performance: file.performance,
            signals,
            reports: Vec::new(),
        };
        fixture.reports = fixture.monthly_reports()?;
        Ok(fixture)
    }

    /// Analysis over `signals` (already filtered), keeping the first `limit` as picks.
    pub fn analysis(
        &self,
        date: DateTime<Utc>,
        signals: &[Signal],
        limit: usize,
        period: Option<Horizon>,
    ) -> AnalysisResult {
        let top_picks = signals
            .iter()
            .take(limit)
            .cloned()
            .map(|mut s| {
                if period.is_some() {
                    s.period = period;
                }
                s
            })
            .collect();

        let mut performance = self.performance;
        if period.is_some() {
            performance.period = period;
        }

        AnalysisResult {
            date,
            top_picks,
            performance,
            sector_analysis: aggregate_sectors(signals),
            total_signals: signals.len() as u64,
        }
    }

    fn monthly_reports(&self) -> Result<Vec<Report>> {
        let mut reports = Vec::with_capacity(REPORT_MONTHS as usize);
        for i in 0..REPORT_MONTHS {
            let date = self
                .as_of
                .checked_sub_months(Months::new(i))
                .with_context(|| format!("cannot step {i} months back from {}", self.as_of))?;
            let month = date.format("%Y-%m");
            reports.push(Report {
                id: format!("report-{month}"),
                date,
                pdf_url: format!("/reports/{month}-report.pdf"),
                analysis_result: self.analysis(date, &self.signals, DEFAULT_TOP_N, None),
                created_at: date,
            });
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> Fixture {
        Fixture::load(Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn standard_fixture_is_ranked_by_expected_return() {
        let f = fixture();
        assert!(f.signals.len() >= 10);
        assert!(f
            .signals
            .windows(2)
            .all(|w| w[0].expected_return >= w[1].expected_return));
    }

    #[test]
    fn monthly_reports_step_back_from_as_of() {
        let f = fixture();
        let ids: Vec<_> = f.reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "report-2026-03",
                "report-2026-02",
                "report-2026-01",
                "report-2025-12",
                "report-2025-11",
                "report-2025-10",
            ]
        );
        assert_eq!(f.reports[0].pdf_url, "/reports/2026-03-report.pdf");
    }

    #[test]
    fn analysis_keeps_sector_counts_consistent_with_total() {
        let f = fixture();
        let a = f.analysis(f.as_of, &f.signals, 5, Some(Horizon::TwentyDays));
        assert_eq!(a.top_picks.len(), 5);
        assert_eq!(a.total_signals, f.signals.len() as u64);
        assert_eq!(a.sector_signal_total(), a.total_signals);
        assert!(a.top_picks.iter().all(|s| s.period == Some(Horizon::TwentyDays)));
        assert_eq!(a.performance.period, Some(Horizon::TwentyDays));
    }
}
