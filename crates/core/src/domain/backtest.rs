use crate::domain::analysis::PerformanceMetrics;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stocks: Vec<String>,
    pub strategy: String,
}

impl BacktestRequest {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        stocks: Vec<String>,
        strategy: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let request = Self {
            start_date,
            end_date,
            stocks: stocks
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            strategy: strategy.into().trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.start_date <= self.end_date,
            "startDate {} is after endDate {}",
            self.start_date,
            self.end_date
        );
        ensure!(!self.stocks.is_empty(), "at least one stock is required");
        ensure!(!self.strategy.is_empty(), "strategy must be non-empty");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BacktestStatus {
    Pending,
    Running,
    Completed,
    #[default]
    Failed,
}

impl BacktestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BacktestStatus::Completed | BacktestStatus::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestJob {
    pub job_id: String,
    pub status: BacktestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PerformanceMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_trims_stock_list_and_rejects_inverted_range() {
        let req = BacktestRequest::new(
            d(2024, 1, 1),
            d(2024, 6, 30),
            vec![" AAPL ".into(), "".into()],
            "momentum",
        )
        .unwrap();
        assert_eq!(req.stocks, vec!["AAPL".to_string()]);

        assert!(BacktestRequest::new(d(2024, 6, 30), d(2024, 1, 1), vec!["AAPL".into()], "m").is_err());
        assert!(BacktestRequest::new(d(2024, 1, 1), d(2024, 1, 2), vec![], "m").is_err());
    }

    #[test]
    fn status_uses_lowercase_wire_names() {
        assert_eq!(
            serde_json::to_value(BacktestStatus::Completed).unwrap(),
            "completed"
        );
        assert!(BacktestStatus::Failed.is_terminal());
        assert!(!BacktestStatus::Running.is_terminal());
    }
}
