use crate::domain::signal::{Horizon, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "crate::domain::wire::RawPerformance")]
pub struct PerformanceMetrics {
    pub avg_return: f64,
    /// Percentage in `0..=100`.
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    /// Never positive.
    pub max_drawdown: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Horizon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "crate::domain::wire::RawSectorAnalysis")]
pub struct SectorAnalysis {
    pub sector: String,
    #[serde(rename = "sectorName")]
    pub sector_name: String,
    #[serde(rename = "avgYoYGrowth")]
    pub avg_yoy_growth: f64,
    #[serde(rename = "avgMoMGrowth")]
    pub avg_mom_growth: f64,
    #[serde(rename = "signalCount")]
    pub signal_count: u64,
}

/// One run of the signal service: ranked picks plus the aggregates around them.
///
/// `top_picks` is already ranked by the source; rank is position + 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "crate::domain::wire::RawAnalysisResult")]
pub struct AnalysisResult {
    pub date: DateTime<Utc>,
    pub top_picks: Vec<Signal>,
    pub performance: PerformanceMetrics,
    pub sector_analysis: Vec<SectorAnalysis>,
    pub total_signals: u64,
}

impl AnalysisResult {
    pub fn sector_signal_total(&self) -> u64 {
        self.sector_analysis.iter().map(|s| s.signal_count).sum()
    }
}
