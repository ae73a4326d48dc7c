use crate::domain::analysis::{AnalysisResult, PerformanceMetrics, SectorAnalysis};
use crate::domain::signal::{
    sector_display_name, Confidence, ConfidenceLevel, Horizon, Signal, SignalType,
    UNCLASSIFIED_SECTOR,
};
use anyhow::{ensure, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSignal {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub sector_name: Option<String>,
    pub signal_type: String,
    #[serde(default, deserialize_with = "loose_f64")]
    pub yoy_growth: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub mom_growth: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub expected_return: Option<f64>,
    #[serde(default, alias = "confidence")]
    pub confidence_score: Option<Value>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub surprise_z: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub vs_kospi: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub kospi_return: Option<f64>,
    #[serde(default)]
    pub period: Option<String>,
}

impl RawSignal {
    pub fn validate_and_into_signal(self) -> anyhow::Result<Signal> {
        let symbol = self.symbol.trim().to_string();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");

        let signal_type = self
            .signal_type
            .parse::<SignalType>()
            .with_context(|| format!("invalid signalType for {symbol}"))?;

        let id = non_empty(self.id).unwrap_or_else(|| format!("signal-{symbol}"));
        let company_name = non_empty(self.company_name).unwrap_or_else(|| symbol.clone());
        let sector = non_empty(self.sector).unwrap_or_else(|| UNCLASSIFIED_SECTOR.to_string());
        let sector_name = non_empty(self.sector_name)
            .or_else(|| sector_display_name(&sector).map(str::to_string))
            .unwrap_or_else(|| sector.clone());

        Ok(Signal {
            id,
            symbol,
            company_name,
            sector,
            sector_name,
            signal_type,
            yoy_growth: self.yoy_growth.unwrap_or(0.0),
            mom_growth: self.mom_growth.unwrap_or(0.0),
            expected_return: self.expected_return.unwrap_or(0.0),
            confidence: normalize_confidence(self.confidence_score.as_ref()),
            surprise_z: self.surprise_z,
            vs_benchmark: self.vs_kospi,
            benchmark_return: self.kospi_return,
            period: loose_horizon(self.period.as_deref()),
        })
    }
}

impl TryFrom<RawSignal> for Signal {
    type Error = anyhow::Error;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        raw.validate_and_into_signal()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerformance {
    #[serde(default, deserialize_with = "loose_f64")]
    pub avg_return: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub win_rate: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub sharpe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub period: Option<String>,
}

impl From<RawPerformance> for PerformanceMetrics {
    fn from(raw: RawPerformance) -> Self {
        let max_drawdown = raw.max_drawdown.unwrap_or(0.0);
        Self {
            avg_return: raw.avg_return.unwrap_or(0.0),
            win_rate: raw.win_rate.unwrap_or(0.0).clamp(0.0, 100.0),
            sharpe_ratio: raw.sharpe_ratio.unwrap_or(0.0),
            // Some producers report drawdown magnitude; the convention here is <= 0.
            max_drawdown: if max_drawdown > 0.0 {
                -max_drawdown
            } else {
                max_drawdown
            },
            period: loose_horizon(raw.period.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSectorAnalysis {
    pub sector: String,
    #[serde(default)]
    pub sector_name: Option<String>,
    #[serde(default, alias = "avgYoyGrowth", rename = "avgYoYGrowth", deserialize_with = "loose_f64")]
    pub avg_yoy_growth: Option<f64>,
    #[serde(default, alias = "avgMomGrowth", rename = "avgMoMGrowth", deserialize_with = "loose_f64")]
    pub avg_mom_growth: Option<f64>,
    #[serde(default)]
    pub signal_count: u64,
}

impl TryFrom<RawSectorAnalysis> for SectorAnalysis {
    type Error = anyhow::Error;

    fn try_from(raw: RawSectorAnalysis) -> Result<Self, Self::Error> {
        let sector = raw.sector.trim().to_string();
        ensure!(!sector.is_empty(), "sector must be non-empty");
        let sector_name = non_empty(raw.sector_name)
            .or_else(|| sector_display_name(&sector).map(str::to_string))
            .unwrap_or_else(|| sector.clone());

        Ok(Self {
            sector,
            sector_name,
            avg_yoy_growth: raw.avg_yoy_growth.unwrap_or(0.0),
            avg_mom_growth: raw.avg_mom_growth.unwrap_or(0.0),
            signal_count: raw.signal_count,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisResult {
    #[serde(deserialize_with = "loose_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub top_picks: Vec<RawSignal>,
    #[serde(default)]
    pub performance: RawPerformance,
    #[serde(default)]
    pub sector_analysis: Vec<SectorAnalysis>,
    #[serde(default)]
    pub total_signals: Option<u64>,
}

impl RawAnalysisResult {
    pub fn validate_and_into_result(self) -> anyhow::Result<AnalysisResult> {
        let mut top_picks = Vec::with_capacity(self.top_picks.len());
        for (idx, raw) in self.top_picks.into_iter().enumerate() {
            let signal = raw
                .validate_and_into_signal()
                .with_context(|| format!("invalid top pick at rank {}", idx + 1))?;
            top_picks.push(signal);
        }

        let total_signals = self.total_signals.unwrap_or(top_picks.len() as u64);
        ensure!(
            top_picks.len() as u64 <= total_signals,
            "topPicks has {} entries but totalSignals is {total_signals}",
            top_picks.len()
        );

        let result = AnalysisResult {
            date: self.date,
            top_picks,
            performance: self.performance.into(),
            sector_analysis: self.sector_analysis,
            total_signals,
        };

        let sector_total = result.sector_signal_total();
        if !result.sector_analysis.is_empty() && sector_total != total_signals {
            tracing::warn!(
                sector_total,
                total_signals,
                "sector signal counts do not add up to totalSignals"
            );
        }

        Ok(result)
    }
}

impl TryFrom<RawAnalysisResult> for AnalysisResult {
    type Error = anyhow::Error;

    fn try_from(raw: RawAnalysisResult) -> Result<Self, Self::Error> {
        raw.validate_and_into_result()
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn normalize_confidence(raw: Option<&Value>) -> Confidence {
    let Some(raw) = raw else {
        return Confidence::default();
    };
    if let Value::String(s) = raw {
        if let Ok(level) = s.parse::<ConfidenceLevel>() {
            return Confidence::Level(level);
        }
    }
    match number_from_value(raw) {
        Some(score) if (0.0..=100.0).contains(&score) => Confidence::Score(score),
        _ => Confidence::default(),
    }
}

fn loose_horizon(s: Option<&str>) -> Option<Horizon> {
    s.and_then(|s| s.parse::<Horizon>().ok())
}

fn number_from_value(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Accepts numbers, numeric strings (optionally suffixed with `%`) and `null`.
pub fn loose_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(number_from_value))
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (read as UTC midnight).
pub fn loose_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_datetime(&s).map_err(serde::de::Error::custom)
}

fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("not an RFC 3339 timestamp or YYYY-MM-DD date: {s:?}"))?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}
