use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNCLASSIFIED_SECTOR: &str = "OTHER";

// Sector codes the signal service emits, with their display names.
const SECTOR_NAMES: &[(&str, &str)] = &[
    ("IT", "Information Technology"),
    ("TELECOM", "Communication Services"),
    ("CONSUMER_DISC", "Consumer Discretionary"),
    ("CONSUMER_STAPLES", "Consumer Staples"),
    ("INDUSTRIALS", "Industrials"),
    ("ENERGY", "Energy"),
    ("HEALTHCARE", "Health Care"),
    ("FINANCIALS", "Financials"),
    ("MATERIALS", "Materials"),
    ("UTILITIES", "Utilities"),
    ("REAL_ESTATE", "Real Estate"),
    (UNCLASSIFIED_SECTOR, "Other"),
];

pub fn sector_display_name(code: &str) -> Option<&'static str> {
    SECTOR_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Hold,
    Sell,
}

impl SignalType {
    pub const ALL: [SignalType; 3] = [SignalType::Buy, SignalType::Hold, SignalType::Sell];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Hold => "HOLD",
            SignalType::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(SignalType::Buy),
            "HOLD" => Ok(SignalType::Hold),
            "SELL" => Ok(SignalType::Sell),
            other => anyhow::bail!("unknown signal type: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl FromStr for ConfidenceLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(ConfidenceLevel::High),
            "MEDIUM" => Ok(ConfidenceLevel::Medium),
            "LOW" => Ok(ConfidenceLevel::Low),
            other => anyhow::bail!("unknown confidence level: {other:?}"),
        }
    }
}

/// Either a 0..=100 score or a coarse level; snapshots of the service use both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Score(f64),
    Level(ConfidenceLevel),
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Score(0.0)
    }
}

/// Forward-looking window an expected return applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "10d")]
    TenDays,
    #[serde(rename = "20d")]
    TwentyDays,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::OneDay,
        Horizon::FiveDays,
        Horizon::TenDays,
        Horizon::TwentyDays,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::OneDay => "1d",
            Horizon::FiveDays => "5d",
            Horizon::TenDays => "10d",
            Horizon::TwentyDays => "20d",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Horizon::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown horizon: {s:?} (expected 1d, 5d, 10d or 20d)"))
    }
}

/// A single normalized stock recommendation.
///
/// Constructed only through [`crate::domain::wire::RawSignal`], so every numeric
/// field is finite and `confidence` scores are within `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "crate::domain::wire::RawSignal")]
pub struct Signal {
    pub id: String,
    pub symbol: String,
    pub company_name: String,
    pub sector: String,
    pub sector_name: String,
    pub signal_type: SignalType,
    pub yoy_growth: f64,
    pub mom_growth: f64,
    pub expected_return: f64,
    #[serde(rename = "confidenceScore")]
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surprise_z: Option<f64>,
    #[serde(rename = "vsKospi", skip_serializing_if = "Option::is_none")]
    pub vs_benchmark: Option<f64>,
    #[serde(rename = "kospiReturn", skip_serializing_if = "Option::is_none")]
    pub benchmark_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Horizon>,
}
