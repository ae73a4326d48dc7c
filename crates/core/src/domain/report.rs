use crate::domain::analysis::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monthly snapshot produced by the report generator; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    #[serde(deserialize_with = "crate::domain::wire::loose_datetime")]
    pub date: DateTime<Utc>,
    pub pdf_url: String,
    pub analysis_result: AnalysisResult,
    #[serde(deserialize_with = "crate::domain::wire::loose_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub reports: Vec<Report>,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub url: String,
    /// Seconds until `url` stops working.
    pub expires_in: u64,
}
