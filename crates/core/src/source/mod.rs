use crate::config::Settings;
use crate::domain::analysis::AnalysisResult;
use crate::domain::backtest::{BacktestJob, BacktestRequest};
use crate::domain::report::{DownloadLink, ReportPage};
use crate::domain::signal::Horizon;
use crate::domain::subscription::{SubscriptionData, Unsubscribed};
use crate::envelope::Envelope;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod failure;
pub mod fixture;
pub mod live;
pub mod simulated;

pub use live::LiveDataSource;
pub use simulated::{SimulatedDataSource, SimulatedLatency};

/// Service-side default for `limit` on `/signals`.
pub const DEFAULT_SIGNAL_LIMIT: u32 = 20;
pub const DEFAULT_REPORT_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Horizon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// The operation set every provider offers.
///
/// Implementations never fail outward: every call resolves to an envelope
/// (or, for `health`, a plain boolean).
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn signals(&self, query: &SignalQuery) -> Envelope<AnalysisResult>;

    async fn reports(&self, query: &ReportQuery) -> Envelope<ReportPage>;

    async fn report_download(&self, report_id: &str) -> Envelope<DownloadLink>;

    async fn run_backtest(&self, request: &BacktestRequest) -> Envelope<BacktestJob>;

    async fn backtest_status(&self, job_id: &str) -> Envelope<BacktestJob>;

    async fn subscribe(&self, email: &str) -> Envelope<SubscriptionData>;

    async fn unsubscribe(&self, email: &str) -> Envelope<Unsubscribed>;

    async fn health(&self) -> bool;
}

/// Resolve the provider once at startup; callers only ever see the trait object.
pub fn from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn DataSource>> {
    if settings.use_simulated_data {
        let latency = SimulatedLatency::default().scaled(settings.simulated_latency_scale);
        let source = SimulatedDataSource::new(fixture::Fixture::standard()?, latency);
        tracing::info!(
            provider = source.provider_name(),
            latency_scale = settings.simulated_latency_scale,
            "using simulated data source"
        );
        return Ok(Arc::new(source));
    }

    let source = LiveDataSource::from_settings(settings)?;
    tracing::info!(
        provider = source.provider_name(),
        base_url = %settings.api_url,
        "using live data source"
    );
    Ok(Arc::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_simulated_source_from_settings() {
        let settings = Settings {
            use_simulated_data: true,
            simulated_latency_scale: 0.0,
            ..Settings::default()
        };
        let source = from_settings(&settings).unwrap();
        assert_eq!(source.provider_name(), "simulated");
    }

    #[test]
    fn selects_live_source_by_default() {
        let source = from_settings(&Settings::default()).unwrap();
        assert_eq!(source.provider_name(), "live_http");
    }

    #[test]
    fn signal_query_omits_unset_parameters() {
        let q = SignalQuery {
            period: Some(Horizon::TenDays),
            ..SignalQuery::default()
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            serde_json::json!({"period": "10d"})
        );
    }
}
