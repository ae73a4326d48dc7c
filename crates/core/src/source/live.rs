use crate::config::Settings;
use crate::domain::analysis::AnalysisResult;
use crate::domain::backtest::{BacktestJob, BacktestRequest};
use crate::domain::report::{DownloadLink, ReportPage};
use crate::domain::subscription::{SubscribeRequest, SubscriptionData, Unsubscribed};
use crate::envelope::{Envelope, ErrorCode};
use crate::source::failure::{envelope_from_error, SourceFailure};
use crate::source::{DataSource, ReportQuery, SignalQuery};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Talks to the signal service over HTTP.
#[derive(Debug, Clone)]
pub struct LiveDataSource {
    http: reqwest::Client,
    base_url: Url,
}

/// Envelope as received, before `data` is decoded into a concrete type.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<ErrorCode>,
}

/// Error bodies are not guaranteed to be full envelopes.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<ErrorCode>,
}

impl LiveDataSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api_url, Duration::from_secs(settings.api_timeout_secs))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid signal service base URL: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "signal service URL cannot be used as a base: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build signal service http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base URL cannot have path segments: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self
            .http
            .request(method, self.url(segments)?)
            .headers(Self::headers()))
    }

    async fn fetch_once<T>(&self, req: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let res = req
            .send()
            .await
            .map_err(|e| SourceFailure::transport(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| SourceFailure::transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_default();
            return Err(SourceFailure::http_status(status.as_u16(), body.error, body.code).into());
        }

        let raw = serde_json::from_str::<RawEnvelope>(&text)
            .map_err(|e| SourceFailure::decode(format!("response is not a valid envelope: {e}")))?;

        if !raw.success {
            let message = raw.error.unwrap_or_else(|| "Unknown error".to_string());
            return Err(SourceFailure::rejected(raw.code.unwrap_or(ErrorCode::Unknown), message).into());
        }

        // `null` data is how some endpoints acknowledge without a payload.
        let data = match raw.data {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        serde_json::from_value::<T>(data)
            .map_err(|e| SourceFailure::decode(format!("unexpected response data: {e:#}")).into())
    }

    async fn call<T>(&self, endpoint: &'static str, req: Result<RequestBuilder>) -> Envelope<T>
    where
        T: DeserializeOwned + Default,
    {
        let res = match req {
            Ok(req) => self.fetch_once::<T>(req).await,
            Err(err) => Err(err),
        };

        match res {
            Ok(data) => Envelope::ok(data),
            Err(err) => {
                tracing::warn!(endpoint, error = %format!("{err:#}"), "signal service call failed");
                envelope_from_error(&err)
            }
        }
    }
}

#[async_trait::async_trait]
impl DataSource for LiveDataSource {
    fn provider_name(&self) -> &'static str {
        "live_http"
    }

    async fn signals(&self, query: &SignalQuery) -> Envelope<AnalysisResult> {
        let req = self
            .request(Method::GET, &["signals"])
            .map(|r| r.query(query));
        self.call("GET /signals", req).await
    }

    async fn reports(&self, query: &ReportQuery) -> Envelope<ReportPage> {
        let req = self
            .request(Method::GET, &["reports"])
            .map(|r| r.query(query));
        self.call("GET /reports", req).await
    }

    async fn report_download(&self, report_id: &str) -> Envelope<DownloadLink> {
        let req = self.request(Method::GET, &["reports", report_id, "download"]);
        self.call("GET /reports/{id}/download", req).await
    }

    async fn run_backtest(&self, request: &BacktestRequest) -> Envelope<BacktestJob> {
        let req = self
            .request(Method::POST, &["backtest"])
            .map(|r| r.json(request));
        self.call("POST /backtest", req).await
    }

    async fn backtest_status(&self, job_id: &str) -> Envelope<BacktestJob> {
        let req = self.request(Method::GET, &["backtest", job_id]);
        self.call("GET /backtest/{jobId}", req).await
    }

    async fn subscribe(&self, email: &str) -> Envelope<SubscriptionData> {
        let body = SubscribeRequest {
            email: email.to_string(),
        };
        let req = self
            .request(Method::POST, &["subscribe"])
            .map(|r| r.json(&body));
        self.call("POST /subscribe", req).await
    }

    async fn unsubscribe(&self, email: &str) -> Envelope<Unsubscribed> {
        let req = self.request(Method::DELETE, &["subscribe", email]);
        self.call("DELETE /subscribe/{email}", req).await
    }

    async fn health(&self) -> bool {
        let req = match self.request(Method::GET, &["health"]) {
            Ok(req) => req,
            Err(err) => {
                tracing::warn!(error = %err, "health check request could not be built");
                return false;
            }
        };
        match req.send().await {
            Ok(res) => res.status().is_success(),
            Err(err) => {
                tracing::debug!(error = %err, "health check failed");
                false
            }
        }
    }
}
