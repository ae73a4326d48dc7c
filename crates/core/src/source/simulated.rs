use crate::domain::analysis::{AnalysisResult, PerformanceMetrics};
use crate::domain::backtest::{BacktestJob, BacktestRequest, BacktestStatus};
use crate::domain::report::{DownloadLink, ReportPage};
use crate::domain::signal::Signal;
use crate::domain::subscription::{SubscriptionData, Unsubscribed};
use crate::envelope::{Envelope, ErrorCode};
use crate::source::failure::SourceFailure;
use crate::source::fixture::Fixture;
use crate::source::{DataSource, ReportQuery, SignalQuery, DEFAULT_REPORT_LIMIT, DEFAULT_SIGNAL_LIMIT};
use crate::subscription::email::validate_email;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;

const DOWNLOAD_LINK_TTL_SECS: u64 = 3600;

/// Per-operation artificial delay, so the simulated source feels like the
/// real service in the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedLatency {
    pub read: Duration,
    pub download: Duration,
    pub backtest_submit: Duration,
    pub backtest_status: Duration,
    pub subscribe: Duration,
    pub health: Duration,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(800),
            download: Duration::from_millis(500),
            backtest_submit: Duration::from_millis(2000),
            backtest_status: Duration::from_millis(300),
            subscribe: Duration::from_millis(800),
            health: Duration::from_millis(200),
        }
    }
}

impl SimulatedLatency {
    pub fn none() -> Self {
        Self {
            read: Duration::ZERO,
            download: Duration::ZERO,
            backtest_submit: Duration::ZERO,
            backtest_status: Duration::ZERO,
            subscribe: Duration::ZERO,
            health: Duration::ZERO,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        let scale = |d: Duration| {
            if factor.is_finite() && factor > 0.0 {
                d.mul_f64(factor)
            } else {
                Duration::ZERO
            }
        };
        Self {
            read: scale(self.read),
            download: scale(self.download),
            backtest_submit: scale(self.backtest_submit),
            backtest_status: scale(self.backtest_status),
            subscribe: scale(self.subscribe),
            health: scale(self.health),
        }
    }
}

/// Serves the fixture with the live service's filter/limit/offset semantics.
#[derive(Debug)]
pub struct SimulatedDataSource {
    fixture: Fixture,
    latency: SimulatedLatency,
    subscriptions: tokio::sync::Mutex<HashMap<String, SubscriptionData>>,
    jobs: tokio::sync::Mutex<HashMap<String, BacktestJob>>,
}

impl SimulatedDataSource {
    pub fn new(fixture: Fixture, latency: SimulatedLatency) -> Self {
        Self {
            fixture,
            latency,
            subscriptions: tokio::sync::Mutex::new(HashMap::new()),
            jobs: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    async fn pause(&self, op: &'static str, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::debug!(op, delay_ms = delay.as_millis() as u64, "simulated latency");
        tokio::time::sleep(delay).await;
    }

    fn analysis(&self, query: &SignalQuery) -> AnalysisResult {
        let filtered: Vec<Signal> = match query.sector.as_deref().map(str::trim) {
            Some(sector) if !sector.is_empty() => self
                .fixture
                .signals
                .iter()
                .filter(|s| s.sector.eq_ignore_ascii_case(sector))
                .cloned()
                .collect(),
            _ => self.fixture.signals.clone(),
        };
        let limit = query.limit.unwrap_or(DEFAULT_SIGNAL_LIMIT) as usize;

        tracing::debug!(
            sector = ?query.sector,
            period = ?query.period,
            matched = filtered.len(),
            limit,
            "simulated signals query"
        );

        self.fixture
            .analysis(self.fixture.as_of, &filtered, limit, query.period)
    }

    fn report_page(&self, query: &ReportQuery) -> ReportPage {
        let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT) as usize;
        let offset = query.offset.unwrap_or(0) as usize;
        let all = &self.fixture.reports;

        let reports = all.iter().skip(offset).take(limit).cloned().collect();
        ReportPage {
            reports,
            total: all.len() as u64,
            has_more: offset + limit < all.len(),
        }
    }

    fn download_link(&self, report_id: &str) -> Result<DownloadLink, SourceFailure> {
        let report = self
            .fixture
            .reports
            .iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| SourceFailure::rejected(ErrorCode::NotFound, "Report not found"))?;
        Ok(DownloadLink {
            url: report.pdf_url.clone(),
            expires_in: DOWNLOAD_LINK_TTL_SECS,
        })
    }

    /// Replays the requested symbols against the fixture: mean expected return
    /// and the share of picks with a positive outlook.
    fn simulate_backtest(&self, request: &BacktestRequest) -> Result<BacktestJob, SourceFailure> {
        request
            .validate()
            .map_err(|e| SourceFailure::rejected(ErrorCode::Invalid, e.to_string()))?;

        let matched: Vec<&Signal> = self
            .fixture
            .signals
            .iter()
            .filter(|s| request.stocks.iter().any(|t| t.eq_ignore_ascii_case(&s.symbol)))
            .collect();

        let base = self.fixture.performance;
        let result = if matched.is_empty() {
            PerformanceMetrics { period: None, ..base }
        } else {
            let n = matched.len() as f64;
            let avg_return = matched.iter().map(|s| s.expected_return).sum::<f64>() / n;
            let winners = matched.iter().filter(|s| s.expected_return > 0.0).count() as f64;
            PerformanceMetrics {
                avg_return,
                win_rate: winners / n * 100.0,
                sharpe_ratio: base.sharpe_ratio,
                max_drawdown: base.max_drawdown,
                period: None,
            }
        };

        Ok(BacktestJob {
            job_id: format!("job-{}", uuid::Uuid::new_v4()),
            status: BacktestStatus::Completed,
            result: Some(result),
        })
    }
}

#[async_trait::async_trait]
impl DataSource for SimulatedDataSource {
    fn provider_name(&self) -> &'static str {
        "simulated"
    }

    async fn signals(&self, query: &SignalQuery) -> Envelope<AnalysisResult> {
        self.pause("signals", self.latency.read).await;
        Envelope::ok(self.analysis(query))
    }

    async fn reports(&self, query: &ReportQuery) -> Envelope<ReportPage> {
        self.pause("reports", self.latency.read).await;
        Envelope::ok(self.report_page(query))
    }

    async fn report_download(&self, report_id: &str) -> Envelope<DownloadLink> {
        self.pause("report_download", self.latency.download).await;
        match self.download_link(report_id) {
            Ok(link) => Envelope::ok(link),
            Err(failure) => failure.into_envelope(),
        }
    }

    async fn run_backtest(&self, request: &BacktestRequest) -> Envelope<BacktestJob> {
        self.pause("run_backtest", self.latency.backtest_submit).await;
        match self.simulate_backtest(request) {
            Ok(job) => {
                self.jobs.lock().await.insert(job.job_id.clone(), job.clone());
                Envelope::ok(job)
            }
            Err(failure) => failure.into_envelope(),
        }
    }

    async fn backtest_status(&self, job_id: &str) -> Envelope<BacktestJob> {
        self.pause("backtest_status", self.latency.backtest_status).await;
        match self.jobs.lock().await.get(job_id) {
            Some(job) => Envelope::ok(job.clone()),
            None => SourceFailure::rejected(ErrorCode::NotFound, "Backtest job not found").into_envelope(),
        }
    }

    async fn subscribe(&self, email: &str) -> Envelope<SubscriptionData> {
        self.pause("subscribe", self.latency.subscribe).await;
        let email = match validate_email(email) {
            Ok(email) => email,
            Err(e) => return SourceFailure::rejected(ErrorCode::Invalid, e.to_string()).into_envelope(),
        };

        let now = Utc::now();
        let mut subscriptions = self.subscriptions.lock().await;
        let (record, is_new) = match subscriptions.get_mut(&email.to_ascii_lowercase()) {
            Some(existing) => {
                existing.updated_at = now;
                existing.notification_enabled = true;
                (existing.clone(), false)
            }
            None => {
                let record = SubscriptionData {
                    email: email.clone(),
                    notification_enabled: true,
                    created_at: now,
                    updated_at: now,
                    is_new: None,
                };
                subscriptions.insert(email.to_ascii_lowercase(), record.clone());
                (record, true)
            }
        };

        tracing::debug!(is_new, total = subscriptions.len(), "simulated subscribe");
        Envelope::ok(SubscriptionData {
            is_new: Some(is_new),
            ..record
        })
    }

    async fn unsubscribe(&self, email: &str) -> Envelope<Unsubscribed> {
        self.pause("unsubscribe", self.latency.subscribe).await;
        let key = email.trim().to_ascii_lowercase();
        match self.subscriptions.lock().await.remove(&key) {
            Some(record) => Envelope::ok(Unsubscribed {
                email: record.email,
            }),
            None => SourceFailure::rejected(
                ErrorCode::NotFound,
                format!("No active subscription for {}", email.trim()),
            )
            .into_envelope(),
        }
    }

    async fn health(&self) -> bool {
        self.pause("health", self.latency.health).await;
        true
    }
}
