use crate::aggregate::{
    aggregate_sectors, top_picks, type_distribution, TopPick, TypeDistribution, DEFAULT_TOP_N,
};
use crate::domain::analysis::{AnalysisResult, PerformanceMetrics, SectorAnalysis};
use crate::envelope::EnvelopeError;
use crate::source::{DataSource, SignalQuery};
use crate::view::latest::{Delivery, LatestSlot, ScreenState};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Everything the dashboard draws, derived from one analysis result.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub date: DateTime<Utc>,
    pub top_picks: Vec<TopPick>,
    /// Over the full filtered signal set, not just the top picks.
    pub distribution: TypeDistribution,
    pub sectors: Vec<SectorAnalysis>,
    pub performance: PerformanceMetrics,
    pub total_signals: u64,
}

impl DashboardView {
    pub fn from_result(result: AnalysisResult, top_n: usize) -> Self {
        // Sources that skip the breakdown still get one from the returned signals.
        let sectors = if result.sector_analysis.is_empty() {
            aggregate_sectors(&result.top_picks)
        } else {
            result.sector_analysis
        };

        Self {
            date: result.date,
            top_picks: top_picks(&result.top_picks, top_n),
            distribution: type_distribution(&result.top_picks),
            sectors,
            performance: result.performance,
            total_signals: result.total_signals,
        }
    }
}

pub struct Dashboard {
    source: Arc<dyn DataSource>,
    top_n: usize,
    query: Mutex<SignalQuery>,
    slot: LatestSlot<DashboardView>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_top_n(source, DEFAULT_TOP_N)
    }

    pub fn with_top_n(source: Arc<dyn DataSource>, top_n: usize) -> Self {
        Self {
            source,
            top_n,
            query: Mutex::new(SignalQuery::default()),
            slot: LatestSlot::new(),
        }
    }

    /// Fetch with a new filter. A response that arrives after a newer `load`
    /// was issued, or after `close`, is discarded.
    ///
    /// `query.limit` caps the picks shown. The signal mix always covers the
    /// full filtered set, so a truncated response is fetched again uncapped.
    pub async fn load(&self, query: SignalQuery) -> Delivery {
        let ticket = self.slot.issue();
        *self.query.lock().unwrap_or_else(PoisonError::into_inner) = query.clone();

        let top_n = match query.limit {
            Some(limit) => self.top_n.min(limit as usize),
            None => self.top_n,
        };
        let state = match self.fetch_all(&query).await {
            Ok(result) if result.top_picks.is_empty() => ScreenState::Empty,
            Ok(result) => ScreenState::Ready(DashboardView::from_result(result, top_n)),
            Err(err) => {
                tracing::warn!(
                    provider = self.source.provider_name(),
                    error = %err,
                    "dashboard fetch failed"
                );
                ScreenState::Failed(err)
            }
        };
        self.slot.deliver(ticket, state)
    }

    async fn fetch_all(&self, query: &SignalQuery) -> Result<AnalysisResult, EnvelopeError> {
        let result = self.source.signals(query).await.into_result()?;
        let returned = result.top_picks.len() as u64;
        if returned >= result.total_signals {
            return Ok(result);
        }

        tracing::debug!(
            returned,
            total = result.total_signals,
            "signal list truncated, fetching the full set"
        );
        let full = SignalQuery {
            limit: Some(u32::try_from(result.total_signals).unwrap_or(u32::MAX)),
            ..query.clone()
        };
        self.source.signals(&full).await.into_result()
    }

    pub async fn reload(&self) -> Delivery {
        let query = self.query();
        self.load(query).await
    }

    pub fn query(&self) -> SignalQuery {
        self.query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> ScreenState<DashboardView> {
        self.slot.get()
    }

    pub fn close(&self) {
        self.slot.close();
    }
}
