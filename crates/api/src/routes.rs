use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sigdash_core::domain::analysis::AnalysisResult;
use sigdash_core::domain::backtest::{BacktestJob, BacktestRequest};
use sigdash_core::domain::report::{DownloadLink, ReportPage};
use sigdash_core::domain::subscription::{SubscribeRequest, SubscriptionData, Unsubscribed};
use sigdash_core::envelope::{Envelope, ErrorCode};
use sigdash_core::source::{DataSource, ReportQuery, SignalQuery};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
}

/// The signal service's REST surface, mounted under `/api`.
pub fn router(source: Arc<dyn DataSource>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/signals", get(get_signals))
        .route("/reports", get(get_reports))
        .route("/reports/:report_id/download", get(get_report_download))
        .route("/backtest", post(post_backtest))
        .route("/backtest/:job_id", get(get_backtest_status))
        .route("/subscribe", post(post_subscribe))
        .route("/subscribe/:email", delete(delete_subscribe))
        .with_state(AppState { source });

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

type Reply<T> = (StatusCode, Json<Envelope<T>>);

fn status_for(code: Option<ErrorCode>) -> StatusCode {
    match code {
        None => StatusCode::OK,
        Some(ErrorCode::Invalid) => StatusCode::BAD_REQUEST,
        Some(ErrorCode::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorCode::Conflict) => StatusCode::CONFLICT,
        Some(ErrorCode::Transport | ErrorCode::HttpStatus | ErrorCode::Decode) => {
            StatusCode::BAD_GATEWAY
        }
        Some(ErrorCode::Unknown) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply<T: Serialize>(envelope: Envelope<T>) -> Reply<T> {
    if envelope.success {
        return (StatusCode::OK, Json(envelope));
    }
    let status = status_for(envelope.code);
    if status.is_server_error() {
        tracing::error!(
            %status,
            error = envelope.error.as_deref().unwrap_or_default(),
            "request failed"
        );
    }
    (status, Json(envelope))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    provider: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let provider = state.source.provider_name();
    if state.source.health().await {
        (StatusCode::OK, Json(Health { status: "ok", provider }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Health {
                status: "degraded",
                provider,
            }),
        )
    }
}

async fn get_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> Reply<AnalysisResult> {
    reply(state.source.signals(&query).await)
}

async fn get_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Reply<ReportPage> {
    reply(state.source.reports(&query).await)
}

async fn get_report_download(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Reply<DownloadLink> {
    reply(state.source.report_download(&report_id).await)
}

async fn post_backtest(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Reply<BacktestJob> {
    reply(state.source.run_backtest(&request).await)
}

async fn get_backtest_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Reply<BacktestJob> {
    reply(state.source.backtest_status(&job_id).await)
}

async fn post_subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Reply<SubscriptionData> {
    reply(state.source.subscribe(&body.email).await)
}

async fn delete_subscribe(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Reply<Unsubscribed> {
    reply(state.source.unsubscribe(&email).await)
}
