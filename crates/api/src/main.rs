use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sigdash_core::config::Settings;
use sigdash_core::source::fixture::Fixture;
use sigdash_core::source::{SimulatedDataSource, SimulatedLatency};

mod routes;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // This binary is the signal service stand-in, so it always serves the fixture.
    let fixture = match Fixture::standard() {
        Ok(fixture) => fixture,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "fixture failed to load");
            return Err(e);
        }
    };
    tracing::info!(
        signals = fixture.signals.len(),
        reports = fixture.reports.len(),
        as_of = %fixture.as_of,
        "fixture loaded"
    );

    let latency = SimulatedLatency::default().scaled(settings.simulated_latency_scale);
    let app = routes::router(Arc::new(SimulatedDataSource::new(fixture, latency)));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, latency_scale = settings.simulated_latency_scale, "signal api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
