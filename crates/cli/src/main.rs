use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sigdash_core::config::Settings;
use sigdash_core::domain::backtest::{BacktestJob, BacktestRequest};
use sigdash_core::domain::signal::Horizon;
use sigdash_core::envelope::Envelope;
use sigdash_core::format;
use sigdash_core::source::{DataSource, SignalQuery};
use sigdash_core::subscription::{EmailForm, Tone};
use sigdash_core::view::{Dashboard, ReportsScreen, ScreenState};
use sigdash_core::viewport::{EnvViewport, FixedViewport, ViewportObserver};

mod render;

const MAX_BACKTEST_POLLS: u32 = 60;

#[derive(Debug, Parser)]
#[command(name = "sigdash")]
struct Args {
    /// Serve everything from the built-in fixture instead of the signal service.
    #[arg(long, global = true)]
    simulated: bool,

    /// Terminal width in columns. Defaults to $COLUMNS.
    #[arg(long, global = true)]
    width: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Top picks, signal mix, sector breakdown and performance.
    Dashboard {
        #[arg(long)]
        sector: Option<String>,
        /// One of 1d, 5d, 10d, 20d.
        #[arg(long)]
        period: Option<Horizon>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Monthly report history, ten per page.
    Reports {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Print the download link for one report.
    Download { report_id: String },
    /// Submit a backtest and wait for it to finish.
    Backtest {
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        /// Comma-separated symbols.
        #[arg(long, value_delimiter = ',', required = true)]
        stocks: Vec<String>,
        #[arg(long)]
        strategy: String,
        #[arg(long, default_value_t = 1000)]
        poll_interval_ms: u64,
    },
    Subscribe { email: String },
    Unsubscribe { email: String },
    /// Exit non-zero when the data source is unreachable.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if args.simulated {
        settings.use_simulated_data = true;
    }

    let source = sigdash_core::source::from_settings(&settings)?;
    let viewport: Box<dyn ViewportObserver> = match args.width {
        Some(width) => Box::new(FixedViewport(width)),
        None => Box::new(EnvViewport),
    };

    let res = run(args.command, source, viewport.as_ref()).await;
    if let Err(e) = &res {
        sentry_anyhow::capture_anyhow(e);
    }
    res
}

async fn run(
    command: Command,
    source: Arc<dyn DataSource>,
    viewport: &dyn ViewportObserver,
) -> anyhow::Result<()> {
    match command {
        Command::Dashboard {
            sector,
            period,
            limit,
        } => {
            let dashboard = Dashboard::new(source);
            dashboard
                .load(SignalQuery {
                    sector,
                    period,
                    limit,
                })
                .await;
            match dashboard.state() {
                ScreenState::Ready(view) => print!("{}", render::dashboard(&view, viewport.layout())),
                ScreenState::Empty => println!("No signals match this filter."),
                ScreenState::Failed(err) => anyhow::bail!("could not load signals: {err}"),
                ScreenState::Loading => {}
            }
        }
        Command::Reports { page } => {
            let screen = ReportsScreen::new(source);
            screen.load_page(page).await;
            match screen.state() {
                ScreenState::Ready(list) => print!("{}", render::reports(&list, viewport.layout())),
                ScreenState::Empty => println!("No reports yet."),
                ScreenState::Failed(err) => anyhow::bail!("could not load reports: {err}"),
                ScreenState::Loading => {}
            }
        }
        Command::Download { report_id } => {
            let link = source
                .report_download(&report_id)
                .await
                .into_result()
                .with_context(|| format!("no download link for {report_id}"))?;
            println!("{}", link.url);
            println!("(expires in {}s)", link.expires_in);
        }
        Command::Backtest {
            start,
            end,
            stocks,
            strategy,
            poll_interval_ms,
        } => {
            let request = BacktestRequest::new(start, end, stocks, strategy)?;
            let job = await_backtest(
                source.as_ref(),
                &request,
                Duration::from_millis(poll_interval_ms),
            )
            .await
            .into_result()
            .context("backtest failed")?;

            println!("job {}: {:?}", job.job_id, job.status);
            if let Some(result) = job.result {
                println!(
                    "avg return {}  win rate {}  sharpe {}  max drawdown {}",
                    format::signed_percent(result.avg_return, 2),
                    format::win_rate(result.win_rate),
                    format::sharpe(result.sharpe_ratio),
                    format::percent(result.max_drawdown, 2),
                );
            }
        }
        Command::Subscribe { email } => submit(EmailForm::subscribe(), email, source.as_ref()).await?,
        Command::Unsubscribe { email } => {
            submit(EmailForm::unsubscribe(), email, source.as_ref()).await?
        }
        Command::Health => {
            let healthy = source.health().await;
            println!(
                "{}: {}",
                source.provider_name(),
                if healthy { "ok" } else { "unreachable" }
            );
            anyhow::ensure!(healthy, "data source is unreachable");
        }
    }
    Ok(())
}

async fn submit(mut form: EmailForm, email: String, source: &dyn DataSource) -> anyhow::Result<()> {
    form.set_input(email);
    form.submit(source).await;
    if let Some(notice) = form.notice() {
        println!("{}", render::notice(&notice));
        anyhow::ensure!(notice.tone != Tone::Error, "{:?} failed", form.action());
    }
    Ok(())
}

/// Submit, then poll until the job reaches a terminal status or we give up.
async fn await_backtest(
    source: &dyn DataSource,
    request: &BacktestRequest,
    interval: Duration,
) -> Envelope<BacktestJob> {
    let mut envelope = source.run_backtest(request).await;
    let mut polls = 0;
    while envelope.success && !envelope.data.status.is_terminal() && polls < MAX_BACKTEST_POLLS {
        tracing::info!(job_id = %envelope.data.job_id, status = ?envelope.data.status, "waiting for backtest");
        tokio::time::sleep(interval).await;
        let job_id = envelope.data.job_id.clone();
        envelope = source.backtest_status(&job_id).await;
        polls += 1;
    }
    envelope
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
