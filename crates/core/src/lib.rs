pub mod aggregate;
pub mod domain;
pub mod envelope;
pub mod format;
pub mod paging;
pub mod source;
pub mod subscription;
pub mod view;
pub mod viewport;

pub mod config {
    use anyhow::Context;

    const DEFAULT_API_URL: &str = "http://localhost:3000/api";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_url: String,
        pub api_timeout_secs: u64,
        pub use_simulated_data: bool,
        pub simulated_latency_scale: f64,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                api_url: DEFAULT_API_URL.to_string(),
                api_timeout_secs: DEFAULT_TIMEOUT_SECS,
                use_simulated_data: false,
                simulated_latency_scale: 1.0,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let api_url = std::env::var("SIGNALS_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string());

            let api_timeout_secs = match std::env::var("SIGNALS_API_TIMEOUT_SECS") {
                Ok(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("SIGNALS_API_TIMEOUT_SECS is not an integer: {s}"))?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            };

            let simulated_latency_scale = match std::env::var("SIMULATED_LATENCY_SCALE") {
                Ok(s) => {
                    let scale = s
                        .parse::<f64>()
                        .with_context(|| format!("SIMULATED_LATENCY_SCALE is not a number: {s}"))?;
                    anyhow::ensure!(
                        scale.is_finite() && scale >= 0.0,
                        "SIMULATED_LATENCY_SCALE must be >= 0 (got {scale})"
                    );
                    scale
                }
                Err(_) => 1.0,
            };

            Ok(Self {
                api_url,
                api_timeout_secs,
                use_simulated_data: std::env::var("USE_SIMULATED_DATA")
                    .map(|s| parse_flag(&s))
                    .unwrap_or(false),
                simulated_latency_scale,
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
            })
        }
    }

    fn parse_flag(s: &str) -> bool {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    }

}
