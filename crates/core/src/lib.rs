pub mod backend;
pub mod domain;
pub mod error;
pub mod insights;
pub mod llm;
pub mod map;
pub mod markers;
pub mod orchestrator;
pub mod sales;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 15;
    const DEFAULT_RECOMMENDATION_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_RECOMMENDATION_PATH: &str = "/api/recomendacion";
    /// Where `ubica_api` listens with its default `PORT`.
    const DEFAULT_RECOMMENDATION_BASE_URL: &str = "http://localhost:3000";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub backend_base_url: String,
        pub backend_timeout: Duration,
        pub recommendation_timeout: Duration,
        pub recommendation_base_url: String,
        pub recommendation_path: String,
        pub anthropic_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let backend_base_url = std::env::var("BACKEND_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string());

            let recommendation_base_url = std::env::var("RECOMMENDATION_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION_BASE_URL.to_string());

            let recommendation_path = std::env::var("RECOMMENDATION_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION_PATH.to_string());

            Ok(Self {
                backend_base_url,
                backend_timeout: secs_from_env("BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT_SECS)?,
                recommendation_timeout: secs_from_env(
                    "RECOMMENDATION_TIMEOUT_SECS",
                    DEFAULT_RECOMMENDATION_TIMEOUT_SECS,
                )?,
                recommendation_base_url,
                recommendation_path,
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .context("ANTHROPIC_API_KEY is required")
        }
    }

    fn secs_from_env(key: &str, default: u64) -> anyhow::Result<Duration> {
        let secs = match std::env::var(key) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of seconds (got {raw:?})"))?,
            Err(_) => default,
        };
        anyhow::ensure!(secs > 0, "{key} must be greater than zero");
        Ok(Duration::from_secs(secs))
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
                backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
                recommendation_timeout: Duration::from_secs(DEFAULT_RECOMMENDATION_TIMEOUT_SECS),
                recommendation_base_url: DEFAULT_RECOMMENDATION_BASE_URL.to_string(),
                recommendation_path: DEFAULT_RECOMMENDATION_PATH.to_string(),
                anthropic_api_key: None,
                sentry_dsn: None,
            }
        }
    }
}
