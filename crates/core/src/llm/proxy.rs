use crate::config::Settings;
use crate::domain::contract::RecommendationResponseBody;
use crate::domain::recommendation::RecommendationInput;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{Provider, RecommendationClient};
use anyhow::Context;
use std::time::Duration;

/// Client-side recommendation generator. Talks to the proxy endpoint served next to the
/// scoring backend; carries no third-party credential.
#[derive(Debug, Clone)]
pub struct ProxyRecommendationClient {
    http: reqwest::Client,
    url: String,
}

impl ProxyRecommendationClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::with_url(
            &settings.recommendation_base_url,
            &settings.recommendation_path,
            settings.recommendation_timeout,
        )
    }

    pub fn with_url(base_url: &str, path: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build recommendation http client")?;

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Ok(Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
        })
    }
}

#[async_trait::async_trait]
impl RecommendationClient for ProxyRecommendationClient {
    fn provider(&self) -> Provider {
        Provider::Proxy
    }

    async fn generate_recommendation(
        &self,
        input: &RecommendationInput,
    ) -> anyhow::Result<String> {
        let res = self
            .http
            .post(&self.url)
            .json(&input.to_request_body())
            .send()
            .await
            .context("recommendation proxy request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read recommendation proxy response")?;
        if !status.is_success() {
            return Err(LlmDiagnosticsError::http(self, status, text).into());
        }

        let body = serde_json::from_str::<RecommendationResponseBody>(&text)
            .with_context(|| format!("recommendation proxy returned unexpected body: {text}"))?;
        let recommendation = body.recomendacion.trim().to_string();
        anyhow::ensure!(
            !recommendation.is_empty(),
            "recommendation proxy returned empty text"
        );
        Ok(recommendation)
    }
}
