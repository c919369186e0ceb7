pub mod anthropic;
pub mod error;
pub mod prompt;
pub mod proxy;

use crate::domain::recommendation::RecommendationInput;

#[derive(Debug, Clone)]
pub enum Provider {
    Anthropic,
    Proxy,
}

#[async_trait::async_trait]
pub trait RecommendationClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate_recommendation(&self, input: &RecommendationInput)
        -> anyhow::Result<String>;
}
