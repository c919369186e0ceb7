use crate::llm::{Provider, RecommendationClient};
use serde_json::Value;
use std::fmt;

/// Failed recommendation call, keeping what the upstream actually sent back.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    /// `http` for a non-2xx reply, `empty_text` when a 2xx carried nothing usable.
    pub stage: &'static str,
    /// Upstream status for `http` failures.
    pub status: Option<u16>,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    /// Non-2xx reply. The body is kept verbatim and, when it parses, as JSON too.
    pub fn http(client: &dyn RecommendationClient, status: reqwest::StatusCode, body: String) -> Self {
        Self {
            provider: client.provider(),
            stage: "http",
            status: Some(status.as_u16()),
            detail: format!("status={status}"),
            raw_response_json: serde_json::from_str(&body).ok(),
            raw_output: Some(body),
        }
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} recommendation failed at {}", self.provider, self.stage)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        write!(f, ": {}", self.detail)
    }
}

impl std::error::Error for LlmDiagnosticsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::proxy::ProxyRecommendationClient;
    use std::time::Duration;

    #[test]
    fn http_failure_keeps_status_and_body() {
        let client =
            ProxyRecommendationClient::with_url("http://localhost:3000", "/api/recomendacion", Duration::from_secs(1))
                .unwrap();
        let err = LlmDiagnosticsError::http(
            &client,
            reqwest::StatusCode::BAD_GATEWAY,
            r#"{"detail":"overloaded"}"#.to_string(),
        );
        assert_eq!(err.status, Some(502));
        assert_eq!(err.raw_response_json.as_ref().unwrap()["detail"], "overloaded");
        assert_eq!(err.to_string(), "Proxy recommendation failed at http (HTTP 502): status=502 Bad Gateway");
    }

    #[test]
    fn non_json_body_is_kept_as_text_only() {
        let client =
            ProxyRecommendationClient::with_url("http://localhost:3000", "/api/recomendacion", Duration::from_secs(1))
                .unwrap();
        let err = LlmDiagnosticsError::http(&client, reqwest::StatusCode::UNPROCESSABLE_ENTITY, "bad".to_string());
        assert_eq!(err.status, Some(422));
        assert_eq!(err.raw_output.as_deref(), Some("bad"));
        assert!(err.raw_response_json.is_none());
    }
}
