use thiserror::Error;

/// Input rejected before any network call was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {reason}")]
pub struct ValidationError {
    pub reason: &'static str,
}

impl ValidationError {
    pub const MISSING_COORDINATES: Self = Self {
        reason: "missing coordinates",
    };
}

/// Failures talking to the scoring backend or the recommendation proxy.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Unreachable host, timeout, or non-2xx status.
    #[error("network error calling {endpoint}: {detail}")]
    Network { endpoint: String, detail: String },

    /// Body was not valid JSON, or a domain field did not decode.
    #[error("parse error in {context}: {detail}")]
    Parse { context: String, detail: String },

    /// Recommendation generation failed. Never fails the evaluation it annotates.
    #[error("recommendation failed: {0}")]
    Recommendation(String),
}

impl ClientError {
    pub fn network(endpoint: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            detail: detail.to_string(),
        }
    }

    pub fn parse(context: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Parse { .. } => "parse",
            Self::Recommendation(_) => "recommendation",
        }
    }
}
