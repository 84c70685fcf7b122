//! Ingestion error types.

use thiserror::Error;

/// Why a provider fetch failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP call itself failed (connect, timeout, TLS).
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON document.
    #[error("provider payload unusable: {0}")]
    Payload(String),

    /// The requested base currency is absent from the anchor map.
    #[error("base currency '{0}' absent from provider payload")]
    BaseMissing(String),

    /// Every candidate rate was filtered out.
    #[error("no usable rates remained after filtering")]
    EmptyResult,
}

impl ProviderError {
    /// Machine-readable reason string reported to callers.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Transport(_) => "http_error",
            Self::Status(_) => "bad_status",
            Self::Payload(_) => "bad_payload",
            Self::BaseMissing(_) => "base_missing",
            Self::EmptyResult => "empty_result",
        }
    }

    /// Whether a retry could plausibly succeed. Payload-shape problems are
    /// deterministic and never retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(code) => *code >= 500,
            Self::Payload(_) | Self::BaseMissing(_) | Self::EmptyResult => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons() {
        assert_eq!(ProviderError::Status(503).reason(), "bad_status");
        assert_eq!(ProviderError::Payload("x".into()).reason(), "bad_payload");
        assert_eq!(
            ProviderError::BaseMissing("USD".into()).reason(),
            "base_missing"
        );
        assert_eq!(ProviderError::EmptyResult.reason(), "empty_result");
    }

    #[test]
    fn test_transience() {
        assert!(ProviderError::Status(500).is_transient());
        assert!(ProviderError::Status(503).is_transient());
        assert!(!ProviderError::Status(404).is_transient());
        assert!(!ProviderError::Payload("x".into()).is_transient());
        assert!(!ProviderError::EmptyResult.is_transient());
    }
}
