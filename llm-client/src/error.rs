//! Typed provider errors, classified once at the HTTP boundary.
//!
//! The retry wrapper decides retryability from the variant alone, so every
//! failure mode the providers produce has to map onto exactly one variant
//! here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The per-attempt deadline elapsed before the provider answered.
    #[error("request timed out")]
    Timeout,

    /// HTTP 429: quota or rate limit exhausted.
    #[error("rate limit or quota exhausted: {0}")]
    ResourceExhausted(String),

    /// HTTP 5xx or a transport-level failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The requested model does not exist on the provider side.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The provider answered 2xx but the body was not usable.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Classifies a non-success HTTP status plus response body.
    ///
    /// A 400 whose body names `NOT_FOUND` is treated like a 404: Gemini
    /// reports unknown model names that way.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => ProviderError::ModelNotFound(body.to_string()),
            400 if body.contains("NOT_FOUND") => ProviderError::ModelNotFound(body.to_string()),
            429 => ProviderError::ResourceExhausted(body.to_string()),
            500..=599 => ProviderError::Unavailable(format!("HTTP {status}: {body}")),
            _ => ProviderError::Other(format!("HTTP {status}: {body}")),
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Only an unknown model is permanent: the name will not start existing
    /// because we asked again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::ModelNotFound(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderError;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ProviderError::from_status(404, "no such model"),
            ProviderError::ModelNotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_status(400, r#"{"error":{"status":"NOT_FOUND"}}"#),
            ProviderError::ModelNotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_status(400, "bad argument"),
            ProviderError::Other(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, "quota"),
            ProviderError::ResourceExhausted(_)
        ));
        assert!(matches!(
            ProviderError::from_status(503, "overloaded"),
            ProviderError::Unavailable(_)
        ));
    }

    #[test]
    fn test_only_model_not_found_is_permanent() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::ResourceExhausted(String::new()).is_retryable());
        assert!(ProviderError::Unavailable(String::new()).is_retryable());
        assert!(ProviderError::InvalidResponse(String::new()).is_retryable());
        assert!(ProviderError::Other(String::new()).is_retryable());
        assert!(!ProviderError::ModelNotFound(String::new()).is_retryable());
    }
}
