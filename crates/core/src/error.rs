//! Error types for the ragdesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Retrieval and completion
//! failures are separate bounded contexts so the query boundary can tell them
//! apart.

use thiserror::Error;

/// The top-level error type for all ragdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Retrieval errors (embedding provider / vector index) ---
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Completion errors (LLM endpoint) ---
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The embedding provider or the vector index could not serve a query.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),
}

/// The completion endpoint failed to produce an answer.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Coarse classification of a [`CompletionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFailureKind {
    /// The endpoint could not be reached at all.
    Connectivity,
    /// The endpoint is overloaded or throttling us.
    RateLimit,
    /// Anything else: bad request, bad credentials, unparseable reply.
    Other,
}

impl CompletionError {
    pub fn kind(&self) -> CompletionFailureKind {
        match self {
            Self::Network(_) | Self::Timeout(_) => CompletionFailureKind::Connectivity,
            Self::RateLimited { .. } => CompletionFailureKind::RateLimit,
            Self::ApiError { status_code: 503, .. } => CompletionFailureKind::RateLimit,
            Self::ApiError { .. }
            | Self::AuthenticationFailed(_)
            | Self::MalformedResponse(_)
            | Self::NotConfigured(_) => CompletionFailureKind::Other,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        self.kind() == CompletionFailureKind::RateLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_error_displays_correctly() {
        let err = Error::Completion(CompletionError::ApiError {
            status_code: 400,
            message: "context length exceeded".into(),
        });
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("context length exceeded"));
    }

    #[test]
    fn retrieval_error_is_distinct_from_completion() {
        let err: Error = RetrievalError::Index("collection missing".into()).into();
        assert!(matches!(err, Error::Retrieval(_)));
        assert!(err.to_string().contains("collection missing"));
    }

    #[test]
    fn completion_error_kinds() {
        assert_eq!(
            CompletionError::Network("refused".into()).kind(),
            CompletionFailureKind::Connectivity
        );
        assert_eq!(
            CompletionError::Timeout("120s".into()).kind(),
            CompletionFailureKind::Connectivity
        );
        assert_eq!(
            CompletionError::RateLimited { retry_after_secs: 5 }.kind(),
            CompletionFailureKind::RateLimit
        );
        assert_eq!(
            CompletionError::AuthenticationFailed("bad key".into()).kind(),
            CompletionFailureKind::Other
        );
    }

    #[test]
    fn only_rate_limits_are_transient() {
        assert!(CompletionError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(!CompletionError::Network("down".into()).is_transient());
        assert!(!CompletionError::MalformedResponse("no choices".into()).is_transient());
    }
}
