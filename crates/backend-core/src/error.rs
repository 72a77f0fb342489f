//! Error types for backend operations.

use thiserror::Error;

/// Errors that can occur while generating a reply from a backend.
///
/// Every variant is treated as a fallback trigger by the router; a
/// `Timeout` is handled identically to a transport failure.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend rejected the request due to rate limiting.
    #[error("backend rate limited")]
    RateLimited,

    /// The backend could not be reached.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered, but the reply was empty or malformed.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The request exceeded its deadline.
    #[error("backend request timed out")]
    Timeout,

    /// The adapter is misconfigured (missing API key, bad URL).
    #[error("backend configuration error: {0}")]
    Configuration(String),
}
