//! Error types shared across the crate.
//!
//! Two failure classes exist: configuration errors, which are fatal at
//! construction time and never retried, and provider errors, which are
//! transient and handled by the facade's `ignore_failures` policy.

use thiserror::Error;

/// Failure while fetching category data from the market-data provider.
///
/// Raised during a cache refresh. The next retry happens naturally on the
/// first call after the cache TTL expires; no retry loop runs inside a
/// single filter invocation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Response body did not match the expected shape.
    #[error("could not decode provider response: {0}")]
    Decode(String),
}

/// Top-level error surfaced by the filter facade.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Malformed filter configuration, detected before any network activity.
    #[error("invalid filter configuration: {0}")]
    Config(String),

    /// Category refresh failed and `ignore_failures` is disabled.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
