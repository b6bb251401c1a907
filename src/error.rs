//! Error taxonomy for upstream fetches and configuration.

use thiserror::Error;

/// Failure of a single upstream fetch.
///
/// Every variant is caught at the fetcher boundary and converted into a
/// [`crate::model::FetchResult::Failure`]; none propagates past an individual
/// fetcher into the refresh cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, or timeout failure on the transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success HTTP status line.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// The envelope arrived but its `code` field was not 200.
    #[error("upstream rejected the request with code {0}")]
    UpstreamCode(i64),

    /// The body was not the expected JSON envelope.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Invalid coordinator configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,

    /// Rotation tick interval outside the allowed bounds, in seconds.
    #[error("rotation interval {0}s out of range ({min}..={max}s)", min = crate::config::MIN_ROTATION_SECS, max = crate::config::MAX_ROTATION_SECS)]
    RotationIntervalOutOfRange(u64),

    /// Legacy-mode refresh interval outside the allowed bounds, in minutes.
    #[error("refresh interval {0}min out of range ({min}..={max}min)", min = crate::config::MIN_REFRESH_MINUTES, max = crate::config::MAX_REFRESH_MINUTES)]
    RefreshIntervalOutOfRange(u64),

    /// Province name not in the fixed upstream list.
    #[error("unknown fuel price province: {0}")]
    UnknownProvince(String),
}
