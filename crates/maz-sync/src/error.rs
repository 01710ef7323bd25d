//! Sync error types.
//!
//! Only I/O fails: reconciliation, scope flattening and matching are pure.
//! An unreachable network, an expired cursor or an unreadable cache file are
//! not errors; they are absorbed by falling back to the cache or to a full
//! resync.

use thiserror::Error;

/// Errors that abort a synchronization. Nothing is persisted when one occurs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API returned a non-success status code.
    #[error("API error ({status}) for {url}: {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Request url.
        url: String,
        /// Error message or response body.
        message: String,
    },

    /// Upstream API returned 429 Too Many Requests. Not retried.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the server asked us to wait.
        retry_after_secs: u64,
    },

    /// A response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// A delta walk ran out of pages without the server issuing a new cursor.
    #[error("delta query ended without a delta link: {url}")]
    MissingCursor { url: String },

    /// No bearer token is available for the API a url belongs to.
    #[error("no credentials for {0}")]
    Credentials(String),

    /// Cache file could not be written or removed.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache content could not be serialized.
    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
