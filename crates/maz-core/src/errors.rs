//! Cross-cutting error types for maz.
//!
//! Domain-specific errors (`ConfigError`, `SyncError`) live in their own
//! crates. A unified error is deferred to `maz-cli`, which uses `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any maz crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity type code or name did not match the catalogue.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Server data did not have the expected shape.
    #[error("Malformed object: {0}")]
    Malformed(String),
}
