//! Error types for cart persistence.
//!
//! None of these reach cart consumers through the mutation interface: load
//! failures degrade to an empty cart and write failures are logged. They are
//! returned from setup (opening a backend) and from the backends themselves.

use gomarketplace_core::CartError;
use thiserror::Error;

/// Durable storage operation failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration failed.
    #[cfg(feature = "postgres")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configured backend is not compiled in.
    #[error("Storage backend not available: {0}")]
    Unavailable(String),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Durable snapshot could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not valid JSON, or not an array of line items.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed lines that violate cart invariants.
    #[error("inconsistent snapshot: {0}")]
    Cart(#[from] CartError),
}
