//! Unified error types for the platform core.
//!
//! Internal storage and notification plumbing propagates these with `?`. The
//! public facade in [`crate::core::platform`] degrades them to sentinel values.

use thiserror::Error;

/// Errors raised by the storage, configuration and notification layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong
        message: String,
    },

    /// The underlying database rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A stored value could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The outbound notification request failed at the transport level
    #[error("Notification error: {0}")]
    Notification(#[from] reqwest::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
