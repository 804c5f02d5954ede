//! Error types for the valentine core.

use database::DatabaseError;
use thiserror::Error;

/// Errors that escape message handling.
///
/// Storage and delivery problems inside a flow are answered to the user
/// and reported through [`crate::Outcome`]; only failures to talk back to
/// the user, or internal lookups, surface here.
#[derive(Debug, Error)]
pub enum ValentineError {
    /// Replying to the user failed.
    #[error("send failed: {0}")]
    Send(#[from] broadcaster::Error),

    /// Storage failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Result type for valentine operations.
pub type Result<T> = std::result::Result<T, ValentineError>;
