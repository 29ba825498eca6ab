//! Error types for the Gatekeeper service.

use thiserror::Error;

/// Main error type for Gatekeeper operations.
///
/// Note that a rate limit rejection is not an error: `check` reports it as a
/// normal decision so the HTTP layer can map it to 429 rather than a failure.
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller supplied an empty or malformed rate limit key
    #[error("Invalid rate limit key: {0}")]
    InvalidKey(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gatekeeper operations.
pub type Result<T> = std::result::Result<T, GatekeeperError>;
