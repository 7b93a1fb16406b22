//! Error types for pool operations.

use thiserror::Error;

/// Errors produced by pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has been shut down; no further submissions are accepted.
    #[error("pool has been shut down")]
    Shutdown,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Spawning a worker or controller thread failed.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
