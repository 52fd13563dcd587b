//! Error types

use thiserror::Error;

/// Errors raised by the cache itself
///
/// Executor failures are never wrapped in this type: they reach the caller
/// untouched. Executor error types implement `From<Error>` so that the two
/// cache-originated execution failures below can be reported through them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executor dropped its completion callback without reporting a result")]
    CompletionDropped,

    /// The execution panicked, was dropped, or its runtime shut down
    #[error("Query execution ended without producing a result")]
    ExecutionAborted,
}

impl Error {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether the error came from an execution that never produced a result
    #[must_use]
    pub const fn is_execution_failure(&self) -> bool {
        matches!(self, Self::CompletionDropped | Self::ExecutionAborted)
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
