//! Crate-level errors
//!
//! [`Error`] covers startup and infrastructure failures: configuration
//! loading, database connectivity, server binding. Request-time failures
//! use [`crate::problem::ApiError`] instead, which knows how to render
//! itself as a problem response.

/// Startup and infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
