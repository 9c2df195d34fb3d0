//! Error types for database operations.

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::result::{ConnectionError, Error};
use diesel_async::pooled_connection::PoolError as DieselPoolError;
use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

use crate::TRACING_TARGET_CONNECTION;

/// Error type for PostgreSQL pool and query operations.
///
/// Reported by [`PgClient`] and, through the paginator's storage error, by
/// [`PgSource`].
///
/// [`PgClient`]: crate::PgClient
/// [`PgSource`]: crate::PgSource
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Invalid pool or connection configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a connection timed out.
    #[error("Database operation timed out ({})", timeout_kind(.0))]
    Timeout(TimeoutType),

    /// Failed to establish or maintain a database connection.
    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A page, count or existence query failed.
    #[error("Database query error: {0}")]
    Query(#[from] Error),

    /// Unexpected pool state.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

fn timeout_kind(timeout: &TimeoutType) -> &'static str {
    match timeout {
        TimeoutType::Wait => "waiting for a connection",
        TimeoutType::Create => "creating a connection",
        TimeoutType::Recycle => "recycling a connection",
    }
}

impl PgError {
    /// Returns whether retrying the operation may succeed.
    ///
    /// Timeouts and broken connections are transient; configuration and
    /// query errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_) | PgError::Connection(ConnectionError::BadConnection(_))
        )
    }

    /// Returns whether retrying the operation cannot succeed.
    #[inline]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

impl From<DeadpoolError> for PgError {
    fn from(value: DeadpoolError) -> Self {
        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!(target: TRACING_TARGET_CONNECTION, error = %err, "Post-create hook failed");
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => {
                tracing::error!(target: TRACING_TARGET_CONNECTION, "No runtime specified for connection pool");
                Self::Unexpected("No runtime specified".into())
            }
            DeadpoolError::Closed => Self::Connection(ConnectionError::InvalidConnectionUrl(
                "Connection pool is closed".into(),
            )),
        }
    }
}

/// Specialized [`Result`] type for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;
