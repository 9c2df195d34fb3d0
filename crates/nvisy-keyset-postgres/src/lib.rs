#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for client-related operations.
///
/// Use this target for logging client initialization, configuration, and lifecycle events.
pub const TRACING_TARGET_CLIENT: &str = "nvisy_keyset_postgres::client";

/// Tracing target for page, count and existence queries.
///
/// Use this target for logging rendered statements, row counts and query errors.
pub const TRACING_TARGET_QUERY: &str = "nvisy_keyset_postgres::queries";

/// Tracing target for database connection operations.
///
/// Use this target for logging connection establishment, pool management, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "nvisy_keyset_postgres::connection";

mod client;
mod error;
mod source;

pub mod prelude;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{ConnectionPool, PgClient, PgConfig, PgPoolStatus, PooledConnection};
pub use crate::error::{PgError, PgResult};
pub use crate::source::{BaseQuery, PgSource, Statement};
