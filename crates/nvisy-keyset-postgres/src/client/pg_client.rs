use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use deadpool::managed::{Hook, Pool};
use diesel::QueryableByName;
use diesel::sql_types::Integer;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};

use super::hooks;
use crate::{ConnectionPool, PgConfig, PgError, PgResult, PooledConnection};
use crate::{TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Acquisitions slower than this are logged as warnings.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Connection pool status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolStatus {
    /// Maximum number of connections in the pool.
    pub max_size: usize,
    /// Current number of connections in the pool.
    pub size: usize,
    /// Number of idle connections.
    pub available: usize,
    /// Number of callers waiting for a connection.
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns the share of the pool in use, from 0.0 to 1.0.
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.max_size == 0 {
            return 0.0;
        }

        self.size.saturating_sub(self.available) as f64 / self.max_size as f64
    }

    /// Returns whether callers are waiting or most connections are in use.
    #[inline]
    pub fn is_under_pressure(&self) -> bool {
        self.waiting > 0 || self.utilization() > 0.8
    }
}

/// Pooled PostgreSQL client shared by every [`PgSource`].
///
/// Cloning is cheap; clones share the pool.
///
/// [`PgSource`]: crate::PgSource
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Creates a client and its connection pool.
    ///
    /// Connections are established lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Unexpected`] if the pool cannot be built.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CLIENT,
        fields(database_url = %config.database_url_masked())
    )]
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(hooks::setup_callback);
        let manager =
            AsyncDieselConnectionManager::new_with_config(config.database_url(), manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.postgres_max_connections as usize)
            .wait_timeout(config.connection_timeout())
            .create_timeout(config.connection_timeout())
            .recycle_timeout(config.recycle_timeout())
            .runtime(deadpool::Runtime::Tokio1)
            .post_create(Hook::sync_fn(hooks::post_create))
            .pre_recycle(Hook::sync_fn(hooks::pre_recycle))
            .build()
            .map_err(|err| {
                tracing::error!(target: TRACING_TARGET_CLIENT, error = %err, "Failed to build connection pool");
                PgError::Unexpected(format!("failed to build connection pool: {err}").into())
            })?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            max_connections = config.postgres_max_connections,
            "Created database client"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Creates a client and verifies that the database answers a query.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CLIENT,
        fields(database_url = %config.database_url_masked())
    )]
    pub async fn connect(config: PgConfig) -> PgResult<Self> {
        #[derive(QueryableByName)]
        struct Ping {
            #[diesel(sql_type = Integer)]
            #[allow(dead_code)]
            ping: i32,
        }

        let this = Self::new(config)?;
        let mut conn = this.get_connection().await?;

        let _: Ping = diesel::sql_query("SELECT 1 AS ping")
            .get_result(&mut *conn)
            .await
            .map_err(|err| {
                tracing::error!(target: TRACING_TARGET_CLIENT, error = %err, "Database connectivity check failed");
                PgError::from(err)
            })?;

        tracing::info!(target: TRACING_TARGET_CLIENT, "Database connectivity verified");
        Ok(this)
    }

    /// Acquires a connection from the pool.
    ///
    /// Waits up to the configured connection timeout.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONNECTION)]
    pub async fn get_connection(&self) -> PgResult<PooledConnection> {
        let start = Instant::now();
        let conn = self.inner.pool.get().await.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %err,
                elapsed = ?start.elapsed(),
                "Failed to acquire connection from pool"
            );
            PgError::from(err)
        })?;

        let elapsed = start.elapsed();
        if elapsed > SLOW_ACQUIRE {
            tracing::warn!(target: TRACING_TARGET_CONNECTION, elapsed = ?elapsed, "Slow connection acquisition");
        } else {
            tracing::trace!(target: TRACING_TARGET_CONNECTION, elapsed = ?elapsed, "Acquired connection");
        }

        Ok(conn)
    }

    /// Returns the current pool status.
    #[inline]
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.inner.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// Returns the configuration of this client.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("database_url", &self.inner.config.database_url_masked())
            .field("pool", &self.pool_status())
            .finish()
    }
}
