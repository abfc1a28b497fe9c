//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres. The pool is the one
//! process-wide mutable shared resource: every query goes through a scoped
//! [`Session`] acquired here and returned to the pool on drop, on every exit
//! path.
//!
//! Acquisition is a single operation: it either yields a ready-to-use session
//! or fails with an explicit pool error. No handle is ever handed out that
//! needs a separate readiness step, and no failure path substitutes
//! fabricated data.

use std::time::{Duration, Instant};

use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, PoolError as DeadpoolError, RecyclingMethod, Runtime,
};
use innkeep_core::{PoolError, RevenueResult};
use tokio_postgres::NoTls;

/// A scoped database session: owned exclusively by the caller for one logical
/// operation, released back to the pool when dropped.
pub type Session = deadpool_postgres::Object;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Upper bound on the wait for a session
    pub connect_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "innkeep".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// Environment variables:
    /// - `INNKEEP_DB_HOST` (default: localhost)
    /// - `INNKEEP_DB_PORT` (default: 5432)
    /// - `INNKEEP_DB_NAME` (default: innkeep)
    /// - `INNKEEP_DB_USER` (default: postgres)
    /// - `INNKEEP_DB_PASSWORD` (default: empty)
    /// - `INNKEEP_DB_POOL_SIZE` (default: 16)
    /// - `INNKEEP_DB_TIMEOUT` seconds (default: 5)
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("INNKEEP_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("INNKEEP_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("INNKEEP_DB_NAME").unwrap_or_else(|_| "innkeep".to_string()),
            user: std::env::var("INNKEEP_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("INNKEEP_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("INNKEEP_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            connect_timeout: Duration::from_secs(
                std::env::var("INNKEEP_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    /// Create a bounded connection pool from this configuration.
    pub fn create_pool(&self) -> RevenueResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        // Verified recycling re-checks a connection before handing it out,
        // so a session is usable the moment the caller receives it.
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Verified,
        });
        cfg.pool = Some(PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| PoolError::Unavailable {
                reason: format!("failed to create pool: {}", e),
            })?;

        tracing::info!(
            host = %self.host,
            port = self.port,
            dbname = %self.dbname,
            max_size = self.max_size,
            "created database connection pool"
        );
        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Database client wrapping the bounded connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
    connect_timeout: Duration,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool, connect_timeout: Duration) -> Self {
        Self {
            pool,
            connect_timeout,
        }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> RevenueResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool, config.connect_timeout))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Acquire a scoped session from the pool.
    ///
    /// Waits at most `connect_timeout`; a pool that cannot produce a usable
    /// session within the bound fails with [`PoolError::Exhausted`], and an
    /// unreachable database fails with [`PoolError::Unavailable`]. Neither
    /// blocks indefinitely.
    pub async fn session(&self) -> RevenueResult<Session> {
        let started = Instant::now();
        match tokio::time::timeout(self.connect_timeout, self.pool.get()).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(DeadpoolError::Timeout(_))) => {
                let waited_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(waited_ms, "session acquisition timed out inside pool");
                Err(PoolError::Exhausted { waited_ms }.into())
            }
            Ok(Err(error)) => Err(PoolError::Unavailable {
                reason: error.to_string(),
            }
            .into()),
            Err(_) => {
                let waited_ms = self.connect_timeout.as_millis() as u64;
                tracing::warn!(waited_ms, "session acquisition timed out");
                Err(PoolError::Exhausted { waited_ms }.into())
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_size, 16);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_create_pool_is_bounded() {
        let config = DbConfig {
            max_size: 2,
            ..DbConfig::default()
        };
        // Pool creation does not connect; it only validates configuration.
        let pool = config.create_pool().expect("pool config should be valid");
        assert_eq!(pool.status().max_size, 2);
    }
}

#[cfg(all(test, feature = "db-tests"))]
mod db_tests {
    use super::*;

    /// Requires a reachable PostgreSQL configured via INNKEEP_DB_* vars.
    #[tokio::test]
    async fn test_session_roundtrip() {
        let client = DbClient::from_config(&DbConfig::from_env()).unwrap();
        let session = client.session().await.unwrap();
        let row = session.query_one("SELECT 1::INT4", &[]).await.unwrap();
        let one: i32 = row.get(0);
        assert_eq!(one, 1);
    }
}
