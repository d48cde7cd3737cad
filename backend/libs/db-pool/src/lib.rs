//! Database connection pool management
//!
//! Provides unified SQLite pool creation and configuration for all services.
//! Every connection is opened with `PRAGMA foreign_keys = ON` so that
//! `ON DELETE CASCADE` / `ON DELETE RESTRICT` clauses in migrations are enforced.
//! File databases run in WAL mode, and writers go through [`begin_immediate`]
//! so concurrent write transactions queue on the busy timeout instead of
//! failing with `SQLITE_BUSY`.

mod env_utils;
mod metrics;

pub use env_utils::{parse_env_optional, parse_env_required, parse_env_with_default};
pub use metrics::acquire_with_metrics;
use metrics::update_pool_metrics;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// URL of a private in-memory database, one per pool.
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// SQLite connection URL (`sqlite://path/to.db?mode=rwc` or `sqlite::memory:`)
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Busy timeout and verification timeout
    pub connect_timeout_secs: u64,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout, 0 disables
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime, 0 disables
    pub max_lifetime_secs: u64,
    /// Interval of the background metrics updater, 0 disables it
    pub metrics_interval_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::from("sqlite://social.db?mode=rwc"),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            metrics_interval_secs: 30,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = parse_env_required::<String>("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_with_default("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: parse_env_with_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: parse_env_with_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            ),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            ),
            metrics_interval_secs: parse_env_with_default(
                "DB_METRICS_INTERVAL_SECS",
                defaults.metrics_interval_secs,
            ),
        })
    }

    /// Config for a throwaway in-memory database (tests, dry runs)
    pub fn in_memory(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout_secs: 0,
            max_lifetime_secs: 0,
            metrics_interval_secs: 0,
            ..Self::default()
        }
    }

    /// Whether the URL points at an in-memory database.
    ///
    /// Each SQLite in-memory connection is its own database, so such pools
    /// are pinned to a single long-lived connection.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            "Database Pool Configuration: \
             max_connections={}, min_connections={}, \
             connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
            self.max_connections,
            self.min_connections,
            self.connect_timeout_secs,
            self.acquire_timeout_secs,
            self.idle_timeout_secs,
            self.max_lifetime_secs
        );
    }
}

fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Create a SQLite connection pool with foreign keys enforced and metrics monitoring
pub async fn create_pool(config: DbConfig) -> Result<SqlitePool, sqlx::Error> {
    debug!(
        "Creating database pool: service={}, max={}, min={}, \
         acquire_timeout={}s, verify_timeout={}s, idle_timeout={}s",
        config.service_name,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs,
        config.connect_timeout_secs,
        config.idle_timeout_secs
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.connect_timeout_secs));
    if !config.is_in_memory() {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let (max_connections, min_connections, idle_timeout, max_lifetime) = if config.is_in_memory() {
        (1, 1, None, None)
    } else {
        (
            config.max_connections,
            config.min_connections,
            optional_secs(config.idle_timeout_secs),
            optional_secs(config.max_lifetime_secs),
        )
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        // Timeout for acquiring a connection from the pool
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(idle_timeout)
        .max_lifetime(max_lifetime)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    // Verify connection and foreign key enforcement with connect timeout
    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query_scalar::<_, i64>("PRAGMA foreign_keys").fetch_one(&pool),
    )
    .await
    {
        Ok(Ok(1)) => {
            info!(
                service = %config.service_name,
                in_memory = config.is_in_memory(),
                "Database pool created and verified successfully"
            );

            update_pool_metrics(&pool, &config.service_name);

            if let Some(interval) = optional_secs(config.metrics_interval_secs) {
                let pool_clone = pool.clone();
                let service = config.service_name.clone();
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    while !pool_clone.is_closed() {
                        ticker.tick().await;
                        update_pool_metrics(&pool_clone, &service);
                    }
                });
            }

            Ok(pool)
        }
        Ok(Ok(flag)) => {
            error!(
                service = %config.service_name,
                foreign_keys = flag,
                "Foreign key enforcement is disabled on this connection"
            );
            pool.close().await;
            Err(sqlx::Error::Configuration(
                "SQLite foreign key enforcement could not be enabled".into(),
            ))
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

/// Start a write transaction with `BEGIN IMMEDIATE`.
///
/// The write lock is taken up front, so reads done inside the transaction
/// before its first write cannot be invalidated by another writer. A second
/// writer waits out the busy timeout on `BEGIN` rather than failing on the
/// lock upgrade the way a deferred transaction does.
pub async fn begin_immediate(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Apply an embedded migration set to the pool
pub async fn migrate(pool: &SqlitePool, migrator: &Migrator) -> Result<(), MigrateError> {
    debug!(
        migrations = migrator.iter().count(),
        "Running database migrations"
    );

    migrator.run(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}
