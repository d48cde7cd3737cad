/// Configuration management for Social Store
///
/// Loads configuration from environment variables (optionally seeded from a `.env` file).
use anyhow::{anyhow, Result};
use db_pool::{parse_env_optional, DbConfig};
use serde::{Deserialize, Serialize};

/// Service name used for pool metrics and logs
pub const SERVICE_NAME: &str = "social-store";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database pool configuration
    pub database: DbConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
    /// Apply embedded migrations on connect
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

fn default_run_migrations() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine; real environments set variables directly
        let _ = dotenvy::dotenv();

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            log_format: std::env::var("LOG_FORMAT")
                .ok()
                .map(|v| v.parse::<LogFormat>())
                .transpose()
                .map_err(|e| anyhow!(e))?
                .unwrap_or_default(),
            run_migrations: parse_env_optional("RUN_MIGRATIONS")
                .unwrap_or_else(default_run_migrations),
        };

        let database = DbConfig::from_env(SERVICE_NAME).map_err(|e| anyhow!(e))?;

        Ok(Config { app, database })
    }

    /// Configuration backed by a private in-memory database
    pub fn in_memory() -> Self {
        Config {
            app: AppConfig {
                env: "test".to_string(),
                log_format: LogFormat::Pretty,
                run_migrations: true,
            },
            database: DbConfig::in_memory(SERVICE_NAME),
        }
    }
}
