use crate::config::{Config, parse_env_var};
use crate::errors::StartupError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

/// Type alias for our DB connection (SeaORM pool handle)
pub type DB = DatabaseConnection;

/// Optional pool tuning knobs, read from the environment.
///
/// Supported env vars:
/// - `DATABASE_MAX_CONNECTIONS` (u32)
/// - `DATABASE_MIN_CONNECTIONS` (u32)
/// - `DATABASE_CONNECT_TIMEOUT_SECS` (u64)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (u64)
/// - `DATABASE_IDLE_TIMEOUT_SECS` (u64)
/// - `DATABASE_SQL_LOG` (bool)
#[derive(Debug, Clone, Default)]
pub struct PoolSettings {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub sql_log: Option<bool>,
}

impl PoolSettings {
    pub fn from_env() -> Self {
        Self {
            max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS"),
            min_connections: parse_env_var("DATABASE_MIN_CONNECTIONS"),
            connect_timeout_secs: parse_env_var("DATABASE_CONNECT_TIMEOUT_SECS"),
            acquire_timeout_secs: parse_env_var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            idle_timeout_secs: parse_env_var("DATABASE_IDLE_TIMEOUT_SECS"),
            sql_log: parse_env_var("DATABASE_SQL_LOG"),
        }
    }
}

/// Build ConnectOptions from the rendered URL and pool settings.
fn connect_options(url: String, settings: &PoolSettings) -> ConnectOptions {
    let mut opt = ConnectOptions::new(url);
    // Baseline pool defaults
    opt.max_connections(20)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    if let Some(v) = settings.max_connections {
        opt.max_connections(v);
    }
    if let Some(v) = settings.min_connections {
        opt.min_connections(v);
    }
    if let Some(v) = settings.connect_timeout_secs {
        opt.connect_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.acquire_timeout_secs {
        opt.acquire_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.sql_log {
        opt.sqlx_logging(v);
    }

    opt
}

/// Establish the shared connection pool from the validated configuration.
///
/// A connection failure here is fatal: the caller aborts startup, no retry.
pub async fn connect(config: &Config) -> Result<DB, StartupError> {
    connect_with_settings(config, &PoolSettings::from_env()).await
}

/// Establish the shared connection pool using explicit pool settings.
pub async fn connect_with_settings(
    config: &Config,
    settings: &PoolSettings,
) -> Result<DB, StartupError> {
    let opt = connect_options(config.database_url(), settings);
    let db = Database::connect(opt).await?;

    // Ранний ping: недоступный или неавторизованный сервер должен
    // проваливать старт, а не первый запрос.
    db.ping().await?;

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            secret_key: "test-secret".to_string(),
            db_user: "root".to_string(),
            db_password: "hunter2".to_string(),
            db_host: "127.0.0.1".to_string(),
            // порт 1 закрыт: соединение отклоняется сразу
            db_port: 1,
            db_name: "healthlog".to_string(),
        }
    }

    #[tokio::test]
    async fn unreachable_database_aborts_with_connection_error() {
        let settings = PoolSettings {
            connect_timeout_secs: Some(1),
            acquire_timeout_secs: Some(1),
            ..Default::default()
        };
        let err = connect_with_settings(&unreachable_config(), &settings)
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Database(_)));
    }
}
