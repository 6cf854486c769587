//! # Database Configuration
//!
//! Pool and credential settings, built in code or read from the environment.
//!
//! ## Environment Variables
//! ```text
//! ┌──────────────────────────────────┬──────────────────┬──────────────────┐
//! │ Variable                         │ Default          │ Field            │
//! ├──────────────────────────────────┼──────────────────┼──────────────────┤
//! │ PHARMACARE_DB_PATH               │ ./pharmacare.db  │ database_path    │
//! │ PHARMACARE_DB_MAX_CONNECTIONS    │ 5                │ max_connections  │
//! │ PHARMACARE_DB_BUSY_TIMEOUT_MS    │ 5000             │ busy_timeout     │
//! │ PHARMACARE_PASSWORD_MEMORY_KIB   │ 19456            │ password_cost    │
//! │ PHARMACARE_PASSWORD_ITERATIONS   │ 2                │ password_cost    │
//! └──────────────────────────────────┴──────────────────┴──────────────────┘
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::password::PasswordCost;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "./pharmacare.db";

const IN_MEMORY_PATH: &str = ":memory:";

/// Database configuration.
///
/// ## Example
/// ```rust
/// use pharmacare_db::DbConfig;
/// use std::time::Duration;
///
/// let config = DbConfig::new("/path/to/pharmacare.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_connections, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single pharmacy counter)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a pooled connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// How long a statement waits for another writer's lock.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Argon2 cost for new password hashes.
    pub password_cost: PasswordCost,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            password_cost: PasswordCost::default(),
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Single connection, since every connection to `:memory:` would
    /// otherwise see its own empty database. Uses the cheapest password cost.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
            password_cost: PasswordCost::minimal(),
        }
    }

    /// Reads the configuration from `PHARMACARE_*` environment variables,
    /// falling back to [`DbConfig::new`] defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = PasswordCost::default();

        let database_path =
            env::var("PHARMACARE_DB_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        let max_connections: u32 = env::var("PHARMACARE_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PHARMACARE_DB_MAX_CONNECTIONS".to_string()))?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PHARMACARE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let busy_timeout_ms: u64 = env::var("PHARMACARE_DB_BUSY_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PHARMACARE_DB_BUSY_TIMEOUT_MS".to_string()))?;

        let memory_kib: u32 = env::var("PHARMACARE_PASSWORD_MEMORY_KIB")
            .unwrap_or_else(|_| defaults.memory_kib.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PHARMACARE_PASSWORD_MEMORY_KIB".to_string()))?;

        let iterations: u32 = env::var("PHARMACARE_PASSWORD_ITERATIONS")
            .unwrap_or_else(|_| defaults.iterations.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PHARMACARE_PASSWORD_ITERATIONS".to_string()))?;

        Ok(DbConfig::new(database_path)
            .max_connections(max_connections)
            .min_connections(1)
            .busy_timeout(Duration::from_millis(busy_timeout_ms))
            .password_cost(PasswordCost {
                memory_kib,
                iterations,
                parallelism: defaults.parallelism,
            }))
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets how long a statement waits on SQLite's write lock.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn password_cost(mut self, cost: PasswordCost) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DATABASE_PATH)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert!(config.run_migrations);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_defaults() {
        let config = DbConfig::in_memory();
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.password_cost, PasswordCost::minimal());
    }

    // All env cases in one test: the process environment is shared between
    // test threads.
    #[test]
    fn test_from_env() {
        env::remove_var("PHARMACARE_DB_PATH");
        env::remove_var("PHARMACARE_DB_MAX_CONNECTIONS");
        env::remove_var("PHARMACARE_DB_BUSY_TIMEOUT_MS");
        env::remove_var("PHARMACARE_PASSWORD_MEMORY_KIB");
        env::remove_var("PHARMACARE_PASSWORD_ITERATIONS");

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.password_cost, PasswordCost::default());

        env::set_var("PHARMACARE_DB_PATH", "/var/lib/pharmacare/store.db");
        env::set_var("PHARMACARE_DB_BUSY_TIMEOUT_MS", "1500");
        env::set_var("PHARMACARE_PASSWORD_ITERATIONS", "3");
        let config = DbConfig::from_env().unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/pharmacare/store.db")
        );
        assert_eq!(config.busy_timeout, Duration::from_millis(1500));
        assert_eq!(config.password_cost.iterations, 3);

        env::set_var("PHARMACARE_DB_MAX_CONNECTIONS", "many");
        assert!(matches!(
            DbConfig::from_env(),
            Err(ConfigError::InvalidValue(var)) if var == "PHARMACARE_DB_MAX_CONNECTIONS"
        ));

        env::set_var("PHARMACARE_DB_MAX_CONNECTIONS", "0");
        assert!(DbConfig::from_env().is_err());

        env::remove_var("PHARMACARE_DB_PATH");
        env::remove_var("PHARMACARE_DB_MAX_CONNECTIONS");
        env::remove_var("PHARMACARE_DB_BUSY_TIMEOUT_MS");
        env::remove_var("PHARMACARE_PASSWORD_ITERATIONS");
    }
}
