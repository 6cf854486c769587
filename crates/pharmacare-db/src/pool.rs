//! # Database Pool Management
//!
//! The [`Database`] handle: one SQLite connection pool shared by every
//! repository.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Application startup                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) / DbConfig::from_env()                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::open(config).await ← Create pool + run migrations           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.users()  db.medicines()  db.customers()  db.sales()  db.reports()  │
//! │  (cheap handles, each holds a clone of the pool)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.close().await → every later call fails with DbError::Closed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Connection Settings
//! Applied to every pooled connection:
//! - WAL journal: readers don't block the single writer
//! - `foreign_keys = ON`: needed for `ON DELETE SET NULL` on sales
//! - busy timeout: a writer waits this long for the write lock before failing

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::password::PasswordCost;
use crate::repository::customer::CustomerRepository;
use crate::repository::medicine::MedicineRepository;
use crate::repository::report::ReportRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// `Clone + Send + Sync`: clones share the same pool, so closing one closes
/// them all.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::open(DbConfig::new("./pharmacare.db")).await?;
///
/// let low = db.medicines().count_low_stock().await?;
/// let sale_id = db.sales().record_sale(&sale).await?;
///
/// db.close().await;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Cost for password hashes created through [`Database::users`].
    password_cost: PasswordCost,
}

impl Database {
    /// Opens (or creates) the database and brings its schema up to date.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures every connection: WAL, foreign keys, busy timeout
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::ConnectionFailed)` - Location unusable or not a database
    /// * `Err(DbError::MigrationFailed)` - Schema could not be applied
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path?mode=rwc creates the file if it doesn't exist
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!(busy_timeout_ms = config.busy_timeout.as_millis() as u64, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout));

        // Recycling the only connection to :memory: would drop the database
        if config.is_in_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            password_cost: config.password_cost,
        };

        if config.run_migrations {
            if let Err(e) = db.run_migrations().await {
                db.pool.close().await;
                return Err(match e {
                    DbError::MigrationFailed(_) | DbError::ConnectionFailed(_) => e,
                    other => DbError::MigrationFailed(other.to_string()),
                });
            }
        }

        Ok(db)
    }

    /// Alias of [`Database::open`].
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        Database::open(config).await
    }

    /// Runs database migrations.
    ///
    /// Called by `open()` when `run_migrations` is set; call it manually
    /// otherwise.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer repository methods; stock must only change through
    /// `MedicineRepository` and `SaleRepository::record_sale`.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the user repository (sign-up, login, login history).
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone(), self.password_cost)
    }

    /// Returns the medicine repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let hits = db.medicines().search("para").await?;
    /// ```
    pub fn medicines(&self) -> MedicineRepository {
        MedicineRepository::new(self.pool.clone())
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    /// Returns the sales ledger.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the reporting queries.
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// Idempotent. Waits for checked-out connections to be returned; after
    /// that every repository operation fails with [`DbError::Closed`].
    pub async fn close(&self) {
        if self.pool.is_closed() {
            debug!("Database already closed");
            return;
        }
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Checks if the database is healthy (can execute queries).
    ///
    /// ## Returns
    /// * `true` - Database is responsive
    /// * `false` - Database is closed or unavailable
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pharmacare_core::NewMedicine;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert!(!db.is_closed());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_final() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let medicines = db.medicines();

        db.close().await;
        db.close().await;

        assert!(db.is_closed());
        assert!(!db.health_check().await);
        assert!(matches!(medicines.list_all().await, Err(DbError::Closed)));
        assert!(matches!(
            db.medicines()
                .insert(&NewMedicine::new("Paracetamol 500mg", 550, 10))
                .await,
            Err(DbError::Closed)
        ));
        assert!(matches!(db.sales().count().await, Err(DbError::Closed)));
    }

    #[tokio::test]
    async fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pharmacare.db");

        let db = Database::open(DbConfig::new(&path)).await.unwrap();
        db.medicines()
            .insert(&NewMedicine::new("Ibuprofen 200mg", 899, 75))
            .await
            .unwrap();
        db.close().await;

        let db = Database::open(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.medicines().count().await.unwrap(), 1);
        db.close().await;
    }

    #[tokio::test]
    async fn test_unusable_location_fails_to_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("pharmacare.db");

        let result = Database::open(DbConfig::new(path)).await;
        assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-db.db");
        std::fs::write(&path, vec![0x42u8; 8192]).unwrap();

        let result = Database::open(DbConfig::new(path)).await;
        assert!(
            matches!(result, Err(DbError::ConnectionFailed(_))),
            "expected ConnectionFailed, got {:?}",
            result.err()
        );
    }
}
