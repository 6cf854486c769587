//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (pharmacare-core)     SQLite Error (sqlx::Error)       │
//! │       │                                     │                           │
//! │       └──────────────┬──────────────────────┘                           │
//! │                      ▼                                                  │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Screen shows a message per variant                                    │
//! │  ("Only 5 in stock", "Email already registered", ...)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharmacare_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// Every repository method returns these. Variants are distinct so callers
/// can branch on them without parsing messages.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before any statement ran.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Update or delete of an id that doesn't exist
    /// - Restock of a deleted medicine
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering an email that already has an account
    /// - Customer phone or email already used by another customer
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A sale line references a medicine that doesn't exist.
    #[error("Medicine not found: {medicine_id}")]
    MedicineNotFound { medicine_id: String },

    /// A sale line asks for more units than are on hand.
    #[error("Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine_id: String,
        available: i64,
        requested: i64,
    },

    /// Unknown email or wrong password. The two are deliberately identical.
    #[error("Invalid email or password")]
    AuthenticationFailed,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - File is not a SQLite database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The database handle was closed.
    #[error("Database is closed")]
    Closed,

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Password hashing or hash parsing failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Sale items could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation raised by SQLite,
    /// which only reports the column.
    pub(crate) fn with_duplicate_value(self, value_for: impl Fn(&str) -> Option<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, value } => {
                let value = value_for(&field).unwrap_or(value);
                DbError::UniqueViolation { field, value }
            }
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::Closed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if let Some(target) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: unique_column(target),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("file is not a database")
                    || msg.contains("unable to open database")
                {
                    DbError::ConnectionFailed(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::Closed,

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// `customers.phone` → `phone`. Composite targets keep the first column.
fn unique_column(target: &str) -> String {
    let first = target.split(',').next().unwrap_or(target).trim();
    first
        .rsplit('.')
        .next()
        .unwrap_or(first)
        .to_string()
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        use sqlx::migrate::MigrateError;

        match err {
            // "file is not a database" first shows up on a migration statement
            MigrateError::Execute(source) | MigrateError::ExecuteMigration(source, _) => {
                match DbError::from(source) {
                    e @ (DbError::ConnectionFailed(_) | DbError::Closed) => e,
                    other => DbError::MigrationFailed(other.to_string()),
                }
            }
            other => DbError::MigrationFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for DbError {
    fn from(err: argon2::password_hash::Error) -> Self {
        DbError::PasswordHash(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                medicine_id,
                available,
                requested,
            } => DbError::InsufficientStock {
                medicine_id,
                available,
                requested,
            },
            CoreError::Validation(validation) => DbError::Validation(validation),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
