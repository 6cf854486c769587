//! # pharmacare-db: Database Layer for PharmaCare
//!
//! SQLite persistence for the pharmacy: accounts, medicines, customers, the
//! sales ledger and reports. Uses sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaCare Data Flow                             │
//! │                                                                         │
//! │  Screen (billing: "Complete sale")                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   pharmacare-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ MedicineRepo  │    │ 001_initial_ │  │   │
//! │  │   │ DbConfig      │    │ CustomerRepo  │    │   schema.sql │  │   │
//! │  │   │ close()       │    │ SaleRepo      │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │                      ./pharmacare.db                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool and password settings, environment loading
//! - [`pool`] - The `Database` handle
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`password`] - Argon2 password hashing
//! - [`encode`] - Sale item encoding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmacare_core::{NewSale, SaleLineItem};
//! use pharmacare_db::{Database, DbConfig};
//!
//! let db = Database::open(DbConfig::new("./pharmacare.db")).await?;
//!
//! let para = db.medicines().search("paracetamol").await?.remove(0);
//! let sale = NewSale::walk_in().item(SaleLineItem::from_medicine(&para, 2));
//! let sale_id = db.sales().record_sale(&sale).await?;
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod encode;
pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use password::PasswordCost;
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::medicine::MedicineRepository;
pub use repository::report::{DashboardSummary, ReportRepository, SalesReport};
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
