//! # Repository Module
//!
//! Database repository implementations for PharmaCare.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Screen                                                                │
//! │       │                                                                 │
//! │       │  db.medicines().search("para")                                 │
//! │       ▼                                                                 │
//! │  MedicineRepository                                                    │
//! │  ├── insert / update / delete                                          │
//! │  ├── get_by_id / list_all / search                                     │
//! │  └── restock / count / count_low_stock                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Screens never write SQL; every invariant lives behind these methods.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Sign-up, login, login history
//! - [`MedicineRepository`](medicine::MedicineRepository) - Medicine catalog
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer records
//! - [`SaleRepository`](sale::SaleRepository) - Atomic sales ledger
//! - [`ReportRepository`](report::ReportRepository) - Read-only reports

use chrono::{NaiveDate, Utc};

pub use pharmacare_core::expiry_cutoff;

pub mod customer;
pub mod medicine;
pub mod report;
pub mod sale;
pub mod user;

/// `LIKE` pattern matching `query` anywhere, with `%`, `_` and `\` escaped.
/// Use together with `ESCAPE '\'`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Today's date in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
