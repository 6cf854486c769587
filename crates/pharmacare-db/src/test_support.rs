//! Shared fixtures for the unit tests in this crate.

use chrono::NaiveDate;
use pharmacare_core::{NewCustomer, NewMedicine};

use crate::{Database, DbConfig};

/// A fresh, migrated in-memory database.
pub async fn test_db() -> Database {
    Database::open(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Paracetamol 500mg, 5.50, 100 in stock.
pub fn paracetamol() -> NewMedicine {
    NewMedicine::new("Paracetamol 500mg", 550, 100)
}

/// Amoxicillin 250mg, 12.75, 50 in stock.
pub fn amoxicillin() -> NewMedicine {
    NewMedicine::new("Amoxicillin 250mg", 1275, 50)
}

pub fn john_doe() -> NewCustomer {
    NewCustomer::new("John Doe", "123-456-7890")
        .email("john@email.com")
        .address("123 Main St")
}

pub fn jane_smith() -> NewCustomer {
    NewCustomer::new("Jane Smith", "987-654-3210").email("jane@email.com")
}
