//! # Medicine Repository
//!
//! Database operations for the medicine catalog.
//!
//! ## Key Operations
//! - CRUD operations (full-row replace on update, hard delete)
//! - Name/brand/category search for the billing screen
//! - Restocking when goods arrive
//! - Dashboard counters (low stock, expiring)
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  medicines.stock changes ONLY through:                                  │
//! │                                                                         │
//! │  MedicineRepository::insert / update   ← set by the inventory screen   │
//! │  MedicineRepository::restock           ← goods received (+qty)         │
//! │  SaleRepository::record_sale           ← stock debit (−qty), atomic    │
//! │                                                                         │
//! │  CHECK (stock >= 0) backs all three up.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{expiry_cutoff, like_pattern, today};
use pharmacare_core::validation::{validate_new_medicine, validate_quantity, validate_search_query};
use pharmacare_core::{Medicine, NewMedicine};

pub(crate) const MEDICINE_COLUMNS: &str = "id, name, brand, category, price_cents, stock, \
     low_stock_alert, expiry_date, description, created_at";

/// Repository for medicine database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.medicines();
///
/// let med = repo.insert(&NewMedicine::new("Paracetamol 500mg", 550, 100)).await?;
/// let hits = repo.search("para").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    /// Creates a new MedicineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// Adds a medicine.
    ///
    /// ## Returns
    /// The stored record with its generated id and creation time.
    ///
    /// ## Errors
    /// * `DbError::Validation` - blank name, price ≤ 0, negative stock or threshold
    pub async fn insert(&self, medicine: &NewMedicine) -> DbResult<Medicine> {
        let medicine = medicine.normalized();
        validate_new_medicine(&medicine)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %medicine.name, stock = medicine.stock, "Inserting medicine");

        let sql = format!(
            "INSERT INTO medicines ({MEDICINE_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             RETURNING {MEDICINE_COLUMNS}"
        );

        let stored = sqlx::query_as::<_, Medicine>(&sql)
            .bind(&id)
            .bind(&medicine.name)
            .bind(&medicine.brand)
            .bind(&medicine.category)
            .bind(medicine.price_cents)
            .bind(medicine.stock)
            .bind(medicine.low_stock_alert)
            .bind(medicine.expiry_date)
            .bind(&medicine.description)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    /// Replaces every editable field of a medicine.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no medicine with this id
    /// * `DbError::Validation` - same rules as insert
    pub async fn update(&self, id: &str, medicine: &NewMedicine) -> DbResult<Medicine> {
        let medicine = medicine.normalized();
        validate_new_medicine(&medicine)?;

        debug!(id = %id, name = %medicine.name, stock = medicine.stock, "Updating medicine");

        let sql = format!(
            "UPDATE medicines SET \
                name = ?2, brand = ?3, category = ?4, price_cents = ?5, stock = ?6, \
                low_stock_alert = ?7, expiry_date = ?8, description = ?9 \
             WHERE id = ?1 \
             RETURNING {MEDICINE_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Medicine>(&sql)
            .bind(id)
            .bind(&medicine.name)
            .bind(&medicine.brand)
            .bind(&medicine.category)
            .bind(medicine.price_cents)
            .bind(medicine.stock)
            .bind(medicine.low_stock_alert)
            .bind(medicine.expiry_date)
            .bind(&medicine.description)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| DbError::not_found("Medicine", id))
    }

    /// Deletes a medicine. Past sales keep their item snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting medicine");

        let result = sqlx::query("DELETE FROM medicines WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id));
        }

        Ok(())
    }

    /// Gets a medicine by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Medicine>> {
        let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1");

        let medicine = sqlx::query_as::<_, Medicine>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(medicine)
    }

    /// All medicines ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Medicine>> {
        let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines ORDER BY name, created_at");

        let medicines = sqlx::query_as::<_, Medicine>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = medicines.len(), "Listed medicines");
        Ok(medicines)
    }

    /// Case-insensitive substring search over name, brand and category.
    ///
    /// ## Arguments
    /// * `query` - Search term; blank returns every medicine
    pub async fn search(&self, query: &str) -> DbResult<Vec<Medicine>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Searching medicines");

        if query.is_empty() {
            return self.list_all().await;
        }

        let sql = format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines \
             WHERE name LIKE ?1 ESCAPE '\\' \
                OR brand LIKE ?1 ESCAPE '\\' \
                OR category LIKE ?1 ESCAPE '\\' \
             ORDER BY name, created_at"
        );

        let medicines = sqlx::query_as::<_, Medicine>(&sql)
            .bind(like_pattern(&query))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = medicines.len(), "Search returned medicines");
        Ok(medicines)
    }

    /// Adds received units to a medicine's stock.
    ///
    /// ## Returns
    /// The new stock level.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<i64> {
        validate_quantity(quantity)?;

        debug!(id = %id, quantity = quantity, "Restocking medicine");

        let stock: Option<i64> =
            sqlx::query_scalar("UPDATE medicines SET stock = stock + ?2 WHERE id = ?1 RETURNING stock")
                .bind(id)
                .bind(quantity)
                .fetch_optional(&self.pool)
                .await?;

        stock.ok_or_else(|| DbError::not_found("Medicine", id))
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Medicines at or below their low-stock threshold.
    pub async fn count_low_stock(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM medicines WHERE stock <= low_stock_alert")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Medicines expiring within `days` of today (UTC), already expired included.
    pub async fn count_expiring_within(&self, days: u32) -> DbResult<i64> {
        self.count_expiring_as_of(expiry_cutoff(today(), days)).await
    }

    /// Medicines whose expiry date is on or before `cutoff`.
    /// Medicines without an expiry date never count.
    pub async fn count_expiring_as_of(&self, cutoff: NaiveDate) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM medicines WHERE expiry_date IS NOT NULL AND expiry_date <= ?1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
