//! # Sale Repository
//!
//! The sales ledger: records a sale and debits stock in one transaction.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale(&NewSale)                             │
//! │                                                                         │
//! │  0. VALIDATE (no I/O)                                                  │
//! │     └── NewSale::validate() → SaleTotals, or Validation error          │
//! │                                                                         │
//! │  1. BEGIN                                                              │
//! │     └── INSERT sales header          ← takes SQLite's write lock;      │
//! │                                        other writers wait here         │
//! │                                                                         │
//! │  2. FOR EACH LINE, IN ORDER                                            │
//! │     ├── SELECT stock                 ← sees every committed sale       │
//! │     │     └── no row → MedicineNotFound                                │
//! │     ├── debit_stock(stock, qty)                                        │
//! │     │     └── negative → InsufficientStock                             │
//! │     └── UPDATE stock                                                   │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! │                                                                         │
//! │  Any error in 1–3 → ROLLBACK: medicines and sales exactly as before    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable: there is no update or delete.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::encode::{decode_items, encode_items};
use crate::error::{DbError, DbResult};
use pharmacare_core::{debit_stock, Money, NewSale, Sale, SaleTotals};

const SALE_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, customer_email, \
     subtotal_cents, discount_cents, tax_cents, total_cents, sale_date, items_json";

/// Where a sale transaction is. Only `Committed` and `RolledBack` are ever
/// observable from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaleState {
    Started,
    HeaderInserted,
    Debited,
    Committed,
    RolledBack,
}

/// Header row as stored; items are still JSON.
#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    customer_id: Option<String>,
    customer_name: String,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    subtotal_cents: i64,
    discount_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    sale_date: DateTime<Utc>,
    items_json: String,
}

impl SaleRow {
    fn into_sale(self) -> DbResult<Sale> {
        Ok(Sale {
            items: decode_items(&self.items_json)?,
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            tax_cents: self.tax_cents,
            total_cents: self.total_cents,
            sale_date: self.sale_date,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and debits stock for every line, all or nothing.
    ///
    /// ## Returns
    /// The new sale's id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - no items, quantity or price ≤ 0, total mismatch
    /// * `DbError::MedicineNotFound` - a line names a medicine that doesn't exist
    /// * `DbError::InsufficientStock` - a line asks for more than is on hand
    /// * `DbError::NotFound` - the customer doesn't exist
    ///
    /// On every error nothing is written.
    pub async fn record_sale(&self, sale: &NewSale) -> DbResult<String> {
        let totals = sale.validate()?;
        let items_json = encode_items(&sale.items)?;
        let id = Uuid::new_v4().to_string();

        debug!(
            id = %id,
            items = sale.items.len(),
            total_cents = totals.total.cents(),
            state = ?SaleState::Started,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        match apply_sale(&mut tx, &id, sale, &totals, &items_json).await {
            Ok(()) => {
                tx.commit().await?;
                info!(
                    id = %id,
                    total = %totals.total,
                    state = ?SaleState::Committed,
                    "Sale committed"
                );
                Ok(id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(id = %id, error = %rollback_err, "Rollback failed");
                }
                warn!(id = %id, error = %err, state = ?SaleState::RolledBack, "Sale rolled back");
                Err(err)
            }
        }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let row = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// All sales, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date DESC");

        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed sales");
        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Sales made from the start of `start` through the end of `end` (UTC
    /// calendar days), newest first.
    ///
    /// `start > end` gives an empty list.
    pub async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Sale>> {
        if start > end {
            return Ok(Vec::new());
        }

        debug!(start = %start, end = %end, "Listing sales in range");

        let rows = match end.succ_opt() {
            Some(after_end) => {
                let sql = format!(
                    "SELECT {SALE_COLUMNS} FROM sales \
                     WHERE sale_date >= ?1 AND sale_date < ?2 \
                     ORDER BY sale_date DESC"
                );
                sqlx::query_as::<_, SaleRow>(&sql)
                    .bind(day_start(start))
                    .bind(day_start(after_end))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {SALE_COLUMNS} FROM sales WHERE sale_date >= ?1 ORDER BY sale_date DESC"
                );
                sqlx::query_as::<_, SaleRow>(&sql)
                    .bind(day_start(start))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of every sale's total.
    pub async fn sum_totals(&self) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_cents(cents))
    }
}

/// Steps 1 and 2 of the sale transaction. The caller commits or rolls back.
async fn apply_sale(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    sale: &NewSale,
    totals: &SaleTotals,
    items_json: &str,
) -> DbResult<()> {
    let customer = &sale.customer;

    let sql = format!(
        "INSERT INTO sales ({SALE_COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
    );

    sqlx::query(&sql)
        .bind(id)
        .bind(&customer.customer_id)
        .bind(customer.name.trim())
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(totals.subtotal.cents())
        .bind(totals.discount.cents())
        .bind(totals.tax.cents())
        .bind(totals.total.cents())
        .bind(Utc::now())
        .bind(items_json)
        .execute(&mut **tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found(
                "Customer",
                customer.customer_id.clone().unwrap_or_default(),
            ),
            other => other,
        })?;

    debug!(id = %id, state = ?SaleState::HeaderInserted, "Sale header written");

    for item in &sale.items {
        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM medicines WHERE id = ?1")
            .bind(&item.medicine_id)
            .fetch_optional(&mut **tx)
            .await?;

        let available = available.ok_or_else(|| DbError::MedicineNotFound {
            medicine_id: item.medicine_id.clone(),
        })?;

        let remaining = debit_stock(&item.medicine_id, available, item.quantity)?;

        sqlx::query("UPDATE medicines SET stock = ?2 WHERE id = ?1")
            .bind(&item.medicine_id)
            .bind(remaining)
            .execute(&mut **tx)
            .await?;

        debug!(
            medicine_id = %item.medicine_id,
            quantity = item.quantity,
            remaining = remaining,
            state = ?SaleState::Debited,
            "Stock debited"
        );
    }

    Ok(())
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
