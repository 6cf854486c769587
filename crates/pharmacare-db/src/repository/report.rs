//! # Report Repository
//!
//! Read-only queries behind the dashboard and the reports screen. Every call
//! is a fresh snapshot; nothing is cached.
//!
//! ## Dashboard
//! ```text
//! ┌───────────────┬───────────────┬───────────────┬───────────────┬───────────────┐
//! │ Medicines     │ Customers     │ Sales total   │ Low stock     │ Expiring      │
//! │ COUNT(*)      │ COUNT(*)      │ SUM(total)    │ stock <= alert│ expiry <= +N d│
//! └───────────────┴───────────────┴───────────────┴───────────────┴───────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::customer::CustomerRepository;
use crate::repository::medicine::{MedicineRepository, MEDICINE_COLUMNS};
use crate::repository::sale::SaleRepository;
use crate::repository::{expiry_cutoff, today};
use pharmacare_core::{Medicine, Money, Sale};

/// Sales in a date range with their totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Newest first.
    pub sales: Vec<Sale>,
    pub sale_count: usize,
    pub revenue: Money,
    pub units_sold: i64,
}

/// The dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_medicines: i64,
    pub total_customers: i64,
    pub total_sales: Money,
    pub low_stock_count: i64,
    pub expiring_count: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales between two calendar days, inclusive, with revenue and units.
    pub async fn sales_report(&self, start: NaiveDate, end: NaiveDate) -> DbResult<SalesReport> {
        let sales = SaleRepository::new(self.pool.clone())
            .list_in_range(start, end)
            .await?;

        let revenue = sales.iter().map(Sale::total).sum();
        let units_sold = sales.iter().map(Sale::units).sum();

        debug!(start = %start, end = %end, count = sales.len(), "Built sales report");

        Ok(SalesReport {
            start,
            end,
            sale_count: sales.len(),
            sales,
            revenue,
            units_sold,
        })
    }

    /// Every medicine with its stock, by name.
    pub async fn stock_overview(&self) -> DbResult<Vec<Medicine>> {
        MedicineRepository::new(self.pool.clone()).list_all().await
    }

    /// Medicines at or below their threshold, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<Medicine>> {
        let sql = format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines \
             WHERE stock <= low_stock_alert \
             ORDER BY stock, name"
        );

        let medicines = sqlx::query_as::<_, Medicine>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(medicines)
    }

    /// Medicines expiring within `days` of today (UTC), soonest first.
    pub async fn expiring_within(&self, days: u32) -> DbResult<Vec<Medicine>> {
        self.expiring_as_of(expiry_cutoff(today(), days)).await
    }

    /// Medicines with an expiry date on or before `cutoff`, soonest first.
    pub async fn expiring_as_of(&self, cutoff: NaiveDate) -> DbResult<Vec<Medicine>> {
        let sql = format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines \
             WHERE expiry_date IS NOT NULL AND expiry_date <= ?1 \
             ORDER BY expiry_date, name"
        );

        let medicines = sqlx::query_as::<_, Medicine>(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        Ok(medicines)
    }

    /// Dashboard counters, expiring counted `expiry_window_days` ahead.
    pub async fn dashboard(&self, expiry_window_days: u32) -> DbResult<DashboardSummary> {
        self.dashboard_as_of(expiry_cutoff(today(), expiry_window_days))
            .await
    }

    /// Dashboard counters with an explicit expiry cutoff.
    pub async fn dashboard_as_of(&self, expiry_cutoff: NaiveDate) -> DbResult<DashboardSummary> {
        let medicines = MedicineRepository::new(self.pool.clone());

        let summary = DashboardSummary {
            total_medicines: medicines.count().await?,
            total_customers: CustomerRepository::new(self.pool.clone()).count().await?,
            total_sales: SaleRepository::new(self.pool.clone()).sum_totals().await?,
            low_stock_count: medicines.count_low_stock().await?,
            expiring_count: medicines.count_expiring_as_of(expiry_cutoff).await?,
        };

        debug!(?summary, "Built dashboard");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{amoxicillin, date, jane_smith, john_doe, paracetamol, test_db};
    use pharmacare_core::{NewMedicine, NewSale, SaleLineItem, DASHBOARD_EXPIRY_WINDOW_DAYS};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = test_db().await;

        let summary = db.reports().dashboard(DASHBOARD_EXPIRY_WINDOW_DAYS).await.unwrap();
        assert_eq!(
            summary,
            DashboardSummary {
                total_medicines: 0,
                total_customers: 0,
                total_sales: Money::zero(),
                low_stock_count: 0,
                expiring_count: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let db = test_db().await;
        let para = db
            .medicines()
            .insert(&paracetamol().expiry_date(date(2024, 6, 10)))
            .await
            .unwrap();
        db.medicines()
            .insert(&amoxicillin().low_stock_alert(60).expiry_date(date(2024, 9, 1)))
            .await
            .unwrap();
        db.customers().insert(&john_doe()).await.unwrap();
        db.customers().insert(&jane_smith()).await.unwrap();
        db.sales()
            .record_sale(&NewSale::walk_in().item(SaleLineItem::from_medicine(&para, 2)))
            .await
            .unwrap();

        let summary = db.reports().dashboard_as_of(date(2024, 7, 1)).await.unwrap();
        assert_eq!(summary.total_medicines, 2);
        assert_eq!(summary.total_customers, 2);
        assert_eq!(summary.total_sales, Money::from_cents(1100));
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.expiring_count, 1);
    }

    #[tokio::test]
    async fn test_huge_expiry_window_in_reports() {
        let db = test_db().await;
        db.medicines()
            .insert(&paracetamol().expiry_date(date(2400, 6, 1)))
            .await
            .unwrap();
        db.medicines().insert(&amoxicillin()).await.unwrap();

        let summary = db.reports().dashboard(200_000_000).await.unwrap();
        assert_eq!(summary.expiring_count, 1);

        let expiring = db.reports().expiring_within(u32::MAX).await.unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].name, "Paracetamol 500mg");
    }

    #[tokio::test]
    async fn test_low_stock_and_expiring_lists() {
        let db = test_db().await;
        let medicines = db.medicines();
        medicines.insert(&NewMedicine::new("B", 100, 7)).await.unwrap();
        medicines.insert(&NewMedicine::new("A", 100, 2)).await.unwrap();
        medicines.insert(&NewMedicine::new("C", 100, 90)).await.unwrap();
        medicines
            .insert(&NewMedicine::new("Late", 100, 90).expiry_date(date(2024, 3, 1)))
            .await
            .unwrap();
        medicines
            .insert(&NewMedicine::new("Early", 100, 90).expiry_date(date(2024, 1, 1)))
            .await
            .unwrap();

        let low: Vec<String> = db
            .reports()
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(low, vec!["A", "B"]);

        let expiring: Vec<String> = db
            .reports()
            .expiring_as_of(date(2024, 3, 1))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(expiring, vec!["Early", "Late"]);

        assert_eq!(db.reports().stock_overview().await.unwrap().len(), 5);
        assert_eq!(db.reports().expiring_within(0).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sales_report_totals() {
        let db = test_db().await;
        let para = db.medicines().insert(&paracetamol()).await.unwrap();
        let amox = db.medicines().insert(&amoxicillin()).await.unwrap();

        db.sales()
            .record_sale(&NewSale::walk_in().item(SaleLineItem::from_medicine(&para, 2)))
            .await
            .unwrap();
        db.sales()
            .record_sale(
                &NewSale::walk_in()
                    .item(SaleLineItem::from_medicine(&para, 1))
                    .item(SaleLineItem::from_medicine(&amox, 3)),
            )
            .await
            .unwrap();

        let today = chrono::Utc::now().date_naive();
        let report = db.reports().sales_report(today, today).await.unwrap();

        assert_eq!(report.sale_count, 2);
        assert_eq!(report.units_sold, 6);
        assert_eq!(report.revenue, Money::from_cents(1100 + 550 + 3825));

        let empty = db
            .reports()
            .sales_report(date(2020, 1, 1), date(2020, 12, 31))
            .await
            .unwrap();
        assert_eq!(empty.sale_count, 0);
        assert_eq!(empty.revenue, Money::zero());
    }
}
