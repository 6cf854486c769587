//! # Domain Types
//!
//! Records owned by the store and the input shapes used to create them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Medicine     │   │    Customer     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  price_cents    │   │  phone (unique) │   │  customer_id?   │       │
//! │  │  stock (>= 0)   │   │  email (unique) │   │  total_cents    │       │
//! │  │  expiry_date?   │   │  address?       │   │  items: [Line]  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │ LoginHistory    │   │  SaleLineItem   │       │
//! │  │  email (unique) │   │  email (unique) │   │  medicine_id    │       │
//! │  │  (hash stays    │   │  last_login_at  │   │  quantity       │       │
//! │  │   in the db)    │   │                 │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   │  name snapshot  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `New*` types are what callers fill in; the store adds `id` and
//! `created_at`. Records are value copies: mutating one never touches a row.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::DEFAULT_LOW_STOCK_ALERT;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points: 1 bps = 0.01%, so 1700 = 17%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user. The password hash never leaves the database crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub full_name: String,
    /// Login identity, matched exactly as stored.
    pub email: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One row of the login suggestion list. Not a security record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LoginHistoryEntry {
    pub email: String,
    #[ts(as = "String")]
    pub last_login_at: DateTime<Utc>,
}

// =============================================================================
// Medicine
// =============================================================================

/// A medicine in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Selling price in minor units, always > 0.
    pub price_cents: i64,
    /// Units on hand, never negative.
    pub stock: i64,
    /// Flag for reordering when stock is at or below this.
    pub low_stock_alert: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Medicine {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// `stock <= low_stock_alert`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_alert
    }

    /// True when the medicine expires on or before `today + days`,
    /// which includes anything already expired.
    pub fn expires_within(&self, today: NaiveDate, days: u32) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry <= expiry_cutoff(today, days),
            None => false,
        }
    }

    /// The editable fields of this record, e.g. to prefill an edit form.
    pub fn to_new(&self) -> NewMedicine {
        NewMedicine {
            name: self.name.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            price_cents: self.price_cents,
            stock: self.stock,
            low_stock_alert: self.low_stock_alert,
            expiry_date: self.expiry_date,
            description: self.description.clone(),
        }
    }
}

/// Last expiry date that counts as "expiring within `days`" of `today`.
///
/// Saturates at 9999-12-31, the last date that still compares correctly as
/// `YYYY-MM-DD` text in the `medicines.expiry_date` column.
pub fn expiry_cutoff(today: NaiveDate, days: u32) -> NaiveDate {
    let latest = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX);
    today
        .checked_add_days(Days::new(u64::from(days)))
        .map_or(latest, |cutoff| cutoff.min(latest))
}

/// Fields supplied when adding or replacing a medicine.
///
/// ## Example
/// ```rust
/// use pharmacare_core::NewMedicine;
///
/// let med = NewMedicine::new("Paracetamol 500mg", 550, 100)
///     .brand("Tylenol")
///     .category("Pain Relief");
/// assert_eq!(med.low_stock_alert, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMedicine {
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub low_stock_alert: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl NewMedicine {
    /// A medicine with the default low-stock threshold and no optional fields.
    pub fn new(name: impl Into<String>, price_cents: i64, stock: i64) -> Self {
        NewMedicine {
            name: name.into(),
            brand: None,
            category: None,
            price_cents,
            stock,
            low_stock_alert: DEFAULT_LOW_STOCK_ALERT,
            expiry_date: None,
            description: None,
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn low_stock_alert(mut self, threshold: i64) -> Self {
        self.low_stock_alert = threshold;
        self
    }

    pub fn expiry_date(mut self, date: NaiveDate) -> Self {
        self.expiry_date = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trims text fields and turns blank optionals into `None`.
    pub fn normalized(&self) -> NewMedicine {
        NewMedicine {
            name: self.name.trim().to_string(),
            brand: non_blank(self.brand.as_deref()),
            category: non_blank(self.category.as_deref()),
            price_cents: self.price_cents,
            stock: self.stock,
            low_stock_alert: self.low_stock_alert,
            expiry_date: self.expiry_date,
            description: non_blank(self.description.as_deref()),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record. Phone and email are unique when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn to_new(&self) -> NewCustomer {
        NewCustomer {
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
        }
    }
}

/// Fields supplied when adding or replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        NewCustomer {
            name: name.into(),
            phone: Some(phone.into()),
            email: None,
            address: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Trims every field; blank optionals become `None`.
    ///
    /// Forms submit `""` for untouched inputs. Stored as NULL, two customers
    /// without an email never collide on the unique index.
    pub fn normalized(&self) -> NewCustomer {
        NewCustomer {
            name: self.name.trim().to_string(),
            phone: non_blank(self.phone.as_deref()),
            email: non_blank(self.email.as_deref()),
            address: non_blank(self.address.as_deref()),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale: which medicine, how many, at what price.
///
/// `name` is a snapshot taken at sale time, so history still reads correctly
/// after the medicine is renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub medicine_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub name: String,
}

impl SaleLineItem {
    pub fn new(
        medicine_id: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
        name: impl Into<String>,
    ) -> Self {
        SaleLineItem {
            medicine_id: medicine_id.into(),
            quantity,
            unit_price_cents,
            name: name.into(),
        }
    }

    /// A line for `quantity` units of `medicine` at its current price.
    pub fn from_medicine(medicine: &Medicine, quantity: i64) -> Self {
        SaleLineItem {
            medicine_id: medicine.id.clone(),
            quantity,
            unit_price_cents: medicine.price_cents,
            name: medicine.name.clone(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// `unit_price × quantity`, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_times(self.quantity)
    }
}

/// A recorded sale. Immutable: there is no update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Null for walk-in sales and after the customer was deleted.
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub items: Vec<SaleLineItem>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Units sold across all lines.
    pub fn units(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine(stock: i64, alert: i64, expiry: Option<NaiveDate>) -> Medicine {
        Medicine {
            id: "m-1".to_string(),
            name: "Paracetamol 500mg".to_string(),
            brand: None,
            category: None,
            price_cents: 550,
            stock,
            low_stock_alert: alert,
            expiry_date: expiry,
            description: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(medicine(10, 10, None).is_low_stock());
        assert!(medicine(0, 10, None).is_low_stock());
        assert!(!medicine(11, 10, None).is_low_stock());
    }

    #[test]
    fn test_expires_within_includes_expired() {
        let today = date(2026, 10, 17);
        assert!(medicine(1, 10, Some(date(2023, 1, 1))).expires_within(today, 30));
        assert!(medicine(1, 10, Some(date(2026, 11, 16))).expires_within(today, 30));
        assert!(!medicine(1, 10, Some(date(2026, 11, 17))).expires_within(today, 30));
        assert!(!medicine(1, 10, None).expires_within(today, 30));
    }

    #[test]
    fn test_expiry_cutoff_saturates() {
        let today = date(2026, 10, 17);
        assert_eq!(expiry_cutoff(today, 30), date(2026, 11, 16));
        assert_eq!(expiry_cutoff(today, 0), today);
        assert_eq!(expiry_cutoff(today, u32::MAX), date(9999, 12, 31));
        assert_eq!(expiry_cutoff(NaiveDate::MAX, 1), date(9999, 12, 31));

        assert!(medicine(1, 10, Some(date(2300, 1, 1))).expires_within(today, u32::MAX));
    }

    #[test]
    fn test_new_customer_blank_fields_become_none() {
        let customer = NewCustomer {
            name: "  Jane Smith ".to_string(),
            phone: Some(" 987-654-3210 ".to_string()),
            email: Some("   ".to_string()),
            address: Some(String::new()),
        }
        .normalized();

        assert_eq!(customer.name, "Jane Smith");
        assert_eq!(customer.phone.as_deref(), Some("987-654-3210"));
        assert_eq!(customer.email, None);
        assert_eq!(customer.address, None);
    }

    #[test]
    fn test_medicine_round_trips_through_to_new() {
        let med = medicine(100, 10, Some(date(2027, 12, 31)));
        let new = med.to_new();
        assert_eq!(new.name, med.name);
        assert_eq!(new.price_cents, 550);
        assert_eq!(new.expiry_date, med.expiry_date);
    }

    #[test]
    fn test_line_item_from_medicine_snapshots_price_and_name() {
        let med = medicine(100, 10, None);
        let line = SaleLineItem::from_medicine(&med, 2);
        assert_eq!(line.unit_price_cents, 550);
        assert_eq!(line.name, "Paracetamol 500mg");
        assert_eq!(line.line_total(), Some(Money::from_cents(1100)));
    }
}
