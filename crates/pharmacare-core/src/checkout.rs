//! # Checkout Module
//!
//! Builds a sale request and computes its totals. No I/O: the sales ledger
//! in pharmacare-db takes a validated [`NewSale`] and applies it atomically.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Billing screen                                                         │
//! │                                                                         │
//! │  NewSale::walk_in()  or  NewSale::for_customer(&customer)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_item(line) × N   (same medicine at same price → quantities merge) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate() → SaleTotals                                               │
//! │       │        subtotal = Σ qty × unit price                           │
//! │       │        discount = subtotal × discount_bps                      │
//! │       │        tax      = (subtotal − discount) × tax_rate             │
//! │       │        total    = subtotal − discount + tax                    │
//! │       ▼                                                                 │
//! │  SaleRepository::record_sale(&sale)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  debit_stock(available, requested) per line, inside the transaction    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use pharmacare_core::checkout::NewSale;
//! use pharmacare_core::SaleLineItem;
//!
//! let mut sale = NewSale::walk_in();
//! sale.add_item(SaleLineItem::new("med-1", 2, 550, "Paracetamol 500mg"));
//!
//! let totals = sale.validate().unwrap();
//! assert_eq!(totals.total.to_string(), "11.00");
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Customer, SaleLineItem, TaxRate};
use crate::validation::{validate_bps, validate_name, validate_price_cents, validate_quantity, ValidationResult};
use crate::WALK_IN_CUSTOMER_NAME;

// =============================================================================
// Customer Snapshot
// =============================================================================

/// Customer details copied onto the sale header.
///
/// The copy outlives the customer row: if the customer is deleted later, the
/// sale keeps the name, phone and email it was made with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerSnapshot {
    pub customer_id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerSnapshot {
    /// An anonymous counter sale.
    pub fn walk_in() -> Self {
        CustomerSnapshot {
            customer_id: None,
            name: WALK_IN_CUSTOMER_NAME.to_string(),
            phone: None,
            email: None,
        }
    }

    pub fn from_customer(customer: &Customer) -> Self {
        CustomerSnapshot {
            customer_id: Some(customer.id.clone()),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
        }
    }
}

impl Default for CustomerSnapshot {
    fn default() -> Self {
        CustomerSnapshot::walk_in()
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Discount and tax applied to a sale. Both default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePricing {
    /// Discount on the subtotal in basis points (1000 = 10% off).
    pub discount_bps: u32,
    pub tax_rate: TaxRate,
}

/// Totals derived from the line items and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Computes the totals for `items` under `pricing`.
    ///
    /// Fails only when a line or the subtotal overflows `i64` cents.
    pub fn compute(items: &[SaleLineItem], pricing: SalePricing) -> ValidationResult<SaleTotals> {
        let mut subtotal = Money::zero();
        for item in items {
            subtotal = item
                .line_total()
                .and_then(|line| subtotal.checked_add(line))
                .ok_or_else(total_out_of_range)?;
        }

        let discount = subtotal.portion_bps(pricing.discount_bps);
        let taxable = subtotal - discount;
        let tax = taxable.calculate_tax(pricing.tax_rate);
        let total = taxable.checked_add(tax).ok_or_else(total_out_of_range)?;

        Ok(SaleTotals {
            subtotal,
            discount,
            tax,
            total,
        })
    }
}

fn total_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "total".to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// New Sale
// =============================================================================

/// Everything needed to record a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub customer: CustomerSnapshot,
    pub items: Vec<SaleLineItem>,
    pub pricing: SalePricing,
    /// The total the cashier saw. When set, the ledger refuses the sale if
    /// its own computation differs.
    pub expected_total_cents: Option<i64>,
}

impl NewSale {
    pub fn walk_in() -> Self {
        NewSale::with_customer(CustomerSnapshot::walk_in())
    }

    pub fn for_customer(customer: &Customer) -> Self {
        NewSale::with_customer(CustomerSnapshot::from_customer(customer))
    }

    pub fn with_customer(customer: CustomerSnapshot) -> Self {
        NewSale {
            customer,
            items: Vec::new(),
            pricing: SalePricing::default(),
            expected_total_cents: None,
        }
    }

    /// Adds a line, merging it into an existing line for the same medicine
    /// at the same unit price.
    pub fn add_item(&mut self, item: SaleLineItem) -> &mut Self {
        let existing = self.items.iter_mut().find(|line| {
            line.medicine_id == item.medicine_id && line.unit_price_cents == item.unit_price_cents
        });

        match existing {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        self
    }

    /// Builder form of [`NewSale::add_item`].
    pub fn item(mut self, item: SaleLineItem) -> Self {
        self.add_item(item);
        self
    }

    pub fn discount_bps(mut self, bps: u32) -> Self {
        self.pricing.discount_bps = bps;
        self
    }

    pub fn tax_rate(mut self, rate: TaxRate) -> Self {
        self.pricing.tax_rate = rate;
        self
    }

    pub fn expect_total(mut self, cents: i64) -> Self {
        self.expected_total_cents = Some(cents);
        self
    }

    /// Checks every precondition of a sale and returns its totals.
    ///
    /// ## Rules
    /// - At least one line item
    /// - Every quantity > 0 and every unit price > 0
    /// - Discount and tax rates within 0..=10000 bps
    /// - Expected total, if given, equals the computed total
    pub fn validate(&self) -> ValidationResult<SaleTotals> {
        if self.items.is_empty() {
            return Err(ValidationError::EmptySale);
        }

        validate_name("customer_name", &self.customer.name)?;

        for item in &self.items {
            if item.medicine_id.trim().is_empty() {
                return Err(ValidationError::required("medicine_id"));
            }
            validate_quantity(item.quantity)?;
            validate_price_cents(item.unit_price_cents)?;
        }

        validate_bps("discount", self.pricing.discount_bps)?;
        validate_bps("tax_rate", self.pricing.tax_rate.bps())?;

        let totals = SaleTotals::compute(&self.items, self.pricing)?;

        if let Some(expected) = self.expected_total_cents {
            if expected != totals.total.cents() {
                return Err(ValidationError::TotalMismatch {
                    expected,
                    computed: totals.total.cents(),
                });
            }
        }

        Ok(totals)
    }
}

// =============================================================================
// Stock Debit
// =============================================================================

/// Stock left after selling `requested` units out of `available`.
///
/// ```rust
/// use pharmacare_core::checkout::debit_stock;
///
/// assert_eq!(debit_stock("med-1", 100, 2).unwrap(), 98);
/// assert!(debit_stock("med-1", 5, 200).is_err());
/// ```
pub fn debit_stock(medicine_id: &str, available: i64, requested: i64) -> CoreResult<i64> {
    match available.checked_sub(requested) {
        Some(remaining) if remaining >= 0 => Ok(remaining),
        _ => Err(CoreError::InsufficientStock {
            medicine_id: medicine_id.to_string(),
            available,
            requested,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paracetamol(qty: i64) -> SaleLineItem {
        SaleLineItem::new("med-para", qty, 550, "Paracetamol 500mg")
    }

    fn amoxicillin(qty: i64) -> SaleLineItem {
        SaleLineItem::new("med-amox", qty, 1275, "Amoxicillin 250mg")
    }

    #[test]
    fn test_walk_in_sale_totals() {
        let sale = NewSale::walk_in().item(paracetamol(2));
        let totals = sale.validate().unwrap();

        assert_eq!(sale.customer.name, "Walk-in Customer");
        assert_eq!(sale.customer.customer_id, None);
        assert_eq!(totals.subtotal.cents(), 1100);
        assert_eq!(totals.discount, Money::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total.cents(), 1100);
    }

    #[test]
    fn test_discount_then_tax() {
        // subtotal 5.50 + 25.50 = 31.00; 10% off = 27.90; 5% tax = 1.395 → 1.40
        let sale = NewSale::walk_in()
            .item(paracetamol(1))
            .item(amoxicillin(2))
            .discount_bps(1000)
            .tax_rate(TaxRate::from_bps(500));
        let totals = sale.validate().unwrap();

        assert_eq!(totals.subtotal.cents(), 3100);
        assert_eq!(totals.discount.cents(), 310);
        assert_eq!(totals.tax.cents(), 140);
        assert_eq!(totals.total.cents(), 2930);
        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount + totals.tax
        );
    }

    #[test]
    fn test_add_item_merges_same_medicine_and_price() {
        let mut sale = NewSale::walk_in();
        sale.add_item(paracetamol(2));
        sale.add_item(paracetamol(3));
        sale.add_item(SaleLineItem::new("med-para", 1, 500, "Paracetamol 500mg"));

        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].quantity, 5);
        assert_eq!(sale.items[1].unit_price_cents, 500);
    }

    #[test]
    fn test_empty_sale_rejected() {
        assert_eq!(NewSale::walk_in().validate(), Err(ValidationError::EmptySale));
    }

    #[test]
    fn test_bad_lines_rejected() {
        let zero_qty = NewSale::walk_in().item(paracetamol(0));
        assert!(matches!(
            zero_qty.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));

        let free = NewSale::walk_in().item(SaleLineItem::new("med-x", 1, 0, "Free"));
        assert!(free.validate().is_err());

        let no_id = NewSale::walk_in().item(SaleLineItem::new(" ", 1, 100, "Ghost"));
        assert_eq!(no_id.validate(), Err(ValidationError::required("medicine_id")));
    }

    #[test]
    fn test_expected_total_must_match() {
        let ok = NewSale::walk_in().item(paracetamol(2)).expect_total(1100);
        assert!(ok.validate().is_ok());

        let wrong = NewSale::walk_in().item(paracetamol(2)).expect_total(1000);
        assert_eq!(
            wrong.validate(),
            Err(ValidationError::TotalMismatch {
                expected: 1000,
                computed: 1100
            })
        );
    }

    #[test]
    fn test_overflowing_subtotal_rejected() {
        let sale = NewSale::walk_in().item(SaleLineItem::new("med-x", i64::MAX, 2, "Huge"));
        assert!(matches!(
            sale.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_debit_stock() {
        assert_eq!(debit_stock("m", 10, 10), Ok(0));
        assert_eq!(
            debit_stock("m", 5, 200),
            Err(CoreError::InsufficientStock {
                medicine_id: "m".to_string(),
                available: 5,
                requested: 200
            })
        );
    }
}
