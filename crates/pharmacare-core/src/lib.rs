//! # pharmacare-core: Pure Domain Logic for PharmaCare
//!
//! Types, money arithmetic, validation and checkout rules for the pharmacy
//! store. Everything here is a pure function; persistence lives in
//! `pharmacare-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmaCare Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          Screens                                │   │
//! │  │   Login ──► Medicines ──► Customers ──► Billing ──► Reports     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pharmacare-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │ Medicine  │  │   Money   │  │  NewSale  │  │   rules   │  │   │
//! │  │   │   Sale    │  │  TaxRate  │  │SaleTotals │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pharmacare-db (Database Layer)                 │   │
//! │  │        SQLite pool, migrations, repositories, sales ledger      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Medicine, Customer, Sale, User)
//! - [`money`] - Integer money (cents), discounts and tax
//! - [`checkout`] - Sale requests and their totals
//! - [`error`] - Domain error types
//! - [`validation`] - Field and record validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pharmacare_core::{Money, TaxRate};
//!
//! let price = Money::from_cents(1099);
//! let tax = price.calculate_tax(TaxRate::from_bps(825));
//!
//! // 8.25% of 10.99 = 0.906 → 0.91
//! assert_eq!(tax.cents(), 91);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{debit_stock, CustomerSnapshot, NewSale, SalePricing, SaleTotals};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Low-stock threshold given to a medicine when none is specified.
pub const DEFAULT_LOW_STOCK_ALERT: i64 = 10;

/// Customer name recorded on sales without a selected customer.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in Customer";

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Expiry look-ahead used by the dashboard counter.
pub const DASHBOARD_EXPIRY_WINDOW_DAYS: u32 = 30;

/// Expiry look-ahead used by the expiring-medicines report.
pub const EXPIRY_REPORT_WINDOW_DAYS: u32 = 90;
