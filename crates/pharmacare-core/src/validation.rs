//! # Validation Module
//!
//! Input validation for everything the store accepts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screens                                                      │
//! │  ├── Required-field checks on the forms                                │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repositories (pharmacare-db)                                 │
//! │  └── THIS MODULE: runs before any statement is issued                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (price_cents > 0), CHECK (stock >= 0)                       │
//! │  ├── UNIQUE (users.email, customers.phone, customers.email)            │
//! │  └── Foreign key customers ← sales (ON DELETE SET NULL)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharmacare_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("email", "admin@pharmacare.com").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{NewCustomer, NewMedicine};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LENGTH: usize = 200;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PHONE_LENGTH: usize = 30;
const MAX_PASSWORD_LENGTH: usize = 256;
const MAX_QUERY_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (medicine, customer or user).
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters after trimming
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be blank
/// - Exactly one `@`, with text on both sides
/// - No whitespace inside
///
/// ## Example
/// ```rust
/// use pharmacare_core::validation::validate_email;
///
/// assert!(validate_email("email", "john@email.com").is_ok());
/// assert!(validate_email("email", "john.email.com").is_err());
/// assert!(validate_email("email", "@email.com").is_err());
/// ```
pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required(field));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(field, "must not contain spaces"));
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid_format(
            field,
            "must look like name@domain",
        )),
    }
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be blank
/// - Digits plus `+ - ( ) .` and spaces, with at least one digit
/// - At most 30 characters
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::required("phone"));
    }

    if phone.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LENGTH,
        });
    }

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' ');
    if !phone.chars().all(allowed) || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "phone",
            "must contain only digits, spaces and + - ( ) .",
        ));
    }

    Ok(())
}

/// Validates a sign-up password.
///
/// Not trimmed: leading and trailing spaces are part of the secret.
///
/// ## Example
/// ```rust
/// use pharmacare_core::validation::validate_password;
///
/// assert!(validate_password("admin123").is_ok());
/// assert!(validate_password("12345").is_err());
/// ```
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Billing: Add Item                                                      │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → stock is checked later, inside the sale transaction     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents. Medicines are never free.
///
/// ## Example
/// ```rust
/// use pharmacare_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(550).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

pub fn validate_low_stock_alert(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "low_stock_alert".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate in basis points (discount or tax).
///
/// ## Rules
/// - Between 0 and 10000 (0% to 100%)
pub fn validate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a medicine before insert or update.
pub fn validate_new_medicine(medicine: &NewMedicine) -> ValidationResult<()> {
    validate_name("name", &medicine.name)?;
    validate_price_cents(medicine.price_cents)?;
    validate_stock(medicine.stock)?;
    validate_low_stock_alert(medicine.low_stock_alert)?;
    Ok(())
}

/// Validates a customer before insert or update.
///
/// Name and phone are required; an email, when given, must look like one.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_name("name", &customer.name)?;

    match customer.phone.as_deref() {
        Some(phone) => validate_phone(phone)?,
        None => return Err(ValidationError::required("phone")),
    }

    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email("email", email)?;
    }

    Ok(())
}

/// Validates the sign-up form.
pub fn validate_registration(full_name: &str, email: &str, password: &str) -> ValidationResult<()> {
    validate_name("full_name", full_name)?;
    validate_email("email", email)?;
    validate_password(password)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
