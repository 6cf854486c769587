//! # Error Types
//!
//! Domain error types for pharmacare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmacare-core errors (this file)                                    │
//! │  ├── CoreError        - Stock arithmetic failures                      │
//! │  └── ValidationError  - Input that can never be stored                 │
//! │                                                                         │
//! │  pharmacare-db errors (separate crate)                                 │
//! │  └── DbError          - Everything the store can report                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → screen message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Business rule failures raised by pure domain functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A stock debit would take a medicine below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Paracetamol × 200
    ///      │
    ///      ▼
    /// debit_stock(available = 5, requested = 200)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 5, requested: 200 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, screen shows "Only 5 in stock"
    /// ```
    #[error("Insufficient stock for medicine {medicine_id}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation errors.
///
/// Raised before anything touches the database. Each variant names the
/// offending field so a screen can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A sale was submitted without line items.
    #[error("A sale needs at least one item")]
    EmptySale,

    /// The caller's total disagrees with the total computed from the items.
    #[error("Sale total mismatch: expected {expected}, computed {computed}")]
    TotalMismatch { expected: i64, computed: i64 },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The field this error refers to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::InvalidFormat { field, .. } => Some(field),
            ValidationError::EmptySale | ValidationError::TotalMismatch { .. } => None,
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            medicine_id: "m-1".to_string(),
            available: 5,
            requested: 200,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for medicine m-1: available 5, requested 200"
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::required("phone").to_string(), "phone is required");
        assert_eq!(
            ValidationError::TooShort {
                field: "password".to_string(),
                min: 6
            }
            .to_string(),
            "password must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::TotalMismatch {
                expected: 1000,
                computed: 1100
            }
            .to_string(),
            "Sale total mismatch: expected 1000, computed 1100"
        );
    }

    #[test]
    fn test_field_accessor() {
        assert_eq!(ValidationError::required("email").field(), Some("email"));
        assert_eq!(ValidationError::EmptySale.field(), None);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptySale.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptySale)));
    }
}
