//! # Error Types
//!
//! Domain-specific error types for backbar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  backbar-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  backbar-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server errors (apps/server)                                           │
//! │  └── ApiError         - What the SPA sees (HTTP status + JSON)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → SPA          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or domain logic failures and are
/// translated to user-facing messages at the API layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Store cannot be found.
    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// A voucher references an unknown ledger code.
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),

    /// Store is closed; sales and transfer entry are disabled.
    #[error("Store {store_code} is not open for business")]
    StoreClosed { store_code: String },

    /// Purchase allocations do not add up to the invoice value.
    ///
    /// ## Invariant
    /// `total = purchase_amount + Σ ledger allocations`, exact in paise.
    #[error("Invoice value {total_paise} does not match allocated {allocated_paise} (paise)")]
    AllocationMismatch {
        total_paise: i64,
        allocated_paise: i64,
    },

    /// Voucher numbering configuration is missing or disabled for a type.
    #[error("Voucher configuration not found or inactive for type: {0}")]
    VoucherConfigMissing(String),

    /// STORE_WISE numbering was requested without a resolvable store.
    #[error("Store code is required for store-wise voucher numbering")]
    StoreRequiredForNumbering,

    /// Voucher has more lines than allowed.
    #[error("Voucher cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A business date string could not be parsed.
    #[error("Unrecognised business date: {0}")]
    InvalidBusinessDate(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, when user input doesn't meet
/// requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad characters, malformed email, etc.).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate item code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AllocationMismatch {
            total_paise: 110_00,
            allocated_paise: 100_00,
        };
        assert_eq!(
            err.to_string(),
            "Invoice value 11000 does not match allocated 10000 (paise)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "item_code".to_string(),
        };
        assert_eq!(err.to_string(), "item_code is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
