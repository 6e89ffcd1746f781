//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cafe-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── OpsError         - Operation surface (what hosts map to statuses) │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OpsError → Host                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order id, amounts, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Each is a state the
/// billing flow refuses to enter, not a storage failure.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The order has already been settled.
    ///
    /// ## When This Occurs
    /// - Adding items, applying/removing a discount, splitting or checking
    ///   out an order whose `is_paid` flag is set
    #[error("Order {0} is already paid")]
    AlreadyPaid(i64),

    /// A split line asked for more units than remain unpaid.
    #[error("Requested {requested} of product {product_id}, only {remaining} remaining")]
    QuantityExceedsRemaining {
        product_id: String,
        remaining: i64,
        requested: i64,
    },

    /// A multi-tender split does not add up to the amount due.
    ///
    /// ## When This Occurs
    /// - Checkout/split/group with method `multi` where
    ///   cash + visa ≠ computed total. The whole operation is rejected;
    ///   no payment row is written.
    #[error("Tendered {tendered} does not match amount due {due}")]
    TenderMismatch { due: Money, tendered: Money },

    /// Nothing to settle (empty selection, zero total, no unpaid orders).
    #[error("Nothing to settle: {0}")]
    NothingToSettle(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
