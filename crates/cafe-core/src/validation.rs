//! # Validation Module
//!
//! Input validation utilities for CafePOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operation entry (cafe-db ops)                                │
//! │  ├── THIS MODULE: shape and range checks before any query              │
//! │  └── Rejected input never touches a transaction                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Business rules (cafe-core + ops)                             │
//! │  ├── Already-paid guards, remaining-quantity clamps                    │
//! │  └── Tender split resolution                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FK constraints                                │
//! │  └── CHECK (amount = cash + visa)                                      │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a guest count.
///
/// ## Rules
/// - Must be non-negative (walk-up takeaway orders have zero pax)
/// - Capped at 999 to catch fat-finger entries
pub fn validate_pax(pax: i64) -> ValidationResult<()> {
    if !(0..=999).contains(&pax) {
        return Err(ValidationError::OutOfRange {
            field: "number_of_pax".to_string(),
            min: 0,
            max: 999,
        });
    }

    Ok(())
}

/// Validates a price in fils.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (comped items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount value in fils.
///
/// ## Rules
/// - Must be positive: a zero discount is a no-op the caller should not send
pub fn validate_discount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "discount".to_string(),
        });
    }

    Ok(())
}

/// Validates a tender amount in fils (cash or visa leg of a split).
///
/// ## Rules
/// - Must be non-negative; a leg may be zero, the pair is checked elsewhere
pub fn validate_tender_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "tender amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a hall name.
pub fn validate_hall(hall: &str) -> ValidationResult<()> {
    let hall = hall.trim();

    if hall.is_empty() {
        return Err(ValidationError::Required {
            field: "hall".to_string(),
        });
    }

    if hall.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "hall".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that a line selection is non-empty.
///
/// Split bills, item additions and removals all take a list of lines; an
/// empty list is caller error, not a no-op.
pub fn validate_lines_not_empty<T>(lines: &[T]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_pax() {
        assert!(validate_pax(0).is_ok());
        assert!(validate_pax(12).is_ok());
        assert!(validate_pax(-1).is_err());
        assert!(validate_pax(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_discount_cents() {
        assert!(validate_discount_cents(500).is_ok());
        assert!(validate_discount_cents(0).is_err());
        assert!(validate_discount_cents(-500).is_err());
    }

    #[test]
    fn test_validate_lines_not_empty() {
        assert!(validate_lines_not_empty(&[1, 2]).is_ok());
        assert!(validate_lines_not_empty::<i64>(&[]).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_hall() {
        assert!(validate_hall("main hall").is_ok());
        assert!(validate_hall("  ").is_err());
    }
}
