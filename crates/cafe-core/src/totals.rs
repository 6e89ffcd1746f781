//! # Order Totals
//!
//! The single place where order totals are recomputed.
//!
//! ## Why One Function?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every mutation that can change what an order owes ends here:          │
//! │                                                                         │
//! │  add items ──────┐                                                      │
//! │  remove items ───┤                                                      │
//! │  apply discount ─┼──► recompute_order_totals(items, discount)          │
//! │  remove discount─┤         │                                            │
//! │  split payment ──┘         ▼                                            │
//! │                    final_total = Σ sub_total (unpaid remainders)       │
//! │                    vat         = final_total − final_total/1.05        │
//! │                    grand_total = max(0, final_total − discount)        │
//! │                                                                         │
//! │  Scattering these three lines across call sites is how totals drift.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{OrderItem, PaymentMethod};
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Order Totals
// =============================================================================

/// The three derived totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of unpaid item sub-totals, VAT-inclusive.
    pub final_total: Money,
    /// VAT component extracted from the final total.
    pub vat: Money,
    /// Amount due after the discount, floored at zero.
    pub grand_total: Money,
}

/// Recomputes an order's totals from its items and attached discount.
///
/// Items whose remaining quantity is zero contribute nothing (their
/// sub-total is zero by the line invariant), so summing every line is
/// equivalent to summing the unpaid remainder.
///
/// ## Example
/// ```rust
/// use cafe_core::money::Money;
/// use cafe_core::totals::recompute_order_totals;
///
/// // 2 × AED 10.00 with an AED 5.00 discount
/// let totals = recompute_order_totals(&[2000], Some(Money::from_cents(500)));
/// assert_eq!(totals.final_total.cents(), 2000);
/// assert_eq!(totals.vat.cents(), 95);
/// assert_eq!(totals.grand_total.cents(), 1500);
/// ```
pub fn recompute_order_totals(sub_totals_cents: &[i64], discount: Option<Money>) -> OrderTotals {
    let final_total = Money::from_cents(sub_totals_cents.iter().sum());
    let vat = final_total.vat_component();
    let grand_total = (final_total - discount.unwrap_or_default()).floor_zero();

    OrderTotals {
        final_total,
        vat,
        grand_total,
    }
}

/// Convenience wrapper over full item rows.
pub fn recompute_from_items(items: &[OrderItem], discount: Option<Money>) -> OrderTotals {
    let subs: Vec<i64> = items.iter().map(|i| i.sub_total_cents).collect();
    recompute_order_totals(&subs, discount)
}

/// Derives a line's sub-total: unpaid remainder × unit price.
///
/// Always recomputed on save; the stored value is never trusted from input.
#[inline]
pub fn line_sub_total(remaining_quantity: i64, unit_price: Money) -> Money {
    unit_price * remaining_quantity
}

// =============================================================================
// Tender Resolution
// =============================================================================

/// Resolves how an amount due splits across cash and card.
///
/// ## Rules
/// - `cash`  → the whole amount on the cash leg
/// - `card`  → the whole amount on the visa leg
/// - `multi` → the caller-supplied split, which must sum to the amount due
///   exactly or the whole operation is rejected
///
/// Returns `(cash, visa)` legs whose sum is always `due`.
pub fn resolve_tender(
    method: PaymentMethod,
    due: Money,
    offered_cash: Money,
    offered_visa: Money,
) -> CoreResult<(Money, Money)> {
    match method {
        PaymentMethod::Cash => Ok((due, Money::zero())),
        PaymentMethod::Card => Ok((Money::zero(), due)),
        PaymentMethod::Multi => {
            let tendered = offered_cash + offered_visa;
            if tendered != due {
                return Err(CoreError::TenderMismatch { due, tendered });
            }
            Ok((offered_cash, offered_visa))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_without_discount() {
        let totals = recompute_order_totals(&[1000, 2500], None);
        assert_eq!(totals.final_total.cents(), 3500);
        assert_eq!(totals.grand_total.cents(), 3500);
        assert_eq!(
            totals.vat,
            Money::from_cents(3500).vat_component()
        );
    }

    #[test]
    fn test_totals_with_discount() {
        let totals = recompute_order_totals(&[2000], Some(Money::from_cents(500)));
        assert_eq!(totals.final_total.cents(), 2000);
        assert_eq!(totals.vat.cents(), 95);
        assert_eq!(totals.grand_total.cents(), 1500);
    }

    #[test]
    fn test_discount_larger_than_bill_floors_at_zero() {
        let totals = recompute_order_totals(&[1000], Some(Money::from_cents(5000)));
        assert_eq!(totals.grand_total.cents(), 0);
        // final total and VAT are untouched by the discount
        assert_eq!(totals.final_total.cents(), 1000);
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let totals = recompute_order_totals(&[], None);
        assert_eq!(totals.final_total, Money::zero());
        assert_eq!(totals.vat, Money::zero());
        assert_eq!(totals.grand_total, Money::zero());
    }

    #[test]
    fn test_line_sub_total() {
        assert_eq!(line_sub_total(3, Money::from_cents(450)).cents(), 1350);
        assert_eq!(line_sub_total(0, Money::from_cents(450)).cents(), 0);
    }

    #[test]
    fn test_resolve_tender_cash_and_card() {
        let due = Money::from_cents(1500);

        let (cash, visa) =
            resolve_tender(PaymentMethod::Cash, due, Money::zero(), Money::zero()).unwrap();
        assert_eq!((cash.cents(), visa.cents()), (1500, 0));

        let (cash, visa) =
            resolve_tender(PaymentMethod::Card, due, Money::zero(), Money::zero()).unwrap();
        assert_eq!((cash.cents(), visa.cents()), (0, 1500));
    }

    #[test]
    fn test_resolve_tender_multi_must_match() {
        let due = Money::from_cents(1200);

        let ok = resolve_tender(
            PaymentMethod::Multi,
            due,
            Money::from_cents(700),
            Money::from_cents(500),
        );
        assert!(ok.is_ok());

        let err = resolve_tender(
            PaymentMethod::Multi,
            due,
            Money::from_cents(500),
            Money::from_cents(500),
        );
        assert!(matches!(err, Err(CoreError::TenderMismatch { .. })));
    }
}
