//! # Domain Types
//!
//! Core domain types used throughout CafePOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (i64 seq)   │   │  id (i64 seq)   │       │
//! │  │  table_number   │   │  kot_number     │   │  amount_cents   │       │
//! │  │  hall           │   │  final_total    │   │  cash + visa    │       │
//! │  │  is_occupied    │◄──│  grand_total    │◄──│  method         │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   OrderItem     │   │  BusinessDay    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name, name_ar  │◄──│  quantity       │   │  start_time     │       │
//! │  │  price_cents    │   │  remaining_qty  │   │  end_time       │       │
//! │  │  categories M2M │   │  sub_total      │   │  is_closed      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! - Orders and payments: small sequential i64 ids assigned by the database;
//!   payment ids double as printed invoice numbers.
//! - Everything else: UUID v4 strings.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::{MORNING_SHIFT_END_HOUR, MORNING_SHIFT_START_HOUR};

// =============================================================================
// Shift
// =============================================================================

/// The working shift an order was opened in.
///
/// Derived from the order's creation time, never entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    /// 07:00 (inclusive) to 19:00 (exclusive).
    Morning,
    /// Everything outside the morning window.
    Evening,
}

impl Shift {
    /// Derives the shift for a time of day.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::types::Shift;
    /// use chrono::NaiveTime;
    ///
    /// let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    /// assert_eq!(Shift::for_time(noon), Shift::Morning);
    ///
    /// let night = NaiveTime::from_hms_opt(22, 30, 0).unwrap();
    /// assert_eq!(Shift::for_time(night), Shift::Evening);
    /// ```
    pub fn for_time(time: NaiveTime) -> Self {
        if (MORNING_SHIFT_START_HOUR..MORNING_SHIFT_END_HOUR).contains(&time.hour()) {
            Shift::Morning
        } else {
            Shift::Evening
        }
    }

    /// Lowercase label as stored and printed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Evening => "evening",
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card on the external terminal.
    Card,
    /// Split tender: part cash, part card, caller supplies the split.
    Multi,
}

impl PaymentMethod {
    /// Lowercase label as stored and printed.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Multi => "multi",
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// A physical table on the floor plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Table {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-facing table number, unique across halls.
    pub table_number: i64,

    /// Revenue center the table belongs to (e.g. "main hall", "terrace").
    pub hall: String,

    /// Seated guest count of the current (or last) party.
    pub no_of_pax: i64,

    /// True iff an unpaid order is currently bound to this table.
    pub is_occupied: bool,

    /// Owner tables are comped: applying a discount forces the full total.
    pub is_owner: bool,

    /// Whether the table is in service (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A menu category. One-level hierarchy: subcategories carry a `parent_id`.
///
/// Categories drive two things:
/// - kitchen routing (drinks / shisha / food resolve to stations)
/// - the group / subgroup sales sections of the day report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A menu product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to staff and on receipts.
    pub name: String,

    /// Arabic name printed under the English line on receipts.
    pub name_ar: Option<String>,

    /// VAT-inclusive price in fils.
    pub price_cents: i64,

    /// Whether the product is on the menu (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A discount applied to an order (or managed standalone by an admin).
///
/// A fresh row is created each time a discount is applied, so the ledger
/// keeps every value that was ever granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Discount {
    pub id: String,
    pub value_cents: i64,
    pub reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl Discount {
    /// Returns the discount value as Money.
    #[inline]
    pub fn value(&self) -> Money {
        Money::from_cents(self.value_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A dine-in or takeaway order.
///
/// ## Totals Invariants
/// After every mutating operation:
/// - `final_total = Σ item.sub_total` (unpaid remainders only)
/// - `vat = final_total − final_total / 1.05`
/// - `grand_total = max(0, final_total − discount)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Sequential order id, assigned by the database.
    pub id: i64,

    /// Table the order is bound to; None for takeaway.
    pub table_id: Option<String>,

    /// Guest count of the party.
    pub number_of_pax: i64,

    /// Revenue center, denormalized from the table at creation.
    pub hall: String,

    /// Shift the order was opened in, derived from creation time.
    pub shift: Shift,

    /// Kitchen order ticket number; a separate sequence from the order id.
    pub kot_number: i64,

    /// Sum of unpaid item sub-totals, VAT-inclusive.
    pub final_total_cents: i64,

    /// VAT component extracted from the final total.
    pub vat_cents: i64,

    /// Discount currently attached, if any.
    pub discount_id: Option<String>,

    /// Amount due: final total minus discount, floored at zero.
    pub grand_total_cents: i64,

    /// True once every item has been settled.
    pub is_paid: bool,

    /// Soft delete flag; deleted orders are excluded from reports.
    pub is_deleted: bool,

    /// Business day the order was settled under (stamped at checkout).
    pub business_day_id: Option<String>,

    /// When the order was fully settled.
    pub check_out_time: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl Order {
    #[inline]
    pub fn final_total(&self) -> Money {
        Money::from_cents(self.final_total_cents)
    }

    #[inline]
    pub fn vat(&self) -> Money {
        Money::from_cents(self.vat_cents)
    }

    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.grand_total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line on an order.
///
/// ## Quantity Bookkeeping
/// ```text
/// quantity           what the party ordered (net of cancellations)
/// remaining_quantity the unpaid portion: 0 ≤ remaining ≤ quantity
/// cancelled_quantity audit trail of removed printed units
/// quantity_to_print  units not yet sent to a kitchen station
/// ```
/// `sub_total` is always `remaining_quantity × product price`; it is
/// recomputed on every save, never trusted from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: i64,
    pub product_id: String,

    /// Units ordered, net of cancellations.
    pub quantity: i64,

    /// Units not yet paid for.
    pub remaining_quantity: i64,

    /// Units cancelled after being printed (kept for the loss report).
    pub cancelled_quantity: i64,

    /// Derived: remaining_quantity == 0.
    pub is_paid: bool,

    /// Units awaiting a kitchen ticket.
    pub quantity_to_print: i64,

    /// True once the line has been sent to its station at least once.
    pub is_printed: bool,

    /// Pax index that settled this line in a split, if any.
    pub paid_by: Option<i64>,

    /// Free-text kitchen notes ("no sugar").
    pub notes: Option<String>,

    /// remaining_quantity × product price, VAT-inclusive.
    pub sub_total_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A settled payment. Spans one order (checkout, split) or several (group
/// bill) through the payment/order join.
///
/// ## Invariant
/// `amount = cash_amount + visa_amount`, enforced on construction and by a
/// CHECK constraint in the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    /// Sequential payment id; printed as the invoice number.
    pub id: i64,

    pub amount_cents: i64,
    pub cash_amount_cents: i64,
    pub visa_amount_cents: i64,
    pub payment_method: PaymentMethod,

    /// Open business day the payment was taken under.
    pub business_day_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn cash_amount(&self) -> Money {
        Money::from_cents(self.cash_amount_cents)
    }

    #[inline]
    pub fn visa_amount(&self) -> Money {
        Money::from_cents(self.visa_amount_cents)
    }
}

// =============================================================================
// Business Day
// =============================================================================

/// An accounting day. At most one is open at any time; payments and settled
/// orders are tagged to the day that was open when they happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BusinessDay {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub closed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BusinessDay {
    /// True while the day is accepting payments.
    #[inline]
    pub fn is_open(&self) -> bool {
        !self.is_closed && self.end_time.is_none()
    }
}

// =============================================================================
// Printer
// =============================================================================

/// A registered station printer (one address per station role).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Printer {
    pub id: String,
    pub station: crate::routing::Station,
    pub address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_shift_boundaries() {
        assert_eq!(Shift::for_time(t(7, 0)), Shift::Morning);
        assert_eq!(Shift::for_time(t(12, 30)), Shift::Morning);
        assert_eq!(Shift::for_time(t(18, 59)), Shift::Morning);
        assert_eq!(Shift::for_time(t(19, 0)), Shift::Evening);
        assert_eq!(Shift::for_time(t(6, 59)), Shift::Evening);
        assert_eq!(Shift::for_time(t(23, 0)), Shift::Evening);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Shift::Morning.as_str(), "morning");
        assert_eq!(PaymentMethod::Multi.as_str(), "multi");
    }
}
