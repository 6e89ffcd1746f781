//! # cafe-core
//!
//! Pure domain logic for CafePOS: money, totals, receipts, reports and
//! kitchen routing. No I/O lives here.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          cafe-core                                      │
//! │                                                                         │
//! │  money ──────► integer fils, 5% inclusive VAT extraction               │
//! │  types ──────► Table / Order / OrderItem / Payment / BusinessDay       │
//! │  totals ─────► the one recompute path for order totals                 │
//! │  routing ────► category tree → station map                             │
//! │  receipt ────► tax invoices and kitchen tickets (45 / 32 cols)         │
//! │  report ─────► X / Z day reports and the sales listing                 │
//! │  validation ─► shape checks before anything touches a transaction      │
//! │  error ──────► CoreError / ValidationError (thiserror)                 │
//! │                                                                         │
//! │  cafe-db depends on this crate; this crate depends on nothing of ours. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod routing;
pub mod totals;
pub mod types;
pub mod validation;

// ===== Re-exports =====

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use routing::{Station, StationMap};
pub use totals::{
    line_sub_total, recompute_from_items, recompute_order_totals, resolve_tender, OrderTotals,
};
pub use types::{
    BusinessDay, Category, Discount, Order, OrderItem, Payment, PaymentMethod, Printer, Product,
    Shift, Table,
};

// ===== Domain Constants =====

/// Hour the morning shift starts (inclusive, local time).
pub const MORNING_SHIFT_START_HOUR: u32 = 7;

/// Hour the morning shift ends (exclusive, local time). Everything outside
/// the window is the evening shift.
pub const MORNING_SHIFT_END_HOUR: u32 = 19;

/// Upper bound on a single line's quantity.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Hall recorded for orders that are not bound to a table.
pub const TAKEAWAY_HALL: &str = "takeaway";
