//! # Day and Sales Reports
//!
//! Pure aggregation and rendering for the end-of-day paperwork.
//!
//! ## Report Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  X report   mid-day snapshot of the OPEN business day (read-only)      │
//! │  Z report   the same aggregation, printed when the day is CLOSED       │
//! │  Sales      bill-by-bill listing per hall plus collection breakdown    │
//! │                                                                         │
//! │  All three are built from already-fetched rows; this module never      │
//! │  touches the database. Reports print at 32 columns.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Category sales sections list revenue net of VAT; everything else is
//! VAT-inclusive, matching what the guest actually paid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;
use crate::receipt::{center, left_right_w};
use crate::types::{Payment, PaymentMethod, Shift};

/// Width of report printouts in characters.
pub const REPORT_WIDTH: usize = 32;

// =============================================================================
// Builder Inputs
// =============================================================================

/// A settled order, as the day report needs to see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidOrder {
    pub order_id: i64,
    pub hall: String,
    pub shift: Shift,
    pub number_of_pax: i64,
    pub final_total: Money,
    pub vat: Money,
    pub discount: Money,
    pub grand_total: Money,
}

/// One settled item line attributed to its category group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSale {
    /// Root category name ("drinks", "food", ...).
    pub group: String,
    /// Leaf category name when the product sits under a subcategory.
    pub sub_group: Option<String>,
    pub quantity: i64,
    /// VAT-inclusive value of the line.
    pub gross: Money,
}

/// A cancelled-after-print line, for the loss section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanceledLine {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl CanceledLine {
    pub fn total_loss(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Aggregated Rows
// =============================================================================

/// Cash / card / grand collection totals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTotals {
    pub cash: Money,
    pub card: Money,
    pub total: Money,
}

impl CollectionTotals {
    /// Sums the cash and visa legs of every payment.
    pub fn from_payments(payments: &[Payment]) -> Self {
        let mut cash = Money::zero();
        let mut card = Money::zero();
        for payment in payments {
            cash += payment.cash_amount();
            card += payment.visa_amount();
        }
        CollectionTotals {
            cash,
            card,
            total: cash + card,
        }
    }
}

/// Revenue attributed to one hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HallSales {
    pub hall: String,
    pub orders: i64,
    pub total: Money,
}

/// Guest traffic and revenue for one shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPax {
    pub shift: Shift,
    pub orders: i64,
    pub pax: i64,
    pub total: Money,
}

impl ShiftPax {
    /// Average spend per guest; zero when no guests were seated.
    pub fn avg_per_pax(&self) -> Money {
        if self.pax == 0 {
            Money::zero()
        } else {
            Money::from_cents(self.total.cents() / self.pax)
        }
    }
}

/// Quantity and net revenue for one category group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSales {
    pub group: String,
    pub quantity: i64,
    /// Revenue net of VAT.
    pub net_total: Money,
}

/// One order that carried a discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountedOrder {
    pub order_id: i64,
    pub final_total: Money,
    pub discount: Money,
}

/// Loss row: a product cancelled after it was printed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanceledItem {
    pub product_name: String,
    pub quantity: i64,
    pub total_loss: Money,
}

// =============================================================================
// Day Report (X / Z)
// =============================================================================

/// Whether the report snapshots an open day or seals a closed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    X,
    Z,
}

impl ReportKind {
    fn title(&self) -> &'static str {
        match self {
            ReportKind::X => "X REPORT",
            ReportKind::Z => "Z REPORT",
        }
    }
}

/// The full end-of-day aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    pub kind: ReportKind,
    pub day_start: DateTime<Utc>,
    pub day_end: Option<DateTime<Utc>>,

    /// Σ final_total of settled orders, VAT-inclusive.
    pub total_sales: Money,
    pub total_discounts: Money,
    /// Σ grand_total: what actually hit the drawer and terminal.
    pub net_total: Money,
    pub vat_collected: Money,

    pub collection: CollectionTotals,
    pub revenue_by_hall: Vec<HallSales>,
    pub shift_pax: Vec<ShiftPax>,
    pub group_sales: Vec<GroupSales>,
    pub sub_group_sales: Vec<GroupSales>,
    pub discount_orders: Vec<DiscountedOrder>,
    pub canceled_items: Vec<CanceledItem>,
}

/// Aggregates one business day's rows into a printable report.
///
/// Inputs are whatever was tagged to the day: settled orders, their
/// payments, the per-category item sales and any post-print cancellations.
pub fn build_day_report(
    kind: ReportKind,
    day_start: DateTime<Utc>,
    day_end: Option<DateTime<Utc>>,
    orders: &[PaidOrder],
    payments: &[Payment],
    item_sales: &[ItemSale],
    canceled: &[CanceledLine],
) -> DayReport {
    let mut total_sales = Money::zero();
    let mut total_discounts = Money::zero();
    let mut net_total = Money::zero();
    let mut vat_collected = Money::zero();

    let mut halls: BTreeMap<String, HallSales> = BTreeMap::new();
    let mut shifts: BTreeMap<&'static str, ShiftPax> = BTreeMap::new();
    let mut discount_orders = Vec::new();

    for order in orders {
        total_sales += order.final_total;
        total_discounts += order.discount;
        net_total += order.grand_total;
        vat_collected += order.vat;

        let hall = halls.entry(order.hall.clone()).or_insert_with(|| HallSales {
            hall: order.hall.clone(),
            orders: 0,
            total: Money::zero(),
        });
        hall.orders += 1;
        hall.total += order.grand_total;

        let shift = shifts.entry(order.shift.as_str()).or_insert(ShiftPax {
            shift: order.shift,
            orders: 0,
            pax: 0,
            total: Money::zero(),
        });
        shift.orders += 1;
        shift.pax += order.number_of_pax;
        shift.total += order.grand_total;

        if order.discount.is_positive() {
            discount_orders.push(DiscountedOrder {
                order_id: order.order_id,
                final_total: order.final_total,
                discount: order.discount,
            });
        }
    }

    let mut groups: BTreeMap<String, GroupSales> = BTreeMap::new();
    let mut sub_groups: BTreeMap<String, GroupSales> = BTreeMap::new();
    for sale in item_sales {
        let net = sale.gross.net_of_vat();

        let group = groups.entry(sale.group.clone()).or_insert_with(|| GroupSales {
            group: sale.group.clone(),
            quantity: 0,
            net_total: Money::zero(),
        });
        group.quantity += sale.quantity;
        group.net_total += net;

        if let Some(sub) = &sale.sub_group {
            let row = sub_groups.entry(sub.clone()).or_insert_with(|| GroupSales {
                group: sub.clone(),
                quantity: 0,
                net_total: Money::zero(),
            });
            row.quantity += sale.quantity;
            row.net_total += net;
        }
    }

    let mut losses: BTreeMap<String, CanceledItem> = BTreeMap::new();
    for line in canceled {
        let row = losses
            .entry(line.product_name.clone())
            .or_insert_with(|| CanceledItem {
                product_name: line.product_name.clone(),
                quantity: 0,
                total_loss: Money::zero(),
            });
        row.quantity += line.quantity;
        row.total_loss += line.total_loss();
    }

    DayReport {
        kind,
        day_start,
        day_end,
        total_sales,
        total_discounts,
        net_total,
        vat_collected,
        collection: CollectionTotals::from_payments(payments),
        revenue_by_hall: halls.into_values().collect(),
        shift_pax: shifts.into_values().collect(),
        group_sales: groups.into_values().collect(),
        sub_group_sales: sub_groups.into_values().collect(),
        discount_orders,
        canceled_items: losses.into_values().collect(),
    }
}

impl DayReport {
    /// Renders the report as 32-column printable text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let rule = "=".repeat(REPORT_WIDTH);
        let thin = "-".repeat(REPORT_WIDTH);
        let w = REPORT_WIDTH;

        out.push(rule.clone());
        out.push(center(self.kind.title(), w));
        out.push(rule.clone());
        out.push(format!("From: {}", self.day_start.format("%d-%m-%Y %H:%M")));
        out.push(format!(
            "To:   {}",
            self.day_end
                .map(|t| t.format("%d-%m-%Y %H:%M").to_string())
                .unwrap_or_else(|| "open".to_string())
        ));
        out.push(rule.clone());

        out.push(center("SALES SUMMARY", w));
        out.push(thin.clone());
        out.push(left_right_w("Total Sales:", &self.total_sales.to_string(), w));
        out.push(left_right_w(
            "Discounts:",
            &format!("-{}", self.total_discounts),
            w,
        ));
        out.push(left_right_w("Net Total:", &self.net_total.to_string(), w));
        out.push(thin.clone());

        out.push(center("COLLECTION DETAILS", w));
        out.push(thin.clone());
        out.push(left_right_w("Cash:", &self.collection.cash.to_string(), w));
        out.push(left_right_w("Card:", &self.collection.card.to_string(), w));
        out.push(left_right_w("Total:", &self.collection.total.to_string(), w));
        out.push(thin.clone());

        out.push(center("TAX", w));
        out.push(thin.clone());
        out.push(left_right_w(
            "VAT (5%) Collected:",
            &self.vat_collected.to_string(),
            w,
        ));
        out.push(thin.clone());

        out.push(center("REVENUE CENTER WISE", w));
        out.push(thin.clone());
        for hall in &self.revenue_by_hall {
            out.push(left_right_w(
                &format!("{} ({})", hall.hall, hall.orders),
                &hall.total.to_string(),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("SHIFT WISE PAX", w));
        out.push(thin.clone());
        for shift in &self.shift_pax {
            out.push(left_right_w(
                &format!("{} ({} pax)", shift.shift.as_str(), shift.pax),
                &shift.total.to_string(),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("SHIFT AVG PER PAX", w));
        out.push(thin.clone());
        for shift in &self.shift_pax {
            out.push(left_right_w(
                shift.shift.as_str(),
                &shift.avg_per_pax().to_string(),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("GROUP WISE SALES", w));
        out.push(thin.clone());
        for group in &self.group_sales {
            out.push(left_right_w(
                &format!("{} x{}", group.group, group.quantity),
                &group.net_total.to_string(),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("SUB GROUP WISE SALES", w));
        out.push(thin.clone());
        for group in &self.sub_group_sales {
            out.push(left_right_w(
                &format!("{} x{}", group.group, group.quantity),
                &group.net_total.to_string(),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("DISCOUNTED ORDERS", w));
        out.push(thin.clone());
        for order in &self.discount_orders {
            out.push(left_right_w(
                &format!("Order {}", order.order_id),
                &format!("-{}", order.discount),
                w,
            ));
        }
        out.push(thin.clone());

        out.push(center("CANCELED ITEMS", w));
        out.push(thin);
        for item in &self.canceled_items {
            out.push(left_right_w(
                &format!("{} {{{} x}}", item.product_name, item.quantity),
                &item.total_loss.to_string(),
                w,
            ));
        }
        out.push(rule.clone());
        out.push(center("END OF REPORT", w));
        out.push(rule);

        out.join("\n")
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// One settled bill in the sales listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBillRow {
    pub bill_no: i64,
    pub payment_method: PaymentMethod,
    pub settled_at: DateTime<Utc>,
    pub total: Money,
}

/// Bills and subtotal for one hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HallBills {
    pub hall: String,
    pub rows: Vec<SalesBillRow>,
    pub total: Money,
}

/// Bill-by-bill sales listing for one business day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub day_start: DateTime<Utc>,
    pub halls: Vec<HallBills>,
    pub collection: CollectionTotals,
}

/// Groups settled bills by hall and totals the collection.
pub fn build_sales_report(
    day_start: DateTime<Utc>,
    bills: &[(String, SalesBillRow)],
    payments: &[Payment],
) -> SalesReport {
    let mut halls: BTreeMap<String, HallBills> = BTreeMap::new();

    for (hall, row) in bills {
        let entry = halls.entry(hall.clone()).or_insert_with(|| HallBills {
            hall: hall.clone(),
            rows: Vec::new(),
            total: Money::zero(),
        });
        entry.total += row.total;
        entry.rows.push(row.clone());
    }

    SalesReport {
        day_start,
        halls: halls.into_values().collect(),
        collection: CollectionTotals::from_payments(payments),
    }
}

impl SalesReport {
    /// Renders the listing as 32-column printable text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let rule = "=".repeat(REPORT_WIDTH);
        let thin = "-".repeat(REPORT_WIDTH);
        let w = REPORT_WIDTH;

        out.push(rule.clone());
        out.push(center("SALES REPORT", w));
        out.push(rule.clone());
        out.push(format!("Day: {}", self.day_start.format("%d-%m-%Y")));
        out.push(rule.clone());

        for hall in &self.halls {
            out.push(center(&hall.hall.to_uppercase(), w));
            out.push(format!("{:<7}{:<7}{:<10}{:>8}", "BillNo", "P.Type", "Time", "Total"));
            out.push(thin.clone());
            for row in &hall.rows {
                out.push(format!(
                    "{:<7}{:<7}{:<10}{:>8}",
                    row.bill_no,
                    row.payment_method.as_str(),
                    row.settled_at.format("%I:%M %p"),
                    row.total.to_string()
                ));
            }
            out.push(thin.clone());
            out.push(left_right_w("Hall Total:", &hall.total.to_string(), w));
            out.push(rule.clone());
        }

        out.push(center("COLLECTION DETAILS", w));
        out.push(thin);
        out.push(left_right_w("Cash:", &self.collection.cash.to_string(), w));
        out.push(left_right_w("Card:", &self.collection.card.to_string(), w));
        out.push(left_right_w("Total:", &self.collection.total.to_string(), w));
        out.push(rule.clone());
        out.push(center("END OF REPORT", w));
        out.push(rule);

        out.join("\n")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paid_order(id: i64, hall: &str, shift: Shift, pax: i64, total: i64, discount: i64) -> PaidOrder {
        let final_total = Money::from_cents(total);
        let discount = Money::from_cents(discount);
        PaidOrder {
            order_id: id,
            hall: hall.to_string(),
            shift,
            number_of_pax: pax,
            final_total,
            vat: final_total.vat_component(),
            discount,
            grand_total: (final_total - discount).floor_zero(),
        }
    }

    fn payment(id: i64, cash: i64, visa: i64) -> Payment {
        Payment {
            id,
            amount_cents: cash + visa,
            cash_amount_cents: cash,
            visa_amount_cents: visa,
            payment_method: if visa == 0 {
                PaymentMethod::Cash
            } else if cash == 0 {
                PaymentMethod::Card
            } else {
                PaymentMethod::Multi
            },
            business_day_id: Some("day-1".to_string()),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 7, 0, 0).unwrap()
    }

    #[test]
    fn test_day_report_sums() {
        let orders = vec![
            paid_order(1, "main hall", Shift::Morning, 2, 2000, 500),
            paid_order(2, "terrace", Shift::Evening, 4, 3000, 0),
        ];
        let payments = vec![payment(1, 1500, 0), payment(2, 1000, 2000)];

        let report = build_day_report(
            ReportKind::Z,
            start(),
            Some(Utc.with_ymd_and_hms(2026, 3, 15, 2, 0, 0).unwrap()),
            &orders,
            &payments,
            &[],
            &[],
        );

        assert_eq!(report.total_sales.cents(), 5000);
        assert_eq!(report.total_discounts.cents(), 500);
        assert_eq!(report.net_total.cents(), 4500);
        assert_eq!(report.collection.cash.cents(), 2500);
        assert_eq!(report.collection.card.cents(), 2000);
        assert_eq!(report.collection.total.cents(), 4500);
        assert_eq!(report.revenue_by_hall.len(), 2);
        assert_eq!(report.discount_orders.len(), 1);
        assert_eq!(report.discount_orders[0].order_id, 1);
    }

    #[test]
    fn test_shift_pax_and_average() {
        let orders = vec![
            paid_order(1, "main hall", Shift::Morning, 2, 2000, 0),
            paid_order(2, "main hall", Shift::Morning, 2, 2000, 0),
        ];
        let report =
            build_day_report(ReportKind::X, start(), None, &orders, &[], &[], &[]);

        assert_eq!(report.shift_pax.len(), 1);
        let morning = &report.shift_pax[0];
        assert_eq!(morning.pax, 4);
        assert_eq!(morning.total.cents(), 4000);
        assert_eq!(morning.avg_per_pax().cents(), 1000);
    }

    #[test]
    fn test_group_sales_are_net_of_vat() {
        let sales = vec![
            ItemSale {
                group: "drinks".to_string(),
                sub_group: Some("hot drinks".to_string()),
                quantity: 2,
                gross: Money::from_cents(2100),
            },
            ItemSale {
                group: "drinks".to_string(),
                sub_group: None,
                quantity: 1,
                gross: Money::from_cents(1050),
            },
        ];
        let report =
            build_day_report(ReportKind::Z, start(), None, &[], &[], &sales, &[]);

        assert_eq!(report.group_sales.len(), 1);
        let drinks = &report.group_sales[0];
        assert_eq!(drinks.quantity, 3);
        // 2100 → 2000 net, 1050 → 1000 net
        assert_eq!(drinks.net_total.cents(), 3000);

        assert_eq!(report.sub_group_sales.len(), 1);
        assert_eq!(report.sub_group_sales[0].quantity, 2);
    }

    #[test]
    fn test_canceled_lines_merge_per_product() {
        let canceled = vec![
            CanceledLine {
                product_name: "Latte".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(1500),
            },
            CanceledLine {
                product_name: "Latte".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(1500),
            },
        ];
        let report =
            build_day_report(ReportKind::Z, start(), None, &[], &[], &[], &canceled);

        assert_eq!(report.canceled_items.len(), 1);
        assert_eq!(report.canceled_items[0].quantity, 3);
        assert_eq!(report.canceled_items[0].total_loss.cents(), 4500);
    }

    #[test]
    fn test_day_report_render_sections() {
        let orders = vec![paid_order(1, "main hall", Shift::Morning, 2, 2000, 500)];
        let report =
            build_day_report(ReportKind::Z, start(), None, &orders, &[], &[], &[]);
        let text = report.render();

        assert!(text.contains("Z REPORT"));
        assert!(text.contains("SALES SUMMARY"));
        assert!(text.contains("COLLECTION DETAILS"));
        assert!(text.contains("REVENUE CENTER WISE"));
        assert!(text.contains("DISCOUNTED ORDERS"));
        assert!(text.contains("END OF REPORT"));
    }

    #[test]
    fn test_sales_report_groups_by_hall() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 13, 5, 0).unwrap();
        let bills = vec![
            (
                "main hall".to_string(),
                SalesBillRow {
                    bill_no: 1,
                    payment_method: PaymentMethod::Cash,
                    settled_at: at,
                    total: Money::from_cents(1500),
                },
            ),
            (
                "main hall".to_string(),
                SalesBillRow {
                    bill_no: 2,
                    payment_method: PaymentMethod::Card,
                    settled_at: at,
                    total: Money::from_cents(3000),
                },
            ),
            (
                "terrace".to_string(),
                SalesBillRow {
                    bill_no: 3,
                    payment_method: PaymentMethod::Cash,
                    settled_at: at,
                    total: Money::from_cents(2000),
                },
            ),
        ];
        let payments = vec![payment(1, 3500, 3000)];

        let report = build_sales_report(start(), &bills, &payments);
        assert_eq!(report.halls.len(), 2);
        assert_eq!(report.halls[0].total.cents(), 4500);

        let text = report.render();
        assert!(text.contains("SALES REPORT"));
        assert!(text.contains("MAIN HALL"));
        assert!(text.contains("01:05 PM"));
        assert!(text.contains("Hall Total:"));
    }
}
