//! # Receipt Rendering
//!
//! Pure text renderers for everything the thermal printers produce:
//! tax invoices (checkout, split, group), kitchen tickets and
//! cancellation notices.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tax invoices are 45 columns wide (80mm cashier printer):               │
//! │                                                                         │
//! │  =============================================                          │
//! │          TAX INVOICE                                                    │
//! │  =============================================                          │
//! │  Invoice No: 17          Table: 5                                       │
//! │  Item - UOM            Qty    Price      Value                          │
//! │  ---------------------------------------------                          │
//! │  Espresso                2    10.00      20.00                          │
//! │  اسبريسو                                                                │
//! │  =============================================                          │
//! │  SubTotal:       AED 20.00                                              │
//! │  ...                                                                    │
//! │                                                                         │
//! │  Kitchen tickets are 32 columns (compact station printers).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions here are pure string builders; dispatching the text to a
//! printer or a PDF is the caller's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::routing::Station;
use crate::types::{PaymentMethod, Shift};

/// Width of the cashier printer in characters.
pub const BILL_WIDTH: usize = 45;

/// Width of the station printers in characters.
pub const TICKET_WIDTH: usize = 32;

/// Item name column width on invoices.
const NAME_COL: usize = 20;

// ===== Shop identity printed on every invoice =====

const SHOP_LINES: &[&str] = &[
    "  Coffee Shop Co. L.L.C  ",
    "     Shop 1, Block A     ",
    "     Abraj Al Mamzar     ",
    "       Dubai, UAE        ",
    "Ct: 0547606099 / 0559803445",
    "TRN: 104340270800001",
];

// =============================================================================
// Bill
// =============================================================================

/// Which settlement produced the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    /// Full order checkout.
    Checkout,
    /// Partial settlement of selected lines.
    Split,
    /// One payment spanning several orders.
    Group,
}

impl BillKind {
    fn title(&self) -> &'static str {
        match self {
            BillKind::Checkout => "      Checkout Bill      ",
            BillKind::Split => "      Split Bill      ",
            BillKind::Group => "         Group Bill         ",
        }
    }
}

/// One printed invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub name: String,
    pub name_ar: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
}

impl BillLine {
    /// Line value: quantity × unit price.
    pub fn value(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Everything needed to render a tax invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub kind: BillKind,
    /// Payment id, printed as the invoice number.
    pub invoice_no: i64,
    /// "12" for one order, "(12-13)" for a group.
    pub order_label: String,
    /// "5", "(5-6)" or "N/A".
    pub table_label: String,
    pub number_of_pax: i64,
    pub bill_date: DateTime<Utc>,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    /// Omitted on group bills.
    pub shift: Option<Shift>,
    /// Omitted on group bills.
    pub hall: Option<String>,
    pub lines: Vec<BillLine>,
    pub sub_total: Money,
    pub vat: Money,
    /// Printed on checkout and group bills; split bills have none.
    pub discount: Option<Money>,
    pub grand_total: Money,
    pub payment_method: PaymentMethod,
}

impl Bill {
    /// Renders the invoice as printable text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let rule = "=".repeat(BILL_WIDTH);
        let thin = "-".repeat(BILL_WIDTH);

        out.push(rule.clone());
        out.push("        TAX INVOICE        ".to_string());
        out.push(rule.clone());
        for line in SHOP_LINES {
            out.push((*line).to_string());
        }
        out.push(rule.clone());
        out.push(self.kind.title().to_string());
        out.push(rule.clone());

        out.push(left_right(
            &format!("Invoice No: {}", self.invoice_no),
            &format!("Table: {}", self.table_label),
        ));
        out.push(left_right(
            &format!("Order No: {}", self.order_label),
            &format!("No Of Pax: {}", self.number_of_pax),
        ));
        out.push(left_right(
            &format!("Bill Date: {}", self.bill_date.format("%d-%m-%Y")),
            &format!(
                "Check Out: {}",
                self.check_out
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "N/A".to_string())
            ),
        ));
        out.push(format!("Check In: {}", self.check_in.format("%H:%M:%S")));
        if self.shift.is_some() || self.hall.is_some() {
            out.push(left_right(
                &format!(
                    "Shift: {}",
                    self.shift.map(|s| s.as_str()).unwrap_or("N/A")
                ),
                &format!("Hall: {}", self.hall.as_deref().unwrap_or("N/A")),
            ));
        }
        out.push(rule.clone());

        out.push(format!(
            "{:<20} {:>6} {:>8} {:>10}",
            "Item - UOM", "Qty", "Price", "Value"
        ));
        out.push(thin);

        for line in &self.lines {
            let wrapped = wrap(&line.name, NAME_COL);
            out.push(format!(
                "{:<20} {:>6} {:<8} {:<10}",
                wrapped[0],
                line.quantity,
                line.unit_price.to_string(),
                line.value().to_string()
            ));
            for cont in &wrapped[1..] {
                out.push(format!("{:<20}", cont));
            }
            if let Some(name_ar) = &line.name_ar {
                for ar in wrap(name_ar, NAME_COL) {
                    out.push(format!("{:<20}", ar));
                }
            }
        }
        out.push(rule.clone());

        out.push(String::new());
        out.push(format!("SubTotal:       AED {}", self.sub_total));
        match self.kind {
            BillKind::Checkout => {
                out.push(format!(
                    "Discount:       AED -{}",
                    self.discount.unwrap_or_default()
                ));
                out.push(format!("VAT (5%):       AED {}", self.vat));
            }
            BillKind::Split => {
                out.push(format!("VAT (5%):       AED {}", self.vat));
            }
            BillKind::Group => {
                out.push(format!("VAT (5%):       AED {}", self.vat));
                out.push(format!(
                    "Discount:       AED -{}",
                    self.discount.unwrap_or_default()
                ));
            }
        }
        out.push(rule.clone());
        out.push(format!("Grand Total:    AED {}", self.grand_total));
        out.push(rule.clone());

        out.push("Collection Details:".to_string());
        out.push(String::new());
        out.push(format!("Payment Method: {}", self.payment_method.as_str()));
        out.push(rule.clone());

        out.push(String::new());
        out.push("    Thanks for your visit!    ".to_string());
        out.push("        Visit Again!         ".to_string());
        out.push(rule);

        out.join("\n")
    }
}

// =============================================================================
// Kitchen Tickets
// =============================================================================

/// One line on a kitchen ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLine {
    pub name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// A new-items ticket for one station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    pub station: Station,
    pub kot_number: i64,
    pub order_id: i64,
    pub table_label: String,
    pub time: DateTime<Utc>,
    pub lines: Vec<TicketLine>,
}

impl KitchenTicket {
    /// Renders the ticket as printable text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let rule = "=".repeat(TICKET_WIDTH);
        let thin = "-".repeat(TICKET_WIDTH);

        out.push(rule.clone());
        out.push(center(self.station.ticket_heading(), TICKET_WIDTH));
        out.push(rule.clone());
        out.push(left_right_w(
            &format!("KOT No: {}", self.kot_number),
            &format!("Order No: {}", self.order_id),
            TICKET_WIDTH,
        ));
        out.push(left_right_w(
            &format!("Table: {}", self.table_label),
            &format!("Time: {}", self.time.format("%H:%M")),
            TICKET_WIDTH,
        ));
        out.push(thin.clone());
        for line in &self.lines {
            out.push(left_right_w(
                &line.name,
                &format!("{} Nos", line.quantity),
                TICKET_WIDTH,
            ));
            if let Some(notes) = &line.notes {
                out.push(format!("  note: {}", notes));
            }
        }
        out.push(thin);

        out.join("\n")
    }
}

/// A cancellation notice for one station.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationTicket {
    pub station: Station,
    pub order_id: i64,
    pub table_label: String,
    pub time: DateTime<Utc>,
    pub lines: Vec<TicketLine>,
    pub reason: Option<String>,
}

impl CancellationTicket {
    /// Renders the notice as printable text.
    pub fn render(&self) -> String {
        let mut out = Vec::new();
        let rule = "=".repeat(TICKET_WIDTH);
        let thin = "-".repeat(TICKET_WIDTH);

        out.push(rule.clone());
        out.push(center("*** CANCELLED ***", TICKET_WIDTH));
        out.push(center(self.station.ticket_heading(), TICKET_WIDTH));
        out.push(rule.clone());
        out.push(left_right_w(
            &format!("Order No: {}", self.order_id),
            &format!("Table: {}", self.table_label),
            TICKET_WIDTH,
        ));
        out.push(format!("Time: {}", self.time.format("%H:%M")));
        out.push(thin.clone());
        for line in &self.lines {
            out.push(left_right_w(
                &line.name,
                &format!("{} Nos", line.quantity),
                TICKET_WIDTH,
            ));
        }
        if let Some(reason) = &self.reason {
            out.push(format!("Reason: {}", reason));
        }
        out.push(thin);

        out.join("\n")
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

/// Left and right text on one 45-column line.
fn left_right(left: &str, right: &str) -> String {
    left_right_w(left, right, BILL_WIDTH)
}

pub(crate) fn left_right_w(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let pad = width.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(pad), right)
}

pub(crate) fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Word-wraps a name into lines of at most `width` characters.
/// Always returns at least one line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                lines.push(current.clone());
                current.clear();
            }
            // A single word longer than the column is hard-split.
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                lines.push(chars[..width].iter().collect());
                chars = chars[width..].to_vec();
            }
            current = chars.into_iter().collect();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bill() -> Bill {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 12, 30, 0).unwrap();
        Bill {
            kind: BillKind::Checkout,
            invoice_no: 17,
            order_label: "12".to_string(),
            table_label: "5".to_string(),
            number_of_pax: 2,
            bill_date: at,
            check_in: at,
            check_out: Some(Utc.with_ymd_and_hms(2026, 3, 14, 13, 45, 0).unwrap()),
            shift: Some(Shift::Morning),
            hall: Some("main hall".to_string()),
            lines: vec![BillLine {
                name: "Espresso".to_string(),
                name_ar: Some("اسبريسو".to_string()),
                quantity: 2,
                unit_price: Money::from_cents(1000),
            }],
            sub_total: Money::from_cents(2000),
            vat: Money::from_cents(95),
            discount: Some(Money::from_cents(500)),
            grand_total: Money::from_cents(1500),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn test_checkout_bill_contains_totals_and_discount() {
        let text = sample_bill().render();

        assert!(text.contains("TAX INVOICE"));
        assert!(text.contains("Checkout Bill"));
        assert!(text.contains("Invoice No: 17"));
        assert!(text.contains("SubTotal:       AED 20.00"));
        assert!(text.contains("Discount:       AED -5.00"));
        assert!(text.contains("VAT (5%):       AED 0.95"));
        assert!(text.contains("Grand Total:    AED 15.00"));
        assert!(text.contains("Payment Method: cash"));
    }

    #[test]
    fn test_arabic_name_printed_under_english() {
        let text = sample_bill().render();
        let english_pos = text.find("Espresso").unwrap();
        let arabic_pos = text.find("اسبريسو").unwrap();
        assert!(arabic_pos > english_pos);
    }

    #[test]
    fn test_split_bill_has_no_discount_line() {
        let mut bill = sample_bill();
        bill.kind = BillKind::Split;
        bill.discount = None;
        let text = bill.render();

        assert!(text.contains("Split Bill"));
        assert!(!text.contains("Discount:"));
    }

    #[test]
    fn test_group_bill_title_and_labels() {
        let mut bill = sample_bill();
        bill.kind = BillKind::Group;
        bill.order_label = "(12-13)".to_string();
        bill.table_label = "(5-6)".to_string();
        bill.shift = None;
        bill.hall = None;
        let text = bill.render();

        assert!(text.contains("Group Bill"));
        assert!(text.contains("Order No: (12-13)"));
        assert!(text.contains("Table: (5-6)"));
        assert!(!text.contains("Shift:"));
    }

    #[test]
    fn test_kitchen_ticket_layout() {
        let ticket = KitchenTicket {
            station: Station::Kitchen,
            kot_number: 44,
            order_id: 12,
            table_label: "5".to_string(),
            time: Utc.with_ymd_and_hms(2026, 3, 14, 12, 31, 0).unwrap(),
            lines: vec![TicketLine {
                name: "Club Sandwich".to_string(),
                quantity: 2,
                notes: Some("no mayo".to_string()),
            }],
        };
        let text = ticket.render();

        assert!(text.contains("KITCHEN ORDER"));
        assert!(text.contains("KOT No: 44"));
        assert!(text.contains("Club Sandwich"));
        assert!(text.contains("2 Nos"));
        assert!(text.contains("note: no mayo"));
    }

    #[test]
    fn test_cancellation_ticket_carries_reason() {
        let ticket = CancellationTicket {
            station: Station::Barista,
            order_id: 12,
            table_label: "5".to_string(),
            time: Utc.with_ymd_and_hms(2026, 3, 14, 12, 40, 0).unwrap(),
            lines: vec![TicketLine {
                name: "Latte".to_string(),
                quantity: 1,
                notes: None,
            }],
            reason: Some("guest changed mind".to_string()),
        };
        let text = ticket.render();

        assert!(text.contains("*** CANCELLED ***"));
        assert!(text.contains("BARISTA ORDER"));
        assert!(text.contains("Reason: guest changed mind"));
    }

    #[test]
    fn test_wrap_long_names() {
        let lines = wrap("Triple Chocolate Fudge Brownie Sundae", 20);
        assert!(lines.len() >= 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }
}
