//! # Billing Operations
//!
//! Discounts and the three settlement paths.
//!
//! ## Settlement Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout    one order, everything still unpaid on it                  │
//! │  split_bill  selected units of selected lines, one payer of the party  │
//! │  group_bill  several whole orders settled by one payment               │
//! │                                                                         │
//! │  All three: resolve the tender split, write the payment row, link the  │
//! │  order(s), stamp the open business day, free tables, commit, and only  │
//! │  then render/print the invoice. The payment id IS the invoice number.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::info;

use crate::error::{OpsError, OpsResult};
use crate::ops::orders::{load_live_order, load_open_order};
use crate::ops::{discount_value_tx, table_label_tx};
use crate::pool::Database;
use crate::print::Peripherals;
use cafe_core::receipt::{Bill, BillKind, BillLine};
use cafe_core::validation::{
    validate_discount_cents, validate_lines_not_empty, validate_quantity, validate_tender_cents,
};
use cafe_core::{
    line_sub_total, recompute_from_items, resolve_tender, CoreError, Money, Order, Payment,
    PaymentMethod, Station,
};

/// One line selection when splitting a bill.
#[derive(Debug, Clone)]
pub struct SplitSelection {
    pub item_id: String,
    pub quantity: i64,
}

// =============================================================================
// Discounts
// =============================================================================

/// Applies a discount to an open order.
///
/// A fresh discount row is written per application so the ledger keeps
/// every value ever granted. On an owner table the requested value is
/// ignored and the full final total is comped.
pub async fn apply_discount(
    db: &Database,
    order_id: i64,
    value_cents: i64,
    reason: Option<&str>,
    created_by: Option<&str>,
) -> OpsResult<Order> {
    validate_discount_cents(value_cents)?;

    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;

    // A discount can never exceed what is on the bill.
    let mut value_cents = value_cents.min(order.final_total_cents);
    if let Some(table_id) = &order.table_id {
        let table = db
            .tables()
            .get_tx(&mut tx, table_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Table", table_id))?;
        if table.is_owner {
            value_cents = order.final_total_cents;
        }
    }

    let discount = db
        .discounts()
        .create_tx(&mut tx, value_cents, reason, created_by)
        .await?;

    let items = db.orders().items_tx(&mut tx, order.id).await?;
    let totals = recompute_from_items(&items, Some(discount.value()));
    db.orders()
        .update_totals_tx(
            &mut tx,
            order.id,
            totals.final_total.cents(),
            totals.vat.cents(),
            totals.grand_total.cents(),
            Some(&discount.id),
        )
        .await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(order_id, value_cents, "Discount applied");

    db.orders()
        .get(order_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order_id))
}

/// Removes the discount from an open order.
///
/// The discount row stays in the ledger; only the order's link is cleared.
pub async fn remove_discount(db: &Database, order_id: i64) -> OpsResult<Order> {
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;
    if order.discount_id.is_none() {
        return Err(OpsError::invalid_state(format!(
            "order {} has no discount",
            order.id
        )));
    }

    let items = db.orders().items_tx(&mut tx, order.id).await?;
    let totals = recompute_from_items(&items, None);
    db.orders()
        .update_totals_tx(
            &mut tx,
            order.id,
            totals.final_total.cents(),
            totals.vat.cents(),
            totals.grand_total.cents(),
            None,
        )
        .await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(order_id, "Discount removed");

    db.orders()
        .get(order_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order_id))
}

// =============================================================================
// Checkout
// =============================================================================

/// Settles an open order in full.
///
/// Returns the payment and the rendered tax invoice. The invoice is also
/// archived (PDF) and dispatched to the cashier printer; both are
/// best-effort once the payment has committed.
pub async fn checkout(
    db: &Database,
    peripherals: &Peripherals,
    order_id: i64,
    method: PaymentMethod,
    cash_cents: i64,
    visa_cents: i64,
) -> OpsResult<(Payment, String)> {
    validate_tender_cents(cash_cents)?;
    validate_tender_cents(visa_cents)?;

    let now = Utc::now();
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;
    let items = db.orders().items_tx(&mut tx, order.id).await?;

    let unpaid: Vec<_> = items.iter().filter(|i| i.remaining_quantity > 0).collect();
    if unpaid.is_empty() {
        return Err(CoreError::NothingToSettle(format!(
            "order {} has no unpaid items",
            order.id
        ))
        .into());
    }

    let due = order.grand_total();
    let (cash, visa) = resolve_tender(
        method,
        due,
        Money::from_cents(cash_cents),
        Money::from_cents(visa_cents),
    )?;

    let day = db
        .business_days()
        .current_open_tx(&mut tx)
        .await?
        .ok_or_else(|| OpsError::invalid_state("no business day is open"))?;

    let payment = db
        .payments()
        .insert_tx(
            &mut tx,
            due.cents(),
            cash.cents(),
            visa.cents(),
            method,
            Some(day.id.as_str()),
            now,
        )
        .await?;
    db.payments().link_order_tx(&mut tx, payment.id, order.id).await?;

    // Capture invoice lines before the remainders are zeroed.
    let mut bill_lines = Vec::with_capacity(unpaid.len());
    for item in &unpaid {
        let product = db
            .catalog()
            .get_product_tx(&mut tx, &item.product_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Product", &item.product_id))?;
        let unit_price = product.price();
        bill_lines.push(BillLine {
            name: product.name,
            name_ar: product.name_ar,
            quantity: item.remaining_quantity,
            unit_price,
        });
    }

    for item in &items {
        if item.remaining_quantity == 0 {
            continue;
        }
        let mut settled = (*item).clone();
        settled.remaining_quantity = 0;
        settled.is_paid = true;
        settled.sub_total_cents = 0;
        db.orders().update_item_tx(&mut tx, &settled).await?;
    }

    db.orders()
        .mark_paid_tx(&mut tx, order.id, Some(day.id.as_str()), now)
        .await?;

    if let Some(table_id) = &order.table_id {
        db.tables().set_occupied_tx(&mut tx, table_id, false, 0).await?;
    }

    let discount = discount_value_tx(db, &mut tx, &order).await?;
    let table_label = table_label_tx(db, &mut tx, &order).await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(
        order_id,
        invoice = payment.id,
        amount = due.cents(),
        method = method.as_str(),
        "Order settled"
    );

    let bill = Bill {
        kind: BillKind::Checkout,
        invoice_no: payment.id,
        order_label: order.id.to_string(),
        table_label,
        number_of_pax: order.number_of_pax,
        bill_date: now,
        check_in: order.created_at,
        check_out: Some(now),
        shift: Some(order.shift),
        hall: Some(order.hall.clone()),
        lines: bill_lines,
        sub_total: order.final_total(),
        vat: order.vat(),
        discount: Some(discount),
        grand_total: due,
        payment_method: method,
    };
    let document = bill.render();

    peripherals.archive_invoice(&payment.id.to_string(), &document);
    peripherals.dispatch(Station::Cashier, &document);

    Ok((payment, document))
}

// =============================================================================
// Split Bill
// =============================================================================

/// Settles selected units of selected lines for one payer of the party.
///
/// Fully consumed lines are stamped with the payer index; when the last
/// unpaid unit goes, the whole order settles and the table frees.
pub async fn split_bill(
    db: &Database,
    peripherals: &Peripherals,
    order_id: i64,
    selections: &[SplitSelection],
    paid_by: i64,
    method: PaymentMethod,
    cash_cents: i64,
    visa_cents: i64,
) -> OpsResult<(Payment, String)> {
    validate_lines_not_empty(selections)?;
    for selection in selections {
        validate_quantity(selection.quantity)?;
    }
    validate_tender_cents(cash_cents)?;
    validate_tender_cents(visa_cents)?;

    let now = Utc::now();
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;

    let mut due = Money::zero();
    let mut bill_lines = Vec::with_capacity(selections.len());

    for selection in selections {
        let mut item = db
            .orders()
            .get_item_tx(&mut tx, &selection.item_id)
            .await?
            .filter(|i| i.order_id == order.id)
            .ok_or_else(|| OpsError::not_found("Order item", &selection.item_id))?;

        let product = db
            .catalog()
            .get_product_tx(&mut tx, &item.product_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Product", &item.product_id))?;

        if selection.quantity > item.remaining_quantity {
            return Err(CoreError::QuantityExceedsRemaining {
                product_id: item.product_id.clone(),
                remaining: item.remaining_quantity,
                requested: selection.quantity,
            }
            .into());
        }

        due += product.price() * selection.quantity;
        bill_lines.push(BillLine {
            name: product.name.clone(),
            name_ar: product.name_ar.clone(),
            quantity: selection.quantity,
            unit_price: product.price(),
        });

        item.remaining_quantity -= selection.quantity;
        if item.remaining_quantity == 0 {
            item.is_paid = true;
            item.paid_by = Some(paid_by);
        }
        item.sub_total_cents = line_sub_total(item.remaining_quantity, product.price()).cents();
        db.orders().update_item_tx(&mut tx, &item).await?;
    }

    if due.is_zero() {
        return Err(CoreError::NothingToSettle(format!(
            "selection on order {} amounts to zero",
            order.id
        ))
        .into());
    }

    let (cash, visa) = resolve_tender(
        method,
        due,
        Money::from_cents(cash_cents),
        Money::from_cents(visa_cents),
    )?;

    let day = db
        .business_days()
        .current_open_tx(&mut tx)
        .await?
        .ok_or_else(|| OpsError::invalid_state("no business day is open"))?;

    let payment = db
        .payments()
        .insert_tx(
            &mut tx,
            due.cents(),
            cash.cents(),
            visa.cents(),
            method,
            Some(day.id.as_str()),
            now,
        )
        .await?;
    db.payments().link_order_tx(&mut tx, payment.id, order.id).await?;

    let items = db.orders().items_tx(&mut tx, order.id).await?;
    let discount = discount_value_tx(db, &mut tx, &order).await?;
    let discount_opt = if discount.is_zero() { None } else { Some(discount) };
    let totals = recompute_from_items(&items, discount_opt);
    db.orders()
        .update_totals_tx(
            &mut tx,
            order.id,
            totals.final_total.cents(),
            totals.vat.cents(),
            totals.grand_total.cents(),
            order.discount_id.as_deref(),
        )
        .await?;

    let all_settled = items.iter().all(|i| i.remaining_quantity == 0);
    if all_settled {
        db.orders()
            .mark_paid_tx(&mut tx, order.id, Some(day.id.as_str()), now)
            .await?;
        if let Some(table_id) = &order.table_id {
            db.tables().set_occupied_tx(&mut tx, table_id, false, 0).await?;
        }
    }

    let table_label = table_label_tx(db, &mut tx, &order).await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(
        order_id,
        invoice = payment.id,
        amount = due.cents(),
        paid_by,
        settled = all_settled,
        "Split bill settled"
    );

    let bill = Bill {
        kind: BillKind::Split,
        invoice_no: payment.id,
        order_label: order.id.to_string(),
        table_label,
        number_of_pax: order.number_of_pax,
        bill_date: now,
        check_in: order.created_at,
        check_out: all_settled.then_some(now),
        shift: Some(order.shift),
        hall: Some(order.hall.clone()),
        lines: bill_lines,
        sub_total: due,
        vat: due.vat_component(),
        discount: None,
        grand_total: due,
        payment_method: method,
    };
    let document = bill.render();

    peripherals.archive_invoice(&payment.id.to_string(), &document);
    peripherals.dispatch(Station::Cashier, &document);

    Ok((payment, document))
}

// =============================================================================
// Group Bill
// =============================================================================

/// Settles several whole orders with one payment.
///
/// Identical product lines across the orders merge on the invoice, and the
/// combined discount is subtracted once. Every order settles, every table
/// frees.
pub async fn group_bill(
    db: &Database,
    peripherals: &Peripherals,
    order_ids: &[i64],
    method: PaymentMethod,
    cash_cents: i64,
    visa_cents: i64,
) -> OpsResult<(Payment, String)> {
    validate_lines_not_empty(order_ids)?;
    validate_tender_cents(cash_cents)?;
    validate_tender_cents(visa_cents)?;

    let now = Utc::now();
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let mut orders = Vec::with_capacity(order_ids.len());
    for &order_id in order_ids {
        let order = load_live_order(db, &mut tx, order_id).await?;
        if order.is_paid {
            return Err(CoreError::AlreadyPaid(order.id).into());
        }
        orders.push(order);
    }

    let mut due = Money::zero();
    let mut sub_total = Money::zero();
    let mut vat = Money::zero();
    let mut combined_discount = Money::zero();
    let mut total_pax = 0;
    let mut bill_lines: Vec<BillLine> = Vec::new();
    let mut table_numbers: Vec<String> = Vec::new();

    for order in &orders {
        due += order.grand_total();
        sub_total += order.final_total();
        vat += order.vat();
        combined_discount += discount_value_tx(db, &mut tx, order).await?;
        total_pax += order.number_of_pax;

        let label = table_label_tx(db, &mut tx, order).await?;
        if label != "N/A" && !table_numbers.contains(&label) {
            table_numbers.push(label);
        }

        let items = db.orders().items_tx(&mut tx, order.id).await?;
        for item in items.iter().filter(|i| i.remaining_quantity > 0) {
            let product = db
                .catalog()
                .get_product_tx(&mut tx, &item.product_id)
                .await?
                .ok_or_else(|| OpsError::not_found("Product", &item.product_id))?;

            // Identical products merge into one invoice line.
            let unit_price = product.price();
            match bill_lines.iter_mut().find(|l| l.name == product.name) {
                Some(line) => line.quantity += item.remaining_quantity,
                None => bill_lines.push(BillLine {
                    name: product.name,
                    name_ar: product.name_ar,
                    quantity: item.remaining_quantity,
                    unit_price,
                }),
            }

            let mut settled = item.clone();
            settled.remaining_quantity = 0;
            settled.is_paid = true;
            settled.sub_total_cents = 0;
            db.orders().update_item_tx(&mut tx, &settled).await?;
        }
    }

    if due.is_zero() {
        return Err(CoreError::NothingToSettle(
            "no unpaid amount across the selected orders".to_string(),
        )
        .into());
    }

    let (cash, visa_leg) = resolve_tender(
        method,
        due,
        Money::from_cents(cash_cents),
        Money::from_cents(visa_cents),
    )?;

    let day = db
        .business_days()
        .current_open_tx(&mut tx)
        .await?
        .ok_or_else(|| OpsError::invalid_state("no business day is open"))?;

    let payment = db
        .payments()
        .insert_tx(
            &mut tx,
            due.cents(),
            cash.cents(),
            visa_leg.cents(),
            method,
            Some(day.id.as_str()),
            now,
        )
        .await?;

    for order in &orders {
        db.payments().link_order_tx(&mut tx, payment.id, order.id).await?;
        db.orders()
            .mark_paid_tx(&mut tx, order.id, Some(day.id.as_str()), now)
            .await?;
        if let Some(table_id) = &order.table_id {
            db.tables().set_occupied_tx(&mut tx, table_id, false, 0).await?;
        }
    }

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(
        orders = ?order_ids,
        invoice = payment.id,
        amount = due.cents(),
        method = method.as_str(),
        "Group bill settled"
    );

    let order_label = format!(
        "({})",
        orders
            .iter()
            .map(|o| o.id.to_string())
            .collect::<Vec<_>>()
            .join("-")
    );
    let table_label = if table_numbers.is_empty() {
        "N/A".to_string()
    } else {
        format!("({})", table_numbers.join("-"))
    };
    let check_in = orders
        .iter()
        .map(|o| o.created_at)
        .min()
        .unwrap_or(now);

    let bill = Bill {
        kind: BillKind::Group,
        invoice_no: payment.id,
        order_label,
        table_label,
        number_of_pax: total_pax,
        bill_date: now,
        check_in,
        check_out: Some(now),
        shift: None,
        hall: None,
        lines: bill_lines,
        sub_total,
        vat,
        discount: if combined_discount.is_zero() {
            None
        } else {
            Some(combined_discount)
        },
        grand_total: due,
        payment_method: method,
    };
    let document = bill.render();

    peripherals.archive_invoice(&payment.id.to_string(), &document);
    peripherals.dispatch(Station::Cashier, &document);

    Ok((payment, document))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::orders::{create_order, NewOrderLine};
    use crate::ops::testing::{fixture, Fixture};

    fn line(product_id: &str, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: product_id.to_string(),
            quantity,
            notes: None,
        }
    }

    /// Fixture with a business day already open for the settlement paths.
    async fn setup() -> Fixture {
        let f = fixture().await;
        crate::ops::day::open_business_day(&f.db).await.unwrap();
        f
    }

    async fn open_order(f: &Fixture, table_id: &str, lines: &[NewOrderLine]) -> Order {
        create_order(&f.db, &f.peripherals, Some(table_id), 2, lines, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_full_flow() {
        let f = setup().await;

        // 2 x 10.00 coffee
        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 2)]).await;
        assert_eq!(order.final_total_cents, 2000);
        assert_eq!(order.vat_cents, 95);

        // 5.00 off
        let order = apply_discount(&f.db, order.id, 500, Some("regular"), None)
            .await
            .unwrap();
        assert_eq!(order.grand_total_cents, 1500);

        let (payment, invoice) =
            checkout(&f.db, &f.peripherals, order.id, PaymentMethod::Cash, 0, 0)
                .await
                .unwrap();

        assert_eq!(payment.amount_cents, 1500);
        assert_eq!(payment.cash_amount_cents, 1500);
        assert_eq!(payment.visa_amount_cents, 0);
        assert!(invoice.contains("TAX INVOICE"));
        assert!(invoice.contains("Cappuccino"));

        let settled = f.db.orders().get(order.id).await.unwrap().unwrap();
        assert!(settled.is_paid);
        assert!(settled.check_out_time.is_some());
        // Settled totals stay frozen for the day report
        assert_eq!(settled.grand_total_cents, 1500);

        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(!table.is_occupied);

        let items = f.db.orders().items(order.id).await.unwrap();
        assert!(items.iter().all(|i| i.is_paid && i.remaining_quantity == 0));
    }

    #[tokio::test]
    async fn test_checkout_twice_rejected() {
        let f = setup().await;

        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 1)]).await;
        checkout(&f.db, &f.peripherals, order.id, PaymentMethod::Card, 0, 0)
            .await
            .unwrap();

        let result = checkout(&f.db, &f.peripherals, order.id, PaymentMethod::Card, 0, 0).await;
        assert!(matches!(
            result,
            Err(OpsError::Core(CoreError::AlreadyPaid(_)))
        ));
    }

    #[tokio::test]
    async fn test_multi_tender_must_sum_to_due() {
        let f = setup().await;

        // 2 x 10.00, due 20.00
        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 2)]).await;

        let result = checkout(
            &f.db,
            &f.peripherals,
            order.id,
            PaymentMethod::Multi,
            500,
            700,
        )
        .await;
        assert!(matches!(
            result,
            Err(OpsError::Core(CoreError::TenderMismatch { .. }))
        ));

        let (payment, _) = checkout(
            &f.db,
            &f.peripherals,
            order.id,
            PaymentMethod::Multi,
            1500,
            500,
        )
        .await
        .unwrap();
        assert_eq!(payment.cash_amount_cents, 1500);
        assert_eq!(payment.visa_amount_cents, 500);
    }

    #[tokio::test]
    async fn test_split_bill_settles_order_at_last_unit() {
        let f = setup().await;

        // 3 x 10.00 coffee
        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 3)]).await;
        let items = f.db.orders().items(order.id).await.unwrap();

        let selection = vec![SplitSelection {
            item_id: items[0].id.clone(),
            quantity: 2,
        }];
        let (payment, invoice) = split_bill(
            &f.db,
            &f.peripherals,
            order.id,
            &selection,
            1,
            PaymentMethod::Cash,
            0,
            0,
        )
        .await
        .unwrap();

        assert_eq!(payment.amount_cents, 2000);
        assert!(invoice.contains("Split Bill"));
        let order_after = f.db.orders().get(order.id).await.unwrap().unwrap();
        assert!(!order_after.is_paid);
        assert_eq!(order_after.final_total_cents, 1000);

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items[0].remaining_quantity, 1);
        assert_eq!(items[0].paid_by, None);

        // Last unit settles the whole order and frees the table
        let selection = vec![SplitSelection {
            item_id: items[0].id.clone(),
            quantity: 1,
        }];
        let (payment, _) = split_bill(
            &f.db,
            &f.peripherals,
            order.id,
            &selection,
            2,
            PaymentMethod::Card,
            0,
            0,
        )
        .await
        .unwrap();
        assert_eq!(payment.amount_cents, 1000);

        let order_after = f.db.orders().get(order.id).await.unwrap().unwrap();
        assert!(order_after.is_paid);
        assert_eq!(order_after.final_total_cents, 0);

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items[0].paid_by, Some(2));

        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(!table.is_occupied);
    }

    #[tokio::test]
    async fn test_split_more_than_remaining_rejected() {
        let f = setup().await;

        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 1)]).await;
        let items = f.db.orders().items(order.id).await.unwrap();

        let result = split_bill(
            &f.db,
            &f.peripherals,
            order.id,
            &[SplitSelection {
                item_id: items[0].id.clone(),
                quantity: 4,
            }],
            1,
            PaymentMethod::Cash,
            0,
            0,
        )
        .await;
        assert!(matches!(
            result,
            Err(OpsError::Core(CoreError::QuantityExceedsRemaining { .. }))
        ));
    }

    #[tokio::test]
    async fn test_group_bill_settles_every_order() {
        let f = setup().await;
        let second_table = f.db.tables().create(6, "main hall", false).await.unwrap();

        let first = open_order(&f, &f.table.id, &[line(&f.coffee.id, 2)]).await;
        let second = open_order(&f, &second_table.id, &[line(&f.coffee.id, 1)]).await;
        let second = crate::ops::orders::add_items(
            &f.db,
            &f.peripherals,
            second.id,
            &[line(&f.sandwich.id, 1)],
        )
        .await
        .unwrap();

        let (payment, invoice) = group_bill(
            &f.db,
            &f.peripherals,
            &[first.id, second.id],
            PaymentMethod::Cash,
            0,
            0,
        )
        .await
        .unwrap();

        assert_eq!(
            payment.amount_cents,
            first.grand_total_cents + second.grand_total_cents
        );
        assert!(invoice.contains("Group Bill"));

        let linked = f.db.payments().order_ids(payment.id).await.unwrap();
        assert_eq!(linked.len(), 2);

        for id in [first.id, second.id] {
            let order = f.db.orders().get(id).await.unwrap().unwrap();
            assert!(order.is_paid);
        }
        for table_id in [&f.table.id, &second_table.id] {
            let table = f.db.tables().get_by_id(table_id).await.unwrap().unwrap();
            assert!(!table.is_occupied);
        }
    }

    #[tokio::test]
    async fn test_owner_table_discount_comps_full_total() {
        let f = setup().await;

        let order = open_order(&f, &f.owner_table.id, &[line(&f.sandwich.id, 1)]).await;
        assert_eq!(order.final_total_cents, 2500);

        // Requested value is ignored on the owner table
        let order = apply_discount(&f.db, order.id, 100, None, Some("manager"))
            .await
            .unwrap();

        let discount = f
            .db
            .discounts()
            .get(order.discount_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(discount.value_cents, 2500);
        assert_eq!(order.grand_total_cents, 0);
    }

    #[tokio::test]
    async fn test_remove_discount_clears_link() {
        let f = setup().await;

        let order = open_order(&f, &f.table.id, &[line(&f.coffee.id, 2)]).await;
        let order = apply_discount(&f.db, order.id, 500, None, None).await.unwrap();
        assert!(order.discount_id.is_some());

        let order = remove_discount(&f.db, order.id).await.unwrap();
        assert!(order.discount_id.is_none());
        assert_eq!(order.grand_total_cents, 2000);

        let result = remove_discount(&f.db, order.id).await;
        assert!(matches!(result, Err(OpsError::InvalidState(_))));
    }
}
