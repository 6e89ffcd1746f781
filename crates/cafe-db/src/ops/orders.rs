//! # Order Operations
//!
//! Order lifecycle: creation, item mutation, kitchen ticket dispatch and
//! soft deletion.
//!
//! ## Kitchen Printing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every item tracks quantity_to_print. create_order and add_items       │
//! │  queue the new units; print_pending drains the queue:                  │
//! │                                                                         │
//! │  order ──► items with quantity_to_print > 0                            │
//! │              │ group by station (category routing)                      │
//! │              ▼                                                           │
//! │  mark printed in ONE update, commit, THEN dispatch tickets             │
//! │                                                                         │
//! │  Re-running print_pending after everything printed is a no-op, so a    │
//! │  double-tap on the print button cannot duplicate kitchen tickets.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{OpsError, OpsResult};
use crate::ops::{discount_value_tx, table_label_tx};
use crate::pool::Database;
use crate::print::Peripherals;
use cafe_core::receipt::{CancellationTicket, KitchenTicket, TicketLine};
use cafe_core::validation::{validate_lines_not_empty, validate_pax, validate_quantity};
use cafe_core::{
    line_sub_total, recompute_from_items, CoreError, Order, OrderItem, Shift, Station,
    TAKEAWAY_HALL,
};

/// One requested line when creating an order or adding to it.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Loads an order that is still part of the live floor (not soft-deleted).
pub(crate) async fn load_live_order(
    db: &Database,
    conn: &mut SqliteConnection,
    order_id: i64,
) -> OpsResult<Order> {
    let order = db
        .orders()
        .get_tx(conn, order_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order_id))?;

    if order.is_deleted {
        return Err(OpsError::not_found("Order", order_id));
    }

    Ok(order)
}

/// Same as [`load_live_order`] but also refuses settled orders.
pub(crate) async fn load_open_order(
    db: &Database,
    conn: &mut SqliteConnection,
    order_id: i64,
) -> OpsResult<Order> {
    let order = load_live_order(db, conn, order_id).await?;

    if order.is_paid {
        return Err(CoreError::AlreadyPaid(order.id).into());
    }

    Ok(order)
}

// =============================================================================
// Create / Add / Remove
// =============================================================================

/// Opens a new order, on a table or as takeaway.
///
/// Lines are optional at creation; an order can open empty and receive
/// items through [`add_items`] as the party decides.
///
/// ## What This Does
/// 1. Binds the order to the table (marking it occupied) or to the
///    takeaway hall when no table is given
/// 2. Derives the shift from the wall clock, stamps the acting user
/// 3. Allocates the next KOT number inside the same transaction
/// 4. Inserts the items with their full quantity queued for printing
/// 5. Recomputes totals, commits, then dispatches kitchen tickets
pub async fn create_order(
    db: &Database,
    peripherals: &Peripherals,
    table_id: Option<&str>,
    number_of_pax: i64,
    lines: &[NewOrderLine],
    created_by: Option<&str>,
) -> OpsResult<Order> {
    validate_pax(number_of_pax)?;
    for line in lines {
        validate_quantity(line.quantity)?;
    }

    let now = Utc::now();
    let shift = Shift::for_time(Local::now().time());

    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let hall = match table_id {
        Some(id) => {
            let table = db
                .tables()
                .get_tx(&mut tx, id)
                .await?
                .ok_or_else(|| OpsError::not_found("Table", id))?;
            if !table.is_active {
                return Err(OpsError::not_found("Table", id));
            }
            if table.is_occupied {
                return Err(OpsError::invalid_state(format!(
                    "table {} is occupied",
                    table.table_number
                )));
            }
            table.hall
        }
        None => TAKEAWAY_HALL.to_string(),
    };

    let order = db
        .orders()
        .insert_order_tx(&mut tx, table_id, number_of_pax, &hall, shift, created_by, now)
        .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let product = db
            .catalog()
            .get_product_tx(&mut tx, &line.product_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Product", &line.product_id))?;

        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order.id,
            product_id: product.id.clone(),
            quantity: line.quantity,
            remaining_quantity: line.quantity,
            cancelled_quantity: 0,
            is_paid: false,
            quantity_to_print: line.quantity,
            is_printed: false,
            paid_by: None,
            notes: line.notes.clone(),
            sub_total_cents: line_sub_total(line.quantity, product.price()).cents(),
            created_at: now,
            updated_at: now,
        };
        db.orders().insert_item_tx(&mut tx, &item).await?;
        items.push(item);
    }

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

    if let Some(id) = table_id {
        db.tables()
            .set_occupied_tx(&mut tx, id, true, number_of_pax)
            .await?;
    }

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(order_id = order.id, kot = order.kot_number, hall, "Order created");

    print_pending(db, peripherals, order.id).await?;

    db.orders()
        .get(order.id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order.id))
}

/// Adds lines to an open order.
///
/// A line matching an existing unpaid line (same product, same notes) is
/// merged into it; otherwise a new line is inserted. New units queue for
/// kitchen printing either way.
pub async fn add_items(
    db: &Database,
    peripherals: &Peripherals,
    order_id: i64,
    lines: &[NewOrderLine],
) -> OpsResult<Order> {
    validate_lines_not_empty(lines)?;
    for line in lines {
        validate_quantity(line.quantity)?;
    }

    let now = Utc::now();
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;

    for line in lines {
        let product = db
            .catalog()
            .get_product_tx(&mut tx, &line.product_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Product", &line.product_id))?;

        let existing = db
            .orders()
            .items_tx(&mut tx, order.id)
            .await?
            .into_iter()
            .find(|i| i.product_id == line.product_id && i.notes == line.notes && !i.is_paid);

        match existing {
            Some(mut item) => {
                item.quantity += line.quantity;
                item.remaining_quantity += line.quantity;
                item.quantity_to_print += line.quantity;
                // The merged line goes back into the unprinted pool so the
                // kitchen sees the delta.
                item.is_printed = false;
                item.sub_total_cents =
                    line_sub_total(item.remaining_quantity, product.price()).cents();
                db.orders().update_item_tx(&mut tx, &item).await?;
            }
            None => {
                let item = OrderItem {
                    id: Uuid::new_v4().to_string(),
                    order_id: order.id,
                    product_id: product.id.clone(),
                    quantity: line.quantity,
                    remaining_quantity: line.quantity,
                    cancelled_quantity: 0,
                    is_paid: false,
                    quantity_to_print: line.quantity,
                    is_printed: false,
                    paid_by: None,
                    notes: line.notes.clone(),
                    sub_total_cents: line_sub_total(line.quantity, product.price()).cents(),
                    created_at: now,
                    updated_at: now,
                };
                db.orders().insert_item_tx(&mut tx, &item).await?;
            }
        }
    }

    let items = db.orders().items_tx(&mut tx, order.id).await?;
    let discount = discount_value_tx(db, &mut tx, &order).await?;
    let discount = if discount.is_zero() { None } else { Some(discount) };
    let totals = recompute_from_items(&items, discount);
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

    tx.commit().await.map_err(crate::error::DbError::from)?;

    print_pending(db, peripherals, order.id).await?;

    db.orders()
        .get(order.id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order.id))
}

/// Removes units from a line on an open order.
///
/// Asking for more than the line still holds removes what is there rather
/// than erroring. Units that never reached a kitchen ticket simply
/// disappear; units that were already printed move to `cancelled_quantity`
/// (feeding the loss report) and a cancellation notice goes to the item's
/// station. A line that was never printed and hits zero is deleted
/// outright.
pub async fn remove_item(
    db: &Database,
    peripherals: &Peripherals,
    order_id: i64,
    item_id: &str,
    quantity: i64,
    reason: Option<&str>,
) -> OpsResult<Order> {
    validate_quantity(quantity)?;

    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_open_order(db, &mut tx, order_id).await?;

    let mut item = db
        .orders()
        .get_item_tx(&mut tx, item_id)
        .await?
        .filter(|i| i.order_id == order.id)
        .ok_or_else(|| OpsError::not_found("Order item", item_id))?;

    let product = db
        .catalog()
        .get_product_tx(&mut tx, &item.product_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Product", &item.product_id))?;

    // Removal clamps to what the line still holds.
    let quantity = quantity.min(item.remaining_quantity);

    // Unprinted units vanish; only units already on a ticket count as
    // cancelled and notify the station.
    let from_pending = quantity.min(item.quantity_to_print);
    let cancelled_units = quantity - from_pending;

    item.quantity -= quantity;
    item.remaining_quantity -= quantity;
    item.quantity_to_print -= from_pending;
    item.cancelled_quantity += cancelled_units;
    item.sub_total_cents = line_sub_total(item.remaining_quantity, product.price()).cents();

    if item.quantity == 0 && !item.is_printed {
        db.orders().delete_item_tx(&mut tx, &item.id).await?;
    } else {
        db.orders().update_item_tx(&mut tx, &item).await?;
    }

    let items = db.orders().items_tx(&mut tx, order.id).await?;
    let discount = discount_value_tx(db, &mut tx, &order).await?;
    let discount = if discount.is_zero() { None } else { Some(discount) };
    let totals = recompute_from_items(&items, discount);
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

    let table_label = table_label_tx(db, &mut tx, &order).await?;
    let station = station_for_product(db, &mut tx, &item.product_id).await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    if cancelled_units > 0 {
        if let Some(station) = station {
            let ticket = CancellationTicket {
                station,
                order_id: order.id,
                table_label,
                time: Utc::now(),
                lines: vec![TicketLine {
                    name: product.name.clone(),
                    quantity: cancelled_units,
                    notes: None,
                }],
                reason: reason.map(str::to_string),
            };
            peripherals.dispatch(station, &ticket.render());
        }
        info!(order_id, item_id, cancelled_units, "Cancelled printed units");
    }

    db.orders()
        .get(order.id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order.id))
}

// =============================================================================
// Kitchen Printing
// =============================================================================

/// Resolves the station for one product through its categories.
async fn station_for_product(
    db: &Database,
    conn: &mut SqliteConnection,
    product_id: &str,
) -> OpsResult<Option<Station>> {
    let categories = sqlx::query_as::<_, cafe_core::Category>("SELECT * FROM categories")
        .fetch_all(&mut *conn)
        .await
        .map_err(crate::error::DbError::from)?;
    let map = cafe_core::StationMap::build(&categories);

    let ids = db.catalog().product_category_ids_tx(conn, product_id).await?;
    Ok(map.station_for(&ids))
}

/// Drains an order's print queue and dispatches kitchen tickets.
///
/// Idempotent: once every unit is printed, calling this again does nothing.
pub async fn print_pending(
    db: &Database,
    peripherals: &Peripherals,
    order_id: i64,
) -> OpsResult<()> {
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_live_order(db, &mut tx, order_id).await?;
    let pending = db.orders().pending_print_items_tx(&mut tx, order.id).await?;

    if pending.is_empty() {
        debug!(order_id, "Print queue empty");
        return Ok(());
    }

    let station_map = {
        let categories = sqlx::query_as::<_, cafe_core::Category>("SELECT * FROM categories")
            .fetch_all(&mut *tx)
            .await
            .map_err(crate::error::DbError::from)?;
        cafe_core::StationMap::build(&categories)
    };

    // station → ticket lines
    let mut per_station: Vec<(Station, Vec<TicketLine>)> = Vec::new();
    for item in &pending {
        let product = db
            .catalog()
            .get_product_tx(&mut tx, &item.product_id)
            .await?
            .ok_or_else(|| OpsError::not_found("Product", &item.product_id))?;
        let ids = db
            .catalog()
            .product_category_ids_tx(&mut tx, &item.product_id)
            .await?;

        let Some(station) = station_map.station_for(&ids) else {
            debug!(product = %product.name, "No station for product, skipping ticket line");
            continue;
        };

        let line = TicketLine {
            name: product.name,
            quantity: item.quantity_to_print,
            notes: item.notes.clone(),
        };
        match per_station.iter_mut().find(|(s, _)| *s == station) {
            Some((_, lines)) => lines.push(line),
            None => per_station.push((station, vec![line])),
        }
    }

    let table_label = table_label_tx(db, &mut tx, &order).await?;

    db.orders().mark_items_printed_tx(&mut tx, order.id).await?;
    tx.commit().await.map_err(crate::error::DbError::from)?;

    for (station, lines) in per_station {
        let ticket = KitchenTicket {
            station,
            kot_number: order.kot_number,
            order_id: order.id,
            table_label: table_label.clone(),
            time: Utc::now(),
            lines,
        };
        peripherals.dispatch(station, &ticket.render());
    }

    Ok(())
}

// =============================================================================
// Delete / Restore
// =============================================================================

/// Soft-deletes an unpaid order and frees its table.
pub async fn delete_order(db: &Database, order_id: i64) -> OpsResult<()> {
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = load_live_order(db, &mut tx, order_id).await?;
    if order.is_paid {
        return Err(OpsError::invalid_state(format!(
            "order {} is settled and part of the ledger",
            order.id
        )));
    }

    db.orders().soft_delete_tx(&mut tx, order.id).await?;
    if let Some(table_id) = &order.table_id {
        db.tables().set_occupied_tx(&mut tx, table_id, false, 0).await?;
    }

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(order_id, "Order soft-deleted");
    Ok(())
}

/// Restores a soft-deleted order, re-occupying its table if still unpaid.
pub async fn restore_order(db: &Database, order_id: i64) -> OpsResult<Order> {
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let order = db
        .orders()
        .get_tx(&mut tx, order_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order_id))?;
    if !order.is_deleted {
        return Err(OpsError::invalid_state(format!(
            "order {} is not deleted",
            order.id
        )));
    }

    sqlx::query("UPDATE orders SET is_deleted = 0, updated_at = ?2 WHERE id = ?1")
        .bind(order.id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(crate::error::DbError::from)?;

    if !order.is_paid {
        if let Some(table_id) = &order.table_id {
            db.tables()
                .set_occupied_tx(&mut tx, table_id, true, order.number_of_pax)
                .await?;
        }
    }

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(order_id, "Order restored");
    db.orders()
        .get(order_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Order", order_id))
}

/// Permanently removes an order and its items (admin only).
pub async fn hard_delete_order(db: &Database, order_id: i64) -> OpsResult<()> {
    db.orders().hard_delete(order_id).await?;
    info!(order_id, "Order hard-deleted");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::ops::testing::fixture;
    use crate::print::{NoopPdfRenderer, PrintError, PrintSink};

    fn line(product_id: &str, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: product_id.to_string(),
            quantity,
            notes: None,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        printed: Mutex<Vec<(Station, String)>>,
    }

    impl PrintSink for RecordingSink {
        fn print(&self, station: Station, document: &str) -> Result<(), PrintError> {
            self.printed
                .lock()
                .unwrap()
                .push((station, document.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_create_order_on_table() {
        let f = fixture().await;

        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.coffee.id, 2)],
            None,
        )
        .await
        .unwrap();

        assert_eq!(order.hall, "main hall");
        assert_eq!(order.kot_number, 1);
        assert_eq!(order.final_total_cents, 2000);
        assert_eq!(order.vat_cents, 95);
        assert_eq!(order.grand_total_cents, 2000);
        assert!(!order.is_paid);

        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(table.is_occupied);
        assert_eq!(table.no_of_pax, 2);

        // create_order drains the print queue on its way out
        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity_to_print, 0);
        assert!(items[0].is_printed);
    }

    #[tokio::test]
    async fn test_takeaway_order_has_no_table() {
        let f = fixture().await;

        let order = create_order(&f.db, &f.peripherals, None, 1, &[line(&f.coffee.id, 1)], None)
            .await
            .unwrap();

        assert_eq!(order.hall, TAKEAWAY_HALL);
        assert!(order.table_id.is_none());
    }

    #[tokio::test]
    async fn test_occupied_table_rejected() {
        let f = fixture().await;

        create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.coffee.id, 1)],
            None,
        )
        .await
        .unwrap();

        let result = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.sandwich.id, 1)],
            None,
        )
        .await;

        assert!(matches!(result, Err(OpsError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_add_items_merges_matching_line() {
        let f = fixture().await;

        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.coffee.id, 1)],
            None,
        )
        .await
        .unwrap();

        let order = add_items(&f.db, &f.peripherals, order.id, &[line(&f.coffee.id, 2)])
            .await
            .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].remaining_quantity, 3);
        assert_eq!(order.final_total_cents, 3000);

        // Different notes make a new line
        let order = add_items(
            &f.db,
            &f.peripherals,
            order.id,
            &[NewOrderLine {
                product_id: f.coffee.id.clone(),
                quantity: 1,
                notes: Some("no sugar".to_string()),
            }],
        )
        .await
        .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(order.final_total_cents, 4000);
    }

    #[tokio::test]
    async fn test_merged_line_reprints_only_the_delta() {
        let f = fixture().await;
        let sink = Arc::new(RecordingSink::default());
        let peripherals = Peripherals::new(sink.clone(), Arc::new(NoopPdfRenderer));

        let order = create_order(&f.db, &peripherals, None, 1, &[line(&f.coffee.id, 1)], None)
            .await
            .unwrap();
        add_items(&f.db, &peripherals, order.id, &[line(&f.coffee.id, 2)])
            .await
            .unwrap();

        // One ticket per batch, each carrying only the new units
        {
            let printed = sink.printed.lock().unwrap();
            assert_eq!(printed.len(), 2);
            assert_eq!(printed[0].0, Station::Barista);
            assert!(printed[0].1.contains("1 Nos"));
            assert!(printed[1].1.contains("2 Nos"));
        }

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].quantity_to_print, 0);
        assert!(items[0].is_printed);
    }

    #[tokio::test]
    async fn test_remove_printed_units_become_cancelled() {
        let f = fixture().await;

        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.coffee.id, 3)],
            None,
        )
        .await
        .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        let order = remove_item(&f.db, &f.peripherals, order.id, &items[0].id, 2, Some("cold"))
            .await
            .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].remaining_quantity, 1);
        assert_eq!(items[0].cancelled_quantity, 2);
        assert_eq!(order.final_total_cents, 1000);
    }

    #[tokio::test]
    async fn test_remove_unprinted_line_is_deleted() {
        let f = fixture().await;

        // Build an order whose line never reached a ticket
        let now = Utc::now();
        let mut tx = f.db.pool().begin().await.unwrap();
        let order = f
            .db
            .orders()
            .insert_order_tx(&mut tx, None, 1, TAKEAWAY_HALL, Shift::Morning, None, now)
            .await
            .unwrap();
        let item = OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: order.id,
            product_id: f.coffee.id.clone(),
            quantity: 2,
            remaining_quantity: 2,
            cancelled_quantity: 0,
            is_paid: false,
            quantity_to_print: 2,
            is_printed: false,
            paid_by: None,
            notes: None,
            sub_total_cents: 2000,
            created_at: now,
            updated_at: now,
        };
        f.db.orders().insert_item_tx(&mut tx, &item).await.unwrap();
        tx.commit().await.unwrap();

        let order = remove_item(&f.db, &f.peripherals, order.id, &item.id, 2, None)
            .await
            .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(order.final_total_cents, 0);
    }

    #[tokio::test]
    async fn test_remove_over_remaining_clamps_to_line() {
        let f = fixture().await;

        let order = create_order(&f.db, &f.peripherals, None, 1, &[line(&f.coffee.id, 1)], None)
            .await
            .unwrap();
        let items = f.db.orders().items(order.id).await.unwrap();

        // Asking for more than the line holds removes what is there
        let order = remove_item(&f.db, &f.peripherals, order.id, &items[0].id, 5, None)
            .await
            .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 0);
        assert_eq!(items[0].remaining_quantity, 0);
        assert_eq!(items[0].cancelled_quantity, 1);
        assert_eq!(order.final_total_cents, 0);
    }

    #[tokio::test]
    async fn test_create_order_without_items() {
        let f = fixture().await;

        let order = create_order(&f.db, &f.peripherals, Some(&f.table.id), 2, &[], Some("waiter"))
            .await
            .unwrap();

        assert_eq!(order.final_total_cents, 0);
        assert_eq!(order.created_by.as_deref(), Some("waiter"));
        assert!(f.db.orders().items(order.id).await.unwrap().is_empty());

        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(table.is_occupied);

        // Items arrive once the party decides
        let order = add_items(&f.db, &f.peripherals, order.id, &[line(&f.coffee.id, 1)])
            .await
            .unwrap();
        assert_eq!(order.final_total_cents, 1000);
    }

    #[tokio::test]
    async fn test_print_pending_is_idempotent() {
        let f = fixture().await;

        let order = create_order(&f.db, &f.peripherals, None, 1, &[line(&f.coffee.id, 2)], None)
            .await
            .unwrap();

        // Already drained by create_order; a second run must change nothing
        print_pending(&f.db, &f.peripherals, order.id).await.unwrap();
        print_pending(&f.db, &f.peripherals, order.id).await.unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items[0].quantity_to_print, 0);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_delete_and_restore_order() {
        let f = fixture().await;

        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[line(&f.coffee.id, 1)],
            None,
        )
        .await
        .unwrap();

        delete_order(&f.db, order.id).await.unwrap();

        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(!table.is_occupied);
        let stored = f.db.orders().get(order.id).await.unwrap().unwrap();
        assert!(stored.is_deleted);

        let restored = restore_order(&f.db, order.id).await.unwrap();
        assert!(!restored.is_deleted);
        let table = f.db.tables().get_by_id(&f.table.id).await.unwrap().unwrap();
        assert!(table.is_occupied);
    }
}
