//! # Report Operations
//!
//! Gathers one business day's rows and hands them to the pure builders in
//! `cafe_core::report`. The X report snapshots the open day; the Z report
//! seals the latest closed one; the sales report lists bill by bill.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{OpsError, OpsResult};
use crate::pool::Database;
use crate::print::Peripherals;
use cafe_core::report::{
    build_day_report, build_sales_report, CanceledLine, DayReport, ItemSale, ReportKind,
    SalesBillRow, SalesReport,
};
use cafe_core::{BusinessDay, Category, Money, Station};

/// X report: snapshot of the currently open day.
pub async fn x_report(db: &Database) -> OpsResult<DayReport> {
    let day = db
        .business_days()
        .current_open()
        .await?
        .ok_or_else(|| OpsError::invalid_state("no business day is open"))?;

    build_report_for_day(db, &day, ReportKind::X).await
}

/// Z report: the most recently closed day.
pub async fn z_report(db: &Database) -> OpsResult<DayReport> {
    let day = db
        .business_days()
        .latest_closed()
        .await?
        .ok_or_else(|| OpsError::invalid_state("no closed business day yet"))?;

    build_report_for_day(db, &day, ReportKind::Z).await
}

/// Z report for one specific day.
pub async fn z_report_for(db: &Database, day_id: &str) -> OpsResult<DayReport> {
    let day = db
        .business_days()
        .get(day_id)
        .await?
        .ok_or_else(|| OpsError::not_found("Business day", day_id))?;

    build_report_for_day(db, &day, ReportKind::Z).await
}

/// Bill-by-bill sales listing for a day (defaults to the open day).
pub async fn sales_report(db: &Database, day_id: Option<&str>) -> OpsResult<SalesReport> {
    let day = match day_id {
        Some(id) => db
            .business_days()
            .get(id)
            .await?
            .ok_or_else(|| OpsError::not_found("Business day", id))?,
        None => db
            .business_days()
            .current_open()
            .await?
            .ok_or_else(|| OpsError::invalid_state("no business day is open"))?,
    };

    let bills = db.payments().bills_for_day(&day.id).await?;
    let rows: Vec<(String, SalesBillRow)> = bills
        .into_iter()
        .map(|b| {
            (
                b.hall,
                SalesBillRow {
                    bill_no: b.payment_id,
                    payment_method: b.payment_method,
                    settled_at: b.created_at,
                    total: Money::from_cents(b.amount_cents),
                },
            )
        })
        .collect();

    let payments = db.payments().list_for_day(&day.id).await?;

    Ok(build_sales_report(day.start_time, &rows, &payments))
}

/// Renders a day report and dispatches it to the cashier printer.
pub async fn print_day_report(
    db: &Database,
    peripherals: &Peripherals,
    kind: ReportKind,
) -> OpsResult<DayReport> {
    let report = match kind {
        ReportKind::X => x_report(db).await?,
        ReportKind::Z => z_report(db).await?,
    };
    peripherals.dispatch(Station::Cashier, &report.render());
    Ok(report)
}

// =============================================================================
// Gathering
// =============================================================================

async fn build_report_for_day(
    db: &Database,
    day: &BusinessDay,
    kind: ReportKind,
) -> OpsResult<DayReport> {
    let orders = db.orders().paid_orders_for_day(&day.id).await?;

    let mut paid_orders = Vec::with_capacity(orders.len());
    for order in &orders {
        let discount = match &order.discount_id {
            Some(id) => db
                .discounts()
                .get(id)
                .await?
                .map(|d| d.value())
                .unwrap_or_default(),
            None => Money::zero(),
        };
        paid_orders.push(cafe_core::report::PaidOrder {
            order_id: order.id,
            hall: order.hall.clone(),
            shift: order.shift,
            number_of_pax: order.number_of_pax,
            final_total: order.final_total(),
            vat: order.vat(),
            discount,
            grand_total: order.grand_total(),
        });
    }

    let payments = db.payments().list_for_day(&day.id).await?;

    let categories = db.catalog().list_categories().await?;
    let sale_rows = db.orders().item_sales_for_day(&day.id).await?;
    let mut item_sales = Vec::with_capacity(sale_rows.len());
    for row in sale_rows {
        let Some((group, sub_group)) = category_lineage(&categories, &row.category_id) else {
            debug!(category_id = %row.category_id, "Category vanished, skipping sales row");
            continue;
        };
        item_sales.push(ItemSale {
            group,
            sub_group,
            quantity: row.quantity,
            gross: Money::from_cents(row.price_cents) * row.quantity,
        });
    }

    let canceled_rows = db
        .orders()
        .cancelled_lines_for_window(day.start_time, day.end_time)
        .await?;
    let canceled: Vec<CanceledLine> = canceled_rows
        .into_iter()
        .map(|r| CanceledLine {
            product_name: r.product_name,
            quantity: r.quantity,
            unit_price: Money::from_cents(r.price_cents),
        })
        .collect();

    Ok(build_day_report(
        kind,
        day.start_time,
        day.end_time,
        &paid_orders,
        &payments,
        &item_sales,
        &canceled,
    ))
}

/// Resolves a category to its root group name and, when the category is a
/// leaf under a root, its own name as the sub-group.
fn category_lineage(categories: &[Category], category_id: &str) -> Option<(String, Option<String>)> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let category = by_id.get(category_id)?;
    let mut root = *category;
    let mut hops = 0;
    while let Some(parent_id) = &root.parent_id {
        match by_id.get(parent_id.as_str()) {
            Some(parent) => root = parent,
            None => break,
        }
        hops += 1;
        if hops > categories.len() {
            break;
        }
    }

    let sub_group = if root.id != category.id {
        Some(category.name.clone())
    } else {
        None
    };

    Some((root.name.clone(), sub_group))
}

// =============================================================================
// Unit Tests
// =============================================================================
