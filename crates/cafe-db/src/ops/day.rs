//! # Business Day Operations
//!
//! Opening and closing the accounting day.
//!
//! ## Close Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  close_business_day                                                     │
//! │     │                                                                   │
//! │     ├── no day yet? open the initial one and stop                       │
//! │     ├── re-read the open day inside the tx (a racing close loses)      │
//! │     ├── refuse a second close on the same calendar date                │
//! │     ├── backfill: settled orders with no day stamp, created since      │
//! │     │   the day opened, get tagged so the report still sees them       │
//! │     ├── seal the day (end_time, is_closed)                             │
//! │     ├── open the next day in the same transaction                      │
//! │     └── after commit: Z report of the sealed day → cashier printer     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::info;

use crate::error::{OpsError, OpsResult};
use crate::ops::reports;
use crate::pool::Database;
use crate::print::Peripherals;
use cafe_core::report::DayReport;
use cafe_core::{BusinessDay, Station};

/// Outcome of closing a business day.
#[derive(Debug, Clone)]
pub struct DayRollover {
    /// The day that was sealed; `None` on the very first call, which only
    /// opens the books.
    pub closed: Option<BusinessDay>,
    /// The open day after the call.
    pub opened: BusinessDay,
    /// Settled orders that were tagged to the closed day at close time.
    pub backfilled_orders: u64,
    /// Z report of the sealed day, already dispatched to the cashier.
    pub report: Option<DayReport>,
}

/// Opens a business day when none is open.
pub async fn open_business_day(db: &Database) -> OpsResult<BusinessDay> {
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    if db.business_days().current_open_tx(&mut tx).await?.is_some() {
        return Err(OpsError::invalid_state("a business day is already open"));
    }

    let day = db.business_days().open_tx(&mut tx, Utc::now()).await?;
    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(day_id = %day.id, "Business day opened");
    Ok(day)
}

/// Closes the open business day, opens the next one and emits the Z report.
///
/// The very first call, before any day exists, only opens the initial day.
/// Refused when a day was already closed on today's calendar date (one
/// close per date).
pub async fn close_business_day(
    db: &Database,
    peripherals: &Peripherals,
    closed_by: Option<&str>,
) -> OpsResult<DayRollover> {
    let now = Utc::now();
    let mut tx = db.pool().begin().await.map_err(crate::error::DbError::from)?;

    let Some(day) = db.business_days().current_open_tx(&mut tx).await? else {
        // No books yet: the first close just opens them.
        let opened = db.business_days().open_tx(&mut tx, now).await?;
        tx.commit().await.map_err(crate::error::DbError::from)?;

        info!(day_id = %opened.id, "Initial business day opened");
        return Ok(DayRollover {
            closed: None,
            opened,
            backfilled_orders: 0,
            report: None,
        });
    };

    if db
        .business_days()
        .closed_on_date_tx(&mut tx, now.date_naive())
        .await?
    {
        return Err(OpsError::invalid_state(
            "a business day was already closed today",
        ));
    }

    let backfilled_orders = db
        .orders()
        .backfill_day_tx(&mut tx, &day.id, day.start_time)
        .await?;

    db.business_days()
        .close_tx(&mut tx, &day.id, now, closed_by)
        .await?;
    let opened = db.business_days().open_tx(&mut tx, now).await?;

    tx.commit().await.map_err(crate::error::DbError::from)?;

    info!(
        closed = %day.id,
        opened = %opened.id,
        backfilled_orders,
        "Business day rolled over"
    );

    let closed = db
        .business_days()
        .get(&day.id)
        .await?
        .ok_or_else(|| OpsError::not_found("Business day", &day.id))?;

    let report = reports::z_report_for(db, &closed.id).await?;
    peripherals.dispatch(Station::Cashier, &report.render());

    Ok(DayRollover {
        closed: Some(closed),
        opened,
        backfilled_orders,
        report: Some(report),
    })
}

/// The currently open day, if any.
pub async fn current_business_day(db: &Database) -> OpsResult<Option<BusinessDay>> {
    Ok(db.business_days().current_open().await?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::billing::checkout;
    use crate::ops::orders::{create_order, NewOrderLine};
    use crate::ops::testing::fixture;
    use cafe_core::PaymentMethod;

    #[tokio::test]
    async fn test_open_day_only_once() {
        let f = fixture().await;

        let day = open_business_day(&f.db).await.unwrap();
        assert!(day.is_open());

        let result = open_business_day(&f.db).await;
        assert!(matches!(result, Err(OpsError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_first_close_opens_the_books() {
        let f = fixture().await;

        let rollover = close_business_day(&f.db, &f.peripherals, None).await.unwrap();
        assert!(rollover.closed.is_none());
        assert!(rollover.report.is_none());
        assert!(rollover.opened.is_open());

        let open = current_business_day(&f.db).await.unwrap().unwrap();
        assert_eq!(open.id, rollover.opened.id);
    }

    #[tokio::test]
    async fn test_close_rolls_into_next_day() {
        let f = fixture().await;

        let day = open_business_day(&f.db).await.unwrap();

        // Settle one order inside the day
        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[NewOrderLine {
                product_id: f.coffee.id.clone(),
                quantity: 1,
                notes: None,
            }],
            None,
        )
        .await
        .unwrap();
        let (payment, _) = checkout(&f.db, &f.peripherals, order.id, PaymentMethod::Cash, 0, 0)
            .await
            .unwrap();
        assert_eq!(payment.business_day_id.as_deref(), Some(day.id.as_str()));

        let rollover = close_business_day(&f.db, &f.peripherals, Some("manager"))
            .await
            .unwrap();
        let closed = rollover.closed.unwrap();
        assert_eq!(closed.id, day.id);
        assert!(closed.is_closed);
        assert_eq!(closed.closed_by.as_deref(), Some("manager"));
        assert!(rollover.opened.is_open());
        assert_ne!(rollover.opened.id, day.id);
        assert_eq!(rollover.backfilled_orders, 0);

        // The Z report of the sealed day rides along
        let report = rollover.report.unwrap();
        assert_eq!(report.total_sales, payment.amount());

        let open = current_business_day(&f.db).await.unwrap().unwrap();
        assert_eq!(open.id, rollover.opened.id);
    }

    #[tokio::test]
    async fn test_second_close_on_same_date_rejected() {
        let f = fixture().await;

        open_business_day(&f.db).await.unwrap();
        close_business_day(&f.db, &f.peripherals, None).await.unwrap();

        // The rollover opened the next day, but the calendar date is spent
        let result = close_business_day(&f.db, &f.peripherals, None).await;
        assert!(matches!(result, Err(OpsError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_close_backfills_day_less_orders() {
        let f = fixture().await;

        let day = open_business_day(&f.db).await.unwrap();

        let order = create_order(
            &f.db,
            &f.peripherals,
            Some(&f.table.id),
            2,
            &[NewOrderLine {
                product_id: f.coffee.id.clone(),
                quantity: 1,
                notes: None,
            }],
            None,
        )
        .await
        .unwrap();
        checkout(&f.db, &f.peripherals, order.id, PaymentMethod::Cash, 0, 0)
            .await
            .unwrap();

        // Strip the day stamp to simulate an order settled around a crash
        sqlx::query("UPDATE orders SET business_day_id = NULL WHERE id = ?1")
            .bind(order.id)
            .execute(f.db.pool())
            .await
            .unwrap();

        let rollover = close_business_day(&f.db, &f.peripherals, None).await.unwrap();
        assert_eq!(rollover.backfilled_orders, 1);

        let order = f.db.orders().get(order.id).await.unwrap().unwrap();
        assert_eq!(order.business_day_id.as_deref(), Some(day.id.as_str()));
    }
}
