//! # Operations
//!
//! The use-case surface of CafePOS. Each operation owns exactly one
//! transaction; repositories compose inside it and never commit.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  operation                                                              │
//! │     │                                                                   │
//! │     ├── validate input (cafe_core::validation, before any query)       │
//! │     ├── pool.begin()                                                    │
//! │     │      ├── read state, apply business rules                        │
//! │     │      ├── write rows through *_tx repository helpers              │
//! │     │      └── commit ─── money is now safe                            │
//! │     │                                                                   │
//! │     └── dispatch documents (tickets, invoices)                         │
//! │            └── failures are warnings, never rollbacks                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Groups
//!
//! - [`orders`] - create, add/remove items, kitchen tickets, delete/restore
//! - [`billing`] - discounts, checkout, split bills, group bills
//! - [`day`] - business day open/close
//! - [`reports`] - X / Z day reports and the sales listing

pub mod billing;
pub mod day;
pub mod orders;
pub mod reports;

use sqlx::SqliteConnection;

use crate::error::{DbResult, OpsResult};
use crate::pool::Database;
use cafe_core::{Money, Order};

/// The table number printed on documents, or "N/A" for takeaway.
pub(crate) async fn table_label_tx(
    db: &Database,
    conn: &mut SqliteConnection,
    order: &Order,
) -> DbResult<String> {
    match &order.table_id {
        Some(table_id) => Ok(db
            .tables()
            .get_tx(conn, table_id)
            .await?
            .map(|t| t.table_number.to_string())
            .unwrap_or_else(|| "N/A".to_string())),
        None => Ok("N/A".to_string()),
    }
}

/// Value of the discount attached to an order, zero when none.
pub(crate) async fn discount_value_tx(
    db: &Database,
    conn: &mut SqliteConnection,
    order: &Order,
) -> OpsResult<Money> {
    match &order.discount_id {
        Some(id) => Ok(db
            .discounts()
            .get_tx(conn, id)
            .await?
            .map(|d| d.value())
            .unwrap_or_default()),
        None => Ok(Money::zero()),
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use crate::pool::{Database, DbConfig};
    use crate::print::Peripherals;
    use cafe_core::{Product, Table};

    /// An in-memory floor: one regular table, one owner table, a coffee
    /// routed to the barista and a sandwich routed to the kitchen.
    pub(crate) struct Fixture {
        pub db: Database,
        pub peripherals: Peripherals,
        pub table: Table,
        pub owner_table: Table,
        pub coffee: Product,
        pub sandwich: Product,
    }

    pub(crate) async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let peripherals = Peripherals::log_only();

        let table = db.tables().create(5, "main hall", false).await.unwrap();
        let owner_table = db.tables().create(1, "main hall", true).await.unwrap();

        let drinks = db.catalog().create_category("drinks", None).await.unwrap();
        let hot = db
            .catalog()
            .create_category("hot drinks", Some(&drinks.id))
            .await
            .unwrap();
        let food = db.catalog().create_category("food", None).await.unwrap();

        // 10.00 coffee, 25.00 sandwich
        let coffee = db
            .catalog()
            .create_product("Cappuccino", Some("كابتشينو"), 1000, &[hot.id])
            .await
            .unwrap();
        let sandwich = db
            .catalog()
            .create_product("Club Sandwich", None, 2500, &[food.id])
            .await
            .unwrap();

        Fixture {
            db,
            peripherals,
            table,
            owner_table,
            coffee,
            sandwich,
        }
    }
}
