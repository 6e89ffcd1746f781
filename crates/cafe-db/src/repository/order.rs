//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_order_tx() → sequential id, kot MAX+1 in the same tx    │
//! │                                                                         │
//! │  2. MUTATE                                                             │
//! │     └── insert_item_tx() / update_item_tx()                            │
//! │     └── update_totals_tx() → final / vat / grand recomputed            │
//! │                                                                         │
//! │  3. SETTLE                                                             │
//! │     └── mark_paid_tx() → is_paid, check_out_time, business day stamp   │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── soft_delete_tx() → is_deleted, excluded from reports           │
//! │                                                                         │
//! │  Repositories never commit; the operation owns the transaction.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use cafe_core::{Order, OrderItem, Shift};

/// One product's settled sales for the day report, with its category ids
/// flattened (one row per product/category pair).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemSaleRow {
    pub product_id: String,
    pub category_id: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// One cancelled-after-print line for the loss section.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CancelledRow {
    pub product_name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // ===== Orders =====

    /// Inserts an order inside an open transaction.
    ///
    /// The order id comes from SQLite's rowid allocation, so two terminals
    /// creating orders at once can never collide. The KOT number is the next
    /// value of its own sequence, read inside the same transaction.
    pub async fn insert_order_tx(
        &self,
        conn: &mut SqliteConnection,
        table_id: Option<&str>,
        number_of_pax: i64,
        hall: &str,
        shift: Shift,
        created_by: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> DbResult<Order> {
        let kot_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(kot_number), 0) + 1 FROM orders")
                .fetch_one(&mut *conn)
                .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                table_id, number_of_pax, hall, shift, kot_number,
                final_total_cents, vat_cents, grand_total_cents,
                is_paid, is_deleted,
                created_at, updated_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, 0, 0, 0, ?6, ?6, ?7)
            "#,
        )
        .bind(table_id)
        .bind(number_of_pax)
        .bind(hall)
        .bind(shift)
        .bind(kot_number)
        .bind(created_at)
        .bind(created_by)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();

        debug!(id, kot_number, hall, "Created order");

        Ok(Order {
            id,
            table_id: table_id.map(str::to_string),
            number_of_pax,
            hall: hall.to_string(),
            shift,
            kot_number,
            final_total_cents: 0,
            vat_cents: 0,
            discount_id: None,
            grand_total_cents: 0,
            is_paid: false,
            is_deleted: false,
            business_day_id: None,
            check_out_time: None,
            created_at,
            updated_at: created_at,
            created_by: created_by.map(str::to_string),
            updated_by: None,
        })
    }

    /// Gets an order by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order inside an open transaction.
    pub async fn get_tx(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(order)
    }

    /// Lists open (unpaid, not deleted) orders, oldest first.
    pub async fn list_unpaid(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE is_paid = 0 AND is_deleted = 0 ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists settled orders, newest first.
    pub async fn list_paid(&self, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE is_paid = 1 AND is_deleted = 0
            ORDER BY check_out_time DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists soft-deleted orders, newest first.
    pub async fn list_deleted(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE is_deleted = 1 ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists settled orders tagged to a business day.
    pub async fn paid_orders_for_day(&self, day_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE business_day_id = ?1 AND is_paid = 1 AND is_deleted = 0
            ORDER BY check_out_time
            "#,
        )
        .bind(day_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Writes the recomputed totals and the discount link.
    pub async fn update_totals_tx(
        &self,
        conn: &mut SqliteConnection,
        order_id: i64,
        final_total_cents: i64,
        vat_cents: i64,
        grand_total_cents: i64,
        discount_id: Option<&str>,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                final_total_cents = ?2,
                vat_cents = ?3,
                grand_total_cents = ?4,
                discount_id = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(final_total_cents)
        .bind(vat_cents)
        .bind(grand_total_cents)
        .bind(discount_id)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Marks an order settled inside an open transaction.
    pub async fn mark_paid_tx(
        &self,
        conn: &mut SqliteConnection,
        order_id: i64,
        business_day_id: Option<&str>,
        check_out_time: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                is_paid = 1,
                business_day_id = ?2,
                check_out_time = ?3,
                updated_at = ?3
            WHERE id = ?1 AND is_paid = 0
            "#,
        )
        .bind(order_id)
        .bind(business_day_id)
        .bind(check_out_time)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (unpaid)", order_id));
        }

        Ok(())
    }

    /// Soft-deletes an order inside an open transaction.
    pub async fn soft_delete_tx(&self, conn: &mut SqliteConnection, order_id: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET is_deleted = 1, updated_at = ?2 WHERE id = ?1 AND is_deleted = 0",
        )
        .bind(order_id)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Restores a soft-deleted order.
    pub async fn restore(&self, order_id: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET is_deleted = 0, updated_at = ?2 WHERE id = ?1 AND is_deleted = 1",
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (deleted)", order_id));
        }

        Ok(())
    }

    /// Permanently removes an order and its items (admin only).
    pub async fn hard_delete(&self, order_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Tags day-less settled orders created since `start_time` to the day.
    ///
    /// Run at close so orders settled while no day row existed still land
    /// in the report.
    pub async fn backfill_day_tx(
        &self,
        conn: &mut SqliteConnection,
        day_id: &str,
        start_time: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET business_day_id = ?1
            WHERE business_day_id IS NULL AND is_paid = 1 AND created_at >= ?2
            "#,
        )
        .bind(day_id)
        .bind(start_time)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    // ===== Order Items =====

    /// Gets all items for an order.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all items for an order inside an open transaction.
    pub async fn items_tx(
        &self,
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// Gets one item inside an open transaction.
    pub async fn get_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> DbResult<Option<OrderItem>> {
        let item = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = ?1")
            .bind(item_id)
            .fetch_optional(conn)
            .await?;

        Ok(item)
    }

    /// Inserts an item inside an open transaction.
    pub async fn insert_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item: &OrderItem,
    ) -> DbResult<()> {
        debug!(order_id = item.order_id, product_id = %item.product_id, "Adding order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id,
                quantity, remaining_quantity, cancelled_quantity,
                is_paid, quantity_to_print, is_printed,
                paid_by, notes, sub_total_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&item.id)
        .bind(item.order_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.remaining_quantity)
        .bind(item.cancelled_quantity)
        .bind(item.is_paid)
        .bind(item.quantity_to_print)
        .bind(item.is_printed)
        .bind(item.paid_by)
        .bind(&item.notes)
        .bind(item.sub_total_cents)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Writes an item's quantities, flags and sub-total.
    pub async fn update_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item: &OrderItem,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE order_items SET
                quantity = ?2,
                remaining_quantity = ?3,
                cancelled_quantity = ?4,
                is_paid = ?5,
                quantity_to_print = ?6,
                is_printed = ?7,
                paid_by = ?8,
                sub_total_cents = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(item.quantity)
        .bind(item.remaining_quantity)
        .bind(item.cancelled_quantity)
        .bind(item.is_paid)
        .bind(item.quantity_to_print)
        .bind(item.is_printed)
        .bind(item.paid_by)
        .bind(item.sub_total_cents)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order item", &item.id));
        }

        Ok(())
    }

    /// Deletes an item row inside an open transaction.
    ///
    /// Only legal for lines that were never printed; printed lines are
    /// cancelled instead so the loss report keeps them.
    pub async fn delete_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item_id: &str,
    ) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = ?1")
            .bind(item_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order item", item_id));
        }

        Ok(())
    }

    /// Items with units still awaiting a kitchen ticket.
    pub async fn pending_print_items_tx(
        &self,
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT * FROM order_items
            WHERE order_id = ?1 AND quantity_to_print > 0
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// Zeroes the print queue for an order after tickets were dispatched.
    pub async fn mark_items_printed_tx(
        &self,
        conn: &mut SqliteConnection,
        order_id: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE order_items SET
                quantity_to_print = 0,
                is_printed = 1,
                updated_at = ?2
            WHERE order_id = ?1 AND quantity_to_print > 0
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(())
    }

    // ===== Report Queries =====

    /// Settled item sales for a day, one row per product/category pair.
    pub async fn item_sales_for_day(&self, day_id: &str) -> DbResult<Vec<ItemSaleRow>> {
        let rows = sqlx::query_as::<_, ItemSaleRow>(
            r#"
            SELECT
                oi.product_id AS product_id,
                pc.category_id AS category_id,
                SUM(oi.quantity) AS quantity,
                p.price_cents AS price_cents
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            JOIN product_categories pc ON pc.product_id = oi.product_id
            WHERE o.business_day_id = ?1 AND o.is_paid = 1 AND o.is_deleted = 0
            GROUP BY oi.product_id, pc.category_id
            "#,
        )
        .bind(day_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Cancelled-after-print lines for orders opened in the day window.
    pub async fn cancelled_lines_for_window(
        &self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<CancelledRow>> {
        let end = end.unwrap_or_else(Utc::now);

        let rows = sqlx::query_as::<_, CancelledRow>(
            r#"
            SELECT
                p.name AS product_name,
                SUM(oi.cancelled_quantity) AS quantity,
                p.price_cents AS price_cents
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE oi.cancelled_quantity > 0
              AND o.created_at >= ?1 AND o.created_at < ?2
            GROUP BY oi.product_id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_sequential_ids_and_kot_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut tx = db.pool().begin().await.unwrap();
        let first = repo
            .insert_order_tx(&mut tx, None, 0, "takeaway", Shift::Morning, Some("waiter"), Utc::now())
            .await
            .unwrap();
        let second = repo
            .insert_order_tx(&mut tx, None, 0, "takeaway", Shift::Morning, None, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(second.id, first.id + 1);
        assert_eq!(first.kot_number, 1);
        assert_eq!(second.kot_number, 2);

        let stored = repo.get(first.id).await.unwrap().unwrap();
        assert_eq!(stored.created_by.as_deref(), Some("waiter"));
    }

    #[tokio::test]
    async fn test_mark_paid_rejects_second_settlement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let mut tx = db.pool().begin().await.unwrap();
        let order = repo
            .insert_order_tx(&mut tx, None, 2, "takeaway", Shift::Evening, None, Utc::now())
            .await
            .unwrap();
        repo.mark_paid_tx(&mut tx, order.id, None, Utc::now())
            .await
            .unwrap();

        let err = repo
            .mark_paid_tx(&mut tx, order.id, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
