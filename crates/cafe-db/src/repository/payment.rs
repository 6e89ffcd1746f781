//! # Payment Repository
//!
//! Database operations for the payment ledger.
//!
//! ## Ledger Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  payments (id = invoice number)                                        │
//! │     │                                                                   │
//! │     │ payment_orders                                                    │
//! │     ▼                                                                   │
//! │  orders: one row (checkout, split) or several (group bill)             │
//! │                                                                         │
//! │  amount = cash + visa, enforced by a CHECK constraint; a split that    │
//! │  does not add up never reaches the table.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use cafe_core::{Payment, PaymentMethod};

/// One settled bill for the sales listing: the payment joined back to the
/// hall of its (first) order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRecord {
    pub payment_id: i64,
    pub hall: String,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub amount_cents: i64,
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Inserts a payment inside an open transaction.
    ///
    /// The payment id comes from SQLite's rowid allocation and doubles as
    /// the printed invoice number.
    pub async fn insert_tx(
        &self,
        conn: &mut SqliteConnection,
        amount_cents: i64,
        cash_amount_cents: i64,
        visa_amount_cents: i64,
        payment_method: PaymentMethod,
        business_day_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> DbResult<Payment> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                amount_cents, cash_amount_cents, visa_amount_cents,
                payment_method, business_day_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(amount_cents)
        .bind(cash_amount_cents)
        .bind(visa_amount_cents)
        .bind(payment_method)
        .bind(business_day_id)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();

        debug!(id, amount_cents, method = payment_method.as_str(), "Recorded payment");

        Ok(Payment {
            id,
            amount_cents,
            cash_amount_cents,
            visa_amount_cents,
            payment_method,
            business_day_id: business_day_id.map(str::to_string),
            created_at,
            created_by: None,
        })
    }

    /// Links a payment to an order it settles (fully or partially).
    pub async fn link_order_tx(
        &self,
        conn: &mut SqliteConnection,
        payment_id: i64,
        order_id: i64,
    ) -> DbResult<()> {
        sqlx::query("INSERT INTO payment_orders (payment_id, order_id) VALUES (?1, ?2)")
            .bind(payment_id)
            .bind(order_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Lists payments tagged to a business day, oldest first.
    pub async fn list_for_day(&self, day_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE business_day_id = ?1 ORDER BY created_at",
        )
        .bind(day_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists the most recent payments (admin listing).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments ORDER BY created_at DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Order ids settled by a payment.
    pub async fn order_ids(&self, payment_id: i64) -> DbResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT order_id FROM payment_orders WHERE payment_id = ?1 ORDER BY order_id",
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Settled bills for a day, one row per payment with the hall of its
    /// first linked order. Group bills spanning halls list under the first.
    pub async fn bills_for_day(&self, day_id: &str) -> DbResult<Vec<BillRecord>> {
        let bills = sqlx::query_as::<_, BillRecord>(
            r#"
            SELECT
                p.id AS payment_id,
                MIN(o.hall) AS hall,
                p.payment_method AS payment_method,
                p.created_at AS created_at,
                p.amount_cents AS amount_cents
            FROM payments p
            JOIN payment_orders po ON po.payment_id = p.id
            JOIN orders o ON o.id = po.order_id
            WHERE p.business_day_id = ?1
            GROUP BY p.id
            ORDER BY p.created_at
            "#,
        )
        .bind(day_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_payment_legs_must_sum() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();

        let mut tx = db.pool().begin().await.unwrap();
        let err = repo
            .insert_tx(&mut tx, 1200, 500, 500, PaymentMethod::Multi, None, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();

        let mut tx = db.pool().begin().await.unwrap();
        let first = repo
            .insert_tx(&mut tx, 1000, 1000, 0, PaymentMethod::Cash, None, Utc::now())
            .await
            .unwrap();
        let second = repo
            .insert_tx(&mut tx, 2000, 0, 2000, PaymentMethod::Card, None, Utc::now())
            .await
            .unwrap();

        assert_eq!(second.id, first.id + 1);
    }
}
