//! # Discount Repository
//!
//! A fresh discount row is written each time a discount is applied, so the
//! ledger keeps every value ever granted. Admin screens manage standalone
//! rows through the same table.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cafe_core::Discount;

/// Repository for discount rows.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Inserts a discount row inside an open transaction.
    pub async fn create_tx(
        &self,
        conn: &mut SqliteConnection,
        value_cents: i64,
        reason: Option<&str>,
        created_by: Option<&str>,
    ) -> DbResult<Discount> {
        let now = Utc::now();
        let discount = Discount {
            id: Uuid::new_v4().to_string(),
            value_cents,
            reason: reason.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: created_by.map(str::to_string),
        };

        debug!(id = %discount.id, value_cents, "Creating discount");

        sqlx::query(
            r#"
            INSERT INTO discounts (
                id, value_cents, reason, is_active, created_at, updated_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&discount.id)
        .bind(discount.value_cents)
        .bind(&discount.reason)
        .bind(discount.is_active)
        .bind(discount.created_at)
        .bind(discount.updated_at)
        .bind(&discount.created_by)
        .execute(conn)
        .await?;

        Ok(discount)
    }

    /// Inserts a standalone discount row (admin use).
    pub async fn create(
        &self,
        value_cents: i64,
        reason: Option<&str>,
        created_by: Option<&str>,
    ) -> DbResult<Discount> {
        let mut conn = self.pool.acquire().await?;
        self.create_tx(&mut conn, value_cents, reason, created_by)
            .await
    }

    /// Gets a discount by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(discount)
    }

    /// Gets a discount inside an open transaction.
    pub async fn get_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Discount>> {
        let discount = sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(discount)
    }

    /// Lists active discounts, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Discount>> {
        let discounts = sqlx::query_as::<_, Discount>(
            "SELECT * FROM discounts WHERE is_active = 1 ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(discounts)
    }

    /// Updates a standalone discount's value and reason (admin use).
    pub async fn update(
        &self,
        id: &str,
        value_cents: i64,
        reason: Option<&str>,
    ) -> DbResult<Discount> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE discounts SET value_cents = ?2, reason = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(value_cents)
        .bind(reason)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    /// Retires a discount row (soft delete); the ledger keeps it.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE discounts SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_deactivate_discount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.discounts();

        let discount = repo.create(500, Some("regular"), None).await.unwrap();
        assert_eq!(repo.list_active().await.unwrap().len(), 1);

        repo.deactivate(&discount.id).await.unwrap();
        assert!(repo.list_active().await.unwrap().is_empty());

        // The row itself survives for the ledger.
        assert!(repo.get(&discount.id).await.unwrap().is_some());
    }
}
