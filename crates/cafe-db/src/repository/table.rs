//! # Table Repository
//!
//! Database operations for the floor plan.
//!
//! ## Occupancy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_occupied follows the order lifecycle, not manual toggling:         │
//! │                                                                         │
//! │  create_order(table) ──► occupied = 1, no_of_pax = party size          │
//! │  checkout / group bill ─► occupied = 0                                  │
//! │  delete_order ──────────► occupied = 0                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cafe_core::Table;

/// Repository for floor plan operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Creates a new table.
    ///
    /// Table numbers are unique across halls; a duplicate number surfaces
    /// as `DbError::UniqueViolation`.
    pub async fn create(&self, table_number: i64, hall: &str, is_owner: bool) -> DbResult<Table> {
        let now = Utc::now();
        let table = Table {
            id: Uuid::new_v4().to_string(),
            table_number,
            hall: hall.to_string(),
            no_of_pax: 0,
            is_occupied: false,
            is_owner,
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        };

        debug!(id = %table.id, table_number, hall, "Creating table");

        sqlx::query(
            r#"
            INSERT INTO tables (
                id, table_number, hall, no_of_pax,
                is_occupied, is_owner, is_active,
                created_at, updated_at, created_by, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&table.id)
        .bind(table.table_number)
        .bind(&table.hall)
        .bind(table.no_of_pax)
        .bind(table.is_occupied)
        .bind(table.is_owner)
        .bind(table.is_active)
        .bind(table.created_at)
        .bind(table.updated_at)
        .bind(&table.created_by)
        .bind(&table.updated_by)
        .execute(&self.pool)
        .await?;

        Ok(table)
    }

    /// Gets a table by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(table)
    }

    /// Gets a table inside an open transaction.
    pub async fn get_tx(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>("SELECT * FROM tables WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(table)
    }

    /// Lists active tables ordered by table number.
    pub async fn list_active(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            "SELECT * FROM tables WHERE is_active = 1 ORDER BY table_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Updates a table's number, hall and owner flag.
    pub async fn update(
        &self,
        id: &str,
        table_number: i64,
        hall: &str,
        is_owner: bool,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tables SET
                table_number = ?2,
                hall = ?3,
                is_owner = ?4,
                updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(table_number)
        .bind(hall)
        .bind(is_owner)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        Ok(())
    }

    /// Sets occupancy and party size inside an open transaction.
    pub async fn set_occupied_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        occupied: bool,
        no_of_pax: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE tables SET
                is_occupied = ?2,
                no_of_pax = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(occupied)
        .bind(no_of_pax)
        .bind(now)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        Ok(())
    }

    /// Takes a table out of service (soft delete).
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE tables SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
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
    use crate::error::DbError;

    #[tokio::test]
    async fn test_create_and_fetch_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        let table = repo.create(5, "main hall", false).await.unwrap();
        let fetched = repo.get_by_id(&table.id).await.unwrap().unwrap();

        assert_eq!(fetched.table_number, 5);
        assert_eq!(fetched.hall, "main hall");
        assert!(!fetched.is_occupied);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_table_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        repo.create(5, "main hall", false).await.unwrap();
        let err = repo.create(5, "terrace", false).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        let table = repo.create(1, "main hall", false).await.unwrap();
        repo.create(2, "main hall", false).await.unwrap();

        repo.deactivate(&table.id).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].table_number, 2);
    }
}
