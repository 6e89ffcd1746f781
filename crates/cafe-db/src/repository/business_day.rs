//! # Business Day Repository
//!
//! The accounting day. At most one is open at any time, enforced by a
//! partial unique index over the open rows; a second concurrent open
//! surfaces as a unique violation instead of a silent duplicate.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cafe_core::BusinessDay;

/// Repository for business day rows.
#[derive(Debug, Clone)]
pub struct BusinessDayRepository {
    pool: SqlitePool,
}

impl BusinessDayRepository {
    /// Creates a new BusinessDayRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BusinessDayRepository { pool }
    }

    /// Opens a new day inside an open transaction.
    ///
    /// The single-open-day index makes a concurrent second open fail with
    /// a unique violation.
    pub async fn open_tx(
        &self,
        conn: &mut SqliteConnection,
        start_time: DateTime<Utc>,
    ) -> DbResult<BusinessDay> {
        let day = BusinessDay {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            is_closed: false,
            closed_by: None,
            created_at: start_time,
        };

        info!(id = %day.id, start = %day.start_time, "Opening business day");

        sqlx::query(
            r#"
            INSERT INTO business_days (id, start_time, end_time, is_closed, closed_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&day.id)
        .bind(day.start_time)
        .bind(day.end_time)
        .bind(day.is_closed)
        .bind(&day.closed_by)
        .bind(day.created_at)
        .execute(conn)
        .await?;

        Ok(day)
    }

    /// Returns the currently open day, if any.
    pub async fn current_open(&self) -> DbResult<Option<BusinessDay>> {
        let day = sqlx::query_as::<_, BusinessDay>(
            "SELECT * FROM business_days WHERE is_closed = 0 LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(day)
    }

    /// Returns the currently open day inside an open transaction.
    ///
    /// Operations re-read the day inside their own transaction so a close
    /// racing with a payment cannot tag rows to a day that just sealed.
    pub async fn current_open_tx(
        &self,
        conn: &mut SqliteConnection,
    ) -> DbResult<Option<BusinessDay>> {
        let day = sqlx::query_as::<_, BusinessDay>(
            "SELECT * FROM business_days WHERE is_closed = 0 LIMIT 1",
        )
        .fetch_optional(conn)
        .await?;

        Ok(day)
    }

    /// Gets a day by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<BusinessDay>> {
        let day = sqlx::query_as::<_, BusinessDay>("SELECT * FROM business_days WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(day)
    }

    /// Returns the most recently closed day, if any.
    pub async fn latest_closed(&self) -> DbResult<Option<BusinessDay>> {
        let day = sqlx::query_as::<_, BusinessDay>(
            "SELECT * FROM business_days WHERE is_closed = 1 ORDER BY end_time DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(day)
    }

    /// True if a day was already closed on the given calendar date.
    pub async fn closed_on_date_tx(
        &self,
        conn: &mut SqliteConnection,
        date: chrono::NaiveDate,
    ) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM business_days WHERE is_closed = 1 AND date(end_time) = ?1",
        )
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_one(conn)
        .await?;

        Ok(count > 0)
    }

    /// Seals a day inside an open transaction.
    pub async fn close_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        end_time: DateTime<Utc>,
        closed_by: Option<&str>,
    ) -> DbResult<()> {
        debug!(id, end = %end_time, "Closing business day");

        let result = sqlx::query(
            r#"
            UPDATE business_days SET
                is_closed = 1,
                end_time = ?2,
                closed_by = ?3
            WHERE id = ?1 AND is_closed = 0
            "#,
        )
        .bind(id)
        .bind(end_time)
        .bind(closed_by)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open business day", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
