//! # Printer Repository
//!
//! Registry of station printers: one network address per station role.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cafe_core::{Printer, Station};

/// Repository for the station printer registry.
#[derive(Debug, Clone)]
pub struct PrinterRepository {
    pool: SqlitePool,
}

impl PrinterRepository {
    /// Creates a new PrinterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PrinterRepository { pool }
    }

    /// Registers or re-points the printer for a station.
    pub async fn upsert(&self, station: Station, address: &str) -> DbResult<Printer> {
        let now = Utc::now();

        debug!(station = station.as_str(), address, "Registering printer");

        sqlx::query(
            r#"
            INSERT INTO printers (id, station, address, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            ON CONFLICT (station) DO UPDATE SET
                address = excluded.address,
                is_active = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(station)
        .bind(address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_for_station(station)
            .await?
            .ok_or_else(|| DbError::not_found("Printer", station.as_str()))
    }

    /// Gets the active printer for a station.
    pub async fn get_for_station(&self, station: Station) -> DbResult<Option<Printer>> {
        let printer = sqlx::query_as::<_, Printer>(
            "SELECT * FROM printers WHERE station = ?1 AND is_active = 1",
        )
        .bind(station)
        .fetch_optional(&self.pool)
        .await?;

        Ok(printer)
    }

    /// Lists active printers.
    pub async fn list_active(&self) -> DbResult<Vec<Printer>> {
        let printers = sqlx::query_as::<_, Printer>(
            "SELECT * FROM printers WHERE is_active = 1 ORDER BY station",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(printers)
    }

    /// Takes a station's printer out of service.
    pub async fn deactivate(&self, station: Station) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE printers SET is_active = 0, updated_at = ?2 WHERE station = ?1 AND is_active = 1",
        )
        .bind(station)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Printer", station.as_str()));
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
    use cafe_core::Station;

    #[tokio::test]
    async fn test_upsert_repoints_address() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.printers();

        repo.upsert(Station::Kitchen, "192.168.1.50:9100")
            .await
            .unwrap();
        let printer = repo
            .upsert(Station::Kitchen, "192.168.1.60:9100")
            .await
            .unwrap();

        assert_eq!(printer.address, "192.168.1.60:9100");
        assert_eq!(repo.list_active().await.unwrap().len(), 1);
    }
}
