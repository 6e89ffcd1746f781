//! # Catalog Repository
//!
//! Database operations for categories and products.
//!
//! ## Category Tree
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One-level hierarchy stored flat with parent_id:                       │
//! │                                                                         │
//! │  drinks (root) ──► hot drinks, fresh juices (leaves)                   │
//! │  food   (root) ──► sandwiches, desserts                                │
//! │  shisha (root)                                                          │
//! │                                                                         │
//! │  Products join categories M2M; the station map and the group-wise      │
//! │  report sections are both derived from this table.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cafe_core::{Category, Product, StationMap};

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // ===== Categories =====

    /// Creates a category. Pass `parent_id` to create a subcategory.
    pub async fn create_category(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %category.id, name, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, parent_id, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.parent_id)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories (active and not), roots first.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY parent_id IS NOT NULL, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Builds the category → station routing map from the current tree.
    pub async fn station_map(&self) -> DbResult<StationMap> {
        let categories = self.list_categories().await?;
        Ok(StationMap::build(&categories))
    }

    // ===== Products =====

    /// Creates a product and attaches it to the given categories.
    pub async fn create_product(
        &self,
        name: &str,
        name_ar: Option<&str>,
        price_cents: i64,
        category_ids: &[String],
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            name_ar: name_ar.map(str::to_string),
            price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        };

        debug!(id = %product.id, name, price_cents, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, name_ar, price_cents, is_active,
                created_at, updated_at, created_by, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.name_ar)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(&product.created_by)
        .bind(&product.updated_by)
        .execute(&mut *tx)
        .await?;

        for category_id in category_ids {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id) VALUES (?1, ?2)",
            )
            .bind(&product.id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product inside an open transaction.
    pub async fn get_product_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Lists active products ordered by name.
    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's name, Arabic name and price.
    pub async fn update_product(
        &self,
        id: &str,
        name: &str,
        name_ar: Option<&str>,
        price_cents: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                name_ar = ?3,
                price_cents = ?4,
                updated_at = ?5
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(name_ar)
        .bind(price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Takes a product off the menu (soft delete).
    pub async fn deactivate_product(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Category ids attached to a product, inside an open transaction.
    pub async fn product_category_ids_tx(
        &self,
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT category_id FROM product_categories WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_all(conn)
        .await?;

        Ok(ids)
    }

    /// Category ids attached to a product.
    pub async fn product_category_ids(&self, product_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT category_id FROM product_categories WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
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
    async fn test_product_with_categories() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let drinks = catalog.create_category("drinks", None).await.unwrap();
        let hot = catalog
            .create_category("hot drinks", Some(&drinks.id))
            .await
            .unwrap();

        let product = catalog
            .create_product("Espresso", Some("اسبريسو"), 1000, &[hot.id.clone()])
            .await
            .unwrap();

        let fetched = catalog.get_product(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Espresso");
        assert_eq!(fetched.price_cents, 1000);

        let category_ids = catalog.product_category_ids(&product.id).await.unwrap();
        assert_eq!(category_ids, vec![hot.id]);
    }

    #[tokio::test]
    async fn test_station_map_from_tree() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        let drinks = catalog.create_category("drinks", None).await.unwrap();
        let juices = catalog
            .create_category("fresh juices", Some(&drinks.id))
            .await
            .unwrap();
        catalog.create_category("food", None).await.unwrap();

        let map = catalog.station_map().await.unwrap();
        assert_eq!(map.station_for_category(&juices.id), Some(Station::Barista));
    }
}
