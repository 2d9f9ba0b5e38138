//! # Product Type Repository
//!
//! Database operations for product types (the stampable catalog entries).

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::ProductType;

const COLUMNS: &str = "id, name, category, sized, stamping_prices_json, image_url, \
                       is_active, created_at, updated_at, deleted_at";

/// Repository for product type database operations.
pub struct ProductTypeRepository;

impl ProductTypeRepository {
    /// Inserts a new product type.
    pub async fn insert(conn: &mut SqliteConnection, pt: &ProductType) -> DbResult<()> {
        debug!(id = %pt.id, name = %pt.name, "Inserting product type");

        sqlx::query(
            r#"
            INSERT INTO product_types (
                id, name, category, sized, stamping_prices_json, image_url,
                is_active, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&pt.id)
        .bind(&pt.name)
        .bind(pt.category)
        .bind(pt.sized)
        .bind(&pt.stamping_prices_json)
        .bind(&pt.image_url)
        .bind(pt.is_active)
        .bind(pt.created_at)
        .bind(pt.updated_at)
        .bind(pt.deleted_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a product type by its ID (including soft-deleted rows; callers
    /// inspect `is_active`).
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<ProductType>> {
        let pt = sqlx::query_as::<_, ProductType>(&format!(
            "SELECT {COLUMNS} FROM product_types WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(pt)
    }

    /// Soft-deletes a product type.
    ///
    /// ## Returns
    /// Number of rows changed (0 when already inactive or missing).
    pub async fn deactivate(
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, "Deactivating product type");

        let result = sqlx::query(
            r#"
            UPDATE product_types
            SET is_active = 0, deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Restores a soft-deleted product type.
    ///
    /// ## Returns
    /// Number of rows changed (0 when already active or missing).
    pub async fn restore(
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, "Restoring product type");

        let result = sqlx::query(
            r#"
            UPDATE product_types
            SET is_active = 1, deleted_at = NULL, updated_at = ?2
            WHERE id = ?1 AND is_active = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts live product types (for diagnostics).
    pub async fn count_active(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product_types WHERE is_active = 1")
                .fetch_one(&mut *conn)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new product type ID.
pub fn generate_product_type_id() -> String {
    Uuid::new_v4().to_string()
}
