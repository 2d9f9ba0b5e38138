//! # Pack Repository
//!
//! Database operations for packs and their component items.

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::{Pack, PackItem};

const COLUMNS: &str =
    "id, name, price_cents, discount_cents, is_active, created_at, updated_at, deleted_at";

/// Repository for pack database operations.
pub struct PackRepository;

impl PackRepository {
    /// Inserts a new pack.
    pub async fn insert(conn: &mut SqliteConnection, pack: &Pack) -> DbResult<()> {
        debug!(id = %pack.id, name = %pack.name, "Inserting pack");

        sqlx::query(
            r#"
            INSERT INTO packs (
                id, name, price_cents, discount_cents, is_active,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&pack.id)
        .bind(&pack.name)
        .bind(pack.price_cents)
        .bind(pack.discount_cents)
        .bind(pack.is_active)
        .bind(pack.created_at)
        .bind(pack.updated_at)
        .bind(pack.deleted_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Adds a component to a pack.
    pub async fn insert_item(conn: &mut SqliteConnection, item: &PackItem) -> DbResult<()> {
        debug!(pack_id = %item.pack_id, variant_id = %item.variant_id, "Adding pack item");

        sqlx::query(
            r#"
            INSERT INTO pack_items (id, pack_id, variant_id, qty_per_pack)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&item.id)
        .bind(&item.pack_id)
        .bind(&item.variant_id)
        .bind(item.qty_per_pack)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a pack by its ID (including inactive rows; callers inspect
    /// `is_active`).
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Pack>> {
        let pack = sqlx::query_as::<_, Pack>(&format!("SELECT {COLUMNS} FROM packs WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(pack)
    }

    /// Gets all component items of a pack.
    pub async fn items(conn: &mut SqliteConnection, pack_id: &str) -> DbResult<Vec<PackItem>> {
        let items = sqlx::query_as::<_, PackItem>(
            r#"
            SELECT id, pack_id, variant_id, qty_per_pack
            FROM pack_items
            WHERE pack_id = ?1
            ORDER BY variant_id
            "#,
        )
        .bind(pack_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Counts packs referencing a variant.
    ///
    /// ## Arguments
    /// * `only_active` - when true, only live packs count (deactivation
    ///   guard); when false, any pack counts (purge guard)
    pub async fn count_referencing_variant(
        conn: &mut SqliteConnection,
        variant_id: &str,
        only_active: bool,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM pack_items pi
            INNER JOIN packs p ON p.id = pi.pack_id
            WHERE pi.variant_id = ?1
              AND (?2 = 0 OR p.is_active = 1)
            "#,
        )
        .bind(variant_id)
        .bind(only_active)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }
}

/// Helper to generate a new pack ID.
pub fn generate_pack_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new pack item ID.
pub fn generate_pack_item_id() -> String {
    Uuid::new_v4().to_string()
}
