//! # Variant Repository
//!
//! Database operations for variants (purchasable SKUs).
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, decide, write absolute value                          │
//! │     SELECT quantity ...          ← another writer commits in between   │
//! │     UPDATE ... SET quantity = 7  ← lost update / negative stock        │
//! │                                                                         │
//! │  ✅ CORRECT: guarded relative update                                   │
//! │     UPDATE variants                                                     │
//! │     SET quantity = quantity + :delta                                    │
//! │     WHERE id = :id AND is_active = 1 AND quantity + :delta >= 0        │
//! │                                                                         │
//! │  The guard re-evaluates under SQLite's write lock, so the              │
//! │  non-negativity invariant holds for ANY interleaving of concurrent     │
//! │  transactions. Zero rows affected = the guard failed = Conflict.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::Variant;

const COLUMNS: &str = "id, product_type_id, color_id, size, quantity, min_stock, price_cents, \
                       is_active, deactivated_by_parent, created_at, updated_at, deleted_at";

/// Repository for variant database operations.
pub struct VariantRepository;

impl VariantRepository {
    /// Inserts a new variant.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - live (type, color, size) triple
    ///   already exists
    pub async fn insert(conn: &mut SqliteConnection, variant: &Variant) -> DbResult<()> {
        debug!(id = %variant.id, type_id = %variant.product_type_id, "Inserting variant");

        sqlx::query(
            r#"
            INSERT INTO variants (
                id, product_type_id, color_id, size, quantity, min_stock,
                price_cents, is_active, deactivated_by_parent,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_type_id)
        .bind(&variant.color_id)
        .bind(&variant.size)
        .bind(variant.quantity)
        .bind(variant.min_stock)
        .bind(variant.price_cents)
        .bind(variant.is_active)
        .bind(variant.deactivated_by_parent)
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .bind(variant.deleted_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets a variant by its ID (including inactive and soft-deleted rows;
    /// callers inspect the flags).
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Variant>> {
        let variant =
            sqlx::query_as::<_, Variant>(&format!("SELECT {COLUMNS} FROM variants WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(variant)
    }

    /// Finds the live variant with the given (type, color, size) triple.
    ///
    /// NULL sizes collapse to `''` so (type, color, NULL) is a single slot,
    /// matching the partial unique index.
    pub async fn find_live_triple(
        conn: &mut SqliteConnection,
        product_type_id: &str,
        color_id: &str,
        size: Option<&str>,
    ) -> DbResult<Option<Variant>> {
        let variant = sqlx::query_as::<_, Variant>(&format!(
            r#"
            SELECT {COLUMNS} FROM variants
            WHERE product_type_id = ?1
              AND color_id = ?2
              AND COALESCE(size, '') = COALESCE(?3, '')
              AND deleted_at IS NULL
            "#
        ))
        .bind(product_type_id)
        .bind(color_id)
        .bind(size)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(variant)
    }

    /// Applies a quantity delta with the non-negativity guard.
    ///
    /// ## Returns
    /// Number of rows changed: 1 on success, 0 when the variant is missing,
    /// inactive, or the delta would drive quantity negative. The caller
    /// distinguishes those cases with a follow-up read and returns the
    /// appropriate typed error.
    ///
    /// ## Arguments
    /// * `delta` - Change in stock (negative for sales, positive for restocking)
    pub async fn apply_delta(
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, delta = %delta, "Applying stock delta");

        let result = sqlx::query(
            r#"
            UPDATE variants
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1
              AND is_active = 1
              AND deleted_at IS NULL
              AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Updates the editable fields (price, min stock).
    pub async fn update_editable(
        conn: &mut SqliteConnection,
        id: &str,
        price_cents: i64,
        min_stock: i64,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, "Updating variant fields");

        let result = sqlx::query(
            r#"
            UPDATE variants
            SET price_cents = ?2, min_stock = ?3, updated_at = ?4
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(min_stock)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Soft-deletes a variant.
    ///
    /// ## Arguments
    /// * `by_parent` - true when the deactivation cascades from the parent
    ///   type; the flag is what makes a later parent restore selective
    pub async fn deactivate(
        conn: &mut SqliteConnection,
        id: &str,
        by_parent: bool,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, by_parent = %by_parent, "Deactivating variant");

        let result = sqlx::query(
            r#"
            UPDATE variants
            SET is_active = 0, deactivated_by_parent = ?2, deleted_at = ?3, updated_at = ?3
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(by_parent)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Restores a soft-deleted variant, clearing the parent flag.
    pub async fn restore(
        conn: &mut SqliteConnection,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, "Restoring variant");

        let result = sqlx::query(
            r#"
            UPDATE variants
            SET is_active = 1, deactivated_by_parent = 0, deleted_at = NULL, updated_at = ?2
            WHERE id = ?1 AND is_active = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Hard-deletes a variant row (purge).
    ///
    /// Movements referencing it keep their snapshot; their `variant_id`
    /// becomes NULL via the foreign key's ON DELETE SET NULL.
    pub async fn hard_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Hard-deleting variant");

        let result = sqlx::query("DELETE FROM variants WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists the currently active variants of a product type.
    pub async fn list_active_by_type(
        conn: &mut SqliteConnection,
        product_type_id: &str,
    ) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(&format!(
            r#"
            SELECT {COLUMNS} FROM variants
            WHERE product_type_id = ?1 AND is_active = 1 AND deleted_at IS NULL
            ORDER BY id
            "#
        ))
        .bind(product_type_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(variants)
    }

    /// Lists a type's variants that were deactivated by the parent cascade.
    pub async fn list_parent_flagged(
        conn: &mut SqliteConnection,
        product_type_id: &str,
    ) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(&format!(
            r#"
            SELECT {COLUMNS} FROM variants
            WHERE product_type_id = ?1 AND is_active = 0 AND deactivated_by_parent = 1
            ORDER BY id
            "#
        ))
        .bind(product_type_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(variants)
    }

    /// Lists live variants at or below their minimum-stock threshold.
    pub async fn list_low_stock(conn: &mut SqliteConnection) -> DbResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(&format!(
            r#"
            SELECT {COLUMNS} FROM variants
            WHERE is_active = 1 AND deleted_at IS NULL AND quantity <= min_stock
            ORDER BY quantity ASC, id
            "#
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(variants)
    }
}

/// Helper to generate a new variant ID.
pub fn generate_variant_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
