//! # Movement Repository
//!
//! Database operations for the append-only inventory ledger.
//!
//! ## Append-Only Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Ledger Append in One Transaction                        │
//! │                                                                         │
//! │  ENGINE OPERATION (e.g., adjust stock, fulfill order)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. UPDATE variants SET quantity = quantity + δ WHERE ...      │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO movements (kind, quantity, op_slug, snapshot)  │   │
//! │  │     VALUES ('salida', |δ|, 'sale', <frozen variant data>)      │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail (quantity change never            │
//! │           becomes visible without its audit row)                       │
//! │                                                                         │
//! │  There is NO update or delete path in this repository.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::{Movement, MovementKind};

const COLUMNS: &str = "id, kind, quantity, op_slug, op_code, reason, changes_json, item_name, \
                       color_name, size, price_cents, variant_id, user_id, order_id, \
                       created_at, deleted_at";

/// Filters for the movement listing.
///
/// All fields optional; `Default` is "everything".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    /// Inclusive lower bound on creation time.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<MovementKind>,
    pub variant_id: Option<String>,
    pub user_id: Option<String>,
    /// Operation catalog slug.
    pub op_slug: Option<String>,
}

/// Repository for movement database operations.
pub struct MovementRepository;

impl MovementRepository {
    /// Appends a movement row.
    ///
    /// The only write this repository offers; rows are never touched again.
    pub async fn insert(conn: &mut SqliteConnection, movement: &Movement) -> DbResult<()> {
        debug!(
            id = %movement.id,
            kind = %movement.kind,
            op = %movement.op_slug,
            quantity = %movement.quantity,
            "Appending movement"
        );

        sqlx::query(
            r#"
            INSERT INTO movements (
                id, kind, quantity, op_slug, op_code, reason, changes_json,
                item_name, color_name, size, price_cents,
                variant_id, user_id, order_id, created_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&movement.id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(&movement.op_slug)
        .bind(&movement.op_code)
        .bind(&movement.reason)
        .bind(&movement.changes_json)
        .bind(&movement.item_name)
        .bind(&movement.color_name)
        .bind(&movement.size)
        .bind(movement.price_cents)
        .bind(&movement.variant_id)
        .bind(&movement.user_id)
        .bind(&movement.order_id)
        .bind(movement.created_at)
        .bind(movement.deleted_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Lists movements matching a filter, newest first.
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &MovementFilter,
    ) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            r#"
            SELECT {COLUMNS} FROM movements
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at <= ?2)
              AND (?3 IS NULL OR kind = ?3)
              AND (?4 IS NULL OR variant_id = ?4)
              AND (?5 IS NULL OR user_id = ?5)
              AND (?6 IS NULL OR op_slug = ?6)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.kind)
        .bind(&filter.variant_id)
        .bind(&filter.user_id)
        .bind(&filter.op_slug)
        .fetch_all(&mut *conn)
        .await?;

        Ok(movements)
    }

    /// Gets all movements recorded for an order.
    pub async fn list_by_order(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            r#"
            SELECT {COLUMNS} FROM movements
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(movements)
    }

    /// Counts all movements (for diagnostics and tests).
    pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movements")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new movement ID.
pub fn generate_movement_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
