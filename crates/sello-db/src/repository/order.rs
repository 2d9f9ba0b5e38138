//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Snapshot Pattern
//! Order items copy name and unit price at order time. Catalog edits after
//! the fact never change what the customer agreed to pay.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use sello_core::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, subtotal_cents, shipping_cents, total_cents, user_id, \
                             guest_name, guest_email, ship_address, ship_city, ship_postal, \
                             ship_country, status, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, variant_id, pack_id, quantity, unit_price_cents, \
                            name_snapshot, stamp_image_url, stamp_instructions, created_at";

/// Repository for order database operations.
pub struct OrderRepository;

impl OrderRepository {
    /// Inserts an order.
    pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = %order.total_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, subtotal_cents, shipping_cents, total_cents, user_id,
                guest_name, guest_email, ship_address, ship_city, ship_postal,
                ship_country, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.total_cents)
        .bind(&order.user_id)
        .bind(&order.guest_name)
        .bind(&order.guest_email)
        .bind(&order.ship_address)
        .bind(&order.ship_city)
        .bind(&order.ship_postal)
        .bind(&order.ship_country)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts an order item.
    pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
        debug!(order_id = %item.order_id, name = %item.name_snapshot, "Inserting order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, variant_id, pack_id, quantity, unit_price_cents,
                name_snapshot, stamp_image_url, stamp_instructions, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.variant_id)
        .bind(&item.pack_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(&item.name_snapshot)
        .bind(&item.stamp_image_url)
        .bind(&item.stamp_instructions)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let order =
            sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(order)
    }

    /// Gets all items for an order.
    pub async fn items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Updates the order status.
    ///
    /// ## Returns
    /// Number of rows changed (0 when the order is missing).
    pub async fn set_status(
        conn: &mut SqliteConnection,
        id: &str,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> DbResult<u64> {
        debug!(id = %id, status = %status, "Updating order status");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}
