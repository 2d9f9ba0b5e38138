//! # Order Status Machine (engine half)
//!
//! Applies validated status transitions and audits the ones that actually
//! change state. The transition table itself lives in
//! [`sello_core::status`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use sello_core::movement::OperationCode;
use sello_core::{FieldChange, MovementKind, Order, OrderStatus};
use sello_db::repository::OrderRepository;

use crate::error::{EngineError, EngineResult};
use crate::recorder::{MovementDraft, MovementRecorder};

/// Order status transitions with audit movements.
pub struct OrderStatusMachine;

impl OrderStatusMachine {
    /// Moves an order to `new_status`.
    ///
    /// - Unknown status strings are rejected at the boundary (Validation).
    /// - Same-status is a no-op: the unchanged order is returned and NO
    ///   movement is recorded.
    /// - A disallowed transition is a Conflict.
    /// - An applied transition writes the order row and appends one
    ///   zero-quantity movement carrying the {status: {old, new}} map.
    pub async fn update_status(
        conn: &mut SqliteConnection,
        order_id: &str,
        new_status: &str,
        user_id: Option<&str>,
    ) -> EngineResult<Order> {
        let target = OrderStatus::from_str(new_status)?;

        let mut order = OrderRepository::get_by_id(conn, order_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Order", order_id))?;

        if order.status == target {
            return Ok(order);
        }

        if !order.status.can_transition(target) {
            return Err(EngineError::conflict(format!(
                "cannot transition order from {} to {}",
                order.status, target
            )));
        }

        let now = Utc::now();
        let changed = OrderRepository::set_status(conn, order_id, target, now).await?;
        if changed == 0 {
            return Err(EngineError::not_found("Order", order_id));
        }

        let mut changes: BTreeMap<String, FieldChange> = BTreeMap::new();
        changes.insert(
            "status".to_string(),
            FieldChange {
                old: order.status.to_string(),
                new: target.to_string(),
            },
        );

        MovementRecorder::append(
            conn,
            MovementDraft {
                order_id: Some(order_id.to_string()),
                user_id: user_id.map(str::to_string),
                changes: Some(changes),
                ..MovementDraft::for_op(OperationCode::StatusChange, MovementKind::Ajuste, 0)
            },
        )
        .await?;

        info!(
            order_id = %order_id,
            from = %order.status,
            to = %target,
            "Order status updated"
        );

        order.status = target;
        order.updated_at = now;

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{CustomerInfo, OrderLine, OrderPayload};
    use crate::testutil;
    use sello_db::repository::MovementRepository;

    async fn place_order(engine: &crate::Engine, variant_id: &str) -> Order {
        engine
            .create_order(
                OrderPayload {
                    items: vec![OrderLine {
                        variant_id: Some(variant_id.to_string()),
                        quantity: 1,
                        ..Default::default()
                    }],
                    customer: CustomerInfo {
                        email: Some("ana@example.com".to_string()),
                        ..Default::default()
                    },
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_transition_records_movement_with_changes() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        let updated = engine
            .update_order_status(&order.id, "processing", Some("ana"))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);

        let mut conn = engine.database().acquire().await.unwrap();
        let movements = MovementRepository::list_by_order(&mut conn, &order.id)
            .await
            .unwrap();
        // One sale movement from fulfillment + one status movement.
        let status_moves: Vec<_> = movements
            .iter()
            .filter(|m| m.op_slug == "status_change")
            .collect();
        assert_eq!(status_moves.len(), 1);
        assert_eq!(status_moves[0].quantity, 0);
        assert!(status_moves[0].variant_id.is_none());
        assert!(status_moves[0].item_name.is_none());

        let changes = status_moves[0].changes().unwrap().unwrap();
        let change = changes.get("status").unwrap();
        assert_eq!(change.old, "pending_payment");
        assert_eq!(change.new, "processing");
    }

    #[tokio::test]
    async fn test_same_status_is_silent_no_op() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        let mut conn = engine.database().acquire().await.unwrap();
        let before = MovementRepository::count(&mut conn).await.unwrap();
        drop(conn);

        let unchanged = engine
            .update_order_status(&order.id, "pending_payment", None)
            .await
            .unwrap();
        assert_eq!(unchanged.status, OrderStatus::PendingPayment);

        let mut conn = engine.database().acquire().await.unwrap();
        assert_eq!(MovementRepository::count(&mut conn).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_skipping_states_is_conflict() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        let err = engine
            .update_order_status(&order.id, "shipped", None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_unknown_status_is_validation() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        let err = engine
            .update_order_status(&order.id, "refunded", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_full_lifecycle_and_terminal_guard() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        for status in ["processing", "shipped", "completed"] {
            engine
                .update_order_status(&order.id, status, None)
                .await
                .unwrap();
        }

        let err = engine
            .update_order_status(&order.id, "cancelled", None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_cancel_from_non_terminal() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let order = place_order(&engine, &cat.mug_white).await;

        engine
            .update_order_status(&order.id, "processing", None)
            .await
            .unwrap();
        let cancelled = engine
            .update_order_status(&order.id, "cancelled", None)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let engine = testutil::engine().await;
        testutil::seed_catalog(&engine).await;

        let err = engine
            .update_order_status("nope", "processing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
