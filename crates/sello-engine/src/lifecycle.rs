//! # Lifecycle Manager
//!
//! Cascades deactivation/reactivation between a product type and its
//! variants.
//!
//! ## The Cascade Distinction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              deactivate_type / restore_type                             │
//! │                                                                         │
//! │  Before:   v1 (manually deactivated)   v2 (active)   v3 (active)       │
//! │                                                                         │
//! │  deactivate_type:                                                       │
//! │    v1 untouched (already inactive, keeps NO parent flag)               │
//! │    v2, v3 deactivated + flagged deactivated_by_parent                  │
//! │    type deactivated                                                     │
//! │                                                                         │
//! │  restore_type:                                                          │
//! │    type restored                                                        │
//! │    v2, v3 restored (flag cleared) ← only the cascade victims           │
//! │    v1 STAYS inactive ← its deactivation was a deliberate admin act     │
//! │                                                                         │
//! │  All inside one transaction per direction.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::info;

use sello_core::movement::OperationCode;
use sello_core::MovementKind;
use sello_db::repository::{ProductTypeRepository, VariantRepository};

use crate::error::{EngineError, EngineResult};
use crate::recorder::{load_snapshot, MovementDraft, MovementRecorder};

/// Confirmation returned by a type-level lifecycle change.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReceipt {
    pub product_type_id: String,
    /// Variants the cascade touched.
    pub variants_affected: usize,
}

/// Cascading type deactivation/reactivation.
pub struct LifecycleManager;

impl LifecycleManager {
    /// Deactivates a product type and all of its currently-active variants.
    ///
    /// Cascade victims are flagged `deactivated_by_parent`; variants that
    /// were already inactive are left untouched so a later restore puts
    /// back exactly what this call took down.
    pub async fn deactivate_type(
        conn: &mut SqliteConnection,
        type_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<LifecycleReceipt> {
        let product_type = ProductTypeRepository::get_by_id(conn, type_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ProductType", type_id))?;
        if !product_type.is_active {
            return Err(EngineError::conflict(format!(
                "product type {type_id} is already inactive"
            )));
        }

        let active_variants = VariantRepository::list_active_by_type(conn, type_id).await?;
        let now = Utc::now();

        for variant in &active_variants {
            let snapshot = load_snapshot(conn, variant).await?;
            VariantRepository::deactivate(conn, &variant.id, true, now).await?;

            MovementRecorder::append(
                conn,
                MovementDraft {
                    snapshot: Some(snapshot),
                    variant_id: Some(variant.id.clone()),
                    user_id: user_id.map(str::to_string),
                    reason: Some(format!("baja en cascada de {}", product_type.name)),
                    ..MovementDraft::for_op(OperationCode::Deactivation, MovementKind::Ajuste, 0)
                },
            )
            .await?;
        }

        let changed = ProductTypeRepository::deactivate(conn, type_id, now).await?;
        if changed == 0 {
            return Err(EngineError::conflict(format!(
                "product type {type_id} is already inactive"
            )));
        }

        info!(
            type_id = %type_id,
            variants = active_variants.len(),
            "Product type deactivated"
        );

        Ok(LifecycleReceipt {
            product_type_id: type_id.to_string(),
            variants_affected: active_variants.len(),
        })
    }

    /// Restores a product type and only its cascade-deactivated variants.
    ///
    /// Manually deactivated variants keep their state; restoring them is a
    /// separate deliberate act.
    pub async fn restore_type(
        conn: &mut SqliteConnection,
        type_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<LifecycleReceipt> {
        let product_type = ProductTypeRepository::get_by_id(conn, type_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ProductType", type_id))?;
        if product_type.is_active {
            return Err(EngineError::conflict(format!(
                "product type {type_id} is already active"
            )));
        }

        let now = Utc::now();
        ProductTypeRepository::restore(conn, type_id, now).await?;

        let flagged = VariantRepository::list_parent_flagged(conn, type_id).await?;
        for variant in &flagged {
            VariantRepository::restore(conn, &variant.id, now).await?;

            let mut restored = variant.clone();
            restored.is_active = true;
            restored.deactivated_by_parent = false;
            restored.deleted_at = None;

            let snapshot = load_snapshot(conn, &restored).await?;
            MovementRecorder::append(
                conn,
                MovementDraft {
                    snapshot: Some(snapshot),
                    variant_id: Some(variant.id.clone()),
                    user_id: user_id.map(str::to_string),
                    reason: Some(format!("alta en cascada de {}", product_type.name)),
                    ..MovementDraft::for_op(OperationCode::Restore, MovementKind::Ajuste, 0)
                },
            )
            .await?;
        }

        info!(
            type_id = %type_id,
            variants = flagged.len(),
            "Product type restored"
        );

        Ok(LifecycleReceipt {
            product_type_id: type_id.to_string(),
            variants_affected: flagged.len(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StockLedger;
    use crate::testutil;
    use sello_db::repository::MovementRepository;
    use sello_db::MovementFilter;

    #[tokio::test]
    async fn test_cascade_flags_only_active_variants() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        // Second shirt variant, manually deactivated beforehand.
        let manual = testutil::insert_variant(
            &mut conn,
            "v-shirt-white-m",
            &cat.shirt_type,
            &cat.white,
            Some("M"),
            12,
        )
        .await;
        StockLedger::deactivate(&mut conn, &manual, None).await.unwrap();

        let receipt = LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, Some("ana"))
            .await
            .unwrap();
        // Only the still-active shirt was cascaded.
        assert_eq!(receipt.variants_affected, 1);

        let cascaded = VariantRepository::get_by_id(&mut conn, &cat.shirt_navy_m)
            .await
            .unwrap()
            .unwrap();
        assert!(!cascaded.is_active);
        assert!(cascaded.deactivated_by_parent);

        let manual_row = VariantRepository::get_by_id(&mut conn, &manual)
            .await
            .unwrap()
            .unwrap();
        assert!(!manual_row.is_active);
        assert!(!manual_row.deactivated_by_parent);
    }

    #[tokio::test]
    async fn test_restore_revives_only_cascade_victims() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let manual = testutil::insert_variant(
            &mut conn,
            "v-shirt-white-m",
            &cat.shirt_type,
            &cat.white,
            Some("M"),
            12,
        )
        .await;
        StockLedger::deactivate(&mut conn, &manual, None).await.unwrap();

        LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap();
        let receipt = LifecycleManager::restore_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap();
        assert_eq!(receipt.variants_affected, 1);

        let cascaded = VariantRepository::get_by_id(&mut conn, &cat.shirt_navy_m)
            .await
            .unwrap()
            .unwrap();
        assert!(cascaded.is_active);
        assert!(!cascaded.deactivated_by_parent);

        // The manual deactivation survives the round trip.
        let manual_row = VariantRepository::get_by_id(&mut conn, &manual)
            .await
            .unwrap()
            .unwrap();
        assert!(!manual_row.is_active);
    }

    #[tokio::test]
    async fn test_lifecycle_guards() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = LifecycleManager::restore_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap();
        let err = LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = LifecycleManager::deactivate_type(&mut conn, "nope", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cascade_records_movements() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, Some("ana"))
            .await
            .unwrap();
        LifecycleManager::restore_type(&mut conn, &cat.shirt_type, Some("ana"))
            .await
            .unwrap();

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(cat.shirt_navy_m.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 2);
        assert!(movements.iter().all(|m| m.quantity == 0));
        assert!(movements
            .iter()
            .any(|m| m.reason == "baja en cascada de Camiseta Básica"));
        assert!(movements
            .iter()
            .any(|m| m.reason == "alta en cascada de Camiseta Básica"));
    }

    #[tokio::test]
    async fn test_child_restore_blocked_while_parent_inactive() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        LifecycleManager::deactivate_type(&mut conn, &cat.shirt_type, None)
            .await
            .unwrap();

        let err = StockLedger::restore(&mut conn, &cat.shirt_navy_m, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
