//! # Stock Ledger
//!
//! Owns per-variant quantity state. Every quantity change goes through
//! [`StockLedger::adjust`], which pairs the guarded update with exactly one
//! movement inside the caller's transaction.
//!
//! ## The Adjustment Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 StockLedger::adjust(variant, δ)                         │
//! │                                                                         │
//! │  1. Load variant           → NotFound if absent                        │
//! │                            → Conflict if inactive                      │
//! │  2. Check quantity + δ ≥ 0 → InsufficientStock otherwise               │
//! │  3. Guarded UPDATE         quantity = quantity + δ                     │
//! │     WHERE ... quantity + δ >= 0                                        │
//! │     └── 0 rows = a concurrent writer took the stock first →            │
//! │         InsufficientStock (the guard re-checks under the write lock)   │
//! │  4. Append movement        kind = sign(δ), quantity = |δ|              │
//! │                                                                         │
//! │  One row update + one movement insert, atomically with the caller's   │
//! │  transaction. A plain read-then-write would race; the guard is the     │
//! │  serialization point.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::info;

use sello_core::movement::OperationCode;
use sello_core::validation::{validate_delta, validate_price_cents, validate_reason, validate_size};
use sello_core::{FieldChange, MovementKind, ValidationError, Variant};
use sello_db::repository::variant::generate_variant_id;
use sello_db::repository::{ColorRepository, PackRepository, ProductTypeRepository, VariantRepository};

use crate::error::{EngineError, EngineResult};
use crate::recorder::{load_snapshot, MovementDraft, MovementRecorder, Snapshot};

// =============================================================================
// Input Types
// =============================================================================

/// Specification for a new variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariant {
    pub product_type_id: String,
    pub color_id: String,
    /// Required when the product type is sized, forbidden otherwise.
    pub size: Option<String>,
    pub initial_quantity: i64,
    /// Falls back to the category default when absent.
    pub min_stock: Option<i64>,
    pub price_cents: i64,
}

/// Editable variant fields; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub price_cents: Option<i64>,
    pub min_stock: Option<i64>,
}

/// Confirmation returned by a purge.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeReceipt {
    pub variant_id: String,
    /// Display name preserved in the final movement's snapshot.
    pub item_name: String,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Atomic stock adjustment primitives.
pub struct StockLedger;

impl StockLedger {
    /// Applies a quantity delta to a variant and records the movement.
    ///
    /// ## Arguments
    /// * `delta` - signed change; negative for sales/waste, positive for
    ///   restocking. Zero is rejected (metadata edits go through
    ///   [`StockLedger::update_variant`]).
    /// * `op` - the catalog operation classifying the change
    /// * `reason` - overrides the catalog's default reason
    /// * `order_id` - set when the adjustment belongs to an order
    ///
    /// ## Returns
    /// The variant with its new quantity.
    pub async fn adjust(
        conn: &mut SqliteConnection,
        variant_id: &str,
        delta: i64,
        user_id: Option<&str>,
        op: OperationCode,
        reason: Option<String>,
        order_id: Option<&str>,
    ) -> EngineResult<Variant> {
        validate_delta(delta)?;
        if let Some(reason) = &reason {
            validate_reason(reason)?;
        }

        let mut variant = VariantRepository::get_by_id(conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))?;

        if !variant.is_active {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is inactive"
            )));
        }

        if variant.quantity + delta < 0 {
            return Err(EngineError::InsufficientStock {
                variant_id: variant_id.to_string(),
                available: variant.quantity,
                requested: delta.abs(),
            });
        }

        let snapshot = load_snapshot(conn, &variant).await?;

        let now = Utc::now();
        let changed = VariantRepository::apply_delta(conn, variant_id, delta, now).await?;
        if changed == 0 {
            // The guard failed under the write lock: a concurrent writer
            // took the stock between our read and this statement.
            let available = VariantRepository::get_by_id(conn, variant_id)
                .await?
                .map(|v| v.quantity)
                .unwrap_or(0);
            return Err(EngineError::InsufficientStock {
                variant_id: variant_id.to_string(),
                available,
                requested: delta.abs(),
            });
        }

        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(snapshot),
                variant_id: Some(variant_id.to_string()),
                user_id: user_id.map(str::to_string),
                order_id: order_id.map(str::to_string),
                reason,
                ..MovementDraft::for_op(op, MovementKind::from_delta(delta), delta.abs())
            },
        )
        .await?;

        variant.quantity += delta;
        variant.updated_at = now;

        info!(
            variant_id = %variant_id,
            delta = %delta,
            quantity = %variant.quantity,
            op = %op,
            "Stock adjusted"
        );

        Ok(variant)
    }

    /// Creates a variant and records its opening stock.
    ///
    /// ## Validation
    /// - the (type, color, size) triple must be unique among live variants
    /// - size presence must agree with the type's `sized` flag
    /// - min_stock falls back to the category default
    pub async fn create_variant(
        conn: &mut SqliteConnection,
        spec: NewVariant,
        user_id: Option<&str>,
    ) -> EngineResult<Variant> {
        validate_price_cents("price_cents", spec.price_cents)?;
        if spec.initial_quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: "initial_quantity".to_string(),
            }
            .into());
        }
        if let Some(size) = &spec.size {
            validate_size(size)?;
        }

        let product_type = ProductTypeRepository::get_by_id(conn, &spec.product_type_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ProductType", &spec.product_type_id))?;
        if !product_type.is_active {
            return Err(EngineError::conflict(format!(
                "product type {} is inactive",
                product_type.id
            )));
        }

        if product_type.sized != spec.size.is_some() {
            let reason = if product_type.sized {
                "required for sized product types"
            } else {
                "not allowed for unsized product types"
            };
            return Err(ValidationError::InvalidFormat {
                field: "size".to_string(),
                reason: reason.to_string(),
            }
            .into());
        }

        let color = ColorRepository::get_by_id(conn, &spec.color_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Color", &spec.color_id))?;

        if VariantRepository::find_live_triple(
            conn,
            &spec.product_type_id,
            &spec.color_id,
            spec.size.as_deref(),
        )
        .await?
        .is_some()
        {
            return Err(EngineError::conflict(format!(
                "variant already exists for {} / {} / {}",
                product_type.name,
                color.name,
                spec.size.as_deref().unwrap_or("-")
            )));
        }

        let now = Utc::now();
        let variant = Variant {
            id: generate_variant_id(),
            product_type_id: spec.product_type_id,
            color_id: spec.color_id,
            size: spec.size,
            quantity: spec.initial_quantity,
            min_stock: spec
                .min_stock
                .unwrap_or_else(|| product_type.category.default_min_stock()),
            price_cents: spec.price_cents,
            is_active: true,
            deactivated_by_parent: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        VariantRepository::insert(conn, &variant).await?;

        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(Snapshot::of(&variant, &product_type, &color)),
                variant_id: Some(variant.id.clone()),
                user_id: user_id.map(str::to_string),
                ..MovementDraft::for_op(
                    OperationCode::InitialLoad,
                    MovementKind::from_delta(variant.quantity),
                    variant.quantity,
                )
            },
        )
        .await?;

        info!(variant_id = %variant.id, quantity = %variant.quantity, "Variant created");

        Ok(variant)
    }

    /// Edits price and/or min stock, recording a zero-quantity movement
    /// with the field-level old/new map.
    ///
    /// A no-op update (same values) returns the variant without recording
    /// anything.
    pub async fn update_variant(
        conn: &mut SqliteConnection,
        variant_id: &str,
        update: VariantUpdate,
        user_id: Option<&str>,
    ) -> EngineResult<Variant> {
        if update.price_cents.is_none() && update.min_stock.is_none() {
            return Err(ValidationError::Required {
                field: "changes".to_string(),
            }
            .into());
        }
        if let Some(price) = update.price_cents {
            validate_price_cents("price_cents", price)?;
        }

        let mut variant = VariantRepository::get_by_id(conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))?;
        if !variant.is_active {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is inactive"
            )));
        }

        let mut changes: BTreeMap<String, FieldChange> = BTreeMap::new();
        let new_price = update.price_cents.unwrap_or(variant.price_cents);
        let new_min_stock = update.min_stock.unwrap_or(variant.min_stock);

        if new_price != variant.price_cents {
            changes.insert(
                "price_cents".to_string(),
                FieldChange {
                    old: variant.price_cents.to_string(),
                    new: new_price.to_string(),
                },
            );
        }
        if new_min_stock != variant.min_stock {
            changes.insert(
                "min_stock".to_string(),
                FieldChange {
                    old: variant.min_stock.to_string(),
                    new: new_min_stock.to_string(),
                },
            );
        }

        if changes.is_empty() {
            return Ok(variant);
        }

        let op = match (
            changes.contains_key("price_cents"),
            changes.contains_key("min_stock"),
        ) {
            (true, false) => OperationCode::PriceChange,
            (false, true) => OperationCode::MinStockChange,
            _ => OperationCode::InfoChange,
        };

        let now = Utc::now();
        VariantRepository::update_editable(conn, variant_id, new_price, new_min_stock, now).await?;

        variant.price_cents = new_price;
        variant.min_stock = new_min_stock;
        variant.updated_at = now;

        // Snapshot reflects the state at movement time, i.e. the new price.
        let snapshot = load_snapshot(conn, &variant).await?;
        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(snapshot),
                variant_id: Some(variant_id.to_string()),
                user_id: user_id.map(str::to_string),
                changes: Some(changes),
                ..MovementDraft::for_op(op, MovementKind::Ajuste, 0)
            },
        )
        .await?;

        info!(variant_id = %variant_id, op = %op, "Variant updated");

        Ok(variant)
    }

    /// Soft-deletes a variant.
    ///
    /// Rejected while any ACTIVE pack references the variant; admins must
    /// retire the pack first.
    pub async fn deactivate(
        conn: &mut SqliteConnection,
        variant_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<Variant> {
        let mut variant = VariantRepository::get_by_id(conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))?;
        if !variant.is_active {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is already inactive"
            )));
        }

        let referencing =
            PackRepository::count_referencing_variant(conn, variant_id, true).await?;
        if referencing > 0 {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is referenced by {referencing} active pack(s)"
            )));
        }

        let snapshot = load_snapshot(conn, &variant).await?;

        let now = Utc::now();
        VariantRepository::deactivate(conn, variant_id, false, now).await?;

        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(snapshot),
                variant_id: Some(variant_id.to_string()),
                user_id: user_id.map(str::to_string),
                ..MovementDraft::for_op(OperationCode::Deactivation, MovementKind::Ajuste, 0)
            },
        )
        .await?;

        variant.is_active = false;
        variant.deleted_at = Some(now);
        variant.updated_at = now;

        info!(variant_id = %variant_id, "Variant deactivated");

        Ok(variant)
    }

    /// Restores a soft-deleted variant.
    ///
    /// A child of an inactive product type cannot be restored; restore the
    /// type instead.
    pub async fn restore(
        conn: &mut SqliteConnection,
        variant_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<Variant> {
        let mut variant = VariantRepository::get_by_id(conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))?;
        if variant.is_active {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is already active"
            )));
        }

        let product_type = ProductTypeRepository::get_by_id(conn, &variant.product_type_id)
            .await?
            .ok_or_else(|| EngineError::not_found("ProductType", &variant.product_type_id))?;
        if !product_type.is_active {
            return Err(EngineError::conflict(format!(
                "cannot restore variant {variant_id}: parent product type is inactive"
            )));
        }

        let now = Utc::now();
        VariantRepository::restore(conn, variant_id, now).await?;

        variant.is_active = true;
        variant.deactivated_by_parent = false;
        variant.deleted_at = None;
        variant.updated_at = now;

        let snapshot = load_snapshot(conn, &variant).await?;
        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(snapshot),
                variant_id: Some(variant_id.to_string()),
                user_id: user_id.map(str::to_string),
                ..MovementDraft::for_op(OperationCode::Restore, MovementKind::Ajuste, 0)
            },
        )
        .await?;

        info!(variant_id = %variant_id, "Variant restored");

        Ok(variant)
    }

    /// Hard-deletes a variant, preserving its history.
    ///
    /// The final movement is recorded with a null variant reference and the
    /// full snapshot BEFORE the row disappears; earlier movements keep
    /// their snapshots and lose only the foreign key (ON DELETE SET NULL).
    pub async fn purge(
        conn: &mut SqliteConnection,
        variant_id: &str,
        user_id: Option<&str>,
    ) -> EngineResult<PurgeReceipt> {
        let variant = VariantRepository::get_by_id(conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))?;

        let referencing =
            PackRepository::count_referencing_variant(conn, variant_id, false).await?;
        if referencing > 0 {
            return Err(EngineError::conflict(format!(
                "variant {variant_id} is referenced by {referencing} pack(s)"
            )));
        }

        let snapshot = load_snapshot(conn, &variant).await?;
        let item_name = snapshot.item_name.clone();

        MovementRecorder::append(
            conn,
            MovementDraft {
                snapshot: Some(snapshot),
                // Deliberately null: the row is about to disappear.
                variant_id: None,
                user_id: user_id.map(str::to_string),
                ..MovementDraft::for_op(OperationCode::Purge, MovementKind::Ajuste, 0)
            },
        )
        .await?;

        let deleted = VariantRepository::hard_delete(conn, variant_id).await?;
        if deleted == 0 {
            return Err(EngineError::not_found("Variant", variant_id));
        }

        info!(variant_id = %variant_id, "Variant purged");

        Ok(PurgeReceipt {
            variant_id: variant_id.to_string(),
            item_name,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use sello_db::repository::MovementRepository;
    use sello_db::MovementFilter;

    #[tokio::test]
    async fn test_adjust_decrements_and_records_salida() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::adjust(
            &mut conn,
            &cat.mug_white,
            -4,
            Some("ana"),
            OperationCode::Waste,
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(variant.quantity, 6);

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(cat.mug_white.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Salida);
        assert_eq!(movements[0].quantity, 4);
        assert_eq!(movements[0].op_slug, "waste");
        assert_eq!(movements[0].item_name.as_deref(), Some("Taza Clásica White"));
        assert_eq!(movements[0].price_cents, Some(900));
        assert_eq!(movements[0].user_id.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn test_adjust_increment_records_entrada() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::adjust(
            &mut conn,
            &cat.mug_white,
            25,
            Some("ana"),
            OperationCode::Purchase,
            Some("reposición de marzo".to_string()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(variant.quantity, 35);

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(cat.mug_white.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements[0].kind, MovementKind::Entrada);
        assert_eq!(movements[0].quantity, 25);
        assert_eq!(movements[0].reason, "reposición de marzo");
    }

    #[tokio::test]
    async fn test_adjust_insufficient_stock_is_conflict() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = StockLedger::adjust(
            &mut conn,
            &cat.mug_white,
            -11,
            None,
            OperationCode::ManualAdjust,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientStock {
                available: 10,
                requested: 11,
                ..
            }
        ));

        // Nothing changed and nothing was recorded.
        let variant = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(variant.quantity, 10);
        assert_eq!(MovementRepository::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_rejects_zero_and_missing() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = StockLedger::adjust(
            &mut conn,
            &cat.mug_white,
            0,
            None,
            OperationCode::ManualAdjust,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = StockLedger::adjust(
            &mut conn,
            "nope",
            5,
            None,
            OperationCode::ManualAdjust,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_rejects_inactive_variant() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        // shirt_navy_m is not in any pack, so it deactivates cleanly.
        StockLedger::deactivate(&mut conn, &cat.shirt_navy_m, None)
            .await
            .unwrap();

        let err = StockLedger::adjust(
            &mut conn,
            &cat.shirt_navy_m,
            5,
            None,
            OperationCode::Purchase,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_create_variant_defaults_and_initial_movement() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::create_variant(
            &mut conn,
            NewVariant {
                product_type_id: cat.mug_type.clone(),
                color_id: cat.navy.clone(),
                size: None,
                initial_quantity: 40,
                min_stock: None,
                price_cents: 950,
            },
            Some("ana"),
        )
        .await
        .unwrap();

        // Drinkware default.
        assert_eq!(variant.min_stock, 10);

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(variant.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Entrada);
        assert_eq!(movements[0].quantity, 40);
        assert_eq!(movements[0].op_slug, "initial_load");
    }

    #[tokio::test]
    async fn test_create_variant_empty_start_is_ajuste() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::create_variant(
            &mut conn,
            NewVariant {
                product_type_id: cat.mug_type.clone(),
                color_id: cat.navy.clone(),
                size: None,
                initial_quantity: 0,
                min_stock: Some(3),
                price_cents: 950,
            },
            None,
        )
        .await
        .unwrap();

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(variant.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements[0].kind, MovementKind::Ajuste);
        assert_eq!(movements[0].quantity, 0);
    }

    #[tokio::test]
    async fn test_create_variant_duplicate_triple_is_conflict() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = StockLedger::create_variant(
            &mut conn,
            NewVariant {
                product_type_id: cat.mug_type.clone(),
                color_id: cat.white.clone(),
                size: None,
                initial_quantity: 5,
                min_stock: None,
                price_cents: 900,
            },
            None,
        )
        .await
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_create_variant_size_agreement() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        // Sized type without size.
        let err = StockLedger::create_variant(
            &mut conn,
            NewVariant {
                product_type_id: cat.shirt_type.clone(),
                color_id: cat.white.clone(),
                size: None,
                initial_quantity: 5,
                min_stock: None,
                price_cents: 1400,
            },
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        // Unsized type with size.
        let err = StockLedger::create_variant(
            &mut conn,
            NewVariant {
                product_type_id: cat.mug_type.clone(),
                color_id: cat.navy.clone(),
                size: Some("L".to_string()),
                initial_quantity: 5,
                min_stock: None,
                price_cents: 950,
            },
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_variant_records_changes_map() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::update_variant(
            &mut conn,
            &cat.mug_white,
            VariantUpdate {
                price_cents: Some(1100),
                min_stock: None,
            },
            Some("ana"),
        )
        .await
        .unwrap();
        assert_eq!(variant.price_cents, 1100);

        let movements = MovementRepository::list(
            &mut conn,
            &MovementFilter {
                variant_id: Some(cat.mug_white.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementKind::Ajuste);
        assert_eq!(movements[0].quantity, 0);
        assert_eq!(movements[0].op_slug, "price_change");
        // The snapshot freezes the price at movement time - the NEW price.
        assert_eq!(movements[0].price_cents, Some(1100));

        let changes = movements[0].changes().unwrap().unwrap();
        let change = changes.get("price_cents").unwrap();
        assert_eq!(change.old, "900");
        assert_eq!(change.new, "1100");
    }

    #[tokio::test]
    async fn test_update_variant_same_values_records_nothing() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        StockLedger::update_variant(
            &mut conn,
            &cat.mug_white,
            VariantUpdate {
                price_cents: Some(900),
                min_stock: Some(5),
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(MovementRepository::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deactivate_blocked_by_active_pack() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        // mug_white is a component of the duo pack.
        let err = StockLedger::deactivate(&mut conn, &cat.mug_white, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_deactivate_and_restore_round_trip() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let variant = StockLedger::deactivate(&mut conn, &cat.shirt_navy_m, Some("ana"))
            .await
            .unwrap();
        assert!(!variant.is_active);
        assert!(variant.deleted_at.is_some());

        // Double deactivate is a conflict.
        let err = StockLedger::deactivate(&mut conn, &cat.shirt_navy_m, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let variant = StockLedger::restore(&mut conn, &cat.shirt_navy_m, Some("ana"))
            .await
            .unwrap();
        assert!(variant.is_active);
        assert!(variant.deleted_at.is_none());

        // One ajuste movement per lifecycle step.
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
        let slugs: Vec<&str> = movements.iter().map(|m| m.op_slug.as_str()).collect();
        assert!(slugs.contains(&"deactivation"));
        assert!(slugs.contains(&"restore"));
    }

    #[tokio::test]
    async fn test_restore_rejects_active_variant() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = StockLedger::restore(&mut conn, &cat.mug_white, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_purge_blocked_by_any_pack_reference() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = StockLedger::purge(&mut conn, &cat.mug_white, None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_purge_preserves_snapshot_with_null_variant() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        // Leave a history entry first, then purge.
        StockLedger::adjust(
            &mut conn,
            &cat.shirt_navy_m,
            -2,
            None,
            OperationCode::Waste,
            None,
            None,
        )
        .await
        .unwrap();

        let receipt = StockLedger::purge(&mut conn, &cat.shirt_navy_m, Some("ana"))
            .await
            .unwrap();
        assert_eq!(receipt.item_name, "Camiseta Básica Navy M");

        assert!(VariantRepository::get_by_id(&mut conn, &cat.shirt_navy_m)
            .await
            .unwrap()
            .is_none());

        // Both the purge movement and the earlier waste movement survive
        // with null variant references and intact snapshots.
        let movements = MovementRepository::list(&mut conn, &MovementFilter::default())
            .await
            .unwrap();
        let survivors: Vec<_> = movements
            .iter()
            .filter(|m| m.item_name.as_deref() == Some("Camiseta Básica Navy M"))
            .collect();
        assert_eq!(survivors.len(), 2);
        assert!(survivors.iter().all(|m| m.variant_id.is_none()));
    }
}
