//! # Movement Recorder
//!
//! Appends immutable audit entries to the inventory ledger.
//!
//! ## Recording Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Movement Recording                                  │
//! │                                                                         │
//! │  1. Runs INSIDE the caller's transaction. The movement commits with   │
//! │     the change it describes, or neither commits.                      │
//! │                                                                         │
//! │  2. Pure append. No update or delete path exists.                     │
//! │                                                                         │
//! │  3. The snapshot (name, color, size, price) is computed from the      │
//! │     caller's ALREADY-LOADED variant + parent type + color at call     │
//! │     time, then frozen forever.                                        │
//! │                                                                         │
//! │  4. The operation slug resolves through the fixed catalog. Unknown    │
//! │     slugs resolve to the generic triple with a logged warning -       │
//! │     recording never fails over a bad slug.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::warn;

use sello_core::movement::{resolve_slug, OperationCode};
use sello_core::{Color, FieldChange, Movement, MovementKind, ProductType, Variant};
use sello_db::repository::movement::generate_movement_id;
use sello_db::repository::{ColorRepository, MovementRepository, ProductTypeRepository};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Snapshot
// =============================================================================

/// The variant fields a movement freezes at creation time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub item_name: String,
    pub color_name: String,
    pub size: Option<String>,
    pub price_cents: i64,
}

impl Snapshot {
    /// Builds a snapshot from already-loaded rows.
    pub fn of(variant: &Variant, product_type: &ProductType, color: &Color) -> Self {
        Snapshot {
            item_name: display_name(&product_type.name, &color.name, variant.size.as_deref()),
            color_name: color.name.clone(),
            size: variant.size.clone(),
            price_cents: variant.price_cents,
        }
    }
}

/// Composes the display name frozen into movement snapshots.
pub(crate) fn display_name(type_name: &str, color_name: &str, size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{} {} {}", type_name, color_name, size),
        None => format!("{} {}", type_name, color_name),
    }
}

/// Loads a variant's parent type and color and builds its snapshot.
///
/// Relations are loaded explicitly here so the snapshot never depends on a
/// lazy reference that could resolve after the variant changed.
pub(crate) async fn load_snapshot(
    conn: &mut SqliteConnection,
    variant: &Variant,
) -> EngineResult<Snapshot> {
    let product_type = ProductTypeRepository::get_by_id(conn, &variant.product_type_id)
        .await?
        .ok_or_else(|| EngineError::not_found("ProductType", &variant.product_type_id))?;
    let color = ColorRepository::get_by_id(conn, &variant.color_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Color", &variant.color_id))?;

    Ok(Snapshot::of(variant, &product_type, &color))
}

// =============================================================================
// Movement Draft
// =============================================================================

/// Everything a movement needs before the audit row is materialized.
#[derive(Debug, Clone)]
pub struct MovementDraft {
    pub kind: MovementKind,
    /// Magnitude (≥ 0); direction is carried by `kind`.
    pub quantity: i64,
    /// Operation catalog slug; resolved through the catalog on append.
    pub op_slug: String,
    /// Overrides the catalog's default reason when present.
    pub reason: Option<String>,
    /// Field → {old, new} map for metadata-only movements.
    pub changes: Option<BTreeMap<String, FieldChange>>,
    /// Variant snapshot; `None` for order-only movements.
    pub snapshot: Option<Snapshot>,
    /// `None` for purge movements and order-only movements.
    pub variant_id: Option<String>,
    pub user_id: Option<String>,
    pub order_id: Option<String>,
}

impl MovementDraft {
    /// Starts a draft for a catalog operation; remaining fields default to
    /// empty and are set with struct update syntax.
    pub fn for_op(op: OperationCode, kind: MovementKind, quantity: i64) -> Self {
        MovementDraft {
            kind,
            quantity,
            op_slug: op.slug().to_string(),
            reason: None,
            changes: None,
            snapshot: None,
            variant_id: None,
            user_id: None,
            order_id: None,
        }
    }
}

// =============================================================================
// Movement Recorder
// =============================================================================

/// Appends audit entries describing stock-affecting events.
pub struct MovementRecorder;

impl MovementRecorder {
    /// Appends one movement inside the caller's transaction.
    ///
    /// Never mutates prior rows. Unknown operation slugs resolve to the
    /// generic adjustment triple with a warning, not an error.
    pub async fn append(
        conn: &mut SqliteConnection,
        draft: MovementDraft,
    ) -> EngineResult<Movement> {
        let (info, known) = resolve_slug(&draft.op_slug);
        if !known {
            warn!(
                slug = %draft.op_slug,
                "Unknown operation slug; recording generic adjustment"
            );
        }

        let changes_json = match &draft.changes {
            Some(changes) => {
                Some(serde_json::to_string(changes).map_err(|e| EngineError::Internal(e.to_string()))?)
            }
            None => None,
        };

        let (item_name, color_name, size, price_cents) = match draft.snapshot {
            Some(snapshot) => (
                Some(snapshot.item_name),
                Some(snapshot.color_name),
                snapshot.size,
                Some(snapshot.price_cents),
            ),
            None => (None, None, None, None),
        };

        let movement = Movement {
            id: generate_movement_id(),
            kind: draft.kind,
            quantity: draft.quantity,
            // The raw slug is stored as received; the resolved triple
            // supplies code and default reason.
            op_slug: draft.op_slug,
            op_code: info.code.to_string(),
            reason: draft.reason.unwrap_or_else(|| info.reason.to_string()),
            changes_json,
            item_name,
            color_name,
            size,
            price_cents,
            variant_id: draft.variant_id,
            user_id: draft.user_id,
            order_id: draft.order_id,
            created_at: Utc::now(),
            deleted_at: None,
        };

        MovementRepository::insert(conn, &movement).await?;

        Ok(movement)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
