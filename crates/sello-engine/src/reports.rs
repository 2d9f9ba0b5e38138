//! # Movement Reporting
//!
//! Read-side queries over the ledger: the filtered movement listing with
//! aggregate totals (the loss/shrinkage report) and the low-stock view.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::SqliteConnection;

use sello_core::{Movement, Variant};
use sello_db::repository::{MovementFilter, MovementRepository, VariantRepository};

use crate::error::EngineResult;

// =============================================================================
// Report Types
// =============================================================================

/// Aggregate totals for one bucket of movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementTotals {
    pub count: i64,
    /// Summed magnitudes. Direction is the bucket's own semantics: the
    /// `salida` bucket total IS the outflow.
    pub quantity: i64,
}

/// A filtered ledger listing with totals by kind and by operation.
#[derive(Debug, Clone, Serialize)]
pub struct MovementReport {
    /// Matching movements, newest first.
    pub movements: Vec<Movement>,
    /// Keyed by movement kind (`entrada` / `salida` / `ajuste`).
    pub totals_by_kind: BTreeMap<String, MovementTotals>,
    /// Keyed by operation slug.
    pub totals_by_operation: BTreeMap<String, MovementTotals>,
}

// =============================================================================
// Reports
// =============================================================================

/// Ledger read-side queries.
pub struct Reports;

impl Reports {
    /// Lists movements matching the filter, with aggregate totals.
    pub async fn list_movements(
        conn: &mut SqliteConnection,
        filter: &MovementFilter,
    ) -> EngineResult<MovementReport> {
        let movements = MovementRepository::list(conn, filter).await?;

        let mut totals_by_kind: BTreeMap<String, MovementTotals> = BTreeMap::new();
        let mut totals_by_operation: BTreeMap<String, MovementTotals> = BTreeMap::new();

        for movement in &movements {
            let by_kind = totals_by_kind
                .entry(movement.kind.as_str().to_string())
                .or_default();
            by_kind.count += 1;
            by_kind.quantity += movement.quantity;

            let by_op = totals_by_operation
                .entry(movement.op_slug.clone())
                .or_default();
            by_op.count += 1;
            by_op.quantity += movement.quantity;
        }

        Ok(MovementReport {
            movements,
            totals_by_kind,
            totals_by_operation,
        })
    }

    /// Lists live variants at or below their minimum-stock threshold,
    /// lowest stock first.
    pub async fn low_stock(conn: &mut SqliteConnection) -> EngineResult<Vec<Variant>> {
        Ok(VariantRepository::list_low_stock(conn).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
