//! # Movement Catalog
//!
//! Movement kinds and the fixed catalog of operation codes that classify
//! every entry in the inventory ledger.
//!
//! ## How the Ledger Is Classified
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Movement Classification                             │
//! │                                                                         │
//! │  Every stock-affecting event produces ONE movement row:                │
//! │                                                                         │
//! │     quantity change          kind        examples                     │
//! │     ───────────────          ────        ────────                     │
//! │     increase (+δ)            entrada     initial load, purchase       │
//! │     decrease (−δ)            salida      sale, waste, pack assembly   │
//! │     metadata only (0)        ajuste      deactivation, price change   │
//! │                                                                         │
//! │  The OPERATION CODE records WHY:                                        │
//! │                                                                         │
//! │     slug            code        kind      default reason              │
//! │     ─────────────   ─────────   ───────   ───────────────             │
//! │     initial_load    ENT-INIT    entrada   "carga inicial"             │
//! │     sale            SAL-VENTA   salida    "venta"                     │
//! │     manual_adjust   AJU-MANUAL  ajuste    "ajuste manual"             │
//! │     ...             ...         ...       ...                         │
//! │                                                                         │
//! │  Unknown slug at the string boundary → generic (AJU-GEN, ajuste)       │
//! │  triple. The caller logs a warning; this is NOT an error.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Movement Kind
// =============================================================================

/// The direction of a stock movement.
///
/// Stored as the Spanish ledger terms the reporting layer uses:
/// `entrada` (stock in), `salida` (stock out), `ajuste` (metadata-only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Stock increase.
    Entrada,
    /// Stock decrease.
    Salida,
    /// No quantity change; audit of a metadata edit or lifecycle event.
    Ajuste,
}

impl MovementKind {
    /// Derives the kind from the sign of a quantity delta.
    ///
    /// ## Example
    /// ```rust
    /// use sello_core::movement::MovementKind;
    ///
    /// assert_eq!(MovementKind::from_delta(5), MovementKind::Entrada);
    /// assert_eq!(MovementKind::from_delta(-3), MovementKind::Salida);
    /// assert_eq!(MovementKind::from_delta(0), MovementKind::Ajuste);
    /// ```
    #[inline]
    pub const fn from_delta(delta: i64) -> Self {
        if delta > 0 {
            MovementKind::Entrada
        } else if delta < 0 {
            MovementKind::Salida
        } else {
            MovementKind::Ajuste
        }
    }

    /// Returns the stored string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entrada => "entrada",
            MovementKind::Salida => "salida",
            MovementKind::Ajuste => "ajuste",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Operation Codes
// =============================================================================

/// The fixed catalog of causes for a movement.
///
/// Closed enumeration: engine paths always pass a variant. Raw slugs only
/// enter through external filters, where [`resolve_slug`] applies the
/// generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OperationCode {
    /// Stock loaded when a variant is first created.
    InitialLoad,
    /// Replenishment purchase from a supplier.
    Purchase,
    /// Customer sale (order fulfillment).
    Sale,
    /// Damaged / lost / shrinkage write-off.
    Waste,
    /// Manual correction by an administrator.
    ManualAdjust,
    /// Stock consumed assembling physical packs.
    PackAssembly,
    /// Stock returned by disassembling packs.
    PackDisassembly,
    /// Variant deactivated (soft delete).
    Deactivation,
    /// Variant restored from soft delete.
    Restore,
    /// Variant hard-deleted; the movement keeps the snapshot.
    Purge,
    /// Non-price metadata edit.
    InfoChange,
    /// Price edit.
    PriceChange,
    /// Minimum-stock threshold edit.
    MinStockChange,
    /// Order status transition.
    StatusChange,
}

/// The resolved `{code, reason, kind}` triple for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationInfo {
    /// The catalog slug (stored on the movement row).
    pub slug: &'static str,
    /// Short display code used by the reporting layer.
    pub code: &'static str,
    /// Default human-readable reason.
    pub reason: &'static str,
    /// Default direction for this operation.
    pub kind: MovementKind,
}

/// The fallback triple for slugs outside the catalog.
pub const GENERIC_OPERATION: OperationInfo = OperationInfo {
    slug: "manual_adjust",
    code: "AJU-GEN",
    reason: "ajuste sin especificar",
    kind: MovementKind::Ajuste,
};

impl OperationCode {
    /// All catalog entries, for reporting and validation.
    pub const ALL: [OperationCode; 14] = [
        OperationCode::InitialLoad,
        OperationCode::Purchase,
        OperationCode::Sale,
        OperationCode::Waste,
        OperationCode::ManualAdjust,
        OperationCode::PackAssembly,
        OperationCode::PackDisassembly,
        OperationCode::Deactivation,
        OperationCode::Restore,
        OperationCode::Purge,
        OperationCode::InfoChange,
        OperationCode::PriceChange,
        OperationCode::MinStockChange,
        OperationCode::StatusChange,
    ];

    /// Returns the catalog slug for this operation.
    pub const fn slug(&self) -> &'static str {
        self.info().slug
    }

    /// Resolves the `{code, reason, kind}` triple for this operation.
    pub const fn info(&self) -> OperationInfo {
        match self {
            OperationCode::InitialLoad => OperationInfo {
                slug: "initial_load",
                code: "ENT-INIT",
                reason: "carga inicial",
                kind: MovementKind::Entrada,
            },
            OperationCode::Purchase => OperationInfo {
                slug: "purchase",
                code: "ENT-COMPRA",
                reason: "compra a proveedor",
                kind: MovementKind::Entrada,
            },
            OperationCode::Sale => OperationInfo {
                slug: "sale",
                code: "SAL-VENTA",
                reason: "venta",
                kind: MovementKind::Salida,
            },
            OperationCode::Waste => OperationInfo {
                slug: "waste",
                code: "SAL-MERMA",
                reason: "merma / rotura",
                kind: MovementKind::Salida,
            },
            OperationCode::ManualAdjust => OperationInfo {
                slug: "manual_adjust",
                code: "AJU-MANUAL",
                reason: "ajuste manual",
                kind: MovementKind::Ajuste,
            },
            OperationCode::PackAssembly => OperationInfo {
                slug: "pack_assembly",
                code: "SAL-PACK",
                reason: "montaje de pack",
                kind: MovementKind::Salida,
            },
            OperationCode::PackDisassembly => OperationInfo {
                slug: "pack_disassembly",
                code: "ENT-PACK",
                reason: "desmontaje de pack",
                kind: MovementKind::Entrada,
            },
            OperationCode::Deactivation => OperationInfo {
                slug: "deactivation",
                code: "AJU-BAJA",
                reason: "baja de variante",
                kind: MovementKind::Ajuste,
            },
            OperationCode::Restore => OperationInfo {
                slug: "restore",
                code: "AJU-ALTA",
                reason: "alta de variante",
                kind: MovementKind::Ajuste,
            },
            OperationCode::Purge => OperationInfo {
                slug: "purge",
                code: "AJU-PURGA",
                reason: "borrado definitivo",
                kind: MovementKind::Ajuste,
            },
            OperationCode::InfoChange => OperationInfo {
                slug: "info_change",
                code: "AJU-INFO",
                reason: "cambio de información",
                kind: MovementKind::Ajuste,
            },
            OperationCode::PriceChange => OperationInfo {
                slug: "price_change",
                code: "AJU-PRECIO",
                reason: "cambio de precio",
                kind: MovementKind::Ajuste,
            },
            OperationCode::MinStockChange => OperationInfo {
                slug: "min_stock_change",
                code: "AJU-MINIMO",
                reason: "cambio de stock mínimo",
                kind: MovementKind::Ajuste,
            },
            OperationCode::StatusChange => OperationInfo {
                slug: "status_change",
                code: "AJU-ESTADO",
                reason: "cambio de estado de pedido",
                kind: MovementKind::Ajuste,
            },
        }
    }

    /// Parses a catalog slug.
    ///
    /// Returns `None` for slugs outside the catalog; callers that must not
    /// fail use [`resolve_slug`] instead.
    pub fn from_slug(slug: &str) -> Option<Self> {
        OperationCode::ALL
            .iter()
            .copied()
            .find(|op| op.slug() == slug)
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Resolves a raw slug into its operation triple.
///
/// Unknown slugs resolve to [`GENERIC_OPERATION`] rather than failing; the
/// boolean reports whether the slug was in the catalog so the caller can
/// log the fallback.
///
/// ## Example
/// ```rust
/// use sello_core::movement::{resolve_slug, MovementKind};
///
/// let (info, known) = resolve_slug("sale");
/// assert!(known);
/// assert_eq!(info.kind, MovementKind::Salida);
///
/// let (info, known) = resolve_slug("banana");
/// assert!(!known);
/// assert_eq!(info.code, "AJU-GEN");
/// ```
pub fn resolve_slug(slug: &str) -> (OperationInfo, bool) {
    match OperationCode::from_slug(slug) {
        Some(op) => (op.info(), true),
        None => (GENERIC_OPERATION, false),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_delta() {
        assert_eq!(MovementKind::from_delta(10), MovementKind::Entrada);
        assert_eq!(MovementKind::from_delta(-10), MovementKind::Salida);
        assert_eq!(MovementKind::from_delta(0), MovementKind::Ajuste);
    }

    #[test]
    fn test_slugs_round_trip() {
        for op in OperationCode::ALL {
            assert_eq!(OperationCode::from_slug(op.slug()), Some(op));
        }
    }

    #[test]
    fn test_unknown_slug_falls_back() {
        let (info, known) = resolve_slug("does_not_exist");
        assert!(!known);
        assert_eq!(info.code, GENERIC_OPERATION.code);
        assert_eq!(info.kind, MovementKind::Ajuste);
    }

    #[test]
    fn test_catalog_kinds() {
        assert_eq!(OperationCode::Sale.info().kind, MovementKind::Salida);
        assert_eq!(OperationCode::Purchase.info().kind, MovementKind::Entrada);
        assert_eq!(
            OperationCode::Deactivation.info().kind,
            MovementKind::Ajuste
        );
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = OperationCode::ALL.iter().map(|o| o.info().code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), OperationCode::ALL.len());
    }
}
