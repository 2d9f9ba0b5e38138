//! # Pack Expansion
//!
//! Pure arithmetic for resolving a pack order line into its constituent
//! variant requirements. Loading the pack and checking component liveness
//! is the engine's job; this module only multiplies and merges.

use std::collections::BTreeMap;

use crate::types::PackItem;

/// A variant requirement produced by expanding a pack line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackComponent {
    pub variant_id: String,
    pub quantity: i64,
}

/// Expands a pack's items for a requested number of packs.
///
/// Multiplies each component's per-pack quantity by `requested_qty` and
/// merges duplicate variants. The result is sorted by variant id, which
/// downstream decrement aggregation relies on for stable lock ordering.
///
/// ## Example
/// ```rust
/// use sello_core::pack::expand;
/// use sello_core::types::PackItem;
///
/// let items = vec![
///     PackItem { id: "i1".into(), pack_id: "p".into(), variant_id: "a".into(), qty_per_pack: 2 },
///     PackItem { id: "i2".into(), pack_id: "p".into(), variant_id: "b".into(), qty_per_pack: 1 },
/// ];
/// let components = expand(&items, 3);
/// assert_eq!(components[0].quantity, 6); // variant a: 2 × 3
/// assert_eq!(components[1].quantity, 3); // variant b: 1 × 3
/// ```
pub fn expand(items: &[PackItem], requested_qty: i64) -> Vec<PackComponent> {
    let mut merged: BTreeMap<&str, i64> = BTreeMap::new();
    for item in items {
        *merged.entry(item.variant_id.as_str()).or_insert(0) += item.qty_per_pack * requested_qty;
    }

    merged
        .into_iter()
        .map(|(variant_id, quantity)| PackComponent {
            variant_id: variant_id.to_string(),
            quantity,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
