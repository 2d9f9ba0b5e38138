//! # Pack Expander
//!
//! Resolves a pack order line into its constituent variant requirements.
//! A read plus pure arithmetic - no side effects; the arithmetic half
//! lives in [`sello_core::pack`].

use sqlx::SqliteConnection;

use sello_core::pack::expand;
use sello_core::{Pack, Variant};
use sello_db::repository::{PackRepository, VariantRepository};

use crate::error::{EngineError, EngineResult};

/// A pack resolved into loaded components.
#[derive(Debug, Clone)]
pub struct ExpandedPack {
    pub pack: Pack,
    /// (loaded variant, required units) pairs, sorted by variant id.
    pub components: Vec<(Variant, i64)>,
}

/// Resolves pack lines for fulfillment.
pub struct PackExpander;

impl PackExpander {
    /// Expands a pack for a requested number of units.
    ///
    /// Rejects inactive packs, packs without components, and packs
    /// referencing inactive variants. Each component's per-pack quantity
    /// is multiplied by `requested_qty`; duplicate variants are merged.
    pub async fn expand(
        conn: &mut SqliteConnection,
        pack_id: &str,
        requested_qty: i64,
    ) -> EngineResult<ExpandedPack> {
        let pack = PackRepository::get_by_id(conn, pack_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Pack", pack_id))?;
        if !pack.is_active {
            return Err(EngineError::conflict(format!(
                "pack {pack_id} is not available"
            )));
        }

        let pack_items = PackRepository::items(conn, pack_id).await?;
        if pack_items.is_empty() {
            return Err(EngineError::conflict(format!(
                "pack {pack_id} has no components"
            )));
        }

        let mut components = Vec::with_capacity(pack_items.len());
        for component in expand(&pack_items, requested_qty) {
            let variant = VariantRepository::get_by_id(conn, &component.variant_id)
                .await?
                .ok_or_else(|| EngineError::not_found("Variant", &component.variant_id))?;
            if !variant.is_active {
                return Err(EngineError::conflict(format!(
                    "pack {pack_id} contains unavailable variant {}",
                    component.variant_id
                )));
            }
            components.push((variant, component.quantity));
        }

        Ok(ExpandedPack { pack, components })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use chrono::Utc;

    #[tokio::test]
    async fn test_expand_multiplies_per_pack_quantities() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let expanded = PackExpander::expand(&mut conn, &cat.duo_pack, 3)
            .await
            .unwrap();
        assert_eq!(expanded.pack.id, cat.duo_pack);
        assert_eq!(expanded.components.len(), 2);

        // Sorted by variant id: v-mug-white before v-shirt-navy-m.
        assert_eq!(expanded.components[0].0.id, cat.mug_white);
        assert_eq!(expanded.components[0].1, 6);
        assert_eq!(expanded.components[1].0.id, cat.shirt_navy_m);
        assert_eq!(expanded.components[1].1, 3);
    }

    #[tokio::test]
    async fn test_expand_rejects_unknown_pack() {
        let engine = testutil::engine().await;
        testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        let err = PackExpander::expand(&mut conn, "nope", 1).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_expand_rejects_inactive_component() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;
        let mut conn = engine.database().acquire().await.unwrap();

        VariantRepository::deactivate(&mut conn, &cat.shirt_navy_m, false, Utc::now())
            .await
            .unwrap();

        let err = PackExpander::expand(&mut conn, &cat.duo_pack, 1)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
