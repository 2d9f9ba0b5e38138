//! # sello-engine: Inventory Ledger & Order Fulfillment Engine
//!
//! The transactional core of the Sello storefront backend: per-variant
//! stock with an append-only audit ledger, atomic order fulfillment over
//! single variants and packs, cascading catalog lifecycle, and the order
//! status machine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sello Engine                                    │
//! │                                                                         │
//! │  HTTP layer (external) ──► Engine facade (one transaction per call)    │
//! │                                │                                        │
//! │        ┌───────────────────────┼──────────────────────────┐            │
//! │        ▼                       ▼                          ▼            │
//! │  ┌───────────────┐   ┌──────────────────┐   ┌──────────────────────┐  │
//! │  │  StockLedger  │   │ OrderFulfillment │   │  LifecycleManager    │  │
//! │  │  adjust       │◄──│ expand packs,    │   │  cascade type ⇄      │  │
//! │  │  create       │   │ aggregate        │   │  variants            │  │
//! │  │  deactivate   │   │ decrements,      │   ├──────────────────────┤  │
//! │  │  restore      │   │ freeze prices    │   │  OrderStatusMachine  │  │
//! │  │  purge        │   └──────────────────┘   └──────────────────────┘  │
//! │  └───────┬───────┘                                                     │
//! │          ▼                                                             │
//! │  ┌───────────────────┐     every quantity change pairs with exactly   │
//! │  │ MovementRecorder  │ ◄── one immutable movement, inside the same    │
//! │  │ (append-only)     │     transaction                                │
//! │  └───────────────────┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! One transaction per logical operation; the engine holds no in-process
//! locks. Stock decrements go through a guarded relative UPDATE that
//! re-checks non-negativity under SQLite's write lock, and aggregated
//! decrements are applied in sorted variant-id order so overlapping orders
//! always lock in the same sequence. A `?`-propagated error anywhere rolls
//! the whole operation back (transactions roll back on drop).

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod expander;
pub mod ledger;
pub mod lifecycle;
pub mod orders;
pub mod recorder;
pub mod reports;
pub mod status;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EngineError, EngineResult};
pub use expander::{ExpandedPack, PackExpander};
pub use ledger::{NewVariant, PurgeReceipt, StockLedger, VariantUpdate};
pub use lifecycle::{LifecycleManager, LifecycleReceipt};
pub use orders::{CustomerInfo, OrderDetail, OrderFulfillment, OrderLine, OrderPayload};
pub use recorder::{MovementDraft, MovementRecorder, Snapshot};
pub use reports::{MovementReport, MovementTotals, Reports};
pub use status::OrderStatusMachine;

// The filter type callers pass to `list_movements`.
pub use sello_db::MovementFilter;

use sello_core::movement::OperationCode;
use sello_core::{Movement, Order, Variant};
use sello_db::repository::VariantRepository;
use sello_db::Database;

// =============================================================================
// Engine Facade
// =============================================================================

/// The engine's public surface, as consumed by the HTTP layer.
///
/// Every mutating method opens ONE transaction, runs the operation, and
/// commits; any error rolls everything back before it propagates. Cheap to
/// clone.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
}

impl Engine {
    /// Wraps a connected database handle.
    pub fn new(db: Database) -> Self {
        Engine { db }
    }

    /// Access to the underlying database (pool handle, health checks).
    pub fn database(&self) -> &Database {
        &self.db
    }

    // -------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------

    /// Creates an order with whole-order atomicity. See
    /// [`OrderFulfillment::create_order`].
    pub async fn create_order(
        &self,
        payload: OrderPayload,
        user_id: Option<&str>,
    ) -> EngineResult<Order> {
        let mut tx = self.db.begin().await?;
        let order = OrderFulfillment::create_order(&mut tx, payload, user_id).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(order)
    }

    /// Loads an order with its items.
    pub async fn get_order(&self, order_id: &str) -> EngineResult<OrderDetail> {
        let mut conn = self.db.acquire().await?;
        OrderFulfillment::get_order(&mut conn, order_id).await
    }

    /// Applies an order status transition. See
    /// [`OrderStatusMachine::update_status`].
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
        user_id: Option<&str>,
    ) -> EngineResult<Order> {
        let mut tx = self.db.begin().await?;
        let order = OrderStatusMachine::update_status(&mut tx, order_id, status, user_id).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(order)
    }

    // -------------------------------------------------------------------
    // Stock
    // -------------------------------------------------------------------

    /// Manual stock adjustment by an administrator.
    pub async fn adjust_stock(
        &self,
        variant_id: &str,
        delta: i64,
        user_id: &str,
        reason: Option<String>,
    ) -> EngineResult<Variant> {
        let mut tx = self.db.begin().await?;
        let variant = StockLedger::adjust(
            &mut tx,
            variant_id,
            delta,
            Some(user_id),
            OperationCode::ManualAdjust,
            reason,
            None,
        )
        .await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(variant)
    }

    /// Creates a variant with its opening-stock movement.
    pub async fn create_variant(
        &self,
        spec: NewVariant,
        user_id: &str,
    ) -> EngineResult<Variant> {
        let mut tx = self.db.begin().await?;
        let variant = StockLedger::create_variant(&mut tx, spec, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(variant)
    }

    /// Edits variant price / min stock, auditing the field changes.
    pub async fn update_variant(
        &self,
        variant_id: &str,
        update: VariantUpdate,
        user_id: &str,
    ) -> EngineResult<Variant> {
        let mut tx = self.db.begin().await?;
        let variant =
            StockLedger::update_variant(&mut tx, variant_id, update, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(variant)
    }

    /// Soft-deletes a variant.
    pub async fn deactivate_variant(
        &self,
        variant_id: &str,
        user_id: &str,
    ) -> EngineResult<Variant> {
        let mut tx = self.db.begin().await?;
        let variant = StockLedger::deactivate(&mut tx, variant_id, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(variant)
    }

    /// Restores a soft-deleted variant.
    pub async fn restore_variant(
        &self,
        variant_id: &str,
        user_id: &str,
    ) -> EngineResult<Variant> {
        let mut tx = self.db.begin().await?;
        let variant = StockLedger::restore(&mut tx, variant_id, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(variant)
    }

    /// Hard-deletes a variant, preserving its movement history.
    pub async fn purge_variant(
        &self,
        variant_id: &str,
        user_id: &str,
    ) -> EngineResult<PurgeReceipt> {
        let mut tx = self.db.begin().await?;
        let receipt = StockLedger::purge(&mut tx, variant_id, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(receipt)
    }

    /// Loads a variant.
    pub async fn get_variant(&self, variant_id: &str) -> EngineResult<Variant> {
        let mut conn = self.db.acquire().await?;
        VariantRepository::get_by_id(&mut conn, variant_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Variant", variant_id))
    }

    // -------------------------------------------------------------------
    // Catalog lifecycle
    // -------------------------------------------------------------------

    /// Deactivates a product type, cascading to its active variants.
    pub async fn deactivate_type(
        &self,
        type_id: &str,
        user_id: &str,
    ) -> EngineResult<LifecycleReceipt> {
        let mut tx = self.db.begin().await?;
        let receipt = LifecycleManager::deactivate_type(&mut tx, type_id, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(receipt)
    }

    /// Restores a product type and its cascade-deactivated variants.
    pub async fn restore_type(
        &self,
        type_id: &str,
        user_id: &str,
    ) -> EngineResult<LifecycleReceipt> {
        let mut tx = self.db.begin().await?;
        let receipt = LifecycleManager::restore_type(&mut tx, type_id, Some(user_id)).await?;
        tx.commit().await.map_err(sello_db::DbError::from)?;
        Ok(receipt)
    }

    // -------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------

    /// Filtered ledger listing with totals by kind and operation.
    pub async fn list_movements(&self, filter: &MovementFilter) -> EngineResult<MovementReport> {
        let mut conn = self.db.acquire().await?;
        Reports::list_movements(&mut conn, filter).await
    }

    /// Movements recorded for one order.
    pub async fn order_movements(&self, order_id: &str) -> EngineResult<Vec<Movement>> {
        let mut conn = self.db.acquire().await?;
        Ok(sello_db::MovementRepository::list_by_order(&mut conn, order_id).await?)
    }

    /// Live variants at or below their replenishment threshold.
    pub async fn low_stock(&self) -> EngineResult<Vec<Variant>> {
        let mut conn = self.db.acquire().await?;
        Reports::low_stock(&mut conn).await
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================
