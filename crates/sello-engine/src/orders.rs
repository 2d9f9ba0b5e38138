//! # Order Fulfillment
//!
//! Validates an incoming order, computes prices, aggregates the required
//! decrements per variant, and persists everything in one transaction.
//!
//! ## Whole-Order Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create_order(payload)                              │
//! │                                                                         │
//! │  PHASE 1 - read & plan (no writes)                                     │
//! │    line: variant ──► price = base + stamping add-ons                   │
//! │    line: pack    ──► expand components, price = pack − discount        │
//! │    decrements[variant] += needed   (BTreeMap: sorted by variant id,    │
//! │                                     so locks are taken in one stable   │
//! │                                     order for every order)             │
//! │    every aggregated decrement checked against on-hand stock            │
//! │                                                                         │
//! │  PHASE 2 - write (inside the caller's transaction)                     │
//! │    INSERT order + items (prices frozen)                                │
//! │    for each (variant, needed):                                         │
//! │        StockLedger::adjust(−needed, op = sale, order)                  │
//! │        └── guarded update + ONE movement referencing the order        │
//! │                                                                         │
//! │  ANY error anywhere → the caller's transaction rolls back: the order, │
//! │  its items, every movement, every quantity change. An order either    │
//! │  fully exists with fully-decremented stock, or not at all.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A variant appearing both directly and inside a pack gets ONE summed
//! decrement and ONE movement, not two that could interleave.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::info;

use sello_core::movement::OperationCode;
use sello_core::validation::{
    validate_email, validate_line_count, validate_price_cents, validate_quantity,
};
use sello_core::{
    Color, CoreError, Order, OrderItem, OrderStatus, ProductType, ValidationError, Variant,
};
use sello_db::repository::order::{generate_order_id, generate_order_item_id};
use sello_db::repository::{
    ColorRepository, OrderRepository, ProductTypeRepository, VariantRepository,
};

use crate::error::{EngineError, EngineResult};
use crate::expander::PackExpander;
use crate::ledger::StockLedger;
use crate::recorder::display_name;

// =============================================================================
// Payload Types
// =============================================================================

/// One line of an incoming order: exactly one of `variant_id` / `pack_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLine {
    pub variant_id: Option<String>,
    pub pack_id: Option<String>,
    pub quantity: i64,
    /// Stamping slugs priced from the product type's stamping map.
    /// Variant lines only.
    pub add_ons: Vec<String>,
    pub stamp_image_url: Option<String>,
    pub stamp_instructions: Option<String>,
}

/// Customer identity and shipping fields.
///
/// Guest orders (no authenticated user) require a contact email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub ship_address: Option<String>,
    pub ship_city: Option<String>,
    pub ship_postal: Option<String>,
    pub ship_country: Option<String>,
}

/// The validated order payload handed over by the HTTP layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    pub items: Vec<OrderLine>,
    pub customer: CustomerInfo,
    /// Shipping cost supplied by the caller; the engine records it, it
    /// does not compute it.
    pub shipping_cents: i64,
}

/// An order with its line items, for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Order Fulfillment
// =============================================================================

/// Creates orders with whole-order atomicity.
pub struct OrderFulfillment;

impl OrderFulfillment {
    /// Creates an order inside the caller's transaction.
    ///
    /// See the module docs for the two-phase shape. Returns the persisted
    /// order; line items and movements are committed with it.
    pub async fn create_order(
        conn: &mut SqliteConnection,
        payload: OrderPayload,
        user_id: Option<&str>,
    ) -> EngineResult<Order> {
        validate_line_count(payload.items.len())?;
        validate_price_cents("shipping_cents", payload.shipping_cents)?;

        // Guest orders need a reachable customer; authenticated orders
        // attach the user instead.
        match (user_id, payload.customer.email.as_deref()) {
            (None, None) => {
                return Err(ValidationError::Required {
                    field: "email".to_string(),
                }
                .into())
            }
            (_, Some(email)) => validate_email(email)?,
            (Some(_), None) => {}
        }

        // ---------------------------------------------------------------
        // Phase 1: read everything, price every line, aggregate decrements.
        // No writes happen until the whole payload has been priced and
        // checked.
        // ---------------------------------------------------------------

        let mut variants: HashMap<String, Variant> = HashMap::new();
        let mut types: HashMap<String, ProductType> = HashMap::new();
        let mut colors: HashMap<String, Color> = HashMap::new();

        // BTreeMap: decrements are later applied in variant-id order, so
        // two orders over overlapping variants always lock in the same
        // sequence.
        let mut decrements: BTreeMap<String, i64> = BTreeMap::new();

        struct PlannedItem {
            variant_id: Option<String>,
            pack_id: Option<String>,
            quantity: i64,
            unit_price_cents: i64,
            name_snapshot: String,
            stamp_image_url: Option<String>,
            stamp_instructions: Option<String>,
        }

        let mut planned: Vec<PlannedItem> = Vec::with_capacity(payload.items.len());
        let mut subtotal_cents: i64 = 0;

        for line in &payload.items {
            validate_quantity(line.quantity)?;

            match (line.variant_id.as_deref(), line.pack_id.as_deref()) {
                (Some(variant_id), None) => {
                    let variant =
                        load_variant(conn, &mut variants, variant_id).await?;
                    if !variant.is_active {
                        return Err(EngineError::conflict(format!(
                            "variant {variant_id} is not available"
                        )));
                    }

                    let product_type =
                        load_type(conn, &mut types, &variant.product_type_id).await?;
                    let color = load_color(conn, &mut colors, &variant.color_id).await?;

                    let mut unit_price_cents = variant.price_cents;
                    if !line.add_ons.is_empty() {
                        let prices = product_type
                            .stamping_prices()
                            .map_err(CoreError::CorruptData)?;
                        for slug in &line.add_ons {
                            match prices.get(slug) {
                                Some(surcharge) => unit_price_cents += surcharge,
                                None => {
                                    return Err(CoreError::UndefinedStamping {
                                        slug: slug.clone(),
                                    }
                                    .into())
                                }
                            }
                        }
                    }

                    *decrements.entry(variant_id.to_string()).or_insert(0) += line.quantity;
                    subtotal_cents += unit_price_cents * line.quantity;

                    planned.push(PlannedItem {
                        variant_id: Some(variant_id.to_string()),
                        pack_id: None,
                        quantity: line.quantity,
                        unit_price_cents,
                        name_snapshot: display_name(
                            &product_type.name,
                            &color.name,
                            variant.size.as_deref(),
                        ),
                        stamp_image_url: line.stamp_image_url.clone(),
                        stamp_instructions: line.stamp_instructions.clone(),
                    });
                }

                (None, Some(pack_id)) => {
                    if !line.add_ons.is_empty() {
                        return Err(ValidationError::InvalidFormat {
                            field: "add_ons".to_string(),
                            reason: "not applicable to pack lines".to_string(),
                        }
                        .into());
                    }

                    let expanded = PackExpander::expand(conn, pack_id, line.quantity).await?;

                    let unit_price_cents = expanded.pack.net_price_cents();
                    if unit_price_cents < 0 {
                        return Err(EngineError::conflict(format!(
                            "pack {pack_id} discount exceeds its price"
                        )));
                    }

                    for (variant, needed) in expanded.components {
                        *decrements.entry(variant.id.clone()).or_insert(0) += needed;
                        // Later direct lines and the sufficiency check read
                        // from the same cache the expander loaded into.
                        variants.entry(variant.id.clone()).or_insert(variant);
                    }

                    subtotal_cents += unit_price_cents * line.quantity;

                    planned.push(PlannedItem {
                        variant_id: None,
                        pack_id: Some(pack_id.to_string()),
                        quantity: line.quantity,
                        unit_price_cents,
                        name_snapshot: expanded.pack.name.clone(),
                        stamp_image_url: line.stamp_image_url.clone(),
                        stamp_instructions: line.stamp_instructions.clone(),
                    });
                }

                _ => {
                    return Err(ValidationError::ExactlyOneOf {
                        left: "variant_id".to_string(),
                        right: "pack_id".to_string(),
                    }
                    .into())
                }
            }
        }

        // Whole-order sufficiency check BEFORE the first write: a single
        // short component aborts the order with nothing to roll back.
        for (variant_id, needed) in &decrements {
            let variant = &variants[variant_id];
            if variant.quantity < *needed {
                return Err(EngineError::InsufficientStock {
                    variant_id: variant_id.clone(),
                    available: variant.quantity,
                    requested: *needed,
                });
            }
        }

        // ---------------------------------------------------------------
        // Phase 2: write. Everything below shares the caller's transaction.
        // ---------------------------------------------------------------

        let now = Utc::now();
        let order = Order {
            id: generate_order_id(),
            subtotal_cents,
            shipping_cents: payload.shipping_cents,
            total_cents: subtotal_cents + payload.shipping_cents,
            user_id: user_id.map(str::to_string),
            guest_name: payload.customer.name,
            guest_email: payload.customer.email,
            ship_address: payload.customer.ship_address,
            ship_city: payload.customer.ship_city,
            ship_postal: payload.customer.ship_postal,
            ship_country: payload.customer.ship_country,
            status: OrderStatus::PendingPayment,
            created_at: now,
            updated_at: now,
        };
        OrderRepository::insert(conn, &order).await?;

        for item in planned {
            OrderRepository::insert_item(
                conn,
                &OrderItem {
                    id: generate_order_item_id(),
                    order_id: order.id.clone(),
                    variant_id: item.variant_id,
                    pack_id: item.pack_id,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    name_snapshot: item.name_snapshot,
                    stamp_image_url: item.stamp_image_url,
                    stamp_instructions: item.stamp_instructions,
                    created_at: now,
                },
            )
            .await?;
        }

        // Aggregated decrements, in sorted variant-id order. Each one is a
        // guarded update plus exactly one sale movement referencing this
        // order.
        for (variant_id, needed) in &decrements {
            StockLedger::adjust(
                conn,
                variant_id,
                -needed,
                user_id,
                OperationCode::Sale,
                None,
                Some(&order.id),
            )
            .await?;
        }

        info!(
            order_id = %order.id,
            lines = payload.items.len(),
            variants = decrements.len(),
            total = %order.total_cents,
            "Order created"
        );

        Ok(order)
    }

    /// Loads an order with its items.
    pub async fn get_order(conn: &mut SqliteConnection, order_id: &str) -> EngineResult<OrderDetail> {
        let order = OrderRepository::get_by_id(conn, order_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Order", order_id))?;
        let items = OrderRepository::items(conn, order_id).await?;

        Ok(OrderDetail { order, items })
    }
}

// =============================================================================
// Cached Loaders
// =============================================================================
// A variant can appear in several lines (directly and inside packs); each
// row is read once per order.

async fn load_variant(
    conn: &mut SqliteConnection,
    cache: &mut HashMap<String, Variant>,
    id: &str,
) -> EngineResult<Variant> {
    if let Some(variant) = cache.get(id) {
        return Ok(variant.clone());
    }
    let variant = VariantRepository::get_by_id(conn, id)
        .await?
        .ok_or_else(|| EngineError::not_found("Variant", id))?;
    cache.insert(id.to_string(), variant.clone());
    Ok(variant)
}

async fn load_type(
    conn: &mut SqliteConnection,
    cache: &mut HashMap<String, ProductType>,
    id: &str,
) -> EngineResult<ProductType> {
    if let Some(pt) = cache.get(id) {
        return Ok(pt.clone());
    }
    let pt = ProductTypeRepository::get_by_id(conn, id)
        .await?
        .ok_or_else(|| EngineError::not_found("ProductType", id))?;
    cache.insert(id.to_string(), pt.clone());
    Ok(pt)
}

async fn load_color(
    conn: &mut SqliteConnection,
    cache: &mut HashMap<String, Color>,
    id: &str,
) -> EngineResult<Color> {
    if let Some(color) = cache.get(id) {
        return Ok(color.clone());
    }
    let color = ColorRepository::get_by_id(conn, id)
        .await?
        .ok_or_else(|| EngineError::not_found("Color", id))?;
    cache.insert(id.to_string(), color.clone());
    Ok(color)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use sello_core::MovementKind;
    use sello_db::repository::{MovementRepository, PackRepository};

    fn variant_line(variant_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            variant_id: Some(variant_id.to_string()),
            quantity,
            ..Default::default()
        }
    }

    fn pack_line(pack_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            pack_id: Some(pack_id.to_string()),
            quantity,
            ..Default::default()
        }
    }

    fn guest() -> CustomerInfo {
        CustomerInfo {
            name: Some("Ana García".to_string()),
            email: Some("ana@example.com".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_simple_order_decrements_and_records() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        // Variant A starts at 10, min stock 5. Order 4 → 6 left.
        let order = engine
            .create_order(
                OrderPayload {
                    items: vec![variant_line(&cat.mug_white, 4)],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 4 * 900);
        assert_eq!(order.total_cents, 4 * 900);
        assert_eq!(order.status, OrderStatus::PendingPayment);

        {
            let mut conn = engine.database().acquire().await.unwrap();
            let variant = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(variant.quantity, 6);

            let movements = MovementRepository::list_by_order(&mut conn, &order.id)
                .await
                .unwrap();
            assert_eq!(movements.len(), 1);
            assert_eq!(movements[0].kind, MovementKind::Salida);
            assert_eq!(movements[0].quantity, 4);
            assert_eq!(movements[0].op_slug, "sale");
            assert_eq!(
                movements[0].variant_id.as_deref(),
                Some(cat.mug_white.as_str())
            );
        }

        // A follow-up order for 8 must fail: only 6 remain.
        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![variant_line(&cat.mug_white, 8)],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientStock {
                available: 6,
                requested: 8,
                ..
            }
        ));

        let mut conn = engine.database().acquire().await.unwrap();
        let variant = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(variant.quantity, 6);
    }

    #[tokio::test]
    async fn test_add_on_pricing() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        let order = engine
            .create_order(
                OrderPayload {
                    items: vec![OrderLine {
                        variant_id: Some(cat.mug_white.clone()),
                        quantity: 2,
                        add_ons: vec!["front".to_string(), "wrap".to_string()],
                        stamp_instructions: Some("logo centered".to_string()),
                        ..Default::default()
                    }],
                    customer: guest(),
                    shipping_cents: 350,
                },
                None,
            )
            .await
            .unwrap();

        // 900 base + 300 front + 550 wrap = 1750 per unit.
        assert_eq!(order.subtotal_cents, 2 * 1750);
        assert_eq!(order.total_cents, 2 * 1750 + 350);

        let mut conn = engine.database().acquire().await.unwrap();
        let detail = OrderFulfillment::get_order(&mut conn, &order.id).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].unit_price_cents, 1750);
        assert_eq!(
            detail.items[0].stamp_instructions.as_deref(),
            Some("logo centered")
        );
    }

    #[tokio::test]
    async fn test_undefined_add_on_rejected_before_any_write() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![OrderLine {
                        variant_id: Some(cat.mug_white.clone()),
                        quantity: 1,
                        add_ons: vec!["hologram".to_string()],
                        ..Default::default()
                    }],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let mut conn = engine.database().acquire().await.unwrap();
        assert_eq!(OrderRepository::count(&mut conn).await.unwrap(), 0);
        assert_eq!(MovementRepository::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pack_order_decrements_components() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        // duo pack: mug_white ×2/pack, shirt_navy_m ×1/pack. Order 3 packs.
        let order = engine
            .create_order(
                OrderPayload {
                    items: vec![pack_line(&cat.duo_pack, 3)],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap();

        // net pack price 3000 - 200 = 2800.
        assert_eq!(order.subtotal_cents, 3 * 2800);

        let mut conn = engine.database().acquire().await.unwrap();
        let mug = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
            .await
            .unwrap()
            .unwrap();
        let shirt = VariantRepository::get_by_id(&mut conn, &cat.shirt_navy_m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mug.quantity, 10 - 6);
        assert_eq!(shirt.quantity, 30 - 3);

        // One movement per affected variant, both tied to the same order.
        let movements = MovementRepository::list_by_order(&mut conn, &order.id)
            .await
            .unwrap();
        assert_eq!(movements.len(), 2);
        assert!(movements.iter().all(|m| m.op_slug == "sale"));
        let quantities: Vec<i64> = movements.iter().map(|m| m.quantity).collect();
        assert!(quantities.contains(&6));
        assert!(quantities.contains(&3));
    }

    #[tokio::test]
    async fn test_direct_and_pack_decrements_are_summed() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        // mug_white directly (qty 2) AND inside one duo pack (×2/pack).
        let order = engine
            .create_order(
                OrderPayload {
                    items: vec![
                        variant_line(&cat.mug_white, 2),
                        pack_line(&cat.duo_pack, 1),
                    ],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap();

        let mut conn = engine.database().acquire().await.unwrap();
        let mug = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mug.quantity, 10 - 4);

        // One combined movement for the mug (qty 4), one for the shirt.
        let movements = MovementRepository::list_by_order(&mut conn, &order.id)
            .await
            .unwrap();
        let mug_movements: Vec<_> = movements
            .iter()
            .filter(|m| m.variant_id.as_deref() == Some(cat.mug_white.as_str()))
            .collect();
        assert_eq!(mug_movements.len(), 1);
        assert_eq!(mug_movements[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_insufficient_pack_component_aborts_whole_order() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        // 6 packs need 12 mugs; only 10 exist. The shirt line alone would
        // be satisfiable - nothing may be written.
        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![
                        variant_line(&cat.shirt_navy_m, 1),
                        pack_line(&cat.duo_pack, 6),
                    ],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock { .. }));

        // Store state equals the pre-call snapshot.
        let mut conn = engine.database().acquire().await.unwrap();
        let mug = VariantRepository::get_by_id(&mut conn, &cat.mug_white)
            .await
            .unwrap()
            .unwrap();
        let shirt = VariantRepository::get_by_id(&mut conn, &cat.shirt_navy_m)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mug.quantity, 10);
        assert_eq!(shirt.quantity, 30);
        assert_eq!(OrderRepository::count(&mut conn).await.unwrap(), 0);
        assert_eq!(MovementRepository::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_guest_requires_valid_email() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![variant_line(&cat.mug_white, 1)],
                    customer: CustomerInfo::default(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![variant_line(&cat.mug_white, 1)],
                    customer: CustomerInfo {
                        email: Some("not-an-email".to_string()),
                        ..Default::default()
                    },
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        // An authenticated order carries the user instead.
        let order = engine
            .create_order(
                OrderPayload {
                    items: vec![variant_line(&cat.mug_white, 1)],
                    customer: CustomerInfo::default(),
                    shipping_cents: 0,
                },
                Some("user-7"),
            )
            .await
            .unwrap();
        assert_eq!(order.user_id.as_deref(), Some("user-7"));
        assert!(order.guest_email.is_none());
    }

    #[tokio::test]
    async fn test_line_must_reference_exactly_one_target() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![OrderLine {
                        variant_id: Some(cat.mug_white.clone()),
                        pack_id: Some(cat.duo_pack.clone()),
                        quantity: 1,
                        ..Default::default()
                    }],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![OrderLine {
                        quantity: 1,
                        ..Default::default()
                    }],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let engine = testutil::engine().await;
        testutil::seed_catalog(&engine).await;

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_inactive_pack_rejected() {
        let engine = testutil::engine().await;
        testutil::seed_catalog(&engine).await;

        let mut conn = engine.database().acquire().await.unwrap();
        let now = Utc::now();
        PackRepository::insert(
            &mut conn,
            &sello_core::Pack {
                id: "pack-off".to_string(),
                name: "Pack Retirado".to_string(),
                price_cents: 1000,
                discount_cents: 0,
                is_active: false,
                created_at: now,
                updated_at: now,
                deleted_at: Some(now),
            },
        )
        .await
        .unwrap();
        drop(conn);

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![pack_line("pack-off", 1)],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_inactive_pack_component_rejected() {
        let engine = testutil::engine().await;
        let cat = testutil::seed_catalog(&engine).await;

        // Deactivate the shirt via the repo directly (the ledger refuses
        // while the pack is active, which is exactly the point here).
        let mut conn = engine.database().acquire().await.unwrap();
        VariantRepository::deactivate(&mut conn, &cat.shirt_navy_m, false, Utc::now())
            .await
            .unwrap();
        drop(conn);

        let err = engine
            .create_order(
                OrderPayload {
                    items: vec![pack_line(&cat.duo_pack, 1)],
                    customer: guest(),
                    shipping_cents: 0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
