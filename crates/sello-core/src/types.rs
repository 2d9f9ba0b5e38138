//! # Domain Types
//!
//! Core domain types used throughout Sello.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ProductType    │   │    Variant      │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  product_type   │◄──│  variant (null  │       │
//! │  │  category       │   │  color + size   │   │    after purge) │       │
//! │  │  stamping map   │   │  quantity ≥ 0   │   │  kind, op, qty  │       │
//! │  └─────────────────┘   └─────────────────┘   │  frozen snapshot│       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderItem     │   │   Pack          │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  subtotal/total │◄──│  variant XOR    │──►│  price,discount │       │
//! │  │  status machine │   │    pack         │   │  PackItems      │       │
//! │  │  user or guest  │   │  frozen price   │   │  qty_per_pack   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for database relations; human-facing
//! identity (names, codes) is kept separate and mutable.
//!
//! ## Snapshot Pattern
//! Movements and order items copy the fields they report on (name, color,
//! size, price) at creation time. History stays truthful even when the
//! catalog changes later.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::movement::MovementKind;
use crate::status::OrderStatus;

// =============================================================================
// Color
// =============================================================================

/// A catalog color referenced by variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Color {
    pub id: String,
    pub name: String,
    /// Display hex code, `#RRGGBB`.
    pub hex_code: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product Category
// =============================================================================

/// Catalog category of a product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Shirts, hoodies, aprons. Sized.
    Apparel,
    /// Mugs, bottles, glasses.
    Drinkware,
    /// Notebooks, cards, calendars.
    Stationery,
    /// Keychains, badges, totes.
    Accessory,
}

impl ProductCategory {
    /// Default minimum-stock threshold applied when a variant is created
    /// without an explicit one.
    ///
    /// Thresholds follow replenishment lead time: apparel restocks slowly,
    /// stationery is printed in bulk on demand.
    pub const fn default_min_stock(&self) -> i64 {
        match self {
            ProductCategory::Apparel => 5,
            ProductCategory::Drinkware => 10,
            ProductCategory::Stationery => 20,
            ProductCategory::Accessory => 10,
        }
    }
}

// =============================================================================
// Product Type
// =============================================================================

/// A catalog entry: the stampable product a customer picks before choosing
/// color and size.
///
/// Owns zero or more [`Variant`]s. Soft-deletable; deactivation cascades to
/// its active variants through the lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductType {
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    /// Whether variants of this type carry a size.
    pub sized: bool,
    /// JSON map: stamping slug → surcharge cents (the "stamping levels").
    /// Raw column value; use [`ProductType::stamping_prices`].
    pub stamping_prices_json: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ProductType {
    /// Decodes the stamping price map (stamping slug → surcharge cents).
    pub fn stamping_prices(&self) -> Result<BTreeMap<String, i64>, serde_json::Error> {
        serde_json::from_str(&self.stamping_prices_json)
    }
}

// =============================================================================
// Variant
// =============================================================================

/// One purchasable SKU: product type + color + optional size.
///
/// ## Quantity Discipline
/// `quantity` is mutated ONLY through the stock ledger, which pairs every
/// change with exactly one [`Movement`]. Nothing else writes this column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Variant {
    pub id: String,
    pub product_type_id: String,
    pub color_id: String,
    /// `None` when the parent type is not sized.
    pub size: Option<String>,
    /// On-hand stock; never negative at transaction commit.
    pub quantity: i64,
    /// Replenishment threshold for the low-stock report.
    pub min_stock: i64,
    pub price_cents: i64,
    pub is_active: bool,
    /// Set when deactivation cascaded from the parent type; distinguishes
    /// cascade victims from manually deactivated variants on restore.
    pub deactivated_by_parent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Variant {
    /// Returns the base price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether on-hand stock covers a requested quantity.
    pub fn can_cover(&self, requested: i64) -> bool {
        self.quantity >= requested
    }

    /// Checks whether the variant is at or below its replenishment threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

// =============================================================================
// Pack
// =============================================================================

/// A named bundle of variants sold as one order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Pack {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub discount_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Pack {
    /// The effective unit price of the pack: list price minus discount.
    #[inline]
    pub fn net_price_cents(&self) -> i64 {
        self.price_cents - self.discount_cents
    }

    /// Returns the effective unit price as Money.
    #[inline]
    pub fn net_price(&self) -> Money {
        Money::from_cents(self.net_price_cents())
    }
}

/// One component of a pack: a variant and how many units each pack needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PackItem {
    pub id: String,
    pub pack_id: String,
    pub variant_id: String,
    pub qty_per_pack: i64,
}

// =============================================================================
// Order
// =============================================================================

/// A customer order.
///
/// Either `user_id` (authenticated customer) or `guest_email` (guest
/// checkout) identifies the buyer; guest orders require a contact email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub ship_address: Option<String>,
    pub ship_city: Option<String>,
    pub ship_postal: Option<String>,
    pub ship_country: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
///
/// References exactly one of {variant, pack} - never both, never neither.
/// Uses the snapshot pattern to freeze name and unit price at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub variant_id: Option<String>,
    pub pack_id: Option<String>,
    pub quantity: i64,
    /// Unit price in cents at order time (frozen, add-ons included).
    pub unit_price_cents: i64,
    /// Display name at order time (frozen).
    pub name_snapshot: String,
    /// Customer-uploaded stamp artwork, if any.
    pub stamp_image_url: Option<String>,
    pub stamp_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the line total (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One field edit recorded in a movement's `changes` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

/// An immutable audit record of a stock quantity change or metadata change.
///
/// ## Append-Only Discipline
/// Movements are inserted in the same transaction as the change they
/// describe and are NEVER updated or deleted afterwards. `variant_id`
/// becomes null when the variant is purged; the snapshot columns keep
/// reporting truthful.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub kind: MovementKind,
    /// Magnitude of the change (≥ 0); direction is carried by `kind`.
    pub quantity: i64,
    /// Operation catalog slug (why the movement happened).
    pub op_slug: String,
    /// Short display code resolved from the catalog.
    pub op_code: String,
    /// Human-readable reason (caller-supplied or catalog default).
    pub reason: String,
    /// JSON map field → {old, new} for metadata-only movements.
    /// Raw column value; use [`Movement::changes`].
    pub changes_json: Option<String>,
    /// Snapshot: variant display name at movement time (frozen). Null for
    /// movements that audit an order rather than a variant.
    pub item_name: Option<String>,
    /// Snapshot: color name at movement time (frozen).
    pub color_name: Option<String>,
    /// Snapshot: size at movement time (frozen).
    pub size: Option<String>,
    /// Snapshot: price at movement time (frozen).
    pub price_cents: Option<i64>,
    /// Null after the variant is purged.
    pub variant_id: Option<String>,
    /// The acting user; null for guest-originated movements.
    pub user_id: Option<String>,
    /// The originating order, when the movement belongs to one.
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Mirrors the variant's lifecycle; the engine never sets it.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Movement {
    /// Decodes the `changes` map, if present.
    pub fn changes(&self) -> Result<Option<BTreeMap<String, FieldChange>>, serde_json::Error> {
        match &self.changes_json {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    /// Returns the snapshot price as Money, when a variant snapshot exists.
    #[inline]
    pub fn price(&self) -> Option<Money> {
        self.price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(quantity: i64, min_stock: i64) -> Variant {
        let now = Utc::now();
        Variant {
            id: "v1".to_string(),
            product_type_id: "t1".to_string(),
            color_id: "c1".to_string(),
            size: Some("M".to_string()),
            quantity,
            min_stock,
            price_cents: 1500,
            is_active: true,
            deactivated_by_parent: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_variant_can_cover() {
        let v = variant(10, 5);
        assert!(v.can_cover(10));
        assert!(!v.can_cover(11));
    }

    #[test]
    fn test_variant_low_stock() {
        assert!(variant(5, 5).is_low_stock());
        assert!(variant(3, 5).is_low_stock());
        assert!(!variant(6, 5).is_low_stock());
    }

    #[test]
    fn test_pack_net_price() {
        let now = Utc::now();
        let pack = Pack {
            id: "p1".to_string(),
            name: "Starter pack".to_string(),
            price_cents: 5000,
            discount_cents: 750,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert_eq!(pack.net_price_cents(), 4250);
    }

    #[test]
    fn test_stamping_prices_decode() {
        let now = Utc::now();
        let pt = ProductType {
            id: "t1".to_string(),
            name: "Mug".to_string(),
            category: ProductCategory::Drinkware,
            sized: false,
            stamping_prices_json: r#"{"front": 300, "wrap": 550}"#.to_string(),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let prices = pt.stamping_prices().unwrap();
        assert_eq!(prices.get("front"), Some(&300));
        assert_eq!(prices.get("wrap"), Some(&550));
        assert_eq!(prices.get("back"), None);
    }

    #[test]
    fn test_movement_changes_decode() {
        let now = Utc::now();
        let movement = Movement {
            id: "m1".to_string(),
            kind: MovementKind::Ajuste,
            quantity: 0,
            op_slug: "price_change".to_string(),
            op_code: "AJU-PRECIO".to_string(),
            reason: "cambio de precio".to_string(),
            changes_json: Some(r#"{"price_cents": {"old": "1500", "new": "1800"}}"#.to_string()),
            item_name: Some("Mug Classic".to_string()),
            color_name: Some("White".to_string()),
            size: None,
            price_cents: Some(1800),
            variant_id: Some("v1".to_string()),
            user_id: Some("admin".to_string()),
            order_id: None,
            created_at: now,
            deleted_at: None,
        };
        let changes = movement.changes().unwrap().unwrap();
        let change = changes.get("price_cents").unwrap();
        assert_eq!(change.old, "1500");
        assert_eq!(change.new, "1800");
    }

    #[test]
    fn test_default_min_stock_by_category() {
        assert_eq!(ProductCategory::Apparel.default_min_stock(), 5);
        assert_eq!(ProductCategory::Stationery.default_min_stock(), 20);
    }
}
