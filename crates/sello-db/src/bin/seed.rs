//! # Seed Data Generator
//!
//! Populates the database with a development catalog: colors, product
//! types (with their stamping price maps), variants with opening stock,
//! and a couple of packs. Every variant's opening stock is recorded as an
//! `initial_load` movement so the ledger starts consistent.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p sello-db --bin seed
//!
//! # Specify database path
//! cargo run -p sello-db --bin seed -- --db ./data/sello.db
//! ```

use std::env;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sello_core::movement::OperationCode;
use sello_core::{Color, Movement, MovementKind, Pack, PackItem, ProductCategory, ProductType, Variant};
use sello_db::repository::{
    ColorRepository, MovementRepository, PackRepository, ProductTypeRepository, VariantRepository,
};
use sello_db::{Database, DbConfig};

/// Catalog colors: (name, hex code).
const COLORS: &[(&str, &str)] = &[
    ("White", "#FFFFFF"),
    ("Black", "#111111"),
    ("Red", "#C0392B"),
    ("Navy", "#1F3A5F"),
    ("Green", "#1E8449"),
];

/// Product types: (name, category, sized, base price cents, stamping map).
const TYPES: &[(&str, ProductCategory, bool, i64, &str)] = &[
    (
        "Camiseta Básica",
        ProductCategory::Apparel,
        true,
        1400,
        r#"{"front": 450, "back": 600, "sleeve": 250}"#,
    ),
    (
        "Sudadera Capucha",
        ProductCategory::Apparel,
        true,
        2900,
        r#"{"front": 600, "back": 800}"#,
    ),
    (
        "Taza Clásica",
        ProductCategory::Drinkware,
        false,
        900,
        r#"{"front": 300, "wrap": 550}"#,
    ),
    (
        "Botella Térmica",
        ProductCategory::Drinkware,
        false,
        1900,
        r#"{"front": 400}"#,
    ),
    (
        "Libreta A5",
        ProductCategory::Stationery,
        false,
        700,
        r#"{"cover": 350}"#,
    ),
    (
        "Tote Bag",
        ProductCategory::Accessory,
        false,
        1100,
        r#"{"front": 400, "back": 500}"#,
    ),
];

/// Size ladder for sized types: (label, price addon cents).
const SIZES: &[(&str, i64)] = &[("S", 0), ("M", 0), ("L", 100), ("XL", 200)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./sello_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Sello Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./sello_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Sello Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut conn = db.acquire().await?;

    let existing = ProductTypeRepository::count_active(&mut conn).await?;
    if existing > 0 {
        println!("⚠ Database already has {} product types", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let start = std::time::Instant::now();

    // Colors
    let mut color_ids: Vec<(String, String)> = Vec::new();
    for (name, hex) in COLORS {
        let color = Color {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            hex_code: (*hex).to_string(),
            created_at: now,
        };
        ColorRepository::insert(&mut conn, &color).await?;
        color_ids.push((color.id, color.name));
    }
    println!("✓ Seeded {} colors", color_ids.len());

    // Product types, variants, opening-stock movements
    let mut variants: Vec<(Variant, String, String)> = Vec::new(); // (variant, type name, color name)
    let mut seed_idx: usize = 0;

    for (name, category, sized, base_price, stamping) in TYPES {
        let pt = ProductType {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            category: *category,
            sized: *sized,
            stamping_prices_json: (*stamping).to_string(),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        ProductTypeRepository::insert(&mut conn, &pt).await?;

        let sizes: &[(&str, i64)] = if *sized { SIZES } else { &[("", 0)] };

        for (color_id, color_name) in &color_ids {
            for (size_label, addon) in sizes {
                seed_idx += 1;
                let opening_stock = ((seed_idx * 13) % 60) as i64;

                let variant = Variant {
                    id: Uuid::new_v4().to_string(),
                    product_type_id: pt.id.clone(),
                    color_id: color_id.clone(),
                    size: (!size_label.is_empty()).then(|| (*size_label).to_string()),
                    quantity: opening_stock,
                    min_stock: category.default_min_stock(),
                    price_cents: base_price + addon,
                    is_active: true,
                    deactivated_by_parent: false,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                VariantRepository::insert(&mut conn, &variant).await?;

                // Ledger opens with the stock it will account for.
                let op = OperationCode::InitialLoad.info();
                let kind = MovementKind::from_delta(opening_stock);
                let movement = Movement {
                    id: Uuid::new_v4().to_string(),
                    kind,
                    quantity: opening_stock,
                    op_slug: op.slug.to_string(),
                    op_code: op.code.to_string(),
                    reason: op.reason.to_string(),
                    changes_json: None,
                    item_name: Some(display_name(&pt.name, color_name, variant.size.as_deref())),
                    color_name: Some(color_name.clone()),
                    size: variant.size.clone(),
                    price_cents: Some(variant.price_cents),
                    variant_id: Some(variant.id.clone()),
                    user_id: Some("seed".to_string()),
                    order_id: None,
                    created_at: now,
                    deleted_at: None,
                };
                MovementRepository::insert(&mut conn, &movement).await?;

                variants.push((variant, pt.name.clone(), color_name.clone()));
            }
        }
    }
    println!("✓ Seeded {} variants with opening stock", variants.len());

    // Packs: welcome pack (mug + tote), team pack (2 shirts + mug)
    let mug = variants
        .iter()
        .find(|(_, t, c)| t == "Taza Clásica" && c == "White")
        .expect("seed catalog has a white mug");
    let tote = variants
        .iter()
        .find(|(_, t, c)| t == "Tote Bag" && c == "Black")
        .expect("seed catalog has a black tote");
    let shirt = variants
        .iter()
        .find(|(v, t, c)| t == "Camiseta Básica" && c == "Navy" && v.size.as_deref() == Some("M"))
        .expect("seed catalog has a navy M shirt");

    let packs: &[(&str, i64, i64, &[(&Variant, i64)])] = &[
        (
            "Pack Bienvenida",
            2200,
            200,
            &[(&mug.0, 1), (&tote.0, 1)],
        ),
        (
            "Pack Equipo",
            4200,
            500,
            &[(&shirt.0, 2), (&mug.0, 1)],
        ),
    ];

    for (name, price, discount, components) in packs {
        let pack = Pack {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            price_cents: *price,
            discount_cents: *discount,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        PackRepository::insert(&mut conn, &pack).await?;

        for (variant, qty) in *components {
            let item = PackItem {
                id: Uuid::new_v4().to_string(),
                pack_id: pack.id.clone(),
                variant_id: variant.id.clone(),
                qty_per_pack: *qty,
            };
            PackRepository::insert_item(&mut conn, &item).await?;
        }
    }
    println!("✓ Seeded {} packs", packs.len());

    let elapsed = start.elapsed();
    println!();
    println!("✓ Seed complete in {:?}", elapsed);

    Ok(())
}

/// Composes the display name frozen into movement snapshots.
fn display_name(type_name: &str, color_name: &str, size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{} {} {}", type_name, color_name, size),
        None => format!("{} {}", type_name, color_name),
    }
}
