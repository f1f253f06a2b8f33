//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./scanpos_dev.db
//! cargo run -p scanpos-db --bin seed
//!
//! # Specify database path
//! cargo run -p scanpos-db --bin seed -- --db ./data/scanpos.db
//! ```
//!
//! ## Generated Products
//! One product per entry in [`CATALOG`], spread across the GST slabs
//! (0%, 5%, 12%, 18%, 28%). Every product gets a random 13-digit barcode
//! and a stock level chosen so that some items show as low or out of stock.

use std::env;

use chrono::Utc;
use scanpos_core::barcode::generate_barcode;
use scanpos_core::Product;
use scanpos_db::{Database, DbConfig};
use uuid::Uuid;

/// (category, name, price in paise, GST in basis points)
const CATALOG: &[(&str, &str, i64, u32)] = &[
    ("Staples", "Basmati Rice 1kg", 12_500, 0),
    ("Staples", "Toor Dal 1kg", 16_000, 0),
    ("Staples", "Whole Wheat Atta 5kg", 26_500, 0),
    ("Staples", "Sugar 1kg", 4_800, 500),
    ("Staples", "Iodised Salt 1kg", 2_800, 0),
    ("Dairy", "Toned Milk 500ml", 2_900, 0),
    ("Dairy", "Paneer 200g", 9_000, 500),
    ("Dairy", "Butter 100g", 5_600, 1200),
    ("Dairy", "Curd 400g", 3_500, 500),
    ("Beverages", "Assam Tea 250g", 14_000, 500),
    ("Beverages", "Instant Coffee 50g", 17_500, 1800),
    ("Beverages", "Cola 750ml", 4_000, 2800),
    ("Beverages", "Mango Drink 1L", 9_900, 1200),
    ("Snacks", "Salted Chips 52g", 2_000, 1200),
    ("Snacks", "Glucose Biscuits 250g", 3_000, 1800),
    ("Snacks", "Chocolate Bar 40g", 4_000, 1800),
    ("Personal Care", "Bath Soap 100g", 4_500, 1800),
    ("Personal Care", "Toothpaste 150g", 9_800, 1800),
    ("Personal Care", "Shampoo 180ml", 18_500, 1800),
    ("Household", "Detergent Powder 1kg", 12_000, 1800),
    ("Household", "Dishwash Bar 300g", 3_200, 1800),
    ("Household", "Room Freshener 240ml", 21_000, 2800),
];

/// (stock, threshold) pairs cycled across the catalog
const STOCK_LEVELS: &[(i64, i64)] = &[(120, 10), (45, 10), (8, 10), (0, 5), (60, 15)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./scanpos_dev.db");

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
                println!("ScanPOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./scanpos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 ScanPOS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (index, entry) in CATALOG.iter().enumerate() {
        let product = demo_product(entry, STOCK_LEVELS[index % STOCK_LEVELS.len()]);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }

        println!(
            "  {:<24} {:>13}  ₹{:>8}  GST {:>2}%",
            product.name,
            product.barcode,
            product.price().to_string(),
            product.tax_rate().percentage()
        );
        generated += 1;
    }

    println!();
    println!("✓ Generated {} products", generated);

    db.close().await;
    Ok(())
}

fn demo_product(
    &(category, name, price_cents, tax_rate_bps): &(&str, &str, i64, u32),
    (stock_quantity, min_stock_threshold): (i64, i64),
) -> Product {
    let now = Utc::now();

    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price_cents,
        tax_rate_bps,
        stock_quantity,
        min_stock_threshold,
        barcode: generate_barcode(),
        category: Some(category.to_string()),
        created_at: now,
        updated_at: now,
    }
}
