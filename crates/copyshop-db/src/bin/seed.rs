//! # Seed Data Generator
//!
//! Populates the database with a print-shop catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./copyshop_dev.db
//! cargo run -p copyshop-db --bin seed
//!
//! # Specify database path
//! cargo run -p copyshop-db --bin seed -- --db ./data/copyshop.db
//! ```
//!
//! Products get sequential codes (`P001`, `P002`, ...) in catalog order.

use std::env;

use copyshop_core::catalog::next_product_code;
use copyshop_core::{Money, Product};
use copyshop_db::{Database, DbConfig};

/// (name, price in Rupiah) grouped by service.
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Fotokopi",
        &[
            ("Fotokopi A4 Hitam Putih", 250),
            ("Fotokopi F4 Hitam Putih", 300),
            ("Fotokopi A4 Bolak-balik", 400),
            ("Fotokopi A3 Hitam Putih", 1_000),
            ("Fotokopi A4 Warna", 1_500),
        ],
    ),
    (
        "Print",
        &[
            ("Print A4 Hitam Putih", 500),
            ("Print A4 Warna", 1_500),
            ("Print A4 Warna Full Gambar", 3_000),
            ("Print A3 Warna", 5_000),
            ("Print Foto 4R", 3_000),
            ("Print Art Paper A4", 4_000),
        ],
    ),
    (
        "Jilid",
        &[
            ("Jilid Lakban", 3_000),
            ("Jilid Spiral Kawat", 10_000),
            ("Jilid Spiral Plastik", 7_000),
            ("Jilid Hard Cover", 25_000),
            ("Jilid Soft Cover", 15_000),
        ],
    ),
    (
        "Finishing",
        &[
            ("Laminating A4", 5_000),
            ("Laminating KTP", 3_000),
            ("Potong Kertas", 1_000),
            ("Pres Kartu Nama (per box)", 35_000),
        ],
    ),
    (
        "Scan & Digital",
        &[
            ("Scan Dokumen per Lembar", 2_000),
            ("Scan ke Flashdisk", 3_000),
            ("Ketik Dokumen per Halaman", 5_000),
            ("Edit Pas Foto", 10_000),
        ],
    ),
    (
        "ATK",
        &[
            ("Map Plastik", 2_000),
            ("Amplop Coklat F4", 1_500),
            ("Kertas HVS A4 (per rim)", 55_000),
            ("Materai 10.000", 12_000),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./copyshop_dev.db");

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
                println!("Copyshop POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./copyshop_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Copyshop POS Seed Data Generator");
    println!("================================");
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

    let mut codes: Vec<String> = Vec::new();
    for (group, products) in CATALOG {
        for (name, price) in products.iter() {
            let code = next_product_code(&codes);
            let product = Product::new(code.clone(), *name, Money::from_minor(*price));

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.code, e);
                continue;
            }
            codes.push(code);
        }
        println!("  {:<16} {} products", group, products.len());
    }

    println!();
    println!("✓ Generated {} products", codes.len());

    let results = db.products().search("jilid").await?;
    println!("  Search 'jilid': {} results", results.len());

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
