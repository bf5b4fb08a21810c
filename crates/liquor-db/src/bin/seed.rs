//! # Seed Data Generator
//!
//! Populates a database with a liquor catalog for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 liquors (default)
//! cargo run -p liquor-db --bin seed
//!
//! # Generate a custom amount into a specific file
//! cargo run -p liquor-db --bin seed -- --count 1000 --db ./data/liquor_store.db
//! ```
//!
//! ## Generated Liquors
//! Every category gets a share of the catalog. Each liquor has:
//! - A name built from a base label and a bottling (`Highland Single Malt 12 Year`)
//! - A brand cycled from the category's producers
//! - Price rising with age / size of the bottling
//! - Stock 0 - 60, so the low-stock advisory has something to report

use liquor_core::{LiquorCategory, NewProduct};
use liquor_db::{Database, DbConfig};
use std::env;

struct CategoryCatalog {
    category: LiquorCategory,
    labels: &'static [&'static str],
    brands: &'static [&'static str],
    abv: (f64, f64),
    volume_ml: i64,
    base_price_cents: i64,
}

const CATALOG: &[CategoryCatalog] = &[
    CategoryCatalog {
        category: LiquorCategory::Whiskey,
        labels: &["Highland Single Malt", "Islay Peated Malt", "Kentucky Bourbon", "Rye Whiskey", "Irish Blend"],
        brands: &["Glen Corrie", "Port Ellen Co", "Old Fitch", "Copper Still"],
        abv: (40.0, 46.0),
        volume_ml: 700,
        base_price_cents: 3499,
    },
    CategoryCatalog {
        category: LiquorCategory::Vodka,
        labels: &["Wheat Vodka", "Potato Vodka", "Citrus Vodka", "Rye Vodka"],
        brands: &["Volga Spirits", "Nordic Frost", "Crystal Birch"],
        abv: (37.5, 40.0),
        volume_ml: 750,
        base_price_cents: 1899,
    },
    CategoryCatalog {
        category: LiquorCategory::Rum,
        labels: &["White Rum", "Dark Rum", "Spiced Rum", "Añejo Rum"],
        brands: &["Caribe Cane", "Santa Teresa Co", "Isla Verde"],
        abv: (37.5, 43.0),
        volume_ml: 750,
        base_price_cents: 1999,
    },
    CategoryCatalog {
        category: LiquorCategory::Tequila,
        labels: &["Blanco", "Reposado", "Añejo", "Mezcal Joven"],
        brands: &["Agave Azul", "Los Altos", "Cielo Rojo"],
        abv: (38.0, 40.0),
        volume_ml: 750,
        base_price_cents: 2699,
    },
    CategoryCatalog {
        category: LiquorCategory::Gin,
        labels: &["London Dry Gin", "Old Tom Gin", "Navy Strength Gin", "Pink Gin"],
        brands: &["Juniper & Co", "Thames Botanicals", "Hedgerow"],
        abv: (40.0, 57.0),
        volume_ml: 700,
        base_price_cents: 2399,
    },
    CategoryCatalog {
        category: LiquorCategory::Wine,
        labels: &["Cabernet Sauvignon", "Merlot", "Malbec", "Sauvignon Blanc", "Rioja Crianza"],
        brands: &["Valle Alto", "Chateau Pierre", "Bodegas Sol"],
        abv: (11.5, 14.5),
        volume_ml: 750,
        base_price_cents: 1299,
    },
    CategoryCatalog {
        category: LiquorCategory::Beer,
        labels: &["Pilsner", "IPA", "Stout", "Wheat Beer", "Amber Lager"],
        brands: &["Harbor Brewing", "Red Barn", "Three Rivers"],
        abv: (4.2, 7.5),
        volume_ml: 330,
        base_price_cents: 299,
    },
    CategoryCatalog {
        category: LiquorCategory::Other,
        labels: &["Coffee Liqueur", "Orange Liqueur", "Amaretto", "Absinthe"],
        brands: &["Casa Dolce", "Verte Maison", "Bitter End"],
        abv: (20.0, 68.0),
        volume_ml: 700,
        base_price_cents: 2199,
    },
];

/// Bottlings: (suffix, price addon in cents)
const BOTTLINGS: &[(&str, i64)] = &[
    ("", 0),
    ("Reserve", 800),
    ("Small Batch", 1200),
    ("12 Year", 2000),
    ("Limited Edition", 3500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./liquor_store.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse().map_err(|_| format!("invalid --count {value:?}"))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Liquor store seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of liquors to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./liquor_store.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument {other:?}");
            }
        }
        i += 1;
    }

    println!("Liquor store seed data generator");
    println!("================================");
    println!("Database: {db_path}");
    println!("Liquors:  {count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} liquors");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let product = generate_liquor(seed);
        let name = product.name.clone();

        if let Err(e) = db.products().create(product).await {
            eprintln!("Failed to insert {name}: {e}");
            continue;
        }

        generated += 1;
        if generated % 100 == 0 {
            println!("  Generated {generated} liquors...");
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {generated} liquors in {elapsed:?}");

    let low = db.products().low_stock().await?;
    println!("  Low-stock advisory: {} liquors", low.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the `seed`-th liquor. Deterministic, so reruns produce the same
/// catalog.
fn generate_liquor(seed: usize) -> NewProduct {
    let entry = &CATALOG[seed % CATALOG.len()];
    let round = seed / CATALOG.len();

    let label = entry.labels[round % entry.labels.len()];
    let (bottling, addon) = BOTTLINGS[(round / entry.labels.len()) % BOTTLINGS.len()];
    let brand = entry.brands[seed % entry.brands.len()];

    let name = if bottling.is_empty() {
        label.to_string()
    } else {
        format!("{label} {bottling}")
    };

    // spread ABV across the category range in tenths
    let (low, high) = entry.abv;
    let steps = ((high - low) * 10.0) as usize + 1;
    let alcohol_content = low + ((seed * 7) % steps) as f64 / 10.0;

    let price_cents = entry.base_price_cents + addon + ((seed * 37) % 500) as i64;
    let stock = ((seed * 13) % 61) as i64;

    NewProduct {
        name,
        brand: brand.to_string(),
        description: format!("{} by {}, {} ml", entry.category, brand, entry.volume_ml),
        category: entry.category,
        price_cents,
        alcohol_content,
        volume_ml: entry.volume_ml,
        stock,
        supplier: format!("{} Distribution", brand),
        minimum_stock: liquor_core::DEFAULT_MINIMUM_STOCK,
    }
}
