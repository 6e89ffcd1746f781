//! # Seed Data Generator
//!
//! Populates the database with a floor plan, menu and printer registry for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p cafe-db --bin seed
//!
//! # Specify database path
//! cargo run -p cafe-db --bin seed -- --db ./data/cafe.db
//! ```
//!
//! ## Generated Data
//! - 12 tables across "main hall" and "terrace" (table 1 is the owner table)
//! - Category tree: drinks (hot drinks, fresh juices), food (sandwiches,
//!   desserts), shisha
//! - A menu of products with Arabic names under each leaf category
//! - One printer per station

use std::env;

use cafe_db::{Database, DbConfig};

/// Menu rows: (category, name, arabic name, price in fils).
const MENU: &[(&str, &str, &str, i64)] = &[
    ("hot drinks", "Espresso", "اسبريسو", 1000),
    ("hot drinks", "Double Espresso", "اسبريسو دبل", 1400),
    ("hot drinks", "Cappuccino", "كابتشينو", 1600),
    ("hot drinks", "Latte", "لاتيه", 1600),
    ("hot drinks", "Turkish Coffee", "قهوة تركية", 1200),
    ("hot drinks", "Moroccan Tea", "شاي مغربي", 1500),
    ("fresh juices", "Orange Juice", "عصير برتقال", 1800),
    ("fresh juices", "Lemon Mint", "ليمون بالنعناع", 1700),
    ("fresh juices", "Mango Juice", "عصير مانجو", 2000),
    ("fresh juices", "Avocado Cocktail", "كوكتيل أفوكادو", 2400),
    ("sandwiches", "Club Sandwich", "كلوب ساندويتش", 2800),
    ("sandwiches", "Halloumi Sandwich", "ساندويتش حلومي", 2200),
    ("sandwiches", "Chicken Shawarma", "شاورما دجاج", 1800),
    ("desserts", "Kunafa", "كنافة", 2500),
    ("desserts", "Umm Ali", "أم علي", 2000),
    ("desserts", "Cheesecake", "تشيز كيك", 2300),
    ("shisha", "Double Apple", "تفاحتين", 4000),
    ("shisha", "Grape Mint", "عنب نعناع", 4000),
    ("shisha", "Lemon Mint Shisha", "شيشة ليمون نعناع", 4200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cafe_dev.db");

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
                println!("CafePOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cafe_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 CafePOS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Skip seeding if a floor plan already exists
    let existing = db.tables().list_active().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} tables", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Floor plan: table 1 is the owner table
    println!();
    println!("Creating floor plan...");
    db.tables().create(1, "main hall", true).await?;
    for number in 2..=8 {
        db.tables().create(number, "main hall", false).await?;
    }
    for number in 9..=12 {
        db.tables().create(number, "terrace", false).await?;
    }
    println!("  12 tables across 2 halls");

    // Category tree
    println!("Creating categories...");
    let catalog = db.catalog();
    let drinks = catalog.create_category("drinks", None).await?;
    let food = catalog.create_category("food", None).await?;
    catalog.create_category("shisha", None).await?;
    catalog
        .create_category("hot drinks", Some(&drinks.id))
        .await?;
    catalog
        .create_category("fresh juices", Some(&drinks.id))
        .await?;
    catalog.create_category("sandwiches", Some(&food.id)).await?;
    catalog.create_category("desserts", Some(&food.id)).await?;

    let categories = catalog.list_categories().await?;

    // Menu
    println!("Creating menu...");
    for (category, name, name_ar, price_cents) in MENU {
        let category_id = categories
            .iter()
            .find(|c| c.name == *category)
            .map(|c| c.id.clone())
            .ok_or_else(|| format!("seed category missing: {category}"))?;
        catalog
            .create_product(name, Some(name_ar), *price_cents, &[category_id])
            .await?;
    }
    println!("  {} products", MENU.len());

    // Printer registry
    println!("Registering printers...");
    let printers = db.printers();
    printers
        .upsert(cafe_core::Station::Cashier, "192.168.1.40:9100")
        .await?;
    printers
        .upsert(cafe_core::Station::Barista, "192.168.1.41:9100")
        .await?;
    printers
        .upsert(cafe_core::Station::Kitchen, "192.168.1.42:9100")
        .await?;
    printers
        .upsert(cafe_core::Station::Shisha, "192.168.1.43:9100")
        .await?;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
