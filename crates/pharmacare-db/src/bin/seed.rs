//! # Seed Data Generator
//!
//! Populates a database with demo medicines, customers, a user and a few
//! sales for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pharmacare.db (or $PHARMACARE_DB_PATH)
//! cargo run -p pharmacare-db --bin seed
//!
//! # Specify database path
//! cargo run -p pharmacare-db --bin seed -- --db ./data/pharmacare.db
//! ```
//!
//! ## Generated Data
//! - 5 medicines: normal stock, low stock, expired, expiring within 10 days
//! - 2 customers
//! - 1 user: `test@example.com` / `password123`
//! - 2 sales (John Doe, walk-in)
//!
//! Skips everything if the database already has medicines.

use chrono::{Duration, NaiveDate, Utc};
use std::env;
use tracing_subscriber::EnvFilter;

use pharmacare_core::{
    NewCustomer, NewMedicine, NewSale, SaleLineItem, DASHBOARD_EXPIRY_WINDOW_DAYS,
};
use pharmacare_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pharmacare=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PharmaCare Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $PHARMACARE_DB_PATH or ./pharmacare.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 PharmaCare Seed Data Generator");
    println!("=================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::open(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.medicines().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} medicines", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    // Medicines
    let today = Utc::now().date_naive();
    let mut medicines = Vec::new();
    for medicine in demo_medicines(today) {
        let stored = db.medicines().insert(&medicine).await?;
        medicines.push(stored);
    }
    println!("✓ Added {} medicines", medicines.len());

    // Customers
    let john = db
        .customers()
        .insert(
            &NewCustomer::new("John Doe", "123-456-7890")
                .email("john.doe@example.com")
                .address("123 Main St"),
        )
        .await?;
    db.customers()
        .insert(
            &NewCustomer::new("Jane Smith", "987-654-3210")
                .email("jane.smith@example.com")
                .address("456 Oak Ave"),
        )
        .await?;
    println!("✓ Added 2 customers");

    // User
    db.users()
        .register("Test User", "test@example.com", "password123")
        .await?;
    db.users().record_login("test@example.com").await?;
    println!("✓ Added user test@example.com (password: password123)");

    // Sales
    let paracetamol = &medicines[0];
    let amoxicillin = &medicines[1];

    let sales = [
        NewSale::for_customer(&john).item(SaleLineItem::from_medicine(paracetamol, 2)),
        NewSale::walk_in().item(SaleLineItem::from_medicine(amoxicillin, 1)),
    ];
    for sale in &sales {
        db.sales().record_sale(sale).await?;
    }
    println!("✓ Recorded {} sales", sales.len());

    // Summary
    let summary = db.reports().dashboard(DASHBOARD_EXPIRY_WINDOW_DAYS).await?;
    println!();
    println!("Dashboard");
    println!("  Medicines:        {}", summary.total_medicines);
    println!("  Customers:        {}", summary.total_customers);
    println!("  Total sales:      {}", summary.total_sales);
    println!("  Low stock:        {}", summary.low_stock_count);
    println!(
        "  Expiring ({} d):  {}",
        DASHBOARD_EXPIRY_WINDOW_DAYS, summary.expiring_count
    );

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// The demo catalog. Paracetamol and Amoxicillin come first; the sales use them.
fn demo_medicines(today: NaiveDate) -> Vec<NewMedicine> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today);

    vec![
        NewMedicine::new("Paracetamol 500mg", 550, 100)
            .brand("Tylenol")
            .category("Pain Relief")
            .expiry_date(date(2027, 12, 31)),
        NewMedicine::new("Amoxicillin 250mg", 1275, 50)
            .brand("Amoxil")
            .category("Antibiotic")
            .low_stock_alert(5)
            .expiry_date(date(2027, 10, 15)),
        NewMedicine::new("Expired Med", 1000, 5)
            .brand("Brand X")
            .category("Expired")
            .expiry_date(date(2023, 1, 1)),
        NewMedicine::new("Low Stock Med", 2000, 2)
            .brand("Brand Y")
            .category("Pain")
            .low_stock_alert(5)
            .expiry_date(date(2027, 1, 1)),
        NewMedicine::new("Expiring Soon", 1500, 10)
            .brand("Brand Z")
            .category("Supplement")
            .expiry_date(today + Duration::days(10)),
    ]
}
