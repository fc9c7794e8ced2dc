//! # Seed Data Generator
//!
//! Populates the database with lendable items and borrowers for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p loantrack-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p loantrack-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p loantrack-db --bin seed -- --db ./data/loantrack.db
//! ```
//!
//! ## Generated Data
//! - Products across categories (tools, AV, camping, lab, sports)
//! - Barcode: `{CATEGORY}{INDEX:05}`, e.g. `TOOL00042`
//! - A handful of borrowers
//! - One open loan for every tenth product, so the dashboard is not empty

use chrono::{Duration, Utc};
use std::env;
use loantrack_core::{CheckoutResult, Product, User};
use loantrack_db::{Database, DbConfig};
use uuid::Uuid;

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "TOOL",
        &[
            "Cordless Drill",
            "Impact Driver",
            "Circular Saw",
            "Jigsaw",
            "Orbital Sander",
            "Step Ladder",
            "Laser Level",
            "Stud Finder",
            "Socket Set",
            "Pipe Wrench",
        ],
    ),
    (
        "AV",
        &[
            "Projector",
            "Portable Screen",
            "Wireless Microphone",
            "PA Speaker",
            "HDMI Switcher",
            "Webcam",
            "Camera Tripod",
            "DSLR Camera",
            "Ring Light",
            "Document Camera",
        ],
    ),
    (
        "CAMP",
        &[
            "Two-Person Tent",
            "Sleeping Bag",
            "Camping Stove",
            "Headlamp",
            "Cooler Box",
            "Hiking Poles",
            "Water Filter",
            "Folding Chair",
            "Lantern",
            "Backpack 60L",
        ],
    ),
    (
        "LAB",
        &[
            "Multimeter",
            "Oscilloscope",
            "Soldering Station",
            "Bench Power Supply",
            "Logic Analyzer",
            "Raspberry Pi Kit",
            "Arduino Kit",
            "Thermal Camera",
            "3D Printer Spool Holder",
            "USB Microscope",
        ],
    ),
    (
        "SPRT",
        &[
            "Football",
            "Basketball",
            "Badminton Set",
            "Frisbee",
            "Yoga Mat",
            "Kettlebell",
            "Jump Rope",
            "Table Tennis Set",
            "Volleyball",
            "Croquet Set",
        ],
    ),
];

/// Copy labels so a category can yield more items than it has names
const COPIES: &[&str] = &["", " #2", " #3", " #4", " #5"];

/// Borrowers seeded alongside the products
const BORROWERS: &[(&str, &str, &str)] = &[
    ("Kari", "Nordmann", "kari@example.com"),
    ("Ola", "Hansen", "ola@example.com"),
    ("Ingrid", "Berg", "ingrid@example.com"),
    ("Lars", "Dahl", "lars@example.com"),
    ("Sofie", "Lund", "sofie@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./loantrack_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Loantrack Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./loantrack_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Loantrack Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
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

    // Borrowers
    let mut borrower_ids = Vec::with_capacity(BORROWERS.len());
    for (name, last_name, email) in BORROWERS {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            last_name: Some(last_name.to_string()),
            phone_number: None,
            email: email.to_string(),
            role: Some("borrower".to_string()),
            created_at: Utc::now(),
        };
        match db.users().insert(&user).await {
            Ok(user) => borrower_ids.push(user.id),
            Err(e) => eprintln!("Failed to insert user {}: {}", email, e),
        }
    }
    println!("✓ Created {} borrowers", borrower_ids.len());

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let mut loans_opened = 0;
    let start = std::time::Instant::now();

    'outer: for copy in COPIES {
        for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
            for (name_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(
                    category_code,
                    name,
                    copy,
                    category_idx * 1000 + generated * 10 + name_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.barcode, e);
                    continue;
                }

                generated += 1;

                if generated % 10 == 0 && !borrower_ids.is_empty() {
                    let borrower = &borrower_ids[generated % borrower_ids.len()];
                    let loaned_at = Utc::now() - Duration::hours(generated as i64);
                    if let CheckoutResult::Opened(_) =
                        db.loans().checkout(&product.id, borrower, loaned_at).await?
                    {
                        loans_opened += 1;
                    }
                }

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!("✓ Opened {} loans", loans_opened);

    println!();
    println!("Verifying barcode lookup...");
    if let Some(first) = db.products().get_by_barcode("TOOL00000").await? {
        println!("  Scan 'TOOL00000': {} ({})", first.name, first.status_label());
    }
    println!("  Open loans: {}", db.loans().count_open().await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single available product.
fn generate_product(category: &str, name: &str, copy: &str, seed: usize) -> Product {
    let now = Utc::now();

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{}{}", name, copy),
        barcode: format!("{}{:05}", category, seed),
        available: true,
        created_at: now,
        updated_at: now,
    }
}
