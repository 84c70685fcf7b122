//! Database seeder for Valuta development and testing.
//!
//! Seeds demo rates and products on top of the currencies the initial
//! migration installs.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use valuta_core::rates::provider;
use valuta_db::entities::{currencies, products};
use valuta_db::repositories::{CreateProductInput, ProductRepository, RateRepository, RateWrite};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = valuta_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding exchange rates...");
    seed_rates(&db).await;

    println!("Seeding demo products...");
    seed_products(&db).await;

    println!("Seeding complete!");
}

async fn currency_id(db: &DatabaseConnection, code: &str) -> i32 {
    currencies::Entity::find()
        .filter(currencies::Column::Code.eq(code))
        .one(db)
        .await
        .expect("Failed to query currencies")
        .unwrap_or_else(|| panic!("currency {code} missing; run migrations first"))
        .id
}

/// Seeds a starter set of USD-based rates.
async fn seed_rates(db: &DatabaseConnection) {
    let repo = RateRepository::new(db.clone());
    let usd = currency_id(db, "USD").await;
    let now = Utc::now();

    let quotes = [
        ("EUR", 0.92),
        ("GBP", 0.79),
        ("JPY", 147.3),
        ("KZT", 450.0),
        ("RUB", 90.5),
    ];
    for (code, rate) in quotes {
        let quote = currency_id(db, code).await;
        repo.upsert_latest(RateWrite {
            base_id: usd,
            quote_id: quote,
            rate,
            provider: provider::MANUAL.to_string(),
            is_manual: true,
            fetched_at: now,
        })
        .await
        .expect("Failed to seed rate");
        println!("  USD -> {code} = {rate}");
    }
}

/// Seeds a handful of demo products.
async fn seed_products(db: &DatabaseConnection) {
    let existing = products::Entity::find()
        .one(db)
        .await
        .expect("Failed to query products");
    if existing.is_some() {
        println!("  Products already exist, skipping...");
        return;
    }

    let repo = ProductRepository::new(db.clone());
    let demos = [
        ("Mechanical keyboard", 129.0, Some(159.0), "USD"),
        ("Espresso grinder", 249.5, None, "USD"),
        ("Wool blanket", 85.0, Some(100.0), "EUR"),
    ];
    for (title, price, old_price, code) in demos {
        repo.create(CreateProductInput {
            title: title.to_string(),
            price,
            old_price,
            currency_code: code.to_string(),
        })
        .await
        .expect("Failed to seed product");
        println!("  {title} ({price} {code})");
    }
}
