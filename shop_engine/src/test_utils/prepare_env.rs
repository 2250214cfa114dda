use log::*;
use shop_common::Money;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{NewProduct, Product},
    CatalogManagement,
    SqliteDatabase,
};

/// Creates a fresh database at `url`, with all migrations applied.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await
}

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/shop_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// Seeds a small catalog:
///
/// | id | name          | category | sizes | price  |
/// |----|---------------|----------|-------|--------|
/// | 1  | Canvas Tote   | bags     | no    | 12.99  |
/// | 2  | Linen Shirt   | shirts   | yes   | 30.00  |
/// | 3  | Wool Scarf    | scarves  | no    | 18.50  |
/// | 4  | Denim Jacket  | jackets  | yes   | 75.00  |
pub async fn seed_catalog(db: &SqliteDatabase) -> Vec<Product> {
    let bags = db.insert_category("bags", Some("Bags")).await.expect("Error inserting category");
    let shirts = db.insert_category("shirts", Some("Shirts")).await.expect("Error inserting category");
    let scarves = db.insert_category("scarves", None).await.expect("Error inserting category");
    let jackets = db.insert_category("jackets", Some("Jackets & Coats")).await.expect("Error inserting category");
    let products = [
        NewProduct::new("Canvas Tote", Money::from(1299))
            .with_category(bags.id)
            .with_description("A sturdy everyday bag")
            .with_rating(4.2),
        NewProduct::new("Linen Shirt", Money::from(3000))
            .with_category(shirts.id)
            .with_description("Breathable summer shirt")
            .with_sizes()
            .with_rating(4.7),
        NewProduct::new("Wool Scarf", Money::from(1850)).with_category(scarves.id).with_description("Warm and soft"),
        NewProduct::new("Denim Jacket", Money::from(7500))
            .with_category(jackets.id)
            .with_description("Classic blue denim")
            .with_sizes()
            .with_rating(3.9),
    ];
    let mut result = Vec::with_capacity(products.len());
    for product in products {
        result.push(db.insert_product(product).await.expect("Error inserting product"));
    }
    result
}
