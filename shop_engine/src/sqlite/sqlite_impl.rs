//! `SqliteDatabase` is the SQLite implementation of the shop engine backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{db_url, line_items, new_pool, orders, products, profiles};
use crate::{
    db_types::{Category, NewLineItem, NewOrder, NewProduct, Order, OrderLineItem, OrderNumber, Product, UserProfile},
    pricing::DeliveryConfig,
    shop_api::catalog_objects::ProductQuery,
    traits::{CatalogManagement, OrderManagement, OrderMatch, ProfileManagement, ProfileUpdate, ShopError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn find_matching_orders(&self, criteria: &OrderMatch) -> Result<Vec<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::find_matching_orders(criteria, &mut conn).await?;
        Ok(orders)
    }

    async fn insert_order_with_line_items(
        &self,
        order: NewOrder,
        items: Vec<NewLineItem>,
        delivery: &DeliveryConfig,
    ) -> Result<Order, ShopError> {
        let mut tx = self.pool.begin().await?;
        let mut order = orders::insert_order(order, &mut tx).await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_number, order.id);
        for item in &items {
            line_items::attach_line_item(order.id, item, &mut tx).await?;
            order = orders::update_order_totals(order.id, delivery, &mut tx).await?;
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order {} committed with {} line item(s). Grand total: {}",
            order.order_number,
            items.len(),
            order.grand_total
        );
        Ok(order)
    }

    async fn fetch_order_by_stripe_pid(&self, stripe_pid: &str) -> Result<Option<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_stripe_pid(stripe_pid, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(order_number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let items = line_items::fetch_line_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_orders_for_profile(&self, profile_id: i64) -> Result<Vec<Order>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_profile(profile_id, &mut conn).await?;
        Ok(orders)
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = orders::delete_order(order_id, &mut conn).await?;
        if deleted {
            debug!("🗃️ Order {order_id} and its line items have been deleted");
        }
        Ok(deleted)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn search_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::search_products(query, &mut conn).await?;
        Ok(products)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let categories = products::fetch_categories(&mut conn).await?;
        Ok(categories)
    }

    async fn insert_category(&self, name: &str, friendly_name: Option<&str>) -> Result<Category, ShopError> {
        let mut conn = self.pool.acquire().await?;
        products::insert_category(name, friendly_name, &mut conn).await
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }
}

impl ProfileManagement for SqliteDatabase {
    async fn fetch_profile(&self, username: &str) -> Result<Option<UserProfile>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::fetch_profile(username, &mut conn).await?;
        Ok(profile)
    }

    async fn fetch_or_create_profile(&self, username: &str) -> Result<UserProfile, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::fetch_or_create_profile(username, &mut conn).await?;
        Ok(profile)
    }

    async fn update_profile_defaults(
        &self,
        profile_id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ShopError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::update_profile_defaults(profile_id, update, &mut conn).await?;
        Ok(profile)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the database file if it does not exist yet, connects, and brings the schema up to date.
    pub async fn open(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        if !Sqlite::database_exists(url).await? {
            info!("🗃️ Database {url} does not exist. Creating it.");
            Sqlite::create_database(url).await?;
        }
        let db = Self::new_with_url(url, max_connections).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
