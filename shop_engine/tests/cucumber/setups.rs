use std::time::Duration;

use cucumber::given;
use shop_common::Money;
use shop_engine::{db_types::NewProduct, order_objects::LookupPolicy, CatalogManagement};

use crate::cucumber::{shop_world::ShopSystem, ShopWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ShopWorld) {
    let policy = LookupPolicy::new(2, Duration::from_millis(50));
    world.system = Some(ShopSystem::new(policy).await);
}

#[given(expr = "a fresh install that looks for orders {int} times, {int}ms apart")]
async fn fresh_database_with_policy(world: &mut ShopWorld, attempts: u32, interval: u64) {
    let policy = LookupPolicy::new(attempts, Duration::from_millis(interval));
    world.system = Some(ShopSystem::new(policy).await);
}

#[given(expr = "product {int} is {string}, priced at {word}")]
async fn add_product(world: &mut ShopWorld, id: i64, name: String, price: String) {
    insert_product(world, id, NewProduct::new(name, price.parse::<Money>().expect("Invalid price"))).await;
}

#[given(expr = "product {int} is {string} in sizes, priced at {word}")]
async fn add_sized_product(world: &mut ShopWorld, id: i64, name: String, price: String) {
    let product = NewProduct::new(name, price.parse::<Money>().expect("Invalid price")).with_sizes();
    insert_product(world, id, product).await;
}

async fn insert_product(world: &mut ShopWorld, id: i64, product: NewProduct) {
    let product = world.system().db.insert_product(product).await.expect("Error inserting product");
    assert_eq!(product.id, id, "Products must be listed in id order, starting at 1");
}
