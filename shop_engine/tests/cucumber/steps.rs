use cucumber::{then, when};
use shop_common::Money;
use shop_engine::{
    bag::Bag,
    db_types::{Address, ShippingDetails},
    order_objects::{OrderForm, PaymentNotification, ReconcileOutcome},
    OrderManagement,
};

use crate::cucumber::ShopWorld;

fn details_for(name: &str) -> ShippingDetails {
    ShippingDetails {
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_number: "0113 496 0000".into(),
        address: Address {
            country: Some("GB".into()),
            postcode: Some("LS1 4AP".into()),
            town_or_city: Some("Leeds".into()),
            street_address1: Some("2 Park Row".into()),
            street_address2: Some("".into()),
            county: None,
        },
    }
}

#[when(expr = "{word} completes checkout for payment {word} with bag {string}")]
async fn checkout(world: &mut ShopWorld, name: String, pid: String, bag: String) {
    let bag = Bag::from_json(&bag).expect("Invalid bag");
    let form = OrderForm { details: details_for(&name), save_info: false };
    world.system().checkout.place_order(form, &bag, &pid, None).await.expect("Error placing order");
}

#[when(expr = "Stripe reports that {word} paid {word} for payment {word} with bag {string}")]
async fn payment_succeeded(world: &mut ShopWorld, name: String, amount: String, pid: String, bag: String) {
    let amount = amount.parse::<Money>().expect("Invalid amount");
    // Snapshots carried by real payments are in the compact form checkout produces
    let bag = Bag::from_json(&bag).map(|b| b.to_json()).unwrap_or(bag);
    let notification = PaymentNotification::new(pid, bag, details_for(&name), amount);
    let outcome = world.system().reconciler.reconcile(notification).await;
    world.last_outcome = Some(outcome);
}

#[then("the payment is verified against the existing order")]
async fn verified(world: &mut ShopWorld) {
    match world.last_outcome.as_ref().expect("No payment has been reconciled") {
        Ok(ReconcileOutcome::AlreadyExisted(_)) => {},
        other => panic!("Expected the order to exist already, got {other:?}"),
    }
}

#[then("the order is created from the payment")]
async fn created(world: &mut ShopWorld) {
    match world.last_outcome.as_ref().expect("No payment has been reconciled") {
        Ok(ReconcileOutcome::Created(_)) => {},
        other => panic!("Expected the order to be created, got {other:?}"),
    }
}

#[then("the payment cannot be reconciled")]
async fn failed(world: &mut ShopWorld) {
    let outcome = world.last_outcome.as_ref().expect("No payment has been reconciled");
    assert!(outcome.is_err(), "Expected reconciliation to fail, got {outcome:?}");
}

#[then(expr = "there are {int} orders with {int} line items")]
async fn count_orders(world: &mut ShopWorld, orders: i64, items: i64) {
    let pool = world.system().db.pool();
    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(pool).await.unwrap();
    let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_line_items").fetch_one(pool).await.unwrap();
    assert_eq!(order_count, orders, "Wrong number of orders");
    assert_eq!(item_count, items, "Wrong number of line items");
}

#[then(expr = "the order for payment {word} has a total of {word}, delivery of {word} and grand total of {word}")]
async fn order_totals(world: &mut ShopWorld, pid: String, total: String, delivery: String, grand_total: String) {
    let order = world
        .system()
        .db
        .fetch_order_by_stripe_pid(&pid)
        .await
        .expect("Error fetching order")
        .expect("Order does not exist");
    assert_eq!(order.order_total.to_string(), total);
    assert_eq!(order.delivery_cost.to_string(), delivery);
    assert_eq!(order.grand_total.to_string(), grand_total);
}

#[then(expr = "{int} order confirmation(s) is/are sent")]
async fn confirmations(world: &mut ShopWorld, expected: usize) {
    let sent = world.system().wait_for_confirmations(expected).await;
    assert_eq!(sent, expected, "Wrong number of order confirmations");
}
