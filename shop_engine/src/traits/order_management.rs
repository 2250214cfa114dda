use crate::{
    db_types::{NewLineItem, NewOrder, Order, OrderLineItem, OrderNumber},
    pricing::DeliveryConfig,
    traits::{OrderMatch, ShopError},
};

/// The order ledger.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Returns every order agreeing with `criteria` on all fields (see [`OrderMatch`]), oldest first. An empty vector
    /// means no such order has been persisted (yet).
    async fn find_matching_orders(&self, criteria: &OrderMatch) -> Result<Vec<Order>, ShopError>;

    /// Takes a new order and its line items, and in a single atomic transaction:
    /// * inserts the order, with zero totals,
    /// * attaches each line item in turn, fixing its total at the product's current price, and recalculating the
    ///   order totals (using `delivery`) after every attachment,
    /// * commits.
    ///
    /// If any step fails, nothing is written. A missing product gives [`ShopError::ProductNotFound`], and an order that
    /// already exists for the same (non-empty) payment id gives [`ShopError::OrderAlreadyExists`].
    async fn insert_order_with_line_items(
        &self,
        order: NewOrder,
        items: Vec<NewLineItem>,
        delivery: &DeliveryConfig,
    ) -> Result<Order, ShopError>;

    async fn fetch_order_by_stripe_pid(&self, stripe_pid: &str) -> Result<Option<Order>, ShopError>;

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, ShopError>;

    /// Line items for the order, in the order they were attached.
    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, ShopError>;

    /// The profile's order history, newest first.
    async fn fetch_orders_for_profile(&self, profile_id: i64) -> Result<Vec<Order>, ShopError>;

    /// Deletes the order and, by cascade, its line items. Returns false if there was no such order.
    async fn delete_order(&self, order_id: i64) -> Result<bool, ShopError>;
}
