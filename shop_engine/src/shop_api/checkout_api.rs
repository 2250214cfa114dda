use std::fmt::Debug;

use log::*;
use shop_common::{Money, DEFAULT_CURRENCY_CODE};

use crate::{
    bag::{Bag, BagError},
    db_types::{NewOrder, Order},
    pricing::{DeliveryConfig, OrderTotals},
    shop_api::{
        catalog_objects::{BagContents, BagLine},
        errors::CheckoutError,
        order_objects::{OrderForm, PaymentIntentRequest, ANONYMOUS_USER},
    },
    traits::{CatalogManagement, OrderManagement, ProfileManagement, ProfileUpdate},
};

/// `CheckoutApi` prices bags and places orders when the customer completes checkout.
///
/// Placing an order does not confirm it. Confirmation follows the payment notification, through
/// [`crate::ReconciliationApi`].
pub struct CheckoutApi<B> {
    db: B,
    delivery: DeliveryConfig,
    currency: String,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({:?}, {})", self.delivery, self.currency)
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, delivery: DeliveryConfig) -> Self {
        Self { db, delivery, currency: DEFAULT_CURRENCY_CODE.to_string() }
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn delivery(&self) -> &DeliveryConfig {
        &self.delivery
    }
}

impl<B> CheckoutApi<B>
where B: CatalogManagement
{
    /// Adds a product to the bag, after checking that it exists. Sized products need a size; a size given for a
    /// product without sizes is ignored.
    pub async fn add_to_bag(
        &self,
        mut bag: Bag,
        product_id: i64,
        quantity: i64,
        size: Option<&str>,
    ) -> Result<Bag, CheckoutError> {
        let product = self.db.fetch_product(product_id).await?.ok_or(CheckoutError::ProductNotFound(product_id))?;
        let size = match (product.has_sizes, size.filter(|s| !s.is_empty())) {
            (true, None) => return Err(CheckoutError::SizeRequired(product_id)),
            (true, size) => size,
            (false, _) => None,
        };
        bag.add_item(product_id, quantity, size)?;
        trace!("🛍️ Added {quantity} × {} to bag. {} item(s) in bag", product.name, bag.product_count());
        Ok(bag)
    }

    /// Resolves every bag line against the catalog and totals it up, delivery included.
    pub async fn bag_contents(&self, bag: &Bag) -> Result<BagContents, CheckoutError> {
        let mut items = Vec::new();
        for line in bag.expand() {
            let product =
                self.db.fetch_product(line.product_id).await?.ok_or(CheckoutError::ProductNotFound(line.product_id))?;
            let line_total = product.price.checked_mul(line.quantity).ok_or(BagError::TotalTooLarge)?;
            items.push(BagLine { product, size: line.product_size, quantity: line.quantity, line_total });
        }
        let total = Money::checked_sum(items.iter().map(|l| l.line_total)).ok_or(BagError::TotalTooLarge)?;
        let totals = OrderTotals::from_subtotal(total, &self.delivery);
        Ok(BagContents {
            items,
            total,
            product_count: bag.product_count(),
            delivery: totals.delivery_cost,
            free_delivery_delta: self.delivery.free_delivery_delta(total),
            free_delivery_threshold: self.delivery.free_delivery_threshold,
            grand_total: totals.grand_total,
        })
    }

    /// The amount, in minor units, to create the payment intent for.
    pub async fn payment_intent_amount(&self, bag: &Bag) -> Result<PaymentIntentRequest, CheckoutError> {
        if bag.is_empty() {
            return Err(CheckoutError::EmptyBag);
        }
        let contents = self.bag_contents(bag).await?;
        debug!("🛍️ Payment intent of {} {} for {} item(s)", contents.grand_total, self.currency, contents.product_count);
        Ok(PaymentIntentRequest { amount: contents.grand_total, currency: self.currency.clone(), bag: bag.to_json() })
    }
}

impl<B> CheckoutApi<B>
where B: OrderManagement + ProfileManagement
{
    /// Places the order for a completed checkout.
    ///
    /// The order and its line items are written in one transaction. If the payment already has an order (typically
    /// because the payment notification arrived first and created it), [`CheckoutError::OrderAlreadyExists`] is
    /// returned and nothing is written.
    pub async fn place_order(
        &self,
        form: OrderForm,
        bag: &Bag,
        stripe_pid: &str,
        username: Option<&str>,
    ) -> Result<Order, CheckoutError> {
        if bag.is_empty() {
            return Err(CheckoutError::EmptyBag);
        }
        form.validate().map_err(CheckoutError::InvalidOrder)?;
        let details = form.details.normalize();
        let profile = match username.filter(|u| !u.is_empty() && *u != ANONYMOUS_USER) {
            Some(username) => Some(self.db.fetch_or_create_profile(username).await?),
            None => None,
        };
        let new_order = NewOrder::new(details.clone(), bag.to_json(), stripe_pid.to_string())
            .with_user_profile(profile.as_ref().map(|p| p.id));
        let order = self.db.insert_order_with_line_items(new_order, bag.expand(), &self.delivery).await?;
        info!("🛍️ Order {} placed. Grand total: {}", order.order_number, order.grand_total);
        if let (Some(profile), true) = (&profile, form.save_info) {
            self.db.update_profile_defaults(profile.id, &ProfileUpdate::from(&details)).await?;
            debug!("🛍️ Saved delivery details to {}'s profile", profile.username);
        }
        Ok(order)
    }
}
