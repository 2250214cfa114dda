//! Delivery charges and order totals.
use serde::{Deserialize, Serialize};
use shop_common::Money;

pub const DEFAULT_FREE_DELIVERY_THRESHOLD: Money = Money::from_minor(5000);
pub const DEFAULT_STANDARD_DELIVERY_PERCENTAGE: u32 = 10;

/// Delivery pricing rules. Passed to the APIs that need them when they are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Orders whose subtotal is at least this amount ship for free
    pub free_delivery_threshold: Money,
    /// Delivery charge for orders under the threshold, as a percentage of the subtotal
    pub standard_delivery_percentage: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            free_delivery_threshold: DEFAULT_FREE_DELIVERY_THRESHOLD,
            standard_delivery_percentage: DEFAULT_STANDARD_DELIVERY_PERCENTAGE,
        }
    }
}

impl DeliveryConfig {
    pub fn new(free_delivery_threshold: Money, standard_delivery_percentage: u32) -> Self {
        Self { free_delivery_threshold, standard_delivery_percentage }
    }

    pub fn delivery_cost(&self, subtotal: Money) -> Money {
        if subtotal < self.free_delivery_threshold {
            subtotal.percent(self.standard_delivery_percentage)
        } else {
            Money::default()
        }
    }

    /// How much more the customer needs to spend to get free delivery. Zero once the threshold is reached.
    pub fn free_delivery_delta(&self, subtotal: Money) -> Money {
        if subtotal < self.free_delivery_threshold {
            self.free_delivery_threshold - subtotal
        } else {
            Money::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub order_total: Money,
    pub delivery_cost: Money,
    pub grand_total: Money,
}

impl OrderTotals {
    pub fn from_subtotal(order_total: Money, config: &DeliveryConfig) -> Self {
        let delivery_cost = config.delivery_cost(order_total);
        Self { order_total, delivery_cost, grand_total: order_total + delivery_cost }
    }
}
