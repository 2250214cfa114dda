use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLineItem};

/// How an order came to be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationSource {
    /// A payment notification found the order already in the ledger
    PaymentVerified,
    /// A payment notification found no order, and the order was created from the notification
    PaymentRecovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmedEvent {
    pub order: Order,
    pub line_items: Vec<OrderLineItem>,
    pub source: ConfirmationSource,
}

impl OrderConfirmedEvent {
    pub fn new(order: Order, line_items: Vec<OrderLineItem>, source: ConfirmationSource) -> Self {
        Self { order, line_items, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderConfirmed(OrderConfirmedEvent),
}
