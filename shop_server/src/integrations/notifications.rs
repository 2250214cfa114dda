//! Order confirmation hooks.
//!
//! The engine publishes an `OrderConfirmedEvent` once per paid order, when the payment notification has been
//! reconciled with the ledger. Sending
//! the customer's confirmation email belongs to the mail service; the server's handler records each confirmation in
//! the log so that the hand-off is visible.
use futures::future::BoxFuture;
use log::*;
use shop_engine::events::{ConfirmationSource, EventHandlers, EventHooks, OrderConfirmedEvent};

pub const CONFIRMATION_EVENT_BUFFER_SIZE: usize = 25;

pub fn create_confirmation_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_confirmed(log_confirmation);
    EventHandlers::new(CONFIRMATION_EVENT_BUFFER_SIZE, hooks)
}

fn log_confirmation(ev: OrderConfirmedEvent) -> BoxFuture<'static, ()> {
    let OrderConfirmedEvent { order, line_items, source } = ev;
    let how = match source {
        ConfirmationSource::PaymentVerified => "by payment notification (order already saved)",
        ConfirmationSource::PaymentRecovered => "by payment notification (order recovered)",
    };
    Box::pin(async move {
        info!(
            "📬️ Order {} confirmed {how}. {} line item(s), grand total {}. Confirmation to {}",
            order.order_number,
            line_items.len(),
            order.grand_total,
            order.email
        );
    })
}
