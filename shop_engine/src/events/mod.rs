//! Order events and the hooks that react to them.
//!
//! The engine publishes events when something a downstream system cares about happens. Currently, that is a single
//! event: a paid order has been confirmed, either found or created while reconciling a payment notification.
//! Sending the customer a confirmation is the job of whoever subscribes to [`OrderConfirmedEvent`].
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
