use std::time::Duration;

use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::{
    db_types::{Order, OrderLineItem, ShippingDetails},
    traits::OrderMatch,
};

/// The username the web front end reports for visitors who are not signed in.
pub const ANONYMOUS_USER: &str = "AnonymousUser";
pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOOKUP_INTERVAL: Duration = Duration::from_secs(1);

/// Everything a "payment succeeded" notification tells us about the order it paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    /// The payment processor's transaction id
    pub stripe_pid: String,
    /// The bag snapshot, exactly as it was attached to the payment
    pub bag: String,
    pub details: ShippingDetails,
    /// The amount charged, in minor units
    pub grand_total: Money,
    /// The signed-in user who paid, if any
    pub username: Option<String>,
    /// Whether the customer asked for these delivery details to become their profile defaults
    pub save_info: bool,
}

impl PaymentNotification {
    pub fn new<P, B>(stripe_pid: P, bag: B, details: ShippingDetails, grand_total: Money) -> Self
    where
        P: Into<String>,
        B: Into<String>,
    {
        Self {
            stripe_pid: stripe_pid.into(),
            bag: bag.into(),
            details,
            grand_total,
            username: None,
            save_info: false,
        }
    }

    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_save_info(mut self, save_info: bool) -> Self {
        self.save_info = save_info;
        self
    }

    pub fn normalize(self) -> Self {
        Self { details: self.details.normalize(), ..self }
    }

    pub fn order_match(&self) -> OrderMatch {
        OrderMatch::new(self.details.clone(), self.grand_total, self.bag.clone(), self.stripe_pid.clone())
    }

    /// The username, unless the payment was made by an anonymous visitor.
    pub fn registered_user(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty() && *u != ANONYMOUS_USER)
    }
}

/// How hard to look for an order the checkout flow may still be writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Total number of lookups, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Pause between consecutive lookups
    pub interval: Duration,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self { attempts: DEFAULT_LOOKUP_ATTEMPTS, interval: DEFAULT_LOOKUP_INTERVAL }
    }
}

impl LookupPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// The number of lookups after the first one.
    pub fn retries(&self) -> usize {
        self.attempts.saturating_sub(1) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// The order was already in the ledger
    AlreadyExisted(Order),
    /// The order was created from the notification
    Created(Order),
}

impl ReconcileOutcome {
    pub fn order(&self) -> &Order {
        match self {
            ReconcileOutcome::AlreadyExisted(o) | ReconcileOutcome::Created(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            ReconcileOutcome::AlreadyExisted(o) | ReconcileOutcome::Created(o) => o,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, ReconcileOutcome::Created(_))
    }
}

/// The delivery details submitted with the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    #[serde(flatten)]
    pub details: ShippingDetails,
    #[serde(default)]
    pub save_info: bool,
}

impl OrderForm {
    /// Contact fields are required. Address fields are optional.
    pub fn validate(&self) -> Result<(), String> {
        let missing = [
            ("full_name", &self.details.full_name),
            ("email", &self.details.email),
            ("phone_number", &self.details.phone_number),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required field(s): {}", missing.join(", ")))
        }
    }
}

/// What to create the payment intent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// In minor units
    pub amount: Money,
    pub currency: String,
    /// The bag snapshot to attach to the intent's metadata. Checkout stores this exact string on the order, and the
    /// payment notification must carry it unchanged for the two to match.
    pub bag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithLineItems {
    pub order: Order,
    pub line_items: Vec<OrderLineItem>,
}
