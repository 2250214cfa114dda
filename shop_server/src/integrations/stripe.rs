//! Stripe webhook payloads, and their conversion into payment notifications for the reconciliation engine.
//!
//! Only the fields the shop uses are modelled. Everything else in the payload is ignored.
use std::{collections::HashMap, fmt::Display};

use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shop_common::{parse_boolean_flag, Money};
use shop_engine::{
    db_types::{Address, ShippingDetails},
    order_objects::PaymentNotification,
};
use thiserror::Error;

pub const METADATA_BAG: &str = "bag";
pub const METADATA_SAVE_INFO: &str = "save_info";
pub const METADATA_USERNAME: &str = "username";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookConversionError {
    #[error("The payment intent has no {0}")]
    MissingField(&'static str),
    #[error("The event payload is not a valid payment intent. {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeEventType {
    PaymentIntentSucceeded,
    PaymentIntentFailed,
    Other(String),
}

impl From<&str> for StripeEventType {
    fn from(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for StripeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentIntentSucceeded => write!(f, "payment_intent.succeeded"),
            Self::PaymentIntentFailed => write!(f, "payment_intent.payment_failed"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// The envelope of every webhook call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

impl StripeEvent {
    pub fn kind(&self) -> StripeEventType {
        StripeEventType::from(self.event_type.as_str())
    }

    pub fn payment_intent(&self) -> Result<PaymentIntent, WebhookConversionError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookConversionError::InvalidPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub amount_received: Option<i64>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub shipping: Option<StripeShipping>,
    #[serde(default)]
    pub charges: Option<ChargeList>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeList {
    #[serde(default)]
    pub data: Vec<Charge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charge {
    pub amount: i64,
    #[serde(default)]
    pub billing_details: BillingDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StripeShipping {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub address: StripeAddress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StripeAddress {
    pub city: Option<String>,
    pub country: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub postal_code: Option<String>,
    pub state: Option<String>,
}

impl From<StripeAddress> for Address {
    fn from(a: StripeAddress) -> Self {
        Address {
            country: a.country,
            postcode: a.postal_code,
            town_or_city: a.city,
            street_address1: a.line1,
            street_address2: a.line2,
            county: a.state,
        }
    }
}

impl PaymentIntent {
    fn first_charge(&self) -> Option<&Charge> {
        self.charges.as_ref().and_then(|c| c.data.first())
    }

    /// The amount charged, in minor units. Taken from the first charge, falling back to the amount received for
    /// intents that don't expand their charges.
    pub fn amount_charged(&self) -> Option<Money> {
        self.first_charge().map(|c| c.amount).or(self.amount_received).map(Money::from)
    }
}

impl TryFrom<PaymentIntent> for PaymentNotification {
    type Error = WebhookConversionError;

    fn try_from(intent: PaymentIntent) -> Result<Self, Self::Error> {
        trace!("💳️ Converting payment intent {} to a payment notification", intent.id);
        if intent.id.is_empty() {
            return Err(WebhookConversionError::MissingField("id"));
        }
        let grand_total = intent.amount_charged().ok_or(WebhookConversionError::MissingField("charge amount"))?;
        let email = intent
            .first_charge()
            .and_then(|c| c.billing_details.email.clone())
            .or_else(|| intent.receipt_email.clone())
            .unwrap_or_default();
        let mut metadata = intent.metadata;
        let bag = metadata.remove(METADATA_BAG).ok_or(WebhookConversionError::MissingField("bag in its metadata"))?;
        let save_info = parse_boolean_flag(metadata.remove(METADATA_SAVE_INFO), false);
        let username = metadata.remove(METADATA_USERNAME);
        let shipping = intent.shipping.ok_or(WebhookConversionError::MissingField("shipping details"))?;
        let details = ShippingDetails {
            full_name: shipping.name.unwrap_or_default(),
            email,
            phone_number: shipping.phone.unwrap_or_default(),
            address: shipping.address.into(),
        };
        let notification = PaymentNotification::new(intent.id, bag, details, grand_total).with_save_info(save_info);
        Ok(match username {
            Some(username) => notification.with_username(username),
            None => notification,
        })
    }
}
