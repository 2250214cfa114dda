use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_common::Money;
use sqlx::{FromRow, Type};

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// The public identifier of an order. Generated once, when the order is first built, and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl OrderNumber {
    /// 32 upper-case hex characters from 128 random bits.
    pub fn generate() -> Self {
        Self(format!("{:032X}", rand::random::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        Address        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub town_or_city: Option<String>,
    pub street_address1: Option<String>,
    pub street_address2: Option<String>,
    pub county: Option<String>,
}

impl Address {
    /// Replaces every blank subfield with `None`, so that "not provided" is never stored as an empty string.
    pub fn normalize(mut self) -> Self {
        for field in [
            &mut self.country,
            &mut self.postcode,
            &mut self.town_or_city,
            &mut self.street_address1,
            &mut self.street_address2,
            &mut self.county,
        ] {
            if field.as_deref() == Some("") {
                *field = None;
            }
        }
        self
    }
}

//--------------------------------------    ShippingDetails    ---------------------------------------------------------
/// Contact and delivery details for an order, as captured at checkout or carried in a payment notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub address: Address,
}

impl ShippingDetails {
    pub fn normalize(self) -> Self {
        Self { address: self.address.normalize(), ..self }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: OrderNumber,
    pub user_profile_id: Option<i64>,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub town_or_city: Option<String>,
    pub street_address1: Option<String>,
    pub street_address2: Option<String>,
    pub county: Option<String>,
    pub date: DateTime<Utc>,
    pub delivery_cost: Money,
    pub order_total: Money,
    pub grand_total: Money,
    pub original_bag: String,
    pub stripe_pid: String,
}

impl Order {
    pub fn shipping_details(&self) -> ShippingDetails {
        ShippingDetails {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            address: Address {
                country: self.country.clone(),
                postcode: self.postcode.clone(),
                town_or_city: self.town_or_city.clone(),
                street_address1: self.street_address1.clone(),
                street_address2: self.street_address2.clone(),
                county: self.county.clone(),
            },
        }
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub user_profile_id: Option<i64>,
    pub details: ShippingDetails,
    /// The bag snapshot, verbatim, as it was when the payment was created
    pub original_bag: String,
    /// The payment processor's transaction id (the payment intent id for Stripe)
    pub stripe_pid: String,
}

impl NewOrder {
    pub fn new(details: ShippingDetails, original_bag: String, stripe_pid: String) -> Self {
        Self { order_number: OrderNumber::generate(), user_profile_id: None, details, original_bag, stripe_pid }
    }

    pub fn with_user_profile(mut self, profile_id: Option<i64>) -> Self {
        self.user_profile_id = profile_id;
        self
    }
}

//--------------------------------------     OrderLineItem     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_size: Option<String>,
    pub quantity: i64,
    /// Unit price × quantity at the time the line was created. Later price changes do not affect it.
    pub lineitem_total: Money,
}

/// One product/size/quantity line, expanded from a bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: i64,
    pub product_size: Option<String>,
    pub quantity: i64,
}

impl NewLineItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, product_size: None, quantity }
    }

    pub fn sized<S: Into<String>>(product_id: i64, size: S, quantity: i64) -> Self {
        Self { product_id, product_size: Some(size.into()), quantity }
    }
}

//--------------------------------------        Catalog        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub friendly_name: Option<String>,
}

impl Category {
    pub fn friendly_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub category_id: Option<i64>,
    pub sku: Option<String>,
    pub name: String,
    pub description: String,
    pub has_sizes: bool,
    pub price: Money,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category_id: Option<i64>,
    pub sku: Option<String>,
    pub name: String,
    pub description: String,
    pub has_sizes: bool,
    pub price: Money,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Money) -> Self {
        Self {
            category_id: None,
            sku: None,
            name: name.into(),
            description: String::new(),
            has_sizes: false,
            price,
            rating: None,
            image_url: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_sizes(mut self) -> Self {
        self.has_sizes = true;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

//--------------------------------------      UserProfile      ---------------------------------------------------------
/// Default delivery details and order history anchor for a registered user.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub default_full_name: Option<String>,
    pub default_phone_number: Option<String>,
    pub default_country: Option<String>,
    pub default_postcode: Option<String>,
    pub default_town_or_city: Option<String>,
    pub default_street_address1: Option<String>,
    pub default_street_address2: Option<String>,
    pub default_county: Option<String>,
}
