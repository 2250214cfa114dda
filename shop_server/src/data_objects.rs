use std::fmt::Display;

use serde::{Deserialize, Serialize};
use shop_engine::{
    bag::Bag,
    catalog_objects::{ProductQuery, SortDirection, SortKey},
    order_objects::OrderForm,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Query string of the product listing, e.g. `?q=linen&category=shirts,jackets&sort=price&direction=desc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSearchParams {
    pub q: Option<String>,
    /// Comma-separated category names
    pub category: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl TryFrom<ProductSearchParams> for ProductQuery {
    type Error = String;

    fn try_from(params: ProductSearchParams) -> Result<Self, Self::Error> {
        let categories = params
            .category
            .map(|c| c.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        let sort = params.sort.map(|s| s.parse::<SortKey>()).transpose()?;
        let direction = params.direction.map(|s| s.parse::<SortDirection>()).transpose()?.unwrap_or_default();
        Ok(ProductQuery { q: params.q, categories, sort, direction })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToBagRequest {
    #[serde(default)]
    pub bag: Bag,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<String>,
}

/// A completed checkout: the delivery form, the bag that was paid for, and the payment intent it was paid with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub form: OrderForm,
    pub bag: Bag,
    pub stripe_pid: String,
    #[serde(default)]
    pub username: Option<String>,
}
