use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::db_types::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Price,
    Rating,
    Category,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "category" => Ok(Self::Category),
            _ => Err(format!("Cannot sort products by '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("'{s}' is not a sort direction")),
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// A product search. An empty query returns every product in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Matched against product name and description. `Some("")` is rejected by the catalog API.
    pub q: Option<String>,
    /// Category names. A product matches if it is in any of them.
    pub categories: Vec<String>,
    pub sort: Option<SortKey>,
    pub direction: SortDirection,
}

impl ProductQuery {
    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        self.q = Some(term.into());
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn sorted_by(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = Some(sort);
        self.direction = direction;
        self
    }
}

/// One line of a priced bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagLine {
    pub product: Product,
    pub size: Option<String>,
    pub quantity: i64,
    pub line_total: Money,
}

/// A bag with every line resolved against the catalog, and the totals the customer will be charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagContents {
    pub items: Vec<BagLine>,
    pub total: Money,
    pub product_count: i64,
    pub delivery: Money,
    pub free_delivery_delta: Money,
    pub free_delivery_threshold: Money,
    pub grand_total: Money,
}
