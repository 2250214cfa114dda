//! The shopping bag.
//!
//! A bag maps a product id to either a plain quantity (products without size variants) or to a set of per-size
//! quantities. Its JSON form is the one carried in payment metadata as the bag snapshot:
//!
//! ```json
//! {"10": 2, "11": {"items_by_size": {"M": 1, "L": 3}}}
//! ```
//!
//! Entry order is significant and is preserved through parsing and serialization, so that line items are created in
//! the order the customer added things to the bag.
use std::fmt::Display;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db_types::NewLineItem;

const ITEMS_BY_SIZE: &str = "items_by_size";
/// The most of one product (or one size of a product) a bag can hold.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BagError {
    #[error("The bag snapshot is not valid JSON. {0}")]
    InvalidJson(String),
    #[error("The bag snapshot must be a JSON object")]
    NotAMapping,
    #[error("'{0}' is not a valid product id")]
    InvalidProductId(String),
    #[error("Invalid bag entry for product {0}")]
    InvalidEntry(String),
    #[error("Quantities must be whole numbers from 1 to {MAX_ITEM_QUANTITY}. Product {product}: {value}")]
    InvalidQuantity { product: String, value: String },
    #[error("Product {0} is already in the bag with a different size configuration")]
    EntryKindMismatch(i64),
    #[error("The bag total is too large")]
    TotalTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BagEntry {
    /// A product without size variants
    Quantity(i64),
    /// Size label → quantity, in insertion order
    Sized(Vec<(String, i64)>),
}

impl BagEntry {
    pub fn total_quantity(&self) -> i64 {
        match self {
            BagEntry::Quantity(q) => *q,
            BagEntry::Sized(sizes) => sizes.iter().map(|(_, q)| q).sum(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bag {
    entries: Vec<(i64, BagEntry)>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(i64, BagEntry)] {
        &self.entries
    }

    pub fn entry(&self, product_id: i64) -> Option<&BagEntry> {
        self.entries.iter().find(|(id, _)| *id == product_id).map(|(_, e)| e)
    }

    /// Adds `quantity` of a product to the bag. Sized products are tracked per size; adding the same size again
    /// increments that size's quantity. No line may exceed [`MAX_ITEM_QUANTITY`].
    pub fn add_item(&mut self, product_id: i64, quantity: i64, size: Option<&str>) -> Result<(), BagError> {
        let invalid =
            |value: i64| BagError::InvalidQuantity { product: product_id.to_string(), value: value.to_string() };
        if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(invalid(quantity));
        }
        let increment = |q: &mut i64| {
            let total = *q + quantity;
            if total > MAX_ITEM_QUANTITY {
                return Err(invalid(total));
            }
            *q = total;
            Ok(())
        };
        let existing = self.entries.iter_mut().find(|(id, _)| *id == product_id).map(|(_, e)| e);
        match (existing, size) {
            (None, None) => self.entries.push((product_id, BagEntry::Quantity(quantity))),
            (None, Some(size)) => self.entries.push((product_id, BagEntry::Sized(vec![(size.to_string(), quantity)]))),
            (Some(BagEntry::Quantity(q)), None) => increment(q)?,
            (Some(BagEntry::Sized(sizes)), Some(size)) => match sizes.iter_mut().find(|(s, _)| s == size) {
                Some((_, q)) => increment(q)?,
                None => sizes.push((size.to_string(), quantity)),
            },
            (Some(_), _) => return Err(BagError::EntryKindMismatch(product_id)),
        }
        Ok(())
    }

    /// The total number of items in the bag, across all products and sizes.
    pub fn product_count(&self) -> i64 {
        self.entries.iter().map(|(_, e)| e.total_quantity()).sum()
    }

    /// One line per unsized product, and one line per (product, size) pair, in bag order.
    pub fn expand(&self) -> Vec<NewLineItem> {
        self.entries
            .iter()
            .flat_map(|(id, entry)| match entry {
                BagEntry::Quantity(q) => vec![NewLineItem::new(*id, *q)],
                BagEntry::Sized(sizes) => sizes.iter().map(|(size, q)| NewLineItem::sized(*id, size, *q)).collect(),
            })
            .collect()
    }

    pub fn from_json(s: &str) -> Result<Self, BagError> {
        let value = serde_json::from_str::<Value>(s).map_err(|e| BagError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, BagError> {
        let Value::Object(map) = value else {
            return Err(BagError::NotAMapping);
        };
        let mut entries = Vec::with_capacity(map.len());
        for (key, item) in map {
            let product_id = key.parse::<i64>().map_err(|_| BagError::InvalidProductId(key.clone()))?;
            let entry = match item {
                Value::Number(_) => BagEntry::Quantity(positive_quantity(&key, &item)?),
                Value::Object(mut obj) => {
                    let Some(Value::Object(sizes)) = obj.remove(ITEMS_BY_SIZE) else {
                        return Err(BagError::InvalidEntry(key));
                    };
                    if sizes.is_empty() {
                        return Err(BagError::InvalidEntry(key));
                    }
                    let sizes = sizes
                        .iter()
                        .map(|(size, q)| positive_quantity(&key, q).map(|q| (size.clone(), q)))
                        .collect::<Result<Vec<_>, _>>()?;
                    BagEntry::Sized(sizes)
                },
                _ => return Err(BagError::InvalidEntry(key)),
            };
            entries.push((product_id, entry));
        }
        Ok(Self { entries })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.entries.len());
        for (id, entry) in &self.entries {
            let value = match entry {
                BagEntry::Quantity(q) => Value::from(*q),
                BagEntry::Sized(sizes) => {
                    let sizes = sizes.iter().map(|(s, q)| (s.clone(), Value::from(*q))).collect::<Map<_, _>>();
                    let mut obj = Map::new();
                    obj.insert(ITEMS_BY_SIZE.to_string(), Value::Object(sizes));
                    Value::Object(obj)
                },
            };
            map.insert(id.to_string(), value);
        }
        Value::Object(map)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

fn positive_quantity(product: &str, value: &Value) -> Result<i64, BagError> {
    match value.as_i64() {
        Some(q) if (1..=MAX_ITEM_QUANTITY).contains(&q) => Ok(q),
        _ => Err(BagError::InvalidQuantity { product: product.to_string(), value: value.to_string() }),
    }
}

impl Display for Bag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Bag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Bag::from_value(value).map_err(D::Error::custom)
    }
}
