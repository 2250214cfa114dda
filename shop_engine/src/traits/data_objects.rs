use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::db_types::{Address, ShippingDetails};

/// The full set of fields an existing order must agree on for a payment notification to be considered a match.
///
/// Contact and address fields are compared case-insensitively. A `None` address field only matches an order where
/// that field is also missing. The total, bag snapshot and payment id must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMatch {
    pub details: ShippingDetails,
    pub grand_total: Money,
    pub original_bag: String,
    pub stripe_pid: String,
}

impl OrderMatch {
    pub fn new(details: ShippingDetails, grand_total: Money, original_bag: String, stripe_pid: String) -> Self {
        Self { details: details.normalize(), grand_total, original_bag, stripe_pid }
    }
}

/// New default delivery details for a profile. Every field is written, so `None` clears a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub default_full_name: Option<String>,
    pub default_phone_number: Option<String>,
    #[serde(flatten)]
    pub default_address: Address,
}

impl From<&ShippingDetails> for ProfileUpdate {
    fn from(details: &ShippingDetails) -> Self {
        let details = details.clone().normalize();
        let non_blank = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            default_full_name: non_blank(details.full_name),
            default_phone_number: non_blank(details.phone_number),
            default_address: details.address,
        }
    }
}

impl ProfileUpdate {
    pub fn normalize(self) -> Self {
        let non_blank = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            default_full_name: non_blank(self.default_full_name),
            default_phone_number: non_blank(self.default_phone_number),
            default_address: self.default_address.normalize(),
        }
    }
}
