//! # Backend contracts
//!
//! The traits in this module define what a storage backend must provide for the shop's public APIs to work on top of
//! it. [`crate::SqliteDatabase`] is the only implementation shipped with the engine.
//!
//! * [`OrderManagement`] is the order ledger. It creates orders together with their line items in a single atomic
//!   write, and answers the lookups the reconciliation flow and order history need.
//! * [`CatalogManagement`] provides product and category queries.
//! * [`ProfileManagement`] manages user profiles and their default delivery details.
mod catalog_management;
mod data_objects;
mod order_management;
mod profile_management;

use thiserror::Error;

pub use catalog_management::CatalogManagement;
pub use data_objects::{OrderMatch, ProfileUpdate};
pub use order_management::OrderManagement;
pub use profile_management::ProfileManagement;

/// Errors a backend can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An order already exists for payment {0}")]
    OrderAlreadyExists(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Category '{0}' already exists")]
    CategoryAlreadyExists(String),
    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for ShopError {
    fn from(e: sqlx::Error) -> Self {
        ShopError::DatabaseError(e.to_string())
    }
}
