use thiserror::Error;

use crate::{bag::BagError, traits::ShopError};

/// Why a payment notification could not be reconciled with an order. None of these leave a partial order behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("The bag snapshot for payment {0} is invalid. {1}")]
    InvalidBag(String, BagError),
    #[error("Could not look up the order for payment {0}. {1}")]
    LookupFailed(String, ShopError),
    #[error("Could not create the order for payment {0}. {1}")]
    CreationFailed(String, ShopError),
    #[error("Could not load the profile for {0}. {1}")]
    ProfileError(String, ShopError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("There is nothing in the bag")]
    EmptyBag,
    #[error("Invalid bag. {0}")]
    InvalidBag(#[from] BagError),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Product {0} comes in sizes. Choose one.")]
    SizeRequired(i64),
    #[error("An order already exists for payment {0}")]
    OrderAlreadyExists(String),
    #[error("Invalid order. {0}")]
    InvalidOrder(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ShopError> for CheckoutError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::ProductNotFound(id) => CheckoutError::ProductNotFound(id),
            ShopError::OrderAlreadyExists(pid) => CheckoutError::OrderAlreadyExists(pid),
            ShopError::InvalidLineItem(s) => CheckoutError::InvalidOrder(s),
            e => CheckoutError::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogApiError {
    #[error("You didn't enter any search criteria")]
    EmptySearchTerm,
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ShopError> for CatalogApiError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::ProductNotFound(id) => CatalogApiError::ProductNotFound(id),
            e => CatalogApiError::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileApiError {
    #[error("{0} does not have a profile")]
    ProfileNotFound(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ShopError> for ProfileApiError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::OrderNotFound(s) => ProfileApiError::OrderNotFound(s),
            e => ProfileApiError::DatabaseError(e.to_string()),
        }
    }
}
