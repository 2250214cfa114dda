//! # Shop engine public API
//!
//! The API is modular, so that clients can pick the functionality they need. Each API is created by supplying a
//! backend that implements the traits the API requires:
//!
//! * [`reconciliation_api`] turns a payment processor's "payment succeeded" notification into exactly one order,
//!   finding the order the checkout flow already created or creating it from the notification.
//! * [`checkout_api`] prices a bag, works out the amount to charge, and places orders at checkout.
//! * [`catalog_api`] is product search and lookup.
//! * [`profile_api`] provides user profiles, their default delivery details and their order history.
//!
//! ```rust,ignore
//! use shop_engine::{CatalogApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/shop.db", 5).await?;
//! // SqliteDatabase implements CatalogManagement
//! let api = CatalogApi::new(db);
//! let product = api.product_by_id(42).await?;
//! ```
pub mod catalog_api;
pub mod catalog_objects;
pub mod checkout_api;
pub mod errors;
pub mod order_objects;
pub mod profile_api;
pub mod reconciliation_api;
