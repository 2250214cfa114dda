//! Shop Engine
//!
//! The engine holds the commerce logic of the storefront: the shopping bag, delivery pricing, the order ledger, the
//! product catalog, user profiles, and the reconciliation of payment notifications with orders. It knows nothing
//! about HTTP; `shop_server` puts a web front on it.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend). The traits define what a backend must provide. You should not
//!    need to call the backend directly; use the public APIs instead. The data types stored by the backend live in
//!    [`mod@db_types`] and are public.
//! 2. The public APIs: [`ReconciliationApi`], [`CheckoutApi`], [`CatalogApi`] and [`ProfileApi`].
//! 3. Events ([`mod@events`]). An [`events::OrderConfirmedEvent`] is published whenever an order is confirmed, so that
//!    customer notifications can hook in without the engine knowing how they are sent.
pub mod bag;
pub mod db_types;
pub mod events;
pub mod pricing;
mod shop_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    catalog_api::CatalogApi,
    catalog_objects,
    checkout_api::CheckoutApi,
    errors::{CatalogApiError, CheckoutError, ProfileApiError, ReconcileError},
    order_objects,
    profile_api::ProfileApi,
    reconciliation_api::ReconciliationApi,
};
pub use traits::{CatalogManagement, OrderManagement, ProfileManagement, ShopError};
