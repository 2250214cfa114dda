//! # Shop server
//! This crate hosts the HTTP front end of the storefront. It is responsible for:
//! * Serving the catalog, bag and checkout API used by the web front end.
//! * Listening for Stripe webhook calls, checking their signatures, and handing successful payments to the
//!   reconciliation engine, so that every paid order is in the database even if the customer never finished checkout.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/stripe/webhook`: The Stripe webhook endpoint.
//! * `/api/...`: Products, categories, bag pricing and checkout. See [routes](routes/index.html).

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod stripe_routes;
