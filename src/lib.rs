pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod numeric;
pub mod observability;
pub mod pricing;
pub mod state;
pub mod stats;
pub mod store;
