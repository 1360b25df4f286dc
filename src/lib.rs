//! Library exports for contextron, shared between the binary and tests.

pub mod config;
pub mod context;
pub mod errors;
pub mod extract;
pub mod models;
pub mod providers;
pub mod routes;
pub mod sessions;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
