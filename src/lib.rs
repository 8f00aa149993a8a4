//! Library exports for shiksha, shared between the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
pub mod views;
