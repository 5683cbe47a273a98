//! Carte catalog kernel library.
//!
//! Set menu listing, the harvest job and the HTTP surface over both.
//! The server entry point is the `carte` binary; the harvest entry point
//! is the `carte-harvest` crate.

pub mod config;
pub mod db;
pub mod error;
pub mod harvest;
pub mod listing;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
