pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod interaction_service;
pub mod models;
pub mod query;
pub mod render;
pub mod routes;
pub mod screen;
pub mod session;
pub mod store;

// Re-export key functions for convenience
pub use app::{create_app, init_tracing};
