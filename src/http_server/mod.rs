//! # gatekeep HTTP Server Module
//!
//! Wires the gate, the route tables and the shared state into one axum
//! server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/products*` - Product catalogue (public reads, admin writes)
//! - `/api/v1/signup`, `/api/v1/login` - Account creation and token issue
//! - `/api/v1/user/:id` - User administration

pub mod config;
pub mod health_routes;
pub mod product_routes;
pub mod server;
pub mod state;
pub mod user_routes;

pub use config::{ConfigError, ConfigResult, HttpServerConfig};
pub use server::HttpServer;
pub use state::AppState;
