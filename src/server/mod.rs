//! HTTP server implementation
//!
//! This module provides the HTTP server, shared state and route handlers.

pub mod builder;
pub mod routes;
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
