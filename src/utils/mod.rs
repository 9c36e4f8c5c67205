//! Utilities shared across the service
//!
//! - **business**: money parsing and formatting
//! - **error**: error types and HTTP error mapping
//! - **logging**: tracing subscriber setup

pub mod business;
pub mod error;
pub mod logging;
