//! Integration tests for labcost
//!
//! These tests drive the public library API and the actix application
//! end to end. The text-generation endpoint is either disabled or mocked.

pub mod allocation_tests;
pub mod config_validation_tests;
pub mod error_handling_tests;
pub mod forecast_tests;
pub mod generator_tests;
pub mod pricing_tests;
pub mod server_tests;
