//! Business helpers shared by the estimator stages

pub mod cost;

pub use cost::{format_usd, parse_digits, parse_leading_int, parse_money, to_fixed2};
