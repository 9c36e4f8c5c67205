//! Common test utilities for labcost

pub mod fixtures;

pub use fixtures::*;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that two floats agree within `1e-6`
#[macro_export]
macro_rules! assert_approx {
    ($left:expr, $right:expr) => {{
        let (left, right): (f64, f64) = ($left, $right);
        assert!(
            (left - right).abs() < 1e-6,
            "expected {} to be approximately {}",
            left,
            right
        );
    }};
}
