//! Helper functions for creating specific error types

use super::types::EstimatorError;

impl EstimatorError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn regional_data<S: Into<String>>(message: S) -> Self {
        Self::RegionalData(message.into())
    }

    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Debug rendering of the error and its source chain, returned to callers
    /// of the allocation endpoint in place of a stack trace
    pub fn chain_report(&self) -> String {
        let mut report = format!("{:?}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            report.push_str("\n  caused by: ");
            report.push_str(&cause.to_string());
            source = cause.source();
        }
        report
    }
}
