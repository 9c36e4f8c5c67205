//! HTTP response handling for errors

use super::types::EstimatorError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for EstimatorError {
    fn status_code(&self) -> StatusCode {
        match self {
            EstimatorError::Validation(_) | EstimatorError::Parsing(_) => StatusCode::BAD_REQUEST,
            EstimatorError::Generation(_) | EstimatorError::HttpClient(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            EstimatorError::Validation(msg) | EstimatorError::Parsing(msg) => msg.clone(),
            EstimatorError::RegionalData(msg) => msg.clone(),
            EstimatorError::Config(_) | EstimatorError::Io(_) | EstimatorError::Yaml(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse { error: message })
    }
}

/// Standard error response format: `{"error": "..."}`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error: message.into(),
        }
    }
}
