// src/errors.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{debug, error};
use thiserror::Error;

use crate::handlers::ApiResponse;
use crate::repositories::gateway::GatewayError;

/// Failure of a workflow, mapped onto an HTTP status by the handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthorized,
    #[error("not allowed to {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(#[from] GatewayError),
    #[error("other: {0}")]
    Other(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    /// Message shown to the client. Backend failures get a generic prefix
    /// plus the underlying message.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Backend(e) => format!("Backend request failed: {}", e),
            ServiceError::Other(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials | ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Backend(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected: {}", self);
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.client_message()))
    }
}
