pub mod auth_handlers;
pub mod keluhan_handlers;
pub mod user_handlers;

use actix_web::{get, HttpResponse, Responder};
use serde::Serialize;

/// Envelope used by every endpoint except the two raw read lists.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// GET /health
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("ok", env!("CARGO_PKG_VERSION")))
}
