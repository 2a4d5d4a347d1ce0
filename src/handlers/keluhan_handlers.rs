// src/handlers/keluhan_handlers.rs
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::error;
use serde_json::json;

use crate::dtos::keluhan_dtos::{KeluhanFormRequest, SubmitKeluhanRequest};
use crate::errors::ServiceError;
use crate::handlers::ApiResponse;
use crate::middleware::auth_extractor::{AdminUser, AuthenticatedUser};
use crate::models::keluhan::KeluhanId;
use crate::services::keluhan_services::KeluhanService;

/// GET /api/keluhan
/// Raw array, newest first, each item with `reporter` (name or null).
#[get("/keluhan")]
pub async fn list_keluhan(svc: web::Data<KeluhanService>) -> HttpResponse {
    match svc.list_with_reporters().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            error!("Failed to fetch keluhan: {}", e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

/// GET /api/keluhan/{id}
#[get("/keluhan/{id}")]
pub async fn get_keluhan(
    svc: web::Data<KeluhanService>,
    path: web::Path<KeluhanId>,
) -> Result<HttpResponse, ServiceError> {
    let item = svc.get_with_reporter(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /api/keluhan
/// Signed-in user files a complaint with a required photo.
#[post("/keluhan")]
pub async fn submit_keluhan(
    svc: web::Data<KeluhanService>,
    user: AuthenticatedUser,
    body: web::Json<SubmitKeluhanRequest>,
) -> Result<HttpResponse, ServiceError> {
    let created = svc.submit(&user.session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Keluhan submitted", created)))
}

/// POST /api/admin/keluhan
#[post("/keluhan")]
pub async fn admin_create_keluhan(
    svc: web::Data<KeluhanService>,
    admin: AdminUser,
    body: web::Json<KeluhanFormRequest>,
) -> Result<HttpResponse, ServiceError> {
    let created = svc.create(&admin.session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Keluhan created", created)))
}

/// PUT /api/admin/keluhan/{id}
#[put("/keluhan/{id}")]
pub async fn admin_update_keluhan(
    svc: web::Data<KeluhanService>,
    admin: AdminUser,
    path: web::Path<KeluhanId>,
    body: web::Json<KeluhanFormRequest>,
) -> Result<HttpResponse, ServiceError> {
    let updated = svc
        .update(&admin.session, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Keluhan updated", updated)))
}

/// DELETE /api/admin/keluhan/{id}
#[delete("/keluhan/{id}")]
pub async fn admin_delete_keluhan(
    svc: web::Data<KeluhanService>,
    admin: AdminUser,
    path: web::Path<KeluhanId>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = svc.delete(&admin.session, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Keluhan deleted", deleted)))
}
