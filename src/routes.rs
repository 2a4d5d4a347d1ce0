// src/routes.rs
use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::ServiceError;
use crate::handlers::{auth_handlers, health, keluhan_handlers, user_handlers};

/// Base64 photos are ~4/3 of the 5 MB cap, plus the form fields.
const JSON_LIMIT: usize = 8 * 1024 * 1024;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ServiceError::validation(format!("Invalid request body: {}", err)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(JSON_LIMIT).error_handler(json_error))
        .service(health)
        .service(
            web::scope("/auth")
                .service(auth_handlers::register) // POST /auth/register
                .service(auth_handlers::login) // POST /auth/login
                .service(auth_handlers::logout) // POST /auth/logout
                .service(auth_handlers::current_session) // GET /auth/session
                .service(auth_handlers::guard), // GET /auth/guard?path=
        )
        .service(
            web::scope("/api")
                .service(
                    web::scope("/admin")
                        .service(keluhan_handlers::admin_create_keluhan)
                        .service(keluhan_handlers::admin_update_keluhan)
                        .service(keluhan_handlers::admin_delete_keluhan)
                        .service(user_handlers::admin_create_user)
                        .service(user_handlers::admin_update_user)
                        .service(user_handlers::admin_delete_user),
                )
                .service(keluhan_handlers::list_keluhan) // GET /api/keluhan
                .service(keluhan_handlers::get_keluhan) // GET /api/keluhan/{id}
                .service(keluhan_handlers::submit_keluhan) // POST /api/keluhan
                .service(
                    web::resource("/users")
                        .route(web::get().to(user_handlers::list_users))
                        .default_service(web::route().to(user_handlers::users_method_not_allowed)),
                ),
        );
}
