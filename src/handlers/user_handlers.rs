// src/handlers/user_handlers.rs
use actix_web::{delete, post, put, web, HttpResponse};
use log::{error, info};
use serde_json::json;

use crate::dtos::user_dtos::{UserFormRequest, UsersQuery};
use crate::errors::ServiceError;
use crate::handlers::ApiResponse;
use crate::middleware::auth_extractor::AdminUser;
use crate::models::profile::ProfileId;
use crate::services::auth_services::AuthService;
use crate::services::user_services::UserService;

/// GET /api/users
/// Raw array of profiles (no password). `?order=name` sorts by name.
pub async fn list_users(svc: web::Data<UserService>, query: web::Query<UsersQuery>) -> HttpResponse {
    let by_name = query.order.as_deref() == Some("name");
    match svc.list(by_name).await {
        Ok(profiles) => HttpResponse::Ok().json(profiles),
        Err(e) => {
            error!("Failed to fetch profiles: {}", e);
            HttpResponse::InternalServerError().json(json!({ "message": "Internal server error" }))
        }
    }
}

/// Anything but GET on /api/users.
pub async fn users_method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "message": "Method not allowed" }))
}

/// POST /api/admin/users
#[post("/users")]
pub async fn admin_create_user(
    svc: web::Data<UserService>,
    admin: AdminUser,
    body: web::Json<UserFormRequest>,
) -> Result<HttpResponse, ServiceError> {
    let created = svc.create(&admin.session, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("User created", created)))
}

/// PUT /api/admin/users/{id}
/// Open sessions of the edited profile are ended so the new role or
/// password takes effect immediately.
#[put("/users/{id}")]
pub async fn admin_update_user(
    svc: web::Data<UserService>,
    auth: web::Data<AuthService>,
    admin: AdminUser,
    path: web::Path<ProfileId>,
    body: web::Json<UserFormRequest>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let updated = svc.update(&admin.session, id, body.into_inner()).await?;

    let revoked = auth.revoke_profile(id);
    if revoked > 0 {
        info!("Ended {} session(s) of edited profile {}", revoked, id);
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success("User updated", updated)))
}

/// DELETE /api/admin/users/{id}
#[delete("/users/{id}")]
pub async fn admin_delete_user(
    svc: web::Data<UserService>,
    auth: web::Data<AuthService>,
    admin: AdminUser,
    path: web::Path<ProfileId>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let report = svc.delete(&admin.session, id).await?;
    auth.revoke_profile(id);

    let message = if report.photo_failures.is_empty() {
        "User deleted".to_string()
    } else {
        format!(
            "User deleted; {} photo(s) could not be removed from storage",
            report.photo_failures.len()
        )
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(message, report)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::dtos::auth::LoginIn;
    use crate::models::profile::Role;
    use crate::repositories::memory_gateway::MemoryGateway;
    use crate::test_support;

    #[actix_web::test]
    async fn users_list_hides_passwords() {
        let gw = Arc::new(MemoryGateway::new());
        test_support::seed_profile(&gw, "Andi", "andi@desa.id", Role::User, "andi123");
        let s = test_support::services(gw);
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/users").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["email"], "andi@desa.id");
        assert!(body[0].get("password").is_none());
    }

    #[actix_web::test]
    async fn users_list_survives_null_columns() {
        let gw = Arc::new(MemoryGateway::new());
        gw.seed(
            "profiles",
            json!({
                "id": 4,
                "nama_lengkap": null,
                "alamat_lengkap": null,
                "no_telp": null,
                "email": "kosong@desa.id",
                "password": null,
                "role": null
            }),
        );
        let s = test_support::services(gw);
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body[0]["id"], 4);
        assert_eq!(body[0]["email"], "kosong@desa.id");
        assert_eq!(body[0]["role"], "user");
    }

    #[actix_web::test]
    async fn users_endpoint_rejects_other_methods() {
        let gw = Arc::new(MemoryGateway::new());
        let s = test_support::services(gw);
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::post().uri("/api/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Method not allowed" }));
    }

    #[actix_web::test]
    async fn users_fetch_failure_is_generic_500() {
        let gw = Arc::new(MemoryGateway::new());
        gw.fail_selects_on("profiles");
        let s = test_support::services(gw);
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/api/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[actix_web::test]
    async fn deleting_a_user_ends_their_sessions() {
        let gw = Arc::new(MemoryGateway::new());
        test_support::seed_profile(&gw, "Admin", "admin@desa.id", Role::Admin, "admin123");
        let victim = test_support::seed_profile(&gw, "Andi", "andi@desa.id", Role::User, "andi123");
        let s = test_support::services(gw.clone());
        let (admin_token, _) = s
            .auth
            .login(LoginIn { email: "admin@desa.id".into(), password: "admin123".into() })
            .await
            .unwrap();
        let (victim_token, _) = s
            .auth
            .login(LoginIn { email: "andi@desa.id".into(), password: "andi123".into() })
            .await
            .unwrap();
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/admin/users/{}", victim))
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["user_id"], victim);
        assert!(s.auth.authenticate(&victim_token).is_err());
        assert!(s.auth.authenticate(&admin_token).is_ok());
    }

    #[actix_web::test]
    async fn editing_a_user_ends_their_sessions() {
        let gw = Arc::new(MemoryGateway::new());
        test_support::seed_profile(&gw, "Admin", "admin@desa.id", Role::Admin, "admin123");
        let edited = test_support::seed_profile(&gw, "Andi", "andi@desa.id", Role::User, "andi123");
        let s = test_support::services(gw.clone());
        let (admin_token, _) = s
            .auth
            .login(LoginIn { email: "admin@desa.id".into(), password: "admin123".into() })
            .await
            .unwrap();
        let (edited_token, _) = s
            .auth
            .login(LoginIn { email: "andi@desa.id".into(), password: "andi123".into() })
            .await
            .unwrap();
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/users/{}", edited))
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .set_json(json!({
                "nama_lengkap": "Andi Pratama",
                "email": "andi@desa.id",
                "no_telp": "0812",
                "alamat_lengkap": "Jl. Kenari 2",
                "role": "admin",
                "password": ""
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["nama_lengkap"], "Andi Pratama");
        assert_eq!(body["data"]["role"], "admin");
        assert!(s.auth.authenticate(&edited_token).is_err());
        assert!(s.auth.authenticate(&admin_token).is_ok());
    }

    #[actix_web::test]
    async fn anonymous_admin_calls_are_401() {
        let gw = Arc::new(MemoryGateway::new());
        let s = test_support::services(gw.clone());
        let app = test::init_service(App::new().configure(|cfg| s.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/api/admin/users")
            .set_json(json!({ "nama_lengkap": "X" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(gw.rows("profiles").is_empty());
    }
}
