use actix_web::{get, post, web, HttpResponse};

use crate::dtos::auth::{GuardQuery, LoginIn, LoginResponse, RegisterIn, SessionOut};
use crate::errors::ServiceError;
use crate::handlers::ApiResponse;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::middleware::route_guard::{evaluate, GuardState};
use crate::models::session::SessionProfile;
use crate::services::auth_services::AuthService;

/// POST /auth/register
/// Self sign up; the new account always gets the `user` role.
#[post("/register")]
pub async fn register(
    svc: web::Data<AuthService>,
    body: web::Json<RegisterIn>,
) -> Result<HttpResponse, ServiceError> {
    let profile = svc.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Account created. Please log in.",
        SessionProfile::from(&profile),
    )))
}

/// POST /auth/login
/// Returns the bearer token, the profile snapshot and where to go next.
#[post("/login")]
pub async fn login(
    svc: web::Data<AuthService>,
    body: web::Json<LoginIn>,
) -> Result<HttpResponse, ServiceError> {
    let (token, session) = svc.login(body.into_inner()).await?;

    let response = LoginResponse {
        session: SessionOut {
            access_token: token,
            token_type: "bearer".to_string(),
            session_id: session.id,
            expires_at: session.expires_at,
        },
        redirect_to: session.role().home_route().to_string(),
        profile: session.profile,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success("Login successful", response)))
}

/// POST /auth/logout
#[post("/logout")]
pub async fn logout(svc: web::Data<AuthService>, user: AuthenticatedUser) -> HttpResponse {
    svc.logout(&user.session);
    HttpResponse::Ok().json(ApiResponse::<()>::success("Logged out", ()))
}

/// GET /auth/session
#[get("/session")]
pub async fn current_session(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("Session active", user.session))
}

/// GET /auth/guard?path=/admin/users
/// Token is optional; without a valid one the caller is treated as signed out.
#[get("/guard")]
pub async fn guard(user: Option<AuthenticatedUser>, query: web::Query<GuardQuery>) -> HttpResponse {
    let state = GuardState::from_session(user.as_ref().map(|u| &u.session));
    HttpResponse::Ok().json(evaluate(state, &query.path))
}
