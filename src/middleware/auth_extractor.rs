// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::debug;

use crate::errors::ServiceError;
use crate::models::profile::Role;
use crate::models::session::Session;
use crate::services::auth_services::AuthService;

/// Caller with a live session, resolved from `Authorization: Bearer <token>`.
pub struct AuthenticatedUser {
    pub session: Session,
}

/// Caller whose session carries the admin role. The services re-check the
/// capability themselves; this only rejects early.
pub struct AdminUser {
    pub session: Session,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn resolve_session(req: &HttpRequest) -> Result<Session, ServiceError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| ServiceError::Other("auth service not registered".to_string()))?;
    let token = bearer_token(req).ok_or(ServiceError::Unauthorized)?;
    auth.authenticate(token).map_err(|e| {
        debug!("Rejected bearer token on {}: {}", req.path(), e);
        e
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            resolve_session(req)
                .map(|session| AuthenticatedUser { session })
                .map_err(Error::from),
        )
    }
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<AdminUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = resolve_session(req).and_then(|session| {
            if session.role() == Role::Admin {
                Ok(AdminUser { session })
            } else {
                Err(ServiceError::Forbidden("use admin endpoints"))
            }
        });
        ready(result.map_err(Error::from))
    }
}
