// src/services/auth_services.rs
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{info, warn};
use uuid::Uuid;

use crate::dtos::auth::{LoginIn, RegisterIn};
use crate::errors::ServiceError;
use crate::models::profile::{NewProfile, Profile, ProfileId, Role};
use crate::models::session::{Session, SessionClaims, SessionProfile};
use crate::repositories::gateway::DataGateway;
use crate::repositories::profile_repository::ProfileRepository;
use crate::services::password::{hash_password, verify_password};
use crate::services::session_store::SessionStore;
use crate::services::validation::{check_email, check_password, normalize_email, require_fields};

/// Registration, login and bearer-token resolution.
#[derive(Clone)]
pub struct AuthService {
    profiles: ProfileRepository,
    sessions: SessionStore,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn DataGateway>, sessions: SessionStore, secret: &str) -> Self {
        Self {
            profiles: ProfileRepository::new(gateway),
            sessions,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Self-service sign up. The role is always `user`.
    pub async fn register(&self, input: RegisterIn) -> Result<Profile, ServiceError> {
        require_fields(&[
            ("nama_lengkap", input.nama_lengkap.as_str()),
            ("email", input.email.as_str()),
            ("password", input.password.as_str()),
            ("no_telp", input.no_telp.as_str()),
            ("alamat_lengkap", input.alamat_lengkap.as_str()),
        ])?;
        let email = normalize_email(&input.email);
        check_email(&email)?;
        check_password(&input.password)?;

        if self.profiles.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let profile = self
            .profiles
            .insert(&NewProfile {
                nama_lengkap: input.nama_lengkap.trim().to_string(),
                alamat_lengkap: input.alamat_lengkap.trim().to_string(),
                no_telp: input.no_telp.trim().to_string(),
                email,
                password: hash_password(&input.password)?,
                role: Role::User,
            })
            .await?;

        info!("Registered profile {}", profile.id);
        Ok(profile)
    }

    /// Check credentials and open a session. A failed attempt never touches
    /// the session store.
    pub async fn login(&self, input: LoginIn) -> Result<(String, Session), ServiceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }

        let profile = match self.profiles.find_by_email(&email).await? {
            Some(p) => p,
            None => return Err(ServiceError::InvalidCredentials),
        };
        if !verify_password(&input.password, &profile.password) {
            warn!("Failed login for profile {}", profile.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.sessions.init(SessionProfile::from(&profile));
        let token = match self.issue_token(&session) {
            Ok(t) => t,
            Err(e) => {
                self.sessions.clear(&session.id);
                return Err(e);
            }
        };

        info!(
            "Profile {} logged in as {} ({} open sessions)",
            profile.id,
            profile.role,
            self.sessions.len()
        );
        Ok((token, session))
    }

    fn issue_token(&self, session: &Session) -> Result<String, ServiceError> {
        let claims = SessionClaims {
            sub: session.profile.id.to_string(),
            sid: session.id.to_string(),
            role: session.profile.role,
            email: session.profile.email.clone(),
            iat: session.issued_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Other(format!("failed to sign token: {}", e)))
    }

    /// Resolve a bearer token to its live session.
    pub fn authenticate(&self, token: &str) -> Result<Session, ServiceError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|_| ServiceError::Unauthorized)?;
        let sid = Uuid::parse_str(&data.claims.sid).map_err(|_| ServiceError::Unauthorized)?;

        let session = self.sessions.get(&sid).ok_or(ServiceError::Unauthorized)?;
        if session.profile.id.to_string() != data.claims.sub || session.expires_at < Utc::now() {
            return Err(ServiceError::Unauthorized);
        }
        Ok(session)
    }

    pub fn logout(&self, session: &Session) -> bool {
        let cleared = self.sessions.clear(&session.id);
        if cleared {
            info!("Profile {} logged out", session.profile.id);
        }
        cleared
    }

    /// End every session of a profile whose stored record changed.
    pub fn revoke_profile(&self, profile_id: ProfileId) -> usize {
        self.sessions.revoke_profile(profile_id)
    }
}
