use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::session::SessionProfile;

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    #[serde(default)]
    pub nama_lengkap: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub no_telp: String,
    #[serde(default)]
    pub alamat_lengkap: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub access_token: String,
    pub token_type: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session: SessionOut,
    pub profile: SessionProfile,
    pub redirect_to: String,
}

#[derive(Debug, Deserialize)]
pub struct GuardQuery {
    pub path: String,
}
