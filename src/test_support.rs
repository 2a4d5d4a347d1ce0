// src/test_support.rs
//! Fixtures shared by the unit and handler tests.

use std::sync::Arc;

use actix_web::web;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::dtos::photo_dtos::PhotoUpload;
use crate::models::keluhan::KeluhanId;
use crate::models::profile::{ProfileId, Role};
use crate::models::session::{Session, SessionProfile};
use crate::repositories::memory_gateway::MemoryGateway;
use crate::routes;
use crate::services::auth_services::AuthService;
use crate::services::keluhan_services::KeluhanService;
use crate::services::password::hash_password;
use crate::services::session_store::SessionStore;
use crate::services::user_services::UserService;

pub const TEST_BUCKET: &str = "gambarkeluhan";
pub const TEST_SECRET: &str = "test-session-secret";

pub struct Services {
    pub keluhan: KeluhanService,
    pub users: UserService,
    pub auth: AuthService,
}

/// The three services wired over one in-memory backend.
pub fn services(gw: Arc<MemoryGateway>) -> Services {
    Services {
        keluhan: KeluhanService::new(gw.clone(), TEST_BUCKET),
        users: UserService::new(gw.clone(), TEST_BUCKET),
        auth: AuthService::new(gw, SessionStore::new(Duration::hours(1)), TEST_SECRET),
    }
}

/// Profile row with a real password hash, so it can log in.
pub fn seed_profile(gw: &MemoryGateway, name: &str, email: &str, role: Role, password: &str) -> ProfileId {
    let row = gw.seed(
        "profiles",
        json!({
            "nama_lengkap": name,
            "email": email,
            "password": hash_password(password).unwrap(),
            "no_telp": "08123456789",
            "alamat_lengkap": "Jl. Mawar 1",
            "role": role,
        }),
    );
    row["id"].as_i64().unwrap()
}

/// Profile row that never logs in; the email is derived from the name.
pub fn seed_plain_profile(gw: &MemoryGateway, name: &str, role: Role) -> ProfileId {
    let row = gw.seed(
        "profiles",
        json!({
            "nama_lengkap": name,
            "email": format!("{}@desa.id", name.to_lowercase().replace(' ', ".")),
            "password": "",
            "no_telp": "08123456789",
            "alamat_lengkap": "Jl. Mawar 1",
            "role": role,
        }),
    );
    row["id"].as_i64().unwrap()
}

pub fn seed_keluhan(
    gw: &MemoryGateway,
    judul: &str,
    user_id: Option<ProfileId>,
    media: Option<&str>,
) -> KeluhanId {
    let row = gw.seed(
        "keluhan",
        json!({
            "judul": judul,
            "description": format!("Keterangan {}", judul),
            "user_id": user_id,
            "status": "Pending",
            "media": media,
        }),
    );
    row["id"].as_i64().unwrap()
}

/// Session that was never stored; enough for the service-level role checks.
pub fn session(id: ProfileId, role: Role) -> Session {
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        profile: SessionProfile {
            id,
            nama_lengkap: format!("Profil {}", id),
            email: format!("profil{}@desa.id", id),
            role,
        },
        issued_at: now,
        expires_at: now + Duration::hours(1),
    }
}

/// A tiny PNG header, base64 encoded the way the front end sends it.
pub fn png_upload() -> PhotoUpload {
    PhotoUpload {
        image_data: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        file_name: "jalan.png".to_string(),
        content_type: "image/png".to_string(),
    }
}

impl Services {
    /// Register the services as app data and mount every route, the way
    /// `main` does for the real server.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.keluhan.clone()))
            .app_data(web::Data::new(self.users.clone()))
            .app_data(web::Data::new(self.auth.clone()));
        routes::configure(cfg);
    }
}
