use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::{Profile, ProfileId, Role};

/// Snapshot of the profile a session was opened for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionProfile {
    pub id: ProfileId,
    pub nama_lengkap: String,
    pub email: String,
    pub role: Role,
}

impl From<&Profile> for SessionProfile {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id,
            nama_lengkap: p.nama_lengkap.clone(),
            email: p.email.clone(),
            role: p.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub profile: SessionProfile,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.profile.role.can(capability)
    }
}

/// Operations gated on the caller's role. Checked server-side by the
/// services on every mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SubmitComplaint,
    ManageComplaints,
    ManageUsers,
}

impl Capability {
    pub fn describe(&self) -> &'static str {
        match self {
            Capability::SubmitComplaint => "submit complaints",
            Capability::ManageComplaints => "manage complaints",
            Capability::ManageUsers => "manage users",
        }
    }
}

impl Role {
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::SubmitComplaint => true,
            Capability::ManageComplaints | Capability::ManageUsers => *self == Role::Admin,
        }
    }
}

/// JWT claims carried by the bearer token handed out at login.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// profile id
    pub sub: String,
    /// session id in the store
    pub sid: String,
    pub role: Role,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}
