use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::null_as_default;

/// Primary key of the `profiles` table (bigint identity).
pub type ProfileId = i64;

/// Access role stored on each profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Admin", alias = "ADMIN")]
    Admin,
    #[default]
    #[serde(alias = "User", alias = "USER")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Landing route for a signed-in user of this role.
    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::User => "/user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Row of `profiles`. The password hash is read for credential checks but
/// never written back out to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nama_lengkap: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alamat_lengkap: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_telp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert payload for `profiles`; `password` already holds the hash.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub nama_lengkap: String,
    pub alamat_lengkap: String,
    pub no_telp: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial update for `profiles`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama_lengkap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alamat_lengkap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_telp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}
