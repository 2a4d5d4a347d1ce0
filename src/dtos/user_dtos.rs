use serde::{Deserialize, Serialize};

use crate::models::profile::{ProfileId, Role};

/// Admin create/edit form for a profile. A blank password on edit means
/// "keep the current one".
#[derive(Debug, Deserialize)]
pub struct UserFormRequest {
    #[serde(default)]
    pub nama_lengkap: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub no_telp: String,
    #[serde(default)]
    pub alamat_lengkap: String,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    /// `name` sorts by nama_lengkap; anything else is newest first
    pub order: Option<String>,
}

/// Outcome of the user-delete cascade.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct UserDeletionReport {
    pub user_id: ProfileId,
    pub complaints_found: usize,
    pub photos_removed: usize,
    pub photo_failures: Vec<String>,
    pub complaints_deleted: usize,
    pub retried_after_foreign_key: bool,
}
