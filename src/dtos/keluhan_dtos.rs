use serde::{Deserialize, Serialize};

use crate::dtos::photo_dtos::PhotoUpload;
use crate::models::keluhan::{Keluhan, KeluhanId, KeluhanStatus};
use crate::models::profile::ProfileId;

/// Complaint form filled in by a signed-in user.
#[derive(Debug, Deserialize)]
pub struct SubmitKeluhanRequest {
    #[serde(default)]
    pub judul: String,
    #[serde(default)]
    pub description: String,
    pub photo: Option<PhotoUpload>,
}

/// Admin create/edit form.
#[derive(Debug, Deserialize)]
pub struct KeluhanFormRequest {
    #[serde(default)]
    pub judul: String,
    #[serde(default)]
    pub description: String,
    pub user_id: Option<ProfileId>,
    pub status: Option<KeluhanStatus>,
    pub photo: Option<PhotoUpload>,
}

/// Complaint row plus the reporter's display name. `reporter` is always
/// present in the JSON, as a name or `null`.
#[derive(Debug, Clone, Serialize)]
pub struct KeluhanOut {
    #[serde(flatten)]
    pub keluhan: Keluhan,
    pub reporter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeluhanDeleted {
    pub id: KeluhanId,
    pub photo_removed: bool,
}
