use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::null_as_default;
use crate::models::profile::ProfileId;

/// Primary key of the `keluhan` table.
pub type KeluhanId = i64;

/// Triage state of a complaint. Written as the capitalised labels
/// (`"Pending"`, `"On Progress"`, `"Done"`), so a new submission stores
/// `"Pending"` rather than `"pending"`. The lowercase spellings written by
/// older clients are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeluhanStatus {
    #[default]
    #[serde(rename = "Pending", alias = "pending", alias = "PENDING")]
    Pending,
    #[serde(
        rename = "On Progress",
        alias = "on progress",
        alias = "on_progress",
        alias = "In Progress",
        alias = "in progress"
    )]
    OnProgress,
    #[serde(rename = "Done", alias = "done", alias = "DONE")]
    Done,
}

impl KeluhanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeluhanStatus::Pending => "Pending",
            KeluhanStatus::OnProgress => "On Progress",
            KeluhanStatus::Done => "Done",
        }
    }
}

impl FromStr for KeluhanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', " ").as_str() {
            "pending" => Ok(KeluhanStatus::Pending),
            "on progress" | "in progress" => Ok(KeluhanStatus::OnProgress),
            "done" => Ok(KeluhanStatus::Done),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Row decoding for `status`: `null` and unrecognised labels read as
/// `Pending` so one odd row cannot fail a whole listing.
fn lenient_status<'de, D>(deserializer: D) -> Result<KeluhanStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw {
        None => KeluhanStatus::default(),
        Some(label) => label.parse().unwrap_or_else(|e| {
            warn!("Reading keluhan status as Pending: {}", e);
            KeluhanStatus::default()
        }),
    })
}

impl fmt::Display for KeluhanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keluhan {
    pub id: KeluhanId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub judul: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub user_id: Option<ProfileId>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: KeluhanStatus,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Keluhan {
    /// Photo URL, ignoring empty strings left behind by older clients.
    pub fn photo_url(&self) -> Option<&str> {
        self.media.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewKeluhan {
    pub judul: String,
    pub description: String,
    pub user_id: ProfileId,
    pub status: KeluhanStatus,
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Full-row update sent by the admin edit form.
#[derive(Debug, Clone, Serialize)]
pub struct KeluhanPatch {
    pub judul: String,
    pub description: String,
    pub user_id: ProfileId,
    pub status: KeluhanStatus,
    pub media: Option<String>,
}
