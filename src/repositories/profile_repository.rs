// src/repositories/profile_repository.rs
use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::models::profile::{NewProfile, Profile, ProfileId, ProfilePatch};
use crate::repositories::gateway::{DataGateway, Filter, GatewayError, Select};

pub const PROFILES_TABLE: &str = "profiles";

/// Typed access to the `profiles` table.
#[derive(Clone)]
pub struct ProfileRepository {
    gateway: Arc<dyn DataGateway>,
}

impl ProfileRepository {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// All profiles, newest first.
    pub async fn list_recent(&self) -> Result<Vec<Profile>, GatewayError> {
        let rows = self
            .gateway
            .select(PROFILES_TABLE, &Select::all().order_desc("created_at"))
            .await?;
        decode_rows(rows)
    }

    /// All profiles ordered by name, for pickers.
    pub async fn list_by_name(&self) -> Result<Vec<Profile>, GatewayError> {
        let rows = self
            .gateway
            .select(PROFILES_TABLE, &Select::all().order_asc("nama_lengkap"))
            .await?;
        decode_rows(rows)
    }

    pub async fn find_by_id(&self, id: ProfileId) -> Result<Option<Profile>, GatewayError> {
        let rows = self
            .gateway
            .select(PROFILES_TABLE, &Select::all().filter(Filter::eq("id", id)))
            .await?;
        Ok(decode_rows::<Profile>(rows)?.into_iter().next())
    }

    /// Lookup by login key. Callers pass the normalised (trimmed, lowercase) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, GatewayError> {
        let rows = self
            .gateway
            .select(PROFILES_TABLE, &Select::all().filter(Filter::eq("email", email)))
            .await?;
        Ok(decode_rows::<Profile>(rows)?.into_iter().next())
    }

    /// Map of profile id to display name for the given ids. Ids with no
    /// matching row are simply absent.
    pub async fn names_for(
        &self,
        ids: &[ProfileId],
    ) -> Result<HashMap<ProfileId, String>, GatewayError> {
        #[derive(Deserialize)]
        struct NameRow {
            id: ProfileId,
            nama_lengkap: Option<String>,
        }

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = Select::all()
            .columns("id,nama_lengkap")
            .filter(Filter::in_list("id", ids.iter().copied()));
        let rows = self.gateway.select(PROFILES_TABLE, &query).await?;

        let mut names = HashMap::new();
        for row in rows {
            let r: NameRow = serde_json::from_value(row)?;
            if let Some(name) = r.nama_lengkap {
                names.insert(r.id, name);
            }
        }
        Ok(names)
    }

    pub async fn insert(&self, profile: &NewProfile) -> Result<Profile, GatewayError> {
        let row = self
            .gateway
            .insert(PROFILES_TABLE, serde_json::to_value(profile)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Returns `None` when no row has this id.
    pub async fn update(
        &self,
        id: ProfileId,
        patch: &ProfilePatch,
    ) -> Result<Option<Profile>, GatewayError> {
        let rows = self
            .gateway
            .update(PROFILES_TABLE, &[Filter::eq("id", id)], serde_json::to_value(patch)?)
            .await?;
        Ok(decode_rows::<Profile>(rows)?.into_iter().next())
    }

    /// Delete by id. Returns true when a row was removed.
    pub async fn delete(&self, id: ProfileId) -> Result<bool, GatewayError> {
        let rows = self
            .gateway
            .delete(PROFILES_TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!rows.is_empty())
    }
}

pub(crate) fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(GatewayError::from))
        .collect()
}
