// src/repositories/keluhan_repository.rs
use std::sync::Arc;

use crate::models::keluhan::{Keluhan, KeluhanId, KeluhanPatch, NewKeluhan};
use crate::models::profile::ProfileId;
use crate::repositories::gateway::{DataGateway, Filter, GatewayError, Select};
use crate::repositories::profile_repository::decode_rows as decode;

pub const KELUHAN_TABLE: &str = "keluhan";

/// Typed access to the `keluhan` table.
#[derive(Clone)]
pub struct KeluhanRepository {
    gateway: Arc<dyn DataGateway>,
}

impl KeluhanRepository {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }

    /// All complaints, newest first.
    pub async fn list_recent(&self) -> Result<Vec<Keluhan>, GatewayError> {
        let rows = self
            .gateway
            .select(KELUHAN_TABLE, &Select::all().order_desc("created_at"))
            .await?;
        decode(rows)
    }

    pub async fn list_by_user(&self, user_id: ProfileId) -> Result<Vec<Keluhan>, GatewayError> {
        let query = Select::all()
            .filter(Filter::eq("user_id", user_id))
            .order_desc("created_at");
        decode(self.gateway.select(KELUHAN_TABLE, &query).await?)
    }

    pub async fn find_by_id(&self, id: KeluhanId) -> Result<Option<Keluhan>, GatewayError> {
        let rows = self
            .gateway
            .select(KELUHAN_TABLE, &Select::all().filter(Filter::eq("id", id)))
            .await?;
        Ok(decode::<Keluhan>(rows)?.into_iter().next())
    }

    pub async fn insert(&self, keluhan: &NewKeluhan) -> Result<Keluhan, GatewayError> {
        let row = self
            .gateway
            .insert(KELUHAN_TABLE, serde_json::to_value(keluhan)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn update(
        &self,
        id: KeluhanId,
        patch: &KeluhanPatch,
    ) -> Result<Option<Keluhan>, GatewayError> {
        let rows = self
            .gateway
            .update(KELUHAN_TABLE, &[Filter::eq("id", id)], serde_json::to_value(patch)?)
            .await?;
        Ok(decode::<Keluhan>(rows)?.into_iter().next())
    }

    /// Returns true when a row was removed.
    pub async fn delete(&self, id: KeluhanId) -> Result<bool, GatewayError> {
        let rows = self
            .gateway
            .delete(KELUHAN_TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!rows.is_empty())
    }

    /// Delete every complaint owned by `user_id`; returns how many went.
    pub async fn delete_by_user(&self, user_id: ProfileId) -> Result<usize, GatewayError> {
        let rows = self
            .gateway
            .delete(KELUHAN_TABLE, &[Filter::eq("user_id", user_id)])
            .await?;
        Ok(rows.len())
    }
}
