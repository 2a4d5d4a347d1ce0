// src/services/keluhan_services.rs
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};

use crate::dtos::keluhan_dtos::{KeluhanDeleted, KeluhanFormRequest, KeluhanOut, SubmitKeluhanRequest};
use crate::errors::ServiceError;
use crate::models::keluhan::{Keluhan, KeluhanId, KeluhanPatch, KeluhanStatus, NewKeluhan};
use crate::models::profile::ProfileId;
use crate::models::session::{Capability, Session};
use crate::repositories::gateway::{DataGateway, GatewayError};
use crate::repositories::keluhan_repository::KeluhanRepository;
use crate::repositories::photo_storage::PhotoStorage;
use crate::repositories::profile_repository::ProfileRepository;
use crate::services::photo_services::{decode_photo, DecodedPhoto, ADMIN_POLICY, SUBMISSION_POLICY};
use crate::services::require_capability;
use crate::services::validation::require_fields;

/// Complaint workflows: the joined read, end-user submission, and the
/// admin create/edit/delete paths.
#[derive(Clone)]
pub struct KeluhanService {
    keluhan: KeluhanRepository,
    profiles: ProfileRepository,
    photos: PhotoStorage,
}

impl KeluhanService {
    pub fn new(gateway: Arc<dyn DataGateway>, bucket: &str) -> Self {
        Self {
            keluhan: KeluhanRepository::new(gateway.clone()),
            profiles: ProfileRepository::new(gateway.clone()),
            photos: PhotoStorage::new(gateway, bucket),
        }
    }

    /// Every complaint, newest first, with the reporter's name attached.
    /// A failed reporter lookup is logged and yields `reporter: null`
    /// everywhere instead of failing the read.
    pub async fn list_with_reporters(&self) -> Result<Vec<KeluhanOut>, GatewayError> {
        let rows = self.keluhan.list_recent().await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<ProfileId> = rows
            .iter()
            .filter_map(|k| k.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let names = match self.profiles.names_for(&user_ids).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Reporter lookup failed, returning complaints without names: {}", e);
                HashMap::new()
            }
        };

        Ok(rows.into_iter().map(|k| with_reporter(k, &names)).collect())
    }

    pub async fn get_with_reporter(&self, id: KeluhanId) -> Result<KeluhanOut, ServiceError> {
        let keluhan = self
            .keluhan
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("keluhan {}", id)))?;

        let names = match keluhan.user_id {
            Some(uid) => self.profiles.names_for(&[uid]).await.unwrap_or_else(|e| {
                warn!("Reporter lookup for keluhan {} failed: {}", id, e);
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Ok(with_reporter(keluhan, &names))
    }

    /// End-user submission: validate, upload the photo, then insert the row
    /// pointing at it. The insert is never attempted without a stored photo.
    pub async fn submit(
        &self,
        actor: &Session,
        form: SubmitKeluhanRequest,
    ) -> Result<Keluhan, ServiceError> {
        require_capability(actor, Capability::SubmitComplaint)?;
        require_fields(&[
            ("judul", form.judul.as_str()),
            ("description", form.description.as_str()),
        ])?;
        let upload = form
            .photo
            .as_ref()
            .ok_or_else(|| ServiceError::validation("A photo is required"))?;
        let photo = decode_photo(upload, &SUBMISSION_POLICY)?;

        let media = self.store_photo(photo).await?;
        let new = NewKeluhan {
            judul: form.judul.trim().to_string(),
            description: form.description.trim().to_string(),
            user_id: actor.profile.id,
            status: KeluhanStatus::Pending,
            media: Some(media.clone()),
            created_at: None,
        };

        let created = self.insert_or_discard_photo(&new, &media).await?;
        info!("Profile {} submitted keluhan {}", actor.profile.id, created.id);
        Ok(created)
    }

    /// Admin create path.
    pub async fn create(
        &self,
        actor: &Session,
        form: KeluhanFormRequest,
    ) -> Result<Keluhan, ServiceError> {
        require_capability(actor, Capability::ManageComplaints)?;
        let (user_id, status) = validate_admin_form(&form)?;
        let photo = decode_optional(&form)?;

        let media = match photo {
            Some(p) => Some(self.store_photo(p).await?),
            None => None,
        };
        let new = NewKeluhan {
            judul: form.judul.trim().to_string(),
            description: form.description.trim().to_string(),
            user_id,
            status,
            media: media.clone(),
            created_at: Some(Utc::now().to_rfc3339()),
        };

        let created = match &media {
            Some(url) => self.insert_or_discard_photo(&new, url).await?,
            None => self.keluhan.insert(&new).await?,
        };
        info!("Admin {} created keluhan {}", actor.profile.id, created.id);
        Ok(created)
    }

    /// Admin edit path. A new photo replaces the old one (old removed first,
    /// best-effort); without one the stored URL is kept and storage is not
    /// touched.
    pub async fn update(
        &self,
        actor: &Session,
        id: KeluhanId,
        form: KeluhanFormRequest,
    ) -> Result<Keluhan, ServiceError> {
        require_capability(actor, Capability::ManageComplaints)?;
        let (user_id, status) = validate_admin_form(&form)?;
        let photo = decode_optional(&form)?;

        let existing = self
            .keluhan
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("keluhan {}", id)))?;

        let uploaded = match photo {
            Some(p) => {
                if let Some(old) = existing.photo_url() {
                    self.photos.remove_best_effort(old).await;
                }
                Some(self.store_photo(p).await?)
            }
            None => None,
        };

        let patch = KeluhanPatch {
            judul: form.judul.trim().to_string(),
            description: form.description.trim().to_string(),
            user_id,
            status,
            media: uploaded.clone().or_else(|| existing.media.clone()),
        };
        // a row that could not be saved must not leave its new photo behind
        let updated = match self.keluhan.update(id, &patch).await {
            Ok(Some(k)) => k,
            outcome => {
                if let Some(url) = &uploaded {
                    self.photos.remove_best_effort(url).await;
                }
                return Err(match outcome {
                    Err(e) => e.into(),
                    Ok(_) => ServiceError::NotFound(format!("keluhan {}", id)),
                });
            }
        };

        info!("Admin {} updated keluhan {} ({})", actor.profile.id, id, updated.status);
        Ok(updated)
    }

    /// Remove the photo (best-effort) and then the row. Only the row delete
    /// can fail the call.
    pub async fn delete(&self, actor: &Session, id: KeluhanId) -> Result<KeluhanDeleted, ServiceError> {
        require_capability(actor, Capability::ManageComplaints)?;

        let existing = self
            .keluhan
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("keluhan {}", id)))?;

        let photo_removed = match existing.photo_url() {
            Some(url) => self.photos.remove_best_effort(url).await,
            None => false,
        };

        if !self.keluhan.delete(id).await? {
            return Err(ServiceError::NotFound(format!("keluhan {}", id)));
        }

        info!("Admin {} deleted keluhan {}", actor.profile.id, id);
        Ok(KeluhanDeleted { id, photo_removed })
    }

    async fn store_photo(&self, photo: DecodedPhoto) -> Result<String, ServiceError> {
        self.photos
            .store(&photo.extension, photo.bytes, &photo.content_type)
            .await
            .map_err(|e| {
                warn!("Photo upload failed: {}", e);
                ServiceError::Backend(e)
            })
    }

    /// Insert a row whose photo was just uploaded; if the insert fails the
    /// orphaned photo is removed again.
    async fn insert_or_discard_photo(
        &self,
        new: &NewKeluhan,
        media: &str,
    ) -> Result<Keluhan, ServiceError> {
        match self.keluhan.insert(new).await {
            Ok(k) => Ok(k),
            Err(e) => {
                self.photos.remove_best_effort(media).await;
                Err(e.into())
            }
        }
    }
}

fn with_reporter(keluhan: Keluhan, names: &HashMap<ProfileId, String>) -> KeluhanOut {
    let reporter = keluhan
        .user_id
        .and_then(|uid| names.get(&uid))
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    KeluhanOut { keluhan, reporter }
}

fn validate_admin_form(form: &KeluhanFormRequest) -> Result<(ProfileId, KeluhanStatus), ServiceError> {
    require_fields(&[
        ("judul", form.judul.as_str()),
        ("description", form.description.as_str()),
    ])?;
    let user_id = form
        .user_id
        .filter(|id| *id > 0)
        .ok_or_else(|| ServiceError::validation("Required fields are missing: user_id"))?;
    let status = form
        .status
        .ok_or_else(|| ServiceError::validation("Required fields are missing: status"))?;
    Ok((user_id, status))
}

fn decode_optional(form: &KeluhanFormRequest) -> Result<Option<DecodedPhoto>, ServiceError> {
    form.photo
        .as_ref()
        .map(|p| decode_photo(p, &ADMIN_POLICY))
        .transpose()
}
