// src/services/user_services.rs
use std::sync::Arc;

use log::{info, warn};

use crate::dtos::user_dtos::{UserDeletionReport, UserFormRequest};
use crate::errors::ServiceError;
use crate::models::profile::{NewProfile, Profile, ProfileId, ProfilePatch};
use crate::models::session::{Capability, Session};
use crate::repositories::gateway::{DataGateway, GatewayError};
use crate::repositories::keluhan_repository::KeluhanRepository;
use crate::repositories::photo_storage::PhotoStorage;
use crate::repositories::profile_repository::ProfileRepository;
use crate::services::password::hash_password;
use crate::services::require_capability;
use crate::services::validation::{check_email, check_password, normalize_email, require_fields};

/// Admin management of profiles, including the delete cascade over the
/// user's complaints and their photos.
#[derive(Clone)]
pub struct UserService {
    profiles: ProfileRepository,
    keluhan: KeluhanRepository,
    photos: PhotoStorage,
}

impl UserService {
    pub fn new(gateway: Arc<dyn DataGateway>, bucket: &str) -> Self {
        Self {
            profiles: ProfileRepository::new(gateway.clone()),
            keluhan: KeluhanRepository::new(gateway.clone()),
            photos: PhotoStorage::new(gateway, bucket),
        }
    }

    /// `by_name` gives the picker ordering, otherwise newest first.
    pub async fn list(&self, by_name: bool) -> Result<Vec<Profile>, GatewayError> {
        if by_name {
            self.profiles.list_by_name().await
        } else {
            self.profiles.list_recent().await
        }
    }

    pub async fn create(&self, actor: &Session, form: UserFormRequest) -> Result<Profile, ServiceError> {
        require_capability(actor, Capability::ManageUsers)?;
        let email = validate_form(&form)?;
        let password = form
            .password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ServiceError::validation("Required fields are missing: password"))?;
        check_password(password)?;

        if self.profiles.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let created = self
            .profiles
            .insert(&NewProfile {
                nama_lengkap: form.nama_lengkap.trim().to_string(),
                alamat_lengkap: form.alamat_lengkap.trim().to_string(),
                no_telp: form.no_telp.trim().to_string(),
                email,
                password: hash_password(password)?,
                role: form.role.unwrap_or_default(),
            })
            .await?;

        info!("Admin {} created profile {} ({})", actor.profile.id, created.id, created.role);
        Ok(created)
    }

    /// Edit a profile. A blank or absent password leaves the stored hash
    /// untouched, and an absent role keeps the stored role.
    pub async fn update(
        &self,
        actor: &Session,
        id: ProfileId,
        form: UserFormRequest,
    ) -> Result<Profile, ServiceError> {
        require_capability(actor, Capability::ManageUsers)?;
        let email = validate_form(&form)?;

        let password = match form.password.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => {
                check_password(p)?;
                Some(hash_password(p)?)
            }
            _ => None,
        };

        if let Some(other) = self.profiles.find_by_email(&email).await? {
            if other.id != id {
                return Err(ServiceError::Conflict("Email already registered".to_string()));
            }
        }

        let patch = ProfilePatch {
            nama_lengkap: Some(form.nama_lengkap.trim().to_string()),
            alamat_lengkap: Some(form.alamat_lengkap.trim().to_string()),
            no_telp: Some(form.no_telp.trim().to_string()),
            email: Some(email),
            password,
            role: form.role,
        };
        let updated = self
            .profiles
            .update(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("profile {}", id)))?;

        info!("Admin {} updated profile {}", actor.profile.id, id);
        Ok(updated)
    }

    /// Delete a user together with their complaints.
    ///
    /// Photos are removed best-effort first. The profile delete is attempted
    /// next; if the backend refuses it because complaints still reference the
    /// profile, those rows are deleted and the profile delete is retried
    /// once. Running the cascade again after a partial failure is safe.
    pub async fn delete(&self, actor: &Session, id: ProfileId) -> Result<UserDeletionReport, ServiceError> {
        require_capability(actor, Capability::ManageUsers)?;

        if self.profiles.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("profile {}", id)));
        }

        let complaints = self.keluhan.list_by_user(id).await?;
        let mut report = UserDeletionReport {
            user_id: id,
            complaints_found: complaints.len(),
            ..Default::default()
        };

        for url in complaints.iter().filter_map(|k| k.photo_url()) {
            if self.photos.remove_best_effort(url).await {
                report.photos_removed += 1;
            } else {
                report.photo_failures.push(url.to_string());
            }
        }

        let deleted = match self.profiles.delete(id).await {
            Ok(deleted) => deleted,
            Err(e) if e.is_foreign_key_violation() => {
                warn!("Profile {} still referenced by complaints, deleting them and retrying", id);
                report.complaints_deleted = self.keluhan.delete_by_user(id).await?;
                report.retried_after_foreign_key = true;
                self.profiles.delete(id).await?
            }
            Err(e) => return Err(e.into()),
        };
        if !deleted {
            return Err(ServiceError::NotFound(format!("profile {}", id)));
        }

        info!(
            "Admin {} deleted profile {} ({} complaints, {} photos removed, {} photo failures)",
            actor.profile.id,
            id,
            report.complaints_found,
            report.photos_removed,
            report.photo_failures.len()
        );
        Ok(report)
    }
}

/// Shared checks for create and edit; returns the normalised email.
fn validate_form(form: &UserFormRequest) -> Result<String, ServiceError> {
    require_fields(&[
        ("nama_lengkap", form.nama_lengkap.as_str()),
        ("email", form.email.as_str()),
        ("no_telp", form.no_telp.as_str()),
        ("alamat_lengkap", form.alamat_lengkap.as_str()),
    ])?;
    let email = normalize_email(&form.email);
    check_email(&email)?;
    Ok(email)
}
