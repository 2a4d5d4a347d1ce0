// src/repositories/photo_storage.rs
use std::sync::Arc;

use chrono::Utc;
use log::warn;
use urlencoding::decode;
use uuid::Uuid;

use crate::repositories::gateway::{DataGateway, GatewayError};

/// Folder inside the bucket that every complaint photo lives under.
pub const PHOTO_PREFIX: &str = "keluhan";

/// Complaint photos in the object-storage bucket.
#[derive(Clone)]
pub struct PhotoStorage {
    gateway: Arc<dyn DataGateway>,
    bucket: String,
}

impl PhotoStorage {
    pub fn new(gateway: Arc<dyn DataGateway>, bucket: impl Into<String>) -> Self {
        Self { gateway, bucket: bucket.into() }
    }

    /// `keluhan/<unix millis>-<random>.<ext>`
    pub fn new_object_path(extension: &str) -> String {
        format!(
            "{}/{}-{}.{}",
            PHOTO_PREFIX,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            extension
        )
    }

    /// Upload under a fresh random name and return the public URL.
    pub async fn store(
        &self,
        extension: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let path = Self::new_object_path(extension);
        self.gateway.upload(&self.bucket, &path, bytes, content_type).await?;
        Ok(self.gateway.public_url(&self.bucket, &path))
    }

    /// Recover the object path from a public URL. URLs produced by this
    /// bucket's public scheme yield their exact path; anything else is
    /// assumed to name a file directly under `keluhan/`.
    pub fn object_path_from_url(&self, url: &str) -> Option<String> {
        let url = url.trim();
        let url = url.split(['?', '#']).next().unwrap_or(url);
        let marker = format!("/object/public/{}/", self.bucket);

        let raw = match url.find(&marker) {
            Some(idx) => url[idx + marker.len()..].to_string(),
            None => {
                let file = url.rsplit('/').next().filter(|f| !f.is_empty())?;
                format!("{}/{}", PHOTO_PREFIX, file)
            }
        };
        if raw.is_empty() {
            return None;
        }
        Some(decode(&raw).map(|p| p.into_owned()).unwrap_or(raw))
    }

    pub async fn remove_by_url(&self, url: &str) -> Result<(), GatewayError> {
        let path = self
            .object_path_from_url(url)
            .ok_or_else(|| GatewayError::Other(format!("unrecognised photo url: {}", url)))?;
        self.gateway.remove(&self.bucket, &[path]).await
    }

    /// Remove a photo, logging instead of failing. Returns whether the
    /// removal went through.
    pub async fn remove_best_effort(&self, url: &str) -> bool {
        match self.remove_by_url(url).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove photo {}: {}", url, e);
                false
            }
        }
    }
}
