// src/dtos/photo_dtos.rs
use serde::Deserialize;

/// Photo attached to a complaint form. The front end sends the file as
/// base64, optionally as a full `data:` URL.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUpload {
    pub image_data: String,
    pub file_name: String,
    pub content_type: String, // "image/jpeg", "image/png", etc.
}
