// src/services/photo_services.rs
use base64::{engine::general_purpose, Engine as _};
use mime::Mime;

use crate::dtos::photo_dtos::PhotoUpload;
use crate::errors::ServiceError;

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// What a form accepts as a complaint photo.
#[derive(Debug, Clone, Copy)]
pub struct PhotoPolicy {
    pub max_bytes: usize,
    /// `None` accepts any `image/*` type.
    pub allowed_types: Option<&'static [&'static str]>,
}

/// End-user complaint form: any image type.
pub const SUBMISSION_POLICY: PhotoPolicy = PhotoPolicy {
    max_bytes: MAX_PHOTO_BYTES,
    allowed_types: None,
};

/// Admin edit form: JPEG, PNG and GIF only.
pub const ADMIN_POLICY: PhotoPolicy = PhotoPolicy {
    max_bytes: MAX_PHOTO_BYTES,
    allowed_types: Some(&["image/jpeg", "image/jpg", "image/png", "image/gif"]),
};

#[derive(Debug, Clone)]
pub struct DecodedPhoto {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: String,
}

/// Validate the declared type, decode the payload and enforce the size cap.
/// Nothing here touches the network.
pub fn decode_photo(upload: &PhotoUpload, policy: &PhotoPolicy) -> Result<DecodedPhoto, ServiceError> {
    let declared = upload.content_type.trim().to_ascii_lowercase();
    let mime: Mime = declared
        .parse()
        .map_err(|_| ServiceError::validation("File must be an image"))?;
    if mime.type_() != mime::IMAGE {
        return Err(ServiceError::validation("File must be an image"));
    }
    if let Some(allowed) = policy.allowed_types {
        if !allowed.contains(&mime.essence_str()) {
            return Err(ServiceError::validation(
                "Unsupported file type. Use JPG, PNG, or GIF.",
            ));
        }
    }

    // strip a data URL prefix (data:image/jpeg;base64,)
    let data = match upload.image_data.split_once(',') {
        Some((_, rest)) => rest,
        None => upload.image_data.as_str(),
    };
    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|_| ServiceError::validation("Invalid base64 image data"))?;
    if bytes.is_empty() {
        return Err(ServiceError::validation("Image file is empty"));
    }
    if bytes.len() > policy.max_bytes {
        return Err(ServiceError::validation(format!(
            "File too large. Maximum is {} MB.",
            policy.max_bytes / (1024 * 1024)
        )));
    }

    Ok(DecodedPhoto {
        bytes,
        extension: extension_for(&upload.file_name, &mime),
        content_type: mime.essence_str().to_string(),
    })
}

/// Keep the original file extension; fall back to one derived from the type.
fn extension_for(file_name: &str, mime: &Mime) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| match mime.subtype().as_str() {
        "jpeg" | "jpg" => "jpg".to_string(),
        other => other
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, data: &str, name: &str) -> PhotoUpload {
        PhotoUpload {
            image_data: data.to_string(),
            file_name: name.to_string(),
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn accepts_data_url_and_keeps_extension() {
        let photo = decode_photo(
            &upload("image/PNG", "data:image/png;base64,iVBORw0KGgo=", "Jalan Rusak.PNG"),
            &SUBMISSION_POLICY,
        )
        .unwrap();
        assert_eq!(photo.extension, "png");
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(photo.bytes.len(), 8);
    }

    #[test]
    fn rejects_non_images() {
        let err = decode_photo(&upload("application/pdf", "AAAA", "a.pdf"), &SUBMISSION_POLICY)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn admin_policy_restricts_types() {
        let webp = upload("image/webp", "AAAA", "a.webp");
        assert!(decode_photo(&webp, &SUBMISSION_POLICY).is_ok());
        assert!(decode_photo(&webp, &ADMIN_POLICY).is_err());
    }

    #[test]
    fn enforces_size_cap() {
        let tight = PhotoPolicy { max_bytes: 2, allowed_types: None };
        assert!(decode_photo(&upload("image/gif", "AAAA", "x.gif"), &tight).is_err());
    }

    #[test]
    fn extension_falls_back_to_subtype() {
        let photo = decode_photo(&upload("image/jpeg", "AAAA", "kamera"), &SUBMISSION_POLICY).unwrap();
        assert_eq!(photo.extension, "jpg");
    }
}
