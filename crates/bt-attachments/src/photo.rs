//! Profile photos
//!
//! One photo per user, stored under `profile_photos/<user_id>`. Uploads
//! arrive either as raw bytes with a declared MIME type or as a
//! `data:<mime>;base64,<payload>` URI. Both paths are checked against the
//! same rules: non-empty, at most `max_size` bytes, a MIME type from the
//! allow-list, and bytes that actually look like that image format.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bt_core::config::StorageConfig;
use bt_core::error::{TrackerError, ValidationErrors};
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::storage::{Storage, StorageError};

const KEY_PREFIX: &str = "profile_photos";

/// Photo errors
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Photo is empty")]
    Empty,
    #[error("Photo too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },
    #[error("Unsupported photo type: {0}")]
    UnsupportedType(String),
    #[error("Photo content does not match its type {declared}")]
    ContentMismatch { declared: String },
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("No profile photo for user {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type PhotoResult<T> = Result<T, PhotoError>;

impl From<PhotoError> for TrackerError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::NotFound(user_id) => TrackerError::not_found("profile photo", "user_id", user_id),
            PhotoError::Storage(StorageError::NotFound(key)) => {
                TrackerError::not_found("profile photo", "key", key)
            }
            PhotoError::Storage(e) => TrackerError::Internal(e.to_string()),
            other => {
                let mut errors = ValidationErrors::new();
                errors.add("photo", other.to_string());
                TrackerError::Validation(errors)
            }
        }
    }
}

/// Photo upload rules
#[derive(Debug, Clone)]
pub struct PhotoPolicy {
    pub max_size: usize,
    pub allowed_types: Vec<String>,
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self {
            max_size: bt_core::config::DEFAULT_MAX_PHOTO_SIZE,
            allowed_types: ["image/jpeg", "image/png", "image/gif", "image/webp"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl PhotoPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_size: config.max_photo_size,
            allowed_types: config.allowed_photo_types.clone(),
        }
    }

    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(content_type))
    }
}

/// An upload as received from the client
#[derive(Debug, Clone)]
pub enum PhotoUpload {
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
    Raw { data: Bytes, content_type: String },
}

impl PhotoUpload {
    /// Raw bytes with the MIME type taken from a `Content-Type` value or,
    /// failing that, guessed from a file name
    pub fn raw(data: Bytes, content_type: Option<&str>, filename: Option<&str>) -> Self {
        let content_type = content_type
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .map(|m| m.essence_str().to_string())
            .filter(|essence| essence != "application/octet-stream")
            .or_else(|| {
                filename.and_then(|name| mime_guess::from_path(name).first().map(|m| m.essence_str().to_string()))
            })
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        PhotoUpload::Raw { data, content_type }
    }

    fn decode(self) -> PhotoResult<(Bytes, String)> {
        match self {
            PhotoUpload::Raw { data, content_type } => Ok((data, content_type.to_ascii_lowercase())),
            PhotoUpload::DataUri(uri) => {
                let rest = uri
                    .trim()
                    .strip_prefix("data:")
                    .ok_or_else(|| PhotoError::InvalidDataUri("missing data: prefix".into()))?;
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| PhotoError::InvalidDataUri("missing payload".into()))?;
                let content_type = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| PhotoError::InvalidDataUri("payload must be base64".into()))?;
                let data = STANDARD
                    .decode(payload.trim())
                    .map_err(|e| PhotoError::InvalidDataUri(e.to_string()))?;
                Ok((Bytes::from(data), content_type.to_ascii_lowercase()))
            }
        }
    }
}

/// Image format detected from leading bytes
pub fn sniff_image_type(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Stored photo description
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePhoto {
    pub user_id: String,
    pub content_type: String,
    pub size: u64,
    pub digest: String,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Profile photo service
pub struct ProfilePhotoService {
    storage: Arc<dyn Storage>,
    policy: PhotoPolicy,
}

impl ProfilePhotoService {
    pub fn new(storage: Arc<dyn Storage>, policy: PhotoPolicy) -> Self {
        Self { storage, policy }
    }

    fn key(user_id: &str) -> String {
        format!("{}/{}", KEY_PREFIX, user_id)
    }

    /// Validate without storing
    pub fn check(&self, data: &[u8], content_type: &str) -> PhotoResult<()> {
        if data.is_empty() {
            return Err(PhotoError::Empty);
        }
        if data.len() > self.policy.max_size {
            return Err(PhotoError::TooLarge {
                size: data.len(),
                max: self.policy.max_size,
            });
        }
        if !self.policy.is_allowed(content_type) {
            return Err(PhotoError::UnsupportedType(content_type.to_string()));
        }
        match sniff_image_type(data) {
            Some(detected) if detected == content_type => Ok(()),
            _ => Err(PhotoError::ContentMismatch {
                declared: content_type.to_string(),
            }),
        }
    }

    /// Replace the user's photo
    #[instrument(skip(self, upload), fields(storage = self.storage.name()))]
    pub async fn upload(&self, user_id: &str, upload: PhotoUpload) -> PhotoResult<ProfilePhoto> {
        let (data, content_type) = upload.decode()?;
        self.check(&data, &content_type)?;

        let metadata = self.storage.put(&Self::key(user_id), data, &content_type).await?;
        info!(user_id, size = metadata.size, content_type = %content_type, "Profile photo stored");

        Ok(ProfilePhoto {
            user_id: user_id.to_string(),
            content_type: metadata.content_type,
            size: metadata.size,
            digest: metadata.digest,
            updated_at: metadata.last_modified,
        })
    }

    pub async fn get(&self, user_id: &str) -> PhotoResult<(ProfilePhoto, Bytes)> {
        let (data, metadata) = match self.storage.get(&Self::key(user_id)).await {
            Ok(found) => found,
            Err(StorageError::NotFound(_)) => return Err(PhotoError::NotFound(user_id.to_string())),
            Err(e) => return Err(e.into()),
        };
        let photo = ProfilePhoto {
            user_id: user_id.to_string(),
            content_type: metadata.content_type,
            size: metadata.size,
            digest: metadata.digest,
            updated_at: metadata.last_modified,
        };
        Ok((photo, data))
    }

    /// The photo as a `data:` URI, the form the client displays
    pub async fn data_uri(&self, user_id: &str) -> PhotoResult<String> {
        let (photo, data) = self.get(user_id).await?;
        Ok(format!("data:{};base64,{}", photo.content_type, STANDARD.encode(&data)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str) -> PhotoResult<()> {
        let key = Self::key(user_id);
        if !self.storage.exists(&key).await? {
            return Err(PhotoError::NotFound(user_id.to_string()));
        }
        self.storage.delete(&key).await?;
        info!(user_id, "Profile photo removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    fn service() -> ProfilePhotoService {
        ProfilePhotoService::new(Arc::new(MemoryStorage::new()), PhotoPolicy::default())
    }

    #[tokio::test]
    async fn test_data_uri_upload_and_read_back() {
        let service = service();
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(PNG));

        let photo = service.upload("worker-1", PhotoUpload::DataUri(uri.clone())).await.unwrap();
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(photo.size, PNG.len() as u64);

        assert_eq!(service.data_uri("worker-1").await.unwrap(), uri);
    }

    #[tokio::test]
    async fn test_size_cap() {
        let service = ProfilePhotoService::new(
            Arc::new(MemoryStorage::new()),
            PhotoPolicy {
                max_size: 8,
                ..Default::default()
            },
        );
        let upload = PhotoUpload::raw(Bytes::from_static(PNG), Some("image/png"), None);
        let err = service.upload("worker-1", upload).await.unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { max: 8, .. }));
    }

    #[test]
    fn test_five_megabyte_boundary() {
        let service = service();
        let mut data = PNG.to_vec();
        data.resize(5 * 1024 * 1024, 0);
        assert!(service.check(&data, "image/png").is_ok());

        data.push(0);
        assert!(matches!(service.check(&data, "image/png"), Err(PhotoError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn test_non_image_types_rejected() {
        let service = service();
        let upload = PhotoUpload::raw(Bytes::from_static(b"%PDF-1.7"), Some("application/pdf"), None);
        let err = service.upload("worker-1", upload).await.unwrap_err();
        assert!(matches!(err, PhotoError::UnsupportedType(ref t) if t == "application/pdf"));

        let err: TrackerError = err.into();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_disguised_content_rejected() {
        let service = service();
        let upload = PhotoUpload::raw(Bytes::from_static(b"<svg onload=alert(1)>"), Some("image/png"), None);
        let err = service.upload("worker-1", upload).await.unwrap_err();
        assert!(matches!(err, PhotoError::ContentMismatch { .. }));
    }

    #[test]
    fn test_raw_type_falls_back_to_filename() {
        let upload = PhotoUpload::raw(Bytes::from_static(PNG), None, Some("me.png"));
        assert!(matches!(upload, PhotoUpload::Raw { ref content_type, .. } if content_type == "image/png"));

        let upload = PhotoUpload::raw(Bytes::from_static(PNG), Some("image/png; charset=binary"), None);
        assert!(matches!(upload, PhotoUpload::Raw { ref content_type, .. } if content_type == "image/png"));
    }

    #[tokio::test]
    async fn test_delete_and_missing_photo() {
        let service = service();
        let upload = PhotoUpload::raw(Bytes::from_static(PNG), Some("image/png"), None);
        service.upload("supplier-1", upload).await.unwrap();

        service.delete("supplier-1").await.unwrap();
        assert!(matches!(service.get("supplier-1").await, Err(PhotoError::NotFound(_))));
        assert!(matches!(service.delete("supplier-1").await, Err(PhotoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_data_uri() {
        let service = service();
        let err = service
            .upload("worker-1", PhotoUpload::DataUri("image/png;base64,AAAA".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::InvalidDataUri(_)));
    }
}
