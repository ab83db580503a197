//! # bt-attachments
//!
//! Profile photo handling for BuildTrack.
//!
//! ## Features
//!
//! - Storage abstraction (local filesystem, memory)
//! - Profile photo upload from raw bytes or `data:` URIs
//! - Server-side size cap and image MIME allow-list
//!
//! ## Example
//!
//! ```rust,ignore
//! use bt_attachments::{MemoryStorage, PhotoPolicy, PhotoUpload, ProfilePhotoService};
//! use std::sync::Arc;
//!
//! let service = ProfilePhotoService::new(Arc::new(MemoryStorage::new()), PhotoPolicy::default());
//! let photo = service.upload("worker-1", PhotoUpload::DataUri(uri)).await?;
//! ```

pub mod photo;
pub mod storage;

pub use photo::{
    sniff_image_type, PhotoError, PhotoPolicy, PhotoResult, PhotoUpload, ProfilePhoto,
    ProfilePhotoService,
};
pub use storage::{FileMetadata, LocalStorage, MemoryStorage, Storage, StorageError, StorageResult};
