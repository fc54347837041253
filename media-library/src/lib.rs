//! # Media Library
//!
//! Data model and collaborator interfaces of the media picker.
//!
//! This crate provides:
//! - Assets, albums, media kinds and delivery-quality hints
//! - The `AssetStore` interface over the platform photo library
//! - The `PermissionGate` interface over camera and library permissions
//! - The `CaptureService` interface over the platform camera UI
//!
//! ## Platform Separation
//!
//! Platform-specific implementations of the interfaces belong to the host
//! application. With the `memory` feature this crate also ships in-memory
//! implementations and WebP thumbnail generation.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use media_library::{AlbumSubtype, MemoryAssetStore};
//!
//! let store = MemoryAssetStore::new();
//! let recents = store.add_album("Recents", AlbumSubtype::Recents);
//! store.add_image(&recents, jpeg_bytes, "jpg");
//! ```

pub mod capture;
pub mod models;
pub mod permission;
pub mod store;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub mod scripted;

#[cfg(feature = "memory")]
pub mod thumbnail;

pub use capture::{CaptureCallback, CaptureOutcome, CaptureService};
pub use models::{
    format_duration, Album, AlbumId, AlbumSubtype, Asset, AssetId, DeliveryQuality, FetchedData,
    MediaFilter, MediaKind, Metadata,
};
pub use permission::{PermissionCallback, PermissionGate, PermissionKind, PermissionStatus};
pub use store::{
    AssetStore, ChangeObserver, Completion, ObserverId, RequestId, StoreError, StoreResult,
};

#[cfg(feature = "memory")]
pub use memory::MemoryAssetStore;

#[cfg(feature = "memory")]
pub use scripted::{FixedPermissionGate, ScriptedCaptureService};

#[cfg(feature = "memory")]
pub use thumbnail::{create_thumbnail, ThumbnailError};
