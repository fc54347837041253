//! Asset store interface
//!
//! Abstracts the platform photo library: album and asset listing, thumbnail
//! and full data retrieval, saving captured videos and change notifications.
//! All requests complete through a callback that may run on any thread.

use crate::models::{
    Album, AlbumId, AlbumSubtype, Asset, AssetId, DeliveryQuality, FetchedData, MediaFilter,
};
use std::path::Path;

/// Errors reported by an asset store
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    NoData(String),
    Cancelled,
    IoError(std::io::Error),
    Platform(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::NoData(msg) => write!(f, "No data: {}", msg),
            StoreError::Cancelled => write!(f, "Request cancelled"),
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::Platform(msg) => write!(f, "Platform error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Callback invoked exactly once when a store request finishes
pub type Completion<T> = Box<dyn FnOnce(StoreResult<T>) + Send + 'static>;

/// Callback invoked on every library mutation
pub type ChangeObserver = Box<dyn Fn() + Send + Sync + 'static>;

/// Registration of a change observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Identifier of a cancelable store request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Platform photo library as seen by the picker
pub trait AssetStore: Send + Sync {
    /// Albums of the given subtypes, in subtype order
    fn list_albums(&self, subtypes: &[AlbumSubtype], done: Completion<Vec<Album>>);

    /// Assets of an album matching the filter, oldest first
    fn list_assets(&self, album: &AlbumId, filter: MediaFilter, done: Completion<Vec<Asset>>);

    /// Small preview of an asset, longest edge at most `size` pixels
    fn request_thumbnail(&self, asset: &AssetId, size: u32, done: Completion<Vec<u8>>)
        -> RequestId;

    fn request_image_data(
        &self,
        asset: &AssetId,
        quality: DeliveryQuality,
        done: Completion<FetchedData>,
    ) -> RequestId;

    fn request_video_data(
        &self,
        asset: &AssetId,
        quality: DeliveryQuality,
        done: Completion<FetchedData>,
    ) -> RequestId;

    /// Best-effort cancellation; the completion may still fire afterwards
    fn cancel_request(&self, request: RequestId);

    /// Writes a captured video into the library and returns its new identity
    fn save_captured_video(&self, location: &Path, done: Completion<AssetId>);

    fn observe_changes(&self, observer: ChangeObserver) -> ObserverId;

    /// Drops an observer; unknown ids are ignored
    fn remove_observer(&self, observer: ObserverId);
}
