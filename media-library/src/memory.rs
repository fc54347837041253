//! In-memory asset store
//!
//! Keeps albums and asset bytes in memory. Used by hosts without a platform
//! photo library, by the demo binary and by tests. In deferred mode data and
//! thumbnail requests stay pending until completed explicitly, which allows
//! driving completion order by hand.

use crate::models::{
    Album, AlbumId, AlbumSubtype, Asset, AssetId, DeliveryQuality, FetchedData, MediaFilter,
    MediaKind, Metadata,
};
use crate::store::{
    AssetStore, ChangeObserver, Completion, ObserverId, RequestId, StoreError, StoreResult,
};
use crate::thumbnail::create_thumbnail;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

struct StoredAlbum {
    id: AlbumId,
    title: String,
    subtype: AlbumSubtype,
}

struct StoredAsset {
    listing: Asset,
    bytes: Vec<u8>,
    extension: Option<String>,
    albums: Vec<AlbumId>,
}

enum Pending {
    Thumbnail {
        asset: AssetId,
        size: u32,
        done: Completion<Vec<u8>>,
    },
    Data {
        asset: AssetId,
        done: Completion<FetchedData>,
    },
}

#[derive(Default)]
struct Inner {
    albums: Vec<StoredAlbum>,
    assets: Vec<StoredAsset>,
    failing: HashSet<AssetId>,
    deferred: bool,
    ignore_cancellation: bool,
    next_request: u64,
    pending: BTreeMap<RequestId, Pending>,
    cancelled: Vec<RequestId>,
    data_requests: Vec<(AssetId, DeliveryQuality)>,
    video_save_error: Option<String>,
}

impl Inner {
    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn find(&self, id: &AssetId) -> Option<&StoredAsset> {
        self.assets.iter().find(|a| a.listing.id() == Some(id))
    }

    fn data_for(&self, id: &AssetId) -> StoreResult<FetchedData> {
        if self.failing.contains(id) {
            return Err(StoreError::NoData(format!("asset {} unavailable", id)));
        }
        let stored = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(format!("asset {}", id)))?;
        let mut metadata = Metadata::new();
        metadata.insert("byte_count".to_string(), stored.bytes.len().into());
        Ok(FetchedData {
            bytes: stored.bytes.clone(),
            extension: stored.extension.clone(),
            metadata,
        })
    }

    fn thumbnail_for(&self, id: &AssetId, size: u32) -> StoreResult<Vec<u8>> {
        let stored = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(format!("asset {}", id)))?;
        if stored.listing.kind == MediaKind::Video {
            return Err(StoreError::NoData("no preview frame for video".to_string()));
        }
        create_thumbnail(&stored.bytes, size).map_err(|e| StoreError::Platform(e.to_string()))
    }
}

/// Asset store backed by memory
#[derive(Clone, Default)]
pub struct MemoryAssetStore {
    inner: Arc<Mutex<Inner>>,
    observers: Arc<Mutex<Observers>>,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    registered: Vec<(ObserverId, ChangeObserver)>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observers(&self) -> MutexGuard<'_, Observers> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_changed(&self) {
        let observers = self.observers();
        log::debug!(
            "Library changed, notifying {} observers",
            observers.registered.len()
        );
        for (_, observer) in observers.registered.iter() {
            observer();
        }
    }

    /// Number of registered change observers
    pub fn observer_count(&self) -> usize {
        self.observers().registered.len()
    }

    /// Keeps data and thumbnail requests pending until completed by hand
    pub fn set_deferred(&self, deferred: bool) {
        self.lock().deferred = deferred;
    }

    /// Simulates requests that already passed their cancellation point
    pub fn set_ignore_cancellation(&self, ignore: bool) {
        self.lock().ignore_cancellation = ignore;
    }

    /// Makes data requests for an asset fail
    pub fn set_failing(&self, asset: &AssetId, failing: bool) {
        let mut inner = self.lock();
        if failing {
            inner.failing.insert(asset.clone());
        } else {
            inner.failing.remove(asset);
        }
    }

    /// Makes saving captured videos fail with the given message
    pub fn set_video_save_error(&self, error: Option<String>) {
        self.lock().video_save_error = error;
    }

    pub fn add_album(&self, title: &str, subtype: AlbumSubtype) -> AlbumId {
        let id = AlbumId::new(Uuid::new_v4().to_string());
        self.lock().albums.push(StoredAlbum {
            id: id.clone(),
            title: title.to_string(),
            subtype,
        });
        self.notify_changed();
        id
    }

    pub fn add_image(&self, album: &AlbumId, bytes: Vec<u8>, extension: &str) -> AssetId {
        let id = AssetId::new(Uuid::new_v4().to_string());
        let listing = Asset::from_store(id.clone(), MediaKind::Image).with_created_at(Utc::now());
        self.insert(listing, bytes, extension, album);
        id
    }

    pub fn add_video(
        &self,
        album: &AlbumId,
        bytes: Vec<u8>,
        extension: &str,
        duration: Duration,
    ) -> AssetId {
        let id = AssetId::new(Uuid::new_v4().to_string());
        let listing = Asset::from_store(id.clone(), MediaKind::Video)
            .with_created_at(Utc::now())
            .with_duration(duration);
        self.insert(listing, bytes, extension, album);
        id
    }

    fn insert(&self, mut listing: Asset, bytes: Vec<u8>, extension: &str, album: &AlbumId) {
        listing.extension = Some(extension.to_string());
        self.lock().assets.push(StoredAsset {
            listing,
            bytes,
            extension: Some(extension.to_string()),
            albums: vec![album.clone()],
        });
        self.notify_changed();
    }

    /// Adds an existing asset to another album
    pub fn add_to_album(&self, asset: &AssetId, album: &AlbumId) -> StoreResult<()> {
        {
            let mut inner = self.lock();
            let stored = inner
                .assets
                .iter_mut()
                .find(|a| a.listing.id() == Some(asset))
                .ok_or_else(|| StoreError::NotFound(format!("asset {}", asset)))?;
            if !stored.albums.contains(album) {
                stored.albums.push(album.clone());
            }
        }
        self.notify_changed();
        Ok(())
    }

    pub fn remove_asset(&self, asset: &AssetId) -> StoreResult<()> {
        {
            let mut inner = self.lock();
            let before = inner.assets.len();
            inner.assets.retain(|a| a.listing.id() != Some(asset));
            if inner.assets.len() == before {
                return Err(StoreError::NotFound(format!("asset {}", asset)));
            }
        }
        self.notify_changed();
        Ok(())
    }

    /// Listing form of a stored asset
    pub fn asset(&self, id: &AssetId) -> Option<Asset> {
        self.lock().find(id).map(|a| a.listing.clone())
    }

    /// Requests still waiting for completion, oldest first
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.lock().pending.keys().copied().collect()
    }

    pub fn cancelled_requests(&self) -> Vec<RequestId> {
        self.lock().cancelled.clone()
    }

    /// Every data request made so far with its quality hint
    pub fn data_requests(&self) -> Vec<(AssetId, DeliveryQuality)> {
        self.lock().data_requests.clone()
    }

    /// Completes a pending request with the stored result
    pub fn complete(&self, request: RequestId) -> bool {
        let mut inner = self.lock();
        let Some(pending) = inner.pending.remove(&request) else {
            return false;
        };
        match pending {
            Pending::Thumbnail { asset, size, done } => {
                let result = inner.thumbnail_for(&asset, size);
                drop(inner);
                done(result);
            }
            Pending::Data { asset, done } => {
                let result = inner.data_for(&asset);
                drop(inner);
                done(result);
            }
        }
        true
    }

    /// Fails a pending request
    pub fn fail(&self, request: RequestId, error: StoreError) -> bool {
        let pending = self.lock().pending.remove(&request);
        match pending {
            Some(Pending::Thumbnail { done, .. }) => done(Err(error)),
            Some(Pending::Data { done, .. }) => done(Err(error)),
            None => return false,
        }
        true
    }

    /// Completes every pending request in request order
    pub fn complete_all(&self) -> usize {
        let mut count = 0;
        for request in self.pending_requests() {
            if self.complete(request) {
                count += 1;
            }
        }
        count
    }

    fn request_data(
        &self,
        asset: &AssetId,
        quality: DeliveryQuality,
        done: Completion<FetchedData>,
    ) -> RequestId {
        let mut inner = self.lock();
        let request = inner.next_request_id();
        inner.data_requests.push((asset.clone(), quality));
        if inner.deferred {
            inner.pending.insert(
                request,
                Pending::Data {
                    asset: asset.clone(),
                    done,
                },
            );
        } else {
            let result = inner.data_for(asset);
            drop(inner);
            done(result);
        }
        request
    }
}

impl AssetStore for MemoryAssetStore {
    fn list_albums(&self, subtypes: &[AlbumSubtype], done: Completion<Vec<Album>>) {
        let inner = self.lock();
        let mut albums = Vec::new();
        for subtype in subtypes {
            for album in inner.albums.iter().filter(|a| a.subtype == *subtype) {
                let asset_count = inner
                    .assets
                    .iter()
                    .filter(|a| a.albums.contains(&album.id))
                    .count();
                albums.push(Album {
                    id: album.id.clone(),
                    title: album.title.clone(),
                    subtype: album.subtype,
                    asset_count,
                });
            }
        }
        drop(inner);
        done(Ok(albums));
    }

    fn list_assets(&self, album: &AlbumId, filter: MediaFilter, done: Completion<Vec<Asset>>) {
        let inner = self.lock();
        if !inner.albums.iter().any(|a| &a.id == album) {
            drop(inner);
            done(Err(StoreError::NotFound(format!("album {}", album))));
            return;
        }
        let assets = inner
            .assets
            .iter()
            .filter(|a| a.albums.contains(album) && filter.accepts(a.listing.kind))
            .map(|a| a.listing.clone())
            .collect();
        drop(inner);
        done(Ok(assets));
    }

    fn request_thumbnail(
        &self,
        asset: &AssetId,
        size: u32,
        done: Completion<Vec<u8>>,
    ) -> RequestId {
        let mut inner = self.lock();
        let request = inner.next_request_id();
        if inner.deferred {
            inner.pending.insert(
                request,
                Pending::Thumbnail {
                    asset: asset.clone(),
                    size,
                    done,
                },
            );
        } else {
            let result = inner.thumbnail_for(asset, size);
            drop(inner);
            done(result);
        }
        request
    }

    fn request_image_data(
        &self,
        asset: &AssetId,
        quality: DeliveryQuality,
        done: Completion<FetchedData>,
    ) -> RequestId {
        self.request_data(asset, quality, done)
    }

    fn request_video_data(
        &self,
        asset: &AssetId,
        quality: DeliveryQuality,
        done: Completion<FetchedData>,
    ) -> RequestId {
        self.request_data(asset, quality, done)
    }

    fn cancel_request(&self, request: RequestId) {
        let mut inner = self.lock();
        inner.cancelled.push(request);
        if !inner.ignore_cancellation {
            inner.pending.remove(&request);
        }
    }

    fn save_captured_video(&self, location: &Path, done: Completion<AssetId>) {
        let save_error = self.lock().video_save_error.clone();
        if let Some(error) = save_error {
            done(Err(StoreError::Platform(error)));
            return;
        }

        let bytes = match std::fs::read(location) {
            Ok(bytes) => bytes,
            Err(e) => {
                done(Err(StoreError::IoError(e)));
                return;
            }
        };

        let recents = self
            .lock()
            .albums
            .iter()
            .find(|a| a.subtype == AlbumSubtype::Recents)
            .map(|a| a.id.clone());
        let album = match recents {
            Some(album) => album,
            None => self.add_album("Recents", AlbumSubtype::Recents),
        };

        let extension = location
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mov")
            .to_string();
        let id = self.add_video(&album, bytes, &extension, Duration::ZERO);
        log::debug!("Saved captured video {:?} as {}", location, id);
        done(Ok(id));
    }

    fn observe_changes(&self, observer: ChangeObserver) -> ObserverId {
        let mut observers = self.observers();
        observers.next_id += 1;
        let id = ObserverId(observers.next_id);
        observers.registered.push((id, observer));
        id
    }

    fn remove_observer(&self, observer: ObserverId) {
        self.observers().registered.retain(|(id, _)| *id != observer);
    }
}
