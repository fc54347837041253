//! Gallery screen controller
//!
//! Loads albums and assets, drives the selection model from grid taps,
//! keeps thumbnails for the visible window and runs the commit protocol:
//! one concurrent full-data fetch per selected asset, size checks as each
//! fetch completes, and a single resolution per commit attempt.

use crate::config::{PickerConfig, SourceKind};
use crate::control::{ControlHandle, Message, UserInput};
use crate::selection::{GridItem, SelectionModel};
use crate::size_policy::SizeViolation;
use crate::surface::{AlbumEntry, GridCell, PresentationSurface, ViewUpdate};
use media_library::{
    Album, Asset, AssetId, AssetStore, FetchedData, MediaKind, ObserverId, PermissionStatus,
    RequestId, StoreResult,
};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryPhase {
    Loading,
    Ready,
    Committing,
}

/// What the gallery asks its owner to do
#[derive(Debug)]
pub(crate) enum GalleryResolution {
    Selected(Vec<Asset>),
    SizeExceeded(SizeViolation),
    Cancelled,
    OpenCamera,
}

/// State of one commit attempt
struct CommitAttempt {
    attempt: u64,
    expected: usize,
    accounted: usize,
    succeeded: Vec<Asset>,
    /// Set once a per-item limit is breached; later completions are discarded
    exceeded: bool,
    in_flight: HashMap<AssetId, RequestId>,
}

pub(crate) struct GalleryController {
    config: PickerConfig,
    store: Arc<dyn AssetStore>,
    handle: ControlHandle,
    selection: SelectionModel,
    phase: GalleryPhase,
    library_status: PermissionStatus,
    albums: Vec<Album>,
    current_album: Option<usize>,
    generation: u64,
    visible: Range<usize>,
    thumbnails: HashMap<usize, (AssetId, RequestId)>,
    commit: Option<CommitAttempt>,
    next_attempt: u64,
    observer: Option<ObserverId>,
}

impl GalleryController {
    pub(crate) fn new(
        config: PickerConfig,
        store: Arc<dyn AssetStore>,
        handle: ControlHandle,
        camera_granted: bool,
        library_status: PermissionStatus,
    ) -> Self {
        let mut selection = SelectionModel::new(config.single_select, config.max_selectable_count);
        selection.set_camera_item(config.source == SourceKind::Both && camera_granted);
        selection.set_default_selection(&config.default_selection);

        Self {
            config,
            store,
            handle,
            selection,
            phase: GalleryPhase::Loading,
            library_status,
            albums: Vec::new(),
            current_album: None,
            generation: 0,
            visible: 0..0,
            thumbnails: HashMap::new(),
            commit: None,
            next_attempt: 0,
            observer: None,
        }
    }

    pub(crate) fn phase(&self) -> GalleryPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: GalleryPhase) {
        if self.phase != phase {
            log::debug!("Gallery {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    #[cfg(test)]
    pub(crate) fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Shows the screen, subscribes to library changes and starts loading albums
    pub(crate) fn mount(&mut self, surface: &mut dyn PresentationSurface) {
        log::debug!("Mounting gallery ({:?} library access)", self.library_status);
        surface.render(ViewUpdate::GalleryMounted {
            cancel_label: self.config.localization.cancel.clone(),
            done_label: self.config.localization.done.clone(),
            appearance: self.config.appearance.clone(),
        });
        surface.render(ViewUpdate::CommitEnabled(false));
        if self.library_status == PermissionStatus::Limited {
            surface.render(ViewUpdate::LimitedAccessBanner(
                self.config.localization.limited_access.clone(),
            ));
        }

        let handle = self.handle.clone();
        self.observer = Some(
            self.store
                .observe_changes(Box::new(move || handle.post(Message::LibraryChanged))),
        );

        let handle = self.handle.clone();
        self.store.list_albums(
            &self.config.album_subtypes,
            Box::new(move |result| handle.post(Message::AlbumsLoaded(result))),
        );
    }

    fn title(&self) -> (String, bool) {
        let name = self
            .current_album
            .and_then(|i| self.albums.get(i))
            .map(|a| a.title.clone())
            .unwrap_or_default();
        if self.albums.is_empty() {
            (name, false)
        } else {
            (format!("{}  \u{25be}", name), true)
        }
    }

    fn render_title(&self, surface: &mut dyn PresentationSurface) {
        let (title, chooser_enabled) = self.title();
        surface.render(ViewUpdate::TitleChanged {
            title,
            chooser_enabled,
        });
    }

    fn render_commit_enabled(&self, surface: &mut dyn PresentationSurface) {
        surface.render(ViewUpdate::CommitEnabled(self.selection.selected_count() > 0));
    }

    pub(crate) fn on_albums_loaded(
        &mut self,
        result: StoreResult<Vec<Album>>,
        surface: &mut dyn PresentationSurface,
    ) {
        match result {
            Ok(albums) => {
                log::debug!("Loaded {} albums", albums.len());
                self.albums = albums;
            }
            Err(e) => {
                log::error!("Failed to list albums: {}", e);
                self.albums.clear();
            }
        }
        self.current_album = if self.albums.is_empty() { None } else { Some(0) };
        self.render_title(surface);

        if self.current_album.is_some() {
            self.load_assets();
        } else {
            self.selection.set_items(Vec::new());
            self.show_items(surface);
            self.set_phase(GalleryPhase::Ready);
            self.render_commit_enabled(surface);
        }
    }

    fn load_assets(&mut self) {
        let Some(album) = self
            .current_album
            .and_then(|i| self.albums.get(i))
            .cloned()
        else {
            return;
        };
        self.generation += 1;
        if self.phase != GalleryPhase::Committing {
            self.set_phase(GalleryPhase::Loading);
        }

        log::debug!(
            "Loading assets of '{}' ({:?}, generation {})",
            album.title,
            self.config.media_filter,
            self.generation
        );
        let generation = self.generation;
        let handle = self.handle.clone();
        self.store.list_assets(
            &album.id,
            self.config.media_filter,
            Box::new(move |result| handle.post(Message::AssetsLoaded { generation, result })),
        );
    }

    pub(crate) fn on_assets_loaded(
        &mut self,
        generation: u64,
        result: StoreResult<Vec<Asset>>,
        surface: &mut dyn PresentationSurface,
    ) {
        if generation != self.generation {
            log::debug!("Discarding stale asset listing {}", generation);
            return;
        }
        match result {
            Ok(assets) => {
                log::debug!("Loaded {} assets", assets.len());
                self.selection.set_items(assets);
            }
            Err(e) => {
                log::error!("Failed to list assets: {}", e);
                self.selection.set_items(Vec::new());
            }
        }
        self.show_items(surface);
        if self.phase == GalleryPhase::Loading {
            self.set_phase(GalleryPhase::Ready);
            self.render_commit_enabled(surface);
        }
    }

    fn cell(&self, index: usize) -> Option<GridCell> {
        match self.selection.item(index)? {
            GridItem::Camera => Some(GridCell::Camera),
            GridItem::Asset(asset) => Some(GridCell::for_asset(
                asset,
                self.selection.is_selected(index),
            )),
        }
    }

    fn show_items(&mut self, surface: &mut dyn PresentationSurface) {
        for (_, (_, request)) in self.thumbnails.drain() {
            self.store.cancel_request(request);
        }
        let cells = (0..self.selection.len()).filter_map(|i| self.cell(i)).collect();
        surface.render(ViewUpdate::ItemsReloaded(cells));
        self.request_thumbnails();
    }

    /// Requests missing thumbnails of the visible window and cancels the ones that left it
    fn request_thumbnails(&mut self) {
        let visible = self.visible.clone();
        let store = self.store.clone();
        self.thumbnails.retain(|index, (_, request)| {
            let keep = visible.contains(index);
            if !keep {
                store.cancel_request(*request);
            }
            keep
        });

        let end = visible.end.min(self.selection.len());
        for index in visible.start..end {
            if self.thumbnails.contains_key(&index) {
                continue;
            }
            let Some(GridItem::Asset(asset)) = self.selection.item(index) else {
                continue;
            };
            let Some(id) = asset.id().cloned() else {
                continue;
            };
            let generation = self.generation;
            let handle = self.handle.clone();
            let asset_id = id.clone();
            let request = self.store.request_thumbnail(
                &id,
                self.config.appearance.thumbnail_size,
                Box::new(move |result| {
                    handle.post(Message::ThumbnailLoaded {
                        generation,
                        index,
                        asset: asset_id,
                        result,
                    })
                }),
            );
            self.thumbnails.insert(index, (id, request));
        }
    }

    pub(crate) fn on_thumbnail_loaded(
        &mut self,
        generation: u64,
        index: usize,
        asset: AssetId,
        result: StoreResult<Vec<u8>>,
        surface: &mut dyn PresentationSurface,
    ) {
        if generation != self.generation {
            return;
        }
        let still_shown = matches!(
            self.selection.item(index),
            Some(GridItem::Asset(current)) if current.id() == Some(&asset)
        );
        if !still_shown {
            log::debug!("Dropping thumbnail of {} for reused cell {}", asset, index);
            return;
        }
        match result {
            Ok(bytes) => surface.render(ViewUpdate::Thumbnail { index, bytes }),
            Err(e) => log::debug!("No thumbnail for {}: {}", asset, e),
        }
    }

    pub(crate) fn on_library_changed(&mut self) {
        log::debug!("Library changed, reloading current album");
        self.load_assets();
    }

    pub(crate) fn handle_input(
        &mut self,
        input: UserInput,
        surface: &mut dyn PresentationSurface,
    ) -> Option<GalleryResolution> {
        match input {
            UserInput::TapItem(index) => self.tap(index, surface),
            UserInput::VisibleRange(range) => {
                self.visible = range;
                self.request_thumbnails();
                None
            }
            UserInput::OpenAlbumChooser => {
                if !self.albums.is_empty() {
                    let entries = self
                        .albums
                        .iter()
                        .enumerate()
                        .map(|(i, album)| AlbumEntry {
                            title: album.title.clone(),
                            asset_count: album.asset_count,
                            current: Some(i) == self.current_album,
                        })
                        .collect();
                    surface.render(ViewUpdate::AlbumChooser(entries));
                }
                None
            }
            UserInput::ChooseAlbum(index) => {
                if index < self.albums.len() && Some(index) != self.current_album {
                    self.current_album = Some(index);
                    self.render_title(surface);
                    self.load_assets();
                }
                None
            }
            UserInput::Commit => self.commit(surface),
            UserInput::Cancel => {
                self.cancel_commit();
                Some(GalleryResolution::Cancelled)
            }
            UserInput::DismissAlert { .. } | UserInput::ManageLimitedAccess(_) => None,
        }
    }

    fn tap(
        &mut self,
        index: usize,
        surface: &mut dyn PresentationSurface,
    ) -> Option<GalleryResolution> {
        match self.selection.item(index) {
            Some(GridItem::Camera) => return Some(GalleryResolution::OpenCamera),
            Some(GridItem::Asset(_)) => {}
            None => return None,
        }

        let previous = if self.selection.is_single_select() {
            self.selection.selected_indices()
        } else {
            Vec::new()
        };
        let changed = if self.selection.is_single_select() || !self.selection.is_selected(index) {
            self.selection.select(index)
        } else {
            self.selection.deselect(index)
        };
        if !changed {
            return None;
        }

        let mut refreshed: Vec<usize> = previous.into_iter().filter(|i| *i != index).collect();
        refreshed.push(index);
        let cells = refreshed
            .into_iter()
            .filter_map(|i| self.cell(i).map(|cell| (i, cell)))
            .collect();
        surface.render(ViewUpdate::ItemsRefreshed(cells));
        if self.phase != GalleryPhase::Committing {
            self.render_commit_enabled(surface);
        }
        None
    }

    fn commit(&mut self, surface: &mut dyn PresentationSurface) -> Option<GalleryResolution> {
        if self.phase == GalleryPhase::Committing {
            log::warn!("Commit already in progress");
            return None;
        }
        let selected = self.selection.selected_assets();
        if selected.is_empty() {
            return None;
        }

        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.set_phase(GalleryPhase::Committing);
        surface.render(ViewUpdate::CommitInProgress);
        log::debug!("Commit {} fetching {} assets", attempt, selected.len());

        let mut commit = CommitAttempt {
            attempt,
            expected: selected.len(),
            accounted: 0,
            succeeded: Vec::new(),
            exceeded: false,
            in_flight: HashMap::new(),
        };

        for asset in selected {
            let Some(id) = asset.id().cloned() else {
                // Selection only holds assets with a store identity
                commit.accounted += 1;
                continue;
            };
            let handle = self.handle.clone();
            let target = asset.clone();
            let done = Box::new(move |result: StoreResult<FetchedData>| {
                handle.post(Message::AssetFetched {
                    attempt,
                    asset: target,
                    result,
                })
            });
            let request = match asset.kind {
                MediaKind::Image => {
                    self.store
                        .request_image_data(&id, self.config.image_quality, done)
                }
                MediaKind::Video => {
                    self.store
                        .request_video_data(&id, self.config.video_quality, done)
                }
            };
            commit.in_flight.insert(id, request);
        }

        self.commit = Some(commit);
        None
    }

    pub(crate) fn on_asset_fetched(
        &mut self,
        attempt: u64,
        asset: Asset,
        result: StoreResult<FetchedData>,
        surface: &mut dyn PresentationSurface,
    ) -> Option<GalleryResolution> {
        let Some(commit) = self.commit.as_mut().filter(|c| c.attempt == attempt) else {
            log::debug!("Discarding fetch result of finished commit {}", attempt);
            return None;
        };
        if commit.exceeded {
            log::debug!("Discarding fetch result after size limit breach");
            return None;
        }
        if let Some(id) = asset.id() {
            commit.in_flight.remove(id);
        }
        commit.accounted += 1;

        match result {
            Ok(data) if !data.bytes.is_empty() => {
                let fetched = asset.with_data(data);
                if let Err(violation) = self
                    .config
                    .size_limits
                    .check_item(fetched.kind, fetched.byte_len())
                {
                    log::info!("Asset exceeds size limit: {:?}", violation);
                    commit.exceeded = true;
                    for (_, request) in commit.in_flight.drain() {
                        self.store.cancel_request(request);
                    }
                    self.set_phase(GalleryPhase::Ready);
                    self.render_commit_enabled(surface);
                    return Some(GalleryResolution::SizeExceeded(violation));
                }
                commit.succeeded.push(fetched);
            }
            Ok(_) => log::warn!("Dropping asset without data from commit"),
            Err(e) => log::warn!("Dropping asset from commit, fetch failed: {}", e),
        }

        if commit.accounted < commit.expected {
            return None;
        }

        let Some(commit) = self.commit.take() else {
            return None;
        };
        self.set_phase(GalleryPhase::Ready);

        if commit.succeeded.is_empty() {
            log::warn!("No selected asset could be fetched, commit {} abandoned", attempt);
            self.render_commit_enabled(surface);
            return None;
        }

        match self.config.size_limits.check_total(
            self.config.media_filter,
            &commit.succeeded,
            commit.expected,
        ) {
            Err(violation) => {
                log::info!("Selection exceeds total size limit: {:?}", violation);
                self.render_commit_enabled(surface);
                Some(GalleryResolution::SizeExceeded(violation))
            }
            Ok(()) => {
                log::debug!(
                    "Commit {} resolved with {} assets",
                    attempt,
                    commit.succeeded.len()
                );
                Some(GalleryResolution::Selected(commit.succeeded))
            }
        }
    }

    /// Releases the store resources held by the screen
    pub(crate) fn unmount(&mut self) {
        self.cancel_commit();
        if let Some(observer) = self.observer.take() {
            log::debug!("Unmounting gallery, removing change observer");
            self.store.remove_observer(observer);
        }
    }

    /// Cancels the fetches of a running commit
    pub(crate) fn cancel_commit(&mut self) {
        if let Some(mut commit) = self.commit.take() {
            for (_, request) in commit.in_flight.drain() {
                self.store.cancel_request(request);
            }
        }
        for (_, (_, request)) in self.thumbnails.drain() {
            self.store.cancel_request(request);
        }
    }
}
