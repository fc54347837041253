//! Top-level picker flow
//!
//! `MediaPicker::launch` wires the collaborators to a control loop and hands
//! back a `PickerSession` for the host views and a `PickerDriver` that runs
//! the loop. The `PickerController` inside the loop checks permissions,
//! opens the camera or the gallery and reports exactly one terminal
//! `PickerEvent` per invocation.

use crate::camera::{present_capture, save_captured_video};
use crate::config::{PickerConfig, SourceKind};
use crate::control::{
    request_permission, CaptureOrigin, ControlHandle, LimitedAccessAction, Message,
    PermissionStep, UserInput,
};
use crate::events::PickerEvent;
use crate::gallery::{GalleryController, GalleryPhase, GalleryResolution};
use crate::surface::{PresentationSurface, ViewUpdate};
use media_library::{
    Asset, AssetStore, CaptureOutcome, CaptureService, PermissionGate, PermissionKind,
    PermissionStatus,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Platform services used by the picker
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn AssetStore>,
    pub permissions: Arc<dyn PermissionGate>,
    pub capture: Arc<dyn CaptureService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Idle,
    CheckingPermissions,
    CameraActive,
    GalleryActive,
    PermissionDenied(PermissionKind),
    Terminated,
}

pub(crate) struct PickerController {
    config: PickerConfig,
    collaborators: Collaborators,
    handle: ControlHandle,
    events: mpsc::UnboundedSender<PickerEvent>,
    surface: Box<dyn PresentationSurface>,
    phase: PickerPhase,
    gallery: Option<GalleryController>,
    alert_origin: CaptureOrigin,
}

impl PickerController {
    pub(crate) fn new(
        config: PickerConfig,
        collaborators: Collaborators,
        handle: ControlHandle,
        events: mpsc::UnboundedSender<PickerEvent>,
        surface: Box<dyn PresentationSurface>,
    ) -> Self {
        Self {
            config,
            collaborators,
            handle,
            events,
            surface,
            phase: PickerPhase::Idle,
            gallery: None,
            alert_origin: CaptureOrigin::Picker,
        }
    }

    pub(crate) fn phase(&self) -> PickerPhase {
        self.phase
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.phase == PickerPhase::Terminated
    }

    fn set_phase(&mut self, phase: PickerPhase) {
        if self.phase != phase {
            log::debug!("Picker {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Starts the permission checks for the configured source
    pub(crate) fn start(&mut self) {
        if self.phase != PickerPhase::Idle {
            log::warn!("Picker already started");
            return;
        }
        self.set_phase(PickerPhase::CheckingPermissions);
        match self.config.source {
            SourceKind::Camera => request_permission(
                &self.collaborators.permissions,
                PermissionKind::Camera,
                PermissionStep::CaptureCamera(CaptureOrigin::Picker),
                &self.handle,
            ),
            SourceKind::Gallery | SourceKind::Both => request_permission(
                &self.collaborators.permissions,
                PermissionKind::Library,
                PermissionStep::GalleryLibrary,
                &self.handle,
            ),
        }
    }

    pub(crate) fn handle(&mut self, message: Message) {
        if self.is_terminated() {
            log::debug!("Picker terminated, ignoring {:?}", message);
            return;
        }
        match message {
            Message::Input(input) => self.on_input(input),
            Message::Permission { step, status } => self.on_permission(step, status),
            Message::Captured { origin, outcome } => self.on_captured(origin, outcome),
            Message::VideoSaved { origin, result } => match result {
                Ok(asset) => self.finish_capture(origin, asset),
                Err(e) => {
                    log::error!("Captured video could not be saved: {}", e);
                    self.terminate(PickerEvent::SelectionFailed(e));
                }
            },
            message => self.forward_to_gallery(message),
        }
    }

    fn on_permission(&mut self, step: PermissionStep, status: PermissionStatus) {
        log::debug!("Permission answer {:?} for {:?}", status, step);
        match step {
            PermissionStep::GalleryLibrary => {
                if !status.allows_access() {
                    self.show_alert(PermissionKind::Library, CaptureOrigin::Picker);
                } else if self.config.source == SourceKind::Both {
                    request_permission(
                        &self.collaborators.permissions,
                        PermissionKind::Camera,
                        PermissionStep::GalleryCamera { library: status },
                        &self.handle,
                    );
                } else {
                    self.mount_gallery(false, status);
                }
            }
            PermissionStep::GalleryCamera { library } => {
                if status != PermissionStatus::Granted {
                    log::info!("Camera not available, gallery opens without camera item");
                }
                self.mount_gallery(status == PermissionStatus::Granted, library);
            }
            PermissionStep::CaptureCamera(origin) => {
                if status != PermissionStatus::Granted {
                    self.show_alert(PermissionKind::Camera, origin);
                } else if self.config.media_filter.includes_video() {
                    request_permission(
                        &self.collaborators.permissions,
                        PermissionKind::Library,
                        PermissionStep::CaptureLibrary(origin),
                        &self.handle,
                    );
                } else {
                    self.open_camera(origin);
                }
            }
            PermissionStep::CaptureLibrary(origin) => {
                if status.allows_access() {
                    self.open_camera(origin);
                } else {
                    self.show_alert(PermissionKind::Library, origin);
                }
            }
        }
    }

    fn mount_gallery(&mut self, camera_granted: bool, library: PermissionStatus) {
        let mut gallery = GalleryController::new(
            self.config.clone(),
            self.collaborators.store.clone(),
            self.handle.clone(),
            camera_granted,
            library,
        );
        gallery.mount(self.surface.as_mut());
        self.gallery = Some(gallery);
        self.set_phase(PickerPhase::GalleryActive);
    }

    fn open_camera(&mut self, origin: CaptureOrigin) {
        self.set_phase(PickerPhase::CameraActive);
        present_capture(
            &self.collaborators.capture,
            self.config.media_filter,
            self.config.allow_editing,
            origin,
            &self.handle,
        );
    }

    fn show_alert(&mut self, kind: PermissionKind, origin: CaptureOrigin) {
        log::info!("{:?} permission denied", kind);
        self.alert_origin = origin;
        self.set_phase(PickerPhase::PermissionDenied(kind));
        let text = self.config.localization.permission_denied(kind).clone();
        self.surface.render(ViewUpdate::PermissionDenied { kind, text });
    }

    fn on_captured(&mut self, origin: CaptureOrigin, outcome: CaptureOutcome) {
        match outcome {
            CaptureOutcome::Image { bytes, extension } => {
                self.finish_capture(origin, Asset::captured_image(bytes, extension))
            }
            CaptureOutcome::Video { location } => save_captured_video(
                &self.collaborators.store,
                location,
                origin,
                &self.handle,
            ),
            CaptureOutcome::Cancelled => match origin {
                CaptureOrigin::Picker => self.terminate(PickerEvent::Cancelled),
                CaptureOrigin::Gallery => self.return_to_gallery(),
            },
        }
    }

    /// Validates a captured asset and reports it
    fn finish_capture(&mut self, origin: CaptureOrigin, asset: Asset) {
        match self
            .config
            .size_limits
            .check_single(self.config.media_filter, &asset)
        {
            Ok(()) => self.terminate(PickerEvent::AssetsSelected(vec![asset])),
            Err(violation) => {
                log::info!("Captured asset exceeds size limit: {:?}", violation);
                self.emit(violation.into());
                match origin {
                    CaptureOrigin::Picker => self.open_camera(origin),
                    CaptureOrigin::Gallery => self.return_to_gallery(),
                }
            }
        }
    }

    fn return_to_gallery(&mut self) {
        if self.gallery.is_some() {
            self.set_phase(PickerPhase::GalleryActive);
        } else {
            self.terminate(PickerEvent::Cancelled);
        }
    }

    fn on_input(&mut self, input: UserInput) {
        match self.phase {
            PickerPhase::PermissionDenied(_) => match input {
                UserInput::DismissAlert { open_settings } => {
                    if open_settings {
                        self.collaborators.permissions.open_settings();
                    }
                    match self.alert_origin {
                        CaptureOrigin::Gallery => self.return_to_gallery(),
                        CaptureOrigin::Picker => self.terminate(PickerEvent::Cancelled),
                    }
                }
                UserInput::Cancel => self.terminate(PickerEvent::Cancelled),
                other => log::debug!("Alert shown, ignoring {:?}", other),
            },
            PickerPhase::GalleryActive => match input {
                UserInput::ManageLimitedAccess(action) => match action {
                    LimitedAccessAction::SelectMorePhotos => {
                        self.collaborators.permissions.present_limited_library_picker()
                    }
                    LimitedAccessAction::OpenSettings => {
                        self.collaborators.permissions.open_settings()
                    }
                },
                input => {
                    let resolution = match self.gallery.as_mut() {
                        Some(gallery) => gallery.handle_input(input, self.surface.as_mut()),
                        None => None,
                    };
                    self.on_resolution(resolution);
                }
            },
            _ => match input {
                UserInput::Cancel => self.terminate(PickerEvent::Cancelled),
                other => log::debug!("Ignoring {:?} in {:?}", other, self.phase),
            },
        }
    }

    fn forward_to_gallery(&mut self, message: Message) {
        let Some(gallery) = self.gallery.as_mut() else {
            log::debug!("No gallery mounted, dropping {:?}", message);
            return;
        };
        let surface = self.surface.as_mut();
        let resolution = match message {
            Message::AlbumsLoaded(result) => {
                gallery.on_albums_loaded(result, surface);
                None
            }
            Message::AssetsLoaded { generation, result } => {
                gallery.on_assets_loaded(generation, result, surface);
                None
            }
            Message::ThumbnailLoaded {
                generation,
                index,
                asset,
                result,
            } => {
                gallery.on_thumbnail_loaded(generation, index, asset, result, surface);
                None
            }
            Message::AssetFetched {
                attempt,
                asset,
                result,
            } => gallery.on_asset_fetched(attempt, asset, result, surface),
            Message::LibraryChanged => {
                gallery.on_library_changed();
                None
            }
            other => {
                log::warn!("Unexpected message for gallery: {:?}", other);
                None
            }
        };
        self.on_resolution(resolution);
    }

    fn on_resolution(&mut self, resolution: Option<GalleryResolution>) {
        match resolution {
            None => {}
            Some(GalleryResolution::Selected(assets)) => {
                self.terminate(PickerEvent::AssetsSelected(assets))
            }
            Some(GalleryResolution::SizeExceeded(violation)) => self.emit(violation.into()),
            Some(GalleryResolution::Cancelled) => self.terminate(PickerEvent::Cancelled),
            Some(GalleryResolution::OpenCamera) => {
                let committing = self
                    .gallery
                    .as_ref()
                    .map(|g| g.phase() == GalleryPhase::Committing)
                    .unwrap_or(false);
                if committing {
                    log::debug!("Commit in progress, camera item ignored");
                    return;
                }
                self.set_phase(PickerPhase::CheckingPermissions);
                request_permission(
                    &self.collaborators.permissions,
                    PermissionKind::Camera,
                    PermissionStep::CaptureCamera(CaptureOrigin::Gallery),
                    &self.handle,
                );
            }
        }
    }

    fn emit(&self, event: PickerEvent) {
        log::debug!("Reporting {:?}", event);
        if self.events.send(event).is_err() {
            log::warn!("Picker host stopped listening for events");
        }
    }

    /// Reports the terminal event and dismisses the picker
    fn terminate(&mut self, event: PickerEvent) {
        if self.is_terminated() {
            return;
        }
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.unmount();
        }
        self.emit(event);
        self.surface.render(ViewUpdate::Dismissed);
        self.set_phase(PickerPhase::Terminated);
    }
}

/// Entry point of the picker
pub struct MediaPicker {
    config: PickerConfig,
    collaborators: Collaborators,
}

impl MediaPicker {
    pub fn new(config: PickerConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Creates the control loop of one picker invocation
    ///
    /// Nothing happens until the returned driver runs.
    pub fn launch(self, surface: Box<dyn PresentationSurface>) -> (PickerSession, PickerDriver) {
        let (handle, messages) = ControlHandle::channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let controller = PickerController::new(
            self.config,
            self.collaborators,
            handle.clone(),
            events_tx,
            surface,
        );
        (
            PickerSession { handle, events },
            PickerDriver {
                controller,
                messages,
            },
        )
    }
}

/// Host side of a running picker
pub struct PickerSession {
    handle: ControlHandle,
    events: mpsc::UnboundedReceiver<PickerEvent>,
}

impl PickerSession {
    /// Forwards user input from the host views into the loop
    pub fn send(&self, input: UserInput) {
        self.handle.post(Message::Input(input));
    }

    /// Waits for the next outcome; `None` once the picker is gone
    pub async fn next_event(&mut self) -> Option<PickerEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<PickerEvent> {
        self.events.try_recv().ok()
    }
}

/// Control loop of one picker invocation
pub struct PickerDriver {
    controller: PickerController,
    messages: mpsc::UnboundedReceiver<Message>,
}

impl PickerDriver {
    /// Runs the loop until the picker reports its terminal event
    pub async fn run(mut self) {
        log::debug!("Picker control loop started");
        self.controller.start();
        while !self.controller.is_terminated() {
            match self.messages.recv().await {
                Some(message) => self.controller.handle(message),
                None => break,
            }
        }
        log::debug!("Picker control loop finished in {:?}", self.controller.phase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_policy::SizeLimits;
    use crate::surface::{GridCell, RecordingSurface};
    use media_library::{
        AlbumSubtype, AssetId, FixedPermissionGate, MediaFilter, MediaKind, MemoryAssetStore,
        ScriptedCaptureService,
    };
    use std::path::PathBuf;

    struct Harness {
        controller: PickerController,
        messages: mpsc::UnboundedReceiver<Message>,
        events: mpsc::UnboundedReceiver<PickerEvent>,
        handle: ControlHandle,
        surface: RecordingSurface,
        gate: FixedPermissionGate,
        capture: ScriptedCaptureService,
    }

    impl Harness {
        fn new(
            config: PickerConfig,
            store: &MemoryAssetStore,
            gate: FixedPermissionGate,
            capture: ScriptedCaptureService,
        ) -> Self {
            let (handle, messages) = ControlHandle::channel();
            let (events_tx, events) = mpsc::unbounded_channel();
            let surface = RecordingSurface::default();
            let collaborators = Collaborators {
                store: Arc::new(store.clone()),
                permissions: Arc::new(gate.clone()),
                capture: Arc::new(capture.clone()),
            };
            let controller = PickerController::new(
                config,
                collaborators,
                handle.clone(),
                events_tx,
                Box::new(surface.clone()),
            );
            let mut harness = Self {
                controller,
                messages,
                events,
                handle,
                surface,
                gate,
                capture,
            };
            harness.controller.start();
            harness.pump();
            harness
        }

        fn pump(&mut self) {
            while let Ok(message) = self.messages.try_recv() {
                self.controller.handle(message);
            }
        }

        fn input(&mut self, input: UserInput) {
            self.handle.post(Message::Input(input));
            self.pump();
        }

        fn events(&mut self) -> Vec<PickerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn library(sizes: &[usize]) -> (MemoryAssetStore, Vec<AssetId>) {
        let store = MemoryAssetStore::new();
        let album = store.add_album("Recents", AlbumSubtype::Recents);
        let ids = sizes
            .iter()
            .map(|size| store.add_image(&album, vec![9; *size], "jpg"))
            .collect();
        (store, ids)
    }

    fn camera_only(filter: MediaFilter) -> PickerConfig {
        PickerConfig {
            source: SourceKind::Camera,
            media_filter: filter,
            ..PickerConfig::default()
        }
    }

    #[test]
    fn test_gallery_mounts_with_camera_item() {
        let (store, _) = library(&[1, 1]);
        let harness = Harness::new(
            PickerConfig::default(),
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::default(),
        );
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        let items = harness.surface.last_items().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], GridCell::Camera);
    }

    #[test]
    fn test_camera_denied_still_mounts_gallery_without_camera_item() {
        let (store, _) = library(&[1, 1]);
        let gate = FixedPermissionGate::new(PermissionStatus::Denied, PermissionStatus::Granted);
        let harness = Harness::new(
            PickerConfig::default(),
            &store,
            gate,
            ScriptedCaptureService::default(),
        );
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        let items = harness.surface.last_items().unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items.contains(&GridCell::Camera));
    }

    #[test]
    fn test_gallery_only_skips_camera_permission() {
        let (store, _) = library(&[1]);
        let gate =
            FixedPermissionGate::new(PermissionStatus::NotDetermined, PermissionStatus::Granted);
        let config = PickerConfig {
            source: SourceKind::Gallery,
            ..PickerConfig::default()
        };
        let harness = Harness::new(config, &store, gate.clone(), ScriptedCaptureService::default());
        assert_eq!(gate.camera_prompts(), 0);
        assert!(!harness.surface.last_items().unwrap().contains(&GridCell::Camera));
    }

    #[test]
    fn test_library_denied_alert_cancels_on_dismiss() {
        let (store, _) = library(&[1]);
        let gate = FixedPermissionGate::new(PermissionStatus::Granted, PermissionStatus::Denied);
        let mut harness = Harness::new(
            PickerConfig::default(),
            &store,
            gate.clone(),
            ScriptedCaptureService::default(),
        );
        assert_eq!(
            harness.controller.phase(),
            PickerPhase::PermissionDenied(PermissionKind::Library)
        );
        assert!(harness.surface.updates().iter().any(|u| matches!(
            u,
            ViewUpdate::PermissionDenied { kind: PermissionKind::Library, text }
                if text.open_settings_action == "Change Settings"
        )));

        harness.input(UserInput::DismissAlert { open_settings: true });
        assert_eq!(gate.settings_opened(), 1);
        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PickerEvent::Cancelled));
        assert_eq!(harness.surface.updates().last(), Some(&ViewUpdate::Dismissed));
    }

    #[test]
    fn test_limited_access_shows_banner_and_actions() {
        let (store, _) = library(&[1]);
        let gate = FixedPermissionGate::new(PermissionStatus::Granted, PermissionStatus::Limited);
        let mut harness = Harness::new(
            PickerConfig::default(),
            &store,
            gate.clone(),
            ScriptedCaptureService::default(),
        );
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        assert!(harness
            .surface
            .updates()
            .iter()
            .any(|u| matches!(u, ViewUpdate::LimitedAccessBanner(_))));

        harness.input(UserInput::ManageLimitedAccess(LimitedAccessAction::SelectMorePhotos));
        harness.input(UserInput::ManageLimitedAccess(LimitedAccessAction::OpenSettings));
        assert_eq!(gate.limited_picker_presented(), 1);
        assert_eq!(gate.settings_opened(), 1);
        assert!(harness.events().is_empty());
    }

    #[test]
    fn test_commit_reports_selection_once() {
        let (store, ids) = library(&[500_000, 300_000]);
        let config = PickerConfig {
            source: SourceKind::Gallery,
            ..PickerConfig::default()
        }
        .with_size_limits(SizeLimits::from_sentinels(-1.0, 1.0));
        let mut harness = Harness::new(
            config,
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::default(),
        );
        harness.input(UserInput::TapItem(0));
        harness.input(UserInput::TapItem(1));
        harness.input(UserInput::Commit);
        harness.input(UserInput::Commit);
        harness.input(UserInput::Cancel);

        let events = harness.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PickerEvent::AssetsSelected(assets) => {
                assert_eq!(assets.len(), 2);
                assert!(ids.iter().all(|id| assets.iter().any(|a| a.id() == Some(id))));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(harness.controller.is_terminated());
    }

    #[test]
    fn test_size_exceeded_keeps_gallery_open() {
        let (store, _) = library(&[2_000_000]);
        let config =
            PickerConfig::default().with_size_limits(SizeLimits::from_sentinels(1.0, -1.0));
        let mut harness = Harness::new(
            config,
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::default(),
        );
        harness.input(UserInput::TapItem(1));
        harness.input(UserInput::Commit);

        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            PickerEvent::SizeExceeded {
                kind: MediaKind::Image,
                limit_mb,
                actual_mb: 1,
            } if limit_mb == 1.0
        ));
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        assert_eq!(harness.surface.last_commit_enabled(), Some(true));

        harness.input(UserInput::Cancel);
        let events = harness.events();
        assert!(matches!(events[..], [PickerEvent::Cancelled]));
    }

    #[test]
    fn test_camera_only_image_capture() {
        let store = MemoryAssetStore::new();
        let capture = ScriptedCaptureService::new(vec![CaptureOutcome::Image {
            bytes: vec![4; 100],
            extension: Some("jpg".to_string()),
        }]);
        let config = PickerConfig {
            allow_editing: true,
            ..camera_only(MediaFilter::Image)
        };
        let mut harness = Harness::new(config, &store, FixedPermissionGate::granted(), capture);

        assert_eq!(harness.capture.presentations(), vec![(MediaFilter::Image, true)]);
        assert_eq!(harness.gate.library_prompts(), 0);
        let events = harness.events();
        match &events[..] {
            [PickerEvent::AssetsSelected(assets)] => {
                assert_eq!(assets.len(), 1);
                assert_eq!(assets[0].bytes(), Some(&[4u8; 100][..]));
                assert!(assets[0].id().is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_camera_only_denied() {
        let store = MemoryAssetStore::new();
        let gate = FixedPermissionGate::new(PermissionStatus::Denied, PermissionStatus::Granted);
        let mut harness = Harness::new(
            camera_only(MediaFilter::All),
            &store,
            gate,
            ScriptedCaptureService::default(),
        );
        assert_eq!(
            harness.controller.phase(),
            PickerPhase::PermissionDenied(PermissionKind::Camera)
        );
        assert!(harness.capture.presentations().is_empty());

        harness.input(UserInput::DismissAlert { open_settings: false });
        assert!(matches!(harness.events()[..], [PickerEvent::Cancelled]));
    }

    #[test]
    fn test_video_capture_needs_library_access() {
        let store = MemoryAssetStore::new();
        let gate = FixedPermissionGate::new(PermissionStatus::Granted, PermissionStatus::Denied);
        let harness = Harness::new(
            camera_only(MediaFilter::Video),
            &store,
            gate,
            ScriptedCaptureService::default(),
        );
        assert_eq!(
            harness.controller.phase(),
            PickerPhase::PermissionDenied(PermissionKind::Library)
        );
    }

    #[test]
    fn test_capture_cancelled_in_camera_only_flow() {
        let store = MemoryAssetStore::new();
        let mut harness = Harness::new(
            camera_only(MediaFilter::Image),
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::new(vec![CaptureOutcome::Cancelled]),
        );
        assert!(matches!(harness.events()[..], [PickerEvent::Cancelled]));
    }

    #[test]
    fn test_oversized_capture_presents_camera_again() {
        let store = MemoryAssetStore::new();
        let capture = ScriptedCaptureService::new(vec![
            CaptureOutcome::Image {
                bytes: vec![0; 2_000_000],
                extension: None,
            },
            CaptureOutcome::Image {
                bytes: vec![0; 10],
                extension: None,
            },
        ]);
        let config = camera_only(MediaFilter::Image)
            .with_size_limits(SizeLimits::from_sentinels(1.0, -1.0));
        let mut harness = Harness::new(config, &store, FixedPermissionGate::granted(), capture);

        assert_eq!(harness.capture.presentations().len(), 2);
        let events = harness.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], PickerEvent::SizeExceeded { actual_mb: 1, .. }));
        assert!(matches!(&events[1], PickerEvent::AssetsSelected(assets) if assets.len() == 1));
    }

    #[test]
    fn test_video_save_failure_is_reported() {
        let store = MemoryAssetStore::new();
        store.set_video_save_error(Some("no space left".to_string()));
        let capture = ScriptedCaptureService::new(vec![CaptureOutcome::Video {
            location: PathBuf::from("/tmp/never-written.mov"),
        }]);
        let mut harness = Harness::new(
            camera_only(MediaFilter::Video),
            &store,
            FixedPermissionGate::granted(),
            capture,
        );
        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            PickerEvent::SelectionFailed(crate::error::PickerError::SaveFailed(_))
        ));
    }

    #[test]
    fn test_video_capture_saves_to_library() {
        let store = MemoryAssetStore::new();
        let path = std::env::temp_dir().join(format!("picker-capture-{}.mp4", std::process::id()));
        std::fs::write(&path, vec![8; 256]).unwrap();
        let capture = ScriptedCaptureService::new(vec![CaptureOutcome::Video {
            location: path.clone(),
        }]);
        let mut harness = Harness::new(
            camera_only(MediaFilter::Video),
            &store,
            FixedPermissionGate::granted(),
            capture,
        );
        match &harness.events()[..] {
            [PickerEvent::AssetsSelected(assets)] => {
                assert_eq!(assets[0].kind, MediaKind::Video);
                assert_eq!(assets[0].byte_len(), 256);
                assert!(store.asset(assets[0].id().unwrap()).is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_camera_item_capture_from_gallery() {
        let (store, _) = library(&[1]);
        let capture = ScriptedCaptureService::new(vec![
            CaptureOutcome::Cancelled,
            CaptureOutcome::Image {
                bytes: vec![1; 10],
                extension: Some("heic".to_string()),
            },
        ]);
        let config = PickerConfig {
            media_filter: MediaFilter::Image,
            ..PickerConfig::default()
        };
        let mut harness = Harness::new(config, &store, FixedPermissionGate::granted(), capture);

        harness.input(UserInput::TapItem(0));
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        assert!(harness.events().is_empty());

        harness.input(UserInput::TapItem(0));
        assert!(matches!(&harness.events()[..], [PickerEvent::AssetsSelected(a)] if a.len() == 1));
        assert_eq!(harness.capture.presentations().len(), 2);
    }

    #[test]
    fn test_camera_item_denied_returns_to_gallery() {
        let (store, _) = library(&[1]);
        let mut harness = Harness::new(
            PickerConfig::default(),
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::default(),
        );
        assert_eq!(harness.surface.last_items().unwrap()[0], GridCell::Camera);

        // Camera access revoked while the gallery is open
        harness.controller.on_permission(
            PermissionStep::CaptureCamera(CaptureOrigin::Gallery),
            PermissionStatus::Denied,
        );
        assert_eq!(
            harness.controller.phase(),
            PickerPhase::PermissionDenied(PermissionKind::Camera)
        );
        harness.input(UserInput::DismissAlert { open_settings: false });
        assert_eq!(harness.controller.phase(), PickerPhase::GalleryActive);
        assert!(harness.events().is_empty());
        assert!(harness.capture.presentations().is_empty());
    }

    #[test]
    fn test_messages_after_termination_are_ignored() {
        let (store, _) = library(&[1]);
        let mut harness = Harness::new(
            PickerConfig::default(),
            &store,
            FixedPermissionGate::granted(),
            ScriptedCaptureService::default(),
        );
        harness.input(UserInput::Cancel);
        harness.input(UserInput::Cancel);
        harness.input(UserInput::Commit);
        assert_eq!(harness.events().len(), 1);
        let dismissed = harness
            .surface
            .updates()
            .iter()
            .filter(|u| **u == ViewUpdate::Dismissed)
            .count();
        assert_eq!(dismissed, 1);
    }

    #[test]
    fn test_finished_pickers_release_change_observers() {
        let (store, _) = library(&[1]);
        for _ in 0..5 {
            let mut harness = Harness::new(
                PickerConfig::default(),
                &store,
                FixedPermissionGate::granted(),
                ScriptedCaptureService::default(),
            );
            assert_eq!(store.observer_count(), 1);
            harness.input(UserInput::Cancel);
            assert!(harness.controller.is_terminated());
        }
        assert_eq!(store.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_driver_runs_until_terminal_event() {
        let (store, _) = library(&[10, 20]);
        let collaborators = Collaborators {
            store: Arc::new(store),
            permissions: Arc::new(FixedPermissionGate::granted()),
            capture: Arc::new(ScriptedCaptureService::default()),
        };
        let config = PickerConfig {
            source: SourceKind::Gallery,
            single_select: true,
            ..PickerConfig::default()
        };
        let surface = RecordingSurface::default();
        let (mut session, driver) =
            MediaPicker::new(config, collaborators).launch(Box::new(surface.clone()));
        let task = tokio::spawn(driver.run());
        while surface.last_items().is_none() {
            tokio::task::yield_now().await;
        }

        session.send(UserInput::TapItem(0));
        session.send(UserInput::TapItem(1));
        session.send(UserInput::Commit);

        match session.next_event().await {
            Some(PickerEvent::AssetsSelected(assets)) => {
                assert_eq!(assets.len(), 1);
                assert_eq!(assets[0].byte_len(), 10);
            }
            other => panic!("unexpected {:?}", other),
        }
        task.await.unwrap();
        assert!(session.next_event().await.is_none());
        assert_eq!(surface.updates().last(), Some(&ViewUpdate::Dismissed));
    }
}
