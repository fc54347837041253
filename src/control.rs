//! Control loop messages
//!
//! Every collaborator callback and every user input becomes a `Message` on
//! one channel. The picker driver drains that channel on a single task, so
//! controller state is only ever touched from inside the loop.

use crate::error::PickerError;
use media_library::{
    Album, Asset, AssetId, CaptureOutcome, FetchedData, PermissionGate, PermissionKind,
    PermissionStatus, StoreResult,
};
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Input from the host's views
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    TapItem(usize),
    /// Grid indices currently on screen
    VisibleRange(Range<usize>),
    OpenAlbumChooser,
    ChooseAlbum(usize),
    Commit,
    Cancel,
    /// Closes a permission-denied alert, optionally via the settings action
    DismissAlert { open_settings: bool },
    ManageLimitedAccess(LimitedAccessAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAccessAction {
    SelectMorePhotos,
    OpenSettings,
}

/// Who asked for the capture UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptureOrigin {
    /// Camera-only picker
    Picker,
    /// Camera item of the gallery grid
    Gallery,
}

/// Which permission answer is awaited, and why
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PermissionStep {
    GalleryLibrary,
    /// Decides whether the grid shows the camera item
    GalleryCamera { library: PermissionStatus },
    CaptureCamera(CaptureOrigin),
    /// Saving captured video needs library access
    CaptureLibrary(CaptureOrigin),
}

#[derive(Debug)]
pub(crate) enum Message {
    Input(UserInput),
    Permission {
        step: PermissionStep,
        status: PermissionStatus,
    },
    AlbumsLoaded(StoreResult<Vec<Album>>),
    AssetsLoaded {
        generation: u64,
        result: StoreResult<Vec<Asset>>,
    },
    ThumbnailLoaded {
        generation: u64,
        index: usize,
        asset: AssetId,
        result: StoreResult<Vec<u8>>,
    },
    AssetFetched {
        attempt: u64,
        asset: Asset,
        result: StoreResult<FetchedData>,
    },
    LibraryChanged,
    Captured {
        origin: CaptureOrigin,
        outcome: CaptureOutcome,
    },
    VideoSaved {
        origin: CaptureOrigin,
        result: Result<Asset, PickerError>,
    },
}

/// Posts messages into the control loop from any thread
#[derive(Debug, Clone)]
pub(crate) struct ControlHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl ControlHandle {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn post(&self, message: Message) {
        if let Err(e) = self.tx.send(message) {
            log::debug!("Picker closed, dropping late message: {:?}", e.0);
        }
    }
}

/// Resolves a permission and posts the answer for `step`
///
/// Undetermined permissions are requested; the prompt answer arrives later.
pub(crate) fn request_permission(
    gate: &Arc<dyn PermissionGate>,
    kind: PermissionKind,
    step: PermissionStep,
    handle: &ControlHandle,
) {
    let status = match kind {
        PermissionKind::Camera => gate.camera_status(),
        PermissionKind::Library => gate.library_status(),
    };
    log::debug!("{:?} permission is {:?} for {:?}", kind, status, step);

    if status != PermissionStatus::NotDetermined {
        handle.post(Message::Permission { step, status });
        return;
    }

    let handle = handle.clone();
    let done = Box::new(move |status| handle.post(Message::Permission { step, status }));
    match kind {
        PermissionKind::Camera => gate.request_camera(done),
        PermissionKind::Library => gate.request_library(done),
    }
}
