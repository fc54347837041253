//! Capture flow helpers
//!
//! Presents the capture UI and turns its result into an asset. Photos carry
//! their bytes right away; videos are saved to the library first and then
//! read back from the temporary capture location.

use crate::control::{CaptureOrigin, ControlHandle, Message};
use crate::error::PickerError;
use media_library::{Asset, AssetStore, CaptureService, MediaFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) fn present_capture(
    capture: &Arc<dyn CaptureService>,
    filter: MediaFilter,
    allow_editing: bool,
    origin: CaptureOrigin,
    handle: &ControlHandle,
) {
    log::debug!("Presenting capture UI for {:?} ({:?})", filter, origin);
    let handle = handle.clone();
    capture.present(
        filter,
        allow_editing,
        Box::new(move |outcome| handle.post(Message::Captured { origin, outcome })),
    );
}

fn extension_of(location: &Path) -> Option<String> {
    location
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Saves a captured video and posts the resulting asset with its bytes
pub(crate) fn save_captured_video(
    store: &Arc<dyn AssetStore>,
    location: PathBuf,
    origin: CaptureOrigin,
    handle: &ControlHandle,
) {
    log::debug!("Saving captured video {:?}", location);
    let handle = handle.clone();
    let source = location.clone();
    store.save_captured_video(
        &source,
        Box::new(move |saved| {
            let result = match saved {
                Ok(id) => std::fs::read(&location)
                    .map(|bytes| Asset::captured_video(id, bytes, extension_of(&location)))
                    .map_err(PickerError::from),
                Err(e) => Err(PickerError::SaveFailed(e)),
            };
            handle.post(Message::VideoSaved { origin, result });
        }),
    );
}
