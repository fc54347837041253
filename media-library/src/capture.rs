use crate::models::MediaFilter;
use std::path::PathBuf;

/// Result of presenting the capture UI
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Encoded photo, edited if editing was allowed and used
    Image {
        bytes: Vec<u8>,
        extension: Option<String>,
    },
    /// Video recorded to a temporary location
    Video { location: PathBuf },
    Cancelled,
}

pub type CaptureCallback = Box<dyn FnOnce(CaptureOutcome) + Send + 'static>;

/// Platform camera UI
pub trait CaptureService: Send + Sync {
    fn present(&self, filter: MediaFilter, allow_editing: bool, done: CaptureCallback);
}
