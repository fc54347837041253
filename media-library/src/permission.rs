use serde::{Deserialize, Serialize};

/// Which platform permission is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Camera,
    Library,
}

/// Authorization state of a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    /// Library access restricted to a user-chosen subset
    Limited,
    Denied,
    NotDetermined,
}

impl PermissionStatus {
    /// Limited library access still allows using the gallery
    pub fn allows_access(self) -> bool {
        matches!(self, PermissionStatus::Granted | PermissionStatus::Limited)
    }
}

pub type PermissionCallback = Box<dyn FnOnce(PermissionStatus) + Send + 'static>;

/// Platform permission prompts and settings deep-links
pub trait PermissionGate: Send + Sync {
    fn camera_status(&self) -> PermissionStatus;

    /// Prompts for camera access; the callback may run on any thread
    fn request_camera(&self, done: PermissionCallback);

    fn library_status(&self) -> PermissionStatus;

    /// Prompts for library access; the callback may run on any thread
    fn request_library(&self, done: PermissionCallback);

    /// Opens the system settings page of the host app
    fn open_settings(&self);

    /// Lets the user extend a limited library selection
    fn present_limited_library_picker(&self);
}
