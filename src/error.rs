use media_library::StoreError;
use std::fmt;

/// Central error type of the media picker
#[derive(Debug)]
pub enum PickerError {
    /// Captured video could not be written to the library
    SaveFailed(StoreError),
    /// Filesystem error (e.g. reading a captured video)
    Filesystem(std::io::Error),
    /// Invalid picker configuration
    Config(String),
}

impl fmt::Display for PickerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PickerError::SaveFailed(e) => write!(f, "Saving captured video failed: {}", e),
            PickerError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            PickerError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PickerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PickerError::SaveFailed(e) => Some(e),
            PickerError::Filesystem(e) => Some(e),
            PickerError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for PickerError {
    fn from(e: std::io::Error) -> Self {
        PickerError::Filesystem(e)
    }
}

impl From<toml::de::Error> for PickerError {
    fn from(e: toml::de::Error) -> Self {
        PickerError::Config(e.to_string())
    }
}

/// User-friendly error messages for UI
impl PickerError {
    pub fn user_message(&self) -> String {
        match self {
            PickerError::SaveFailed(_) => "The video could not be saved to your library.".to_string(),
            PickerError::Filesystem(_) => "The captured media could not be read.".to_string(),
            PickerError::Config(msg) => msg.clone(),
        }
    }
}
