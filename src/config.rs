use crate::error::PickerError;
use crate::size_policy::SizeLimits;
use media_library::{AlbumSubtype, Asset, DeliveryQuality, MediaFilter, PermissionKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the picker takes media from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Camera,
    Gallery,
    /// Gallery with a camera item at the start of the grid
    #[default]
    Both,
}

/// Configuration of one picker invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub media_filter: MediaFilter,
    pub source: SourceKind,
    /// Selecting an asset deselects the previous one
    pub single_select: bool,
    pub max_selectable_count: usize,
    pub album_subtypes: Vec<AlbumSubtype>,
    /// Assets selected before any user interaction
    #[serde(skip)]
    pub default_selection: Vec<Asset>,
    pub size_limits: SizeLimits,
    /// Forwarded to the capture UI
    pub allow_editing: bool,
    pub image_quality: DeliveryQuality,
    pub video_quality: DeliveryQuality,
    pub localization: Localization,
    pub appearance: Appearance,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            media_filter: MediaFilter::All,
            source: SourceKind::Both,
            single_select: false,
            max_selectable_count: 999,
            album_subtypes: AlbumSubtype::defaults(),
            default_selection: Vec::new(),
            size_limits: SizeLimits::default(),
            allow_editing: false,
            image_quality: DeliveryQuality::High,
            video_quality: DeliveryQuality::High,
            localization: Localization::default(),
            appearance: Appearance::default(),
        }
    }
}

impl PickerConfig {
    /// Parses a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, PickerError> {
        let mut config: PickerConfig = toml::from_str(content)?;
        config.size_limits = config.size_limits.normalized();
        if config.album_subtypes.is_empty() {
            return Err(PickerError::Config(
                "album_subtypes must name at least one album type".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PickerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_default_selection(mut self, assets: Vec<Asset>) -> Self {
        self.default_selection = assets;
        self
    }

    pub fn with_size_limits(mut self, limits: SizeLimits) -> Self {
        self.size_limits = limits.normalized();
        self
    }
}

/// Texts of a permission-denied alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionDeniedText {
    pub title: String,
    pub message: String,
    pub open_settings_action: String,
    pub cancel_action: String,
}

impl Default for PermissionDeniedText {
    fn default() -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            open_settings_action: "Change Settings".to_string(),
            cancel_action: "Not Now".to_string(),
        }
    }
}

/// Texts of the limited-access banner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitedAccessText {
    pub title: String,
    pub manage_action: String,
    pub select_more_action: String,
    pub open_settings_action: String,
}

impl Default for LimitedAccessText {
    fn default() -> Self {
        Self {
            title: String::new(),
            manage_action: "Manage".to_string(),
            select_more_action: "Select More Photos".to_string(),
            open_settings_action: "Change Settings".to_string(),
        }
    }
}

/// User-facing strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localization {
    pub cancel: String,
    pub done: String,
    pub photo_permission_denied: PermissionDeniedText,
    pub camera_permission_denied: PermissionDeniedText,
    pub limited_access: LimitedAccessText,
}

impl Localization {
    /// English texts naming the host app
    pub fn for_app(app_name: &str) -> Self {
        Self {
            cancel: "Cancel".to_string(),
            done: "Done".to_string(),
            photo_permission_denied: PermissionDeniedText {
                title: format!("{} does not have access to your Photos.", app_name),
                message: "To enable access, tap Settings and enable Photos".to_string(),
                ..PermissionDeniedText::default()
            },
            camera_permission_denied: PermissionDeniedText {
                title: format!("{} does not have access to your Camera.", app_name),
                message: "To enable access, tap Settings and enable Camera".to_string(),
                ..PermissionDeniedText::default()
            },
            limited_access: LimitedAccessText {
                title: format!(
                    "You have given {} access to only a select number of photos.",
                    app_name
                ),
                ..LimitedAccessText::default()
            },
        }
    }

    pub fn permission_denied(&self, kind: PermissionKind) -> &PermissionDeniedText {
        match kind {
            PermissionKind::Camera => &self.camera_permission_denied,
            PermissionKind::Library => &self.photo_permission_denied,
        }
    }
}

impl Default for Localization {
    fn default() -> Self {
        Self::for_app("This app")
    }
}

/// Look of the gallery screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    /// Title color as `#rrggbb`
    pub title_color: String,
    pub title_font_size: f32,
    pub bold_title: bool,
    /// Longest edge of grid thumbnails in pixels
    pub thumbnail_size: u32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            title_color: "#000000".to_string(),
            title_font_size: 18.0,
            bold_title: true,
            thumbnail_size: 160,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PickerConfig::default();
        assert_eq!(config.media_filter, MediaFilter::All);
        assert_eq!(config.source, SourceKind::Both);
        assert_eq!(config.max_selectable_count, 999);
        assert_eq!(config.album_subtypes.len(), 4);
        assert_eq!(config.size_limits.max_media_size_mb, None);
        assert_eq!(config.localization.cancel, "Cancel");
    }

    #[test]
    fn test_from_toml() {
        let config = PickerConfig::from_toml_str(
            r#"
            media_filter = "image"
            source = "gallery"
            single_select = true
            album_subtypes = ["recents", "favorites"]

            [size_limits]
            max_media_size_mb = 1.0
            max_total_media_size_mb = -1.0

            [localization]
            done = "Fertig"
            "#,
        )
        .unwrap();
        assert_eq!(config.media_filter, MediaFilter::Image);
        assert_eq!(config.source, SourceKind::Gallery);
        assert!(config.single_select);
        assert_eq!(
            config.album_subtypes,
            vec![AlbumSubtype::Recents, AlbumSubtype::Favorites]
        );
        assert_eq!(config.size_limits.max_media_size_mb, Some(1.0));
        assert_eq!(config.size_limits.max_total_media_size_mb, None);
        assert_eq!(config.localization.done, "Fertig");
        assert_eq!(config.localization.cancel, "Cancel");
    }

    #[test]
    fn test_empty_album_list_rejected() {
        let result = PickerConfig::from_toml_str("album_subtypes = []");
        assert!(matches!(result, Err(PickerError::Config(_))));
    }

    #[test]
    fn test_localization_for_app() {
        let localization = Localization::for_app("Stall");
        assert_eq!(
            localization.permission_denied(PermissionKind::Camera).title,
            "Stall does not have access to your Camera."
        );
        assert_eq!(
            localization.permission_denied(PermissionKind::Library).cancel_action,
            "Not Now"
        );
    }
}
