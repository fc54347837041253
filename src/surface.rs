//! Presentation surface contract
//!
//! The host renders the picker. Controllers describe what changed through
//! `ViewUpdate` values and never touch platform views themselves.

use crate::config::{Appearance, LimitedAccessText, PermissionDeniedText};
use media_library::{format_duration, AssetId, MediaKind, PermissionKind};

/// One cell of the gallery grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    Camera,
    Asset {
        id: Option<AssetId>,
        kind: MediaKind,
        selected: bool,
        /// `mm:ss` or `hh:mm:ss` for videos
        duration_label: Option<String>,
    },
}

impl GridCell {
    pub(crate) fn for_asset(asset: &media_library::Asset, selected: bool) -> Self {
        let duration_label = match asset.kind {
            MediaKind::Video => Some(format_duration(asset.duration.unwrap_or_default())),
            MediaKind::Image => None,
        };
        GridCell::Asset {
            id: asset.id().cloned(),
            kind: asset.kind,
            selected,
            duration_label,
        }
    }
}

/// Row of the album chooser
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumEntry {
    pub title: String,
    pub asset_count: usize,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    GalleryMounted {
        cancel_label: String,
        done_label: String,
        appearance: Appearance,
    },
    /// Album chooser button; disabled when there are no albums
    TitleChanged { title: String, chooser_enabled: bool },
    ItemsReloaded(Vec<GridCell>),
    ItemsRefreshed(Vec<(usize, GridCell)>),
    Thumbnail { index: usize, bytes: Vec<u8> },
    CommitEnabled(bool),
    /// Commit button replaced by a progress indicator
    CommitInProgress,
    AlbumChooser(Vec<AlbumEntry>),
    LimitedAccessBanner(LimitedAccessText),
    PermissionDenied {
        kind: PermissionKind,
        text: PermissionDeniedText,
    },
    Dismissed,
}

/// Platform-provided view layer of the picker
pub trait PresentationSurface: Send {
    fn render(&mut self, update: ViewUpdate);
}

#[cfg(test)]
pub(crate) use recording::RecordingSurface;
