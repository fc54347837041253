use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Opaque store-provided information about an asset (orientation, result info, ...)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Stable handle of an asset inside an asset store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle of an album inside an asset store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumId(pub String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a single media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Which media kinds a picker shows or a capture may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFilter {
    Image,
    Video,
    #[default]
    All,
}

impl MediaFilter {
    pub fn accepts(self, kind: MediaKind) -> bool {
        match self {
            MediaFilter::Image => kind == MediaKind::Image,
            MediaFilter::Video => kind == MediaKind::Video,
            MediaFilter::All => true,
        }
    }

    /// Video capture writes to the library, so it needs library access as well
    pub fn includes_video(self) -> bool {
        self != MediaFilter::Image
    }
}

/// Album categories offered by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumSubtype {
    Recents,
    Favorites,
    Regular,
    Shared,
    Videos,
    Screenshots,
}

impl AlbumSubtype {
    /// Album categories shown when the caller does not choose any
    pub fn defaults() -> Vec<AlbumSubtype> {
        vec![
            AlbumSubtype::Recents,
            AlbumSubtype::Favorites,
            AlbumSubtype::Regular,
            AlbumSubtype::Shared,
        ]
    }
}

/// Delivery-quality hint for full data requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryQuality {
    Fast,
    Opportunistic,
    #[default]
    High,
}

/// A named collection of assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub subtype: AlbumSubtype,
    pub asset_count: usize,
}

/// Full data returned by an image or video fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedData {
    pub bytes: Vec<u8>,
    pub extension: Option<String>,
    pub metadata: Metadata,
}

/// Reference to one photo or video
///
/// Equality and hashing only consider the store identity. Assets without an
/// identity (fresh captures) compare equal only to clones of themselves.
#[derive(Debug, Clone)]
pub struct Asset {
    id: Option<AssetId>,
    instance: u64,
    pub kind: MediaKind,
    pub data: Option<Vec<u8>>,
    pub extension: Option<String>,
    pub metadata: Metadata,
    pub created_at: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
}

impl Asset {
    fn next_instance() -> u64 {
        NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
    }

    /// Asset listed by a store; data is absent until fetched
    pub fn from_store(id: AssetId, kind: MediaKind) -> Self {
        Self {
            id: Some(id),
            instance: Self::next_instance(),
            kind,
            data: None,
            extension: None,
            metadata: Metadata::new(),
            created_at: None,
            duration: None,
        }
    }

    /// Freshly captured photo, not saved to any store
    pub fn captured_image(bytes: Vec<u8>, extension: Option<String>) -> Self {
        Self {
            id: None,
            instance: Self::next_instance(),
            kind: MediaKind::Image,
            data: Some(bytes),
            extension,
            metadata: Metadata::new(),
            created_at: Some(Utc::now()),
            duration: None,
        }
    }

    /// Captured video after it was saved to the library
    pub fn captured_video(id: AssetId, bytes: Vec<u8>, extension: Option<String>) -> Self {
        Self {
            id: Some(id),
            instance: Self::next_instance(),
            kind: MediaKind::Video,
            data: Some(bytes),
            extension,
            metadata: Metadata::new(),
            created_at: Some(Utc::now()),
            duration: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn id(&self) -> Option<&AssetId> {
        self.id.as_ref()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn byte_len(&self) -> usize {
        self.data.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Copy of this asset carrying fetched data
    pub fn with_data(&self, fetched: FetchedData) -> Self {
        Self {
            data: Some(fetched.bytes),
            extension: fetched.extension.or_else(|| self.extension.clone()),
            metadata: fetched.metadata,
            ..self.clone()
        }
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.instance == other.instance,
            _ => false,
        }
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.id {
            Some(id) => id.hash(state),
            None => self.instance.hash(state),
        }
    }
}

/// Formats a video duration the way grid cells show it (`mm:ss` or `hh:mm:ss`)
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    let hours = total / 3600;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
