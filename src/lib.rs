//! # Media Picker
//!
//! An embeddable photo and video picker flow.
//!
//! This crate provides:
//! - Permission checks for camera and library access, with alerts and a
//!   limited-access banner
//! - A gallery screen with albums, windowed thumbnails and single or
//!   multi selection
//! - A commit step fetching the selected media concurrently and validating
//!   per-item and total size limits
//! - A camera flow saving captured videos to the library
//!
//! Platform services are reached through the `media_library` interfaces and
//! the host renders `ViewUpdate`s through a `PresentationSurface`.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use media_picker::{Collaborators, MediaPicker, PickerConfig, UserInput};
//!
//! let (mut session, driver) = MediaPicker::new(PickerConfig::default(), collaborators)
//!     .launch(Box::new(surface));
//! tokio::spawn(driver.run());
//!
//! session.send(UserInput::TapItem(1));
//! session.send(UserInput::Commit);
//! let outcome = session.next_event().await;
//! ```

mod camera;
pub mod config;
mod control;
pub mod error;
pub mod events;
mod gallery;
pub mod picker;
pub mod selection;
pub mod size_policy;
pub mod surface;

pub use config::{
    Appearance, LimitedAccessText, Localization, PermissionDeniedText, PickerConfig, SourceKind,
};
pub use control::{LimitedAccessAction, UserInput};
pub use error::PickerError;
pub use events::PickerEvent;
pub use gallery::GalleryPhase;
pub use picker::{Collaborators, MediaPicker, PickerDriver, PickerPhase, PickerSession};
pub use selection::{GridItem, SelectionModel};
pub use size_policy::{SizeLimits, SizeViolation};
pub use surface::{AlbumEntry, GridCell, PresentationSurface, ViewUpdate};

pub use media_library;
