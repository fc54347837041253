//! Demo of the picker flow against an in-memory library
//!
//! Usage: `media-picker-demo [config.toml]`

use image::{ImageFormat, Rgb, RgbImage};
use media_picker::media_library::{
    AlbumSubtype, FixedPermissionGate, MemoryAssetStore, ScriptedCaptureService,
};
use media_picker::{
    Collaborators, MediaPicker, PickerConfig, PickerEvent, PresentationSurface, UserInput,
    ViewUpdate,
};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Logs every view update and publishes the grid size
struct LogSurface {
    items: watch::Sender<usize>,
}

impl PresentationSurface for LogSurface {
    fn render(&mut self, update: ViewUpdate) {
        match &update {
            ViewUpdate::ItemsReloaded(cells) => {
                log::info!("Grid shows {} items", cells.len());
                self.items.send_replace(cells.len());
            }
            ViewUpdate::Thumbnail { index, bytes } => {
                log::info!("Thumbnail for item {} ({} bytes)", index, bytes.len());
            }
            other => log::info!("View: {:?}", other),
        }
    }
}

fn sample_jpeg(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([shade, (x % 256) as u8, (y % 256) as u8])
    });
    let mut bytes = Vec::new();
    if let Err(e) = img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg) {
        log::error!("Failed to encode sample image: {}", e);
    }
    bytes
}

fn seeded_store() -> MemoryAssetStore {
    let store = MemoryAssetStore::new();
    let recents = store.add_album("Recents", AlbumSubtype::Recents);
    let favorites = store.add_album("Favorites", AlbumSubtype::Favorites);

    for shade in [40u8, 120, 200] {
        store.add_image(&recents, sample_jpeg(640, 480, shade), "jpg");
    }
    let video = store.add_video(&recents, vec![0; 2048], "mov", Duration::from_secs(75));
    if let Err(e) = store.add_to_album(&video, &favorites) {
        log::error!("Failed to seed favorites: {}", e);
    }
    store
}

fn load_config() -> PickerConfig {
    match std::env::args().nth(1) {
        Some(path) => match PickerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}, using defaults", path, e);
                PickerConfig::default()
            }
        },
        None => PickerConfig::default(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    runtime.block_on(async {
        let collaborators = Collaborators {
            store: Arc::new(seeded_store()),
            permissions: Arc::new(FixedPermissionGate::granted()),
            capture: Arc::new(ScriptedCaptureService::default()),
        };
        let (items_tx, mut items_rx) = watch::channel(0);
        let surface = LogSurface { items: items_tx };

        let (mut session, driver) =
            MediaPicker::new(load_config(), collaborators).launch(Box::new(surface));
        let driver = tokio::spawn(driver.run());

        if items_rx.wait_for(|count| *count > 0).await.is_err() {
            log::error!("Picker closed before the gallery loaded");
            return;
        }

        session.send(UserInput::VisibleRange(0..8));
        session.send(UserInput::TapItem(1));
        session.send(UserInput::TapItem(2));
        session.send(UserInput::Commit);

        while let Some(event) = session.next_event().await {
            match &event {
                PickerEvent::AssetsSelected(assets) => {
                    for asset in assets {
                        log::info!(
                            "Selected {:?} {} ({} bytes)",
                            asset.kind,
                            asset.id().map(|id| id.to_string()).unwrap_or_default(),
                            asset.byte_len()
                        );
                    }
                }
                other => log::info!("Picker reported {:?}", other),
            }
            if event.is_terminal() {
                break;
            }
            // Size limits breached, give up instead of retrying
            session.send(UserInput::Cancel);
        }

        if let Err(e) = driver.await {
            log::error!("Picker loop failed: {}", e);
        }
    });
}
