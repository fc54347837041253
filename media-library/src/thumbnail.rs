use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Error type for thumbnail operations
#[derive(Debug)]
pub enum ThumbnailError {
    ImageLoadError(String),
    ImageSaveError(String),
}

impl std::fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThumbnailError::ImageLoadError(msg) => write!(f, "Image load error: {}", msg),
            ThumbnailError::ImageSaveError(msg) => write!(f, "Image save error: {}", msg),
        }
    }
}

impl std::error::Error for ThumbnailError {}

/// Creates a WebP thumbnail whose longest edge is at most `size` pixels
pub fn create_thumbnail(bytes: &[u8], size: u32) -> Result<Vec<u8>, ThumbnailError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ThumbnailError::ImageLoadError(format!("Failed to load image: {}", e)))?;

    let thumb = img.resize(size, size, FilterType::Lanczos3);

    let mut buffer = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buffer, ImageFormat::WebP)
        .map_err(|e| ThumbnailError::ImageSaveError(format!("Failed to write thumbnail: {}", e)))?;

    log::debug!(
        "Thumbnail created: {}x{} -> {}x{}",
        img.width(),
        img.height(),
        thumb.width(),
        thumb.height()
    );

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbImage};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 120, 40]),
        ));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_thumbnail_keeps_aspect_ratio() {
        let thumb = create_thumbnail(&jpeg(64, 32), 16).unwrap();
        let decoded = image::load_from_memory_with_format(&thumb, ImageFormat::WebP).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn test_thumbnail_rejects_garbage() {
        let result = create_thumbnail(&[0, 1, 2, 3], 16);
        assert!(matches!(result, Err(ThumbnailError::ImageLoadError(_))));
    }
}
