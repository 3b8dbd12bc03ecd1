//! Brand overlay image handling

use std::path::Path;

use image::RgbaImage;
use tracing::info;

use crate::domain::model::Dimensions;
use crate::error::{MarkXError, MarkXResult};

/// The decoded brand-overlay image.
///
/// Loaded once at startup; a missing or undecodable image is a fatal
/// startup condition, never a per-job error.
#[derive(Debug, Clone)]
pub struct Watermark {
    image: RgbaImage,
}

impl Watermark {
    /// Load and decode the brand image from disk
    pub fn load(path: &Path) -> MarkXResult<Self> {
        let decoded = image::open(path).map_err(|e| MarkXError::OverlayError {
            message: format!("Failed to load watermark image {}: {}", path.display(), e),
        })?;
        let watermark = Self::from_rgba(decoded.to_rgba8())?;
        info!(
            "Loaded watermark image {} ({})",
            path.display(),
            watermark.size()
        );
        Ok(watermark)
    }

    /// Wrap an already-decoded RGBA image
    pub fn from_rgba(image: RgbaImage) -> MarkXResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(MarkXError::OverlayError {
                message: "Watermark image has zero area".to_string(),
            });
        }
        Ok(Self { image })
    }

    /// Pixel dimensions of the source image
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    /// Width-to-height ratio of the source image
    pub fn aspect_ratio(&self) -> f64 {
        self.image.width() as f64 / self.image.height() as f64
    }

    /// Resample the image to the given target size
    pub fn scaled_to(&self, width: u32, height: u32) -> RgbaImage {
        image::imageops::resize(
            &self.image,
            width.max(1),
            height.max(1),
            image::imageops::FilterType::Triangle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn test_aspect_ratio() {
        let watermark = Watermark::from_rgba(solid_image(400, 100)).unwrap();
        assert_eq!(watermark.aspect_ratio(), 4.0);
        assert_eq!(watermark.size(), Dimensions::new(400, 100));
    }

    #[test]
    fn test_zero_area_image_rejected() {
        let empty = RgbaImage::new(0, 0);
        assert!(matches!(
            Watermark::from_rgba(empty),
            Err(MarkXError::OverlayError { .. })
        ));
    }

    #[test]
    fn test_scaled_to_target_size() {
        let watermark = Watermark::from_rgba(solid_image(400, 100)).unwrap();
        let scaled = watermark.scaled_to(200, 50);
        assert_eq!((scaled.width(), scaled.height()), (200, 50));
    }

    #[test]
    fn test_missing_file_is_overlay_error() {
        let result = Watermark::load(Path::new("/nonexistent/brand.png"));
        assert!(matches!(result, Err(MarkXError::OverlayError { .. })));
    }
}
