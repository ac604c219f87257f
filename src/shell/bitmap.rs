//! Platform-neutral thumbnail bitmap
//!
//! The shell hands back a GDI bitmap; the Windows backend copies it into a
//! [`ThumbnailBitmap`] (32-bit BGRA, top-down rows) so the rest of the crate
//! never touches a native handle.

use crate::core::error::{Result, ThumbnailError};
use crate::shell::traits::ThumbnailSize;
use image::{imageops, RgbImage, RgbaImage};

/// Bytes per BGRA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// A decoded thumbnail in BGRA8 layout, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ThumbnailBitmap {
    /// Wrap a BGRA buffer, checking that it matches the dimensions
    pub fn from_bgra(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ThumbnailError::RenderFailed(format!(
                "empty bitmap ({}x{})",
                width, height
            )));
        }

        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ThumbnailError::RenderFailed(format!(
                "bitmap buffer is {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a bitmap from an RGB image
    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .flat_map(|p| [p.0[2], p.0[1], p.0[0], 0xFF])
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGRA bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Drop the alpha channel and reorder to RGB
    ///
    /// JPEG has no alpha; the shell's GDI bitmaps are treated as opaque.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        let rgb: Vec<u8> = self
            .pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .flat_map(|bgra| [bgra[2], bgra[1], bgra[0]])
            .collect();

        RgbImage::from_raw(self.width, self.height, rgb).ok_or_else(|| {
            ThumbnailError::EncodeFailed(format!(
                "could not build {}x{} RGB image",
                self.width, self.height
            ))
        })
    }

    /// Shrink the bitmap so it fits inside `bounds`, keeping its aspect ratio
    ///
    /// Bitmaps that already fit are returned unchanged. Never upscales.
    pub fn fit_within(self, bounds: ThumbnailSize) -> Result<Self> {
        if bounds.contains(self.width, self.height) {
            return Ok(self);
        }

        let (new_width, new_height) = fitted_dimensions(self.width, self.height, bounds);

        // Resampling treats every channel alike, so BGRA can pass as RGBA here.
        let buffer = RgbaImage::from_raw(self.width, self.height, self.pixels).ok_or_else(|| {
            ThumbnailError::RenderFailed("bitmap buffer does not match its size".to_string())
        })?;
        let resized = imageops::thumbnail(&buffer, new_width, new_height);

        Self::from_bgra(new_width, new_height, resized.into_raw())
    }
}

/// Largest dimensions with the same aspect ratio that fit inside `bounds`
pub fn fitted_dimensions(width: u32, height: u32, bounds: ThumbnailSize) -> (u32, u32) {
    if bounds.contains(width, height) {
        return (width, height);
    }

    let scale = f64::min(
        bounds.width as f64 / width as f64,
        bounds.height as f64 / height as f64,
    );

    let scaled = |value: u32, limit: u32| -> u32 {
        ((value as f64 * scale).round() as u32).clamp(1, limit)
    };

    (scaled(width, bounds.width), scaled(height, bounds.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> ThumbnailBitmap {
        ThumbnailBitmap::from_rgb_image(&RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn test_from_bgra_rejects_bad_buffers() {
        assert!(ThumbnailBitmap::from_bgra(0, 10, Vec::new()).is_err());
        assert!(ThumbnailBitmap::from_bgra(2, 2, vec![0; 15]).is_err());
        assert!(ThumbnailBitmap::from_bgra(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_rgb_roundtrip_keeps_channel_order() {
        let bitmap = solid(3, 2, [10, 20, 30]);
        assert_eq!(&bitmap.pixels()[..4], &[30, 20, 10, 0xFF]);

        let rgb = bitmap.to_rgb_image().unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_fitted_dimensions() {
        let bounds = ThumbnailSize::square(100);
        assert_eq!(fitted_dimensions(50, 80, bounds), (50, 80));
        assert_eq!(fitted_dimensions(400, 200, bounds), (100, 50));
        assert_eq!(fitted_dimensions(200, 400, bounds), (50, 100));
        assert_eq!(fitted_dimensions(1000, 1, bounds), (100, 1));
    }

    #[test]
    fn test_fit_within_shrinks_large_bitmaps() {
        let fitted = solid(640, 480, [200, 100, 50])
            .fit_within(ThumbnailSize::square(64))
            .unwrap();

        assert_eq!((fitted.width(), fitted.height()), (64, 48));
        assert_eq!(fitted.pixels().len(), 64 * 48 * BYTES_PER_PIXEL);
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let bitmap = solid(32, 16, [1, 2, 3]);
        let fitted = bitmap.clone().fit_within(ThumbnailSize::square(256)).unwrap();
        assert_eq!(fitted, bitmap);
    }
}
