//! JPEG encoding of shell thumbnails
//!
//! The encoder is looked up by MIME type in the `image` crate's format
//! registry, the same way a system codec list is searched for `image/jpeg`.

use crate::core::error::{Result, ThumbnailError};
use crate::shell::bitmap::ThumbnailBitmap;
use crate::shell::traits::ImageEncoderTrait;
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use log::trace;

/// MIME type of the output format
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// First two bytes of every JPEG stream (SOI marker)
pub const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

/// Encodes thumbnails with the `image` crate's JPEG encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegThumbnailEncoder {
    format: ImageFormat,
    quality: Option<u8>,
}

impl JpegThumbnailEncoder {
    /// Create an encoder using the codec's default quality
    pub fn new() -> Result<Self> {
        Self::with_quality(None)
    }

    /// Create an encoder, optionally overriding the quality (1-100)
    pub fn with_quality(quality: Option<u8>) -> Result<Self> {
        let format = find_encoder(JPEG_MIME_TYPE)?;
        Ok(Self {
            format,
            quality: quality.map(|q| q.clamp(1, 100)),
        })
    }

    /// Explicit quality, if any
    pub fn quality(&self) -> Option<u8> {
        self.quality
    }
}

impl ImageEncoderTrait for JpegThumbnailEncoder {
    fn encode_jpeg(&self, bitmap: &ThumbnailBitmap) -> Result<Vec<u8>> {
        let rgb = bitmap.to_rgb_image()?;
        let mut output = Vec::new();

        {
            let mut encoder = match self.quality {
                Some(quality) => JpegEncoder::new_with_quality(&mut output, quality),
                None => JpegEncoder::new(&mut output),
            };
            encoder.encode_image(&rgb)?;
        }

        if output.is_empty() {
            return Err(ThumbnailError::EncodeFailed(
                "encoder produced no data".to_string(),
            ));
        }

        trace!(
            "encoded {}x{} thumbnail as {:?} ({} bytes)",
            bitmap.width(),
            bitmap.height(),
            self.format,
            output.len()
        );

        Ok(output)
    }
}

/// Find a writable image format advertising `mime_type`
pub fn find_encoder(mime_type: &str) -> Result<ImageFormat> {
    ImageFormat::from_mime_type(mime_type)
        .filter(|format| format.writing_enabled())
        .ok_or_else(|| ThumbnailError::EncodeFailed(format!("no encoder for {}", mime_type)))
}

/// Check whether `data` starts with the JPEG SOI marker
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JPEG_MAGIC)
}
