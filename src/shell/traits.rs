//! Shell abstraction traits for testability
//!
//! The fetch-and-encode logic only ever talks to the platform through the
//! three capabilities defined here, so the real Windows Shell and the mock
//! shell in `testdb` can be used interchangeably.
//!
//! - `ShellProviderTrait::resolve_shell_item` turns a path into a shell item
//! - `ShellProviderTrait::render_thumbnail` asks the cache for a bitmap
//! - `ImageEncoderTrait::encode_jpeg` turns that bitmap into JPEG bytes
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use shell_thumbnail::shell::traits::{
//!     ImageEncoderTrait, RenderOptions, ShellProviderTrait, ThumbnailSize,
//! };
//! use std::path::Path;
//!
//! fn thumbnail<S: ShellProviderTrait, E: ImageEncoderTrait>(
//!     shell: &S,
//!     encoder: &E,
//! ) -> shell_thumbnail::core::error::Result<Vec<u8>> {
//!     let item = shell.resolve_shell_item(Path::new(r"C:\Photos\IMG_0001.JPG"))?;
//!     let bitmap =
//!         shell.render_thumbnail(&item, ThumbnailSize::square(256), RenderOptions::default())?;
//!     encoder.encode_jpeg(&bitmap)
//! }
//! ```

use crate::core::error::Result;
use crate::shell::bitmap::ThumbnailBitmap;
use std::fmt::{self, Display};
use std::path::Path;

/// Requested thumbnail dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    /// A square `{size, size}` target, the only shape `getThumbnail` asks for
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Check whether a `width` x `height` image fits inside this box
    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

impl Display for ThumbnailSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where the shell may take the image from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThumbnailSource {
    /// Only the precomputed thumbnail cache; fail when it has nothing
    #[default]
    CacheOnly,
}

/// Options passed to `render_thumbnail`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Image source restriction
    pub source: ThumbnailSource,
}

/// Trait for shell access (item resolution and thumbnail rendering)
pub trait ShellProviderTrait: Send + Sync {
    /// The shell item handle produced by resolution
    type Item;

    /// Resolve a filesystem path to a shell item
    ///
    /// Fails with `PathNotResolved` when nothing exists at `path`.
    fn resolve_shell_item(&self, path: &Path) -> Result<Self::Item>;

    /// Ask the shell for a thumbnail of `item` sized for `size`
    ///
    /// Fails with `NoCachedThumbnail` when the cache holds nothing and
    /// `options.source` is `CacheOnly`.
    fn render_thumbnail(
        &self,
        item: &Self::Item,
        size: ThumbnailSize,
        options: RenderOptions,
    ) -> Result<ThumbnailBitmap>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Trait for bitmap-to-JPEG encoding
pub trait ImageEncoderTrait: Send + Sync {
    /// Encode `bitmap` as a JPEG byte buffer
    fn encode_jpeg(&self, bitmap: &ThumbnailBitmap) -> Result<Vec<u8>>;
}

impl<T: ShellProviderTrait + ?Sized> ShellProviderTrait for Box<T> {
    type Item = T::Item;

    fn resolve_shell_item(&self, path: &Path) -> Result<Self::Item> {
        (**self).resolve_shell_item(path)
    }

    fn render_thumbnail(
        &self,
        item: &Self::Item,
        size: ThumbnailSize,
        options: RenderOptions,
    ) -> Result<ThumbnailBitmap> {
        (**self).render_thumbnail(item, size, options)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: ImageEncoderTrait + ?Sized> ImageEncoderTrait for Box<T> {
    fn encode_jpeg(&self, bitmap: &ThumbnailBitmap) -> Result<Vec<u8>> {
        (**self).encode_jpeg(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_size() {
        let size = ThumbnailSize::square(128);
        assert_eq!(size.width, 128);
        assert_eq!(size.height, 128);
        assert_eq!(size.to_string(), "128x128");
    }

    #[test]
    fn test_size_contains() {
        let size = ThumbnailSize::square(100);
        assert!(size.contains(100, 100));
        assert!(size.contains(100, 40));
        assert!(!size.contains(101, 40));
        assert!(!size.contains(10, 101));
    }

    #[test]
    fn test_render_options_default_to_cache_only() {
        assert_eq!(RenderOptions::default().source, ThumbnailSource::CacheOnly);
    }
}
