//! Mock shell implementation for testing without Windows
//!
//! [`MockShell`] keeps an in-memory table of paths and the thumbnails the
//! "cache" holds for them, and implements the same capability traits as the
//! real Windows Shell backend.

use crate::core::error::{Result, ThumbnailError};
use crate::shell::bitmap::{fitted_dimensions, ThumbnailBitmap};
use crate::shell::traits::{
    ImageEncoderTrait, RenderOptions, ShellProviderTrait, ThumbnailSize, ThumbnailSource,
};
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A file known to the mock shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockShellItem {
    /// Path the item resolves from
    pub path: PathBuf,
    /// Dimensions of the cached thumbnail source, if the cache has one
    pub cached_thumbnail: Option<(u32, u32)>,
    /// Whether the item exposes an image factory
    pub has_image_factory: bool,
    /// Base color of the generated thumbnail
    pub color: [u8; 3],
}

impl MockShellItem {
    /// An item whose thumbnail is in the cache
    pub fn cached(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            cached_thumbnail: Some((width, height)),
            has_image_factory: true,
            color: [0x3C, 0x78, 0xD8],
        }
    }

    /// An item that exists but has nothing in the thumbnail cache
    pub fn uncached(path: impl Into<PathBuf>) -> Self {
        Self {
            cached_thumbnail: None,
            ..Self::cached(path, 1, 1)
        }
    }

    /// An item that resolves but cannot produce images at all
    pub fn without_image_factory(path: impl Into<PathBuf>) -> Self {
        Self {
            has_image_factory: false,
            ..Self::uncached(path)
        }
    }

    /// Set the base color of the generated thumbnail
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }
}

/// Counts calls into a [`MockShell`]
#[derive(Debug, Default)]
pub struct MockCallLog {
    resolves: AtomicUsize,
    renders: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    resolved: Mutex<Vec<PathBuf>>,
}

impl MockCallLog {
    /// Number of `resolve_shell_item` calls
    pub fn resolve_count(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }

    /// Number of `render_thumbnail` calls
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping resolve calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Path passed to the most recent `resolve_shell_item` call
    pub fn last_resolved(&self) -> Option<PathBuf> {
        self.resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }

    fn record(&self, path: &Path) {
        self.resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_path_buf());
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory stand-in for the Windows Shell
#[derive(Debug, Clone, Default)]
pub struct MockShell {
    items: HashMap<PathBuf, MockShellItem>,
    ignore_requested_size: bool,
    resolve_delay: Duration,
    calls: Arc<MockCallLog>,
}

impl MockShell {
    /// Create an empty mock shell
    pub fn new() -> Self {
        Self {
            resolve_delay: Duration::from_millis(2),
            ..Default::default()
        }
    }

    /// Add a file to the mock shell
    pub fn with_item(mut self, item: MockShellItem) -> Self {
        self.items.insert(item.path.clone(), item);
        self
    }

    /// Return cached thumbnails at their full size regardless of the request
    pub fn ignoring_requested_size(mut self) -> Self {
        self.ignore_requested_size = true;
        self
    }

    /// Shared handle to the call counters
    pub fn call_log(&self) -> Arc<MockCallLog> {
        Arc::clone(&self.calls)
    }

    fn generate(item: &MockShellItem, width: u32, height: u32) -> ThumbnailBitmap {
        let [r, g, b] = item.color;
        let image = RgbImage::from_fn(width, height, |x, y| {
            let shade = ((x + y) % 64) as u8;
            Rgb([r.saturating_add(shade), g, b.saturating_sub(shade)])
        });
        ThumbnailBitmap::from_rgb_image(&image)
    }
}

impl ShellProviderTrait for MockShell {
    type Item = MockShellItem;

    fn resolve_shell_item(&self, path: &Path) -> Result<Self::Item> {
        self.calls.resolves.fetch_add(1, Ordering::SeqCst);
        self.calls.record(path);
        self.calls.enter();
        if !self.resolve_delay.is_zero() {
            thread::sleep(self.resolve_delay);
        }
        let found = self.items.get(path).cloned();
        self.calls.leave();

        let item = found.ok_or_else(|| ThumbnailError::PathNotResolved {
            path: path.display().to_string(),
            message: "The system cannot find the file specified.".to_string(),
        })?;

        if !item.has_image_factory {
            return Err(ThumbnailError::ImageFactoryUnavailable(
                path.display().to_string(),
            ));
        }

        Ok(item)
    }

    fn render_thumbnail(
        &self,
        item: &Self::Item,
        size: ThumbnailSize,
        options: RenderOptions,
    ) -> Result<ThumbnailBitmap> {
        self.calls.renders.fetch_add(1, Ordering::SeqCst);

        let (width, height) = match (item.cached_thumbnail, options.source) {
            (Some(dimensions), ThumbnailSource::CacheOnly) => dimensions,
            (None, ThumbnailSource::CacheOnly) => {
                return Err(ThumbnailError::NoCachedThumbnail(
                    item.path.display().to_string(),
                ))
            }
        };

        let (width, height) = if self.ignore_requested_size {
            (width, height)
        } else {
            fitted_dimensions(width, height, size)
        };

        Ok(Self::generate(item, width, height))
    }

    fn name(&self) -> &'static str {
        "mock-shell"
    }
}

/// Encoder that always fails
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingEncoder;

impl ImageEncoderTrait for FailingEncoder {
    fn encode_jpeg(&self, _bitmap: &ThumbnailBitmap) -> Result<Vec<u8>> {
        Err(ThumbnailError::EncodeFailed(
            "simulated encoder failure".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown_paths() {
        let shell = MockShell::new().with_item(MockShellItem::cached("a.jpg", 10, 10));
        assert!(shell.resolve_shell_item(Path::new("a.jpg")).is_ok());
        assert!(matches!(
            shell.resolve_shell_item(Path::new("b.jpg")),
            Err(ThumbnailError::PathNotResolved { .. })
        ));
        assert_eq!(shell.call_log().resolve_count(), 2);
        assert_eq!(shell.call_log().last_resolved(), Some(PathBuf::from("b.jpg")));
    }

    #[test]
    fn test_missing_image_factory() {
        let shell = MockShell::new().with_item(MockShellItem::without_image_factory("x.lnk"));
        assert!(matches!(
            shell.resolve_shell_item(Path::new("x.lnk")),
            Err(ThumbnailError::ImageFactoryUnavailable(_))
        ));
    }

    #[test]
    fn test_render_scales_to_request() {
        let shell = MockShell::new().with_item(MockShellItem::cached("wide.jpg", 800, 200));
        let item = shell.resolve_shell_item(Path::new("wide.jpg")).unwrap();
        let bitmap = shell
            .render_thumbnail(&item, ThumbnailSize::square(100), RenderOptions::default())
            .unwrap();

        assert_eq!((bitmap.width(), bitmap.height()), (100, 25));
        assert_eq!(shell.call_log().render_count(), 1);
    }

    #[test]
    fn test_render_without_cache_entry() {
        let shell = MockShell::new().with_item(MockShellItem::uncached("doc.txt"));
        let item = shell.resolve_shell_item(Path::new("doc.txt")).unwrap();
        let err = shell
            .render_thumbnail(&item, ThumbnailSize::square(64), RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, ThumbnailError::NoCachedThumbnail(_)));
    }

    #[test]
    fn test_failing_encoder() {
        let bitmap = ThumbnailBitmap::from_bgra(1, 1, vec![0, 0, 0, 255]).unwrap();
        assert!(FailingEncoder.encode_jpeg(&bitmap).is_err());
    }
}
