//! Backend for platforms without a shell thumbnail cache
//!
//! Every request fails at resolution, which callers see as an extraction
//! failure.

use crate::core::error::{Result, ThumbnailError};
use crate::shell::bitmap::ThumbnailBitmap;
use crate::shell::traits::{RenderOptions, ShellProviderTrait, ThumbnailSize};
use log::debug;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedShell;

impl UnsupportedShell {
    pub fn new() -> Self {
        Self
    }
}

impl ShellProviderTrait for UnsupportedShell {
    type Item = ();

    fn resolve_shell_item(&self, path: &Path) -> Result<Self::Item> {
        debug!("no shell on this platform, cannot resolve '{}'", path.display());
        Err(ThumbnailError::UnsupportedPlatform)
    }

    fn render_thumbnail(
        &self,
        _item: &Self::Item,
        _size: ThumbnailSize,
        _options: RenderOptions,
    ) -> Result<ThumbnailBitmap> {
        Err(ThumbnailError::UnsupportedPlatform)
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_path_fails() {
        let shell = UnsupportedShell::new();
        let err = shell.resolve_shell_item(Path::new("/tmp/photo.jpg")).unwrap_err();
        assert!(matches!(err, ThumbnailError::UnsupportedPlatform));
    }
}
