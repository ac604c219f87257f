//! Shell interaction module
//!
//! Everything that talks to the operating system's thumbnail machinery, kept
//! behind the traits in [`traits`] so the extractor can be tested with fakes.
//!
//! # Submodules
//!
//! - `traits` - Capability traits (`resolve_shell_item`, `render_thumbnail`, `encode_jpeg`)
//! - `bitmap` - Platform-neutral BGRA bitmap and downscaling
//! - `encoder` - JPEG encoding via the `image` crate
//! - `session` - Process-lifetime imaging session (RAII)
//! - `win_shell` - Windows Shell backend (Windows only)
//! - `unsupported` - Backend used on every other platform

pub mod bitmap;
pub mod encoder;
pub mod session;
pub mod traits;
pub mod unsupported;
#[cfg(windows)]
pub mod win_shell;

pub use bitmap::ThumbnailBitmap;
pub use encoder::{is_jpeg, JpegThumbnailEncoder, JPEG_MAGIC, JPEG_MIME_TYPE};
pub use session::ImagingSession;
pub use traits::{
    ImageEncoderTrait, RenderOptions, ShellProviderTrait, ThumbnailSize, ThumbnailSource,
};
pub use unsupported::UnsupportedShell;
#[cfg(windows)]
pub use win_shell::{initialize_com, ComGuard, WindowsShell};

/// The shell backend for the platform this crate was built for
#[cfg(windows)]
pub type PlatformShell = WindowsShell;

/// The shell backend for the platform this crate was built for
#[cfg(not(windows))]
pub type PlatformShell = UnsupportedShell;

/// Create the platform's shell backend
pub fn platform_shell() -> PlatformShell {
    PlatformShell::new()
}
