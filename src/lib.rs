//! Shell Thumbnail Library
//!
//! Fetches the thumbnail Windows Explorer already has cached for a file and
//! returns it as JPEG bytes. The thumbnail is requested from the Windows Shell
//! image factory in cache-only mode, so nothing is generated on demand: files
//! without a cached thumbnail fail instead of being decoded.
//!
//! # Architecture
//!
//! - [`core`] - Configuration, errors, request validation and the extractor
//! - [`shell`] - Windows Shell backend, bitmaps, JPEG encoding, imaging session
//! - [`channel`] - The `getThumbnail` method channel and its two call sites
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - Mock shell and scenarios for testing without Windows
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use shell_thumbnail::core::extractor::ThumbnailExtractor;
//! use shell_thumbnail::shell::{platform_shell, ImagingSession, JpegThumbnailEncoder};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _session = ImagingSession::start()?;
//!     let extractor = ThumbnailExtractor::new(platform_shell(), JpegThumbnailEncoder::new()?);
//!
//!     let jpeg = extractor.fetch_thumbnail(r"C:\Users\Public\Pictures\photo.jpg", 256)?;
//!     std::fs::write("photo.thumb.jpg", jpeg)?;
//!     Ok(())
//! }
//! ```
//!
//! # Method Channel
//!
//! ```rust,no_run
//! use shell_thumbnail::channel::{MethodCall, PluginRegistrar, ThumbnailPlugin};
//! use shell_thumbnail::core::extractor::{ThumbnailExtractor, ThumbnailFetcher};
//! use shell_thumbnail::shell::{platform_shell, JpegThumbnailEncoder};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fetcher: Arc<dyn ThumbnailFetcher> =
//!     Arc::new(ThumbnailExtractor::new(platform_shell(), JpegThumbnailEncoder::new()?));
//!
//! let mut registrar = PluginRegistrar::new();
//! ThumbnailPlugin::register_with_registrar(&mut registrar, fetcher, "com.mymeta/thumbnail");
//!
//! let response = registrar.dispatch(
//!     "com.mymeta/thumbnail",
//!     &MethodCall::new("getThumbnail", json!({ "path": r"C:\a.jpg", "size": 128 })),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Platform Support
//!
//! Thumbnails are only available on Windows. On other platforms the shell
//! backend reports every request as an extraction failure, while the channel,
//! CLI and mock scenarios work everywhere.

pub mod channel;
pub mod cli;
pub mod core;
pub mod shell;
pub mod testdb;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
