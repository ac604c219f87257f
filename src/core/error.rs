//! Error types for the thumbnail extractor
//!
//! Every failure carries its own variant so the cause can be logged, but the
//! caller of `getThumbnail` only ever sees one of two [`ErrorCode`]s.

use std::fmt;
use thiserror::Error;

/// Main error type for thumbnail extraction
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// The request was missing fields or carried values of the wrong type
    #[error("{0}")]
    InvalidArguments(String),

    /// The path could not be turned into a shell item
    #[error("Could not resolve '{path}': {message}")]
    PathNotResolved { path: String, message: String },

    /// The shell item does not expose an image factory
    #[error("Image factory unavailable for '{0}'")]
    ImageFactoryUnavailable(String),

    /// The thumbnail cache holds nothing for this item
    #[error("No cached thumbnail for '{0}'")]
    NoCachedThumbnail(String),

    /// The shell returned a bitmap we could not read
    #[error("Failed to render thumbnail: {0}")]
    RenderFailed(String),

    /// JPEG encoding failed
    #[error("Failed to encode thumbnail: {0}")]
    EncodeFailed(String),

    /// COM library initialization failed
    #[error("COM initialization failed: {0}")]
    ComError(String),

    /// The current platform has no shell thumbnail cache
    #[error("Shell thumbnails are not supported on this platform")]
    UnsupportedPlatform,

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[from] windows::core::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ThumbnailError>;

impl From<std::io::Error> for ThumbnailError {
    fn from(err: std::io::Error) -> Self {
        ThumbnailError::IoError(err.to_string())
    }
}

impl From<image::ImageError> for ThumbnailError {
    fn from(err: image::ImageError) -> Self {
        ThumbnailError::EncodeFailed(err.to_string())
    }
}

/// Error category reported to the caller of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed request, nothing was attempted
    InvalidArgs,
    /// Any failure after the request was accepted
    ExtractionFailed,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgs => "INVALID_ARGS",
            ErrorCode::ExtractionFailed => "EXTRACTION_FAILED",
        }
    }

    /// Parse a wire code back into an [`ErrorCode`]
    pub fn from_wire(code: &str) -> Option<Self> {
        match code {
            "INVALID_ARGS" => Some(ErrorCode::InvalidArgs),
            "EXTRACTION_FAILED" => Some(ErrorCode::ExtractionFailed),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message shown to the caller for every extraction failure
pub const EXTRACTION_FAILED_MESSAGE: &str = "Failed to extract thumbnail";

impl ThumbnailError {
    /// Category this error is reported under
    pub fn code(&self) -> ErrorCode {
        match self {
            ThumbnailError::InvalidArguments(_) => ErrorCode::InvalidArgs,
            _ => ErrorCode::ExtractionFailed,
        }
    }

    /// Message safe to hand back to the caller
    ///
    /// Argument errors explain themselves; extraction failures collapse to a
    /// single generic message.
    pub fn caller_message(&self) -> String {
        match self {
            ThumbnailError::InvalidArguments(message) => message.clone(),
            _ => EXTRACTION_FAILED_MESSAGE.to_string(),
        }
    }
}
