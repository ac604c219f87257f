//! Thumbnail request validation
//!
//! Turns the loosely typed argument map of a `getThumbnail` call into a
//! [`ThumbnailRequest`]. Anything malformed is rejected here, before any
//! platform call is made.

use crate::core::config::{ThumbnailSettings, DEFAULT_MAX_SIZE};
use crate::core::error::{Result, ThumbnailError};
use crate::shell::traits::ThumbnailSize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Argument key holding the file path
pub const ARG_PATH: &str = "path";

/// Argument key holding the edge length
pub const ARG_SIZE: &str = "size";

/// Bounds applied while validating requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// Largest accepted edge length
    pub max_size: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl From<&ThumbnailSettings> for RequestLimits {
    fn from(settings: &ThumbnailSettings) -> Self {
        Self {
            max_size: settings.max_size,
        }
    }
}

/// A validated thumbnail request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    path: PathBuf,
    size: u32,
}

impl ThumbnailRequest {
    /// Build a request from a path and edge length
    pub fn new(path: impl Into<PathBuf>, size: i64, limits: RequestLimits) -> Result<Self> {
        let path = path.into();
        validate_path(&path)?;
        let size = validate_size(size, limits)?;
        Ok(Self { path, size })
    }

    /// Build a request from the arguments of a `getThumbnail` call
    pub fn from_arguments(arguments: Option<&Value>, limits: RequestLimits) -> Result<Self> {
        let map = arguments
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("Arguments must be a map"))?;

        let (path, size) = match (map.get(ARG_PATH), map.get(ARG_SIZE)) {
            (Some(path), Some(size)) => (path, size),
            _ => return Err(invalid("Missing path or size argument")),
        };

        let path = path
            .as_str()
            .ok_or_else(|| invalid("Argument 'path' must be a string"))?;
        let size = match (size.as_i64(), size.as_u64()) {
            (Some(size), _) => size,
            (None, Some(size)) => {
                return Err(invalid(format!(
                    "Argument 'size' must not exceed {}, got {}",
                    limits.max_size, size
                )))
            }
            (None, None) => return Err(invalid("Argument 'size' must be an integer")),
        };

        Self::new(path, size, limits)
    }

    /// File the thumbnail is for
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Requested edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Square target handed to the shell
    pub fn target_size(&self) -> ThumbnailSize {
        ThumbnailSize::square(self.size)
    }

    /// Argument map that would produce this request
    pub fn to_arguments(&self) -> Value {
        let mut map = Map::new();
        map.insert(ARG_PATH.to_string(), json!(self.path.to_string_lossy()));
        map.insert(ARG_SIZE.to_string(), json!(self.size));
        Value::Object(map)
    }
}

fn invalid(message: impl Into<String>) -> ThumbnailError {
    ThumbnailError::InvalidArguments(message.into())
}

fn validate_path(path: &Path) -> Result<()> {
    let raw = path.as_os_str();
    if raw.is_empty() {
        return Err(invalid("Argument 'path' must not be empty"));
    }
    if raw.to_string_lossy().contains('\0') {
        return Err(invalid("Argument 'path' contains a NUL character"));
    }
    Ok(())
}

fn validate_size(size: i64, limits: RequestLimits) -> Result<u32> {
    if size <= 0 {
        return Err(invalid(format!(
            "Argument 'size' must be a positive integer, got {}",
            size
        )));
    }

    match u32::try_from(size) {
        Ok(size) if size <= limits.max_size => Ok(size),
        _ => Err(invalid(format!(
            "Argument 'size' must not exceed {}, got {}",
            limits.max_size, size
        ))),
    }
}
