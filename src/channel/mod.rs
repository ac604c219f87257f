//! Method channel module
//!
//! A framework-neutral rendition of the request/response call the host UI
//! makes: a named method with an argument value, answered with bytes, an
//! error code, or "not implemented".
//!
//! # Submodules
//!
//! - `handler` - The `getThumbnail` handler shared by every call site
//! - `registrar` - Channel registry and the standalone thumbnail plugin
//! - `host` - Window-level host serving calls as JSON lines over stdio

pub mod handler;
pub mod host;
pub mod registrar;

pub use handler::{ThumbnailChannel, METHOD_GET_THUMBNAIL};
pub use host::{ChannelHost, ServeSummary, WireRequest, WireResponse};
pub use registrar::{PluginRegistrar, ThumbnailPlugin};

use crate::core::error::{ErrorCode, ThumbnailError};
use serde_json::Value;

/// An incoming method call
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Method name, e.g. `getThumbnail`
    pub method: String,
    /// Call arguments; `getThumbnail` expects a map
    pub arguments: Option<Value>,
}

impl MethodCall {
    /// Create a call with arguments
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments: Some(arguments),
        }
    }

    /// Create a call without arguments
    pub fn without_arguments(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }
}

/// The answer to a [`MethodCall`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResponse {
    /// The call succeeded with a byte payload
    Success(Vec<u8>),
    /// The call failed
    Error { code: ErrorCode, message: String },
    /// No handler knows this method
    NotImplemented,
}

impl MethodResponse {
    /// Build an error response from a [`ThumbnailError`]
    pub fn from_error(err: &ThumbnailError) -> Self {
        MethodResponse::Error {
            code: err.code(),
            message: err.caller_message(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            MethodResponse::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Payload, if this is a success response
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            MethodResponse::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// Something that can answer method calls on a channel
pub trait MethodCallHandler: Send + Sync {
    fn handle(&self, call: &MethodCall) -> MethodResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_error() {
        let err = ThumbnailError::NoCachedThumbnail("a.jpg".to_string());
        let response = MethodResponse::from_error(&err);

        assert_eq!(response.error_code(), Some(ErrorCode::ExtractionFailed));
        assert_eq!(
            response,
            MethodResponse::Error {
                code: ErrorCode::ExtractionFailed,
                message: "Failed to extract thumbnail".to_string(),
            }
        );
        assert!(!response.is_success());
        assert!(response.payload().is_none());
    }

    #[test]
    fn test_success_payload() {
        let response = MethodResponse::Success(vec![0xFF, 0xD8]);
        assert!(response.is_success());
        assert_eq!(response.payload(), Some(&[0xFF, 0xD8][..]));
        assert_eq!(response.error_code(), None);
    }
}
