//! The `getThumbnail` method handler

use crate::channel::{MethodCall, MethodCallHandler, MethodResponse};
use crate::core::extractor::ThumbnailFetcher;
use crate::core::request::ThumbnailRequest;
use log::debug;
use std::sync::Arc;

/// Method name the host calls
pub const METHOD_GET_THUMBNAIL: &str = "getThumbnail";

/// Answers `getThumbnail` calls using a shared extractor
#[derive(Clone)]
pub struct ThumbnailChannel {
    fetcher: Arc<dyn ThumbnailFetcher>,
}

impl ThumbnailChannel {
    pub fn new(fetcher: Arc<dyn ThumbnailFetcher>) -> Self {
        Self { fetcher }
    }

    /// The extractor behind this channel
    pub fn fetcher(&self) -> &Arc<dyn ThumbnailFetcher> {
        &self.fetcher
    }

    fn get_thumbnail(&self, call: &MethodCall) -> MethodResponse {
        let request =
            match ThumbnailRequest::from_arguments(call.arguments.as_ref(), self.fetcher.limits()) {
                Ok(request) => request,
                Err(err) => {
                    debug!("rejected {} call: {}", METHOD_GET_THUMBNAIL, err);
                    return MethodResponse::from_error(&err);
                }
            };

        match self.fetcher.fetch(&request) {
            Ok(data) => MethodResponse::Success(data),
            Err(err) => MethodResponse::from_error(&err),
        }
    }
}

impl MethodCallHandler for ThumbnailChannel {
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            METHOD_GET_THUMBNAIL => self.get_thumbnail(call),
            other => {
                debug!("method '{}' not implemented", other);
                MethodResponse::NotImplemented
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCode;
    use crate::core::extractor::ThumbnailExtractor;
    use crate::shell::encoder::{is_jpeg, JpegThumbnailEncoder};
    use crate::testdb::mock_shell::{MockShell, MockShellItem};
    use serde_json::json;

    fn channel() -> (ThumbnailChannel, Arc<crate::testdb::mock_shell::MockCallLog>) {
        let shell = MockShell::new()
            .with_item(MockShellItem::cached(r"C:\Photos\IMG_0001.JPG", 1920, 1080))
            .with_item(MockShellItem::uncached(r"C:\Docs\readme.md"));
        let calls = shell.call_log();
        let extractor = ThumbnailExtractor::new(shell, JpegThumbnailEncoder::new().unwrap());
        (ThumbnailChannel::new(Arc::new(extractor)), calls)
    }

    #[test]
    fn test_get_thumbnail_success() {
        let (channel, _) = channel();
        let response = channel.handle(&MethodCall::new(
            METHOD_GET_THUMBNAIL,
            json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 128 }),
        ));

        let data = response.payload().expect("success payload");
        assert!(is_jpeg(data));
    }

    #[test]
    fn test_missing_arguments_fail_fast() {
        let (channel, calls) = channel();

        let response = channel.handle(&MethodCall::new(METHOD_GET_THUMBNAIL, json!({ "size": 1 })));
        assert_eq!(
            response,
            MethodResponse::Error {
                code: ErrorCode::InvalidArgs,
                message: "Missing path or size argument".to_string(),
            }
        );

        let response = channel.handle(&MethodCall::without_arguments(METHOD_GET_THUMBNAIL));
        assert_eq!(response.error_code(), Some(ErrorCode::InvalidArgs));
        assert_eq!(calls.resolve_count(), 0);
    }

    #[test]
    fn test_extraction_failures_share_one_message() {
        let (channel, _) = channel();

        for path in [r"C:\Photos\gone.jpg", r"C:\Docs\readme.md"] {
            let response = channel.handle(&MethodCall::new(
                METHOD_GET_THUMBNAIL,
                json!({ "path": path, "size": 64 }),
            ));
            assert_eq!(
                response,
                MethodResponse::Error {
                    code: ErrorCode::ExtractionFailed,
                    message: "Failed to extract thumbnail".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let (channel, calls) = channel();
        let response = channel.handle(&MethodCall::new(
            "getPreview",
            json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 128 }),
        ));

        assert_eq!(response, MethodResponse::NotImplemented);
        assert_eq!(calls.resolve_count(), 0);
    }

    #[test]
    fn test_method_name_is_case_sensitive() {
        let (channel, _) = channel();
        let response = channel.handle(&MethodCall::new(
            "GetThumbnail",
            json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 128 }),
        ));
        assert_eq!(response, MethodResponse::NotImplemented);
    }
}
