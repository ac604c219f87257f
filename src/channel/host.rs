//! Window-level channel host
//!
//! The host owns the imaging session for its whole lifetime and answers
//! method calls arriving as JSON lines, one response line per request:
//!
//! ```text
//! -> {"id":1,"method":"getThumbnail","arguments":{"path":"C:\\a.jpg","size":256}}
//! <- {"status":"success","id":1,"data":"/9j/4AAQ..."}
//! <- {"status":"error","id":1,"code":"EXTRACTION_FAILED","message":"Failed to extract thumbnail"}
//! <- {"status":"notImplemented","id":1}
//! ```
//!
//! `channel` may be given per request; it defaults to the host's channel.

use crate::channel::handler::ThumbnailChannel;
use crate::channel::registrar::PluginRegistrar;
use crate::channel::{MethodCall, MethodResponse};
use crate::core::error::{ErrorCode, Result};
use crate::core::extractor::{ExtractorStats, ThumbnailFetcher};
use crate::shell::session::ImagingSession;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One request line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Caller-chosen id echoed in the response
    #[serde(default)]
    pub id: Value,
    /// Target channel; the host's own channel when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Method name
    pub method: String,
    /// Method arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// One response line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WireResponse {
    Success { id: Value, data: String },
    Error { id: Value, code: String, message: String },
    NotImplemented { id: Value },
}

impl WireResponse {
    /// Wrap a [`MethodResponse`] for the wire, base64-encoding bytes
    pub fn from_response(id: Value, response: MethodResponse) -> Self {
        match response {
            MethodResponse::Success(data) => WireResponse::Success {
                id,
                data: STANDARD.encode(data),
            },
            MethodResponse::Error { code, message } => WireResponse::Error {
                id,
                code: code.as_str().to_string(),
                message,
            },
            MethodResponse::NotImplemented => WireResponse::NotImplemented { id },
        }
    }

    /// Turn a wire response back into a [`MethodResponse`]
    pub fn into_response(self) -> std::result::Result<MethodResponse, String> {
        match self {
            WireResponse::Success { data, .. } => STANDARD
                .decode(data)
                .map(MethodResponse::Success)
                .map_err(|e| format!("invalid base64 payload: {}", e)),
            WireResponse::Error { code, message, .. } => ErrorCode::from_wire(&code)
                .map(|code| MethodResponse::Error { code, message })
                .ok_or_else(|| format!("unknown error code '{}'", code)),
            WireResponse::NotImplemented { .. } => Ok(MethodResponse::NotImplemented),
        }
    }

    /// The id this response answers
    pub fn id(&self) -> &Value {
        match self {
            WireResponse::Success { id, .. }
            | WireResponse::Error { id, .. }
            | WireResponse::NotImplemented { id } => id,
        }
    }
}

/// Summary of a finished [`ChannelHost::serve`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Request lines answered
    pub handled: u64,
    /// Lines that could not be parsed
    pub malformed: u64,
    /// Whether the loop ended because shutdown was requested
    pub interrupted: bool,
}

/// Window-level call site: imaging session plus a registrar
pub struct ChannelHost {
    registrar: PluginRegistrar,
    channel_name: String,
    fetcher: Arc<dyn ThumbnailFetcher>,
    // Dropped last so every handler is gone before the imaging subsystem stops.
    _session: ImagingSession,
}

impl ChannelHost {
    /// Create the host and register the thumbnail handler on `channel_name`
    pub fn new(
        session: ImagingSession,
        fetcher: Arc<dyn ThumbnailFetcher>,
        channel_name: impl Into<String>,
    ) -> Self {
        let channel_name = channel_name.into();
        let mut registrar = PluginRegistrar::new();
        registrar.set_method_call_handler(
            channel_name.clone(),
            Arc::new(ThumbnailChannel::new(Arc::clone(&fetcher))),
        );

        info!("Channel host ready on '{}'", channel_name);

        Self {
            registrar,
            channel_name,
            fetcher,
            _session: session,
        }
    }

    /// Channel the thumbnail handler answers on
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Extractor counters
    pub fn stats(&self) -> ExtractorStats {
        self.fetcher.stats()
    }

    /// Answer a single call on `channel`
    pub fn call(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        self.registrar.dispatch(channel, call)
    }

    /// Answer one request line
    pub fn handle_line(&self, line: &str) -> WireResponse {
        match serde_json::from_str::<WireRequest>(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => malformed(e),
        }
    }

    fn handle_request(&self, request: WireRequest) -> WireResponse {
        let channel = request
            .channel
            .unwrap_or_else(|| self.channel_name.clone());
        let call = MethodCall {
            method: request.method,
            arguments: request.arguments,
        };

        let response = self.call(&channel, &call);
        WireResponse::from_response(request.id, response)
    }

    /// Serve requests from `reader` until EOF or until `shutdown` is set
    ///
    /// `shutdown` is checked before every read, so a request already read is
    /// always answered before the loop stops. A read that is blocked waiting
    /// for input only notices `shutdown` once the next line or EOF arrives.
    /// Lines that are not UTF-8 or not a valid request are answered with
    /// `INVALID_ARGS` and serving continues.
    pub fn serve<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
        shutdown: &AtomicBool,
    ) -> Result<ServeSummary> {
        let mut summary = ServeSummary::default();
        let mut buf = Vec::new();

        loop {
            if shutdown.load(Ordering::SeqCst) {
                summary.interrupted = true;
                break;
            }

            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let response = match parse_line(&buf) {
                Ok(None) => continue,
                Ok(Some(request)) => self.handle_request(request),
                Err(reason) => {
                    summary.malformed += 1;
                    malformed(reason)
                }
            };
            summary.handled += 1;

            serde_json::to_writer(&mut writer, &response).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        info!(
            "Channel host stopped after {} request(s) ({} malformed)",
            summary.handled, summary.malformed
        );
        Ok(summary)
    }
}

/// Decode one raw line; `Ok(None)` for blank lines
fn parse_line(raw: &[u8]) -> std::result::Result<Option<WireRequest>, String> {
    let text =
        std::str::from_utf8(raw).map_err(|e| format!("line is not valid UTF-8 ({})", e))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(text).map(Some).map_err(|e| e.to_string())
}

fn malformed(reason: impl Display) -> WireResponse {
    debug!("malformed request line: {}", reason);
    WireResponse::Error {
        id: Value::Null,
        code: ErrorCode::InvalidArgs.as_str().to_string(),
        message: format!("Malformed request: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::handler::METHOD_GET_THUMBNAIL;
    use crate::core::config::DEFAULT_CHANNEL_NAME;
    use crate::core::extractor::ThumbnailExtractor;
    use crate::shell::encoder::{is_jpeg, JpegThumbnailEncoder};
    use crate::testdb::mock_shell::{MockShell, MockShellItem};
    use serde_json::json;
    use std::io::Cursor;

    fn host() -> ChannelHost {
        let shell = MockShell::new()
            .with_item(MockShellItem::cached(r"C:\Photos\IMG_0001.JPG", 800, 600));
        let extractor = ThumbnailExtractor::new(shell, JpegThumbnailEncoder::new().unwrap());
        ChannelHost::new(
            ImagingSession::start().unwrap(),
            Arc::new(extractor),
            DEFAULT_CHANNEL_NAME,
        )
    }

    fn request_line(id: u64, method: &str, arguments: Value) -> String {
        serde_json::to_string(&WireRequest {
            id: json!(id),
            channel: None,
            method: method.to_string(),
            arguments: Some(arguments),
        })
        .unwrap()
    }

    #[test]
    fn test_handle_line_success() {
        let host = host();
        let line = request_line(
            7,
            METHOD_GET_THUMBNAIL,
            json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 200 }),
        );

        let response = host.handle_line(&line);
        assert_eq!(response.id(), &json!(7));

        let decoded = response.into_response().unwrap();
        assert!(is_jpeg(decoded.payload().unwrap()));
    }

    #[test]
    fn test_handle_line_errors() {
        let host = host();

        let missing = host.handle_line(&request_line(
            1,
            METHOD_GET_THUMBNAIL,
            json!({ "path": "x" }),
        ));
        assert_eq!(
            missing,
            WireResponse::Error {
                id: json!(1),
                code: "INVALID_ARGS".to_string(),
                message: "Missing path or size argument".to_string(),
            }
        );

        let unresolved = host.handle_line(&request_line(
            2,
            METHOD_GET_THUMBNAIL,
            json!({ "path": r"C:\nowhere.jpg", "size": 64 }),
        ));
        assert!(matches!(
            unresolved,
            WireResponse::Error { ref code, .. } if code == "EXTRACTION_FAILED"
        ));

        let unknown = host.handle_line(&request_line(3, "listThumbnails", json!({})));
        assert_eq!(unknown, WireResponse::NotImplemented { id: json!(3) });
    }

    #[test]
    fn test_handle_line_other_channel() {
        let host = host();
        let line = json!({
            "id": "abc",
            "channel": "com.example/unknown",
            "method": METHOD_GET_THUMBNAIL,
            "arguments": { "path": r"C:\Photos\IMG_0001.JPG", "size": 64 }
        })
        .to_string();

        assert_eq!(
            host.handle_line(&line),
            WireResponse::NotImplemented { id: json!("abc") }
        );
    }

    #[test]
    fn test_handle_line_malformed_json() {
        let host = host();
        match host.handle_line("{not json") {
            WireResponse::Error { id, code, message } => {
                assert_eq!(id, Value::Null);
                assert_eq!(code, "INVALID_ARGS");
                assert!(message.starts_with("Malformed request"));
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_serve_answers_every_line() {
        let host = host();
        let input = [
            request_line(
                1,
                METHOD_GET_THUMBNAIL,
                json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 32 }),
            ),
            String::new(),
            "garbage".to_string(),
            request_line(2, "nope", json!(null)),
        ]
        .join("\n");

        let mut output = Vec::new();
        let shutdown = AtomicBool::new(false);
        let summary = host
            .serve(Cursor::new(input), &mut output, &shutdown)
            .unwrap();

        assert_eq!(summary.handled, 3);
        assert_eq!(summary.malformed, 1);
        assert!(!summary.interrupted);

        let responses: Vec<WireResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert!(matches!(responses[0], WireResponse::Success { .. }));
        assert!(matches!(responses[1], WireResponse::Error { .. }));
        assert_eq!(responses[2], WireResponse::NotImplemented { id: json!(2) });
        assert_eq!(host.stats().succeeded, 1);
    }

    #[test]
    fn test_serve_survives_invalid_utf8() {
        let host = host();
        let mut input = request_line(1, "nope", json!({})).into_bytes();
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(
            request_line(
                3,
                METHOD_GET_THUMBNAIL,
                json!({ "path": r"C:\Photos\IMG_0001.JPG", "size": 16 }),
            )
            .as_bytes(),
        );
        input.push(b'\n');

        let mut output = Vec::new();
        let shutdown = AtomicBool::new(false);
        let summary = host
            .serve(Cursor::new(input), &mut output, &shutdown)
            .unwrap();

        assert_eq!(summary.handled, 3);
        assert_eq!(summary.malformed, 1);

        let responses: Vec<WireResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses[0], WireResponse::NotImplemented { id: json!(1) });
        match &responses[1] {
            WireResponse::Error { id, code, message } => {
                assert_eq!(id, &Value::Null);
                assert_eq!(code, "INVALID_ARGS");
                assert!(message.contains("UTF-8"));
            }
            other => panic!("unexpected response {:?}", other),
        }
        assert!(matches!(
            responses[2],
            WireResponse::Success { ref id, .. } if id == &json!(3)
        ));
    }

    #[test]
    fn test_serve_stops_on_shutdown_without_reading() {
        let host = host();
        let input = request_line(9, "nope", json!({}));
        let shutdown = AtomicBool::new(true);

        let mut reader = Cursor::new(input);
        let mut output = Vec::new();
        let summary = host.serve(&mut reader, &mut output, &shutdown).unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.handled, 0);
        assert!(output.is_empty());
        assert_eq!(reader.position(), 0);
    }

    /// Writer that raises the shutdown flag on its first write
    struct StopOnWrite<'a> {
        shutdown: &'a AtomicBool,
        output: Vec<u8>,
    }

    impl Write for StopOnWrite<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.shutdown.store(true, Ordering::SeqCst);
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_serve_answers_current_request_before_stopping() {
        let host = host();
        let input = [
            request_line(1, "nope", json!({})),
            request_line(2, "nope", json!({})),
        ]
        .join("\n");

        let shutdown = AtomicBool::new(false);
        let mut writer = StopOnWrite {
            shutdown: &shutdown,
            output: Vec::new(),
        };
        let summary = host
            .serve(Cursor::new(input), &mut writer, &shutdown)
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.handled, 1);

        let responses: Vec<WireResponse> = String::from_utf8(writer.output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses, vec![WireResponse::NotImplemented { id: json!(1) }]);
    }

    #[test]
    fn test_wire_response_roundtrip_codes() {
        let wire = WireResponse::from_response(
            json!(5),
            MethodResponse::Error {
                code: ErrorCode::ExtractionFailed,
                message: "Failed to extract thumbnail".to_string(),
            },
        );
        let text = serde_json::to_string(&wire).unwrap();
        assert!(text.contains("\"status\":\"error\""));
        assert!(text.contains("\"code\":\"EXTRACTION_FAILED\""));

        let not_implemented =
            serde_json::to_string(&WireResponse::NotImplemented { id: json!(1) }).unwrap();
        assert!(not_implemented.contains("\"status\":\"notImplemented\""));
    }
}
