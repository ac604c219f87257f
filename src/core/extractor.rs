//! Thumbnail fetch-and-encode
//!
//! [`ThumbnailExtractor`] is the one place that turns a request into JPEG
//! bytes. Both call sites (the channel host and the standalone plugin) share
//! a single instance through [`ThumbnailFetcher`].
//!
//! Calls are serialized: while one extraction is running, other threads
//! calling into the same extractor wait for it to finish.

use crate::core::error::{Result, ThumbnailError};
use crate::core::request::{RequestLimits, ThumbnailRequest};
use crate::shell::traits::{ImageEncoderTrait, RenderOptions, ShellProviderTrait};
use log::{debug, warn};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Object-safe view of an extractor, used by the channel layer
pub trait ThumbnailFetcher: Send + Sync {
    /// Fetch and encode the thumbnail for a validated request
    fn fetch(&self, request: &ThumbnailRequest) -> Result<Vec<u8>>;

    /// Limits requests must satisfy before reaching [`fetch`](Self::fetch)
    fn limits(&self) -> RequestLimits;

    /// Counters collected so far
    fn stats(&self) -> ExtractorStats;
}

/// Running totals for an extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    /// Requests that reached the shell
    pub requests: u64,
    /// Requests that produced a JPEG
    pub succeeded: u64,
    /// Requests that failed after validation
    pub failed: u64,
}

#[derive(Debug, Default)]
struct StatCounters {
    requests: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> ExtractorStats {
        ExtractorStats {
            requests: self.requests.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Fetches shell thumbnails and encodes them as JPEG
pub struct ThumbnailExtractor<S, E> {
    shell: S,
    encoder: E,
    limits: RequestLimits,
    options: RenderOptions,
    gate: Mutex<()>,
    counters: StatCounters,
}

impl<S, E> ThumbnailExtractor<S, E>
where
    S: ShellProviderTrait,
    E: ImageEncoderTrait,
{
    /// Create an extractor with default limits and cache-only rendering
    pub fn new(shell: S, encoder: E) -> Self {
        Self {
            shell,
            encoder,
            limits: RequestLimits::default(),
            options: RenderOptions::default(),
            gate: Mutex::new(()),
            counters: StatCounters::default(),
        }
    }

    /// Replace the request limits
    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The shell backend in use
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Validate `path` and `size`, then fetch and encode the thumbnail
    pub fn fetch_thumbnail(&self, path: impl AsRef<Path>, size: i64) -> Result<Vec<u8>> {
        let request = ThumbnailRequest::new(path.as_ref(), size, self.limits)?;
        self.fetch_request(&request)
    }

    /// Fetch and encode the thumbnail for an already validated request
    pub fn fetch_request(&self, request: &ThumbnailRequest) -> Result<Vec<u8>> {
        let _gate = self.lock_gate();
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        match self.fetch_and_encode(request) {
            Ok(data) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "thumbnail for '{}' at {} ready: {} bytes in {:?}",
                    request.path().display(),
                    request.target_size(),
                    data.len(),
                    started.elapsed()
                );
                Ok(data)
            }
            Err(err) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "thumbnail extraction for '{}' failed: {}",
                    request.path().display(),
                    err
                );
                Err(err)
            }
        }
    }

    fn fetch_and_encode(&self, request: &ThumbnailRequest) -> Result<Vec<u8>> {
        let target = request.target_size();

        let item = self.shell.resolve_shell_item(request.path())?;
        let bitmap = self.shell.render_thumbnail(&item, target, self.options)?;
        debug!(
            "{} returned {}x{} bitmap for a {} request",
            self.shell.name(),
            bitmap.width(),
            bitmap.height(),
            target
        );

        let bitmap = bitmap.fit_within(target)?;
        let data = self.encoder.encode_jpeg(&bitmap)?;

        if data.is_empty() {
            return Err(ThumbnailError::EncodeFailed(
                "encoder returned an empty buffer".to_string(),
            ));
        }

        Ok(data)
    }

    fn lock_gate(&self) -> MutexGuard<'_, ()> {
        // The gate guards no data, so a panic in another call leaves nothing to repair.
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S, E> ThumbnailFetcher for ThumbnailExtractor<S, E>
where
    S: ShellProviderTrait,
    E: ImageEncoderTrait,
{
    fn fetch(&self, request: &ThumbnailRequest) -> Result<Vec<u8>> {
        self.fetch_request(request)
    }

    fn limits(&self) -> RequestLimits {
        self.limits
    }

    fn stats(&self) -> ExtractorStats {
        self.counters.snapshot()
    }
}
