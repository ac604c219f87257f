//! Channel registry and the standalone thumbnail plugin
//!
//! [`PluginRegistrar`] routes calls by channel name. [`ThumbnailPlugin`] is
//! the plugin-style call site: it registers a [`ThumbnailChannel`] on a
//! registrar it is handed, sharing the extractor it is given.

use crate::channel::handler::ThumbnailChannel;
use crate::channel::{MethodCall, MethodCallHandler, MethodResponse};
use crate::core::extractor::ThumbnailFetcher;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Routes method calls to the handler registered for their channel
#[derive(Default, Clone)]
pub struct PluginRegistrar {
    handlers: HashMap<String, Arc<dyn MethodCallHandler>>,
}

impl PluginRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` on `channel`, replacing any previous handler
    pub fn set_method_call_handler(
        &mut self,
        channel: impl Into<String>,
        handler: Arc<dyn MethodCallHandler>,
    ) {
        let channel = channel.into();
        if self.handlers.insert(channel.clone(), handler).is_some() {
            warn!("replaced existing handler on channel '{}'", channel);
        } else {
            debug!("registered handler on channel '{}'", channel);
        }
    }

    /// Remove the handler for `channel`
    pub fn remove_handler(&mut self, channel: &str) -> bool {
        self.handlers.remove(channel).is_some()
    }

    /// Check whether `channel` has a handler
    pub fn has_channel(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    /// Registered channel names, sorted
    pub fn channels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Deliver `call` to the handler on `channel`
    ///
    /// Calls on a channel nobody registered are answered with
    /// [`MethodResponse::NotImplemented`].
    pub fn dispatch(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        match self.handlers.get(channel) {
            Some(handler) => handler.handle(call),
            None => {
                debug!("no handler on channel '{}' for '{}'", channel, call.method);
                MethodResponse::NotImplemented
            }
        }
    }
}

/// Standalone plugin exposing `getThumbnail`
pub struct ThumbnailPlugin {
    channel: ThumbnailChannel,
}

impl ThumbnailPlugin {
    /// Create the plugin around a shared extractor
    pub fn new(fetcher: Arc<dyn ThumbnailFetcher>) -> Self {
        Self {
            channel: ThumbnailChannel::new(fetcher),
        }
    }

    /// Create the plugin and register it on `registrar` under `channel_name`
    pub fn register_with_registrar(
        registrar: &mut PluginRegistrar,
        fetcher: Arc<dyn ThumbnailFetcher>,
        channel_name: &str,
    ) {
        let plugin = Arc::new(Self::new(fetcher));
        registrar.set_method_call_handler(channel_name, plugin);
        info!("Thumbnail plugin registered on '{}'", channel_name);
    }
}

impl MethodCallHandler for ThumbnailPlugin {
    fn handle(&self, call: &MethodCall) -> MethodResponse {
        self.channel.handle(call)
    }
}
