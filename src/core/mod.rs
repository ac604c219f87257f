//! Core functionality module
//!
//! This module contains the platform-independent logic: configuration,
//! error handling, request validation and the shared extractor.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types, caller-facing error codes and result aliases
//! - `extractor` - Fetch-and-encode pipeline shared by every call site
//! - `request` - `getThumbnail` argument validation

pub mod config;
pub mod error;
pub mod extractor;
pub mod request;
