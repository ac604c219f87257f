//! CLI module for the thumbnail tool
//!
//! # Submodules
//!
//! - `args` - Command-line argument definitions using clap
//! - `commands` - Command handler implementations
//! - `output` - Byte formatting and the console + file log writer

pub mod args;
pub mod commands;
pub mod output;

pub use args::{Args, Commands};
pub use commands::run_command;
pub use output::DualWriter;
