//! Command-line argument definitions
//!
//! This module defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Fetch cached Windows Shell thumbnails as JPEG
#[derive(Parser, Debug)]
#[command(name = "shell-thumbnail")]
#[command(version = "1.0.0")]
#[command(about = "Serve cached Windows Shell thumbnails as JPEG over a method channel", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Channel name the thumbnail handler is registered on (overrides config)
    #[arg(long, global = true)]
    pub channel: Option<String>,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the cached thumbnail of one file and write it as JPEG
    Get {
        /// File to fetch the thumbnail for
        path: PathBuf,

        /// Bounding box edge in pixels (defaults to thumbnail.default_size)
        #[arg(short, long)]
        size: Option<i64>,

        /// Where to write the JPEG (defaults to <name>.thumb.jpg next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve getThumbnail calls as JSON lines on stdin/stdout
    ///
    /// Each input line is a request such as
    /// {"id": 1, "method": "getThumbnail", "arguments": {"path": "C:\\a.jpg", "size": 256}}
    /// and each output line is the matching response.
    Serve,

    /// Show or reset the configuration file
    ///
    /// The config file is stored at:
    /// - Windows: %APPDATA%\shell_thumbnail\config.toml
    /// - Linux/macOS: ~/.config/shell_thumbnail/config.toml
    Config {
        /// Show the config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults (creates a fresh config file)
        #[arg(long)]
        reset: bool,
    },

    /// Generate a configuration file at a specific location
    GenerateConfig {
        /// Output path for the config file (defaults to standard location)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration
    ShowConfig,

    /// Run getThumbnail scenarios against the mock shell (no Windows required)
    Test {
        /// Scenario names to run (comma-separated or repeated); all when omitted
        #[arg(short, long = "name", value_delimiter = ',')]
        names: Vec<String>,

        /// Print each scenario and a summary
        #[arg(short, long)]
        verbose: bool,

        /// Stop on first failure
        #[arg(long)]
        fail_fast: bool,

        /// Run only the scenarios tagged "quick"
        #[arg(short, long)]
        quick: bool,

        /// List available scenarios instead of running them
        #[arg(long)]
        list: bool,
    },
}

/// Default output path for `get`: `<stem>.thumb.jpg` beside the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail".to_string());
    input.with_file_name(format!("{}.thumb.jpg", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let args = Args::parse_from([
            "shell-thumbnail",
            "get",
            "photo.jpg",
            "-s",
            "128",
            "--log-level",
            "debug",
        ]);

        match args.command {
            Some(Commands::Get { path, size, output }) => {
                assert_eq!(path, PathBuf::from("photo.jpg"));
                assert_eq!(size, Some(128));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_test_names() {
        let args = Args::parse_from(["shell-thumbnail", "test", "--name", "a,b", "-n", "c"]);
        match args.command {
            Some(Commands::Test { names, .. }) => assert_eq!(names, vec!["a", "b", "c"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_test_quick() {
        let args = Args::parse_from(["shell-thumbnail", "test", "--quick"]);
        match args.command {
            Some(Commands::Test { quick, names, .. }) => {
                assert!(quick);
                assert!(names.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_output_path() {
        let out = default_output_path(Path::new("dir/IMG_0001.JPG"));
        assert_eq!(out, Path::new("dir").join("IMG_0001.thumb.jpg"));
    }
}
