//! Command handler implementations
//!
//! This module contains the implementation of all CLI commands.

use crate::channel::ChannelHost;
use crate::cli::args::default_output_path;
use crate::cli::output::format_bytes;
use crate::cli::{Args, Commands};
use crate::core::config::{init_config, Config};
use crate::core::error::{ErrorCode, EXTRACTION_FAILED_MESSAGE};
use crate::core::extractor::{ThumbnailExtractor, ThumbnailFetcher};
use crate::core::request::RequestLimits;
use crate::shell::traits::{ImageEncoderTrait, ShellProviderTrait};
use crate::shell::{platform_shell, ImagingSession, JpegThumbnailEncoder, PlatformShell};
use crate::testdb::{self, ScenarioLibrary, TestRunner, TestRunnerConfig};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Run the appropriate command based on CLI arguments
///
/// Without a subcommand the tool serves the channel, which is how a host
/// application launches it.
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    match &args.command {
        Some(Commands::Get { path, size, output }) => {
            get_thumbnail(config, path, *size, output.clone())?;
        }
        Some(Commands::Serve) | None => {
            serve(config, &shutdown_flag)?;
        }
        Some(Commands::Config { path, reset }) => {
            handle_config_command(*path, *reset)?;
        }
        Some(Commands::GenerateConfig { output }) => {
            generate_config_file(output.clone())?;
        }
        Some(Commands::ShowConfig) => {
            show_config(config);
        }
        Some(Commands::Test {
            names,
            verbose,
            fail_fast,
            quick,
            list,
        }) => {
            if *list {
                testdb::print_available_scenarios();
            } else {
                run_scenarios(names, *quick, *verbose, *fail_fast)?;
            }
        }
    }

    Ok(())
}

/// Build the extractor for this platform from the configuration
pub fn build_extractor(
    config: &Config,
) -> Result<ThumbnailExtractor<PlatformShell, JpegThumbnailEncoder>> {
    let encoder = JpegThumbnailEncoder::with_quality(config.thumbnail.effective_quality())
        .context("JPEG encoder unavailable")?;

    Ok(ThumbnailExtractor::new(platform_shell(), encoder)
        .with_limits(RequestLimits::from(&config.thumbnail)))
}

/// Fetch one thumbnail and write it to disk
pub fn get_thumbnail(
    config: &Config,
    path: &Path,
    size: Option<i64>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let _session = ImagingSession::start().context("Failed to start imaging session")?;
    let extractor = build_extractor(config)?;

    let size = size.unwrap_or_else(|| i64::from(config.thumbnail.default_size));
    let output = output.unwrap_or_else(|| default_output_path(path));

    write_thumbnail(&extractor, path, size, &output)?;
    Ok(output)
}

/// Fetch the thumbnail of `path` with `extractor` and write it to `output`
///
/// Relative paths are made absolute against the current directory first,
/// since the shell parses names without a working directory of its own.
pub fn write_thumbnail<S, E>(
    extractor: &ThumbnailExtractor<S, E>,
    path: &Path,
    size: i64,
    output: &Path,
) -> Result<usize>
where
    S: ShellProviderTrait,
    E: ImageEncoderTrait,
{
    let path = absolute_path(path)?;
    info!(
        "Fetching {}px thumbnail for {} via {}",
        size,
        path.display(),
        extractor.shell().name()
    );
    let started = Instant::now();

    let data = extractor.fetch_thumbnail(&path, size).map_err(|e| match e.code() {
        ErrorCode::InvalidArgs => anyhow::Error::new(e),
        ErrorCode::ExtractionFailed => anyhow::Error::new(e).context(EXTRACTION_FAILED_MESSAGE),
    })?;

    fs::write(output, &data)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({}) in {:.1}ms",
        output.display(),
        format_bytes(data.len() as u64),
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(data.len())
}

/// Make `path` absolute without touching the filesystem
///
/// An empty path is returned unchanged so request validation can reject it.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path).with_context(|| format!("Failed to resolve {}", path.display()))
}

/// Serve the channel over stdin/stdout until EOF or Ctrl+C
pub fn serve(config: &Config, shutdown_flag: &AtomicBool) -> Result<()> {
    let session = ImagingSession::start().context("Failed to start imaging session")?;
    let fetcher: Arc<dyn ThumbnailFetcher> = Arc::new(build_extractor(config)?);
    let host = ChannelHost::new(session, fetcher, config.channel.name.clone());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = host.serve(stdin.lock(), stdout.lock(), shutdown_flag)?;

    let stats = host.stats();
    info!(
        "Served {} line(s): {} thumbnail(s), {} failure(s), {} malformed",
        summary.handled, stats.succeeded, stats.failed, summary.malformed
    );
    if summary.interrupted {
        info!("Stopped by shutdown request");
    }

    Ok(())
}

/// Show the config file path or reset it to defaults
pub fn handle_config_command(show_path: bool, reset: bool) -> Result<()> {
    if reset {
        let path = init_config(true)?;
        info!("Created fresh config file at: {}", path.display());
        return Ok(());
    }

    let path = Config::get_active_config_path();
    if show_path {
        println!("{}", path.display());
        if path.exists() {
            info!("Config file exists at: {}", path.display());
        } else {
            info!("Config file would be created at: {}", path.display());
        }
        return Ok(());
    }

    let path = if path.exists() { path } else { init_config(false)? };
    info!("Config file: {}", path.display());
    info!("Edit it and run 'shell-thumbnail show-config' to verify your settings.");

    Ok(())
}

/// Generate a configuration file at the specified or default location
pub fn generate_config_file(output: Option<PathBuf>) -> Result<PathBuf> {
    let output_path = match output {
        Some(path) => {
            fs::write(&path, Config::generate_default_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            path
        }
        None => init_config(false)?,
    };

    info!("Configuration file: {}", output_path.display());
    info!("Edit this file to customize thumbnail settings.");

    Ok(output_path)
}

/// Show the current configuration settings
pub fn show_config(config: &Config) {
    let config_path = Config::get_active_config_path();
    info!("Configuration file: {}", config_path.display());
    if !config_path.exists() {
        info!("(Using default settings - no config file found)");
    }
    info!("");
    info!("Current Configuration:");
    info!("----------------------");
    info!("[thumbnail]");
    info!("  default_size = {}", config.thumbnail.default_size);
    info!("  max_size = {}", config.thumbnail.max_size);
    match config.thumbnail.effective_quality() {
        Some(q) => info!("  jpeg_quality = {}", q),
        None => info!("  jpeg_quality = (encoder default)"),
    }
    info!("");
    info!("[channel]");
    info!("  name = \"{}\"", config.channel.name);
    info!("");
    info!("[logging]");
    info!("  level = \"{}\"", config.logging.level);
    info!("  log_to_file = {}", config.logging.log_to_file);
    info!("  log_file = \"{}\"", config.logging.log_file.display());
}

/// Run mock scenarios, failing if any of them fail
///
/// Explicit `names` take precedence over `quick`.
fn run_scenarios(names: &[String], quick: bool, verbose: bool, fail_fast: bool) -> Result<()> {
    let mut runner = TestRunner::with_config(TestRunnerConfig {
        verbose,
        fail_fast,
        ..Default::default()
    });

    let summary = if !names.is_empty() {
        let known = testdb::list_scenario_names();
        if let Some(unknown) = names.iter().find(|n| !known.contains(n)) {
            bail!(
                "Unknown scenario '{}'. Run 'shell-thumbnail test --list' to see {} scenarios.",
                unknown,
                ScenarioLibrary::all_scenarios().len()
            );
        }
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        runner.run_by_names(&names)
    } else if quick {
        runner.run_quick()
    } else {
        runner.run_all()
    };

    debug!("scenario run took {:?}", summary.total_duration);
    info!(
        "{}/{} scenario(s) passed ({:.1}%)",
        summary.passed,
        summary.total,
        summary.pass_rate()
    );

    if summary.failed > 0 {
        bail!("{} scenario(s) failed: {}", summary.failed, summary.failed_scenarios().join(", "));
    }

    Ok(())
}
