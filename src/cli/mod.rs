//! CLI module for avprobe
//!
//! Argument parsing, configuration layering and the probe command.

use std::path::PathBuf;

use clap::Parser;

pub mod args;
pub mod commands;
pub mod config;
pub mod output;

pub use output::OutputFormat;

/// avprobe - inspect multimedia containers
///
/// Prints container format, timing, programs, chapters and per-stream codec
/// details for each input.
#[derive(Parser, Debug)]
#[command(name = "avprobe")]
#[command(about = "avprobe - inspect multimedia containers")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Files, directories, URIs, or `-` for standard input
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Descend into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Inputs probed at once (default: number of CPUs)
    #[arg(short, long, env = "AVPROBE_JOBS")]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, env = "AVPROBE_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Configuration file (default: ./avprobe.toml when present)
    #[arg(long, env = "AVPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, env = "AVPROBE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "AVPROBE_LOG_JSON")]
    pub log_json: bool,

    /// Verbosity of the FFmpeg libraries themselves
    #[arg(long, env = "AVPROBE_DRIVER_LOG_LEVEL")]
    pub driver_log_level: Option<String>,

    /// Read buffer size for standard input
    #[arg(long, env = "AVPROBE_IO_BUFFER_SIZE")]
    pub io_buffer_size: Option<usize>,
}
