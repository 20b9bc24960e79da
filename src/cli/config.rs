//! Layered CLI configuration.
//!
//! Precedence, highest first: command-line flags, `AVPROBE_*` environment
//! variables, the `[avprobe]` table of the TOML file, built-in defaults.
//! Flags and environment are merged by clap before this module sees them.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::ports::DriverLogLevel;
use crate::probe::{ProbeOptions, DEFAULT_BUFFER_SIZE};
use crate::utils::logging::LogLevel;

/// File picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "avprobe.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub log_level: LogLevel,
    pub log_json: bool,
    pub driver_log_level: DriverLogLevel,
    pub output: OutputFormat,
    pub io_buffer_size: usize,
    pub jobs: Option<usize>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            log_json: false,
            driver_log_level: DriverLogLevel::Error,
            output: OutputFormat::Json,
            io_buffer_size: DEFAULT_BUFFER_SIZE,
            jobs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    avprobe: CliConfig,
}

impl CliConfig {
    /// Parse the contents of a configuration file
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse TOML config")?;
        Ok(file.avprobe)
    }

    /// Load `path`, or the default file when present, or the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file does not exist: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content).with_context(|| format!("In {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Overlay command-line and environment values
    pub fn apply(mut self, cli: &Cli) -> Result<Self> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::parse(level).ok_or_else(|| anyhow!("Invalid log level: {}", level))?;
        }
        if cli.log_json {
            self.log_json = true;
        }
        if let Some(level) = &cli.driver_log_level {
            self.driver_log_level =
                DriverLogLevel::parse(level).ok_or_else(|| anyhow!("Invalid driver log level: {}", level))?;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if let Some(size) = cli.io_buffer_size {
            self.io_buffer_size = size;
        }
        if cli.jobs.is_some() {
            self.jobs = cli.jobs;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.io_buffer_size == 0 {
            bail!("io_buffer_size must be positive");
        }
        if self.jobs == Some(0) {
            bail!("jobs must be positive");
        }
        Ok(())
    }

    /// Worker count, defaulting to the number of CPUs
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            io_buffer_size: self.io_buffer_size,
        }
    }
}

/// Resolve the full configuration for a parsed command line
pub fn resolve(cli: &Cli) -> Result<CliConfig> {
    CliConfig::load(cli.config.as_deref())?.apply(cli)
}
