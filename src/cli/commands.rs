//! Command implementations

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::adapters::LibavDriver;
use crate::cli::args::{self, Input};
use crate::cli::config::{self, CliConfig};
use crate::cli::output::{self, ProbeReport};
use crate::cli::Cli;
use crate::domain::model::ProbeResult;
use crate::error::AvResult;
use crate::probe::{ProbeOptions, Prober};
use crate::utils::logging::init_logging;

/// Execute the probe command.
///
/// Fails only on usage problems; per-input failures are reported in the
/// output and turn the exit code non-zero.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::resolve(&cli)?;
    init_logging(config.log_level, config.log_json);
    LibavDriver::set_log_level(config.driver_log_level);
    debug!(?config, "configuration resolved");

    let inputs = args::expand(&cli.inputs, cli.recursive)?;
    info!(inputs = inputs.len(), jobs = config.effective_jobs(), "probing");

    let reports = probe_all(inputs, &config).await?;
    let failures = reports.iter().filter(|report| report.is_failure()).count();

    let rendered = output::render(config.output, &reports)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes()).context("Failed to write output")?;
    stdout.flush()?;

    if failures > 0 {
        warn!(failures, "some inputs could not be probed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Probe every input on the blocking pool, at most `jobs` at a time.
///
/// Reports come back in input order.
pub async fn probe_all(inputs: Vec<Input>, config: &CliConfig) -> Result<Vec<ProbeReport>> {
    let semaphore = Arc::new(Semaphore::new(config.effective_jobs()));
    let mut handles = Vec::with_capacity(inputs.len());

    for input in inputs {
        let permit = semaphore.clone().acquire_owned().await.context("Worker pool closed")?;
        let options = config.probe_options();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let label = input.label();
            match probe_one(&input, options) {
                Ok(result) => ProbeReport::success(label, result),
                Err(e) => {
                    warn!(input = %label, error = %e, "probe failed");
                    ProbeReport::failure(label, e)
                }
            }
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Probe task panicked")?);
    }
    Ok(reports)
}

fn probe_one(input: &Input, options: ProbeOptions) -> AvResult<ProbeResult> {
    let prober = Prober::with_options(LibavDriver::new()?, options);
    match input {
        Input::Http(uri) => prober.probe_http(uri),
        Input::Uri(uri) => prober.probe_uri(uri),
        Input::Stdin => prober.probe_forward_only(&mut std::io::stdin().lock()),
        Input::Path(path) => prober.probe_path(path),
    }
}
