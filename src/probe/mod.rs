//! Probe orchestration.
//!
//! Every entry point validates its input, then runs the same sequence against
//! the container driver: open, resolve stream info, visit, close. The
//! container is closed exactly once on every path, including failures.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::model::ProbeResult;
use crate::error::{AvProbeError, AvResult};
use crate::ports::{ByteSource, ContainerDriver, Status};

pub mod codec_context;
pub mod io;
pub mod visitor;

pub use io::{ForwardOnlySource, SeekableSource, DEFAULT_BUFFER_SIZE};
pub use visitor::{visit_container, ContainerVisitor, ProbeVisitor};

/// Tunables for a [`Prober`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOptions {
    /// Driver-side read buffer for byte-stream inputs
    pub io_buffer_size: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            io_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Probes inputs through a container driver
pub struct Prober<D> {
    driver: D,
    options: ProbeOptions,
}

/// Closes the container when dropped, whether or not it was ever opened
struct ContainerGuard<'d, D: ContainerDriver> {
    driver: &'d D,
    slot: Option<D::Container>,
}

impl<'d, D: ContainerDriver> ContainerGuard<'d, D> {
    fn new(driver: &'d D, container: Option<D::Container>) -> Self {
        Self {
            driver,
            slot: container,
        }
    }
}

impl<D: ContainerDriver> Drop for ContainerGuard<'_, D> {
    fn drop(&mut self) {
        self.driver.close_input(&mut self.slot);
        debug!("container closed");
    }
}

impl<D: ContainerDriver> Prober<D> {
    /// Create a prober with default options
    pub fn new(driver: D) -> Self {
        Self::with_options(driver, ProbeOptions::default())
    }

    pub fn with_options(driver: D, options: ProbeOptions) -> Self {
        Self { driver, options }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// Probe a local file
    pub fn probe_path(&self, path: impl AsRef<Path>) -> AvResult<ProbeResult> {
        self.probe_path_with(path, ProbeVisitor)
    }

    /// Probe a local file with a custom visitor.
    ///
    /// Relative paths are resolved against the working directory; a missing
    /// file is reported as `NotFound` before the driver is involved.
    pub fn probe_path_with<V>(&self, path: impl AsRef<Path>, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        let url = resolve_path(path.as_ref())?;
        self.probe_url(&url, visitor)
    }

    /// Probe an absolute http or https URI
    pub fn probe_http(&self, uri: &str) -> AvResult<ProbeResult> {
        self.probe_http_with(uri, ProbeVisitor)
    }

    pub fn probe_http_with<V>(&self, uri: &str, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        let parsed = parse_absolute(uri)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AvProbeError::validation(format!(
                "'{}' is not an http or https URI",
                uri
            )));
        }
        self.probe_url(parsed.as_str(), visitor)
    }

    /// Probe an absolute URI of any scheme the driver understands
    pub fn probe_uri(&self, uri: &str) -> AvResult<ProbeResult> {
        self.probe_uri_with(uri, ProbeVisitor)
    }

    pub fn probe_uri_with<V>(&self, uri: &str, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        let parsed = parse_absolute(uri)?;
        self.probe_url(parsed.as_str(), visitor)
    }

    /// Probe a raw driver input string, passed through unchanged
    pub fn probe_input(&self, url: &str) -> AvResult<ProbeResult> {
        self.probe_input_with(url, ProbeVisitor)
    }

    pub fn probe_input_with<V>(&self, url: &str, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        if url.is_empty() {
            return Err(AvProbeError::validation("input must not be empty"));
        }
        self.probe_url(url, visitor)
    }

    /// Probe a readable, seekable stream. The stream is left open.
    pub fn probe_reader<R: Read + Seek>(&self, reader: &mut R) -> AvResult<ProbeResult> {
        self.probe_reader_with(reader, ProbeVisitor)
    }

    pub fn probe_reader_with<R, V>(&self, reader: &mut R, visitor: V) -> AvResult<V::Output>
    where
        R: Read + Seek,
        V: ContainerVisitor<D::Container>,
    {
        let mut source = SeekableSource::new(reader);
        self.probe_source(&mut source, visitor)
    }

    /// Probe a stream that cannot seek, such as a pipe
    pub fn probe_forward_only<R: Read>(&self, reader: &mut R) -> AvResult<ProbeResult> {
        self.probe_forward_only_with(reader, ProbeVisitor)
    }

    pub fn probe_forward_only_with<R, V>(&self, reader: &mut R, visitor: V) -> AvResult<V::Output>
    where
        R: Read,
        V: ContainerVisitor<D::Container>,
    {
        let mut source = ForwardOnlySource::new(reader);
        self.probe_source(&mut source, visitor)
    }

    fn probe_url<V>(&self, url: &str, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        debug!(url, "opening input");
        let mut guard = ContainerGuard::new(&self.driver, None);
        let status = self.driver.open_input(&mut guard.slot, url, None);
        self.check(status, || format!("open input '{}'", url))?;
        self.run(&mut guard, visitor)
    }

    fn probe_source<V>(&self, source: &mut dyn ByteSource, visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        if self.options.io_buffer_size == 0 {
            return Err(AvProbeError::validation("I/O buffer size must be positive"));
        }

        debug!(buffer_size = self.options.io_buffer_size, "opening byte stream input");
        let mut io = self.driver.alloc_io(source, self.options.io_buffer_size)?;
        let container = self.driver.alloc_container()?;
        // Declared after `io` so the container is closed before its I/O is freed
        let mut guard = ContainerGuard::new(&self.driver, Some(container));
        let status = self.driver.open_input(&mut guard.slot, "", Some(&mut io));
        self.check(status, || "open byte stream input".to_string())?;
        self.run(&mut guard, visitor)
    }

    fn run<V>(&self, guard: &mut ContainerGuard<'_, D>, mut visitor: V) -> AvResult<V::Output>
    where
        V: ContainerVisitor<D::Container>,
    {
        let container = guard
            .slot
            .as_mut()
            .ok_or_else(|| AvProbeError::allocation("container handle"))?;

        let status = self.driver.resolve_stream_info(container);
        self.check(status, || "resolve stream info".to_string())?;
        debug!("stream info resolved");

        visitor.visit(container)
    }

    fn check(&self, status: Status, operation: impl FnOnce() -> String) -> AvResult<()> {
        if status < 0 {
            return Err(AvProbeError::driver(
                operation(),
                status,
                self.driver.describe_status(status),
            ));
        }
        Ok(())
    }
}

fn resolve_path(path: &Path) -> AvResult<String> {
    if path.as_os_str().is_empty() {
        return Err(AvProbeError::validation("path must not be empty"));
    }

    let absolute: PathBuf = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // Directories are not probe inputs
    if !absolute.is_file() {
        return Err(AvProbeError::NotFound { path: absolute });
    }

    absolute
        .to_str()
        .map(str::to_owned)
        .ok_or_else(|| AvProbeError::validation(format!("path is not valid UTF-8: {}", absolute.display())))
}

fn parse_absolute(uri: &str) -> AvResult<Url> {
    Url::parse(uri).map_err(|e| AvProbeError::validation(format!("'{}' is not an absolute URI: {}", uri, e)))
}
