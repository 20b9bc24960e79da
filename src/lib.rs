//! avprobe - multimedia container probe
//!
//! Opens a media input through a container driver and turns the driver's
//! raw records into an immutable, serializable [`ProbeResult`]: container
//! format and timing, programs, chapters, and one typed record per stream.
//!
//! The core is driver-agnostic. The `libav` feature adds [`adapters::libav`],
//! a driver over the FFmpeg libraries, along with the `avprobe` binary.

pub mod adapters;
pub mod convert;
pub mod domain;
pub mod error;
pub mod ports;
pub mod probe;
pub mod utils;

#[cfg(feature = "libav")]
pub mod cli;

pub use domain::model::{
    AudioStream, Chapter, CodecId, Disposition, MediaType, ProbeResult, Program, Rational, Stream, StreamInfo,
    SubtitleStream, Tags, VideoStream,
};
pub use error::{AvProbeError, AvResult};
pub use probe::{ContainerVisitor, ProbeOptions, ProbeVisitor, Prober};

/// Probe a local file with the libav driver
#[cfg(feature = "libav")]
pub fn probe_file(path: impl AsRef<std::path::Path>) -> AvResult<ProbeResult> {
    Prober::new(adapters::LibavDriver::new()?).probe_path(path)
}

/// Probe an http or https URI with the libav driver
#[cfg(feature = "libav")]
pub fn probe_http(uri: &str) -> AvResult<ProbeResult> {
    Prober::new(adapters::LibavDriver::new()?).probe_http(uri)
}

/// Probe a seekable stream with the libav driver
#[cfg(feature = "libav")]
pub fn probe_reader<R: std::io::Read + std::io::Seek>(reader: &mut R) -> AvResult<ProbeResult> {
    Prober::new(adapters::LibavDriver::new()?).probe_reader(reader)
}
