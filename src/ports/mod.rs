// Ports - the container driver boundary
//
// The core never touches driver memory directly. A driver hands out a
// container handle and plain snapshot records of its programs, chapters and
// streams; everything borrowed from the driver is tied to the handle's
// lifetime and copied into the model before the handle is closed.

use serde::{Deserialize, Serialize};

use crate::domain::model::{CodecId, MediaType, Rational};
use crate::error::AvResult;

/// Driver status code; negative values are failures
pub type Status = i32;

/// Verbosity of the driver's own diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverLogLevel {
    Quiet,
    Panic,
    Fatal,
    #[default]
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl DriverLogLevel {
    /// Numeric level understood by the driver
    pub fn as_raw(self) -> i32 {
        match self {
            DriverLogLevel::Quiet => -8,
            DriverLogLevel::Panic => 0,
            DriverLogLevel::Fatal => 8,
            DriverLogLevel::Error => 16,
            DriverLogLevel::Warning => 24,
            DriverLogLevel::Info => 32,
            DriverLogLevel::Verbose => 40,
            DriverLogLevel::Debug => 48,
            DriverLogLevel::Trace => 56,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" => Some(DriverLogLevel::Quiet),
            "panic" => Some(DriverLogLevel::Panic),
            "fatal" => Some(DriverLogLevel::Fatal),
            "error" => Some(DriverLogLevel::Error),
            "warning" | "warn" => Some(DriverLogLevel::Warning),
            "info" => Some(DriverLogLevel::Info),
            "verbose" => Some(DriverLogLevel::Verbose),
            "debug" => Some(DriverLogLevel::Debug),
            "trace" => Some(DriverLogLevel::Trace),
            _ => None,
        }
    }
}

/// Ordered key/value entries of a driver metadata dictionary
pub trait TagSource {
    /// Entries in driver order, duplicates included
    fn entries(&self) -> Vec<(String, String)>;
}

impl TagSource for [(String, String)] {
    fn entries(&self) -> Vec<(String, String)> {
        self.to_vec()
    }
}

impl TagSource for Vec<(String, String)> {
    fn entries(&self) -> Vec<(String, String)> {
        self.clone()
    }
}

impl<T: TagSource + ?Sized> TagSource for &T {
    fn entries(&self) -> Vec<(String, String)> {
        (**self).entries()
    }
}

/// Identity of the detected container format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputFormat {
    pub name: String,
    pub long_name: String,
    pub extensions: Option<String>,
    pub mime_type: Option<String>,
    /// The format exposes explicit stream ids
    pub shows_ids: bool,
}

/// Container-wide timing and detection values, on the microsecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawContainerTiming {
    pub start_time: i64,
    pub duration: i64,
    pub bit_rate: i64,
    pub probe_score: i32,
}

pub struct RawProgram<'a> {
    pub id: i32,
    pub program_num: i32,
    pub pmt_pid: i32,
    pub pcr_pid: i32,
    pub metadata: Option<Box<dyn TagSource + 'a>>,
}

pub struct RawChapter<'a> {
    pub id: i64,
    pub time_base: Rational,
    pub start: i64,
    pub end: i64,
    pub metadata: Option<Box<dyn TagSource + 'a>>,
}

/// Per-stream values read from the container
pub struct RawStream<'a> {
    pub index: i32,
    pub id: i32,
    pub time_base: Rational,
    pub frame_rate: Rational,
    pub average_frame_rate: Rational,
    pub start_time: i64,
    pub duration: i64,
    pub frame_count: i64,
    pub disposition: i32,
    pub codec: Option<RawCodecParameters<'a>>,
    pub metadata: Option<Box<dyn TagSource + 'a>>,
}

/// Decoder-independent codec description of a stream.
///
/// Names are resolved by the driver; `None` means the driver has no name for
/// the value.
#[derive(Debug, Clone, Default)]
pub struct RawCodecParameters<'a> {
    pub media_type: MediaType,
    pub codec_id: CodecId,
    pub codec_tag: u32,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub profile: i32,
    pub profile_name: Option<String>,
    pub bit_rate: i64,
    pub extradata: &'a [u8],
    pub width: i32,
    pub height: i32,
    pub video_delay: i32,
    /// Pixel format for video, sample format for audio
    pub format_name: Option<String>,
    pub level: i32,
    pub color_range: Option<String>,
    pub color_space: Option<String>,
    pub color_transfer: Option<String>,
    pub color_primaries: Option<String>,
    pub chroma_location: Option<String>,
    pub field_order: Option<String>,
    pub sample_rate: i32,
    pub channels: i32,
    pub channel_layout: u64,
    /// Bits per sample from the driver's per-codec table
    pub bits_per_sample: i32,
}

/// One option of a decoder's private option class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDecoderOption {
    pub name: String,
    /// Flagged for export to callers
    pub exported: bool,
    /// String rendering of the current value, if the driver could render it
    pub value: Option<String>,
}

/// A short-lived, opened decoder. Dropping it releases the driver context.
pub trait DecoderContext {
    /// Private options of the decoder, empty when it has no private class
    fn options(&self) -> Vec<RawDecoderOption>;
    fn max_bit_rate(&self) -> i64;
    fn bits_per_raw_sample(&self) -> i32;
    fn properties(&self) -> u32;
    fn coded_width(&self) -> i32;
    fn coded_height(&self) -> i32;
    fn refs(&self) -> i32;
}

/// An opened container
pub trait ContainerHandle {
    /// Reference to a registered decoder implementation
    type Decoder: Copy;
    type Context: DecoderContext;

    fn input_format(&self) -> Option<RawInputFormat>;
    fn timing(&self) -> RawContainerTiming;
    fn metadata(&self) -> Option<Box<dyn TagSource + '_>>;

    fn stream_count(&self) -> usize;
    /// `None` when the driver has no record at `index`
    fn stream(&self, index: usize) -> Option<RawStream<'_>>;
    fn program_count(&self) -> usize;
    fn program(&self, index: usize) -> Option<RawProgram<'_>>;
    fn chapter_count(&self) -> usize;
    fn chapter(&self, index: usize) -> Option<RawChapter<'_>>;

    fn find_decoder(&self, codec_id: CodecId) -> Option<Self::Decoder>;
    /// `None` on allocation failure
    fn alloc_decoder_context(&self, decoder: Self::Decoder) -> Option<Self::Context>;
    /// Copy the stream's codec parameters and time base into `context`
    fn copy_parameters(&self, context: &mut Self::Context, stream_index: usize) -> Status;
    fn open_decoder(&self, context: &mut Self::Context, decoder: Self::Decoder) -> Status;

    /// Sample aspect ratio guessed from stream and codec information
    fn guess_sample_aspect_ratio(&self, stream_index: usize) -> Rational;
    /// Size of the underlying byte source; negative when unsupported
    fn io_size(&self) -> i64;

    fn describe_status(&self, status: Status) -> Option<String>;
}

/// Seek origin for [`ByteSource::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    Start,
    Current,
    End,
    /// Report the total length without moving
    Size,
}

/// Caller-supplied bytes as seen by the driver.
///
/// Implementations never fail: read problems are reported as 0 bytes and
/// seek problems as -1.
pub trait ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> usize;
    fn seek(&mut self, offset: i64, whence: SeekWhence) -> i64;
}

/// The external container driver
pub trait ContainerDriver {
    type Container: ContainerHandle;
    /// Driver-side I/O context reading from a borrowed [`ByteSource`]
    type Io<'s>;

    fn alloc_container(&self) -> AvResult<Self::Container>;
    fn alloc_io<'s>(&self, source: &'s mut dyn ByteSource, buffer_size: usize) -> AvResult<Self::Io<'s>>;

    /// Open `url`, or read through `io` when given.
    ///
    /// Allocates the container when `slot` is empty. On failure the driver
    /// releases the container and leaves `slot` empty.
    fn open_input(&self, slot: &mut Option<Self::Container>, url: &str, io: Option<&mut Self::Io<'_>>) -> Status;
    fn resolve_stream_info(&self, container: &mut Self::Container) -> Status;
    /// Release the container if present; calling it again is a no-op
    fn close_input(&self, slot: &mut Option<Self::Container>);

    fn describe_status(&self, status: Status) -> Option<String>;
}
