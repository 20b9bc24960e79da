// Mock driver - scripted in-memory container driver for tests
//
// Containers are described up front with plain records. The driver records
// every call it receives so tests can assert on resource handling, e.g. that
// `close_input` ran exactly once or that every decoder context was released.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::model::{CodecId, MediaType, Rational};
use crate::error::{AvProbeError, AvResult};
use crate::ports::*;

/// No such file or directory
pub const NOT_FOUND: Status = -2;
/// Invalid data found when processing input
pub const INVALID_DATA: Status = -1_094_995_529;
/// Decoder not found
pub const DECODER_NOT_FOUND: Status = -1_128_613_112;

/// Calls observed by a [`MockDriver`]
#[derive(Debug, Default)]
pub struct MockCalls {
    opens: Cell<usize>,
    resolves: Cell<usize>,
    close_input: Cell<usize>,
    containers_released: Cell<usize>,
    decoders_opened: Cell<usize>,
    decoders_released: Cell<usize>,
    bytes_read: Cell<usize>,
    opened_time_bases: RefCell<Vec<Option<Rational>>>,
    last_url: RefCell<Option<String>>,
    last_buffer_size: Cell<Option<usize>>,
}

impl MockCalls {
    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    pub fn resolves(&self) -> usize {
        self.resolves.get()
    }

    /// Number of `close_input` calls, with or without a live container
    pub fn close_input(&self) -> usize {
        self.close_input.get()
    }

    /// Number of live containers released by `close_input`
    pub fn containers_released(&self) -> usize {
        self.containers_released.get()
    }

    pub fn decoders_opened(&self) -> usize {
        self.decoders_opened.get()
    }

    pub fn decoders_released(&self) -> usize {
        self.decoders_released.get()
    }

    /// Bytes pulled from a byte-stream input
    pub fn bytes_read(&self) -> usize {
        self.bytes_read.get()
    }

    /// Time base held by each decoder context when `open_decoder` ran,
    /// failed opens included. `None` means parameters were never copied.
    pub fn opened_time_bases(&self) -> Vec<Option<Rational>> {
        self.opened_time_bases.borrow().clone()
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.borrow().clone()
    }

    pub fn last_buffer_size(&self) -> Option<usize> {
        self.last_buffer_size.get()
    }

    fn bump(counter: &Cell<usize>) {
        Self::bump_by(counter, 1);
    }

    fn bump_by(counter: &Cell<usize>, amount: usize) {
        counter.set(counter.get() + amount);
    }
}

/// A decoder registered with a [`MockContainer`]
#[derive(Debug, Clone, Default)]
pub struct MockDecoder {
    pub codec_id: CodecId,
    pub options: Vec<RawDecoderOption>,
    pub max_bit_rate: i64,
    pub bits_per_raw_sample: i32,
    pub properties: u32,
    pub coded_width: i32,
    pub coded_height: i32,
    pub refs: i32,
    pub alloc_fails: bool,
    pub copy_status: Status,
    pub open_status: Status,
}

impl MockDecoder {
    pub fn new(codec_id: CodecId) -> Self {
        Self {
            codec_id,
            ..Self::default()
        }
    }

    /// Add a private option; `exported` marks it for callers
    pub fn with_option(mut self, name: &str, value: Option<&str>, exported: bool) -> Self {
        self.options.push(RawDecoderOption {
            name: name.to_string(),
            exported,
            value: value.map(str::to_string),
        });
        self
    }

    pub fn with_coded_size(mut self, width: i32, height: i32) -> Self {
        self.coded_width = width;
        self.coded_height = height;
        self
    }

    pub fn failing_open(mut self, status: Status) -> Self {
        self.open_status = status;
        self
    }
}

/// Decoder context handed out by [`MockContainer`]
pub struct MockDecoderContext {
    decoder: MockDecoder,
    time_base: Option<Rational>,
    calls: Rc<MockCalls>,
}

impl MockDecoderContext {
    /// Time base copied from the stream, if parameters were copied
    pub fn time_base(&self) -> Option<Rational> {
        self.time_base
    }
}

impl DecoderContext for MockDecoderContext {
    fn options(&self) -> Vec<RawDecoderOption> {
        self.decoder.options.clone()
    }

    fn max_bit_rate(&self) -> i64 {
        self.decoder.max_bit_rate
    }

    fn bits_per_raw_sample(&self) -> i32 {
        self.decoder.bits_per_raw_sample
    }

    fn properties(&self) -> u32 {
        self.decoder.properties
    }

    fn coded_width(&self) -> i32 {
        self.decoder.coded_width
    }

    fn coded_height(&self) -> i32 {
        self.decoder.coded_height
    }

    fn refs(&self) -> i32 {
        self.decoder.refs
    }
}

impl Drop for MockDecoderContext {
    fn drop(&mut self) {
        MockCalls::bump(&self.calls.decoders_released);
    }
}

/// Scripted stream record
#[derive(Debug, Clone)]
pub struct MockStream {
    pub id: i32,
    pub time_base: Rational,
    pub frame_rate: Rational,
    pub average_frame_rate: Rational,
    pub start_time: i64,
    pub duration: i64,
    pub frame_count: i64,
    pub disposition: i32,
    pub codec: Option<RawCodecParameters<'static>>,
    pub metadata: Vec<(String, String)>,
    /// What `guess_sample_aspect_ratio` reports for this stream
    pub sample_aspect_ratio: Rational,
}

impl MockStream {
    fn with_codec(media_type: MediaType, codec_id: CodecId) -> Self {
        Self {
            id: 0,
            time_base: Rational::new(1, 1000),
            frame_rate: Rational::ZERO,
            average_frame_rate: Rational::ZERO,
            start_time: 0,
            duration: 0,
            frame_count: 0,
            disposition: 0,
            codec: Some(RawCodecParameters {
                media_type,
                codec_id,
                ..RawCodecParameters::default()
            }),
            metadata: Vec::new(),
            sample_aspect_ratio: Rational::ZERO,
        }
    }

    pub fn video(codec_id: CodecId, width: i32, height: i32) -> Self {
        let mut stream = Self::with_codec(MediaType::Video, codec_id);
        stream.frame_rate = Rational::new(30, 1);
        stream.average_frame_rate = Rational::new(30, 1);
        stream.time_base = Rational::new(1, 15360);
        if let Some(codec) = stream.codec.as_mut() {
            codec.width = width;
            codec.height = height;
            codec.format_name = Some("yuv420p".to_string());
        }
        stream
    }

    pub fn audio(codec_id: CodecId, sample_rate: i32, channels: i32, layout: u64) -> Self {
        let mut stream = Self::with_codec(MediaType::Audio, codec_id);
        stream.time_base = Rational::new(1, sample_rate);
        if let Some(codec) = stream.codec.as_mut() {
            codec.sample_rate = sample_rate;
            codec.channels = channels;
            codec.channel_layout = layout;
            codec.format_name = Some("fltp".to_string());
        }
        stream
    }

    pub fn subtitle(codec_id: CodecId) -> Self {
        Self::with_codec(MediaType::Subtitle, codec_id)
    }

    pub fn of_type(media_type: MediaType, codec_id: CodecId) -> Self {
        Self::with_codec(media_type, codec_id)
    }

    /// A stream record with no codec parameters at all
    pub fn bare() -> Self {
        let mut stream = Self::with_codec(MediaType::Unknown, CodecId::NONE);
        stream.codec = None;
        stream
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_codec_params(mut self, update: impl FnOnce(&mut RawCodecParameters<'static>)) -> Self {
        if let Some(codec) = self.codec.as_mut() {
            update(codec);
        }
        self
    }

    pub fn with_timing(mut self, time_base: Rational, start_time: i64, duration: i64) -> Self {
        self.time_base = time_base;
        self.start_time = start_time;
        self.duration = duration;
        self
    }

    pub fn with_sample_aspect_ratio(mut self, ratio: Rational) -> Self {
        self.sample_aspect_ratio = ratio;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub id: i32,
    pub program_num: i32,
    pub pmt_pid: i32,
    pub pcr_pid: i32,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct MockChapter {
    pub id: i64,
    pub time_base: Rational,
    pub start: i64,
    pub end: i64,
    pub metadata: Vec<(String, String)>,
}

/// Scripted container. `streams[i] == None` simulates a missing record.
#[derive(Debug, Clone)]
pub struct MockContainer {
    pub format: Option<RawInputFormat>,
    pub timing: RawContainerTiming,
    pub metadata: Vec<(String, String)>,
    pub streams: Vec<Option<MockStream>>,
    pub programs: Vec<Option<MockProgram>>,
    pub chapters: Vec<Option<MockChapter>>,
    pub decoders: Vec<MockDecoder>,
    /// Reported by `io_size`; replaced by the byte source length on stream opens
    pub io_size: i64,
    calls: Rc<MockCalls>,
}

impl MockContainer {
    pub fn new(name: &str, long_name: &str) -> Self {
        Self {
            format: Some(RawInputFormat {
                name: name.to_string(),
                long_name: long_name.to_string(),
                ..RawInputFormat::default()
            }),
            timing: RawContainerTiming {
                start_time: crate::convert::NO_TIMESTAMP,
                duration: crate::convert::NO_TIMESTAMP,
                bit_rate: 0,
                probe_score: 100,
            },
            metadata: Vec::new(),
            streams: Vec::new(),
            programs: Vec::new(),
            chapters: Vec::new(),
            decoders: Vec::new(),
            io_size: -1,
            calls: Rc::default(),
        }
    }

    pub fn with_stream(mut self, stream: MockStream) -> Self {
        self.streams.push(Some(stream));
        self
    }

    pub fn with_missing_stream(mut self) -> Self {
        self.streams.push(None);
        self
    }

    pub fn with_decoder(mut self, decoder: MockDecoder) -> Self {
        self.decoders.push(decoder);
        self
    }

    pub fn with_program(mut self, program: MockProgram) -> Self {
        self.programs.push(Some(program));
        self
    }

    pub fn with_chapter(mut self, chapter: MockChapter) -> Self {
        self.chapters.push(Some(chapter));
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.metadata.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_timing(mut self, start_time: i64, duration: i64, bit_rate: i64) -> Self {
        self.timing.start_time = start_time;
        self.timing.duration = duration;
        self.timing.bit_rate = bit_rate;
        self
    }

    fn tag_source(entries: &[(String, String)]) -> Box<dyn TagSource + '_> {
        Box::new(entries)
    }
}

impl ContainerHandle for MockContainer {
    type Decoder = usize;
    type Context = MockDecoderContext;

    fn input_format(&self) -> Option<RawInputFormat> {
        self.format.clone()
    }

    fn timing(&self) -> RawContainerTiming {
        self.timing
    }

    fn metadata(&self) -> Option<Box<dyn TagSource + '_>> {
        Some(Self::tag_source(&self.metadata))
    }

    fn stream_count(&self) -> usize {
        self.streams.len()
    }

    fn stream(&self, index: usize) -> Option<RawStream<'_>> {
        let stream = self.streams.get(index)?.as_ref()?;
        Some(RawStream {
            index: index as i32,
            id: stream.id,
            time_base: stream.time_base,
            frame_rate: stream.frame_rate,
            average_frame_rate: stream.average_frame_rate,
            start_time: stream.start_time,
            duration: stream.duration,
            frame_count: stream.frame_count,
            disposition: stream.disposition,
            codec: stream.codec.clone(),
            metadata: Some(Self::tag_source(&stream.metadata)),
        })
    }

    fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn program(&self, index: usize) -> Option<RawProgram<'_>> {
        let program = self.programs.get(index)?.as_ref()?;
        Some(RawProgram {
            id: program.id,
            program_num: program.program_num,
            pmt_pid: program.pmt_pid,
            pcr_pid: program.pcr_pid,
            metadata: Some(Self::tag_source(&program.metadata)),
        })
    }

    fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    fn chapter(&self, index: usize) -> Option<RawChapter<'_>> {
        let chapter = self.chapters.get(index)?.as_ref()?;
        Some(RawChapter {
            id: chapter.id,
            time_base: chapter.time_base,
            start: chapter.start,
            end: chapter.end,
            metadata: Some(Self::tag_source(&chapter.metadata)),
        })
    }

    fn find_decoder(&self, codec_id: CodecId) -> Option<usize> {
        self.decoders.iter().position(|decoder| decoder.codec_id == codec_id)
    }

    fn alloc_decoder_context(&self, decoder: usize) -> Option<MockDecoderContext> {
        let decoder = self.decoders.get(decoder)?;
        if decoder.alloc_fails {
            return None;
        }
        Some(MockDecoderContext {
            decoder: decoder.clone(),
            time_base: None,
            calls: Rc::clone(&self.calls),
        })
    }

    fn copy_parameters(&self, context: &mut MockDecoderContext, stream_index: usize) -> Status {
        if context.decoder.copy_status < 0 {
            return context.decoder.copy_status;
        }
        context.time_base = self
            .streams
            .get(stream_index)
            .and_then(|stream| stream.as_ref())
            .map(|stream| stream.time_base);
        0
    }

    fn open_decoder(&self, context: &mut MockDecoderContext, _decoder: usize) -> Status {
        self.calls.opened_time_bases.borrow_mut().push(context.time_base);
        if context.decoder.open_status < 0 {
            return context.decoder.open_status;
        }
        MockCalls::bump(&self.calls.decoders_opened);
        0
    }

    fn guess_sample_aspect_ratio(&self, stream_index: usize) -> Rational {
        self.streams
            .get(stream_index)
            .and_then(|stream| stream.as_ref())
            .map(|stream| stream.sample_aspect_ratio)
            .unwrap_or(Rational::ZERO)
    }

    fn io_size(&self) -> i64 {
        self.io_size
    }

    fn describe_status(&self, status: Status) -> Option<String> {
        describe(status)
    }
}

fn describe(status: Status) -> Option<String> {
    match status {
        NOT_FOUND => Some("No such file or directory".to_string()),
        INVALID_DATA => Some("Invalid data found when processing input".to_string()),
        DECODER_NOT_FOUND => Some("Decoder not found".to_string()),
        _ => None,
    }
}

/// I/O context of the mock driver
pub struct MockIo<'s> {
    source: &'s mut dyn ByteSource,
    buffer_size: usize,
}

/// In-memory driver serving one scripted container
pub struct MockDriver {
    template: MockContainer,
    open_status: Status,
    resolve_status: Status,
    alloc_fails: bool,
    magic: Option<Vec<u8>>,
    calls: Rc<MockCalls>,
}

impl MockDriver {
    pub fn new(mut template: MockContainer) -> Self {
        let calls = Rc::new(MockCalls::default());
        template.calls = Rc::clone(&calls);
        Self {
            template,
            open_status: 0,
            resolve_status: 0,
            alloc_fails: false,
            magic: None,
            calls,
        }
    }

    pub fn failing_open(mut self, status: Status) -> Self {
        self.open_status = status;
        self
    }

    pub fn failing_resolve(mut self, status: Status) -> Self {
        self.resolve_status = status;
        self
    }

    pub fn failing_alloc(mut self) -> Self {
        self.alloc_fails = true;
        self
    }

    /// Byte-stream opens fail with [`INVALID_DATA`] unless the input starts with `magic`
    pub fn expecting_magic(mut self, magic: &[u8]) -> Self {
        self.magic = Some(magic.to_vec());
        self
    }

    pub fn calls(&self) -> Rc<MockCalls> {
        Rc::clone(&self.calls)
    }

    fn sniff(&self, io: &mut MockIo<'_>, container: &mut MockContainer) -> Status {
        let mut buffer = vec![0u8; io.buffer_size];
        let read = io.source.read(&mut buffer);
        MockCalls::bump_by(&self.calls.bytes_read, read);

        if let Some(magic) = &self.magic {
            if !buffer[..read].starts_with(magic) {
                return INVALID_DATA;
            }
        }

        container.io_size = io.source.seek(0, SeekWhence::Size);
        0
    }
}

impl ContainerDriver for MockDriver {
    type Container = MockContainer;
    type Io<'s> = MockIo<'s>;

    fn alloc_container(&self) -> AvResult<MockContainer> {
        if self.alloc_fails {
            return Err(AvProbeError::allocation("container"));
        }
        Ok(self.template.clone())
    }

    fn alloc_io<'s>(&self, source: &'s mut dyn ByteSource, buffer_size: usize) -> AvResult<MockIo<'s>> {
        self.calls.last_buffer_size.set(Some(buffer_size));
        Ok(MockIo { source, buffer_size })
    }

    fn open_input(&self, slot: &mut Option<MockContainer>, url: &str, io: Option<&mut MockIo<'_>>) -> Status {
        MockCalls::bump(&self.calls.opens);
        *self.calls.last_url.borrow_mut() = Some(url.to_string());

        let mut container = match slot.take() {
            Some(container) => container,
            None => self.template.clone(),
        };

        let mut status = self.open_status;
        if status >= 0 {
            if let Some(io) = io {
                status = self.sniff(io, &mut container);
            }
        }

        if status < 0 {
            return status;
        }
        *slot = Some(container);
        0
    }

    fn resolve_stream_info(&self, _container: &mut MockContainer) -> Status {
        MockCalls::bump(&self.calls.resolves);
        self.resolve_status
    }

    fn close_input(&self, slot: &mut Option<MockContainer>) {
        MockCalls::bump(&self.calls.close_input);
        if slot.take().is_some() {
            MockCalls::bump(&self.calls.containers_released);
        }
    }

    fn describe_status(&self, status: Status) -> Option<String> {
        describe(status)
    }
}
