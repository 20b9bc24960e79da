//! Container visitor: raw driver records to the typed result graph.

use tracing::debug;

use crate::convert::time::{self, CONTAINER_CLOCK};
use crate::convert::{channel_layout, codec_tag_string, tags};
use crate::domain::model::{
    AudioStream, Chapter, Disposition, MediaType, ProbeResult, Program, Rational, Stream, StreamInfo,
    SubtitleStream, Tags, VideoStream,
};
use crate::error::AvResult;
use crate::ports::{ContainerHandle, DecoderContext, RawChapter, RawCodecParameters, RawProgram};
use crate::probe::codec_context;

/// Largest term allowed when reducing the display aspect ratio
const ASPECT_RATIO_MAX_TERM: i32 = 1024 * 1024;

/// Strategy turning an opened container into a result.
///
/// [`ProbeVisitor`] builds a [`ProbeResult`]; closures taking the container
/// handle work as ad-hoc visitors.
pub trait ContainerVisitor<C: ContainerHandle> {
    type Output;

    fn visit(&mut self, container: &C) -> AvResult<Self::Output>;
}

impl<C, F, T> ContainerVisitor<C> for F
where
    C: ContainerHandle,
    F: FnMut(&C) -> AvResult<T>,
{
    type Output = T;

    fn visit(&mut self, container: &C) -> AvResult<T> {
        self(container)
    }
}

/// The default visitor, producing a [`ProbeResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeVisitor;

impl<C: ContainerHandle> ContainerVisitor<C> for ProbeVisitor {
    type Output = ProbeResult;

    fn visit(&mut self, container: &C) -> AvResult<ProbeResult> {
        visit_container(container)
    }
}

/// Build the full result for an opened container.
///
/// Decoder contexts are resolved for every stream before anything else, so a
/// decoder that fails to open aborts the visit early. Each context is dropped
/// as soon as its stream has been converted.
pub fn visit_container<C: ContainerHandle>(container: &C) -> AvResult<ProbeResult> {
    let stream_count = container.stream_count();
    let mut decoders = Vec::with_capacity(stream_count);
    for index in 0..stream_count {
        decoders.push(codec_context::resolve(container, index)?);
    }

    let programs = (0..container.program_count())
        .map(|index| visit_program(container.program(index)))
        .collect::<AvResult<Vec<_>>>()?;
    let chapters = (0..container.chapter_count())
        .map(|index| visit_chapter(container.chapter(index)))
        .collect::<AvResult<Vec<_>>>()?;

    let format = container.input_format().unwrap_or_default();

    let mut streams = Vec::with_capacity(stream_count);
    for (index, decoder) in decoders.into_iter().enumerate() {
        streams.push(visit_stream(container, index, format.shows_ids, decoder.as_ref())?);
    }

    let timing = container.timing();
    let metadata = container.metadata();
    let tags = tags::from_raw(metadata.as_deref())?;

    let result = ProbeResult {
        programs,
        streams,
        chapters,
        format_name: format.name,
        format_long_name: format.long_name,
        extensions: format.extensions,
        mime_type: format.mime_type,
        start_time: time::to_duration_per_second(timing.start_time, CONTAINER_CLOCK, false),
        duration: time::to_duration_per_second(timing.duration, CONTAINER_CLOCK, false),
        size: positive(container.io_size()),
        bit_rate: positive(timing.bit_rate),
        probe_score: timing.probe_score.clamp(0, 100) as u8,
        tags,
    };

    debug!(
        format = %result.format_name,
        streams = result.streams.len(),
        programs = result.programs.len(),
        chapters = result.chapters.len(),
        "container visited"
    );
    Ok(result)
}

fn visit_program(raw: Option<RawProgram<'_>>) -> AvResult<Program> {
    let Some(raw) = raw else {
        return Ok(Program::default());
    };
    Ok(Program {
        id: raw.id,
        num: raw.program_num,
        mapping_table_pid: raw.pmt_pid,
        clock_reference_pid: raw.pcr_pid,
        tags: tags::from_raw(raw.metadata.as_deref())?,
    })
}

fn visit_chapter(raw: Option<RawChapter<'_>>) -> AvResult<Chapter> {
    let Some(raw) = raw else {
        return Ok(Chapter::default());
    };
    Ok(Chapter {
        id: raw.id,
        start: time::instant(raw.start, raw.time_base),
        end: time::instant(raw.end, raw.time_base),
        tags: tags::from_raw(raw.metadata.as_deref())?,
    })
}

fn visit_stream<C: ContainerHandle>(
    container: &C,
    index: usize,
    shows_ids: bool,
    decoder: Option<&C::Context>,
) -> AvResult<Stream> {
    let Some(raw) = container.stream(index) else {
        return Ok(Stream::Other(StreamInfo {
            index,
            codec_tag_string: codec_tag_string(0),
            ..StreamInfo::default()
        }));
    };

    let missing = RawCodecParameters::default();
    let params = raw.codec.as_ref().unwrap_or(&missing);

    // Container and codec parameters
    let mut info = StreamInfo {
        id: if shows_ids { raw.id } else { 0 },
        index,
        codec_id: params.codec_id,
        codec_name: params.codec_name.clone(),
        codec_long_name: params.codec_long_name.clone(),
        codec_type: params.media_type,
        codec_tag: params.codec_tag,
        codec_tag_string: codec_tag_string(params.codec_tag),
        codec_properties: 0,
        profile: params.profile,
        profile_name: params.profile_name.clone(),
        frame_rate: rate(raw.frame_rate),
        average_frame_rate: rate(raw.average_frame_rate),
        start_time: time::instant(raw.start_time, raw.time_base),
        duration: time::instant(raw.duration, raw.time_base),
        bit_rate: positive(params.bit_rate),
        max_bit_rate: 0,
        bits_per_raw_sample: 0,
        frame_count: positive(raw.frame_count),
        disposition: Disposition(raw.disposition),
        extradata: params.extradata.to_vec(),
        private_data: Tags::new(),
        tags: tags::from_raw(raw.metadata.as_deref())?,
    };

    // Decoder context
    if let Some(context) = decoder {
        for option in context.options().into_iter().filter(|option| option.exported) {
            if let Some(value) = option.value {
                info.private_data.set(option.name, value);
            }
        }
        info.max_bit_rate = positive(context.max_bit_rate());
        info.bits_per_raw_sample = context.bits_per_raw_sample();
    }

    let stream = match params.media_type {
        MediaType::Video => Stream::Video(video_stream(container, index, info, params, decoder)),
        MediaType::Audio => Stream::Audio(audio_stream(info, params)),
        MediaType::Subtitle => Stream::Subtitle(SubtitleStream {
            info,
            width: dimension(params.width),
            height: dimension(params.height),
        }),
        MediaType::Data | MediaType::Attachment | MediaType::Unknown => Stream::Other(info),
    };
    Ok(stream)
}

fn video_stream<C: ContainerHandle>(
    container: &C,
    index: usize,
    mut info: StreamInfo,
    params: &RawCodecParameters<'_>,
    decoder: Option<&C::Context>,
) -> VideoStream {
    let (mut coded_width, mut coded_height, mut refs) = (0, 0, 0);
    if let Some(context) = decoder {
        info.codec_properties = context.properties();
        coded_width = dimension(context.coded_width());
        coded_height = dimension(context.coded_height());
        refs = context.refs();
    }

    let mut sample_aspect_ratio = Rational::ZERO;
    let mut display_aspect_ratio = Rational::ZERO;
    let guessed = container.guess_sample_aspect_ratio(index);
    if guessed.num != 0 {
        sample_aspect_ratio = guessed;
        let (reduced, _) = Rational::reduce(
            params.width as i64 * guessed.num as i64,
            params.height as i64 * guessed.den as i64,
            ASPECT_RATIO_MAX_TERM,
        );
        display_aspect_ratio = reduced;
    }

    VideoStream {
        info,
        width: dimension(params.width),
        height: dimension(params.height),
        coded_width,
        coded_height,
        video_delay: params.video_delay,
        sample_aspect_ratio,
        display_aspect_ratio,
        pixel_format: params.format_name.clone(),
        level: params.level,
        color_range: params.color_range.clone(),
        color_space: params.color_space.clone(),
        color_transfer: params.color_transfer.clone(),
        color_primaries: params.color_primaries.clone(),
        chroma_location: params.chroma_location.clone(),
        field_order: params.field_order.clone(),
        refs,
    }
}

fn audio_stream(info: StreamInfo, params: &RawCodecParameters<'_>) -> AudioStream {
    let mask = params.channel_layout;
    AudioStream {
        info,
        sample_format: params.format_name.clone(),
        sample_rate: dimension(params.sample_rate),
        channel_count: dimension(params.channels),
        channel_layout_mask: mask,
        channel_layout_name: (mask != 0).then(|| channel_layout::name(params.channels, mask)),
        bits_per_sample: params.bits_per_sample,
    }
}

/// Zero-numerator rates collapse to the canonical zero
fn rate(value: Rational) -> Rational {
    if value.is_zero() {
        Rational::ZERO
    } else {
        value
    }
}

/// Non-positive counts mean unknown
fn positive(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn dimension(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
