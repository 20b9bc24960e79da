// LibAV adapter - container driver backed by the FFmpeg libraries
//
// Everything here is a thin layer over ffmpeg_next::ffi. Raw pointers never
// leave this module: the core only sees snapshot records that borrow from a
// LibavContainer and are copied before it is closed.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::slice;

use ffmpeg_next::ffi;
use tracing::debug;

use crate::domain::model::{CodecId, MediaType, Rational};
use crate::error::{AvProbeError, AvResult};
use crate::ports::{
    ByteSource, ContainerDriver, ContainerHandle, DecoderContext, DriverLogLevel, RawChapter, RawCodecParameters,
    RawContainerTiming, RawDecoderOption, RawInputFormat, RawProgram, RawStream, Status, TagSource,
};

mod io;

pub use io::LibavIo;

// AVERROR(EINVAL) and AVERROR(ENOMEM)
const STATUS_EINVAL: Status = -22;
const STATUS_ENOMEM: Status = -12;

/// Container driver over libavformat and libavcodec
#[derive(Debug, Clone, Copy, Default)]
pub struct LibavDriver;

impl LibavDriver {
    /// Initialize the libraries. Safe to call more than once.
    pub fn new() -> AvResult<Self> {
        ffmpeg_next::init().map_err(|e| {
            let message = e.to_string();
            AvProbeError::driver("initialize libav", c_int::from(e), Some(message))
        })?;
        Ok(Self)
    }

    /// Process-wide verbosity of libav's own logging
    pub fn set_log_level(level: DriverLogLevel) {
        // SAFETY: sets a global integer
        unsafe { ffi::av_log_set_level(level.as_raw()) }
    }
}

impl ContainerDriver for LibavDriver {
    type Container = LibavContainer;
    type Io<'s> = LibavIo<'s>;

    fn alloc_container(&self) -> AvResult<LibavContainer> {
        // SAFETY: plain allocation, checked for null
        let ptr = unsafe { ffi::avformat_alloc_context() };
        if ptr.is_null() {
            return Err(AvProbeError::allocation("format context"));
        }
        Ok(LibavContainer { ptr })
    }

    fn alloc_io<'s>(&self, source: &'s mut dyn ByteSource, buffer_size: usize) -> AvResult<LibavIo<'s>> {
        LibavIo::new(source, buffer_size)
    }

    fn open_input(&self, slot: &mut Option<LibavContainer>, url: &str, io: Option<&mut LibavIo<'_>>) -> Status {
        let Ok(c_url) = CString::new(url) else {
            return STATUS_EINVAL;
        };

        let mut ptr = slot.take().map(LibavContainer::into_raw).unwrap_or(ptr::null_mut());
        if let Some(io) = io {
            if ptr.is_null() {
                // SAFETY: plain allocation, checked for null
                ptr = unsafe { ffi::avformat_alloc_context() };
                if ptr.is_null() {
                    return STATUS_ENOMEM;
                }
            }
            // SAFETY: ptr is a valid, unopened format context
            unsafe {
                (*ptr).pb = io.as_ptr();
                (*ptr).flags |= ffi::AVFMT_FLAG_CUSTOM_IO as c_int;
            }
        }

        // SAFETY: on failure libavformat frees the context and nulls ptr
        let status = unsafe { ffi::avformat_open_input(&mut ptr, c_url.as_ptr(), ptr::null_mut(), ptr::null_mut()) };
        if status < 0 || ptr.is_null() {
            debug!(url, status, "avformat_open_input failed");
            return status.min(-1);
        }

        *slot = Some(LibavContainer { ptr });
        status
    }

    fn resolve_stream_info(&self, container: &mut LibavContainer) -> Status {
        // SAFETY: container holds an opened format context
        unsafe { ffi::avformat_find_stream_info(container.ptr, ptr::null_mut()) }
    }

    fn close_input(&self, slot: &mut Option<LibavContainer>) {
        slot.take();
    }

    fn describe_status(&self, status: Status) -> Option<String> {
        error_string(status)
    }
}

/// Owned AVFormatContext; dropping it closes the input
pub struct LibavContainer {
    ptr: *mut ffi::AVFormatContext,
}

impl LibavContainer {
    fn into_raw(self) -> *mut ffi::AVFormatContext {
        ManuallyDrop::new(self).ptr
    }

    fn stream_ptr(&self, index: usize) -> *mut ffi::AVStream {
        // SAFETY: bounds are checked against nb_streams
        unsafe {
            let ctx = &*self.ptr;
            if ctx.streams.is_null() || index >= ctx.nb_streams as usize {
                return ptr::null_mut();
            }
            *ctx.streams.add(index)
        }
    }
}

impl Drop for LibavContainer {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: AVFMT_FLAG_CUSTOM_IO keeps libavformat away from caller I/O
            unsafe { ffi::avformat_close_input(&mut self.ptr) };
        }
    }
}

impl ContainerHandle for LibavContainer {
    type Decoder = *const ffi::AVCodec;
    type Context = LibavDecoderContext;

    fn input_format(&self) -> Option<RawInputFormat> {
        // SAFETY: iformat is static data owned by libavformat
        unsafe {
            let format = (*self.ptr).iformat;
            if format.is_null() {
                return None;
            }
            let format = &*format;
            Some(RawInputFormat {
                name: c_string(format.name).unwrap_or_default(),
                long_name: c_string(format.long_name).unwrap_or_default(),
                extensions: c_string(format.extensions),
                mime_type: c_string(format.mime_type),
                shows_ids: format.flags & ffi::AVFMT_SHOW_IDS as c_int != 0,
            })
        }
    }

    fn timing(&self) -> RawContainerTiming {
        // SAFETY: ptr is an opened format context
        let ctx = unsafe { &*self.ptr };
        RawContainerTiming {
            start_time: ctx.start_time,
            duration: ctx.duration,
            bit_rate: ctx.bit_rate,
            probe_score: ctx.probe_score,
        }
    }

    fn metadata(&self) -> Option<Box<dyn TagSource + '_>> {
        // SAFETY: ptr is an opened format context
        Dictionary::boxed(unsafe { (*self.ptr).metadata })
    }

    fn stream_count(&self) -> usize {
        // SAFETY: ptr is an opened format context
        unsafe { (*self.ptr).nb_streams as usize }
    }

    fn stream(&self, index: usize) -> Option<RawStream<'_>> {
        let stream = self.stream_ptr(index);
        if stream.is_null() {
            return None;
        }
        // SAFETY: stream belongs to this context and lives as long as &self
        unsafe {
            let stream = &*stream;
            Some(RawStream {
                index: stream.index,
                id: stream.id,
                time_base: rational(stream.time_base),
                frame_rate: rational(stream.r_frame_rate),
                average_frame_rate: rational(stream.avg_frame_rate),
                start_time: stream.start_time,
                duration: stream.duration,
                frame_count: stream.nb_frames,
                disposition: stream.disposition,
                codec: codec_parameters(stream.codecpar),
                metadata: Dictionary::boxed(stream.metadata),
            })
        }
    }

    fn program_count(&self) -> usize {
        // SAFETY: ptr is an opened format context
        unsafe { (*self.ptr).nb_programs as usize }
    }

    fn program(&self, index: usize) -> Option<RawProgram<'_>> {
        // SAFETY: bounds are checked against nb_programs
        unsafe {
            let ctx = &*self.ptr;
            if ctx.programs.is_null() || index >= ctx.nb_programs as usize {
                return None;
            }
            let program = *ctx.programs.add(index);
            if program.is_null() {
                return None;
            }
            let program = &*program;
            Some(RawProgram {
                id: program.id,
                program_num: program.program_num,
                pmt_pid: program.pmt_pid,
                pcr_pid: program.pcr_pid,
                metadata: Dictionary::boxed(program.metadata),
            })
        }
    }

    fn chapter_count(&self) -> usize {
        // SAFETY: ptr is an opened format context
        unsafe { (*self.ptr).nb_chapters as usize }
    }

    fn chapter(&self, index: usize) -> Option<RawChapter<'_>> {
        // SAFETY: bounds are checked against nb_chapters
        unsafe {
            let ctx = &*self.ptr;
            if ctx.chapters.is_null() || index >= ctx.nb_chapters as usize {
                return None;
            }
            let chapter = *ctx.chapters.add(index);
            if chapter.is_null() {
                return None;
            }
            let chapter = &*chapter;
            Some(RawChapter {
                id: chapter.id,
                time_base: rational(chapter.time_base),
                start: chapter.start,
                end: chapter.end,
                metadata: Dictionary::boxed(chapter.metadata),
            })
        }
    }

    fn find_decoder(&self, codec_id: CodecId) -> Option<*const ffi::AVCodec> {
        // Same preference as avcodec_find_decoder: experimental decoders last
        let mut opaque: *mut c_void = ptr::null_mut();
        let mut experimental = None;
        loop {
            // SAFETY: iteration state is owned by this loop
            let codec = unsafe { ffi::av_codec_iterate(&mut opaque) };
            if codec.is_null() {
                break;
            }
            // SAFETY: registered codecs are static
            unsafe {
                if (*codec).id as u32 != codec_id.0 || ffi::av_codec_is_decoder(codec) == 0 {
                    continue;
                }
                if (*codec).capabilities & ffi::AV_CODEC_CAP_EXPERIMENTAL as c_int != 0 {
                    experimental.get_or_insert(codec);
                    continue;
                }
            }
            return Some(codec);
        }
        experimental
    }

    fn alloc_decoder_context(&self, decoder: *const ffi::AVCodec) -> Option<LibavDecoderContext> {
        // SAFETY: decoder came from av_codec_iterate
        let ptr = unsafe { ffi::avcodec_alloc_context3(decoder) };
        (!ptr.is_null()).then_some(LibavDecoderContext { ptr })
    }

    fn copy_parameters(&self, context: &mut LibavDecoderContext, stream_index: usize) -> Status {
        let stream = self.stream_ptr(stream_index);
        if stream.is_null() {
            return STATUS_EINVAL;
        }
        // SAFETY: both pointers are live for the duration of the call
        unsafe {
            let status = ffi::avcodec_parameters_to_context(context.ptr, (*stream).codecpar);
            if status < 0 {
                return status;
            }
            (*context.ptr).pkt_timebase = (*stream).time_base;
        }
        0
    }

    fn open_decoder(&self, context: &mut LibavDecoderContext, decoder: *const ffi::AVCodec) -> Status {
        // SAFETY: context was allocated for this decoder
        unsafe { ffi::avcodec_open2(context.ptr, decoder, ptr::null_mut()) }
    }

    fn guess_sample_aspect_ratio(&self, stream_index: usize) -> Rational {
        let stream = self.stream_ptr(stream_index);
        if stream.is_null() {
            return Rational::ZERO;
        }
        // SAFETY: stream belongs to this context
        rational(unsafe { ffi::av_guess_sample_aspect_ratio(self.ptr, stream, ptr::null_mut()) })
    }

    fn io_size(&self) -> i64 {
        // SAFETY: pb is either null or the context's I/O
        unsafe {
            let pb = (*self.ptr).pb;
            if pb.is_null() {
                -1
            } else {
                ffi::avio_size(pb)
            }
        }
    }

    fn describe_status(&self, status: Status) -> Option<String> {
        error_string(status)
    }
}

/// Opened AVCodecContext, freed on drop
pub struct LibavDecoderContext {
    ptr: *mut ffi::AVCodecContext,
}

impl LibavDecoderContext {
    fn option_value(&self, name: *const c_char) -> Option<String> {
        let mut out: *mut u8 = ptr::null_mut();
        // SAFETY: av_opt_get allocates out, which is released with av_free
        unsafe {
            let status = ffi::av_opt_get((*self.ptr).priv_data, name, 0, &mut out);
            if status < 0 || out.is_null() {
                return None;
            }
            let value = c_string(out as *const c_char);
            ffi::av_free(out as *mut c_void);
            value
        }
    }
}

impl Drop for LibavDecoderContext {
    fn drop(&mut self) {
        // SAFETY: ptr came from avcodec_alloc_context3
        unsafe { ffi::avcodec_free_context(&mut self.ptr) };
    }
}

impl DecoderContext for LibavDecoderContext {
    fn options(&self) -> Vec<RawDecoderOption> {
        let mut options = Vec::new();
        // SAFETY: options are walked on the decoder's own private data
        unsafe {
            let ctx = &*self.ptr;
            if ctx.codec.is_null() || (*ctx.codec).priv_class.is_null() || ctx.priv_data.is_null() {
                return options;
            }

            let mut option: *const ffi::AVOption = ptr::null();
            loop {
                option = ffi::av_opt_next(ctx.priv_data, option);
                if option.is_null() {
                    break;
                }
                let Some(name) = c_string((*option).name) else {
                    continue;
                };
                let exported = (*option).flags & ffi::AV_OPT_FLAG_EXPORT as c_int != 0;
                let value = if exported { self.option_value((*option).name) } else { None };
                options.push(RawDecoderOption { name, exported, value });
            }
        }
        options
    }

    fn max_bit_rate(&self) -> i64 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).rc_max_rate }
    }

    fn bits_per_raw_sample(&self) -> i32 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).bits_per_raw_sample }
    }

    fn properties(&self) -> u32 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).properties }
    }

    fn coded_width(&self) -> i32 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).coded_width }
    }

    fn coded_height(&self) -> i32 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).coded_height }
    }

    fn refs(&self) -> i32 {
        // SAFETY: ptr is a live codec context
        unsafe { (*self.ptr).refs }
    }
}

/// Borrowed AVDictionary
struct Dictionary<'a> {
    ptr: *const ffi::AVDictionary,
    _owner: PhantomData<&'a ()>,
}

impl<'a> Dictionary<'a> {
    fn boxed(ptr: *const ffi::AVDictionary) -> Option<Box<dyn TagSource + 'a>> {
        if ptr.is_null() {
            return None;
        }
        Some(Box::new(Dictionary {
            ptr,
            _owner: PhantomData,
        }))
    }
}

impl TagSource for Dictionary<'_> {
    fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        let mut entry: *const ffi::AVDictionaryEntry = ptr::null();
        loop {
            // SAFETY: empty key with IGNORE_SUFFIX walks every entry in order
            entry = unsafe {
                ffi::av_dict_get(
                    self.ptr,
                    b"\0".as_ptr() as *const c_char,
                    entry,
                    ffi::AV_DICT_IGNORE_SUFFIX as c_int,
                )
            };
            if entry.is_null() {
                break;
            }
            // SAFETY: entry is owned by the dictionary
            unsafe {
                let key = c_string((*entry).key).unwrap_or_default();
                let value = c_string((*entry).value).unwrap_or_default();
                entries.push((key, value));
            }
        }
        entries
    }
}

unsafe fn codec_parameters<'a>(par: *const ffi::AVCodecParameters) -> Option<RawCodecParameters<'a>> {
    use ffi::{AVChannelOrder, AVChromaLocation, AVColorPrimaries, AVColorRange, AVColorSpace,
        AVColorTransferCharacteristic};

    if par.is_null() {
        return None;
    }
    let par = &*par;

    let descriptor = ffi::avcodec_descriptor_get(par.codec_id);
    let (codec_name, codec_long_name) = if descriptor.is_null() {
        (None, None)
    } else {
        (c_string((*descriptor).name), c_string((*descriptor).long_name))
    };

    let media_type = MediaType::from_raw(par.codec_type as i32);
    let format_name = match media_type {
        MediaType::Video => pixel_format_name(par.format),
        MediaType::Audio => sample_format_name(par.format),
        _ => None,
    };

    let extradata: &'a [u8] = if par.extradata.is_null() || par.extradata_size <= 0 {
        &[]
    } else {
        slice::from_raw_parts(par.extradata, par.extradata_size as usize)
    };

    let layout = &par.ch_layout;
    let channel_layout = if layout.order == AVChannelOrder::AV_CHANNEL_ORDER_NATIVE {
        layout.u.mask
    } else {
        0
    };

    Some(RawCodecParameters {
        media_type,
        codec_id: CodecId(par.codec_id as u32),
        codec_tag: par.codec_tag,
        codec_name,
        codec_long_name,
        profile: par.profile,
        profile_name: c_string(ffi::avcodec_profile_name(par.codec_id, par.profile)),
        bit_rate: par.bit_rate,
        extradata,
        width: par.width,
        height: par.height,
        video_delay: par.video_delay,
        format_name,
        level: par.level,
        color_range: (par.color_range != AVColorRange::AVCOL_RANGE_UNSPECIFIED)
            .then(|| c_string(ffi::av_color_range_name(par.color_range)))
            .flatten(),
        color_space: (par.color_space != AVColorSpace::AVCOL_SPC_UNSPECIFIED)
            .then(|| c_string(ffi::av_color_space_name(par.color_space)))
            .flatten(),
        color_transfer: (par.color_trc != AVColorTransferCharacteristic::AVCOL_TRC_UNSPECIFIED)
            .then(|| c_string(ffi::av_color_transfer_name(par.color_trc)))
            .flatten(),
        color_primaries: (par.color_primaries != AVColorPrimaries::AVCOL_PRI_UNSPECIFIED)
            .then(|| c_string(ffi::av_color_primaries_name(par.color_primaries)))
            .flatten(),
        chroma_location: (par.chroma_location != AVChromaLocation::AVCHROMA_LOC_UNSPECIFIED)
            .then(|| c_string(ffi::av_chroma_location_name(par.chroma_location)))
            .flatten(),
        field_order: field_order_name(par.field_order).map(str::to_owned),
        sample_rate: par.sample_rate,
        channels: layout.nb_channels,
        channel_layout,
        bits_per_sample: ffi::av_get_bits_per_sample(par.codec_id),
    })
}

/// Look the format up through the descriptor table rather than casting the
/// integer back into the enum
fn pixel_format_name(format: c_int) -> Option<String> {
    if format < 0 {
        return None;
    }
    let mut descriptor: *const ffi::AVPixFmtDescriptor = ptr::null();
    loop {
        // SAFETY: descriptors are static
        unsafe {
            descriptor = ffi::av_pix_fmt_desc_next(descriptor);
            if descriptor.is_null() {
                return None;
            }
            if ffi::av_pix_fmt_desc_get_id(descriptor) as c_int == format {
                return c_string((*descriptor).name);
            }
        }
    }
}

fn sample_format_name(format: c_int) -> Option<String> {
    if format < 0 || format >= ffi::AVSampleFormat::AV_SAMPLE_FMT_NB as c_int {
        return None;
    }
    // SAFETY: AVSampleFormat is a C int enum numbered contiguously below AV_SAMPLE_FMT_NB
    unsafe {
        let format = std::mem::transmute::<c_int, ffi::AVSampleFormat>(format);
        c_string(ffi::av_get_sample_fmt_name(format))
    }
}

fn field_order_name(order: ffi::AVFieldOrder) -> Option<&'static str> {
    use ffi::AVFieldOrder::*;
    match order {
        AV_FIELD_PROGRESSIVE => Some("progressive"),
        AV_FIELD_TT => Some("tt"),
        AV_FIELD_BB => Some("bb"),
        AV_FIELD_TB => Some("tb"),
        AV_FIELD_BT => Some("bt"),
        _ => None,
    }
}

fn rational(value: ffi::AVRational) -> Rational {
    Rational::new(value.num, value.den)
}

unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Message for a libav status code, when libav knows one
pub fn error_string(status: Status) -> Option<String> {
    let mut buffer = [0 as c_char; 256];
    // SAFETY: av_strerror writes at most buffer.len() bytes, NUL included
    let found = unsafe { ffi::av_strerror(status, buffer.as_mut_ptr(), buffer.len()) };
    if found < 0 {
        return None;
    }
    // SAFETY: buffer is NUL-terminated on success
    unsafe { c_string(buffer.as_ptr()) }
}
