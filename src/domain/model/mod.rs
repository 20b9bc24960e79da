// Domain models - the immutable probe result graph

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::convert::time::serde_seconds;

mod codec;
mod rational;
mod tags;

pub use codec::{CodecId, Disposition, MediaType};
pub use rational::Rational;
pub use tags::Tags;

#[cfg(test)]
mod tests;

/// Everything learned about one probed input.
///
/// Built once per probe and never mutated afterwards. It holds no driver
/// handles. `size` and `bit_rate` use 0 for "unknown"; see
/// [`ProbeResult::known_size`] and [`ProbeResult::known_bit_rate`] for
/// explicit optional views.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Programs in container order
    pub programs: Vec<Program>,
    /// Streams in container order; `streams[i].index() == i`
    pub streams: Vec<Stream>,
    /// Chapters in container order
    pub chapters: Vec<Chapter>,
    /// Short format name(s), e.g. "mov,mp4,m4a,3gp,3g2,mj2"
    pub format_name: String,
    /// Descriptive format name, e.g. "QuickTime / MOV"
    pub format_long_name: String,
    pub extensions: Option<String>,
    pub mime_type: Option<String>,
    #[serde(with = "serde_seconds")]
    pub start_time: Option<Duration>,
    #[serde(with = "serde_seconds")]
    pub duration: Option<Duration>,
    /// Input size in bytes, 0 when it could not be determined
    pub size: u64,
    /// Bits per second, 0 when unknown
    pub bit_rate: u64,
    /// Format detection confidence, 0 to 100
    pub probe_score: u8,
    pub tags: Tags,
}

impl ProbeResult {
    /// Size in bytes, `None` when the driver could not determine it
    pub fn known_size(&self) -> Option<u64> {
        (self.size > 0).then_some(self.size)
    }

    /// Container bit rate, `None` when unknown
    pub fn known_bit_rate(&self) -> Option<u64> {
        (self.bit_rate > 0).then_some(self.bit_rate)
    }

    /// Value of the `encoder` tag, any case
    pub fn encoder(&self) -> Option<&str> {
        self.tags.get_ignore_case("encoder")
    }

    pub fn videos(&self) -> impl Iterator<Item = &VideoStream> {
        self.streams.iter().filter_map(Stream::as_video)
    }

    pub fn audios(&self) -> impl Iterator<Item = &AudioStream> {
        self.streams.iter().filter_map(Stream::as_audio)
    }

    pub fn subtitles(&self) -> impl Iterator<Item = &SubtitleStream> {
        self.streams.iter().filter_map(Stream::as_subtitle)
    }
}

/// A program (service) of a multi-program container such as MPEG-TS
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub id: i32,
    pub num: i32,
    pub mapping_table_pid: i32,
    pub clock_reference_pid: i32,
    pub tags: Tags,
}

/// A chapter mark
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    #[serde(with = "serde_seconds")]
    pub start: Option<Duration>,
    #[serde(with = "serde_seconds")]
    pub end: Option<Duration>,
    pub tags: Tags,
}

impl Chapter {
    /// Value of the `title` tag, any case
    pub fn title(&self) -> Option<&str> {
        self.tags.get_ignore_case("title")
    }
}

/// Fields shared by every stream kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Container-assigned id, 0 unless the format shows explicit ids
    pub id: i32,
    /// Position in [`ProbeResult::streams`]
    pub index: usize,
    pub codec_id: CodecId,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub codec_type: MediaType,
    /// Raw little-endian four-character code
    pub codec_tag: u32,
    pub codec_tag_string: String,
    /// Decoder property bits; only video decoders set them
    pub codec_properties: u32,
    pub profile: i32,
    pub profile_name: Option<String>,
    pub frame_rate: Rational,
    pub average_frame_rate: Rational,
    #[serde(with = "serde_seconds")]
    pub start_time: Option<Duration>,
    #[serde(with = "serde_seconds")]
    pub duration: Option<Duration>,
    pub bit_rate: u64,
    pub max_bit_rate: u64,
    pub bits_per_raw_sample: i32,
    pub frame_count: u64,
    pub disposition: Disposition,
    pub extradata: Vec<u8>,
    /// Exported decoder options; empty when no decoder could be opened
    pub private_data: Tags,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoStream {
    #[serde(flatten)]
    pub info: StreamInfo,
    pub width: u32,
    pub height: u32,
    pub coded_width: u32,
    pub coded_height: u32,
    pub video_delay: i32,
    /// Zero when pixels are square or the ratio is unknown
    pub sample_aspect_ratio: Rational,
    /// Zero whenever `sample_aspect_ratio` is zero
    pub display_aspect_ratio: Rational,
    pub pixel_format: Option<String>,
    pub level: i32,
    pub color_range: Option<String>,
    pub color_space: Option<String>,
    pub color_transfer: Option<String>,
    pub color_primaries: Option<String>,
    pub chroma_location: Option<String>,
    pub field_order: Option<String>,
    pub refs: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioStream {
    #[serde(flatten)]
    pub info: StreamInfo,
    pub sample_format: Option<String>,
    pub sample_rate: u32,
    pub channel_count: u32,
    pub channel_layout_mask: u64,
    /// Present only when `channel_layout_mask` is nonzero
    pub channel_layout_name: Option<String>,
    pub bits_per_sample: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubtitleStream {
    #[serde(flatten)]
    pub info: StreamInfo,
    pub width: u32,
    pub height: u32,
}

/// One elementary stream, classified by media type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Stream {
    Video(VideoStream),
    Audio(AudioStream),
    Subtitle(SubtitleStream),
    /// Data, attachment and unknown streams
    Other(StreamInfo),
}

impl Stream {
    /// Common fields of any variant
    pub fn info(&self) -> &StreamInfo {
        match self {
            Stream::Video(video) => &video.info,
            Stream::Audio(audio) => &audio.info,
            Stream::Subtitle(subtitle) => &subtitle.info,
            Stream::Other(info) => info,
        }
    }

    pub fn index(&self) -> usize {
        self.info().index
    }

    pub fn codec_type(&self) -> MediaType {
        self.info().codec_type
    }

    pub fn tags(&self) -> &Tags {
        &self.info().tags
    }

    /// Value of the `language` tag, any case
    pub fn language(&self) -> Option<&str> {
        self.tags().get_ignore_case("language")
    }

    /// Value of the `title` tag, any case
    pub fn title(&self) -> Option<&str> {
        self.tags().get_ignore_case("title")
    }

    pub fn as_video(&self) -> Option<&VideoStream> {
        match self {
            Stream::Video(video) => Some(video),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioStream> {
        match self {
            Stream::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_subtitle(&self) -> Option<&SubtitleStream> {
        match self {
            Stream::Subtitle(subtitle) => Some(subtitle),
            _ => None,
        }
    }
}
