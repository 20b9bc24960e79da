// Codec identity, media classification and disposition flags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Driver codec identifier, numbered as in libavcodec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodecId(pub u32);

impl CodecId {
    pub const NONE: CodecId = CodecId(0);
    pub const MPEG1VIDEO: CodecId = CodecId(1);
    pub const MPEG2VIDEO: CodecId = CodecId(2);
    pub const H263: CodecId = CodecId(4);
    pub const MJPEG: CodecId = CodecId(7);
    pub const MPEG4: CodecId = CodecId(12);
    pub const RAWVIDEO: CodecId = CodecId(13);
    pub const H264: CodecId = CodecId(27);
    pub const VP8: CodecId = CodecId(139);
    pub const VP9: CodecId = CodecId(167);
    pub const HEVC: CodecId = CodecId(173);
    pub const AV1: CodecId = CodecId(226);

    pub const PCM_S16LE: CodecId = CodecId(0x10000);
    pub const MP2: CodecId = CodecId(0x15000);
    pub const MP3: CodecId = CodecId(0x15001);
    pub const AAC: CodecId = CodecId(0x15002);
    pub const AC3: CodecId = CodecId(0x15003);
    pub const DTS: CodecId = CodecId(0x15004);
    pub const VORBIS: CodecId = CodecId(0x15005);
    pub const FLAC: CodecId = CodecId(0x1500c);

    pub const DVD_SUBTITLE: CodecId = CodecId(0x17000);
    pub const DVB_SUBTITLE: CodecId = CodecId(0x17001);
    pub const TEXT: CodecId = CodecId(0x17002);
    pub const SSA: CodecId = CodecId(0x17004);
    pub const MOV_TEXT: CodecId = CodecId(0x17005);

    /// Placeholder the driver assigns while a stream's codec is still undetermined
    pub const PROBE: CodecId = CodecId(0x19000);

    /// True for the "not yet identified" placeholder
    pub fn is_unidentified(&self) -> bool {
        *self == Self::PROBE
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media type classification of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Unknown,
    Video,
    Audio,
    Data,
    Subtitle,
    Attachment,
}

impl MediaType {
    /// Map the driver's numeric media type (-1 = unknown)
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => MediaType::Video,
            1 => MediaType::Audio,
            2 => MediaType::Data,
            3 => MediaType::Subtitle,
            4 => MediaType::Attachment,
            _ => MediaType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Unknown => "unknown",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Data => "data",
            MediaType::Subtitle => "subtitle",
            MediaType::Attachment => "attachment",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream role flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Disposition(pub i32);

impl Disposition {
    pub const DEFAULT: i32 = 0x1;
    pub const DUB: i32 = 0x2;
    pub const ORIGINAL: i32 = 0x4;
    pub const COMMENT: i32 = 0x8;
    pub const LYRICS: i32 = 0x10;
    pub const KARAOKE: i32 = 0x20;
    pub const FORCED: i32 = 0x40;
    pub const HEARING_IMPAIRED: i32 = 0x80;
    pub const VISUAL_IMPAIRED: i32 = 0x100;
    pub const CLEAN_EFFECTS: i32 = 0x200;
    pub const ATTACHED_PIC: i32 = 0x400;
    pub const TIMED_THUMBNAILS: i32 = 0x800;
    pub const NON_DIEGETIC: i32 = 0x1000;
    pub const CAPTIONS: i32 = 0x10000;
    pub const DESCRIPTIONS: i32 = 0x20000;
    pub const METADATA: i32 = 0x40000;
    pub const DEPENDENT: i32 = 0x80000;
    pub const STILL_IMAGE: i32 = 0x100000;

    const NAMES: [(i32, &'static str); 18] = [
        (Self::DEFAULT, "default"),
        (Self::DUB, "dub"),
        (Self::ORIGINAL, "original"),
        (Self::COMMENT, "comment"),
        (Self::LYRICS, "lyrics"),
        (Self::KARAOKE, "karaoke"),
        (Self::FORCED, "forced"),
        (Self::HEARING_IMPAIRED, "hearing_impaired"),
        (Self::VISUAL_IMPAIRED, "visual_impaired"),
        (Self::CLEAN_EFFECTS, "clean_effects"),
        (Self::ATTACHED_PIC, "attached_pic"),
        (Self::TIMED_THUMBNAILS, "timed_thumbnails"),
        (Self::NON_DIEGETIC, "non_diegetic"),
        (Self::CAPTIONS, "captions"),
        (Self::DESCRIPTIONS, "descriptions"),
        (Self::METADATA, "metadata"),
        (Self::DEPENDENT, "dependent"),
        (Self::STILL_IMAGE, "still_image"),
    ];

    pub fn contains(&self, flag: i32) -> bool {
        self.0 & flag == flag
    }

    pub fn is_default(&self) -> bool {
        self.contains(Self::DEFAULT)
    }

    pub fn is_forced(&self) -> bool {
        self.contains(Self::FORCED)
    }

    pub fn is_attached_pic(&self) -> bool {
        self.contains(Self::ATTACHED_PIC)
    }

    /// Names of the known flags that are set, lowest bit first
    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}
