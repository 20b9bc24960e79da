//! Pure conversions from raw driver values to model values

pub mod channel_layout;
pub mod fourcc;
pub mod tags;
pub mod time;

pub use fourcc::codec_tag_string;
pub use time::{to_duration, NO_TIMESTAMP};
