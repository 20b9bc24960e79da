//! Channel layout naming.
//!
//! Well-known speaker arrangements get their registry name ("stereo",
//! "5.1(side)"). Anything else is described by its channel count followed by
//! the abbreviations of the channels present, e.g. "5 channels (FL+FR+FC+LFE+BL)".

const FL: u64 = 1 << 0;
const FR: u64 = 1 << 1;
const FC: u64 = 1 << 2;
const LFE: u64 = 1 << 3;
const BL: u64 = 1 << 4;
const BR: u64 = 1 << 5;
const FLC: u64 = 1 << 6;
const FRC: u64 = 1 << 7;
const BC: u64 = 1 << 8;
const SL: u64 = 1 << 9;
const SR: u64 = 1 << 10;
const TC: u64 = 1 << 11;
const TFL: u64 = 1 << 12;
const TFC: u64 = 1 << 13;
const TFR: u64 = 1 << 14;
const TBL: u64 = 1 << 15;
const TBC: u64 = 1 << 16;
const TBR: u64 = 1 << 17;
const DL: u64 = 1 << 29;
const DR: u64 = 1 << 30;
const WL: u64 = 1 << 31;
const WR: u64 = 1 << 32;
const LFE2: u64 = 1 << 35;
const TSL: u64 = 1 << 36;
const TSR: u64 = 1 << 37;
const BFC: u64 = 1 << 38;
const BFL: u64 = 1 << 39;
const BFR: u64 = 1 << 40;

pub const MONO: u64 = FC;
pub const STEREO: u64 = FL | FR;
const SURROUND: u64 = STEREO | FC;
const QUAD: u64 = STEREO | BL | BR;
const QUAD_SIDE: u64 = STEREO | SL | SR;
const FOUR_POINT_ZERO: u64 = SURROUND | BC;
const FIVE_POINT_ZERO_BACK: u64 = SURROUND | BL | BR;
const FIVE_POINT_ZERO: u64 = SURROUND | SL | SR;
const FIVE_POINT_ONE_BACK: u64 = FIVE_POINT_ZERO_BACK | LFE;
pub const FIVE_POINT_ONE: u64 = FIVE_POINT_ZERO | LFE;
const SIX_POINT_ZERO_FRONT: u64 = QUAD_SIDE | FLC | FRC;
const OCTAGONAL: u64 = FIVE_POINT_ZERO | BL | BC | BR;
pub const SEVEN_POINT_ONE: u64 = FIVE_POINT_ONE | BL | BR;

/// Named layouts as (name, channel count, mask), first match wins
const LAYOUTS: &[(&str, i32, u64)] = &[
    ("mono", 1, MONO),
    ("stereo", 2, STEREO),
    ("2.1", 3, STEREO | LFE),
    ("3.0", 3, SURROUND),
    ("3.0(back)", 3, STEREO | BC),
    ("4.0", 4, FOUR_POINT_ZERO),
    ("quad", 4, QUAD),
    ("quad(side)", 4, QUAD_SIDE),
    ("3.1", 4, SURROUND | LFE),
    ("5.0", 5, FIVE_POINT_ZERO_BACK),
    ("5.0(side)", 5, FIVE_POINT_ZERO),
    ("4.1", 5, FOUR_POINT_ZERO | LFE),
    ("5.1", 6, FIVE_POINT_ONE_BACK),
    ("5.1(side)", 6, FIVE_POINT_ONE),
    ("6.0", 6, FIVE_POINT_ZERO | BC),
    ("6.0(front)", 6, SIX_POINT_ZERO_FRONT),
    ("hexagonal", 6, FIVE_POINT_ZERO_BACK | BC),
    ("6.1", 7, FIVE_POINT_ONE | BC),
    ("6.1(back)", 7, FIVE_POINT_ONE_BACK | BC),
    ("6.1(front)", 7, SIX_POINT_ZERO_FRONT | LFE),
    ("7.0", 7, FIVE_POINT_ZERO | BL | BR),
    ("7.0(front)", 7, FIVE_POINT_ZERO | FLC | FRC),
    ("7.1", 8, SEVEN_POINT_ONE),
    ("7.1(wide)", 8, FIVE_POINT_ONE_BACK | FLC | FRC),
    ("7.1(wide-side)", 8, FIVE_POINT_ONE | FLC | FRC),
    ("7.1(top)", 8, FIVE_POINT_ONE_BACK | TFL | TFR),
    ("octagonal", 8, OCTAGONAL),
    ("cube", 8, QUAD | TFL | TFR | TBL | TBR),
    ("hexadecagonal", 16, OCTAGONAL | WL | WR | TBL | TBR | TBC | TFC | TFL | TFR),
    ("downmix", 2, DL | DR),
    (
        "22.2",
        24,
        FIVE_POINT_ONE_BACK | FLC | FRC | BC | LFE2 | SL | SR | TFL | TFR | TFC | TC | TBL | TBR | TSL | TSR | TBC | BFC | BFL | BFR,
    ),
];

/// Channel (abbreviation, description) by bit index; `None` for unassigned bits
const CHANNELS: [Option<(&str, &str)>; 41] = [
    Some(("FL", "front left")),
    Some(("FR", "front right")),
    Some(("FC", "front center")),
    Some(("LFE", "low frequency")),
    Some(("BL", "back left")),
    Some(("BR", "back right")),
    Some(("FLC", "front left-of-center")),
    Some(("FRC", "front right-of-center")),
    Some(("BC", "back center")),
    Some(("SL", "side left")),
    Some(("SR", "side right")),
    Some(("TC", "top center")),
    Some(("TFL", "top front left")),
    Some(("TFC", "top front center")),
    Some(("TFR", "top front right")),
    Some(("TBL", "top back left")),
    Some(("TBC", "top back center")),
    Some(("TBR", "top back right")),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some(("DL", "downmix left")),
    Some(("DR", "downmix right")),
    Some(("WL", "wide left")),
    Some(("WR", "wide right")),
    Some(("SDL", "surround direct left")),
    Some(("SDR", "surround direct right")),
    Some(("LFE2", "low frequency 2")),
    Some(("TSL", "top side left")),
    Some(("TSR", "top side right")),
    Some(("BFC", "bottom front center")),
    Some(("BFL", "bottom front left")),
    Some(("BFR", "bottom front right")),
];

/// Name the layout described by `channel_count` and `mask`.
///
/// A non-positive count is inferred from the number of bits set in `mask`.
pub fn name(channel_count: i32, mask: u64) -> String {
    let channel_count = if channel_count <= 0 {
        mask.count_ones() as i32
    } else {
        channel_count
    };

    if let Some((layout, _, _)) = LAYOUTS
        .iter()
        .find(|(_, count, layout_mask)| *count == channel_count && *layout_mask == mask)
    {
        return layout.to_string();
    }

    let mut description = format!("{} channels", channel_count);
    if mask != 0 {
        let channels: Vec<&str> = (0..64)
            .filter(|bit| mask & (1u64 << bit) != 0)
            .filter_map(channel_abbreviation)
            .collect();
        description.push_str(&format!(" ({})", channels.join("+")));
    }
    description
}

/// Short code for a channel bit index, e.g. 3 -> "LFE"
pub fn channel_abbreviation(bit: u32) -> Option<&'static str> {
    CHANNELS
        .get(bit as usize)
        .copied()
        .flatten()
        .map(|(abbreviation, _)| abbreviation)
}

/// Long description for a channel bit index, e.g. 3 -> "low frequency"
pub fn channel_description(bit: u32) -> Option<&'static str> {
    CHANNELS
        .get(bit as usize)
        .copied()
        .flatten()
        .map(|(_, description)| description)
}
