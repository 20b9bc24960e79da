//! Driver timestamps to durations.
//!
//! All arithmetic is integer-exact: the tick count is scaled to nanoseconds
//! through a 128-bit intermediate, so 90 kHz broadcast clocks convert without
//! rounding drift.

use chrono::Duration;

use crate::domain::model::Rational;

/// Reserved "no timestamp" value used by the driver
pub const NO_TIMESTAMP: i64 = i64::MIN;

/// Ticks per second of the container-wide clock (microseconds)
pub const CONTAINER_CLOCK: i32 = 1_000_000;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Convert `timestamp` ticks of `time_base` into a duration.
///
/// Returns `None` when the time base has a zero denominator. Instants
/// (`is_duration == false`) are absent when `timestamp` is
/// [`NO_TIMESTAMP`]; durations are absent when `timestamp` is 0. Results
/// outside the representable range are also absent.
pub fn to_duration(timestamp: i64, time_base: Rational, is_duration: bool) -> Option<Duration> {
    if time_base.den == 0 {
        return None;
    }
    if is_duration {
        if timestamp == 0 {
            return None;
        }
    } else if timestamp == NO_TIMESTAMP {
        return None;
    }

    let nanos = timestamp as i128 * time_base.num as i128 * NANOS_PER_SECOND / time_base.den as i128;
    i64::try_from(nanos).ok().map(Duration::nanoseconds)
}

/// Same as [`to_duration`] for a clock given in ticks per second
pub fn to_duration_per_second(timestamp: i64, ticks_per_second: i32, is_duration: bool) -> Option<Duration> {
    to_duration(timestamp, Rational::new(1, ticks_per_second), is_duration)
}

/// Point in time on a stream or chapter clock
pub fn instant(timestamp: i64, time_base: Rational) -> Option<Duration> {
    to_duration(timestamp, time_base, false)
}

/// Fractional seconds, as used for serialization and display
pub fn as_seconds(duration: &Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// Serde adapter storing `Option<Duration>` as fractional seconds
pub mod serde_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&super::as_seconds(duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let seconds = Option::<f64>::deserialize(deserializer)?;
        Ok(seconds.map(|s| Duration::nanoseconds((s * 1e9).round() as i64)))
    }
}
