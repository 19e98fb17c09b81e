//! Time display helpers.
//!
//! Comments show how long ago they were posted ("5 menit lalu"); chat bubbles
//! show the wall-clock send time ("14:05") in the site's display zone.

use jiff::Timestamp;
use jiff::tz::{Offset, TimeZone};

use crate::error::CoreError;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Label for anything younger than a minute, or stamped in the future.
pub const JUST_NOW: &str = "baru saja";

/// Format the age of `then` relative to `now` in Indonesian.
///
/// The delta is bucketed with integer division and the largest non-zero unit
/// wins. Deltas under one minute and negative deltas (clock skew between the
/// store and this host) both read as [`JUST_NOW`].
pub fn format_relative(now: Timestamp, then: Timestamp) -> String {
    let seconds = now.as_second() - then.as_second();

    let days = seconds / SECONDS_PER_DAY;
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = seconds / SECONDS_PER_MINUTE;

    if days > 0 {
        format!("{days} hari lalu")
    } else if hours > 0 {
        format!("{hours} jam lalu")
    } else if minutes > 0 {
        format!("{minutes} menit lalu")
    } else {
        JUST_NOW.to_string()
    }
}

/// Format `at` as a two-digit `HH:MM` clock reading in `zone`.
pub fn format_clock(at: Timestamp, zone: &TimeZone) -> String {
    at.to_zoned(zone.clone()).strftime("%H:%M").to_string()
}

/// Build a fixed-offset display zone, e.g. `7` for WIB.
pub fn fixed_zone(hours: i8) -> Result<TimeZone, CoreError> {
    let offset = Offset::from_hours(hours).map_err(|e| CoreError::InvalidOffset(e.to_string()))?;
    Ok(TimeZone::fixed(offset))
}
