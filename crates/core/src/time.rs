//! Hour-of-day boundary arithmetic.
//!
//! All instants are naive UTC timestamps. A boundary for a frequency `f` is
//! any instant on the hour whose hour-of-day is a multiple of `f`. Frequencies
//! are expected to divide 24 (enforced by config validation).

use chrono::{Duration, NaiveDateTime, Timelike};

/// Drops minutes, seconds and sub-second precision.
pub fn truncate_to_hour(instant: NaiveDateTime) -> NaiveDateTime {
    let seconds = i64::from(instant.minute() * 60 + instant.second());
    instant - Duration::seconds(seconds) - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

/// Most recent boundary at or before `instant`.
pub fn align_floor(instant: NaiveDateTime, freq_hours: u32) -> NaiveDateTime {
    let hour = truncate_to_hour(instant);
    hour - Duration::hours(i64::from(hour.hour() % freq_hours))
}

/// Earliest boundary at or after `instant`. Aligned instants are returned unchanged.
pub fn align_ceil(instant: NaiveDateTime, freq_hours: u32) -> NaiveDateTime {
    let floor = align_floor(instant, freq_hours);
    if floor == instant {
        instant
    } else {
        floor + Duration::hours(i64::from(freq_hours))
    }
}

/// First boundary strictly after the hour containing `instant`.
///
/// An instant already on a boundary advances by a full period. The window
/// generator relies on this to skip the window that would end exactly on the
/// triggering lead time's lower bound.
pub fn next_boundary_after(instant: NaiveDateTime, freq_hours: u32) -> NaiveDateTime {
    let hour = truncate_to_hour(instant);
    hour + Duration::hours(i64::from(freq_hours - hour.hour() % freq_hours))
}

/// Whether `instant` sits exactly on a boundary of `freq_hours`.
pub fn is_aligned(instant: NaiveDateTime, freq_hours: u32) -> bool {
    align_floor(instant, freq_hours) == instant
}
