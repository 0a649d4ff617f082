//! Canonical identities for forecast products.
//!
//! A forecast product is one IFS run (its issue time) at a given lead time.
//! Ledger lookups are keyed by the identity's serialized form:
//! `YYYYMMDDHHMM` of the issue time followed by the zero-padded offset.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Timelike};
use thiserror::Error;

/// Minute-precision format used for issue times in identity keys.
pub const ISSUE_TIME_FORMAT: &str = "%Y%m%d%H%M";

const ISSUE_TIME_WIDTH: usize = 12;

/// One forecast product at a specific lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForecastIdentity {
    /// When the forecast run was issued.
    pub issue_time: NaiveDateTime,
    /// Hours past `issue_time`.
    pub offset_hours: u32,
}

impl ForecastIdentity {
    pub fn new(issue_time: NaiveDateTime, offset_hours: u32) -> Self {
        Self {
            issue_time,
            offset_hours,
        }
    }

    /// The instant this product describes.
    pub fn valid_time(&self) -> NaiveDateTime {
        self.issue_time + Duration::hours(i64::from(self.offset_hours))
    }

    /// Fixed-width ledger key, e.g. `20231022060004`.
    pub fn serialize(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ForecastIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}",
            self.issue_time.format(ISSUE_TIME_FORMAT),
            self.offset_hours
        )
    }
}

/// Error parsing a serialized identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIdentityError {
    #[error("identity key too short: {0:?}")]
    TooShort(String),

    #[error("invalid issue time in identity key: {0:?}")]
    InvalidIssueTime(String),

    #[error("invalid offset in identity key: {0:?}")]
    InvalidOffset(String),
}

impl FromStr for ForecastIdentity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < ISSUE_TIME_WIDTH + 2 || !s.is_ascii() {
            return Err(ParseIdentityError::TooShort(s.to_string()));
        }
        let (time_part, offset_part) = s.split_at(ISSUE_TIME_WIDTH);

        let issue_time = NaiveDateTime::parse_from_str(time_part, ISSUE_TIME_FORMAT)
            .map_err(|_| ParseIdentityError::InvalidIssueTime(s.to_string()))?;
        let offset_hours = offset_part
            .parse::<u32>()
            .map_err(|_| ParseIdentityError::InvalidOffset(s.to_string()))?;

        Ok(Self::new(issue_time, offset_hours))
    }
}

/// Attributes `instant` to the latest forecast run that covers it.
///
/// An instant falling exactly on an issue boundary belongs to the previous
/// run at offset `tfreq`, never to the new run at offset 0.
pub fn label(instant: NaiveDateTime, tfreq: u32) -> ForecastIdentity {
    let remainder = instant.hour() % tfreq;
    let offset_hours = if remainder != 0 { remainder } else { tfreq };

    ForecastIdentity::new(
        instant - Duration::hours(i64::from(offset_hours)),
        offset_hours,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_label_between_issue_times() {
        let identity = label(at(22, 10), 6);
        assert_eq!(identity.issue_time, at(22, 6));
        assert_eq!(identity.offset_hours, 4);
        assert_eq!(identity.serialize(), "20231022060004");
    }

    #[test]
    fn test_label_on_issue_boundary_uses_previous_run() {
        let identity = label(at(22, 12), 6);
        assert_eq!(identity.issue_time, at(22, 6));
        assert_eq!(identity.offset_hours, 6);
        assert_eq!(identity.serialize(), "20231022060006");
    }

    #[test]
    fn test_label_at_midnight_crosses_day() {
        let identity = label(at(22, 0), 6);
        assert_eq!(identity.issue_time, at(21, 18));
        assert_eq!(identity.serialize(), "20231021180006");
    }

    #[test]
    fn test_label_never_produces_offset_zero() {
        for tfreq in [1, 2, 3, 4, 6, 8, 12, 24] {
            for hour in 0..24 {
                let instant = at(22, hour);
                let identity = label(instant, tfreq);
                assert!(identity.offset_hours > 0);
                assert!(identity.offset_hours <= tfreq);
                assert_eq!(identity.valid_time(), instant);
                if hour % tfreq == 0 {
                    assert_eq!(identity.offset_hours, tfreq);
                }
            }
        }
    }

    #[test]
    fn test_parse_identity() {
        let identity: ForecastIdentity = "20231022060012".parse().unwrap();
        assert_eq!(identity, ForecastIdentity::new(at(22, 6), 12));

        let long_lead: ForecastIdentity = "202310220600120".parse().unwrap();
        assert_eq!(long_lead.offset_hours, 120);
        assert_eq!(long_lead.to_string(), "202310220600120");
    }

    #[test]
    fn test_parse_identity_errors() {
        assert!(matches!(
            "2023102206".parse::<ForecastIdentity>(),
            Err(ParseIdentityError::TooShort(_))
        ));
        assert!(matches!(
            "20231322060012".parse::<ForecastIdentity>(),
            Err(ParseIdentityError::InvalidIssueTime(_))
        ));
        assert!(matches!(
            "2023102206001x".parse::<ForecastIdentity>(),
            Err(ParseIdentityError::InvalidOffset(_))
        ));
    }
}
