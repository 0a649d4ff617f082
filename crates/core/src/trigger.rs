//! Ingestion notifications that start an invocation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a notification cannot be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Invalid issue date {0:?}: expected YYYYMMDD")]
    InvalidDate(String),

    #[error("Invalid issue hour {0:?}: expected HH in 00-23")]
    InvalidHour(String),
}

/// One forecast file the ingestion side has just handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Issue date, `YYYYMMDD`.
    #[serde(rename = "date")]
    pub issue_date: String,
    /// Issue hour, `HH`.
    #[serde(rename = "time")]
    pub issue_time: String,
    /// Lead time in hours.
    pub step: u32,
    /// URI of the ingested file, passed through to preprocessing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Trigger {
    /// Build a trigger, rejecting dates and hours that do not parse.
    pub fn parse(
        issue_date: impl Into<String>,
        issue_time: impl Into<String>,
        step: u32,
        location: Option<String>,
    ) -> Result<Self, TriggerError> {
        let trigger = Self {
            issue_date: issue_date.into(),
            issue_time: issue_time.into(),
            step,
            location,
        };
        trigger.issue_datetime()?;
        Ok(trigger)
    }

    /// The forecast run this notification belongs to.
    pub fn issue_datetime(&self) -> Result<NaiveDateTime, TriggerError> {
        if self.issue_date.len() != 8 || !self.issue_date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TriggerError::InvalidDate(self.issue_date.clone()));
        }
        let date = NaiveDate::parse_from_str(&self.issue_date, "%Y%m%d")
            .map_err(|_| TriggerError::InvalidDate(self.issue_date.clone()))?;

        let hour_text = self.issue_time.as_str();
        if hour_text.is_empty()
            || hour_text.len() > 2
            || !hour_text.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TriggerError::InvalidHour(self.issue_time.clone()));
        }
        let hour: u32 = hour_text
            .parse()
            .map_err(|_| TriggerError::InvalidHour(self.issue_time.clone()))?;

        date.and_hms_opt(hour, 0, 0)
            .ok_or_else(|| TriggerError::InvalidHour(self.issue_time.clone()))
    }
}
