use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::ValidationError;

/// UTC calendar day used as the snapshot partition key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CalendarDay {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl CalendarDay {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let month_enum = Month::try_from(month)
            .map_err(|_| ValidationError::InvalidCalendarDate { year, month, day })?;
        Date::from_calendar_date(year, month_enum, day)
            .map_err(|_| ValidationError::InvalidCalendarDate { year, month, day })?;
        Ok(Self { year, month, day })
    }

    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
            day: date.day(),
        }
    }

    /// Decompose a millisecond Unix timestamp into its UTC calendar day.
    pub fn from_unix_millis(millis: i64) -> Result<Self, ValidationError> {
        let moment = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_err(|_| ValidationError::TimestampOutOfRange { millis })?;
        Ok(Self::from_date(moment.date()))
    }

    pub fn today_utc() -> Self {
        Self::from_date(OffsetDateTime::now_utc().date())
    }

    /// The calendar day exactly one day before `moment`, in UTC.
    ///
    /// Rolls over month and year boundaries, including leap days.
    pub fn previous(moment: OffsetDateTime) -> Self {
        Self::from_date((moment - Duration::days(1)).date())
    }

    /// Strict `YYYY-MM-DD` parsing; out-of-range dates are rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let format = format_description!("[year]-[month]-[day]");
        let date = Date::parse(input, &format).map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })?;
        Ok(Self::from_date(date))
    }
}

impl Display for CalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn unix_millis_now() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
