use thiserror::Error;

/// Validation and contract errors exposed by `symreg-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exchange '{value}' is not known")]
    UnknownExchange { value: String },
    #[error("exchange id {id} is not known")]
    UnknownExchangeId { id: u16 },

    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidCalendarDate { year: i32, month: u8, day: u8 },
    #[error("date must match YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("timestamp {millis}ms is outside the representable range")]
    TimestampOutOfRange { millis: i64 },
}
