//! Date and instant helpers shared by the classifier and the reminder
//! scheduler. Instants are RFC 3339 strings in storage; calendar dates are
//! `YYYY-MM-DD` with no time-of-day significance.

use crate::error::AppError;
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time, UtcOffset};

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}

pub fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn parse_instant(raw: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|_| AppError::invalid_input("datetime must be RFC3339"))
}

pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, DATE_FORMAT).map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

pub fn format_instant(instant: OffsetDateTime) -> Result<String, AppError> {
    instant
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn format_date(date: Date) -> Result<String, AppError> {
    date.format(&DATE_FORMAT)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// The given calendar date at `hour:minute` local time, where "local" is the
/// offset carried by the caller's clock. Returns `None` only for components
/// outside the valid range.
pub fn at_time_of_day(
    date: Date,
    hour: u8,
    minute: u8,
    offset: UtcOffset,
) -> Option<OffsetDateTime> {
    let time = Time::from_hms(hour, minute, 0).ok()?;
    Some(date.with_time(time).assume_offset(offset))
}

pub fn whole_days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}
