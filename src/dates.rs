use serde::Serializer;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::errors::BackendError;

/// The format shows are displayed in.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// The format dates are usually submitted in.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Formats a date as `MM/DD/YYYY`.
///
/// ```
/// use booking::dates::format_date;
/// use time::Date;
///
/// let date = Date::try_from_ymd(2024, 5, 1).unwrap();
/// assert_eq!(format_date(date), "05/01/2024");
/// ```
pub fn format_date(date: Date) -> String {
    date.format(DISPLAY_FORMAT)
}

/// Parses a date formatted by `format_date`.
pub fn parse_date(input: &str) -> Result<Date, BackendError> {
    Date::parse(input, DISPLAY_FORMAT).map_err(|_| malformed(input))
}

/// Parses a submitted show date. Accepts `YYYY-MM-DD`, `MM/DD/YYYY`,
/// and date-times starting with `YYYY-MM-DD` (the time is dropped).
pub fn parse_submitted_date(input: &str) -> Result<Date, BackendError> {
    let trimmed = input.trim();

    let day = match (trimmed.get(..10), trimmed.get(10..11)) {
        (Some(day), None) | (Some(day), Some("T")) | (Some(day), Some(" ")) => day,
        _ => return Err(malformed(input)),
    };

    Date::parse(day, ISO_FORMAT)
        .or_else(|_| Date::parse(day, DISPLAY_FORMAT))
        .map_err(|_| malformed(input))
}

/// Returns an offset from UTC, or an error if it's a day or more.
pub fn utc_offset(minutes: i32) -> Result<UtcOffset, BackendError> {
    if minutes.abs() >= MINUTES_PER_DAY {
        return Err(BackendError::InvalidUtcOffset(minutes));
    }

    Ok(UtcOffset::minutes(minutes as i16))
}

/// Returns the current calendar date at the given offset.
pub fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Serializes a date with `format_date`.
pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(*date))
}

fn malformed(input: &str) -> BackendError {
    BackendError::MalformedDate {
        input: input.to_owned(),
    }
}
