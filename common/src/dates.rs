// Calendar date handling for request parameters and stored measurement dates

use crate::errors::DateError;
use chrono::{Duration, NaiveDate};

/// Wire and storage format of every date in the dataset
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the rolling window anchored on the latest measurement
pub const ONE_YEAR_DAYS: i64 = 365;

/// Parse a strict `YYYY-MM-DD` date.
///
/// Unlike `NaiveDate::parse_from_str`, single-digit months or days, signs,
/// and surrounding whitespace are rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate, DateError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(DateError::InvalidFormat(input.to_string()));
    }

    // Slices are ASCII digits at this point
    let year: i32 = input[0..4]
        .parse()
        .map_err(|_| DateError::InvalidFormat(input.to_string()))?;
    let month: u32 = input[5..7]
        .parse()
        .map_err(|_| DateError::InvalidFormat(input.to_string()))?;
    let day: u32 = input[8..10]
        .parse()
        .map_err(|_| DateError::InvalidFormat(input.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::OutOfRange(input.to_string()))
}

/// Format a date the way the dataset stores it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Start of the one-year window: a fixed 365-day offset, leap days included
pub fn one_year_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(ONE_YEAR_DAYS)
}
