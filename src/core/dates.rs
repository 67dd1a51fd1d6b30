//! Day index calendar for the DIST-ALERT date encoding
//!
//! DIST-ALERT stores disturbance dates as a count of days since 2020-12-31.

use crate::types::{DayIndex, DistError, DistResult};
use chrono::{Duration, NaiveDate};

/// Calendar format used for snapshot labels (month-day-year)
pub const STANDARD_DATE_FORMAT: &str = "%m-%d-%Y";

/// Day zero of the DIST-ALERT time axis
pub fn reference_date() -> NaiveDate {
    // Constant, always a valid calendar date
    NaiveDate::from_ymd_opt(2020, 12, 31).expect("2020-12-31 is a valid date")
}

/// Calendar date for a day index
pub fn date_for_day(day: DayIndex) -> DistResult<NaiveDate> {
    Duration::try_days(day)
        .and_then(|offset| reference_date().checked_add_signed(offset))
        .ok_or(DistError::DateOutOfRange(day))
}

/// Day index to `MM-DD-YYYY`
pub fn standard_date(day: DayIndex) -> DistResult<String> {
    Ok(date_for_day(day)?.format(STANDARD_DATE_FORMAT).to_string())
}

/// Day index of a calendar date
pub fn day_index(date: NaiveDate) -> DayIndex {
    date.signed_duration_since(reference_date()).num_days()
}

/// Inverse of [`standard_date`]
pub fn parse_standard_date(label: &str) -> DistResult<DayIndex> {
    let date = NaiveDate::parse_from_str(label.trim(), STANDARD_DATE_FORMAT)
        .map_err(|e| DistError::Config(format!("Invalid date '{}': {}", label, e)))?;
    Ok(day_index(date))
}
