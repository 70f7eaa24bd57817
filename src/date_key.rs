use chrono::{Datelike, NaiveDate};

/// Builds the cache key for a date as zero-padded `YYYY-MM-DD`.
///
/// The key is assembled from the date's own fields, so no timezone shift can
/// move it onto the neighbouring day.
pub fn to_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parses a `YYYY-MM-DD` key back into a date.
pub fn from_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}
