//! Lenient ISO-8601 date parsing, normalized to UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses anything reasonably ISO-8601-like; naive inputs are taken as UTC
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Serializes with a literal `Z` and no fractional seconds
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parses and re-serializes in canonical form
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_datetime(raw).map(|dt| format_datetime(&dt))
}

/// Joins the start and end of a date range in canonical text
pub const DATE_RANGE_SEPARATOR: &str = "..";

/// Normalizes a date or a `start..end` range, each half on its own
///
/// A range with an empty end collapses to its start; any half that does not
/// parse makes the whole value unparsable.
pub fn normalize_date_range(raw: &str) -> Option<String> {
    let (start, end) = split_date_range(raw);
    let start = normalize_date(start)?;
    match end {
        Some(end) => Some(format!(
            "{}{}{}",
            start,
            DATE_RANGE_SEPARATOR,
            normalize_date(end)?
        )),
        None => Some(start),
    }
}

/// Splits date text into its start and non-blank end
pub fn split_date_range(text: &str) -> (&str, Option<&str>) {
    match text.split_once(DATE_RANGE_SEPARATOR) {
        Some((start, end)) => {
            let end = end.trim();
            (start.trim(), Some(end).filter(|e| !e.is_empty()))
        }
        None => (text.trim(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            normalize_date("2024-03-10T12:30:45+02:00").as_deref(),
            Some("2024-03-10T10:30:45Z")
        );
    }

    #[test]
    fn test_fractional_seconds_dropped() {
        assert_eq!(
            normalize_date("2024-03-10T12:30:45.123Z").as_deref(),
            Some("2024-03-10T12:30:45Z")
        );
    }

    #[test]
    fn test_naive_inputs_are_utc() {
        assert_eq!(
            normalize_date("2024-03-10 08:15:00").as_deref(),
            Some("2024-03-10T08:15:00Z")
        );
        assert_eq!(
            normalize_date("2024-03-10T08:15").as_deref(),
            Some("2024-03-10T08:15:00Z")
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(normalize_date("2024-03-10").as_deref(), Some("2024-03-10T00:00:00Z"));
        assert_eq!(normalize_date("2024/03/10").as_deref(), Some("2024-03-10T00:00:00Z"));
    }

    #[test]
    fn test_ranges_normalize_each_half() {
        assert_eq!(
            normalize_date_range("2024-03-10..2024-03-12T18:00:00+01:00").as_deref(),
            Some("2024-03-10T00:00:00Z..2024-03-12T17:00:00Z")
        );
        assert_eq!(
            normalize_date_range("2024-03-10T08:15:00.250Z..").as_deref(),
            Some("2024-03-10T08:15:00Z")
        );
        assert!(normalize_date_range("..2024-03-12").is_none());
        assert!(normalize_date_range("2024-03-10..someday").is_none());
    }

    #[test]
    fn test_split_date_range() {
        assert_eq!(split_date_range(" a .. b "), ("a", Some("b")));
        assert_eq!(split_date_range("a.. "), ("a", None));
        assert_eq!(split_date_range("a"), ("a", None));
    }

    #[test]
    fn test_garbage_is_none() {
        assert!(normalize_date("next tuesday").is_none());
        assert!(normalize_date("").is_none());
    }
}
