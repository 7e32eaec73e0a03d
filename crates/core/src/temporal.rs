//! Best-effort coercion of scalar field values into points in time.
//!
//! Used by the keep-latest / keep-earliest merge strategies. Layouts are tried
//! in a fixed order and the first that parses wins. Values without an offset
//! are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Layouts carrying an explicit UTC offset, tried after RFC 3339.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Date-time layouts without an offset.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, resolved to midnight UTC.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a field value as a timestamp.
///
/// Strings are parsed as-is and numbers through their decimal rendering.
/// Anything else, or a string no layout accepts, yields `None`.
pub fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_time_str(s),
        Value::Number(n) => parse_time_str(&n.to_string()),
        _ => None,
    }
}

/// Parse a string as a timestamp using the ordered layout list.
pub fn parse_time_str(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(input, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, layout) {
            return Some(naive.and_utc());
        }
    }

    DATE_LAYOUTS.iter().find_map(|layout| {
        NaiveDate::parse_from_str(input, layout)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_variants() {
        assert_eq!(
            parse_time(&json!("2024-03-01T10:15:00Z")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
        assert_eq!(
            parse_time(&json!("2024-03-01T12:15:00+02:00")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
        let nanos = parse_time(&json!("2024-03-01T10:15:00.123456789Z")).unwrap();
        assert_eq!(nanos.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn parses_compact_and_space_separated_offsets() {
        assert_eq!(
            parse_time(&json!("2024-03-01T17:15:00+0700")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
        assert_eq!(
            parse_time(&json!("2024-03-01 11:15:00+01:00")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
    }

    #[test]
    fn parses_naive_layouts_as_utc() {
        assert_eq!(
            parse_time(&json!("2024-03-01 10:15:00")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
        assert_eq!(
            parse_time(&json!("2024-03-01T10:15:00.500")).map(|t| t.timestamp_subsec_millis()),
            Some(500)
        );
        assert_eq!(
            parse_time(&json!("2024-03-01T10:15")),
            Some(utc(2024, 3, 1, 10, 15, 0))
        );
    }

    #[test]
    fn parses_dates_as_midnight() {
        assert_eq!(parse_time(&json!("2024-03-01")), Some(utc(2024, 3, 1, 0, 0, 0)));
        assert_eq!(parse_time(&json!("2024/03/01")), Some(utc(2024, 3, 1, 0, 0, 0)));
    }

    #[test]
    fn unparseable_values_yield_none() {
        assert_eq!(parse_time(&json!("")), None);
        assert_eq!(parse_time(&json!("yesterday")), None);
        assert_eq!(parse_time(&json!(1_700_000_000)), None);
        assert_eq!(parse_time(&json!(true)), None);
        assert_eq!(parse_time(&Value::Null), None);
        assert_eq!(parse_time(&json!({"at": "2024-03-01"})), None);
        assert_eq!(parse_time(&json!(["2024-03-01"])), None);
    }
}
