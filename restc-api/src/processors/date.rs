//! Date-convention processor.
//!
//! JSON carries timestamps as strings. This processor finds object entries
//! whose key contains "date" (case-insensitive) and whose value is an
//! ISO-8601 string, and replaces the string with a canonical timestamp.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::processor::JsonProcessor;

lazy_static! {
    // YYYY[-MM[-DD[THH:MM[:SS][.fff][Z|+HH:MM]]]]
    static ref ISO_8601: Regex = Regex::new(
        r"(?i)^(?P<year>[0-9]{4})(?:-(?P<month>[0-9][0-9])(?:-(?P<day>[0-9][0-9])(?:T(?P<hour>[0-9][0-9]):(?P<minute>[0-9][0-9])(?::(?P<second>[0-9][0-9]))?(?:\.(?P<fraction>[0-9]+))?(?P<offset>[+-][0-9][0-9]:[0-9][0-9]|Z)?)?)?)?$"
    ).unwrap();
}

/// How a recognised timestamp is written back into the JSON tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 in UTC with millisecond precision, e.g. `2023-01-15T10:00:00.000Z`.
    #[default]
    Rfc3339,
    /// Integer milliseconds since the Unix epoch.
    EpochMillis,
}

/// Parses ISO-8601 strings under keys that contain "date".
#[derive(Debug, Clone, Default)]
pub struct DateConventionProcessor {
    format: DateFormat,
}

impl DateConventionProcessor {
    pub fn new(format: DateFormat) -> Self {
        Self { format }
    }

    fn walk(&self, json: &mut Value) {
        match json {
            Value::Object(map) => {
                for (key, value) in map.iter_mut() {
                    match value {
                        Value::Array(items) => items.iter_mut().for_each(|item| self.walk(item)),
                        Value::String(text) => {
                            if key.to_lowercase().contains("date") {
                                if let Some(parsed) = parse_iso8601(text) {
                                    *value = self.render(parsed);
                                }
                            }
                        }
                        other => self.walk(other),
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.walk(item)),
            _ => {}
        }
    }

    fn render(&self, instant: DateTime<Utc>) -> Value {
        match self.format {
            DateFormat::Rfc3339 => {
                Value::String(instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            }
            DateFormat::EpochMillis => Value::from(instant.timestamp_millis()),
        }
    }
}

impl JsonProcessor for DateConventionProcessor {
    fn name(&self) -> &str {
        "dates"
    }

    fn process_json(&self, mut json: Value) -> Value {
        self.walk(&mut json);
        json
    }
}

/// Parse a (possibly partial) ISO-8601 timestamp.
///
/// Missing components default to the start of the period and a missing
/// offset means UTC. Returns `None` for strings that do not match the pattern
/// or name an impossible date or time.
pub fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_8601.captures(text)?;

    let year: i32 = caps["year"].parse().ok()?;
    let month = component(&caps, "month").unwrap_or(Some(1))?;
    let day = component(&caps, "day").unwrap_or(Some(1))?;
    let hour = component(&caps, "hour").unwrap_or(Some(0))?;
    let minute = component(&caps, "minute").unwrap_or(Some(0))?;
    let second = component(&caps, "second").unwrap_or(Some(0))?;
    let nanos = caps.name("fraction").map(|m| fraction_to_nanos(m.as_str())).unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    let local = NaiveDateTime::new(date, time);

    match caps.name("offset").map(|m| m.as_str()) {
        None => Some(Utc.from_utc_datetime(&local)),
        Some(z) if z.eq_ignore_ascii_case("z") => Some(Utc.from_utc_datetime(&local)),
        Some(offset) => {
            let sign = if offset.starts_with('-') { -1 } else { 1 };
            let hours: i32 = offset[1..3].parse().ok()?;
            let minutes: i32 = offset[4..6].parse().ok()?;
            let zone = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
            zone.from_local_datetime(&local)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// `None` when the group did not participate, `Some(None)` when it did but
/// does not fit a u32.
fn component(caps: &Captures, name: &str) -> Option<Option<u32>> {
    caps.name(name).map(|m| m.as_str().parse().ok())
}

/// First nine fraction digits as nanoseconds, right-padded with zeros.
fn fraction_to_nanos(digits: &str) -> u32 {
    digits
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| u32::from(b - b'0'))
        .chain(std::iter::repeat(0))
        .take(9)
        .fold(0, |nanos, digit| nanos * 10 + digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_date_key_is_parsed_sibling_is_not() {
        let input = json!({
            "createdDate": "2023-01-15T10:00:00Z",
            "name": "2023-01-15T10:00:00Z"
        });
        let out = DateConventionProcessor::default().process_json(input);
        assert_eq!(out["createdDate"], "2023-01-15T10:00:00.000Z");
        assert_eq!(out["name"], "2023-01-15T10:00:00Z");
    }

    #[test]
    fn test_key_match_is_case_insensitive() {
        let out = DateConventionProcessor::default()
            .process_json(json!({"DATE_OF_BIRTH": "1990-06-01", "updateDate": "2020"}));
        assert_eq!(out["DATE_OF_BIRTH"], "1990-06-01T00:00:00.000Z");
        assert_eq!(out["updateDate"], "2020-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_offsets_are_normalised_to_utc() {
        let out = DateConventionProcessor::default()
            .process_json(json!({"startDate": "2023-01-15T12:30:00.5+02:00"}));
        assert_eq!(out["startDate"], "2023-01-15T10:30:00.500Z");
    }

    #[test]
    fn test_epoch_millis_format() {
        let out = DateConventionProcessor::new(DateFormat::EpochMillis)
            .process_json(json!({"date": "1970-01-01T00:00:01Z"}));
        assert_eq!(out["date"], 1000);
    }

    #[test]
    fn test_recurses_into_arrays_and_objects() {
        let input = json!({
            "events": [
                {"eventDate": "2021-03-04", "label": "a"},
                {"nested": {"dueDate": "2021-03-05T08:00"}}
            ],
            "meta": {"lastDate": "not a date"}
        });
        let out = DateConventionProcessor::default().process_json(input);
        assert_eq!(out["events"][0]["eventDate"], "2021-03-04T00:00:00.000Z");
        assert_eq!(out["events"][0]["label"], "a");
        assert_eq!(out["events"][1]["nested"]["dueDate"], "2021-03-05T08:00:00.000Z");
        assert_eq!(out["meta"]["lastDate"], "not a date");
    }

    #[test]
    fn test_top_level_array_is_walked() {
        let out = DateConventionProcessor::default()
            .process_json(json!([{"date": "2000-02-29"}, "2000-02-29"]));
        assert_eq!(out[0]["date"], "2000-02-29T00:00:00.000Z");
        assert_eq!(out[1], "2000-02-29");
    }

    #[test]
    fn test_strings_inside_date_arrays_are_left_alone() {
        let out = DateConventionProcessor::default()
            .process_json(json!({"dates": ["2000-01-01"]}));
        assert_eq!(out["dates"][0], "2000-01-01");
    }

    #[test]
    fn test_scalar_input_is_noop() {
        let p = DateConventionProcessor::default();
        assert_eq!(p.process_json(json!("2023-01-15")), json!("2023-01-15"));
        assert_eq!(p.process_json(json!(7)), json!(7));
    }

    #[test]
    fn test_impossible_dates_stay_strings() {
        let out = DateConventionProcessor::default()
            .process_json(json!({"date": "2023-13-45", "otherDate": "2023-02-30"}));
        assert_eq!(out["date"], "2023-13-45");
        assert_eq!(out["otherDate"], "2023-02-30");
    }

    #[test]
    fn test_parse_iso8601_variants() {
        assert!(parse_iso8601("2023-01-15t10:00z").is_some());
        assert!(parse_iso8601("2023-01-15T10:00:00.123456789-05:30").is_some());
        assert!(parse_iso8601("2023-1-15").is_none());
        assert!(parse_iso8601("15/01/2023").is_none());
        assert_eq!(parse_iso8601("1999").map(|d| d.year()), Some(1999));
    }

    #[test]
    fn test_non_ascii_digits_are_not_dates() {
        let input = json!({
            "createdDate": "2023-01-15T10:00:00.\u{0660}",
            "dueDate": "\u{0662}\u{0660}\u{0662}\u{0663}-01-15"
        });
        let out = DateConventionProcessor::default().process_json(input.clone());
        assert_eq!(out, input);
        assert!(parse_iso8601("2023-01-15T10:00:00.\u{0661}Z").is_none());
    }

    #[test]
    fn test_fraction_precision() {
        assert_eq!(fraction_to_nanos("5"), 500_000_000);
        assert_eq!(fraction_to_nanos("123456789999"), 123_456_789);
    }

    #[test]
    fn test_parsed_value_decodes_as_datetime() {
        let out = DateConventionProcessor::default()
            .process_json(json!({"createdDate": "2023-01-15T10:00:00Z"}));
        let parsed: DateTime<Utc> = serde_json::from_value(out["createdDate"].clone()).unwrap();
        assert_eq!(parsed.timestamp(), 1_673_776_800);
    }
}
