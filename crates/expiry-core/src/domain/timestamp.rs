//! Expiry timestamps and the form-field parser.
//!
//! A `Timestamp` is an absolute point in time in Unix epoch seconds. Absence is
//! always `Option<Timestamp>`, so a stored `0` is a real timestamp and never
//! means "unset".

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Naive formats accepted from the edit form, tried in order.
///
/// The first one is what the date-time picker emits.
const NAIVE_FORMATS: &[&str] = &[
    "%d %B %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Display format for a pre-filled form field (`19 October 2026 14:30`).
const DISPLAY_FORMAT: &str = "%-d %B %Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

/// TimestampError は文字列から Timestamp への変換失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("stored expiry value {0:?} is not a decimal timestamp")]
    NotDecimal(String),

    #[error("unrecognized date {0:?}")]
    Unrecognized(String),

    #[error("date {0:?} is out of range")]
    OutOfRange(String),
}

impl Timestamp {
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Decode the persisted layout: a plain decimal string.
    pub fn from_stored(raw: &str) -> Result<Self, TimestampError> {
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TimestampError::NotDecimal(raw.to_string()))
    }

    /// Encode into the persisted layout.
    pub fn to_stored(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Turns what an editor typed into an optional timestamp.
///
/// Naive dates are read in a fixed site offset, the same offset used when the
/// stored value is rendered back into the form.
#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    offset: FixedOffset,
}

impl TimestampParser {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// `None` when the seconds are outside ±24h.
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse a submitted field value.
    ///
    /// Blank input is the "unset" default and yields `Ok(None)`.
    pub fn parse(&self, raw: &str) -> Result<Option<Timestamp>, TimestampError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(None);
        }

        if let Ok(secs) = value.parse::<i64>() {
            return Ok(Some(Timestamp(secs)));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Some(Timestamp::from_datetime(&dt)));
        }

        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| TimestampError::Unrecognized(value.to_string()))?;

        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| Some(Timestamp::from_datetime(&dt)))
            .ok_or_else(|| TimestampError::OutOfRange(value.to_string()))
    }

    /// Render a timestamp the way the date-time picker shows it.
    pub fn display(&self, ts: Timestamp) -> String {
        match ts.to_datetime() {
            Some(dt) => dt.with_timezone(&self.offset).format(DISPLAY_FORMAT).to_string(),
            None => ts.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn site_parser() -> TimestampParser {
        TimestampParser::from_offset_seconds(2 * 3600).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Timestamp::from_datetime(&Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap())
    }

    #[test]
    fn stored_layout_is_plain_decimal() {
        assert_eq!(Timestamp::from_stored("1700000000"), Ok(Timestamp::from_secs(1_700_000_000)));
        assert_eq!(Timestamp::from_secs(1_700_050_000).to_stored(), "1700050000");
        assert!(matches!(
            Timestamp::from_stored("tomorrow"),
            Err(TimestampError::NotDecimal(_))
        ));
    }

    #[test]
    fn zero_is_a_real_timestamp() {
        assert_eq!(site_parser().parse("0"), Ok(Some(Timestamp::from_secs(0))));
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    fn blank_input_means_unset(#[case] raw: &str) {
        assert_eq!(site_parser().parse(raw), Ok(None));
    }

    #[rstest]
    #[case::picker("19 October 2026 14:30", utc(2026, 10, 19, 12, 30))]
    #[case::iso_minutes("2026-10-19 14:30", utc(2026, 10, 19, 12, 30))]
    #[case::iso_t("2026-10-19T14:30", utc(2026, 10, 19, 12, 30))]
    #[case::date_only("2026-10-19", utc(2026, 10, 18, 22, 0))]
    #[case::rfc3339("2026-10-19T12:30:00Z", utc(2026, 10, 19, 12, 30))]
    #[case::epoch("1792413000", utc(2026, 10, 19, 12, 30))]
    fn accepted_formats(#[case] raw: &str, #[case] expected: Timestamp) {
        assert_eq!(site_parser().parse(raw), Ok(Some(expected)));
    }

    #[rstest]
    #[case::words("next tuesday")]
    #[case::bad_month("19 Octember 2026 14:30")]
    #[case::bad_day("2026-02-30 10:00")]
    fn rejected_formats(#[case] raw: &str) {
        assert!(matches!(
            site_parser().parse(raw),
            Err(TimestampError::Unrecognized(_))
        ));
    }

    #[test]
    fn display_uses_site_offset() {
        let parser = site_parser();
        let ts = utc(2026, 10, 5, 12, 30);
        assert_eq!(parser.display(ts), "5 October 2026 14:30");
        assert_eq!(parser.parse(&parser.display(ts)), Ok(Some(ts)));
    }
}
