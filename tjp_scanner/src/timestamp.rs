//! Calendar timestamps for DATE literals
//!
//! Accepted syntax: `YYYY-M-D[-H:M[:S]][-[+-]ZZZZ]`. The zone suffix is only
//! allowed after a time of day; a zone without a sign is east of UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("'{text}' is not a date of the form YYYY-MM-DD[-hh:mm[:ss]][-+zzzz]")]
    Malformed { text: String },

    #[error("'{text}' does not name a valid point in time: {reason}")]
    OutOfRange { text: String, reason: &'static str },
}

impl TimestampError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::lexical::INVALID_DATE
    }
}

/// A point in time together with the zone it was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TjTime(DateTime<FixedOffset>);

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})(?:-([0-9]{1,2}):([0-9]{1,2})(?::([0-9]{1,2}))?(?:-([-+]?[0-9]{4}))?)?$",
        )
        .expect("date pattern is valid")
    })
}

impl TjTime {
    pub fn new(inner: DateTime<FixedOffset>) -> Self {
        Self(inner)
    }

    /// Parse a DATE literal; `reference` is used when the text has no zone
    pub fn parse(text: &str, reference: FixedOffset) -> Result<Self, TimestampError> {
        let malformed = || TimestampError::Malformed {
            text: text.to_string(),
        };
        let out_of_range = |reason| TimestampError::OutOfRange {
            text: text.to_string(),
            reason,
        };

        let caps = date_pattern().captures(text).ok_or_else(malformed)?;
        let field = |i: usize| -> Result<u32, TimestampError> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| malformed()))
        };

        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)
            .ok_or_else(|| out_of_range("no such calendar day"))?;
        let time = NaiveTime::from_hms_opt(field(4)?, field(5)?, field(6)?)
            .ok_or_else(|| out_of_range("no such time of day"))?;

        let offset = match caps.get(7) {
            Some(zone) => {
                parse_utc_offset(zone.as_str()).ok_or_else(|| out_of_range("bad UTC offset"))?
            }
            None => reference,
        };

        date.and_time(time)
            .and_local_timezone(offset)
            .single()
            .map(Self)
            .ok_or_else(|| out_of_range("ambiguous local time"))
    }

    pub fn inner(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    pub fn offset(&self) -> FixedOffset {
        *self.0.offset()
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

impl fmt::Display for TjTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d-%H:%M:%S-%z"))
    }
}

/// Parse `[+-]HHMM` into a fixed offset; no sign means east of UTC
pub fn parse_utc_offset(text: &str) -> Option<FixedOffset> {
    let (sign, digits) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => (1, text),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_date_only_defaults_to_midnight_in_reference_zone() {
        let reference = parse_utc_offset("+0200").unwrap();
        let t = TjTime::parse("2024-3-7", reference).unwrap();

        assert_eq!(t.inner().year(), 2024);
        assert_eq!(t.inner().month(), 3);
        assert_eq!(t.inner().day(), 7);
        assert_eq!(t.inner().hour(), 0);
        assert_eq!(t.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_full_form_with_zone() {
        let t = TjTime::parse("2023-12-31-23:59:30-+0130", utc()).unwrap();
        assert_eq!(t.inner().second(), 30);
        assert_eq!(t.offset().local_minus_utc(), 5400);

        let west = TjTime::parse("2023-12-31-10:00--0500", utc()).unwrap();
        assert_eq!(west.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(west.to_utc().hour(), 15);

        let unsigned = TjTime::parse("2023-01-01-10:00-0100", utc()).unwrap();
        assert_eq!(unsigned.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_invalid_calendar_values() {
        assert_matches!(
            TjTime::parse("2023-02-30", utc()),
            Err(TimestampError::OutOfRange { .. })
        );
        assert_matches!(
            TjTime::parse("2023-01-01-25:00", utc()),
            Err(TimestampError::OutOfRange { .. })
        );
        assert_matches!(
            TjTime::parse("2023-01-01-10:00-+0175", utc()),
            Err(TimestampError::OutOfRange { .. })
        );
        assert_matches!(
            TjTime::parse("yesterday", utc()),
            Err(TimestampError::Malformed { .. })
        );
    }

    #[test]
    fn test_display_parses_back() {
        let t = TjTime::parse("2020-2-29-8:05-+0100", utc()).unwrap();
        assert_eq!(t.to_string(), "2020-02-29-08:05:00-+0100");
        assert_eq!(TjTime::parse(&t.to_string(), utc()).unwrap(), t);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+0000").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("-0230").unwrap().local_minus_utc(), -9000);
        assert_eq!(parse_utc_offset("0100").unwrap().local_minus_utc(), 3600);
        assert!(parse_utc_offset("+01").is_none());
        assert!(parse_utc_offset("").is_none());
        assert!(parse_utc_offset("+2400").is_none());
    }
}
