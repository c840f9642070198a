use chrono::{NaiveDate, TimeDelta};
use thiserror::Error;

use crate::parsers::LogTimestamp;

/// Why a grammatically valid `%t` field could not be turned into epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unknown month abbreviation {0:?}")]
    UnknownMonth(String),
    #[error("invalid calendar date in {0:?}")]
    InvalidDate(String),
    #[error("invalid time of day in {0:?}")]
    InvalidTime(String),
    #[error("invalid UTC offset {0:?}")]
    InvalidOffset(String),
}

/// Convert a log-local timestamp to Unix epoch seconds.
///
/// The offset is subtracted from the local wall-clock time and the result is
/// read as UTC, so `-0700` moves the instant seven hours later. No timezone
/// database or host setting is consulted.
pub fn normalize(ts: &LogTimestamp<'_>) -> Result<i64, TimestampError> {
    let month =
        month_number(ts.month).ok_or_else(|| TimestampError::UnknownMonth(ts.month.to_string()))?;
    let invalid_date = || TimestampError::InvalidDate(ts.full_date.to_string());
    let invalid_time = || TimestampError::InvalidTime(ts.full_date.to_string());

    let day = parse_digits(ts.day).ok_or_else(invalid_date)?;
    let year = parse_digits(ts.year)
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(invalid_date)?;
    let hour = parse_digits(ts.hour).ok_or_else(invalid_time)?;
    let minute = parse_digits(ts.minute).ok_or_else(invalid_time)?;
    let second = parse_digits(ts.second).ok_or_else(invalid_time)?;

    let local = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(invalid_date)?
        .and_hms_opt(hour, minute, second)
        .ok_or_else(invalid_time)?;

    let offset = parse_offset(ts.offset)
        .ok_or_else(|| TimestampError::InvalidOffset(ts.offset.to_string()))?;

    // only fails for years far past the four digits the log grammar allows
    let utc = local.checked_sub_signed(offset).ok_or_else(invalid_date)?;

    Ok(utc.and_utc().timestamp())
}

/// English three-letter month abbreviations, case-sensitive.
fn month_number(name: &str) -> Option<u32> {
    let n = match name {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// `str::parse` alone would also take a leading `+`.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `+HHMM` / `-HHMM` into a signed duration. Digits are taken literally,
/// `+0099` is 99 minutes.
fn parse_offset(s: &str) -> Option<TimeDelta> {
    let b = s.as_bytes();
    if b.len() != 5 || !s.is_ascii() {
        return None;
    }
    let sign = match b[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours = parse_digits(&s[1..3])?;
    let minutes = parse_digits(&s[3..5])?;
    Some(TimeDelta::minutes(sign * i64::from(hours * 60 + minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Datelike};
    use test_case::test_case;

    fn ts<'a>(full_date: &'a str) -> LogTimestamp<'a> {
        // "10/Oct/2000:13:55:36 -0700"
        let (date_time, offset) = full_date.split_once(' ').unwrap();
        let mut parts = date_time.splitn(3, '/');
        let day = parts.next().unwrap();
        let month = parts.next().unwrap();
        let rest = parts.next().unwrap();
        let mut hms = rest.split(':');
        LogTimestamp {
            full_date,
            day,
            month,
            year: hms.next().unwrap(),
            hour: hms.next().unwrap(),
            minute: hms.next().unwrap(),
            second: hms.next().unwrap(),
            offset,
        }
    }

    #[test_case("10/Oct/2000:13:55:36 -0700", 971211336; "negative offset")]
    #[test_case("10/Oct/2000:13:55:36 +0000", 971186136; "utc")]
    #[test_case("10/Oct/2000:13:55:36 -0000", 971186136; "negative zero")]
    #[test_case("10/Oct/2000:13:55:36 +0530", 971166336; "half hour offset")]
    #[test_case("01/Jan/2000:00:30:00 +0100", 946683000; "crosses year boundary")]
    #[test_case("29/Feb/2000:00:00:00 +0000", 951782400; "leap day")]
    #[test_case("31/Dec/1969:23:59:59 +0000", -1; "before epoch")]
    #[test_case("01/Jan/1970:00:00:00 +0099", -5940; "offset minutes taken literally")]
    fn epoch_seconds(full_date: &str, expected: i64) {
        assert_eq!(normalize(&ts(full_date)), Ok(expected));
    }

    #[test]
    fn utc_offset_keeps_calendar_fields() {
        let t = ts("07/Mar/2024:23:01:02 +0000");
        let epoch = normalize(&t).unwrap();
        let back = DateTime::from_timestamp(epoch, 0).unwrap().naive_utc();
        assert_eq!(back.format("%d/%b/%Y:%H:%M:%S").to_string(), "07/Mar/2024:23:01:02");
    }

    #[test_case("29/Feb/2001:00:00:00 +0000"; "non leap february")]
    #[test_case("29/Feb/1900:00:00:00 +0000"; "century non leap")]
    #[test_case("31/Apr/2020:00:00:00 +0000"; "thirty one april")]
    #[test_case("00/Jan/2020:00:00:00 +0000"; "day zero")]
    #[test_case("99999999999/Jan/2020:00:00:00 +0000"; "day overflow")]
    fn invalid_dates(full_date: &str) {
        let t = ts(full_date);
        assert_eq!(
            normalize(&t),
            Err(TimestampError::InvalidDate(full_date.to_string()))
        );
    }

    #[test]
    fn offset_past_last_representable_date_is_invalid() {
        let full_date = format!("31/Dec/{}:23:00:00 -9999", NaiveDate::MAX.year());
        assert_eq!(
            normalize(&ts(&full_date)),
            Err(TimestampError::InvalidDate(full_date.clone()))
        );
    }

    #[test_case("10/Oct/2000:24:00:00 +0000"; "hour 24")]
    #[test_case("10/Oct/2000:13:60:00 +0000"; "minute 60")]
    #[test_case("10/Oct/2000:13:55:60 +0000"; "leap second")]
    fn invalid_times(full_date: &str) {
        let t = ts(full_date);
        assert_eq!(
            normalize(&t),
            Err(TimestampError::InvalidTime(full_date.to_string()))
        );
    }

    #[test_case("oct"; "lower case")]
    #[test_case("OCT"; "upper case")]
    #[test_case("October"; "full name")]
    #[test_case("Okt"; "not english")]
    fn unknown_months(month: &str) {
        let full_date = format!("10/{month}/2000:13:55:36 +0000");
        assert_eq!(
            normalize(&ts(&full_date)),
            Err(TimestampError::UnknownMonth(month.to_string()))
        );
    }

    #[test_case("0700"; "unsigned")]
    #[test_case("+070"; "short")]
    #[test_case("+07a0"; "non digit")]
    #[test_case("++700"; "double sign")]
    fn invalid_offsets(offset: &str) {
        let t = LogTimestamp {
            offset,
            ..ts("10/Oct/2000:13:55:36 +0000")
        };
        assert_eq!(
            normalize(&t),
            Err(TimestampError::InvalidOffset(offset.to_string()))
        );
    }
}
