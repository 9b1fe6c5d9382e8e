//! Value grammars (RFC 5545 §3.3, RFC 6350 §4).
//!
//! Each decoder takes the raw wire text of a single value and returns the
//! native type or a [`TranscodeError`] carrying the offending text. Property
//! names and line numbers are attached by the caller.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::rfc::behavior::{TranscodeError, TranscodeErrorKind};
use crate::rfc::core::{
    Date, DateOrDateTime, DateTime, DateTimeForm, Duration, Frequency, Period, RRule, Time,
    UtcOffset, Weekday, WeekdayNum,
};

type DecodeResult<T> = Result<T, TranscodeError>;

fn digits<T: std::str::FromStr>(s: &str, kind: TranscodeErrorKind, whole: &str) -> DecodeResult<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TranscodeError::new(kind, whole));
    }
    s.parse().map_err(|_e| TranscodeError::new(kind, whole))
}

/// Parses a DATE: `YYYYMMDD`, or the extended `YYYY-MM-DD`.
///
/// ## Errors
/// Returns an error unless the text names a real calendar date.
pub fn decode_date(s: &str) -> DecodeResult<Date> {
    let kind = TranscodeErrorKind::InvalidDate;
    let compact;
    let basic = if s.len() == 10 && s.as_bytes()[4] == b'-' && s.as_bytes()[7] == b'-' {
        compact = format!("{}{}{}", &s[0..4], &s[5..7], &s[8..10]);
        compact.as_str()
    } else {
        s
    };
    if basic.len() != 8 || !basic.is_ascii() {
        return Err(TranscodeError::new(kind, s));
    }

    let date = Date::new(
        digits(&basic[0..4], kind, s)?,
        digits(&basic[4..6], kind, s)?,
        digits(&basic[6..8], kind, s)?,
    );
    if date.to_naive().is_none() {
        return Err(TranscodeError::new(kind, s).with_context("not a calendar date"));
    }
    Ok(date)
}

/// Parses a TIME: `HHMMSS[Z]`, or the extended `HH:MM:SS[Z]`.
///
/// ## Errors
/// Returns an error for malformed text or out-of-range fields. Second 60 is
/// accepted as a leap second.
pub fn decode_time(s: &str) -> DecodeResult<Time> {
    let kind = TranscodeErrorKind::InvalidTime;
    let (body, is_utc) = match s.strip_suffix(['Z', 'z']) {
        Some(body) => (body, true),
        None => (s, false),
    };
    let compact;
    let basic = if body.len() == 8 && body.as_bytes()[2] == b':' && body.as_bytes()[5] == b':' {
        compact = body.replace(':', "");
        compact.as_str()
    } else {
        body
    };
    if basic.len() != 6 || !basic.is_ascii() {
        return Err(TranscodeError::new(kind, s));
    }

    let hour: u8 = digits(&basic[0..2], kind, s)?;
    let minute: u8 = digits(&basic[2..4], kind, s)?;
    let second: u8 = digits(&basic[4..6], kind, s)?;
    if hour > 23 || minute > 59 || second > 60 {
        return Err(TranscodeError::new(kind, s).with_context("field out of range"));
    }
    Ok(Time::new(hour, minute, second, is_utc))
}

/// Parses a DATE-TIME. A trailing `Z` makes it UTC even when `tzid` is
/// given; otherwise `tzid` makes it zoned and its absence floating.
///
/// ## Errors
/// Returns an error if either half is malformed.
pub fn decode_datetime(s: &str, tzid: Option<&str>) -> DecodeResult<DateTime> {
    let invalid = || TranscodeError::new(TranscodeErrorKind::InvalidDateTime, s);
    let (date, time) = s.split_once(['T', 't']).ok_or_else(invalid)?;
    let date = decode_date(date).map_err(|_e| invalid())?;
    let time = decode_time(time).map_err(|_e| invalid())?;

    let form = if time.is_utc {
        DateTimeForm::Utc
    } else if let Some(tzid) = tzid {
        DateTimeForm::Zoned {
            tzid: tzid.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };
    Ok(DateTime::new(date, time.hour, time.minute, time.second, form))
}

/// Parses either precision, picking DATE when there is no `T`.
///
/// ## Errors
/// Returns an error if the chosen grammar does not match.
pub fn decode_date_or_datetime(s: &str, tzid: Option<&str>) -> DecodeResult<DateOrDateTime> {
    if s.contains(['T', 't']) {
        decode_datetime(s, tzid).map(DateOrDateTime::DateTime)
    } else {
        decode_date(s).map(DateOrDateTime::Date)
    }
}

/// Parses a UTC-OFFSET: `(+|-)HHMM[SS]`, also accepting `(+|-)HH:MM`.
///
/// ## Errors
/// Returns an error for malformed text or minutes/seconds over 59.
pub fn decode_utc_offset(s: &str) -> DecodeResult<UtcOffset> {
    let kind = TranscodeErrorKind::InvalidUtcOffset;
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(TranscodeError::new(kind, s)),
    };
    let rest = rest.replace(':', "");
    if !matches!(rest.len(), 4 | 6) || !rest.is_ascii() {
        return Err(TranscodeError::new(kind, s));
    }

    let hours: i32 = digits(&rest[0..2], kind, s)?;
    let minutes: i32 = digits(&rest[2..4], kind, s)?;
    let seconds: i32 = if rest.len() == 6 {
        digits(&rest[4..6], kind, s)?
    } else {
        0
    };
    if minutes > 59 || seconds > 59 {
        return Err(TranscodeError::new(kind, s).with_context("field out of range"));
    }
    Ok(UtcOffset::from_seconds(
        sign * (hours * 3600 + minutes * 60 + seconds),
    ))
}

/// Parses a DURATION: `[+|-]P(nW | [nD][T[nH][nM][nS]])`.
///
/// A negative zero comes back as plain zero.
///
/// ## Errors
/// Returns an error for a missing `P`, a number without a designator, a
/// designator without a number, a designator on the wrong side of `T`, a
/// week count mixed with other designators, or an empty duration.
pub fn decode_duration(s: &str) -> DecodeResult<Duration> {
    let invalid = || TranscodeError::new(TranscodeErrorKind::InvalidDuration, s);

    let mut duration = Duration::zero();
    let mut rest = s.trim();
    if let Some(stripped) = rest.strip_prefix('-') {
        duration.negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else {
        // unsigned
    }
    let body = rest.strip_prefix(['P', 'p']).ok_or_else(invalid)?;

    let mut in_time = false;
    let mut number: Option<u32> = None;
    let mut parts = 0;
    let mut time_parts = 0;
    let mut weeks_seen = false;
    for c in body.chars() {
        if let Some(d) = c.to_digit(10) {
            let n = number.unwrap_or(0);
            number = Some(
                n.checked_mul(10)
                    .and_then(|n| n.checked_add(d))
                    .ok_or_else(invalid)?,
            );
            continue;
        }
        match c.to_ascii_uppercase() {
            'T' if !in_time && number.is_none() => {
                in_time = true;
                continue;
            }
            'W' if !in_time => {
                duration.weeks = number.ok_or_else(invalid)?;
                weeks_seen = true;
            }
            'D' if !in_time => duration.days = number.ok_or_else(invalid)?,
            'H' if in_time => duration.hours = number.ok_or_else(invalid)?,
            'M' if in_time => duration.minutes = number.ok_or_else(invalid)?,
            'S' if in_time => duration.seconds = number.ok_or_else(invalid)?,
            _ => return Err(invalid()),
        }
        number = None;
        parts += 1;
        if in_time {
            time_parts += 1;
        }
    }

    if number.is_some() || parts == 0 || (in_time && time_parts == 0) {
        return Err(invalid());
    }
    // `dur-week` stands alone.
    if weeks_seen && parts > 1 {
        return Err(invalid());
    }
    if duration.is_zero() {
        duration.negative = false;
    }
    Ok(duration)
}

/// Parses a PERIOD: `start/end` or `start/duration`.
///
/// ## Errors
/// Returns an error if the separator or either half is malformed.
pub fn decode_period(s: &str, tzid: Option<&str>) -> DecodeResult<Period> {
    let invalid = || TranscodeError::new(TranscodeErrorKind::InvalidPeriod, s);
    let (start, end) = s.split_once('/').ok_or_else(invalid)?;
    let start = decode_datetime(start, tzid).map_err(|_e| invalid())?;

    if end.starts_with(['P', 'p', '+', '-']) {
        let duration = decode_duration(end).map_err(|_e| invalid())?;
        Ok(Period::from_duration(start, duration))
    } else {
        let end = decode_datetime(end, tzid).map_err(|_e| invalid())?;
        Ok(Period::explicit(start, end))
    }
}

/// Parses a RECUR value (RFC 5545 §3.3.10).
///
/// Parts may come in any order. Unrecognized parts are kept verbatim in
/// [`RRule::extensions`].
///
/// ## Errors
/// Returns an error if FREQ is missing, COUNT and UNTIL are both present,
/// INTERVAL or COUNT is zero, or any BY list value is out of range.
pub fn decode_recur(s: &str) -> DecodeResult<RRule> {
    let invalid = |detail: &str| {
        TranscodeError::new(TranscodeErrorKind::InvalidRecur, s).with_context(detail.to_string())
    };

    let mut rule = RRule::new(Frequency::Daily);
    let mut freq = None;
    for part in s.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid("rule part without '='"))?;
        match key.to_ascii_uppercase().as_str() {
            "FREQ" => {
                freq = Some(Frequency::parse(value).ok_or_else(|| invalid("unknown FREQ"))?);
            }
            "INTERVAL" => {
                let interval: u32 = value.parse().map_err(|_e| invalid("bad INTERVAL"))?;
                if interval == 0 {
                    return Err(invalid("INTERVAL must be positive"));
                }
                rule.interval = Some(interval);
            }
            "COUNT" => {
                let count: u32 = value.parse().map_err(|_e| invalid("bad COUNT"))?;
                if count == 0 {
                    return Err(invalid("COUNT must be positive"));
                }
                rule.count = Some(count);
            }
            "UNTIL" => {
                rule.until =
                    Some(decode_date_or_datetime(value, None).map_err(|_e| invalid("bad UNTIL"))?);
            }
            "WKST" => {
                rule.wkst = Some(Weekday::parse(value).ok_or_else(|| invalid("bad WKST"))?);
            }
            "BYSECOND" => {
                rule.by_second = int_list(value, 0, 60, false).ok_or_else(|| invalid("bad BYSECOND"))?;
            }
            "BYMINUTE" => {
                rule.by_minute = int_list(value, 0, 59, false).ok_or_else(|| invalid("bad BYMINUTE"))?;
            }
            "BYHOUR" => {
                rule.by_hour = int_list(value, 0, 23, false).ok_or_else(|| invalid("bad BYHOUR"))?;
            }
            "BYMONTHDAY" => {
                rule.by_monthday = int_list(value, 1, 31, true).ok_or_else(|| invalid("bad BYMONTHDAY"))?;
            }
            "BYYEARDAY" => {
                rule.by_yearday = int_list(value, 1, 366, true).ok_or_else(|| invalid("bad BYYEARDAY"))?;
            }
            "BYWEEKNO" => {
                rule.by_weekno = int_list(value, 1, 53, true).ok_or_else(|| invalid("bad BYWEEKNO"))?;
            }
            "BYMONTH" => {
                rule.by_month = int_list(value, 1, 12, false).ok_or_else(|| invalid("bad BYMONTH"))?;
            }
            "BYSETPOS" => {
                rule.by_setpos = int_list(value, 1, 366, true).ok_or_else(|| invalid("bad BYSETPOS"))?;
            }
            "BYDAY" => {
                rule.by_day = value
                    .split(',')
                    .map(decode_weekday_num)
                    .collect::<Option<_>>()
                    .ok_or_else(|| invalid("bad BYDAY"))?;
            }
            _ => rule.extensions.push((key.to_string(), value.to_string())),
        }
    }

    rule.freq = freq.ok_or_else(|| invalid("FREQ is required"))?;
    if rule.count.is_some() && rule.until.is_some() {
        return Err(invalid("COUNT and UNTIL are mutually exclusive"));
    }
    Ok(rule)
}

/// Parses a comma list whose magnitudes lie in `min..=max`; negatives only
/// when `signed`.
fn int_list<T>(s: &str, min: i32, max: i32, signed: bool) -> Option<Vec<T>>
where
    T: TryFrom<i32>,
{
    s.split(',')
        .map(|v| {
            let n: i32 = v.trim().parse().ok()?;
            let magnitude = n.checked_abs()?;
            let in_range = (min..=max).contains(&magnitude) && (signed || n >= 0);
            if !in_range || (signed && n == 0) {
                return None;
            }
            T::try_from(n).ok()
        })
        .collect()
}

/// Parses `MO`, `1MO`, `+2TU` or `-1FR`.
fn decode_weekday_num(s: &str) -> Option<WeekdayNum> {
    let s = s.trim();
    let split = s.len().checked_sub(2)?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (ordinal, day) = s.split_at(split);
    let weekday = Weekday::parse(day)?;
    if ordinal.is_empty() {
        return Some(WeekdayNum::every(weekday));
    }
    WeekdayNum::nth(ordinal.trim_start_matches('+').parse().ok()?, weekday)
}

/// Resolves TEXT escapes: `\\`, `\,`, `\;`, `\n` and `\N`. Any other
/// backslash is kept as written.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('n' | 'N') => {
                chars.next();
                result.push('\n');
            }
            Some(&escaped) if matches!(escaped, ',' | ';' | '\\') => {
                chars.next();
                result.push(escaped);
            }
            _ => result.push('\\'),
        }
    }

    result
}

/// Splits on `sep` wherever it is not backslash-escaped, without unescaping.
#[must_use]
pub fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        } else {
            // plain character
        }
    }
    parts.push(&s[start..]);
    parts
}

/// A comma-separated TEXT list, each element unescaped.
#[must_use]
pub fn decode_text_list(s: &str) -> Vec<String> {
    split_unescaped(s, ',').into_iter().map(unescape_text).collect()
}

/// A structured value: `;`-separated fields, each a `,`-separated list.
///
/// An empty input is a single empty field, so `N:` round-trips.
#[must_use]
pub fn decode_structured(s: &str) -> Vec<Vec<String>> {
    split_unescaped(s, ';')
        .into_iter()
        .map(decode_text_list)
        .collect()
}

/// Parses a BOOLEAN (case-insensitive).
///
/// ## Errors
/// Returns an error unless the text is TRUE or FALSE.
pub fn decode_boolean(s: &str) -> DecodeResult<bool> {
    match s.trim().to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(TranscodeError::new(TranscodeErrorKind::InvalidBoolean, s)),
    }
}

/// Parses an INTEGER.
///
/// ## Errors
/// Returns an error if the text is not a signed 32-bit integer.
pub fn decode_integer(s: &str) -> DecodeResult<i32> {
    s.trim()
        .parse()
        .map_err(|_e| TranscodeError::new(TranscodeErrorKind::InvalidInteger, s))
}

/// Parses a FLOAT.
///
/// ## Errors
/// Returns an error if the text is not a finite decimal number.
pub fn decode_float(s: &str) -> DecodeResult<f64> {
    let trimmed = s.trim();
    let well_formed = trimmed
        .trim_start_matches(['+', '-'])
        .bytes()
        .all(|b| b.is_ascii_digit() || b == b'.')
        && trimmed.bytes().any(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(TranscodeError::new(TranscodeErrorKind::InvalidFloat, s));
    }
    trimmed
        .parse()
        .map_err(|_e| TranscodeError::new(TranscodeErrorKind::InvalidFloat, s))
}

/// Decodes base64 content, ignoring embedded whitespace.
///
/// ## Errors
/// Returns an error if the text is not valid base64.
pub fn decode_base64(s: &str) -> DecodeResult<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact).map_err(|e| {
        TranscodeError::new(TranscodeErrorKind::InvalidBinary, truncate(s)).with_context(e.to_string())
    })
}

/// ## Summary
/// Decodes quoted-printable (RFC 2045 §6.7): `=XX` is one octet and a `=`
/// at the end of a line is a soft break.
///
/// ## Errors
/// Returns an error if `=` is followed by anything other than two hex
/// digits or a line break.
pub fn decode_quoted_printable(s: &str) -> DecodeResult<Vec<u8>> {
    let invalid = || {
        TranscodeError::new(TranscodeErrorKind::InvalidBinary, truncate(s))
            .with_context("invalid quoted-printable escape")
    };

    let mut out = Vec::with_capacity(s.len());
    let mut rest = s.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        rest = tail;
        if byte != b'=' {
            out.push(byte);
            continue;
        }
        if let Some(after) = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
        {
            rest = after;
            continue;
        }
        if rest.is_empty() {
            break;
        }
        let octet = rest
            .get(..2)
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(invalid)?;
        out.push(octet);
        rest = &rest[2..];
    }
    Ok(out)
}

fn truncate(s: &str) -> &str {
    s.char_indices().nth(64).map_or(s, |(i, _)| &s[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_basic_and_extended() {
        assert_eq!(decode_date("20260123").unwrap(), Date::new(2026, 1, 23));
        assert_eq!(decode_date("2026-01-23").unwrap(), Date::new(2026, 1, 23));
    }

    #[test]
    fn date_rejects_impossible_days() {
        assert_eq!(
            decode_date("20230229").unwrap_err().kind,
            TranscodeErrorKind::InvalidDate
        );
        assert!(decode_date("20240229").is_ok());
        assert!(decode_date("20241301").is_err());
        assert!(decode_date("2024011").is_err());
        assert!(decode_date("2024+101").is_err());
    }

    #[test]
    fn time_forms() {
        assert_eq!(decode_time("133000").unwrap(), Time::new(13, 30, 0, false));
        assert_eq!(decode_time("13:30:00Z").unwrap(), Time::new(13, 30, 0, true));
        assert_eq!(decode_time("235960").unwrap().second, 60);
        assert!(decode_time("240000").is_err());
    }

    #[test]
    fn datetime_forms() {
        let utc = decode_datetime("20240115T093000Z", None).unwrap();
        assert!(utc.is_utc());

        let zoned = decode_datetime("20240115T093000", Some("Europe/Paris")).unwrap();
        assert_eq!(zoned.tzid(), Some("Europe/Paris"));

        let floating = decode_datetime("20240115T093000", None).unwrap();
        assert_eq!(floating.form, DateTimeForm::Floating);

        let extended = decode_datetime("2024-01-15T09:30:00", None).unwrap();
        assert_eq!(extended, floating);
    }

    #[test]
    fn utc_wins_over_tzid() {
        let dt = decode_datetime("20240115T093000Z", Some("Europe/Paris")).unwrap();
        assert!(dt.is_utc());
        assert_eq!(dt.tzid(), None);
    }

    #[test]
    fn datetime_errors() {
        assert_eq!(
            decode_datetime("20240115", None).unwrap_err().kind,
            TranscodeErrorKind::InvalidDateTime
        );
        assert!(decode_datetime("20240115T9300", None).is_err());
    }

    #[test]
    fn utc_offsets() {
        assert_eq!(decode_utc_offset("+0530").unwrap().as_seconds(), 19800);
        assert_eq!(decode_utc_offset("-0800").unwrap().as_seconds(), -28800);
        assert_eq!(decode_utc_offset("+013015").unwrap().as_seconds(), 5415);
        assert_eq!(decode_utc_offset("-05:00").unwrap().as_seconds(), -18000);
        assert!(decode_utc_offset("0500").is_err());
        assert!(decode_utc_offset("+0560").is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(decode_duration("PT15M").unwrap(), Duration::minutes(15));
        assert_eq!(decode_duration("P2W").unwrap(), Duration::weeks(2));
        let d = decode_duration("-P1DT2H3M4S").unwrap();
        assert!(d.negative);
        assert_eq!(d.as_seconds(), -(86400 + 7200 + 180 + 4));
        assert_eq!(decode_duration("+PT1H").unwrap(), Duration::hours(1));
    }

    #[test]
    fn negative_zero_duration_normalizes() {
        let d = decode_duration("-PT0S").unwrap();
        assert!(!d.negative);
        assert!(d.is_zero());
    }

    #[test]
    fn duration_errors() {
        for bad in [
            "", "P", "PT", "1D", "P1H", "PT1D", "P1", "PTH", "P1DT", "P1W2D", "P2D1W", "P1WT1H",
        ] {
            assert!(decode_duration(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn duration_weeks_survive_encoding() {
        for text in ["P613566757W", "P4294967295W", "-P3W"] {
            let d = decode_duration(text).unwrap();
            assert_eq!(d.to_string(), text);
            assert_eq!(decode_duration(&d.to_string()).unwrap(), d);
        }
    }

    #[test]
    fn periods() {
        let p = decode_period("19970101T180000Z/19970102T070000Z", None).unwrap();
        assert!(matches!(p, Period::Explicit { .. }));
        let p = decode_period("19970101T180000Z/PT5H30M", None).unwrap();
        assert!(matches!(p, Period::Duration { .. }));
        assert!(decode_period("19970101T180000Z", None).is_err());
    }

    #[test]
    fn recur_full() {
        let rule = decode_recur(
            "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU;BYMONTH=1,3;WKST=SU",
        )
        .unwrap();
        assert_eq!(rule.freq, Frequency::Monthly);
        assert_eq!(rule.interval, Some(2));
        assert_eq!(rule.count, Some(10));
        assert_eq!(rule.by_day.len(), 2);
        assert_eq!(rule.by_day[1].ordinal, Some(-1));
        assert_eq!(rule.by_month, [1, 3]);
        assert_eq!(rule.wkst, Some(Weekday::Sunday));
    }

    #[test]
    fn recur_part_order_is_free() {
        let rule = decode_recur("UNTIL=20241231;FREQ=YEARLY").unwrap();
        assert_eq!(rule.freq, Frequency::Yearly);
        assert_eq!(
            rule.until,
            Some(DateOrDateTime::Date(Date::new(2024, 12, 31)))
        );
    }

    #[test]
    fn recur_keeps_extensions() {
        let rule = decode_recur("FREQ=DAILY;X-NAME=foo").unwrap();
        assert_eq!(rule.extensions, [("X-NAME".to_string(), "foo".to_string())]);
    }

    #[test]
    fn recur_errors() {
        for bad in [
            "COUNT=3",
            "FREQ=DAILY;COUNT=3;UNTIL=20240101",
            "FREQ=DAILY;INTERVAL=0",
            "FREQ=FORTNIGHTLY",
            "FREQ=DAILY;BYHOUR=24",
            "FREQ=MONTHLY;BYMONTHDAY=0",
            "FREQ=MONTHLY;BYMONTHDAY=32",
            "FREQ=YEARLY;BYMONTH=13",
            "FREQ=YEARLY;BYDAY=0MO",
            "FREQ=WEEKLY;BYDAY=XX",
            "FREQ",
        ] {
            let err = decode_recur(bad).unwrap_err();
            assert_eq!(err.kind, TranscodeErrorKind::InvalidRecur, "{bad}");
        }
    }

    #[test]
    fn text_unescape() {
        assert_eq!(unescape_text(r"a\, b\; c\\d\ne\N"), "a, b; c\\d\ne\n");
        assert_eq!(unescape_text(r"C:\temp"), r"C:\temp");
    }

    #[test]
    fn text_list_respects_escapes() {
        assert_eq!(decode_text_list(r"a,b\,c,"), ["a", "b,c", ""]);
    }

    #[test]
    fn structured_fields() {
        assert_eq!(
            decode_structured(r"Doe;John;Q.,R.;Dr.;Jr\;"),
            vec![
                vec!["Doe".to_string()],
                vec!["John".to_string()],
                vec!["Q.".to_string(), "R.".to_string()],
                vec!["Dr.".to_string()],
                vec!["Jr;".to_string()],
            ]
        );
        assert_eq!(decode_structured(""), vec![vec![String::new()]]);
    }

    #[test]
    fn scalars() {
        assert!(decode_boolean("true").unwrap());
        assert!(!decode_boolean("FALSE").unwrap());
        assert!(decode_boolean("yes").is_err());
        assert_eq!(decode_integer("-12").unwrap(), -12);
        assert!(decode_integer("1.5").is_err());
        assert!((decode_float("+1.5").unwrap() - 1.5).abs() < f64::EPSILON);
        assert!(decode_float("NaN").is_err());
        assert!(decode_float("1e5").is_err());
    }

    #[test]
    fn base64_with_whitespace() {
        assert_eq!(decode_base64("aGVs\r\n bG8=").unwrap(), b"hello");
        assert_eq!(
            decode_base64("!!!").unwrap_err().kind,
            TranscodeErrorKind::InvalidBinary
        );
    }

    #[test]
    fn quoted_printable_octets_and_soft_breaks() {
        assert_eq!(
            decode_quoted_printable("caf=C3=A9 =3D ok").unwrap(),
            "café = ok".as_bytes()
        );
        assert_eq!(decode_quoted_printable("a=\r\nb=\nc=").unwrap(), b"abc");
        assert_eq!(decode_quoted_printable("=e9").unwrap(), [0xe9]);
        for bad in ["=G1", "=4", "x=\rZZ"] {
            assert_eq!(
                decode_quoted_printable(bad).unwrap_err().kind,
                TranscodeErrorKind::InvalidBinary,
                "{bad}"
            );
        }
    }
}
