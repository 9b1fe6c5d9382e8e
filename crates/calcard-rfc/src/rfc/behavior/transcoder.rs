//! Value transcoders: wire text ↔ [`Value`], one per value grammar.
//!
//! Transcoders are stateless and shared as `&'static dyn ValueTranscoder`.
//! For every value `x` a transcoder can decode, `decode(encode(x)) == x`.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::{Behavior, TranscodeError, TranscodeErrorKind};
use crate::rfc::build::escape::escape_text;
use crate::rfc::build::values::{encode_quoted_printable, encode_value};
use crate::rfc::core::parameter::names;
use crate::rfc::core::{DateOrDateTime, DateTime, DateTimeForm, Parameter, Value, ValueType};
use crate::rfc::ical::expand::TimezoneLookup;
use crate::rfc::parse::values::{
    decode_base64, decode_boolean, decode_date, decode_date_or_datetime, decode_datetime,
    decode_duration, decode_float, decode_integer, decode_period, decode_quoted_printable,
    decode_recur, decode_structured, decode_text_list, decode_time, decode_utc_offset,
    unescape_text,
};

/// Collaborators available while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext<'a> {
    /// When set, every `TZID` must resolve through it.
    pub timezones: Option<&'a dyn TimezoneLookup>,
}

impl<'a> DecodeContext<'a> {
    #[must_use]
    pub fn new(timezones: Option<&'a dyn TimezoneLookup>) -> Self {
        Self { timezones }
    }
}

pub trait ValueTranscoder: Send + Sync + fmt::Debug {
    /// The type this transcoder produces by default.
    fn value_type(&self) -> ValueType;

    /// Whether an explicit `VALUE=<value_type>` can be handled here.
    fn accepts(&self, value_type: ValueType) -> bool {
        value_type == self.value_type()
    }

    /// ## Errors
    /// Returns a [`TranscodeError`] when `raw` does not match the grammar.
    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError>;

    fn encode(&self, value: &Value, params: &[Parameter]) -> String {
        let _ = params;
        encode_value(value)
    }
}

/// ## Summary
/// Picks the transcoder for a line.
///
/// The behavior's transcoder is used unless an explicit `VALUE` parameter
/// names a type it does not accept, in which case the transcoder for that
/// type is used. Lines without a behavior are treated as opaque.
#[must_use]
pub fn for_line(
    behavior: Option<&Behavior>,
    params: &[Parameter],
) -> &'static dyn ValueTranscoder {
    let declared = behavior.and_then(Behavior::transcoder);
    match (declared, requested_type(params)) {
        (Some(codec), Some(value_type)) if codec.accepts(value_type) => codec,
        (_, Some(value_type)) => for_value_type(value_type),
        (Some(codec), None) => codec,
        (None, None) => OPAQUE,
    }
}

/// The plain transcoder for a value type.
#[must_use]
pub fn for_value_type(value_type: ValueType) -> &'static dyn ValueTranscoder {
    match value_type {
        ValueType::Binary => BINARY,
        ValueType::Boolean => BOOLEAN,
        ValueType::CalAddress => CAL_ADDRESS,
        ValueType::Date => DATE,
        ValueType::DateTime => DATE_TIME,
        ValueType::Duration => DURATION,
        ValueType::Float => FLOAT,
        ValueType::Integer => INTEGER,
        ValueType::Period => PERIOD_LIST,
        ValueType::Recur => RECUR,
        ValueType::Text => TEXT,
        ValueType::Time => TIME,
        ValueType::Uri => URI,
        ValueType::UtcOffset => UTC_OFFSET,
        ValueType::Unknown => OPAQUE,
    }
}

fn param<'a>(params: &'a [Parameter], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|p| p.is_named(name))
        .and_then(Parameter::value)
}

fn requested_type(params: &[Parameter]) -> Option<ValueType> {
    param(params, names::VALUE).and_then(ValueType::from_param)
}

fn is_base64(params: &[Parameter]) -> bool {
    param(params, names::ENCODING)
        .is_some_and(|e| e.eq_ignore_ascii_case("BASE64") || e.eq_ignore_ascii_case("B"))
}

const QUOTED_PRINTABLE: &str = "QUOTED-PRINTABLE";

/// `ENCODING=QUOTED-PRINTABLE`, or the bare vCard 2.1 `QUOTED-PRINTABLE`.
fn is_quoted_printable(params: &[Parameter]) -> bool {
    params.iter().any(|p| {
        (p.is_named(names::ENCODING) && p.has_value(QUOTED_PRINTABLE))
            || (p.is_named(QUOTED_PRINTABLE) && p.values.is_empty())
    })
}

/// Decoded bytes as text when `CHARSET` is absent, UTF-8 or US-ASCII and
/// the bytes are valid UTF-8; the bytes back otherwise.
fn unicode_text(bytes: Vec<u8>, params: &[Parameter]) -> Result<String, Vec<u8>> {
    let unicode = param(params, names::CHARSET).is_none_or(|charset| {
        ["UTF-8", "UTF8", "US-ASCII", "ASCII"]
            .iter()
            .any(|c| charset.eq_ignore_ascii_case(c))
    });
    if !unicode {
        return Err(bytes);
    }
    String::from_utf8(bytes).map_err(std::string::FromUtf8Error::into_bytes)
}

/// Runs a text grammar under any quoted-printable layer on the line.
/// Content in a foreign charset becomes BINARY.
fn decode_transfer(
    raw: &str,
    params: &[Parameter],
    grammar: impl FnOnce(&str) -> Value,
) -> Result<Value, TranscodeError> {
    if !is_quoted_printable(params) {
        return Ok(grammar(raw));
    }
    Ok(match unicode_text(decode_quoted_printable(raw)?, params) {
        Ok(text) => grammar(&text),
        Err(bytes) => Value::Binary(bytes),
    })
}

/// Puts wire text back under the quoted-printable layer the line declares.
fn encode_transfer(value: &Value, params: &[Parameter], wire: impl FnOnce() -> String) -> String {
    if !is_quoted_printable(params) {
        return wire();
    }
    match value {
        Value::Binary(bytes) => encode_quoted_printable(bytes),
        _ => encode_quoted_printable(wire().as_bytes()),
    }
}

/// Fails when a lookup is present and the value's zone is not in it.
fn check_zone(dt: &DateTime, ctx: &DecodeContext<'_>) -> Result<(), TranscodeError> {
    if let (Some(tzid), Some(timezones)) = (dt.tzid(), ctx.timezones)
        && timezones.resolve(tzid).is_none()
    {
        return Err(TranscodeError::new(TranscodeErrorKind::UnknownTimezone, tzid));
    }
    Ok(())
}

fn zoned_datetime(
    raw: &str,
    params: &[Parameter],
    ctx: &DecodeContext<'_>,
) -> Result<DateTime, TranscodeError> {
    let dt = decode_datetime(raw.trim(), param(params, names::TZID))?;
    check_zone(&dt, ctx)?;
    Ok(dt)
}

/// TEXT with backslash escapes.
#[derive(Debug)]
pub struct TextCodec;

impl ValueTranscoder for TextCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        Ok(Value::Text(unescape_text(raw)))
    }
}

/// Comma-separated TEXT (CATEGORIES, RESOURCES, NICKNAME).
///
/// vCard 2.1 lists may be quoted-printable.
#[derive(Debug)]
pub struct TextListCodec;

impl ValueTranscoder for TextListCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_transfer(raw, params, |text| Value::TextList(decode_text_list(text)))
    }

    fn encode(&self, value: &Value, params: &[Parameter]) -> String {
        encode_transfer(value, params, || encode_value(value))
    }
}

/// `;`-separated fields of comma lists (N, ADR, ORG, REQUEST-STATUS).
///
/// vCard 2.1 values may be quoted-printable.
#[derive(Debug)]
pub struct StructuredCodec;

impl ValueTranscoder for StructuredCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_transfer(raw, params, |text| Value::Structured(decode_structured(text)))
    }

    fn encode(&self, value: &Value, params: &[Parameter]) -> String {
        encode_transfer(value, params, || encode_value(value))
    }
}

#[derive(Debug)]
pub struct DateCodec;

impl ValueTranscoder for DateCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Date
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_date(raw.trim()).map(Value::Date)
    }
}

#[derive(Debug)]
pub struct DateTimeCodec;

impl ValueTranscoder for DateTimeCodec {
    fn value_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        zoned_datetime(raw, params, ctx).map(Value::DateTime)
    }
}

/// DTSTART, DTEND, DUE, RECURRENCE-ID: DATE when `VALUE=DATE` or when the
/// text has no time part, DATE-TIME otherwise.
#[derive(Debug)]
pub struct DateOrDateTimeCodec;

impl ValueTranscoder for DateOrDateTimeCodec {
    fn value_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn accepts(&self, value_type: ValueType) -> bool {
        matches!(value_type, ValueType::Date | ValueType::DateTime)
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        let raw = raw.trim();
        match requested_type(params) {
            Some(ValueType::Date) => decode_date(raw).map(Value::Date),
            Some(ValueType::DateTime) => zoned_datetime(raw, params, ctx).map(Value::DateTime),
            _ => match decode_date_or_datetime(raw, param(params, names::TZID))? {
                DateOrDateTime::Date(date) => Ok(Value::Date(date)),
                DateOrDateTime::DateTime(dt) => {
                    check_zone(&dt, ctx)?;
                    Ok(Value::DateTime(dt))
                }
            },
        }
    }
}

/// DTSTAMP, CREATED, LAST-MODIFIED, COMPLETED: always meant as UTC.
///
/// A zoned value whose zone resolves through the context is converted to
/// UTC; anything else is kept in the form it was written.
#[derive(Debug)]
pub struct UtcDateTimeCodec;

impl ValueTranscoder for UtcDateTimeCodec {
    fn value_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        let dt = zoned_datetime(raw, params, ctx)?;
        let utc = dt
            .tzid()
            .zip(ctx.timezones)
            .and_then(|(tzid, timezones)| timezones.resolve(tzid))
            .zip(dt.to_naive())
            .and_then(|(zone, local)| {
                let offset = zone.offset_from_local(local).earliest()?;
                let shift = chrono::TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                DateTime::from_naive(local - shift, DateTimeForm::Utc)
            });
        Ok(Value::DateTime(utc.unwrap_or(dt)))
    }
}

/// RDATE and EXDATE: comma lists of DATE, DATE-TIME or PERIOD.
#[derive(Debug)]
pub struct MultiDateCodec;

impl ValueTranscoder for MultiDateCodec {
    fn value_type(&self) -> ValueType {
        ValueType::DateTime
    }

    fn accepts(&self, value_type: ValueType) -> bool {
        matches!(
            value_type,
            ValueType::Date | ValueType::DateTime | ValueType::Period
        )
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        let items: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let tzid = param(params, names::TZID);
        let requested = requested_type(params);

        if requested == Some(ValueType::Period) || items.iter().any(|s| s.contains('/')) {
            let periods = items
                .iter()
                .map(|s| decode_period(s, tzid))
                .collect::<Result<Vec<_>, _>>()?;
            for period in &periods {
                check_zone(period.start(), ctx)?;
            }
            return Ok(Value::PeriodList(periods));
        }

        let dates = requested == Some(ValueType::Date)
            || (requested.is_none() && items.first().is_some_and(|s| !s.contains(['T', 't'])));
        if dates {
            return items
                .iter()
                .map(|s| decode_date(s))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::DateList);
        }

        items
            .iter()
            .map(|s| zoned_datetime(s, params, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::DateTimeList)
    }
}

#[derive(Debug)]
pub struct DurationCodec;

impl ValueTranscoder for DurationCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Duration
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_duration(raw).map(Value::Duration)
    }
}

/// TRIGGER: a DURATION, or a DATE-TIME when `VALUE=DATE-TIME` or the text
/// does not look like a duration.
#[derive(Debug)]
pub struct TriggerCodec;

impl ValueTranscoder for TriggerCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Duration
    }

    fn accepts(&self, value_type: ValueType) -> bool {
        matches!(value_type, ValueType::Duration | ValueType::DateTime)
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        let raw = raw.trim();
        let is_duration = match requested_type(params) {
            Some(ValueType::DateTime) => false,
            Some(ValueType::Duration) => true,
            _ => raw.starts_with(['P', 'p', '+', '-']),
        };
        if is_duration {
            decode_duration(raw).map(Value::Duration)
        } else {
            zoned_datetime(raw, params, ctx).map(Value::DateTime)
        }
    }
}

/// FREEBUSY: comma list of periods.
#[derive(Debug)]
pub struct PeriodListCodec;

impl ValueTranscoder for PeriodListCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Period
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        ctx: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        let tzid = param(params, names::TZID);
        let periods = raw
            .split(',')
            .map(|s| decode_period(s.trim(), tzid))
            .collect::<Result<Vec<_>, _>>()?;
        for period in &periods {
            check_zone(period.start(), ctx)?;
        }
        Ok(Value::PeriodList(periods))
    }
}

#[derive(Debug)]
pub struct RecurCodec;

impl ValueTranscoder for RecurCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Recur
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_recur(raw.trim()).map(|rule| Value::Recur(Box::new(rule)))
    }
}

#[derive(Debug)]
pub struct IntegerCodec;

impl ValueTranscoder for IntegerCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Integer
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_integer(raw).map(Value::Integer)
    }
}

#[derive(Debug)]
pub struct FloatCodec;

impl ValueTranscoder for FloatCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Float
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_float(raw).map(Value::Float)
    }
}

#[derive(Debug)]
pub struct BooleanCodec;

impl ValueTranscoder for BooleanCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Boolean
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_boolean(raw).map(Value::Boolean)
    }
}

#[derive(Debug)]
pub struct UtcOffsetCodec;

impl ValueTranscoder for UtcOffsetCodec {
    fn value_type(&self) -> ValueType {
        ValueType::UtcOffset
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_utc_offset(raw.trim()).map(Value::UtcOffset)
    }
}

#[derive(Debug)]
pub struct TimeCodec;

impl ValueTranscoder for TimeCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Time
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        decode_time(raw.trim()).map(Value::Time)
    }
}

/// URI, kept verbatim.
#[derive(Debug)]
pub struct UriCodec;

impl ValueTranscoder for UriCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Uri
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        Ok(Value::Uri(raw.to_string()))
    }
}

#[derive(Debug)]
pub struct CalAddressCodec;

impl ValueTranscoder for CalAddressCodec {
    fn value_type(&self) -> ValueType {
        ValueType::CalAddress
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        Ok(Value::CalAddress(raw.to_string()))
    }
}

/// BINARY: base64 when `ENCODING=BASE64` or `ENCODING=B`, TEXT otherwise.
#[derive(Debug)]
pub struct BinaryCodec;

impl ValueTranscoder for BinaryCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Binary
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        if is_base64(params) {
            decode_base64(raw).map(Value::Binary)
        } else {
            Ok(Value::Text(unescape_text(raw)))
        }
    }
}

/// vCard text that may arrive base64-encoded or quoted-printable.
///
/// Base64 content becomes TEXT when its `CHARSET` is absent, UTF-8 or
/// US-ASCII and the bytes are valid UTF-8; otherwise it stays BINARY.
/// Quoted-printable content follows the same charset rule and is then
/// unescaped like plain TEXT. Re-encoding follows the `ENCODING` parameter
/// still on the line.
#[derive(Debug)]
pub struct VCardTextCodec;

impl ValueTranscoder for VCardTextCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Text
    }

    fn decode(
        &self,
        raw: &str,
        params: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        if !is_base64(params) {
            return decode_transfer(raw, params, |text| Value::Text(unescape_text(text)));
        }
        Ok(match unicode_text(decode_base64(raw)?, params) {
            Ok(text) => Value::Text(text),
            Err(bytes) => Value::Binary(bytes),
        })
    }

    fn encode(&self, value: &Value, params: &[Parameter]) -> String {
        encode_transfer(value, params, || match value {
            Value::Text(text) if is_base64(params) => STANDARD.encode(text.as_bytes()),
            Value::Text(text) => escape_text(text),
            other => encode_value(other),
        })
    }
}

/// The fallback: raw text in, raw text out.
#[derive(Debug)]
pub struct OpaqueCodec;

impl ValueTranscoder for OpaqueCodec {
    fn value_type(&self) -> ValueType {
        ValueType::Unknown
    }

    fn decode(
        &self,
        raw: &str,
        _: &[Parameter],
        _: &DecodeContext<'_>,
    ) -> Result<Value, TranscodeError> {
        Ok(Value::Unknown(raw.to_string()))
    }
}

pub static TEXT: &dyn ValueTranscoder = &TextCodec;
pub static TEXT_LIST: &dyn ValueTranscoder = &TextListCodec;
pub static STRUCTURED: &dyn ValueTranscoder = &StructuredCodec;
pub static DATE: &dyn ValueTranscoder = &DateCodec;
pub static DATE_TIME: &dyn ValueTranscoder = &DateTimeCodec;
pub static DATE_OR_DATE_TIME: &dyn ValueTranscoder = &DateOrDateTimeCodec;
pub static UTC_DATE_TIME: &dyn ValueTranscoder = &UtcDateTimeCodec;
pub static MULTI_DATE: &dyn ValueTranscoder = &MultiDateCodec;
pub static DURATION: &dyn ValueTranscoder = &DurationCodec;
pub static TRIGGER: &dyn ValueTranscoder = &TriggerCodec;
pub static PERIOD_LIST: &dyn ValueTranscoder = &PeriodListCodec;
pub static RECUR: &dyn ValueTranscoder = &RecurCodec;
pub static INTEGER: &dyn ValueTranscoder = &IntegerCodec;
pub static FLOAT: &dyn ValueTranscoder = &FloatCodec;
pub static BOOLEAN: &dyn ValueTranscoder = &BooleanCodec;
pub static UTC_OFFSET: &dyn ValueTranscoder = &UtcOffsetCodec;
pub static TIME: &dyn ValueTranscoder = &TimeCodec;
pub static URI: &dyn ValueTranscoder = &UriCodec;
pub static CAL_ADDRESS: &dyn ValueTranscoder = &CalAddressCodec;
pub static BINARY: &dyn ValueTranscoder = &BinaryCodec;
pub static VCARD_TEXT: &dyn ValueTranscoder = &VCardTextCodec;
pub static OPAQUE: &dyn ValueTranscoder = &OpaqueCodec;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rfc::core::{ContentLine, Date, Duration, Period};
    use crate::rfc::ical::expand::ZoneRules;

    #[derive(Debug)]
    struct OnlyNewYork;

    impl TimezoneLookup for OnlyNewYork {
        fn resolve(&self, tzid: &str) -> Option<Arc<dyn ZoneRules>> {
            (tzid == "America/New_York")
                .then(|| Arc::new(chrono_tz::America::New_York) as Arc<dyn ZoneRules>)
        }
    }

    fn decode(codec: &dyn ValueTranscoder, raw: &str, params: &[Parameter]) -> Value {
        codec.decode(raw, params, &DecodeContext::default()).unwrap()
    }

    fn assert_round_trip(codec: &dyn ValueTranscoder, raw: &str, params: &[Parameter]) {
        let value = decode(codec, raw, params);
        let encoded = codec.encode(&value, params);
        assert_eq!(decode(codec, &encoded, params), value, "{raw} -> {encoded}");
    }

    #[test]
    fn values_survive_encode_decode() {
        assert_round_trip(TEXT, r"a\, b\; c\\ d\n e", &[]);
        assert_round_trip(TEXT_LIST, r"one,two\,three,", &[]);
        assert_round_trip(STRUCTURED, r"Doe;John;;Dr.;", &[]);
        assert_round_trip(DATE_OR_DATE_TIME, "20240115", &[]);
        assert_round_trip(DATE_OR_DATE_TIME, "20240115T093000Z", &[]);
        assert_round_trip(MULTI_DATE, "20240101,20240102", &[]);
        assert_round_trip(MULTI_DATE, "19970101T180000Z/PT5H30M", &[]);
        assert_round_trip(DURATION, "-P1DT2H", &[]);
        assert_round_trip(TRIGGER, "-PT15M", &[]);
        assert_round_trip(RECUR, "FREQ=WEEKLY;UNTIL=20241231T000000Z;BYDAY=MO,WE", &[]);
        assert_round_trip(UTC_OFFSET, "-0500", &[]);
        assert_round_trip(FLOAT, "37.386013", &[]);
        assert_round_trip(BOOLEAN, "TRUE", &[]);
        assert_round_trip(TIME, "230000Z", &[]);
        let base64 = [Parameter::new("ENCODING", "BASE64")];
        assert_round_trip(BINARY, "aGVsbG8gd29ybGQ=", &base64);
        assert_round_trip(OPAQUE, r"anything\,at all", &[]);
    }

    /// Stores `value` through the line API, encodes it with the params the
    /// line ends up carrying and decodes it back.
    fn native_round_trip(codec: &'static dyn ValueTranscoder, name: &str, value: &Value) {
        let mut line = ContentLine::with_value(name, value.clone());
        line.set_behavior(Arc::new(Behavior::property(name, codec)));
        let encoded = line.encoded_value().into_owned();
        let decoded = codec
            .decode(&encoded, &line.params, &DecodeContext::default())
            .unwrap();
        assert_eq!(&decoded, value, "{name} -> {encoded}");
    }

    #[test]
    fn native_durations_survive_encode_decode() {
        let mut samples = vec![Duration::zero()];
        for n in [1, 2, 52, 613_566_757, u32::MAX] {
            samples.push(Duration::weeks(n));
            samples.push(Duration::weeks(n).negate());
            samples.push(Duration::days(n));
        }
        for (d, h, m, s) in [(0, 0, 0, 1), (1, 2, 3, 4), (0, 25, 0, 0), (7, 0, 90, 0)] {
            let duration = Duration::builder()
                .days(d)
                .hours(h)
                .minutes(m)
                .seconds(s)
                .build();
            samples.push(duration);
            samples.push(duration.negate());
        }
        for duration in samples {
            native_round_trip(DURATION, "DURATION", &Value::Duration(duration));
            native_round_trip(TRIGGER, "TRIGGER", &Value::Duration(duration));
        }

        // Mixed weeks and days are written as days and keep their length.
        let mixed = Duration::builder().weeks(u32::MAX).days(3).hours(1).build();
        let encoded = DURATION.encode(&Value::Duration(mixed), &[]);
        let decoded = decode(DURATION, &encoded, &[]);
        assert_eq!(
            decoded.as_duration().map(Duration::as_seconds),
            Some(mixed.as_seconds())
        );
    }

    #[test]
    fn native_datetimes_keep_their_form() {
        let day = Date::new(2024, 3, 1);
        let forms = [
            DateTime::floating(day, 9, 0, 0),
            DateTime::utc(day, 14, 0, 0),
            DateTime::zoned(day, 9, 0, 0, "America/New_York"),
        ];
        for dt in &forms {
            native_round_trip(DATE_TIME, "DTSTART", &Value::DateTime(dt.clone()));
            native_round_trip(DATE_OR_DATE_TIME, "DUE", &Value::DateTime(dt.clone()));
            native_round_trip(MULTI_DATE, "RDATE", &Value::DateTimeList(vec![dt.clone()]));
        }
        let period = Period::from_duration(forms[2].clone(), Duration::hours(1));
        native_round_trip(MULTI_DATE, "RDATE", &Value::PeriodList(vec![period]));
    }

    #[test]
    fn stale_tzid_is_replaced_by_the_value_form() {
        let day = Date::new(2024, 3, 1);
        let mut line = ContentLine::new("DTSTART", "20240301T090000")
            .with_param(Parameter::tzid("Europe/Berlin"));
        line.set_value(Value::DateTime(DateTime::utc(day, 8, 0, 0)));
        assert!(line.param("TZID").is_none());

        line.set_value(Value::DateTime(DateTime::zoned(day, 9, 0, 0, "Asia/Tokyo")));
        assert_eq!(line.param_value("TZID"), Some("Asia/Tokyo"));
    }

    #[test]
    fn utc_conversion_drops_tzid() {
        let ctx = DecodeContext::new(Some(&OnlyNewYork));
        let mut line = ContentLine::new("DTSTAMP", "20240115T090000")
            .with_param(Parameter::tzid("America/New_York"));
        line.set_behavior(Arc::new(Behavior::property("DTSTAMP", UTC_DATE_TIME)));
        line.transcode(&ctx).unwrap();
        assert!(line.param("TZID").is_none());
        assert_eq!(line.encoded_value(), "20240115T140000Z");
    }

    #[test]
    fn value_parameter_overrides_declared_codec() {
        let date = [Parameter::value_type("DATE")];
        assert_eq!(for_line(None, &date).value_type(), ValueType::Date);

        let summary = Behavior::property("SUMMARY", TEXT);
        let uri = [Parameter::value_type("URI")];
        let codec = for_line(Some(&summary), &uri);
        assert_eq!(codec.value_type(), ValueType::Uri);

        let dtstart = Behavior::property("DTSTART", DATE_OR_DATE_TIME);
        let codec = for_line(Some(&dtstart), &date);
        assert_eq!(
            decode(codec, "20240115", &date),
            Value::Date(Date::new(2024, 1, 15))
        );
    }

    #[test]
    fn lines_without_behavior_are_opaque() {
        let codec = for_line(None, &[]);
        assert_eq!(codec.value_type(), ValueType::Unknown);
    }

    #[test]
    fn date_or_datetime_sniffs_precision() {
        assert!(matches!(decode(DATE_OR_DATE_TIME, "20240115", &[]), Value::Date(_)));
        let zoned = decode(
            DATE_OR_DATE_TIME,
            "20240115T090000",
            &[Parameter::tzid("Europe/Paris")],
        );
        assert_eq!(
            zoned.as_datetime().and_then(DateTime::tzid),
            Some("Europe/Paris")
        );
    }

    #[test]
    fn unknown_zone_fails_only_with_lookup() {
        let params = [Parameter::tzid("Mars/Olympus")];
        assert!(DATE_TIME
            .decode("20240115T090000", &params, &DecodeContext::default())
            .is_ok());

        let ctx = DecodeContext::new(Some(&OnlyNewYork));
        let err = DATE_TIME.decode("20240115T090000", &params, &ctx).unwrap_err();
        assert_eq!(err.kind, TranscodeErrorKind::UnknownTimezone);

        let known = [Parameter::tzid("America/New_York")];
        assert!(DATE_TIME.decode("20240115T090000", &known, &ctx).is_ok());
    }

    #[test]
    fn utc_properties_convert_resolvable_zones() {
        let ctx = DecodeContext::new(Some(&OnlyNewYork));
        let params = [Parameter::tzid("America/New_York")];
        let value = UTC_DATE_TIME
            .decode("20240115T090000", &params, &ctx)
            .unwrap();
        let utc = value.as_datetime().map(ToString::to_string);
        assert_eq!(utc.as_deref(), Some("20240115T140000Z"));
    }

    #[test]
    fn multi_date_forms() {
        let dates = decode(MULTI_DATE, "20240101,20240105", &[]);
        assert!(matches!(dates, Value::DateList(ref d) if d.len() == 2));
        assert!(matches!(
            decode(MULTI_DATE, "20240101T090000Z,20240105T090000Z", &[]),
            Value::DateTimeList(_)
        ));
        let periods = decode(MULTI_DATE, "19970101T180000Z/19970102T070000Z", &[]);
        let Value::PeriodList(periods) = periods else {
            panic!("expected a period list");
        };
        assert!(matches!(periods[0], Period::Explicit { .. }));
    }

    #[test]
    fn trigger_forms() {
        assert_eq!(
            decode(TRIGGER, "-PT15M", &[]),
            Value::Duration(Duration::minutes(15).negate())
        );
        let absolute = decode(
            TRIGGER,
            "19980101T050000Z",
            &[Parameter::value_type("DATE-TIME")],
        );
        assert!(matches!(absolute, Value::DateTime(ref dt) if dt.is_utc()));
    }

    #[test]
    fn binary_without_encoding_is_text() {
        assert_eq!(decode(BINARY, "http://x", &[]), Value::Text("http://x".into()));
    }

    #[test]
    fn vcard_text_charsets() {
        let b = Parameter::new("ENCODING", "b");
        let utf8 = decode(VCARD_TEXT, "SsO8cmdlbg==", &[b.clone()]);
        assert_eq!(utf8, Value::Text("Jürgen".into()));
        assert_eq!(VCARD_TEXT.encode(&utf8, &[b.clone()]), "SsO8cmdlbg==");

        let latin1 = [b.clone(), Parameter::new("CHARSET", "ISO-8859-1")];
        assert!(matches!(decode(VCARD_TEXT, "SvxyZ2Vu", &latin1), Value::Binary(_)));

        let invalid = decode(VCARD_TEXT, "/w==", &[b]);
        assert_eq!(invalid, Value::Binary(vec![0xff]));

        assert_eq!(decode(VCARD_TEXT, r"a\,b", &[]), Value::Text("a,b".into()));
    }

    #[test]
    fn quoted_printable_vcard_values() {
        let qp = Parameter::new("ENCODING", "QUOTED-PRINTABLE");
        let utf8 = [qp.clone(), Parameter::new("CHARSET", "UTF-8")];
        let note = decode(VCARD_TEXT, "Caf=C3=A9 au lait", &utf8);
        assert_eq!(note, Value::Text("Café au lait".into()));
        assert_eq!(VCARD_TEXT.encode(&note, &utf8), "Caf=C3=A9 au lait");
        assert_eq!(
            decode(VCARD_TEXT, "one=0D=0Atwo", &[qp.clone()]),
            Value::Text("one\r\ntwo".into())
        );

        let latin1 = [qp.clone(), Parameter::new("CHARSET", "ISO-8859-1")];
        let raw = decode(VCARD_TEXT, "=E9t=E9", &latin1);
        assert_eq!(raw, Value::Binary(vec![0xe9, b't', 0xe9]));
        assert_eq!(VCARD_TEXT.encode(&raw, &latin1), "=E9t=E9");

        let bare = [Parameter::bare("QUOTED-PRINTABLE")];
        assert!(matches!(decode(STRUCTURED, ";=C3=A9", &bare),
            Value::Structured(fields) if fields.len() == 2 && fields[1] == ["é"]));
        let list = decode(TEXT_LIST, "a,=C3=A9", &[qp.clone()]);
        assert_eq!(list, Value::TextList(vec!["a".into(), "é".into()]));
        assert_eq!(TEXT_LIST.encode(&list, &[qp]), "a,=C3=A9");

        assert!(VCARD_TEXT.decode("=ZZ", &bare, &DecodeContext::default()).is_err());
    }

    #[test]
    fn decode_failures_keep_kind() {
        let ctx = DecodeContext::default();
        assert_eq!(
            INTEGER.decode("ten", &[], &ctx).unwrap_err().kind,
            TranscodeErrorKind::InvalidInteger
        );
        assert_eq!(
            DATE_OR_DATE_TIME.decode("20230229", &[], &ctx).unwrap_err().kind,
            TranscodeErrorKind::InvalidDate
        );
    }
}
