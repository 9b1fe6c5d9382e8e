//! Native value → wire text.

use std::fmt::Display;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::escape::escape_text;
use crate::rfc::core::Value;

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn join_text(items: &[String]) -> String {
    items
        .iter()
        .map(|s| escape_text(s))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encodes a value in its canonical wire form.
///
/// TEXT is escaped, BINARY is base64, lists are comma-joined and structured
/// values are `;`-joined fields of comma lists. Unknown values are written
/// back exactly as they were read.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Binary(bytes) => STANDARD.encode(bytes),
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
        Value::CalAddress(s) | Value::Uri(s) | Value::Unknown(s) => s.clone(),
        Value::Date(date) => date.to_string(),
        Value::DateTime(dt) => dt.to_string(),
        Value::DateList(dates) => join(dates),
        Value::DateTimeList(dts) => join(dts),
        Value::Duration(duration) => duration.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Period(period) => period.to_string(),
        Value::PeriodList(periods) => join(periods),
        Value::Recur(rule) => rule.to_string(),
        Value::Text(text) => escape_text(text),
        Value::TextList(items) => join_text(items),
        Value::Structured(fields) => fields
            .iter()
            .map(|field| join_text(field))
            .collect::<Vec<_>>()
            .join(";"),
        Value::Time(time) => time.to_string(),
        Value::UtcOffset(offset) => offset.to_string(),
    }
}

/// ## Summary
/// Quoted-printable without soft line breaks.
///
/// Printable ASCII other than `=` passes through, as do spaces and tabs
/// unless they end the value.
#[must_use]
pub fn encode_quoted_printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for (i, &byte) in bytes.iter().enumerate() {
        let last = i + 1 == bytes.len();
        match byte {
            b'=' => out.push_str("=3D"),
            b' ' | b'\t' if !last => out.push(char::from(byte)),
            b'!'..=b'~' => out.push(char::from(byte)),
            _ => out.push_str(&format!("={byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{Date, DateTime, Duration, Frequency, RRule, UtcOffset};

    #[test]
    fn scalars() {
        assert_eq!(encode_value(&Value::Boolean(true)), "TRUE");
        assert_eq!(encode_value(&Value::Integer(-3)), "-3");
        assert_eq!(encode_value(&Value::Float(1.0)), "1");
        assert_eq!(encode_value(&Value::Float(37.5)), "37.5");
        assert_eq!(encode_value(&Value::UtcOffset(UtcOffset::from_seconds(-18000))), "-0500");
        assert_eq!(encode_value(&Value::Duration(Duration::zero())), "P0D");
    }

    #[test]
    fn text_forms() {
        assert_eq!(encode_value(&Value::Text("a, b; c\nd".into())), r"a\, b\; c\nd");
        assert_eq!(
            encode_value(&Value::TextList(vec!["x,y".into(), "z".into()])),
            r"x\,y,z"
        );
        assert_eq!(
            encode_value(&Value::Structured(vec![
                vec!["Doe".into()],
                vec!["John".into()],
                vec![],
                vec!["Dr.".into(), "Prof.".into()],
            ])),
            "Doe;John;;Dr.,Prof."
        );
    }

    #[test]
    fn dates_and_rules() {
        let day = Date::new(2024, 3, 1);
        assert_eq!(
            encode_value(&Value::DateList(vec![day, Date::new(2024, 3, 2)])),
            "20240301,20240302"
        );
        assert_eq!(
            encode_value(&Value::DateTime(DateTime::utc(day, 8, 0, 0))),
            "20240301T080000Z"
        );
        let rule = RRule::new(Frequency::Weekly).with_count(4);
        assert_eq!(encode_value(&Value::Recur(Box::new(rule))), "FREQ=WEEKLY;COUNT=4");
    }

    #[test]
    fn binary_is_base64() {
        assert_eq!(encode_value(&Value::Binary(b"hello".to_vec())), "aGVsbG8=");
    }

    #[test]
    fn quoted_printable_escapes_what_it_must() {
        assert_eq!(encode_quoted_printable("café = ok".as_bytes()), "caf=C3=A9 =3D ok");
        assert_eq!(encode_quoted_printable(b"line\r\nend "), "line=0D=0Aend=20");
    }
}
