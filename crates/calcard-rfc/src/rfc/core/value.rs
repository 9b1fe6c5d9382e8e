//! Native property values and their type tags (RFC 5545 §3.3, RFC 6350 §4).

use std::fmt;

use super::{Date, DateOrDateTime, DateTime, Duration, RRule, Time, UtcOffset};

/// PERIOD value (RFC 5545 §3.3.9).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Period {
    Explicit { start: DateTime, end: DateTime },
    Duration { start: DateTime, duration: Duration },
}

impl Period {
    #[must_use]
    pub fn explicit(start: DateTime, end: DateTime) -> Self {
        Self::Explicit { start, end }
    }

    #[must_use]
    pub fn from_duration(start: DateTime, duration: Duration) -> Self {
        Self::Duration { start, duration }
    }

    #[must_use]
    pub fn start(&self) -> &DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}

/// Value type tag, as named by the `VALUE` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Period,
    Recur,
    Text,
    Time,
    Uri,
    UtcOffset,
    /// No declared grammar; the raw text is kept as-is.
    Unknown,
}

impl ValueType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::Boolean => "BOOLEAN",
            Self::CalAddress => "CAL-ADDRESS",
            Self::Date => "DATE",
            Self::DateTime => "DATE-TIME",
            Self::Duration => "DURATION",
            Self::Float => "FLOAT",
            Self::Integer => "INTEGER",
            Self::Period => "PERIOD",
            Self::Recur => "RECUR",
            Self::Text => "TEXT",
            Self::Time => "TIME",
            Self::Uri => "URI",
            Self::UtcOffset => "UTC-OFFSET",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a `VALUE` parameter (case-insensitive). vCard's `URL` is an alias of `URI`.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "PERIOD" => Self::Period,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "TIME" => Self::Time,
            "URI" | "URL" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Binary(Vec<u8>),
    Boolean(bool),
    /// Typically a `mailto:` URI.
    CalAddress(String),
    Date(Date),
    DateTime(DateTime),
    DateList(Vec<Date>),
    DateTimeList(Vec<DateTime>),
    Duration(Duration),
    Float(f64),
    Integer(i32),
    Period(Period),
    PeriodList(Vec<Period>),
    Recur(Box<RRule>),
    /// Unescaped text.
    Text(String),
    /// Comma-separated text, each element unescaped.
    TextList(Vec<String>),
    /// Semicolon-separated fields, each a comma-separated list (N, ADR, ORG,
    /// REQUEST-STATUS).
    Structured(Vec<Vec<String>>),
    Time(Time),
    Uri(String),
    UtcOffset(UtcOffset),
    /// Raw text of a value without a known grammar.
    Unknown(String),
}

impl Value {
    /// The element type tag of this value; lists report their element type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Binary(_) => ValueType::Binary,
            Self::Boolean(_) => ValueType::Boolean,
            Self::CalAddress(_) => ValueType::CalAddress,
            Self::Date(_) | Self::DateList(_) => ValueType::Date,
            Self::DateTime(_) | Self::DateTimeList(_) => ValueType::DateTime,
            Self::Duration(_) => ValueType::Duration,
            Self::Float(_) => ValueType::Float,
            Self::Integer(_) => ValueType::Integer,
            Self::Period(_) | Self::PeriodList(_) => ValueType::Period,
            Self::Recur(_) => ValueType::Recur,
            Self::Text(_) | Self::TextList(_) | Self::Structured(_) => ValueType::Text,
            Self::Time(_) => ValueType::Time,
            Self::Uri(_) => ValueType::Uri,
            Self::UtcOffset(_) => ValueType::UtcOffset,
            Self::Unknown(_) => ValueType::Unknown,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Uri(s) | Self::CalAddress(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_structured(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Structured(fields) => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// DTSTART-style access regardless of precision.
    #[must_use]
    pub fn as_date_or_datetime(&self) -> Option<DateOrDateTime> {
        match self {
            Self::Date(d) => Some(DateOrDateTime::Date(*d)),
            Self::DateTime(dt) => Some(DateOrDateTime::DateTime(dt.clone())),
            _ => None,
        }
    }

    /// RDATE/EXDATE-style access: every listed instant, periods by their start.
    #[must_use]
    pub fn as_date_list(&self) -> Vec<DateOrDateTime> {
        match self {
            Self::Date(d) => vec![DateOrDateTime::Date(*d)],
            Self::DateTime(dt) => vec![DateOrDateTime::DateTime(dt.clone())],
            Self::DateList(list) => list.iter().copied().map(DateOrDateTime::Date).collect(),
            Self::DateTimeList(list) => list.iter().cloned().map(DateOrDateTime::DateTime).collect(),
            Self::Period(p) => vec![DateOrDateTime::DateTime(p.start().clone())],
            Self::PeriodList(list) => list
                .iter()
                .map(|p| DateOrDateTime::DateTime(p.start().clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_utc_offset(&self) -> Option<UtcOffset> {
        match self {
            Self::UtcOffset(o) => Some(*o),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Every DATE-TIME inside this value, period ends included.
    fn datetimes(&self) -> Vec<&DateTime> {
        fn period_times(period: &Period) -> Vec<&DateTime> {
            match period {
                Period::Explicit { start, end } => vec![start, end],
                Period::Duration { start, .. } => vec![start],
            }
        }

        match self {
            Self::DateTime(dt) => vec![dt],
            Self::DateTimeList(list) => list.iter().collect(),
            Self::Period(period) => period_times(period),
            Self::PeriodList(list) => list.iter().flat_map(period_times).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn has_datetime(&self) -> bool {
        !self.datetimes().is_empty()
    }

    /// Zone of the first zoned DATE-TIME in this value.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.datetimes().into_iter().find_map(DateTime::tzid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_explicit_display() {
        let start = DateTime::utc(Date::new(2026, 1, 23), 9, 0, 0);
        let end = DateTime::utc(Date::new(2026, 1, 23), 17, 0, 0);
        let period = Period::explicit(start, end);
        assert_eq!(period.to_string(), "20260123T090000Z/20260123T170000Z");
    }

    #[test]
    fn period_duration_display() {
        let start = DateTime::utc(Date::new(2026, 1, 23), 9, 0, 0);
        let period = Period::from_duration(start, Duration::hours(8));
        assert_eq!(period.to_string(), "20260123T090000Z/PT8H");
    }

    #[test]
    fn value_type_from_param() {
        assert_eq!(ValueType::from_param("date-time"), Some(ValueType::DateTime));
        assert_eq!(ValueType::from_param("URL"), Some(ValueType::Uri));
        assert_eq!(ValueType::from_param("X-CUSTOM"), None);
    }

    #[test]
    fn zone_comes_from_any_datetime() {
        let day = Date::new(2024, 3, 1);
        let zoned = DateTime::zoned(day, 9, 0, 0, "Europe/Berlin");
        let value = Value::PeriodList(vec![Period::explicit(
            DateTime::floating(day, 8, 0, 0),
            zoned,
        )]);
        assert_eq!(value.tzid(), Some("Europe/Berlin"));
        assert!(Value::DateTime(DateTime::utc(day, 9, 0, 0)).has_datetime());
        assert!(!Value::Date(day).has_datetime());
        assert_eq!(Value::Date(day).tzid(), None);
    }

    #[test]
    fn list_values_report_element_type() {
        let value = Value::DateList(vec![Date::new(2024, 1, 1)]);
        assert_eq!(value.value_type(), ValueType::Date);
        assert_eq!(value.as_date_list().len(), 1);
        assert_eq!(Value::Structured(vec![]).value_type(), ValueType::Text);
    }
}
