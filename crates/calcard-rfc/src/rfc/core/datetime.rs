//! DATE, TIME, DATE-TIME and UTC-OFFSET values (RFC 5545 §3.3.4, §3.3.5, §3.3.12, §3.3.14).

use std::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// UTC offset, stored as total seconds east of UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    /// UTC offset (zero).
    pub const UTC: Self = Self { seconds: 0 };

    /// Creates a UTC offset from total seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Returns the offset as total seconds from UTC.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.seconds
    }

    /// Converts to a chrono offset; `None` when out of chrono's ±24h range.
    #[must_use]
    pub fn to_fixed(self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.seconds)
    }
}

impl From<FixedOffset> for UtcOffset {
    fn from(offset: FixedOffset) -> Self {
        Self::from_seconds(offset.local_minus_utc())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let total = self.seconds.abs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if seconds == 0 {
            write!(f, "{sign}{hours:02}{minutes:02}")
        } else {
            write!(f, "{sign}{hours:02}{minutes:02}{seconds:02}")
        }
    }
}

/// DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Returns the chrono date, or `None` if this is not a calendar date.
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }

    /// Converts from chrono; `None` for years outside `0..=9999`.
    #[must_use]
    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        Some(Self {
            year: u16::try_from(date.year()).ok().filter(|y| *y <= 9999)?,
            month: u8::try_from(date.month()).ok()?,
            day: u8::try_from(date.day()).ok()?,
        })
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// TIME value (RFC 5545 §3.3.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    /// 0-60, allowing for leap seconds.
    pub second: u8,
    pub is_utc: bool,
}

impl Time {
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8, is_utc: bool) -> Self {
        Self {
            hour,
            minute,
            second,
            is_utc,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)?;
        if self.is_utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// The three mutually exclusive DATE-TIME forms (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Same wall-clock time in any zone: `19980118T230000`.
    Floating,
    /// Absolute instant: `19980119T070000Z`.
    Utc,
    /// Wall-clock time in a named zone: `TZID=America/New_York:19980119T020000`.
    Zoned { tzid: String },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub form: DateTimeForm,
}

impl DateTime {
    #[must_use]
    pub const fn new(date: Date, hour: u8, minute: u8, second: u8, form: DateTimeForm) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour,
            minute,
            second,
            form,
        }
    }

    #[must_use]
    pub const fn utc(date: Date, hour: u8, minute: u8, second: u8) -> Self {
        Self::new(date, hour, minute, second, DateTimeForm::Utc)
    }

    #[must_use]
    pub const fn floating(date: Date, hour: u8, minute: u8, second: u8) -> Self {
        Self::new(date, hour, minute, second, DateTimeForm::Floating)
    }

    #[must_use]
    pub fn zoned(date: Date, hour: u8, minute: u8, second: u8, tzid: impl Into<String>) -> Self {
        Self::new(
            date,
            hour,
            minute,
            second,
            DateTimeForm::Zoned { tzid: tzid.into() },
        )
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        Date::new(self.year, self.month, self.day)
    }

    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Floating | DateTimeForm::Utc => None,
        }
    }

    /// Wall-clock time as a chrono value. A leap second is clamped to `:59`.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second.min(59)),
        )?;
        Some(self.date().to_naive()?.and_time(time))
    }

    /// Builds a value in the given form from a chrono wall-clock time.
    #[must_use]
    pub fn from_naive(naive: NaiveDateTime, form: DateTimeForm) -> Option<Self> {
        Some(Self::new(
            Date::from_naive(naive.date())?,
            u8::try_from(naive.hour()).ok()?,
            u8::try_from(naive.minute()).ok()?,
            u8::try_from(naive.second()).ok()?,
            form,
        ))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{:02}{:02}{:02}",
            self.date(),
            self.hour,
            self.minute,
            self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Either precision of a date-valued property such as DTSTART.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateOrDateTime {
    Date(Date),
    DateTime(DateTime),
}

impl DateOrDateTime {
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(dt) => dt.date(),
        }
    }

    /// Wall-clock time; a DATE is taken at midnight.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(date) => date.to_naive().and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::DateTime(dt) => dt.to_naive(),
        }
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => dt.tzid(),
        }
    }

    /// Rebuilds a value of the same precision and form at another wall-clock time.
    #[must_use]
    pub fn with_naive(&self, naive: NaiveDateTime) -> Option<Self> {
        match self {
            Self::Date(_) => Date::from_naive(naive.date()).map(Self::Date),
            Self::DateTime(dt) => DateTime::from_naive(naive, dt.form.clone()).map(Self::DateTime),
        }
    }
}

impl From<Date> for DateOrDateTime {
    fn from(date: Date) -> Self {
        Self::Date(date)
    }
}

impl From<DateTime> for DateOrDateTime {
    fn from(dt: DateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl fmt::Display for DateOrDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => fmt::Display::fmt(date, f),
            Self::DateTime(dt) => fmt::Display::fmt(dt, f),
        }
    }
}
