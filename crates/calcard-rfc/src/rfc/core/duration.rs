//! DURATION value (RFC 5545 §3.3.6).

use std::fmt;

/// A signed duration. Either week-based (`P2W`) or day/time-based
/// (`P1DT2H30M`); iCalendar has no year or month designators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub negative: bool,
    /// Mutually exclusive with the day/time fields on the wire.
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            negative: false,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self {
            weeks,
            ..Self::zero()
        }
    }

    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            days,
            ..Self::zero()
        }
    }

    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::zero()
        }
    }

    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        Self {
            minutes,
            ..Self::zero()
        }
    }

    #[must_use]
    pub const fn builder() -> DurationBuilder {
        DurationBuilder::new()
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.weeks == 0 && self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Total signed length in seconds.
    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        let total = (self.weeks as i64 * 7 * 24 * 3600)
            + (self.days as i64 * 24 * 3600)
            + (self.hours as i64 * 3600)
            + (self.minutes as i64 * 60)
            + (self.seconds as i64);

        if self.negative { -total } else { total }
    }

    /// Nominal length as a chrono delta (days count as 24 hours).
    #[must_use]
    pub fn to_chrono(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(self.as_seconds())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative && !self.is_zero() {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        if self.is_zero() {
            return write!(f, "0D");
        }
        if self.weeks > 0 && self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0 {
            return write!(f, "{}W", self.weeks);
        }

        // Weeks cannot share a value with other designators on the wire.
        let days = u64::from(self.days) + u64::from(self.weeks) * 7;
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

/// Builder for constructing `Duration` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationBuilder {
    inner: Duration,
}

impl DurationBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Duration::zero(),
        }
    }

    #[must_use]
    pub const fn negative(mut self) -> Self {
        self.inner.negative = true;
        self
    }

    #[must_use]
    pub const fn weeks(mut self, weeks: u32) -> Self {
        self.inner.weeks = weeks;
        self
    }

    #[must_use]
    pub const fn days(mut self, days: u32) -> Self {
        self.inner.days = days;
        self
    }

    #[must_use]
    pub const fn hours(mut self, hours: u32) -> Self {
        self.inner.hours = hours;
        self
    }

    #[must_use]
    pub const fn minutes(mut self, minutes: u32) -> Self {
        self.inner.minutes = minutes;
        self
    }

    #[must_use]
    pub const fn seconds(mut self, seconds: u32) -> Self {
        self.inner.seconds = seconds;
        self
    }

    #[must_use]
    pub const fn build(self) -> Duration {
        self.inner
    }
}
