//! Timezone resolution for zoned date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone
//! canonicalization.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use tracing::trace;

use super::vtimezone::{VTimezone, VTimezoneError};
use crate::rfc::core::Component;

/// Offset rules of one zone.
pub trait ZoneRules: Send + Sync + fmt::Debug {
    /// Offsets in effect at a wall-clock time: none in a DST gap, two in a fold.
    fn offset_from_local(&self, local: NaiveDateTime) -> LocalResult<FixedOffset>;

    fn offset_from_utc(&self, utc: NaiveDateTime) -> FixedOffset;

    /// ## Summary
    /// Converts a wall-clock time to UTC.
    ///
    /// A time in a fold uses its first occurrence; a time in a gap is moved
    /// forward by the length of the gap.
    fn to_utc(&self, local: NaiveDateTime) -> NaiveDateTime {
        let (local, offset) = resolve_local(self, local);
        local - seconds(offset)
    }

    fn from_utc(&self, utc: NaiveDateTime) -> NaiveDateTime {
        utc + seconds(self.offset_from_utc(utc))
    }
}

/// Looks up zone rules by TZID.
pub trait TimezoneLookup: Send + Sync + fmt::Debug {
    fn resolve(&self, tzid: &str) -> Option<Arc<dyn ZoneRules>>;
}

impl ZoneRules for Tz {
    fn offset_from_local(&self, local: NaiveDateTime) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local).map(|offset| offset.fix())
    }

    fn offset_from_utc(&self, utc: NaiveDateTime) -> FixedOffset {
        self.offset_from_utc_datetime(&utc).fix()
    }
}

fn seconds(offset: FixedOffset) -> TimeDelta {
    TimeDelta::seconds(i64::from(offset.local_minus_utc()))
}

/// ## Summary
/// Pins a wall-clock time to a single offset.
///
/// Folds take the earlier offset. Gaps shift the time forward by the
/// difference between the offsets on either side.
pub(crate) fn resolve_local<Z: ZoneRules + ?Sized>(
    zone: &Z,
    local: NaiveDateTime,
) -> (NaiveDateTime, FixedOffset) {
    if let Some(offset) = zone.offset_from_local(local).earliest() {
        return (local, offset);
    }

    let day = TimeDelta::hours(12);
    let before = zone.offset_from_utc(local - day);
    let after = zone.offset_from_utc(local + day);
    let shifted = local + (seconds(after) - seconds(before));
    trace!(%local, %shifted, "local time falls in a DST gap");
    let offset = zone.offset_from_local(shifted).earliest().unwrap_or(after);
    (shifted, offset)
}

/// Default collaborator: VTIMEZONE definitions first, then the IANA
/// database shipped with `chrono-tz`.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Resolved IANA zones by the TZID they were asked for.
    cache: RwLock<HashMap<String, Tz>>,
    vtimezones: HashMap<String, Arc<VTimezone>>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Builds a resolver with every VTIMEZONE in `calendar` registered.
    ///
    /// ## Errors
    /// Returns an error if any VTIMEZONE component is invalid.
    pub fn from_calendar(calendar: &Component) -> Result<Self, VTimezoneError> {
        let mut resolver = Self::new();
        for component in calendar
            .descendants()
            .filter(|c| c.is_named("VTIMEZONE"))
        {
            resolver.register_vtimezone(VTimezone::from_component(component)?);
        }
        Ok(resolver)
    }

    /// Registers a VTIMEZONE under its TZID, replacing any previous one.
    pub fn register_vtimezone(&mut self, vtimezone: VTimezone) {
        self.vtimezones
            .insert(vtimezone.tzid.clone(), Arc::new(vtimezone));
    }

    #[must_use]
    pub fn get_vtimezone(&self, tzid: &str) -> Option<&VTimezone> {
        self.vtimezones.get(tzid).map(Arc::as_ref)
    }

    #[must_use]
    pub fn has_vtimezone(&self, tzid: &str) -> bool {
        self.vtimezones.contains_key(tzid)
    }

    /// ## Summary
    /// Resolves a TZID to an IANA zone after normalizing vendor prefixes,
    /// Windows names and aliases. Successful lookups are cached.
    #[must_use]
    pub fn resolve_iana(&self, tzid: &str) -> Option<Tz> {
        if let Some(tz) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tzid)
        {
            return Some(*tz);
        }

        let tz = Tz::from_str(&normalize_tzid(tzid)).ok()?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tzid.to_string(), tz);
        Some(tz)
    }
}

impl TimezoneLookup for TimeZoneResolver {
    fn resolve(&self, tzid: &str) -> Option<Arc<dyn ZoneRules>> {
        if let Some(vtimezone) = self.vtimezones.get(tzid) {
            return Some(Arc::clone(vtimezone) as Arc<dyn ZoneRules>);
        }
        self.resolve_iana(tzid)
            .map(|tz| Arc::new(tz) as Arc<dyn ZoneRules>)
    }
}

/// ## Summary
/// Normalizes calendar-client TZIDs to IANA names.
///
/// Strips `/mozilla.org/` and `/softwarestudio.org/` prefixes, maps Windows
/// zone names and canonicalizes IANA aliases. Unrecognized names come back
/// without their prefix.
#[must_use]
pub fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);
    // Older Mozilla exports carry a date segment: `20070129_1/America/New_York`.
    let stripped = match stripped.split_once('/') {
        Some((version, rest)) if version.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => stripped,
    };

    let iana_parser = IanaParserExtended::new();
    if let Some(tz) = WindowsParser::new().parse(stripped, None) {
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}
