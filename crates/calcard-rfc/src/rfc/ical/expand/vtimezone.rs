//! VTIMEZONE components as zone rules (RFC 5545 §3.6.5).

use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{
    Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    Utc,
};

use super::ExpansionOptions;
use super::timezone::ZoneRules;
use crate::rfc::core::{
    Component, ContentLine, DateOrDateTime, DateTime, DateTimeForm, RRule, UtcOffset, Value,
    Weekday, WeekdayNum,
};
use crate::rfc::parse::values::{decode_date_or_datetime, decode_recur, decode_utc_offset};

/// Error while reading a VTIMEZONE.
#[derive(Debug, thiserror::Error)]
pub enum VTimezoneError {
    #[error("Missing required TZID property")]
    MissingTzid,

    #[error("VTIMEZONE must have at least one STANDARD or DAYLIGHT component")]
    NoObservances,

    #[error("Missing required property {0} in {1} component")]
    MissingProperty(&'static str, &'static str),

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservanceKind {
    Standard,
    Daylight,
}

impl ObservanceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
        }
    }
}

impl fmt::Display for ObservanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A STANDARD or DAYLIGHT sub-rule: when an offset takes effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Observance {
    pub kind: ObservanceKind,
    pub offset_from: UtcOffset,
    pub offset_to: UtcOffset,
    /// First onset, in the local time of `offset_from`.
    pub dtstart: NaiveDateTime,
    pub rrule: Option<RRule>,
    pub rdates: Vec<NaiveDateTime>,
    pub tzname: Option<String>,
}

impl Observance {
    /// ## Summary
    /// Latest onset at or before `bound` (local time), if any.
    ///
    /// Onsets come from DTSTART, RDATE and the RRULE expanded with the
    /// engine's own recurrence cursor.
    fn latest_onset(&self, bound: NaiveDateTime) -> Option<NaiveDateTime> {
        if bound < self.dtstart {
            return None;
        }

        let mut best = self.dtstart;
        for rdate in &self.rdates {
            if *rdate <= bound && *rdate > best {
                best = *rdate;
            }
        }

        if let Some(rule) = &self.rrule {
            let rule = self.local_until(rule);
            let anchor = DateOrDateTime::DateTime(DateTime::from_naive(
                self.dtstart,
                DateTimeForm::Floating,
            )?);
            let last = rule
                .occurrences(&anchor, &ExpansionOptions::until(bound))
                .ok()
                .and_then(Iterator::last)
                .and_then(|onset| onset.to_naive());
            if let Some(onset) = last
                && onset > best
            {
                best = onset;
            }
        }

        Some(best)
    }

    /// The rule with a UTC UNTIL moved to the wall clock of `offset_from`,
    /// matching the floating DTSTART it expands from.
    fn local_until<'a>(&self, rule: &'a RRule) -> Cow<'a, RRule> {
        let Some(DateOrDateTime::DateTime(until)) = &rule.until else {
            return Cow::Borrowed(rule);
        };
        if !until.is_utc() {
            return Cow::Borrowed(rule);
        }
        let local = until
            .to_naive()
            .map(|utc| utc + TimeDelta::seconds(i64::from(self.offset_from.as_seconds())))
            .and_then(|local| DateTime::from_naive(local, DateTimeForm::Floating));
        match local {
            Some(local) => {
                let mut rule = rule.clone();
                rule.until = Some(DateOrDateTime::DateTime(local));
                Cow::Owned(rule)
            }
            None => Cow::Borrowed(rule),
        }
    }
}

/// A parsed VTIMEZONE.
#[derive(Debug, Clone, PartialEq)]
pub struct VTimezone {
    pub tzid: String,
    pub observances: Vec<Observance>,
    pub tzurl: Option<String>,
}

fn text(line: &ContentLine) -> String {
    match line.value() {
        Some(Value::Text(s) | Value::Unknown(s) | Value::Uri(s)) => s.clone(),
        _ => line.encoded_value().into_owned(),
    }
}

fn required<'a>(
    component: &'a Component,
    name: &'static str,
    kind: &'static str,
) -> Result<&'a ContentLine, VTimezoneError> {
    component
        .line(name)
        .ok_or(VTimezoneError::MissingProperty(name, kind))
}

fn offset(line: &ContentLine, name: &'static str) -> Result<UtcOffset, VTimezoneError> {
    if let Some(offset) = line.value().and_then(Value::as_utc_offset) {
        return Ok(offset);
    }
    decode_utc_offset(&line.encoded_value())
        .map_err(|e| VTimezoneError::InvalidValue(name, e.value))
}

fn local_times(line: &ContentLine) -> Vec<NaiveDateTime> {
    let values = match line.value() {
        Some(value) => value.as_date_list(),
        None => line
            .encoded_value()
            .split(',')
            .filter_map(|raw| decode_date_or_datetime(raw, None).ok())
            .collect(),
    };
    values.iter().filter_map(DateOrDateTime::to_naive).collect()
}

impl VTimezone {
    /// ## Summary
    /// Reads a VTIMEZONE component, decoded or not.
    ///
    /// ## Errors
    /// Returns an error if TZID is missing, there are no observances, or an
    /// observance lacks or garbles DTSTART, TZOFFSETFROM or TZOFFSETTO.
    pub fn from_component(component: &Component) -> Result<Self, VTimezoneError> {
        if !component.is_named("VTIMEZONE") {
            return Err(VTimezoneError::MissingTzid);
        }
        let tzid = component
            .line("TZID")
            .map(text)
            .ok_or(VTimezoneError::MissingTzid)?;

        let observances = component
            .components()
            .iter()
            .filter_map(|child| {
                let kind = if child.is_named("STANDARD") {
                    ObservanceKind::Standard
                } else if child.is_named("DAYLIGHT") {
                    ObservanceKind::Daylight
                } else {
                    return None;
                };
                Some(Self::parse_observance(child, kind))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if observances.is_empty() {
            return Err(VTimezoneError::NoObservances);
        }

        Ok(Self {
            tzid,
            observances,
            tzurl: component.line("TZURL").map(text),
        })
    }

    fn parse_observance(
        component: &Component,
        kind: ObservanceKind,
    ) -> Result<Observance, VTimezoneError> {
        let kind_str = kind.as_str();

        let dtstart_line = required(component, "DTSTART", kind_str)?;
        let dtstart = local_times(dtstart_line)
            .first()
            .copied()
            .ok_or_else(|| {
                VTimezoneError::InvalidValue("DTSTART", dtstart_line.encoded_value().into_owned())
            })?;

        let offset_to = offset(required(component, "TZOFFSETTO", kind_str)?, "TZOFFSETTO")?;
        let offset_from = offset(
            required(component, "TZOFFSETFROM", kind_str)?,
            "TZOFFSETFROM",
        )?;

        let rrule = match component.line("RRULE") {
            Some(line) => Some(match line.value().and_then(Value::as_recur) {
                Some(rule) => rule.clone(),
                None => decode_recur(&line.encoded_value())
                    .map_err(|e| VTimezoneError::InvalidValue("RRULE", e.value))?,
            }),
            None => None,
        };

        let rdates = component.lines_named("RDATE").flat_map(local_times).collect();

        Ok(Observance {
            kind,
            offset_from,
            offset_to,
            dtstart,
            rrule,
            rdates,
            tzname: component.line("TZNAME").map(text),
        })
    }

    /// ## Summary
    /// UTC offset in effect at a local time.
    ///
    /// Before the first onset the earliest observance's TZOFFSETFROM applies.
    #[must_use]
    pub fn offset_at(&self, local: NaiveDateTime) -> UtcOffset {
        self.observances
            .iter()
            .filter_map(|obs| obs.latest_onset(local).map(|onset| (onset, obs)))
            .max_by_key(|(onset, _)| *onset)
            .map_or_else(|| self.initial_offset(), |(_, obs)| obs.offset_to)
    }

    /// UTC offset in effect at a UTC instant.
    #[must_use]
    pub fn offset_at_utc(&self, utc: NaiveDateTime) -> UtcOffset {
        self.observances
            .iter()
            .filter_map(|obs| {
                let from = TimeDelta::seconds(i64::from(obs.offset_from.as_seconds()));
                let onset = obs.latest_onset(utc + from)?;
                Some((onset - from, obs))
            })
            .max_by_key(|(onset, _)| *onset)
            .map_or_else(|| self.initial_offset(), |(_, obs)| obs.offset_to)
    }

    fn initial_offset(&self) -> UtcOffset {
        self.observances
            .iter()
            .min_by_key(|obs| obs.dtstart)
            .map_or(UtcOffset::UTC, |obs| obs.offset_from)
    }

    /// ## Summary
    /// Describes a zone's offset changes over `years` as observances.
    ///
    /// Changes recurring on the same weekday of the same month in
    /// consecutive years share one yearly RRULE. The rule still running in
    /// the last year has no UNTIL, so it also covers later years. A zone
    /// without changes gets a single STANDARD observance.
    #[must_use]
    pub fn from_zone<Z: ZoneRules + ?Sized>(
        tzid: impl Into<String>,
        zone: &Z,
        years: RangeInclusive<i32>,
    ) -> Self {
        let (first, last) = years.into_inner();
        let start = new_year(first).unwrap_or_default();
        let found = new_year(last.saturating_add(1))
            .map(|end| transitions(zone, start, end))
            .unwrap_or_default();

        let mut runs: Vec<Run> = Vec::new();
        for transition in found {
            let kind = transition.kind();
            let open = runs
                .iter()
                .rposition(|run| run.kind == kind)
                .filter(|&i| runs[i].extends(&transition));
            match open {
                Some(i) => runs[i].push(transition),
                None => runs.push(Run::new(transition)),
            }
        }

        let mut observances: Vec<Observance> = runs
            .iter()
            .map(|run| run.observance(run.last.local().year() >= last))
            .collect();
        if observances.is_empty() {
            let offset = zone.offset_from_utc(start);
            observances.push(Observance {
                kind: ObservanceKind::Standard,
                offset_from: offset.into(),
                offset_to: offset.into(),
                dtstart: start + TimeDelta::seconds(i64::from(offset.local_minus_utc())),
                rrule: None,
                rdates: Vec::new(),
                tzname: None,
            });
        }

        Self {
            tzid: tzid.into(),
            observances,
            tzurl: None,
        }
    }

    /// A VTIMEZONE component with one STANDARD or DAYLIGHT per observance.
    #[must_use]
    pub fn to_component(&self) -> Component {
        let mut component = Component::new("VTIMEZONE");
        component.add_line(ContentLine::new("TZID", self.tzid.clone()));
        if let Some(url) = &self.tzurl {
            component.add_line(ContentLine::with_value("TZURL", Value::Uri(url.clone())));
        }

        for obs in &self.observances {
            let mut child = Component::new(obs.kind.as_str());
            if let Some(dtstart) = DateTime::from_naive(obs.dtstart, DateTimeForm::Floating) {
                child.add_line(ContentLine::with_value("DTSTART", Value::DateTime(dtstart)));
            }
            child.add_line(ContentLine::with_value(
                "TZOFFSETFROM",
                Value::UtcOffset(obs.offset_from),
            ));
            child.add_line(ContentLine::with_value(
                "TZOFFSETTO",
                Value::UtcOffset(obs.offset_to),
            ));
            if let Some(rule) = &obs.rrule {
                child.add_line(ContentLine::with_value(
                    "RRULE",
                    Value::Recur(Box::new(rule.clone())),
                ));
            }
            let rdates: Vec<DateTime> = obs
                .rdates
                .iter()
                .filter_map(|rdate| DateTime::from_naive(*rdate, DateTimeForm::Floating))
                .collect();
            if !rdates.is_empty() {
                child.add_line(ContentLine::with_value("RDATE", Value::DateTimeList(rdates)));
            }
            if let Some(name) = &obs.tzname {
                child.add_line(ContentLine::with_value("TZNAME", Value::Text(name.clone())));
            }
            component.add_component(child);
        }
        component
    }
}

fn new_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).map(|date| date.and_time(NaiveTime::MIN))
}

fn days_in_month(date: NaiveDate) -> u32 {
    (29..=31)
        .rev()
        .find(|&day| date.with_day(day).is_some())
        .unwrap_or(28)
}

/// Week of the month counted from the start and from the end.
fn week_ordinals(date: NaiveDate) -> (Option<i8>, Option<i8>) {
    let day = date.day();
    let from_start = (day - 1) / 7 + 1;
    let from_end = (days_in_month(date) - day) / 7 + 1;
    (i8::try_from(from_start).ok(), i8::try_from(from_end).ok())
}

/// An offset change found in a zone.
#[derive(Debug, Clone, Copy)]
struct Transition {
    utc: NaiveDateTime,
    from: FixedOffset,
    to: FixedOffset,
}

impl Transition {
    /// Wall-clock onset, in the offset being left.
    fn local(&self) -> NaiveDateTime {
        self.utc + TimeDelta::seconds(i64::from(self.from.local_minus_utc()))
    }

    fn kind(&self) -> ObservanceKind {
        if self.to.local_minus_utc() > self.from.local_minus_utc() {
            ObservanceKind::Daylight
        } else {
            ObservanceKind::Standard
        }
    }
}

/// Offset changes in `[start, end)`, found day by day and pinned to the
/// second.
fn transitions<Z: ZoneRules + ?Sized>(
    zone: &Z,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Transition> {
    let mut found = Vec::new();
    let mut at = start;
    let mut offset = zone.offset_from_utc(at);
    while at < end {
        let next = at + TimeDelta::days(1);
        let next_offset = zone.offset_from_utc(next);
        if next_offset != offset {
            let (mut before, mut after) = (at, next);
            while after - before > TimeDelta::seconds(1) {
                let mid = before + (after - before) / 2;
                if zone.offset_from_utc(mid) == offset {
                    before = mid;
                } else {
                    after = mid;
                }
            }
            found.push(Transition {
                utc: after,
                from: offset,
                to: zone.offset_from_utc(after),
            });
        }
        at = next;
        offset = next_offset;
    }
    found
}

/// Transitions in consecutive years on the same weekday of the same month,
/// at the same wall-clock time and between the same offsets.
#[derive(Debug)]
struct Run {
    kind: ObservanceKind,
    onsets: Vec<NaiveDateTime>,
    last: Transition,
    /// Week of the month shared by every onset, counted from the start.
    from_start: Option<i8>,
    /// Same, counted from the end.
    from_end: Option<i8>,
}

impl Run {
    fn new(transition: Transition) -> Self {
        let onset = transition.local();
        let (from_start, from_end) = week_ordinals(onset.date());
        Self {
            kind: transition.kind(),
            onsets: vec![onset],
            last: transition,
            from_start,
            from_end,
        }
    }

    fn extends(&self, next: &Transition) -> bool {
        let (last, onset) = (self.last.local(), next.local());
        let (from_start, from_end) = week_ordinals(onset.date());
        self.last.from == next.from
            && self.last.to == next.to
            && onset.year() == last.year() + 1
            && onset.month() == last.month()
            && onset.weekday() == last.weekday()
            && onset.time() == last.time()
            && ((self.from_start.is_some() && self.from_start == from_start)
                || (self.from_end.is_some() && self.from_end == from_end))
    }

    fn push(&mut self, transition: Transition) {
        let onset = transition.local();
        let (from_start, from_end) = week_ordinals(onset.date());
        if self.from_start != from_start {
            self.from_start = None;
        }
        if self.from_end != from_end {
            self.from_end = None;
        }
        self.onsets.push(onset);
        self.last = transition;
    }

    /// Yearly rule reproducing every onset; `open` leaves out UNTIL.
    fn rule(&self, open: bool) -> Option<RRule> {
        let onset = self.last.local();
        let ordinal = match (self.from_start, self.from_end) {
            (_, Some(1)) | (None, Some(_)) => self.from_end.map(|n| -n),
            (from_start, _) => from_start,
        }?;
        let by_day = WeekdayNum::nth(ordinal, Weekday::from_chrono(onset.weekday()))?;
        let rule = RRule::yearly()
            .with_by_month(vec![u8::try_from(onset.month()).ok()?])
            .with_by_day(vec![by_day]);
        if open {
            return Some(rule);
        }
        Some(rule.with_until_datetime(DateTime::from_naive(self.last.utc, DateTimeForm::Utc)?))
    }

    fn observance(&self, open: bool) -> Observance {
        let recurring = open || self.onsets.len() > 1;
        let rrule = if recurring { self.rule(open) } else { None };
        let rdates = if rrule.is_none() {
            self.onsets.iter().skip(1).copied().collect()
        } else {
            Vec::new()
        };
        Observance {
            kind: self.kind,
            offset_from: self.last.from.into(),
            offset_to: self.last.to.into(),
            dtstart: self.onsets[0],
            rrule,
            rdates,
            tzname: None,
        }
    }
}

fn fixed(offset: UtcOffset) -> FixedOffset {
    offset.to_fixed().unwrap_or_else(|| Utc.fix())
}

impl ZoneRules for VTimezone {
    fn offset_from_local(&self, local: NaiveDateTime) -> LocalResult<FixedOffset> {
        LocalResult::Single(fixed(self.offset_at(local)))
    }

    fn offset_from_utc(&self, utc: NaiveDateTime) -> FixedOffset {
        fixed(self.offset_at_utc(utc))
    }
}
