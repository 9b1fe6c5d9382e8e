//! Recurrence sets: DTSTART, RRULE and RDATE minus EXRULE and EXDATE
//! (RFC 5545 §3.8.5).

use std::collections::{BTreeSet, VecDeque};
use std::iter::{FusedIterator, Peekable};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use super::recur::Occurrences;
use super::timezone::{TimezoneLookup, ZoneRules};
use super::{ExpansionError, ExpansionOptions};
use crate::rfc::core::{Component, ContentLine, DateOrDateTime, RRule, Value};
use crate::rfc::parse::values::{decode_date_or_datetime, decode_period, decode_recur};

/// The inputs of a recurring component.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceSet {
    pub start: DateOrDateTime,
    pub rules: Vec<RRule>,
    pub rdates: Vec<DateOrDateTime>,
    pub exrules: Vec<RRule>,
    pub exdates: Vec<DateOrDateTime>,
}

fn invalid(line: &ContentLine) -> ExpansionError {
    ExpansionError::InvalidValue {
        property: line.name().to_string(),
        value: line.encoded_value().into_owned(),
    }
}

/// Decoded dates of a DTSTART, RDATE or EXDATE line, falling back to its raw text.
fn date_values(line: &ContentLine) -> Result<Vec<DateOrDateTime>, ExpansionError> {
    if let Some(dates) = line.value().map(Value::as_date_list)
        && !dates.is_empty()
    {
        return Ok(dates);
    }
    let raw = line.encoded_value();
    let tzid = line.param_value("TZID");
    raw.split(',')
        .map(|part| {
            if part.contains('/') {
                decode_period(part, tzid).map(|p| DateOrDateTime::DateTime(p.start().clone()))
            } else {
                decode_date_or_datetime(part, tzid)
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_e| invalid(line))
}

fn rule_value(line: &ContentLine) -> Result<RRule, ExpansionError> {
    if let Some(rule) = line.value().and_then(Value::as_recur) {
        return Ok(rule.clone());
    }
    decode_recur(&line.encoded_value()).map_err(|_e| invalid(line))
}

impl RecurrenceSet {
    #[must_use]
    pub const fn new(start: DateOrDateTime) -> Self {
        Self {
            start,
            rules: Vec::new(),
            rdates: Vec::new(),
            exrules: Vec::new(),
            exdates: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rrule(mut self, rule: RRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_rdate(mut self, date: impl Into<DateOrDateTime>) -> Self {
        self.rdates.push(date.into());
        self
    }

    #[must_use]
    pub fn with_exrule(mut self, rule: RRule) -> Self {
        self.exrules.push(rule);
        self
    }

    #[must_use]
    pub fn with_exdate(mut self, date: impl Into<DateOrDateTime>) -> Self {
        self.exdates.push(date.into());
        self
    }

    /// ## Summary
    /// Collects DTSTART, RRULE, RDATE, EXRULE and EXDATE from a component.
    /// Lines may be decoded or still raw.
    ///
    /// ## Errors
    /// Returns [`ExpansionError::MissingStart`] without a DTSTART and
    /// [`ExpansionError::InvalidValue`] for any unreadable line.
    pub fn from_component(component: &Component) -> Result<Self, ExpansionError> {
        let dtstart = component
            .line("DTSTART")
            .ok_or_else(|| ExpansionError::MissingStart(component.name().to_string()))?;
        let start = date_values(dtstart)?
            .into_iter()
            .next()
            .ok_or_else(|| invalid(dtstart))?;

        let mut set = Self::new(start);
        for line in component.lines() {
            match line.name() {
                "RRULE" => set.rules.push(rule_value(line)?),
                "EXRULE" => set.exrules.push(rule_value(line)?),
                "RDATE" => set.rdates.extend(date_values(line)?),
                "EXDATE" => set.exdates.extend(date_values(line)?),
                _ => {}
            }
        }
        Ok(set)
    }

    /// Whether the set ends on its own.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.rules.iter().all(RRule::is_bounded)
    }

    /// ## Summary
    /// Lazily merges the set into strictly increasing occurrences in the
    /// form of DTSTART. DTSTART itself is always the first occurrence unless
    /// excluded.
    ///
    /// RDATE and EXDATE values are aligned to DTSTART before comparison: a
    /// DATE against a DATE-TIME start takes the start's time of day, and a
    /// UTC or differently zoned value is converted when zones resolve.
    ///
    /// ## Errors
    /// Returns [`ExpansionError::Unbounded`] if a rule is unbounded and the
    /// options set no bound, or [`ExpansionError::InvalidAnchor`] for an
    /// impossible DTSTART.
    pub fn occurrences(&self, options: &ExpansionOptions) -> Result<SetOccurrences, ExpansionError> {
        if !self.is_bounded() && !options.is_bounded() {
            return Err(ExpansionError::Unbounded);
        }
        let start = self
            .start
            .to_naive()
            .ok_or_else(|| ExpansionError::InvalidAnchor(self.start.to_string()))?;

        let lookup = options.lookup.as_deref();
        let zone = self
            .start
            .tzid()
            .zip(lookup)
            .and_then(|(tzid, lookup)| lookup.resolve(tzid));
        let aligner = Aligner {
            start: &self.start,
            time: start.time(),
            zone: zone.as_deref(),
            lookup,
        };

        // Each rule stream is bounded by the set, not by itself.
        let per_rule = ExpansionOptions {
            limit: options.limit,
            max_instances: None,
            lookup: options.lookup.clone(),
        };
        let stream = |rule: &RRule| {
            Occurrences::new(rule, self.start.clone(), start, zone.clone(), &per_rule).peekable()
        };

        let mut rdates: Vec<NaiveDateTime> = self
            .rdates
            .iter()
            .filter_map(|d| aligner.key(d))
            .chain([start])
            .collect();
        rdates.sort_unstable();
        rdates.dedup();

        debug!(
            start = %self.start,
            rules = self.rules.len(),
            rdates = self.rdates.len(),
            exrules = self.exrules.len(),
            exdates = self.exdates.len(),
            "expanding recurrence set"
        );

        Ok(SetOccurrences {
            start: self.start.clone(),
            rules: self.rules.iter().map(&stream).collect(),
            rdates: rdates.into(),
            exrules: self.exrules.iter().map(&stream).collect(),
            exdates: self.exdates.iter().filter_map(|d| aligner.key(d)).collect(),
            limit: options.limit,
            remaining: options.max_instances,
            last: None,
        })
    }
}

/// Maps date values onto DTSTART's wall clock.
struct Aligner<'a> {
    start: &'a DateOrDateTime,
    time: NaiveTime,
    zone: Option<&'a dyn ZoneRules>,
    lookup: Option<&'a dyn TimezoneLookup>,
}

impl Aligner<'_> {
    fn key(&self, value: &DateOrDateTime) -> Option<NaiveDateTime> {
        match (value, self.start) {
            (_, DateOrDateTime::Date(_)) => value.date().to_naive()?.and_hms_opt(0, 0, 0),
            (DateOrDateTime::Date(date), DateOrDateTime::DateTime(_)) => {
                date.to_naive().map(|d| d.and_time(self.time))
            }
            (DateOrDateTime::DateTime(dt), DateOrDateTime::DateTime(start)) => {
                let naive = dt.to_naive()?;
                if dt.form == start.form {
                    return Some(naive);
                }
                let utc = if dt.is_utc() {
                    Some(naive)
                } else {
                    dt.tzid()
                        .and_then(|tzid| self.lookup?.resolve(tzid))
                        .map(|zone| zone.to_utc(naive))
                };
                Some(match (utc, self.zone) {
                    (Some(utc), Some(zone)) => zone.from_utc(utc),
                    (Some(utc), None) if start.is_utc() => utc,
                    _ => naive,
                })
            }
        }
    }
}

/// Lazy occurrences of a [`RecurrenceSet`].
#[derive(Debug)]
pub struct SetOccurrences {
    start: DateOrDateTime,
    rules: Vec<Peekable<Occurrences>>,
    rdates: VecDeque<NaiveDateTime>,
    exrules: Vec<Peekable<Occurrences>>,
    exdates: BTreeSet<NaiveDateTime>,
    limit: Option<NaiveDateTime>,
    remaining: Option<usize>,
    last: Option<NaiveDateTime>,
}

fn peek_key(stream: &mut Peekable<Occurrences>) -> Option<NaiveDateTime> {
    stream.peek().and_then(DateOrDateTime::to_naive)
}

impl SetOccurrences {
    fn earliest(&mut self) -> Option<NaiveDateTime> {
        let from_rules = self.rules.iter_mut().filter_map(peek_key).min();
        match (self.rdates.front().copied(), from_rules) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drops every source entry at or before `key`.
    fn consume_through(&mut self, key: NaiveDateTime) {
        while self.rdates.front().is_some_and(|d| *d <= key) {
            self.rdates.pop_front();
        }
        for rule in &mut self.rules {
            while peek_key(rule).is_some_and(|k| k <= key) {
                rule.next();
            }
        }
    }

    fn is_excluded(&mut self, key: NaiveDateTime) -> bool {
        if self.exdates.contains(&key) {
            return true;
        }
        let mut excluded = false;
        for rule in &mut self.exrules {
            while peek_key(rule).is_some_and(|k| k < key) {
                rule.next();
            }
            excluded |= peek_key(rule) == Some(key);
        }
        excluded
    }
}

impl Iterator for SetOccurrences {
    type Item = DateOrDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            let key = self.earliest()?;
            self.consume_through(key);
            if self.last.is_some_and(|last| key <= last) {
                continue;
            }
            if self.limit.is_some_and(|limit| key > limit) {
                self.remaining = Some(0);
                return None;
            }
            self.last = Some(key);
            if self.is_excluded(key) {
                continue;
            }

            let Some(value) = self.start.with_naive(key) else {
                self.remaining = Some(0);
                return None;
            };
            if let Some(remaining) = &mut self.remaining {
                *remaining -= 1;
            }
            return Some(value);
        }
    }
}

impl FusedIterator for SetOccurrences {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rfc::ical::expand::TimeZoneResolver;

    fn event(lines: &str) -> Component {
        let text = format!("BEGIN:VEVENT\r\nUID:set@example.com\r\n{lines}END:VEVENT\r\n");
        crate::parse(&text).unwrap()
    }

    fn expand(component: &Component, options: &ExpansionOptions) -> Vec<String> {
        RecurrenceSet::from_component(component)
            .unwrap()
            .occurrences(options)
            .unwrap()
            .map(|o| o.to_string())
            .collect()
    }

    #[test]
    fn rdate_and_exdate_merge() {
        let vevent = event(
            "DTSTART:20240101T090000Z\r\n\
             RRULE:FREQ=DAILY;COUNT=3\r\n\
             RDATE:20240110T090000Z,20240102T090000Z\r\n\
             EXDATE:20240102T090000Z\r\n",
        );
        assert_eq!(
            expand(&vevent, &ExpansionOptions::default()),
            ["20240101T090000Z", "20240103T090000Z", "20240110T090000Z"]
        );
    }

    #[test]
    fn dtstart_kept_when_rule_misses_it() {
        // 2024-01-02 is a Tuesday.
        let vevent = event(
            "DTSTART;VALUE=DATE:20240102\r\n\
             RRULE:FREQ=WEEKLY;BYDAY=MO;COUNT=2\r\n",
        );
        assert_eq!(
            expand(&vevent, &ExpansionOptions::default()),
            ["20240102", "20240108", "20240115"]
        );
    }

    #[test]
    fn date_exdate_takes_start_time() {
        let vevent = event(
            "DTSTART:20240101T090000Z\r\n\
             RRULE:FREQ=DAILY;COUNT=3\r\n\
             EXDATE;VALUE=DATE:20240103\r\n",
        );
        assert_eq!(
            expand(&vevent, &ExpansionOptions::default()),
            ["20240101T090000Z", "20240102T090000Z"]
        );
    }

    #[test]
    fn utc_exdate_against_zoned_start() {
        let vevent = event(
            "DTSTART;TZID=Europe/Berlin:20240101T100000\r\n\
             RRULE:FREQ=DAILY;COUNT=3\r\n\
             EXDATE:20240102T090000Z\r\n",
        );
        let options =
            ExpansionOptions::default().with_lookup(Arc::new(TimeZoneResolver::new()));
        assert_eq!(
            expand(&vevent, &options),
            ["20240101T100000", "20240103T100000"]
        );
    }

    #[test]
    fn exrule_removes_matches() {
        let set = RecurrenceSet::new(DateOrDateTime::Date(crate::rfc::core::Date::new(2024, 1, 1)))
            .with_rrule(RRule::daily().with_count(7))
            .with_exrule(RRule::weekly().with_count(2));
        let dates: Vec<_> = set
            .occurrences(&ExpansionOptions::default())
            .unwrap()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            dates,
            ["20240102", "20240103", "20240104", "20240105", "20240106", "20240107"]
        );
    }

    #[test]
    fn bounds_and_errors() {
        let vevent = event("DTSTART:20240101T090000Z\r\nRRULE:FREQ=WEEKLY\r\n");
        let set = RecurrenceSet::from_component(&vevent).unwrap();
        assert!(matches!(
            set.occurrences(&ExpansionOptions::default()),
            Err(ExpansionError::Unbounded)
        ));
        assert_eq!(
            set.occurrences(&ExpansionOptions::default().with_max_instances(4))
                .unwrap()
                .count(),
            4
        );

        let missing = event("SUMMARY:no start\r\n");
        assert!(matches!(
            RecurrenceSet::from_component(&missing),
            Err(ExpansionError::MissingStart(name)) if name == "VEVENT"
        ));
    }
}
