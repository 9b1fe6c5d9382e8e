//! Occurrence generation for RECUR values (RFC 5545 §3.3.10).
//!
//! Candidates are built one period at a time (a year, month, week, day,
//! hour, minute or second, stepped by INTERVAL): every day of the period
//! is tested against the BYxxx day filters, crossed with the allowed times,
//! then trimmed by BYSETPOS. All arithmetic is on wall-clock time; a zone
//! is consulted only to pin DST gaps and to compare against a UTC UNTIL.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use tracing::debug;

use super::timezone::{ZoneRules, resolve_local};
use super::{ExpansionError, ExpansionOptions};
use crate::rfc::core::{DateOrDateTime, Frequency, RRule, Weekday, WeekdayNum};

/// Years scanned past the anchor before a rule that never matches gives up.
const HORIZON_YEARS: i32 = 400;
/// Consecutive periods without candidates tolerated before giving up.
const MAX_EMPTY_PERIODS: u32 = 100_000;

impl RRule {
    /// ## Summary
    /// Lazily expands this rule from `anchor`.
    ///
    /// Occurrences keep the anchor's precision and zone form and are
    /// strictly increasing. Expansion ends at COUNT, UNTIL, the caller's
    /// `limit` or `max_instances`, whichever comes first.
    ///
    /// ## Errors
    /// Returns [`ExpansionError::Unbounded`] if neither the rule nor the
    /// options bound the expansion, and [`ExpansionError::InvalidAnchor`]
    /// if the anchor is not a real date.
    pub fn occurrences(
        &self,
        anchor: &DateOrDateTime,
        options: &ExpansionOptions,
    ) -> Result<Occurrences, ExpansionError> {
        if !self.is_bounded() && !options.is_bounded() {
            return Err(ExpansionError::Unbounded);
        }
        let start = anchor
            .to_naive()
            .ok_or_else(|| ExpansionError::InvalidAnchor(anchor.to_string()))?;
        let zone = anchor
            .tzid()
            .zip(options.lookup.as_ref())
            .and_then(|(tzid, lookup)| lookup.resolve(tzid));

        Ok(Occurrences::new(self, anchor.clone(), start, zone, options))
    }
}

/// UNTIL, in the clock it has to be compared on.
#[derive(Debug, Clone, Copy)]
enum Until {
    Local(NaiveDateTime),
    Utc(NaiveDateTime),
}

impl Until {
    fn from_rule(rule: &RRule) -> Option<Self> {
        match rule.until.as_ref()? {
            // A DATE bound includes the whole day.
            DateOrDateTime::Date(date) => date
                .to_naive()
                .and_then(|d| d.and_hms_opt(23, 59, 59))
                .map(Self::Local),
            DateOrDateTime::DateTime(dt) if dt.is_utc() => dt.to_naive().map(Self::Utc),
            DateOrDateTime::DateTime(dt) => dt.to_naive().map(Self::Local),
        }
    }
}

/// The rule with anchor-derived defaults filled in.
#[derive(Debug)]
struct Filters {
    freq: Frequency,
    interval: i64,
    wkst: chrono::Weekday,
    by_month: Vec<u32>,
    by_weekno: Vec<i64>,
    by_yearday: Vec<i64>,
    by_monthday: Vec<i64>,
    by_day: Vec<WeekdayNum>,
    by_hour: Vec<u32>,
    by_minute: Vec<u32>,
    by_second: Vec<u32>,
    by_setpos: Vec<i64>,
}

fn sorted<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = values.into_iter().collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl Filters {
    fn new(rule: &RRule, start: NaiveDateTime) -> Self {
        let mut filters = Self {
            freq: rule.freq,
            interval: i64::from(rule.interval().max(1)),
            wkst: rule.week_start().to_chrono(),
            by_month: sorted(rule.by_month.iter().copied().map(u32::from)),
            by_weekno: sorted(rule.by_weekno.iter().copied().map(i64::from)),
            by_yearday: sorted(rule.by_yearday.iter().copied().map(i64::from)),
            by_monthday: sorted(rule.by_monthday.iter().copied().map(i64::from)),
            by_day: rule.by_day.clone(),
            by_hour: sorted(rule.by_hour.iter().copied().map(u32::from)),
            by_minute: sorted(rule.by_minute.iter().copied().map(u32::from)),
            by_second: sorted(rule.by_second.iter().copied().map(u32::from)),
            by_setpos: rule.by_setpos.iter().copied().map(i64::from).collect(),
        };

        let no_day_parts = filters.by_weekno.is_empty()
            && filters.by_yearday.is_empty()
            && filters.by_monthday.is_empty()
            && filters.by_day.is_empty();
        if no_day_parts {
            match filters.freq {
                Frequency::Yearly => {
                    if filters.by_month.is_empty() {
                        filters.by_month = vec![start.month()];
                    }
                    filters.by_monthday = vec![i64::from(start.day())];
                }
                Frequency::Monthly => filters.by_monthday = vec![i64::from(start.day())],
                Frequency::Weekly => {
                    filters.by_day = vec![WeekdayNum::every(Weekday::from_chrono(start.weekday()))];
                }
                _ => {}
            }
        }

        if filters.by_hour.is_empty() && filters.freq > Frequency::Hourly {
            filters.by_hour = vec![start.hour()];
        }
        if filters.by_minute.is_empty() && filters.freq > Frequency::Minutely {
            filters.by_minute = vec![start.minute()];
        }
        if filters.by_second.is_empty() && filters.freq > Frequency::Secondly {
            filters.by_second = vec![start.second()];
        }
        filters
    }

    fn matches_date(&self, date: NaiveDate) -> bool {
        (self.by_month.is_empty() || self.by_month.contains(&date.month()))
            && (self.by_weekno.is_empty() || self.matches_weekno(date))
            && (self.by_yearday.is_empty()
                || matches_ordinal(&self.by_yearday, date.ordinal(), days_in_year(date.year())))
            && (self.by_monthday.is_empty()
                || matches_ordinal(
                    &self.by_monthday,
                    date.day(),
                    days_in_month(date.year(), date.month()),
                ))
            && (self.by_day.is_empty() || self.by_day.iter().any(|wd| self.matches_weekday(*wd, date)))
    }

    fn matches_weekno(&self, date: NaiveDate) -> bool {
        let Some((weekno, weeks)) = week_number(date, self.wkst) else {
            return false;
        };
        self.by_weekno
            .iter()
            .any(|&n| n == weekno || n == weekno - weeks - 1)
    }

    /// An ordinal BYDAY counts within the month for MONTHLY (or YEARLY with
    /// BYMONTH) and within the year for plain YEARLY; elsewhere it is ignored.
    fn matches_weekday(&self, wd: WeekdayNum, date: NaiveDate) -> bool {
        if wd.weekday.to_chrono() != date.weekday() {
            return false;
        }
        let Some(ordinal) = wd.ordinal else {
            return true;
        };
        let (index, len) = match self.freq {
            Frequency::Monthly => (date.day(), days_in_month(date.year(), date.month())),
            Frequency::Yearly if !self.by_month.is_empty() => {
                (date.day(), days_in_month(date.year(), date.month()))
            }
            Frequency::Yearly if self.by_weekno.is_empty() => {
                (date.ordinal(), days_in_year(date.year()))
            }
            _ => return true,
        };
        let (ordinal, index, len) = (i64::from(ordinal), i64::from(index), i64::from(len));
        if ordinal > 0 {
            (index - 1) / 7 + 1 == ordinal
        } else {
            (len - index) / 7 + 1 == -ordinal
        }
    }

    fn times(&self, period: NaiveDateTime) -> Vec<NaiveTime> {
        let own = |value: u32, allowed: &[u32]| {
            if allowed.is_empty() || allowed.contains(&value) {
                vec![value]
            } else {
                Vec::new()
            }
        };
        let hours = if self.freq <= Frequency::Hourly {
            own(period.hour(), &self.by_hour)
        } else {
            self.by_hour.clone()
        };
        let minutes = if self.freq <= Frequency::Minutely {
            own(period.minute(), &self.by_minute)
        } else {
            self.by_minute.clone()
        };
        let seconds = if self.freq == Frequency::Secondly {
            own(period.second(), &self.by_second)
        } else {
            self.by_second.clone()
        };

        let mut times = Vec::new();
        for &h in &hours {
            for &m in &minutes {
                for &s in &seconds {
                    // BYSECOND=60 has no wall-clock time; chrono rejects it.
                    if let Some(time) = NaiveTime::from_hms_opt(h, m, s) {
                        times.push(time);
                    }
                }
            }
        }
        times
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Positive `n` counts from the start, negative from the end.
fn matches_ordinal(list: &[i64], n: u32, len: u32) -> bool {
    let (n, len) = (i64::from(n), i64::from(len));
    list.iter().any(|&v| v == n || v == n - len - 1)
}

fn days_from(day: chrono::Weekday, wkst: chrono::Weekday) -> i64 {
    i64::from((7 + day.num_days_from_monday() - wkst.num_days_from_monday()) % 7)
}

/// Week 1 is the first week with at least four days in the year.
fn week_one_start(year: i32, wkst: chrono::Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = days_from(jan1.weekday(), wkst);
    let start = jan1 - TimeDelta::days(offset);
    Some(if offset <= 3 {
        start
    } else {
        start + TimeDelta::days(7)
    })
}

/// (week number, weeks in that week-numbering year).
fn week_number(date: NaiveDate, wkst: chrono::Weekday) -> Option<(i64, i64)> {
    let week_start = date - TimeDelta::days(days_from(date.weekday(), wkst));
    let mut year = date.year();
    if week_start >= week_one_start(year + 1, wkst)? {
        year += 1;
    } else if week_start < week_one_start(year, wkst)? {
        year -= 1;
    }
    let first = week_one_start(year, wkst)?;
    let next = week_one_start(year + 1, wkst)?;
    Some((
        (week_start - first).num_days() / 7 + 1,
        (next - first).num_days() / 7,
    ))
}

fn select_positions(candidates: &[NaiveDateTime], positions: &[i64]) -> Vec<NaiveDateTime> {
    let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
    let mut chosen: Vec<NaiveDateTime> = positions
        .iter()
        .filter_map(|&pos| {
            let index = if pos > 0 { pos - 1 } else { len + pos };
            usize::try_from(index)
                .ok()
                .and_then(|i| candidates.get(i))
                .copied()
        })
        .collect();
    chosen.sort_unstable();
    chosen.dedup();
    chosen
}

/// Lazy, strictly increasing occurrences of a recurrence rule.
#[derive(Debug)]
pub struct Occurrences {
    filters: Filters,
    anchor: DateOrDateTime,
    start: NaiveDateTime,
    zone: Option<Arc<dyn ZoneRules>>,
    until: Option<Until>,
    limit: Option<NaiveDateTime>,
    remaining: Option<usize>,
    /// Start of the next period to generate; `None` once exhausted.
    period: Option<NaiveDateTime>,
    pending: VecDeque<NaiveDateTime>,
    last: Option<NaiveDateTime>,
    horizon: i32,
    empty_periods: u32,
}

impl Occurrences {
    pub(super) fn new(
        rule: &RRule,
        anchor: DateOrDateTime,
        start: NaiveDateTime,
        zone: Option<Arc<dyn ZoneRules>>,
        options: &ExpansionOptions,
    ) -> Self {
        let filters = Filters::new(rule, start);
        let count = rule.count.and_then(|c| usize::try_from(c).ok());
        let remaining = match (count, options.max_instances) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let period = first_period(&filters, start);
        debug!(rule = %rule, anchor = %anchor, "expanding recurrence");

        Self {
            filters,
            anchor,
            start,
            zone,
            until: Until::from_rule(rule),
            limit: options.limit,
            remaining,
            period,
            pending: VecDeque::new(),
            last: None,
            horizon: start.year().saturating_add(HORIZON_YEARS),
            empty_periods: 0,
        }
    }

    fn finish(&mut self) {
        self.period = None;
        self.pending.clear();
        self.remaining = Some(0);
    }

    fn past_until(&self, local: NaiveDateTime) -> bool {
        match self.until {
            None => false,
            Some(Until::Local(until)) => local > until,
            Some(Until::Utc(until)) => match &self.zone {
                Some(zone) => zone.to_utc(local) > until,
                None => local > until,
            },
        }
    }

    /// Generates periods until one yields candidates or the rule is spent.
    fn fill(&mut self) {
        while self.pending.is_empty() {
            let Some(period) = self.period else {
                return;
            };
            if period.year() > self.horizon || self.empty_periods > MAX_EMPTY_PERIODS {
                debug!(%period, "recurrence stopped matching; giving up");
                self.period = None;
                return;
            }

            let dates = self.dates(period);
            let mut candidates = Vec::new();
            if !dates.is_empty() {
                let times = self.filters.times(period);
                for date in &dates {
                    candidates.extend(times.iter().map(|time| date.and_time(*time)));
                }
            }
            if !self.filters.by_setpos.is_empty() {
                candidates = select_positions(&candidates, &self.filters.by_setpos);
            }

            self.period = self.advance(period, dates.is_empty());
            if candidates.is_empty() {
                self.empty_periods += 1;
            } else {
                self.empty_periods = 0;
            }
            self.pending.extend(candidates);
        }
    }

    fn dates(&self, period: NaiveDateTime) -> Vec<NaiveDate> {
        let first = period.date();
        let days = first.iter_days();
        let in_period: Vec<NaiveDate> = match self.filters.freq {
            Frequency::Yearly => days.take_while(|d| d.year() == first.year()).collect(),
            Frequency::Monthly => days.take_while(|d| d.month() == first.month()).collect(),
            Frequency::Weekly => days.take(7).collect(),
            _ => vec![first],
        };
        in_period
            .into_iter()
            .filter(|d| self.filters.matches_date(*d))
            .collect()
    }

    fn advance(&self, period: NaiveDateTime, day_rejected: bool) -> Option<NaiveDateTime> {
        let f = &self.filters;
        let interval = f.interval;
        match f.freq {
            Frequency::Yearly => {
                let year = period.year().checked_add(i32::try_from(interval).ok()?)?;
                NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.and_time(period.time()))
            }
            Frequency::Monthly => {
                let months = i64::from(period.month0()) + interval;
                let year = period.year().checked_add(i32::try_from(months / 12).ok()?)?;
                let month = u32::try_from(months % 12).ok()? + 1;
                NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(period.time()))
            }
            Frequency::Weekly => period.checked_add_signed(TimeDelta::weeks(interval)),
            Frequency::Daily => period.checked_add_signed(TimeDelta::days(interval)),
            Frequency::Hourly | Frequency::Minutely | Frequency::Secondly => {
                let unit = match f.freq {
                    Frequency::Hourly => 3600,
                    Frequency::Minutely => 60,
                    _ => 1,
                };
                let step = interval * unit;
                // Skip straight past a day, hour or minute that cannot match.
                let boundary = if day_rejected {
                    Some(86_400)
                } else if f.freq < Frequency::Hourly
                    && !f.by_hour.is_empty()
                    && !f.by_hour.contains(&period.hour())
                {
                    Some(3600)
                } else if f.freq == Frequency::Secondly
                    && !f.by_minute.is_empty()
                    && !f.by_minute.contains(&period.minute())
                {
                    Some(60)
                } else {
                    None
                };
                let steps = boundary.map_or(1, |size| {
                    let elapsed = i64::from(period.num_seconds_from_midnight()) % size;
                    (size - elapsed + step - 1) / step
                });
                period.checked_add_signed(TimeDelta::seconds(steps.max(1) * step))
            }
        }
    }
}

fn first_period(filters: &Filters, start: NaiveDateTime) -> Option<NaiveDateTime> {
    let date = start.date();
    match filters.freq {
        Frequency::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).map(|d| d.and_time(start.time())),
        Frequency::Monthly => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1).map(|d| d.and_time(start.time()))
        }
        Frequency::Weekly => {
            Some(start - TimeDelta::days(days_from(date.weekday(), filters.wkst)))
        }
        Frequency::Daily | Frequency::Secondly => Some(start),
        Frequency::Hourly => date.and_hms_opt(start.hour(), 0, 0),
        Frequency::Minutely => date.and_hms_opt(start.hour(), start.minute(), 0),
    }
}

impl Iterator for Occurrences {
    type Item = DateOrDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            if self.pending.is_empty() {
                self.fill();
            }
            let candidate = self.pending.pop_front()?;
            if candidate < self.start {
                continue;
            }

            let local = match &self.zone {
                Some(zone) => resolve_local(zone.as_ref(), candidate).0,
                None => candidate,
            };
            if self.past_until(local) || self.limit.is_some_and(|limit| local > limit) {
                self.finish();
                return None;
            }

            let Some(value) = self.anchor.with_naive(local) else {
                self.finish();
                return None;
            };
            let key = value.to_naive()?;
            if self.last.is_some_and(|last| key <= last) {
                continue;
            }
            self.last = Some(key);
            if let Some(remaining) = &mut self.remaining {
                *remaining -= 1;
            }
            return Some(value);
        }
    }
}

impl FusedIterator for Occurrences {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{Date, DateTime};
    use crate::rfc::ical::expand::TimeZoneResolver;
    use crate::rfc::parse::values::decode_recur;

    fn rule(text: &str) -> RRule {
        decode_recur(text).unwrap()
    }

    fn utc(y: u16, m: u8, d: u8, h: u8, min: u8) -> DateOrDateTime {
        DateOrDateTime::DateTime(DateTime::utc(Date::new(y, m, d), h, min, 0))
    }

    fn render(rule_text: &str, anchor: &DateOrDateTime, options: &ExpansionOptions) -> Vec<String> {
        rule(rule_text)
            .occurrences(anchor, options)
            .unwrap()
            .map(|o| o.to_string())
            .collect()
    }

    fn first(rule_text: &str, anchor: &DateOrDateTime, n: usize) -> Vec<String> {
        render(
            rule_text,
            anchor,
            &ExpansionOptions::default().with_max_instances(n),
        )
    }

    #[test]
    fn daily_count_keeps_date_precision() {
        let anchor = DateOrDateTime::Date(Date::new(2024, 1, 1));
        assert_eq!(
            render("FREQ=DAILY;COUNT=3", &anchor, &ExpansionOptions::default()),
            ["20240101", "20240102", "20240103"]
        );
    }

    #[test]
    fn monthday_31_skips_short_months() {
        let anchor = DateOrDateTime::Date(Date::new(2024, 1, 31));
        assert_eq!(
            render(
                "FREQ=MONTHLY;BYMONTHDAY=31;COUNT=7",
                &anchor,
                &ExpansionOptions::default()
            ),
            ["20240131", "20240331", "20240531", "20240731", "20240831", "20241031", "20241231"]
        );
    }

    #[test]
    fn leap_day_only_in_leap_years() {
        let anchor = DateOrDateTime::Date(Date::new(2024, 2, 29));
        assert_eq!(
            first("FREQ=YEARLY", &anchor, 3),
            ["20240229", "20280229", "20320229"]
        );
    }

    #[test]
    fn negative_monthday_and_last_weekday() {
        let anchor = DateOrDateTime::Date(Date::new(2024, 1, 31));
        assert_eq!(
            first("FREQ=MONTHLY;BYMONTHDAY=-1", &anchor, 3),
            ["20240131", "20240229", "20240331"]
        );

        let anchor = utc(2024, 1, 26, 17, 0);
        assert_eq!(
            first("FREQ=MONTHLY;BYDAY=-1FR", &anchor, 3),
            ["20240126T170000Z", "20240223T170000Z", "20240329T170000Z"]
        );
    }

    #[test]
    fn weekly_byday_expands_within_week() {
        // 2024-01-01 is a Monday.
        let anchor = utc(2024, 1, 1, 9, 0);
        assert_eq!(
            first("FREQ=WEEKLY;BYDAY=MO,WE,FR", &anchor, 4),
            [
                "20240101T090000Z",
                "20240103T090000Z",
                "20240105T090000Z",
                "20240108T090000Z"
            ]
        );
        assert_eq!(
            first("FREQ=WEEKLY;INTERVAL=2", &anchor, 2),
            ["20240101T090000Z", "20240115T090000Z"]
        );
    }

    #[test]
    fn setpos_picks_last_workday() {
        let anchor = utc(2024, 1, 31, 12, 0);
        assert_eq!(
            first("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1", &anchor, 3),
            ["20240131T120000Z", "20240229T120000Z", "20240329T120000Z"]
        );
    }

    #[test]
    fn weekno_counts_from_wkst() {
        let anchor = DateOrDateTime::DateTime(DateTime::floating(Date::new(1997, 5, 12), 9, 0, 0));
        assert_eq!(
            first("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", &anchor, 3),
            ["19970512T090000", "19980511T090000", "19990517T090000"]
        );
    }

    #[test]
    fn minutely_skips_hours_outside_byhour() {
        let anchor = DateOrDateTime::DateTime(DateTime::floating(Date::new(1997, 9, 2), 16, 20, 0));
        assert_eq!(
            first("FREQ=MINUTELY;INTERVAL=20;BYHOUR=9,16", &anchor, 4),
            [
                "19970902T162000",
                "19970902T164000",
                "19970903T090000",
                "19970903T092000"
            ]
        );
    }

    #[test]
    fn until_date_is_inclusive() {
        let anchor = utc(2024, 1, 1, 10, 0);
        assert_eq!(
            render("FREQ=DAILY;UNTIL=20240103", &anchor, &ExpansionOptions::default()).len(),
            3
        );
    }

    #[test]
    fn unbounded_rule_needs_a_bound() {
        let anchor = utc(2024, 1, 1, 10, 0);
        assert!(matches!(
            rule("FREQ=DAILY").occurrences(&anchor, &ExpansionOptions::default()),
            Err(ExpansionError::Unbounded)
        ));

        let limit = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            render("FREQ=DAILY", &anchor, &ExpansionOptions::until(limit)).len(),
            5
        );
    }

    #[test]
    fn impossible_rule_terminates() {
        let anchor = DateOrDateTime::Date(Date::new(2024, 1, 1));
        assert!(first("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30", &anchor, 1).is_empty());
    }

    #[test]
    fn dst_gap_moves_forward() {
        let anchor = DateOrDateTime::DateTime(DateTime::zoned(
            Date::new(2024, 3, 9),
            2,
            30,
            0,
            "America/New_York",
        ));
        let options = ExpansionOptions::default()
            .with_max_instances(3)
            .with_lookup(Arc::new(TimeZoneResolver::new()));
        let times: Vec<_> = rule("FREQ=DAILY")
            .occurrences(&anchor, &options)
            .unwrap()
            .map(|o| o.to_string())
            .collect();
        assert_eq!(times, ["20240309T023000", "20240310T033000", "20240311T023000"]);
    }

    #[test]
    fn utc_until_compared_in_utc() {
        let anchor = DateOrDateTime::DateTime(DateTime::zoned(
            Date::new(2024, 1, 1),
            9,
            0,
            0,
            "America/New_York",
        ));
        let options =
            ExpansionOptions::default().with_lookup(Arc::new(TimeZoneResolver::new()));
        // 09:00 EST is 14:00 UTC.
        let count = |until: &str| {
            rule(&format!("FREQ=DAILY;UNTIL={until}"))
                .occurrences(&anchor, &options)
                .unwrap()
                .count()
        };
        assert_eq!(count("20240103T140000Z"), 3);
        assert_eq!(count("20240103T135959Z"), 2);
    }
}
