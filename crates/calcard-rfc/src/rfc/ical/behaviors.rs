//! Built-in iCalendar behaviors (RFC 5545, RFC 7953 availability).

use calcard_core::constants::{
    DEFAULT_PRODID, ICALENDAR_VERSION, PRODUCT_NAME, TIMEZONE_FIRST_YEAR, TIMEZONE_LAST_YEAR,
};
use chrono::Utc;
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

use super::expand::{TimeZoneResolver, VTimezone};

use crate::rfc::behavior::transcoder::{
    CAL_ADDRESS, DATE_OR_DATE_TIME, DURATION, INTEGER, MULTI_DATE, OPAQUE, PERIOD_LIST, RECUR,
    STRUCTURED, TEXT, TEXT_LIST, TRIGGER, URI, UTC_DATE_TIME, UTC_OFFSET,
};
use crate::rfc::behavior::{Behavior, BehaviorRegistry, ValidationError, ValueTranscoder};
use crate::rfc::core::parameter::names;
use crate::rfc::core::{Component, ContentLine, DateTime, DateTimeForm, Value};

/// Properties and the transcoder each decodes with.
static PROPERTIES: &[(&str, &dyn ValueTranscoder)] = &[
    // Always meant as UTC.
    ("DTSTAMP", UTC_DATE_TIME),
    ("CREATED", UTC_DATE_TIME),
    ("LAST-MODIFIED", UTC_DATE_TIME),
    ("COMPLETED", UTC_DATE_TIME),
    ("DTSTART", DATE_OR_DATE_TIME),
    ("DTEND", DATE_OR_DATE_TIME),
    ("DUE", DATE_OR_DATE_TIME),
    ("RECURRENCE-ID", DATE_OR_DATE_TIME),
    ("RDATE", MULTI_DATE),
    ("EXDATE", MULTI_DATE),
    ("DURATION", DURATION),
    ("TRIGGER", TRIGGER),
    ("FREEBUSY", PERIOD_LIST),
    ("RRULE", RECUR),
    ("EXRULE", RECUR),
    ("SUMMARY", TEXT),
    ("DESCRIPTION", TEXT),
    ("LOCATION", TEXT),
    ("COMMENT", TEXT),
    ("CLASS", TEXT),
    ("STATUS", TEXT),
    ("TRANSP", TEXT),
    ("UID", TEXT),
    ("PRODID", TEXT),
    ("CALSCALE", TEXT),
    ("METHOD", TEXT),
    ("ACTION", TEXT),
    ("TZNAME", TEXT),
    ("CONTACT", TEXT),
    ("RELATED-TO", TEXT),
    ("BUSYTYPE", TEXT),
    ("CATEGORIES", TEXT_LIST),
    ("RESOURCES", TEXT_LIST),
    ("REQUEST-STATUS", STRUCTURED),
    ("PRIORITY", INTEGER),
    ("SEQUENCE", INTEGER),
    ("PERCENT-COMPLETE", INTEGER),
    ("REPEAT", INTEGER),
    ("TZOFFSETFROM", UTC_OFFSET),
    ("TZOFFSETTO", UTC_OFFSET),
    ("URL", URI),
    ("TZURL", URI),
    ("ATTACH", URI),
    ("ATTENDEE", CAL_ADDRESS),
    ("ORGANIZER", CAL_ADDRESS),
    ("TZID", OPAQUE),
    ("GEO", OPAQUE),
    ("VERSION", OPAQUE),
];

/// Properties that may appear at most once in any component.
const SINGLETONS: &[&str] = &[
    "VERSION",
    "PRODID",
    "UID",
    "DTSTAMP",
    "DTSTART",
    "DTEND",
    "DUE",
    "RECURRENCE-ID",
    "TZID",
    "TZOFFSETFROM",
    "TZOFFSETTO",
    "CREATED",
    "LAST-MODIFIED",
    "SEQUENCE",
    "PRIORITY",
];

/// Registers every iCalendar component and property behavior.
#[expect(clippy::too_many_lines, reason = "one declarative table per component")]
pub fn register(registry: &mut BehaviorRegistry) {
    for &(name, transcoder) in PROPERTIES {
        let mut behavior = Behavior::property(name, transcoder);
        if SINGLETONS.contains(&name) {
            behavior = behavior.singleton();
        }
        registry.register(behavior);
    }

    registry.register(
        Behavior::component("VCALENDAR")
            .with_sort_first(&["VERSION", "CALSCALE", "METHOD", "PRODID", "VTIMEZONE"])
            .with_child("PRODID", 1, Some(1))
            .with_optional_once(&["VERSION", "CALSCALE", "METHOD"])
            .with_repeatable(&[
                "VEVENT",
                "VTODO",
                "VJOURNAL",
                "VFREEBUSY",
                "VTIMEZONE",
                "VAVAILABILITY",
            ])
            .with_implicit_lines(calendar_implicit_lines)
            .with_implicit_components(calendar_timezones),
    );

    registry.register(
        Behavior::component("VEVENT")
            .with_sort_first(&["UID", "RECURRENCE-ID", "DTSTART", "DURATION", "DTEND"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&[
                "CLASS",
                "CREATED",
                "DESCRIPTION",
                "DTSTART",
                "GEO",
                "LAST-MODIFIED",
                "LOCATION",
                "ORGANIZER",
                "PRIORITY",
                "SEQUENCE",
                "STATUS",
                "SUMMARY",
                "TRANSP",
                "URL",
                "RECURRENCE-ID",
                "DTEND",
                "DURATION",
            ])
            .with_repeatable(&[
                "ATTACH",
                "ATTENDEE",
                "CATEGORIES",
                "COMMENT",
                "CONTACT",
                "EXDATE",
                "EXRULE",
                "REQUEST-STATUS",
                "RELATED-TO",
                "RESOURCES",
                "RDATE",
                "RRULE",
                "VALARM",
            ])
            .with_check(end_or_duration)
            .with_implicit_lines(stamped_implicit_lines),
    );

    registry.register(
        Behavior::component("VTODO")
            .with_sort_first(&["UID", "RECURRENCE-ID", "DTSTART", "DURATION", "DUE"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&[
                "CLASS",
                "COMPLETED",
                "CREATED",
                "DESCRIPTION",
                "DTSTART",
                "GEO",
                "LAST-MODIFIED",
                "LOCATION",
                "ORGANIZER",
                "PERCENT-COMPLETE",
                "PRIORITY",
                "RECURRENCE-ID",
                "SEQUENCE",
                "STATUS",
                "SUMMARY",
                "URL",
                "DUE",
                "DURATION",
            ])
            .with_repeatable(&[
                "ATTACH",
                "ATTENDEE",
                "CATEGORIES",
                "COMMENT",
                "CONTACT",
                "EXDATE",
                "EXRULE",
                "REQUEST-STATUS",
                "RELATED-TO",
                "RESOURCES",
                "RDATE",
                "RRULE",
                "VALARM",
            ])
            .with_check(due_or_duration)
            .with_implicit_lines(stamped_implicit_lines),
    );

    registry.register(
        Behavior::component("VJOURNAL")
            .with_sort_first(&["UID", "RECURRENCE-ID", "DTSTART"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&[
                "CLASS",
                "CREATED",
                "DTSTART",
                "LAST-MODIFIED",
                "ORGANIZER",
                "RECURRENCE-ID",
                "SEQUENCE",
                "STATUS",
                "SUMMARY",
                "URL",
            ])
            .with_repeatable(&[
                "ATTACH",
                "ATTENDEE",
                "CATEGORIES",
                "COMMENT",
                "CONTACT",
                "DESCRIPTION",
                "EXDATE",
                "RELATED-TO",
                "RDATE",
                "REQUEST-STATUS",
                "RRULE",
            ])
            .with_implicit_lines(stamped_implicit_lines),
    );

    registry.register(
        Behavior::component("VFREEBUSY")
            .with_sort_first(&["UID", "DTSTART", "DURATION", "DTEND"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&["CONTACT", "DTSTART", "DTEND", "DURATION", "ORGANIZER", "URL"])
            .with_repeatable(&["ATTENDEE", "COMMENT", "FREEBUSY", "REQUEST-STATUS"]),
    );

    registry.register(
        Behavior::component("VALARM")
            .with_sort_first(&["ACTION", "TRIGGER"])
            .with_child("ACTION", 1, Some(1))
            .with_child("TRIGGER", 1, Some(1))
            .with_optional_once(&["DURATION", "REPEAT", "DESCRIPTION", "SUMMARY"])
            .with_repeatable(&["ATTACH", "ATTENDEE"])
            .with_implicit_lines(alarm_implicit_lines),
    );

    registry.register(
        Behavior::component("VTIMEZONE")
            .with_sort_first(&["TZID", "LAST-MODIFIED", "TZURL", "STANDARD", "DAYLIGHT"])
            .with_child("TZID", 1, Some(1))
            .with_optional_once(&["LAST-MODIFIED", "TZURL"])
            .with_repeatable(&["STANDARD", "DAYLIGHT"])
            .with_check(has_observance),
    );

    for observance in ["STANDARD", "DAYLIGHT"] {
        registry.register(
            Behavior::component(observance)
                .with_sort_first(&["DTSTART", "TZOFFSETFROM", "TZOFFSETTO"])
                .with_child("DTSTART", 1, Some(1))
                .with_child("TZOFFSETFROM", 1, Some(1))
                .with_child("TZOFFSETTO", 1, Some(1))
                .with_optional_once(&["RRULE"])
                .with_repeatable(&["COMMENT", "RDATE", "TZNAME"]),
        );
    }

    registry.register(
        Behavior::component("VAVAILABILITY")
            .with_sort_first(&["UID", "DTSTART", "DURATION", "DTEND"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&[
                "BUSYTYPE",
                "CLASS",
                "CREATED",
                "DESCRIPTION",
                "DTSTART",
                "LAST-MODIFIED",
                "LOCATION",
                "ORGANIZER",
                "PRIORITY",
                "SEQUENCE",
                "SUMMARY",
                "URL",
                "DTEND",
                "DURATION",
            ])
            .with_repeatable(&["CATEGORIES", "COMMENT", "CONTACT", "AVAILABLE"])
            .with_check(end_or_duration),
    );

    registry.register(
        Behavior::component("AVAILABLE")
            .with_sort_first(&["UID", "DTSTART", "DURATION", "DTEND"])
            .with_child("DTSTAMP", 1, Some(1))
            .with_child("DTSTART", 1, Some(1))
            .with_child("UID", 1, Some(1))
            .with_optional_once(&[
                "CREATED",
                "DESCRIPTION",
                "LAST-MODIFIED",
                "LOCATION",
                "RECURRENCE-ID",
                "RRULE",
                "SUMMARY",
                "DTEND",
                "DURATION",
            ])
            .with_repeatable(&["CATEGORIES", "COMMENT", "CONTACT", "EXDATE", "RDATE"])
            .with_check(end_or_duration),
    );
}

fn exclusive(component: &Component, a: &str, b: &str) -> Vec<ValidationError> {
    if component.line(a).is_some() && component.line(b).is_some() {
        vec![ValidationError::constraint(
            component,
            format!("{a} and {b} must not both be present"),
        )]
    } else {
        Vec::new()
    }
}

fn end_or_duration(component: &Component) -> Vec<ValidationError> {
    exclusive(component, "DTEND", "DURATION")
}

fn due_or_duration(component: &Component) -> Vec<ValidationError> {
    exclusive(component, "DUE", "DURATION")
}

fn has_observance(component: &Component) -> Vec<ValidationError> {
    let found = component
        .components()
        .iter()
        .any(|c| c.is_named("STANDARD") || c.is_named("DAYLIGHT"));
    if found {
        Vec::new()
    } else {
        vec![ValidationError::constraint(
            component,
            "at least one STANDARD or DAYLIGHT is required",
        )]
    }
}

fn missing(component: &Component, name: &str, raw: &str) -> Option<ContentLine> {
    component
        .line(name)
        .is_none()
        .then(|| ContentLine::new(name, raw))
}

fn calendar_implicit_lines(component: &Component) -> Vec<ContentLine> {
    [
        missing(component, "VERSION", ICALENDAR_VERSION),
        missing(component, "PRODID", DEFAULT_PRODID),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// UID and DTSTAMP for events, to-dos and journal entries without them.
fn stamped_implicit_lines(component: &Component) -> Vec<ContentLine> {
    let mut lines = Vec::new();
    if component.line("UID").is_none() {
        let uid = format!("{}@{PRODUCT_NAME}", Uuid::new_v4());
        lines.push(ContentLine::with_value("UID", Value::Text(uid)));
    }
    if component.line("DTSTAMP").is_none()
        && let Some(now) = DateTime::from_naive(Utc::now().naive_utc(), DateTimeForm::Utc)
    {
        lines.push(ContentLine::with_value("DTSTAMP", Value::DateTime(now)));
    }
    lines
}

/// ## Summary
/// VTIMEZONEs for the TZIDs a calendar uses but does not define.
///
/// Zones come from the IANA database and cover the default years plus any
/// year a zoned value falls in. UTC and unknown TZIDs get nothing.
fn calendar_timezones(calendar: &Component) -> Vec<Component> {
    let defined: Vec<String> = calendar
        .components_named("VTIMEZONE")
        .filter_map(|tz| tz.line("TZID"))
        .map(|line| line.encoded_value().into_owned())
        .collect();

    let mut used: Vec<&str> = Vec::new();
    let (mut first, mut last) = (TIMEZONE_FIRST_YEAR, TIMEZONE_LAST_YEAR);
    let lines = calendar
        .components()
        .iter()
        .filter(|child| !child.is_named("VTIMEZONE"))
        .flat_map(Component::descendants)
        .flat_map(|component| component.lines());
    for line in lines {
        let Some(tzid) = line.param_value(names::TZID) else {
            continue;
        };
        if let Some(year) = line
            .encoded_value()
            .get(..4)
            .and_then(|year| year.parse::<i32>().ok())
        {
            first = first.min(year);
            last = last.max(year);
        }
        if !used.contains(&tzid) && !defined.iter().any(|known| known == tzid) {
            used.push(tzid);
        }
    }

    let resolver = TimeZoneResolver::new();
    used.into_iter()
        .filter_map(|tzid| {
            let zone = resolver.resolve_iana(tzid)?;
            if matches!(zone, Tz::UTC | Tz::Etc__UTC) {
                return None;
            }
            debug!(tzid, first, last, "generating VTIMEZONE");
            Some(VTimezone::from_zone(tzid, &zone, first..=last).to_component())
        })
        .collect()
}

fn alarm_implicit_lines(component: &Component) -> Vec<ContentLine> {
    [
        missing(component, "ACTION", "AUDIO"),
        missing(component, "TRIGGER", "PT0S"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::behavior::validation_errors;
    use crate::rfc::core::{Value, ValueType};
    use crate::rfc::parse::parse;

    #[test]
    fn properties_decode_natively() {
        let event = parse(
            "BEGIN:VEVENT\r\nUID:a\r\nDTSTAMP:20240101T000000Z\r\n\
             DTSTART;VALUE=DATE:20240105\r\nPRIORITY:3\r\nCATEGORIES:a,b\r\n\
             RRULE:FREQ=WEEKLY;COUNT=2\r\nGEO:37.386013;-122.082932\r\nEND:VEVENT\r\n",
        )
        .unwrap();

        assert_eq!(event.value_of("PRIORITY"), Some(&Value::Integer(3)));
        assert!(matches!(event.value_of("DTSTART"), Some(Value::Date(_))));
        assert_eq!(
            event.value_of("CATEGORIES").and_then(Value::as_text_list),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert!(event.value_of("RRULE").and_then(Value::as_recur).is_some());
        assert_eq!(
            event.value_of("GEO").map(Value::value_type),
            Some(ValueType::Unknown)
        );
    }

    #[test]
    fn structural_hooks() {
        let todo = parse(
            "BEGIN:VTODO\r\nUID:t\r\nDTSTAMP:20240101T000000Z\r\n\
             DUE:20240102T000000Z\r\nDURATION:PT1H\r\nEND:VTODO\r\n",
        )
        .unwrap();
        let errors = validation_errors(&todo);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0],
            ValidationError::Constraint { component, .. } if component == "VTODO"));

        let tz = parse("BEGIN:VTIMEZONE\r\nTZID:Nowhere\r\nEND:VTIMEZONE\r\n").unwrap();
        assert!(matches!(validation_errors(&tz).as_slice(),
            [ValidationError::Constraint { component, .. }] if component == "VTIMEZONE"));
    }

    #[test]
    fn implicit_lines_fill_only_gaps() {
        let cal = parse("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n").unwrap();
        let lines = calendar_implicit_lines(&cal);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name(), "PRODID");
        assert_eq!(lines[0].raw(), Some(DEFAULT_PRODID));

        let alarm = Component::new("VALARM");
        let names: Vec<_> = alarm_implicit_lines(&alarm)
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(names, ["ACTION", "TRIGGER"]);
    }

    #[test]
    fn stamps_fill_missing_uid_and_dtstamp() {
        let bare = Component::new("VEVENT");
        let lines = stamped_implicit_lines(&bare);
        let names: Vec<_> = lines.iter().map(ContentLine::name).collect();
        assert_eq!(names, ["UID", "DTSTAMP"]);
        assert!(lines[0].encoded_value().ends_with("@calcard"));
        assert!(matches!(lines[1].value(), Some(Value::DateTime(dt)) if dt.is_utc()));

        let stamped = parse(
            "BEGIN:VTODO\r\nUID:t\r\nDTSTAMP:20240101T000000Z\r\nEND:VTODO\r\n",
        )
        .unwrap();
        assert!(stamped_implicit_lines(&stamped).is_empty());

        let again = stamped_implicit_lines(&bare);
        assert_ne!(again[0].encoded_value(), lines[0].encoded_value());
    }

    #[test]
    fn timezones_for_undefined_tzids_only() {
        let cal = parse(
            "BEGIN:VCALENDAR\r\n\
             BEGIN:VTIMEZONE\r\nTZID:Europe/Berlin\r\nBEGIN:STANDARD\r\n\
             DTSTART:19700101T000000\r\nTZOFFSETFROM:+0100\r\nTZOFFSETTO:+0100\r\n\
             END:STANDARD\r\nEND:VTIMEZONE\r\n\
             BEGIN:VEVENT\r\nUID:a\r\nDTSTAMP:20240101T000000Z\r\n\
             DTSTART;TZID=America/New_York:19950601T090000\r\n\
             DTEND;TZID=Europe/Berlin:19950601T160000\r\n\
             EXDATE;TZID=UTC:19950602T090000\r\n\
             RDATE;TZID=Nowhere/Special:19950603T090000\r\n\
             END:VEVENT\r\nEND:VCALENDAR\r\n",
        )
        .unwrap();

        let zones = calendar_timezones(&cal);
        assert_eq!(zones.len(), 1);
        let zone = VTimezone::from_component(&zones[0]).unwrap();
        assert_eq!(zone.tzid, "America/New_York");
        // The window reaches back to the event's year.
        let earliest = zone.observances.iter().map(|obs| obs.dtstart).min().unwrap();
        assert_eq!(earliest.to_string(), "1995-04-02 02:00:00");
    }

    #[test]
    fn calendar_children_are_declared() {
        let registry = BehaviorRegistry::standard();
        let calendar = registry.component("VCALENDAR");
        for child in ["VEVENT", "VTODO", "VJOURNAL", "VFREEBUSY", "VTIMEZONE", "VAVAILABILITY"] {
            assert_eq!(calendar.child_rule(child).map(|r| r.max), Some(None), "{child}");
        }
        assert!(registry.property("UID").is_singleton());
        assert!(!registry.property("ATTENDEE").is_singleton());
    }
}
