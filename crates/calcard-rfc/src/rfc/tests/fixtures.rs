//! Documents from RFC 5545 Appendix A, RFC 2426 and common client output.

use crate::rfc::core::Component;

pub const MEETING: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:19970901T130000Z-123401@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART:19970903T163000Z\r\n\
DTEND:19970903T190000Z\r\n\
SUMMARY:Annual Employee Review\r\n\
CLASS:PRIVATE\r\n\
CATEGORIES:BUSINESS,HUMAN RESOURCES\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

pub const WEEKLY_WITH_ALARM: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:19970901T130000Z-123402@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART:19970905T090000Z\r\n\
DURATION:PT1H\r\n\
SUMMARY:Weekly Team Meeting\r\n\
RRULE:FREQ=WEEKLY;COUNT=10;BYDAY=FR\r\n\
EXDATE:19970912T090000Z,19970919T090000Z\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER;RELATED=START:-PT15M\r\n\
DESCRIPTION:Meeting in 15 minutes\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

pub const TODO_AND_JOURNAL: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//ABC Corporation//NONSGML My Product//EN\r\n\
BEGIN:VTODO\r\n\
UID:20070313T123432Z-456553@example.com\r\n\
DTSTAMP:20070313T123432Z\r\n\
DUE;VALUE=DATE:20070501\r\n\
SUMMARY:Submit Quebec Income Tax Return for 2006\r\n\
CLASS:CONFIDENTIAL\r\n\
CATEGORIES:FAMILY,FINANCE\r\n\
STATUS:NEEDS-ACTION\r\n\
PERCENT-COMPLETE:40\r\n\
END:VTODO\r\n\
BEGIN:VJOURNAL\r\n\
UID:19970901T130000Z-123405@example.com\r\n\
DTSTAMP:19970901T130000Z\r\n\
DTSTART;VALUE=DATE:19970317\r\n\
SUMMARY:Staff meeting minutes\r\n\
DESCRIPTION:1. Staff meeting: Participants include Joe\\,\r\n \
 Lisa\\, and Bob. Aurora project plans were reviewed.\\n2. Telephone\r\n \
 Conference: ABC Corp. sales representative called.\r\n\
END:VJOURNAL\r\n\
END:VCALENDAR\r\n";

pub const FREEBUSY: &str = "\
BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//RDU Software//NONSGML HandCal//EN\r\n\
BEGIN:VFREEBUSY\r\n\
UID:19970901T115957Z-76A912@example.com\r\n\
DTSTAMP:19970901T120000Z\r\n\
ORGANIZER:mailto:jsmith@example.com\r\n\
DTSTART:19980313T141711Z\r\n\
DTEND:19980410T141711Z\r\n\
FREEBUSY:19980314T233000Z/19980315T003000Z\r\n\
FREEBUSY:19980316T153000Z/19980316T163000Z,19980318T030000Z/PT1H\r\n\
URL:http://www.example.com/calendar/busytime/jsmith.ifb\r\n\
END:VFREEBUSY\r\n\
END:VCALENDAR\r\n";

/// US Eastern with the 2007 rules, as clients emit it.
pub const NEW_YORK_VTIMEZONE: &str = "\
BEGIN:VTIMEZONE\r\n\
TZID:America/New_York\r\n\
LAST-MODIFIED:20050809T050000Z\r\n\
BEGIN:DAYLIGHT\r\n\
DTSTART:20070311T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n\
TZOFFSETFROM:-0500\r\n\
TZOFFSETTO:-0400\r\n\
TZNAME:EDT\r\n\
END:DAYLIGHT\r\n\
BEGIN:STANDARD\r\n\
DTSTART:20071104T020000\r\n\
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n\
TZOFFSETFROM:-0400\r\n\
TZOFFSETTO:-0500\r\n\
TZNAME:EST\r\n\
END:STANDARD\r\n\
END:VTIMEZONE\r\n";

pub fn zoned_calendar() -> String {
    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Example//Example//EN\r\n\
         {NEW_YORK_VTIMEZONE}\
         BEGIN:VEVENT\r\n\
         UID:zoned@example.com\r\n\
         DTSTAMP:20240101T000000Z\r\n\
         DTSTART;TZID=America/New_York:20240308T093000\r\n\
         DTEND;TZID=America/New_York:20240308T103000\r\n\
         RRULE:FREQ=DAILY;COUNT=4\r\n\
         SUMMARY:Stand-up\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

/// Two vCard 3.0 cards back to back, with groups and base64.
pub const CARDS: &str = "\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Frank Dawson\r\n\
N:Dawson;Frank;;;\r\n\
ORG:Lotus Development Corporation\r\n\
ADR;TYPE=WORK,POSTAL,PARCEL:;;6544 Battleford Drive;Raleigh;NC;27613-3502;U.S.A.\r\n\
TEL;TYPE=VOICE,MSG,WORK:+1-919-676-9515\r\n\
item1.EMAIL;TYPE=INTERNET,PREF:Frank_Dawson@Lotus.com\r\n\
item1.X-ABLabel:work\r\n\
URL:http://home.earthlink.net/~fdawson\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
VERSION:3.0\r\n\
FN:Tim Howes\r\n\
N:Howes;Tim;;;\r\n\
NICKNAME:Timbo,Tim H.\r\n\
NOTE;ENCODING=b:SGVsbG8sIHdvcmxk\r\n\
PHOTO;ENCODING=b;TYPE=GIF:R0lGODdhAQABAIAAAP///////ywAAAAAAQABAAACAkQBADs=\r\n\
END:VCARD\r\n";

/// Every calendar fixture, named.
pub fn calendars() -> Vec<(&'static str, String)> {
    vec![
        ("meeting", MEETING.to_string()),
        ("weekly_with_alarm", WEEKLY_WITH_ALARM.to_string()),
        ("todo_and_journal", TODO_AND_JOURNAL.to_string()),
        ("freebusy", FREEBUSY.to_string()),
        ("zoned", zoned_calendar()),
    ]
}

/// A comparable outline of a tree: component boundaries and lines written
/// as `[group.]NAME;params:value`. Siblings are sorted, since serialization
/// may reorder them.
pub fn outline(component: &Component) -> Vec<String> {
    let mut lines: Vec<String> = component
        .lines()
        .iter()
        .map(|line| {
            let params: Vec<String> = line.params.iter().map(ToString::to_string).collect();
            format!(
                "{}{};{}:{}",
                line.group().map(|g| format!("{g}.")).unwrap_or_default(),
                line.name(),
                params.join(";"),
                line.encoded_value()
            )
        })
        .collect();
    lines.sort();

    let mut children: Vec<Vec<String>> = component.components().iter().map(outline).collect();
    children.sort();

    let mut out = vec![format!("BEGIN {}", component.name())];
    out.extend(lines);
    out.extend(children.into_iter().flatten());
    out.push(format!("END {}", component.name()));
    out
}
