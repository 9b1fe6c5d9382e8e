//! iCalendar (RFC 5545) and vCard (RFC 2426/6350) content engine.
//!
//! Text is unfolded into logical lines, parsed into a [`Component`] tree,
//! bound to [`Behavior`] descriptors and decoded into native values, then
//! serialized back to folded CRLF text.
//!
//! ```
//! let input = "BEGIN:VCALENDAR\r\nPRODID:-//x//y//EN\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
//! let calendar = calcard_rfc::parse(input).unwrap();
//! assert_eq!(calendar.name(), "VCALENDAR");
//! let text = calcard_rfc::serialize(&calendar);
//! assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
//! ```

pub mod error;
pub mod rfc;

pub use error::{RfcError, RfcResult};
pub use rfc::behavior::{Behavior, BehaviorRegistry};
pub use rfc::build::{SerializeOptions, serialize, serialize_with};
pub use rfc::core::{Component, ContentLine, LineValue, Parameter, Value, ValueType};
pub use rfc::ical::expand::{ExpansionError, ExpansionOptions, RecurrenceSet};
pub use rfc::parse::{ParseOptions, parse, parse_all, parse_bytes, parse_with};
