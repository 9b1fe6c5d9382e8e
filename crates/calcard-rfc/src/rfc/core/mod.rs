//! Core data model: the component tree and native value types.

pub mod component;
pub mod content_line;
pub mod datetime;
pub mod duration;
pub mod parameter;
pub mod rrule;
pub mod value;

pub use component::{Component, Descendants};
pub use content_line::{ContentLine, LineValue};
pub use datetime::{Date, DateOrDateTime, DateTime, DateTimeForm, Time, UtcOffset};
pub use duration::{Duration, DurationBuilder};
pub use parameter::Parameter;
pub use rrule::{Frequency, RRule, Weekday, WeekdayNum};
pub use value::{Period, Value, ValueType};
