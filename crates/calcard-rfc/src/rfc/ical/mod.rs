//! iCalendar (RFC 5545): component and property behaviors, recurrence
//! expansion and timezone resolution.

pub mod behaviors;
pub mod expand;
