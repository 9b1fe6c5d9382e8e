//! Recurrence expansion and timezone collaborators.

mod recur;
mod set;
pub mod timezone;
pub mod vtimezone;

use std::sync::Arc;

use chrono::NaiveDateTime;

pub use recur::Occurrences;
pub use set::{RecurrenceSet, SetOccurrences};
pub use timezone::{TimeZoneResolver, TimezoneLookup, ZoneRules, normalize_tzid};
pub use vtimezone::{Observance, ObservanceKind, VTimezone, VTimezoneError};

/// Error during recurrence expansion.
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    /// The rule has no COUNT or UNTIL and the caller gave no bound.
    #[error("Recurrence is unbounded: set a limit or max_instances")]
    Unbounded,

    /// The anchor is not a real calendar date or time.
    #[error("Invalid recurrence anchor: {0}")]
    InvalidAnchor(String),

    /// A recurring component has no DTSTART.
    #[error("Missing DTSTART in {0}")]
    MissingStart(String),

    /// A date or rule property could not be read.
    #[error("Invalid {property} value: {value}")]
    InvalidValue { property: String, value: String },

    #[error(transparent)]
    Timezone(#[from] VTimezoneError),
}

/// Bounds and collaborators for expansion.
#[derive(Debug, Clone, Default)]
pub struct ExpansionOptions {
    /// Inclusive wall-clock upper bound.
    pub limit: Option<NaiveDateTime>,
    /// Stop after this many occurrences.
    pub max_instances: Option<usize>,
    /// Resolves the anchor's TZID for DST-aware stepping and UTC UNTIL.
    pub lookup: Option<Arc<dyn TimezoneLookup>>,
}

impl ExpansionOptions {
    #[must_use]
    pub fn until(limit: NaiveDateTime) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = Some(max);
        self
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn TimezoneLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Whether the caller has bounded the expansion.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.limit.is_some() || self.max_instances.is_some()
    }
}
