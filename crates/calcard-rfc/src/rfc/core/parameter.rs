//! Property parameters (RFC 5545 §3.2, RFC 6350 §5).

use std::fmt;

use crate::rfc::build::escape::escape_param_value;

/// A single property parameter, e.g. `TZID=America/New_York` or
/// `MEMBER="mailto:a@example.com","mailto:b@example.com"`.
///
/// A vCard 2.1 bare parameter (`TEL;HOME:...`) has an empty value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Upper-cased name.
    pub name: String,
    /// Decoded values, in wire order.
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// A parameter written without `=`.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::with_values(name, Vec::new())
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Whether any value matches (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new(names::TZID, tzid)
    }

    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new(names::VALUE, value_type)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.values.is_empty() {
            return Ok(());
        }
        write!(f, "=")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", escape_param_value(value))?;
        }
        Ok(())
    }
}

/// Parameter names the engine itself interprets.
pub mod names {
    pub const CHARSET: &str = "CHARSET";
    pub const ENCODING: &str = "ENCODING";
    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";
}
