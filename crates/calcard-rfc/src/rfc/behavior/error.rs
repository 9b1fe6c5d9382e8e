//! Value decoding and validation errors.

use std::fmt;

use thiserror::Error;

use crate::rfc::core::Component;

/// Why a raw value failed to decode.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeErrorKind {
    #[error("invalid DATE")]
    InvalidDate,
    #[error("invalid TIME")]
    InvalidTime,
    #[error("invalid DATE-TIME")]
    InvalidDateTime,
    #[error("invalid DURATION")]
    InvalidDuration,
    #[error("invalid PERIOD")]
    InvalidPeriod,
    #[error("invalid RECUR")]
    InvalidRecur,
    #[error("invalid UTC-OFFSET")]
    InvalidUtcOffset,
    #[error("invalid INTEGER")]
    InvalidInteger,
    #[error("invalid FLOAT")]
    InvalidFloat,
    #[error("invalid BOOLEAN")]
    InvalidBoolean,
    #[error("invalid base64 data")]
    InvalidBinary,
    #[error("unknown time zone")]
    UnknownTimezone,
    #[error("unsupported character set")]
    UnsupportedCharset,
}

/// A value that did not match its grammar.
///
/// Lenient decoding stores this on the line and keeps the raw text; strict
/// decoding collects every one of them into [`crate::RfcError::Transcode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeError {
    pub kind: TranscodeErrorKind,
    /// The offending raw text (or the part of it that failed).
    pub value: String,
    pub property: Option<String>,
    pub line: Option<usize>,
    pub context: Option<String>,
}

impl TranscodeError {
    #[must_use]
    pub fn new(kind: TranscodeErrorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            property: None,
            line: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches the property name and source line.
    #[must_use]
    pub fn at(mut self, property: &str, line: Option<usize>) -> Self {
        self.property = Some(property.to_string());
        self.line = line;
        self
    }
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref property) = self.property {
            write!(f, " in {property}")?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {:?}", self.value)?;
        if let Some(ref context) = self.context {
            write!(f, ", {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TranscodeError {}

/// A structural rule broken by a built tree.
///
/// `component` names the node the rule belongs to and `line` is the source
/// line of the offending child when known.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{component}: required {child} is missing")]
    MissingRequired {
        component: String,
        child: String,
        line: Option<usize>,
    },

    #[error("{component}: {child} occurs {found} times, at most {max} allowed")]
    TooMany {
        component: String,
        child: String,
        found: usize,
        max: usize,
        line: Option<usize>,
    },

    #[error("{component}: {child} is not allowed inside this component")]
    DisallowedNesting {
        component: String,
        child: String,
        line: Option<usize>,
    },

    #[error("{component}: {child} may not carry a group prefix")]
    GroupNotAllowed {
        component: String,
        child: String,
        line: Option<usize>,
    },

    #[error("{component}: {message}")]
    Constraint {
        component: String,
        message: String,
        line: Option<usize>,
    },
}

impl ValidationError {
    /// A custom rule violation reported by a behavior's check hook.
    #[must_use]
    pub fn constraint(component: &Component, message: impl Into<String>) -> Self {
        Self::Constraint {
            component: component.name().to_string(),
            message: message.into(),
            line: component.line_number(),
        }
    }

    #[must_use]
    pub fn component(&self) -> &str {
        match self {
            Self::MissingRequired { component, .. }
            | Self::TooMany { component, .. }
            | Self::DisallowedNesting { component, .. }
            | Self::GroupNotAllowed { component, .. }
            | Self::Constraint { component, .. } => component,
        }
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingRequired { line, .. }
            | Self::TooMany { line, .. }
            | Self::DisallowedNesting { line, .. }
            | Self::GroupNotAllowed { line, .. }
            | Self::Constraint { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcode_error_display() {
        let err = TranscodeError::new(TranscodeErrorKind::InvalidDate, "20241301")
            .at("DTSTART", Some(5))
            .with_context("month out of range");
        assert_eq!(
            err.to_string(),
            "invalid DATE in DTSTART (line 5): \"20241301\", month out of range"
        );
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::TooMany {
            component: "VEVENT".into(),
            child: "DTSTART".into(),
            found: 2,
            max: 1,
            line: Some(4),
        };
        assert_eq!(
            err.to_string(),
            "VEVENT: DTSTART occurs 2 times, at most 1 allowed"
        );
        assert_eq!(err.line(), Some(4));
        assert_eq!(err.component(), "VEVENT");
    }
}
