//! Structural and grammar errors.

use std::fmt;

/// Result type for document building.
pub type FormatResult<T> = Result<T, FormatError>;

/// A structural or grammar violation. Fatal to the document build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    /// 1-based logical line (the physical line it starts on).
    pub line: usize,
    /// 1-based column within the logical line.
    pub column: usize,
    pub context: Option<String>,
}

impl FormatError {
    #[must_use]
    pub fn new(kind: FormatErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.kind, self.line, self.column)?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FormatError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The document contains no component.
    EmptyDocument,
    /// The first physical line is a continuation.
    LeadingContinuation,
    /// A logical line is not valid UTF-8.
    InvalidUtf8,
    MissingPropertyName,
    InvalidPropertyName,
    MissingColon,
    InvalidParameter,
    UnclosedQuote,
    /// `BEGIN` or `END` without a component name.
    MissingComponentName,
    /// A content line appears outside any component.
    LineOutsideComponent,
    /// `END` with nothing open.
    UnmatchedEnd,
    /// `END` name differs from the open component.
    MismatchedComponent,
    /// Input ended with components still open.
    UnterminatedComponent,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDocument => write!(f, "document contains no component"),
            Self::LeadingContinuation => write!(f, "continuation line with nothing to continue"),
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
            Self::MissingPropertyName => write!(f, "missing property name"),
            Self::InvalidPropertyName => write!(f, "invalid property name"),
            Self::MissingColon => write!(f, "missing colon separator"),
            Self::InvalidParameter => write!(f, "invalid parameter format"),
            Self::UnclosedQuote => write!(f, "unclosed quoted string"),
            Self::MissingComponentName => write!(f, "missing component name"),
            Self::LineOutsideComponent => write!(f, "content line outside any component"),
            Self::UnmatchedEnd => write!(f, "END without matching BEGIN"),
            Self::MismatchedComponent => write!(f, "mismatched BEGIN/END"),
            Self::UnterminatedComponent => write!(f, "component was never closed"),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
