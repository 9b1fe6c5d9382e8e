use std::fmt;

use thiserror::Error;

use crate::rfc::behavior::{TranscodeError, ValidationError};
use crate::rfc::ical::expand::ExpansionError;
use crate::rfc::parse::FormatError;

/// Errors surfaced by the engine.
#[derive(Error, Debug)]
pub enum RfcError {
    /// Structural or grammar violation; the document could not be built.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Strict mode: every value that failed to decode, in document order.
    #[error("{} value(s) failed to decode: {}", .0.len(), summarize(.0))]
    Transcode(Vec<TranscodeError>),

    /// Every violation found by an explicit validation pass.
    #[error("{} validation error(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error(transparent)]
    CoreError(#[from] calcard_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

fn summarize<E: fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
