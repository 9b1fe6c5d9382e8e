//! Text to tree: unfold, tokenize, build, then bind behaviors and decode.

mod error;
pub mod lexer;
pub mod tree;
pub mod values;

use std::sync::Arc;

use calcard_core::config::ParseConfig;
use tracing::debug;

pub use error::{FormatError, FormatErrorKind, FormatResult};
use lexer::LogicalLines;
use tree::TreeBuilder;

use crate::error::{RfcError, RfcResult};
use crate::rfc::behavior::{BehaviorRegistry, DecodeContext, behaviorize};
use crate::rfc::core::Component;
use crate::rfc::ical::expand::TimezoneLookup;

/// How a document is read.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Fail with every decode error at once instead of keeping raw text.
    pub strict: bool,
    /// Decode values after building; off leaves every line raw.
    pub transcode: bool,
    /// Accept content lines outside any component.
    pub allow_bare_lines: bool,
    /// Drop ungrammatical content lines with a warning.
    pub skip_invalid_lines: bool,
    /// Registry to bind behaviors from; `None` uses the global one.
    pub registry: Option<Arc<BehaviorRegistry>>,
    /// Zone collaborator; when set, every `TZID` must resolve through it.
    pub timezones: Option<Arc<dyn TimezoneLookup>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from(&ParseConfig::default())
    }
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        Self {
            strict: config.strict,
            transcode: config.transcode,
            allow_bare_lines: config.allow_bare_lines,
            skip_invalid_lines: config.skip_invalid_lines,
            registry: None,
            timezones: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<BehaviorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_timezones(mut self, timezones: Arc<dyn TimezoneLookup>) -> Self {
        self.timezones = Some(timezones);
        self
    }
}

/// ## Summary
/// Parses one document leniently with the global registry.
///
/// ## Errors
/// Returns [`RfcError::Format`] if the document is structurally invalid.
pub fn parse(input: &str) -> RfcResult<Component> {
    parse_with(input, &ParseOptions::default())
}

/// ## Summary
/// Parses one document. Several top-level components come back wrapped in
/// a nameless container.
///
/// ## Errors
/// Returns [`RfcError::Format`] for structural errors and, in strict mode,
/// [`RfcError::Transcode`] with every value that failed to decode.
#[tracing::instrument(skip(input, options), fields(input_len = input.len()))]
pub fn parse_with(input: &str, options: &ParseOptions) -> RfcResult<Component> {
    parse_bytes(input.as_bytes(), options)
}

/// ## Summary
/// Parses raw bytes; a UTF-8 byte-order mark is skipped.
///
/// ## Errors
/// As [`parse_with`], plus [`FormatErrorKind::InvalidUtf8`] for lines that
/// are not UTF-8.
pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> RfcResult<Component> {
    let mut roots = read_components(input, options)?;
    if roots.len() == 1
        && let Some(root) = roots.pop()
    {
        return Ok(root);
    }
    Ok(Component::container(roots))
}

/// ## Summary
/// Parses a stream of top-level components, e.g. a file of many vCards.
///
/// ## Errors
/// As [`parse_with`].
#[tracing::instrument(skip(input, options), fields(input_len = input.len()))]
pub fn parse_all(input: &str, options: &ParseOptions) -> RfcResult<Vec<Component>> {
    read_components(input.as_bytes(), options)
}

fn read_components(input: &[u8], options: &ParseOptions) -> RfcResult<Vec<Component>> {
    let mut builder = TreeBuilder::new()
        .allow_bare_lines(options.allow_bare_lines)
        .skip_invalid_lines(options.skip_invalid_lines);
    for line in LogicalLines::new(input) {
        builder.push(line?)?;
    }
    let mut roots = builder.finish()?;

    let registry = options
        .registry
        .clone()
        .unwrap_or_else(BehaviorRegistry::global);
    let ctx = DecodeContext::new(options.timezones.as_deref());

    let mut errors = Vec::new();
    for root in &mut roots {
        errors.extend(behaviorize(root, &registry, &ctx, options.transcode));
    }

    if !errors.is_empty() {
        if options.strict {
            return Err(RfcError::Transcode(errors));
        }
        debug!(count = errors.len(), "values kept raw after decode failures");
    }
    Ok(roots)
}
