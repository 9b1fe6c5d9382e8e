//! Content lines (properties).

use std::borrow::Cow;
use std::sync::Arc;

use super::parameter::names;
use super::{Parameter, Value};
use crate::rfc::behavior::{Behavior, DecodeContext, TranscodeError, transcoder};

/// The value slot of a content line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineValue {
    /// Wire text exactly as parsed (escapes intact), or never decoded.
    Raw(String),
    /// Decoded value; re-encoded on output.
    Native(Value),
}

/// A property: `[group.]NAME;PARAM=...:value`.
#[derive(Debug, Clone)]
pub struct ContentLine {
    name: String,
    group: Option<String>,
    pub params: Vec<Parameter>,
    value: LineValue,
    behavior: Option<Arc<Behavior>>,
    transcode_error: Option<TranscodeError>,
    line_number: Option<usize>,
}

impl ContentLine {
    /// Creates an undecoded line from wire text.
    #[must_use]
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            group: None,
            params: Vec::new(),
            value: LineValue::Raw(raw.into()),
            behavior: None,
            transcode_error: None,
            line_number: None,
        }
    }

    /// Creates a line holding a native value.
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        let mut line = Self::new(name, String::new());
        line.set_value(value);
        line
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.set_param(param);
        self
    }

    pub(crate) fn set_line_number(&mut self, line: usize) {
        self.line_number = Some(line);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Group prefix with its original case.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.is_named(name))
    }

    /// First value of the named parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Parameter::value)
    }

    /// Replaces any parameter with the same name, keeping its position.
    pub fn set_param(&mut self, param: Parameter) {
        if let Some(existing) = self.params.iter_mut().find(|p| p.name == param.name) {
            *existing = param;
        } else {
            self.params.push(param);
        }
    }

    pub fn remove_param(&mut self, name: &str) -> Option<Parameter> {
        let index = self.params.iter().position(|p| p.is_named(name))?;
        Some(self.params.remove(index))
    }

    #[must_use]
    pub fn line_value(&self) -> &LineValue {
        &self.value
    }

    /// The decoded value, if this line has been transcoded.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.value {
            LineValue::Native(value) => Some(value),
            LineValue::Raw(_) => None,
        }
    }

    /// The wire text, if this line has not been transcoded.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match &self.value {
            LineValue::Raw(raw) => Some(raw),
            LineValue::Native(_) => None,
        }
    }

    /// Stores a native value and clears any previous decode failure.
    ///
    /// A zoned DATE-TIME sets the `TZID` parameter; UTC and floating ones
    /// remove it.
    pub fn set_value(&mut self, value: Value) {
        self.value = LineValue::Native(value);
        self.transcode_error = None;
        self.sync_tzid();
    }

    fn sync_tzid(&mut self) {
        let LineValue::Native(value) = &self.value else {
            return;
        };
        let tzid = value.tzid().map(str::to_owned);
        let has_datetime = value.has_datetime();
        if let Some(tzid) = tzid {
            self.set_param(Parameter::tzid(tzid));
        } else if has_datetime {
            self.remove_param(names::TZID);
        } else {
            // dates and non-temporal values leave parameters alone
        }
    }

    /// Stores wire text; call [`Self::transcode`] to decode it again.
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.value = LineValue::Raw(raw.into());
        self.transcode_error = None;
    }

    #[must_use]
    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_deref()
    }

    pub(crate) fn set_behavior(&mut self, behavior: Arc<Behavior>) {
        self.behavior = Some(behavior);
    }

    /// The failure recorded when lenient decoding could not read this line.
    #[must_use]
    pub fn transcode_error(&self) -> Option<&TranscodeError> {
        self.transcode_error.as_ref()
    }

    /// 1-based logical line the property was parsed from.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    /// ## Summary
    /// Decodes a raw value through the line's transcoder. Native values are
    /// left untouched.
    ///
    /// On failure the raw text stays in place and the error is both recorded
    /// on the line and returned.
    ///
    /// ## Errors
    /// Returns the [`TranscodeError`] when the raw text does not match the
    /// value grammar.
    pub fn transcode(&mut self, ctx: &DecodeContext<'_>) -> Result<(), TranscodeError> {
        let LineValue::Raw(raw) = &self.value else {
            return Ok(());
        };

        let codec = transcoder::for_line(self.behavior.as_deref(), &self.params);
        match codec.decode(raw, &self.params, ctx) {
            Ok(value) => {
                self.set_value(value);
                Ok(())
            }
            Err(err) => {
                let err = err.at(&self.name, self.line_number);
                self.transcode_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The value as wire text: raw text as-is, native values re-encoded.
    #[must_use]
    pub fn encoded_value(&self) -> Cow<'_, str> {
        match &self.value {
            LineValue::Raw(raw) => Cow::Borrowed(raw),
            LineValue::Native(value) => {
                let codec = transcoder::for_line(self.behavior.as_deref(), &self.params);
                Cow::Owned(codec.encode(value, &self.params))
            }
        }
    }
}

impl PartialEq for ContentLine {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.group == other.group
            && self.params == other.params
            && self.value == other.value
    }
}
