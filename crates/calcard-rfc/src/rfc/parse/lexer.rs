//! Line unfolding and content line grammar (RFC 5545 §3.1, RFC 6350 §3.2).

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{FormatError, FormatErrorKind, FormatResult};
use crate::rfc::core::{ContentLine, Parameter};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One unfolded line and the physical line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub number: usize,
    pub text: String,
}

/// Lazily rejoins folded physical lines.
///
/// Accepts CRLF, LF or bare CR terminators and skips a leading UTF-8 BOM.
/// A physical line starting with one SPACE or HTAB continues the previous
/// logical line with that single character removed; empty physical lines
/// are ignored. A quoted-printable line ending in `=` (vCard 2.1 soft
/// break) swallows the next physical line, minus the `=`. Unfolding happens
/// on bytes, so a fold inside a multi-byte sequence is rejoined before the
/// line is decoded.
#[derive(Debug)]
pub struct LogicalLines<'a> {
    input: &'a [u8],
    pos: usize,
    physical: usize,
    pending: Option<(usize, Vec<u8>)>,
    done: bool,
}

impl<'a> LogicalLines<'a> {
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        let input = input.strip_prefix(BOM).unwrap_or(input);
        Self {
            input,
            pos: 0,
            physical: 0,
            pending: None,
            done: false,
        }
    }

    /// Returns the next physical line without its terminator.
    fn next_physical(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        let end = rest
            .iter()
            .position(|b| matches!(b, b'\r' | b'\n'))
            .unwrap_or(rest.len());
        let mut consumed = end;
        if rest.get(end) == Some(&b'\r') {
            consumed += 1;
            if rest.get(end + 1) == Some(&b'\n') {
                consumed += 1;
            }
        } else if rest.get(end) == Some(&b'\n') {
            consumed += 1;
        } else {
            // last line without terminator
        }
        self.pos += consumed;
        self.physical += 1;
        Some(&rest[..end])
    }

    fn finish(number: usize, bytes: Vec<u8>) -> FormatResult<LogicalLine> {
        String::from_utf8(bytes)
            .map(|text| LogicalLine { number, text })
            .map_err(|e| {
                FormatError::new(
                    FormatErrorKind::InvalidUtf8,
                    number,
                    e.utf8_error().valid_up_to() + 1,
                )
            })
    }
}

fn is_soft_break(line: &[u8]) -> bool {
    const MARKER: &[u8] = b"QUOTED-PRINTABLE";
    let head = line.split(|&b| b == b':').next().unwrap_or_default();
    line.last() == Some(&b'=')
        && head
            .windows(MARKER.len())
            .any(|window| window.eq_ignore_ascii_case(MARKER))
}

/// A folded continuation finishing an `=XX` escape cut after the `=`.
fn splits_escape(physical: &[u8]) -> bool {
    matches!(physical, [b' ' | b'\t', high, low, ..]
        if high.is_ascii_hexdigit() && low.is_ascii_hexdigit())
}

impl<'a> From<&'a str> for LogicalLines<'a> {
    fn from(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = FormatResult<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(physical) = self.next_physical() {
            if physical.is_empty() {
                continue;
            }

            if let Some((_, pending)) = self.pending.as_mut()
                && is_soft_break(pending)
                && !splits_escape(physical)
            {
                pending.pop();
                pending.extend_from_slice(physical);
                continue;
            }

            if matches!(physical[0], b' ' | b'\t') {
                if let Some((_, pending)) = self.pending.as_mut() {
                    pending.extend_from_slice(&physical[1..]);
                    continue;
                }
                self.done = true;
                return Some(Err(FormatError::new(
                    FormatErrorKind::LeadingContinuation,
                    self.physical,
                    1,
                )));
            }

            let started = (self.physical, physical.to_vec());
            if let Some((number, bytes)) = self.pending.replace(started) {
                return Some(Self::finish(number, bytes));
            }
        }

        self.done = true;
        self.pending
            .take()
            .map(|(number, bytes)| Self::finish(number, bytes))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// ## Summary
/// Parses one logical line: `[group.]name *(";" param) ":" value`.
///
/// Names are upper-cased; the group keeps its case. The value is returned
/// exactly as written, escapes included.
///
/// ## Errors
/// Returns a [`FormatError`] if the name is empty or contains invalid
/// characters, a parameter is malformed or unterminated, or the `:` is
/// missing.
pub fn parse_content_line(line: &str, line_num: usize) -> FormatResult<ContentLine> {
    let mut chars = line.char_indices().peekable();
    let mut group = None;
    let mut name_start = 0;
    let mut stop = None;

    while let Some(&(i, c)) = chars.peek() {
        match c {
            ';' | ':' => {
                stop = Some((i, c));
                break;
            }
            '.' if group.is_none() => {
                if i == 0 {
                    return Err(FormatError::new(
                        FormatErrorKind::InvalidPropertyName,
                        line_num,
                        1,
                    )
                    .with_context("empty group"));
                }
                group = Some(line[..i].to_string());
                name_start = i + 1;
            }
            c if is_name_char(c) => {}
            _ => {
                return Err(FormatError::new(
                    FormatErrorKind::InvalidPropertyName,
                    line_num,
                    i + 1,
                ));
            }
        }
        chars.next();
    }

    let Some((name_end, separator)) = stop else {
        return Err(FormatError::new(
            FormatErrorKind::MissingColon,
            line_num,
            line.len() + 1,
        ));
    };
    if name_end == name_start {
        return Err(FormatError::new(
            FormatErrorKind::MissingPropertyName,
            line_num,
            name_start + 1,
        ));
    }
    chars.next();

    let mut content = ContentLine::new(&line[name_start..name_end], String::new());
    content.set_group(group);
    content.set_line_number(line_num);

    if separator == ';' {
        loop {
            let (param, reached_value) = parse_parameter(&mut chars, line, line_num)?;
            content.params.push(param);
            if reached_value {
                break;
            }
        }
    }

    let value_start = chars.peek().map_or(line.len(), |&(i, _)| i);
    content.set_raw(&line[value_start..]);
    Ok(content)
}

/// Parses one parameter and consumes its terminator.
///
/// Returns the parameter and whether the terminator was the value colon.
fn parse_parameter(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> FormatResult<(Parameter, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut end = None;
    while let Some(&(i, c)) = chars.peek() {
        match c {
            '=' | ';' | ':' => {
                end = Some((i, c));
                chars.next();
                break;
            }
            c if is_name_char(c) => {
                chars.next();
            }
            _ => {
                return Err(FormatError::new(
                    FormatErrorKind::InvalidParameter,
                    line_num,
                    i + 1,
                ));
            }
        }
    }

    let Some((name_end, separator)) = end else {
        return Err(FormatError::new(
            FormatErrorKind::MissingColon,
            line_num,
            line.len() + 1,
        ));
    };
    if name_end == start {
        return Err(
            FormatError::new(FormatErrorKind::InvalidParameter, line_num, start + 1)
                .with_context("empty parameter name"),
        );
    }

    let name = &line[start..name_end];
    match separator {
        ';' => return Ok((Parameter::bare(name), false)),
        ':' => return Ok((Parameter::bare(name), true)),
        _ => {}
    }

    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(name, values), false)),
            Some((_, ':')) => return Ok((Parameter::with_values(name, values), true)),
            Some((i, _)) => {
                return Err(FormatError::new(
                    FormatErrorKind::InvalidParameter,
                    line_num,
                    i + 1,
                )
                .with_context("expected ',', ';' or ':' after parameter value"));
            }
            None => {
                return Err(FormatError::new(
                    FormatErrorKind::MissingColon,
                    line_num,
                    line.len() + 1,
                ));
            }
        }
    }
}

/// Parses a single parameter value, quoted or not, leaving the separator.
fn parse_param_value(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> FormatResult<String> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    if chars.next_if(|&(_, c)| c == '"').is_some() {
        let mut value = String::new();
        loop {
            match chars.next() {
                Some((_, '"')) => return Ok(value),
                Some((_, '^')) => decode_caret(chars, &mut value),
                Some((_, c)) => value.push(c),
                None => {
                    return Err(FormatError::new(
                        FormatErrorKind::UnclosedQuote,
                        line_num,
                        start + 1,
                    ));
                }
            }
        }
    }

    let mut end = line.len();
    while let Some(&(i, c)) = chars.peek() {
        match c {
            ',' | ';' | ':' => {
                end = i;
                break;
            }
            '"' => {
                return Err(FormatError::new(
                    FormatErrorKind::InvalidParameter,
                    line_num,
                    i + 1,
                )
                .with_context("quote inside unquoted parameter value"));
            }
            _ => {
                chars.next();
            }
        }
    }
    Ok(line[start..end].to_string())
}

/// RFC 6868: `^^` → `^`, `^n` → newline, `^'` → `"`; any other caret is literal.
fn decode_caret(chars: &mut Peekable<CharIndices<'_>>, out: &mut String) {
    match chars.peek().map(|&(_, c)| c) {
        Some('^') => {
            chars.next();
            out.push('^');
        }
        Some('n' | 'N') => {
            chars.next();
            out.push('\n');
        }
        Some('\'') => {
            chars.next();
            out.push('"');
        }
        _ => out.push('^'),
    }
}
