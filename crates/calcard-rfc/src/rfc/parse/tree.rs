//! Builds the component tree from logical lines.

use tracing::{trace, warn};

use super::error::{FormatError, FormatErrorKind, FormatResult};
use super::lexer::{LogicalLine, parse_content_line};
use crate::rfc::core::{Component, ContentLine};

/// Stack machine turning `BEGIN`/`END` pairs into nested components.
///
/// Feed it logical lines with [`Self::push`] and collect the top-level
/// components with [`Self::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    open: Vec<Component>,
    roots: Vec<Component>,
    bare: Vec<ContentLine>,
    allow_bare_lines: bool,
    skip_invalid_lines: bool,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect lines outside any component into a nameless container
    /// instead of failing.
    #[must_use]
    pub fn allow_bare_lines(mut self, allow: bool) -> Self {
        self.allow_bare_lines = allow;
        self
    }

    /// Drop content lines that do not match the grammar instead of failing.
    #[must_use]
    pub fn skip_invalid_lines(mut self, skip: bool) -> Self {
        self.skip_invalid_lines = skip;
        self
    }

    /// ## Summary
    /// Consumes one logical line.
    ///
    /// ## Errors
    /// Returns a [`FormatError`] for grammar errors (unless skipping), a
    /// `BEGIN`/`END` without a name, an `END` that closes nothing or the
    /// wrong component, or a line outside any component when bare lines are
    /// not allowed.
    pub fn push(&mut self, line: LogicalLine) -> FormatResult<()> {
        let content = match parse_content_line(&line.text, line.number) {
            Ok(content) => content,
            Err(err) if self.skip_invalid_lines && !is_structural(&line.text) => {
                warn!(line = line.number, error = %err, "skipping unreadable line");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if content.is_named("BEGIN") {
            self.begin(content, line.number)
        } else if content.is_named("END") {
            self.end(&content, line.number)
        } else {
            self.add_line(content, line.number)
        }
    }

    fn begin(&mut self, content: ContentLine, number: usize) -> FormatResult<()> {
        let name = component_name(&content, number)?;
        trace!(line = number, component = %name, "begin");

        let mut component = Component::new(name);
        component.set_group(content.group().map(str::to_string));
        component.set_line_number(number);
        self.open.push(component);
        Ok(())
    }

    fn end(&mut self, content: &ContentLine, number: usize) -> FormatResult<()> {
        let name = component_name(content, number)?;
        let Some(component) = self.open.pop() else {
            return Err(
                FormatError::new(FormatErrorKind::UnmatchedEnd, number, 1)
                    .with_context(format!("END:{name}")),
            );
        };
        if !component.is_named(&name) {
            return Err(
                FormatError::new(FormatErrorKind::MismatchedComponent, number, 1).with_context(
                    format!("expected END:{}, found END:{name}", component.name()),
                ),
            );
        }
        trace!(line = number, component = %name, "end");

        match self.open.last_mut() {
            Some(parent) => {
                parent.add_component(component);
            }
            None => self.roots.push(component),
        }
        Ok(())
    }

    fn add_line(&mut self, content: ContentLine, number: usize) -> FormatResult<()> {
        if let Some(current) = self.open.last_mut() {
            current.add_line(content);
        } else if self.allow_bare_lines {
            self.bare.push(content);
        } else {
            return Err(
                FormatError::new(FormatErrorKind::LineOutsideComponent, number, 1)
                    .with_context(content.name().to_string()),
            );
        }
        Ok(())
    }

    /// ## Summary
    /// Returns the top-level components in input order.
    ///
    /// When bare lines were collected, a single nameless container holding
    /// them and the top-level components is returned instead.
    ///
    /// ## Errors
    /// Returns a [`FormatError`] located at the innermost unclosed `BEGIN`,
    /// or [`FormatErrorKind::EmptyDocument`] when nothing was built.
    pub fn finish(mut self) -> FormatResult<Vec<Component>> {
        if let Some(unclosed) = self.open.pop() {
            return Err(FormatError::new(
                FormatErrorKind::UnterminatedComponent,
                unclosed.line_number().unwrap_or(0),
                1,
            )
            .with_context(format!("BEGIN:{}", unclosed.name())));
        }

        if !self.bare.is_empty() {
            let mut container = Component::container(self.roots);
            for line in self.bare {
                container.add_line(line);
            }
            return Ok(vec![container]);
        }

        if self.roots.is_empty() {
            return Err(FormatError::new(FormatErrorKind::EmptyDocument, 0, 0));
        }
        Ok(self.roots)
    }
}

fn is_structural(text: &str) -> bool {
    let head = text.get(..6).unwrap_or(text).to_ascii_uppercase();
    head.starts_with("BEGIN:") || head.starts_with("END:")
}

fn component_name(content: &ContentLine, number: usize) -> FormatResult<String> {
    let name = content.raw().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(FormatError::new(
            FormatErrorKind::MissingComponentName,
            number,
            content.name().len() + 2,
        ));
    }
    Ok(name.to_ascii_uppercase())
}
