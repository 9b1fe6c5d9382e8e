//! Tree → folded CRLF text.

use calcard_core::config::SerializeConfig;
use tracing::debug;

use super::escape::escape_line_breaks;
use super::fold::fold_line;
use crate::rfc::behavior::{Behavior, BehaviorRegistry};
use crate::rfc::core::{Component, ContentLine};

/// How a tree is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Maximum physical line length in octets, CRLF excluded.
    pub line_length: usize,
    /// Let behaviors add lines and components a node implies but lacks,
    /// such as a calendar's PRODID or the VTIMEZONEs its events refer to.
    pub implicit_lines: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::from(&SerializeConfig::default())
    }
}

impl From<&SerializeConfig> for SerializeOptions {
    fn from(config: &SerializeConfig) -> Self {
        Self {
            line_length: config.line_length,
            implicit_lines: config.implicit_lines,
        }
    }
}

/// Serializes with default options.
#[must_use]
pub fn serialize(component: &Component) -> String {
    serialize_with(component, &SerializeOptions::default())
}

/// ## Summary
/// Serializes a tree: at each component its lines, then its child
/// components, each group ordered by the behavior's sort-first list and
/// then by insertion order. Containers write only their contents.
///
/// Nodes that were never bound are ordered by the global registry.
#[must_use]
#[tracing::instrument(skip_all, fields(component = component.name()))]
pub fn serialize_with(component: &Component, options: &SerializeOptions) -> String {
    let registry = BehaviorRegistry::global();
    let mut out = String::new();
    write_component(component, options, &registry, &mut out);
    debug!(octets = out.len(), "serialized");
    out
}

/// `[group.]NAME[;PARAM=...]:value` on one unfolded line, without CRLF.
#[must_use]
pub fn serialize_line(line: &ContentLine) -> String {
    let mut text = String::new();
    if let Some(group) = line.group() {
        text.push_str(group);
        text.push('.');
    }
    text.push_str(line.name());
    for param in &line.params {
        text.push(';');
        text.push_str(&param.to_string());
    }
    text.push(':');
    text.push_str(&escape_line_breaks(&line.encoded_value()));
    text
}

fn write_component(
    component: &Component,
    options: &SerializeOptions,
    registry: &BehaviorRegistry,
    out: &mut String,
) {
    let registered;
    let behavior = if component.is_container() {
        None
    } else if let Some(behavior) = component.behavior() {
        Some(behavior)
    } else {
        registered = registry.component(component.name());
        Some(registered.as_ref())
    };

    if !component.is_container() {
        out.push_str(&fold_line(
            &structural_line("BEGIN", component),
            options.line_length,
        ));
    }

    let implicit = match behavior.and_then(Behavior::implicit_lines_hook) {
        Some(hook) if options.implicit_lines => hook(component),
        _ => Vec::new(),
    };
    let lines = ordered(
        component.lines().iter().chain(implicit.iter()),
        ContentLine::name,
        behavior,
    );
    for line in lines {
        out.push_str(&fold_line(&serialize_line(line), options.line_length));
    }

    let implicit = match behavior.and_then(Behavior::implicit_components_hook) {
        Some(hook) if options.implicit_lines => hook(component),
        _ => Vec::new(),
    };
    let children = ordered(
        component.components().iter().chain(implicit.iter()),
        Component::name,
        behavior,
    );
    for child in children {
        write_component(child, options, registry, out);
    }

    if !component.is_container() {
        out.push_str(&fold_line(
            &structural_line("END", component),
            options.line_length,
        ));
    }
}

fn structural_line(keyword: &str, component: &Component) -> String {
    match component.group() {
        Some(group) => format!("{group}.{keyword}:{}", component.name()),
        None => format!("{keyword}:{}", component.name()),
    }
}

/// Stable sort by sort-first rank; unranked items keep insertion order
/// behind the ranked ones.
fn ordered<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    name: fn(&T) -> &str,
    behavior: Option<&Behavior>,
) -> Vec<&'a T> {
    let mut items: Vec<&T> = items.collect();
    if let Some(behavior) = behavior {
        items.sort_by_key(|item| behavior.rank(name(item)).unwrap_or(usize::MAX));
    }
    items
}
