//! The component tree.

use std::sync::Arc;

use super::{ContentLine, Value};
use crate::rfc::behavior::{Behavior, TranscodeError};

/// A named node such as `VCALENDAR`, `VEVENT` or `VCARD`.
///
/// Lines and child components each keep their insertion order; accessors take
/// a case-insensitive name and return matches in that order. A component with
/// an empty name is a container: the synthetic root wrapping several
/// top-level components, or the anonymous holder of bare lines.
#[derive(Debug, Clone, Default)]
pub struct Component {
    name: String,
    group: Option<String>,
    lines: Vec<ContentLine>,
    components: Vec<Component>,
    behavior: Option<Arc<Behavior>>,
    line_number: Option<usize>,
}

impl Component {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    /// A nameless container around `children`.
    #[must_use]
    pub fn container(children: Vec<Component>) -> Self {
        Self {
            components: children,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.name.is_empty()
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn set_group(&mut self, group: Option<String>) {
        self.group = group;
    }

    #[must_use]
    pub fn behavior(&self) -> Option<&Behavior> {
        self.behavior.as_deref()
    }

    pub(crate) fn set_behavior(&mut self, behavior: Arc<Behavior>) {
        self.behavior = Some(behavior);
    }

    /// 1-based logical line of the `BEGIN` that opened this component.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub(crate) fn set_line_number(&mut self, line: usize) {
        self.line_number = Some(line);
    }

    /// All content lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[ContentLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> impl Iterator<Item = &mut ContentLine> {
        self.lines.iter_mut()
    }

    /// All child components in insertion order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut()
    }

    /// Every line called `name`, in order.
    pub fn lines_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ContentLine> + 'a {
        self.lines.iter().filter(move |l| l.is_named(name))
    }

    /// First line called `name`.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<&ContentLine> {
        self.lines.iter().find(|l| l.is_named(name))
    }

    pub fn line_mut(&mut self, name: &str) -> Option<&mut ContentLine> {
        self.lines.iter_mut().find(|l| l.is_named(name))
    }

    /// Decoded value of the first line called `name`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.line(name).and_then(ContentLine::value)
    }

    /// Every child component called `name`, in order.
    pub fn components_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Component> + 'a {
        self.components.iter().filter(move |c| c.is_named(name))
    }

    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.is_named(name))
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.is_named(name))
    }

    /// Appends a line and returns it for further editing.
    pub fn add_line(&mut self, line: ContentLine) -> &mut ContentLine {
        self.lines.push(line);
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Appends a child component and returns it for further editing.
    pub fn add_component(&mut self, component: Component) -> &mut Component {
        self.components.push(component);
        let last = self.components.len() - 1;
        &mut self.components[last]
    }

    /// Removes and returns every line called `name`.
    pub fn remove_lines(&mut self, name: &str) -> Vec<ContentLine> {
        let (removed, kept) = std::mem::take(&mut self.lines)
            .into_iter()
            .partition(|l| l.is_named(name));
        self.lines = kept;
        removed
    }

    /// Removes the `index`-th line called `name`.
    pub fn remove_line_at(&mut self, name: &str, index: usize) -> Option<ContentLine> {
        let position = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_named(name))
            .nth(index)
            .map(|(i, _)| i)?;
        Some(self.lines.remove(position))
    }

    /// Removes and returns every child component called `name`.
    pub fn remove_components(&mut self, name: &str) -> Vec<Component> {
        let (removed, kept) = std::mem::take(&mut self.components)
            .into_iter()
            .partition(|c| c.is_named(name));
        self.components = kept;
        removed
    }

    pub fn retain_lines(&mut self, keep: impl FnMut(&ContentLine) -> bool) {
        self.lines.retain(keep);
    }

    pub fn retain_components(&mut self, keep: impl FnMut(&Component) -> bool) {
        self.components.retain(keep);
    }

    /// Moves lines and components named in `order` to the front, in that
    /// order; everything else keeps its relative position behind them.
    pub fn reorder(&mut self, order: &[&str]) {
        let rank = |name: &str| {
            order
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(order.len())
        };
        self.lines.sort_by_key(|l| rank(l.name()));
        self.components.sort_by_key(|c| rank(c.name()));
    }

    /// This component and all of its descendants, depth-first.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Decode failures recorded anywhere in this subtree, in document order.
    #[must_use]
    pub fn transcode_errors(&self) -> Vec<&TranscodeError> {
        self.descendants()
            .flat_map(|c| c.lines.iter().filter_map(ContentLine::transcode_error))
            .collect()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.group == other.group
            && self.lines == other.lines
            && self.components == other.components
    }
}

/// Pre-order walk over a component subtree.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Component>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.components.iter().rev());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(uid: &str) -> Component {
        let mut event = Component::new("vevent");
        event.add_line(ContentLine::new("UID", uid));
        event
    }

    #[test]
    fn accessors_are_case_insensitive() {
        let mut cal = Component::new("VCALENDAR");
        cal.add_line(ContentLine::new("VERSION", "2.0"));
        cal.add_component(event("a"));
        cal.add_component(event("b"));

        assert_eq!(cal.components_named("VEvent").count(), 2);
        assert_eq!(cal.line("version").and_then(ContentLine::raw), Some("2.0"));
        assert!(cal.component("VTODO").is_none());
    }

    #[test]
    fn remove_line_at_counts_per_name() {
        let mut comp = Component::new("VEVENT");
        comp.add_line(ContentLine::new("ATTENDEE", "a"));
        comp.add_line(ContentLine::new("SUMMARY", "s"));
        comp.add_line(ContentLine::new("ATTENDEE", "b"));

        let removed = comp.remove_line_at("attendee", 1).unwrap();
        assert_eq!(removed.raw(), Some("b"));
        assert_eq!(comp.lines().len(), 2);
        assert_eq!(comp.remove_lines("ATTENDEE").len(), 1);
        assert_eq!(comp.lines().len(), 1);
    }

    #[test]
    fn reorder_is_stable() {
        let mut comp = Component::new("VEVENT");
        for name in ["SUMMARY", "DTSTART", "X-A", "UID", "X-B"] {
            comp.add_line(ContentLine::new(name, ""));
        }
        comp.reorder(&["uid", "dtstart"]);
        let names: Vec<_> = comp.lines().iter().map(ContentLine::name).collect();
        assert_eq!(names, ["UID", "DTSTART", "SUMMARY", "X-A", "X-B"]);
    }

    #[test]
    fn descendants_walks_pre_order() {
        let mut cal = Component::new("VCALENDAR");
        let ev = cal.add_component(event("a"));
        ev.add_component(Component::new("VALARM"));
        cal.add_component(Component::new("VTODO"));

        let names: Vec<_> = cal.descendants().map(Component::name).collect();
        assert_eq!(names, ["VCALENDAR", "VEVENT", "VALARM", "VTODO"]);
    }
}
