//! Behaviors: per-name rules for components and properties.
//!
//! A [`Behavior`] says how a named node is decoded, ordered and checked.
//! Behaviors live in a [`BehaviorRegistry`]; names nobody registered get a
//! permissive fallback, so unknown and `X-` content always parses.

mod behaviorize;
mod error;
mod registry;
pub mod transcoder;
mod validate;

pub use behaviorize::behaviorize;
pub use error::{TranscodeError, TranscodeErrorKind, ValidationError};
pub use registry::BehaviorRegistry;
pub use transcoder::{DecodeContext, ValueTranscoder};
pub use validate::{validate, validation_errors};

use crate::rfc::core::{Component, ContentLine};

/// Extra structural checks run by [`validate`].
pub type CheckHook = fn(&Component) -> Vec<ValidationError>;

/// Lines a component implies when they are missing, added on output when
/// implicit lines are enabled.
pub type ImplicitLinesHook = fn(&Component) -> Vec<ContentLine>;

/// Child components a component implies, such as the VTIMEZONEs its
/// TZID parameters refer to.
pub type ImplicitComponentsHook = fn(&Component) -> Vec<Component>;

/// Cardinality of a named child (property or component).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRule {
    pub name: String,
    pub min: usize,
    /// `None` means unbounded.
    pub max: Option<usize>,
}

impl ChildRule {
    #[must_use]
    pub fn new(name: impl Into<String>, min: usize, max: Option<usize>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            min,
            max,
        }
    }
}

/// Descriptor for one component or property name.
///
/// Immutable once registered; shared as `Arc<Behavior>` by every node bound
/// to it.
#[derive(Debug, Clone)]
pub struct Behavior {
    name: String,
    is_component: bool,
    sort_first: Vec<String>,
    transcoder: Option<&'static dyn ValueTranscoder>,
    singleton: bool,
    known_children: Vec<ChildRule>,
    allow_group: bool,
    check: Option<CheckHook>,
    implicit_lines: Option<ImplicitLinesHook>,
    implicit_components: Option<ImplicitComponentsHook>,
}

impl Behavior {
    fn new(name: &str, is_component: bool) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            is_component,
            sort_first: Vec::new(),
            transcoder: None,
            singleton: false,
            known_children: Vec::new(),
            allow_group: false,
            check: None,
            implicit_lines: None,
            implicit_components: None,
        }
    }

    #[must_use]
    pub fn component(name: &str) -> Self {
        Self::new(name, true)
    }

    #[must_use]
    pub fn property(name: &str, transcoder: &'static dyn ValueTranscoder) -> Self {
        let mut behavior = Self::new(name, false);
        behavior.transcoder = Some(transcoder);
        behavior
    }

    /// The behavior given to names nobody registered.
    pub(crate) fn fallback(is_component: bool) -> Self {
        let mut behavior = Self::new("", is_component);
        if !is_component {
            behavior.transcoder = Some(transcoder::OPAQUE);
        }
        behavior.allow_group = true;
        behavior
    }

    /// Children named here are serialized first, in this order.
    #[must_use]
    pub fn with_sort_first(mut self, names: &[&str]) -> Self {
        self.sort_first = names.iter().map(|n| n.to_ascii_uppercase()).collect();
        self
    }

    #[must_use]
    pub fn with_child(mut self, name: &str, min: usize, max: Option<usize>) -> Self {
        self.known_children.push(ChildRule::new(name, min, max));
        self
    }

    /// Declares several children allowed at most once.
    #[must_use]
    pub fn with_optional_once(mut self, names: &[&str]) -> Self {
        for name in names {
            self.known_children.push(ChildRule::new(*name, 0, Some(1)));
        }
        self
    }

    /// Declares several children allowed any number of times.
    #[must_use]
    pub fn with_repeatable(mut self, names: &[&str]) -> Self {
        for name in names {
            self.known_children.push(ChildRule::new(*name, 0, None));
        }
        self
    }

    /// The property may appear only once per component.
    #[must_use]
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// Lines (and, for components, their children) may carry a group prefix.
    #[must_use]
    pub fn allow_group(mut self) -> Self {
        self.allow_group = true;
        self
    }

    #[must_use]
    pub fn with_check(mut self, hook: CheckHook) -> Self {
        self.check = Some(hook);
        self
    }

    #[must_use]
    pub fn with_implicit_lines(mut self, hook: ImplicitLinesHook) -> Self {
        self.implicit_lines = Some(hook);
        self
    }

    #[must_use]
    pub fn with_implicit_components(mut self, hook: ImplicitComponentsHook) -> Self {
        self.implicit_components = Some(hook);
        self
    }

    /// Upper-cased name; empty for the fallback.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_component(&self) -> bool {
        self.is_component
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.name.is_empty()
    }

    #[must_use]
    pub fn sort_first(&self) -> &[String] {
        &self.sort_first
    }

    /// Position of `name` in the sort-first list.
    #[must_use]
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.sort_first
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn transcoder(&self) -> Option<&'static dyn ValueTranscoder> {
        self.transcoder
    }

    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    #[must_use]
    pub fn known_children(&self) -> &[ChildRule] {
        &self.known_children
    }

    #[must_use]
    pub fn child_rule(&self, name: &str) -> Option<&ChildRule> {
        self.known_children
            .iter()
            .find(|rule| rule.name.eq_ignore_ascii_case(name))
    }

    /// Rules for children that must appear at least once.
    pub fn required_children(&self) -> impl Iterator<Item = &ChildRule> {
        self.known_children.iter().filter(|rule| rule.min > 0)
    }

    #[must_use]
    pub fn allows_group(&self) -> bool {
        self.allow_group
    }

    #[must_use]
    pub fn check_hook(&self) -> Option<CheckHook> {
        self.check
    }

    #[must_use]
    pub fn implicit_lines_hook(&self) -> Option<ImplicitLinesHook> {
        self.implicit_lines
    }

    #[must_use]
    pub fn implicit_components_hook(&self) -> Option<ImplicitComponentsHook> {
        self.implicit_components
    }
}
