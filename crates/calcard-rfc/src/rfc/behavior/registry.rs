//! Name → behavior tables and the process-wide registry.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use super::Behavior;
use crate::rfc::core::{Component, ContentLine, Value};
use crate::rfc::{ical, vcard};

static GLOBAL: LazyLock<RwLock<Arc<BehaviorRegistry>>> =
    LazyLock::new(|| RwLock::new(Arc::new(BehaviorRegistry::standard())));

/// Upper-case name → behavior, kept separately for components and
/// properties, with a fallback for each kind.
///
/// A property can also be registered for one parent component; inside that
/// parent it shadows the bare registration.
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    components: HashMap<String, Arc<Behavior>>,
    properties: HashMap<String, Arc<Behavior>>,
    scoped: HashMap<(String, String), Arc<Behavior>>,
    unknown_component: Arc<Behavior>,
    unknown_property: Arc<Behavior>,
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl BehaviorRegistry {
    /// A registry where every name gets the fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            components: HashMap::new(),
            properties: HashMap::new(),
            scoped: HashMap::new(),
            unknown_component: Arc::new(Behavior::fallback(true)),
            unknown_property: Arc::new(Behavior::fallback(false)),
        }
    }

    /// All built-in iCalendar and vCard behaviors.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        ical::behaviors::register(&mut registry);
        vcard::behaviors::register(&mut registry);
        registry
    }

    /// Adds or replaces a behavior, returning the one it replaced.
    pub fn register(&mut self, behavior: Behavior) -> Option<Arc<Behavior>> {
        let table = if behavior.is_component() {
            &mut self.components
        } else {
            &mut self.properties
        };
        table.insert(behavior.name().to_string(), Arc::new(behavior))
    }

    /// Adds or replaces a property behavior that applies only to lines
    /// directly inside `parent`.
    pub fn register_in(&mut self, parent: &str, behavior: Behavior) -> Option<Arc<Behavior>> {
        let key = (parent.to_ascii_uppercase(), behavior.name().to_string());
        self.scoped.insert(key, Arc::new(behavior))
    }

    /// Component behavior for `name`, or the component fallback.
    #[must_use]
    pub fn component(&self, name: &str) -> Arc<Behavior> {
        self.components
            .get(&name.to_ascii_uppercase())
            .map_or_else(|| Arc::clone(&self.unknown_component), Arc::clone)
    }

    /// Property behavior for `name`, or the property fallback.
    #[must_use]
    pub fn property(&self, name: &str) -> Arc<Behavior> {
        self.properties
            .get(&name.to_ascii_uppercase())
            .map_or_else(|| Arc::clone(&self.unknown_property), Arc::clone)
    }

    /// Property behavior for `name` inside `parent`: the scoped
    /// registration, then the bare one, then the property fallback.
    #[must_use]
    pub fn property_in(&self, parent: &str, name: &str) -> Arc<Behavior> {
        let key = (parent.to_ascii_uppercase(), name.to_ascii_uppercase());
        self.scoped
            .get(&key)
            .map_or_else(|| self.property(name), Arc::clone)
    }

    /// Kind-agnostic lookup. A component registration wins over a property
    /// registration of the same name; unknown names get the property
    /// fallback.
    #[must_use]
    pub fn get(&self, name: &str) -> Arc<Behavior> {
        let key = name.to_ascii_uppercase();
        self.components
            .get(&key)
            .or_else(|| self.properties.get(&key))
            .map_or_else(|| Arc::clone(&self.unknown_property), Arc::clone)
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        let key = name.to_ascii_uppercase();
        self.components.contains_key(&key)
            || self.properties.contains_key(&key)
            || self.scoped.keys().any(|(_, scoped)| *scoped == key)
    }

    /// An empty component already bound to its behavior.
    #[must_use]
    pub fn new_component(&self, name: &str) -> Component {
        let mut component = Component::new(name);
        component.set_behavior(self.component(name));
        component
    }

    /// A line already bound to its behavior and holding a native value.
    #[must_use]
    pub fn new_line(&self, name: &str, value: Value) -> ContentLine {
        let mut line = ContentLine::with_value(name, value);
        line.set_behavior(self.property(name));
        line
    }

    /// A snapshot of the process-wide registry.
    ///
    /// The snapshot never changes; later [`Self::register_global`] calls are
    /// seen only by later snapshots.
    #[must_use]
    pub fn global() -> Arc<Self> {
        let guard = GLOBAL.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Adds a behavior to the process-wide registry.
    ///
    /// Register before parsing: documents already being parsed keep the
    /// snapshot they started with.
    pub fn register_global(behavior: Behavior) {
        let mut guard = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Self::clone(&guard);
        debug!(name = behavior.name(), "registering global behavior");
        next.register(behavior);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::behavior::transcoder;
    use crate::rfc::core::ValueType;

    #[test]
    fn unknown_names_get_fallbacks() {
        let registry = BehaviorRegistry::standard();
        assert!(registry.property("X-WR-CALNAME").is_fallback());
        assert!(registry.component("X-THING").is_fallback());
        assert!(registry.component("X-THING").is_component());
        assert!(!registry.is_registered("X-WR-CALNAME"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = BehaviorRegistry::standard();
        assert_eq!(registry.component("vevent").name(), "VEVENT");
        assert_eq!(
            registry
                .property("dtstart")
                .transcoder()
                .map(|t| t.value_type()),
            Some(ValueType::DateTime)
        );
    }

    #[test]
    fn component_wins_in_kind_agnostic_lookup() {
        let mut registry = BehaviorRegistry::empty();
        registry.register(Behavior::property("X-BOTH", transcoder::TEXT));
        registry.register(Behavior::component("X-BOTH").with_sort_first(&["UID"]));

        assert!(registry.get("x-both").is_component());
        assert!(!registry.property("X-BOTH").is_component());
    }

    #[test]
    fn scoped_properties_shadow_bare_ones() {
        let mut registry = BehaviorRegistry::empty();
        registry.register(Behavior::property("X-LEVEL", transcoder::TEXT));
        registry.register_in("vcard", Behavior::property("X-LEVEL", transcoder::INTEGER));

        let codec = |parent: &str| {
            registry
                .property_in(parent, "x-level")
                .transcoder()
                .map(|t| t.value_type())
        };
        assert_eq!(codec("VCARD"), Some(ValueType::Integer));
        assert_eq!(codec("VEVENT"), Some(ValueType::Text));
        assert!(registry.property_in("VCARD", "X-OTHER").is_fallback());
    }

    #[test]
    fn scoped_only_names_count_as_registered() {
        let registry = BehaviorRegistry::standard();
        assert!(registry.is_registered("TZ"));
        assert!(registry.property("TZ").is_fallback());
        assert!(!registry.property_in("VCARD", "TZ").is_fallback());
    }

    #[test]
    fn register_replaces() {
        let mut registry = BehaviorRegistry::empty();
        assert!(registry.register(Behavior::property("X-A", transcoder::TEXT)).is_none());
        let old = registry.register(Behavior::property("X-A", transcoder::INTEGER));
        assert!(old.is_some());
        assert_eq!(
            registry.property("X-A").transcoder().map(|t| t.value_type()),
            Some(ValueType::Integer)
        );
    }

    #[test]
    fn new_line_is_bound() {
        let registry = BehaviorRegistry::standard();
        let line = registry.new_line("PRIORITY", Value::Integer(1));
        assert_eq!(line.behavior().map(Behavior::name), Some("PRIORITY"));
        assert_eq!(line.encoded_value(), "1");

        let event = registry.new_component("VEVENT");
        assert_eq!(event.behavior().map(Behavior::name), Some("VEVENT"));
    }

    #[test]
    fn snapshots_are_stable() {
        let before = BehaviorRegistry::global();
        BehaviorRegistry::register_global(Behavior::property(
            "X-CALCARD-SNAPSHOT-TEST",
            transcoder::INTEGER,
        ));
        let after = BehaviorRegistry::global();

        assert!(!before.is_registered("X-CALCARD-SNAPSHOT-TEST"));
        assert!(after.is_registered("X-CALCARD-SNAPSHOT-TEST"));
    }
}
