//! Explicit structural validation.

use std::collections::BTreeMap;

use super::{Behavior, BehaviorRegistry, ValidationError};
use crate::error::{RfcError, RfcResult};
use crate::rfc::core::Component;

/// ## Summary
/// Checks the whole tree against its behaviors.
///
/// Nodes not yet bound are checked against the global registry.
///
/// ## Errors
/// Returns [`RfcError::Validation`] listing every violation found.
pub fn validate(component: &Component) -> RfcResult<()> {
    let errors = validation_errors(component);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RfcError::Validation(errors))
    }
}

/// Every violation in the tree, parents before children.
#[must_use]
pub fn validation_errors(component: &Component) -> Vec<ValidationError> {
    let registry = BehaviorRegistry::global();
    let mut errors = Vec::new();
    for node in component.descendants() {
        if node.is_container() {
            continue;
        }
        check_component(node, &registry, &mut errors);
    }
    errors
}

fn check_component(
    component: &Component,
    registry: &BehaviorRegistry,
    errors: &mut Vec<ValidationError>,
) {
    let name = component.name();
    let registered = registry.component(name);
    let behavior = component.behavior().unwrap_or(registered.as_ref());

    // Occurrences per child name, with the source line of each.
    let mut seen: BTreeMap<String, Vec<Option<usize>>> = BTreeMap::new();
    for line in component.lines() {
        seen.entry(line.name().to_string())
            .or_default()
            .push(line.line_number());
    }
    for child in component.components() {
        seen.entry(child.name().to_string())
            .or_default()
            .push(child.line_number());
    }

    let count = |child: &str| seen.get(child).map_or(&[][..], Vec::as_slice);
    for rule in behavior.required_children() {
        if count(&rule.name).len() < rule.min {
            errors.push(ValidationError::MissingRequired {
                component: name.to_string(),
                child: rule.name.clone(),
                line: component.line_number(),
            });
        }
    }
    for rule in behavior.known_children() {
        let found = count(&rule.name);
        if let Some(max) = rule.max
            && found.len() > max
        {
            errors.push(ValidationError::TooMany {
                component: name.to_string(),
                child: rule.name.clone(),
                found: found.len(),
                max,
                line: found.get(max).copied().flatten(),
            });
        }
    }

    for (child, found) in &seen {
        let singleton = component.line(child).is_some_and(|line| {
            line.behavior().map_or_else(
                || registry.property_in(name, child).is_singleton(),
                Behavior::is_singleton,
            )
        });
        if singleton && found.len() > 1 && behavior.child_rule(child).is_none() {
            errors.push(ValidationError::TooMany {
                component: name.to_string(),
                child: child.clone(),
                found: found.len(),
                max: 1,
                line: found.get(1).copied().flatten(),
            });
        }
    }

    if !behavior.known_children().is_empty() {
        for child in component.components() {
            let extension = child.name().starts_with("X-");
            if !extension && behavior.child_rule(child.name()).is_none() {
                errors.push(ValidationError::DisallowedNesting {
                    component: name.to_string(),
                    child: child.name().to_string(),
                    line: child.line_number(),
                });
            }
        }
    }

    if !behavior.allows_group() {
        for line in component.lines().iter().filter(|l| l.group().is_some()) {
            let allowed = line.behavior().map_or_else(
                || registry.property_in(name, line.name()).allows_group(),
                Behavior::allows_group,
            );
            if !allowed {
                errors.push(ValidationError::GroupNotAllowed {
                    component: name.to_string(),
                    child: line.name().to_string(),
                    line: line.line_number(),
                });
            }
        }
    }

    if let Some(check) = behavior.check_hook() {
        errors.extend(check(component));
    }
}
