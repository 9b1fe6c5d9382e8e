//! Binds behaviors to a built tree and decodes its values.

use tracing::trace;

use super::{BehaviorRegistry, DecodeContext, TranscodeError};
use crate::rfc::core::Component;

/// ## Summary
/// Walks the tree once, children before parents, binding every component
/// and line to its behavior and, when `transcode` is set, decoding every
/// raw value.
///
/// Containers stay behaviorless. A value that fails to decode keeps its raw
/// text and records the error on its line; the walk carries on.
///
/// Returns every decode failure, ordered by source line.
pub fn behaviorize(
    component: &mut Component,
    registry: &BehaviorRegistry,
    ctx: &DecodeContext<'_>,
    transcode: bool,
) -> Vec<TranscodeError> {
    let mut errors = Vec::new();
    bind(component, registry, ctx, transcode, &mut errors);
    errors.sort_by_key(|err| err.line);
    errors
}

fn bind(
    component: &mut Component,
    registry: &BehaviorRegistry,
    ctx: &DecodeContext<'_>,
    transcode: bool,
    errors: &mut Vec<TranscodeError>,
) {
    for child in component.components_mut() {
        bind(child, registry, ctx, transcode, errors);
    }

    if !component.is_container() {
        component.set_behavior(registry.component(component.name()));
    }

    let parent = component.name().to_string();
    for line in component.lines_mut() {
        line.set_behavior(registry.property_in(&parent, line.name()));
        if !transcode {
            continue;
        }
        if let Err(err) = line.transcode(ctx) {
            trace!(error = %err, "keeping raw value");
            errors.push(err);
        }
    }
}
