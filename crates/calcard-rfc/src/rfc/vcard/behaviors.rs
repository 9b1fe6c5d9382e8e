//! Built-in vCard behaviors.
//!
//! Version 3.0 semantics; 2.1 and 4.0 cards parse with the same table.

use calcard_core::constants::VCARD_VERSION;

use crate::rfc::behavior::transcoder::{BINARY, STRUCTURED, TEXT_LIST, UTC_OFFSET, VCARD_TEXT};
use crate::rfc::behavior::{Behavior, BehaviorRegistry, ValueTranscoder};
use crate::rfc::core::{Component, ContentLine};

/// Registers the VCARD component and its typed properties, scoped to VCARD.
pub fn register(registry: &mut BehaviorRegistry) {
    registry.register(
        Behavior::component("VCARD")
            .with_sort_first(&["VERSION", "PRODID", "UID"])
            .with_child("FN", 1, None)
            .with_child("VERSION", 1, Some(1))
            .with_optional_once(&["N", "PRODID"])
            .allow_group()
            .with_implicit_lines(card_implicit_lines),
    );

    let scoped: [(&[&str], &'static dyn ValueTranscoder); 5] = [
        (&["FN", "LABEL", "NOTE", "TITLE", "ROLE"], VCARD_TEXT),
        (&["PHOTO", "LOGO"], BINARY),
        (&["N", "ADR", "ORG"], STRUCTURED),
        (&["CATEGORIES", "NICKNAME"], TEXT_LIST),
        (&["TZ"], UTC_OFFSET),
    ];
    for (names, codec) in scoped {
        for name in names {
            registry.register_in("VCARD", Behavior::property(name, codec));
        }
    }
}

fn card_implicit_lines(component: &Component) -> Vec<ContentLine> {
    if component.line("VERSION").is_some() {
        Vec::new()
    } else {
        vec![ContentLine::new("VERSION", VCARD_VERSION)]
    }
}
