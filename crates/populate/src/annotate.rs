//! Validation-state annotation: class tokens on invalid controls and their
//! associated labels.

use markup::Node;

/// Appends a class token to the element's `class` attribute. Tokens
/// accumulate across repeated runs; callers assert presence, not count.
pub(crate) fn append_class(node: &mut Node, class: &str) {
    let existing = node.attr_str("class").unwrap_or("").to_string();
    if existing.is_empty() {
        node.set_attr("class", class);
    } else {
        node.set_attr("class", &format!("{existing} {class}"));
    }
}

/// A label associated by nesting rather than by `for`/`id` pairing.
pub(crate) fn is_implicit_label(node: &Node) -> bool {
    node.is_element_named("label") && !node.has_attr("for")
}

/// Flags every `<label for=ID>` in the subtree whose target is one of the
/// invalid controls' ids.
pub(crate) fn flag_explicit_labels(node: &mut Node, ids: &[String], class: &str) {
    if node.is_element_named("label") {
        let hit = node
            .attr_str("for")
            .is_some_and(|target| ids.iter().any(|id| id == target));
        if hit {
            append_class(node, class);
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            flag_explicit_labels(child, ids, class);
        }
    }
}
