//! Per-control repopulation semantics.

use log::trace;
use markup::Node;

use crate::annotate;
use crate::config::PopulateConfig;
use crate::request::RequestContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControlKind {
    TextLike,
    Checkbox,
    Radio,
    Password,
    Hidden,
    Select,
    Textarea,
}

fn classify(node: &Node, config: &PopulateConfig) -> Option<ControlKind> {
    if node.is_element_named("select") {
        return Some(ControlKind::Select);
    }
    if node.is_element_named("textarea") {
        return Some(ControlKind::Textarea);
    }
    if !node.is_element_named("input") {
        return None;
    }
    match node.attr_str("type") {
        None => Some(ControlKind::TextLike),
        Some(t) if t.eq_ignore_ascii_case("text") => Some(ControlKind::TextLike),
        Some(t) if t.eq_ignore_ascii_case("checkbox") => Some(ControlKind::Checkbox),
        Some(t) if t.eq_ignore_ascii_case("radio") => Some(ControlKind::Radio),
        Some(t) if t.eq_ignore_ascii_case("password") => Some(ControlKind::Password),
        Some(t) if t.eq_ignore_ascii_case("hidden") && config.include_hidden_inputs => {
            Some(ControlKind::Hidden)
        }
        Some(_) => None,
    }
}

/// Repopulates and annotates every eligible control inside one matched form.
/// Returns whether the form holds an invalid control, so the caller can flag
/// implicit labels that enclose the form itself.
pub(crate) fn repopulate_form(
    form: &mut Node,
    ctx: &RequestContext,
    config: &PopulateConfig,
) -> bool {
    let mut invalid_ids = Vec::new();
    let form_invalid = walk(form, ctx, config, &mut invalid_ids);
    if !invalid_ids.is_empty() {
        annotate::flag_explicit_labels(form, &invalid_ids, &config.error_class);
    }
    form_invalid
}

// Returns whether the subtree holds an invalid control, so enclosing
// implicit labels can be flagged on the way back up.
fn walk(
    node: &mut Node,
    ctx: &RequestContext,
    config: &PopulateConfig,
    invalid_ids: &mut Vec<String>,
) -> bool {
    let mut subtree_invalid = false;

    if let Some(kind) = classify(node, config) {
        // Names with auto-generated `[]` indices cannot be matched
        // deterministically; leave those controls untouched.
        let name = node.attr_str("name").map(str::to_string);
        if let Some(name) = name.filter(|n| !n.contains("[]")) {
            if ctx.is_invalid(&name) {
                annotate::append_class(node, &config.error_class);
                if let Some(id) = node.attr_str("id") {
                    if !id.is_empty() {
                        invalid_ids.push(id.to_string());
                    }
                }
                subtree_invalid = true;
            }
            apply(kind, node, &name, ctx, config);
        }
    }

    if let Some(children) = node.children_mut() {
        for child in children {
            subtree_invalid |= walk(child, ctx, config, invalid_ids);
        }
    }

    if subtree_invalid && annotate::is_implicit_label(node) {
        annotate::append_class(node, &config.error_class);
    }
    subtree_invalid
}

fn apply(
    kind: ControlKind,
    node: &mut Node,
    name: &str,
    ctx: &RequestContext,
    config: &PopulateConfig,
) {
    trace!("repopulating {kind:?} control {name:?}");
    match kind {
        ControlKind::TextLike | ControlKind::Hidden => {
            // Overwrite, not merge: an absent submission clears any
            // template-provided default.
            node.remove_attr("value");
            if let Some(value) = ctx.param(name) {
                node.set_attr("value", value);
            }
        }
        ControlKind::Password => {
            node.remove_attr("value");
            if config.include_password_inputs {
                if let Some(value) = ctx.param(name) {
                    node.set_attr("value", value);
                }
            }
        }
        ControlKind::Checkbox | ControlKind::Radio => {
            node.remove_attr("checked");
            if let Some(submitted) = ctx.param(name) {
                // A control without a value attribute has boolean-true
                // semantics: presence of the parameter checks it.
                let on = match node.attr("value") {
                    None => true,
                    Some(declared) => declared.unwrap_or("") == submitted,
                };
                if on {
                    node.set_attr("checked", "checked");
                }
            }
        }
        ControlKind::Select => {
            let submitted = ctx.param(name).map(str::to_string);
            if let Some(children) = node.children_mut() {
                for child in children {
                    reselect_options(child, submitted.as_deref());
                }
            }
        }
        ControlKind::Textarea => {
            if let Some(children) = node.children_mut() {
                children.clear();
                if let Some(value) = ctx.param(name) {
                    if !value.is_empty() {
                        children.push(Node::Text {
                            text: value.to_string(),
                        });
                    }
                }
            }
        }
    }
}

// Options can sit inside optgroups; recurse through the whole select body.
fn reselect_options(node: &mut Node, submitted: Option<&str>) {
    if node.is_element_named("option") {
        node.remove_attr("selected");
        if let Some(submitted) = submitted {
            if node.attr_str("value").unwrap_or("") == submitted {
                node.set_attr("selected", "selected");
            }
        }
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            reselect_options(child, submitted);
        }
    }
}
