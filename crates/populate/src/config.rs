use std::collections::BTreeSet;

use crate::detect::OutputMode;

/// Immutable per-invocation configuration.
#[derive(Clone, Debug)]
pub struct PopulateConfig {
    /// Rewrite CDATA sections around style/script payloads into the
    /// browser-safe comment-wrapped form (XHTML output only).
    pub cdata_fix: bool,
    /// Class token appended to controls that failed validation, and to their
    /// labels.
    pub error_class: String,
    /// Serialization dialect; `Auto` detects from the doctype.
    pub force_output_mode: OutputMode,
    /// Repopulate `<input type="hidden">` controls.
    pub include_hidden_inputs: bool,
    /// Echo submitted passwords back into `<input type="password">`.
    /// Off by default; never enable this lightly.
    pub include_password_inputs: bool,
    /// Strip the serializer-introduced XML prolog when the original document
    /// carried none (XHTML output only).
    pub remove_xml_prolog: bool,
    /// Request methods that trigger population when no explicit override is
    /// set on the request.
    pub methods: BTreeSet<String>,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            cdata_fix: true,
            error_class: "error".to_string(),
            force_output_mode: OutputMode::Auto,
            include_hidden_inputs: true,
            include_password_inputs: false,
            remove_xml_prolog: true,
            methods: BTreeSet::from(["POST".to_string()]),
        }
    }
}
