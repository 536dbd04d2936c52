use std::collections::{BTreeMap, BTreeSet};

/// Everything the engine reads about the current request. Passed explicitly;
/// the engine has no ambient access to server state.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    /// Submitted parameters. Names containing `[]` use auto-generated
    /// indices and are never used for repopulation.
    pub params: BTreeMap<String, String>,
    /// Field names flagged invalid by validation.
    pub invalid_fields: BTreeSet<String>,
    /// `Some(true)` forces population, `Some(false)` suppresses it, `None`
    /// leaves the decision to the configured method set.
    pub populate_override: Option<bool>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn is_invalid(&self, name: &str) -> bool {
        self.invalid_fields.contains(name)
    }
}
