#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// Attribute values are tri-state: not in the list (absent), `None` (declared
/// without a value, e.g. `<input disabled>`), or `Some(value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document {
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn is_element_named(&self, target: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(target))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn doctype(&self) -> Option<&str> {
        match self {
            Node::Document { doctype, .. } => doctype.as_deref(),
            _ => None,
        }
    }

    /// Outer `Option`: is the attribute declared at all.
    /// Inner `Option`: does the declaration carry a value.
    pub fn attr(&self, key: &str) -> Option<Option<&str>> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_deref()),
            _ => None,
        }
    }

    /// Declared attribute value, with a valueless declaration read as "".
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).map(|v| v.unwrap_or(""))
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    pub fn remove_attr(&mut self, key: &str) {
        if let Node::Element { attributes, .. } = self {
            attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        }
    }

    /// Updates an existing declaration in place (keeping attribute order
    /// stable) or appends a new one.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        if let Node::Element { attributes, .. } = self {
            if let Some(slot) = attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                slot.1 = Some(value.to_string());
            } else {
                attributes.push((key.to_string(), Some(value.to_string())));
            }
        }
    }
}
