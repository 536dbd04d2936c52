use crate::types::{Node, Token};

/// Builds a document tree from a token stream. Never fails: unmatched end
/// tags pop the open-element stack until a case-insensitive name match (or
/// discard silently), and content outside any element lands on the document.
pub fn build_dom(tokens: &[Token]) -> Node {
    let mut arena = NodeArena::new();
    let root_index = arena.push(ArenaNode::Document {
        doctype: None,
        children: Vec::new(),
    });

    let mut open_elements: Vec<usize> = Vec::new();

    for token in tokens {
        match token {
            Token::Doctype(s) => {
                arena.set_doctype(root_index, s.clone());
            }
            Token::Comment(c) => {
                let parent_index = open_elements.last().copied().unwrap_or(root_index);
                arena.add_child(parent_index, ArenaNode::Comment { text: c.clone() });
            }
            Token::Text(txt) => {
                if !txt.is_empty() {
                    let parent_index = open_elements.last().copied().unwrap_or(root_index);
                    arena.add_child(parent_index, ArenaNode::Text { text: txt.clone() });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let parent_index = open_elements.last().copied().unwrap_or(root_index);
                let new_index = arena.add_child(
                    parent_index,
                    ArenaNode::Element {
                        name: name.clone(),
                        attributes: attributes.clone(),
                        children: Vec::new(),
                    },
                );
                if !*self_closing {
                    open_elements.push(new_index);
                }
            }
            Token::EndTag(name) => {
                // Only unwind if the tag is actually open; a stray end tag
                // must not close unrelated ancestors.
                if open_elements
                    .iter()
                    .any(|&idx| arena.is_element_named(idx, name))
                {
                    while let Some(open_index) = open_elements.pop() {
                        if arena.is_element_named(open_index, name) {
                            break;
                        }
                    }
                }
            }
        }
    }

    arena.into_dom(root_index)
}

#[derive(Debug)]
enum ArenaNode {
    Document {
        doctype: Option<String>,
        children: Vec<usize>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl ArenaNode {
    fn children(&self) -> Option<&[usize]> {
        match self {
            ArenaNode::Document { children, .. } | ArenaNode::Element { children, .. } => {
                Some(children)
            }
            ArenaNode::Text { .. } | ArenaNode::Comment { .. } => None,
        }
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, child: ArenaNode) -> usize {
        let child_index = self.push(child);
        match &mut self.nodes[parent_index] {
            ArenaNode::Document { children, .. } | ArenaNode::Element { children, .. } => {
                children.push(child_index);
            }
            _ => unreachable!("dom builder parent cannot have children"),
        }
        child_index
    }

    fn set_doctype(&mut self, root_index: usize, doctype: String) {
        let ArenaNode::Document { doctype: dt, .. } = &mut self.nodes[root_index] else {
            unreachable!("dom builder root is always a document node");
        };
        if dt.is_none() {
            *dt = Some(doctype);
        }
    }

    fn is_element_named(&self, node_index: usize, target: &str) -> bool {
        match &self.nodes[node_index] {
            ArenaNode::Element { name, .. } => name.eq_ignore_ascii_case(target),
            _ => false,
        }
    }

    fn into_dom(self, root_index: usize) -> Node {
        let mut nodes = self.nodes;
        let mut built_nodes: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let mut children = Vec::with_capacity(n);
            for _ in 0..n {
                children.push(built.pop().expect("dom builder child built"));
            }
            children.reverse();
            children
        }

        // Iterative postorder traversal over the arena: when a node is seen
        // the second time, its direct children are the last `child_count`
        // entries on `built_nodes`, in original order.
        let mut stack: Vec<(usize, bool)> = Vec::new();
        stack.push((root_index, false));

        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                // Children pushed in reverse so they are visited in original
                // order and land on `built_nodes` in original order.
                if let Some(children) = nodes[node_index].children() {
                    for &child_index in children.iter().rev() {
                        stack.push((child_index, false));
                    }
                }
                continue;
            }

            let node = match &mut nodes[node_index] {
                ArenaNode::Document { doctype, children } => {
                    let child_count = children.len();
                    children.clear();
                    Node::Document {
                        doctype: doctype.take(),
                        children: take_children(child_count, &mut built_nodes),
                    }
                }
                ArenaNode::Element {
                    name,
                    attributes,
                    children,
                } => {
                    let child_count = children.len();
                    children.clear();
                    Node::Element {
                        name: std::mem::take(name),
                        attributes: std::mem::take(attributes),
                        children: take_children(child_count, &mut built_nodes),
                    }
                }
                ArenaNode::Text { text } => Node::Text {
                    text: std::mem::take(text),
                },
                ArenaNode::Comment { text } => Node::Comment {
                    text: std::mem::take(text),
                },
            };

            built_nodes.push(node);
        }

        debug_assert_eq!(built_nodes.len(), 1, "exactly one root node");
        built_nodes.pop().expect("dom builder root built")
    }
}
