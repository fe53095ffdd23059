//! A small owned HTML tree.
//!
//! Markup is parsed leniently with `scraper` (html5ever underneath), then
//! copied into plain `Node` values so it can be edited structurally and
//! written back out.

use ego_tree::NodeRef;
use scraper::Html;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text children are written without escaping. The parser
/// runs with scripting enabled, so `noscript` content is raw text too.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Location of a node as child indexes from the fragment root.
pub type NodePath = Vec<usize>;

/// A parsed markup fragment: the top-level nodes of a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub children: Vec<Node>,
}

impl Fragment {
    /// Parse markup as body content. Never fails: unclosed or stray tags are
    /// repaired the way a browser would.
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_fragment(markup);
        let children = html
            .root_element()
            .children()
            .filter_map(convert)
            .collect();
        Self { children }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            write_node(node, None, &mut out);
        }
        out
    }

    /// Paths of every element named `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        find_in(&self.children, tag, &mut path, &mut found);
        found
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut element = match self.children.get(*first)? {
            Node::Element(el) => el,
            Node::Text(_) => return None,
        };
        for &index in rest {
            element = match element.children.get(index)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(element)
    }

    /// Insert `node` as the preceding sibling of the node at `path`.
    /// Returns false if the path does not resolve.
    pub fn insert_before(&mut self, path: &[usize], node: Node) -> bool {
        let Some((&index, parent_path)) = path.split_last() else {
            return false;
        };
        match self.children_at_mut(parent_path) {
            Some(siblings) if index <= siblings.len() => {
                siblings.insert(index, node);
                true
            }
            _ => false,
        }
    }

    /// Remove every element named `tag` (with its subtree). Returns how many
    /// were removed.
    pub fn remove_all(&mut self, tag: &str) -> usize {
        remove_in(&mut self.children, tag)
    }

    fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut children = &mut self.children;
        for &index in path {
            children = match children.get_mut(index)? {
                Node::Element(el) => &mut el.children,
                Node::Text(_) => return None,
            };
        }
        Some(children)
    }
}

fn convert(node: NodeRef<'_, scraper::Node>) -> Option<Node> {
    match node.value() {
        scraper::Node::Text(text) => Some(Node::Text(text.to_string())),
        scraper::Node::Element(el) => Some(Node::Element(Element {
            tag: el.name().to_string(),
            attrs: el
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children: node.children().filter_map(convert).collect(),
        })),
        // comments, doctypes and processing instructions are dropped
        _ => None,
    }
}

fn find_in(nodes: &[Node], tag: &str, path: &mut NodePath, found: &mut Vec<NodePath>) {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            path.push(index);
            if el.tag == tag {
                found.push(path.clone());
            }
            find_in(&el.children, tag, path, found);
            path.pop();
        }
    }
}

fn remove_in(nodes: &mut Vec<Node>, tag: &str) -> usize {
    let before = nodes.len();
    nodes.retain(|node| !matches!(node, Node::Element(el) if el.tag == tag));
    let mut removed = before - nodes.len();
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            removed += remove_in(&mut el.children, tag);
        }
    }
    removed
}

fn write_node(node: &Node, parent: Option<&str>, out: &mut String) {
    match node {
        Node::Text(text) => {
            if parent.is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag)) {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            for child in &el.children {
                write_node(child, Some(&el.tag), out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
