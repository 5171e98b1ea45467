//! In-memory page model: the element tree a rendering host mutates.
//!
//! Only the primitives the renderer needs are provided: lookup by selector,
//! element creation, inner-HTML replacement, class-list and inline-style
//! edits, child append, and serialization back to markup.

use std::fmt::Write as _;

mod history;
mod parser;
mod selector;

pub use history::{RecordedHistory, SessionHistory};
pub use selector::{Compound, Selector, SelectorError};

use parser::{is_void, parse_fragment, ParsedNode};

const EMPTY_SHELL: &str = "<!DOCTYPE html><html><head></head><body></body></html>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::parse(EMPTY_SHELL)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a full page. Missing `html`, `head` or `body` elements are
    /// created so every document has both regions.
    pub fn parse(html: &str) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        let root = doc.root;
        doc.insert_parsed(root, parse_fragment(html));

        let html_el = match doc.child_with_tag(root, "html") {
            Some(html_el) => html_el,
            None => {
                let html_el = doc.create_element("html");
                let moved: Vec<NodeId> = doc.nodes[root.0]
                    .children
                    .iter()
                    .copied()
                    .filter(|child| !matches!(doc.nodes[child.0].kind, NodeKind::Doctype(_)))
                    .collect();
                for child in moved {
                    doc.append_child(html_el, child);
                }
                doc.append_child(root, html_el);
                html_el
            }
        };

        let head = match doc.child_with_tag(html_el, "head") {
            Some(head) => head,
            None => {
                let head = doc.create_element("head");
                doc.nodes[head.0].parent = Some(html_el);
                doc.nodes[html_el.0].children.insert(0, head);
                head
            }
        };

        let body = match doc.child_with_tag(html_el, "body") {
            Some(body) => body,
            None => {
                let body = doc.create_element("body");
                let moved: Vec<NodeId> = doc.nodes[html_el.0]
                    .children
                    .iter()
                    .copied()
                    .filter(|child| *child != head)
                    .collect();
                for child in moved {
                    doc.append_child(body, child);
                }
                doc.append_child(html_el, body);
                body
            }
        };

        doc.head = head;
        doc.body = body;
        doc
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Moves `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.tag_name(*child).is_some())
            .collect()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            let name = name.to_ascii_lowercase();
            match attrs.iter_mut().find(|(attr, _)| *attr == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name, value.to_string())),
            }
        }
    }

    pub fn class_list(&self, id: NodeId) -> Vec<&str> {
        self.attribute(id, "class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).contains(&class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if class.is_empty() || self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> = self
            .class_list(id)
            .into_iter()
            .map(str::to_string)
            .collect();
        classes.push(class.to_string());
        self.set_attribute(id, "class", &classes.join(" "));
    }

    /// Inline style property from the `style` attribute.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        parse_style(self.attribute(id, "style").unwrap_or_default())
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let mut declarations = parse_style(self.attribute(id, "style").unwrap_or_default());
        match declarations.iter_mut().find(|(name, _)| name == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let rendered = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(id, "style", &rendered);
    }

    /// Replaces the children of `id` with the parsed `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let previous = std::mem::take(&mut self.nodes[id.0].children);
        for child in previous {
            self.nodes[child.0].parent = None;
        }
        self.insert_parsed(id, parse_fragment(html));
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(element_id))
    }

    /// First element in document order matching `selector`. Selectors that
    /// cannot be parsed match nothing; use [`Selector::parse`] to validate.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selector = Selector::parse(selector).ok()?;
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.matches(*node, &selector))
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.matches(*node, &selector))
            .collect()
    }

    pub fn title(&self) -> String {
        self.query_selector("title")
            .map(|title| self.text_content(title))
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let node = match self.query_selector("title") {
            Some(node) => node,
            None => {
                let node = self.create_element("title");
                let head = self.head;
                self.append_child(head, node);
                node
            }
        };
        let previous = std::mem::take(&mut self.nodes[node.0].children);
        for child in previous {
            self.nodes[child.0].parent = None;
        }
        let text = self.create_text(title);
        self.append_child(node, text);
    }

    /// Appends a `<meta>` element with the given attributes to the head.
    pub fn append_meta(&mut self, attrs: &[(&str, &str)]) -> NodeId {
        let meta = self.create_element("meta");
        for (name, value) in attrs {
            self.set_attribute(meta, name, value);
        }
        let head = self.head;
        self.append_child(head, meta);
        meta
    }

    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|id| *id != child);
        }
    }

    fn insert_parsed(&mut self, parent: NodeId, nodes: Vec<ParsedNode>) {
        for node in nodes {
            let id = match node {
                ParsedNode::Element {
                    tag,
                    attrs,
                    children,
                } => {
                    let id = self.push_node(NodeKind::Element { tag, attrs });
                    self.insert_parsed(id, children);
                    id
                }
                ParsedNode::Text(text) => self.push_node(NodeKind::Text(text)),
                ParsedNode::Comment(text) => self.push_node(NodeKind::Comment(text)),
                ParsedNode::Doctype(text) => self.push_node(NodeKind::Doctype(text)),
            };
            self.append_child(parent, id);
        }
    }

    fn child_with_tag(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    /// Elements below `from` in document order.
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(from).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.tag_name(node).is_some() {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(tag) = self.tag_name(node) else {
            return false;
        };
        compound.matches(tag, self.attribute(node, "id"), &self.class_list(node))
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Some((last, ancestors)) = selector.parts.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }
        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = self.parent(node);
        while let Some(compound) = remaining.peek() {
            let Some(ancestor) = current else {
                return false;
            };
            if self.matches_compound(ancestor, compound) {
                remaining.next();
            }
            current = self.parent(ancestor);
        }
        true
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) | NodeKind::Doctype(_) => {}
            NodeKind::Document | NodeKind::Element { .. } => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Document => {
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                let _ = write!(out, "<!--{text}-->");
            }
            NodeKind::Doctype(text) => {
                let _ = write!(out, "<!{text}>");
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", value.replace('"', "&quot;"));
                    }
                }
                out.push('>');
                if is_void(tag) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
