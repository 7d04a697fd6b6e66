//! Owned HTML tree. Every normalization stage takes and returns `Vec<Node>`,
//! so no stage ever mutates a tree another stage can still see.
use ego_tree::{NodeId, NodeRef};
use scraper::Html;

pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// In source order; names are lower-case.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Whole-document parse; the result holds the `<html>` element.
pub fn parse_document(html: &str) -> Vec<Node> {
    let doc = Html::parse_document(html);
    from_scraper_children(doc.tree.root(), &mut |_, _| {})
}

/// Fragment parse; the result holds the fragment's own top-level nodes.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let fragment = Html::parse_fragment(html);
    from_scraper_children(*fragment.root_element(), &mut |_, _| {})
}

/// Convert the children of `node`, letting `decorate` adjust each element
/// while it still knows its scraper id.
pub fn from_scraper_children(
    node: NodeRef<'_, scraper::Node>,
    decorate: &mut dyn FnMut(NodeId, &mut Element),
) -> Vec<Node> {
    node.children()
        .filter_map(|child| from_scraper(child, decorate))
        .collect()
}

fn from_scraper(
    node: NodeRef<'_, scraper::Node>,
    decorate: &mut dyn FnMut(NodeId, &mut Element),
) -> Option<Node> {
    match node.value() {
        scraper::Node::Text(text) => Some(Node::Text(text.to_string())),
        scraper::Node::Comment(comment) => Some(Node::Comment(comment.to_string())),
        scraper::Node::Element(el) => {
            let mut element = Element::new(el.name().to_ascii_lowercase());
            element.attrs = el
                .attrs()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect();
            element.children = from_scraper_children(node, decorate);
            decorate(node.id(), &mut element);
            Some(Node::Element(element))
        }
        _ => None,
    }
}

/// Children of the first `<body>`, or the nodes unchanged when there is none.
pub fn body_or_all(nodes: Vec<Node>) -> Vec<Node> {
    match find_body(&nodes) {
        Some(body) => body.children.clone(),
        None => nodes,
    }
}

fn find_body(nodes: &[Node]) -> Option<&Element> {
    nodes.iter().find_map(|node| match node {
        Node::Element(el) if el.name == "body" => Some(el),
        Node::Element(el) => find_body(&el.children),
        _ => None,
    })
}

/// Visit every element depth-first, parents before children.
pub fn for_each_element<'a>(nodes: &'a [Node], visit: &mut dyn FnMut(&'a Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            visit(el);
            for_each_element(&el.children, visit);
        }
    }
}

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, false, out),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
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
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
