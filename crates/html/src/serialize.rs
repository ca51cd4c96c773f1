//! Renders a [`Dom`] back out to an HTML byte string.
//!
//! Handlers mutate node attributes and text content in place (the
//! rewritten `src`/`href` values the migration drivers produce); this is
//! the inverse of [`crate::parser::parse`], walking the same arena and
//! re-emitting markup instead of re-building the tree.

use indextree::NodeId;

use crate::dom::{Dom, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Serialize the whole document starting at its root.
#[must_use]
pub fn serialize(dom: &Dom) -> String {
    let mut out = String::new();
    for child in dom.children(dom.root_id()) {
        write_node(dom, child, &mut out);
    }
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    let Some(node) = dom.node(id) else { return };
    match &node.kind {
        NodeKind::Document => {
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
        }
        NodeKind::Text { text } => out.push_str(&escape_text(text)),
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in &node.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            for child in dom.children(id) {
                write_node(dom, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
