//! Parses bytes into a [`Dom`] by driving html5ever's tree builder over a
//! [`TreeSink`] that writes straight into the arena.
//!
//! Adapted from the teacher's `ValorSink`/`Html5everEngine` pair in
//! `parser::html5ever_engine`: same `TreeSink` method bodies, minus the
//! DOM-update broadcasting the live renderer needed.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::interface::QuirksMode;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, TreeSink};
use html5ever::{parse_document, Attribute, ExpandedName, QualName};
use indextree::NodeId;
use markup5ever::{expanded_name, local_name, namespace_url, ns};

use crate::dom::Dom;

static EXPANDED_DIV: ExpandedName = expanded_name!(html "div");

struct ArchiveSink<'a> {
    dom: RefCell<&'a mut Dom>,
}

impl<'a> TreeSink for ArchiveSink<'a> {
    type Handle = NodeId;
    type Output = ();
    type ElemName<'b>
        = ExpandedName<'b>
    where
        Self: 'b;

    fn finish(self) {}

    fn parse_error(&self, msg: Cow<'static, str>) {
        log::trace!("html5ever parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        self.dom.borrow_mut().root_id()
    }

    fn elem_name(&self, _target: &Self::Handle) -> Self::ElemName<'_> {
        EXPANDED_DIV
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> Self::Handle {
        let id = self.dom.borrow_mut().new_element(name.local.to_string());
        for attr in attrs {
            self.dom.borrow_mut().set_attr(id, attr.name.local.to_string(), attr.value.to_string());
        }
        id
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.dom.borrow_mut().new_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        self.dom.borrow_mut().new_comment(data.to_string())
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.dom.borrow_mut().append_child(*parent, node),
            NodeOrText::AppendText(text) => {
                let node = self.dom.borrow_mut().new_text(text.to_string());
                self.dom.borrow_mut().append_child(*parent, node);
            }
        }
    }

    fn append_based_on_parent_node(&self, _element: &Self::Handle, _prev_element: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let parent = self.get_document();
        match new_node {
            NodeOrText::AppendNode(node) => self.dom.borrow_mut().append_child(parent, node),
            NodeOrText::AppendText(text) => {
                let node = self.dom.borrow_mut().new_text(text.to_string());
                self.dom.borrow_mut().append_child(parent, node);
            }
        }
    }

    fn append_doctype_to_document(&self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {}

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        match new_node {
            NodeOrText::AppendNode(node) => self.dom.borrow_mut().insert_before(*sibling, node),
            NodeOrText::AppendText(text) => {
                let node = self.dom.borrow_mut().new_text(text.to_string());
                self.dom.borrow_mut().insert_before(*sibling, node);
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        for attr in attrs {
            let name = attr.name.local.to_string();
            if !self.dom.borrow_mut().has_attr(*target, &name) {
                self.dom.borrow_mut().set_attr(*target, name, attr.value.to_string());
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().remove_from_parent(*target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        self.dom.borrow_mut().reparent_children(*node, *new_parent);
    }

    fn is_mathml_annotation_xml_integration_point(&self, _handle: &Self::Handle) -> bool {
        false
    }
}

/// Parse a full HTML document into a fresh [`Dom`].
#[must_use]
pub fn parse(bytes: &[u8]) -> Dom {
    let mut dom = Dom::new();
    {
        let sink = ArchiveSink { dom: RefCell::new(&mut dom) };
        let parser = parse_document(sink, Default::default());
        parser.one(StrTendril::from(String::from_utf8_lossy(bytes).into_owned()));
    }
    dom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_document_into_elements() {
        let dom = parse(b"<html><head><title>Hi</title></head><body><p>x</p></body></html>");
        assert!(dom.find_element("title").is_some());
        assert!(dom.find_element("body").is_some());
        assert_eq!(dom.find_elements("p").len(), 1);
    }

    #[test]
    fn parses_attributes_on_elements() {
        let dom = parse(b"<html><body><img src=\"a.png\" alt=\"x\"></body></html>");
        let img = dom.find_element("img").unwrap();
        assert_eq!(dom.node(img).unwrap().attr("src"), Some("a.png"));
    }
}
