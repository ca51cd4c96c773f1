//! An `indextree`-backed DOM tree, simplified from the teacher's
//! `html::dom::DOM` by dropping the live-rendering broadcast/update
//! protocol (`DOMUpdate`, `NodeKeyManager`, `KeySpace`): migration parses
//! a whole document once, walks it, and serializes it back out, so there
//! is nothing to diff against a renderer.

use indextree::{Arena, NodeId};
use smallvec::SmallVec;

/// What kind of node a tree slot holds.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// One DOM node: its kind plus, for elements, an ordered attribute list.
#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<[(String, String); 4]>,
}

impl DomNode {
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// A parsed document, the `index_files`-rewriting target of every
/// migration handler that touches HTML.
pub struct Dom {
    arena: Arena<DomNode>,
    root: NodeId,
}

impl Dom {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self { arena, root }
    }

    #[inline]
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.arena.get(id).map(indextree::Node::get)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.arena.get_mut(id).map(indextree::Node::get_mut)
    }

    pub fn new_element(&mut self, tag: String) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Element { tag },
            attrs: SmallVec::new(),
        })
    }

    pub fn new_text(&mut self, text: String) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Text { text },
            attrs: SmallVec::new(),
        })
    }

    pub fn new_comment(&mut self, text: String) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Comment { text },
            attrs: SmallVec::new(),
        })
    }

    pub fn set_attr(&mut self, node: NodeId, name: String, value: String) {
        if let Some(dom_node) = self.node_mut(node) {
            if let Some((_, existing)) = dom_node.attrs.iter_mut().find(|(key, _)| *key == name) {
                *existing = value;
            } else {
                dom_node.attrs.push((name, value));
            }
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(dom_node) = self.node_mut(node) {
            dom_node.attrs.retain(|(key, _)| key != name);
        }
    }

    #[must_use]
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.node(node).is_some_and(|n| n.has_attr(name))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.arena.get(child).and_then(indextree::Node::parent).is_some() {
            child.detach(&mut self.arena);
        }
        parent.append(child, &mut self.arena);
    }

    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        if self.arena.get(node).and_then(indextree::Node::parent).is_some() {
            node.detach(&mut self.arena);
        }
        sibling.insert_before(node, &mut self.arena);
    }

    pub fn remove_from_parent(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            child.detach(&mut self.arena);
            new_parent.append(child, &mut self.arena);
        }
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        node.children(&self.arena).collect()
    }

    /// Depth-first walk of every descendant of `node`, `node` itself last
    /// is never included; callers pass `dom.root_id()` to walk the whole
    /// tree.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        node.descendants(&self.arena).skip(1).collect()
    }

    /// Every element anywhere in the tree whose tag name matches
    /// (case-insensitively).
    #[must_use]
    pub fn find_elements(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.node(id).and_then(DomNode::tag).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// The first element matching `tag`, if any.
    #[must_use]
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.find_elements(tag).into_iter().next()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_find_elements_by_tag() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let div = dom.new_element("div".into());
        dom.append_child(root, div);
        let span = dom.new_element("span".into());
        dom.append_child(div, span);
        assert_eq!(dom.find_elements("span").len(), 1);
        assert_eq!(dom.find_elements("SPAN").len(), 1);
    }

    #[test]
    fn set_attr_then_get_and_has() {
        let mut dom = Dom::new();
        let img = dom.new_element("img".into());
        dom.set_attr(img, "src".into(), "a.png".into());
        assert!(dom.has_attr(img, "src"));
        assert_eq!(dom.node(img).unwrap().attr("src"), Some("a.png"));
        dom.set_attr(img, "src".into(), "b.png".into());
        assert_eq!(dom.node(img).unwrap().attr("src"), Some("b.png"));
    }

    #[test]
    fn remove_attr_drops_it() {
        let mut dom = Dom::new();
        let img = dom.new_element("img".into());
        dom.set_attr(img, "src".into(), "a.png".into());
        dom.remove_attr(img, "src");
        assert!(!dom.has_attr(img, "src"));
    }

    #[test]
    fn reparent_children_moves_all_of_them() {
        let mut dom = Dom::new();
        let root = dom.root_id();
        let old_parent = dom.new_element("div".into());
        let new_parent = dom.new_element("section".into());
        dom.append_child(root, old_parent);
        dom.append_child(root, new_parent);
        let child = dom.new_element("p".into());
        dom.append_child(old_parent, child);
        dom.reparent_children(old_parent, new_parent);
        assert_eq!(dom.children(old_parent).len(), 0);
        assert_eq!(dom.children(new_parent).len(), 1);
    }
}
