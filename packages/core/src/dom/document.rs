//! Arena document
//!
//! Nodes live in a single `Vec` owned by the [`Document`] and are addressed by
//! [`NodeId`]. Removing a node only detaches it; ids stay valid for the life
//! of the document, so a detached subtree can be re-inserted later (that is
//! how generated quotes travel from the generator to the insertion engine).

use crate::dom::DomError;
use std::fmt;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload: tag, attributes and inline styles, all order-preserving
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Tags treated as block containers for insertion decisions
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "dd",
    "dt",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Elements that never have children
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// In-memory document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with a `body` root element
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("body");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn entry(&self, id: NodeId) -> Result<&NodeEntry, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut NodeEntry, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element (tag is lower-cased)
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|e| &e.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.entry_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        match &mut self.entry_mut(id)?.kind {
            NodeKind::Text(existing) => {
                *existing = text.into();
                Ok(())
            }
            NodeKind::Element(_) => Err(DomError::NotAText(id)),
        }
    }

    // ---- attributes and styles ----

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute, keeping its original position
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let value = value.into();
        let element = self.element_mut(id)?;
        match element.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value,
            None => element.attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(id)?.attributes.retain(|(k, _)| k != name);
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?
            .styles
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an inline style declaration
    pub fn set_style(
        &mut self,
        id: NodeId,
        property: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let value = value.into();
        let element = self.element_mut(id)?;
        match element.styles.iter_mut().find(|(k, _)| k == property) {
            Some((_, existing)) => *existing = value,
            None => element.styles.push((property.to_string(), value)),
        }
        Ok(())
    }

    // ---- tree navigation ----

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of `id` among its parent's children
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Proper ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Nearest inclusive ancestor matching `predicate`
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if predicate(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Inclusive descendant check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// Attached to the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains_id(id) && self.contains(self.root, id)
    }

    /// Pre-order descendants, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Path of child indexes from the root (empty for the root or a
    /// detached subtree root)
    pub(crate) fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.child_index(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Length in boundary-point units: chars for text, children for elements
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(NodeKind::Element(_)) => self.children(id).len(),
            None => 0,
        }
    }

    // ---- classification ----

    pub fn is_block(&self, id: NodeId) -> bool {
        self.tag(id).map(|t| BLOCK_TAGS.contains(&t)).unwrap_or(false)
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.tag(id).map(|t| VOID_TAGS.contains(&t)).unwrap_or(false)
    }

    /// Element carrying `contenteditable="true"` that is attached to the root
    pub fn is_editing_host(&self, id: NodeId) -> bool {
        self.is_connected(id)
            && self
                .attribute(id, "contenteditable")
                .map(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }

    /// Whether content at `id` can be edited inside `host`
    ///
    /// False when `id` is outside the host or inside a nested
    /// `contenteditable="false"` island.
    pub fn is_editable_within(&self, host: NodeId, id: NodeId) -> bool {
        if !self.contains(host, id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if node == host {
                return true;
            }
            if self
                .attribute(node, "contenteditable")
                .map(|v| v.eq_ignore_ascii_case("false"))
                .unwrap_or(false)
            {
                return false;
            }
            current = self.parent(node);
        }
        false
    }

    // ---- mutation ----

    /// Detach a node from its parent (no-op when already detached)
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self.entry(id)?.parent;
        if let Some(parent) = parent {
            self.entry_mut(parent)?.children.retain(|&c| c != id);
            self.entry_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Insert `child` at `index` among `parent`'s children, detaching it from
    /// wherever it was
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DomError> {
        self.entry(child)?;
        if !self.is_element(parent) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_void(parent) {
            return Err(DomError::hierarchy(format!(
                "<{}> cannot have children",
                self.tag(parent).unwrap_or_default()
            )));
        }
        if self.contains(child, parent) {
            return Err(DomError::hierarchy(format!(
                "cannot insert {} into its own descendant {}",
                child, parent
            )));
        }

        // Re-inserting under the same parent shifts the target index
        let mut index = index;
        if self.parent(child) == Some(parent) {
            if let Some(old) = self.child_index(child) {
                if old < index {
                    index -= 1;
                }
            }
        }
        self.remove(child)?;

        let len = self.children(parent).len();
        if index > len {
            return Err(DomError::invalid_offset(parent, index, len));
        }
        self.entry_mut(parent)?.children.insert(index, child);
        self.entry_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self
            .child_index(reference)
            .ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index, node)
    }

    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        let index = self
            .child_index(reference)
            .ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index + 1, node)
    }

    /// Put `new` where `old` is and detach `old`
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        if old == new {
            return Ok(());
        }
        self.insert_before(old, new)?;
        self.remove(old)
    }

    /// Split a text node at a char offset; the tail becomes a new sibling
    /// placed right after it
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id).ok_or(DomError::NotAText(id))?.to_string();
        let len = text.chars().count();
        if offset > len {
            return Err(DomError::invalid_offset(id, offset, len));
        }
        let byte = char_to_byte(&text, offset);
        let (head, tail) = text.split_at(byte);
        let tail_node = self.create_text(tail);
        self.set_text(id, head)?;
        if self.parent(id).is_some() {
            self.insert_after(id, tail_node)?;
        }
        Ok(tail_node)
    }

    /// Insert text at a char offset inside a text node
    pub fn insert_text(&mut self, id: NodeId, offset: usize, text: &str) -> Result<(), DomError> {
        let mut current = self.text(id).ok_or(DomError::NotAText(id))?.to_string();
        let len = current.chars().count();
        if offset > len {
            return Err(DomError::invalid_offset(id, offset, len));
        }
        current.insert_str(char_to_byte(&current, offset), text);
        self.set_text(id, current)
    }

    /// Remove the chars in `[start, end)` from a text node
    pub(crate) fn delete_text(&mut self, id: NodeId, start: usize, end: usize) -> Result<(), DomError> {
        let current = self.text(id).ok_or(DomError::NotAText(id))?;
        let len = current.chars().count();
        if start > end || end > len {
            return Err(DomError::invalid_offset(id, end, len));
        }
        let kept: String = current
            .chars()
            .enumerate()
            .filter(|(i, _)| *i < start || *i >= end)
            .map(|(_, c)| c)
            .collect();
        self.set_text(id, kept)
    }

    /// Concatenated text of all descendant text nodes; `<br>` counts as a
    /// newline
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element(data)) if data.tag == "br" => out.push('\n'),
            Some(NodeKind::Element(_)) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }
}

pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        doc.append_child(p, t).unwrap();
        (p, t)
    }

    #[test]
    fn test_append_and_navigate() {
        let mut doc = Document::new();
        let root = doc.root();
        let (p1, _) = paragraph(&mut doc, "one");
        let (p2, t2) = paragraph(&mut doc, "two");
        doc.append_child(root, p1).unwrap();
        doc.append_child(root, p2).unwrap();

        assert_eq!(doc.children(root), &[p1, p2]);
        assert_eq!(doc.next_sibling(p1), Some(p2));
        assert_eq!(doc.child_index(p2), Some(1));
        assert_eq!(doc.ancestors(t2), vec![p2, root]);
        assert_eq!(doc.path(t2), vec![1, 0]);
        assert!(doc.is_connected(t2));
    }

    #[test]
    fn test_reinsert_moves_node() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        let c = doc.create_element("p");
        for n in [a, b, c] {
            doc.append_child(root, n).unwrap();
        }

        doc.insert_after(c, a).unwrap();
        assert_eq!(doc.children(root), &[b, c, a]);

        doc.insert_child(root, 3, b).unwrap();
        assert_eq!(doc.children(root), &[c, a, b]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();

        assert!(matches!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let mut doc = Document::new();
        let br = doc.create_element("br");
        let t = doc.create_text("x");
        assert!(doc.append_child(br, t).is_err());
    }

    #[test]
    fn test_split_and_insert_text_use_char_offsets() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "héllo wörld");

        let tail = doc.split_text(t, 6).unwrap();
        assert_eq!(doc.text(t), Some("héllo "));
        assert_eq!(doc.text(tail), Some("wörld"));
        assert_eq!(doc.children(p), &[t, tail]);

        doc.insert_text(tail, 1, "ö").unwrap();
        assert_eq!(doc.text(tail), Some("wöörld"));
        assert!(doc.split_text(t, 99).is_err());
    }

    #[test]
    fn test_replace_detaches_old() {
        let mut doc = Document::new();
        let root = doc.root();
        let (old, _) = paragraph(&mut doc, "old");
        let (new, _) = paragraph(&mut doc, "new");
        doc.append_child(root, old).unwrap();

        doc.replace(old, new).unwrap();

        assert_eq!(doc.children(root), &[new]);
        assert!(!doc.is_connected(old));
        assert_eq!(doc.text_content(root), "new");
    }

    #[test]
    fn test_attributes_styles_and_classes() {
        let mut doc = Document::new();
        let el = doc.create_element("DIV");
        assert_eq!(doc.tag(el), Some("div"));

        doc.set_attribute(el, "class", "a  b").unwrap();
        doc.set_style(el, "color", "red").unwrap();
        doc.set_style(el, "color", "blue").unwrap();

        assert!(doc.has_class(el, "b"));
        assert!(!doc.has_class(el, "c"));
        assert_eq!(doc.style(el, "color"), Some("blue"));
        assert_eq!(doc.element(el).unwrap().styles.len(), 1);

        let text = doc.create_text("t");
        assert_eq!(
            doc.set_attribute(text, "x", "y"),
            Err(DomError::NotAnElement(text))
        );
    }

    #[test]
    fn test_editing_host_and_islands() {
        let mut doc = Document::new();
        let root = doc.root();
        let host = doc.create_element("div");
        let island = doc.create_element("span");
        let inside = doc.create_text("widget");
        doc.set_attribute(island, "contenteditable", "false").unwrap();
        doc.append_child(island, inside).unwrap();
        doc.append_child(host, island).unwrap();

        assert!(!doc.is_editing_host(host));
        doc.set_attribute(host, "contenteditable", "true").unwrap();
        assert!(!doc.is_editing_host(host), "detached host is not editable");

        doc.append_child(root, host).unwrap();
        assert!(doc.is_editing_host(host));
        assert!(doc.is_editable_within(host, host));
        assert!(!doc.is_editable_within(host, inside));
    }

    #[test]
    fn test_text_content_maps_br_to_newline() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let a = doc.create_text("a");
        let br = doc.create_element("br");
        let b = doc.create_text("b");
        for n in [a, br, b] {
            doc.append_child(p, n).unwrap();
        }
        assert_eq!(doc.text_content(p), "a\nb");
    }
}
