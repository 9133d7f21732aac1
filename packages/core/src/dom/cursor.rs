//! Cursor context
//!
//! Editors keep one ambient selection per window. Here it is an injected
//! [`CursorContext`] so the insertion engine and the plugin can be driven
//! (and tested) without a browser. [`Selection`] is the plain in-memory
//! implementation.

use crate::dom::{Document, DomError, NodeId, Range};

/// Access to the caret/selection of an editing surface
pub trait CursorContext {
    /// Current selection, if any
    fn range(&self) -> Option<Range>;

    /// Replace the selection
    fn set_range(&mut self, range: Range);

    /// Drop the selection entirely
    fn clear(&mut self);

    /// Give keyboard focus to an editing surface
    fn focus(&mut self, surface: NodeId);

    /// Surface that currently has focus
    fn focused(&self) -> Option<NodeId>;

    /// Capture the current selection before an asynchronous interaction
    fn snapshot(&self) -> Option<SelectionSnapshot> {
        self.range().map(SelectionSnapshot::new)
    }
}

/// A selection captured before modal UI opens
///
/// Not `Clone`: restoring consumes it, so a snapshot is used at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct SelectionSnapshot {
    range: Range,
}

impl SelectionSnapshot {
    pub fn new(range: Range) -> Self {
        Self { range }
    }

    /// Peek at the captured range without consuming the snapshot
    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn into_range(self) -> Range {
        self.range
    }
}

/// In-memory selection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
    focus: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection with a caret already placed
    pub fn with_range(range: Range) -> Self {
        Self {
            range: Some(range),
            focus: None,
        }
    }
}

impl CursorContext for Selection {
    fn range(&self) -> Option<Range> {
        self.range
    }

    fn set_range(&mut self, range: Range) {
        self.range = Some(range);
    }

    fn clear(&mut self) {
        self.range = None;
    }

    fn focus(&mut self, surface: NodeId) {
        self.focus = Some(surface);
    }

    fn focused(&self) -> Option<NodeId> {
        self.focus
    }
}

/// The legacy "insert HTML at caret" editing command
///
/// Used by the insertion engine when its own splice fails.
pub trait EditingCommands {
    /// Insert `html` at `range`, returning the inserted top-level nodes
    fn insert_html(
        &self,
        doc: &mut Document,
        surface: NodeId,
        range: &Range,
        html: &str,
    ) -> Result<Vec<NodeId>, DomError>;
}

/// Default command implementation on the arena document
///
/// Mirrors what the browser command does: replaces the selection with the
/// parsed fragment in place, with no block-level adjustment. Refuses to
/// write into non-editable regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCommands;

impl EditingCommands for DocumentCommands {
    fn insert_html(
        &self,
        doc: &mut Document,
        surface: NodeId,
        range: &Range,
        html: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        if !doc.is_editable_within(surface, range.start.node) {
            return Err(DomError::NotEditable(range.start.node));
        }
        let nodes = doc.parse_fragment(html)?;
        let mut point = doc.delete_contents(range)?;
        for &node in &nodes {
            doc.insert_node_at(point, node)?;
            point = doc.point_after(node)?;
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::BoundaryPoint;

    #[test]
    fn test_snapshot_captures_current_range() {
        let doc = Document::new();
        let root = doc.root();
        let mut selection = Selection::new();
        assert!(selection.snapshot().is_none());

        let caret = Range::collapsed(BoundaryPoint::new(root, 0));
        selection.set_range(caret);
        let snapshot = selection.snapshot().unwrap();

        selection.clear();
        assert_eq!(snapshot.into_range(), caret);
        assert!(selection.range().is_none());
    }

    #[test]
    fn test_document_commands_insert_in_place() {
        let mut doc = Document::new();
        let root = doc.root();
        let surface = doc.create_element("div");
        doc.set_attribute(surface, "contenteditable", "true").unwrap();
        doc.append_child(root, surface).unwrap();
        let text = doc.create_text("ab");
        doc.append_child(surface, text).unwrap();

        let range = Range::collapsed(BoundaryPoint::new(text, 1));
        let nodes = DocumentCommands
            .insert_html(&mut doc, surface, &range, "<em>x</em><b>y</b>")
            .unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.inner_html(surface), "a<em>x</em><b>y</b>b");
    }

    #[test]
    fn test_document_commands_refuse_islands() {
        let mut doc = Document::new();
        let root = doc.root();
        let surface = doc.create_element("div");
        doc.set_attribute(surface, "contenteditable", "true").unwrap();
        let island = doc.create_element("span");
        doc.set_attribute(island, "contenteditable", "false").unwrap();
        doc.append_child(surface, island).unwrap();
        doc.append_child(root, surface).unwrap();

        let range = Range::collapsed(BoundaryPoint::new(island, 0));
        assert_eq!(
            DocumentCommands.insert_html(&mut doc, surface, &range, "<p>x</p>"),
            Err(DomError::NotEditable(island))
        );
    }
}
