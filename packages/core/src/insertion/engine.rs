//! Selection-preserving insertion
//!
//! Opening the quote dialog steals focus from the editing surface, which
//! loses the caret. The engine snapshots the selection before the dialog
//! opens and restores it when the dialog confirms, then splices the
//! generated subtree in and leaves the caret in a fresh paragraph after it.
//!
//! When the splice cannot run (the caret sits in a non-editable island, the
//! range went stale) the engine falls back to the host's legacy
//! "insert HTML" command, and finally to appending at the end of the
//! surface. Fallbacks are logged, never surfaced.

use crate::dom::{
    BoundaryPoint, CursorContext, Document, DocumentCommands, DomError, EditingCommands, NodeId,
    Range, SelectionSnapshot,
};
use crate::insertion::InsertionError;
use serde::Serialize;

/// Strategy that actually placed the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertStrategy {
    Splice,
    LegacyCommand,
    Append,
}

/// Result of a successful insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionReport {
    pub strategy: InsertStrategy,

    /// The inserted container (a re-parsed copy when the legacy command ran)
    pub inserted: NodeId,

    /// Empty paragraph holding the caret, when it could be placed
    pub caret_paragraph: Option<NodeId>,
}

pub struct InsertionEngine {
    commands: Box<dyn EditingCommands>,
}

impl Default for InsertionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertionEngine {
    /// Engine using the built-in document commands as the legacy fallback
    pub fn new() -> Self {
        Self::with_commands(Box::new(DocumentCommands))
    }

    /// Engine with host-provided legacy editing commands
    pub fn with_commands(commands: Box<dyn EditingCommands>) -> Self {
        Self { commands }
    }

    /// Capture the selection if it lies inside `surface`
    pub fn snapshot(
        &self,
        cursor: &dyn CursorContext,
        doc: &Document,
        surface: NodeId,
    ) -> Option<SelectionSnapshot> {
        let snapshot = cursor.snapshot()?;
        let range = snapshot.range();
        let inside = doc.is_valid_range(range)
            && doc.contains(surface, range.start.node)
            && doc.contains(surface, range.end.node);
        if inside {
            Some(snapshot)
        } else {
            tracing::debug!("Selection is outside surface {}, not capturing", surface);
            None
        }
    }

    /// Re-apply a snapshot, or place the caret at the end of the surface
    ///
    /// The snapshot is consumed. A range that went stale while the dialog
    /// was open (nodes removed, offsets out of bounds) is discarded.
    pub fn restore(
        &self,
        doc: &Document,
        cursor: &mut dyn CursorContext,
        surface: NodeId,
        snapshot: Option<SelectionSnapshot>,
    ) -> Range {
        let range = snapshot
            .map(SelectionSnapshot::into_range)
            .filter(|range| {
                doc.is_valid_range(range)
                    && doc.contains(surface, range.start.node)
                    && doc.contains(surface, range.end.node)
            })
            .unwrap_or_else(|| {
                tracing::debug!("No usable selection snapshot, using end of surface {}", surface);
                Range::end_of(doc, surface)
            });

        cursor.focus(surface);
        cursor.set_range(range);
        range
    }

    /// Insert a detached `node` at the restored selection
    ///
    /// # Errors
    ///
    /// `SurfaceNotEditable` when `surface` is not an attached editing host;
    /// the document is left untouched. `AllStrategiesFailed` only when even
    /// appending to the surface fails.
    pub fn insert(
        &self,
        doc: &mut Document,
        cursor: &mut dyn CursorContext,
        surface: NodeId,
        snapshot: Option<SelectionSnapshot>,
        node: NodeId,
    ) -> Result<InsertionReport, InsertionError> {
        if !doc.is_editing_host(surface) {
            tracing::warn!("Insertion aborted: {} is not an editable surface", surface);
            return Err(InsertionError::SurfaceNotEditable(surface));
        }

        let range = self.restore(doc, cursor, surface, snapshot);

        let (strategy, inserted) = match splice(doc, surface, &range, node) {
            Ok(()) => (InsertStrategy::Splice, node),
            Err(splice_err) => {
                tracing::warn!("Splice failed ({}), trying legacy insert command", splice_err);
                match self.legacy_insert(doc, surface, &range, node) {
                    Ok(inserted) => (InsertStrategy::LegacyCommand, inserted),
                    Err(legacy_err) => {
                        tracing::warn!(
                            "Legacy insert failed ({}), appending to end of surface",
                            legacy_err
                        );
                        if doc.parent(node).is_some() {
                            doc.remove(node).map_err(InsertionError::all_failed)?;
                        }
                        doc.append_child(surface, node)
                            .map_err(InsertionError::all_failed)?;
                        (InsertStrategy::Append, node)
                    }
                }
            }
        };

        let caret_paragraph = match place_trailing_caret(doc, cursor, surface, inserted) {
            Ok(paragraph) => Some(paragraph),
            Err(e) => {
                tracing::warn!("Could not place caret after inserted quote: {}", e);
                None
            }
        };

        Ok(InsertionReport {
            strategy,
            inserted,
            caret_paragraph,
        })
    }

    fn legacy_insert(
        &self,
        doc: &mut Document,
        surface: NodeId,
        range: &Range,
        node: NodeId,
    ) -> Result<NodeId, DomError> {
        let html = doc.outer_html(node);
        let nodes = self.commands.insert_html(doc, surface, range, &html)?;
        nodes
            .into_iter()
            .find(|&n| doc.is_element(n))
            .ok_or_else(|| DomError::parse("legacy insert produced no element"))
    }
}

/// Delete the selection and put `node` after the enclosing block, or at the
/// caret when the caret sits directly in the surface
fn splice(doc: &mut Document, surface: NodeId, range: &Range, node: NodeId) -> Result<(), DomError> {
    for point in [&range.start, &range.end] {
        if !doc.is_editable_within(surface, point.node) {
            return Err(DomError::NotEditable(point.node));
        }
    }

    let point = doc.delete_contents(range)?;
    let block = doc.closest(point.node, |doc, id| {
        id != surface && doc.is_block(id) && doc.contains(surface, id)
    });

    match block {
        Some(block) => doc.insert_after(block, node),
        None => doc.insert_node_at(point, node),
    }
}

/// Add `<p><br></p>` after `inserted` and collapse the caret into it
fn place_trailing_caret(
    doc: &mut Document,
    cursor: &mut dyn CursorContext,
    surface: NodeId,
    inserted: NodeId,
) -> Result<NodeId, DomError> {
    let paragraph = doc.create_element("p");
    let br = doc.create_element("br");
    doc.append_child(paragraph, br)?;
    doc.insert_after(inserted, paragraph)?;

    cursor.set_range(Range::collapsed(BoundaryPoint::new(paragraph, 0)));
    cursor.focus(surface);
    Ok(paragraph)
}
