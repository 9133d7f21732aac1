//! Boundary points and ranges
//!
//! Offsets follow DOM semantics: inside a text node they count chars, inside
//! an element they count children (offset `n` is "before child `n`").

use crate::dom::{Document, DomError, NodeId};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A start/end pair of boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl Range {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    /// Caret at a single point
    pub fn collapsed(point: BoundaryPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Everything inside `node`
    pub fn select_contents(doc: &Document, node: NodeId) -> Self {
        Self::new(
            BoundaryPoint::new(node, 0),
            BoundaryPoint::new(node, doc.node_len(node)),
        )
    }

    /// Caret at the very end of `node`
    pub fn end_of(doc: &Document, node: NodeId) -> Self {
        Self::collapsed(BoundaryPoint::new(node, doc.node_len(node)))
    }
}

impl Document {
    /// Point refers to a live node and its offset is in bounds
    pub fn is_valid_point(&self, point: &BoundaryPoint) -> bool {
        self.contains_id(point.node) && point.offset <= self.node_len(point.node)
    }

    fn check_point(&self, point: &BoundaryPoint) -> Result<(), DomError> {
        if !self.contains_id(point.node) {
            return Err(DomError::UnknownNode(point.node));
        }
        let len = self.node_len(point.node);
        if point.offset > len {
            return Err(DomError::invalid_offset(point.node, point.offset, len));
        }
        Ok(())
    }

    /// Both ends valid, connected, and start not after end
    pub fn is_valid_range(&self, range: &Range) -> bool {
        self.is_valid_point(&range.start)
            && self.is_valid_point(&range.end)
            && self.is_connected(range.start.node)
            && self.is_connected(range.end.node)
            && self.compare_points(&range.start, &range.end) != Ordering::Greater
    }

    /// Tree order of two boundary points (both must share a root)
    pub fn compare_points(&self, a: &BoundaryPoint, b: &BoundaryPoint) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        if self.contains(a.node, b.node) {
            // b lies inside the child of a.node at `index`
            let index = self.child_index_towards(a.node, b.node);
            return if index < a.offset {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if self.contains(b.node, a.node) {
            return self.compare_points(b, a).reverse();
        }
        self.path(a.node).cmp(&self.path(b.node))
    }

    /// Index of the child of `ancestor` that contains `node`
    fn child_index_towards(&self, ancestor: NodeId, node: NodeId) -> usize {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return self.child_index(current).unwrap_or(0);
            }
            current = parent;
        }
        0
    }

    /// Boundary point immediately before `node`
    pub fn point_before(&self, node: NodeId) -> Result<BoundaryPoint, DomError> {
        let parent = self.parent(node).ok_or(DomError::Detached(node))?;
        let index = self.child_index(node).ok_or(DomError::Detached(node))?;
        Ok(BoundaryPoint::new(parent, index))
    }

    /// Boundary point immediately after `node`
    pub fn point_after(&self, node: NodeId) -> Result<BoundaryPoint, DomError> {
        let before = self.point_before(node)?;
        Ok(BoundaryPoint::new(before.node, before.offset + 1))
    }

    /// Anchor a boundary to a node so later splits cannot shift it,
    /// splitting a text node when the offset falls strictly inside it
    fn split_boundary(&mut self, point: BoundaryPoint) -> Result<SplitBoundary, DomError> {
        let len = self.node_len(point.node);
        if !self.is_text(point.node) {
            return Ok(match self.children(point.node).get(point.offset) {
                Some(&child) => SplitBoundary::Before(child),
                None => SplitBoundary::EndOf(point.node),
            });
        }
        if point.offset == 0 {
            Ok(SplitBoundary::Before(point.node))
        } else if point.offset >= len {
            Ok(SplitBoundary::After(point.node))
        } else {
            let tail = self.split_text(point.node, point.offset)?;
            Ok(SplitBoundary::Before(tail))
        }
    }

    fn resolve_boundary(&self, split: SplitBoundary) -> Result<BoundaryPoint, DomError> {
        match split {
            SplitBoundary::EndOf(node) => Ok(BoundaryPoint::new(node, self.node_len(node))),
            SplitBoundary::Before(node) => self.point_before(node),
            SplitBoundary::After(node) => self.point_after(node),
        }
    }

    /// Remove everything selected by `range`
    ///
    /// Nodes fully inside the range are detached; text nodes cut by the range
    /// are trimmed; elements that are only partially selected stay in place.
    /// Returns the collapsed point where the range started.
    pub fn delete_contents(&mut self, range: &Range) -> Result<BoundaryPoint, DomError> {
        self.check_point(&range.start)?;
        self.check_point(&range.end)?;
        if self.compare_points(&range.start, &range.end) == Ordering::Greater {
            return Err(DomError::hierarchy("range start is after its end"));
        }
        if range.is_collapsed() {
            return Ok(range.start);
        }

        if range.start.node == range.end.node && self.is_text(range.start.node) {
            self.delete_text(range.start.node, range.start.offset, range.end.offset)?;
            return Ok(range.start);
        }

        let end = self.split_boundary(range.end)?;
        let start = self.split_boundary(range.start)?;
        let start = self.resolve_boundary(start)?;
        let end = self.resolve_boundary(end)?;

        let mut doomed = Vec::new();
        self.collect_contained(self.root(), &start, &end, &mut doomed)?;
        for node in doomed {
            self.remove(node)?;
        }

        Ok(start)
    }

    /// Top-most nodes lying entirely between `start` and `end`
    fn collect_contained(
        &self,
        parent: NodeId,
        start: &BoundaryPoint,
        end: &BoundaryPoint,
        out: &mut Vec<NodeId>,
    ) -> Result<(), DomError> {
        for &child in self.children(parent) {
            let before = self.point_before(child)?;
            let after = self.point_after(child)?;
            if self.compare_points(start, &before) != Ordering::Greater
                && self.compare_points(&after, end) != Ordering::Greater
            {
                out.push(child);
            } else if self.contains(child, start.node) || self.contains(child, end.node) {
                self.collect_contained(child, start, end, out)?;
            }
        }
        Ok(())
    }

    /// Insert `node` at a boundary point, splitting a text node if needed
    pub fn insert_node_at(&mut self, point: BoundaryPoint, node: NodeId) -> Result<(), DomError> {
        self.check_point(&point)?;
        match self.split_boundary(point)? {
            SplitBoundary::EndOf(parent) => self.append_child(parent, node),
            SplitBoundary::Before(reference) => self.insert_before(reference, node),
            SplitBoundary::After(reference) => self.insert_after(reference, node),
        }
    }

    /// Plain text covered by a range (used to pre-fill the quote dialog)
    pub fn range_text(&self, range: &Range) -> String {
        if range.is_collapsed() || !self.is_valid_range(range) {
            return String::new();
        }
        if range.start.node == range.end.node {
            if let Some(text) = self.text(range.start.node) {
                return text
                    .chars()
                    .skip(range.start.offset)
                    .take(range.end.offset - range.start.offset)
                    .collect();
            }
        }

        let mut out = String::new();
        for node in self.descendants(self.root()) {
            if let Some(text) = self.text(node) {
                let len = text.chars().count();
                let from = if node == range.start.node {
                    range.start.offset
                } else if self.compare_points(&BoundaryPoint::new(node, 0), &range.start)
                    == Ordering::Less
                {
                    continue;
                } else {
                    0
                };
                let to = if node == range.end.node {
                    range.end.offset
                } else if self.compare_points(&BoundaryPoint::new(node, len), &range.end)
                    == Ordering::Greater
                {
                    continue;
                } else {
                    len
                };
                out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
            } else if self.tag(node) == Some("br") {
                if let Ok(point) = self.point_before(node) {
                    if self.compare_points(&range.start, &point) != Ordering::Greater
                        && self.compare_points(&point, &range.end) == Ordering::Less
                    {
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
enum SplitBoundary {
    EndOf(NodeId),
    Before(NodeId),
    After(NodeId),
}
