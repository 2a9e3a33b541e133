//! Node handle to document offset side table.

use std::collections::HashMap;
use std::ops::Range;
use vdom::PatchKey;

/// `[start, end)` document offsets covered by an on-screen node, line break
/// included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionRange {
    pub start: usize,
    pub end: usize,
}

impl PositionRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl From<Range<usize>> for PositionRange {
    fn from(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// Ranges of line-level nodes: top-level unit nodes and the keyed children
/// of combined group nodes. Rebuilt from scratch after every patch.
#[derive(Debug, Default)]
pub struct PositionIndex {
    ranges: HashMap<PatchKey, PositionRange>,
    order: Vec<PatchKey>,
}

impl PositionIndex {
    pub fn range(&self, node: PatchKey) -> Option<PositionRange> {
        self.ranges.get(&node).copied()
    }

    pub fn start(&self, node: PatchKey) -> Option<usize> {
        self.range(node).map(|range| range.start)
    }

    pub fn end(&self, node: PatchKey) -> Option<usize> {
        self.range(node).map(|range| range.end)
    }

    /// Indexed nodes in tree order: each group node precedes its children.
    pub fn iter(&self) -> impl Iterator<Item = (PatchKey, PositionRange)> + '_ {
        self.order
            .iter()
            .filter_map(|node| self.ranges.get(node).map(|range| (*node, *range)))
    }

    /// Ranges alone, in tree order.
    pub fn ranges(&self) -> Vec<PositionRange> {
        self.iter().map(|(_, range)| range).collect()
    }

    /// Innermost indexed node covering `offset`.
    pub fn node_at(&self, offset: usize) -> Option<PatchKey> {
        self.iter()
            .filter(|(_, range)| range.contains(offset))
            .last()
            .map(|(node, _)| node)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.ranges.clear();
        self.order.clear();
    }

    pub(crate) fn insert(&mut self, node: PatchKey, range: impl Into<PositionRange>) {
        if self.ranges.insert(node, range.into()).is_none() {
            self.order.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_follow_insertion() {
        let mut index = PositionIndex::default();
        index.insert(PatchKey(2), 0..4);
        index.insert(PatchKey(3), 0..2);
        index.insert(PatchKey(4), 2..4);
        index.insert(PatchKey(5), 4..5);

        assert_eq!(index.start(PatchKey(4)), Some(2));
        assert_eq!(index.end(PatchKey(2)), Some(4));
        assert_eq!(index.range(PatchKey(9)), None);
        assert_eq!(
            index.ranges(),
            vec![
                PositionRange::from(0..4),
                PositionRange::from(0..2),
                PositionRange::from(2..4),
                PositionRange::from(4..5),
            ]
        );
    }

    #[test]
    fn node_at_prefers_the_innermost_node() {
        let mut index = PositionIndex::default();
        index.insert(PatchKey(2), 0..4);
        index.insert(PatchKey(3), 0..2);
        index.insert(PatchKey(4), 2..4);

        assert_eq!(index.node_at(3), Some(PatchKey(4)));
        assert_eq!(index.node_at(4), None);
    }

    #[test]
    fn reinsert_keeps_first_position() {
        let mut index = PositionIndex::default();
        index.insert(PatchKey(2), 0..1);
        index.insert(PatchKey(3), 1..2);
        index.insert(PatchKey(2), 0..3);
        assert_eq!(index.len(), 2);
        assert_eq!(index.iter().next(), Some((PatchKey(2), PositionRange::from(0..3))));

        index.clear();
        assert!(index.is_empty());
    }
}
