use std::ops::Range;
use std::sync::Arc;
use vdom::{DomPatch, PatchError, PatchKey, Screen, VNode};

/// On-screen tree the reconciler patches.
///
/// Implementors must keep handles stable for nodes a patch matched, and must
/// not touch top-level nodes outside the patched range.
pub trait Surface {
    /// Unit-level nodes, in order.
    fn top_level(&self) -> &[PatchKey];

    fn children(&self, node: PatchKey) -> &[PatchKey];

    /// Identity key the node was rendered with.
    fn key(&self, node: PatchKey) -> Option<&Arc<str>>;

    /// Replaces the top-level nodes in `range` with `next`, returning the
    /// patch stream that was applied.
    fn patch_top_level(
        &mut self,
        range: Range<usize>,
        next: &[VNode],
    ) -> Result<Vec<DomPatch>, PatchError>;
}

impl Surface for Screen {
    fn top_level(&self) -> &[PatchKey] {
        Screen::top_level(self)
    }

    fn children(&self, node: PatchKey) -> &[PatchKey] {
        Screen::children(self, node)
    }

    fn key(&self, node: PatchKey) -> Option<&Arc<str>> {
        Screen::key(self, node)
    }

    fn patch_top_level(
        &mut self,
        range: Range<usize>,
        next: &[VNode],
    ) -> Result<Vec<DomPatch>, PatchError> {
        let root = self.root();
        self.patch_children(root, range, next)
    }
}
