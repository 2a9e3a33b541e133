//! Arena-backed on-screen tree.
//!
//! Nodes keep their `PatchKey` for as long as they stay live, which is what
//! lets callers attach side tables (position ranges, focus state) to them.

use crate::dom_diff::{KeyAllocator, diff_children};
use crate::dom_patch::{DomPatch, PatchError, PatchKey};
use crate::types::{Props, VElement, VNode};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Borrowed view of a live node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeView<'a> {
    Element {
        tag: &'a Arc<str>,
        props: &'a Props,
        key: Option<&'a Arc<str>>,
    },
    Text(&'a str),
}

pub struct Screen {
    arena: ScreenArena,
    root: PatchKey,
    alloc: KeyAllocator,
}

impl Screen {
    /// Creates a screen whose root element has the given tag.
    pub fn new(root_tag: &str) -> Self {
        let mut alloc = KeyAllocator::default();
        let root = alloc.allocate();
        let mut arena = ScreenArena::new();
        arena.insert(
            root,
            NodeKind::Element {
                tag: Arc::from(root_tag),
                props: Vec::new(),
                key: None,
            },
        );
        Self { arena, root, alloc }
    }

    pub fn root(&self) -> PatchKey {
        self.root
    }

    /// Children of the root element.
    pub fn top_level(&self) -> &[PatchKey] {
        self.children(self.root)
    }

    /// Children of a live node; empty for text nodes and dead handles.
    pub fn children(&self, node: PatchKey) -> &[PatchKey] {
        match self.arena.live.get(&node) {
            Some(&index) => &self.arena.nodes[index].children,
            None => &[],
        }
    }

    pub fn parent(&self, node: PatchKey) -> Option<PatchKey> {
        let index = *self.arena.live.get(&node)?;
        self.arena.nodes[index].parent
    }

    pub fn view(&self, node: PatchKey) -> Option<NodeView<'_>> {
        let index = *self.arena.live.get(&node)?;
        Some(match &self.arena.nodes[index].kind {
            NodeKind::Element { tag, props, key } => NodeView::Element {
                tag,
                props,
                key: key.as_ref(),
            },
            NodeKind::Text { text } => NodeView::Text(text),
        })
    }

    /// Identity key of an element, if it carries one.
    pub fn key(&self, node: PatchKey) -> Option<&Arc<str>> {
        match self.view(node)? {
            NodeView::Element { key, .. } => key,
            NodeView::Text(_) => None,
        }
    }

    pub fn contains(&self, node: PatchKey) -> bool {
        self.arena.live.contains_key(&node)
    }

    /// Number of live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.arena.live.len()
    }

    /// Reconciles `parent`'s children in `range` against `next`, applies the
    /// resulting patch stream and returns it.
    ///
    /// Children outside `range` are never referenced by the stream. A failure
    /// while applying leaves the tree partially patched; callers recover by
    /// patching the whole root again.
    pub fn patch_children(
        &mut self,
        parent: PatchKey,
        range: Range<usize>,
        next: &[VNode],
    ) -> Result<Vec<DomPatch>, PatchError> {
        let mut alloc = self.alloc;
        let patches = diff_children(self, &mut alloc, parent, range.clone(), next)?;
        self.alloc = alloc;
        log::debug!(
            target: "vdom.patch",
            "patch {parent:?}[{}..{}] with {} nodes -> {} ops",
            range.start,
            range.end,
            next.len(),
            patches.len()
        );
        self.apply(&patches)?;
        Ok(patches)
    }

    pub fn apply(&mut self, patches: &[DomPatch]) -> Result<(), PatchError> {
        for patch in patches {
            log::trace!(target: "vdom.patch", "apply {patch:?}");
            self.apply_one(patch)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), PatchError> {
        match patch {
            DomPatch::CreateElement {
                node,
                tag,
                props,
                key,
            } => {
                self.ensure_new(*node)?;
                self.arena.insert(
                    *node,
                    NodeKind::Element {
                        tag: Arc::clone(tag),
                        props: props.clone(),
                        key: key.clone(),
                    },
                );
            }
            DomPatch::CreateText { node, text } => {
                self.ensure_new(*node)?;
                self.arena.insert(*node, NodeKind::Text { text: text.clone() });
            }
            DomPatch::AppendChild { parent, child } => {
                self.arena.attach(*parent, *child, None)?;
            }
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => {
                self.arena.attach(*parent, *child, Some(*before))?;
            }
            DomPatch::Detach { node } => {
                if *node == self.root {
                    return Err(PatchError::InvalidParent(*node));
                }
                self.arena.detach(*node)?;
            }
            DomPatch::RemoveNode { node } => {
                if *node == self.root {
                    return Err(PatchError::InvalidParent(*node));
                }
                self.arena.remove_subtree(*node)?;
            }
            DomPatch::SetProps { node, props } => {
                let index = self.arena.index_of(*node)?;
                match &mut self.arena.nodes[index].kind {
                    NodeKind::Element { props: existing, .. } => {
                        existing.clear();
                        existing.extend(props.iter().cloned());
                    }
                    NodeKind::Text { .. } => return Err(PatchError::WrongNodeKind(*node)),
                }
            }
            DomPatch::SetText { node, text } => {
                let index = self.arena.index_of(*node)?;
                match &mut self.arena.nodes[index].kind {
                    NodeKind::Text { text: existing } => {
                        existing.clear();
                        existing.push_str(text);
                    }
                    NodeKind::Element { .. } => return Err(PatchError::WrongNodeKind(*node)),
                }
            }
        }
        Ok(())
    }

    fn ensure_new(&self, node: PatchKey) -> Result<(), PatchError> {
        if node == PatchKey::INVALID {
            return Err(PatchError::InvalidKey(node));
        }
        if self.arena.live.contains_key(&node) {
            return Err(PatchError::DuplicateKey(node));
        }
        Ok(())
    }

    /// Rebuilds the abstract subtree rooted at `node`.
    pub fn materialize(&self, node: PatchKey) -> Result<VNode, PatchError> {
        let index = self.arena.index_of(node)?;
        let record = &self.arena.nodes[index];
        Ok(match &record.kind {
            NodeKind::Element { tag, props, key } => {
                let children = record
                    .children
                    .iter()
                    .map(|child| self.materialize(*child))
                    .collect::<Result<Vec<_>, _>>()?;
                VNode::Element(VElement {
                    tag: Arc::clone(tag),
                    props: props.clone(),
                    children,
                    key: key.clone(),
                })
            }
            NodeKind::Text { text } => VNode::Text(text.clone()),
        })
    }

    /// Abstract copy of every top-level node, in order.
    pub fn to_vnodes(&self) -> Result<Vec<VNode>, PatchError> {
        self.top_level()
            .iter()
            .map(|node| self.materialize(*node))
            .collect()
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new("div")
    }
}

struct ScreenArena {
    nodes: Vec<NodeRecord>,
    live: HashMap<PatchKey, usize>,
    free: Vec<usize>,
}

impl ScreenArena {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            live: HashMap::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, key: PatchKey, kind: NodeKind) {
        let record = NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = record;
                index
            }
            None => {
                self.nodes.push(record);
                self.nodes.len() - 1
            }
        };
        self.live.insert(key, index);
    }

    fn index_of(&self, key: PatchKey) -> Result<usize, PatchError> {
        if key == PatchKey::INVALID {
            return Err(PatchError::InvalidKey(key));
        }
        self.live
            .get(&key)
            .copied()
            .ok_or(PatchError::MissingKey(key))
    }

    fn attach(
        &mut self,
        parent: PatchKey,
        child: PatchKey,
        before: Option<PatchKey>,
    ) -> Result<(), PatchError> {
        if parent == child || self.is_descendant(child, parent) {
            return Err(PatchError::CycleDetected { parent, child });
        }
        let parent_index = self.index_of(parent)?;
        let child_index = self.index_of(child)?;
        if !self.nodes[parent_index].allows_children() {
            return Err(PatchError::InvalidParent(parent));
        }
        if self.nodes[child_index].parent.is_some() {
            return Err(PatchError::InvalidParent(child));
        }
        let siblings = &mut self.nodes[parent_index].children;
        match before {
            Some(before) => {
                let pos = siblings
                    .iter()
                    .position(|k| *k == before)
                    .ok_or(PatchError::InvalidSibling { parent, before })?;
                siblings.insert(pos, child);
            }
            None => siblings.push(child),
        }
        self.nodes[child_index].parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, key: PatchKey) -> Result<(), PatchError> {
        let index = self.index_of(key)?;
        if let Some(parent) = self.nodes[index].parent.take() {
            if let Some(&parent_index) = self.live.get(&parent) {
                self.nodes[parent_index].children.retain(|k| *k != key);
            }
        }
        Ok(())
    }

    fn remove_subtree(&mut self, key: PatchKey) -> Result<(), PatchError> {
        self.detach(key)?;
        let index = self.index_of(key)?;
        let children = std::mem::take(&mut self.nodes[index].children);
        self.live.remove(&key);
        self.free.push(index);
        for child in children {
            if self.live.contains_key(&child) {
                if let Some(&child_index) = self.live.get(&child) {
                    self.nodes[child_index].parent = None;
                }
                self.remove_subtree(child)?;
            }
        }
        Ok(())
    }

    fn is_descendant(&self, ancestor: PatchKey, maybe_descendant: PatchKey) -> bool {
        let Some(&index) = self.live.get(&ancestor) else {
            return false;
        };
        let mut stack: Vec<PatchKey> = self.nodes[index].children.clone();
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            if let Some(&child_index) = self.live.get(&current) {
                stack.extend(self.nodes[child_index].children.iter().copied());
            }
        }
        false
    }
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<PatchKey>,
    children: Vec<PatchKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

enum NodeKind {
    Element {
        tag: Arc<str>,
        props: Props,
        key: Option<Arc<str>>,
    },
    Text {
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(key: &str, text: &str) -> VNode {
        VElement::new("p")
            .keyed(Arc::from(key))
            .child(VNode::text(text))
            .into()
    }

    #[test]
    fn patch_builds_tree_from_empty() {
        let mut screen = Screen::default();
        let root = screen.root();
        screen
            .patch_children(root, 0..0, &[p("a", "one"), p("b", "two")])
            .expect("patch failed");
        assert_eq!(screen.top_level().len(), 2);
        assert_eq!(
            screen.to_vnodes().expect("materialize failed"),
            vec![p("a", "one"), p("b", "two")]
        );
    }

    #[test]
    fn keyed_nodes_keep_their_handles_across_patches() {
        let mut screen = Screen::default();
        let root = screen.root();
        screen
            .patch_children(root, 0..0, &[p("a", "one"), p("b", "two")])
            .expect("patch failed");
        let before = screen.top_level().to_vec();
        screen
            .patch_children(root, 0..2, &[p("a", "uno"), p("b", "two")])
            .expect("patch failed");
        assert_eq!(screen.top_level(), &before[..]);
        let text = screen.children(before[0])[0];
        assert_eq!(screen.view(text), Some(NodeView::Text("uno")));
    }

    #[test]
    fn removed_subtree_frees_every_handle() {
        let mut screen = Screen::default();
        let root = screen.root();
        screen
            .patch_children(root, 0..0, &[p("a", "one")])
            .expect("patch failed");
        let a = screen.top_level()[0];
        let text = screen.children(a)[0];
        screen.patch_children(root, 0..1, &[]).expect("patch failed");
        assert!(!screen.contains(a));
        assert!(!screen.contains(text));
        assert_eq!(screen.live_count(), 1);
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut screen = Screen::default();
        let root = screen.root();
        screen
            .patch_children(root, 0..0, &[p("a", "one")])
            .expect("patch failed");
        let a = screen.top_level()[0];
        let err = screen
            .apply(&[DomPatch::AppendChild {
                parent: a,
                child: root,
            }])
            .unwrap_err();
        assert_eq!(err, PatchError::CycleDetected { parent: a, child: root });
    }

    #[test]
    fn out_of_bounds_range_is_rejected() {
        let mut screen = Screen::default();
        let root = screen.root();
        let err = screen.patch_children(root, 0..3, &[]).unwrap_err();
        assert!(matches!(err, PatchError::RangeOutOfBounds { len: 0, .. }));
    }
}
