//! Keyed child-list diffing to patch streams.
//!
//! Contract:
//! - Only the children of `parent` inside `range` are reconciled; siblings
//!   outside it are never referenced by the output.
//! - Keyed elements match the old element with the same key and tag.
//! - Unkeyed nodes match, in order, the next unused unkeyed old node of the
//!   same kind (text, or element with the same tag).
//! - Matched nodes keep their handle; property and text changes become
//!   `SetProps`/`SetText`, and their children are diffed recursively.
//! - Unmatched old nodes are removed, unmatched new nodes are created.
//! - Ordering moves use `Detach` + `InsertBefore`, placing nodes right to left
//!   so nodes already in position emit nothing.
//!
//! Complexity: O(n) matching per level plus O(n * m) for position fixing,
//! where m is the number of moved nodes.

use crate::dom_patch::{DomPatch, PatchError, PatchKey};
use crate::screen::{NodeView, Screen};
use crate::types::VNode;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

/// Monotonic source of fresh `PatchKey`s.
#[derive(Clone, Copy, Debug)]
pub struct KeyAllocator {
    next: u32,
}

impl KeyAllocator {
    pub fn allocate(&mut self) -> PatchKey {
        let key = PatchKey(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        key
    }
}

impl Default for KeyAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

pub fn diff_children(
    screen: &Screen,
    alloc: &mut KeyAllocator,
    parent: PatchKey,
    range: Range<usize>,
    next: &[VNode],
) -> Result<Vec<DomPatch>, PatchError> {
    if !screen.contains(parent) {
        return Err(PatchError::MissingKey(parent));
    }
    let len = screen.children(parent).len();
    if range.start > range.end || range.end > len {
        return Err(PatchError::RangeOutOfBounds {
            parent,
            start: range.start,
            end: range.end,
            len,
        });
    }
    let mut patches = Vec::new();
    diff_slice(screen, alloc, parent, range, next, &mut patches)?;
    Ok(patches)
}

fn diff_slice(
    screen: &Screen,
    alloc: &mut KeyAllocator,
    parent: PatchKey,
    range: Range<usize>,
    next: &[VNode],
    patches: &mut Vec<DomPatch>,
) -> Result<(), PatchError> {
    let current = screen.children(parent);
    let old = &current[range.clone()];

    let mut keyed: HashMap<&Arc<str>, PatchKey> = HashMap::new();
    let mut unkeyed: Vec<PatchKey> = Vec::new();
    for &node in old {
        match screen.key(node) {
            Some(key) => {
                keyed.insert(key, node);
            }
            None => unkeyed.push(node),
        }
    }

    let mut used: HashSet<PatchKey> = HashSet::new();
    let mut cursor = 0usize;
    // (handle, freshly created)
    let mut placed: Vec<(PatchKey, bool)> = Vec::with_capacity(next.len());

    for node in next {
        let candidate = match node.key() {
            Some(key) => keyed
                .get(key)
                .copied()
                .filter(|old| !used.contains(old) && compatible(screen, *old, node)),
            None => {
                let found = unkeyed[cursor..]
                    .iter()
                    .position(|old| !used.contains(old) && compatible(screen, *old, node));
                found.map(|offset| {
                    let old = unkeyed[cursor + offset];
                    cursor += offset + 1;
                    old
                })
            }
        };
        match candidate {
            Some(old) => {
                used.insert(old);
                emit_update(screen, alloc, old, node, patches)?;
                placed.push((old, false));
            }
            None => {
                let created = emit_create_subtree(alloc, node, patches);
                placed.push((created, true));
            }
        }
    }

    let mut sim: Vec<PatchKey> = Vec::with_capacity(current.len());
    for (i, &node) in current.iter().enumerate() {
        if range.contains(&i) && !used.contains(&node) {
            patches.push(DomPatch::RemoveNode { node });
        } else {
            sim.push(node);
        }
    }

    let mut anchor = current.get(range.end).copied();
    for &(node, created) in placed.iter().rev() {
        if !created {
            if let Some(pos) = sim.iter().position(|k| *k == node) {
                if sim.get(pos + 1).copied() == anchor {
                    anchor = Some(node);
                    continue;
                }
                patches.push(DomPatch::Detach { node });
                sim.remove(pos);
            }
        }
        match anchor {
            Some(before) => {
                patches.push(DomPatch::InsertBefore {
                    parent,
                    child: node,
                    before,
                });
                let pos = sim.iter().position(|k| *k == before).unwrap_or(sim.len());
                sim.insert(pos, node);
            }
            None => {
                patches.push(DomPatch::AppendChild {
                    parent,
                    child: node,
                });
                sim.push(node);
            }
        }
        anchor = Some(node);
    }
    Ok(())
}

fn compatible(screen: &Screen, old: PatchKey, next: &VNode) -> bool {
    match (screen.view(old), next) {
        (Some(NodeView::Text(_)), VNode::Text(_)) => true,
        (Some(NodeView::Element { tag, key, .. }), VNode::Element(el)) => {
            *tag == el.tag && key == el.key.as_ref()
        }
        _ => false,
    }
}

fn emit_update(
    screen: &Screen,
    alloc: &mut KeyAllocator,
    node: PatchKey,
    next: &VNode,
    patches: &mut Vec<DomPatch>,
) -> Result<(), PatchError> {
    match (screen.view(node), next) {
        (Some(NodeView::Text(text)), VNode::Text(next_text)) => {
            if text != next_text {
                patches.push(DomPatch::SetText {
                    node,
                    text: next_text.clone(),
                });
            }
            Ok(())
        }
        (Some(NodeView::Element { props, .. }), VNode::Element(el)) => {
            if *props != el.props {
                patches.push(DomPatch::SetProps {
                    node,
                    props: el.props.clone(),
                });
            }
            let len = screen.children(node).len();
            diff_slice(screen, alloc, node, 0..len, &el.children, patches)
        }
        (None, _) => Err(PatchError::MissingKey(node)),
        _ => Err(PatchError::WrongNodeKind(node)),
    }
}

fn emit_create_subtree(
    alloc: &mut KeyAllocator,
    node: &VNode,
    patches: &mut Vec<DomPatch>,
) -> PatchKey {
    let key = alloc.allocate();
    match node {
        VNode::Text(text) => {
            patches.push(DomPatch::CreateText {
                node: key,
                text: text.clone(),
            });
        }
        VNode::Element(el) => {
            patches.push(DomPatch::CreateElement {
                node: key,
                tag: Arc::clone(&el.tag),
                props: el.props.clone(),
                key: el.key.clone(),
            });
            for child in &el.children {
                let child = emit_create_subtree(alloc, child, patches);
                patches.push(DomPatch::AppendChild { parent: key, child });
            }
        }
    }
    key
}
