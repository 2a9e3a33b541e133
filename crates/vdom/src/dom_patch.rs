//! On-screen tree patch protocol.
//!
//! The differ emits these operations and `Screen` applies them.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to live nodes at the time they are used (except
//!   the `node` in create operations).
//! - A created node has no parent until an `AppendChild`/`InsertBefore`
//!   attaches it; `Detach` returns a node to that state without freeing it.
//! - All `PatchKey` values used in patches must be non-zero.
//! - Property order and duplicates are preserved; appliers must not dedupe.
//! - Operations must not create cycles; a node may have at most one parent.

use crate::types::Props;
use std::sync::Arc;

/// Stable handle of an on-screen node. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: PatchKey = PatchKey(0);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element.
    CreateElement {
        node: PatchKey,
        tag: Arc<str>,
        props: Props,
        key: Option<Arc<str>>,
    },
    /// Create a detached text node.
    CreateText { node: PatchKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Insert a child before an existing sibling.
    InsertBefore {
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    },
    /// Detach a node from its parent, keeping its subtree live for reinsertion.
    Detach { node: PatchKey },
    /// Remove a node and its entire subtree.
    ///
    /// After removal, handles in the subtree are invalid for the remainder of
    /// the stream.
    RemoveNode { node: PatchKey },
    /// Replace all properties of an element.
    SetProps { node: PatchKey, props: Props },
    /// Replace the content of a text node.
    SetText { node: PatchKey, text: String },
}

impl DomPatch {
    /// Every handle the operation references.
    pub fn touched(&self) -> Vec<PatchKey> {
        match self {
            DomPatch::CreateElement { node, .. }
            | DomPatch::CreateText { node, .. }
            | DomPatch::Detach { node }
            | DomPatch::RemoveNode { node }
            | DomPatch::SetProps { node, .. }
            | DomPatch::SetText { node, .. } => vec![*node],
            DomPatch::AppendChild { parent, child } => vec![*parent, *child],
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => vec![*parent, *child, *before],
        }
    }

    /// The handle whose own state or position the operation changes. Parents
    /// and `before` anchors are only read.
    pub fn mutated(&self) -> PatchKey {
        match self {
            DomPatch::CreateElement { node, .. }
            | DomPatch::CreateText { node, .. }
            | DomPatch::Detach { node }
            | DomPatch::RemoveNode { node }
            | DomPatch::SetProps { node, .. }
            | DomPatch::SetText { node, .. } => *node,
            DomPatch::AppendChild { child, .. } | DomPatch::InsertBefore { child, .. } => *child,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("invalid patch key {0:?}")]
    InvalidKey(PatchKey),
    #[error("duplicate patch key {0:?}")]
    DuplicateKey(PatchKey),
    #[error("no live node for {0:?}")]
    MissingKey(PatchKey),
    #[error("operation does not apply to the kind of node {0:?}")]
    WrongNodeKind(PatchKey),
    #[error("{0:?} cannot take part in this parent/child relation")]
    InvalidParent(PatchKey),
    #[error("{before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: PatchKey, before: PatchKey },
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: PatchKey, child: PatchKey },
    #[error("child range {start}..{end} out of bounds for {parent:?} with {len} children")]
    RangeOutOfBounds {
        parent: PatchKey,
        start: usize,
        end: usize,
        len: usize,
    },
}
