pub mod dom_diff;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod html;

mod dom_patch;
mod screen;
mod types;

pub use crate::dom_diff::{KeyAllocator, diff_children};
pub use crate::dom_patch::{DomPatch, PatchError, PatchKey};
pub use crate::screen::{NodeView, Screen};
pub use crate::types::{Props, VElement, VNode};
