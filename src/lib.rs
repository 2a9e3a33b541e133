//! Rich-text document rendering.
//!
//! `core_types` holds the immutable document model, `vdom` the abstract node
//! tree and its patcher, and `render` the grouping, inline composition and
//! incremental reconciliation that connect the two.

pub use core_types;
pub use render;
pub use vdom;

pub use core_types::{Document, Line, Op};
pub use render::{Reconciler, RenderConfig, RenderError, Typeset};
