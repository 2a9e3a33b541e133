//! Document snapshot model.
//!
//! Lines, attributes and snapshots are immutable once built and are shared
//! through `Arc`. Renderer caches key on the identity of those `Arc`s, so an
//! edit must always produce a new value instead of mutating an existing one.

mod attrs;
mod document;
mod line;

pub use attrs::{AttrValue, Attributes};
pub use document::Document;
pub use line::{Insert, Line, LineId, Op};
