//! Incremental renderer for document snapshots.
//!
//! Lines are grouped into render units, each unit's flat formatted content is
//! composed into nested inline nodes, and the result is reconciled onto an
//! on-screen tree. Successive snapshots only rebuild the window of units that
//! changed.

pub mod basic;
pub mod export;
pub mod range_diff;

mod config;
mod error;
mod group;
mod inline;
mod lifecycle;
mod positions;
mod reconcile;
mod surface;
mod typeset;

pub use config::{RenderConfig, RenderContext};
pub use error::{ConfigError, RenderError};
pub use group::{Grouper, RenderUnit, RenderUnits};
pub use inline::InlineComposer;
pub use lifecycle::{RenderEvent, RenderKind, RenderPhase};
pub use positions::{PositionIndex, PositionRange};
pub use reconcile::{Reconciler, RenderReport};
pub use surface::Surface;
pub use typeset::{Embed, Format, LineContent, LineType, LineTypeId, Typeset};
