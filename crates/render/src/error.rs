use core_types::LineId;
use std::sync::Arc;
use vdom::PatchError;

/// A typeset that cannot render what it claims to handle.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line type `{line_type}` has no single-line renderer (line {line})")]
    MissingRender { line_type: Arc<str>, line: LineId },
    #[error("line type `{line_type}` combines lines but has no multi-line renderer (line {line})")]
    MissingRenderMultiple { line_type: Arc<str>, line: LineId },
    #[error("line {0} no longer resolves to a line type")]
    UnresolvedLine(LineId),
    #[error("combined unit has no lines")]
    EmptyGroup,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("tree patch failed: {0}")]
    Patch(#[from] PatchError),
}
