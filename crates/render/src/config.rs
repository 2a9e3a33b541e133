/// Tunables of a render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Units added on each side of a changed window when whole units were
    /// inserted or removed, so combined groups spanning the seam re-anchor.
    pub context: usize,
    /// Rewrite spaces the browser would collapse into non-breaking spaces.
    pub preserve_whitespace: bool,
    /// Append a `<br>` to lines whose content would otherwise have no height.
    pub trailing_break: bool,
    /// Maintain the node to document-offset index after every patch.
    pub index_positions: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            context: 1,
            preserve_whitespace: true,
            trailing_break: true,
            index_positions: true,
        }
    }
}

/// Passed to every renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Rendering for HTML export rather than for the live editor surface.
    pub for_html: bool,
}
