use crate::attrs::Attributes;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a line across snapshots.
///
/// The renderer uses it as the patch key of the line's on-screen node, so an
/// edited line keeps its id while its content changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(Arc<str>);

impl LineId {
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared handle to the underlying string, for callers that store keys.
    #[inline]
    pub fn as_shared(&self) -> &Arc<str> {
        &self.0
    }
}

impl From<&str> for LineId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for LineId {
    fn from(raw: String) -> Self {
        Self(Arc::from(raw))
    }
}

impl Borrow<str> for LineId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of a content op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Insert {
    Text(String),
    /// Embedded object; the descriptor names the embed type (`{image: "url"}`).
    Embed(Attributes),
}

/// One run of a line's content with its optional formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Op {
    pub insert: Insert,
    pub attributes: Option<Arc<Attributes>>,
}

impl Op {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            insert: Insert::Text(text.into()),
            attributes: None,
        }
    }

    pub fn embed(descriptor: Attributes) -> Self {
        Self {
            insert: Insert::Embed(descriptor),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = if attributes.is_empty() {
            None
        } else {
            Some(Arc::new(attributes))
        };
        self
    }

    /// Document length of the op: chars for text, one for an embed.
    pub fn len(&self) -> usize {
        match &self.insert {
            Insert::Text(text) => text.chars().count(),
            Insert::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_embed(&self) -> bool {
        matches!(self.insert, Insert::Embed(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.insert {
            Insert::Text(text) => Some(text),
            Insert::Embed(_) => None,
        }
    }
}

/// A paragraph-level unit of the document.
#[derive(Debug, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    attributes: Arc<Attributes>,
    content: Vec<Op>,
}

impl Line {
    pub fn new(id: impl Into<LineId>, attributes: Attributes, content: Vec<Op>) -> Self {
        Self::with_shared_attributes(id, Arc::new(attributes), content)
    }

    /// Builds a line that reuses an existing attributes mapping, so caches keyed
    /// on the mapping's identity keep hitting.
    pub fn with_shared_attributes(
        id: impl Into<LineId>,
        attributes: Arc<Attributes>,
        content: Vec<Op>,
    ) -> Self {
        Self {
            id: id.into(),
            attributes,
            content,
        }
    }

    pub fn id(&self) -> &LineId {
        &self.id
    }

    pub fn attributes(&self) -> &Arc<Attributes> {
        &self.attributes
    }

    pub fn content(&self) -> &[Op] {
        &self.content
    }

    /// Content length without the line break.
    pub fn content_len(&self) -> usize {
        self.content.iter().map(Op::len).sum()
    }

    /// Document length including the trailing line break.
    pub fn len(&self) -> usize {
        self.content_len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.content_len() == 0
    }
}
