//! Pluggable registry of line types, inline formats and embeds.
//!
//! Every capability of a type is optional. What a type is allowed to do is
//! decided by which renderers it carries:
//! - a line type with a combine predicate groups adjacent lines and needs a
//!   multi-line renderer;
//! - a line type with only a single-line renderer renders each line alone;
//! - a line type with neither is not render-eligible and its lines are skipped;
//! - a format or embed without a renderer is skipped.

use crate::config::RenderContext;
use core_types::{AttrValue, Attributes, Line};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use vdom::{VElement, VNode};

type LineRenderFn = Box<dyn Fn(&Line, Vec<VNode>, &RenderContext) -> VElement>;
type MultiRenderFn = Box<dyn Fn(&[LineContent<'_>], &RenderContext) -> VElement>;
type CombineFn = Box<dyn Fn(&Attributes, &Attributes) -> bool>;
type FormatRenderFn = Box<dyn Fn(&AttrValue, Vec<VNode>, &RenderContext) -> VElement>;
type EmbedRenderFn = Box<dyn Fn(&AttrValue, &RenderContext) -> VElement>;

/// One member of a combined group, with its composed inline children.
pub struct LineContent<'a> {
    pub line: &'a Line,
    pub children: Vec<VNode>,
}

/// Index of a line type inside its `Typeset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineTypeId(usize);

pub struct LineType {
    name: Arc<str>,
    render: Option<LineRenderFn>,
    render_multiple: Option<MultiRenderFn>,
    should_combine: Option<CombineFn>,
}

impl LineType {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            render: None,
            render_multiple: None,
            should_combine: None,
        }
    }

    pub fn render(
        mut self,
        f: impl Fn(&Line, Vec<VNode>, &RenderContext) -> VElement + 'static,
    ) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn render_multiple(
        mut self,
        f: impl Fn(&[LineContent<'_>], &RenderContext) -> VElement + 'static,
    ) -> Self {
        self.render_multiple = Some(Box::new(f));
        self
    }

    /// Declares the type combinable. The predicate receives the first line of
    /// the group and the candidate next line.
    pub fn combine_when(mut self, f: impl Fn(&Attributes, &Attributes) -> bool + 'static) -> Self {
        self.should_combine = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn combines(&self) -> bool {
        self.should_combine.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub(crate) fn should_combine(&self, first: &Attributes, next: &Attributes) -> bool {
        self.should_combine
            .as_ref()
            .is_some_and(|f| f(first, next))
    }

    pub(crate) fn render_fn(&self) -> Option<&LineRenderFn> {
        self.render.as_ref()
    }

    pub(crate) fn render_multiple_fn(&self) -> Option<&MultiRenderFn> {
        self.render_multiple.as_ref()
    }
}

impl fmt::Debug for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineType")
            .field("name", &self.name)
            .field("render", &self.render.is_some())
            .field("render_multiple", &self.render_multiple.is_some())
            .field("combines", &self.should_combine.is_some())
            .finish()
    }
}

/// Inline formatting mark such as bold or link.
pub struct Format {
    name: Arc<str>,
    priority: i32,
    render: Option<FormatRenderFn>,
}

impl Format {
    /// Lower priority wraps outside higher priority.
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: Arc::from(name),
            priority,
            render: None,
        }
    }

    pub fn render(
        mut self,
        f: impl Fn(&AttrValue, Vec<VNode>, &RenderContext) -> VElement + 'static,
    ) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn render_fn(&self) -> Option<&FormatRenderFn> {
        self.render.as_ref()
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Embedded object type such as an image or a hard line break.
pub struct Embed {
    name: Arc<str>,
    hard_break: bool,
    no_fill: bool,
    render: Option<EmbedRenderFn>,
}

impl Embed {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            hard_break: false,
            no_fill: false,
            render: None,
        }
    }

    pub fn render(mut self, f: impl Fn(&AttrValue, &RenderContext) -> VElement + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    /// The embed ends a visual line, so a trailing placeholder is needed again.
    pub fn hard_break(mut self) -> Self {
        self.hard_break = true;
        self
    }

    /// The embed takes no vertical space and cannot give a line its height.
    pub fn no_fill(mut self) -> Self {
        self.no_fill = true;
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn is_hard_break(&self) -> bool {
        self.hard_break
    }

    pub fn is_no_fill(&self) -> bool {
        self.no_fill
    }

    pub(crate) fn render_fn(&self) -> Option<&EmbedRenderFn> {
        self.render.as_ref()
    }
}

impl fmt::Debug for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Embed")
            .field("name", &self.name)
            .field("hard_break", &self.hard_break)
            .field("no_fill", &self.no_fill)
            .field("render", &self.render.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Typeset {
    line_types: Vec<LineType>,
    default_line: Option<LineTypeId>,
    formats: Vec<Format>,
    format_index: HashMap<Arc<str>, usize>,
    embeds: Vec<Embed>,
}

impl Typeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a line type. Earlier registrations win when a line's
    /// attributes name several types.
    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_types.push(line_type);
        self
    }

    /// Registers the type used for lines whose attributes name no type.
    pub fn with_default_line_type(mut self, line_type: LineType) -> Self {
        self.default_line = Some(LineTypeId(self.line_types.len()));
        self.line_types.push(line_type);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format_index.insert(Arc::clone(&format.name), self.formats.len());
        self.formats.push(format);
        self
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn resolve_line_type(&self, attributes: &Attributes) -> Option<LineTypeId> {
        self.line_types
            .iter()
            .position(|lt| {
                attributes
                    .get(&lt.name)
                    .is_some_and(AttrValue::is_truthy)
            })
            .map(LineTypeId)
            .or(self.default_line)
    }

    pub fn line_type(&self, id: LineTypeId) -> &LineType {
        &self.line_types[id.0]
    }

    pub fn format(&self, name: &str) -> Option<&Format> {
        self.format_index.get(name).map(|&i| &self.formats[i])
    }

    /// First registered embed named by the descriptor, with its value.
    pub fn resolve_embed<'d>(&self, descriptor: &'d Attributes) -> Option<(&Embed, &'d AttrValue)> {
        self.embeds
            .iter()
            .find_map(|embed| descriptor.get(&embed.name).map(|value| (embed, value)))
    }
}
