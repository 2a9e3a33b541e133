//! Flat formatted runs to nested inline nodes.
//!
//! Formatting attributes are flat per op but must nest in the output. An
//! explicit stack holds one frame per open format, ordered outermost first by
//! priority. Each op keeps the frames whose format and value it repeats, closes
//! everything below the first difference, and opens fresh frames for the rest.
//! Closing a frame renders its node into the frame above (or the output).

use crate::config::{RenderConfig, RenderContext};
use crate::typeset::{Format, Typeset};
use core_types::{AttrValue, Insert, Op};
use vdom::{VElement, VNode};

const NBSP: &str = "\u{a0}";

/// Composed inline child. Only `Mark`s (rendered formats) merge with an
/// identical neighbour; embeds never do.
enum Piece {
    Text(String),
    Embed(VNode),
    Mark(VElement),
}

struct Frame<'t> {
    format: &'t Format,
    value: AttrValue,
    children: Vec<Piece>,
}

pub struct InlineComposer<'t> {
    typeset: &'t Typeset,
    config: RenderConfig,
    cx: RenderContext,
}

impl<'t> InlineComposer<'t> {
    pub fn new(typeset: &'t Typeset, config: RenderConfig, cx: RenderContext) -> Self {
        Self { typeset, config, cx }
    }

    pub fn render(&self, ops: &[Op]) -> Vec<VNode> {
        let mut stack: Vec<Frame<'t>> = Vec::new();
        let mut output: Vec<Piece> = Vec::new();
        let mut trailing_break = true;

        for (i, op) in ops.iter().enumerate() {
            let content = match &op.insert {
                Insert::Text(text) => {
                    if text.is_empty() {
                        None
                    } else {
                        trailing_break = false;
                        let text = if self.config.preserve_whitespace {
                            let prev = i.checked_sub(1).and_then(|j| ops.get(j));
                            preserve_spaces(text, prev, ops.get(i + 1))
                        } else {
                            text.clone()
                        };
                        Some(Piece::Text(text))
                    }
                }
                Insert::Embed(descriptor) => match self.typeset.resolve_embed(descriptor) {
                    Some((embed, value)) => match embed.render_fn() {
                        Some(render) => {
                            if embed.is_hard_break() {
                                trailing_break = true;
                            } else if !embed.is_no_fill() {
                                trailing_break = false;
                            }
                            Some(Piece::Embed(render(value, &self.cx).into()))
                        }
                        None => {
                            log::trace!(
                                target: "render.inline",
                                "embed `{}` has no renderer",
                                embed.name()
                            );
                            None
                        }
                    },
                    None => {
                        log::trace!(target: "render.inline", "unknown embed {descriptor:?}");
                        None
                    }
                },
            };

            let formats = self.formats_of(op);
            let mut depth = 0;
            for (format, value) in formats {
                let keep = stack
                    .get(depth)
                    .is_some_and(|frame| {
                        std::ptr::eq(frame.format, format) && frame.value == *value
                    });
                if !keep {
                    self.collapse(&mut stack, &mut output, depth);
                    stack.push(Frame {
                        format,
                        value: value.clone(),
                        children: Vec::new(),
                    });
                }
                depth += 1;
            }
            self.collapse(&mut stack, &mut output, depth);

            if let Some(piece) = content {
                match stack.last_mut() {
                    Some(frame) => push_piece(&mut frame.children, piece),
                    None => push_piece(&mut output, piece),
                }
            }
        }
        self.collapse(&mut stack, &mut output, 0);

        let mut children: Vec<VNode> = output.into_iter().map(Piece::into_node).collect();
        if trailing_break && self.config.trailing_break {
            children.push(VElement::new("br").into());
        }
        children
    }

    /// Renderable formats of an op, outermost first.
    fn formats_of<'o>(&self, op: &'o Op) -> Vec<(&'t Format, &'o AttrValue)> {
        let Some(attributes) = op.attributes.as_deref() else {
            return Vec::new();
        };
        let mut formats: Vec<_> = attributes
            .iter()
            .filter(|(_, value)| value.is_truthy())
            .filter_map(|(name, value)| {
                let format = self.typeset.format(name)?;
                if format.render_fn().is_none() {
                    log::trace!(target: "render.inline", "format `{name}` has no renderer");
                    return None;
                }
                Some((format, value))
            })
            .collect();
        formats.sort_by(|(a, _), (b, _)| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        formats
    }

    /// Closes frames until `depth` remain, innermost first.
    fn collapse(&self, stack: &mut Vec<Frame<'t>>, output: &mut Vec<Piece>, depth: usize) {
        while stack.len() > depth {
            let Some(frame) = stack.pop() else {
                break;
            };
            let Some(render) = frame.format.render_fn() else {
                continue;
            };
            let children = frame.children.into_iter().map(Piece::into_node).collect();
            let node = render(&frame.value, children, &self.cx);
            match stack.last_mut() {
                Some(parent) => push_piece(&mut parent.children, Piece::Mark(node)),
                None => push_piece(output, Piece::Mark(node)),
            }
        }
    }
}

impl Piece {
    fn into_node(self) -> VNode {
        match self {
            Piece::Text(text) => VNode::Text(text),
            Piece::Embed(node) => node,
            Piece::Mark(el) => VNode::Element(el),
        }
    }
}

fn push_piece(list: &mut Vec<Piece>, piece: Piece) {
    let piece = match (list.last_mut(), piece) {
        (Some(Piece::Text(prev)), Piece::Text(next)) => {
            prev.push_str(&next);
            return;
        }
        (Some(Piece::Mark(prev)), Piece::Mark(next))
            if prev.key.is_none() && prev.same_shape(&next) =>
        {
            for child in next.children {
                push_node(&mut prev.children, child);
            }
            return;
        }
        (_, piece) => piece,
    };
    list.push(piece);
}

fn push_node(list: &mut Vec<VNode>, node: VNode) {
    let node = match (list.last_mut(), node) {
        (Some(VNode::Text(prev)), VNode::Text(next)) => {
            prev.push_str(&next);
            return;
        }
        (_, node) => node,
    };
    list.push(node);
}

/// Replaces spaces that HTML whitespace collapsing would swallow.
fn preserve_spaces(text: &str, prev: Option<&Op>, next: Option<&Op>) -> String {
    if memchr::memchr(b' ', text.as_bytes()).is_none() {
        return text.to_string();
    }
    let mut out = text
        .replace("  ", &format!("{NBSP} "))
        .replace("  ", &format!(" {NBSP}"));
    let leading_exposed = prev.is_none_or(Op::is_embed);
    if leading_exposed && out.starts_with(' ') {
        out.replace_range(..1, NBSP);
    }
    let trailing_exposed = match next {
        None => true,
        Some(next) => next.is_embed() || next.as_text().is_some_and(|t| t.starts_with(' ')),
    };
    if trailing_exposed && out.ends_with(' ') {
        let at = out.len() - 1;
        out.replace_range(at.., NBSP);
    }
    debug_assert_eq!(out.chars().count(), text.chars().count());
    debug_assert!(!out.contains("  "), "double space survived in {out:?}");
    out
}

#[cfg(test)]
mod tests;
