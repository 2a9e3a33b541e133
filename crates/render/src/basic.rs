//! Stock typeset: paragraphs, headers, lists and blockquotes with the common
//! inline marks.

use crate::config::RenderContext;
use crate::typeset::{Embed, Format, LineContent, LineType, Typeset};
use core_types::{AttrValue, Line};
use vdom::{VElement, VNode};

pub fn typeset() -> Typeset {
    Typeset::new()
        .with_line_type(LineType::new("header").render(header))
        .with_line_type(
            LineType::new("list")
                .render_multiple(list)
                .combine_when(|first, next| first.get("list") == next.get("list")),
        )
        .with_line_type(LineType::new("blockquote").render(|_, children, _| {
            VElement::new("blockquote").with_children(children)
        }))
        .with_default_line_type(
            LineType::new("paragraph")
                .render(|_, children, _| VElement::new("p").with_children(children)),
        )
        .with_format(Format::new("link", 0).render(link))
        .with_format(Format::new("bold", 10).render(|_, children, _| {
            VElement::new("strong").with_children(children)
        }))
        .with_format(Format::new("italic", 20).render(|_, children, _| {
            VElement::new("em").with_children(children)
        }))
        .with_format(Format::new("underline", 30).render(|_, children, _| {
            VElement::new("u").with_children(children)
        }))
        .with_format(Format::new("code", 40).render(|_, children, _| {
            VElement::new("code").with_children(children)
        }))
        .with_embed(Embed::new("image").render(|value, _| {
            VElement::new("img").prop("src", value.to_string())
        }))
        .with_embed(Embed::new("br").hard_break().render(|_, _| VElement::new("br")))
}

fn header(line: &Line, children: Vec<VNode>, _cx: &RenderContext) -> VElement {
    let level = line
        .attributes()
        .get("header")
        .and_then(AttrValue::as_int)
        .unwrap_or(1)
        .clamp(1, 6);
    VElement::new(&format!("h{level}")).with_children(children)
}

fn list(items: &[LineContent<'_>], _cx: &RenderContext) -> VElement {
    let ordered = items
        .first()
        .and_then(|item| item.line.attributes().get("list"))
        .and_then(AttrValue::as_str)
        == Some("ordered");
    let items = items
        .iter()
        .map(|item| VElement::new("li").with_children(item.children.clone()).into());
    VElement::new(if ordered { "ol" } else { "ul" }).with_children(items)
}

fn link(value: &AttrValue, children: Vec<VNode>, cx: &RenderContext) -> VElement {
    let el = VElement::new("a").prop("href", value.to_string());
    let el = if cx.for_html {
        el.prop("target", "_blank").prop("rel", "noopener")
    } else {
        el
    };
    el.with_children(children)
}
