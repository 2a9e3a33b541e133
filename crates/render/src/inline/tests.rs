use super::InlineComposer;
use crate::config::{RenderConfig, RenderContext};
use crate::typeset::{Embed, Format, Typeset};
use core_types::{Attributes, Op};
use vdom::dom_snapshot::assert_nodes_eq;
use vdom::{VElement, VNode};

fn typeset() -> Typeset {
    Typeset::new()
        .with_format(Format::new("link", 0).render(|value, children, _| {
            VElement::new("a")
                .prop("href", value.to_string())
                .with_children(children)
        }))
        .with_format(Format::new("bold", 10).render(|_, children, _| {
            VElement::new("strong").with_children(children)
        }))
        .with_format(Format::new("italic", 20).render(|_, children, _| {
            VElement::new("em").with_children(children)
        }))
        .with_format(Format::new("inert", 5))
        .with_embed(Embed::new("image").render(|value, _| {
            VElement::new("img").prop("src", value.to_string())
        }))
        .with_embed(Embed::new("br").hard_break().render(|_, _| VElement::new("br")))
        .with_embed(Embed::new("anchor").no_fill().render(|_, _| {
            VElement::new("span").prop("class", "anchor")
        }))
}

fn compose(ops: &[Op]) -> Vec<VNode> {
    let ts = typeset();
    InlineComposer::new(&ts, RenderConfig::default(), RenderContext::default()).render(ops)
}

fn text(t: &str) -> VNode {
    VNode::text(t)
}

fn el(tag: &str, children: Vec<VNode>) -> VNode {
    VElement::new(tag).with_children(children).into()
}

fn link(href: &str, children: Vec<VNode>) -> VNode {
    VElement::new("a").prop("href", href).with_children(children).into()
}

fn br() -> VNode {
    VElement::new("br").into()
}

fn attrs() -> Attributes {
    Attributes::new()
}

#[test]
fn lower_priority_format_wraps_outside() {
    let ops = [Op::text("hi").with_attributes(attrs().with("bold", true).with("link", "u"))];
    assert_nodes_eq(&compose(&ops), &[link("u", vec![el("strong", vec![text("hi")])])]);
}

#[test]
fn consecutive_plain_text_merges_into_one_child() {
    let ops = [Op::text("ab"), Op::text("cd")];
    assert_nodes_eq(&compose(&ops), &[text("abcd")]);
}

#[test]
fn consecutive_runs_with_same_format_share_one_node() {
    let bold = attrs().with("bold", true);
    let ops = [
        Op::text("a").with_attributes(bold.clone()),
        Op::text("b").with_attributes(bold.clone().with("italic", true)),
        Op::text("c").with_attributes(bold),
    ];
    assert_nodes_eq(
        &compose(&ops),
        &[el("strong", vec![text("a"), el("em", vec![text("b")]), text("c")])],
    );
}

#[test]
fn changed_value_closes_the_frame() {
    let ops = [
        Op::text("a").with_attributes(attrs().with("link", "u1")),
        Op::text("b").with_attributes(attrs().with("link", "u2")),
    ];
    assert_nodes_eq(
        &compose(&ops),
        &[link("u1", vec![text("a")]), link("u2", vec![text("b")])],
    );
}

#[test]
fn unformatted_op_collapses_the_whole_stack() {
    let ops = [
        Op::text("a").with_attributes(attrs().with("link", "u").with("bold", true)),
        Op::text("b"),
    ];
    assert_nodes_eq(
        &compose(&ops),
        &[link("u", vec![el("strong", vec![text("a")])]), text("b")],
    );
}

#[test]
fn dropping_an_inner_format_keeps_the_outer_frame() {
    let ops = [
        Op::text("a").with_attributes(attrs().with("link", "u").with("bold", true)),
        Op::text("b").with_attributes(attrs().with("link", "u")),
    ];
    assert_nodes_eq(
        &compose(&ops),
        &[link("u", vec![el("strong", vec![text("a")]), text("b")])],
    );
}

#[test]
fn outer_change_reopens_inner_frames() {
    let ops = [
        Op::text("a").with_attributes(attrs().with("bold", true)),
        Op::text("b").with_attributes(attrs().with("link", "u").with("bold", true)),
    ];
    assert_nodes_eq(
        &compose(&ops),
        &[el("strong", vec![text("a")]), link("u", vec![el("strong", vec![text("b")])])],
    );
}

#[test]
fn format_without_renderer_is_skipped() {
    let ops = [Op::text("a").with_attributes(attrs().with("inert", true).with("bold", true))];
    assert_nodes_eq(&compose(&ops), &[el("strong", vec![text("a")])]);
}

#[test]
fn false_attribute_does_not_open_a_frame() {
    let ops = [Op::text("a").with_attributes(attrs().with("bold", false))];
    assert_nodes_eq(&compose(&ops), &[text("a")]);
}

#[test]
fn empty_line_gets_a_trailing_break() {
    assert_nodes_eq(&compose(&[]), &[br()]);
}

#[test]
fn line_ending_in_text_has_no_trailing_break() {
    assert_nodes_eq(&compose(&[Op::text("x")]), &[text("x")]);
}

#[test]
fn non_filling_embed_alone_still_needs_a_break() {
    let ops = [Op::embed(attrs().with("anchor", true))];
    let anchor: VNode = VElement::new("span").prop("class", "anchor").into();
    assert_nodes_eq(&compose(&ops), &[anchor, br()]);
}

#[test]
fn image_fills_the_line() {
    let ops = [Op::embed(attrs().with("image", "a.png"))];
    let img: VNode = VElement::new("img").prop("src", "a.png").into();
    assert_nodes_eq(&compose(&ops), &[img]);
}

#[test]
fn hard_break_at_the_end_needs_a_placeholder() {
    let ops = [Op::text("x"), Op::embed(attrs().with("br", true))];
    assert_nodes_eq(&compose(&ops), &[text("x"), br(), br()]);
}

#[test]
fn identical_adjacent_embeds_are_not_merged() {
    let image = || Op::embed(attrs().with("image", "a.png"));
    let nodes = compose(&[image(), image()]);
    assert_eq!(nodes.len(), 2);
}

#[test]
fn unknown_embed_is_skipped() {
    let ops = [Op::embed(attrs().with("video", "v.mp4")), Op::text("x")];
    assert_nodes_eq(&compose(&ops), &[text("x")]);
}

#[test]
fn formatted_embed_is_wrapped() {
    let image = Op::embed(attrs().with("image", "a.png"));
    let ops = [image.with_attributes(attrs().with("link", "u"))];
    let img: VNode = VElement::new("img").prop("src", "a.png").into();
    assert_nodes_eq(&compose(&ops), &[link("u", vec![img])]);
}

#[test]
fn edge_and_double_spaces_become_non_breaking() {
    let ops = [Op::text(" a  b ")];
    assert_nodes_eq(&compose(&ops), &[text("\u{a0}a\u{a0} b\u{a0}")]);
}

#[test]
fn inner_spaces_between_text_runs_stay_plain() {
    let ops = [
        Op::text("a ").with_attributes(attrs().with("bold", true)),
        Op::text("b"),
    ];
    assert_nodes_eq(&compose(&ops), &[el("strong", vec![text("a ")]), text("b")]);
}

#[test]
fn space_before_embed_is_protected() {
    let ops = [Op::text("a "), Op::embed(attrs().with("image", "x")), Op::text(" b")];
    let img: VNode = VElement::new("img").prop("src", "x").into();
    assert_nodes_eq(
        &compose(&ops),
        &[text("a\u{a0}"), img, text("\u{a0}b")],
    );
}

#[test]
fn whitespace_and_break_can_be_disabled() {
    let ts = typeset();
    let config = RenderConfig {
        preserve_whitespace: false,
        trailing_break: false,
        ..RenderConfig::default()
    };
    let composer = InlineComposer::new(&ts, config, RenderContext::default());
    assert_nodes_eq(&composer.render(&[Op::text(" a ")]), &[text(" a ")]);
    assert!(composer.render(&[]).is_empty());
}
