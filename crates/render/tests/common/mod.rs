#![allow(dead_code)]

use core_types::{Attributes, Line, Op};
use std::sync::Arc;
use vdom::{PatchKey, Screen, VElement, VNode};

pub fn para(id: &str, text: &str) -> Line {
    Line::new(id, Attributes::new(), vec![Op::text(text)])
}

pub fn bullet(id: &str, text: &str) -> Line {
    Line::new(id, Attributes::new().with("list", "bullet"), vec![Op::text(text)])
}

pub fn ordered(id: &str, text: &str) -> Line {
    Line::new(id, Attributes::new().with("list", "ordered"), vec![Op::text(text)])
}

pub fn header(id: &str, level: i64, text: &str) -> Line {
    Line::new(id, Attributes::new().with("header", level), vec![Op::text(text)])
}

pub fn keyed(tag: &str, key: &str, children: Vec<VNode>) -> VNode {
    VElement::new(tag)
        .keyed(Arc::from(key))
        .with_children(children)
        .into()
}

pub fn text(t: &str) -> VNode {
    VNode::text(t)
}

pub fn li(key: &str, t: &str) -> VNode {
    keyed("li", key, vec![text(t)])
}

/// Top-level handles plus the children of every top-level node.
pub fn handles(screen: &Screen) -> Vec<PatchKey> {
    let mut out = Vec::new();
    for &node in screen.top_level() {
        out.push(node);
        out.extend_from_slice(screen.children(node));
    }
    out
}
