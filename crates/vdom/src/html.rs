//! HTML serialization of abstract nodes.

use crate::VNode;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn to_html(nodes: &[VNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

pub fn write_node(out: &mut String, node: &VNode) {
    match node {
        VNode::Text(text) => escape_text(out, text),
        VNode::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.props {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(out, value);
                out.push('"');
            }
            out.push('>');
            if is_void(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(out, child);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
}
