use crate::VNode;
use std::fmt::{self, Write};

/// Deterministic, line-per-node serialization of abstract node lists for tests.
/// Not a public stable format.
///
/// Equivalence rules:
/// - Node kinds, tags and keys must match.
/// - Property order is significant; names and values must match.
/// - Text must match exactly; non-breaking spaces print as `\u{a0}`.
#[derive(Debug)]
pub struct NodeSnapshot {
    lines: Vec<String>,
}

impl NodeSnapshot {
    pub fn new(nodes: &[VNode]) -> Self {
        let mut lines = Vec::new();
        for node in nodes {
            walk_snapshot(node, 0, &mut lines);
        }
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

pub fn assert_nodes_eq(expected: &[VNode], actual: &[VNode]) {
    let expected = NodeSnapshot::new(expected);
    let actual = NodeSnapshot::new(actual);
    if expected.lines == actual.lines {
        return;
    }
    let first_diff = expected
        .lines
        .iter()
        .zip(actual.lines.iter())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.lines.len().min(actual.lines.len()));
    panic!(
        "node mismatch at line {first_diff}\nexpected:\n{expected}\nactual:\n{actual}"
    );
}

fn walk_snapshot(node: &VNode, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth * INDENT_STEP);
    match node {
        VNode::Text(text) => {
            line.push('"');
            write_escaped(&mut line, text);
            line.push('"');
            out.push(line);
        }
        VNode::Element(el) => {
            line.push('<');
            line.push_str(&el.tag);
            if let Some(key) = &el.key {
                let _ = write!(&mut line, " key={key}");
            }
            for (name, value) in &el.props {
                let _ = write!(&mut line, " {name}=\"");
                write_escaped(&mut line, value);
                line.push('"');
            }
            line.push('>');
            out.push(line);
            for child in &el.children {
                walk_snapshot(child, depth + 1, out);
            }
        }
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\u{a0}' => out.push_str("\\u{a0}"),
            _ => out.push(ch),
        }
    }
}
