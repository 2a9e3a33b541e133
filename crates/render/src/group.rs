//! Partitioning of a line sequence into render units.
//!
//! All memo tables are keyed by `Arc` address and hold only `Weak` handles:
//! a live `Weak` pins the allocation, so an address cannot be reused while
//! its entry exists, and the tables never keep a line alive on their own.

use crate::typeset::{LineTypeId, Typeset};
use core_types::{Attributes, Line, LineId};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A line rendered on its own, or a run of lines rendered as one node.
#[derive(Clone, Debug)]
pub enum RenderUnit {
    Single(Arc<Line>),
    Combined(Arc<[Arc<Line>]>),
}

impl RenderUnit {
    /// Id of the first line; the patch key of the unit's on-screen node.
    /// `None` only for a hand-built empty group.
    pub fn key(&self) -> Option<&LineId> {
        self.lines().first().map(|line| line.id())
    }

    pub fn lines(&self) -> &[Arc<Line>] {
        match self {
            RenderUnit::Single(line) => std::slice::from_ref(line),
            RenderUnit::Combined(lines) => lines,
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, RenderUnit::Combined(_))
    }

    /// Identity comparison: the same line, or groups whose members are the
    /// same lines in the same order.
    pub fn same_as(&self, other: &RenderUnit) -> bool {
        match (self, other) {
            (RenderUnit::Single(a), RenderUnit::Single(b)) => Arc::ptr_eq(a, b),
            (RenderUnit::Combined(a), RenderUnit::Combined(b)) => {
                let same_members = || {
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y))
                };
                Arc::ptr_eq(a, b) || same_members()
            }
            _ => false,
        }
    }
}

/// Ordered render units of one line sequence.
#[derive(Debug, Default)]
pub struct RenderUnits {
    units: Vec<RenderUnit>,
    by_key: HashMap<LineId, usize>,
    skipped: Vec<Arc<Line>>,
}

impl RenderUnits {
    pub fn units(&self) -> &[RenderUnit] {
        &self.units
    }

    pub fn get(&self, key: &str) -> Option<&RenderUnit> {
        self.by_key.get(key).map(|&i| &self.units[i])
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Lines left out because no render-eligible line type applies to them.
    pub fn skipped(&self) -> &[Arc<Line>] {
        &self.skipped
    }

    fn push(&mut self, unit: RenderUnit) {
        if let Some(key) = unit.key() {
            self.by_key.insert(key.clone(), self.units.len());
        }
        self.units.push(unit);
    }
}

#[derive(Debug, Default)]
pub struct Grouper {
    line_types: HashMap<usize, (Weak<Attributes>, Option<LineTypeId>)>,
    groups: HashMap<usize, (Weak<Line>, Weak<[Arc<Line>]>)>,
    sequences: HashMap<usize, (Weak<[Arc<Line>]>, Weak<RenderUnits>)>,
}

impl Grouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line type of `line`, cached per attributes mapping.
    pub fn line_type(&mut self, typeset: &Typeset, line: &Line) -> Option<LineTypeId> {
        let attributes = line.attributes();
        let addr = addr_of(attributes);
        if let Some((weak, id)) = self.line_types.get(&addr) {
            if is_live(weak) {
                return *id;
            }
        }
        let id = typeset.resolve_line_type(attributes);
        self.line_types.insert(addr, (Arc::downgrade(attributes), id));
        id
    }

    /// Groups `lines`, returning the cached collection when the same sequence
    /// was grouped before and its result is still alive.
    pub fn group(&mut self, typeset: &Typeset, lines: &Arc<[Arc<Line>]>) -> Arc<RenderUnits> {
        let addr = addr_of(lines);
        if let Some((seq, units)) = self.sequences.get(&addr) {
            if is_live(seq) {
                if let Some(units) = units.upgrade() {
                    log::trace!(
                        target: "render.group",
                        "sequence memo hit ({} units)",
                        units.len()
                    );
                    return units;
                }
            }
        }
        let units = Arc::new(self.build(typeset, lines));
        log::debug!(
            target: "render.group",
            "grouped {} lines into {} units ({} skipped)",
            lines.len(),
            units.len(),
            units.skipped().len()
        );
        self.sequences.insert(addr, (Arc::downgrade(lines), Arc::downgrade(&units)));
        units
    }

    fn build(&mut self, typeset: &Typeset, lines: &[Arc<Line>]) -> RenderUnits {
        let mut out = RenderUnits::default();
        let mut collect: Vec<Arc<Line>> = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let Some(id) = self.line_type(typeset, line) else {
                log::trace!(target: "render.group", "line {} has no line type", line.id());
                out.skipped.push(Arc::clone(line));
                continue;
            };
            let line_type = typeset.line_type(id);
            if line_type.combines() {
                collect.push(Arc::clone(line));
                let close = match lines.get(i + 1) {
                    None => true,
                    Some(next) => {
                        self.line_type(typeset, next) != Some(id)
                            || !line_type.should_combine(collect[0].attributes(), next.attributes())
                    }
                };
                if close {
                    let group = self.memoize_group(std::mem::take(&mut collect));
                    out.push(RenderUnit::Combined(group));
                }
            } else if line_type.has_render() {
                out.push(RenderUnit::Single(Arc::clone(line)));
            } else {
                log::trace!(
                    target: "render.group",
                    "line {} skipped: `{}` is not render-eligible",
                    line.id(),
                    line_type.name()
                );
                out.skipped.push(Arc::clone(line));
            }
        }
        out
    }

    /// Returns the previous group recorded for the same leading line when it
    /// has exactly the same members, otherwise records `collect` as the new one.
    fn memoize_group(&mut self, collect: Vec<Arc<Line>>) -> Arc<[Arc<Line>]> {
        let first = Arc::downgrade(&collect[0]);
        let addr = addr_of(&collect[0]);
        if let Some((line, group)) = self.groups.get(&addr) {
            if is_live(line) {
                if let Some(prev) = group.upgrade() {
                    let same = prev.len() == collect.len()
                        && prev.iter().zip(&collect).all(|(a, b)| Arc::ptr_eq(a, b));
                    if same {
                        return prev;
                    }
                }
            }
        }
        let group: Arc<[Arc<Line>]> = Arc::from(collect);
        self.groups.insert(addr, (first, Arc::downgrade(&group)));
        group
    }

    /// Drops entries whose keys are gone.
    pub fn purge(&mut self) {
        self.line_types.retain(|_, (weak, _)| is_live(weak));
        self.groups.retain(|_, (line, group)| is_live(line) && is_live(group));
        self.sequences.retain(|_, (seq, units)| is_live(seq) && is_live(units));
    }

    /// Forgets everything; needed when the typeset changes.
    pub fn clear(&mut self) {
        self.line_types.clear();
        self.groups.clear();
        self.sequences.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.line_types.len() + self.groups.len() + self.sequences.len()
    }
}

fn addr_of<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc).cast::<()>() as usize
}

fn is_live<T: ?Sized>(weak: &Weak<T>) -> bool {
    weak.strong_count() > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeset::LineType;
    use core_types::{Document, Op};
    use vdom::VElement;

    fn typeset() -> Typeset {
        Typeset::new()
            .with_line_type(
                LineType::new("list")
                    .render_multiple(|_, _| VElement::new("ul"))
                    .combine_when(|a, b| a.get("list") == b.get("list")),
            )
            .with_line_type(LineType::new("hidden"))
            .with_default_line_type(LineType::new("paragraph").render(|_, _, _| VElement::new("p")))
    }

    fn line(id: &str, attrs: Attributes) -> Line {
        Line::new(id, attrs, vec![Op::text(id)])
    }

    fn bullet(id: &str) -> Line {
        line(id, Attributes::new().with("list", "bullet"))
    }

    fn keys(units: &RenderUnits) -> Vec<Vec<&str>> {
        units
            .units()
            .iter()
            .map(|u| u.lines().iter().map(|l| l.id().as_str()).collect())
            .collect()
    }

    #[test]
    fn list_lines_combine_and_paragraphs_stay_single() {
        let ts = typeset();
        let doc = Document::new([bullet("a"), bullet("b"), line("c", Attributes::new())]);
        let units = Grouper::new().group(&ts, doc.lines());
        assert_eq!(keys(&units), vec![vec!["a", "b"], vec!["c"]]);
        assert!(units.units()[0].is_combined());
        assert_eq!(units.units()[0].key().map(LineId::as_str), Some("a"));
        assert_eq!(units.units()[1].key().map(LineId::as_str), Some("c"));
        assert_eq!(units.position("c"), Some(1));
        assert!(units.get("b").is_none());
    }

    #[test]
    fn predicate_rejection_splits_the_group() {
        let ts = typeset();
        let ordered = line("c", Attributes::new().with("list", "ordered"));
        let doc = Document::new([bullet("a"), bullet("b"), ordered, bullet("d")]);
        let units = Grouper::new().group(&ts, doc.lines());
        assert_eq!(keys(&units), vec![vec!["a", "b"], vec!["c"], vec!["d"]]);
        assert!(units.units().iter().all(RenderUnit::is_combined));
    }

    #[test]
    fn ineligible_lines_are_skipped_but_enumerable() {
        let ts = typeset();
        let doc = Document::new([
            line("a", Attributes::new()),
            line("h", Attributes::new().with("hidden", true)),
            line("b", Attributes::new()),
        ]);
        let units = Grouper::new().group(&ts, doc.lines());
        assert_eq!(keys(&units), vec![vec!["a"], vec!["b"]]);
        let skipped: Vec<_> = units.skipped().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(skipped, ["h"]);
    }

    #[test]
    fn no_default_type_drops_plain_lines() {
        let ts = Typeset::new().with_line_type(
            LineType::new("list")
                .render_multiple(|_, _| VElement::new("ul"))
                .combine_when(|_, _| true),
        );
        let doc = Document::new([line("a", Attributes::new()), bullet("b")]);
        let units = Grouper::new().group(&ts, doc.lines());
        assert_eq!(keys(&units), vec![vec!["b"]]);
        assert_eq!(units.skipped().len(), 1);
    }

    #[test]
    fn same_sequence_returns_same_collection() {
        let ts = typeset();
        let doc = Document::new([bullet("a"), line("b", Attributes::new())]);
        let mut grouper = Grouper::new();
        let first = grouper.group(&ts, doc.lines());
        let second = grouper.group(&ts, doc.lines());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unchanged_group_keeps_identity_across_snapshots() {
        let ts = typeset();
        let doc = Document::new([bullet("a"), bullet("b"), line("c", Attributes::new())]);
        let mut grouper = Grouper::new();
        let first = grouper.group(&ts, doc.lines());
        let next = doc.replace_line(2, line("c", Attributes::new()));
        let second = grouper.group(&ts, next.lines());
        assert!(!Arc::ptr_eq(&first, &second));
        match (&first.units()[0], &second.units()[0]) {
            (RenderUnit::Combined(a), RenderUnit::Combined(b)) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("expected combined units, got {other:?}"),
        }
    }

    #[test]
    fn changed_member_breaks_group_identity() {
        let ts = typeset();
        let doc = Document::new([bullet("a"), bullet("b")]);
        let mut grouper = Grouper::new();
        let first = grouper.group(&ts, doc.lines());
        let next = doc.replace_line(1, bullet("b"));
        let second = grouper.group(&ts, next.lines());
        assert!(!first.units()[0].same_as(&second.units()[0]));
    }

    #[test]
    fn line_type_cache_is_keyed_by_attribute_identity() {
        let ts = typeset();
        let shared = Arc::new(Attributes::new().with("list", "bullet"));
        let a = Line::with_shared_attributes("a", Arc::clone(&shared), vec![]);
        let b = Line::with_shared_attributes("b", Arc::clone(&shared), vec![]);
        let mut grouper = Grouper::new();
        assert_eq!(grouper.line_type(&ts, &a), grouper.line_type(&ts, &b));
        assert_eq!(grouper.line_types.len(), 1);
    }

    #[test]
    fn hand_built_empty_group_has_no_key() {
        let unit = RenderUnit::Combined(Arc::from(Vec::new()));
        assert_eq!(unit.key(), None);
        assert!(unit.lines().is_empty());
    }

    #[test]
    fn purge_forgets_dropped_snapshots() {
        let ts = typeset();
        let mut grouper = Grouper::new();
        {
            let doc = Document::new([bullet("a"), bullet("b")]);
            let _units = grouper.group(&ts, doc.lines());
        }
        assert!(grouper.cached_entries() > 0);
        grouper.purge();
        assert_eq!(grouper.cached_entries(), 0);
    }
}
