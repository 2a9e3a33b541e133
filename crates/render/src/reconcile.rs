//! Full and incremental rendering of document snapshots onto a `Surface`.
//!
//! A full render rebuilds every unit and patches the whole top level. An
//! incremental render diffs the unit sequences of the previous and next
//! snapshot and patches only the window that differs; nodes outside the
//! window keep their handles and are never referenced by the patch stream.
//! Both finish with a complete rebuild of the position index.

use crate::config::{RenderConfig, RenderContext};
use crate::error::{ConfigError, RenderError};
use crate::group::{Grouper, RenderUnit, RenderUnits};
use crate::inline::InlineComposer;
use crate::lifecycle::{Observers, RenderEvent, RenderKind, RenderPhase};
use crate::positions::{PositionIndex, PositionRange};
use crate::range_diff::{self, widen};
use crate::surface::Surface;
use crate::typeset::{LineContent, Typeset};
use core_types::{Document, Line};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use vdom::{DomPatch, Screen, VNode};

/// What a render pass did.
#[derive(Debug)]
pub struct RenderReport {
    pub kind: RenderKind,
    /// Top-level window of the previous tree that was replaced.
    pub replaced: Range<usize>,
    /// Units of the next snapshot rendered into that window.
    pub rendered: Range<usize>,
    pub patches: Vec<DomPatch>,
}

pub struct Reconciler<S: Surface = Screen> {
    typeset: Typeset,
    config: RenderConfig,
    grouper: Grouper,
    surface: S,
    positions: PositionIndex,
    observers: Observers,
    /// Snapshot on screen with its units. Holding the units keeps the
    /// grouper's memo entries for them alive until the next pass.
    current: Option<(Document, Arc<RenderUnits>)>,
}

impl Reconciler<Screen> {
    pub fn new(typeset: Typeset) -> Self {
        Self::with_surface(typeset, RenderConfig::default(), Screen::default())
    }

    pub fn with_config(typeset: Typeset, config: RenderConfig) -> Self {
        Self::with_surface(typeset, config, Screen::default())
    }
}

impl<S: Surface> Reconciler<S> {
    pub fn with_surface(typeset: Typeset, config: RenderConfig, surface: S) -> Self {
        Self {
            typeset,
            config,
            grouper: Grouper::new(),
            surface,
            positions: PositionIndex::default(),
            observers: Observers::default(),
            current: None,
        }
    }

    /// Registers a lifecycle observer. Observers run synchronously, in
    /// registration order, for every phase of every pass.
    pub fn observe(&mut self, observer: impl FnMut(&RenderEvent) + 'static) {
        self.observers.push(observer);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for hosts that change the tree themselves. The next
    /// incremental pass compensates for a changed top-level count, best effort.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn positions(&self) -> &PositionIndex {
        &self.positions
    }

    pub fn typeset(&self) -> &Typeset {
        &self.typeset
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn grouper(&self) -> &Grouper {
        &self.grouper
    }

    /// Snapshot the surface currently shows, if any render succeeded.
    pub fn document(&self) -> Option<&Document> {
        self.current.as_ref().map(|(doc, _)| doc)
    }

    /// Swaps the typeset. Cached line-type resolutions refer to the old one,
    /// so the grouper starts over and the next `update` renders in full.
    pub fn set_typeset(&mut self, typeset: Typeset) {
        self.typeset = typeset;
        self.grouper.clear();
        self.current = None;
    }

    /// Grouped units of `doc`, from cache when the snapshot was seen before.
    pub fn units(&mut self, doc: &Document) -> Arc<RenderUnits> {
        self.grouper.group(&self.typeset, doc.lines())
    }

    /// Renders `doc`, incrementally against the last rendered snapshot when
    /// there is one.
    pub fn update(&mut self, doc: &Document) -> Result<RenderReport, RenderError> {
        match self.current.take() {
            Some((_, shown)) => self.render_against(shown, doc),
            None => self.render_full(doc),
        }
    }

    /// Rebuilds the whole top level. Drops cache entries of snapshots that
    /// are gone.
    pub fn render_full(&mut self, doc: &Document) -> Result<RenderReport, RenderError> {
        self.grouper.purge();
        let units = self.units(doc);
        self.observers.emit(RenderKind::Full, RenderPhase::BeforeRender);

        let nodes = self.render_units(units.units())?;
        let replaced = 0..self.surface.top_level().len();
        let patches = self.surface.patch_top_level(replaced.clone(), &nodes)?;
        log::debug!(
            target: "render.reconcile",
            "full render: {} units, {} patches",
            units.len(),
            patches.len()
        );
        self.observers.emit(RenderKind::Full, RenderPhase::AfterPatch);

        self.finish(doc, &units, RenderKind::Full);
        Ok(RenderReport {
            kind: RenderKind::Full,
            replaced,
            rendered: 0..units.len(),
            patches,
        })
    }

    /// Re-renders only the units of `next` that differ from `prev`. `prev`
    /// must be the snapshot the surface currently shows.
    pub fn render_incremental(
        &mut self,
        prev: &Document,
        next: &Document,
    ) -> Result<RenderReport, RenderError> {
        let cached = self
            .current
            .as_ref()
            .filter(|(shown, _)| Arc::ptr_eq(shown.lines(), prev.lines()))
            .map(|(_, units)| Arc::clone(units));
        let shown = match cached {
            Some(units) => units,
            None => self.units(prev),
        };
        self.render_against(shown, next)
    }

    fn render_against(
        &mut self,
        old_units: Arc<RenderUnits>,
        next: &Document,
    ) -> Result<RenderReport, RenderError> {
        self.grouper.purge();
        let new_units = self.units(next);

        let (mut old_window, mut new_window) =
            range_diff::diff(old_units.units(), new_units.units());
        if old_window.is_empty() && new_window.is_empty() {
            log::trace!(target: "render.reconcile", "no unit changed, rendering in full");
            return self.render_full(next);
        }
        if old_window != new_window {
            old_window = widen(old_window, self.config.context, old_units.len());
            new_window = widen(new_window, self.config.context, new_units.len());
        }

        // Someone else touched the surface; shift the window end so it still
        // lines up with the tail.
        let on_screen = self.surface.top_level().len();
        if on_screen != old_units.len() {
            let end = if on_screen > old_units.len() {
                old_window.end + (on_screen - old_units.len())
            } else {
                old_window.end.saturating_sub(old_units.len() - on_screen)
            };
            log::debug!(
                target: "render.reconcile",
                "surface has {on_screen} nodes for {} units",
                old_units.len()
            );
            old_window.start = old_window.start.min(on_screen);
            old_window.end = end.clamp(old_window.start, on_screen);
        }

        if old_window.is_empty() && new_window.is_empty() {
            log::trace!(target: "render.reconcile", "empty window, rendering in full");
            return self.render_full(next);
        }

        self.observers
            .emit(RenderKind::Incremental, RenderPhase::BeforeRender);
        let nodes = self.render_units(&new_units.units()[new_window.clone()])?;
        let patches = self.surface.patch_top_level(old_window.clone(), &nodes)?;
        log::debug!(
            target: "render.reconcile",
            "incremental render: replaced {old_window:?} with units {new_window:?}, {} patches",
            patches.len()
        );
        self.observers
            .emit(RenderKind::Incremental, RenderPhase::AfterPatch);

        self.finish(next, &new_units, RenderKind::Incremental);
        Ok(RenderReport {
            kind: RenderKind::Incremental,
            replaced: old_window,
            rendered: new_window,
            patches,
        })
    }

    fn finish(&mut self, doc: &Document, units: &Arc<RenderUnits>, kind: RenderKind) {
        if self.config.index_positions {
            self.reindex(doc, units);
        } else {
            self.positions.clear();
        }
        self.current = Some((doc.clone(), Arc::clone(units)));
        self.observers.emit(kind, RenderPhase::AfterIndex);
    }

    fn render_units(&mut self, units: &[RenderUnit]) -> Result<Vec<VNode>, ConfigError> {
        let cx = RenderContext::default();
        units
            .iter()
            .map(|unit| {
                render_unit(&self.typeset, &mut self.grouper, self.config, cx, unit)
                    .map(VNode::from)
            })
            .collect()
    }

    /// Rebuilds the index by matching node keys against line ids, so it stays
    /// correct for any surface content the units account for.
    fn reindex(&mut self, doc: &Document, units: &RenderUnits) {
        self.positions.clear();
        let spans: HashMap<&str, Range<usize>> = doc
            .line_spans()
            .map(|(line, span)| (line.id().as_str(), span))
            .collect();

        for &node in self.surface.top_level() {
            let Some(key) = self.surface.key(node) else {
                continue;
            };
            let Some(unit) = units.get(key) else {
                log::trace!(
                    target: "render.reconcile",
                    "node {node:?} has no unit for key `{key}`"
                );
                continue;
            };
            let lines = unit.lines();
            let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
                continue;
            };
            let (Some(head), Some(tail)) = (
                spans.get(first.id().as_str()),
                spans.get(last.id().as_str()),
            ) else {
                continue;
            };
            self.positions.insert(node, PositionRange::from(head.start..tail.end));

            if unit.is_combined() {
                for &child in self.surface.children(node) {
                    let span = self
                        .surface
                        .key(child)
                        .and_then(|key| spans.get(&**key));
                    if let Some(span) = span {
                        self.positions.insert(child, span.clone());
                    }
                }
            }
        }
    }
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("surface", &self.surface)
            .field("positions", &self.positions.len())
            .field("observers", &self.observers)
            .finish()
    }
}

/// Renders one unit to its keyed abstract node.
pub(crate) fn render_unit(
    typeset: &Typeset,
    grouper: &mut Grouper,
    config: RenderConfig,
    cx: RenderContext,
    unit: &RenderUnit,
) -> Result<vdom::VElement, ConfigError> {
    let composer = InlineComposer::new(typeset, config, cx);
    match unit {
        RenderUnit::Single(line) => {
            let id = grouper
                .line_type(typeset, line)
                .ok_or_else(|| ConfigError::UnresolvedLine(line.id().clone()))?;
            let line_type = typeset.line_type(id);
            let render = line_type
                .render_fn()
                .ok_or_else(|| ConfigError::MissingRender {
                    line_type: Arc::clone(line_type.name()),
                    line: line.id().clone(),
                })?;
            let children = composer.render(line.content());
            let element = render(line.as_ref(), children, &cx);
            Ok(element.keyed(Arc::clone(line.id().as_shared())))
        }
        RenderUnit::Combined(lines) => {
            let Some(first) = lines.first() else {
                return Err(ConfigError::EmptyGroup);
            };
            let id = grouper
                .line_type(typeset, first)
                .ok_or_else(|| ConfigError::UnresolvedLine(first.id().clone()))?;
            let line_type = typeset.line_type(id);
            let render = line_type
                .render_multiple_fn()
                .ok_or_else(|| ConfigError::MissingRenderMultiple {
                    line_type: Arc::clone(line_type.name()),
                    line: first.id().clone(),
                })?;
            let contents: Vec<LineContent<'_>> = lines
                .iter()
                .map(|line| LineContent {
                    line: line.as_ref(),
                    children: composer.render(line.content()),
                })
                .collect();
            let mut element = render(&contents, &cx);
            key_members(&mut element, lines);
            Ok(element.keyed(Arc::clone(first.id().as_shared())))
        }
    }
}

/// Keys a group node's children by member line id when they line up one to
/// one, so edits inside the group keep sibling identity.
fn key_members(element: &mut vdom::VElement, lines: &[Arc<Line>]) {
    if element.children.len() != lines.len() {
        return;
    }
    for (child, line) in element.children.iter_mut().zip(lines) {
        if let VNode::Element(child) = child {
            if child.key.is_none() {
                child.key = Some(Arc::clone(line.id().as_shared()));
            }
        }
    }
}
