//! Synchronous render lifecycle notifications.

/// Point in a render pass. Emitted in declaration order, once per pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    /// Units are known and nothing has been patched yet.
    BeforeRender,
    /// The on-screen tree is up to date; positions are stale.
    AfterPatch,
    /// The position index matches the tree.
    AfterIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderKind {
    Full,
    Incremental,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderEvent {
    pub phase: RenderPhase,
    pub kind: RenderKind,
}

type Observer = Box<dyn FnMut(&RenderEvent)>;

/// Observers called in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    list: Vec<Observer>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: impl FnMut(&RenderEvent) + 'static) {
        self.list.push(Box::new(observer));
    }

    pub(crate) fn emit(&mut self, kind: RenderKind, phase: RenderPhase) {
        let event = RenderEvent { phase, kind };
        log::trace!(target: "render.reconcile", "{event:?}");
        for observer in &mut self.list {
            observer(&event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.list.len())
            .finish()
    }
}
