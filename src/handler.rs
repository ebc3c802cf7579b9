//! Event handlers
//!
//! Every window, area and region owns a [`HandlerStack`], consulted front to
//! back for each event. Handlers are a closed set of variants: keymap, UI,
//! modal operator, dropbox and gizmo.
//!
//! Handlers are never dropped while the stack they live in is being walked.
//! Removal during a walk sets `DO_FREE`; the handler is skipped from then on
//! and purged once the walk is over.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::dragdrop::DropboxMapKey;
use crate::event::Event;
use crate::keymap::{KeyMapItem, KeyMapKey};
use crate::operator::Operator;
use crate::wm::{AreaId, Context, RegionId};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HandlerFlags: u8 {
        /// Swallow every event, matched or not, from handlers behind this one.
        const BLOCKING = 1 << 0;
        /// UI handler wants keyboard double clicks.
        const ACCEPT_DBL_CLICK = 1 << 1;
        /// Tombstone: skipped by dispatch, purged after the walk.
        const DO_FREE = 1 << 7;
    }
}

bitflags! {
    /// Outcome of offering an event to a handler stack.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HandlerAction: u8 {
        /// Stop offering the event to later handlers.
        const BREAK = 1 << 0;
        /// An operator finished but let the event pass.
        const HANDLED = 1 << 1;
        /// A modal operator saw the event without using it.
        const MODAL = 1 << 2;
    }
}

impl HandlerAction {
    pub const CONTINUE: HandlerAction = HandlerAction::empty();

    /// Nothing used the event: plain continue, or a modal operator passing it on.
    pub fn is_unhandled(self) -> bool {
        self == Self::CONTINUE || self == (Self::BREAK | Self::MODAL)
    }
}

/// Identity of a handler across stack moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-handler predicate, checked before the handler sees an event.
pub type HandlerPoll = Rc<dyn Fn(&Context<'_>, &Event) -> bool>;
/// Keymaps to use for the current context, resolved per event.
pub type KeymapDynamicFn = Rc<dyn Fn(&Context<'_>) -> Vec<KeyMapKey>>;
/// Called after a keymap item of this handler used an event.
pub type KeymapPostFn = Rc<dyn Fn(&mut Context<'_>, &KeyMapKey, &KeyMapItem)>;
pub type UiHandleFn = Rc<dyn Fn(&mut Context<'_>, &Event) -> HandlerAction>;
pub type UiRemoveFn = Rc<dyn Fn(&mut Context<'_>)>;
pub type GizmoHandleFn = Rc<dyn Fn(&mut Context<'_>, &Event) -> HandlerAction>;

#[derive(Clone)]
pub enum KeymapSource {
    Fixed(KeyMapKey),
    Dynamic(KeymapDynamicFn),
}

/// Area and region a handler was created in, restored while it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerContext {
    pub area: Option<AreaId>,
    pub region: Option<RegionId>,
}

pub enum HandlerKind {
    Keymap {
        source: KeymapSource,
        post: Option<KeymapPostFn>,
    },
    Ui {
        handle: UiHandleFn,
        remove: Option<UiRemoveFn>,
        context: HandlerContext,
    },
    /// Running modal operator. `op` is `None` once the operator ended.
    Operator {
        op: Option<Box<Operator>>,
        context: HandlerContext,
    },
    Dropbox {
        map: DropboxMapKey,
    },
    Gizmo {
        handle: GizmoHandleFn,
    },
}

pub struct EventHandler {
    pub id: HandlerId,
    pub flags: HandlerFlags,
    pub poll: Option<HandlerPoll>,
    pub kind: HandlerKind,
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("kind", &self.describe())
            .finish()
    }
}

impl EventHandler {
    pub fn new(kind: HandlerKind) -> Self {
        Self {
            id: HandlerId::next(),
            flags: HandlerFlags::empty(),
            poll: None,
            kind,
        }
    }

    pub fn keymap(key: KeyMapKey) -> Self {
        Self::new(HandlerKind::Keymap {
            source: KeymapSource::Fixed(key),
            post: None,
        })
    }

    pub fn with_flags(mut self, flags: HandlerFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_poll(mut self, poll: HandlerPoll) -> Self {
        self.poll = Some(poll);
        self
    }

    pub fn is_freed(&self) -> bool {
        self.flags.contains(HandlerFlags::DO_FREE)
    }

    /// Short label for traces.
    pub fn describe(&self) -> String {
        match &self.kind {
            HandlerKind::Keymap {
                source: KeymapSource::Fixed(key),
                ..
            } => format!("keymap({})", key.idname),
            HandlerKind::Keymap { .. } => "keymap(dynamic)".to_string(),
            HandlerKind::Ui { .. } => "ui".to_string(),
            HandlerKind::Operator { op: Some(op), .. } => format!("operator({})", op.idname()),
            HandlerKind::Operator { op: None, .. } => "operator(ended)".to_string(),
            HandlerKind::Dropbox { map } => format!("dropbox({})", map.idname),
            HandlerKind::Gizmo { .. } => "gizmo".to_string(),
        }
    }

    fn is_fixed_keymap(&self, key: &KeyMapKey) -> bool {
        matches!(&self.kind, HandlerKind::Keymap { source: KeymapSource::Fixed(k), .. } if k == key)
    }
}

/// Ordered handler list of one window, area or region.
#[derive(Default)]
pub struct HandlerStack {
    handlers: Vec<EventHandler>,
}

impl fmt::Debug for HandlerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.iter()).finish()
    }
}

impl HandlerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventHandler> {
        self.handlers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EventHandler> {
        self.handlers.iter_mut()
    }

    pub fn get(&self, id: HandlerId) -> Option<&EventHandler> {
        self.handlers.iter().find(|h| h.id == id)
    }

    pub fn get_mut(&mut self, id: HandlerId) -> Option<&mut EventHandler> {
        self.handlers.iter_mut().find(|h| h.id == id)
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> Option<&mut EventHandler> {
        self.handlers.get_mut(index)
    }

    pub fn contains(&self, id: HandlerId) -> bool {
        self.get(id).is_some()
    }

    pub fn push_front(&mut self, handler: EventHandler) -> HandlerId {
        let id = handler.id;
        self.handlers.insert(0, handler);
        id
    }

    pub fn push_back(&mut self, handler: EventHandler) -> HandlerId {
        let id = handler.id;
        self.handlers.push(handler);
        id
    }

    /// Append a handler for a fixed keymap; an existing one is reused.
    pub fn add_keymap_handler(&mut self, key: KeyMapKey) -> HandlerId {
        if let Some(existing) = self.handlers.iter().find(|h| h.is_fixed_keymap(&key)) {
            return existing.id;
        }
        self.push_back(EventHandler::keymap(key))
    }

    /// Put a fixed keymap handler first, moving it if already present.
    pub fn add_keymap_handler_priority(&mut self, key: KeyMapKey) -> HandlerId {
        self.remove_keymap_handler(&key);
        self.push_front(EventHandler::keymap(key))
    }

    /// Append a handler resolving its keymaps per event; `keymap_fn` is
    /// compared by identity for reuse.
    pub fn add_keymap_handler_dynamic(&mut self, keymap_fn: KeymapDynamicFn) -> HandlerId {
        let existing = self.handlers.iter().find(|h| {
            matches!(&h.kind, HandlerKind::Keymap { source: KeymapSource::Dynamic(f), .. }
                if Rc::ptr_eq(f, &keymap_fn))
        });
        if let Some(existing) = existing {
            return existing.id;
        }
        self.push_back(EventHandler::new(HandlerKind::Keymap {
            source: KeymapSource::Dynamic(keymap_fn),
            post: None,
        }))
    }

    pub fn remove_keymap_handler(&mut self, key: &KeyMapKey) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| !h.is_fixed_keymap(key));
        before != self.handlers.len()
    }

    /// Add a UI handler in front of the others.
    pub fn add_ui_handler(
        &mut self,
        handle: UiHandleFn,
        remove: Option<UiRemoveFn>,
        context: HandlerContext,
        flags: HandlerFlags,
    ) -> HandlerId {
        self.push_front(
            EventHandler::new(HandlerKind::Ui {
                handle,
                remove,
                context,
            })
            .with_flags(flags),
        )
    }

    /// Remove UI handlers using `handle`. With `postpone` the handlers are
    /// only tagged, for removal from inside a walk over this stack.
    pub fn remove_ui_handler(&mut self, handle: &UiHandleFn, postpone: bool) -> bool {
        let is_match = |h: &EventHandler| {
            matches!(&h.kind, HandlerKind::Ui { handle: f, .. } if Rc::ptr_eq(f, handle))
        };
        if postpone {
            let mut found = false;
            for h in self.handlers.iter_mut().filter(|h| is_match(h)) {
                h.flags |= HandlerFlags::DO_FREE;
                found = true;
            }
            found
        } else {
            let before = self.handlers.len();
            self.handlers.retain(|h| !is_match(h));
            before != self.handlers.len()
        }
    }

    /// Append a dropbox handler; an existing one for the same map is reused.
    pub fn add_dropbox_handler(&mut self, map: DropboxMapKey) -> HandlerId {
        let existing = self
            .handlers
            .iter()
            .find(|h| matches!(&h.kind, HandlerKind::Dropbox { map: m } if *m == map));
        if let Some(existing) = existing {
            return existing.id;
        }
        self.push_back(EventHandler::new(HandlerKind::Dropbox { map }))
    }

    pub fn add_gizmo_handler(&mut self, handle: GizmoHandleFn) -> HandlerId {
        self.push_front(EventHandler::new(HandlerKind::Gizmo { handle }))
    }

    pub fn set_flags(&mut self, id: HandlerId, flags: HandlerFlags) -> bool {
        match self.get_mut(id) {
            Some(h) => {
                h.flags = (h.flags & HandlerFlags::DO_FREE) | flags;
                true
            }
            None => false,
        }
    }

    /// Tag a handler for removal after the current walk.
    pub fn mark_free(&mut self, id: HandlerId) -> bool {
        match self.get_mut(id) {
            Some(h) => {
                h.flags |= HandlerFlags::DO_FREE;
                true
            }
            None => false,
        }
    }

    /// Drop tagged handlers, returning them.
    pub fn purge(&mut self) -> Vec<EventHandler> {
        if !self.handlers.iter().any(EventHandler::is_freed) {
            return Vec::new();
        }
        let (freed, kept) = std::mem::take(&mut self.handlers)
            .into_iter()
            .partition(EventHandler::is_freed);
        self.handlers = kept;
        freed
    }

    /// Put `newer` in front of the current handlers.
    pub(crate) fn merge_front(&mut self, newer: HandlerStack) {
        if newer.is_empty() {
            return;
        }
        let mut handlers = newer.handlers;
        handlers.append(&mut self.handlers);
        self.handlers = handlers;
    }

    /// Running modal operators, front first.
    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.handlers.iter().filter_map(|h| match &h.kind {
            HandlerKind::Operator { op: Some(op), .. } if !h.is_freed() => Some(op.as_ref()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::{RegionType, SpaceType};

    fn key(name: &str) -> KeyMapKey {
        KeyMapKey::new(name, SpaceType::Empty, RegionType::Window)
    }

    fn names(stack: &HandlerStack) -> Vec<String> {
        stack.iter().map(EventHandler::describe).collect()
    }

    #[test]
    fn test_keymap_handler_reuse_and_priority() {
        let mut stack = HandlerStack::new();
        let a = stack.add_keymap_handler(key("Window"));
        stack.add_keymap_handler(key("Screen"));
        assert_eq!(stack.add_keymap_handler(key("Window")), a);
        assert_eq!(stack.len(), 2);

        stack.add_keymap_handler_priority(key("Screen"));
        assert_eq!(names(&stack), vec!["keymap(Screen)", "keymap(Window)"]);
    }

    #[test]
    fn test_ui_handlers_go_first() {
        let mut stack = HandlerStack::new();
        stack.add_keymap_handler(key("Window"));
        let handle: UiHandleFn = Rc::new(|_, _| HandlerAction::BREAK);
        stack.add_ui_handler(
            handle.clone(),
            None,
            HandlerContext::default(),
            HandlerFlags::BLOCKING,
        );
        assert_eq!(names(&stack), vec!["ui", "keymap(Window)"]);
        assert!(stack.iter().next().unwrap().flags.contains(HandlerFlags::BLOCKING));

        assert!(stack.remove_ui_handler(&handle, true));
        assert_eq!(stack.len(), 2);
        let freed = stack.purge();
        assert_eq!(freed.len(), 1);
        assert_eq!(names(&stack), vec!["keymap(Window)"]);
    }

    #[test]
    fn test_dynamic_keymap_handler_identity() {
        let mut stack = HandlerStack::new();
        let f: KeymapDynamicFn = Rc::new(|_| Vec::new());
        let a = stack.add_keymap_handler_dynamic(f.clone());
        assert_eq!(stack.add_keymap_handler_dynamic(f), a);
        let g: KeymapDynamicFn = Rc::new(|_| Vec::new());
        assert_ne!(stack.add_keymap_handler_dynamic(g), a);
    }

    #[test]
    fn test_merge_front_keeps_new_handlers_first() {
        let mut stack = HandlerStack::new();
        stack.add_keymap_handler(key("Window"));
        let mut newer = HandlerStack::new();
        newer.add_keymap_handler(key("Modal"));
        stack.merge_front(newer);
        assert_eq!(names(&stack), vec!["keymap(Modal)", "keymap(Window)"]);
    }

    #[test]
    fn test_set_flags_keeps_tombstone() {
        let mut stack = HandlerStack::new();
        let id = stack.add_keymap_handler(key("Window"));
        stack.mark_free(id);
        stack.set_flags(id, HandlerFlags::BLOCKING);
        let h = stack.get(id).unwrap();
        assert!(h.is_freed());
        assert!(h.flags.contains(HandlerFlags::BLOCKING));
    }

    #[test]
    fn test_unhandled_actions() {
        assert!(HandlerAction::CONTINUE.is_unhandled());
        assert!((HandlerAction::BREAK | HandlerAction::MODAL).is_unhandled());
        assert!(!HandlerAction::BREAK.is_unhandled());
        assert!(!HandlerAction::HANDLED.is_unhandled());
    }
}
