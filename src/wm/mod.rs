//! Window manager
//!
//! `WindowManager` owns every window, the keyconfigs, operator types, the
//! message bus, notifier queue, timers and drags. One main-loop iteration is
//! [`WindowManager::step`]: fire timers, dispatch queued events, then process
//! notifiers and flush the message bus.

mod context;
mod dispatch;
mod screen;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub use context::Context;
pub use screen::{
    Area, AreaId, Rect, Region, RegionId, RegionListener, RegionType, SpaceType, Window, WindowId,
    Workspace,
};

use crate::config::WmConfig;
use crate::dragdrop::{register_builtin_dropboxes, window_dropbox_map, Drag, DropboxRegistry};
use crate::event::{self, Event, EventCustomData, EventType, KeyValue, PlatformEvent};
use crate::handler::{HandlerId, HandlerKind, HandlerStack};
use crate::keymap::{default_keyconfig, KeyConfigSet, KeyMapKey};
use crate::msgbus::{MsgBus, MsgNotifyContext, MsgOwner, StaticKey};
use crate::notifier::{NotifierQueue, NotifierRef, NC_SPACE, NC_WINDOW, NC_WM, ND_FILEREAD};
use crate::operator::{
    operator_name_call, register_builtin_operators, OperatorContext, OperatorRegistry,
    OperatorResult,
};
use crate::properties::OperatorProperties;
use crate::timer::{TimerId, TimerManager};

/// Size of the register log.
pub const MAX_OP_REGISTERED: usize = 32;

/// A finished operator in the register log.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredOperator {
    pub idname: String,
    pub name: String,
    pub properties: OperatorProperties,
}

/// An undo step pushed by a finished operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStep {
    pub name: String,
    pub idname: String,
}

pub struct WindowManager {
    pub config: WmConfig,
    pub windows: Vec<Window>,
    pub keyconfigs: KeyConfigSet,
    pub operators: OperatorRegistry,
    pub msgbus: MsgBus,
    pub notifiers: NotifierQueue,
    pub timers: TimerManager,
    /// Drags in progress, owned here until dropped or cancelled.
    pub drags: Vec<Drag>,
    pub dropboxes: DropboxRegistry,
    /// Most recent last, at most [`MAX_OP_REGISTERED`].
    pub operator_log: VecDeque<RegisteredOperator>,
    pub undo_stack: Vec<UndoStep>,
    /// Nesting of running undo operators; finished nested calls push nothing.
    pub op_undo_depth: u32,
    pub tooltip_time_closed: Option<Instant>,
    pub quit_requested: bool,

    /// Handlers removed while their stack was taken out for a walk.
    pub(crate) pending_free: Vec<HandlerId>,
    /// Regions whose UI handlers get cancelled once the current event is done.
    pub(crate) pending_ui_cancel: Vec<(WindowId, RegionId)>,
    /// Handler walks in progress.
    pub(crate) walking: u32,
    next_id: u32,
}

impl WindowManager {
    pub fn new(config: WmConfig, keyconfigs: KeyConfigSet) -> Self {
        let mut operators = OperatorRegistry::new();
        register_builtin_operators(&mut operators);
        let mut dropboxes = DropboxRegistry::new();
        register_builtin_dropboxes(&mut dropboxes);

        Self {
            config,
            windows: Vec::new(),
            keyconfigs,
            operators,
            msgbus: MsgBus::new(),
            notifiers: NotifierQueue::new(),
            timers: TimerManager::new(),
            drags: Vec::new(),
            dropboxes,
            operator_log: VecDeque::new(),
            undo_stack: Vec::new(),
            op_undo_depth: 0,
            tooltip_time_closed: None,
            quit_requested: false,
            pending_free: Vec::new(),
            pending_ui_cancel: Vec::new(),
            walking: 0,
            next_id: 1,
        }
    }

    /// Default preferences and the embedded default keyconfig.
    pub fn with_defaults() -> Self {
        Self::new(WmConfig::default(), KeyConfigSet::new(default_keyconfig()))
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Open a window with the window-level keymaps and dropboxes.
    pub fn add_window(&mut self, size: (i32, i32)) -> WindowId {
        let id = WindowId(self.next_id());
        let mut win = Window::new(id, size);
        win.queue.keep_inbetween_moves = self.config.use_inbetween_mousemove;
        for name in ["Window", "Screen"] {
            win.handlers
                .add_keymap_handler(KeyMapKey::new(name, SpaceType::Empty, RegionType::Window));
        }
        win.handlers.add_dropbox_handler(window_dropbox_map());
        tracing::debug!("Window {} opened ({}x{})", id, size.0, size.1);
        self.windows.push(win);
        id
    }

    pub fn add_area(&mut self, win: WindowId, space_type: SpaceType, rect: Rect) -> Option<AreaId> {
        let id = AreaId(self.next_id());
        let window = self.window_mut(win)?;
        window.areas.push(Area::new(id, space_type, rect));
        Some(id)
    }

    /// Add a region; it gets a handler for every non-modal keymap of its
    /// space and region type.
    pub fn add_region(
        &mut self,
        win: WindowId,
        area: AreaId,
        region_type: RegionType,
        rect: Rect,
    ) -> Option<RegionId> {
        let id = RegionId(self.next_id());
        let space_type = self.window(win)?.area(area)?.space_type;
        let keys = self.space_keymaps(space_type, region_type);

        let area = self.window_mut(win)?.area_mut(area)?;
        let mut region = Region::new(id, region_type, rect);
        for key in keys {
            region.handlers.add_keymap_handler(key);
        }
        area.regions.push(region);
        Some(id)
    }

    fn space_keymaps(&self, space_type: SpaceType, region_type: RegionType) -> Vec<KeyMapKey> {
        if space_type == SpaceType::Empty && region_type == RegionType::Window {
            // Window-level keymaps live on the window.
            return Vec::new();
        }
        let configs = [
            &self.keyconfigs.default,
            &self.keyconfigs.addon,
            &self.keyconfigs.user,
        ];
        let mut keys: Vec<KeyMapKey> = Vec::new();
        for km in configs.into_iter().flat_map(|kc| kc.keymaps.iter()) {
            if km.space_type == space_type
                && km.region_type == region_type
                && !km.is_modal()
                && !keys.contains(&km.key())
            {
                keys.push(km.key());
            }
        }
        keys
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Context scoped to `win`.
    pub fn context(&mut self, win: WindowId) -> Context<'_> {
        Context::for_window(self, win)
    }

    /// Convert platform input for `win` and queue it.
    pub fn add_platform_event(&mut self, win: WindowId, platform: PlatformEvent, now: Instant) {
        let config = &self.config;
        let Some(window) = self.windows.iter_mut().find(|w| w.id == win) else {
            tracing::warn!("Event for unknown window {}", win);
            return;
        };
        event::add_platform_event(&mut window.input, &mut window.queue, config, platform, now);
    }

    /// Queue an already built event; cursor moves coalesce.
    pub fn add_event(&mut self, win: WindowId, event: Event) {
        let Some(window) = self.window_mut(win) else {
            return;
        };
        if event.event_type == EventType::MouseMove {
            let state_pos = window.input.mouse_pos();
            window.queue.push_mousemove(event, state_pos);
        } else {
            window.queue.push(event);
        }
    }

    /// Queue a cursor move at the current position once the queue drains,
    /// so handlers re-evaluate what is under the cursor.
    pub fn add_mousemove(&mut self, win: WindowId) {
        if let Some(window) = self.window_mut(win) {
            window.add_mousemove = true;
        }
    }

    pub fn add_timer(
        &mut self,
        window: Option<WindowId>,
        event_type: EventType,
        step: Duration,
        now: Instant,
    ) -> TimerId {
        self.timers.add(window, event_type, step, now)
    }

    /// Remove a timer; queued events stop referencing it.
    pub fn remove_timer(&mut self, id: TimerId) {
        if self.timers.remove(id).is_none() {
            return;
        }
        for win in &mut self.windows {
            for event in win.queue.iter_mut() {
                if event.customdata.timer() == Some(id) {
                    event.customdata = EventCustomData::None;
                }
            }
        }
    }

    /// Queue a timer event for each due timer attached to a window.
    pub fn process_timers(&mut self, now: Instant) {
        for fired in self.timers.fire_due(now) {
            let Some(win) = fired.window else {
                tracing::trace!(timer = ?fired.id, "manager timer fired");
                continue;
            };
            let Some(window) = self.window_mut(win) else {
                continue;
            };
            let mut event = window.input.event.clone();
            event.event_type = fired.event_type;
            event.val = KeyValue::Nothing;
            event.prev_mouse_pos = event.mouse_pos;
            event.is_repeat = false;
            event.utf8 = None;
            event.keymap_idname = None;
            event.customdata = EventCustomData::Timer(fired.id);
            window.queue.push(event);
        }
    }

    /// Offer queued notifiers to region listeners, then flush the message bus.
    ///
    /// A notifier for a window reaches that window only; one without a window
    /// reaches all of them. `NC_SPACE` notifiers referencing an area stay in
    /// that area. `NC_WINDOW` and file reads redraw everything.
    pub fn process_notifiers(&mut self) {
        let notes: Vec<_> = self.notifiers.drain().collect();
        for note in &notes {
            tracing::trace!(category = note.category_name(), code = note.type_code(), "notifier");
            let redraw_all = note.category == NC_WINDOW
                || (note.category == NC_WM && note.data == ND_FILEREAD);
            if note.category == NC_WM && note.data == ND_FILEREAD {
                self.msgbus.publish_static(StaticKey::FILE_READ);
            }

            let targets = self
                .windows
                .iter_mut()
                .filter(|w| note.window.is_none_or(|id| id == w.id));
            for win in targets {
                for area in &mut win.areas {
                    if let (NC_SPACE, NotifierRef::Area(only)) = (note.category, &note.reference) {
                        if *only != area.id {
                            continue;
                        }
                    }
                    for region in &mut area.regions {
                        let listens = region.listener.as_ref().is_some_and(|l| l(note));
                        if redraw_all || listens {
                            region.tag_redraw();
                        }
                    }
                }
            }
        }

        if self.windows.iter().any(|w| w.regions().any(|r| r.do_draw)) {
            self.msgbus.publish_static(StaticKey::WINDOW_DRAW);
        }
        self.msgbus_handle();
    }

    /// Notify subscribers of every tagged message-bus key.
    pub fn msgbus_handle(&mut self) {
        self.msgbus.handle(&mut MsgNotifyContext {
            windows: &mut self.windows,
            notifiers: &mut self.notifiers,
        });
    }

    /// One main-loop iteration. Returns false once quitting was requested.
    pub fn step(&mut self, now: Instant) -> bool {
        self.process_timers(now);
        self.process_events(now);
        self.process_notifiers();
        !self.quit_requested
    }

    /// Call an operator by name in `win` (or without a window).
    pub fn operator_call(
        &mut self,
        win: Option<WindowId>,
        idname: &str,
        context: OperatorContext,
        properties: Option<&OperatorProperties>,
    ) -> OperatorResult {
        let mut ctx = Context::new(self);
        ctx.set_window(win);
        operator_name_call(&mut ctx, idname, context, properties, None)
    }

    /// Record an undo step. Grouped pushes merge with a previous step of
    /// the same operator.
    pub fn undo_push(&mut self, name: &str, idname: &str, grouped: bool) {
        if grouped && self.undo_stack.last().is_some_and(|s| s.idname == idname) {
            return;
        }
        tracing::debug!("Undo push '{}'", name);
        self.undo_stack.push(UndoStep {
            name: name.to_string(),
            idname: idname.to_string(),
        });
    }

    /// Append a finished operator to the register log.
    pub fn operator_register(&mut self, idname: &str, name: &str, properties: &OperatorProperties) {
        self.operator_log.push_back(RegisteredOperator {
            idname: idname.to_string(),
            name: name.to_string(),
            properties: properties.clone(),
        });
        while self.operator_log.len() > MAX_OP_REGISTERED {
            self.operator_log.pop_front();
        }
    }

    fn stacks_mut(&mut self) -> impl Iterator<Item = &mut HandlerStack> {
        self.windows.iter_mut().flat_map(|w| {
            let areas = w.areas.iter_mut().flat_map(|a| {
                std::iter::once(&mut a.handlers)
                    .chain(a.regions.iter_mut().map(|r| &mut r.handlers))
            });
            [&mut w.modalhandlers, &mut w.handlers].into_iter().chain(areas)
        })
    }

    /// Remove a handler wherever it is.
    ///
    /// During a walk the handler is only tagged and skipped; it is dropped
    /// when the walk ends.
    pub fn remove_handler(&mut self, id: HandlerId) {
        let walking = self.walking > 0;
        let mut found = false;
        for stack in self.stacks_mut() {
            if stack.mark_free(id) {
                found = true;
                if !walking {
                    stack.purge();
                }
                break;
            }
        }
        if !found && walking {
            self.pending_free.push(id);
        }
    }

    /// Close a window: cancel its modal operators, let UI handlers clean up,
    /// and drop its timers, notifiers and message-bus subscriptions.
    pub fn close_window(&mut self, win: WindowId) {
        if self.window(win).is_none() {
            return;
        }
        {
            let mut ctx = Context::for_window(self, win);
            dispatch::remove_handlers(&mut ctx, dispatch::HandlerLevel::Modal);
            dispatch::remove_handlers(&mut ctx, dispatch::HandlerLevel::Window);
        }

        let Some(index) = self.windows.iter().position(|w| w.id == win) else {
            return;
        };
        let window = self.windows.remove(index);
        self.timers.remove_for_window(win);
        self.notifiers.remove_for_window(win);
        self.pending_ui_cancel.retain(|(w, _)| *w != win);

        let mut removed = self.msgbus.clear_by_owner(MsgOwner::Window(win));
        for area in &window.areas {
            removed += self.msgbus.clear_by_owner(MsgOwner::Area(area.id));
            for region in &area.regions {
                removed += self.msgbus.clear_by_owner(MsgOwner::Region(region.id));
            }
        }
        tracing::debug!("Window {} closed, {} subscriptions dropped", win, removed);
    }

    /// Running modal operators of `win`, front first.
    pub fn modal_operators(&self, win: WindowId) -> Vec<String> {
        self.window(win)
            .map(|w| {
                w.modalhandlers
                    .iter()
                    .filter(|h| !h.is_freed())
                    .filter_map(|h| match &h.kind {
                        HandlerKind::Operator { op: Some(op), .. } => Some(op.idname().to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{NC_SCENE, ND_OB_SELECT};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_register_log_is_bounded() {
        let mut wm = WindowManager::with_defaults();
        let props = OperatorProperties::new();
        for i in 0..40 {
            wm.operator_register(&format!("test.op_{i}"), "Op", &props);
        }
        assert_eq!(wm.operator_log.len(), MAX_OP_REGISTERED);
        assert_eq!(wm.operator_log.front().unwrap().idname, "test.op_8");
        assert_eq!(wm.operator_log.back().unwrap().idname, "test.op_39");
    }

    #[test]
    fn test_grouped_undo_push_merges() {
        let mut wm = WindowManager::with_defaults();
        wm.undo_push("Move", "transform.translate", true);
        wm.undo_push("Move", "transform.translate", true);
        wm.undo_push("Rotate", "transform.rotate", false);
        wm.undo_push("Rotate", "transform.rotate", false);
        assert_eq!(wm.undo_stack.len(), 3);
    }

    #[test]
    fn test_add_window_installs_window_keymaps() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let window = wm.window(win).unwrap();
        let names: Vec<String> = window.handlers.iter().map(|h| h.describe()).collect();
        assert_eq!(
            names,
            vec!["keymap(Window)", "keymap(Screen)", "dropbox(Window)"]
        );
    }

    #[test]
    fn test_ids_are_unique_across_levels() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let area = wm
            .add_area(win, SpaceType::View3D, Rect::new(0, 0, 800, 600))
            .unwrap();
        let region = wm
            .add_region(win, area, RegionType::Window, Rect::new(0, 0, 800, 600))
            .unwrap();
        assert_ne!(win.0, area.0);
        assert_ne!(area.0, region.0);
        assert!(wm.add_area(WindowId(999), SpaceType::View3D, Rect::default()).is_none());
    }

    #[test]
    fn test_notifier_reaches_listening_region_only() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let area = wm
            .add_area(win, SpaceType::View3D, Rect::new(0, 0, 800, 600))
            .unwrap();
        let listening = wm
            .add_region(win, area, RegionType::Window, Rect::new(0, 0, 800, 500))
            .unwrap();
        let deaf = wm
            .add_region(win, area, RegionType::Header, Rect::new(0, 501, 800, 600))
            .unwrap();
        let heard = Rc::new(Cell::new(0));
        let counter = heard.clone();
        wm.window_mut(win)
            .unwrap()
            .region_mut(area, listening)
            .unwrap()
            .listener = Some(Rc::new(move |note| {
            counter.set(counter.get() + 1);
            note.category == NC_SCENE
        }));

        wm.notifiers
            .add(Some(win), NC_SCENE | ND_OB_SELECT, NotifierRef::None);
        wm.process_notifiers();

        let window = wm.window(win).unwrap();
        assert!(window.region(area, listening).unwrap().do_draw);
        assert!(!window.region(area, deaf).unwrap().do_draw);
        assert_eq!(heard.get(), 1);
        assert!(wm.notifiers.is_empty());
    }

    #[test]
    fn test_window_notifier_redraws_everything() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let other = wm.add_window((800, 600));
        for w in [win, other] {
            let area = wm
                .add_area(w, SpaceType::View3D, Rect::new(0, 0, 800, 600))
                .unwrap();
            wm.add_region(w, area, RegionType::Window, Rect::new(0, 0, 800, 600));
        }
        wm.notifiers.add(Some(win), NC_WINDOW, NotifierRef::None);
        wm.process_notifiers();
        assert!(wm.window(win).unwrap().regions().all(|r| r.do_draw));
        assert!(wm.window(other).unwrap().regions().all(|r| !r.do_draw));
    }

    #[test]
    fn test_remove_timer_clears_queued_references() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let now = Instant::now();
        let timer = wm.add_timer(Some(win), EventType::Timer, Duration::from_millis(10), now);
        wm.process_timers(now + Duration::from_millis(15));
        assert_eq!(
            wm.window(win).unwrap().queue.back().unwrap().customdata.timer(),
            Some(timer)
        );
        wm.remove_timer(timer);
        assert!(wm.window(win).unwrap().queue.back().unwrap().customdata.is_none());
    }

    #[test]
    fn test_close_window_drops_owned_state() {
        let mut wm = WindowManager::with_defaults();
        let win = wm.add_window((800, 600));
        let now = Instant::now();
        wm.add_timer(Some(win), EventType::Timer, Duration::from_millis(10), now);
        wm.notifiers.add(Some(win), NC_WINDOW, NotifierRef::None);
        wm.close_window(win);
        assert!(wm.window(win).is_none());
        assert!(wm.timers.is_empty());
        assert!(wm.notifiers.is_empty());
    }
}
