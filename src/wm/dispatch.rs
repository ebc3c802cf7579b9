//! Event dispatch
//!
//! Each queued event goes to the window's modal handlers, then to the
//! regions and areas under the cursor, then to the window handlers, until a
//! handler breaks. Clicks, click-drags and double-click retries are
//! synthesized around every handler list.
//!
//! A handler list is taken out of the screen while it is walked. Handlers
//! added meanwhile land in the emptied slot and end up in front when the
//! list is put back; handlers removed meanwhile are tagged and purged.

use std::time::Instant;

use super::{AreaId, Context, RegionId, WindowId, WindowManager};
use crate::dragdrop::{self, DropboxMapKey};
use crate::event::{drag_test, Event, EventCustomData, EventType, KeyValue};
use crate::handler::{
    EventHandler, HandlerAction, HandlerContext, HandlerFlags, HandlerKind, HandlerStack,
    KeymapPostFn, KeymapSource, UiHandleFn,
};
use crate::keymap::{handler_keymaps, keymap_poll, KeyMapItem};
use crate::operator::{
    operator_finished, operator_invoke, Operator, OperatorResult, OperatorTypeFlags,
};
use crate::tooltip;
use crate::tracing::HandlerSnapshot;

/// Which handler list of the context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandlerLevel {
    Modal,
    Window,
    Area(AreaId),
    Region(AreaId, RegionId),
}

impl WindowManager {
    /// Dispatch every queued event of every window.
    pub fn process_events(&mut self, now: Instant) {
        self.flush_ui_cancel();

        let windows: Vec<WindowId> = self.windows.iter().map(|w| w.id).collect();
        for win in windows {
            while let Some(event) = self.window_mut(win).and_then(|w| w.queue.pop()) {
                self.handle_event(win, event, now);
                self.flush_ui_cancel();
            }

            let Some(window) = self.window_mut(win) else {
                continue;
            };
            if std::mem::take(&mut window.add_mousemove) {
                let mut event = window.input.event.clone();
                event.event_type = EventType::MouseMove;
                event.val = KeyValue::Nothing;
                event.prev_mouse_pos = event.mouse_pos;
                event.is_repeat = false;
                event.utf8 = None;
                event.keymap_idname = None;
                event.customdata = EventCustomData::None;
                let state_pos = window.input.mouse_pos();
                window.queue.push_mousemove(event, state_pos);
            }
        }
    }

    fn handle_event(&mut self, win: WindowId, mut event: Event, now: Instant) {
        let before = if tracing::enabled!(tracing::Level::DEBUG) {
            self.window(win).map(HandlerSnapshot::from_window)
        } else {
            None
        };

        let action = {
            let mut ctx = Context::for_window(self, win);
            dispatch_event(&mut ctx, &mut event, now)
        };
        tracing::trace!(
            event = %event.event_type,
            val = event.val.id(),
            ?action,
            "dispatched"
        );

        let Some(window) = self.window_mut(win) else {
            return;
        };
        window.input.event.prev_mouse_pos = event.mouse_pos;

        if let Some(before) = before {
            if let Some(diff) = before.diff(&HandlerSnapshot::from_window(window)) {
                tracing::debug!("Handlers after {}: {}", event.event_type, diff);
            }
        }
    }

    /// Send `ButCancel` to the UI handlers of regions where a modal operator
    /// started.
    pub(crate) fn flush_ui_cancel(&mut self) {
        for (win, region) in std::mem::take(&mut self.pending_ui_cancel) {
            let Some(window) = self.window(win) else {
                continue;
            };
            let Some((area, region)) = window.find_region(region) else {
                continue;
            };
            let area_id = area.id;
            let handles: Vec<UiHandleFn> = region
                .handlers
                .iter()
                .filter(|h| !h.is_freed())
                .filter_map(|h| match &h.kind {
                    HandlerKind::Ui { handle, .. } => Some(handle.clone()),
                    _ => None,
                })
                .collect();
            if handles.is_empty() {
                continue;
            }

            let mut cancel = window.input.event.clone();
            cancel.event_type = EventType::ButCancel;
            cancel.val = KeyValue::Nothing;
            cancel.customdata = EventCustomData::None;

            let region_id = region.id;
            let mut ctx = Context::for_window(self, win);
            ctx.set_area(Some(area_id));
            ctx.set_region(Some(region_id));
            for handle in handles {
                handle(&mut ctx, &cancel);
            }
        }
    }
}

fn dispatch_event(ctx: &mut Context<'_>, event: &mut Event, now: Instant) -> HandlerAction {
    let Some(win) = ctx.window_id() else {
        return HandlerAction::CONTINUE;
    };

    if let Some(timer) = event.customdata.timer() {
        let tooltip_timer = ctx
            .window()
            .and_then(|w| w.tooltip.as_ref())
            .and_then(|t| t.timer);
        if tooltip_timer == Some(timer) {
            tooltip::init(ctx, win, now);
            return HandlerAction::BREAK;
        }
    }
    tooltip_auto_clear(ctx, win, event, now);
    drag_and_drop_test(ctx, event);

    // Modal handlers see the area and region under the cursor.
    let pos = event.mouse_pos;
    set_context_at(ctx, pos);
    let mut action = handlers_do(ctx, HandlerLevel::Modal, event);
    if ctx.window().is_none() || action.contains(HandlerAction::BREAK) {
        return action;
    }

    let areas: Vec<(AreaId, Vec<RegionId>)> = ctx
        .window()
        .map(|w| {
            w.areas
                .iter()
                .filter(|a| a.rect.contains(pos))
                .map(|a| {
                    let regions = a
                        .regions
                        .iter()
                        .filter(|r| r.visible && r.rect.contains(pos))
                        .map(|r| r.id)
                        .collect();
                    (a.id, regions)
                })
                .collect()
        })
        .unwrap_or_default();

    for (area, regions) in areas {
        ctx.set_area(Some(area));
        if !action.contains(HandlerAction::BREAK) {
            for region in regions {
                ctx.set_region(Some(region));
                if !ctx.wm().drags.is_empty()
                    && (matches!(event.event_type, EventType::MouseMove | EventType::Drop)
                        || event.event_type.is_key_modifier())
                {
                    drags_check_ops(ctx, event);
                }
                action |= handlers_do(ctx, HandlerLevel::Region(area, region), event);
                if ctx.window().is_none() {
                    return action;
                }
                if action.contains(HandlerAction::BREAK) {
                    break;
                }
            }
        }
        ctx.set_region(None);
        if !action.contains(HandlerAction::BREAK) {
            action |= handlers_do(ctx, HandlerLevel::Area(area), event);
            if ctx.window().is_none() {
                return action;
            }
        }
        ctx.set_area(None);
        // No early exit: motion must still reach the other areas.
    }

    if !action.contains(HandlerAction::BREAK) {
        set_context_at(ctx, pos);
        action |= handlers_do(ctx, HandlerLevel::Window, event);
    }
    action
}

fn set_context_at(ctx: &mut Context<'_>, pos: (i32, i32)) {
    let (area, region) = match ctx.window().and_then(|w| w.area_at(pos)) {
        Some(area) => (Some(area.id), area.region_at(pos).map(|r| r.id)),
        None => (None, None),
    };
    ctx.set_area(area);
    ctx.set_region(region);
}

/// Close a tooltip that asked to go away on input.
fn tooltip_auto_clear(ctx: &mut Context<'_>, win: WindowId, event: &Event, now: Instant) {
    let Some(tip) = ctx.window().and_then(|w| w.tooltip.as_ref()) else {
        return;
    };
    if !tip.exit_on_event || event.event_type.is_timer() {
        return;
    }
    let should_clear = if event.event_type.is_mouse_motion() {
        let (dx, dy) = (
            event.mouse_pos.0 - tip.event_xy.0,
            event.mouse_pos.1 - tip.event_xy.1,
        );
        dx.abs() + dy.abs() > ctx.wm().config.move_threshold
    } else {
        true
    };
    if should_clear {
        tooltip::clear(ctx, win, now);
    }
}

/// Esc cancels all drags; releasing the left button turns them into a drop.
fn drag_and_drop_test(ctx: &mut Context<'_>, event: &mut Event) {
    if ctx.wm().drags.is_empty() {
        return;
    }
    if event.event_type == EventType::Esc {
        tracing::debug!("Drag cancelled");
        ctx.wm_mut().drags.clear();
    } else if event.event_type == EventType::LeftMouse && event.val == KeyValue::Release {
        event.event_type = EventType::Drop;
        event.customdata = EventCustomData::Drags(std::mem::take(&mut ctx.wm_mut().drags));
    }
}

/// Refresh which dropbox each drag would drop on at the context region.
fn drags_check_ops(ctx: &mut Context<'_>, event: &Event) {
    let mut maps: Vec<DropboxMapKey> = Vec::new();
    let mut collect = |stack: &HandlerStack| {
        for h in stack.iter().filter(|h| !h.is_freed()) {
            if let HandlerKind::Dropbox { map } = &h.kind {
                maps.push(map.clone());
            }
        }
    };
    if let Some(win) = ctx.window() {
        collect(&win.handlers);
    }
    if let Some(area) = ctx.area() {
        collect(&area.handlers);
    }
    if let Some(region) = ctx.region() {
        collect(&region.handlers);
    }

    let mut drags = std::mem::take(&mut ctx.wm_mut().drags);
    for drag in &mut drags {
        drag.drop_state.active_dropbox = dragdrop::active_dropbox(ctx, &maps, drag, event);
    }
    let started = std::mem::replace(&mut ctx.wm_mut().drags, drags);
    ctx.wm_mut().drags.extend(started);
}

fn stack_mut<'c>(ctx: &'c mut Context<'_>, level: HandlerLevel) -> Option<&'c mut HandlerStack> {
    let win = ctx.window_mut()?;
    match level {
        HandlerLevel::Modal => Some(&mut win.modalhandlers),
        HandlerLevel::Window => Some(&mut win.handlers),
        HandlerLevel::Area(area) => Some(&mut win.area_mut(area)?.handlers),
        HandlerLevel::Region(area, region) => Some(&mut win.region_mut(area, region)?.handlers),
    }
}

/// Put a walked list back, behind handlers added during the walk.
fn restore_stack(ctx: &mut Context<'_>, level: HandlerLevel, mut stack: HandlerStack) {
    let wm = ctx.wm_mut();
    let pending = std::mem::take(&mut wm.pending_free);
    wm.pending_free = pending
        .into_iter()
        .filter(|id| !stack.mark_free(*id))
        .collect();
    if wm.walking == 0 {
        wm.pending_free.clear();
    }
    stack.purge();

    match stack_mut(ctx, level) {
        Some(slot) => {
            let newer = std::mem::replace(slot, stack);
            slot.merge_front(newer);
            slot.purge();
        }
        None => tracing::debug!("Handler list {:?} went away during dispatch", level),
    }
}

fn handlers_do_intern(
    ctx: &mut Context<'_>,
    level: HandlerLevel,
    event: &mut Event,
) -> HandlerAction {
    let Some(mut stack) = stack_mut(ctx, level).map(std::mem::take) else {
        return HandlerAction::CONTINUE;
    };
    if stack.is_empty() {
        return HandlerAction::CONTINUE;
    }

    ctx.wm_mut().walking += 1;
    let always_pass =
        event.event_type.is_timer() || event.event_type == EventType::WindowDeactivate;
    let mut action = HandlerAction::CONTINUE;

    let mut index = 0;
    while let Some(handler) = stack.at_mut(index) {
        index += 1;
        if !handler.is_freed() && ctx.wm().pending_free.contains(&handler.id) {
            handler.flags |= HandlerFlags::DO_FREE;
        }
        if handler.is_freed() {
            continue;
        }
        if let Some(poll) = handler.poll.clone() {
            if !poll(&*ctx, &*event) {
                continue;
            }
        }

        if handler.flags.contains(HandlerFlags::BLOCKING) {
            action |= HandlerAction::BREAK;
        }
        action |= handler_call(ctx, handler, event, always_pass);

        if action.contains(HandlerAction::BREAK) {
            if always_pass {
                action.remove(HandlerAction::BREAK);
            } else {
                break;
            }
        }
        if ctx.window().is_none() {
            break;
        }
    }

    let wm = ctx.wm_mut();
    wm.walking = wm.walking.saturating_sub(1);
    restore_stack(ctx, level, stack);
    action
}

fn handler_call(
    ctx: &mut Context<'_>,
    handler: &mut EventHandler,
    event: &mut Event,
    always_pass: bool,
) -> HandlerAction {
    if matches!(handler.kind, HandlerKind::Operator { .. }) {
        return modal_handler_call(ctx, handler, event, always_pass);
    }

    match &handler.kind {
        HandlerKind::Keymap { source, post } => {
            let (source, post) = (source.clone(), post.clone());
            keymap_handler_call(ctx, &source, post.as_ref(), event)
        }
        HandlerKind::Ui { handle, context, .. } => {
            let (handle, context) = (handle.clone(), *context);
            ui_handler_call(ctx, &handle, context, handler.flags, event, always_pass)
        }
        HandlerKind::Dropbox { map } => {
            if event.event_type != EventType::Drop {
                return HandlerAction::CONTINUE;
            }
            let map = map.clone();
            let action = dragdrop::handle_drop(ctx, &map, event);
            if action.contains(HandlerAction::BREAK) {
                event.customdata = EventCustomData::None;
            }
            action
        }
        HandlerKind::Gizmo { handle } => {
            let handle = handle.clone();
            handle(ctx, event)
        }
        HandlerKind::Operator { .. } => HandlerAction::CONTINUE,
    }
}

/// Map an operator result onto what the handler walk does next.
fn operator_result_action(retval: OperatorResult) -> HandlerAction {
    if retval == OperatorResult::FINISHED | OperatorResult::PASS_THROUGH {
        HandlerAction::HANDLED
    } else if retval == OperatorResult::PASS_THROUGH | OperatorResult::RUNNING_MODAL {
        HandlerAction::BREAK | HandlerAction::MODAL
    } else if retval.contains(OperatorResult::PASS_THROUGH) {
        HandlerAction::CONTINUE
    } else {
        HandlerAction::BREAK
    }
}

fn keymap_handler_call(
    ctx: &mut Context<'_>,
    source: &KeymapSource,
    post: Option<&KeymapPostFn>,
    event: &mut Event,
) -> HandlerAction {
    let mut action = HandlerAction::CONTINUE;

    for key in handler_keymaps(ctx, source) {
        let items: Vec<KeyMapItem> = {
            let Some(keymap) = ctx.wm().keyconfigs.keymap_active_by_key(&key) else {
                tracing::trace!("No keymap '{}'", key.idname);
                continue;
            };
            if !keymap_poll(ctx, keymap) {
                continue;
            }
            keymap
                .items
                .iter()
                .filter(|kmi| kmi.matches(event))
                .cloned()
                .collect()
        };

        for kmi in items {
            event.keymap_idname = Some(kmi.idname.clone());
            let retval = match ctx.wm().operators.find(&kmi.idname) {
                Some(ot) => {
                    operator_invoke(ctx, &ot, Some(&*event), kmi.properties.as_ref(), true)
                }
                None => {
                    tracing::debug!("Keymap '{}' calls unknown '{}'", key.idname, kmi.idname);
                    OperatorResult::PASS_THROUGH
                }
            };
            action |= operator_result_action(retval);

            if action.contains(HandlerAction::BREAK) {
                tracing::debug!("Handled by '{}' ({})", kmi.idname, key.idname);
                if let Some(post) = post {
                    post(ctx, &key, &kmi);
                }
                return action;
            }
        }
    }
    action
}

fn ui_handler_call(
    ctx: &mut Context<'_>,
    handle: &UiHandleFn,
    context: HandlerContext,
    flags: HandlerFlags,
    event: &Event,
    always_pass: bool,
) -> HandlerAction {
    // Keyboard double clicks are retried as presses instead.
    if !flags.contains(HandlerFlags::ACCEPT_DBL_CLICK)
        && !event.event_type.is_mouse_button()
        && event.val == KeyValue::DblClick
    {
        return HandlerAction::CONTINUE;
    }

    let (area, region) = (ctx.area_id(), ctx.region_id());
    if context.area.is_some() {
        ctx.set_area(context.area);
    }
    if context.region.is_some() {
        ctx.set_region(context.region);
    }

    let retval = handle(ctx, event);
    let used = retval.contains(HandlerAction::BREAK);
    if !used || always_pass {
        ctx.set_area(area);
        ctx.set_region(region);
    } else {
        // The handler may have removed its own area or region.
        ctx.set_area(None);
        ctx.set_region(None);
    }

    if used {
        HandlerAction::BREAK
    } else {
        HandlerAction::CONTINUE
    }
}

/// Move `ctx` to where a handler was created, if that still exists.
fn apply_handler_context(ctx: &mut Context<'_>, context: HandlerContext) {
    let Some(area) = context.area else {
        return;
    };
    let Some(window) = ctx.window() else {
        return;
    };
    if window.area(area).is_none() {
        return;
    }
    let region = context
        .region
        .filter(|r| window.region(area, *r).is_some());
    ctx.set_area(Some(area));
    ctx.set_region(region);
}

/// The event as a modal operator sees it: translated through its modal
/// keymap, double clicks turned into presses.
fn modal_keymap_event(ctx: &Context<'_>, op: &Operator, event: &Event) -> Event {
    let mut out = event.clone();
    let keymap = op
        .modal_target()
        .optype
        .modalkeymap
        .as_ref()
        .or(op.optype.modalkeymap.as_ref())
        .and_then(|key| ctx.wm().keyconfigs.keymap_active_by_key(key));

    if let Some(keymap) = keymap {
        let find = |e: &Event| {
            keymap
                .items
                .iter()
                .find(|kmi| kmi.matches(e))
                .map(|kmi| kmi.propvalue)
        };
        let mut matched = find(event).map(|value| (value, event.val));
        if matched.is_none() && event.val == KeyValue::DblClick {
            let mut press = event.clone();
            press.val = KeyValue::Press;
            matched = find(&press).map(|value| (value, KeyValue::Press));
        }
        if let Some((propvalue, val)) = matched {
            out.prev_type = event.event_type;
            out.prev_val = val;
            out.event_type = EventType::ModalMap;
            out.propvalue = propvalue;
            return out;
        }
    }

    if out.val == KeyValue::DblClick {
        out.val = KeyValue::Press;
    }
    out
}

fn modal_handler_call(
    ctx: &mut Context<'_>,
    handler: &mut EventHandler,
    event: &Event,
    always_pass: bool,
) -> HandlerAction {
    let HandlerKind::Operator { op: slot, context } = &mut handler.kind else {
        return HandlerAction::CONTINUE;
    };
    let context = *context;
    let Some(op) = slot.as_mut() else {
        return HandlerAction::CONTINUE;
    };
    let ot = op.optype.clone();
    let Some(modal) = ot.modal.clone() else {
        tracing::error!("Missing modal '{}'", ot.idname);
        return HandlerAction::CONTINUE;
    };

    let (area, region) = (ctx.area_id(), ctx.region_id());
    apply_handler_context(ctx, context);
    let modal_event = modal_keymap_event(ctx, op, event);

    let is_undo = ot.flags.contains(OperatorTypeFlags::UNDO);
    if is_undo {
        ctx.wm_mut().op_undo_depth += 1;
    }
    let retval = modal(ctx, &mut **op, &modal_event);
    if is_undo {
        let wm = ctx.wm_mut();
        wm.op_undo_depth = wm.op_undo_depth.saturating_sub(1);
    }

    let ended = retval.intersects(OperatorResult::FINISHED | OperatorResult::CANCELLED);
    if ended {
        op.flush_reports(retval);
    }
    if retval.contains(OperatorResult::FINISHED) {
        if let Some(op) = slot.take() {
            operator_finished(ctx, op, false, true);
        }
    } else if ended {
        *slot = None;
    }

    if retval.contains(OperatorResult::PASS_THROUGH) || always_pass {
        ctx.set_area(area);
        ctx.set_region(region);
    } else {
        ctx.set_area(None);
        ctx.set_region(None);
    }

    if ended {
        tracing::debug!("Modal '{}' ended", ot.idname);
        handler.flags |= HandlerFlags::DO_FREE;
    }
    operator_result_action(retval)
}

/// Walk a handler list, then synthesize click, click-drag and press events
/// from what was left unhandled.
fn handlers_do(ctx: &mut Context<'_>, level: HandlerLevel, event: &mut Event) -> HandlerAction {
    let mut action = handlers_do_intern(ctx, level, event);
    let Some(window) = ctx.window() else {
        return action;
    };
    let (check_click, check_drag) = (window.check_click, window.check_drag);
    let press_type = window.input.event.event_type;

    if event.event_type.is_mouse_motion() {
        if action.is_unhandled() {
            if check_drag {
                let mut drag_event = event.clone();
                drag_event.prev_type = press_type;
                if drag_test(&drag_event, event.prev_click_pos, &ctx.wm().config) {
                    drag_event.event_type = press_type;
                    drag_event.val = KeyValue::ClickDrag;
                    drag_event.mouse_pos = event.prev_click_pos;
                    tracing::debug!("Handling CLICK_DRAG of {}", press_type);
                    action |= handlers_do_intern(ctx, level, &mut drag_event);

                    if let Some(window) = ctx.window_mut() {
                        window.check_click = false;
                        // Other handler lists may still want this drag.
                        if action.contains(HandlerAction::BREAK) && !action.is_unhandled() {
                            window.check_drag = false;
                        }
                    }
                }
            }
        } else if check_drag {
            if let Some(window) = ctx.window_mut() {
                window.check_drag = false;
            }
        }
    } else if event.event_type.is_mouse_button() || event.event_type.is_keyboard() {
        if action.is_unhandled() {
            if let Some(window) = ctx.window_mut() {
                if event.val == KeyValue::Press && !event.is_repeat {
                    window.check_click = true;
                    window.check_drag = true;
                } else if event.val == KeyValue::Release {
                    window.check_drag = false;
                }
            }

            if event.prev_type == event.event_type {
                if event.val == KeyValue::Release
                    && event.prev_val == KeyValue::Press
                    && check_click
                {
                    if drag_test(event, event.prev_click_pos, &ctx.wm().config) {
                        if let Some(window) = ctx.window_mut() {
                            window.check_click = false;
                            window.check_drag = false;
                        }
                    } else {
                        // Clicks happen where the button went down.
                        let mut click = event.clone();
                        click.mouse_pos = event.prev_click_pos;
                        click.val = KeyValue::Click;
                        tracing::debug!("Handling CLICK of {}", event.event_type);
                        action |= handlers_do_intern(ctx, level, &mut click);
                    }
                } else if event.val == KeyValue::DblClick {
                    event.val = KeyValue::Press;
                    action |= handlers_do_intern(ctx, level, event);
                    if action.is_unhandled() {
                        event.val = KeyValue::DblClick;
                    }
                }
            }
        } else if let Some(window) = ctx.window_mut() {
            window.check_click = false;
            window.check_drag = false;
        }
    } else if event.event_type.is_mouse_wheel() || event.event_type.is_mouse_gesture() {
        // Scrolling with a modifier held must not turn its release into a click.
        if !action.is_unhandled() && event.prev_type.is_key_modifier() {
            if let Some(window) = ctx.window_mut() {
                window.check_click = false;
            }
        }
    }

    action
}

/// Drop every handler of a list: modal operators are cancelled and UI
/// handlers get their remove callback. Used when a window closes.
pub(crate) fn remove_handlers(ctx: &mut Context<'_>, level: HandlerLevel) {
    let Some(mut stack) = stack_mut(ctx, level).map(std::mem::take) else {
        return;
    };

    for handler in stack.iter_mut() {
        match &mut handler.kind {
            HandlerKind::Operator { op: slot, context } => {
                let context = *context;
                let Some(mut op) = slot.take() else {
                    continue;
                };
                let Some(cancel) = op.optype.cancel.clone() else {
                    continue;
                };
                let (area, region) = (ctx.area_id(), ctx.region_id());
                apply_handler_context(ctx, context);
                let is_undo = op.flags().contains(OperatorTypeFlags::UNDO);
                if is_undo {
                    ctx.wm_mut().op_undo_depth += 1;
                }
                cancel(ctx, &mut *op);
                if is_undo {
                    let wm = ctx.wm_mut();
                    wm.op_undo_depth = wm.op_undo_depth.saturating_sub(1);
                }
                tracing::debug!("Cancelled modal '{}'", op.idname());
                ctx.set_area(area);
                ctx.set_region(region);
            }
            HandlerKind::Ui {
                remove: Some(remove),
                context,
                ..
            } => {
                let (remove, context) = (remove.clone(), *context);
                let (area, region) = (ctx.area_id(), ctx.region_id());
                if context.area.is_some() {
                    ctx.set_area(context.area);
                }
                if context.region.is_some() {
                    ctx.set_region(context.region);
                }
                remove(ctx);
                ctx.set_area(area);
                ctx.set_region(region);
            }
            _ => {}
        }
    }
}
