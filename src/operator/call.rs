//! Calling operators: poll, invoke/exec, and what happens after.

use std::rc::Rc;

use super::types::{OperatorContext, OperatorResult, OperatorType, OperatorTypeFlags};
use super::Operator;
use crate::event::Event;
use crate::handler::{EventHandler, HandlerContext, HandlerFlags, HandlerId, HandlerKind};
use crate::notifier::{NotifierRef, NC_WM, ND_HISTORY};
use crate::properties::OperatorProperties;
use crate::wm::Context;

/// Whether `ot` can run in `ctx`. Macros also need every step to poll.
pub fn operator_poll(ctx: &Context<'_>, ot: &OperatorType) -> bool {
    for item in &ot.macro_items {
        match ctx.wm().operators.find(&item.idname) {
            Some(step) => {
                if !operator_poll(ctx, &step) {
                    return false;
                }
            }
            None => return false,
        }
    }

    ot.poll.as_ref().is_none_or(|poll| poll(ctx))
}

/// Poll with the area/region `context` would run the operator in.
pub fn operator_poll_context(
    ctx: &mut Context<'_>,
    ot: &OperatorType,
    context: OperatorContext,
) -> bool {
    with_operator_context(ctx, context, |ctx| operator_poll(ctx, ot))
}

/// Move `ctx` to the area/region `context` asks for while `f` runs.
fn with_operator_context<R>(
    ctx: &mut Context<'_>,
    context: OperatorContext,
    f: impl FnOnce(&mut Context<'_>) -> R,
) -> R {
    let area = ctx.area_id();
    let region = ctx.region_id();

    if let Some(region_type) = context.region_type() {
        // Stay in the current region when it already has the wanted type.
        if ctx.region_type() != Some(region_type) {
            let target = ctx
                .area()
                .and_then(|a| a.region_by_type(region_type))
                .map(|r| r.id);
            if target.is_some() {
                ctx.set_region(target);
            }
        }
    } else if context.is_area() {
        ctx.set_region(None);
    } else if context.is_screen() {
        ctx.set_area(None);
        ctx.set_region(None);
    }

    let result = f(ctx);

    if context.region_type().is_some() || context.is_area() || context.is_screen() {
        ctx.set_area(area);
        ctx.set_region(region);
    }
    result
}

/// Call an operator by idname.
pub fn operator_name_call(
    ctx: &mut Context<'_>,
    idname: &str,
    context: OperatorContext,
    properties: Option<&OperatorProperties>,
    event: Option<&Event>,
) -> OperatorResult {
    match ctx.wm().operators.find_or_warn(idname) {
        Some(ot) => operator_name_call_ptr(ctx, &ot, context, properties, event),
        None => OperatorResult::empty(),
    }
}

/// Call an operator type. Invoke contexts need a window; an invoke call
/// without `event` uses the window's input state.
pub fn operator_name_call_ptr(
    ctx: &mut Context<'_>,
    ot: &Rc<OperatorType>,
    context: OperatorContext,
    properties: Option<&OperatorProperties>,
    event: Option<&Event>,
) -> OperatorResult {
    if ctx.window_id().is_none() {
        if context.is_invoke() {
            tracing::debug!("Can't invoke '{}' without a window", ot.idname);
            return OperatorResult::empty();
        }
        return operator_invoke(ctx, ot, None, properties, true);
    }

    let event_state;
    let event = if context.is_invoke() {
        match event {
            Some(event) => Some(event),
            None => {
                event_state = ctx.event_state().cloned();
                event_state.as_ref()
            }
        }
    } else {
        None
    };

    with_operator_context(ctx, context, |ctx| {
        operator_invoke(ctx, ot, event, properties, true)
    })
}

/// Run `ot` now: poll, then invoke (with an event) or exec.
///
/// Finished operators are registered and stored; a modal result moves the
/// operator into a new modal handler of the context window.
pub(crate) fn operator_invoke(
    ctx: &mut Context<'_>,
    ot: &Rc<OperatorType>,
    event: Option<&Event>,
    properties: Option<&OperatorProperties>,
    use_last_properties: bool,
) -> OperatorResult {
    if !operator_poll(ctx, ot) {
        tracing::debug!("Poll failed for '{}'", ot.idname);
        return OperatorResult::PASS_THROUGH;
    }

    let is_nested_call = ctx.wm().op_undo_depth != 0;
    let mut op = Box::new(Operator::new(ot.clone(), properties, &ctx.wm().operators));
    if !is_nested_call && use_last_properties {
        if let Some(last) = ctx.wm().operators.last_properties(&ot.idname) {
            op.properties.fill_unset_from(last);
        }
    }

    let mut retval = OperatorResult::PASS_THROUGH;
    let is_undo = ot.flags.contains(OperatorTypeFlags::UNDO);

    match (event, &ot.invoke, &ot.exec) {
        (Some(event), Some(invoke), _) => {
            tracing::debug!("Invoking '{}'", ot.idname);
            undo_depth_push(ctx, is_undo);
            retval = invoke(ctx, &mut op, event);
            undo_depth_pop(ctx, is_undo);
        }
        (_, _, Some(exec)) => {
            tracing::debug!("Executing '{}'", ot.idname);
            undo_depth_push(ctx, is_undo);
            retval = exec(ctx, &mut op);
            undo_depth_pop(ctx, is_undo);
        }
        _ => {
            tracing::error!("Invalid operator call '{}'", ot.idname);
        }
    }

    if !retval.contains(OperatorResult::HANDLED)
        && retval.intersects(OperatorResult::FINISHED | OperatorResult::CANCELLED)
    {
        op.flush_reports(retval);
    }

    if retval.contains(OperatorResult::HANDLED) {
        // Ran elsewhere already.
    } else if retval.contains(OperatorResult::FINISHED) {
        let store = !is_nested_call && use_last_properties;
        operator_finished(ctx, op, false, store);
    } else if retval.contains(OperatorResult::RUNNING_MODAL) {
        // Tooltips and menus must not hang around while the modal runs.
        if let (Some(window), Some(region)) = (ctx.window_id(), ctx.region_id()) {
            ctx.wm_mut().pending_ui_cancel.push((window, region));
        }
        if add_modal_handler(ctx, op).is_none() {
            retval = OperatorResult::CANCELLED;
        }
    }

    retval
}

/// Run an existing operator's `exec`.
pub fn operator_exec(
    ctx: &mut Context<'_>,
    mut op: Box<Operator>,
    repeat: bool,
    store: bool,
) -> OperatorResult {
    let ot = op.optype.clone();
    if !operator_poll(ctx, &ot) {
        return OperatorResult::CANCELLED;
    }
    let Some(exec) = ot.exec.clone() else {
        tracing::warn!("'{}' has no exec", ot.idname);
        return OperatorResult::CANCELLED;
    };

    let is_undo = ot.flags.contains(OperatorTypeFlags::UNDO);
    undo_depth_push(ctx, is_undo);
    let retval = exec(ctx, &mut op);
    undo_depth_pop(ctx, is_undo);

    if retval.intersects(OperatorResult::FINISHED | OperatorResult::CANCELLED) {
        op.flush_reports(retval);
    }
    if retval.contains(OperatorResult::FINISHED) {
        operator_finished(ctx, op, repeat, store && ctx.wm().op_undo_depth == 0);
    }
    retval
}

/// Run the most recently registered operator again with its properties.
pub fn operator_repeat_last(ctx: &mut Context<'_>) -> OperatorResult {
    let Some(last) = ctx.wm().operator_log.back().cloned() else {
        return OperatorResult::CANCELLED;
    };
    let Some(ot) = ctx.wm().operators.find_or_warn(&last.idname) else {
        return OperatorResult::CANCELLED;
    };
    let op = Box::new(Operator::new(ot, Some(&last.properties), &ctx.wm().operators));
    operator_exec(ctx, op, true, true)
}

fn undo_depth_push(ctx: &mut Context<'_>, is_undo: bool) {
    if is_undo {
        ctx.wm_mut().op_undo_depth += 1;
    }
}

fn undo_depth_pop(ctx: &mut Context<'_>, is_undo: bool) {
    if is_undo {
        let wm = ctx.wm_mut();
        wm.op_undo_depth = wm.op_undo_depth.saturating_sub(1);
    }
}

/// Bookkeeping for a finished operator: stored properties, undo push and
/// register log. Nested calls (undo depth above zero) do neither.
pub(crate) fn operator_finished(
    ctx: &mut Context<'_>,
    mut op: Box<Operator>,
    repeat: bool,
    store: bool,
) {
    op.customdata = None;

    let wm = ctx.wm_mut();
    if store {
        wm.operators
            .store_last_properties(op.idname(), &op.properties);
    }

    let flags = op.flags();
    if wm.op_undo_depth == 0 {
        if flags.contains(OperatorTypeFlags::UNDO) {
            wm.undo_push(op.name(), op.idname(), false);
        } else if flags.contains(OperatorTypeFlags::UNDO_GROUPED) {
            wm.undo_push(op.name(), op.idname(), true);
        }
    }

    if !repeat
        && wm.op_undo_depth == 0
        && flags.intersects(OperatorTypeFlags::REGISTER | OperatorTypeFlags::UNDO)
    {
        wm.operator_register(op.idname(), op.name(), &op.properties);
        ctx.add_notifier(NC_WM | ND_HISTORY, NotifierRef::None);
    }
}

/// Hand a running operator to a new modal handler of the context window.
pub(crate) fn add_modal_handler(ctx: &mut Context<'_>, op: Box<Operator>) -> Option<HandlerId> {
    let context = HandlerContext {
        area: ctx.area_id(),
        region: ctx.region_id(),
    };
    let mut flags = HandlerFlags::empty();
    if op.flags().contains(OperatorTypeFlags::BLOCKING) {
        flags |= HandlerFlags::BLOCKING;
    }
    let idname = op.idname().to_string();
    let handler = EventHandler::new(HandlerKind::Operator {
        op: Some(op),
        context,
    })
    .with_flags(flags);

    match ctx.window_mut() {
        Some(win) => {
            tracing::debug!("'{}' running modal in window {}", idname, win.id);
            Some(win.modalhandlers.push_front(handler))
        }
        None => {
            tracing::warn!("Modal operator '{}' has no window, cancelling it", idname);
            None
        }
    }
}
