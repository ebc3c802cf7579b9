//! Macro operators: a sequence of operators run as one.
//!
//! A step that does not finish ends the sequence. A step going modal makes
//! the whole macro modal; modal events go to that step, and once it finishes
//! the remaining steps are invoked with the same event.

use super::types::OperatorResult;
use super::Operator;
use crate::event::Event;
use crate::properties::OperatorProperties;
use crate::wm::Context;

fn macro_start(op: &mut Operator) {
    op.macro_state = Default::default();
}

/// Turn a cancel after finished steps into a finish, and reset state once
/// the macro is over.
fn macro_end(op: &mut Operator, mut retval: OperatorResult) -> OperatorResult {
    if retval.contains(OperatorResult::CANCELLED) && op.macro_state.finished_any {
        retval.insert(OperatorResult::FINISHED);
        retval.remove(OperatorResult::CANCELLED);
    }
    if retval.intersects(OperatorResult::FINISHED | OperatorResult::CANCELLED) {
        op.macro_state = Default::default();
    }
    retval
}

pub(crate) fn macro_exec(ctx: &mut Context<'_>, op: &mut Operator) -> OperatorResult {
    macro_start(op);
    let mut retval = OperatorResult::FINISHED;

    let mut steps = std::mem::take(&mut op.macro_ops);
    for step in steps.iter_mut() {
        let Some(exec) = step.optype.exec.clone() else {
            tracing::warn!("'{}' can't exec macro", step.idname());
            continue;
        };
        retval = exec(ctx, step);
        if retval.contains(OperatorResult::FINISHED) {
            op.macro_state.finished_any = true;
        } else {
            break;
        }
    }
    op.macro_ops = steps;

    macro_end(op, retval)
}

fn macro_invoke_from(
    ctx: &mut Context<'_>,
    op: &mut Operator,
    event: &Event,
    start: usize,
) -> OperatorResult {
    let mut retval = OperatorResult::FINISHED;

    let mut steps = std::mem::take(&mut op.macro_ops);
    for (index, step) in steps.iter_mut().enumerate().skip(start) {
        let optype = step.optype.clone();
        if let Some(invoke) = &optype.invoke {
            retval = invoke(ctx, step, event);
        } else if let Some(exec) = &optype.exec {
            retval = exec(ctx, step);
        }
        op.reports.append(&mut step.reports);

        if retval.contains(OperatorResult::FINISHED) {
            op.macro_state.finished_any = true;
        } else {
            if retval.contains(OperatorResult::RUNNING_MODAL) {
                op.macro_state.current = Some(index);
            }
            break;
        }
    }
    op.macro_ops = steps;

    macro_end(op, retval)
}

pub(crate) fn macro_invoke(
    ctx: &mut Context<'_>,
    op: &mut Operator,
    event: &Event,
) -> OperatorResult {
    macro_start(op);
    macro_invoke_from(ctx, op, event, 0)
}

pub(crate) fn macro_modal(
    ctx: &mut Context<'_>,
    op: &mut Operator,
    event: &Event,
) -> OperatorResult {
    let Some(current) = op.macro_state.current else {
        tracing::error!("Macro '{}' got a modal event with no running step", op.idname());
        return macro_end(op, OperatorResult::FINISHED);
    };

    let mut steps = std::mem::take(&mut op.macro_ops);
    let Some(step) = steps.get_mut(current) else {
        op.macro_ops = steps;
        tracing::error!("Macro '{}' lost its running step", op.idname());
        return macro_end(op, OperatorResult::CANCELLED);
    };

    let retval = match step.optype.modal.clone() {
        Some(modal) => modal(ctx, step, event),
        None => {
            tracing::error!("Missing modal '{}'", step.idname());
            OperatorResult::FINISHED
        }
    };
    // A step cancelled halfway must not leave options for the next run.
    if retval.contains(OperatorResult::CANCELLED) {
        step.properties = OperatorProperties::new();
    }
    let has_next = current + 1 < steps.len();
    op.macro_ops = steps;

    if retval.contains(OperatorResult::FINISHED) && has_next {
        op.macro_state.finished_any = true;
        op.macro_state.current = None;
        return macro_invoke_from(ctx, op, event, current + 1);
    }

    macro_end(op, retval)
}

pub(crate) fn macro_cancel(ctx: &mut Context<'_>, op: &mut Operator) {
    if let Some(current) = op.macro_state.current {
        if let Some(step) = op.macro_ops.get_mut(current) {
            if let Some(cancel) = step.optype.cancel.clone() {
                cancel(ctx, step);
            }
        }
    }
    macro_end(op, OperatorResult::CANCELLED);
}
