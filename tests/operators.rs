//! Operator call tests: contexts, stored properties, undo/register
//! bookkeeping and macros

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{log, Harness};
use kraken_wm::operator::{
    operator_name_call, operator_repeat_last, OperatorContext, OperatorType, OperatorTypeFlags,
};
use kraken_wm::wm::{Rect, RegionId, RegionType};
use kraken_wm::{EventType, OperatorProperties, OperatorResult, WindowManager};

/// Operator appending its name to `log` when it runs.
fn logging_op(
    idname: &str,
    flags: OperatorTypeFlags,
    log: &Rc<RefCell<Vec<String>>>,
) -> OperatorType {
    let log = log.clone();
    let name = idname.to_string();
    OperatorType::new(idname, idname)
        .with_flags(flags)
        .with_exec(move |_ctx, _op| {
            log.borrow_mut().push(name.clone());
            OperatorResult::FINISHED
        })
}

// ============================================================================
// Contexts
// ============================================================================

#[test]
fn test_invoke_context_needs_window() {
    let mut wm = WindowManager::with_defaults();
    let calls = log();
    wm.operators
        .register(logging_op("test.run", OperatorTypeFlags::empty(), &calls));

    let result = wm.operator_call(None, "test.run", OperatorContext::InvokeDefault, None);
    assert!(result.is_empty());
    assert!(calls.borrow().is_empty());

    let result = wm.operator_call(None, "test.run", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::FINISHED);
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_modal_operator_without_window_is_cancelled() {
    let mut wm = WindowManager::with_defaults();
    wm.operators.register(
        OperatorType::new("test.drag", "Drag")
            .with_flags(OperatorTypeFlags::REGISTER)
            .with_exec(|_ctx, _op| OperatorResult::RUNNING_MODAL),
    );

    let result = wm.operator_call(None, "test.drag", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::CANCELLED);
    assert!(wm.operator_log.is_empty());
}

#[test]
fn test_unknown_operator_does_nothing() {
    let mut wm = WindowManager::with_defaults();
    let result = wm.operator_call(None, "test.missing", OperatorContext::ExecDefault, None);
    assert!(result.is_empty());
}

#[test]
fn test_failed_poll_passes_through() {
    let mut h = Harness::new();
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    h.wm.operators.register(
        OperatorType::new("test.never", "Never")
            .with_poll(|_| false)
            .with_exec(move |_, _| {
                flag.set(true);
                OperatorResult::FINISHED
            }),
    );

    let result = h
        .wm
        .operator_call(Some(h.win), "test.never", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::PASS_THROUGH);
    assert!(!ran.get());
}

#[test]
fn test_region_context_moves_into_region_for_the_call() {
    let mut h = Harness::new();
    let header = h
        .wm
        .add_region(h.win, h.area, RegionType::Header, Rect::new(0, 570, 800, 600))
        .unwrap();

    let seen: Rc<RefCell<Vec<Option<RegionId>>>> = Default::default();
    let record = seen.clone();
    h.wm.operators.register(
        OperatorType::new("test.where", "Where").with_exec(move |ctx, _| {
            record.borrow_mut().push(ctx.region_id());
            OperatorResult::FINISHED
        }),
    );

    let (win, area, region) = (h.win, h.area, h.region);
    let mut ctx = h.wm.context(win);
    ctx.set_area(Some(area));
    ctx.set_region(Some(header));

    operator_name_call(&mut ctx, "test.where", OperatorContext::ExecRegionWin, None, None);
    assert_eq!(ctx.region_id(), Some(header), "context restored after the call");

    operator_name_call(&mut ctx, "test.where", OperatorContext::ExecArea, None, None);
    operator_name_call(&mut ctx, "test.where", OperatorContext::ExecDefault, None, None);

    assert_eq!(*seen.borrow(), vec![Some(region), None, Some(header)]);
}

// ============================================================================
// Stored properties
// ============================================================================

#[test]
fn test_last_properties_fill_unset_values() {
    let mut wm = WindowManager::with_defaults();
    let sizes: Rc<RefCell<Vec<Option<i64>>>> = Default::default();
    let record = sizes.clone();
    wm.operators.register(
        OperatorType::new("test.size", "Size")
            .with_flags(OperatorTypeFlags::REGISTER)
            .with_exec(move |_, op| {
                record
                    .borrow_mut()
                    .push(op.properties.get("size").and_then(|v| v.as_int()));
                OperatorResult::FINISHED
            }),
    );

    let three = OperatorProperties::new().with("size", 3);
    wm.operator_call(None, "test.size", OperatorContext::ExecDefault, Some(&three));
    wm.operator_call(None, "test.size", OperatorContext::ExecDefault, None);
    let five = OperatorProperties::new().with("size", 5);
    wm.operator_call(None, "test.size", OperatorContext::ExecDefault, Some(&five));

    assert_eq!(*sizes.borrow(), vec![Some(3), Some(3), Some(5)]);
    let last = wm.operators.last_properties("test.size").unwrap();
    assert_eq!(last.get("size").and_then(|v| v.as_int()), Some(5));
}

// ============================================================================
// Undo and register
// ============================================================================

#[test]
fn test_nested_calls_leave_no_undo_or_register_entries() {
    let mut wm = WindowManager::with_defaults();
    let calls = log();
    let undo_register = OperatorTypeFlags::REGISTER | OperatorTypeFlags::UNDO;
    wm.operators
        .register(logging_op("test.inner", undo_register, &calls));
    let outer_calls = calls.clone();
    wm.operators.register(
        OperatorType::new("test.outer", "Outer")
            .with_flags(undo_register)
            .with_exec(move |ctx, _| {
                outer_calls.borrow_mut().push("test.outer".to_string());
                operator_name_call(ctx, "test.inner", OperatorContext::ExecDefault, None, None)
            }),
    );

    let result = wm.operator_call(None, "test.outer", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::FINISHED);
    assert_eq!(*calls.borrow(), vec!["test.outer", "test.inner"]);

    let undo: Vec<_> = wm.undo_stack.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(undo, vec!["Outer"]);
    let registered: Vec<_> = wm.operator_log.iter().map(|r| r.idname.as_str()).collect();
    assert_eq!(registered, vec!["test.outer"]);
    assert_eq!(wm.op_undo_depth, 0);
}

#[test]
fn test_grouped_undo_merges_repeated_calls() {
    let mut wm = WindowManager::with_defaults();
    let calls = log();
    wm.operators
        .register(logging_op("test.nudge", OperatorTypeFlags::UNDO_GROUPED, &calls));

    for _ in 0..3 {
        wm.operator_call(None, "test.nudge", OperatorContext::ExecDefault, None);
    }
    assert_eq!(calls.borrow().len(), 3);
    assert_eq!(wm.undo_stack.len(), 1);
}

#[test]
fn test_repeat_last_reruns_with_registered_properties() {
    let mut h = Harness::new();
    let sizes: Rc<RefCell<Vec<Option<i64>>>> = Default::default();
    let record = sizes.clone();
    h.wm.operators.register(
        OperatorType::new("test.size", "Size")
            .with_flags(OperatorTypeFlags::REGISTER)
            .with_exec(move |_, op| {
                record
                    .borrow_mut()
                    .push(op.properties.get("size").and_then(|v| v.as_int()));
                OperatorResult::FINISHED
            }),
    );

    let four = OperatorProperties::new().with("size", 4);
    h.wm
        .operator_call(Some(h.win), "test.size", OperatorContext::ExecDefault, Some(&four));

    let mut ctx = h.wm.context(h.win);
    assert_eq!(operator_repeat_last(&mut ctx), OperatorResult::FINISHED);

    assert_eq!(*sizes.borrow(), vec![Some(4), Some(4)]);
    assert_eq!(h.wm.operator_log.len(), 1, "repeats are not registered again");
}

#[test]
fn test_repeat_last_without_history_is_cancelled() {
    let mut wm = WindowManager::with_defaults();
    let win = wm.add_window((100, 100));
    let mut ctx = wm.context(win);
    assert_eq!(operator_repeat_last(&mut ctx), OperatorResult::CANCELLED);
}

// ============================================================================
// Macros
// ============================================================================

#[test]
fn test_macro_runs_steps_in_order() {
    let mut wm = WindowManager::with_defaults();
    let calls = log();
    wm.operators
        .register(logging_op("test.first", OperatorTypeFlags::REGISTER, &calls));
    wm.operators
        .register(logging_op("test.second", OperatorTypeFlags::REGISTER, &calls));

    let mut mac = OperatorType::new_macro("test.both", "Both", OperatorTypeFlags::REGISTER);
    mac.macro_define("test.first");
    mac.macro_define("test.second");
    wm.operators.register(mac);

    let result = wm.operator_call(None, "test.both", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::FINISHED);
    assert_eq!(*calls.borrow(), vec!["test.first", "test.second"]);

    let registered: Vec<_> = wm.operator_log.iter().map(|r| r.idname.as_str()).collect();
    assert_eq!(registered, vec!["test.both"]);
}

#[test]
fn test_macro_stops_at_cancelled_step() {
    let mut wm = WindowManager::with_defaults();
    let calls = log();
    wm.operators
        .register(logging_op("test.first", OperatorTypeFlags::empty(), &calls));
    wm.operators.register(
        OperatorType::new("test.refuse", "Refuse").with_exec(|_, _| OperatorResult::CANCELLED),
    );
    wm.operators
        .register(logging_op("test.last", OperatorTypeFlags::empty(), &calls));

    let mut refuses_first =
        OperatorType::new_macro("test.refuse_first", "Refuse First", OperatorTypeFlags::empty());
    refuses_first.macro_define("test.refuse");
    refuses_first.macro_define("test.last");
    wm.operators.register(refuses_first);

    let result = wm.operator_call(None, "test.refuse_first", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::CANCELLED);
    assert!(calls.borrow().is_empty());

    // A cancel after finished steps still counts as finished.
    let mut refuses_later =
        OperatorType::new_macro("test.refuse_later", "Refuse Later", OperatorTypeFlags::empty());
    refuses_later.macro_define("test.first");
    refuses_later.macro_define("test.refuse");
    refuses_later.macro_define("test.last");
    wm.operators.register(refuses_later);

    let result = wm.operator_call(None, "test.refuse_later", OperatorContext::ExecDefault, None);
    assert_eq!(result, OperatorResult::FINISHED);
    assert_eq!(*calls.borrow(), vec!["test.first"]);
}

#[test]
fn test_macro_step_properties_are_passed() {
    let mut wm = WindowManager::with_defaults();
    let sizes: Rc<RefCell<Vec<Option<i64>>>> = Default::default();
    let record = sizes.clone();
    wm.operators.register(OperatorType::new("test.size", "Size").with_exec(move |_, op| {
        record
            .borrow_mut()
            .push(op.properties.get("size").and_then(|v| v.as_int()));
        OperatorResult::FINISHED
    }));

    let mut mac = OperatorType::new_macro("test.sizes", "Sizes", OperatorTypeFlags::empty());
    mac.macro_define("test.size").properties.set("size", 1);
    mac.macro_define("test.size").properties.set("size", 2);
    wm.operators.register(mac);

    wm.operator_call(None, "test.sizes", OperatorContext::ExecDefault, None);
    assert_eq!(*sizes.borrow(), vec![Some(1), Some(2)]);
}

#[test]
fn test_macro_with_modal_step_continues_after_it() {
    let mut h = Harness::new();
    let calls = log();
    h.wm.operators
        .register(logging_op("test.after", OperatorTypeFlags::empty(), &calls));

    let mut mac = OperatorType::new_macro(
        "test.box_then_log",
        "Box Then Log",
        OperatorTypeFlags::REGISTER | OperatorTypeFlags::UNDO,
    );
    mac.macro_define("wm.gesture_box");
    mac.macro_define("test.after");
    h.wm.operators.register(mac);

    h.move_to(100, 100);
    let result = h.wm.operator_call(
        Some(h.win),
        "test.box_then_log",
        OperatorContext::InvokeDefault,
        None,
    );
    assert_eq!(result, OperatorResult::RUNNING_MODAL);
    assert_eq!(h.wm.modal_operators(h.win), vec!["test.box_then_log"]);

    h.press(EventType::LeftMouse);
    h.move_to(180, 140);
    assert!(calls.borrow().is_empty(), "gesture still running");

    h.release(EventType::LeftMouse);
    assert_eq!(*calls.borrow(), vec!["test.after"]);
    assert!(h.wm.modal_operators(h.win).is_empty());

    let undo: Vec<_> = h.wm.undo_stack.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(undo, vec!["Box Then Log"]);
    let registered: Vec<_> = h.wm.operator_log.iter().map(|r| r.idname.as_str()).collect();
    assert_eq!(registered, vec!["test.box_then_log"]);
}
