//! Operators
//!
//! An `OperatorType` describes an action (poll, invoke, exec, modal,
//! cancel); an `Operator` is one running call of it. Operators are called by
//! name from keymap items, dropboxes and code, and may keep running as modal
//! handlers.

mod builtin;
mod call;
mod macros;
#[allow(clippy::module_inception)]
mod operator;
mod types;

pub use builtin::{
    register_builtin_operators, GestureBox, GESTURE_BOX_MODAL_KEYMAP, GESTURE_MODAL_BEGIN,
    GESTURE_MODAL_CANCEL, GESTURE_MODAL_CONFIRM,
};
pub(crate) use call::{operator_finished, operator_invoke};
pub use call::{
    operator_exec, operator_name_call, operator_name_call_ptr, operator_poll,
    operator_poll_context, operator_repeat_last,
};
pub use operator::{Operator, Report, ReportLevel};
pub use types::{
    CancelFn, ExecFn, InvokeFn, MacroItem, OperatorContext, OperatorRegistry, OperatorResult,
    OperatorType, OperatorTypeFlags, PollFn,
};
