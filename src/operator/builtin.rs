//! Operators every window manager registers

use super::types::{OperatorRegistry, OperatorResult, OperatorType, OperatorTypeFlags};
use super::Operator;
use crate::event::{Event, EventType, KeyValue};
use crate::keymap::KeyMapKey;
use crate::notifier::{NotifierRef, NA_ADDED, NC_ID, NC_SCENE, NC_WINDOW, ND_OB_SELECT};
use crate::wm::{Context, Rect, RegionType, SpaceType};

/// Modal keymap values of the box gesture.
pub const GESTURE_MODAL_CANCEL: i32 = 1;
pub const GESTURE_MODAL_CONFIRM: i32 = 2;
pub const GESTURE_MODAL_BEGIN: i32 = 7;

pub const GESTURE_BOX_MODAL_KEYMAP: &str = "Gesture Box";

pub fn register_builtin_operators(registry: &mut OperatorRegistry) {
    registry.register(wm_ot_quit_kraken());
    registry.register(wm_ot_redraw_all());
    registry.register(wm_ot_gesture_box());
    registry.register(wm_ot_drop_path());
}

fn wm_ot_quit_kraken() -> OperatorType {
    OperatorType::new("wm.quit_kraken", "Quit Kraken")
        .with_description("Quit Kraken")
        .with_exec(|ctx, _op| {
            tracing::info!("Quit requested");
            ctx.wm_mut().quit_requested = true;
            OperatorResult::FINISHED
        })
}

fn wm_ot_redraw_all() -> OperatorType {
    OperatorType::new("wm.redraw_all", "Redraw All")
        .with_description("Tag every region of every window for redraw")
        .with_flags(OperatorTypeFlags::INTERNAL)
        .with_exec(|ctx, _op| {
            let windows: Vec<_> = ctx.wm().windows.iter().map(|w| w.id).collect();
            for window in windows {
                ctx.wm_mut()
                    .notifiers
                    .add(Some(window), NC_WINDOW, NotifierRef::None);
            }
            OperatorResult::FINISHED
        })
}

/// State of a running box gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureBox {
    pub start: Option<(i32, i32)>,
    pub end: (i32, i32),
}

impl GestureBox {
    fn rect(&self) -> Option<Rect> {
        let (sx, sy) = self.start?;
        let (ex, ey) = self.end;
        Some(Rect::new(sx.min(ex), sy.min(ey), sx.max(ex), sy.max(ey)))
    }
}

fn wm_ot_gesture_box() -> OperatorType {
    OperatorType::new("wm.gesture_box", "Box Select")
        .with_description("Select items using box selection")
        .with_flags(OperatorTypeFlags::REGISTER | OperatorTypeFlags::UNDO)
        .with_poll(|ctx| ctx.window().is_some())
        .with_invoke(gesture_box_invoke)
        .with_modal(gesture_box_modal)
        .with_exec(gesture_box_exec)
        .with_modalkeymap(KeyMapKey::new(
            GESTURE_BOX_MODAL_KEYMAP,
            SpaceType::Empty,
            RegionType::Window,
        ))
}

fn gesture_box_invoke(_ctx: &mut Context<'_>, op: &mut Operator, event: &Event) -> OperatorResult {
    let wait_for_input = op
        .properties
        .get("wait_for_input")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    let mut gesture = GestureBox {
        start: None,
        end: event.mouse_pos,
    };
    if !wait_for_input {
        // A drag starts where the button went down.
        gesture.start = Some(if event.val == KeyValue::ClickDrag {
            event.prev_click_pos
        } else {
            event.mouse_pos
        });
    }
    op.set_customdata(gesture);
    OperatorResult::RUNNING_MODAL
}

fn gesture_box_modal(ctx: &mut Context<'_>, op: &mut Operator, event: &Event) -> OperatorResult {
    let Some(gesture) = op.customdata_mut::<GestureBox>() else {
        return OperatorResult::CANCELLED;
    };

    match event.modal_value() {
        Some(GESTURE_MODAL_CANCEL) => return OperatorResult::CANCELLED,
        Some(GESTURE_MODAL_BEGIN) => {
            gesture.start.get_or_insert(event.mouse_pos);
            gesture.end = event.mouse_pos;
        }
        Some(GESTURE_MODAL_CONFIRM) => {
            gesture.end = event.mouse_pos;
            let Some(rect) = gesture.rect().filter(|r| r.width() > 0 && r.height() > 0) else {
                return OperatorResult::CANCELLED;
            };
            op.properties.set("xmin", rect.xmin);
            op.properties.set("ymin", rect.ymin);
            op.properties.set("xmax", rect.xmax);
            op.properties.set("ymax", rect.ymax);
            return gesture_box_exec(ctx, op);
        }
        _ => {
            if event.event_type == EventType::MouseMove {
                gesture.end = event.mouse_pos;
                if let Some(region) = ctx.region_mut() {
                    region.tag_redraw();
                }
            }
        }
    }
    OperatorResult::RUNNING_MODAL
}

fn gesture_box_exec(ctx: &mut Context<'_>, op: &mut Operator) -> OperatorResult {
    let coord = |name: &str| op.properties.get(name).and_then(|v| v.as_int());
    let (Some(xmin), Some(ymin), Some(xmax), Some(ymax)) =
        (coord("xmin"), coord("ymin"), coord("xmax"), coord("ymax"))
    else {
        return OperatorResult::CANCELLED;
    };
    tracing::debug!("Box select ({}, {}) - ({}, {})", xmin, ymin, xmax, ymax);
    ctx.add_notifier(NC_SCENE | ND_OB_SELECT, NotifierRef::None);
    OperatorResult::FINISHED
}

fn wm_ot_drop_path() -> OperatorType {
    OperatorType::new("wm.drop_path", "Open Dropped Path")
        .with_flags(OperatorTypeFlags::INTERNAL | OperatorTypeFlags::UNDO)
        .with_exec(|ctx, op| {
            let Some(path) = op.properties.get("filepath").and_then(|v| v.as_str()) else {
                return OperatorResult::CANCELLED;
            };
            tracing::info!("Dropped path {}", path);
            ctx.add_notifier(NC_ID | NA_ADDED, NotifierRef::None);
            OperatorResult::FINISHED
        })
}
