//! The `Event` snapshot and its typed payloads

use std::time::Instant;

use super::types::{EventModifiers, EventType, KeyValue};
use crate::dragdrop::Drag;
use crate::timer::TimerId;

/// Which tablet tool, if any, produced the event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabletTool {
    #[default]
    None,
    Stylus,
    Eraser,
}

/// Tablet pressure and tilt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabletData {
    pub active: TabletTool,
    /// Pressure after the configured curve, in `0.0..=1.0`.
    pub pressure: f32,
    pub x_tilt: f32,
    pub y_tilt: f32,
    pub is_motion_absolute: bool,
}

impl Default for TabletData {
    fn default() -> Self {
        Self {
            active: TabletTool::None,
            pressure: 1.0,
            x_tilt: 0.0,
            y_tilt: 0.0,
            is_motion_absolute: false,
        }
    }
}

/// Motion sample from a 3D mouse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NdofMotionData {
    /// Translation, normalized to device range.
    pub tvec: [f32; 3],
    /// Rotation axis scaled by angle.
    pub rvec: [f32; 3],
    /// Seconds since the previous sample.
    pub dt: f32,
}

/// Typed event payload.
///
/// `Timer` borrows: the timer stays owned by the window manager and outlives
/// the event. `Drags` and `NdofMotion` are owned and dropped with the event.
#[derive(Clone, Debug, Default)]
pub enum EventCustomData {
    #[default]
    None,
    Timer(TimerId),
    Drags(Vec<Drag>),
    NdofMotion(Box<NdofMotionData>),
}

impl EventCustomData {
    pub fn timer(&self) -> Option<TimerId> {
        match self {
            EventCustomData::Timer(id) => Some(*id),
            _ => None,
        }
    }

    pub fn drags(&self) -> Option<&[Drag]> {
        match self {
            EventCustomData::Drags(drags) => Some(drags),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EventCustomData::None)
    }
}

/// One input occurrence.
///
/// Each window also keeps an `Event` as its running input state; new events
/// start as a copy of it.
#[derive(Clone, Debug, Default)]
pub struct Event {
    pub event_type: EventType,
    pub val: KeyValue,
    pub mouse_pos: (i32, i32),
    pub prev_mouse_pos: (i32, i32),

    /// Previous type and value, used for click and double-click detection.
    pub prev_type: EventType,
    pub prev_val: KeyValue,
    pub prev_click_time: Option<Instant>,
    pub prev_click_pos: (i32, i32),

    pub modifiers: EventModifiers,
    /// Non-modifier key held down while this event happened.
    pub keymodifier: EventType,

    /// Text produced by a key press, if any.
    pub utf8: Option<char>,
    pub is_repeat: bool,
    pub is_direction_inverted: bool,

    pub tablet: TabletData,
    pub customdata: EventCustomData,

    /// Modal keymap value, set when `event_type` is `ModalMap`.
    pub propvalue: i32,

    /// Operator name of the keymap item that handled the event, for diagnostics.
    pub keymap_idname: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, val: KeyValue) -> Self {
        Self {
            event_type,
            val,
            ..Default::default()
        }
    }

    pub fn with_mouse_pos(mut self, x: i32, y: i32) -> Self {
        self.mouse_pos = (x, y);
        self
    }

    pub fn with_modifiers(mut self, modifiers: EventModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// ASCII byte of the text payload, if it is plain ASCII.
    pub fn ascii(&self) -> Option<u8> {
        self.utf8.filter(|c| c.is_ascii()).map(|c| c as u8)
    }

    pub fn is_tablet(&self) -> bool {
        self.tablet.active != TabletTool::None
    }

    /// Modal keymap value, if this event was translated by a modal keymap.
    pub fn modal_value(&self) -> Option<i32> {
        (self.event_type == EventType::ModalMap).then_some(self.propvalue)
    }

    /// Cursor movement since the previous event.
    pub fn motion_delta(&self) -> (i32, i32) {
        (
            self.mouse_pos.0 - self.prev_mouse_pos.0,
            self.mouse_pos.1 - self.prev_mouse_pos.1,
        )
    }
}
