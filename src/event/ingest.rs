//! Platform input to `Event` conversion
//!
//! Each window keeps an [`InputState`]: the running event state that every new
//! event starts from. Conversion updates that state (cursor position,
//! modifiers, previous values, click bookkeeping) and queues the resulting
//! event on the window's [`EventQueue`].

use std::time::Instant;

use super::event::{Event, EventCustomData, NdofMotionData, TabletData, TabletTool};
use super::queue::EventQueue;
use super::types::{EventType, KeyValue, ModState};
use crate::config::WmConfig;

/// Tablet sample attached to cursor and button input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabletSample {
    pub tool: TabletTool,
    /// Raw pressure in `0.0..=1.0`, before the pressure curve.
    pub pressure: f32,
    pub x_tilt: f32,
    pub y_tilt: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackpadKind {
    Pan,
    Magnify,
    Rotate,
    SmartMagnify,
}

impl TrackpadKind {
    fn event_type(self) -> EventType {
        match self {
            TrackpadKind::Pan => EventType::MousePan,
            TrackpadKind::Magnify => EventType::MouseZoom,
            TrackpadKind::Rotate => EventType::MouseRotate,
            TrackpadKind::SmartMagnify => EventType::MouseSmartZoom,
        }
    }
}

/// Raw input as reported by the platform layer, in window coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PlatformEvent {
    CursorMove {
        x: i32,
        y: i32,
        tablet: Option<TabletSample>,
    },
    Button {
        button: EventType,
        pressed: bool,
        tablet: Option<TabletSample>,
    },
    Key {
        key: EventType,
        pressed: bool,
        is_repeat: bool,
        utf8: Option<char>,
    },
    Wheel {
        z: i32,
    },
    Trackpad {
        kind: TrackpadKind,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
        inverted: bool,
    },
    NdofMotion(NdofMotionData),
    NdofButton {
        button: EventType,
        pressed: bool,
    },
    WindowDeactivate,
}

/// Running input state of one window.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    /// Last known input state; new events start as a copy of it.
    pub event: Event,
    /// Button currently emulated by a modifier + left mouse press.
    emulating: EventType,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_pos(&self) -> (i32, i32) {
        self.event.mouse_pos
    }

    /// Copy of the running state with the per-event fields reset.
    fn next_event(&self) -> Event {
        let mut event = self.event.clone();
        event.customdata = EventCustomData::None;
        event.is_repeat = false;
        event.is_direction_inverted = false;
        event.utf8 = None;
        event.keymap_idname = None;
        event
    }

    fn set_prev_values(&mut self, event: &mut Event) {
        self.event.prev_val = self.event.val;
        self.event.prev_type = self.event.event_type;
        event.prev_val = self.event.prev_val;
        event.prev_type = self.event.prev_type;
    }

    fn set_prev_click(&mut self, event: &mut Event, now: Instant) {
        self.event.prev_click_time = Some(now);
        self.event.prev_click_pos = self.event.mouse_pos;
        event.prev_click_time = Some(now);
        event.prev_click_pos = self.event.mouse_pos;
    }

    fn clear_modifiers(&mut self) {
        self.event.modifiers = Default::default();
        self.event.keymodifier = EventType::None;
    }
}

/// Convert one platform event and queue the result.
pub fn add_platform_event(
    input: &mut InputState,
    queue: &mut EventQueue,
    config: &WmConfig,
    platform: PlatformEvent,
    now: Instant,
) {
    let mut event = input.next_event();

    match platform {
        PlatformEvent::CursorMove { x, y, tablet } => {
            event.event_type = EventType::MouseMove;
            event.val = KeyValue::Nothing;
            event.mouse_pos = (x, y);
            event.tablet = tablet_data(tablet, config);

            let state_pos = input.event.mouse_pos;
            let queued = queue.push_mousemove(event, state_pos);
            input.event.mouse_pos = queued.mouse_pos;
            input.event.tablet.is_motion_absolute = queued.tablet.is_motion_absolute;
        }

        PlatformEvent::Trackpad {
            kind,
            x,
            y,
            dx,
            dy,
            inverted,
        } => {
            event.event_type = kind.event_type();
            event.val = KeyValue::Nothing;
            event.mouse_pos = (x, y);
            event.is_direction_inverted = inverted;

            // Zooming in is positive.
            let (dx, dy) = if kind == TrackpadKind::Magnify {
                (-dx, -dy)
            } else {
                (dx, dy)
            };
            queue.push_trackpad(event, (dx, -dy));
        }

        PlatformEvent::Button {
            button,
            pressed,
            tablet,
        } => {
            event.event_type = button;
            event.val = if pressed {
                KeyValue::Press
            } else {
                KeyValue::Release
            };
            event.tablet = tablet_data(tablet, config);

            emulate_buttons(input, &mut event, config);
            input.set_prev_values(&mut event);
            input.event.val = event.val;
            input.event.event_type = event.event_type;

            if is_double_click(&event, config, now) {
                event.val = KeyValue::DblClick;
            }
            if event.val == KeyValue::Press {
                input.set_prev_click(&mut event, now);
            }
            queue.push(event);
        }

        PlatformEvent::Key {
            key,
            pressed,
            is_repeat,
            utf8,
        } => {
            event.event_type = key;
            event.val = if pressed {
                KeyValue::Press
            } else {
                KeyValue::Release
            };
            event.is_repeat = is_repeat;

            emulate_buttons(input, &mut event, config);
            input.set_prev_values(&mut event);
            input.event.val = event.val;
            input.event.event_type = event.event_type;
            input.event.is_repeat = event.is_repeat;

            // Release carries no text; control characters are never text.
            event.utf8 = if pressed {
                utf8.filter(|c| (*c as u32) >= 32)
            } else {
                None
            };

            update_modifiers(input, &mut event);

            if is_double_click(&event, config, now) {
                event.val = KeyValue::DblClick;
            }
            if event.val == KeyValue::Press && !event.is_repeat {
                input.set_prev_click(&mut event, now);
            }

            // Holding a key must not report it as its own key-modifier.
            if event.keymodifier == event.event_type {
                event.keymodifier = EventType::None;
            }
            if event.keymodifier == EventType::UnknownKey {
                event.keymodifier = EventType::None;
                input.event.keymodifier = EventType::None;
            }

            queue.push(event);
        }

        PlatformEvent::Wheel { z } => {
            event.event_type = if z > 0 {
                EventType::WheelUpMouse
            } else {
                EventType::WheelDownMouse
            };
            event.val = KeyValue::Press;
            queue.push(event);
        }

        PlatformEvent::NdofMotion(data) => {
            event.event_type = EventType::NdofMotion;
            event.val = KeyValue::Nothing;
            event.customdata = EventCustomData::NdofMotion(Box::new(data));
            queue.push(event);
        }

        PlatformEvent::NdofButton { button, pressed } => {
            event.event_type = button;
            event.val = if pressed {
                KeyValue::Press
            } else {
                KeyValue::Release
            };
            input.set_prev_values(&mut event);
            input.event.val = event.val;
            input.event.event_type = event.event_type;
            queue.push(event);
        }

        PlatformEvent::WindowDeactivate => {
            // Modifier releases happening elsewhere are never reported.
            input.clear_modifiers();
            event.event_type = EventType::WindowDeactivate;
            event.val = KeyValue::Nothing;
            event.modifiers = Default::default();
            event.keymodifier = EventType::None;
            queue.push(event);
        }
    }
}

fn tablet_data(sample: Option<TabletSample>, config: &WmConfig) -> TabletData {
    match sample {
        Some(sample) if sample.tool != TabletTool::None => TabletData {
            active: sample.tool,
            pressure: config.pressure_curve(sample.pressure),
            x_tilt: sample.x_tilt,
            y_tilt: sample.y_tilt,
            is_motion_absolute: true,
        },
        _ => TabletData::default(),
    }
}

/// Counted modifier and key-modifier bookkeeping for a key event.
fn update_modifiers(input: &mut InputState, event: &mut Event) {
    let pressed = event.val == KeyValue::Press;
    let mods = event.modifiers;
    let state = |others_held: bool| {
        if !pressed {
            ModState::NOTHING
        } else if others_held {
            ModState::BOTH
        } else {
            ModState::FIRST
        }
    };

    match event.event_type {
        EventType::LeftShift | EventType::RightShift => {
            event.modifiers.shift = state(
                mods.ctrl.is_set() || mods.alt.is_set() || mods.oskey.is_set(),
            );
        }
        EventType::LeftCtrl | EventType::RightCtrl => {
            event.modifiers.ctrl = state(
                mods.shift.is_set() || mods.alt.is_set() || mods.oskey.is_set(),
            );
        }
        EventType::LeftAlt | EventType::RightAlt => {
            event.modifiers.alt = state(
                mods.shift.is_set() || mods.ctrl.is_set() || mods.oskey.is_set(),
            );
        }
        EventType::OsKey => {
            event.modifiers.oskey = state(
                mods.shift.is_set() || mods.ctrl.is_set() || mods.alt.is_set(),
            );
        }
        _ => {
            if pressed && event.keymodifier == EventType::None {
                // Only the next event sees this key as held.
                input.event.keymodifier = event.event_type;
            } else if event.val == KeyValue::Release && event.keymodifier == event.event_type {
                event.keymodifier = EventType::None;
                input.event.keymodifier = EventType::None;
            }
        }
    }
    input.event.modifiers = event.modifiers;
}

/// Three-button and numpad emulation.
fn emulate_buttons(input: &mut InputState, event: &mut Event, config: &WmConfig) {
    if config.emulate_3_button && event.event_type == EventType::LeftMouse {
        let mac = cfg!(target_os = "macos");
        let held = if mac {
            &mut event.modifiers.oskey
        } else {
            &mut event.modifiers.alt
        };
        match event.val {
            KeyValue::Press => {
                if held.is_set() {
                    *held = ModState::NOTHING;
                    event.event_type = EventType::MiddleMouse;
                    input.emulating = EventType::MiddleMouse;
                }
            }
            KeyValue::Release => {
                // Only release middle mouse when it was emulated.
                if input.emulating == EventType::MiddleMouse {
                    event.event_type = EventType::MiddleMouse;
                    *held = ModState::NOTHING;
                }
                input.emulating = EventType::None;
            }
            _ => {}
        }
    }

    if config.emulate_numpad {
        event.event_type = match event.event_type {
            EventType::Zero => EventType::Pad0,
            EventType::One => EventType::Pad1,
            EventType::Two => EventType::Pad2,
            EventType::Three => EventType::Pad3,
            EventType::Four => EventType::Pad4,
            EventType::Five => EventType::Pad5,
            EventType::Six => EventType::Pad6,
            EventType::Seven => EventType::Pad7,
            EventType::Eight => EventType::Pad8,
            EventType::Nine => EventType::Pad9,
            EventType::Minus => EventType::PadMinus,
            EventType::Equal => EventType::PadPlus,
            EventType::Backslash => EventType::PadSlash,
            other => other,
        };
    }
}

/// Same type pressed again right after its release, close in time and,
/// for mouse buttons, without moving past the drag threshold.
pub fn is_double_click(event: &Event, config: &WmConfig, now: Instant) -> bool {
    if event.event_type != event.prev_type
        || event.prev_val != KeyValue::Release
        || event.val != KeyValue::Press
    {
        return false;
    }
    if event.event_type.is_mouse_button() && drag_test(event, event.prev_click_pos, config) {
        return false;
    }
    event
        .prev_click_time
        .is_some_and(|t| now.saturating_duration_since(t) < config.double_click_time())
}

/// Pixels the cursor may travel before a press turns into a drag.
///
/// Depends on what was pressed last: mouse (or tablet) buttons use their own
/// thresholds, everything else the keyboard one.
pub fn drag_threshold(event: &Event, config: &WmConfig) -> i32 {
    let threshold = if event.prev_type.is_mouse() {
        debug_assert_ne!(event.prev_type, EventType::MouseMove);
        if event.is_tablet() {
            config.drag_threshold_tablet
        } else {
            config.drag_threshold_mouse
        }
    } else {
        config.drag_threshold
    };
    (threshold as f32 * config.dpi_fac) as i32
}

pub fn drag_test_with_delta(event: &Event, delta: (i32, i32), config: &WmConfig) -> bool {
    let threshold = drag_threshold(event, config);
    delta.0.abs() > threshold || delta.1.abs() > threshold
}

/// Whether the cursor moved past the drag threshold since `prev_pos`.
pub fn drag_test(event: &Event, prev_pos: (i32, i32), config: &WmConfig) -> bool {
    let delta = (
        prev_pos.0 - event.mouse_pos.0,
        prev_pos.1 - event.mouse_pos.1,
    );
    drag_test_with_delta(event, delta, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(key: EventType, pressed: bool) -> PlatformEvent {
        PlatformEvent::Key {
            key,
            pressed,
            is_repeat: false,
            utf8: None,
        }
    }

    fn button(button: EventType, pressed: bool) -> PlatformEvent {
        PlatformEvent::Button {
            button,
            pressed,
            tablet: None,
        }
    }

    struct Harness {
        input: InputState,
        queue: EventQueue,
        config: WmConfig,
        now: Instant,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                input: InputState::new(),
                queue: EventQueue::new(),
                config: WmConfig::default(),
                now: Instant::now(),
            }
        }

        fn send(&mut self, platform: PlatformEvent) -> Event {
            add_platform_event(
                &mut self.input,
                &mut self.queue,
                &self.config,
                platform,
                self.now,
            );
            self.queue.pop().expect("event queued")
        }

        fn advance(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
        }
    }

    #[test]
    fn test_modifier_counting() {
        let mut h = Harness::new();
        let ev = h.send(key(EventType::LeftCtrl, true));
        assert_eq!(ev.modifiers.ctrl, ModState::FIRST);

        let ev = h.send(key(EventType::LeftShift, true));
        assert_eq!(ev.modifiers.shift, ModState::BOTH);
        assert_eq!(ev.modifiers.ctrl, ModState::FIRST);

        let ev = h.send(key(EventType::LeftCtrl, false));
        assert_eq!(ev.modifiers.ctrl, ModState::NOTHING);
        assert_eq!(ev.modifiers.shift, ModState::BOTH);

        let ev = h.send(key(EventType::A, true));
        assert_eq!(ev.modifiers.shift, ModState::BOTH);
        assert_eq!(ev.modifiers.ctrl, ModState::NOTHING);
    }

    #[test]
    fn test_keymodifier_applies_to_next_event() {
        let mut h = Harness::new();
        let ev = h.send(key(EventType::Q, true));
        assert_eq!(ev.keymodifier, EventType::None);

        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.keymodifier, EventType::Q);

        // Repeat of the held key never carries itself.
        let ev = h.send(PlatformEvent::Key {
            key: EventType::Q,
            pressed: true,
            is_repeat: true,
            utf8: None,
        });
        assert_eq!(ev.keymodifier, EventType::None);

        let ev = h.send(key(EventType::Q, false));
        assert_eq!(ev.keymodifier, EventType::None);
        let ev = h.send(button(EventType::LeftMouse, false));
        assert_eq!(ev.keymodifier, EventType::None);
    }

    #[test]
    fn test_text_payload() {
        let mut h = Harness::new();
        let ev = h.send(PlatformEvent::Key {
            key: EventType::A,
            pressed: true,
            is_repeat: false,
            utf8: Some('a'),
        });
        assert_eq!(ev.utf8, Some('a'));
        assert_eq!(ev.ascii(), Some(b'a'));

        let ev = h.send(PlatformEvent::Key {
            key: EventType::Tab,
            pressed: true,
            is_repeat: false,
            utf8: Some('\t'),
        });
        assert_eq!(ev.utf8, None);

        let ev = h.send(PlatformEvent::Key {
            key: EventType::A,
            pressed: false,
            is_repeat: false,
            utf8: Some('a'),
        });
        assert_eq!(ev.utf8, None);
    }

    #[test]
    fn test_double_click_within_time() {
        let mut h = Harness::new();
        h.send(button(EventType::LeftMouse, true));
        h.send(button(EventType::LeftMouse, false));
        h.advance(100);
        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.val, KeyValue::DblClick);
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut h = Harness::new();
        h.send(button(EventType::LeftMouse, true));
        h.send(button(EventType::LeftMouse, false));
        h.advance(400);
        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.val, KeyValue::Press);
    }

    #[test]
    fn test_double_click_cancelled_by_motion() {
        let mut h = Harness::new();
        h.send(button(EventType::LeftMouse, true));
        h.send(button(EventType::LeftMouse, false));
        h.send(PlatformEvent::CursorMove {
            x: 20,
            y: 0,
            tablet: None,
        });
        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.val, KeyValue::Press);
    }

    #[test]
    fn test_keyboard_double_click() {
        let mut h = Harness::new();
        h.send(key(EventType::G, true));
        h.send(key(EventType::G, false));
        let ev = h.send(key(EventType::G, true));
        assert_eq!(ev.val, KeyValue::DblClick);
    }

    #[test]
    fn test_three_button_emulation() {
        let mut h = Harness::new();
        h.config.emulate_3_button = true;
        let held = if cfg!(target_os = "macos") {
            EventType::OsKey
        } else {
            EventType::LeftAlt
        };
        h.send(key(held, true));

        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.event_type, EventType::MiddleMouse);
        assert!(!ev.modifiers.alt.is_set() && !ev.modifiers.oskey.is_set());

        h.send(key(held, false));
        let ev = h.send(button(EventType::LeftMouse, false));
        assert_eq!(ev.event_type, EventType::MiddleMouse);
        assert_eq!(ev.val, KeyValue::Release);

        let ev = h.send(button(EventType::LeftMouse, true));
        assert_eq!(ev.event_type, EventType::LeftMouse);
    }

    #[test]
    fn test_numpad_emulation() {
        let mut h = Harness::new();
        h.config.emulate_numpad = true;
        assert_eq!(h.send(key(EventType::Seven, true)).event_type, EventType::Pad7);
        assert_eq!(h.send(key(EventType::Equal, true)).event_type, EventType::PadPlus);
        assert_eq!(h.send(key(EventType::A, true)).event_type, EventType::A);
    }

    #[test]
    fn test_cursor_motion_updates_state() {
        let mut h = Harness::new();
        add_platform_event(
            &mut h.input,
            &mut h.queue,
            &h.config,
            PlatformEvent::CursorMove {
                x: 5,
                y: 5,
                tablet: None,
            },
            h.now,
        );
        add_platform_event(
            &mut h.input,
            &mut h.queue,
            &h.config,
            PlatformEvent::CursorMove {
                x: 9,
                y: 7,
                tablet: None,
            },
            h.now,
        );
        assert_eq!(h.queue.len(), 1);
        assert_eq!(h.input.mouse_pos(), (9, 7));
        let ev = h.queue.pop().unwrap();
        assert_eq!(ev.prev_mouse_pos, (0, 0));
    }

    #[test]
    fn test_magnify_is_negated() {
        let mut h = Harness::new();
        let ev = h.send(PlatformEvent::Trackpad {
            kind: TrackpadKind::Magnify,
            x: 10,
            y: 10,
            dx: 4,
            dy: 0,
            inverted: false,
        });
        assert_eq!(ev.event_type, EventType::MouseZoom);
        assert_eq!(ev.motion_delta(), (-4, 0));
    }

    #[test]
    fn test_wheel_direction() {
        let mut h = Harness::new();
        assert_eq!(
            h.send(PlatformEvent::Wheel { z: 1 }).event_type,
            EventType::WheelUpMouse
        );
        assert_eq!(
            h.send(PlatformEvent::Wheel { z: -1 }).event_type,
            EventType::WheelDownMouse
        );
    }

    #[test]
    fn test_deactivate_clears_modifiers() {
        let mut h = Harness::new();
        h.send(key(EventType::LeftShift, true));
        h.send(PlatformEvent::WindowDeactivate);
        let ev = h.send(key(EventType::A, true));
        assert!(!ev.modifiers.any_held());
    }

    #[test]
    fn test_tablet_pressure_curve() {
        let mut h = Harness::new();
        h.config.pressure_threshold_max = 0.5;
        let ev = h.send(PlatformEvent::Button {
            button: EventType::LeftMouse,
            pressed: true,
            tablet: Some(TabletSample {
                tool: TabletTool::Stylus,
                pressure: 0.25,
                x_tilt: 0.0,
                y_tilt: 0.0,
            }),
        });
        assert!(ev.is_tablet());
        assert_eq!(ev.tablet.pressure, 0.5);
    }

    #[test]
    fn test_drag_threshold_by_previous_type() {
        let config = WmConfig::default();
        let mut ev = Event::new(EventType::MouseMove, KeyValue::Nothing);
        ev.prev_type = EventType::LeftMouse;
        assert_eq!(drag_threshold(&ev, &config), 3);
        ev.tablet.active = TabletTool::Stylus;
        assert_eq!(drag_threshold(&ev, &config), 10);
        ev.prev_type = EventType::G;
        assert_eq!(drag_threshold(&ev, &config), 30);

        ev.prev_type = EventType::LeftMouse;
        ev.tablet.active = TabletTool::None;
        assert!(!drag_test_with_delta(&ev, (3, -3), &config));
        assert!(drag_test_with_delta(&ev, (0, -4), &config));
    }
}
