//! Adapter converting winit window events into `PlatformEvent`s

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::event::{EventType, PlatformEvent, TrackpadKind};

/// Map a physical key to its event type.
///
/// Keys without an event type map to `UnknownKey`, so they still take part in
/// modifier and key-modifier bookkeeping.
pub fn event_type_from_physical_key(physical_key: PhysicalKey) -> EventType {
    let PhysicalKey::Code(code) = physical_key else {
        return EventType::UnknownKey;
    };

    match code {
        WinitKeyCode::KeyA => EventType::A,
        WinitKeyCode::KeyB => EventType::B,
        WinitKeyCode::KeyC => EventType::C,
        WinitKeyCode::KeyD => EventType::D,
        WinitKeyCode::KeyE => EventType::E,
        WinitKeyCode::KeyF => EventType::F,
        WinitKeyCode::KeyG => EventType::G,
        WinitKeyCode::KeyH => EventType::H,
        WinitKeyCode::KeyI => EventType::I,
        WinitKeyCode::KeyJ => EventType::J,
        WinitKeyCode::KeyK => EventType::K,
        WinitKeyCode::KeyL => EventType::L,
        WinitKeyCode::KeyM => EventType::M,
        WinitKeyCode::KeyN => EventType::N,
        WinitKeyCode::KeyO => EventType::O,
        WinitKeyCode::KeyP => EventType::P,
        WinitKeyCode::KeyQ => EventType::Q,
        WinitKeyCode::KeyR => EventType::R,
        WinitKeyCode::KeyS => EventType::S,
        WinitKeyCode::KeyT => EventType::T,
        WinitKeyCode::KeyU => EventType::U,
        WinitKeyCode::KeyV => EventType::V,
        WinitKeyCode::KeyW => EventType::W,
        WinitKeyCode::KeyX => EventType::X,
        WinitKeyCode::KeyY => EventType::Y,
        WinitKeyCode::KeyZ => EventType::Z,

        WinitKeyCode::Digit0 => EventType::Zero,
        WinitKeyCode::Digit1 => EventType::One,
        WinitKeyCode::Digit2 => EventType::Two,
        WinitKeyCode::Digit3 => EventType::Three,
        WinitKeyCode::Digit4 => EventType::Four,
        WinitKeyCode::Digit5 => EventType::Five,
        WinitKeyCode::Digit6 => EventType::Six,
        WinitKeyCode::Digit7 => EventType::Seven,
        WinitKeyCode::Digit8 => EventType::Eight,
        WinitKeyCode::Digit9 => EventType::Nine,

        WinitKeyCode::Numpad0 => EventType::Pad0,
        WinitKeyCode::Numpad1 => EventType::Pad1,
        WinitKeyCode::Numpad2 => EventType::Pad2,
        WinitKeyCode::Numpad3 => EventType::Pad3,
        WinitKeyCode::Numpad4 => EventType::Pad4,
        WinitKeyCode::Numpad5 => EventType::Pad5,
        WinitKeyCode::Numpad6 => EventType::Pad6,
        WinitKeyCode::Numpad7 => EventType::Pad7,
        WinitKeyCode::Numpad8 => EventType::Pad8,
        WinitKeyCode::Numpad9 => EventType::Pad9,
        WinitKeyCode::NumpadAdd => EventType::PadPlus,
        WinitKeyCode::NumpadSubtract => EventType::PadMinus,
        WinitKeyCode::NumpadMultiply => EventType::PadAsterisk,
        WinitKeyCode::NumpadDivide => EventType::PadSlash,
        WinitKeyCode::NumpadEnter => EventType::PadEnter,
        WinitKeyCode::NumpadDecimal => EventType::PadPeriod,

        WinitKeyCode::F1 => EventType::F1,
        WinitKeyCode::F2 => EventType::F2,
        WinitKeyCode::F3 => EventType::F3,
        WinitKeyCode::F4 => EventType::F4,
        WinitKeyCode::F5 => EventType::F5,
        WinitKeyCode::F6 => EventType::F6,
        WinitKeyCode::F7 => EventType::F7,
        WinitKeyCode::F8 => EventType::F8,
        WinitKeyCode::F9 => EventType::F9,
        WinitKeyCode::F10 => EventType::F10,
        WinitKeyCode::F11 => EventType::F11,
        WinitKeyCode::F12 => EventType::F12,
        WinitKeyCode::F13 => EventType::F13,
        WinitKeyCode::F14 => EventType::F14,
        WinitKeyCode::F15 => EventType::F15,
        WinitKeyCode::F16 => EventType::F16,
        WinitKeyCode::F17 => EventType::F17,
        WinitKeyCode::F18 => EventType::F18,
        WinitKeyCode::F19 => EventType::F19,
        WinitKeyCode::F20 => EventType::F20,
        WinitKeyCode::F21 => EventType::F21,
        WinitKeyCode::F22 => EventType::F22,
        WinitKeyCode::F23 => EventType::F23,
        WinitKeyCode::F24 => EventType::F24,

        WinitKeyCode::ArrowLeft => EventType::LeftArrow,
        WinitKeyCode::ArrowRight => EventType::RightArrow,
        WinitKeyCode::ArrowUp => EventType::UpArrow,
        WinitKeyCode::ArrowDown => EventType::DownArrow,

        WinitKeyCode::ShiftLeft => EventType::LeftShift,
        WinitKeyCode::ShiftRight => EventType::RightShift,
        WinitKeyCode::ControlLeft => EventType::LeftCtrl,
        WinitKeyCode::ControlRight => EventType::RightCtrl,
        WinitKeyCode::AltLeft => EventType::LeftAlt,
        WinitKeyCode::AltRight => EventType::RightAlt,
        WinitKeyCode::SuperLeft | WinitKeyCode::SuperRight => EventType::OsKey,

        WinitKeyCode::Escape => EventType::Esc,
        WinitKeyCode::Enter => EventType::Return,
        WinitKeyCode::Tab => EventType::Tab,
        WinitKeyCode::Space => EventType::Space,
        WinitKeyCode::Backspace => EventType::Backspace,
        WinitKeyCode::Delete => EventType::Delete,
        WinitKeyCode::Insert => EventType::Insert,
        WinitKeyCode::Home => EventType::Home,
        WinitKeyCode::End => EventType::End,
        WinitKeyCode::PageUp => EventType::PageUp,
        WinitKeyCode::PageDown => EventType::PageDown,
        WinitKeyCode::Pause => EventType::Pause,
        WinitKeyCode::CapsLock => EventType::CapsLock,
        WinitKeyCode::ContextMenu => EventType::AppKey,

        WinitKeyCode::Semicolon => EventType::Semicolon,
        WinitKeyCode::Period => EventType::Period,
        WinitKeyCode::Comma => EventType::Comma,
        WinitKeyCode::Quote => EventType::Quote,
        WinitKeyCode::Backquote => EventType::AccentGrave,
        WinitKeyCode::Minus => EventType::Minus,
        WinitKeyCode::Equal => EventType::Equal,
        WinitKeyCode::Slash => EventType::Slash,
        WinitKeyCode::Backslash => EventType::Backslash,
        WinitKeyCode::BracketLeft => EventType::LeftBracket,
        WinitKeyCode::BracketRight => EventType::RightBracket,
        WinitKeyCode::IntlBackslash => EventType::GrLess,

        WinitKeyCode::MediaPlayPause => EventType::MediaPlay,
        WinitKeyCode::MediaStop => EventType::MediaStop,
        WinitKeyCode::MediaTrackPrevious => EventType::MediaFirst,
        WinitKeyCode::MediaTrackNext => EventType::MediaLast,

        _ => EventType::UnknownKey,
    }
}

pub fn event_type_from_mouse_button(button: MouseButton) -> Option<EventType> {
    match button {
        MouseButton::Left => Some(EventType::LeftMouse),
        MouseButton::Middle => Some(EventType::MiddleMouse),
        MouseButton::Right => Some(EventType::RightMouse),
        MouseButton::Back => Some(EventType::Button4Mouse),
        MouseButton::Forward => Some(EventType::Button5Mouse),
        MouseButton::Other(5) => Some(EventType::Button6Mouse),
        MouseButton::Other(6) => Some(EventType::Button7Mouse),
        MouseButton::Other(_) => None,
    }
}

/// Key press or release with its text payload.
pub fn key_platform_event(
    physical_key: PhysicalKey,
    state: ElementState,
    repeat: bool,
    text: Option<&str>,
) -> PlatformEvent {
    PlatformEvent::Key {
        key: event_type_from_physical_key(physical_key),
        pressed: state == ElementState::Pressed,
        is_repeat: repeat,
        utf8: text.and_then(|t| t.chars().next()),
    }
}

/// Wheel step from either line or pixel scrolling; `None` for horizontal or
/// zero deltas.
pub fn wheel_platform_event(delta: MouseScrollDelta) -> Option<PlatformEvent> {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(pos) => pos.y,
    };
    if y == 0.0 {
        return None;
    }
    Some(PlatformEvent::Wheel {
        z: if y > 0.0 { 1 } else { -1 },
    })
}

/// Flip a winit (top-left origin) position into window coordinates with a
/// bottom-left origin.
pub fn window_coords(x: f64, y: f64, window_height: i32) -> (i32, i32) {
    (x.round() as i32, window_height - 1 - y.round() as i32)
}

/// Convert a winit window event.
///
/// `cursor` is the last known cursor position in window coordinates, used for
/// gestures that carry no position of their own.
pub fn platform_event_from_winit(
    event: &WindowEvent,
    window_height: i32,
    cursor: (i32, i32),
) -> Option<PlatformEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => Some(key_platform_event(
            event.physical_key,
            event.state,
            event.repeat,
            event.text.as_deref(),
        )),
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = window_coords(position.x, position.y, window_height);
            Some(PlatformEvent::CursorMove { x, y, tablet: None })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            Some(PlatformEvent::Button {
                button: event_type_from_mouse_button(*button)?,
                pressed: *state == ElementState::Pressed,
                tablet: None,
            })
        }
        WindowEvent::MouseWheel { delta, .. } => wheel_platform_event(*delta),
        WindowEvent::PanGesture { delta, .. } => Some(PlatformEvent::Trackpad {
            kind: TrackpadKind::Pan,
            x: cursor.0,
            y: cursor.1,
            dx: delta.x.round() as i32,
            dy: delta.y.round() as i32,
            inverted: false,
        }),
        WindowEvent::PinchGesture { delta, .. } => Some(PlatformEvent::Trackpad {
            kind: TrackpadKind::Magnify,
            x: cursor.0,
            y: cursor.1,
            dx: (delta * 125.0).round() as i32,
            dy: 0,
            inverted: false,
        }),
        WindowEvent::RotationGesture { delta, .. } => Some(PlatformEvent::Trackpad {
            kind: TrackpadKind::Rotate,
            x: cursor.0,
            y: cursor.1,
            dx: delta.round() as i32,
            dy: 0,
            inverted: false,
        }),
        WindowEvent::DoubleTapGesture { .. } => Some(PlatformEvent::Trackpad {
            kind: TrackpadKind::SmartMagnify,
            x: cursor.0,
            y: cursor.1,
            dx: 0,
            dy: 0,
            inverted: false,
        }),
        WindowEvent::Focused(false) => Some(PlatformEvent::WindowDeactivate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_letter_keys() {
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::KeyS)),
            EventType::S
        );
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::KeyZ)),
            EventType::Z
        );
    }

    #[test]
    fn test_numpad_keys() {
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::Numpad1)),
            EventType::Pad1
        );
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::NumpadAdd)),
            EventType::PadPlus
        );
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::ShiftRight)),
            EventType::RightShift
        );
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::SuperLeft)),
            EventType::OsKey
        );
    }

    #[test]
    fn test_function_keys() {
        for (code, expected) in [
            (WinitKeyCode::F1, EventType::F1),
            (WinitKeyCode::F12, EventType::F12),
            (WinitKeyCode::F24, EventType::F24),
        ] {
            assert_eq!(
                event_type_from_physical_key(PhysicalKey::Code(code)),
                expected
            );
        }
    }

    #[test]
    fn test_unmapped_key_is_unknown() {
        assert_eq!(
            event_type_from_physical_key(PhysicalKey::Code(WinitKeyCode::LaunchMail)),
            EventType::UnknownKey
        );
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(
            event_type_from_mouse_button(MouseButton::Left),
            Some(EventType::LeftMouse)
        );
        assert_eq!(
            event_type_from_mouse_button(MouseButton::Back),
            Some(EventType::Button4Mouse)
        );
        assert_eq!(event_type_from_mouse_button(MouseButton::Other(42)), None);
    }

    #[test]
    fn test_key_event_text() {
        let ev = key_platform_event(
            PhysicalKey::Code(WinitKeyCode::KeyA),
            ElementState::Pressed,
            false,
            Some("a"),
        );
        assert_eq!(
            ev,
            PlatformEvent::Key {
                key: EventType::A,
                pressed: true,
                is_repeat: false,
                utf8: Some('a'),
            }
        );
    }

    #[test]
    fn test_wheel_direction() {
        assert_eq!(
            wheel_platform_event(MouseScrollDelta::LineDelta(0.0, 1.0)),
            Some(PlatformEvent::Wheel { z: 1 })
        );
        assert_eq!(
            wheel_platform_event(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -12.0))),
            Some(PlatformEvent::Wheel { z: -1 })
        );
        assert_eq!(wheel_platform_event(MouseScrollDelta::LineDelta(1.0, 0.0)), None);
    }

    #[test]
    fn test_window_coords_flip() {
        assert_eq!(window_coords(10.0, 0.0, 600), (10, 599));
        assert_eq!(window_coords(10.4, 599.0, 600), (10, 0));
    }
}
