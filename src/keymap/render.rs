//! Human-readable shortcut strings
//!
//! Token order is fixed: Shift, Ctrl, Alt, OS, key-modifier, key. Tokens are
//! joined with single spaces.

use super::item::KeyMapItem;
use super::types::{KmiType, Platform};
use crate::event::{EventModifiers, EventType, KeyValue, ModState};

/// How shortcut text is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyStringStyle {
    pub platform: Platform,
    /// Use symbol glyphs (e.g. "⌘") where the platform has them.
    pub glyphs: bool,
}

impl Default for KeyStringStyle {
    fn default() -> Self {
        let platform = Platform::current();
        Self {
            platform,
            glyphs: platform == Platform::MacOs,
        }
    }
}

impl KeyStringStyle {
    pub fn new(platform: Platform, glyphs: bool) -> Self {
        Self { platform, glyphs }
    }

    fn glyph_or_text(&self, text: &'static str, glyph: Option<&'static str>) -> &'static str {
        match glyph {
            Some(g) if self.glyphs => g,
            _ => text,
        }
    }
}

/// Name of one event type.
///
/// `compact` selects the short form (glyphs and abbreviations) used inside
/// shortcut strings; otherwise the display name is returned.
pub fn key_event_string(event_type: EventType, compact: bool, style: &KeyStringStyle) -> String {
    let mac = style.platform == Platform::MacOs;

    if compact {
        let compact_form = match event_type {
            EventType::LeftShift | EventType::RightShift => {
                Some(style.glyph_or_text("Shift", mac.then_some("\u{21e7}")))
            }
            EventType::LeftCtrl | EventType::RightCtrl => Some(if mac {
                style.glyph_or_text("^", Some("\u{2303}"))
            } else {
                "Ctrl"
            }),
            EventType::LeftAlt | EventType::RightAlt => {
                Some(style.glyph_or_text("Alt", mac.then_some("\u{2325}")))
            }
            EventType::OsKey => Some(match style.platform {
                Platform::MacOs => style.glyph_or_text("Cmd", Some("\u{2318}")),
                Platform::Windows => style.glyph_or_text("Win", Some("\u{2756}")),
                Platform::Unix => "OS",
            }),
            EventType::Tab => Some(style.glyph_or_text("Tab", Some("\u{2b7e}"))),
            EventType::Backspace => Some(style.glyph_or_text("Bksp", Some("\u{232b}"))),
            EventType::Esc => Some(style.glyph_or_text("Esc", mac.then_some("\u{238b}"))),
            EventType::Return => Some(style.glyph_or_text("Enter", Some("\u{21b5}"))),
            EventType::Space => Some(style.glyph_or_text("Space", Some("\u{2423}"))),
            EventType::LeftArrow => Some(style.glyph_or_text("Left", Some("\u{2190}"))),
            EventType::UpArrow => Some(style.glyph_or_text("Up", Some("\u{2191}"))),
            EventType::RightArrow => Some(style.glyph_or_text("Right", Some("\u{2192}"))),
            EventType::DownArrow => Some(style.glyph_or_text("Down", Some("\u{2193}"))),
            _ => None,
        };
        if let Some(text) = compact_form {
            return text.to_string();
        }
    }

    match event_type.item() {
        Some(item) if compact && !item.short.is_empty() => item.short.to_string(),
        Some(item) => item.name.to_string(),
        None => String::new(),
    }
}

/// Render a raw chord.
///
/// When all four modifiers are the `ANY` wildcard none is shown; otherwise
/// every set modifier (including `ANY`) is listed. Modifiers always use the
/// compact form.
#[allow(clippy::too_many_arguments)]
pub fn keymap_item_raw_to_string(
    shift: ModState,
    ctrl: ModState,
    alt: ModState,
    oskey: ModState,
    keymodifier: EventType,
    val: KeyValue,
    kmi_type: KmiType,
    compact: bool,
    style: &KeyStringStyle,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    let all_any = shift.is_any() && ctrl.is_any() && alt.is_any() && oskey.is_any();
    if !all_any {
        if shift.is_set() {
            parts.push(key_event_string(EventType::LeftShift, true, style));
        }
        if ctrl.is_set() {
            parts.push(key_event_string(EventType::LeftCtrl, true, style));
        }
        if alt.is_set() {
            parts.push(key_event_string(EventType::LeftAlt, true, style));
        }
        if oskey.is_set() {
            parts.push(key_event_string(EventType::OsKey, true, style));
        }
    }

    if keymodifier != EventType::None {
        parts.push(key_event_string(keymodifier, compact, style));
    }

    let key = match kmi_type {
        KmiType::Event(t) => key_event_string(t, compact, style),
        KmiType::TextInput => "Text Input".to_string(),
        KmiType::Any => "Any".to_string(),
    };
    if val == KeyValue::DblClick {
        parts.push(format!("dbl-{key}"));
    } else {
        parts.push(key);
    }

    parts.join(" ")
}

/// Render a keymap item's chord.
pub fn keymap_item_to_string(kmi: &KeyMapItem, compact: bool, style: &KeyStringStyle) -> String {
    keymap_item_raw_to_string(
        kmi.shift,
        kmi.ctrl,
        kmi.alt,
        kmi.oskey,
        kmi.keymodifier,
        kmi.val,
        kmi.kmi_type,
        compact,
        style,
    )
}

/// Render an event's chord, e.g. for status-bar hints.
pub fn event_chord_to_string(
    event_type: EventType,
    modifiers: &EventModifiers,
    compact: bool,
    style: &KeyStringStyle,
) -> String {
    keymap_item_raw_to_string(
        modifiers.shift,
        modifiers.ctrl,
        modifiers.alt,
        modifiers.oskey,
        EventType::None,
        KeyValue::Press,
        KmiType::Event(event_type),
        compact,
        style,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Modifiers;

    const UNIX: KeyStringStyle = KeyStringStyle {
        platform: Platform::Unix,
        glyphs: false,
    };
    const WINDOWS: KeyStringStyle = KeyStringStyle {
        platform: Platform::Windows,
        glyphs: false,
    };
    const MAC: KeyStringStyle = KeyStringStyle {
        platform: Platform::MacOs,
        glyphs: true,
    };

    fn item(mods: Modifiers, t: EventType) -> KeyMapItem {
        KeyMapItem::new("test.op", t, KeyValue::Press).with_modifiers(mods)
    }

    #[test]
    fn test_shift_ctrl_a_order() {
        let kmi = item(Modifiers::CTRL | Modifiers::SHIFT, EventType::A);
        assert_eq!(keymap_item_to_string(&kmi, false, &UNIX), "Shift Ctrl A");
    }

    #[test]
    fn test_all_modifiers_order() {
        let kmi = item(
            Modifiers::OSKEY | Modifiers::ALT | Modifiers::CTRL | Modifiers::SHIFT,
            EventType::Z,
        );
        assert_eq!(keymap_item_to_string(&kmi, true, &UNIX), "Shift Ctrl Alt OS Z");
        assert_eq!(keymap_item_to_string(&kmi, true, &WINDOWS), "Shift Ctrl Alt Win Z");
        assert_eq!(
            keymap_item_to_string(&kmi, true, &MAC),
            "\u{21e7} \u{2303} \u{2325} \u{2318} Z"
        );
    }

    #[test]
    fn test_mac_without_glyphs() {
        let style = KeyStringStyle::new(Platform::MacOs, false);
        let kmi = item(Modifiers::CTRL | Modifiers::OSKEY, EventType::S);
        assert_eq!(keymap_item_to_string(&kmi, true, &style), "^ Cmd S");
    }

    #[test]
    fn test_any_modifiers_hidden() {
        let kmi = KeyMapItem::new("test.op", EventType::MiddleMouse, KeyValue::Press)
            .with_any_modifier();
        assert_eq!(keymap_item_to_string(&kmi, true, &UNIX), "MMB");
        assert_eq!(keymap_item_to_string(&kmi, false, &UNIX), "Middle Mouse");
    }

    #[test]
    fn test_double_click_and_keymodifier() {
        let kmi = KeyMapItem::new("test.op", EventType::LeftMouse, KeyValue::DblClick)
            .with_keymodifier(EventType::Q);
        assert_eq!(keymap_item_to_string(&kmi, false, &UNIX), "Q dbl-Left Mouse");
    }

    #[test]
    fn test_compact_glyph_keys() {
        assert_eq!(key_event_string(EventType::Return, true, &UNIX), "Enter");
        assert_eq!(key_event_string(EventType::Return, true, &MAC), "\u{21b5}");
        assert_eq!(key_event_string(EventType::Esc, true, &MAC), "\u{238b}");
        let glyph_unix = KeyStringStyle::new(Platform::Unix, true);
        assert_eq!(key_event_string(EventType::Esc, true, &glyph_unix), "Esc");
        assert_eq!(key_event_string(EventType::Backspace, false, &UNIX), "Backspace");
        assert_eq!(key_event_string(EventType::PageUp, true, &UNIX), "PgUp");
        assert_eq!(key_event_string(EventType::PageUp, false, &UNIX), "Page Up");
    }
}
