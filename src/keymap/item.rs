//! KeyMapItem: one chord bound to an operator

use bitflags::bitflags;

use super::types::{KmiType, Modifiers};
use crate::event::{Event, EventModifiers, EventType, KeyValue, ModState, TabletTool};
use crate::properties::OperatorProperties;

bitflags! {
    /// Per-item flags (`KMI_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KmiFlags: u16 {
        /// Disabled by the user; never matches.
        const INACTIVE = 1 << 0;
        const EXPANDED = 1 << 1;
        const USER_MODIFIED = 1 << 2;
        const UPDATE = 1 << 3;
        /// Ignore auto-repeat key events.
        const REPEAT_IGNORE = 1 << 4;
    }
}

/// A single binding: chord requirement plus the operator it runs
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMapItem {
    /// Unique within its keymap; assigned when the item is added.
    pub id: i32,
    /// Operator identifier, e.g. `"view3d.select"`.
    pub idname: String,
    pub properties: Option<OperatorProperties>,

    pub kmi_type: KmiType,
    pub val: KeyValue,
    pub shift: ModState,
    pub ctrl: ModState,
    pub alt: ModState,
    pub oskey: ModState,
    /// Non-modifier key that must be held, `EventType::None` for no requirement.
    pub keymodifier: EventType,

    /// Value delivered to modal keymaps instead of an operator call.
    pub propvalue: i32,
    pub flags: KmiFlags,
}

impl KeyMapItem {
    /// Create an item requiring no modifiers.
    pub fn new(idname: &str, kmi_type: impl Into<KmiType>, val: KeyValue) -> Self {
        Self {
            id: 0,
            idname: idname.to_string(),
            properties: None,
            kmi_type: kmi_type.into(),
            val,
            shift: ModState::NOTHING,
            ctrl: ModState::NOTHING,
            alt: ModState::NOTHING,
            oskey: ModState::NOTHING,
            keymodifier: EventType::None,
            propvalue: 0,
            flags: KmiFlags::empty(),
        }
    }

    /// Require exactly the given modifiers held (builder pattern)
    pub fn with_modifiers(mut self, mods: Modifiers) -> Self {
        self.set_modifiers(mods.to_mod_states());
        self
    }

    /// Accept any modifier state
    pub fn with_any_modifier(mut self) -> Self {
        self.set_modifiers(EventModifiers {
            shift: ModState::ANY,
            ctrl: ModState::ANY,
            alt: ModState::ANY,
            oskey: ModState::ANY,
        });
        self
    }

    pub fn with_keymodifier(mut self, keymodifier: EventType) -> Self {
        self.keymodifier = keymodifier;
        self
    }

    pub fn with_properties(mut self, properties: OperatorProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_flags(mut self, flags: KmiFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn set_modifiers(&mut self, mods: EventModifiers) {
        self.shift = mods.shift;
        self.ctrl = mods.ctrl;
        self.alt = mods.alt;
        self.oskey = mods.oskey;
    }

    pub fn modifiers(&self) -> EventModifiers {
        EventModifiers {
            shift: self.shift,
            ctrl: self.ctrl,
            alt: self.alt,
            oskey: self.oskey,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.flags.contains(KmiFlags::INACTIVE)
    }

    /// Whether this item accepts `event`.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.is_active() {
            return false;
        }
        if event.is_repeat && self.flags.contains(KmiFlags::REPEAT_IGNORE) {
            return false;
        }

        match self.kmi_type {
            KmiType::TextInput => {
                // Text input ignores every other requirement.
                return event.val == KeyValue::Press
                    && event.event_type.is_keyboard()
                    && event.utf8.is_some();
            }
            KmiType::Any => {}
            KmiType::Event(EventType::TabletStylus) => {
                if event.tablet.active != TabletTool::Stylus {
                    return false;
                }
            }
            KmiType::Event(EventType::TabletEraser) => {
                if event.tablet.active != TabletTool::Eraser {
                    return false;
                }
            }
            KmiType::Event(t) => {
                if t != event.event_type {
                    return false;
                }
            }
        }

        if self.val != KeyValue::Any && self.val != event.val {
            return false;
        }

        let mods = &event.modifiers;
        if !(self.shift.accepts(mods.shift)
            && self.ctrl.accepts(mods.ctrl)
            && self.alt.accepts(mods.alt)
            && self.oskey.accepts(mods.oskey))
        {
            return false;
        }

        if self.keymodifier != EventType::None && self.keymodifier != event.keymodifier {
            return false;
        }

        true
    }

    /// Same chord and result, ignoring id and flags.
    pub fn equals_result(&self, other: &KeyMapItem) -> bool {
        self.idname == other.idname
            && OperatorProperties::equals_ex(
                self.properties.as_ref(),
                other.properties.as_ref(),
                true,
            )
            && self.propvalue == other.propvalue
    }

    /// Same chord, ignoring what it runs.
    pub fn equals_chord(&self, other: &KeyMapItem) -> bool {
        self.kmi_type == other.kmi_type
            && self.val == other.val
            && self.modifiers() == other.modifiers()
            && self.keymodifier == other.keymodifier
    }

    /// Same chord, same result and same active state.
    pub fn equals(&self, other: &KeyMapItem) -> bool {
        self.equals_result(other)
            && self.equals_chord(other)
            && self.is_active() == other.is_active()
            && self.flags.contains(KmiFlags::REPEAT_IGNORE)
                == other.flags.contains(KmiFlags::REPEAT_IGNORE)
    }
}
