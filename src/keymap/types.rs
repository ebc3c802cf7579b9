//! Core types for the keymap system: Modifiers, KmiType, Platform

use std::fmt;

use crate::event::{EventModifiers, EventType, ModState};

/// Modifier keys as a bitfield, as written in keyconfig files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const OSKEY: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, oskey: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if oskey {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn oskey(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Get the platform-specific "command" modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::OSKEY
        } else {
            Modifiers::CTRL
        }
    }

    /// Requirement states for a keymap item: listed modifiers held, others released.
    pub fn to_mod_states(self) -> EventModifiers {
        EventModifiers {
            shift: ModState::from_held(self.shift()),
            ctrl: ModState::from_held(self.ctrl()),
            alt: ModState::from_held(self.alt()),
            oskey: ModState::from_held(self.oskey()),
        }
    }

    /// Collapse counted states back to held flags. `ANY` counts as held.
    pub fn from_mod_states(states: &EventModifiers) -> Modifiers {
        Modifiers::new(
            states.ctrl.is_set(),
            states.shift.is_set(),
            states.alt.is_set(),
            states.oskey.is_set(),
        )
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.shift() {
            parts.push("shift");
        }
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.oskey() {
            parts.push("oskey");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// The event type a keymap item listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KmiType {
    /// Any event type.
    Any,
    /// A keyboard press that produced text.
    TextInput,
    Event(EventType),
}

impl KmiType {
    pub fn event_type(self) -> Option<EventType> {
        match self {
            KmiType::Event(t) => Some(t),
            _ => None,
        }
    }
}

impl From<EventType> for KmiType {
    fn from(t: EventType) -> Self {
        KmiType::Event(t)
    }
}

impl fmt::Display for KmiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmiType::Any => f.write_str("ANY"),
            KmiType::TextInput => f.write_str("TEXTINPUT"),
            KmiType::Event(t) => write!(f, "{t}"),
        }
    }
}

/// Platform used for shortcut rendering and keyconfig filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Identifier used by the `platform:` field of keyconfig files
    pub fn id(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Unix => "linux",
        }
    }
}
