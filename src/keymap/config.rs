//! YAML keyconfig files
//!
//! Parses keyconfig files into keymaps and writes them back. A file lists
//! keymaps by identity; each keymap carries full `items` (shipped or user
//! defined keymaps) and/or `diff` entries (user changes to a shipped keymap).
//!
//! ```yaml
//! keymaps:
//!   - name: Window
//!     items:
//!       - key: ctrl+q
//!         operator: wm.quit_kraken
//!   - name: 3D View
//!     space: VIEW_3D
//!     items:
//!       - key: leftmouse
//!         value: click
//!         operator: view3d.select
//!         properties: { extend: false }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{KeyMapItem, KmiFlags};
use super::keyconfig::KeyConfig;
use super::keymap::{KeyMap, KeyMapDiffItem, KeyMapFlags};
use super::types::{KmiType, Modifiers, Platform};
use crate::event::{EventModifiers, EventType, KeyValue, ModState};
use crate::properties::OperatorProperties;
use crate::wm::{RegionType, SpaceType};

/// Root structure of a keyconfig YAML file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub keymaps: Vec<KeyMapConfig>,
}

/// One keymap entry from YAML
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyMapConfig {
    pub name: String,
    #[serde(default = "default_space")]
    pub space: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub modal: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<DiffConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    /// Chord such as `"ctrl+shift+a"`, `"any+leftmouse"` or `"textinput"`.
    pub key: String,
    #[serde(default = "default_value")]
    pub value: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OperatorProperties>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub active: bool,
    /// `false` ignores auto-repeat events.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub repeat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_modifier: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub propvalue: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// A recorded user change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<ItemConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<ItemConfig>,
}

fn default_space() -> String {
    SpaceType::Empty.id().to_string()
}

fn default_region() -> String {
    RegionType::Window.id().to_string()
}

fn default_value() -> String {
    "press".to_string()
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// Load a keyconfig from a YAML file
pub fn load_keyconfig_file(path: &Path) -> Result<KeyConfig, KeymapError> {
    let content = std::fs::read_to_string(path)?;
    parse_keyconfig_yaml(&content)
}

/// Parse a keyconfig from a YAML string, skipping items for other platforms
pub fn parse_keyconfig_yaml(yaml: &str) -> Result<KeyConfig, KeymapError> {
    let file: KeyConfigFile = serde_yaml::from_str(yaml)?;
    let current_platform = Platform::current();

    let mut keyconfig = KeyConfig::new(file.name.as_deref().unwrap_or("Kraken"));

    for entry in file.keymaps {
        let space_type = SpaceType::from_id(&entry.space)
            .ok_or_else(|| KeymapError::InvalidSpace(entry.space.clone()))?;
        let region_type = RegionType::from_id(&entry.region)
            .ok_or_else(|| KeymapError::InvalidRegion(entry.region.clone()))?;

        let mut km = KeyMap::new(&entry.name, space_type, region_type);
        if let Some(owner) = entry.owner {
            km.owner_id = owner;
        }
        if entry.modal {
            km.flags |= KeyMapFlags::MODAL;
        }

        for item in &entry.items {
            if !platform_matches(item, current_platform) {
                continue;
            }
            km.add_item(parse_item(item)?);
        }

        for diff in &entry.diff {
            let remove_item = diff.remove.as_ref().map(parse_item).transpose()?;
            let add_item = diff.add.as_ref().map(parse_item).transpose()?;
            if remove_item.is_none() && add_item.is_none() {
                continue;
            }
            km.diff_items.push(KeyMapDiffItem {
                remove_item,
                add_item,
            });
        }
        if !km.diff_items.is_empty() && km.items.is_empty() {
            km.flags |= KeyMapFlags::DIFF;
        }

        keyconfig.insert(km);
    }

    Ok(keyconfig)
}

fn platform_matches(item: &ItemConfig, platform: Platform) -> bool {
    item.platform
        .as_deref()
        .is_none_or(|p| p.eq_ignore_ascii_case(platform.id()))
}

/// Convert one YAML item into a keymap item
pub fn parse_item(item: &ItemConfig) -> Result<KeyMapItem, KeymapError> {
    let chord = parse_key_string(&item.key)?;
    let val = KeyValue::from_id(&item.value)
        .ok_or_else(|| KeymapError::InvalidValue(item.value.clone()))?;

    let mut kmi = KeyMapItem::new(&item.operator, chord.kmi_type, val);
    kmi.set_modifiers(chord.modifiers);
    if let Some(ref props) = item.properties {
        kmi.properties = Some(props.clone());
    }
    if let Some(ref keymod) = item.key_modifier {
        kmi.keymodifier = parse_event_type(keymod)?;
    }
    kmi.propvalue = item.propvalue;
    if !item.active {
        kmi.flags |= KmiFlags::INACTIVE;
    }
    if !item.repeat {
        kmi.flags |= KmiFlags::REPEAT_IGNORE;
    }
    Ok(kmi)
}

/// A parsed chord string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedChord {
    pub kmi_type: KmiType,
    pub modifiers: EventModifiers,
}

/// Parse a chord string like "cmd+shift+s" or "any+leftmouse"
pub fn parse_key_string(key_str: &str) -> Result<ParsedChord, KeymapError> {
    let mut mods = Modifiers::NONE;
    let mut any_modifier = false;
    let mut key_part = None;

    // "ctrl++" binds the plus key.
    let normalized = key_str.replace("++", "+plus");
    for part in normalized.split('+') {
        let part_lower = part.trim().to_lowercase();
        match part_lower.as_str() {
            "" => return Err(KeymapError::InvalidKey(key_str.to_string())),
            "cmd" => {
                // Platform command key
                mods = mods | Modifiers::cmd();
            }
            "ctrl" | "control" => {
                mods = mods | Modifiers::CTRL;
            }
            "shift" => {
                mods = mods | Modifiers::SHIFT;
            }
            "alt" | "option" | "opt" => {
                mods = mods | Modifiers::ALT;
            }
            "oskey" | "meta" | "super" | "win" => {
                mods = mods | Modifiers::OSKEY;
            }
            "any" if key_part.is_none() => {
                any_modifier = true;
            }
            _ => {
                // This should be the key itself
                if key_part.is_some() {
                    return Err(KeymapError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_kmi_type(&part_lower)?);
            }
        }
    }

    // A lone "any" is the any-key wildcard.
    let kmi_type = match key_part {
        Some(t) => t,
        None if any_modifier && mods.is_empty() => {
            any_modifier = false;
            KmiType::Any
        }
        None => {
            return Err(KeymapError::InvalidKey(format!(
                "No key found in binding: {}",
                key_str
            )))
        }
    };

    let modifiers = if any_modifier {
        EventModifiers {
            shift: ModState::ANY,
            ctrl: ModState::ANY,
            alt: ModState::ANY,
            oskey: ModState::ANY,
        }
    } else {
        mods.to_mod_states()
    };

    Ok(ParsedChord {
        kmi_type,
        modifiers,
    })
}

fn parse_kmi_type(key: &str) -> Result<KmiType, KeymapError> {
    match key {
        "textinput" => Ok(KmiType::TextInput),
        "anykey" => Ok(KmiType::Any),
        _ => parse_event_type(key).map(KmiType::Event),
    }
}

/// Parse an event type from a friendly alias, a single character or its identifier
pub fn parse_event_type(key: &str) -> Result<EventType, KeymapError> {
    let lower = key.to_lowercase();
    let alias = match lower.as_str() {
        "enter" | "return" => Some(EventType::Return),
        "escape" | "esc" => Some(EventType::Esc),
        "backspace" | "back" => Some(EventType::Backspace),
        "delete" | "del" => Some(EventType::Delete),
        "up" | "arrowup" => Some(EventType::UpArrow),
        "down" | "arrowdown" => Some(EventType::DownArrow),
        "left" | "arrowleft" => Some(EventType::LeftArrow),
        "right" | "arrowright" => Some(EventType::RightArrow),
        "pageup" | "pgup" => Some(EventType::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Some(EventType::PageDown),
        "ins" => Some(EventType::Insert),
        "lmb" => Some(EventType::LeftMouse),
        "mmb" => Some(EventType::MiddleMouse),
        "rmb" => Some(EventType::RightMouse),
        "wheelup" => Some(EventType::WheelUpMouse),
        "wheeldown" => Some(EventType::WheelDownMouse),
        "plus" => Some(EventType::Plus),
        "minus" => Some(EventType::Minus),
        "numpad_add" | "numplus" => Some(EventType::PadPlus),
        "numpad_subtract" | "numminus" => Some(EventType::PadMinus),
        "numpad_multiply" | "nummul" => Some(EventType::PadAsterisk),
        "numpad_divide" | "numdiv" => Some(EventType::PadSlash),
        "numpad_enter" | "numenter" => Some(EventType::PadEnter),
        "numpad_decimal" | "numdot" => Some(EventType::PadPeriod),
        _ => None,
    };
    if let Some(t) = alias {
        return Ok(t);
    }

    // numpad0..numpad9
    if let Some(digit) = lower
        .strip_prefix("numpad")
        .or_else(|| lower.strip_prefix("num"))
        .and_then(|d| d.parse::<u16>().ok())
        .filter(|d| *d <= 9)
    {
        if let Some(t) = EventType::from_code(EventType::Pad0.code() + digit) {
            return Ok(t);
        }
    }

    let mut chars = lower.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(t) = EventType::from_char(c) {
            return Ok(t);
        }
    }

    EventType::from_id(key).ok_or_else(|| KeymapError::InvalidKey(format!("Unknown key: {}", key)))
}

/// Format an item's chord back into the string form accepted by [`parse_key_string`]
pub fn format_key_string(kmi: &KeyMapItem) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mods = kmi.modifiers();
    let all_any =
        mods.shift.is_any() && mods.ctrl.is_any() && mods.alt.is_any() && mods.oskey.is_any();

    if all_any {
        parts.push("any".to_string());
    } else {
        let held = Modifiers::from_mod_states(&mods);
        if !held.is_empty() {
            parts.push(held.to_string());
        }
    }

    parts.push(match kmi.kmi_type {
        KmiType::Any => "anykey".to_string(),
        KmiType::TextInput => "textinput".to_string(),
        KmiType::Event(t) => t.id().to_lowercase(),
    });
    parts.join("+")
}

/// Convert a keymap item into its YAML form
pub fn item_to_config(kmi: &KeyMapItem) -> ItemConfig {
    ItemConfig {
        key: format_key_string(kmi),
        value: kmi.val.id().to_lowercase(),
        operator: kmi.idname.clone(),
        properties: kmi.properties.clone().filter(|p| !p.is_empty()),
        active: kmi.is_active(),
        repeat: !kmi.flags.contains(KmiFlags::REPEAT_IGNORE),
        key_modifier: (kmi.keymodifier != EventType::None)
            .then(|| kmi.keymodifier.id().to_lowercase()),
        propvalue: kmi.propvalue,
        platform: None,
    }
}

/// Convert a keymap into its YAML form
pub fn keymap_to_config(km: &KeyMap) -> KeyMapConfig {
    KeyMapConfig {
        name: km.idname.clone(),
        space: km.space_type.id().to_string(),
        region: km.region_type.id().to_string(),
        owner: (!km.owner_id.is_empty()).then(|| km.owner_id.clone()),
        modal: km.is_modal(),
        items: if km.flags.contains(KeyMapFlags::DIFF) {
            Vec::new()
        } else {
            km.items.iter().map(item_to_config).collect()
        },
        diff: km
            .diff_items
            .iter()
            .map(|d| DiffConfig {
                remove: d.remove_item.as_ref().map(item_to_config),
                add: d.add_item.as_ref().map(item_to_config),
            })
            .collect(),
    }
}

/// Serialize keymaps to YAML
pub fn keymaps_to_yaml<'a>(
    name: Option<&str>,
    keymaps: impl IntoIterator<Item = &'a KeyMap>,
) -> Result<String, KeymapError> {
    let file = KeyConfigFile {
        name: name.map(str::to_string),
        keymaps: keymaps.into_iter().map(keymap_to_config).collect(),
    };
    Ok(serde_yaml::to_string(&file)?)
}

/// Errors that can occur when loading keyconfigs
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Invalid space type: {0}")]
    InvalidSpace(String),
    #[error("Invalid region type: {0}")]
    InvalidRegion(String),
}
