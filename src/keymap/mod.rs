//! Keymaps and keyconfigs
//!
//! This module provides the data-driven binding layer of the window manager:
//! - Keymap items bind an event chord to an operator call (or, in modal
//!   keymaps, to a modal value for a running operator)
//! - Keymaps are identified by name, space type and region type
//! - Keyconfigs collect keymaps; the active keymap for an identity is the
//!   user version if one exists, else the add-on version, else the shipped one
//! - User customization is stored as diffs against the shipped keymaps
//!
//! # Architecture
//!
//! ```text
//! winit event → PlatformEvent → Event → keymap handler → KeyMapItem → operator
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Shipped defaults only
//! let set = KeyConfigSet::new(default_keyconfig());
//!
//! // Shipped defaults plus the user's keymap.yaml
//! let set = load_keyconfig_set(Some(&path));
//! ```

mod config;
mod defaults;
mod item;
mod keyconfig;
#[allow(clippy::module_inception)]
mod keymap;
mod lookup;
mod render;
mod types;
mod winit_adapter;

pub use config::{
    format_key_string, item_to_config, keymap_to_config, keymaps_to_yaml, load_keyconfig_file,
    parse_event_type, parse_item, parse_key_string, parse_keyconfig_yaml, DiffConfig, ItemConfig,
    KeyConfigFile, KeyMapConfig, KeymapError, ParsedChord,
};
pub use defaults::{
    apply_user_keyconfig, builtin_keyconfig, default_keyconfig, get_default_keymap_yaml,
    load_keyconfig_set, save_user_keyconfig,
};
pub use item::{KeyMapItem, KmiFlags};
pub use keyconfig::{KeyConfig, KeyConfigSet};
pub use keymap::{
    keymap_list_find, keymap_list_find_mut, KeyMap, KeyMapDiffItem, KeyMapFlags, KeyMapKey,
    KeyMapPoll,
};
pub use lookup::{
    handler_keymaps, key_event_operator_string, keymap_item_find, keymap_poll, KeyMapItemFilter,
};
pub use render::{
    event_chord_to_string, key_event_string, keymap_item_raw_to_string, keymap_item_to_string,
    KeyStringStyle,
};
pub use types::{KmiType, Modifiers, Platform};
pub use winit_adapter::{
    event_type_from_mouse_button, event_type_from_physical_key, key_platform_event,
    platform_event_from_winit, wheel_platform_event, window_coords,
};

#[cfg(test)]
mod tests;
