//! Default keyconfig and user customization loading
//!
//! The shipped keymaps come from `keymap.yaml` at the project root, embedded
//! at compile time. User changes live in the config directory and are applied
//! on top without touching the shipped keymaps.

use std::path::Path;

use super::config::{keymaps_to_yaml, load_keyconfig_file, parse_keyconfig_yaml, KeymapError};
use super::item::KeyMapItem;
use super::keyconfig::{KeyConfig, KeyConfigSet};
use super::keymap::KeyMapFlags;
use super::types::{KmiType, Modifiers};
use crate::event::{EventType, KeyValue};
use crate::wm::{RegionType, SpaceType};

/// Default keyconfig YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Shipped keyconfig: the embedded YAML, or a minimal hardcoded one if it
/// fails to parse.
pub fn default_keyconfig() -> KeyConfig {
    match parse_keyconfig_yaml(DEFAULT_KEYMAP_YAML) {
        Ok(kc) => {
            tracing::info!("Loaded embedded default keyconfig ({} keymaps)", kc.keymaps.len());
            kc
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keyconfig: {}, using hardcoded defaults",
                e
            );
            builtin_keyconfig()
        }
    }
}

/// Minimal keyconfig kept in code so the window manager stays usable.
pub fn builtin_keyconfig() -> KeyConfig {
    let mut kc = KeyConfig::new("Kraken");

    let window = kc.ensure("Window", SpaceType::Empty, RegionType::Window);
    window.add_item(bind(EventType::Q, Modifiers::cmd(), "wm.quit_kraken"));
    window.add_item(bind(EventType::F5, Modifiers::NONE, "wm.redraw_all"));

    let screen = kc.ensure("Screen", SpaceType::Empty, RegionType::Window);
    screen.add_item(bind(EventType::B, Modifiers::NONE, "wm.gesture_box"));

    kc
}

fn bind(event_type: EventType, mods: Modifiers, idname: &str) -> KeyMapItem {
    KeyMapItem::new(idname, KmiType::Event(event_type), KeyValue::Press).with_modifiers(mods)
}

/// Build the keyconfig set: shipped defaults plus the user file, if any.
///
/// User keymaps holding only `diff` entries are recorded as changes to the
/// shipped keymap of the same identity. Full user keymaps replace a shipped
/// keymap of the same identity, or are added as new keymaps.
pub fn load_keyconfig_set(user_path: Option<&Path>) -> KeyConfigSet {
    let mut set = KeyConfigSet::new(default_keyconfig());

    if let Some(user_path) = user_path {
        if user_path.exists() {
            match load_keyconfig_file(user_path) {
                Ok(user) => {
                    tracing::info!(
                        "Merging user keyconfig from {} ({} keymaps)",
                        user_path.display(),
                        user.keymaps.len()
                    );
                    apply_user_keyconfig(&mut set, user);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load user keyconfig from {}: {}",
                        user_path.display(),
                        e
                    );
                }
            }
        }
    }

    set
}

/// Layer a parsed user keyconfig onto `set`.
pub fn apply_user_keyconfig(set: &mut KeyConfigSet, user: KeyConfig) {
    for km in user.keymaps {
        let shipped = set
            .default
            .find(&km.idname, km.space_type, km.region_type)
            .is_some();

        if km.flags.contains(KeyMapFlags::DIFF) {
            set.user_diffs
                .retain(|d| !d.is_identity(&km.idname, km.space_type, km.region_type));
            set.user_diffs.push(km);
        } else if shipped {
            set.set_user_keymap(&km);
        } else {
            set.user.insert(km);
        }
    }
    set.update();
}

/// Write user changes (diffs and user-only keymaps) to `path`.
pub fn save_user_keyconfig(set: &KeyConfigSet, path: &Path) -> Result<(), KeymapError> {
    let user_only = set
        .user
        .keymaps
        .iter()
        .filter(|km| !km.flags.contains(KeyMapFlags::USER_MODIFIED));
    let yaml = keymaps_to_yaml(Some(&set.user.idname), set.user_diffs.iter().chain(user_only))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, yaml)?;
    tracing::info!("Saved user keyconfig to {}", path.display());
    Ok(())
}
