//! Keyconfigs: the shipped, add-on and user keymap collections

use super::keymap::{keymap_list_find, keymap_list_find_mut, KeyMap, KeyMapFlags, KeyMapKey};
use crate::wm::{RegionType, SpaceType};

/// A named collection of keymaps.
#[derive(Debug, Clone, Default)]
pub struct KeyConfig {
    pub idname: String,
    pub keymaps: Vec<KeyMap>,
}

impl KeyConfig {
    pub fn new(idname: &str) -> Self {
        Self {
            idname: idname.to_string(),
            keymaps: Vec::new(),
        }
    }

    pub fn find(
        &self,
        idname: &str,
        space_type: SpaceType,
        region_type: RegionType,
    ) -> Option<&KeyMap> {
        keymap_list_find(&self.keymaps, idname, space_type, region_type)
    }

    pub fn find_mut(
        &mut self,
        idname: &str,
        space_type: SpaceType,
        region_type: RegionType,
    ) -> Option<&mut KeyMap> {
        keymap_list_find_mut(&mut self.keymaps, idname, space_type, region_type)
    }

    pub fn find_key(&self, key: &KeyMapKey) -> Option<&KeyMap> {
        self.find(&key.idname, key.space_type, key.region_type)
    }

    /// Find a keymap by identity, creating an empty one if missing.
    pub fn ensure(
        &mut self,
        idname: &str,
        space_type: SpaceType,
        region_type: RegionType,
    ) -> &mut KeyMap {
        let idx = match self
            .keymaps
            .iter()
            .position(|km| km.is_identity(idname, space_type, region_type))
        {
            Some(idx) => idx,
            None => {
                self.keymaps.push(KeyMap::new(idname, space_type, region_type));
                self.keymaps.len() - 1
            }
        };
        &mut self.keymaps[idx]
    }

    /// Add a keymap, replacing one with the same identity.
    pub fn insert(&mut self, keymap: KeyMap) {
        match self
            .keymaps
            .iter_mut()
            .find(|km| km.is_identity(&keymap.idname, keymap.space_type, keymap.region_type))
        {
            Some(existing) => *existing = keymap,
            None => self.keymaps.push(keymap),
        }
    }

    pub fn remove(&mut self, idname: &str, space_type: SpaceType, region_type: RegionType) -> bool {
        let before = self.keymaps.len();
        self.keymaps
            .retain(|km| !km.is_identity(idname, space_type, region_type));
        before != self.keymaps.len()
    }
}

/// The three keyconfigs of a window manager.
///
/// `user` holds fully materialized keymaps (diffs already applied), so
/// lookups never merge items across configs.
#[derive(Debug, Clone)]
pub struct KeyConfigSet {
    /// Shipped keymaps, never modified by user customization.
    pub default: KeyConfig,
    /// Keymaps registered by add-ons.
    pub addon: KeyConfig,
    /// Materialized user keymaps.
    pub user: KeyConfig,
    /// Recorded user changes, one diff-only keymap per customized identity.
    pub user_diffs: Vec<KeyMap>,
}

impl Default for KeyConfigSet {
    fn default() -> Self {
        Self {
            default: KeyConfig::new("Kraken"),
            addon: KeyConfig::new("Kraken addon"),
            user: KeyConfig::new("Kraken user"),
            user_diffs: Vec::new(),
        }
    }
}

impl KeyConfigSet {
    pub fn new(default: KeyConfig) -> Self {
        Self {
            default,
            ..Default::default()
        }
    }

    /// The keymap actually in effect for `keymap`'s identity.
    ///
    /// A user keymap with the same identity supersedes the given one;
    /// otherwise the given keymap is returned unchanged.
    pub fn keymap_active<'a>(&'a self, keymap: &'a KeyMap) -> &'a KeyMap {
        self.user
            .find(&keymap.idname, keymap.space_type, keymap.region_type)
            .unwrap_or(keymap)
    }

    /// Resolve an identity: user first, then add-on, then shipped.
    pub fn keymap_active_by_key(&self, key: &KeyMapKey) -> Option<&KeyMap> {
        self.user
            .find_key(key)
            .or_else(|| self.addon.find_key(key))
            .or_else(|| self.default.find_key(key))
    }

    /// Record the difference between the shipped keymap and an edited copy.
    ///
    /// Returns false when no shipped keymap has that identity.
    pub fn set_user_keymap(&mut self, edited: &KeyMap) -> bool {
        let Some(base) = self.base_keymap(&edited.key()) else {
            tracing::warn!(keymap = %edited.idname, "no shipped keymap to diff against");
            return false;
        };
        let diffs = base.diff(edited);

        self.user_diffs
            .retain(|km| !km.is_identity(&edited.idname, edited.space_type, edited.region_type));
        if !diffs.is_empty() {
            let mut diff_km = KeyMap::new(&edited.idname, edited.space_type, edited.region_type);
            diff_km.flags |= KeyMapFlags::DIFF;
            diff_km.diff_items = diffs;
            self.user_diffs.push(diff_km);
        }
        self.update();
        true
    }

    /// Drop the user changes of one keymap identity.
    pub fn restore_to_default(&mut self, key: &KeyMapKey) {
        self.user_diffs
            .retain(|km| !km.is_identity(&key.idname, key.space_type, key.region_type));
        self.user
            .remove(&key.idname, key.space_type, key.region_type);
        self.update();
    }

    /// Shipped keymap for an identity, with the add-on version taking precedence.
    fn base_keymap(&self, key: &KeyMapKey) -> Option<&KeyMap> {
        self.addon.find_key(key).or_else(|| self.default.find_key(key))
    }

    /// Re-materialize user keymaps from the shipped keymaps and recorded diffs.
    ///
    /// Only customized identities get a user keymap. User keymaps without a
    /// shipped counterpart (defined directly in user files) are kept.
    pub fn update(&mut self) {
        let mut keymaps: Vec<KeyMap> = std::mem::take(&mut self.user.keymaps)
            .into_iter()
            .filter(|km| !km.flags.contains(KeyMapFlags::USER_MODIFIED))
            .filter(|km| self.base_keymap(&km.key()).is_none())
            .collect();

        for diff_km in &self.user_diffs {
            let key = diff_km.key();
            let Some(base) = self.base_keymap(&key) else {
                tracing::debug!(keymap = %key.idname, "user diff without shipped keymap");
                continue;
            };
            let mut km = base.clone();
            km.patch(&diff_km.diff_items);
            km.flags |= KeyMapFlags::USER | KeyMapFlags::USER_MODIFIED;
            keymaps.push(km);
        }

        self.user.keymaps = keymaps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, KeyValue};
    use crate::keymap::{KeyMapItem, KmiType};

    fn shipped() -> KeyConfig {
        let mut kc = KeyConfig::new("Kraken");
        let km = kc.ensure("Window", SpaceType::Empty, RegionType::Window);
        km.add_item(KeyMapItem::new("wm.quit", EventType::Q, KeyValue::Press));
        kc.ensure("Screen", SpaceType::Empty, RegionType::Window);
        kc
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut kc = shipped();
        let before = kc.keymaps.len();
        kc.ensure("Window", SpaceType::Empty, RegionType::Window);
        assert_eq!(kc.keymaps.len(), before);
    }

    #[test]
    fn test_active_falls_back_to_given() {
        let set = KeyConfigSet::new(shipped());
        let builtin = set.default.find("Window", SpaceType::Empty, RegionType::Window).unwrap();
        assert!(std::ptr::eq(set.keymap_active(builtin), builtin));
    }

    #[test]
    fn test_user_change_is_materialized() {
        let mut set = KeyConfigSet::new(shipped());
        let mut edited = set
            .default
            .find("Window", SpaceType::Empty, RegionType::Window)
            .unwrap()
            .clone();
        edited.items[0].kmi_type = KmiType::Event(EventType::W);
        assert!(set.set_user_keymap(&edited));

        let builtin = set.default.find("Window", SpaceType::Empty, RegionType::Window).unwrap();
        let active = set.keymap_active(builtin);
        assert!(!std::ptr::eq(active, builtin));
        assert!(active.flags.contains(KeyMapFlags::USER));
        assert_eq!(active.items[0].kmi_type, KmiType::Event(EventType::W));
        // Shipped keymap untouched.
        assert_eq!(builtin.items[0].kmi_type, KmiType::Event(EventType::Q));

        let key = builtin.key();
        set.restore_to_default(&key);
        let builtin = set.default.find("Window", SpaceType::Empty, RegionType::Window).unwrap();
        assert!(std::ptr::eq(set.keymap_active(builtin), builtin));
    }

    #[test]
    fn test_update_keeps_user_only_keymaps() {
        let mut set = KeyConfigSet::new(shipped());
        set.user
            .insert(KeyMap::new("My Tools", SpaceType::View3D, RegionType::Window));
        set.update();
        assert!(set
            .user
            .find("My Tools", SpaceType::View3D, RegionType::Window)
            .is_some());
    }
}
