//! KeyMap: an ordered, context-scoped list of keymap items

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::item::{KeyMapItem, KmiFlags};
use crate::event::Event;
use crate::properties::OperatorProperties;
use crate::wm::{Context, RegionType, SpaceType};

bitflags! {
    /// Per-keymap flags (`KEYMAP_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyMapFlags: u16 {
        /// Modal keymap: items carry `propvalue`s for a running operator.
        const MODAL = 1 << 0;
        /// Materialized user keymap.
        const USER = 1 << 1;
        const EXPANDED = 1 << 2;
        const CHILDREN_EXPANDED = 1 << 3;
        /// Holds only diff items.
        const DIFF = 1 << 4;
        const USER_MODIFIED = 1 << 5;
        const UPDATE = 1 << 6;
        const TOOL = 1 << 7;
    }
}

/// Context predicate gating a whole keymap.
pub type KeyMapPoll = Rc<dyn Fn(&Context<'_>) -> bool>;

/// Identity of a keymap within a keyconfig.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyMapKey {
    pub idname: String,
    pub space_type: SpaceType,
    pub region_type: RegionType,
}

impl KeyMapKey {
    pub fn new(idname: &str, space_type: SpaceType, region_type: RegionType) -> Self {
        Self {
            idname: idname.to_string(),
            space_type,
            region_type,
        }
    }
}

/// One recorded user change relative to the shipped keymap.
///
/// Only `add_item`: a new binding. Only `remove_item`: a deleted binding.
/// Both: a binding replaced in place.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMapDiffItem {
    pub remove_item: Option<KeyMapItem>,
    pub add_item: Option<KeyMapItem>,
}

/// A named, ordered list of items. Order is significant: first match wins.
#[derive(Clone)]
pub struct KeyMap {
    pub idname: String,
    pub space_type: SpaceType,
    pub region_type: RegionType,
    /// Add-on or app-template owning this keymap; empty for built-ins.
    pub owner_id: String,
    pub poll: Option<KeyMapPoll>,
    pub items: Vec<KeyMapItem>,
    pub diff_items: Vec<KeyMapDiffItem>,
    pub flags: KeyMapFlags,
    kmi_id: i32,
}

impl fmt::Debug for KeyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMap")
            .field("idname", &self.idname)
            .field("space_type", &self.space_type)
            .field("region_type", &self.region_type)
            .field("owner_id", &self.owner_id)
            .field("poll", &self.poll.is_some())
            .field("items", &self.items.len())
            .field("diff_items", &self.diff_items.len())
            .field("flags", &self.flags)
            .finish()
    }
}

impl KeyMap {
    pub fn new(idname: &str, space_type: SpaceType, region_type: RegionType) -> Self {
        Self {
            idname: idname.to_string(),
            space_type,
            region_type,
            owner_id: String::new(),
            poll: None,
            items: Vec::new(),
            diff_items: Vec::new(),
            flags: KeyMapFlags::empty(),
            kmi_id: 0,
        }
    }

    pub fn key(&self) -> KeyMapKey {
        KeyMapKey {
            idname: self.idname.clone(),
            space_type: self.space_type,
            region_type: self.region_type,
        }
    }

    pub fn is_identity(
        &self,
        idname: &str,
        space_type: SpaceType,
        region_type: RegionType,
    ) -> bool {
        self.idname == idname && self.space_type == space_type && self.region_type == region_type
    }

    pub fn is_modal(&self) -> bool {
        self.flags.contains(KeyMapFlags::MODAL)
    }

    /// Append an item, assigning it the next id. Returns the stored item.
    pub fn add_item(&mut self, mut kmi: KeyMapItem) -> &mut KeyMapItem {
        self.kmi_id += 1;
        kmi.id = self.kmi_id;
        let idx = self.items.len();
        self.items.push(kmi);
        &mut self.items[idx]
    }

    /// Insert an item before position `index`, assigning it the next id.
    pub fn insert_item(&mut self, index: usize, mut kmi: KeyMapItem) -> i32 {
        self.kmi_id += 1;
        kmi.id = self.kmi_id;
        let id = kmi.id;
        self.items.insert(index.min(self.items.len()), kmi);
        id
    }

    /// Remove an item by id. Returns whether it existed.
    pub fn remove_item(&mut self, id: i32) -> bool {
        let before = self.items.len();
        self.items.retain(|kmi| kmi.id != id);
        before != self.items.len()
    }

    pub fn item_by_id(&self, id: i32) -> Option<&KeyMapItem> {
        self.items.iter().find(|kmi| kmi.id == id)
    }

    pub fn item_by_id_mut(&mut self, id: i32) -> Option<&mut KeyMapItem> {
        self.items.iter_mut().find(|kmi| kmi.id == id)
    }

    /// First active item accepting `event`.
    pub fn find_match(&self, event: &Event) -> Option<&KeyMapItem> {
        self.items.iter().find(|kmi| kmi.matches(event))
    }

    /// First active item running `idname` with compatible properties.
    ///
    /// With `properties` given, the item's properties must compare equal under
    /// `strict`. `filter` can reject items (e.g. invisible bindings). Binding
    /// order decides between several candidates.
    pub fn find_item(
        &self,
        idname: &str,
        properties: Option<&OperatorProperties>,
        strict: bool,
        filter: Option<&dyn Fn(&KeyMapItem) -> bool>,
    ) -> Option<&KeyMapItem> {
        self.items.iter().find(|kmi| {
            kmi.is_active()
                && kmi.idname == idname
                && properties.is_none_or(|props| {
                    OperatorProperties::equals_ex(Some(props), kmi.properties.as_ref(), strict)
                })
                && filter.is_none_or(|f| f(kmi))
        })
    }

    /// Item equal to `needle` (same chord, result and state).
    fn find_item_equals(&self, needle: &KeyMapItem) -> Option<usize> {
        self.items.iter().position(|kmi| kmi.equals(needle))
    }

    /// Item running the same thing as `needle`, whatever its chord.
    fn find_item_equals_result(&self, needle: &KeyMapItem) -> Option<usize> {
        self.items.iter().position(|kmi| kmi.equals_result(needle))
    }

    /// Compute the changes turning `self` (shipped) into `edited`.
    ///
    /// Items are paired by id, so `edited` must be a copy of `self` that was
    /// modified in place.
    pub fn diff(&self, edited: &KeyMap) -> Vec<KeyMapDiffItem> {
        let mut diffs = Vec::new();

        for kmi in &self.items {
            match edited.item_by_id(kmi.id) {
                Some(kmi2) if kmi.equals(kmi2) => {}
                Some(kmi2) => diffs.push(KeyMapDiffItem {
                    remove_item: Some(kmi.clone()),
                    add_item: Some(kmi2.clone()),
                }),
                None => diffs.push(KeyMapDiffItem {
                    remove_item: Some(kmi.clone()),
                    add_item: None,
                }),
            }
        }

        for kmi2 in &edited.items {
            if self.item_by_id(kmi2.id).is_none() {
                diffs.push(KeyMapDiffItem {
                    remove_item: None,
                    add_item: Some(kmi2.clone()),
                });
            }
        }

        diffs
    }

    /// Apply recorded changes to this (shipped) keymap.
    ///
    /// A removal whose target no longer exists is skipped together with its
    /// replacement. Already present additions are not added twice.
    pub fn patch(&mut self, diffs: &[KeyMapDiffItem]) {
        for diff in diffs {
            let mut remove_idx = diff.remove_item.as_ref().and_then(|rm| {
                self.find_item_equals(rm)
                    .or_else(|| self.find_item_equals_result(rm))
            });

            if let Some(add) = &diff.add_item {
                let add_idx = self.find_item_equals(add);
                if add_idx.is_some() && add_idx == remove_idx {
                    remove_idx = None;
                } else if add_idx.is_none() && (diff.remove_item.is_none() || remove_idx.is_some())
                {
                    let mut kmi = add.clone();
                    kmi.flags |= KmiFlags::USER_MODIFIED;
                    match remove_idx {
                        Some(idx) => {
                            let removed = &self.items[idx];
                            kmi.flags.remove(KmiFlags::EXPANDED);
                            kmi.flags |= removed.flags & KmiFlags::EXPANDED;
                            kmi.id = removed.id;
                            self.items.insert(idx, kmi);
                            remove_idx = Some(idx + 1);
                        }
                        None => {
                            self.add_item(kmi);
                        }
                    }
                }
            }

            if let Some(idx) = remove_idx {
                self.items.remove(idx);
            }
        }
    }
}

/// Find a keymap by identity in a list. Identities are unique per list.
pub fn keymap_list_find<'a>(
    keymaps: &'a [KeyMap],
    idname: &str,
    space_type: SpaceType,
    region_type: RegionType,
) -> Option<&'a KeyMap> {
    keymaps
        .iter()
        .find(|km| km.is_identity(idname, space_type, region_type))
}

pub fn keymap_list_find_mut<'a>(
    keymaps: &'a mut [KeyMap],
    idname: &str,
    space_type: SpaceType,
    region_type: RegionType,
) -> Option<&'a mut KeyMap> {
    keymaps
        .iter_mut()
        .find(|km| km.is_identity(idname, space_type, region_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, KeyValue};
    use crate::keymap::{KmiType, Modifiers};

    fn sample() -> KeyMap {
        let mut km = KeyMap::new("Object Mode", SpaceType::Empty, RegionType::Window);
        km.add_item(KeyMapItem::new("object.delete", EventType::X, KeyValue::Press));
        km.add_item(
            KeyMapItem::new("object.duplicate", EventType::D, KeyValue::Press)
                .with_modifiers(Modifiers::SHIFT),
        );
        km.add_item(KeyMapItem::new("object.hide", EventType::H, KeyValue::Press));
        km
    }

    #[test]
    fn test_item_ids_are_unique() {
        let km = sample();
        let ids: Vec<_> = km.items.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_find_item_first_match_and_inactive() {
        let mut km = KeyMap::new("Window", SpaceType::Empty, RegionType::Window);
        let props = OperatorProperties::new().with("use_global", true);
        km.add_item(
            KeyMapItem::new("object.delete", EventType::X, KeyValue::Press)
                .with_properties(props.clone())
                .with_flags(KmiFlags::INACTIVE),
        );
        let first = km
            .add_item(
                KeyMapItem::new("object.delete", EventType::Delete, KeyValue::Press)
                    .with_properties(props.clone()),
            )
            .id;
        km.add_item(
            KeyMapItem::new("object.delete", EventType::X, KeyValue::Press)
                .with_properties(props.clone()),
        );

        let found = km.find_item("object.delete", Some(&props), true, None).unwrap();
        assert_eq!(found.id, first);

        let visible = |kmi: &KeyMapItem| kmi.kmi_type != KmiType::Event(EventType::Delete);
        let found = km
            .find_item("object.delete", Some(&props), true, Some(&visible))
            .unwrap();
        assert_eq!(found.id, 3);
    }

    #[test]
    fn test_find_item_strictness() {
        let mut km = KeyMap::new("Window", SpaceType::Empty, RegionType::Window);
        km.add_item(
            KeyMapItem::new("transform.translate", EventType::G, KeyValue::Press)
                .with_properties(OperatorProperties::new().with("release_confirm", true)),
        );
        let query = OperatorProperties::new()
            .with("release_confirm", true)
            .with("orient_type", "GLOBAL");

        assert!(km
            .find_item("transform.translate", Some(&query), true, None)
            .is_none());
        assert!(km
            .find_item("transform.translate", Some(&query), false, None)
            .is_some());
        assert!(km.find_item("transform.translate", None, true, None).is_some());
    }

    #[test]
    fn test_diff_and_patch_replace() {
        let shipped = sample();
        let mut edited = shipped.clone();
        edited.items[0].kmi_type = KmiType::Event(EventType::Delete);
        edited.remove_item(3);
        edited.add_item(KeyMapItem::new("object.select_all", EventType::A, KeyValue::Press));

        let diffs = shipped.diff(&edited);
        assert_eq!(diffs.len(), 3);

        let mut patched = shipped.clone();
        patched.patch(&diffs);
        let names: Vec<_> = patched.items.iter().map(|k| k.idname.as_str()).collect();
        assert_eq!(
            names,
            vec!["object.delete", "object.duplicate", "object.select_all"]
        );
        assert_eq!(patched.items[0].kmi_type, KmiType::Event(EventType::Delete));
        assert_eq!(patched.items[0].id, 1);
        assert!(patched.items[0].flags.contains(KmiFlags::USER_MODIFIED));
    }

    #[test]
    fn test_patch_is_idempotent_for_additions() {
        let shipped = sample();
        let diffs = vec![KeyMapDiffItem {
            remove_item: None,
            add_item: Some(KeyMapItem::new("object.hide", EventType::H, KeyValue::Press)),
        }];
        let mut patched = shipped.clone();
        patched.patch(&diffs);
        assert_eq!(patched.items.len(), shipped.items.len());
    }

    #[test]
    fn test_list_find() {
        let list = vec![
            KeyMap::new("Window", SpaceType::Empty, RegionType::Window),
            KeyMap::new("3D View", SpaceType::View3D, RegionType::Window),
        ];
        let find = |region_type| keymap_list_find(&list, "3D View", SpaceType::View3D, region_type);
        assert!(find(RegionType::Window).is_some());
        assert!(find(RegionType::Header).is_none());
    }
}
