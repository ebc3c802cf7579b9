//! The message bus: subscribe, publish (tag), flush (notify)

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use super::key::{MsgKey, MsgKind, PrimKey, StaticKey};
use crate::id::IdRef;
use crate::notifier::{NotifierQueue, NotifierRef};
use crate::wm::{AreaId, Region, RegionId, Window, WindowId};

new_key_type! {
    /// Handle of a subscribed key, stable until the key is removed.
    pub struct MsgKeyId;
}

/// Who subscribed, so all of an owner's subscriptions can be dropped at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MsgOwner {
    Window(WindowId),
    Area(AreaId),
    Region(RegionId),
    Custom(u64),
}

impl From<RegionId> for MsgOwner {
    fn from(id: RegionId) -> Self {
        MsgOwner::Region(id)
    }
}

impl From<AreaId> for MsgOwner {
    fn from(id: AreaId) -> Self {
        MsgOwner::Area(id)
    }
}

impl From<WindowId> for MsgOwner {
    fn from(id: WindowId) -> Self {
        MsgOwner::Window(id)
    }
}

impl fmt::Display for MsgOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MsgOwner::Window(id) => write!(f, "window {id}"),
            MsgOwner::Area(id) => write!(f, "area {id}"),
            MsgOwner::Region(id) => write!(f, "region {id}"),
            MsgOwner::Custom(id) => write!(f, "custom {id}"),
        }
    }
}

/// What a notify callback may touch: the screens and the notifier queue.
pub struct MsgNotifyContext<'a> {
    pub windows: &'a mut [Window],
    pub notifiers: &'a mut NotifierQueue,
}

impl MsgNotifyContext<'_> {
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.windows
            .iter_mut()
            .flat_map(|w| w.areas.iter_mut())
            .flat_map(|a| a.regions.iter_mut())
            .find(|r| r.id == id)
    }

    /// Tag a region for redraw; false if it no longer exists.
    pub fn tag_region_redraw(&mut self, id: RegionId) -> bool {
        match self.region_mut(id) {
            Some(region) => {
                region.tag_redraw();
                true
            }
            None => false,
        }
    }

    pub fn add_notifier(
        &mut self,
        window: Option<WindowId>,
        type_code: u32,
        reference: NotifierRef,
    ) {
        self.notifiers.add(window, type_code, reference);
    }
}

pub type MsgNotifyFn = Rc<dyn Fn(&mut MsgNotifyContext<'_>, &MsgKey, &SubscribeValue)>;
/// Called when a value is dropped from the bus.
pub type MsgFreeFn = Rc<dyn Fn(&MsgKey, &SubscribeValue)>;
/// Called on values that survive an identity change of their key.
pub type MsgUpdateFn = Rc<dyn Fn(&MsgKey, &mut SubscribeValue)>;

thread_local! {
    static TAG_REDRAW: MsgNotifyFn = Rc::new(|ctx, key, value| {
        if let MsgOwner::Region(region) = value.owner {
            if !ctx.tag_region_redraw(region) {
                tracing::debug!("{} fired for missing region {}", key, region);
            }
        }
    });
}

/// Notify callback tagging the owning region for redraw.
///
/// Always the same callback, so subscribing it twice with the same owner
/// keeps a single value.
pub fn notify_tag_redraw() -> MsgNotifyFn {
    TAG_REDRAW.with(Rc::clone)
}

/// One subscriber of a key.
#[derive(Clone)]
pub struct SubscribeValue {
    pub owner: MsgOwner,
    pub user_data: Option<Rc<dyn Any>>,
    pub notify: MsgNotifyFn,
    pub free_data: Option<MsgFreeFn>,
    pub update: Option<MsgUpdateFn>,
    /// Survives an identity change of the key's object.
    pub is_persistent: bool,
    tag: bool,
}

impl fmt::Debug for SubscribeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeValue")
            .field("owner", &self.owner)
            .field("user_data", &self.user_data.is_some())
            .field("is_persistent", &self.is_persistent)
            .field("tag", &self.tag)
            .finish()
    }
}

impl SubscribeValue {
    pub fn new(owner: impl Into<MsgOwner>, notify: MsgNotifyFn) -> Self {
        Self {
            owner: owner.into(),
            user_data: None,
            notify,
            free_data: None,
            update: None,
            is_persistent: false,
            tag: false,
        }
    }

    pub fn with_user_data(mut self, data: Rc<dyn Any>) -> Self {
        self.user_data = Some(data);
        self
    }

    pub fn with_free(mut self, free_data: MsgFreeFn) -> Self {
        self.free_data = Some(free_data);
        self
    }

    pub fn with_update(mut self, update: MsgUpdateFn) -> Self {
        self.update = Some(update);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    pub fn is_tagged(&self) -> bool {
        self.tag
    }

    /// Same subscriber: notify callback, owner and user data are identical.
    fn same_subscriber(&self, other: &SubscribeValue) -> bool {
        let same_data = match (&self.user_data, &other.user_data) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        self.owner == other.owner && Rc::ptr_eq(&self.notify, &other.notify) && same_data
    }
}

/// A key and everything subscribed to it.
#[derive(Debug)]
pub struct SubscribeKey {
    pub key: MsgKey,
    /// Path from the owner to the data, for re-resolving after a rename.
    pub data_path: Option<String>,
    /// How the subscriber named the object, for dumps.
    pub id_repr: Option<String>,
    pub values: Vec<SubscribeValue>,
}

impl SubscribeKey {
    fn free_values(&mut self, keep: impl Fn(&SubscribeValue) -> bool) -> u32 {
        let mut untagged = 0;
        let key = &self.key;
        self.values.retain(|value| {
            if keep(value) {
                return true;
            }
            if value.tag {
                untagged += 1;
            }
            if let Some(free) = &value.free_data {
                free(key, value);
            }
            false
        });
        untagged
    }
}

/// Property-level publish/subscribe.
///
/// Publishing only tags subscribers; [`MsgBus::handle`] calls every tagged
/// subscriber once and clears the tags. Keys without subscribers are removed.
#[derive(Debug)]
pub struct MsgBus {
    keys: SlotMap<MsgKeyId, SubscribeKey>,
    /// Subscription order, for deterministic flushes and dumps.
    order: Vec<MsgKeyId>,
    lookup: [HashMap<MsgKey, MsgKeyId>; MsgKind::COUNT],
    tag_count: u32,
}

impl Default for MsgBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgBus {
    pub fn new() -> Self {
        Self {
            keys: SlotMap::with_key(),
            order: Vec::new(),
            lookup: Default::default(),
            tag_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of tagged values waiting for [`MsgBus::handle`].
    pub fn tag_count(&self) -> u32 {
        self.tag_count
    }

    /// Keys in subscription order.
    pub fn keys(&self) -> impl Iterator<Item = &SubscribeKey> {
        self.order.iter().filter_map(|id| self.keys.get(*id))
    }

    pub fn get(&self, id: MsgKeyId) -> Option<&SubscribeKey> {
        self.keys.get(id)
    }

    pub fn lookup(&self, key: &MsgKey) -> Option<&SubscribeKey> {
        let id = self.lookup[key.kind().index()].get(key)?;
        self.keys.get(*id)
    }

    pub fn lookup_prim(&self, key: &PrimKey) -> Option<&SubscribeKey> {
        self.lookup(&MsgKey::Prim(key.clone()))
    }

    pub fn lookup_static(&self, key: StaticKey) -> Option<&SubscribeKey> {
        self.lookup(&MsgKey::Static(key))
    }

    /// Subscribe `value` to `key`, creating the key on first use. A value
    /// equal to an existing subscriber is not added twice.
    pub fn subscribe_with_key(
        &mut self,
        key: impl Into<MsgKey>,
        value: SubscribeValue,
        id_repr: Option<&str>,
    ) -> MsgKeyId {
        let key = key.into();
        let kind = key.kind().index();
        let id = match self.lookup[kind].get(&key) {
            Some(id) => *id,
            None => {
                let data_path = key.as_prim().and_then(PrimKey::data_path);
                let id = self.keys.insert(SubscribeKey {
                    key: key.clone(),
                    data_path,
                    id_repr: id_repr.map(str::to_string),
                    values: Vec::new(),
                });
                tracing::trace!("msgbus: new key {}", key);
                self.lookup[kind].insert(key, id);
                self.order.push(id);
                id
            }
        };

        if let Some(entry) = self.keys.get_mut(id) {
            if !entry.values.iter().any(|v| v.same_subscriber(&value)) {
                let mut value = value;
                value.tag = false;
                entry.values.push(value);
            }
        }
        id
    }

    pub fn subscribe_prim(
        &mut self,
        key: PrimKey,
        value: SubscribeValue,
        id_repr: &str,
    ) -> MsgKeyId {
        self.subscribe_with_key(key, value, Some(id_repr))
    }

    pub fn subscribe_static(
        &mut self,
        key: StaticKey,
        value: SubscribeValue,
        id_repr: &str,
    ) -> MsgKeyId {
        self.subscribe_with_key(key, value, Some(id_repr))
    }

    /// Tag every subscriber of `key`. Unknown keys are ignored.
    pub fn publish_with_key(&mut self, key: &MsgKey) {
        let Some(id) = self.lookup[key.kind().index()].get(key).copied() else {
            return;
        };
        self.publish_id(id);
    }

    fn publish_id(&mut self, id: MsgKeyId) {
        let Some(entry) = self.keys.get_mut(id) else {
            return;
        };
        tracing::trace!("msgbus: publish {}", entry.key);
        for value in entry.values.iter_mut().filter(|v| !v.tag) {
            value.tag = true;
            self.tag_count += 1;
        }
    }

    /// Publish a property change, and also to subscribers of broader keys:
    /// any property of the same object, then the property on any data-block
    /// of the same kind.
    pub fn publish_prim(&mut self, key: &PrimKey) {
        self.publish_with_key(&MsgKey::Prim(key.clone()));

        if !key.has_owner() {
            return;
        }
        let mut anon = key.clone();
        if anon.prop.is_some() {
            anon.prop = None;
            self.publish_with_key(&MsgKey::Prim(anon.clone()));
        }
        anon.owner_id = None;
        anon.data = None;
        if key.prop.is_some() {
            self.publish_with_key(&MsgKey::Prim(anon.clone()));
            anon.prop = key.prop.clone();
        }
        self.publish_with_key(&MsgKey::Prim(anon));
    }

    pub fn publish_static(&mut self, key: StaticKey) {
        self.publish_with_key(&MsgKey::Static(key));
    }

    /// Notify every tagged subscriber once and clear its tag.
    pub fn handle(&mut self, ctx: &mut MsgNotifyContext<'_>) {
        if self.tag_count == 0 {
            return;
        }
        let mut notified = 0u32;
        for id in &self.order {
            let Some(entry) = self.keys.get_mut(*id) else {
                continue;
            };
            let key = &entry.key;
            for value in entry.values.iter_mut().filter(|v| v.tag) {
                let notify = value.notify.clone();
                notify(ctx, key, value);
                value.tag = false;
                notified += 1;
            }
        }
        tracing::debug!("msgbus: notified {} subscribers", notified);

        self.tag_count = self.tag_count.saturating_sub(notified);
        if self.tag_count != 0 {
            tracing::error!("msgbus: {} tags left after flush", self.tag_count);
            debug_assert_eq!(self.tag_count, 0, "message bus tag count out of sync");
            self.tag_count = 0;
        }
    }

    fn remove_key(&mut self, id: MsgKeyId) -> Option<SubscribeKey> {
        let mut entry = self.keys.remove(id)?;
        self.lookup[entry.key.kind().index()].remove(&entry.key);
        self.order.retain(|k| *k != id);
        let untagged = entry.free_values(|_| false);
        self.tag_count = self.tag_count.saturating_sub(untagged);
        Some(entry)
    }

    /// Remove values of `owner` from `key`; an emptied key is removed.
    /// Returns how many values were removed.
    pub fn unsubscribe(&mut self, key: &MsgKey, owner: MsgOwner) -> usize {
        let Some(id) = self.lookup[key.kind().index()].get(key).copied() else {
            return 0;
        };
        self.remove_values(id, |v| v.owner != owner)
    }

    fn remove_values(&mut self, id: MsgKeyId, keep: impl Fn(&SubscribeValue) -> bool) -> usize {
        let Some(entry) = self.keys.get_mut(id) else {
            return 0;
        };
        let before = entry.values.len();
        let untagged = entry.free_values(keep);
        let removed = before - entry.values.len();
        self.tag_count = self.tag_count.saturating_sub(untagged);
        if entry.values.is_empty() {
            self.remove_key(id);
        }
        removed
    }

    /// Drop every subscription made by `owner`.
    pub fn clear_by_owner(&mut self, owner: MsgOwner) -> usize {
        let ids = self.order.clone();
        ids.into_iter()
            .map(|id| self.remove_values(id, |v| v.owner != owner))
            .sum()
    }

    /// Drop every key about the data-block `id`, which was deleted.
    pub fn remove_by_id(&mut self, id: &IdRef) {
        let doomed: Vec<_> = self
            .order
            .iter()
            .copied()
            .filter(|k| {
                self.keys
                    .get(*k)
                    .and_then(|e| e.key.as_prim())
                    .is_some_and(|p| p.owner_id.as_ref() == Some(id))
            })
            .collect();
        for key in doomed {
            self.remove_key(key);
        }
    }

    /// The data-block `src` now has the identity `dst`.
    ///
    /// Only persistent subscribers follow the object. Keys about nested data
    /// are re-resolved with `resolve(new_owner, data_path)`; keys that can't
    /// be resolved are dropped.
    pub fn update_by_id(
        &mut self,
        src: &IdRef,
        dst: &IdRef,
        resolve: impl Fn(&IdRef, &str) -> Option<IdRef>,
    ) {
        let affected: Vec<_> = self
            .order
            .iter()
            .copied()
            .filter(|k| {
                self.keys
                    .get(*k)
                    .and_then(|e| e.key.as_prim())
                    .is_some_and(|p| p.owner_id.as_ref() == Some(src))
            })
            .collect();

        for id in affected {
            let Some(entry) = self.keys.get_mut(id) else {
                continue;
            };
            let Some(old) = entry.key.as_prim().cloned() else {
                continue;
            };
            self.lookup[MsgKind::Prim.index()].remove(&entry.key);

            let untagged = entry.free_values(|v| v.is_persistent);
            self.tag_count = self.tag_count.saturating_sub(untagged);

            let renamed = if entry.values.is_empty() {
                None
            } else if old.data == old.owner_id {
                Some(PrimKey {
                    kind: Some(dst.kind),
                    owner_id: Some(dst.clone()),
                    data: Some(dst.clone()),
                    prop: old.prop.clone(),
                })
            } else {
                entry
                    .data_path
                    .as_deref()
                    .and_then(|path| resolve(dst, path))
                    .map(|data| PrimKey {
                        kind: Some(data.kind),
                        owner_id: Some(dst.clone()),
                        data: Some(data),
                        prop: old.prop.clone(),
                    })
            };

            let Some(renamed) = renamed else {
                tracing::debug!("msgbus: dropping {} after rename", entry.key);
                self.remove_key(id);
                continue;
            };

            let new_key = MsgKey::Prim(renamed);
            if let Some(existing) = self.lookup[MsgKind::Prim.index()].get(&new_key).copied() {
                // Fold into the key already subscribed under the new identity.
                let moved = self
                    .keys
                    .get_mut(id)
                    .map(|e| std::mem::take(&mut e.values))
                    .unwrap_or_default();
                self.keys.remove(id);
                self.order.retain(|k| *k != id);
                if let Some(target) = self.keys.get_mut(existing) {
                    for mut value in moved {
                        if let Some(update) = value.update.clone() {
                            update(&target.key, &mut value);
                        }
                        if target.values.iter().any(|v| v.same_subscriber(&value)) {
                            if value.tag {
                                self.tag_count = self.tag_count.saturating_sub(1);
                            }
                            continue;
                        }
                        target.values.push(value);
                    }
                }
                continue;
            }

            let Some(entry) = self.keys.get_mut(id) else {
                continue;
            };
            entry.key = new_key.clone();
            entry.id_repr = Some(dst.to_string());
            for value in entry.values.iter_mut() {
                if let Some(update) = value.update.clone() {
                    update(&new_key, value);
                }
            }
            self.lookup[MsgKind::Prim.index()].insert(new_key, id);
        }
    }

    /// Multi-line listing of every key and its subscribers.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "msgbus: {} keys, {} tagged", self.keys.len(), self.tag_count);
        for entry in self.keys() {
            let _ = write!(out, "  {}", entry.key);
            if let Some(repr) = &entry.id_repr {
                let _ = write!(out, " [{repr}]");
            }
            let _ = writeln!(out);
            for value in &entry.values {
                let _ = writeln!(
                    out,
                    "    {}{}{}",
                    value.owner,
                    if value.is_persistent { " persistent" } else { "" },
                    if value.tag { " tagged" } else { "" },
                );
            }
        }
        out
    }
}
