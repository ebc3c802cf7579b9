//! Message keys: what a subscriber listens to

use std::fmt;
use std::hash::Hash;

use crate::id::{IdKind, IdRef};

/// Message kinds; each has its own lookup table on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MsgKind {
    Prim,
    Static,
}

impl MsgKind {
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgKind::Prim => "PRIM",
            MsgKind::Static => "STATIC",
        }
    }
}

/// Behaviour shared by every concrete key kind.
pub trait MsgKeyType: Clone + Eq + Hash + fmt::Debug {
    const KIND: MsgKind;

    /// Human readable form for dumps and traces.
    fn repr(&self) -> String;

    fn into_key(self) -> MsgKey;

    fn from_key(key: &MsgKey) -> Option<&Self>;
}

/// A property (or any property, when `prop` is `None`) of a scene object.
///
/// `owner_id` is the data-block owning `data`; both unset means "any owner
/// of this kind". `kind` is the kind of `data` and stays set on those
/// anonymous keys, so they never match data-blocks of another kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimKey {
    pub kind: Option<IdKind>,
    pub owner_id: Option<IdRef>,
    pub data: Option<IdRef>,
    pub prop: Option<String>,
}

impl PrimKey {
    /// Property `prop` of the data-block `id` itself.
    pub fn id_prop(id: IdRef, prop: &str) -> Self {
        Self {
            kind: Some(id.kind),
            owner_id: Some(id.clone()),
            data: Some(id),
            prop: Some(prop.to_string()),
        }
    }

    /// Any property of the data-block `id`.
    pub fn id_any(id: IdRef) -> Self {
        Self {
            kind: Some(id.kind),
            owner_id: Some(id.clone()),
            data: Some(id),
            prop: None,
        }
    }

    /// Property `prop` of `data`, nested inside `owner`.
    pub fn nested(owner: IdRef, data: IdRef, prop: Option<&str>) -> Self {
        Self {
            kind: Some(data.kind),
            owner_id: Some(owner),
            data: Some(data),
            prop: prop.map(str::to_string),
        }
    }

    /// Property `prop` on any data-block of `kind`.
    pub fn any_owner(kind: IdKind, prop: &str) -> Self {
        Self {
            kind: Some(kind),
            owner_id: None,
            data: None,
            prop: Some(prop.to_string()),
        }
    }

    /// Any property on any data-block of `kind`.
    pub fn any_of_kind(kind: IdKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn has_owner(&self) -> bool {
        self.owner_id.is_some() || self.data.is_some()
    }

    /// Path from the owner to `data`, used to find the same data again
    /// after the owner changes identity. `None` when `data` is the owner.
    pub fn data_path(&self) -> Option<String> {
        let (owner, data) = (self.owner_id.as_ref()?, self.data.as_ref()?);
        if owner == data {
            return None;
        }
        let relative = data
            .path
            .strip_prefix(owner.path.as_str())
            .unwrap_or(&data.path)
            .trim_start_matches('/');
        Some(relative.to_string())
    }
}

impl MsgKeyType for PrimKey {
    const KIND: MsgKind = MsgKind::Prim;

    fn repr(&self) -> String {
        let opt =
            |id: &Option<IdRef>| id.as_ref().map_or_else(|| "*".to_string(), IdRef::to_string);
        format!(
            "PRIM(type={}, owner={}, data={}, prop={})",
            self.kind.map_or("*", IdKind::code),
            opt(&self.owner_id),
            opt(&self.data),
            self.prop.as_deref().unwrap_or("*")
        )
    }

    fn into_key(self) -> MsgKey {
        MsgKey::Prim(self)
    }

    fn from_key(key: &MsgKey) -> Option<&Self> {
        match key {
            MsgKey::Prim(k) => Some(k),
            _ => None,
        }
    }
}

/// An application-wide event with no data attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticKey(pub u32);

impl StaticKey {
    pub const WINDOW_DRAW: StaticKey = StaticKey(1);
    pub const SCREEN_EDIT: StaticKey = StaticKey(2);
    pub const FILE_READ: StaticKey = StaticKey(3);

    pub fn name(self) -> Option<&'static str> {
        match self {
            StaticKey::WINDOW_DRAW => Some("WINDOW_DRAW"),
            StaticKey::SCREEN_EDIT => Some("SCREEN_EDIT"),
            StaticKey::FILE_READ => Some("FILE_READ"),
            _ => None,
        }
    }
}

impl MsgKeyType for StaticKey {
    const KIND: MsgKind = MsgKind::Static;

    fn repr(&self) -> String {
        match self.name() {
            Some(name) => format!("STATIC({name})"),
            None => format!("STATIC({})", self.0),
        }
    }

    fn into_key(self) -> MsgKey {
        MsgKey::Static(self)
    }

    fn from_key(key: &MsgKey) -> Option<&Self> {
        match key {
            MsgKey::Static(k) => Some(k),
            _ => None,
        }
    }
}

/// Any message key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MsgKey {
    Prim(PrimKey),
    Static(StaticKey),
}

impl MsgKey {
    pub fn kind(&self) -> MsgKind {
        match self {
            MsgKey::Prim(_) => MsgKind::Prim,
            MsgKey::Static(_) => MsgKind::Static,
        }
    }

    pub fn repr(&self) -> String {
        match self {
            MsgKey::Prim(k) => k.repr(),
            MsgKey::Static(k) => k.repr(),
        }
    }

    pub fn as_prim(&self) -> Option<&PrimKey> {
        PrimKey::from_key(self)
    }

    pub fn as_static(&self) -> Option<StaticKey> {
        StaticKey::from_key(self).copied()
    }
}

impl From<PrimKey> for MsgKey {
    fn from(key: PrimKey) -> Self {
        key.into_key()
    }
}

impl From<StaticKey> for MsgKey {
    fn from(key: StaticKey) -> Self {
        key.into_key()
    }
}

impl fmt::Display for MsgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
