//! Scene data-block references
//!
//! The scene graph itself lives elsewhere; the window manager only needs a
//! stable, comparable handle for the objects it hears about.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of data-block an [`IdRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdKind {
    Scene,
    Object,
    Mesh,
    Material,
    Light,
    Camera,
    Collection,
    Image,
    Texture,
    World,
    NodeTree,
    Action,
    WorkSpace,
    Screen,
}

impl IdKind {
    /// Two-letter code, as used in data-block names.
    pub fn code(self) -> &'static str {
        match self {
            IdKind::Scene => "SC",
            IdKind::Object => "OB",
            IdKind::Mesh => "ME",
            IdKind::Material => "MA",
            IdKind::Light => "LA",
            IdKind::Camera => "CA",
            IdKind::Collection => "GR",
            IdKind::Image => "IM",
            IdKind::Texture => "TE",
            IdKind::World => "WO",
            IdKind::NodeTree => "NT",
            IdKind::Action => "AC",
            IdKind::WorkSpace => "WS",
            IdKind::Screen => "SR",
        }
    }
}

/// A data-block identity: its kind plus its stage path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdRef {
    pub kind: IdKind,
    pub path: String,
}

impl IdRef {
    pub fn new(kind: IdKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn object(path: impl Into<String>) -> Self {
        Self::new(IdKind::Object, path)
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.code(), self.path)
    }
}
