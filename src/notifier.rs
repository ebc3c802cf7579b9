//! Notifiers: coarse "something changed" broadcasts
//!
//! A notifier type is a packed 32-bit code, `category | data | subtype |
//! action`, one byte each. Listeners filter on the parts they care about and
//! tag their region for redraw.

use std::collections::VecDeque;

use crate::id::IdRef;
use crate::wm::{AreaId, RegionId, WindowId};

pub const NOTE_CATEGORY: u32 = 0xFF00_0000;
pub const NOTE_DATA: u32 = 0x00FF_0000;
pub const NOTE_SUBTYPE: u32 = 0x0000_FF00;
pub const NOTE_ACTION: u32 = 0x0000_00FF;

// Categories
pub const NC_WM: u32 = 1 << 24;
pub const NC_WINDOW: u32 = 2 << 24;
pub const NC_SCREEN: u32 = 3 << 24;
pub const NC_SCENE: u32 = 4 << 24;
pub const NC_OBJECT: u32 = 5 << 24;
pub const NC_MATERIAL: u32 = 6 << 24;
pub const NC_TEXTURE: u32 = 7 << 24;
pub const NC_LAMP: u32 = 8 << 24;
pub const NC_GROUP: u32 = 9 << 24;
pub const NC_IMAGE: u32 = 10 << 24;
pub const NC_BRUSH: u32 = 11 << 24;
pub const NC_TEXT: u32 = 12 << 24;
pub const NC_WORLD: u32 = 13 << 24;
pub const NC_ANIMATION: u32 = 14 << 24;
pub const NC_SPACE: u32 = 15 << 24;
pub const NC_GEOM: u32 = 16 << 24;
pub const NC_NODE: u32 = 17 << 24;
pub const NC_ID: u32 = 18 << 24;
pub const NC_PAINTCURVE: u32 = 19 << 24;
pub const NC_MOVIECLIP: u32 = 20 << 24;
pub const NC_MASK: u32 = 21 << 24;
pub const NC_GPENCIL: u32 = 22 << 24;
pub const NC_LINESTYLE: u32 = 23 << 24;
pub const NC_CAMERA: u32 = 24 << 24;
pub const NC_LIGHTPROBE: u32 = 25 << 24;
pub const NC_ASSET: u32 = 26 << 24;

// Data, NC_WM
pub const ND_FILEREAD: u32 = 1 << 16;
pub const ND_FILESAVE: u32 = 2 << 16;
pub const ND_DATACHANGED: u32 = 3 << 16;
pub const ND_HISTORY: u32 = 4 << 16;
pub const ND_JOB: u32 = 5 << 16;
pub const ND_UNDO: u32 = 6 << 16;

// Data, NC_SCENE
pub const ND_SCENEBROWSE: u32 = 1 << 16;
pub const ND_MARKERS: u32 = 2 << 16;
pub const ND_FRAME: u32 = 3 << 16;
pub const ND_RENDER_OPTIONS: u32 = 4 << 16;
pub const ND_NODES: u32 = 5 << 16;
pub const ND_SEQUENCER: u32 = 6 << 16;
pub const ND_OB_ACTIVE: u32 = 7 << 16;
pub const ND_OB_SELECT: u32 = 8 << 16;
pub const ND_OB_VISIBLE: u32 = 9 << 16;
pub const ND_OB_RENDER: u32 = 10 << 16;
pub const ND_MODE: u32 = 11 << 16;
pub const ND_LAYER: u32 = 13 << 16;
pub const ND_WORLD: u32 = 15 << 16;
pub const ND_LAYER_CONTENT: u32 = 16 << 16;

// Data, NC_OBJECT
pub const ND_TRANSFORM: u32 = 18 << 16;
pub const ND_OB_SHADING: u32 = 19 << 16;
pub const ND_POSE: u32 = 20 << 16;
pub const ND_MODIFIER: u32 = 23 << 16;
pub const ND_DRAW: u32 = 27 << 16;

// Data, NC_GEOM
pub const ND_SELECT: u32 = 90 << 16;
pub const ND_DATA: u32 = 91 << 16;
pub const ND_VERTEX_GROUP: u32 = 92 << 16;

// Data, NC_SPACE
pub const ND_SPACE_CONSOLE: u32 = 1 << 16;
pub const ND_SPACE_INFO_REPORT: u32 = 2 << 16;
pub const ND_SPACE_INFO: u32 = 3 << 16;
pub const ND_SPACE_IMAGE: u32 = 4 << 16;
pub const ND_SPACE_FILE_PARAMS: u32 = 5 << 16;
pub const ND_SPACE_FILE_LIST: u32 = 6 << 16;
pub const ND_SPACE_NODE: u32 = 7 << 16;
pub const ND_SPACE_OUTLINER: u32 = 8 << 16;
pub const ND_SPACE_VIEW3D: u32 = 9 << 16;
pub const ND_SPACE_PROPERTIES: u32 = 10 << 16;

// Subtypes
pub const NS_MODE_OBJECT: u32 = 1 << 8;
pub const NS_EDITMODE_MESH: u32 = 2 << 8;
pub const NS_VIEW3D_GPU: u32 = 16 << 8;

// Actions
pub const NA_EDITED: u32 = 1;
pub const NA_EVALUATED: u32 = 2;
pub const NA_ADDED: u32 = 3;
pub const NA_REMOVED: u32 = 4;
pub const NA_RENAME: u32 = 5;
pub const NA_SELECTED: u32 = 6;
pub const NA_ACTIVATED: u32 = 7;
pub const NA_PAINTING: u32 = 8;

/// What a notifier is about, beyond its packed code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotifierRef {
    #[default]
    None,
    Id(IdRef),
    Window(WindowId),
    Area(AreaId),
    Region(RegionId),
    Opaque(u64),
}

/// One queued notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifier {
    /// Target window; `None` reaches every window.
    pub window: Option<WindowId>,
    pub category: u32,
    pub data: u32,
    pub subtype: u32,
    pub action: u32,
    pub reference: NotifierRef,
}

impl Notifier {
    pub fn new(window: Option<WindowId>, type_code: u32, reference: NotifierRef) -> Self {
        Self {
            window,
            category: type_code & NOTE_CATEGORY,
            data: type_code & NOTE_DATA,
            subtype: type_code & NOTE_SUBTYPE,
            action: type_code & NOTE_ACTION,
            reference,
        }
    }

    /// The packed code again.
    pub fn type_code(&self) -> u32 {
        self.category | self.data | self.subtype | self.action
    }

    pub fn category_name(&self) -> &'static str {
        category_name(self.category)
    }
}

pub fn category_name(category: u32) -> &'static str {
    match category & NOTE_CATEGORY {
        NC_WM => "WindowManager",
        NC_WINDOW => "Window",
        NC_SCREEN => "Screen",
        NC_SCENE => "Scene",
        NC_OBJECT => "Object",
        NC_MATERIAL => "Material",
        NC_TEXTURE => "Texture",
        NC_LAMP => "Lamp",
        NC_GROUP => "Group",
        NC_IMAGE => "Image",
        NC_BRUSH => "Brush",
        NC_TEXT => "Text",
        NC_WORLD => "World",
        NC_ANIMATION => "Animation",
        NC_SPACE => "Space",
        NC_GEOM => "Geom",
        NC_NODE => "Node",
        NC_ID => "ID",
        NC_PAINTCURVE => "PaintCurve",
        NC_MOVIECLIP => "MovieClip",
        NC_MASK => "Mask",
        NC_GPENCIL => "GPencil",
        NC_LINESTYLE => "LineStyle",
        NC_CAMERA => "Camera",
        NC_LIGHTPROBE => "LightProbe",
        NC_ASSET => "Asset",
        _ => "Undefined",
    }
}

/// Pending notifiers, drained once per main-loop iteration.
///
/// Adding a notifier equal to one already queued is a no-op.
#[derive(Debug, Default)]
pub struct NotifierQueue {
    queue: VecDeque<Notifier>,
}

impl NotifierQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notifier; returns false when an identical one is pending.
    pub fn add(
        &mut self,
        window: Option<WindowId>,
        type_code: u32,
        reference: NotifierRef,
    ) -> bool {
        let note = Notifier::new(window, type_code, reference);
        if self.queue.contains(&note) {
            return false;
        }
        tracing::trace!(
            category = note.category_name(),
            code = type_code,
            "notifier added"
        );
        self.queue.push_back(note);
        true
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Notifier> + '_ {
        self.queue.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notifier> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every notifier targeting `window`.
    pub fn remove_for_window(&mut self, window: WindowId) {
        self.queue.retain(|n| n.window != Some(window));
    }
}
