//! Drag and drop
//!
//! A [`Drag`] lives on the window manager from the moment a drag gesture
//! starts until it is dropped or cancelled. Releasing the left button turns
//! the drags into a `Drop` event; dropbox handlers on the regions under the
//! cursor then offer them to their [`Dropbox`]es.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::event::Event;
use crate::handler::HandlerAction;
use crate::id::{IdKind, IdRef};
use crate::operator::{operator_name_call_ptr, OperatorContext, OperatorResult};
use crate::properties::OperatorProperties;
use crate::wm::{Context, RegionType, SpaceType, Window};

/// A dragged data-block and the data-block it was dragged out of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragId {
    pub id: IdRef,
    pub from_parent: Option<IdRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragAsset {
    pub name: String,
    pub kind: IdKind,
    pub library_path: String,
}

/// What is being dragged.
#[derive(Clone)]
pub enum DragData {
    /// Local data-blocks, all of one kind.
    Id(Vec<DragId>),
    Asset(DragAsset),
    AssetCatalog { catalog_id: String },
    Path(String),
    Name(String),
    Value(f64),
    Color([f32; 4]),
    Opaque(Rc<dyn Any>),
}

impl fmt::Debug for DragData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragData::Id(ids) => f.debug_tuple("Id").field(ids).finish(),
            DragData::Asset(asset) => f.debug_tuple("Asset").field(asset).finish(),
            DragData::AssetCatalog { catalog_id } => f
                .debug_struct("AssetCatalog")
                .field("catalog_id", catalog_id)
                .finish(),
            DragData::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DragData::Name(name) => f.debug_tuple("Name").field(name).finish(),
            DragData::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DragData::Color(color) => f.debug_tuple("Color").field(color).finish(),
            DragData::Opaque(_) => f.write_str("Opaque"),
        }
    }
}

impl DragData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DragData::Id(_) => "ID",
            DragData::Asset(_) => "ASSET",
            DragData::AssetCatalog { .. } => "ASSET_CATALOG",
            DragData::Path(_) => "PATH",
            DragData::Name(_) => "NAME",
            DragData::Value(_) => "VALUE",
            DragData::Color(_) => "COLOR",
            DragData::Opaque(_) => "OPAQUE",
        }
    }
}

/// Drop target feedback while dragging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragDropState {
    /// Operator of the dropbox that would take the drag right now.
    pub active_dropbox: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Drag {
    pub data: DragData,
    pub drop_state: DragDropState,
}

impl Drag {
    pub fn new(data: DragData) -> Self {
        Self {
            data,
            drop_state: DragDropState::default(),
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::new(DragData::Path(path.into()))
    }

    /// Drag of a single local data-block.
    pub fn id(id: IdRef, from_parent: Option<IdRef>) -> Self {
        Self::new(DragData::Id(vec![DragId { id, from_parent }]))
    }

    pub fn ids(&self) -> &[DragId] {
        match &self.data {
            DragData::Id(ids) => ids,
            _ => &[],
        }
    }

    /// Add another data-block to an ID drag.
    ///
    /// Adding an id twice keeps one entry; its missing parent is filled in
    /// from the later call. Every id of a drag must be of the same kind.
    pub fn add_local_id(&mut self, id: IdRef, from_parent: Option<IdRef>) -> bool {
        let DragData::Id(ids) = &mut self.data else {
            tracing::error!("Adding {} to a {} drag", id, self.data.kind_name());
            debug_assert!(false, "add_local_id on a non-ID drag");
            return false;
        };

        for existing in ids.iter_mut() {
            if existing.id == id {
                if existing.from_parent.is_none() {
                    existing.from_parent = from_parent;
                }
                return false;
            }
            if existing.id.kind != id.kind {
                tracing::error!(
                    "Dragged IDs must share a kind: {:?} vs {:?}",
                    existing.id.kind,
                    id.kind
                );
                debug_assert!(false, "mixed ID kinds in one drag");
                return false;
            }
        }
        ids.push(DragId { id, from_parent });
        true
    }

    /// First dragged data-block, if it is of `kind` (any kind when `None`).
    pub fn local_id(&self, kind: Option<IdKind>) -> Option<&IdRef> {
        let first = &self.ids().first()?.id;
        kind.is_none_or(|k| first.kind == k).then_some(first)
    }
}

pub type DropPollFn = Rc<dyn Fn(&Context<'_>, &Drag, &Event) -> bool>;
/// Fill operator properties from the drag before the drop operator runs.
pub type DropCopyFn = Rc<dyn Fn(&Drag, &mut OperatorProperties)>;
pub type DropCancelFn = Rc<dyn Fn(&mut Context<'_>, &Drag)>;
pub type DragStartFn = Rc<dyn Fn(&Context<'_>, &mut Drag)>;

/// Identity of a dropbox map: name plus the editor and region it serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropboxMapKey {
    pub idname: String,
    pub space_type: SpaceType,
    pub region_type: RegionType,
}

impl DropboxMapKey {
    pub fn new(idname: &str, space_type: SpaceType, region_type: RegionType) -> Self {
        Self {
            idname: idname.to_string(),
            space_type,
            region_type,
        }
    }
}

/// Runs an operator when a matching drag is dropped.
#[derive(Clone)]
pub struct Dropbox {
    /// Operator to call.
    pub idname: String,
    pub poll: DropPollFn,
    pub copy: Option<DropCopyFn>,
    pub cancel: Option<DropCancelFn>,
    /// Called when a drag starts while this dropbox's region is visible.
    pub on_drag_start: Option<DragStartFn>,
    pub opcontext: OperatorContext,
    pub properties: OperatorProperties,
}

impl fmt::Debug for Dropbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropbox")
            .field("idname", &self.idname)
            .field("opcontext", &self.opcontext)
            .finish_non_exhaustive()
    }
}

impl Dropbox {
    pub fn new(idname: &str, poll: DropPollFn) -> Self {
        Self {
            idname: idname.to_string(),
            poll,
            copy: None,
            cancel: None,
            on_drag_start: None,
            opcontext: OperatorContext::InvokeDefault,
            properties: OperatorProperties::new(),
        }
    }

    pub fn with_copy(mut self, copy: DropCopyFn) -> Self {
        self.copy = Some(copy);
        self
    }

    pub fn with_cancel(mut self, cancel: DropCancelFn) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_drag_start(mut self, on_drag_start: DragStartFn) -> Self {
        self.on_drag_start = Some(on_drag_start);
        self
    }

    pub fn with_opcontext(mut self, opcontext: OperatorContext) -> Self {
        self.opcontext = opcontext;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DropboxMap {
    pub key: DropboxMapKey,
    pub dropboxes: Vec<Dropbox>,
}

/// Every dropbox map of a window manager.
#[derive(Debug, Default)]
pub struct DropboxRegistry {
    maps: Vec<DropboxMap>,
}

impl DropboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map for the identity, created empty on first use.
    pub fn ensure(
        &mut self,
        idname: &str,
        space_type: SpaceType,
        region_type: RegionType,
    ) -> &mut DropboxMap {
        let key = DropboxMapKey::new(idname, space_type, region_type);
        match self.maps.iter().position(|m| m.key == key) {
            Some(index) => &mut self.maps[index],
            None => {
                self.maps.push(DropboxMap {
                    key,
                    dropboxes: Vec::new(),
                });
                let last = self.maps.len() - 1;
                &mut self.maps[last]
            }
        }
    }

    pub fn add(&mut self, key: &DropboxMapKey, dropbox: Dropbox) {
        self.ensure(&key.idname, key.space_type, key.region_type)
            .dropboxes
            .push(dropbox);
    }

    pub fn find(&self, key: &DropboxMapKey) -> Option<&DropboxMap> {
        self.maps.iter().find(|m| m.key == *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DropboxMap> {
        self.maps.iter()
    }
}

/// Key of the dropbox map every window handles.
pub fn window_dropbox_map() -> DropboxMapKey {
    DropboxMapKey::new("Window", SpaceType::Empty, RegionType::Window)
}

/// Dropping a file path anywhere in a window opens it.
pub fn register_builtin_dropboxes(registry: &mut DropboxRegistry) {
    let dropbox = Dropbox::new(
        "wm.drop_path",
        Rc::new(|_, drag, _| matches!(drag.data, DragData::Path(_))),
    )
    .with_copy(Rc::new(|drag, props| {
        if let DragData::Path(path) = &drag.data {
            props.set("filepath", path.as_str());
        }
    }))
    .with_opcontext(OperatorContext::ExecDefault);
    registry.add(&window_dropbox_map(), dropbox);
}

/// Which (editor, region) pairs are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropVisibility {
    tags: [[bool; RegionType::ALL.len()]; SpaceType::ALL.len()],
}

impl DropVisibility {
    /// Visible regions of every window. Window-level maps count as visible.
    pub fn from_windows<'w>(windows: impl IntoIterator<Item = &'w Window>) -> Self {
        let mut tags = [[false; RegionType::ALL.len()]; SpaceType::ALL.len()];
        for win in windows {
            tags[SpaceType::Empty.index()][RegionType::Window.index()] = true;
            for area in &win.areas {
                for region in area.regions.iter().filter(|r| r.visible) {
                    tags[area.space_type.index()][region.region_type.index()] = true;
                }
            }
        }
        Self { tags }
    }

    pub fn is_visible(&self, space_type: SpaceType, region_type: RegionType) -> bool {
        self.tags[space_type.index()][region_type.index()]
    }
}

/// Start dragging: the window manager takes the drag, and dropboxes of
/// visible regions get to prepare for it.
pub fn start_drag(ctx: &mut Context<'_>, mut drag: Drag) {
    let visibility = DropVisibility::from_windows(ctx.wm().windows.iter());
    let starters: Vec<DragStartFn> = ctx
        .wm()
        .dropboxes
        .iter()
        .filter(|m| visibility.is_visible(m.key.space_type, m.key.region_type))
        .flat_map(|m| m.dropboxes.iter())
        .filter_map(|d| d.on_drag_start.clone())
        .collect();
    for on_drag_start in starters {
        on_drag_start(ctx, &mut drag);
    }

    tracing::debug!("Drag started: {}", drag.data.kind_name());
    ctx.wm_mut().drags.push(drag);
}

/// Operator of the first dropbox in `maps` accepting `drag`.
pub fn active_dropbox(
    ctx: &Context<'_>,
    maps: &[DropboxMapKey],
    drag: &Drag,
    event: &Event,
) -> Option<String> {
    maps.iter()
        .filter_map(|key| ctx.wm().dropboxes.find(key))
        .flat_map(|m| m.dropboxes.iter())
        .find(|d| (d.poll)(ctx, drag, event))
        .map(|d| d.idname.clone())
}

/// Offer the drags of a `Drop` event to the dropboxes of `map`.
///
/// The first dropbox accepting a drag runs its operator with an event
/// carrying only that drag; the drop is then over.
pub(crate) fn handle_drop(
    ctx: &mut Context<'_>,
    map: &DropboxMapKey,
    event: &Event,
) -> HandlerAction {
    let Some(drags) = event.customdata.drags() else {
        return HandlerAction::CONTINUE;
    };
    let Some(dropboxes) = ctx.wm().dropboxes.find(map).map(|m| m.dropboxes.clone()) else {
        return HandlerAction::CONTINUE;
    };

    for drop in &dropboxes {
        for drag in drags {
            if !(drop.poll)(ctx, drag, event) {
                continue;
            }
            let mut properties = drop.properties.clone();
            if let Some(copy) = &drop.copy {
                copy(drag, &mut properties);
            }
            let Some(ot) = ctx.wm().operators.find_or_warn(&drop.idname) else {
                continue;
            };

            let mut single = event.clone();
            single.customdata = crate::event::EventCustomData::Drags(vec![drag.clone()]);
            tracing::debug!("Dropping {} on '{}'", drag.data.kind_name(), drop.idname);
            let retval =
                operator_name_call_ptr(ctx, &ot, drop.opcontext, Some(&properties), Some(&single));
            if retval.contains(OperatorResult::CANCELLED) {
                if let Some(cancel) = &drop.cancel {
                    cancel(ctx, drag);
                }
            }
            return HandlerAction::BREAK;
        }
    }
    HandlerAction::CONTINUE
}
