//! Screen model: windows split into areas, areas split into regions
//!
//! Only what event dispatch needs is modelled: rectangles for hit testing,
//! the editor (space) and region types that scope keymaps and dropboxes, and
//! the handler stacks at each level.

use std::fmt;
use std::rc::Rc;

use crate::event::{EventQueue, InputState};
use crate::handler::HandlerStack;
use crate::notifier::Notifier;
use crate::tooltip::TooltipState;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Window handle, unique per window manager.
    WindowId
);
id_type!(
    /// Area handle, unique per window manager.
    AreaId
);
id_type!(
    /// Region handle, unique per window manager.
    RegionId
);

/// Editor type of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpaceType {
    Empty,
    View3D,
    Graph,
    Outliner,
    Properties,
    File,
    Image,
    Info,
    Sequencer,
    Text,
    Action,
    Nla,
    Script,
    Node,
    Console,
    Preferences,
    Clip,
    Topbar,
    Statusbar,
    Spreadsheet,
}

impl SpaceType {
    pub const ALL: [SpaceType; 20] = [
        SpaceType::Empty,
        SpaceType::View3D,
        SpaceType::Graph,
        SpaceType::Outliner,
        SpaceType::Properties,
        SpaceType::File,
        SpaceType::Image,
        SpaceType::Info,
        SpaceType::Sequencer,
        SpaceType::Text,
        SpaceType::Action,
        SpaceType::Nla,
        SpaceType::Script,
        SpaceType::Node,
        SpaceType::Console,
        SpaceType::Preferences,
        SpaceType::Clip,
        SpaceType::Topbar,
        SpaceType::Statusbar,
        SpaceType::Spreadsheet,
    ];

    /// Stable identifier used in keyconfig files.
    pub fn id(self) -> &'static str {
        match self {
            SpaceType::Empty => "EMPTY",
            SpaceType::View3D => "VIEW_3D",
            SpaceType::Graph => "GRAPH_EDITOR",
            SpaceType::Outliner => "OUTLINER",
            SpaceType::Properties => "PROPERTIES",
            SpaceType::File => "FILE_BROWSER",
            SpaceType::Image => "IMAGE_EDITOR",
            SpaceType::Info => "INFO",
            SpaceType::Sequencer => "SEQUENCE_EDITOR",
            SpaceType::Text => "TEXT_EDITOR",
            SpaceType::Action => "DOPESHEET_EDITOR",
            SpaceType::Nla => "NLA_EDITOR",
            SpaceType::Script => "SCRIPTS_EDITOR",
            SpaceType::Node => "NODE_EDITOR",
            SpaceType::Console => "CONSOLE",
            SpaceType::Preferences => "PREFERENCES",
            SpaceType::Clip => "CLIP_EDITOR",
            SpaceType::Topbar => "TOPBAR",
            SpaceType::Statusbar => "STATUSBAR",
            SpaceType::Spreadsheet => "SPREADSHEET",
        }
    }

    pub fn from_id(id: &str) -> Option<SpaceType> {
        Self::ALL
            .into_iter()
            .find(|s| s.id().eq_ignore_ascii_case(id))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Type of a region inside an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionType {
    Window,
    Header,
    Channels,
    Temporary,
    Ui,
    Tools,
    ToolProps,
    Preview,
    Hud,
    NavBar,
    Execute,
    Footer,
    ToolHeader,
}

impl RegionType {
    pub const ALL: [RegionType; 13] = [
        RegionType::Window,
        RegionType::Header,
        RegionType::Channels,
        RegionType::Temporary,
        RegionType::Ui,
        RegionType::Tools,
        RegionType::ToolProps,
        RegionType::Preview,
        RegionType::Hud,
        RegionType::NavBar,
        RegionType::Execute,
        RegionType::Footer,
        RegionType::ToolHeader,
    ];

    pub fn id(self) -> &'static str {
        match self {
            RegionType::Window => "WINDOW",
            RegionType::Header => "HEADER",
            RegionType::Channels => "CHANNELS",
            RegionType::Temporary => "TEMPORARY",
            RegionType::Ui => "UI",
            RegionType::Tools => "TOOLS",
            RegionType::ToolProps => "TOOL_PROPS",
            RegionType::Preview => "PREVIEW",
            RegionType::Hud => "HUD",
            RegionType::NavBar => "NAVIGATION_BAR",
            RegionType::Execute => "EXECUTE",
            RegionType::Footer => "FOOTER",
            RegionType::ToolHeader => "TOOL_HEADER",
        }
    }

    pub fn from_id(id: &str) -> Option<RegionType> {
        Self::ALL
            .into_iter()
            .find(|r| r.id().eq_ignore_ascii_case(id))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Integer rectangle, bounds inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl Rect {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn contains(&self, (x, y): (i32, i32)) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    pub fn width(&self) -> i32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> i32 {
        self.ymax - self.ymin
    }
}

/// Region reaction to a notifier; returning `true` tags the region for redraw.
pub type RegionListener = Rc<dyn Fn(&Notifier) -> bool>;

pub struct Region {
    pub id: RegionId,
    pub region_type: RegionType,
    pub rect: Rect,
    pub visible: bool,
    pub handlers: HandlerStack,
    pub listener: Option<RegionListener>,
    /// Tagged for redraw.
    pub do_draw: bool,
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("region_type", &self.region_type)
            .field("rect", &self.rect)
            .field("visible", &self.visible)
            .field("handlers", &self.handlers.len())
            .field("do_draw", &self.do_draw)
            .finish()
    }
}

impl Region {
    pub fn new(id: RegionId, region_type: RegionType, rect: Rect) -> Self {
        Self {
            id,
            region_type,
            rect,
            visible: true,
            handlers: HandlerStack::new(),
            listener: None,
            do_draw: false,
        }
    }

    pub fn tag_redraw(&mut self) {
        self.do_draw = true;
    }
}

#[derive(Debug)]
pub struct Area {
    pub id: AreaId,
    pub space_type: SpaceType,
    pub rect: Rect,
    pub regions: Vec<Region>,
    pub handlers: HandlerStack,
}

impl Area {
    pub fn new(id: AreaId, space_type: SpaceType, rect: Rect) -> Self {
        Self {
            id,
            space_type,
            rect,
            regions: Vec::new(),
            handlers: HandlerStack::new(),
        }
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    pub fn region_by_type(&self, region_type: RegionType) -> Option<&Region> {
        self.regions.iter().find(|r| r.region_type == region_type)
    }

    /// First visible region under `pos`.
    pub fn region_at(&self, pos: (i32, i32)) -> Option<&Region> {
        self.regions
            .iter()
            .find(|r| r.visible && r.rect.contains(pos))
    }
}

/// Workspace settings relevant to keymap filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    pub name: String,
    /// Add-ons allowed to contribute keymaps when filtering is on.
    pub owner_ids: Vec<String>,
    pub use_filter_by_owner: bool,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Whether keymaps owned by `owner_id` may run in this workspace.
    pub fn owner_id_check(&self, owner_id: &str) -> bool {
        !self.use_filter_by_owner || self.owner_ids.iter().any(|o| o == owner_id)
    }
}

pub struct Window {
    pub id: WindowId,
    pub size: (i32, i32),
    pub workspace: Workspace,
    pub areas: Vec<Area>,
    /// Window-level handlers, consulted after areas and regions.
    pub handlers: HandlerStack,
    /// Modal handlers, consulted first.
    pub modalhandlers: HandlerStack,
    pub queue: EventQueue,
    pub input: InputState,
    pub tooltip: Option<TooltipState>,
    pub active: bool,

    /// A press happened and its release may still become a click.
    pub(crate) check_click: bool,
    /// A press happened and motion may still become a click-drag.
    pub(crate) check_drag: bool,
    /// Queue a mouse move after the queue drains (e.g. after NDOF motion).
    pub(crate) add_mousemove: bool,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("workspace", &self.workspace.name)
            .field("areas", &self.areas)
            .field("handlers", &self.handlers.len())
            .field("modalhandlers", &self.modalhandlers.len())
            .field("queue", &self.queue.len())
            .field("active", &self.active)
            .finish()
    }
}

impl Window {
    pub fn new(id: WindowId, size: (i32, i32)) -> Self {
        Self {
            id,
            size,
            workspace: Workspace::new("Layout"),
            areas: Vec::new(),
            handlers: HandlerStack::new(),
            modalhandlers: HandlerStack::new(),
            queue: EventQueue::new(),
            input: InputState::new(),
            tooltip: None,
            active: true,
            check_click: false,
            check_drag: false,
            add_mousemove: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.size.0, self.size.1)
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn area_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        self.areas.iter_mut().find(|a| a.id == id)
    }

    /// Area under `pos`.
    pub fn area_at(&self, pos: (i32, i32)) -> Option<&Area> {
        self.areas.iter().find(|a| a.rect.contains(pos))
    }

    pub fn region(&self, area: AreaId, region: RegionId) -> Option<&Region> {
        self.area(area).and_then(|a| a.region(region))
    }

    pub fn region_mut(&mut self, area: AreaId, region: RegionId) -> Option<&mut Region> {
        self.area_mut(area).and_then(|a| a.region_mut(region))
    }

    /// Area and region containing `region`, searching every area.
    pub fn find_region(&self, region: RegionId) -> Option<(&Area, &Region)> {
        self.areas
            .iter()
            .find_map(|a| a.region(region).map(|r| (a, r)))
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.areas.iter().flat_map(|a| a.regions.iter())
    }
}
