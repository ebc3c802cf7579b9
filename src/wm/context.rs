//! Context: the window manager plus the window, area and region an
//! operation runs in.

use crate::event::Event;
use crate::notifier::NotifierRef;

use super::screen::{
    Area, AreaId, Region, RegionId, RegionType, SpaceType, Window, WindowId, Workspace,
};
use super::WindowManager;

/// Mutable access to the window manager, scoped to a window/area/region.
///
/// Handlers and operators receive a `Context`; changing its area or region
/// only changes where the next lookup happens, never the screen itself.
pub struct Context<'a> {
    wm: &'a mut WindowManager,
    window: Option<WindowId>,
    area: Option<AreaId>,
    region: Option<RegionId>,
}

impl<'a> Context<'a> {
    pub fn new(wm: &'a mut WindowManager) -> Self {
        Self {
            wm,
            window: None,
            area: None,
            region: None,
        }
    }

    pub fn for_window(wm: &'a mut WindowManager, window: WindowId) -> Self {
        Self {
            wm,
            window: Some(window),
            area: None,
            region: None,
        }
    }

    /// A shorter-lived context with the same scope.
    pub fn reborrow(&mut self) -> Context<'_> {
        Context {
            wm: &mut *self.wm,
            window: self.window,
            area: self.area,
            region: self.region,
        }
    }

    pub fn wm(&self) -> &WindowManager {
        &*self.wm
    }

    pub fn wm_mut(&mut self) -> &mut WindowManager {
        &mut *self.wm
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window
    }

    pub fn area_id(&self) -> Option<AreaId> {
        self.area
    }

    pub fn region_id(&self) -> Option<RegionId> {
        self.region
    }

    pub fn set_window(&mut self, window: Option<WindowId>) {
        self.window = window;
    }

    pub fn set_area(&mut self, area: Option<AreaId>) {
        self.area = area;
    }

    pub fn set_region(&mut self, region: Option<RegionId>) {
        self.region = region;
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.and_then(|id| self.wm.window(id))
    }

    pub fn window_mut(&mut self) -> Option<&mut Window> {
        let id = self.window?;
        self.wm.window_mut(id)
    }

    pub fn area(&self) -> Option<&Area> {
        let area = self.area?;
        self.window()?.area(area)
    }

    pub fn area_mut(&mut self) -> Option<&mut Area> {
        let area = self.area?;
        self.window_mut()?.area_mut(area)
    }

    pub fn region(&self) -> Option<&Region> {
        let region = self.region?;
        match self.area() {
            Some(area) => area.region(region),
            None => self.window()?.find_region(region).map(|(_, r)| r),
        }
    }

    pub fn region_mut(&mut self) -> Option<&mut Region> {
        let region = self.region?;
        let area = match self.area {
            Some(area) => area,
            None => self.window()?.find_region(region)?.0.id,
        };
        self.window_mut()?.region_mut(area, region)
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.window().map(|w| &w.workspace)
    }

    pub fn space_type(&self) -> Option<SpaceType> {
        self.area().map(|a| a.space_type)
    }

    pub fn region_type(&self) -> Option<RegionType> {
        self.region().map(|r| r.region_type)
    }

    /// Running input state of the context window.
    pub fn event_state(&self) -> Option<&Event> {
        self.window().map(|w| &w.input.event)
    }

    /// Queue a notifier for the context window.
    pub fn add_notifier(&mut self, type_code: u32, reference: NotifierRef) {
        let window = self.window;
        self.wm.notifiers.add(window, type_code, reference);
    }
}
