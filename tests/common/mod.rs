//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use kraken_wm::event::PlatformEvent;
use kraken_wm::msgbus::MsgNotifyFn;
use kraken_wm::wm::{AreaId, Rect, RegionId, RegionType, SpaceType, WindowId};
use kraken_wm::{EventType, WindowManager};

/// Time between two simulated main-loop iterations.
pub const FRAME: Duration = Duration::from_millis(16);

/// A window manager with one 800x600 window filled by a 3D View area.
pub struct Harness {
    pub wm: WindowManager,
    pub win: WindowId,
    pub area: AreaId,
    pub region: RegionId,
    pub now: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_wm(WindowManager::with_defaults())
    }

    pub fn with_wm(mut wm: WindowManager) -> Self {
        let win = wm.add_window((800, 600));
        let area = wm
            .add_area(win, SpaceType::View3D, Rect::new(0, 0, 800, 600))
            .expect("window exists");
        let region = wm
            .add_region(win, area, RegionType::Window, Rect::new(0, 0, 800, 600))
            .expect("area exists");
        Self {
            wm,
            win,
            area,
            region,
            now: Instant::now(),
        }
    }

    pub fn send(&mut self, platform: PlatformEvent) {
        self.wm.add_platform_event(self.win, platform, self.now);
    }

    /// Advance the clock one frame and run a main-loop iteration.
    pub fn step(&mut self) -> bool {
        self.now += FRAME;
        self.wm.step(self.now)
    }

    pub fn wait(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.send(PlatformEvent::CursorMove { x, y, tablet: None });
        self.step();
    }

    pub fn press(&mut self, key: EventType) {
        self.send(input(key, true));
        self.step();
    }

    pub fn release(&mut self, key: EventType) {
        self.send(input(key, false));
        self.step();
    }

    pub fn tap(&mut self, key: EventType) {
        self.press(key);
        self.release(key);
    }

    pub fn queue_len(&self) -> usize {
        self.wm.window(self.win).map_or(0, |w| w.queue.len())
    }
}

/// Press or release of a mouse button or keyboard key.
pub fn input(key: EventType, pressed: bool) -> PlatformEvent {
    if key.is_mouse_button() {
        PlatformEvent::Button {
            button: key,
            pressed,
            tablet: None,
        }
    } else {
        PlatformEvent::Key {
            key,
            pressed,
            is_repeat: false,
            utf8: None,
        }
    }
}

/// Notify callback counting its calls.
pub fn counting_notify() -> (Rc<Cell<u32>>, MsgNotifyFn) {
    let count = Rc::new(Cell::new(0));
    let counter = count.clone();
    let notify: MsgNotifyFn = Rc::new(move |_, _, _| counter.set(counter.get() + 1));
    (count, notify)
}

/// Shared log for callbacks to record into.
pub fn log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}
