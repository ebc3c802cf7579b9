//! Tooltips
//!
//! A window has at most one tooltip. It starts as a timer; when the timer
//! fires the init callback builds the tooltip region. Init may ask for
//! another pass (e.g. a longer description after a further delay) by
//! changing the pass number.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::event::EventType;
use crate::timer::TimerId;
use crate::wm::{AreaId, Context, Rect, RegionId, WindowId};

/// The tooltip that is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipRegion {
    pub text: String,
    pub rect: Rect,
}

/// In/out parameters of a tooltip init call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TooltipPass {
    pub pass: i32,
    /// Delay before the next pass, when `pass` changes.
    pub delay: Duration,
    /// Any event other than a timer closes the tooltip.
    pub exit_on_event: bool,
}

/// Build the tooltip for `region_from`; `None` means nothing to show.
pub type TooltipInitFn =
    Rc<dyn Fn(&mut Context<'_>, Option<RegionId>, &mut TooltipPass) -> Option<TooltipRegion>>;

pub struct TooltipState {
    pub area_from: Option<AreaId>,
    pub region_from: Option<RegionId>,
    pub init: TooltipInitFn,
    pub timer: Option<TimerId>,
    pub region: Option<TooltipRegion>,
    pub pass: i32,
    pub exit_on_event: bool,
    /// Cursor position when the tooltip opened.
    pub event_xy: (i32, i32),
}

impl fmt::Debug for TooltipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipState")
            .field("area_from", &self.area_from)
            .field("region_from", &self.region_from)
            .field("timer", &self.timer)
            .field("region", &self.region)
            .field("pass", &self.pass)
            .field("exit_on_event", &self.exit_on_event)
            .field("event_xy", &self.event_xy)
            .finish()
    }
}

impl TooltipState {
    fn new(area_from: Option<AreaId>, region_from: Option<RegionId>, init: TooltipInitFn) -> Self {
        Self {
            area_from,
            region_from,
            init,
            timer: None,
            region: None,
            pass: 0,
            exit_on_event: false,
            event_xy: (0, 0),
        }
    }
}

fn state_mut<'c>(ctx: &'c mut Context<'_>, win: WindowId) -> Option<&'c mut TooltipState> {
    ctx.wm_mut().window_mut(win)?.tooltip.as_mut()
}

/// Stop a pending tooltip timer; an open tooltip stays.
pub fn timer_clear(ctx: &mut Context<'_>, win: WindowId) {
    let Some(timer) = state_mut(ctx, win).and_then(|s| s.timer.take()) else {
        return;
    };
    ctx.wm_mut().remove_timer(timer);
}

/// Open a tooltip for `region` after `delay`.
pub fn timer_init_ex(
    ctx: &mut Context<'_>,
    win: WindowId,
    area: Option<AreaId>,
    region: Option<RegionId>,
    init: TooltipInitFn,
    delay: Duration,
    now: Instant,
) {
    timer_clear(ctx, win);
    let timer = ctx.wm_mut().add_timer(Some(win), EventType::Timer, delay, now);
    let Some(window) = ctx.wm_mut().window_mut(win) else {
        ctx.wm_mut().remove_timer(timer);
        return;
    };
    let state = window
        .tooltip
        .get_or_insert_with(|| TooltipState::new(area, region, init.clone()));
    state.area_from = area;
    state.region_from = region;
    state.init = init;
    state.timer = Some(timer);
}

/// [`timer_init_ex`] with the configured tooltip delay.
pub fn timer_init(
    ctx: &mut Context<'_>,
    win: WindowId,
    area: Option<AreaId>,
    region: Option<RegionId>,
    init: TooltipInitFn,
    now: Instant,
) {
    let delay = Duration::from_secs_f64(ctx.wm().config.tooltip_delay_secs.max(0.0));
    timer_init_ex(ctx, win, area, region, init, delay, now);
}

/// Open a tooltip right away.
pub fn immediate_init(
    ctx: &mut Context<'_>,
    win: WindowId,
    area: Option<AreaId>,
    region: Option<RegionId>,
    init: TooltipInitFn,
    now: Instant,
) {
    timer_clear(ctx, win);
    let Some(window) = ctx.wm_mut().window_mut(win) else {
        return;
    };
    let state = window
        .tooltip
        .get_or_insert_with(|| TooltipState::new(area, region, init.clone()));
    state.area_from = area;
    state.region_from = region;
    state.init = init;
    self::init(ctx, win, now);
}

/// Run the init callback in the area and region the tooltip came from.
pub fn init(ctx: &mut Context<'_>, win: WindowId, now: Instant) {
    timer_clear(ctx, win);
    let Some(state) = state_mut(ctx, win) else {
        return;
    };
    state.region = None;
    let pass_prev = state.pass;
    let init = state.init.clone();
    let (area_from, region_from) = (state.area_from, state.region_from);
    let mut pass = TooltipPass {
        pass: state.pass,
        delay: Duration::ZERO,
        exit_on_event: state.exit_on_event,
    };

    let (prev_window, prev_area, prev_region) = (ctx.window_id(), ctx.area_id(), ctx.region_id());
    ctx.set_window(Some(win));
    ctx.set_area(area_from);
    ctx.set_region(region_from);
    let region = init(ctx, region_from, &mut pass);
    ctx.set_window(prev_window);
    ctx.set_area(prev_area);
    ctx.set_region(prev_region);

    let event_xy = ctx
        .wm()
        .window(win)
        .map(|w| w.input.mouse_pos())
        .unwrap_or_default();
    // A new pass gets its own timer.
    let timer = (pass.pass != pass_prev)
        .then(|| ctx.wm_mut().add_timer(Some(win), EventType::Timer, pass.delay, now));

    let Some(state) = state_mut(ctx, win) else {
        if let Some(timer) = timer {
            ctx.wm_mut().remove_timer(timer);
        }
        return;
    };
    state.region = region;
    state.pass = pass.pass;
    state.exit_on_event = pass.exit_on_event;
    state.event_xy = event_xy;
    state.timer = timer;

    if state.region.is_none() {
        clear(ctx, win, now);
    }
}

/// Close the tooltip and forget it.
pub fn clear(ctx: &mut Context<'_>, win: WindowId, now: Instant) {
    timer_clear(ctx, win);
    let Some(state) = ctx.wm_mut().window_mut(win).and_then(|w| w.tooltip.take()) else {
        return;
    };
    if state.region.is_some() {
        tracing::trace!("Tooltip closed in window {}", win);
        ctx.wm_mut().tooltip_time_closed = Some(now);
    }
}

/// Rebuild an open tooltip, e.g. after the data it shows changed.
pub fn refresh(ctx: &mut Context<'_>, win: WindowId, now: Instant) {
    timer_clear(ctx, win);
    let Some(state) = state_mut(ctx, win) else {
        return;
    };
    state.region = None;
    init(ctx, win, now);
}
