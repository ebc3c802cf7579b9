//! Tooltip tests: delayed open, passes, and closing on input

mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use common::{Harness, FRAME};
use kraken_wm::tooltip::{self, TooltipInitFn, TooltipRegion};
use kraken_wm::wm::Rect;
use kraken_wm::EventType;

fn tip(text: &str) -> TooltipRegion {
    TooltipRegion {
        text: text.to_string(),
        rect: Rect::new(100, 80, 220, 96),
    }
}

/// Init callback showing `text`, closing on input when `exit_on_event`.
fn simple_init(text: &'static str, exit_on_event: bool) -> TooltipInitFn {
    Rc::new(move |_, _, pass| {
        pass.exit_on_event = exit_on_event;
        Some(tip(text))
    })
}

fn schedule(h: &mut Harness, init: TooltipInitFn) {
    let (win, area, region, now) = (h.win, h.area, h.region, h.now);
    let mut ctx = h.wm.context(win);
    tooltip::timer_init(&mut ctx, win, Some(area), Some(region), init, now);
}

fn run_for(h: &mut Harness, duration: Duration) {
    let frames = duration.as_millis() / FRAME.as_millis() + 1;
    for _ in 0..frames {
        h.step();
    }
}

fn shown(h: &Harness) -> Option<String> {
    h.wm.window(h.win)?
        .tooltip
        .as_ref()?
        .region
        .as_ref()
        .map(|r| r.text.clone())
}

#[test]
fn test_tooltip_opens_after_delay() {
    let mut h = Harness::new();
    h.move_to(100, 100);
    schedule(&mut h, simple_init("Box Select", false));

    run_for(&mut h, Duration::from_millis(200));
    assert_eq!(shown(&h), None);
    assert!(h.wm.window(h.win).unwrap().tooltip.is_some(), "still pending");

    run_for(&mut h, Duration::from_millis(400));
    assert_eq!(shown(&h).as_deref(), Some("Box Select"));
    assert!(h.wm.timers.is_empty(), "single pass leaves no timer");
}

#[test]
fn test_init_runs_in_origin_region() {
    let mut h = Harness::new();
    let seen = Rc::new(Cell::new(None));
    let record = seen.clone();
    let init: TooltipInitFn = Rc::new(move |ctx, region_from, _| {
        record.set(Some((ctx.region_id(), region_from)));
        Some(tip("here"))
    });
    schedule(&mut h, init);
    run_for(&mut h, Duration::from_millis(600));

    assert_eq!(seen.get(), Some((Some(h.region), Some(h.region))));
}

#[test]
fn test_nothing_to_show_forgets_tooltip() {
    let mut h = Harness::new();
    schedule(&mut h, Rc::new(|_, _, _| None));
    run_for(&mut h, Duration::from_millis(600));

    assert!(h.wm.window(h.win).unwrap().tooltip.is_none());
    assert_eq!(h.wm.tooltip_time_closed, None, "nothing was on screen");
}

#[test]
fn test_second_pass_replaces_text() {
    let mut h = Harness::new();
    let init: TooltipInitFn = Rc::new(|_, _, pass| {
        if pass.pass == 0 {
            pass.pass = 1;
            pass.delay = Duration::from_millis(300);
            Some(tip("Box Select"))
        } else {
            Some(tip("Box Select\nSelect items using box selection"))
        }
    });
    schedule(&mut h, init);

    run_for(&mut h, Duration::from_millis(600));
    assert_eq!(shown(&h).as_deref(), Some("Box Select"));
    assert_eq!(h.wm.timers.len(), 1, "next pass is scheduled");

    run_for(&mut h, Duration::from_millis(400));
    assert_eq!(
        shown(&h).as_deref(),
        Some("Box Select\nSelect items using box selection")
    );
    assert!(h.wm.timers.is_empty());
}

#[test]
fn test_small_motion_keeps_tooltip_open() {
    let mut h = Harness::new();
    h.move_to(100, 100);
    schedule(&mut h, simple_init("Box Select", true));
    run_for(&mut h, Duration::from_millis(600));
    assert!(shown(&h).is_some());

    h.move_to(102, 101);
    assert!(shown(&h).is_some(), "within the move threshold");

    h.move_to(110, 100);
    assert!(h.wm.window(h.win).unwrap().tooltip.is_none());
    assert_eq!(h.wm.tooltip_time_closed, Some(h.now));
}

#[test]
fn test_key_press_closes_tooltip() {
    let mut h = Harness::new();
    h.move_to(100, 100);
    schedule(&mut h, simple_init("Box Select", true));
    run_for(&mut h, Duration::from_millis(600));

    h.press(EventType::X);
    assert!(h.wm.window(h.win).unwrap().tooltip.is_none());
    assert!(h.wm.tooltip_time_closed.is_some());
}

#[test]
fn test_tooltip_without_exit_on_event_ignores_input() {
    let mut h = Harness::new();
    h.move_to(100, 100);
    schedule(&mut h, simple_init("Box Select", false));
    run_for(&mut h, Duration::from_millis(600));

    h.move_to(300, 300);
    h.tap(EventType::X);
    assert_eq!(shown(&h).as_deref(), Some("Box Select"));

    let (win, now) = (h.win, h.now);
    let mut ctx = h.wm.context(win);
    tooltip::clear(&mut ctx, win, now);
    assert_eq!(h.wm.tooltip_time_closed, Some(now));
}
