//! Window-manager timers
//!
//! Timers are polled once per main-loop iteration. A due timer attached to a
//! window enqueues a `TIMER*` event on that window whose payload references
//! the timer; the timer itself stays owned here.

use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::event::EventType;
use crate::wm::WindowId;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// One registered timer.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Window receiving the timer events; `None` for manager-level timers.
    pub window: Option<WindowId>,
    /// Event type delivered, one of the `TIMER*` types.
    pub event_type: EventType,
    pub step: Duration,
    /// Total time since the timer started, advanced on each firing.
    pub duration: Duration,
    /// Time between the last two firings.
    pub delta: Duration,
    /// Last firing.
    pub ltime: Instant,
    /// Next firing; `None` once the next step lies past what `Instant` can
    /// represent, and the timer never fires again.
    pub ntime: Option<Instant>,
    /// Start time.
    pub stime: Instant,
    /// Sleeping timers are skipped.
    pub sleep: bool,
}

/// A timer that came due in [`TimerManager::fire_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub id: TimerId,
    pub window: Option<WindowId>,
    pub event_type: EventType,
}

/// Owns every timer of a window manager.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, Timer>,
    /// Insertion order, so firing order is deterministic.
    order: Vec<TimerId>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a repeating timer firing every `step`, starting at `now`.
    pub fn add(
        &mut self,
        window: Option<WindowId>,
        event_type: EventType,
        step: Duration,
        now: Instant,
    ) -> TimerId {
        debug_assert!(event_type.is_timer(), "timer event type expected");
        let id = self.timers.insert(Timer {
            window,
            event_type,
            step,
            duration: Duration::ZERO,
            delta: Duration::ZERO,
            ltime: now,
            ntime: now.checked_add(step),
            stime: now,
            sleep: false,
        });
        self.order.push(id);
        tracing::debug!(?id, ?event_type, ?step, "timer added");
        id
    }

    /// Remove a timer. Unknown ids are ignored.
    pub fn remove(&mut self, id: TimerId) -> Option<Timer> {
        let timer = self.timers.remove(id)?;
        self.order.retain(|t| *t != id);
        Some(timer)
    }

    /// Remove every timer attached to a window (window closed).
    pub fn remove_for_window(&mut self, window: WindowId) {
        let timers = &mut self.timers;
        self.order.retain(|id| {
            if timers.get(*id).is_some_and(|t| t.window == Some(window)) {
                timers.remove(*id);
                false
            } else {
                true
            }
        });
    }

    pub fn set_sleep(&mut self, id: TimerId, sleep: bool) {
        if let Some(timer) = self.timers.get_mut(id) {
            timer.sleep = sleep;
        }
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer> {
        self.timers.get(id)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest next firing among awake timers.
    pub fn next_due(&self) -> Option<Instant> {
        self.timers
            .values()
            .filter(|t| !t.sleep)
            .filter_map(|t| t.ntime)
            .min()
    }

    /// Advance every due timer and report which ones fired.
    ///
    /// The next firing time is kept on the `start + n * step` grid so a late
    /// poll does not accumulate drift.
    pub fn fire_due(&mut self, now: Instant) -> Vec<TimerFired> {
        let mut fired = Vec::new();
        for id in &self.order {
            let Some(timer) = self.timers.get_mut(*id) else {
                continue;
            };
            match timer.ntime {
                Some(ntime) if !timer.sleep && now >= ntime => {}
                _ => continue,
            }

            timer.delta = now.saturating_duration_since(timer.ltime);
            timer.duration += timer.delta;
            timer.ltime = now;

            let step = timer.step.as_nanos();
            let elapsed = now.saturating_duration_since(timer.stime).as_nanos();
            timer.ntime = if step > 0 {
                let steps = elapsed / step + 1;
                step.checked_mul(steps)
                    .and_then(|offset| u64::try_from(offset).ok())
                    .and_then(|offset| timer.stime.checked_add(Duration::from_nanos(offset)))
            } else {
                Some(now)
            };
            if timer.ntime.is_none() {
                tracing::warn!(?id, step = ?timer.step, "timer step out of range");
            }

            fired.push(TimerFired {
                id: *id,
                window: timer.window,
                event_type: timer.event_type,
            });
        }
        fired
    }
}
