//! Per-window FIFO of pending events

use std::collections::VecDeque;

use super::event::Event;
use super::types::EventType;

/// Pending events of one window, consumed front to back.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
    /// Keep the most recent skipped cursor position as an
    /// `InbetweenMouseMove` instead of dropping it when moves coalesce.
    pub keep_inbetween_moves: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Append a cursor move, coalescing with a queued unconsumed move.
    ///
    /// `state_pos` is the window's last known cursor position, used as the
    /// previous position when there is no queued event to take it from.
    /// The coalesced event keeps the previous position of the move it
    /// replaces, so its delta spans the whole unconsumed motion.
    pub fn push_mousemove(&mut self, mut event: Event, state_pos: (i32, i32)) -> &Event {
        debug_assert_eq!(event.event_type, EventType::MouseMove);

        let len = self.events.len();
        match self.events.back_mut() {
            Some(last) if last.event_type == EventType::MouseMove => {
                if self.keep_inbetween_moves {
                    last.event_type = EventType::InbetweenMouseMove;
                    event.prev_mouse_pos = last.mouse_pos;
                    // Only the most recent skipped position is kept.
                    if len >= 2 && self.events[len - 2].event_type == EventType::InbetweenMouseMove
                    {
                        if let Some(dropped) = self.events.remove(len - 2) {
                            if let Some(kept) = self.events.back_mut() {
                                kept.prev_mouse_pos = dropped.prev_mouse_pos;
                            }
                        }
                    }
                    self.events.push_back(event);
                } else {
                    event.prev_mouse_pos = last.prev_mouse_pos;
                    *last = event;
                }
            }
            Some(last) => {
                event.prev_mouse_pos = last.mouse_pos;
                self.events.push_back(event);
            }
            None => {
                event.prev_mouse_pos = state_pos;
                self.events.push_back(event);
            }
        }

        // Non-empty: an event was pushed or replaced above.
        &self.events[self.events.len() - 1]
    }

    /// Append a trackpad gesture, accumulating the delta of a queued gesture
    /// of the same type.
    pub fn push_trackpad(&mut self, event: Event, delta: (i32, i32)) -> &Event {
        let (mut dx, mut dy) = delta;
        if let Some(last) = self.events.back() {
            if last.event_type == event.event_type {
                dx += last.mouse_pos.0 - last.prev_mouse_pos.0;
                dy += last.mouse_pos.1 - last.prev_mouse_pos.1;
                self.events.pop_back();
            }
        }

        let mut event = event;
        event.prev_mouse_pos = (event.mouse_pos.0 - dx, event.mouse_pos.1 - dy);
        self.events.push_back(event);
        &self.events[self.events.len() - 1]
    }

    /// Remove and return the oldest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn front(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn back(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Event> {
        self.events.iter_mut()
    }

    /// Drop every pending event (window closing, screen missing).
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyValue;

    fn mousemove(x: i32, y: i32) -> Event {
        Event::new(EventType::MouseMove, KeyValue::Nothing).with_mouse_pos(x, y)
    }

    #[test]
    fn test_mousemove_coalesces_in_place() {
        let mut queue = EventQueue::new();
        queue.push_mousemove(mousemove(10, 10), (0, 0));
        queue.push_mousemove(mousemove(20, 25), (0, 0));

        assert_eq!(queue.len(), 1);
        let event = queue.front().unwrap();
        assert_eq!(event.event_type, EventType::MouseMove);
        assert_eq!(event.mouse_pos, (20, 25));
        assert_eq!(event.prev_mouse_pos, (0, 0));
    }

    #[test]
    fn test_mousemove_after_other_event_appends() {
        let mut queue = EventQueue::new();
        queue.push(Event::new(EventType::A, KeyValue::Press).with_mouse_pos(5, 5));
        queue.push_mousemove(mousemove(8, 9), (0, 0));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.back().unwrap().prev_mouse_pos, (5, 5));
    }

    #[test]
    fn test_inbetween_keeps_only_latest_skipped_position() {
        let mut queue = EventQueue::new();
        queue.keep_inbetween_moves = true;
        queue.push_mousemove(mousemove(1, 1), (0, 0));
        queue.push_mousemove(mousemove(2, 2), (0, 0));
        queue.push_mousemove(mousemove(3, 3), (0, 0));

        let types: Vec<_> = queue.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![EventType::InbetweenMouseMove, EventType::MouseMove]
        );
        assert_eq!(queue.front().unwrap().mouse_pos, (2, 2));
        assert_eq!(queue.back().unwrap().mouse_pos, (3, 3));
    }

    #[test]
    fn test_trackpad_accumulates_delta() {
        let mut queue = EventQueue::new();
        let pan = |x, y| Event::new(EventType::MousePan, KeyValue::Nothing).with_mouse_pos(x, y);
        queue.push_trackpad(pan(100, 100), (3, 4));
        queue.push_trackpad(pan(100, 100), (2, -1));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front().unwrap().motion_delta(), (5, 3));
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new();
        queue.push(Event::new(EventType::A, KeyValue::Press));
        queue.push(Event::new(EventType::B, KeyValue::Press));
        assert_eq!(queue.pop().unwrap().event_type, EventType::A);
        assert_eq!(queue.pop().unwrap().event_type, EventType::B);
        assert!(queue.pop().is_none());
    }
}
