//! Input events
//!
//! The event vocabulary (`EventType`, `KeyValue`, counted modifiers), the
//! `Event` snapshot, per-window queues and the conversion from platform input.

#[allow(clippy::module_inception)]
mod event;
pub mod ingest;
mod queue;
mod types;

pub use event::{Event, EventCustomData, NdofMotionData, TabletData, TabletTool};
pub use ingest::{
    add_platform_event, drag_test, drag_test_with_delta, drag_threshold, is_double_click,
    InputState, PlatformEvent, TabletSample, TrackpadKind,
};
pub use queue::EventQueue;
pub use types::{EventModifiers, EventType, EventTypeItem, KeyValue, ModState, EVENT_TYPE_ITEMS};
