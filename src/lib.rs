//! Kraken window manager core
//!
//! Event queues, keymaps, handler stacks, operator dispatch, the message bus,
//! notifiers, drag and drop, timers and tooltips of the Kraken DCC. Everything
//! hangs off a single [`WindowManager`] session object that is passed by
//! reference to whatever needs it.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod dragdrop;
pub mod event;
pub mod handler;
pub mod id;
pub mod keymap;
pub mod msgbus;
pub mod notifier;
pub mod operator;
pub mod properties;
pub mod timer;
pub mod tooltip;
pub mod tracing;
pub mod wm;

// Re-export commonly used types
pub use config::WmConfig;
pub use event::{Event, EventType, KeyValue};
pub use msgbus::MsgBus;
pub use operator::OperatorResult;
pub use properties::OperatorProperties;
pub use wm::{Context, WindowManager};
