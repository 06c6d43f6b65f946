#![forbid(unsafe_code)]

//! Unified event bus for multicam playback sessions.

mod bus;
mod event;
mod session;

pub use bus::EventBus;
pub use event::Event;
pub use session::{AttachKind, SessionEvent};
