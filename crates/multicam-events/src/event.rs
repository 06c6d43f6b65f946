#![forbid(unsafe_code)]

use crate::SessionEvent;

/// Unified event published on the [`EventBus`](crate::EventBus).
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// Playback session event.
    Session(SessionEvent),
}

impl From<SessionEvent> for Event {
    fn from(e: SessionEvent) -> Self {
        Self::Session(e)
    }
}
