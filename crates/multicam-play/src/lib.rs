#![forbid(unsafe_code)]

//! Multi-angle playback synchronization.
//!
//! A [`PlaybackSession`] binds one media element per configured camera and
//! keeps every angle at the same playback position:
//!
//! - the **attachment manager** drives an adaptive-stream engine per slot,
//!   classifies streams as live or finite and keeps background angles at the
//!   lowest quality level;
//! - the **continuity controller** carries the position of the outgoing
//!   angle over to the incoming one on every switch;
//! - the **drift corrector** runs on a fixed cadence and pulls background
//!   angles back towards the active one.
//!
//! The media element and the stream engine are collaborators reached
//! through the [`MediaElement`] and [`StreamEngine`] traits.

mod error;
mod events;
mod types;

pub mod impls;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::SyncError;
pub use events::{ElementEvent, EngineEvent};
pub use impls::{
    config::{StreamEngineConfig, SyncConfig},
    continuity::ContinuityOutcome,
    drift::DriftReport,
    session::PlaybackSession,
};
pub use multicam_events::{AttachKind, Event, EventBus, SessionEvent};
pub use traits::{
    element::{HLS_MIME_TYPE, MediaElement},
    engine::{EngineFactory, EngineLoader, StreamEngine},
};
pub use types::{AttachMode, Liveness, PendingSeek, QualityLevel, ReadyState, SlotId, SlotStatus};
