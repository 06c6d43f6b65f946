#![forbid(unsafe_code)]

//! # Multicam
//!
//! Facade crate for synchronized multi-angle playback.
//!
//! ## Quick start
//!
//! ```ignore
//! use multicam::prelude::*;
//!
//! let cameras = build_camera_list(&default_camera_files());
//! let resolver = SourceResolver::s3("my-bucket", "sa-east-1")?;
//! let session = PlaybackSession::new(cameras, elements, loader, &resolver, SyncConfig::default())?;
//! session.start().await?;
//! session.select(3)?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod events {
    pub use multicam_events::*;
}

pub mod play {
    pub use multicam_play::*;
}

pub mod sources {
    pub use multicam_sources::*;
}

// ── Logging ─────────────────────────────────────────────────────────────

mod logging;

pub use logging::init_tracing;

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use multicam_events::{AttachKind, Event, SessionEvent};
    pub use multicam_play::{
        AttachMode, ContinuityOutcome, DriftReport, ElementEvent, EngineEvent, EngineFactory,
        EngineLoader, Liveness, MediaElement, PendingSeek, PlaybackSession, QualityLevel,
        ReadyState, SlotId, SlotStatus, StreamEngine, StreamEngineConfig, SyncConfig, SyncError,
    };
    pub use multicam_sources::{
        Camera, CameraFile, CameraSources, SourceError, SourceResolver, build_camera_list,
        default_camera_files, slug_from_filename,
    };
}
