use url::Url;

use crate::error::SyncError;

/// Validated index of a camera slot.
///
/// Only the session hands these out, after checking the index against the
/// camera count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub(crate) fn checked(index: usize, count: usize) -> Result<Self, SyncError> {
        if index < count {
            Ok(Self(index))
        } else {
            Err(SyncError::SlotOutOfRange { index, count })
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a slot plays an open-ended live feed or a finite recording.
///
/// `Unknown` moves to `Live` or `Finite` once per attachment and never
/// back; only a re-attach with a new source resets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Liveness {
    #[default]
    Unknown,
    Live,
    Finite,
}

impl Liveness {
    /// Record the manifest's classification. Returns `true` on the first
    /// classification only.
    pub(crate) fn classify(&mut self, live: bool) -> bool {
        if *self != Self::Unknown {
            return false;
        }
        *self = if live { Self::Live } else { Self::Finite };
        true
    }

    #[must_use]
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

/// Media element readiness, ordered like `HTMLMediaElement.readyState`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Quality level requested from a stream engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QualityLevel {
    /// Let the engine adapt freely.
    #[default]
    Auto,
    /// Pin a level, `0` being the lowest bitrate.
    Index(usize),
}

impl QualityLevel {
    pub const LOWEST: Self = Self::Index(0);
}

/// A deferred position correction waiting for its element to become
/// seek-ready.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSeek {
    pub position: f64,
    pub retries_left: u32,
}

impl PendingSeek {
    #[must_use]
    pub fn new(position: f64, retries: u32) -> Self {
        Self {
            position,
            retries_left: retries,
        }
    }
}

/// How a slot is currently bound to its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttachMode {
    /// Nothing requested yet, or the session was torn down.
    #[default]
    Detached,
    /// Waiting for the stream engine to load.
    Loading,
    /// The element plays the manifest natively.
    Native,
    /// A stream engine instance drives the element.
    Engine,
    /// Source assigned directly as a last resort.
    Fallback,
    /// The engine failed fatally; dark until the next attach.
    Failed,
}

/// Snapshot of one slot for presentation code.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotStatus {
    pub slot: SlotId,
    pub active: bool,
    pub mode: AttachMode,
    pub liveness: Liveness,
    pub requested: Option<Url>,
    pub pending: Option<PendingSeek>,
}
