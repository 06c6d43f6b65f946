#![forbid(unsafe_code)]

/// How a slot ended up bound to its media element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachKind {
    /// The element plays the manifest itself.
    Native,
    /// A stream engine instance drives the element.
    Engine,
    /// Neither path is available; the source was assigned as-is.
    Fallback,
}

/// Observable state changes of a playback session.
///
/// Runtime failures never surface as errors to the caller; they are
/// reported here instead and otherwise leave the session degraded.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum SessionEvent {
    /// The active angle changed.
    ActiveChanged { from: usize, to: usize },
    /// A slot was bound to a new source.
    StreamAttached { slot: usize, kind: AttachKind },
    /// A slot was explicitly released and is dark until re-attached.
    StreamDetached { slot: usize },
    /// A slot's manifest classified it as live or finite.
    LivenessClassified { slot: usize, live: bool },
    /// The engine reported a fatal error; the slot is dark until re-attached.
    StreamFailed { slot: usize, details: String },
    /// A position correction was written to the element.
    SeekApplied { slot: usize, position: f64 },
    /// A position correction waits for the element to become seek-ready.
    SeekDeferred { slot: usize, position: f64 },
    /// A deferred correction ran out of retries.
    SeekDropped { slot: usize },
    /// A live slot's quality level was nudged to compensate latency drift.
    QualityNudged { slot: usize, level: usize },
    /// The session was torn down.
    Closed,
}
