#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("slot {index} out of range, session has {count} slots")]
    SlotOutOfRange { index: usize, count: usize },

    #[error("camera list is empty")]
    NoCameras,

    #[error("{cameras} cameras configured but {elements} media elements bound")]
    ElementCountMismatch { cameras: usize, elements: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid source: {reason}")]
    InvalidSource { reason: String },

    #[error("playback start rejected: {reason}")]
    PlaybackRejected { reason: String },

    #[error("stream engine failed to load: {reason}")]
    EngineLoad { reason: String },

    #[error("stream engine construction failed: {reason}")]
    EngineCreate { reason: String },

    #[error("session closed")]
    SessionClosed,
}

impl From<multicam_sources::SourceError> for SyncError {
    fn from(e: multicam_sources::SourceError) -> Self {
        Self::InvalidSource {
            reason: e.to_string(),
        }
    }
}
