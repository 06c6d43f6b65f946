/// Lifecycle signals emitted by a media element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ElementEvent {
    /// Duration and dimensions are known; the element can be seeked.
    LoadedMetadata,
    /// Enough data is buffered to start playback.
    CanPlay,
    /// Playback reached the end of the media.
    Ended,
}

/// Signals emitted by an adaptive-stream engine instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineEvent {
    /// The engine is bound to its media element and can load a manifest.
    MediaAttached,
    /// The top-level manifest was parsed.
    ManifestParsed { live: bool, levels: usize },
    /// Playback or network error. Fatal errors leave the engine unusable.
    Error { fatal: bool, details: String },
}
