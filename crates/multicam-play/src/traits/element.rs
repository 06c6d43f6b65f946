use tokio::sync::broadcast;
use url::Url;

use crate::{error::SyncError, events::ElementEvent, types::ReadyState};

/// MIME type probed to detect native adaptive-stream support.
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// A playable media element owned by the presentation layer.
///
/// Positions and durations are in seconds. `duration()` is `NaN` until
/// metadata is known and `+inf` for open-ended streams.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = MediaElementMock)
)]
pub trait MediaElement: Send + Sync + 'static {
    /// Whether the element can play `mime` without an engine.
    fn can_play_type(&self, mime: &str) -> bool;

    fn set_src(&self, src: &Url);

    /// Drop the current source. Callers follow up with `load()` so the
    /// element abandons any in-flight fetch.
    fn clear_src(&self);

    /// Restart resource selection after a source change.
    fn load(&self);

    /// Request playback. Rejection is reported, never raised.
    fn play(&self) -> Result<(), SyncError>;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    fn ready_state(&self) -> ReadyState;

    fn is_paused(&self) -> bool;

    fn duration(&self) -> f64;

    fn is_muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    /// Volume in `0.0..=1.0`.
    fn volume(&self) -> f64;

    fn set_volume(&self, volume: f64);

    fn subscribe(&self) -> broadcast::Receiver<ElementEvent>;
}
