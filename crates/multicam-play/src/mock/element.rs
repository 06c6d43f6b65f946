use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use url::Url;

use crate::{
    error::SyncError,
    events::ElementEvent,
    traits::element::{HLS_MIME_TYPE, MediaElement},
    types::ReadyState,
};

#[derive(Debug)]
struct ElementState {
    native_hls: bool,
    src: Option<Url>,
    load_calls: usize,
    play_calls: usize,
    reject_play: bool,
    paused: bool,
    position: f64,
    duration: f64,
    ready: ReadyState,
    muted: bool,
    volume: f64,
    seeks: Vec<f64>,
}

/// In-memory media element.
///
/// Starts paused with no data, unknown duration and full volume.
#[derive(Debug)]
pub struct FakeElement {
    state: Mutex<ElementState>,
    tx: broadcast::Sender<ElementEvent>,
}

impl FakeElement {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    /// An element that plays adaptive-stream manifests itself.
    #[must_use]
    pub fn native() -> Arc<Self> {
        Self::build(true)
    }

    fn build(native_hls: bool) -> Arc<Self> {
        let (tx, _) = broadcast::channel(32);
        Arc::new(Self {
            state: Mutex::new(ElementState {
                native_hls,
                src: None,
                load_calls: 0,
                play_calls: 0,
                reject_play: false,
                paused: true,
                position: 0.0,
                duration: f64::NAN,
                ready: ReadyState::HaveNothing,
                muted: false,
                volume: 1.0,
                seeks: Vec::new(),
            }),
            tx,
        })
    }

    pub fn fire(&self, event: ElementEvent) {
        let _ = self.tx.send(event);
    }

    /// Reach `HaveEnoughData` and announce it.
    pub fn become_ready(&self) {
        self.set_ready_state(ReadyState::HaveEnoughData);
        self.fire(ElementEvent::LoadedMetadata);
        self.fire(ElementEvent::CanPlay);
    }

    pub fn set_ready_state(&self, ready: ReadyState) {
        self.state.lock().ready = ready;
    }

    /// Move the playhead without recording a seek.
    pub fn set_position(&self, position: f64) {
        self.state.lock().position = position;
    }

    pub fn set_duration(&self, duration: f64) {
        self.state.lock().duration = duration;
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.lock().paused = paused;
    }

    /// Make `play()` fail like an autoplay policy would.
    pub fn reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }

    /// Every position written through `set_current_time`.
    #[must_use]
    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().seeks.clone()
    }

    #[must_use]
    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    #[must_use]
    pub fn load_calls(&self) -> usize {
        self.state.lock().load_calls
    }

    #[must_use]
    pub fn src(&self) -> Option<Url> {
        self.state.lock().src.clone()
    }
}

impl MediaElement for FakeElement {
    fn can_play_type(&self, mime: &str) -> bool {
        mime == HLS_MIME_TYPE && self.state.lock().native_hls
    }

    fn set_src(&self, src: &Url) {
        self.state.lock().src = Some(src.clone());
    }

    fn clear_src(&self) {
        let mut state = self.state.lock();
        state.src = None;
        state.paused = true;
        state.ready = ReadyState::HaveNothing;
    }

    fn load(&self) {
        self.state.lock().load_calls += 1;
    }

    fn play(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        state.play_calls += 1;
        if state.reject_play {
            return Err(SyncError::PlaybackRejected {
                reason: "autoplay blocked".into(),
            });
        }
        state.paused = false;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.state.lock().position
    }

    fn set_current_time(&self, seconds: f64) {
        let mut state = self.state.lock();
        state.position = seconds;
        state.seeks.push(seconds);
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn subscribe(&self) -> broadcast::Receiver<ElementEvent> {
        self.tx.subscribe()
    }
}
