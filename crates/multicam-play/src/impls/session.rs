//! Caller-facing playback session.
//!
//! `PlaybackSession` owns one slot per configured camera, the shared
//! engine loader and the drift corrector task. Dropping the session tears
//! it down.

use std::sync::Arc;

use multicam_events::Event;
use multicam_sources::{Camera, CameraSources, SourceResolver};
use parking_lot::Mutex;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, trace};
use url::Url;

use crate::{
    error::SyncError,
    impls::{config::SyncConfig, continuity::ContinuityOutcome, drift::DriftReport, shared::Shared},
    traits::{element::MediaElement, engine::EngineLoader},
    types::{AttachMode, Liveness, PendingSeek, SlotId, SlotStatus},
};

// -- PlaybackSession -------------------------------------------------------------

/// Synchronized multi-angle playback over a fixed camera list.
///
/// Runtime failures never surface as errors: a slot whose stream broke is
/// left dark and the failure is published on the event bus. Errors returned
/// here are caller mistakes (bad index, closed session).
pub struct PlaybackSession {
    shared: Arc<Shared>,
    cameras: Vec<Camera>,
    sources: Vec<CameraSources>,
    drift_task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackSession {
    /// Bind `elements` to `cameras`, one element per camera in order.
    ///
    /// Nothing is attached until [`start`](Self::start).
    pub fn new(
        cameras: Vec<Camera>,
        elements: Vec<Arc<dyn MediaElement>>,
        loader: Arc<dyn EngineLoader>,
        resolver: &SourceResolver,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        if cameras.is_empty() {
            return Err(SyncError::NoCameras);
        }
        if cameras.len() != elements.len() {
            return Err(SyncError::ElementCountMismatch {
                cameras: cameras.len(),
                elements: elements.len(),
            });
        }
        config.validate()?;

        let sources = cameras
            .iter()
            .map(|camera| resolver.sources_for(camera))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(cameras = cameras.len(), base = resolver.base(), "playback session created");
        Ok(Self {
            shared: Arc::new(Shared::new(elements, loader, config)),
            cameras,
            sources,
            drift_task: Mutex::new(None),
        })
    }

    /// Attach every camera's adaptive-stream manifest and start the drift
    /// corrector. Calling it again only re-requests the same sources.
    pub async fn start(&self) -> Result<(), SyncError> {
        self.shared.state.lock().ensure_open()?;
        self.shared.ensure_element_pumps().await;
        self.shared.refresh_volume();

        let attaches = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, sources)| self.attach(index, sources.hls_master.clone()));
        futures::future::try_join_all(attaches).await?;

        self.spawn_drift_task();
        info!(cameras = self.cameras.len(), "playback session started");
        Ok(())
    }

    fn spawn_drift_task(&self) {
        let mut task = self.drift_task.lock();
        if task.is_some() || self.shared.cancel.is_cancelled() {
            return;
        }

        let shared = Arc::downgrade(&self.shared);
        let cancel = self.shared.cancel.child_token();
        let period = self.shared.config.drift_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let report = shared.correct_drift();
                if !report.is_empty() {
                    trace!(?report, "drift pass");
                }
            }
            trace!("drift corrector stopped");
        }));
    }

    /// Bind slot `index` to `src`.
    ///
    /// Requesting the source the slot already has is a no-op, including
    /// after a fatal stream error; pass a different URL to retry.
    pub async fn attach(&self, index: usize, src: Url) -> Result<(), SyncError> {
        let id = self.slot_id(index)?;
        self.shared.attach(id, src).await
    }

    /// Release slot `index`: destroy its engine and forget its source.
    pub fn detach(&self, index: usize) -> Result<(), SyncError> {
        let id = self.slot_id(index)?;
        self.shared.detach(id)
    }

    /// Make `index` the active angle.
    pub fn select(&self, index: usize) -> Result<ContinuityOutcome, SyncError> {
        let id = self.slot_id(index)?;
        self.shared.select(id)
    }

    /// Select the next angle, wrapping around.
    pub fn next(&self) -> Result<ContinuityOutcome, SyncError> {
        self.cycle(1)
    }

    /// Select the previous angle, wrapping around.
    pub fn previous(&self) -> Result<ContinuityOutcome, SyncError> {
        self.cycle(self.cameras.len() - 1)
    }

    fn cycle(&self, step: usize) -> Result<ContinuityOutcome, SyncError> {
        let count = self.cameras.len();
        let next = (self.active().index() + step) % count;
        self.select(next)
    }

    #[must_use]
    pub fn active(&self) -> SlotId {
        self.shared.state.lock().active
    }

    #[must_use]
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    /// Resolved sources of camera `index`.
    pub fn sources(&self, index: usize) -> Result<&CameraSources, SyncError> {
        let id = self.slot_id(index)?;
        Ok(&self.sources[id.index()])
    }

    /// Set the volume, `0..=100`. Larger values are clamped. Returns the
    /// applied volume.
    pub fn set_volume(&self, volume: u8) -> Result<u8, SyncError> {
        self.shared.set_volume(volume)
    }

    #[must_use]
    pub fn volume(&self) -> u8 {
        self.shared.state.lock().volume
    }

    pub fn liveness(&self, index: usize) -> Result<Liveness, SyncError> {
        Ok(self.slot_status(index)?.liveness)
    }

    /// Whether a stream engine instance currently drives slot `index`.
    pub fn has_engine(&self, index: usize) -> Result<bool, SyncError> {
        Ok(self.slot_status(index)?.mode == AttachMode::Engine)
    }

    pub fn pending_seek(&self, index: usize) -> Result<Option<PendingSeek>, SyncError> {
        Ok(self.slot_status(index)?.pending)
    }

    pub fn slot_status(&self, index: usize) -> Result<SlotStatus, SyncError> {
        let state = self.shared.state.lock();
        let id = state.slot_id(index)?;
        Ok(state.status(id))
    }

    /// Run one drift pass now, outside the timer cadence.
    pub fn correct_drift(&self) -> DriftReport {
        self.shared.correct_drift()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    #[must_use]
    pub fn is_drift_running(&self) -> bool {
        self.drift_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Stop the drift corrector and every event pump, and destroy every
    /// engine instance. Idempotent.
    pub fn teardown(&self) {
        if !self.shared.teardown() {
            return;
        }
        if let Some(task) = self.drift_task.lock().as_ref() {
            task.abort();
        }
        info!("playback session closed");
    }

    fn slot_id(&self, index: usize) -> Result<SlotId, SyncError> {
        SlotId::checked(index, self.cameras.len())
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
