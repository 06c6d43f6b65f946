//! Session core shared between the caller-facing handle and the spawned
//! event pumps.

use std::sync::{Arc, Weak};

use multicam_events::{AttachKind, EventBus, SessionEvent};
use parking_lot::Mutex;
use tokio::sync::{OnceCell, broadcast, broadcast::error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    error::SyncError,
    events::{ElementEvent, EngineEvent},
    impls::{
        config::SyncConfig,
        continuity::{ContinuityOutcome, apply_pending_if_ready, sync_on_switch},
        drift::{self, DriftReport},
        slot::{Binding, request_autoplay},
        state::SyncState,
    },
    traits::{
        element::{HLS_MIME_TYPE, MediaElement},
        engine::{EngineFactory, EngineLoader},
    },
    types::{QualityLevel, SlotId},
};

pub(crate) struct Shared {
    pub(crate) config: SyncConfig,
    pub(crate) state: Mutex<SyncState>,
    pub(crate) bus: EventBus,
    pub(crate) cancel: CancellationToken,
    loader: Arc<dyn EngineLoader>,
    /// Loaded at most once; `None` when loading failed.
    factory: OnceCell<Option<Arc<dyn EngineFactory>>>,
    pumps: OnceCell<()>,
}

impl Shared {
    pub(crate) fn new(
        elements: Vec<Arc<dyn MediaElement>>,
        loader: Arc<dyn EngineLoader>,
        config: SyncConfig,
    ) -> Self {
        let bus = EventBus::new(config.events_capacity);
        let state = SyncState::new(elements, config.initial_volume);
        Self {
            config,
            state: Mutex::new(state),
            bus,
            cancel: CancellationToken::new(),
            loader,
            factory: OnceCell::new(),
            pumps: OnceCell::new(),
        }
    }

    /// Start one element event pump per slot. Runs once per session.
    pub(crate) async fn ensure_element_pumps(self: &Arc<Self>) {
        self.pumps
            .get_or_init(|| async {
                let state = self.state.lock();
                for slot in state.slots() {
                    let id = slot.id;
                    spawn_pump(
                        Arc::downgrade(self),
                        slot.element.subscribe(),
                        self.cancel.child_token(),
                        move |shared, event| shared.on_element_event(id, event),
                    );
                }
                trace!(slots = state.len(), "element event pumps started");
            })
            .await;
    }

    async fn engine_factory(&self) -> Option<Arc<dyn EngineFactory>> {
        self.factory
            .get_or_init(|| async {
                debug!("loading stream engine");
                match self.loader.load().await {
                    Ok(factory) => Some(factory),
                    Err(e) => {
                        warn!(err = %e, "stream engine unavailable, using direct playback");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Bind slot `id` to `src`. Re-requesting the current source is a no-op.
    pub(crate) async fn attach(self: &Arc<Self>, id: SlotId, src: Url) -> Result<(), SyncError> {
        self.ensure_element_pumps().await;

        let epoch = {
            let mut state = self.state.lock();
            state.ensure_open()?;
            let threshold = self.config.autoplay_ready_state;
            let slot = state.slot_mut(id);
            if slot.requested.as_ref() == Some(&src) {
                trace!(slot = id.index(), %src, "source already requested");
                return Ok(());
            }
            let epoch = slot.rebind(src.clone(), &self.cancel);
            debug!(slot = id.index(), epoch, %src, "attaching source");

            if slot.element.can_play_type(HLS_MIME_TYPE) {
                slot.element.set_src(&src);
                slot.element.load();
                slot.binding = Binding::Native;
                slot.ensure_autoplay(threshold);
                self.publish_attached(id, AttachKind::Native);
                return Ok(());
            }
            slot.binding = Binding::Loading;
            epoch
        };

        let factory = self.engine_factory().await;
        self.finish_attach(id, &src, epoch, factory);
        Ok(())
    }

    /// Continuation of [`attach`](Self::attach) once the engine factory is
    /// known. Abandons silently when the slot moved on in the meantime.
    fn finish_attach(
        self: &Arc<Self>,
        id: SlotId,
        src: &Url,
        epoch: u64,
        factory: Option<Arc<dyn EngineFactory>>,
    ) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let threshold = self.config.autoplay_ready_state;
        let slot = state.slot_mut(id);
        if slot.epoch != epoch || slot.requested.as_ref() != Some(src) {
            trace!(slot = id.index(), epoch, current = slot.epoch, "stale attach discarded");
            return;
        }

        let created = match factory {
            Some(factory) if factory.is_supported() => Some(factory.create(&self.config.engine)),
            _ => None,
        };

        match created {
            Some(Ok(engine)) => {
                let events = engine.subscribe();
                slot.binding = Binding::Engine(Arc::clone(&engine));
                spawn_pump(
                    Arc::downgrade(self),
                    events,
                    slot.cancel_token(),
                    move |shared, event| shared.on_engine_event(id, epoch, event),
                );
                engine.attach_media(Arc::clone(&slot.element));
                self.publish_attached(id, AttachKind::Engine);
            }
            created => {
                if let Some(Err(e)) = created {
                    warn!(slot = id.index(), err = %e, "stream engine construction failed");
                } else {
                    debug!(slot = id.index(), "stream engine unsupported");
                }
                slot.element.set_src(src);
                slot.element.load();
                slot.binding = Binding::Fallback;
                slot.ensure_autoplay(threshold);
                self.publish_attached(id, AttachKind::Fallback);
            }
        }
    }

    fn publish_attached(&self, id: SlotId, kind: AttachKind) {
        debug!(slot = id.index(), ?kind, "stream attached");
        self.bus.publish(SessionEvent::StreamAttached {
            slot: id.index(),
            kind,
        });
    }

    pub(crate) fn detach(&self, id: SlotId) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.slot_mut(id).detach();
        debug!(slot = id.index(), "slot detached");
        self.bus.publish(SessionEvent::StreamDetached { slot: id.index() });
        Ok(())
    }

    fn on_engine_event(&self, id: SlotId, epoch: u64, event: EngineEvent) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let background = state.active != id;
        let threshold = self.config.autoplay_ready_state;
        let slot = state.slot_mut(id);
        if slot.epoch != epoch {
            trace!(slot = id.index(), epoch, "engine event from previous binding dropped");
            return;
        }
        let Some(engine) = slot.binding.engine().cloned() else {
            return;
        };

        match event {
            EngineEvent::MediaAttached => {
                if let Some(src) = slot.requested.as_ref() {
                    trace!(slot = id.index(), %src, "media attached, loading manifest");
                    engine.load_source(src);
                }
            }
            EngineEvent::ManifestParsed { live, levels } => {
                if slot.liveness.classify(live) {
                    debug!(slot = id.index(), live, levels, "manifest parsed");
                    self.bus
                        .publish(SessionEvent::LivenessClassified { slot: id.index(), live });
                }
                if background && levels > 0 {
                    engine.set_next_level(QualityLevel::LOWEST);
                }
                slot.ensure_autoplay(threshold);
            }
            EngineEvent::Error { fatal: true, details } => {
                warn!(slot = id.index(), %details, "fatal stream error, engine destroyed");
                slot.fail();
                self.bus.publish(SessionEvent::StreamFailed {
                    slot: id.index(),
                    details,
                });
            }
            EngineEvent::Error { fatal: false, details } => {
                debug!(slot = id.index(), %details, "recoverable stream error");
            }
        }
    }

    fn on_element_event(&self, id: SlotId, event: ElementEvent) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let slot = state.slot_mut(id);

        match event {
            ElementEvent::LoadedMetadata | ElementEvent::CanPlay => {
                // Without an engine the element's duration is the only liveness signal.
                if event == ElementEvent::LoadedMetadata
                    && matches!(slot.binding, Binding::Native | Binding::Fallback)
                {
                    let live = slot.element.duration() == f64::INFINITY;
                    if slot.liveness.classify(live) {
                        self.bus
                            .publish(SessionEvent::LivenessClassified { slot: id.index(), live });
                    }
                }
                if let Some(position) = apply_pending_if_ready(slot, &self.config) {
                    self.bus.publish(SessionEvent::SeekApplied {
                        slot: id.index(),
                        position,
                    });
                }
                if slot.autoplay.take(event) {
                    request_autoplay(slot.element.as_ref(), id);
                }
            }
            ElementEvent::Ended => {
                if slot.binding.is_attached() && !slot.liveness.is_live() {
                    trace!(slot = id.index(), "finite stream ended, looping");
                    slot.element.set_current_time(0.0);
                    if let Err(e) = slot.element.play() {
                        debug!(slot = id.index(), err = %e, "loop restart rejected");
                    }
                }
            }
        }
    }

    /// Switch the active slot and carry the playback position over.
    pub(crate) fn select(&self, to: SlotId) -> Result<ContinuityOutcome, SyncError> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        let from = state.active;
        if from == to {
            return Ok(ContinuityOutcome::Unchanged);
        }

        state.active = to;
        debug!(from = from.index(), to = to.index(), "active slot changed");
        self.bus.publish(SessionEvent::ActiveChanged {
            from: from.index(),
            to: to.index(),
        });

        let outcome = sync_on_switch(&mut state, from, to, &self.config);
        match outcome {
            ContinuityOutcome::Applied { position } => {
                self.bus.publish(SessionEvent::SeekApplied {
                    slot: to.index(),
                    position,
                });
            }
            ContinuityOutcome::Deferred { position } => {
                self.bus.publish(SessionEvent::SeekDeferred {
                    slot: to.index(),
                    position,
                });
            }
            _ => {}
        }

        apply_quality_policy(&state);
        apply_volume(&state);
        state
            .slot_mut(to)
            .ensure_autoplay(self.config.autoplay_ready_state);
        Ok(outcome)
    }

    pub(crate) fn set_volume(&self, volume: u8) -> Result<u8, SyncError> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.volume = volume.min(100);
        apply_volume(&state);
        Ok(state.volume)
    }

    pub(crate) fn refresh_volume(&self) {
        let state = self.state.lock();
        if !state.closed {
            apply_volume(&state);
        }
    }

    pub(crate) fn correct_drift(&self) -> DriftReport {
        let mut state = self.state.lock();
        if state.closed {
            return DriftReport::default();
        }
        let report = drift::correct_drift(&mut state, &self.config);
        for &(slot, position) in &report.applied {
            self.bus.publish(SessionEvent::SeekApplied {
                slot: slot.index(),
                position,
            });
        }
        for &(slot, position) in &report.deferred {
            self.bus.publish(SessionEvent::SeekDeferred {
                slot: slot.index(),
                position,
            });
        }
        for &slot in &report.dropped {
            self.bus.publish(SessionEvent::SeekDropped { slot: slot.index() });
        }
        for &(slot, level) in &report.nudged {
            self.bus.publish(SessionEvent::QualityNudged {
                slot: slot.index(),
                level,
            });
        }
        report
    }

    /// Stop every task and destroy every engine. Returns `false` when the
    /// session was already closed.
    pub(crate) fn teardown(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        self.cancel.cancel();
        for slot in state.slots_mut() {
            slot.detach();
        }
        debug!(slots = state.len(), "session torn down");
        self.bus.publish(SessionEvent::Closed);
        true
    }
}

/// Active slot adapts freely, background slots with known levels sit at the
/// lowest one.
fn apply_quality_policy(state: &SyncState) {
    for slot in state.slots() {
        let Some(engine) = slot.binding.engine() else {
            continue;
        };
        if slot.id == state.active {
            engine.set_next_level(QualityLevel::Auto);
        } else if engine.level_count() > 0 {
            engine.set_next_level(QualityLevel::LOWEST);
        }
    }
}

/// Only the active slot is audible.
fn apply_volume(state: &SyncState) {
    let level = f64::from(state.volume) / 100.0;
    for slot in state.slots() {
        slot.element.set_volume(level);
        slot.element
            .set_muted(state.volume == 0 || slot.id != state.active);
    }
}

/// Forward `rx` into `handle` until cancelled, the channel closes or the
/// session is gone.
fn spawn_pump<T, F>(
    shared: Weak<Shared>,
    mut rx: broadcast::Receiver<T>,
    cancel: CancellationToken,
    handle: F,
) where
    T: Clone + Send + 'static,
    F: Fn(&Shared, T) + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(item) => {
                    let Some(shared) = shared.upgrade() else {
                        break;
                    };
                    handle(&shared, item);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event pump lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
