//! Per-slot runtime record.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::{
    events::ElementEvent,
    traits::{element::MediaElement, engine::StreamEngine},
    types::{AttachMode, Liveness, PendingSeek, ReadyState, SlotId, SlotStatus},
};

/// What currently drives a slot's element.
#[derive(Clone, Default)]
pub(crate) enum Binding {
    #[default]
    Detached,
    Loading,
    Native,
    Fallback,
    Engine(Arc<dyn StreamEngine>),
    Failed,
}

impl Binding {
    /// The element has a source it is (or will be) playing.
    pub(crate) fn is_attached(&self) -> bool {
        matches!(self, Self::Native | Self::Fallback | Self::Engine(_))
    }

    pub(crate) fn engine(&self) -> Option<&Arc<dyn StreamEngine>> {
        match self {
            Self::Engine(engine) => Some(engine),
            _ => None,
        }
    }

    pub(crate) fn mode(&self) -> AttachMode {
        match self {
            Self::Detached => AttachMode::Detached,
            Self::Loading => AttachMode::Loading,
            Self::Native => AttachMode::Native,
            Self::Fallback => AttachMode::Fallback,
            Self::Engine(_) => AttachMode::Engine,
            Self::Failed => AttachMode::Failed,
        }
    }
}

/// One-shot autoplay request waiting for the element to become playable.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AutoplayWait {
    armed: bool,
}

impl AutoplayWait {
    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn clear(&mut self) {
        self.armed = false;
    }

    /// Consume the request if `event` is a readiness signal.
    pub(crate) fn take(&mut self, event: ElementEvent) -> bool {
        let ready = matches!(event, ElementEvent::LoadedMetadata | ElementEvent::CanPlay);
        let fire = ready && self.armed;
        if fire {
            self.armed = false;
        }
        fire
    }

    #[cfg(test)]
    pub(crate) fn is_armed(self) -> bool {
        self.armed
    }
}

pub(crate) struct Slot {
    pub(crate) id: SlotId,
    pub(crate) element: Arc<dyn MediaElement>,
    pub(crate) binding: Binding,
    pub(crate) liveness: Liveness,
    /// Last source requested through `attach`. Guards idempotence and
    /// stale continuations.
    pub(crate) requested: Option<Url>,
    pub(crate) pending: Option<PendingSeek>,
    /// Bumped on every rebind; engine events carry the epoch they were
    /// subscribed under.
    pub(crate) epoch: u64,
    pub(crate) autoplay: AutoplayWait,
    /// Cancels the engine event pump of the current binding.
    cancel: CancellationToken,
}

impl Slot {
    pub(crate) fn new(id: SlotId, element: Arc<dyn MediaElement>) -> Self {
        Self {
            id,
            element,
            binding: Binding::Detached,
            liveness: Liveness::Unknown,
            requested: None,
            pending: None,
            epoch: 0,
            autoplay: AutoplayWait::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Destroy the engine instance, if any, and stop its event pump.
    fn release(&mut self) {
        self.cancel.cancel();
        if let Binding::Engine(engine) = std::mem::take(&mut self.binding) {
            debug!(slot = self.id.index(), epoch = self.epoch, "destroying stream engine");
            engine.destroy();
        }
    }

    /// Start a new binding for `src`. The previous engine is destroyed
    /// before this returns.
    pub(crate) fn rebind(&mut self, src: Url, parent: &CancellationToken) -> u64 {
        self.release();
        self.epoch += 1;
        self.requested = Some(src);
        self.liveness = Liveness::Unknown;
        self.pending = None;
        self.autoplay.clear();
        self.cancel = parent.child_token();
        self.epoch
    }

    /// Fatal stream error. The requested source is kept, so re-requesting
    /// it is a no-op until the source changes. Any seek still in flight is
    /// abandoned.
    pub(crate) fn fail(&mut self) {
        self.release();
        self.binding = Binding::Failed;
        self.pending = None;
        self.autoplay.clear();
    }

    /// Explicit release. Clears every per-source field and detaches the
    /// element from its source.
    pub(crate) fn detach(&mut self) {
        self.release();
        self.epoch += 1;
        if self.requested.take().is_some() {
            self.element.clear_src();
            self.element.load();
        }
        self.liveness = Liveness::Unknown;
        self.pending = None;
        self.autoplay.clear();
    }

    pub(crate) fn is_seek_ready(&self, threshold: ReadyState) -> bool {
        self.element.ready_state() >= threshold
    }

    pub(crate) fn status(&self, active: bool) -> SlotStatus {
        SlotStatus {
            slot: self.id,
            active,
            mode: self.binding.mode(),
            liveness: self.liveness,
            requested: self.requested.clone(),
            pending: self.pending,
        }
    }

    /// Start playback now if the element has current data, otherwise on
    /// its next readiness signal.
    pub(crate) fn ensure_autoplay(&mut self, threshold: ReadyState) {
        if self.element.ready_state() >= threshold {
            self.autoplay.clear();
            request_autoplay(self.element.as_ref(), self.id);
        } else {
            trace!(slot = self.id.index(), "autoplay deferred until element is ready");
            self.autoplay.arm();
        }
    }
}

/// Ask `element` to play. A rejection leaves it paused and is not an error.
pub(crate) fn request_autoplay<E: MediaElement + ?Sized>(element: &E, slot: SlotId) {
    if !element.is_paused() {
        return;
    }
    if let Err(e) = element.play() {
        debug!(slot = slot.index(), err = %e, "autoplay rejected");
    }
}
