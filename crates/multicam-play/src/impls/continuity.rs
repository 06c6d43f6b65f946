//! Position hand-off between angles.
//!
//! On every switch the incoming angle is moved to the outgoing angle's
//! position. Elements that cannot seek yet get a [`PendingSeek`] which is
//! applied on their next readiness signal or drift tick.

use tracing::{debug, trace};

use crate::{
    impls::{config::SyncConfig, slot::Slot, state::SyncState},
    types::{PendingSeek, SlotId},
};

/// Result of a continuity sync on switch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContinuityOutcome {
    /// Source and destination are the same slot.
    Unchanged,
    /// Live destinations are never seeked.
    TargetLive,
    /// The source position is zero or not finite.
    NoAnchor,
    /// The destination was seeked to `position`.
    Applied { position: f64 },
    /// The destination is not seek-ready; `position` is pending.
    Deferred { position: f64 },
}

/// How a single position correction was carried out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Correction {
    Applied(f64),
    Deferred(f64),
}

/// Clamp `position` to `[0, duration - epsilon]`. Unknown or infinite
/// durations only bound from below.
pub(crate) fn clamp_seek_target(position: f64, duration: f64, epsilon: f64) -> f64 {
    let upper = if duration.is_finite() && duration > 0.0 {
        (duration - epsilon).max(0.0)
    } else {
        f64::INFINITY
    };
    position.clamp(0.0, upper)
}

pub(crate) fn is_meaningful_anchor(position: f64) -> bool {
    position.is_finite() && position > 0.0
}

fn seek(slot: &mut Slot, position: f64, config: &SyncConfig) -> f64 {
    let target = clamp_seek_target(position, slot.element.duration(), config.seek_end_epsilon);
    slot.element.set_current_time(target);
    slot.pending = None;
    target
}

/// Carry the position of `from` over to `to`.
pub(crate) fn sync_on_switch(
    state: &mut SyncState,
    from: SlotId,
    to: SlotId,
    config: &SyncConfig,
) -> ContinuityOutcome {
    if from == to {
        return ContinuityOutcome::Unchanged;
    }
    if state.slot(to).liveness.is_live() {
        trace!(to = to.index(), "switch target is live, position left alone");
        return ContinuityOutcome::TargetLive;
    }

    let anchor = state.slot(from).element.current_time();
    if !is_meaningful_anchor(anchor) {
        trace!(from = from.index(), anchor, "no position to carry over");
        return ContinuityOutcome::NoAnchor;
    }

    let target = state.slot_mut(to);
    if target.is_seek_ready(config.seek_ready_state) {
        let position = seek(target, anchor, config);
        debug!(from = from.index(), to = to.index(), position, "position carried over");
        ContinuityOutcome::Applied { position }
    } else {
        target.pending = Some(PendingSeek::new(anchor, config.seek_retry_budget));
        debug!(
            from = from.index(),
            to = to.index(),
            position = anchor,
            retries = config.seek_retry_budget,
            "switch target not seek-ready, seek deferred"
        );
        ContinuityOutcome::Deferred { position: anchor }
    }
}

/// Apply the slot's pending seek if the element accepts seeks now.
pub(crate) fn apply_pending_if_ready(slot: &mut Slot, config: &SyncConfig) -> Option<f64> {
    let pending = slot.pending?;
    if !slot.is_seek_ready(config.seek_ready_state) {
        return None;
    }
    let position = seek(slot, pending.position, config);
    debug!(slot = slot.id.index(), position, "deferred seek applied");
    Some(position)
}

/// Move `slot` to `position`, deferring when the element is not ready.
///
/// An existing pending seek is retargeted but keeps its remaining retries.
pub(crate) fn correct_position(slot: &mut Slot, position: f64, config: &SyncConfig) -> Correction {
    if slot.is_seek_ready(config.seek_ready_state) {
        return Correction::Applied(seek(slot, position, config));
    }
    let retries_left = slot
        .pending
        .map_or(config.seek_retry_budget, |p| p.retries_left);
    slot.pending = Some(PendingSeek {
        position,
        retries_left,
    });
    Correction::Deferred(position)
}
