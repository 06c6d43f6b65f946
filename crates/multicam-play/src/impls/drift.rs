//! Periodic alignment of background angles with the active one.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    impls::{
        config::SyncConfig,
        continuity::{Correction, apply_pending_if_ready, correct_position, is_meaningful_anchor},
        state::SyncState,
    },
    traits::engine::StreamEngine,
    types::{QualityLevel, SlotId},
};

/// What a single drift pass changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriftReport {
    /// Seeks written to elements, pending ones included.
    pub applied: Vec<(SlotId, f64)>,
    /// Corrections waiting for their element to become seek-ready.
    pub deferred: Vec<(SlotId, f64)>,
    /// Pending seeks that ran out of retries.
    pub dropped: Vec<SlotId>,
    /// Live slots whose next quality level was changed.
    pub nudged: Vec<(SlotId, usize)>,
}

impl DriftReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
            && self.deferred.is_empty()
            && self.dropped.is_empty()
            && self.nudged.is_empty()
    }
}

/// Reference taken from the active slot at the start of a pass.
struct Reference {
    active: SlotId,
    live: bool,
    position: f64,
    latency: Option<f64>,
}

/// Run one drift pass over every slot.
///
/// Pending seeks of attached slots are settled first: applied when the
/// element is ready, otherwise one retry is consumed. Background slots that
/// are attached and playing are then compared against the active slot,
/// provided the active slot is seek-ready with no seek of its own in flight.
pub(crate) fn correct_drift(state: &mut SyncState, config: &SyncConfig) -> DriftReport {
    let mut report = DriftReport::default();
    settle_pending(state, config, &mut report);

    let active = state.slot(state.active);
    if !active.binding.is_attached() {
        trace!(active = state.active.index(), "active slot not attached, drift pass skipped");
        return report;
    }
    // A cold active slot has no position worth aligning to yet.
    if active.pending.is_some() || !active.is_seek_ready(config.seek_ready_state) {
        trace!(active = state.active.index(), "active slot not settled, drift pass skipped");
        return report;
    }
    let live = active.liveness.is_live();
    let reference = Reference {
        active: active.id,
        live,
        position: active.element.current_time(),
        latency: if live {
            active.binding.engine().and_then(|e| e.live_latency())
        } else {
            None
        },
    };

    for slot in state.slots_mut() {
        if slot.id == reference.active || !slot.binding.is_attached() || slot.element.is_paused() {
            continue;
        }

        if slot.liveness.is_live() {
            if !reference.live {
                continue;
            }
            let (Some(reference_latency), Some(engine)) = (reference.latency, slot.binding.engine())
            else {
                continue;
            };
            if let Some(level) = nudge_quality(engine, reference_latency, config) {
                debug!(slot = slot.id.index(), level, "live latency drift, quality nudged");
                report.nudged.push((slot.id, level));
            }
            continue;
        }

        if !is_meaningful_anchor(reference.position) {
            continue;
        }
        let drift = (slot.element.current_time() - reference.position).abs();
        if drift <= config.finite_drift_tolerance {
            continue;
        }
        match correct_position(slot, reference.position, config) {
            Correction::Applied(position) => {
                debug!(slot = slot.id.index(), drift, position, "drift corrected");
                report.applied.push((slot.id, position));
            }
            Correction::Deferred(position) => {
                debug!(slot = slot.id.index(), drift, position, "drift correction deferred");
                report.deferred.push((slot.id, position));
            }
        }
    }

    report
}

fn settle_pending(state: &mut SyncState, config: &SyncConfig, report: &mut DriftReport) {
    for slot in state.slots_mut() {
        if slot.pending.is_none() || !slot.binding.is_attached() {
            continue;
        }
        if let Some(position) = apply_pending_if_ready(slot, config) {
            report.applied.push((slot.id, position));
            continue;
        }
        let Some(pending) = slot.pending.as_mut() else {
            continue;
        };
        pending.retries_left = pending.retries_left.saturating_sub(1);
        if pending.retries_left == 0 {
            debug!(slot = slot.id.index(), "deferred seek dropped, retries exhausted");
            slot.pending = None;
            report.dropped.push(slot.id);
        }
    }
}

/// Step a live slot's quality towards the reference latency: one level down
/// when lagging, one level up when leading.
fn nudge_quality(
    engine: &Arc<dyn StreamEngine>,
    reference_latency: f64,
    config: &SyncConfig,
) -> Option<usize> {
    let latency = engine.live_latency()?;
    let divergence = latency - reference_latency;
    if divergence.abs() <= config.live_latency_tolerance {
        return None;
    }
    let levels = engine.level_count();
    if levels == 0 {
        return None;
    }
    let current = engine.current_level().unwrap_or(0).min(levels - 1);
    let target = if divergence > 0.0 {
        current.saturating_sub(1)
    } else {
        (current + 1).min(levels - 1)
    };
    if target == current {
        return None;
    }
    engine.set_next_level(QualityLevel::Index(target));
    Some(target)
}
