//! Session and engine construction parameters.

use std::time::Duration;

use derivative::Derivative;
use derive_setters::Setters;

use crate::{
    error::SyncError,
    types::{QualityLevel, ReadyState},
};

/// Parameters handed to [`EngineFactory::create`](crate::EngineFactory::create).
#[derive(Clone, Debug, Derivative, PartialEq, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct StreamEngineConfig {
    /// Demux transport segments off the main thread.
    #[derivative(Default(value = "true"))]
    pub enable_worker: bool,
    pub low_latency_mode: bool,
    pub start_level: QualityLevel,
    /// Never pick a level larger than the element's rendered size.
    #[derivative(Default(value = "true"))]
    pub cap_level_to_player_size: bool,
    #[derivative(Default(value = "Duration::from_secs(30)"))]
    pub max_buffer_length: Duration,
    #[derivative(Default(value = "Duration::from_secs(60)"))]
    pub max_max_buffer_length: Duration,
    #[derivative(Default(value = "Duration::from_secs(10)"))]
    pub back_buffer_length: Duration,
    /// Target distance to the live edge, in segment durations.
    #[derivative(Default(value = "3"))]
    pub live_sync_duration_count: u32,
    /// Distance to the live edge that triggers a catch-up, in segment durations.
    #[derivative(Default(value = "10"))]
    pub live_max_latency_duration_count: u32,
}

/// Configuration of a [`PlaybackSession`](crate::PlaybackSession).
#[derive(Clone, Debug, Derivative, PartialEq, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SyncConfig {
    /// Cadence of the drift corrector.
    #[derivative(Default(value = "Duration::from_secs(1)"))]
    pub drift_interval: Duration,
    /// Largest position difference, in seconds, tolerated between finite angles.
    #[derivative(Default(value = "0.5"))]
    pub finite_drift_tolerance: f64,
    /// Largest live latency difference, in seconds, tolerated between live angles.
    #[derivative(Default(value = "1.0"))]
    pub live_latency_tolerance: f64,
    /// Drift ticks a deferred seek survives before it is dropped.
    #[derivative(Default(value = "3"))]
    pub seek_retry_budget: u32,
    /// Distance kept from the end of a finite stream when seeking.
    #[derivative(Default(value = "0.15"))]
    pub seek_end_epsilon: f64,
    /// Readiness at which an element accepts seeks.
    #[derivative(Default(value = "ReadyState::HaveMetadata"))]
    pub seek_ready_state: ReadyState,
    /// Readiness below which autoplay waits for the next readiness signal.
    #[derivative(Default(value = "ReadyState::HaveCurrentData"))]
    pub autoplay_ready_state: ReadyState,
    #[derivative(Default(value = "64"))]
    pub events_capacity: usize,
    /// Volume applied on start, `0..=100`. Zero starts muted.
    pub initial_volume: u8,
    pub engine: StreamEngineConfig,
}

impl SyncConfig {
    pub(crate) fn validate(&self) -> Result<(), SyncError> {
        if self.drift_interval.is_zero() {
            return Err(invalid("drift_interval must be non-zero"));
        }
        if !(self.finite_drift_tolerance.is_finite() && self.finite_drift_tolerance >= 0.0) {
            return Err(invalid("finite_drift_tolerance must be a non-negative number"));
        }
        if !(self.live_latency_tolerance.is_finite() && self.live_latency_tolerance >= 0.0) {
            return Err(invalid("live_latency_tolerance must be a non-negative number"));
        }
        if !(self.seek_end_epsilon.is_finite() && self.seek_end_epsilon > 0.0) {
            return Err(invalid("seek_end_epsilon must be a positive number"));
        }
        if self.initial_volume > 100 {
            return Err(invalid("initial_volume must be within 0..=100"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> SyncError {
    SyncError::InvalidConfig {
        reason: reason.to_owned(),
    }
}
