use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use url::Url;

use crate::{
    error::SyncError, events::EngineEvent, impls::config::StreamEngineConfig,
    traits::element::MediaElement, types::QualityLevel,
};

/// One adaptive-stream engine instance bound to one media element.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = StreamEngineMock)
)]
pub trait StreamEngine: Send + Sync + 'static {
    /// Bind to `element`. Emits [`EngineEvent::MediaAttached`] when done.
    fn attach_media(&self, element: Arc<dyn MediaElement>);

    /// Start loading the manifest at `src`.
    fn load_source(&self, src: &Url);

    /// Number of quality levels in the parsed manifest.
    fn level_count(&self) -> usize;

    fn current_level(&self) -> Option<usize>;

    /// Level to switch to at the next fragment boundary.
    fn set_next_level(&self, level: QualityLevel);

    /// Distance to the live edge in seconds, when known.
    fn live_latency(&self) -> Option<f64>;

    /// Release every resource. The instance is unusable afterwards.
    fn destroy(&self);

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}

/// Builds engine instances once the engine module is loaded.
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = EngineFactoryMock)
)]
pub trait EngineFactory: Send + Sync + 'static {
    /// Whether engine playback works in this environment at all.
    fn is_supported(&self) -> bool;

    fn create(&self, config: &StreamEngineConfig) -> Result<Arc<dyn StreamEngine>, SyncError>;
}

/// Deferred, one-time acquisition of the engine factory.
///
/// The session calls [`load`](Self::load) at most once and shares the
/// outcome between every slot.
#[async_trait]
pub trait EngineLoader: Send + Sync + 'static {
    async fn load(&self) -> Result<Arc<dyn EngineFactory>, SyncError>;
}
