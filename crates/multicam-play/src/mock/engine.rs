use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use url::Url;

use crate::{
    error::SyncError,
    events::EngineEvent,
    impls::config::StreamEngineConfig,
    traits::{
        element::MediaElement,
        engine::{EngineFactory, EngineLoader, StreamEngine},
    },
    types::QualityLevel,
};

/// A call made on a [`FakeEngine`], or its creation.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Created,
    AttachMedia,
    LoadSource(Url),
    SetNextLevel(QualityLevel),
    Destroy,
}

/// A call tagged with the engine instance that received it.
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub engine: usize,
    pub call: EngineCall,
}

type Journal = Arc<Mutex<Vec<JournalEntry>>>;

#[derive(Debug, Default)]
struct EngineState {
    levels: usize,
    current_level: Option<usize>,
    next_level: QualityLevel,
    latency: Option<f64>,
    source: Option<Url>,
    destroyed: bool,
}

/// Scripted stream engine.
///
/// Unless created with manual events, `attach_media` emits
/// [`EngineEvent::MediaAttached`] and `load_source` emits
/// [`EngineEvent::ManifestParsed`] right away.
pub struct FakeEngine {
    id: usize,
    auto_events: bool,
    live_sources: Vec<Url>,
    journal: Journal,
    state: Mutex<EngineState>,
    tx: broadcast::Sender<EngineEvent>,
}

impl FakeEngine {
    /// A standalone engine with its own journal and manual events.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::build(0, false, Vec::new(), Journal::default(), 0)
    }

    fn build(
        id: usize,
        auto_events: bool,
        live_sources: Vec<Url>,
        journal: Journal,
        levels: usize,
    ) -> Arc<Self> {
        let (tx, _) = broadcast::channel(32);
        journal.lock().push(JournalEntry {
            engine: id,
            call: EngineCall::Created,
        });
        Arc::new(Self {
            id,
            auto_events,
            live_sources,
            journal,
            state: Mutex::new(EngineState {
                levels,
                ..EngineState::default()
            }),
            tx,
        })
    }

    #[must_use]
    pub fn with_levels(self: Arc<Self>, levels: usize) -> Arc<Self> {
        self.state.lock().levels = levels;
        self
    }

    #[must_use]
    pub fn with_current_level(self: Arc<Self>, level: Option<usize>) -> Arc<Self> {
        self.state.lock().current_level = level;
        self
    }

    #[must_use]
    pub fn with_latency(self: Arc<Self>, latency: Option<f64>) -> Arc<Self> {
        self.set_latency(latency);
        self
    }

    pub fn set_latency(&self, latency: Option<f64>) {
        self.state.lock().latency = latency;
    }

    pub fn fire(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn source(&self) -> Option<Url> {
        self.state.lock().source.clone()
    }

    #[must_use]
    pub fn next_level(&self) -> QualityLevel {
        self.state.lock().next_level
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Calls received by this instance, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.journal
            .lock()
            .iter()
            .filter(|entry| entry.engine == self.id)
            .map(|entry| entry.call.clone())
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.journal.lock().push(JournalEntry {
            engine: self.id,
            call,
        });
    }
}

impl StreamEngine for FakeEngine {
    fn attach_media(&self, _element: Arc<dyn MediaElement>) {
        self.record(EngineCall::AttachMedia);
        if self.auto_events {
            self.fire(EngineEvent::MediaAttached);
        }
    }

    fn load_source(&self, src: &Url) {
        self.record(EngineCall::LoadSource(src.clone()));
        let levels = {
            let mut state = self.state.lock();
            state.source = Some(src.clone());
            state.levels
        };
        if self.auto_events {
            self.fire(EngineEvent::ManifestParsed {
                live: self.live_sources.contains(src),
                levels,
            });
        }
    }

    fn level_count(&self) -> usize {
        self.state.lock().levels
    }

    fn current_level(&self) -> Option<usize> {
        self.state.lock().current_level
    }

    fn set_next_level(&self, level: QualityLevel) {
        self.record(EngineCall::SetNextLevel(level));
        let mut state = self.state.lock();
        state.next_level = level;
        if let QualityLevel::Index(index) = level {
            state.current_level = Some(index);
        }
    }

    fn live_latency(&self) -> Option<f64> {
        self.state.lock().latency
    }

    fn destroy(&self) {
        self.record(EngineCall::Destroy);
        self.state.lock().destroyed = true;
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}

/// Factory handing out [`FakeEngine`]s that share one call journal.
pub struct FakeFactory {
    supported: bool,
    fail_create: bool,
    auto_events: bool,
    levels: usize,
    live_sources: Vec<Url>,
    journal: Journal,
    engines: Mutex<Vec<Arc<FakeEngine>>>,
    configs: Mutex<Vec<StreamEngineConfig>>,
}

impl Default for FakeFactory {
    fn default() -> Self {
        Self {
            supported: true,
            fail_create: false,
            auto_events: true,
            levels: 4,
            live_sources: Vec::new(),
            journal: Journal::default(),
            engines: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
        }
    }
}

impl FakeFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Manifests loaded from `src` parse as live.
    #[must_use]
    pub fn with_live_source(mut self, src: Url) -> Self {
        self.live_sources.push(src);
        self
    }

    /// Engines only emit what the test fires.
    #[must_use]
    pub fn with_manual_events(mut self) -> Self {
        self.auto_events = false;
        self
    }

    #[must_use]
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    #[must_use]
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    #[must_use]
    pub fn engines(&self) -> Vec<Arc<FakeEngine>> {
        self.engines.lock().clone()
    }

    /// Most recent engine that loaded `src`.
    #[must_use]
    pub fn engine_for(&self, src: &Url) -> Option<Arc<FakeEngine>> {
        self.engines
            .lock()
            .iter()
            .rev()
            .find(|engine| engine.source().as_ref() == Some(src))
            .cloned()
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.engines.lock().len()
    }

    /// Configs passed to `create`, oldest first.
    #[must_use]
    pub fn configs(&self) -> Vec<StreamEngineConfig> {
        self.configs.lock().clone()
    }

    /// Every engine call across all instances, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().clone()
    }
}

impl EngineFactory for FakeFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &StreamEngineConfig) -> Result<Arc<dyn StreamEngine>, SyncError> {
        self.configs.lock().push(config.clone());
        if self.fail_create {
            return Err(SyncError::EngineCreate {
                reason: "constructor threw".into(),
            });
        }
        let mut engines = self.engines.lock();
        let engine = FakeEngine::build(
            engines.len(),
            self.auto_events,
            self.live_sources.clone(),
            Arc::clone(&self.journal),
            self.levels,
        );
        engines.push(Arc::clone(&engine));
        Ok(engine as Arc<dyn StreamEngine>)
    }
}

/// Loader resolving to a [`FakeFactory`], optionally held behind a gate.
pub struct FakeLoader {
    factory: Option<Arc<FakeFactory>>,
    gate: watch::Sender<bool>,
    loads: AtomicUsize,
}

impl FakeLoader {
    #[must_use]
    pub fn new(factory: Arc<FakeFactory>) -> Arc<Self> {
        Arc::new(Self::build(Some(factory), true))
    }

    /// Loads block until [`release`](Self::release) is called.
    #[must_use]
    pub fn gated(factory: Arc<FakeFactory>) -> Arc<Self> {
        Arc::new(Self::build(Some(factory), false))
    }

    /// Every load fails.
    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(None, true))
    }

    fn build(factory: Option<Arc<FakeFactory>>, open: bool) -> Self {
        let (gate, _) = watch::channel(open);
        Self {
            factory,
            gate,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLoader for FakeLoader {
    async fn load(&self) -> Result<Arc<dyn EngineFactory>, SyncError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|e| SyncError::EngineLoad {
                reason: e.to_string(),
            })?;
        match &self.factory {
            Some(factory) => Ok(Arc::clone(factory) as Arc<dyn EngineFactory>),
            None => Err(SyncError::EngineLoad {
                reason: "module failed to load".into(),
            }),
        }
    }
}
