//! Mocks and stateful fakes for the collaborator traits.
//!
//! The `*Mock` APIs are generated by unimock. The `Fake*` types keep state,
//! record calls and let tests fire events by hand.

mod element;
mod engine;

pub use element::FakeElement;
pub use engine::{EngineCall, FakeEngine, FakeFactory, FakeLoader, JournalEntry};

pub use crate::traits::{
    element::MediaElementMock,
    engine::{EngineFactoryMock, StreamEngineMock},
};

/// Yield to the runtime until spawned event pumps went idle.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
