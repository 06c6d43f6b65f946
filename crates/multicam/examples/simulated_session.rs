//! Example: drive a playback session against in-memory elements.
//!
//! Eight fake elements stand in for real video players. The session attaches
//! every camera, classifies liveness, switches angles and lets the drift
//! corrector pull a lagging angle back.
//!
//! Run with:
//! ```
//! cargo run -p multicam --example simulated_session --features test-utils
//! ```

use std::{error::Error, sync::Arc, time::Duration};

use multicam::{
    play::mock::{FakeElement, FakeFactory, FakeLoader},
    prelude::*,
};
use tracing::info;
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    multicam::init_tracing("multicam_play=debug,info")?;

    let resolver = SourceResolver::parse("http://localhost:3000/available_cameras")?;
    let cameras = build_camera_list(&default_camera_files());
    let live = resolver.hls_master_src(cameras[2].filename())?;

    let factory = Arc::new(FakeFactory::new().with_live_source(live));
    let loader = FakeLoader::new(Arc::clone(&factory));
    let elements: Vec<_> = cameras.iter().map(|_| FakeElement::new()).collect();

    let session = PlaybackSession::new(
        cameras,
        elements
            .iter()
            .map(|e| Arc::clone(e) as Arc<dyn MediaElement>)
            .collect(),
        loader,
        &resolver,
        SyncConfig::default().with_initial_volume(60),
    )?;
    let mut events = session.subscribe();

    session.start().await?;
    for element in &elements {
        element.set_duration(120.0);
        element.become_ready();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    elements[0].set_position(42.3);
    let outcome = session.select(3)?;
    info!(?outcome, "switched to camera 4");

    elements[5].set_position(10.0);
    tokio::time::sleep(Duration::from_millis(1100)).await;

    while let Ok(Event::Session(event)) = events.try_recv() {
        info!(?event, "session event");
    }

    let refreshed = Url::parse("http://localhost:3000/available_cameras/hls/cam3/master.m3u8?r=1")?;
    session.attach(2, refreshed).await?;
    info!(status = ?session.slot_status(2)?, "camera 3 refreshed");

    session.teardown();
    Ok(())
}
