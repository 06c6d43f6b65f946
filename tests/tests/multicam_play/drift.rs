use std::time::Duration;

use multicam_events::SessionEvent;
use multicam_integration_tests::{Rig, drain, master, minimal_tracing_setup};
use multicam_play::{
    ContinuityOutcome, MediaElement, QualityLevel, ReadyState, SyncConfig,
    mock::{FakeFactory, settle},
};
use rstest::rstest;
use tokio::time;

/// Advance the paused clock past one drift period.
async fn tick() {
    time::sleep(Duration::from_secs(1)).await;
    settle().await;
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn cold_active_angle_does_not_rewind_the_others(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(42.3, 600.0);
    rig.elements[3].set_ready_state(ReadyState::HaveNothing);
    rig.elements[3].set_position(0.0);

    assert_eq!(
        rig.session.select(3).unwrap(),
        ContinuityOutcome::Deferred { position: 42.3 }
    );
    tick().await;

    for index in [0, 1, 2, 4, 5, 6, 7] {
        assert!(rig.elements[index].seeks().is_empty(), "camera {index} was seeked");
    }

    assert_eq!(rig.session.select(0).unwrap(), ContinuityOutcome::NoAnchor);
    assert!((rig.elements[0].current_time() - 42.3).abs() < f64::EPSILON);
    assert!(rig.elements[0].seeks().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn lagging_angle_is_pulled_back_each_tick(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(50.0, 600.0);
    rig.elements[6].set_position(47.0);
    rig.elements[7].set_position(50.4);
    rig.elements[5].set_position(10.0);
    rig.elements[5].set_paused(true);

    tick().await;

    assert_eq!(rig.elements[6].seeks(), vec![50.0]);
    assert!(rig.elements[7].seeks().is_empty());
    assert!(rig.elements[5].seeks().is_empty());
    assert!(rig.elements[0].seeks().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn unreachable_correction_is_dropped_after_three_ticks(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(50.0, 600.0);
    rig.elements[6].set_position(20.0);
    rig.elements[6].set_ready_state(ReadyState::HaveNothing);
    let mut events = rig.session.subscribe();

    tick().await;
    let pending = rig.session.pending_seek(6).unwrap().unwrap();
    assert_eq!(pending.retries_left, 3);

    // The element keeps drifting, so the entry is retargeted but keeps its budget.
    tick().await;
    tick().await;
    assert_eq!(rig.session.pending_seek(6).unwrap().unwrap().retries_left, 1);
    tick().await;

    let events = drain(&mut events);
    assert!(events.contains(&SessionEvent::SeekDropped { slot: 6 }));
    assert!(rig.elements[6].seeks().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn pending_seek_lands_when_the_angle_catches_up(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(50.0, 600.0);
    rig.elements[6].set_position(20.0);
    rig.elements[6].set_ready_state(ReadyState::HaveNothing);

    tick().await;
    assert!(rig.session.pending_seek(6).unwrap().is_some());

    rig.elements[6].set_ready_state(ReadyState::HaveMetadata);
    tick().await;

    assert_eq!(rig.elements[6].seeks(), vec![50.0]);
    assert_eq!(rig.session.pending_seek(6).unwrap(), None);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn live_angles_are_nudged_not_seeked(_minimal_tracing_setup: ()) {
    let factory = (0..8).fold(FakeFactory::new(), |factory, index| {
        factory.with_live_source(master(index))
    });
    let rig = Rig::new(factory);
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(100.0, f64::INFINITY);
    rig.elements[1].set_position(60.0);
    for index in 0..8 {
        rig.engine(index).set_latency(Some(4.0));
    }
    rig.engine(1).set_latency(Some(2.0));
    let mut events = rig.session.subscribe();

    tick().await;

    assert!(rig.elements[1].seeks().is_empty());
    assert_eq!(rig.engine(1).next_level(), QualityLevel::Index(1));
    assert_eq!(
        drain(&mut events),
        vec![SessionEvent::QualityNudged { slot: 1, level: 1 }]
    );
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn teardown_stops_the_drift_task(_minimal_tracing_setup: ()) {
    let rig = Rig::with_config(
        FakeFactory::new(),
        SyncConfig::default().with_drift_interval(Duration::from_millis(250)),
    );
    rig.session.start().await.unwrap();
    settle().await;
    assert!(rig.session.is_drift_running());

    rig.session.teardown();
    settle().await;
    rig.play_all(50.0, 600.0);
    rig.elements[3].set_position(5.0);
    time::sleep(Duration::from_secs(2)).await;
    settle().await;

    assert!(!rig.session.is_drift_running());
    assert!(rig.elements[3].seeks().is_empty());
}
