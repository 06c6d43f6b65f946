//! End-to-end switching scenarios over the eight default cameras.

use std::time::Duration;

use multicam_events::SessionEvent;
use multicam_integration_tests::{Rig, drain, master, minimal_tracing_setup};
use multicam_play::{
    AttachMode, ContinuityOutcome, EngineEvent, PendingSeek, ReadyState,
    mock::{FakeFactory, settle},
};
use rstest::rstest;

#[rstest]
#[case::within_duration(600.0, 42.3)]
#[case::past_the_end(30.0, 29.85)]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn switch_to_unready_finite_camera_defers_then_applies(
    _minimal_tracing_setup: (),
    #[case] duration: f64,
    #[case] expected: f64,
) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(0.0, 600.0);
    rig.elements[0].set_position(42.3);
    rig.elements[3].set_ready_state(ReadyState::HaveNothing);
    rig.elements[3].set_duration(duration);
    let mut events = rig.session.subscribe();

    let outcome = rig.session.select(3).unwrap();

    assert_eq!(outcome, ContinuityOutcome::Deferred { position: 42.3 });
    assert_eq!(
        rig.session.pending_seek(3).unwrap(),
        Some(PendingSeek {
            position: 42.3,
            retries_left: 3
        })
    );
    assert!(rig.elements[3].seeks().is_empty());

    rig.elements[3].become_ready();
    settle().await;

    assert_eq!(rig.elements[3].seeks(), vec![expected]);
    assert_eq!(rig.session.pending_seek(3).unwrap(), None);
    let events = drain(&mut events);
    assert!(events.contains(&SessionEvent::ActiveChanged { from: 0, to: 3 }));
    assert!(events.contains(&SessionEvent::SeekDeferred {
        slot: 3,
        position: 42.3
    }));
    assert!(events.contains(&SessionEvent::SeekApplied {
        slot: 3,
        position: expected
    }));
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn live_camera_is_never_seeked_but_still_anchors(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new().with_live_source(master(2)));
    rig.session.start().await.unwrap();
    settle().await;
    assert!(rig.session.liveness(2).unwrap().is_live());
    assert!(!rig.session.liveness(5).unwrap().is_live());

    rig.play_all(0.0, 600.0);
    rig.elements[0].set_position(42.3);

    assert_eq!(rig.session.select(2).unwrap(), ContinuityOutcome::TargetLive);
    assert!(rig.elements[2].seeks().is_empty());
    assert_eq!(rig.session.pending_seek(2).unwrap(), None);

    rig.elements[2].set_position(15.0);
    assert_eq!(
        rig.session.select(5).unwrap(),
        ContinuityOutcome::Applied { position: 15.0 }
    );
    assert_eq!(rig.elements[5].seeks(), vec![15.0]);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn live_camera_without_position_gives_no_anchor(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new().with_live_source(master(2)));
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(0.0, 600.0);

    rig.session.select(2).unwrap();
    assert_eq!(rig.session.select(5).unwrap(), ContinuityOutcome::NoAnchor);
    assert!(rig.elements[5].seeks().is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn fatal_error_leaves_the_camera_dark(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    let mut events = rig.session.subscribe();
    let engine = rig.engine(4);

    engine.fire(EngineEvent::Error {
        fatal: true,
        details: "fragLoadError".into(),
    });
    settle().await;

    assert!(!rig.session.has_engine(4).unwrap());
    assert_eq!(rig.session.slot_status(4).unwrap().mode, AttachMode::Failed);
    assert!(engine.is_destroyed());
    assert_eq!(
        drain(&mut events),
        vec![SessionEvent::StreamFailed {
            slot: 4,
            details: "fragLoadError".into()
        }]
    );

    rig.play_all(30.0, 600.0);
    rig.elements[4].set_position(90.0);
    let report = rig.session.correct_drift();
    assert!(report.applied.iter().all(|(slot, _)| slot.index() != 4));
    assert!(report.deferred.iter().all(|(slot, _)| slot.index() != 4));
    assert!(rig.elements[4].seeks().is_empty());

    // Same source again stays dark.
    rig.session.attach(4, master(4)).await.unwrap();
    assert_eq!(rig.factory.created(), 8);

    let mut refreshed = master(4);
    refreshed.set_query(Some("refresh=1"));
    rig.session.attach(4, refreshed).await.unwrap();
    settle().await;
    assert!(rig.session.has_engine(4).unwrap());
    assert_eq!(rig.factory.created(), 9);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn fatal_error_abandons_the_pending_seek(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.play_all(42.3, 600.0);
    rig.elements[4].set_ready_state(ReadyState::HaveNothing);
    rig.elements[4].set_position(0.0);
    rig.elements[0].set_position(42.3);

    assert_eq!(
        rig.session.select(4).unwrap(),
        ContinuityOutcome::Deferred { position: 42.3 }
    );

    rig.engine(4).fire(EngineEvent::Error {
        fatal: true,
        details: "fragLoadError".into(),
    });
    settle().await;
    assert_eq!(rig.session.pending_seek(4).unwrap(), None);

    rig.elements[4].become_ready();
    settle().await;
    let report = rig.session.correct_drift();

    assert!(report.is_empty());
    assert!(rig.elements[4].seeks().is_empty());
}
