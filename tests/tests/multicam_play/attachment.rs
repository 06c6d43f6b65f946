use std::time::Duration;

use multicam_events::{AttachKind, SessionEvent};
use multicam_integration_tests::{Rig, drain, master, minimal_tracing_setup};
use multicam_play::{
    ElementEvent, EngineEvent, Liveness, MediaElement, QualityLevel,
    mock::{EngineCall, FakeFactory, JournalEntry, settle},
};
use rstest::rstest;

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn attaching_the_same_source_twice_builds_one_engine(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());

    rig.session.attach(1, master(1)).await.unwrap();
    rig.session.attach(1, master(1)).await.unwrap();
    settle().await;

    assert_eq!(rig.factory.created(), 1);
    let calls = rig.factory.engines()[0].calls();
    assert_eq!(
        calls.iter().filter(|c| **c == EngineCall::AttachMedia).count(),
        1
    );
    assert!(!calls.contains(&EngineCall::Destroy));
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn previous_engine_is_destroyed_before_the_next_attaches(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    let other = master(6);

    rig.session.attach(1, master(1)).await.unwrap();
    settle().await;
    rig.session.attach(1, other.clone()).await.unwrap();
    settle().await;

    let journal = rig.factory.journal();
    let position = |entry: JournalEntry| journal.iter().position(|e| *e == entry).unwrap();
    let destroyed = position(JournalEntry {
        engine: 0,
        call: EngineCall::Destroy,
    });
    let attached = position(JournalEntry {
        engine: 1,
        call: EngineCall::AttachMedia,
    });
    assert!(destroyed < attached, "journal: {journal:?}");
    assert_eq!(rig.factory.engines()[1].source(), Some(other));
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn events_of_a_replaced_engine_are_ignored(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.attach(1, master(1)).await.unwrap();
    settle().await;
    let old = rig.factory.engines()[0].clone();

    rig.session.attach(1, master(6)).await.unwrap();
    settle().await;
    old.fire(EngineEvent::Error {
        fatal: true,
        details: "late".into(),
    });
    settle().await;

    assert!(rig.session.has_engine(1).unwrap());
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn manifest_classifies_liveness_once_and_parks_background_quality(
    _minimal_tracing_setup: (),
) {
    let rig = Rig::new(FakeFactory::new().with_live_source(master(2)));
    let mut events = rig.session.subscribe();
    rig.session.start().await.unwrap();
    settle().await;

    assert_eq!(rig.session.liveness(2).unwrap(), Liveness::Live);
    assert_eq!(rig.session.liveness(0).unwrap(), Liveness::Finite);
    assert_eq!(rig.engine(0).next_level(), QualityLevel::Auto);
    assert_eq!(rig.engine(2).next_level(), QualityLevel::LOWEST);

    rig.engine(2).fire(EngineEvent::ManifestParsed {
        live: false,
        levels: 4,
    });
    settle().await;
    assert_eq!(rig.session.liveness(2).unwrap(), Liveness::Live);

    let events = drain(&mut events);
    let attached = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SessionEvent::StreamAttached {
                    kind: AttachKind::Engine,
                    ..
                }
            )
        })
        .count();
    assert_eq!(attached, 8);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::LivenessClassified { slot: 2, .. }))
            .count(),
        1
    );
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn selection_moves_full_quality_and_audio_to_the_new_angle(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    rig.session.set_volume(80).unwrap();

    rig.session.select(3).unwrap();

    assert_eq!(rig.engine(3).next_level(), QualityLevel::Auto);
    assert_eq!(rig.engine(0).next_level(), QualityLevel::LOWEST);
    assert!(!rig.elements[3].is_muted());
    assert!(rig.elements[0].is_muted());
    assert!((rig.elements[3].volume() - 0.8).abs() < 1e-9);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn autoplay_waits_for_readiness_and_tolerates_rejection(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.elements[1].reject_play(true);
    rig.session.start().await.unwrap();
    settle().await;
    assert_eq!(rig.elements[0].play_calls(), 0);

    rig.elements[0].become_ready();
    rig.elements[1].become_ready();
    settle().await;

    assert_eq!(rig.elements[0].play_calls(), 1);
    assert!(!rig.elements[0].is_paused());
    assert_eq!(rig.elements[1].play_calls(), 1);
    assert!(rig.elements[1].is_paused());
}

#[rstest]
#[case::finite(None, 1)]
#[case::live(Some(2), 0)]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn ended_loops_finite_streams_only(
    _minimal_tracing_setup: (),
    #[case] live: Option<usize>,
    #[case] expected_restarts: usize,
) {
    let factory = match live {
        Some(index) => FakeFactory::new().with_live_source(master(index)),
        None => FakeFactory::new(),
    };
    let rig = Rig::new(factory);
    rig.session.start().await.unwrap();
    settle().await;
    rig.elements[2].set_position(120.0);

    rig.elements[2].fire(ElementEvent::Ended);
    settle().await;

    assert_eq!(rig.elements[2].seeks().len(), expected_restarts);
    assert_eq!(rig.elements[2].play_calls(), expected_restarts);
    if expected_restarts > 0 {
        assert_eq!(rig.elements[2].current_time(), 0.0);
    }
}

#[rstest]
#[case::finite(600.0, Liveness::Finite)]
#[case::live(f64::INFINITY, Liveness::Live)]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn direct_playback_classifies_by_duration(
    _minimal_tracing_setup: (),
    #[case] duration: f64,
    #[case] expected: Liveness,
) {
    let rig = Rig::new(FakeFactory::new().unsupported());
    rig.session.start().await.unwrap();
    settle().await;
    assert_eq!(rig.session.liveness(6).unwrap(), Liveness::Unknown);
    assert_eq!(rig.elements[6].src(), Some(master(6)));

    rig.elements[6].set_duration(duration);
    rig.elements[6].become_ready();
    settle().await;

    assert_eq!(rig.session.liveness(6).unwrap(), expected);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn detach_releases_the_slot(_minimal_tracing_setup: ()) {
    let rig = Rig::new(FakeFactory::new());
    rig.session.start().await.unwrap();
    settle().await;
    let engine = rig.engine(7);
    let mut events = rig.session.subscribe();

    rig.session.detach(7).unwrap();

    assert!(engine.is_destroyed());
    assert_eq!(rig.session.slot_status(7).unwrap().requested, None);
    assert_eq!(drain(&mut events), vec![SessionEvent::StreamDetached { slot: 7 }]);

    rig.session.attach(7, master(7)).await.unwrap();
    settle().await;
    assert!(rig.session.has_engine(7).unwrap());
    assert_eq!(rig.factory.created(), 9);
}
