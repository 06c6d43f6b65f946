use multicam_integration_tests::{BASE, resolver};
use multicam_sources::{
    SourceResolver, build_camera_list, default_camera_files, slug_from_filename,
};
use rstest::rstest;

#[rstest]
#[case("Cam1 (teto).mp4", "CAM1 (TETO).mp4")]
#[case("Cam 2.mp4", "cam   2.MOV")]
#[case("North\tGate.mkv", "north gate.webm")]
fn case_and_whitespace_runs_do_not_change_slugs(#[case] a: &str, #[case] b: &str) {
    assert_eq!(slug_from_filename(a), slug_from_filename(b));
}

#[test]
fn slugs_are_deterministic() {
    for file in default_camera_files() {
        assert_eq!(
            slug_from_filename(&file.filename),
            slug_from_filename(&file.filename)
        );
    }
}

#[test]
fn every_default_camera_resolves_all_sources() {
    let resolver = resolver();
    let cameras = build_camera_list(&default_camera_files());
    assert_eq!(cameras.len(), 8);

    let first = resolver.sources_for(&cameras[0]).unwrap();
    assert_eq!(first.direct.as_str(), format!("{BASE}/Cam1%20(teto).mp4"));
    assert_eq!(
        first.preview.as_str(),
        format!("{BASE}/Cam1%20(teto).preview.mp4")
    );
    assert_eq!(
        first.hls_master.as_str(),
        format!("{BASE}/hls/cam1-teto/master.m3u8")
    );
    assert_eq!(
        first.hls_preview.as_str(),
        format!("{BASE}/hls/cam1-teto/cam1-teto_480p.m3u8")
    );

    for camera in &cameras[1..] {
        let sources = resolver.sources_for(camera).unwrap();
        assert!(sources.hls_master.as_str().ends_with(&format!("/hls/{}/master.m3u8", camera.slug())));
    }
}

#[test]
fn object_storage_preset_keeps_the_same_layout() {
    let resolver = SourceResolver::s3("multicam-media", "sa-east-1").unwrap();
    let src = resolver.hls_variant_src("Cam4.mp4", "720p").unwrap();
    assert_eq!(
        src.as_str(),
        "https://multicam-media.s3.sa-east-1.amazonaws.com/available_cameras/hls/cam4/cam4_720p.m3u8"
    );
}
