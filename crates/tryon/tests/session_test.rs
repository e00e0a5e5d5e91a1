//! End-to-end session tests over synthetic frames

use std::path::Path;

use camera_capture::{CameraConfig, SourceKind, SyntheticSource};
use image::{Rgba, RgbaImage};
use landmarks::{FacialAnchors, LandmarkTrack, ScriptedDetector, StaticDetector};
use tryon::{OutputConfig, TryOnConfig, TryOnSession};

fn config(frames: u64) -> TryOnConfig {
    TryOnConfig {
        camera: CameraConfig {
            source: SourceKind::Synthetic,
            width: 160,
            height: 120,
            fps: 1000,
            max_frames: Some(frames),
        },
        ..Default::default()
    }
}

fn write_glasses(dir: &Path) -> String {
    let path = dir.join("glasses.png");
    RgbaImage::from_pixel(100, 40, Rgba([200, 30, 30, 255]))
        .save(&path)
        .unwrap();
    path.to_string_lossy().to_string()
}

fn reference_face() -> FacialAnchors {
    FacialAnchors::new((0.3, 0.5), (0.7, 0.5), (0.5, 0.55))
}

#[tokio::test]
async fn test_tracked_face_is_composited() {
    let dir = tempfile::tempdir().unwrap();
    let glasses = write_glasses(dir.path());

    let session = TryOnSession::with_parts(
        config(30),
        Box::new(SyntheticSource::new(160, 120).unwrap()),
        Box::new(StaticDetector::with_anchors(reference_face())),
    )
    .unwrap();
    assert!(session.select(glasses).wait().await);
    assert!(session.assets().current().ready());

    let report = session.run().await.unwrap();
    assert_eq!(report.pumped, 30);
    assert_eq!(report.frames.processed, 30);
    assert_eq!(report.frames.composited, 30);

    // Converged onto the reference placement: 0.4 * 160 * 0.85 wide, ratio 0.4
    let pose = report.final_pose;
    assert!((pose.x - 80.0).abs() < 0.01);
    assert!((pose.w - 54.4).abs() < 0.01);
    assert!((pose.h - 21.76).abs() < 0.01);
    assert!(pose.angle.abs() < 1e-12);
}

#[tokio::test]
async fn test_face_lost_and_reacquired() {
    let track = LandmarkTrack::from_json(
        r#"{
            "frames": [
                {"anchors": {"left_face": {"x": 0.3, "y": 0.5}, "right_face": {"x": 0.7, "y": 0.5}, "nose": {"x": 0.5, "y": 0.55}}},
                {"anchors": {"left_face": {"x": 0.3, "y": 0.5}, "right_face": {"x": 0.7, "y": 0.5}, "nose": {"x": 0.5, "y": 0.55}}},
                {},
                {},
                {},
                {"anchors": {"left_face": {"x": 0.3, "y": 0.5}, "right_face": {"x": 0.7, "y": 0.5}, "nose": {"x": 0.5, "y": 0.55}}}
            ]
        }"#,
    )
    .unwrap();

    let session = TryOnSession::with_parts(
        config(6),
        Box::new(SyntheticSource::new(160, 120).unwrap()),
        Box::new(ScriptedDetector::new(track)),
    )
    .unwrap();

    let report = session.run().await.unwrap();
    assert_eq!(report.frames.cleared, 3);
    // No asset selected: the face is tracked but nothing is drawn over it
    assert_eq!(report.frames.video_only, 3);
    assert_eq!(report.frames.composited, 0);

    // Three blends from zero towards x = 80; the gap frames changed nothing
    let expected = 80.0 * (1.0 - 0.65f64.powi(3));
    assert!((report.final_pose.x - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_snapshots_written() {
    let dir = tempfile::tempdir().unwrap();
    let glasses = write_glasses(dir.path());
    let out = dir.path().join("out");

    let mut config = config(10);
    config.output = OutputConfig {
        snapshot_dir: Some(out.clone()),
        snapshot_every: 5,
    };

    let session = TryOnSession::with_parts(
        config,
        Box::new(SyntheticSource::new(160, 120).unwrap()),
        Box::new(StaticDetector::with_anchors(reference_face())),
    )
    .unwrap();
    session.select(glasses).wait().await;

    let report = session.run().await.unwrap();
    assert_eq!(report.snapshots, 2);

    let snapshot = image::open(out.join("frame_000010.png")).unwrap().to_rgba8();
    assert_eq!(snapshot.dimensions(), (160, 120));
    assert!(out.join("frame_000005.png").exists());
}

#[tokio::test]
async fn test_failed_asset_does_not_stop_session() {
    let session = TryOnSession::with_parts(
        config(5),
        Box::new(SyntheticSource::new(160, 120).unwrap()),
        Box::new(StaticDetector::with_anchors(reference_face())),
    )
    .unwrap();
    assert!(session.select("/nonexistent/glasses.png").wait().await);
    assert!(!session.assets().current().ready());

    let report = session.run().await.unwrap();
    assert_eq!(report.frames.video_only, 5);
}
