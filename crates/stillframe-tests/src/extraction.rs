//! End-to-end extraction tests: plan, render, transform, encode, export.

use image::GenericImageView;
use stillframe_core::{Raster, Rgb, Session, StillframeError};
use stillframe_effects::{BackgroundKeyParams, KeyMode, TransformConfig};
use stillframe_media::{export_frames, EncodeConfig, ManifestEntry, MemorySource, OutputFormat};
use stillframe_pipeline::{
    extract_all, plan, CancelToken, ExtractionConfig, FrameExtractor, PlanStrategy,
};

// ── Helpers ────────────────────────────────────────────────────

/// Blue frames on a white background, one keyframe per second.
fn clip() -> MemorySource {
    let mut source = MemorySource::new(4.0, 16, 12);
    for (i, t) in [0.0, 1.0, 2.0, 3.0].into_iter().enumerate() {
        let mut raster = Raster::solid(16, 12, [255, 255, 255, 255]);
        for y in 4..8 {
            for x in 4..12 {
                raster.set_pixel(x, y, [0, 0, 60 * i as u8 + 40, 255]);
            }
        }
        source.push_keyframe(t, raster).unwrap();
    }
    source
}

fn decode(bytes: &[u8]) -> image::DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn keyed_png_frames_round_trip_exactly() {
    let mut source = clip();
    let mut session = Session::new();
    let timestamps = plan(&PlanStrategy::Interval { step: 1.5 }, &mut source)
        .await
        .unwrap();
    assert_eq!(timestamps, vec![0.0, 1.5, 3.0]);

    let transforms = TransformConfig {
        background: Some(BackgroundKeyParams {
            tolerance: 20,
            edge_feather: false,
            mode: KeyMode::Full,
        }),
        remove_watermark: false,
    };
    let report = extract_all(
        timestamps,
        &mut source,
        &mut session,
        transforms,
        EncodeConfig::default(),
        CancelToken::new(),
        |_| {},
    )
    .await;

    assert_eq!(report.frames.len(), 3);
    assert_eq!(session.background(), Some(Rgb::WHITE));

    let frame = &report.frames[1];
    assert_eq!((frame.index, frame.timestamp), (1, 1.5));
    let decoded = decode(&frame.bytes).to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 12));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 0]);
    assert_eq!(decoded.get_pixel(5, 5).0, [0, 0, 100, 255]);
}

#[tokio::test]
async fn jpeg_output_keeps_requested_size() {
    let mut source = clip();
    let mut session = Session::new();
    let encode = EncodeConfig {
        format: OutputFormat::Jpeg,
        quality: 0.6,
        resize: Some((8, 6)),
    };
    let report = FrameExtractor::new(vec![2.0], &mut source, &mut session)
        .with_encode(encode)
        .run(|_| {})
        .await;

    assert_eq!(report.frames[0].format, OutputFormat::Jpeg);
    assert_eq!(decode(&report.frames[0].bytes).dimensions(), (8, 6));
}

#[tokio::test]
async fn failed_seeks_are_skipped_without_gaps() {
    let mut source = clip();
    let mut session = Session::new();
    let timestamps = plan(
        &PlanStrategy::Explicit {
            list: "3, 12, -1, 0.5".into(),
        },
        &mut source,
    )
    .await
    .unwrap();

    let report = extract_all(
        timestamps,
        &mut source,
        &mut session,
        TransformConfig::default(),
        EncodeConfig::default(),
        CancelToken::new(),
        |_| {},
    )
    .await;

    let produced: Vec<(usize, f64)> = report
        .frames
        .iter()
        .map(|f| (f.index, f.timestamp))
        .collect();
    assert_eq!(produced, vec![(0, 3.0), (1, 0.5)]);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().all(|s| s.error.is_seek_failure()));
    assert!(matches!(
        report.skipped[0].error,
        StillframeError::SeekOutOfRange { .. }
    ));
}

#[tokio::test]
async fn cancellation_keeps_emitted_frames() {
    let mut source = clip();
    let mut session = Session::new();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();

    let report = FrameExtractor::new(vec![0.0, 1.0, 2.0, 3.0], &mut source, &mut session)
        .with_cancel(cancel)
        .run(move |p| {
            if p.completed == 2 {
                trigger.cancel();
            }
        })
        .await;

    assert!(report.cancelled);
    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.frames[1].index, 1);
    assert_eq!(source.seek_count(), 2);
}

#[tokio::test]
async fn config_driven_run_exports_named_frames() {
    let json = r##"{
        "strategy": { "kind": "total_count", "count": 3 },
        "background": { "tolerance": 10 },
        "watermark": { "left": 0.0, "top": 0.0, "width": 0.25, "height": 0.25 },
        "background_color": "#ffffff"
    }"##;
    let config = ExtractionConfig::from_json_str(json).unwrap();
    config.validate().unwrap();

    let mut source = clip();
    let mut session = config.session();
    let timestamps = plan(&config.strategy, &mut source).await.unwrap();
    assert_eq!(timestamps, vec![0.0, 2.0, 4.0]);

    let report = FrameExtractor::new(timestamps, &mut source, &mut session)
        .with_transforms(config.transforms())
        .with_encode(config.output)
        .run(|_| {})
        .await;
    assert_eq!(report.frames.len(), 3);

    let dir = tempfile::tempdir().unwrap();
    let summary = export_frames(dir.path(), &report.frames, |_| {}).unwrap();
    assert!(dir.path().join("frames/frame_1.png").exists());
    assert!(dir.path().join("frames/frame_3.png").exists());

    let manifest: Vec<ManifestEntry> =
        serde_json::from_str(&std::fs::read_to_string(summary.manifest_path).unwrap()).unwrap();
    let labels: Vec<&str> = manifest.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["00:00.00", "00:02.00", "00:04.00"]);
}
