//! Integration tests for time-point planning.
//!
//! Runs every strategy through `plan` against in-memory sources.

use stillframe_core::{Raster, StillframeError};
use stillframe_media::MemorySource;
use stillframe_pipeline::{plan, PlanStrategy, StartEndParams};

// ── Helpers ────────────────────────────────────────────────────

fn gray(v: u8) -> Raster {
    Raster::solid(8, 8, [v, v, v, 255])
}

/// A 10 second source where the picture drifts away from the first frame
/// and comes back around 6 s.
fn looping_source() -> MemorySource {
    let mut source = MemorySource::new(10.0, 8, 8);
    let shades = [
        (0.0, 50),
        (1.0, 90),
        (2.0, 130),
        (3.0, 170),
        (4.0, 130),
        (5.0, 90),
        (6.0, 52),
        (7.0, 50),
        (8.0, 90),
    ];
    for (t, v) in shades {
        source.push_keyframe(t, gray(v)).unwrap();
    }
    source
}

// ── Pure strategies ────────────────────────────────────────────

#[tokio::test]
async fn interval_plan_stays_below_duration() {
    let mut source = MemorySource::new(10.0, 8, 8);
    let points = plan(&PlanStrategy::Interval { step: 3.0 }, &mut source)
        .await
        .unwrap();
    assert_eq!(points, vec![0.0, 3.0, 6.0, 9.0]);
}

#[tokio::test]
async fn total_count_plan_includes_both_ends() {
    let mut source = MemorySource::new(9.0, 8, 8);
    let points = plan(&PlanStrategy::TotalCount { count: 4 }, &mut source)
        .await
        .unwrap();
    assert_eq!(points, vec![0.0, 3.0, 6.0, 9.0]);

    let single = plan(&PlanStrategy::TotalCount { count: 1 }, &mut source)
        .await
        .unwrap();
    assert_eq!(single, vec![0.0]);
}

#[tokio::test]
async fn explicit_plan_drops_junk_and_keeps_order() {
    let mut source = MemorySource::new(9.0, 8, 8);
    let strategy = PlanStrategy::Explicit {
        list: "1, a, 3.5s,".into(),
    };
    assert_eq!(plan(&strategy, &mut source).await.unwrap(), vec![1.0, 3.5]);

    let unsorted = PlanStrategy::Explicit {
        list: "8,2,5".into(),
    };
    assert_eq!(
        plan(&unsorted, &mut source).await.unwrap(),
        vec![8.0, 2.0, 5.0]
    );
}

#[tokio::test]
async fn invalid_parameters_abort_planning() {
    let mut source = MemorySource::new(9.0, 8, 8);
    for strategy in [
        PlanStrategy::Interval { step: 0.0 },
        PlanStrategy::TotalCount { count: 0 },
    ] {
        let err = plan(&strategy, &mut source).await.unwrap_err();
        assert!(matches!(err, StillframeError::InvalidParameter(_)));
    }
}

// ── Start/end detection ────────────────────────────────────────

#[tokio::test]
async fn start_end_uses_first_threshold_crossing() {
    // 6.0 s differs by 2 and crosses the threshold; 7.0 s would be exact.
    let mut source = looping_source();
    let params = StartEndParams {
        first_frame_time: 0.0,
        search_start_offset: 1.0,
        step: 1.0,
        similarity_threshold: 5.0,
        max_search_duration: 20.0,
        segment_count: 3,
    };
    let points = plan(&PlanStrategy::StartEnd(params), &mut source)
        .await
        .unwrap();
    assert_eq!(points, vec![0.0, 2.0, 4.0]);
}

#[tokio::test]
async fn start_end_respects_search_window() {
    // Only 1..4 s is scanned, so the best match is 1.0 s (difference 40).
    let mut source = looping_source();
    let params = StartEndParams {
        first_frame_time: 0.0,
        search_start_offset: 1.0,
        step: 1.0,
        similarity_threshold: 5.0,
        max_search_duration: 3.0,
        segment_count: 2,
    };
    let points = plan(&PlanStrategy::StartEnd(params), &mut source)
        .await
        .unwrap();
    assert_eq!(points, vec![0.0, 0.5]);
}

#[tokio::test]
async fn start_end_with_empty_scan_finds_nothing() {
    let mut source = looping_source();
    let params = StartEndParams {
        first_frame_time: 9.95,
        search_start_offset: 0.0,
        ..Default::default()
    };
    let err = plan(&PlanStrategy::StartEnd(params), &mut source)
        .await
        .unwrap_err();
    assert!(matches!(err, StillframeError::NoMatchFound(_)));
}
