//! Integration tests for the pixel transforms.
//!
//! Exercises stillframe-effects against stillframe-core rasters, regions
//! and session state.

use stillframe_core::{NormalizedRegion, Raster, Rgb, Session, WatermarkPreset};
use stillframe_effects::{
    blank_watermark, BackgroundKeyParams, BackgroundKeyer, KeyMode, TransformConfig,
};

const GREEN: [u8; 4] = [0, 255, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

/// 12x12 green frame with a red ring (rows/cols 3..=8) around a green
/// 4x4 island at 4..=7.
fn framed_island() -> Raster {
    let mut raster = Raster::solid(12, 12, GREEN);
    for y in 3..=8 {
        for x in 3..=8 {
            let edge = x == 3 || x == 8 || y == 3 || y == 8;
            raster.set_pixel(x, y, if edge { RED } else { GREEN });
        }
    }
    raster
}

fn params(mode: KeyMode) -> BackgroundKeyParams {
    BackgroundKeyParams {
        tolerance: 30,
        edge_feather: false,
        mode,
    }
}

#[test]
fn continuous_keying_keeps_enclosed_island() {
    let mut raster = framed_island();
    BackgroundKeyer::key_background(&mut raster, Rgb::GREEN, &params(KeyMode::Continuous));

    assert_eq!(raster.pixel(0, 0)[3], 0);
    assert_eq!(raster.pixel(11, 11)[3], 0);
    assert_eq!(raster.pixel(3, 3), RED);
    for y in 4..=7 {
        for x in 4..=7 {
            assert_eq!(raster.pixel(x, y), GREEN, "island pixel ({x},{y}) was keyed");
        }
    }
}

#[test]
fn full_keying_removes_island_too() {
    let mut raster = framed_island();
    BackgroundKeyer::key_background(&mut raster, Rgb::GREEN, &params(KeyMode::Full));
    assert_eq!(raster.pixel(5, 5)[3], 0);
    assert_eq!(raster.pixel(3, 3), RED);
}

#[test]
fn keying_twice_matches_keying_once() {
    for mode in [KeyMode::Full, KeyMode::Continuous] {
        let p = BackgroundKeyParams {
            edge_feather: true,
            ..params(mode)
        };
        let mut once = Raster::test_pattern(64, 16);
        BackgroundKeyer::key_background(&mut once, Rgb::WHITE, &p);
        let mut twice = once.clone();
        BackgroundKeyer::key_background(&mut twice, Rgb::WHITE, &p);
        assert_eq!(once, twice, "{mode:?} keying is not idempotent");
    }
}

#[test]
fn watermark_blanking_overwrites_every_channel() {
    let mut raster = Raster::test_pattern(100, 50);
    for px in raster.data_mut().chunks_exact_mut(4) {
        px[3] = 0;
    }
    let region = WatermarkPreset::BottomRight.region();
    let fill = Rgb::new(12, 34, 56);
    let rect = blank_watermark(&mut raster, &region, fill).unwrap();

    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            assert_eq!(raster.pixel(x, y), [12, 34, 56, 255]);
        }
    }
    assert_eq!(raster.pixel(0, 0)[3], 0);
}

#[test]
fn region_is_clamped_into_the_frame() {
    let region = NormalizedRegion::new(0.9, 0.9, 0.5, 0.5);
    assert_eq!(region.left(), 0.9);
    assert_eq!(region.top(), 0.9);
    assert!((region.width() - 0.1).abs() < 1e-12);
    assert!((region.height() - 0.1).abs() < 1e-12);
}

#[test]
fn blanked_watermark_in_background_color_is_keyed() {
    // A white logo in the top-left corner of a green frame.
    let mut raster = Raster::solid(40, 20, GREEN);
    for y in 1..3 {
        for x in 1..8 {
            raster.set_pixel(x, y, [255, 255, 255, 255]);
        }
    }

    let mut session = Session::new();
    session.set_background(Rgb::GREEN);
    session.set_watermark(NormalizedRegion::new(0.0, 0.0, 0.25, 0.25));

    let config = TransformConfig {
        background: Some(params(KeyMode::Continuous)),
        remove_watermark: true,
    };
    config.apply(&mut raster, &mut session);

    assert!(raster.data().chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn unset_background_defaults_from_first_frame() {
    let mut session = Session::new();
    let config = TransformConfig {
        background: Some(params(KeyMode::Full)),
        remove_watermark: false,
    };

    let mut first = framed_island();
    config.apply(&mut first, &mut session);
    assert_eq!(session.background(), Some(Rgb::GREEN));

    // A later frame with a red corner is still keyed against green.
    let mut second = framed_island();
    second.set_pixel(0, 0, RED);
    config.apply(&mut second, &mut session);
    assert_eq!(session.background(), Some(Rgb::GREEN));
    assert_eq!(second.pixel(0, 0), RED);
    assert_eq!(second.pixel(1, 0)[3], 0);
}
