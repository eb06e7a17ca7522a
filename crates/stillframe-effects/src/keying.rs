//! Background color keying with full-frame and border-connected removal.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use stillframe_core::raster::BYTES_PER_PIXEL;
use stillframe_core::{Raster, Rgb};

/// Which pixels are eligible for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    /// Every pixel is tested independently.
    #[default]
    Full,
    /// Only pixels connected to the frame border through background-colored
    /// pixels are removed. Enclosed background islands survive.
    Continuous,
}

/// Parameters for background keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundKeyParams {
    /// Euclidean RGB distance below which a pixel is background.
    pub tolerance: u32,
    /// Ramp alpha back to opaque between `tolerance` and `2 * tolerance`.
    /// Full mode only.
    #[serde(default)]
    pub edge_feather: bool,
    #[serde(default)]
    pub mode: KeyMode,
}

impl Default for BackgroundKeyParams {
    fn default() -> Self {
        Self {
            tolerance: 30,
            edge_feather: false,
            mode: KeyMode::Full,
        }
    }
}

impl BackgroundKeyParams {
    /// Alpha for a pixel at `distance` from the key color, or `None` to
    /// leave it unchanged.
    #[inline]
    pub fn keyed_alpha(&self, distance: f64) -> Option<u8> {
        let tol = self.tolerance as f64;
        if distance < tol {
            Some(0)
        } else if self.edge_feather && distance < tol * 2.0 {
            Some((((distance - tol) / tol) * 255.0).round() as u8)
        } else {
            None
        }
    }
}

/// Background keying processor. Only the alpha channel is ever written.
pub struct BackgroundKeyer;

impl BackgroundKeyer {
    /// Key `color` out of `raster` in place.
    ///
    /// Returns the number of pixels whose alpha was assigned.
    pub fn key_background(raster: &mut Raster, color: Rgb, params: &BackgroundKeyParams) -> usize {
        match params.mode {
            KeyMode::Full => Self::key_full(raster, color, params),
            KeyMode::Continuous => Self::key_continuous(raster, color, params),
        }
    }

    fn key_full(raster: &mut Raster, color: Rgb, params: &BackgroundKeyParams) -> usize {
        let mut keyed = 0;
        for px in raster.data_mut().chunks_exact_mut(BYTES_PER_PIXEL) {
            if let Some(alpha) = params.keyed_alpha(color.distance(px)) {
                px[3] = alpha;
                keyed += 1;
            }
        }
        keyed
    }

    /// Breadth-first flood fill seeded from every border pixel.
    ///
    /// A pixel is marked visited when enqueued, so each is examined once.
    /// Only pixels strictly within tolerance are keyed and spread the fill.
    /// Edge feathering does not apply here.
    fn key_continuous(raster: &mut Raster, color: Rgb, params: &BackgroundKeyParams) -> usize {
        let w = raster.width() as usize;
        let h = raster.height() as usize;
        if w == 0 || h == 0 {
            return 0;
        }
        let tol = params.tolerance as f64;
        let mut visited = vec![false; w * h];
        let mut queue: VecDeque<(usize, usize)> = VecDeque::with_capacity(2 * (w + h));

        fn enqueue(
            queue: &mut VecDeque<(usize, usize)>,
            visited: &mut [bool],
            w: usize,
            x: usize,
            y: usize,
        ) {
            let i = y * w + x;
            if !visited[i] {
                visited[i] = true;
                queue.push_back((x, y));
            }
        }

        for x in 0..w {
            enqueue(&mut queue, &mut visited, w, x, 0);
            enqueue(&mut queue, &mut visited, w, x, h - 1);
        }
        for y in 0..h {
            enqueue(&mut queue, &mut visited, w, 0, y);
            enqueue(&mut queue, &mut visited, w, w - 1, y);
        }

        let data = raster.data_mut();
        let mut keyed = 0;

        while let Some((x, y)) = queue.pop_front() {
            let idx = (y * w + x) * BYTES_PER_PIXEL;
            let distance = color.distance(&data[idx..idx + 3]);

            if distance >= tol {
                continue;
            }
            data[idx + 3] = 0;
            keyed += 1;

            if x + 1 < w {
                enqueue(&mut queue, &mut visited, w, x + 1, y);
            }
            if x > 0 {
                enqueue(&mut queue, &mut visited, w, x - 1, y);
            }
            if y + 1 < h {
                enqueue(&mut queue, &mut visited, w, x, y + 1);
            }
            if y > 0 {
                enqueue(&mut queue, &mut visited, w, x, y - 1);
            }
        }

        keyed
    }
}
