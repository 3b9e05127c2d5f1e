//! Synthetic test fields and partition checks
//!
//! The field builders panic on invalid dimensions; they only serve tests.

use quadseg_core::{Field, Rect};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Single-channel field with every sample set to `value`
pub fn uniform_field(width: u32, height: u32, value: f32) -> Field {
    Field::new_with_value(width, height, 1, value).expect("valid test field dimensions")
}

/// Single-channel field whose four quadrants hold `values` in top-left,
/// top-right, bottom-left, bottom-right order
///
/// Quadrant boundaries are those of [`Rect::quadrants`].
pub fn quadrant_field(width: u32, height: u32, values: [f32; 4]) -> Field {
    let mut field = uniform_field(width, height, 0.0);
    for (rect, v) in field.bounds().quadrants().into_iter().zip(values) {
        if !rect.is_empty() {
            field.fill_rect(rect, &[v]).expect("quadrant inside field");
        }
    }
    field
}

/// Single-channel horizontal ramp: sample `(x, y)` is `x * step`
pub fn gradient_field(width: u32, height: u32, step: f32) -> Field {
    Field::from_fn(width, height, |x, _| x as f32 * step).expect("valid test field dimensions")
}

/// Single-channel checkerboard of `cell x cell` squares alternating
/// between `low` and `high`, starting with `low` at the origin
pub fn checkerboard_field(width: u32, height: u32, cell: u32, low: f32, high: f32) -> Field {
    let cell = cell.max(1);
    Field::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 { low } else { high }
    })
    .expect("valid test field dimensions")
}

/// Field of uniformly distributed samples in `[0, max)`, reproducible
/// from `seed`
pub fn noise_field(width: u32, height: u32, channels: u32, max: f32, seed: u64) -> Field {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = width as usize * height as usize * channels as usize;
    let data = (0..n).map(|_| rng.random_range(0.0..max)).collect();
    Field::from_data(width, height, channels, data).expect("valid test field dimensions")
}

/// Check that `rects` are pairwise disjoint, lie inside `roi` and cover it
/// completely
pub fn tiles_exactly(rects: &[Rect], roi: Rect) -> bool {
    let area: u64 = rects.iter().map(|r| r.area()).sum();
    if area != roi.area() || !rects.iter().all(|r| roi.contains_rect(r)) {
        return false;
    }
    rects
        .iter()
        .enumerate()
        .all(|(i, a)| rects[i + 1..].iter().all(|b| !a.overlaps(b)))
}
