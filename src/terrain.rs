// ==============================================================================
// terrain.rs — GROUND SHAPES
// ------------------------------------------------------------------------------
// flat:  thin cuboid whose top face sits exactly at y = 0
// bumpy: seeded heightfield, heights in [0, bump_height], smoothed so the
//        wheels see rolling bumps instead of per-sample spikes
// ==============================================================================

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::*;

use crate::config::{TerrainKind, WorldSettings};

const FLAT_HALF_THICKNESS: f32 = 0.1;

pub fn ground_collider(world: &WorldSettings) -> ColliderBuilder {
    match world.terrain {
        TerrainKind::Flat => {
            let half = world.size * 0.5;
            ColliderBuilder::cuboid(half, FLAT_HALF_THICKNESS, half)
                .translation(vector![0.0, -FLAT_HALF_THICKNESS, 0.0])
        }
        TerrainKind::Bumpy => {
            let n = world.resolution;
            let heights = generate_heights(n, world.bump_height, world.seed);
            let matrix = DMatrix::from_row_slice(n, n, &heights);
            ColliderBuilder::heightfield(matrix, vector![world.size, 1.0, world.size])
        }
    }
}

/// Row-major `n x n` heights in `[0, bump_height]`. Same seed, same terrain.
pub fn generate_heights(n: usize, bump_height: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut heights: Vec<f32> = (0..n * n).map(|_| rng.gen_range(0.0..1.0)).collect();

    for _ in 0..2 {
        heights = box_blur(&heights, n);
    }

    let (lo, hi) = heights
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));

    if hi - lo < 1e-6 {
        return vec![0.0; n * n];
    }

    heights
        .iter()
        .map(|h| (h - lo) / (hi - lo) * bump_height)
        .collect()
}

fn box_blur(src: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0; src.len()];
    for row in 0..n {
        for col in 0..n {
            let mut sum = 0.0;
            let mut count = 0.0;
            for r in row.saturating_sub(1)..=(row + 1).min(n - 1) {
                for c in col.saturating_sub(1)..=(col + 1).min(n - 1) {
                    sum += src[r * n + c];
                    count += 1.0;
                }
            }
            out[row * n + col] = sum / count;
        }
    }
    out
}
