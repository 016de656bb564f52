//! Correlation-guided region growing from a seed voxel
//
// Breadth-first over axis-aligned neighbours (4 in 2D, 6 in 3D). A neighbour
// is admitted when its vector correlates with the *seed* vector above the
// threshold. The visited mask is set before a voxel is enqueued, so a voxel is
// emitted at most once. The traversal is strictly sequential: every admission
// depends on the mask state left by the previous one.

use std::collections::VecDeque;

use log::debug;
use voxcorr_core::{Coord, Field, FieldError};

use crate::corr::pearson;

/// Admission threshold and accepted region size range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodFillParams {
    /// Minimum correlation with the seed, exclusive.
    pub threshold: f64,
    pub min_pixels: usize,
    pub max_pixels: usize,
}

impl Default for FloodFillParams {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_pixels: 10,
            max_pixels: 2000,
        }
    }
}

/// Grow a region from `seed` and return it in discovery order (seed first).
///
/// The result is empty when the region has fewer than `min_pixels` voxels or
/// reaches more than `max_pixels`; in the latter case traversal stops as soon
/// as the cap is exceeded.
///
/// # Errors
/// `RankMismatch` if the seed's rank differs from the field's spatial rank,
/// `OutOfBounds` if the seed lies outside the field.
pub fn flood_fill(
    seed: Coord,
    field: &Field<'_>,
    params: &FloodFillParams,
) -> Result<Vec<Coord>, FieldError> {
    let dims = field.dims();
    let shape = field.spatial_shape();
    if seed.dims() != dims {
        return Err(FieldError::RankMismatch {
            what: "seed position",
            expected: dims.rank(),
            got: seed.dims().rank(),
        });
    }
    if !field.contains(&seed) {
        return Err(FieldError::OutOfBounds {
            what: "seed position",
            coord: seed
                .as_slice()
                .iter()
                .map(|&p| i64::try_from(p).unwrap_or(i64::MAX))
                .collect(),
            shape: shape.to_vec(),
        });
    }
    debug!(
        "flood_fill: seed={:?} shape={shape:?} r={} range=[{}, {}]",
        seed.as_slice(),
        params.threshold,
        params.min_pixels,
        params.max_pixels
    );

    let seed_vec = field.vector_at(&seed);
    let mut visited = vec![false; field.nvox()];
    let mut queue = VecDeque::new();
    let mut filled = Vec::new();

    visited[field.flat_index(&seed)] = true;
    queue.push_back(seed);
    while let Some(cur) = queue.pop_front() {
        filled.push(cur);
        if filled.len() > params.max_pixels {
            debug!("flood_fill: region exceeds max_pixels={}, discarded", params.max_pixels);
            return Ok(Vec::new());
        }
        for &delta in dims.unit_steps() {
            let Some(next) = cur.step(delta, shape) else {
                continue;
            };
            let idx = field.flat_index(&next);
            if visited[idx] {
                continue;
            }
            if pearson(seed_vec, field.vector(idx)) > params.threshold {
                visited[idx] = true;
                queue.push_back(next);
            }
        }
    }

    if filled.len() < params.min_pixels {
        debug!(
            "flood_fill: region of {} below min_pixels={}, discarded",
            filled.len(),
            params.min_pixels
        );
        return Ok(Vec::new());
    }
    Ok(filled)
}
