//! Sparse Gaussian kernel density estimate over a 3D voxel grid
//
// Samples are split into chunks; every worker thread accumulates into its own
// `MassMap`, and the per-thread maps are folded into one after the parallel
// loop has finished. Addition is commutative, so the result only depends on
// the worker count through floating-point summation order.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "Grid coordinates are clipped to the shape before conversion"
)]

use std::cell::RefCell;

use log::{debug, trace};
use rayon::prelude::*;
use thread_local::ThreadLocal;
use voxcorr_core::{DensityMap, FieldError};

use crate::mass_map::MassMap;
use crate::parallel;

/// Density kernel shape. Only the isotropic Gaussian is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Kernel {
    #[default]
    Gaussian,
}

impl Kernel {
    /// Kernel weight at squared distance `d2`, measured in bandwidths.
    #[inline]
    #[must_use]
    pub fn weight(self, d2: f64) -> f64 {
        match self {
            Self::Gaussian => (-0.5 * d2).exp(),
        }
    }
}

/// Half-open index range `[lo, hi)` of one axis of a sample's scope.
///
/// Both the floored position and the half-width may be saturated `i64`
/// values (far-off samples, huge `prune_coeff`), so the cube edges saturate
/// too before clipping.
#[inline]
fn axis_scope(pos: f64, extent: usize, half_width: Option<i64>) -> (usize, usize) {
    let extent_i = i64::try_from(extent).unwrap_or(i64::MAX);
    match half_width {
        None => (0, extent),
        Some(w) => {
            let base = pos.floor() as i64;
            let lo = base.saturating_sub(w).clamp(0, extent_i);
            let hi = base.saturating_add(w).saturating_add(1).clamp(0, extent_i);
            (lo as usize, hi.max(lo) as usize)
        }
    }
}

/// Squared, bandwidth-normalised distances from `pos` to each index in `[lo, hi)`.
#[inline]
fn axis_d2(pos: f64, lo: usize, hi: usize, bandwidth: f64) -> Vec<f64> {
    (lo..hi)
        .map(|i| {
            let d = (i as f64 - pos) / bandwidth;
            d * d
        })
        .collect()
}

fn scatter_sample(
    acc: &mut MassMap,
    shape: [usize; 3],
    p: [f64; 3],
    bandwidth: f64,
    half_width: Option<i64>,
    kernel: Kernel,
) {
    let (x0, x1) = axis_scope(p[0], shape[0], half_width);
    let (y0, y1) = axis_scope(p[1], shape[1], half_width);
    let (z0, z1) = axis_scope(p[2], shape[2], half_width);
    if x0 == x1 || y0 == y1 || z0 == z1 {
        return;
    }
    let dx = axis_d2(p[0], x0, x1, bandwidth);
    let dy = axis_d2(p[1], y0, y1, bandwidth);
    let dz = axis_d2(p[2], z0, z1, bandwidth);
    for (x, &ddx) in (x0..x1).zip(&dx) {
        for (y, &ddy) in (y0..y1).zip(&dy) {
            let row = (x * shape[1] + y) * shape[2];
            for (z, &ddz) in (z0..z1).zip(&dz) {
                acc.insert_add(row + z, kernel.weight(ddx + ddy + ddz));
            }
        }
    }
}

/// Accumulate kernel mass from every sample `(x[i], y[i], z[i])` onto the
/// integer voxels of `shape` (three extents; 2D data uses a unit third axis).
///
/// With `prune_coeff <= 0` every voxel of the grid receives mass from every
/// sample. Otherwise a sample only reaches the cube of half-width
/// `floor(bandwidth * prune_coeff)` around its floored position, clipped to
/// the grid. Non-finite samples are skipped.
///
/// # Errors
/// `LengthMismatch` for unequal coordinate columns, `RankMismatch` if `shape`
/// does not have three extents, `InvalidBandwidth` unless the bandwidth is
/// finite and positive, `ThreadPool` if the worker pool cannot be built.
#[allow(
    clippy::too_many_arguments,
    reason = "Mirrors the flat column-oriented calling convention of the bindings"
)]
pub fn density_estimate(
    bandwidth: f64,
    x: &[f64],
    y: &[f64],
    z: &[f64],
    shape: &[usize],
    prune_coeff: f64,
    kernel: Kernel,
    workers: Option<usize>,
) -> Result<DensityMap, FieldError> {
    for (what, col) in [("y coordinates", y), ("z coordinates", z)] {
        if col.len() != x.len() {
            return Err(FieldError::LengthMismatch {
                what,
                expected: x.len(),
                got: col.len(),
            });
        }
    }
    let shape: [usize; 3] = shape.try_into().map_err(|_| FieldError::RankMismatch {
        what: "density shape",
        expected: 3,
        got: shape.len(),
    })?;
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Err(FieldError::InvalidBandwidth(bandwidth));
    }
    let half_width = (prune_coeff > 0.0).then(|| (bandwidth * prune_coeff).floor() as i64);
    let npts = x.len();
    debug!(
        "density_estimate: npts={npts} shape={shape:?} h={bandwidth} half_width={half_width:?}"
    );
    if npts == 0 || shape.contains(&0) {
        return Ok(DensityMap::from_sorted_pairs(shape, &[]));
    }

    let merged = parallel::install(workers, || {
        let tls: ThreadLocal<RefCell<MassMap>> = ThreadLocal::new();
        let chunk = 1.max(npts / (rayon::current_num_threads().max(1) * 8));
        (0..npts.div_ceil(chunk)).into_par_iter().for_each(|t| {
            let start = t * chunk;
            let end = (start + chunk).min(npts);
            let cell = tls.get_or(|| RefCell::new(MassMap::with_capacity(1024)));
            let mut acc = cell.borrow_mut();
            for i in start..end {
                let p = [x[i], y[i], z[i]];
                if p.iter().all(|v| v.is_finite()) {
                    scatter_sample(&mut acc, shape, p, bandwidth, half_width, kernel);
                }
            }
        });

        let mut locals: Vec<MassMap> = tls.into_iter().map(RefCell::into_inner).collect();
        locals.sort_unstable_by_key(|m| std::cmp::Reverse(m.len()));
        let mut locals = locals.into_iter();
        let mut merged = locals.next().unwrap_or_else(|| MassMap::with_capacity(16));
        for local in locals {
            trace!("density_estimate: merging worker map of {} voxels", local.len());
            merged.merge_from(&local);
        }
        merged
    })?;

    let pairs = merged.into_sorted_pairs();
    debug!("density_estimate: {} voxels received mass", pairs.len());
    Ok(DensityMap::from_sorted_pairs(shape, &pairs))
}
