//! Local correlation maps: each interior voxel against its neighbourhood
//
// A voxel is interior when it is at least `size` steps away from every
// boundary along every spatial axis. Non-interior cells keep `NaN`.
// Neighbour offsets are turned into flat index deltas once per call, so the
// per-voxel loop only adds a signed delta to the voxel's own flat index.

use std::cell::RefCell;

use log::debug;
use rayon::prelude::*;
use thread_local::ThreadLocal;
use voxcorr_core::{Dims, Field, FieldError};
use wide::f64x4;

use crate::corr::pearson;
use crate::parallel;

/// Window offsets excluding the centre, outermost axis slowest, ascending
/// along every axis. Length is `(2 * size + 1)^d - 1`.
#[must_use]
pub fn neighborhood_offsets(dims: Dims, size: usize) -> Vec<[isize; 3]> {
    let s = isize::try_from(size).unwrap_or(isize::MAX);
    let zr = match dims {
        Dims::Two => 0..=0,
        Dims::Three => -s..=s,
    };
    let mut out = Vec::new();
    for dx in -s..=s {
        for dy in -s..=s {
            for dz in zr.clone() {
                if dx != 0 || dy != 0 || dz != 0 {
                    out.push([dx, dy, dz]);
                }
            }
        }
    }
    out
}

/// Number of window offsets, `(2 * size + 1)^d - 1`, without enumerating
/// them. `None` if the count does not fit in `usize`.
#[must_use]
pub fn neighborhood_len(dims: Dims, size: usize) -> Option<usize> {
    let side = size.checked_mul(2)?.checked_add(1)?;
    let rank = u32::try_from(dims.rank()).ok()?;
    Some(side.checked_pow(rank)? - 1)
}

/// Whether any voxel is at least `size` steps from every boundary.
fn has_interior(field: &Field<'_>, size: usize) -> bool {
    field
        .spatial_shape()
        .iter()
        .all(|&extent| size.checked_mul(2).is_some_and(|w| w < extent))
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "Field extents always fit in isize because the buffer exists"
)]
fn flat_deltas(offsets: &[[isize; 3]], shape: [usize; 3]) -> Vec<isize> {
    let (s1, s2) = (shape[1] as isize, shape[2] as isize);
    offsets
        .iter()
        .map(|d| (d[0] * s1 + d[1]) * s2 + d[2])
        .collect()
}

#[inline]
fn is_interior(field: &Field<'_>, flat: usize, size: usize) -> bool {
    let p = field.unravel(flat);
    field
        .spatial_shape()
        .iter()
        .zip(p)
        .all(|(&extent, c)| c >= size && c + size < extent)
}

/// `acc += v`, four lanes at a time.
#[inline]
fn add_assign(acc: &mut [f64], v: &[f64]) {
    let n = acc.len();
    let limit4 = n & !3;
    let mut i = 0usize;
    while i < limit4 {
        let s = f64x4::from([acc[i], acc[i + 1], acc[i + 2], acc[i + 3]])
            + f64x4::from([v[i], v[i + 1], v[i + 2], v[i + 3]]);
        acc[i..i + 4].copy_from_slice(&s.to_array());
        i += 4;
    }
    while i < n {
        acc[i] += v[i];
        i += 1;
    }
}

/// Correlation of each interior voxel with the sum of its neighbours in the
/// `(2 * size + 1)^d` window (centre excluded). Shape equals the field's
/// spatial shape, row-major.
///
/// # Errors
/// `ThreadPool` if the worker pool cannot be built.
pub fn neighborhood_correlation_map(
    field: &Field<'_>,
    workers: Option<usize>,
    size: usize,
) -> Result<Vec<f64>, FieldError> {
    let nvox = field.nvox();
    let ngene = field.ngene();
    debug!(
        "neighborhood_correlation_map: shape={:?} ngene={ngene} size={size}",
        field.spatial_shape()
    );
    if !has_interior(field, size) {
        return Ok(vec![f64::NAN; nvox]);
    }
    let deltas = flat_deltas(&neighborhood_offsets(field.dims(), size), field.shape3());

    parallel::install(workers, || {
        let tls: ThreadLocal<RefCell<Vec<f64>>> = ThreadLocal::new();
        let mut out = vec![f64::NAN; nvox];
        out.par_iter_mut().enumerate().for_each(|(flat, o)| {
            if !is_interior(field, flat, size) {
                return;
            }
            let cell = tls.get_or(|| RefCell::new(vec![0.0f64; ngene]));
            let mut agg = cell.borrow_mut();
            agg.fill(0.0);
            for &d in &deltas {
                add_assign(&mut agg, field.vector(flat.wrapping_add_signed(d)));
            }
            *o = pearson(field.vector(flat), &agg);
        });
        out
    })
}

/// Correlation of each interior voxel with every neighbour separately.
///
/// The output has the field's spatial shape plus a trailing axis of
/// `(2 * size + 1)^d - 1` entries ordered as [`neighborhood_offsets`].
///
/// # Errors
/// `WindowTooLarge` if the output length overflows `usize`, `ThreadPool` if
/// the worker pool cannot be built.
pub fn neighborhood_correlation_tensor(
    field: &Field<'_>,
    workers: Option<usize>,
    size: usize,
) -> Result<Vec<f64>, FieldError> {
    let nvox = field.nvox();
    let total = neighborhood_len(field.dims(), size)
        .and_then(|noff| noff.checked_mul(nvox).map(|t| (noff, t)));
    let Some((noff, total)) = total else {
        return Err(FieldError::WindowTooLarge(size));
    };
    debug!(
        "neighborhood_correlation_tensor: shape={:?} size={size} offsets={noff}",
        field.spatial_shape()
    );
    if noff == 0 {
        return Ok(Vec::new());
    }
    if !has_interior(field, size) {
        return Ok(vec![f64::NAN; total]);
    }
    let deltas = flat_deltas(&neighborhood_offsets(field.dims(), size), field.shape3());

    parallel::install(workers, || {
        let mut out = vec![f64::NAN; total];
        out.par_chunks_mut(noff).enumerate().for_each(|(flat, row)| {
            if !is_interior(field, flat, size) {
                return;
            }
            let center = field.vector(flat);
            for (o, &d) in row.iter_mut().zip(&deltas) {
                *o = pearson(center, field.vector(flat.wrapping_add_signed(d)));
            }
        });
        out
    })
}
