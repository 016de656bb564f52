//! Correlation of every voxel against one reference vector

use log::debug;
use rayon::prelude::*;
use voxcorr_core::{Field, FieldError};

use crate::corr::pearson;
use crate::parallel;

/// `out[v] = pearson(reference, field[v])` for every voxel, row-major over the
/// field's spatial shape.
///
/// # Errors
/// `LengthMismatch` when `reference.len()` differs from the channel count,
/// `ThreadPool` if the worker pool cannot be built.
pub fn reference_correlation_map(
    reference: &[f64],
    field: &Field<'_>,
    workers: Option<usize>,
) -> Result<Vec<f64>, FieldError> {
    if reference.len() != field.ngene() {
        return Err(FieldError::LengthMismatch {
            what: "reference vector",
            expected: field.ngene(),
            got: reference.len(),
        });
    }
    debug!(
        "reference_correlation_map: shape={:?} ngene={}",
        field.spatial_shape(),
        field.ngene()
    );
    parallel::install(workers, || {
        let mut out = vec![0.0f64; field.nvox()];
        out.par_iter_mut()
            .enumerate()
            .for_each(|(flat, o)| *o = pearson(reference, field.vector(flat)));
        out
    })
}
