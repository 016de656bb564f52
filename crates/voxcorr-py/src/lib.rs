#![allow(
    clippy::type_complexity,
    reason = "pyo3 functions often return tuples of arrays"
)]
#![allow(
    clippy::too_many_arguments,
    reason = "Python-exposed functions map directly to multiple array arguments"
)]
#![allow(
    clippy::needless_pass_by_value,
    reason = "PyReadonlyArray types are thin wrappers passed by value in pyo3 idioms"
)]
#![allow(
    clippy::elidable_lifetime_names,
    reason = "Explicit 'py lifetimes are idiomatic and clear in PyO3 signatures"
)]
//! Python bindings: numpy arrays in, numpy arrays / lists out.
//!
//! Arrays must be C-contiguous `float64` (`int64` for positions and shapes);
//! all compute runs with the GIL released.

mod helpers;

use numpy::ndarray::{ArrayD, IxDyn};
use numpy::{IntoPyArray, PyArray1, PyArrayDyn, PyReadonlyArray1, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyList, PyTuple};

use voxcorr_core::{Coord, Field, FieldError};
use voxcorr_kernels::FloodFillParams;

use crate::helpers::{
    convert_indices_usize_to_i64, convert_shape_i64_to_usize, parse_kernel, to_py_err,
};

fn dense_output<'py>(
    py: Python<'py>,
    shape: &[usize],
    data: Vec<f64>,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let arr = ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|_| PyValueError::new_err("Output shape mismatch"))?;
    Ok(arr.into_pyarray(py))
}

/// Pearson's correlation coefficient of two equal-length vectors.
#[pyfunction]
fn correlation(a: PyReadonlyArray1<'_, f64>, b: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    voxcorr_kernels::correlation(a.as_slice()?, b.as_slice()?).map_err(to_py_err)
}

/// Region growing from `pos` over the field `vf`; returns a list of tuples.
#[pyfunction]
#[pyo3(signature = (pos, vf, r = 0.6, min_pixels = 10, max_pixels = 2000))]
fn flood_fill<'py>(
    py: Python<'py>,
    pos: PyReadonlyArray1<'py, i64>,
    vf: PyReadonlyArrayDyn<'py, f64>,
    r: f64,
    min_pixels: usize,
    max_pixels: usize,
) -> PyResult<Bound<'py, PyList>> {
    let shape = vf.as_array().shape().to_vec();
    let field = Field::from_parts(&shape, vf.as_slice()?).map_err(to_py_err)?;
    let seed = Coord::from_slice(pos.as_slice()?, field.dims(), field.spatial_shape())
        .map_err(to_py_err)?;
    let params = FloodFillParams {
        threshold: r,
        min_pixels,
        max_pixels,
    };
    let region = py
        .detach(|| voxcorr_kernels::flood_fill(seed, &field, &params))
        .map_err(to_py_err)?;
    let items = region
        .iter()
        .map(|c| PyTuple::new(py, convert_indices_usize_to_i64(c.as_slice())?))
        .collect::<PyResult<Vec<_>>>()?;
    PyList::new(py, items)
}

/// Gaussian density estimate; returns `((xs, ys, zs), values)`.
#[pyfunction]
#[pyo3(signature = (h, x, y, z, shape, prune_coeff, kernel = None, ncores = None))]
fn density_estimate<'py>(
    py: Python<'py>,
    h: f64,
    x: PyReadonlyArray1<'py, f64>,
    y: PyReadonlyArray1<'py, f64>,
    z: PyReadonlyArray1<'py, f64>,
    shape: PyReadonlyArray1<'py, i64>,
    prune_coeff: f64,
    kernel: Option<&Bound<'py, PyAny>>,
    ncores: Option<usize>,
) -> PyResult<(
    (
        Bound<'py, PyArray1<i64>>,
        Bound<'py, PyArray1<i64>>,
        Bound<'py, PyArray1<i64>>,
    ),
    Bound<'py, PyArray1<f64>>,
)> {
    let kernel = parse_kernel(kernel)?;
    let shape_us = convert_shape_i64_to_usize(shape.as_slice()?)?;
    let (xs, ys, zs) = (x.as_slice()?, y.as_slice()?, z.as_slice()?);
    let map = py
        .detach(|| {
            voxcorr_kernels::density_estimate(h, xs, ys, zs, &shape_us, prune_coeff, kernel, ncores)
        })
        .map_err(to_py_err)?;
    let [cx, cy, cz] = map.columns();
    Ok((
        (
            PyArray1::from_vec(py, convert_indices_usize_to_i64(&cx)?),
            PyArray1::from_vec(py, convert_indices_usize_to_i64(&cy)?),
            PyArray1::from_vec(py, convert_indices_usize_to_i64(&cz)?),
        ),
        PyArray1::from_vec(py, map.data),
    ))
}

/// Correlation of every interior voxel with the summed neighbourhood; border is NaN.
#[pyfunction]
#[pyo3(signature = (vf, ncores = None, size = 1))]
fn neighborhood_correlation_map<'py>(
    py: Python<'py>,
    vf: PyReadonlyArrayDyn<'py, f64>,
    ncores: Option<usize>,
    size: usize,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let shape = vf.as_array().shape().to_vec();
    let field = Field::from_parts(&shape, vf.as_slice()?).map_err(to_py_err)?;
    let out = py
        .detach(|| voxcorr_kernels::neighborhood_correlation_map(&field, ncores, size))
        .map_err(to_py_err)?;
    dense_output(py, field.spatial_shape(), out)
}

/// Per-offset neighbourhood correlations with a trailing offset axis; border is NaN.
#[pyfunction]
#[pyo3(signature = (vf, ncores = None, size = 1))]
fn neighborhood_correlation_tensor<'py>(
    py: Python<'py>,
    vf: PyReadonlyArrayDyn<'py, f64>,
    ncores: Option<usize>,
    size: usize,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let shape = vf.as_array().shape().to_vec();
    let field = Field::from_parts(&shape, vf.as_slice()?).map_err(to_py_err)?;
    let noff = voxcorr_kernels::neighborhood_len(field.dims(), size)
        .ok_or_else(|| to_py_err(FieldError::WindowTooLarge(size)))?;
    let out = py
        .detach(|| voxcorr_kernels::neighborhood_correlation_tensor(&field, ncores, size))
        .map_err(to_py_err)?;
    let mut out_shape = field.spatial_shape().to_vec();
    out_shape.push(noff);
    dense_output(py, &out_shape, out)
}

/// Correlation of every voxel with the reference vector `vec`.
#[pyfunction]
#[pyo3(signature = (vec, vf, ncores = None))]
fn reference_correlation_map<'py>(
    py: Python<'py>,
    vec: PyReadonlyArray1<'py, f64>,
    vf: PyReadonlyArrayDyn<'py, f64>,
    ncores: Option<usize>,
) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
    let shape = vf.as_array().shape().to_vec();
    let field = Field::from_parts(&shape, vf.as_slice()?).map_err(to_py_err)?;
    let reference = vec.as_slice()?;
    let out = py
        .detach(|| voxcorr_kernels::reference_correlation_map(reference, &field, ncores))
        .map_err(to_py_err)?;
    dense_output(py, field.spatial_shape(), out)
}

#[pymodule]
fn _core(m: &Bound<PyModule>) -> PyResult<()> {
    m.add("version", voxcorr_core::VERSION)?;
    m.add_function(wrap_pyfunction!(correlation, m)?)?;
    m.add_function(wrap_pyfunction!(flood_fill, m)?)?;
    m.add_function(wrap_pyfunction!(density_estimate, m)?)?;
    m.add_function(wrap_pyfunction!(neighborhood_correlation_map, m)?)?;
    m.add_function(wrap_pyfunction!(neighborhood_correlation_tensor, m)?)?;
    m.add_function(wrap_pyfunction!(reference_correlation_map, m)?)?;
    Ok(())
}
