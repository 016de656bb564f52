//! Conversions shared by the bindings: error mapping and shape/index casts

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use voxcorr_core::FieldError;
use voxcorr_kernels::Kernel;

/// Validation failures surface as `ValueError`; pool construction as `RuntimeError`.
pub(crate) fn to_py_err(e: FieldError) -> PyErr {
    match e {
        FieldError::ThreadPool(msg) => PyRuntimeError::new_err(msg),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Convert i64 shape array to usize Vec, with validation
///
/// # Errors
/// Returns `PyValueError` if any dimension is negative or overflows usize
pub(crate) fn convert_shape_i64_to_usize(shape: &[i64]) -> PyResult<Vec<usize>> {
    let mut result = Vec::with_capacity(shape.len());
    for &s in shape {
        if s < 0 {
            return Err(PyValueError::new_err("shape dimensions must be non-negative"));
        }
        result.push(
            usize::try_from(s)
                .map_err(|_| PyValueError::new_err(format!("shape dimension {s} overflows usize")))?,
        );
    }
    Ok(result)
}

/// Convert voxel indices to i64 for Python return
///
/// # Errors
/// Returns `PyValueError` if an index does not fit in i64
pub(crate) fn convert_indices_usize_to_i64(indices: &[usize]) -> PyResult<Vec<i64>> {
    indices
        .iter()
        .map(|&i| {
            i64::try_from(i).map_err(|_| PyValueError::new_err(format!("index {i} overflows i64")))
        })
        .collect()
}

/// Density kernel selector: `"gaussian"` or the legacy integer code `0`.
pub(crate) fn parse_kernel(kernel: Option<&Bound<'_, PyAny>>) -> PyResult<Kernel> {
    let Some(obj) = kernel else {
        return Ok(Kernel::Gaussian);
    };
    if let Ok(name) = obj.extract::<String>() {
        return match name.to_ascii_lowercase().as_str() {
            "gaussian" => Ok(Kernel::Gaussian),
            other => Err(PyValueError::new_err(format!("unsupported kernel '{other}'"))),
        };
    }
    match obj.extract::<i64>() {
        Ok(0) => Ok(Kernel::Gaussian),
        Ok(code) => Err(PyValueError::new_err(format!("unsupported kernel code {code}"))),
        Err(_) => Err(PyValueError::new_err("kernel must be a string or an integer code")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_shape_valid() {
        let result = convert_shape_i64_to_usize(&[10, 20, 1]).unwrap();
        assert_eq!(result, vec![10_usize, 20, 1]);
    }

    #[test]
    fn test_convert_shape_negative() {
        assert!(convert_shape_i64_to_usize(&[10, -1, 30]).is_err());
    }

    #[test]
    fn test_convert_indices() {
        let result = convert_indices_usize_to_i64(&[0, 3, 7]).unwrap();
        assert_eq!(result, vec![0_i64, 3, 7]);
    }
}
