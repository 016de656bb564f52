//! Dense multichannel field view and constructor

use crate::coord::{Coord, Dims};
use crate::error::FieldError;

/// Row-major grid of channel vectors: spatial axes first, channel axis last.
///
/// The view borrows its buffer; shape and data are fixed for the lifetime
/// of the view.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    data: &'a [f64],
    shape: [usize; 3],
    dims: Dims,
    ngene: usize,
}

impl<'a> Field<'a> {
    /// Validate a full array shape (`[x, y, ngene]` or `[x, y, z, ngene]`)
    /// against a contiguous buffer.
    ///
    /// # Errors
    /// `UnsupportedDims` if the rank is not 3 or 4, `EmptyChannels` if the
    /// channel axis is zero, `DataLength` if `data` does not fill the shape.
    pub fn from_parts(shape: &[usize], data: &'a [f64]) -> Result<Self, FieldError> {
        let Some((&ngene, spatial)) = shape.split_last() else {
            return Err(FieldError::UnsupportedDims(0));
        };
        let dims = Dims::from_spatial_rank(spatial.len())?;
        if ngene == 0 {
            return Err(FieldError::EmptyChannels);
        }
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s))
            .ok_or(FieldError::DataLength {
                expected: usize::MAX,
                got: data.len(),
            })?;
        if data.len() != expected {
            return Err(FieldError::DataLength {
                expected,
                got: data.len(),
            });
        }
        let mut padded = [1usize; 3];
        padded[..spatial.len()].copy_from_slice(spatial);
        Ok(Self {
            data,
            shape: padded,
            dims,
            ngene,
        })
    }

    #[inline]
    #[must_use]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Spatial extents (2 or 3 entries).
    #[inline]
    #[must_use]
    pub fn spatial_shape(&self) -> &[usize] {
        &self.shape[..self.dims.rank()]
    }

    /// Spatial extents padded to three axes (trailing 1 in 2D).
    #[inline]
    #[must_use]
    pub const fn shape3(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    #[must_use]
    pub const fn ngene(&self) -> usize {
        self.ngene
    }

    /// Number of voxels.
    #[inline]
    #[must_use]
    pub const fn nvox(&self) -> usize {
        self.shape[0] * self.shape[1] * self.shape[2]
    }

    /// Channel vector of the voxel at row-major spatial index `flat`.
    #[inline]
    #[must_use]
    pub fn vector(&self, flat: usize) -> &'a [f64] {
        let s = flat * self.ngene;
        &self.data[s..s + self.ngene]
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, c: &Coord) -> bool {
        c.dims() == self.dims && c.as_slice().iter().zip(self.spatial_shape()).all(|(&p, &e)| p < e)
    }

    /// Row-major spatial index of `c`. `c` must lie inside the field.
    #[inline]
    #[must_use]
    pub fn flat_index(&self, c: &Coord) -> usize {
        debug_assert!(self.contains(c));
        let [x, y, z] = c.xyz();
        (x * self.shape[1] + y) * self.shape[2] + z
    }

    /// Inverse of [`Field::flat_index`], padded to three axes.
    #[inline]
    #[must_use]
    pub const fn unravel(&self, flat: usize) -> [usize; 3] {
        let z = flat % self.shape[2];
        let rest = flat / self.shape[2];
        [rest / self.shape[1], rest % self.shape[1], z]
    }

    #[inline]
    #[must_use]
    pub fn vector_at(&self, c: &Coord) -> &'a [f64] {
        self.vector(self.flat_index(c))
    }
}
