//! Spatial dimensionality and voxel coordinates

use crate::error::FieldError;

/// Number of spatial axes of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dims {
    Two,
    Three,
}

impl Dims {
    /// Classify a spatial axis count.
    ///
    /// # Errors
    /// `UnsupportedDims` for anything other than 2 or 3.
    #[inline]
    pub fn from_spatial_rank(n: usize) -> Result<Self, FieldError> {
        match n {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(FieldError::UnsupportedDims(other)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Axis-aligned unit steps, 4 in 2D and 6 in 3D.
    #[inline]
    #[must_use]
    pub const fn unit_steps(self) -> &'static [[isize; 3]] {
        match self {
            Self::Two => &[[1, 0, 0], [-1, 0, 0], [0, 1, 0], [0, -1, 0]],
            Self::Three => &[
                [1, 0, 0],
                [-1, 0, 0],
                [0, 1, 0],
                [0, -1, 0],
                [0, 0, 1],
                [0, 0, -1],
            ],
        }
    }
}

/// A voxel coordinate in a 2D or 3D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coord {
    D2([usize; 2]),
    D3([usize; 3]),
}

impl Coord {
    /// Build a coordinate from signed caller input, checking arity and sign.
    ///
    /// # Errors
    /// `RankMismatch` when `pos.len()` differs from the spatial rank, and
    /// `OutOfBounds` when any component is negative.
    pub fn from_slice(pos: &[i64], dims: Dims, shape: &[usize]) -> Result<Self, FieldError> {
        if pos.len() != dims.rank() {
            return Err(FieldError::RankMismatch {
                what: "seed position",
                expected: dims.rank(),
                got: pos.len(),
            });
        }
        let mut idx = [0usize; 3];
        for (slot, &p) in idx.iter_mut().zip(pos) {
            *slot = usize::try_from(p).map_err(|_| FieldError::OutOfBounds {
                what: "seed position",
                coord: pos.to_vec(),
                shape: shape.to_vec(),
            })?;
        }
        Ok(match dims {
            Dims::Two => Self::D2([idx[0], idx[1]]),
            Dims::Three => Self::D3(idx),
        })
    }

    #[inline]
    #[must_use]
    pub const fn dims(&self) -> Dims {
        match self {
            Self::D2(_) => Dims::Two,
            Self::D3(_) => Dims::Three,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Self::D2(p) => p,
            Self::D3(p) => p,
        }
    }

    /// Coordinate padded to three axes (z = 0 in 2D).
    #[inline]
    #[must_use]
    pub const fn xyz(&self) -> [usize; 3] {
        match *self {
            Self::D2([x, y]) => [x, y, 0],
            Self::D3(p) => p,
        }
    }

    /// Step by `delta` (only the first `rank` components are read) if the
    /// result stays inside `[0, extent)` on every axis.
    #[inline]
    #[must_use]
    pub fn step(&self, delta: [isize; 3], shape: &[usize]) -> Option<Self> {
        let p = self.xyz();
        let mut out = [0usize; 3];
        for ax in 0..self.dims().rank() {
            let v = p[ax].checked_add_signed(delta[ax])?;
            if v >= shape[ax] {
                return None;
            }
            out[ax] = v;
        }
        Some(match self {
            Self::D2(_) => Self::D2([out[0], out[1]]),
            Self::D3(_) => Self::D3(out),
        })
    }
}
