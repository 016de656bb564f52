//! Sparse voxel map produced by density estimation (COO layout over a 3D grid)

use std::cmp::Ordering;

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct DensityMap {
    pub data: Vec<f64>,
    pub indices: Vec<usize>, // flattened (nnz * 3), ascending key order
    pub shape: [usize; 3],
}

impl DensityMap {
    #[inline]
    #[must_use]
    pub const fn nnz(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major key of a grid coordinate.
    #[inline]
    #[must_use]
    pub const fn encode(shape: [usize; 3], c: [usize; 3]) -> usize {
        (c[0] * shape[1] + c[1]) * shape[2] + c[2]
    }

    /// Inverse of [`DensityMap::encode`].
    #[inline]
    #[must_use]
    pub const fn decode(shape: [usize; 3], key: usize) -> [usize; 3] {
        let z = key % shape[2];
        let rest = key / shape[2];
        [rest / shape[1], rest % shape[1], z]
    }

    /// Build from `(key, mass)` pairs sorted by key.
    #[must_use]
    pub fn from_sorted_pairs(shape: [usize; 3], pairs: &[(usize, f64)]) -> Self {
        let mut indices = Vec::with_capacity(pairs.len() * 3);
        let mut data = Vec::with_capacity(pairs.len());
        for &(k, v) in pairs {
            indices.extend_from_slice(&Self::decode(shape, k));
            data.push(v);
        }
        Self {
            data,
            indices,
            shape,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ([usize; 3], f64)> + '_ {
        self.indices
            .chunks_exact(3)
            .zip(&self.data)
            .map(|(c, &v)| ([c[0], c[1], c[2]], v))
    }

    /// Mass at `c`, `0.0` when absent. Binary search: entries are kept in
    /// ascending key order.
    #[must_use]
    pub fn get(&self, c: [usize; 3]) -> f64 {
        if c.iter().zip(&self.shape).any(|(&p, &e)| p >= e) {
            return 0.0;
        }
        let key = Self::encode(self.shape, c);
        let (mut lo, mut hi) = (0, self.nnz());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let p = &self.indices[mid * 3..mid * 3 + 3];
            match Self::encode(self.shape, [p[0], p[1], p[2]]).cmp(&key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return self.data[mid],
            }
        }
        0.0
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Per-axis coordinate columns, the layout the Python surface returns.
    #[must_use]
    pub fn columns(&self) -> [Vec<usize>; 3] {
        let mut cols = [
            Vec::with_capacity(self.nnz()),
            Vec::with_capacity(self.nnz()),
            Vec::with_capacity(self.nnz()),
        ];
        for c in self.indices.chunks_exact(3) {
            for (col, &p) in cols.iter_mut().zip(c) {
                col.push(p);
            }
        }
        cols
    }
}
