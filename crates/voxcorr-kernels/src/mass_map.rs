//! Flat open-addressing map from encoded voxel keys to accumulated mass
//
// Voxel coordinates are encoded row-major into a single usize (see
// `DensityMap::encode`), so one probe sequence replaces a tuple hash. Each
// density worker owns one map; maps are folded together once all samples are
// processed.

const EMPTY: usize = usize::MAX;
const MIN_SLOTS: usize = 16;
/// Maximum occupied share of the slot table, as `(numerator, denominator)`.
const MAX_LOAD: (usize, usize) = (7, 10);

pub struct MassMap {
    keys: Vec<usize>,
    vals: Vec<f64>,
    len: usize,
}

/// Slot holding `key`, or the empty slot where it would be inserted.
/// `keys.len()` is a power of two and the table is never full.
#[inline]
fn slot(keys: &[usize], key: usize) -> usize {
    let mask = keys.len() - 1;
    let mut idx = key.wrapping_mul(0x9E37_79B9_7F4A_7C15) & mask;
    while keys[idx] != EMPTY && keys[idx] != key {
        idx = (idx + 1) & mask;
    }
    idx
}

impl MassMap {
    /// Map with room for at least `cap` voxels before the first resize.
    #[inline]
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        let slots = (cap.saturating_mul(MAX_LOAD.1) / MAX_LOAD.0)
            .next_power_of_two()
            .max(MIN_SLOTS);
        Self {
            keys: vec![EMPTY; slots],
            vals: vec![0.0; slots],
            len: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add `val` to the mass at `key`.
    #[inline]
    pub fn insert_add(&mut self, key: usize, val: f64) {
        debug_assert!(key != EMPTY);
        let idx = slot(&self.keys, key);
        if self.keys[idx] == key {
            self.vals[idx] += val;
            return;
        }
        self.keys[idx] = key;
        self.vals[idx] = val;
        self.len += 1;
        if self.len * MAX_LOAD.1 > self.keys.len() * MAX_LOAD.0 {
            self.rehash(self.keys.len() * 2);
        }
    }

    fn rehash(&mut self, slots: usize) {
        let old_keys = std::mem::replace(&mut self.keys, vec![EMPTY; slots]);
        let old_vals = std::mem::replace(&mut self.vals, vec![0.0; slots]);
        for (k, v) in old_keys.into_iter().zip(old_vals) {
            if k != EMPTY {
                let idx = slot(&self.keys, k);
                self.keys[idx] = k;
                self.vals[idx] = v;
            }
        }
    }

    /// Additive merge: every entry of `other` is added into `self`.
    pub fn merge_from(&mut self, other: &Self) {
        for (&k, &v) in other.keys.iter().zip(&other.vals) {
            if k != EMPTY {
                self.insert_add(k, v);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: usize) -> Option<f64> {
        let idx = slot(&self.keys, key);
        (key != EMPTY && self.keys[idx] == key).then(|| self.vals[idx])
    }

    /// All `(key, value)` pairs with a strictly positive value, sorted by key.
    #[must_use]
    pub fn into_sorted_pairs(self) -> Vec<(usize, f64)> {
        let mut out: Vec<(usize, f64)> = self
            .keys
            .into_iter()
            .zip(self.vals)
            .filter(|&(k, v)| k != EMPTY && v > 0.0)
            .collect();
        out.sort_unstable_by_key(|&(k, _)| k);
        out
    }
}
