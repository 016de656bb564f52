//! Pearson correlation between two channel vectors
//
// Sums of a, b, a^2, b^2 are gathered in one SIMD pass (f64x4 lanes plus a
// scalar tail). Population moments (divide by n) come from those sums and the
// centered cross-sum is only computed when both deviations are non-zero.

#![allow(
    clippy::many_single_char_names,
    reason = "Math kernels conventionally use short names for vectors and sums"
)]

use voxcorr_core::FieldError;
use wide::f64x4;

#[inline]
fn load4(s: &[f64], i: usize) -> f64x4 {
    f64x4::from([s[i], s[i + 1], s[i + 2], s[i + 3]])
}

#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// Sum of a, b, a*a, b*b.
#[inline]
fn moments(a: &[f64], b: &[f64], n: usize) -> (f64, f64, f64, f64) {
    let mut acc_a = f64x4::from([0.0; 4]);
    let mut acc_b = f64x4::from([0.0; 4]);
    let mut acc_aa = f64x4::from([0.0; 4]);
    let mut acc_bb = f64x4::from([0.0; 4]);
    let limit4 = n & !3;
    let mut i = 0usize;
    while i < limit4 {
        let va = load4(a, i);
        let vb = load4(b, i);
        acc_a += va;
        acc_b += vb;
        acc_aa += va * va;
        acc_bb += vb * vb;
        i += 4;
    }
    let mut sa = hsum(acc_a);
    let mut sb = hsum(acc_b);
    let mut saa = hsum(acc_aa);
    let mut sbb = hsum(acc_bb);
    while i < n {
        let (x, y) = (a[i], b[i]);
        sa += x;
        sb += y;
        saa += x * x;
        sbb += y * y;
        i += 1;
    }
    (sa, sb, saa, sbb)
}

/// Sum of (a - ma) * (b - mb).
#[inline]
fn centered_cross(a: &[f64], b: &[f64], n: usize, ma: f64, mb: f64) -> f64 {
    let vma = f64x4::splat(ma);
    let vmb = f64x4::splat(mb);
    let mut acc = f64x4::from([0.0; 4]);
    let limit4 = n & !3;
    let mut i = 0usize;
    while i < limit4 {
        acc += (load4(a, i) - vma) * (load4(b, i) - vmb);
        i += 4;
    }
    let mut s = hsum(acc);
    while i < n {
        s += (a[i] - ma) * (b[i] - mb);
        i += 1;
    }
    s
}

/// Pearson's r over the common prefix of `a` and `b`.
///
/// Callers pass equal-length, non-empty slices. A constant input (zero
/// population standard deviation) yields `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let (sa, sb, saa, sbb) = moments(a, b, n);
    let ma = sa / nf;
    let mb = sb / nf;
    let sd_a = (saa / nf - ma * ma).max(0.0).sqrt();
    let sd_b = (sbb / nf - mb * mb).max(0.0).sqrt();
    if sd_a == 0.0 || sd_b == 0.0 {
        return 0.0;
    }
    centered_cross(a, b, n, ma, mb) / (sd_a * sd_b * nf)
}

/// Checked entry point: both vectors must be non-empty and of equal length.
///
/// # Errors
/// `LengthMismatch` when the lengths differ or either vector is empty.
pub fn correlation(a: &[f64], b: &[f64]) -> Result<f64, FieldError> {
    if a.len() != b.len() || a.is_empty() {
        return Err(FieldError::LengthMismatch {
            what: "correlation input",
            expected: a.len().max(1),
            got: b.len(),
        });
    }
    Ok(pearson(a, b))
}
