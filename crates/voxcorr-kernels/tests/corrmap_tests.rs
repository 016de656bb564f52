use approx::assert_abs_diff_eq;
use voxcorr_core::{Dims, Field, FieldError};
use voxcorr_kernels::{
    neighborhood_correlation_map, neighborhood_correlation_tensor, neighborhood_len,
    neighborhood_offsets, pearson, reference_correlation_map,
};

/// Smoothly varying but non-degenerate channel values.
fn make_data(shape: &[usize]) -> Vec<f64> {
    let n: usize = shape.iter().product();
    (0..n)
        .map(|i| {
            let t = i as f64;
            (t * 0.37).sin() + (t * 0.011).cos() * 0.5 + ((i * 7919) % 13) as f64 * 0.05
        })
        .collect()
}

fn unravel(flat: usize, spatial: &[usize]) -> Vec<usize> {
    let mut rem = flat;
    let mut p = vec![0usize; spatial.len()];
    for ax in (0..spatial.len()).rev() {
        p[ax] = rem % spatial[ax];
        rem /= spatial[ax];
    }
    p
}

fn ravel(p: &[usize], spatial: &[usize]) -> usize {
    p.iter().zip(spatial).fold(0, |acc, (&c, &e)| acc * e + c)
}

fn shifted(p: &[usize], d: &[isize; 3]) -> Vec<usize> {
    p.iter()
        .zip(d)
        .map(|(&c, &dd)| c.checked_add_signed(dd).unwrap())
        .collect()
}

fn interior(p: &[usize], spatial: &[usize], size: usize) -> bool {
    p.iter().zip(spatial).all(|(&c, &e)| c >= size && c + size < e)
}

fn brute_force_map(field: &Field<'_>, size: usize) -> Vec<f64> {
    let spatial = field.spatial_shape();
    let offsets = neighborhood_offsets(field.dims(), size);
    (0..field.nvox())
        .map(|flat| {
            let p = unravel(flat, spatial);
            if !interior(&p, spatial, size) {
                return f64::NAN;
            }
            let mut agg = vec![0.0; field.ngene()];
            for d in &offsets {
                let q = ravel(&shifted(&p, d), spatial);
                for (a, v) in agg.iter_mut().zip(field.vector(q)) {
                    *a += v;
                }
            }
            pearson(field.vector(flat), &agg)
        })
        .collect()
}

fn assert_same_map(got: &[f64], expected: &[f64]) {
    assert_eq!(got.len(), expected.len());
    for (g, e) in got.iter().zip(expected) {
        if e.is_nan() {
            assert!(g.is_nan());
        } else {
            assert_abs_diff_eq!(*g, *e, epsilon = 1e-10);
        }
    }
}

#[test]
fn test_map_matches_brute_force_2d() {
    let shape = [9usize, 7, 6];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    for size in [1, 2] {
        let got = neighborhood_correlation_map(&field, Some(3), size).unwrap();
        assert_same_map(&got, &brute_force_map(&field, size));
    }
}

#[test]
fn test_map_matches_brute_force_3d() {
    let shape = [6usize, 5, 7, 9];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let got = neighborhood_correlation_map(&field, Some(2), 1).unwrap();
    assert_same_map(&got, &brute_force_map(&field, 1));
}

#[test]
fn test_map_border_is_nan() {
    let shape = [5usize, 5, 3];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let got = neighborhood_correlation_map(&field, None, 1).unwrap();
    for (flat, v) in got.iter().enumerate() {
        let p = unravel(flat, &[5, 5]);
        assert_eq!(v.is_nan(), !interior(&p, &[5, 5], 1), "{p:?}");
    }
    // window wider than the field: everything is border
    let got = neighborhood_correlation_map(&field, None, 3).unwrap();
    assert!(got.iter().all(|v| v.is_nan()));
}

#[test]
fn test_tensor_matches_brute_force() {
    for (shape, size) in [(vec![7usize, 8, 5], 1usize), (vec![7, 6, 5], 2), (vec![5, 4, 6, 3], 1)] {
        let data = make_data(&shape);
        let field = Field::from_parts(&shape, &data).unwrap();
        let spatial = field.spatial_shape().to_vec();
        let offsets = neighborhood_offsets(field.dims(), size);
        let noff = offsets.len();
        assert_eq!(noff, (2 * size + 1).pow(spatial.len() as u32) - 1);

        let got = neighborhood_correlation_tensor(&field, Some(4), size).unwrap();
        assert_eq!(got.len(), field.nvox() * noff);
        for flat in 0..field.nvox() {
            let p = unravel(flat, &spatial);
            let row = &got[flat * noff..(flat + 1) * noff];
            if !interior(&p, &spatial, size) {
                assert!(row.iter().all(|v| v.is_nan()));
                continue;
            }
            for (v, d) in row.iter().zip(&offsets) {
                let q = ravel(&shifted(&p, d), &spatial);
                assert_abs_diff_eq!(*v, pearson(field.vector(flat), field.vector(q)), epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_tensor_offset_axis_3d_has_26_entries() {
    assert_eq!(neighborhood_offsets(Dims::Three, 1).len(), 26);
    let shape = [3usize, 3, 3, 4];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let got = neighborhood_correlation_tensor(&field, Some(1), 1).unwrap();
    assert_eq!(got.len(), 27 * 26);
    // only the centre voxel is interior
    let centre = &got[13 * 26..14 * 26];
    assert!(centre.iter().all(|v| !v.is_nan()));
    assert_eq!(got.iter().filter(|v| v.is_nan()).count(), 26 * 26);
}

#[test]
fn test_oversized_window_is_all_border() {
    let shape = [4usize, 4, 4, 3];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    for size in [2, 150, usize::MAX / 2, usize::MAX] {
        let got = neighborhood_correlation_map(&field, Some(1), size).unwrap();
        assert_eq!(got.len(), 64);
        assert!(got.iter().all(|v| v.is_nan()), "size {size}");
    }
}

#[test]
fn test_oversized_window_tensor() {
    let shape = [4usize, 4, 2];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let got = neighborhood_correlation_tensor(&field, Some(1), 3).unwrap();
    assert_eq!(neighborhood_len(Dims::Two, 3), Some(48));
    assert_eq!(got.len(), 16 * 48);
    assert!(got.iter().all(|v| v.is_nan()));

    let err = neighborhood_correlation_tensor(&field, Some(1), usize::MAX / 4).unwrap_err();
    assert!(matches!(err, FieldError::WindowTooLarge(_)));
}

#[test]
fn test_reference_map_matches_pointwise() {
    let shape = [4usize, 6, 3, 5];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let reference = [0.3, -1.0, 2.0, 0.5, 0.0];
    let got = reference_correlation_map(&reference, &field, Some(3)).unwrap();
    assert_eq!(got.len(), field.nvox());
    for (flat, v) in got.iter().enumerate() {
        assert_abs_diff_eq!(*v, pearson(&reference, field.vector(flat)), epsilon = 1e-15);
    }
}

#[test]
fn test_reference_map_constant_reference_is_zero() {
    let shape = [3usize, 3, 4];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let got = reference_correlation_map(&[2.0; 4], &field, None).unwrap();
    assert!(got.iter().all(|&v| v == 0.0));
}

#[test]
fn test_reference_length_mismatch_is_error() {
    let shape = [3usize, 3, 4];
    let data = make_data(&shape);
    let field = Field::from_parts(&shape, &data).unwrap();
    let err = reference_correlation_map(&[1.0, 2.0, 3.0], &field, None).unwrap_err();
    assert!(matches!(err, FieldError::LengthMismatch { expected: 4, got: 3, .. }));
}
