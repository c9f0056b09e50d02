use approx::assert_relative_eq;
use num_complex::Complex64;
use strided_linalg::cholesky::Cholesky;
use strided_linalg::stats::{covariance, CovMethod};
use strided_linalg::{
    Banded, Diag, DiagKind, Herm, LinalgError, Matrix, MatrixViewMut, MutMatrix, MutVector,
    ReadMatrix, ReadVector, Tri, Uplo, Vector, VectorView, WriteMatrix, WriteVector,
};

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

#[test]
fn test_rank1_update_scenario() {
    let mut a = MutMatrix::<f64>::zeros(3, 3);
    let x = Vector::from_vec(vec![1.0, 0.0, 0.0]);
    let y = Vector::from_vec(vec![0.0, 1.0, 0.0]);
    a.rank1_update(1.0, &x, &y).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let expected = if (i, j) == (0, 1) { 1.0 } else { 0.0 };
            assert_eq!(a.get(i, j).unwrap(), expected);
        }
    }
}

#[test]
fn test_basis_scenario() {
    let e = Vector::<f64>::basis(4, 2).unwrap();
    assert_eq!(e.to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
    assert_eq!(e.dim(), 4);
    assert_eq!(e.which_max_abs().unwrap(), (2, 1.0));
    assert!(Vector::<f64>::basis(4, 4).is_err());
}

#[test]
fn test_diag_scenario() {
    let d = Diag::new(Vector::from_vec(vec![2.0, 3.0, 4.0]));
    let y = d.mul_vector(&Vector::from_vec(vec![1.0, 1.0, 1.0])).unwrap();
    assert_eq!(y.to_vec(), vec![2.0, 3.0, 4.0]);
    assert_eq!(d.get(0, 1).unwrap(), 0.0);
}

#[test]
fn test_banded_rejects_off_band_entry() {
    let a = Matrix::from_row_major(2, 2, [1.0, 0.0, 3.0, 1.0]);
    assert!(matches!(
        Banded::from_dense(&a, 0, 0),
        Err(LinalgError::InvalidBandedMatrix { row: 1, col: 0, kl: 0, ku: 0 })
    ));
}

#[test]
fn test_vector_shape_mismatch_leaves_target_untouched() {
    let short = Vector::from_vec(vec![1.0, 1.0]);
    let mut x = MutVector::from_vec(vec![1.0, 2.0, 3.0]);
    let before = x.clone();
    assert!(matches!(x.add_assign(&short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.sub_assign(&short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.mul_assign(&short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.div_assign(&short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.axpy(2.0, &short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.copy_from(&short), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(x.dot(&short), Err(LinalgError::ShapeMismatch(..))));
    assert_eq!(x, before);

    let frozen = x.freeze();
    assert!(frozen.add(&short).is_err());
    assert!(frozen.sub(&short).is_err());
    assert!(frozen.mul(&short).is_err());
    assert!(frozen.div(&short).is_err());
}

#[test]
fn test_matrix_shape_mismatch_leaves_target_untouched() {
    let mut a = MutMatrix::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
    let before = a.clone();
    let b = Matrix::<f64>::constant(3, 2, 1.0);
    assert!(matches!(a.add_assign(&b), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(a.sub_assign(&b), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(a.mul_assign(&b), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(a.div_assign(&b), Err(LinalgError::ShapeMismatch(..))));
    assert!(matches!(a.gemm(1.0, &b, &b, 0.0), Err(LinalgError::ShapeMismatch(..))));
    assert_eq!(a, before);
    // The transposed operand has the right shape.
    a.add_assign(&b.transpose()).unwrap();
    assert_eq!(a.get(1, 2).unwrap(), 6.0);
}

#[test]
fn test_submatrix_write_aliases_parent() {
    let mut a = MutMatrix::<f64>::zeros(3, 4);
    {
        let mut sub = a.submatrix_mut((1, 2), (2, 2)).unwrap();
        sub.set(0, 0, 7.0).unwrap();
        sub.set(1, 1, 8.0).unwrap();
    }
    assert_eq!(a.get(1, 2).unwrap(), 7.0);
    assert_eq!(a.get(2, 3).unwrap(), 8.0);
    assert_eq!(a.as_slice()[1 + 2 * 3], 7.0);
}

#[test]
fn test_transposed_write_aliases_parent() {
    let mut data = vec![0.0; 6];
    {
        let view = MatrixViewMut::from_col_major(&mut data, 2, 3).unwrap();
        let mut t = view.transpose();
        t.set(2, 1, 5.0).unwrap();
    }
    let a = MutMatrix::from_col_major(2, 3, data).unwrap();
    assert_eq!(a.get(1, 2).unwrap(), 5.0);
}

#[test]
fn test_strided_views_over_one_buffer() {
    let data: Vec<f64> = (0..10).map(f64::from).collect();
    let v = VectorView::from_slice(&data);
    let evens = v.subvector_with_stride(2, 0, 5).unwrap();
    assert_eq!(evens.to_vec(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    let back = evens.reversed();
    assert_eq!(back.to_vec(), vec![8.0, 6.0, 4.0, 2.0, 0.0]);
    assert_eq!(back.sum(), 20.0);
    assert!(v.subvector_with_stride(2, 1, 6).is_err());
    assert!(v.subvector_with_stride(0, 0, 1).is_err());
}

#[test]
fn test_display_round_trip_of_flags() {
    let v = Vector::from_vec(vec![1.0, 2.0, 3.0]);
    assert_eq!(v.to_string(), "vector 3 [1, 2, 3]");
    let z = Vector::from_vec(vec![c(1.0, -1.0)]);
    assert_eq!(z.conj().to_string(), "conj (vector 1 [1-1i])");

    let a = Matrix::from_row_major(2, 3, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(a.to_string(), "matrix (2,3) [[1, 2, 3], [4, 5, 6]]");
    let t = a.transpose();
    assert_eq!(t.to_string(), "trans (matrix (2,3) [[1, 2, 3], [4, 5, 6]])");
    // Freezing a copy keeps the transpose flag visible.
    assert_eq!(t.thaw().freeze().to_string(), t.to_string());
}

#[test]
fn test_complex_gemm_through_adjoint() {
    let a = Matrix::from_row_major(2, 2, [c(1.0, 1.0), c(0.0, 2.0), c(3.0, 0.0), c(1.0, -1.0)]);
    let mut g = MutMatrix::zeros(2, 2);
    g.gemm(c(1.0, 0.0), &a.herm(), &a, c(0.0, 0.0)).unwrap();
    // A^H A is Hermitian with a real diagonal.
    assert_eq!(g.get(0, 0).unwrap(), c(11.0, 0.0));
    assert_eq!(g.get(1, 0).unwrap(), g.get(0, 1).unwrap().conj());
    let h = Herm::new(g.freeze(), Uplo::Lower).unwrap();
    let chol = Cholesky::factor(&h).unwrap();
    let x = Vector::from_vec(vec![c(1.0, 0.0), c(0.0, 1.0)]);
    let b = h.mul_vector(&x).unwrap();
    let solved = chol.solve_vector(&b).unwrap();
    for (s, e) in solved.iter().zip(x.iter()) {
        assert_relative_eq!(s.re, e.re, epsilon = 1e-12);
        assert_relative_eq!(s.im, e.im, epsilon = 1e-12);
    }
}

#[test]
fn test_triangular_solve_against_dense_product() {
    let l = Matrix::from_row_major(3, 3, [2.0, 0.0, 0.0, 1.0, 3.0, 0.0, -1.0, 2.0, 4.0]);
    let t = Tri::new(l.clone(), Uplo::Lower, DiagKind::NonUnit).unwrap();
    let x = Vector::from_vec(vec![1.0, 2.0, 3.0]);
    let b = l.mul_vector(&x).unwrap();
    assert_eq!(t.mul_vector(&x).unwrap(), b);
    assert_eq!(t.solve_vector(&b).unwrap().to_vec(), x.to_vec());
}

#[test]
fn test_covariance_feeds_cholesky() {
    let samples = vec![
        Vector::from_vec(vec![1.0, 0.0]),
        Vector::from_vec(vec![0.0, 1.0]),
        Vector::from_vec(vec![-1.0, 0.5]),
        Vector::from_vec(vec![0.5, -1.5]),
    ];
    let cov = covariance(&samples, CovMethod::Unbiased).unwrap();
    let chol = Cholesky::factor(&cov).unwrap();
    let l = chol.l();
    let back = l.mul_matrix(&l.mat_view().transpose()).unwrap();
    for i in 0..2 {
        for j in 0..2 {
            assert_relative_eq!(back.get(i, j).unwrap(), cov.get(i, j).unwrap(), epsilon = 1e-12);
        }
    }
}
