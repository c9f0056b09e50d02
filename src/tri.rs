//! Triangular matrices over any matrix value or view.
//!
//! [`Tri`] records which logical triangle of the wrapped matrix is
//! meaningful; everything outside it reads as zero. Products and solves go
//! straight to the triangular kernels (`trmv`/`trsv` for vectors,
//! `trmm`/`trsm` for matrices) and never touch the general ones.

use crate::dense::{MutMatrix, MutVector};
use crate::element_op::ElementOp;
use crate::kernel;
use crate::matrix::{MatrixView, ReadMatrix, WriteMatrix};
use crate::scalar::Scalar;
use crate::vector::{ReadVector, WriteVector};
use crate::{check_same_len, LinalgError, Result};

pub use crate::kernel::{DiagKind, Uplo};

/// A square matrix with a meaningful `uplo` triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Tri<M> {
    mat: M,
    uplo: Uplo,
    diag: DiagKind,
}

impl<M> Tri<M> {
    /// Wrap a square matrix, failing with `NonSquare` otherwise.
    pub fn new<T: Scalar>(mat: M, uplo: Uplo, diag: DiagKind) -> Result<Self>
    where
        M: ReadMatrix<T>,
    {
        let (rows, cols) = mat.shape();
        if rows != cols {
            return Err(LinalgError::NonSquare { rows, cols });
        }
        Ok(Self { mat, uplo, diag })
    }

    /// Wrap a matrix the caller knows to be square.
    pub(crate) fn from_parts(mat: M, uplo: Uplo, diag: DiagKind) -> Self {
        Self { mat, uplo, diag }
    }

    pub fn uplo(&self) -> Uplo {
        self.uplo
    }

    pub fn diag_kind(&self) -> DiagKind {
        self.diag
    }

    pub fn matrix(&self) -> &M {
        &self.mat
    }

    pub fn matrix_mut(&mut self) -> &mut M {
        &mut self.mat
    }

    pub fn into_inner(self) -> M {
        self.mat
    }
}

#[inline]
fn conj_if(op: ElementOp, conj: bool) -> ElementOp {
    if conj {
        op.conj()
    } else {
        op
    }
}

impl<M> Tri<M> {
    pub fn dim<T: Scalar>(&self) -> usize
    where
        M: ReadMatrix<T>,
    {
        self.mat.shape().0
    }

    pub fn get<T: Scalar>(&self, i: usize, j: usize) -> Result<T>
    where
        M: ReadMatrix<T>,
    {
        self.mat.mat_view().layout().check_index(i, j)?;
        Ok(unsafe { self.get_unchecked(i, j) })
    }

    /// # Safety
    /// `i` and `j` must both be less than the dimension.
    pub unsafe fn get_unchecked<T: Scalar>(&self, i: usize, j: usize) -> T
    where
        M: ReadMatrix<T>,
    {
        let inside = match self.uplo {
            Uplo::Upper => j >= i,
            Uplo::Lower => j <= i,
        };
        if i == j && self.diag == DiagKind::Unit {
            T::one()
        } else if inside {
            self.mat.get_unchecked(i, j)
        } else {
            T::zero()
        }
    }

    /// The transposed adapter: a transposed view with the opposite triangle.
    pub fn transpose<T: Scalar>(&self) -> Tri<MatrixView<'_, T>>
    where
        M: ReadMatrix<T>,
    {
        Tri {
            mat: self.mat.mat_view().transpose(),
            uplo: self.uplo.flip(),
            diag: self.diag,
        }
    }

    /// The conjugate transpose, again with the opposite triangle.
    pub fn herm<T: Scalar>(&self) -> Tri<MatrixView<'_, T>>
    where
        M: ReadMatrix<T>,
    {
        Tri {
            mat: self.mat.mat_view().herm(),
            uplo: self.uplo.flip(),
            diag: self.diag,
        }
    }

    /// `T * x`
    pub fn mul_vector<T: Scalar, X: ReadVector<T> + ?Sized>(&self, x: &X) -> Result<MutVector<T>>
    where
        M: ReadMatrix<T>,
    {
        let mut y = x.view().to_owned_mut();
        self.mul_vector_in_place(&mut y)?;
        Ok(y)
    }

    /// `x ← T * x`
    pub fn mul_vector_in_place<T: Scalar, X: WriteVector<T> + ?Sized>(&self, x: &mut X) -> Result<()>
    where
        M: ReadMatrix<T>,
    {
        let a = self.mat.mat_view();
        let mut x = x.view_mut();
        check_same_len(a.nrows(), x.len())?;
        let layout = a.layout();
        // A conjugated x stores conj(x): multiply the stored values by conj(T).
        let op = conj_if(layout.op(), x.is_conj());
        unsafe {
            kernel::trmv(
                self.uplo.through(layout.op()),
                self.diag,
                x.len(),
                a.as_ptr(),
                layout.ld(),
                op,
                x.as_mut_ptr(),
                x.stride(),
            );
        }
        Ok(())
    }

    /// `T^{-1} * b`
    pub fn solve_vector<T: Scalar, B: ReadVector<T> + ?Sized>(&self, b: &B) -> Result<MutVector<T>>
    where
        M: ReadMatrix<T>,
    {
        let mut x = b.view().to_owned_mut();
        self.solve_vector_in_place(&mut x)?;
        Ok(x)
    }

    /// `x ← T^{-1} * x`. A zero pivot divides through following `T`'s
    /// arithmetic.
    pub fn solve_vector_in_place<T: Scalar, X: WriteVector<T> + ?Sized>(&self, x: &mut X) -> Result<()>
    where
        M: ReadMatrix<T>,
    {
        let a = self.mat.mat_view();
        let mut x = x.view_mut();
        check_same_len(a.nrows(), x.len())?;
        let layout = a.layout();
        let op = conj_if(layout.op(), x.is_conj());
        unsafe {
            kernel::trsv(
                self.uplo.through(layout.op()),
                self.diag,
                x.len(),
                a.as_ptr(),
                layout.ld(),
                op,
                x.as_mut_ptr(),
                x.stride(),
            );
        }
        Ok(())
    }

    /// `T * b`
    pub fn mul_matrix<T: Scalar, B: ReadMatrix<T> + ?Sized>(&self, b: &B) -> Result<MutMatrix<T>>
    where
        M: ReadMatrix<T>,
    {
        let a = self.mat.mat_view();
        let mut out = b.mat_view().to_owned_mut();
        check_same_len(a.nrows(), out.nrows())?;
        let layout = a.layout();
        let (m, n, ldb) = (out.nrows(), out.ncols(), out.ld());
        unsafe {
            kernel::trmm(
                self.uplo.through(layout.op()),
                self.diag,
                m,
                n,
                T::one(),
                a.as_ptr(),
                layout.ld(),
                layout.op(),
                out.as_mut_slice().as_mut_ptr(),
                ldb,
            );
        }
        Ok(out)
    }

    /// `b ← T * b`, one column at a time.
    pub fn mul_matrix_in_place<T: Scalar, B: WriteMatrix<T> + ?Sized>(&self, b: &mut B) -> Result<()>
    where
        M: ReadMatrix<T>,
    {
        let mut b = b.mat_view_mut();
        check_same_len(self.dim(), b.nrows())?;
        for j in 0..b.ncols() {
            let mut col = b.rb_mut().col_mut(j)?;
            self.mul_vector_in_place(&mut col)?;
        }
        Ok(())
    }

    /// `T^{-1} * b`
    pub fn solve_matrix<T: Scalar, B: ReadMatrix<T> + ?Sized>(&self, b: &B) -> Result<MutMatrix<T>>
    where
        M: ReadMatrix<T>,
    {
        let a = self.mat.mat_view();
        let mut out = b.mat_view().to_owned_mut();
        check_same_len(a.nrows(), out.nrows())?;
        let layout = a.layout();
        let (m, n, ldb) = (out.nrows(), out.ncols(), out.ld());
        unsafe {
            kernel::trsm(
                self.uplo.through(layout.op()),
                self.diag,
                m,
                n,
                T::one(),
                a.as_ptr(),
                layout.ld(),
                layout.op(),
                out.as_mut_slice().as_mut_ptr(),
                ldb,
            );
        }
        Ok(out)
    }

    /// `b ← T^{-1} * b`, one column at a time.
    pub fn solve_matrix_in_place<T: Scalar, B: WriteMatrix<T> + ?Sized>(&self, b: &mut B) -> Result<()>
    where
        M: ReadMatrix<T>,
    {
        let mut b = b.mat_view_mut();
        check_same_len(self.dim(), b.nrows())?;
        for j in 0..b.ncols() {
            let mut col = b.rb_mut().col_mut(j)?;
            self.solve_vector_in_place(&mut col)?;
        }
        Ok(())
    }

    /// Dense copy with zeros outside the triangle.
    pub fn to_dense<T: Scalar>(&self) -> MutMatrix<T>
    where
        M: ReadMatrix<T>,
    {
        let n = self.dim();
        MutMatrix::from_fn(n, n, |i, j| unsafe { self.get_unchecked(i, j) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::{Matrix, Vector};
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    // Storage holds garbage in the strict lower triangle.
    fn upper() -> Matrix<f64> {
        Matrix::from_row_major(3, 3, [2.0, 1.0, 3.0, 99.0, 4.0, 5.0, 99.0, 99.0, 6.0])
    }

    #[test]
    fn test_rejects_non_square() {
        let m = Matrix::<f64>::zeros(2, 3);
        assert!(matches!(
            Tri::new(m, Uplo::Upper, DiagKind::NonUnit),
            Err(LinalgError::NonSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_get_respects_triangle_and_unit_diag() {
        let t = Tri::new(upper(), Uplo::Upper, DiagKind::NonUnit).unwrap();
        assert_eq!(t.get(1, 0).unwrap(), 0.0);
        assert_eq!(t.get(0, 2).unwrap(), 3.0);
        assert_eq!(t.get(1, 1).unwrap(), 4.0);
        let u = Tri::new(upper(), Uplo::Upper, DiagKind::Unit).unwrap();
        assert_eq!(u.get(1, 1).unwrap(), 1.0);
        assert!(u.get(3, 0).is_err());
    }

    #[test]
    fn test_mul_and_solve_vector() {
        let t = Tri::new(upper(), Uplo::Upper, DiagKind::NonUnit).unwrap();
        let x = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        let y = t.mul_vector(&x).unwrap();
        assert_eq!(y.to_vec(), vec![13.0, 23.0, 18.0]);
        let back = t.solve_vector(&y).unwrap();
        for (a, b) in back.iter().zip(x.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transpose_flips_triangle() {
        let t = Tri::new(upper(), Uplo::Upper, DiagKind::NonUnit).unwrap();
        let tt = t.transpose();
        assert_eq!(tt.uplo(), Uplo::Lower);
        assert_eq!(tt.get(2, 0).unwrap(), 3.0);
        assert_eq!(tt.get(0, 2).unwrap(), 0.0);
        let y = tt.mul_vector(&Vector::from_vec(vec![1.0, 1.0, 1.0])).unwrap();
        assert_eq!(y.to_vec(), vec![2.0, 5.0, 14.0]);
        assert_eq!(tt.to_dense(), t.to_dense().transpose());
    }

    #[test]
    fn test_mul_and_solve_matrix() {
        let t = Tri::new(upper(), Uplo::Upper, DiagKind::NonUnit).unwrap();
        let b = Matrix::from_fn(3, 2, |i, j| (i + 2 * j) as f64);
        let p = t.mul_matrix(&b).unwrap();
        let expected = t.to_dense().mul_matrix(&b).unwrap();
        assert_eq!(p, expected);
        let s = t.solve_matrix(&p).unwrap();
        for (a, e) in s.to_row_major_vec().iter().zip(b.to_row_major_vec()) {
            assert_relative_eq!(*a, e, epsilon = 1e-12);
        }

        // Transposed storage: columns of q are strided.
        let mut q = MutMatrix::from_fn(2, 3, |i, j| (j + 2 * i) as f64).transpose();
        t.mul_matrix_in_place(&mut q).unwrap();
        assert_eq!(q, expected);
        t.solve_matrix_in_place(&mut q).unwrap();
        for (a, e) in q.to_row_major_vec().iter().zip(b.to_row_major_vec()) {
            assert_relative_eq!(*a, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_conjugated_target_and_herm() {
        let a = Matrix::from_row_major(2, 2, [c(1.0, 1.0), c(2.0, -1.0), c(0.0, 0.0), c(3.0, 0.0)]);
        let t = Tri::new(a, Uplo::Upper, DiagKind::NonUnit).unwrap();
        let x = [c(1.0, 2.0), c(-1.0, 1.0)];
        let expected = t.mul_vector(&Vector::from_vec(x.to_vec())).unwrap();

        // Store conj(x) and view it conjugated: logical values are x.
        let mut stored = vec![x[0].conj(), x[1].conj()];
        let mut view = crate::vector::VectorViewMut::from_slice(&mut stored).conj();
        t.mul_vector_in_place(&mut view).unwrap();
        assert_eq!(view.to_vec(), expected.to_vec());

        let h = t.herm();
        assert_eq!(h.uplo(), Uplo::Lower);
        assert_eq!(h.get(1, 0).unwrap(), c(2.0, 1.0));
        assert_eq!(h.get(0, 1).unwrap(), c(0.0, 0.0));
    }
}
