//! Cholesky factorization of Hermitian positive definite matrices.
//!
//! [`cholesky_in_place`] overwrites the meaningful triangle of a
//! [`Herm`]-wrapped view with its factor: `A = L * L^H` for `Lower`,
//! `A = U^H * U` for `Upper`. The other triangle is left untouched.
//! [`Cholesky`] keeps an owned lower factor for repeated solves.

use crate::dense::{MutMatrix, MutVector};
use crate::herm::Herm;
use crate::matrix::{gemv, MatrixView, MatrixViewMut, ReadMatrix, WriteMatrix};
use crate::scalar::Scalar;
use crate::tri::{DiagKind, Tri, Uplo};
use crate::vector::{ReadVector, WriteVector};
use crate::{LinalgError, Result};
use num_traits::{Float, One, Zero};

/// Factor in place, returning the factor as a triangular view over the same
/// storage.
///
/// Fails with `NotPositiveDefinite { column }` at the first column whose
/// pivot is not strictly positive; columns before it have already been
/// overwritten.
pub fn cholesky_in_place<T: Scalar>(a: Herm<MatrixViewMut<'_, T>>) -> Result<Tri<MatrixViewMut<'_, T>>> {
    let uplo = a.uplo();
    let mut m = a.into_inner();
    match uplo {
        Uplo::Lower => factor_lower(m.rb_mut())?,
        // The upper triangle read through the adjoint is a lower triangle.
        Uplo::Upper => factor_lower(m.rb_mut().herm())?,
    }
    Tri::new(m, uplo, DiagKind::NonUnit)
}

/// Unblocked left-looking factorization of the lower triangle.
fn factor_lower<T: Scalar>(mut a: MatrixViewMut<'_, T>) -> Result<()> {
    let n = a.nrows();
    for j in 0..n {
        let (left, right) = a.rb_mut().split_cols_at_mut(j)?;
        let left = left.into_const();
        let r = left.row(j)?;

        let d = right.get(j, 0)?.re() - r.dot(&r)?.re();
        if !(d > T::Real::zero()) {
            tracing::debug!(column = j, "cholesky pivot is not positive");
            return Err(LinalgError::NotPositiveDefinite { column: j });
        }
        let ljj = d.sqrt();

        let mut col = right.col_mut(0)?;
        col.set(j, T::from_real(ljj))?;
        let mut below = col.subvector_mut(j + 1, n - j - 1)?;
        let l21 = left.submatrix((j + 1, 0), (n - j - 1, j))?;
        gemv(-T::one(), &l21, &r.conj(), T::one(), &mut below)?;
        below.scale_by(T::from_real(T::Real::one() / ljj));
    }
    Ok(())
}

/// An owned lower Cholesky factor `L` with `A = L * L^H`.
#[derive(Debug, Clone)]
pub struct Cholesky<T> {
    l: MutMatrix<T>,
}

impl<T: Scalar> Cholesky<T> {
    /// Copy the Hermitian matrix and factor the copy.
    pub fn factor<M: ReadMatrix<T>>(a: &Herm<M>) -> Result<Self> {
        let mut l = a.to_dense();
        cholesky_in_place(Herm::new(l.mat_view_mut(), Uplo::Lower)?)?;
        let n = l.nrows();
        for j in 1..n {
            for i in 0..j {
                l.as_mut_slice()[i + j * n] = T::zero();
            }
        }
        Ok(Self { l })
    }

    /// The lower factor `L` as a triangular view.
    pub fn lower(&self) -> Tri<MatrixView<'_, T>> {
        Tri::from_parts(self.l.mat_view(), Uplo::Lower, DiagKind::NonUnit)
    }

    /// The factor as a dense matrix with zeros above the diagonal.
    pub fn l(&self) -> &MutMatrix<T> {
        &self.l
    }

    pub fn into_l(self) -> MutMatrix<T> {
        self.l
    }

    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Solve `A * x = b`.
    pub fn solve_vector<B: ReadVector<T> + ?Sized>(&self, b: &B) -> Result<MutVector<T>> {
        let l = self.lower();
        let mut x = l.solve_vector(b)?;
        l.herm().solve_vector_in_place(&mut x)?;
        Ok(x)
    }

    /// Solve `A * X = B`.
    pub fn solve_matrix<B: ReadMatrix<T> + ?Sized>(&self, b: &B) -> Result<MutMatrix<T>> {
        let l = self.lower();
        let y = l.solve_matrix(b)?;
        l.herm().solve_matrix(&y)
    }

    /// `det(A)`, the squared product of the factor's diagonal.
    pub fn det(&self) -> T::Real {
        let n = self.dim();
        let p = (0..n).fold(T::Real::one(), |acc, i| acc * self.l.as_slice()[i + i * n].re());
        p * p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::{Matrix, Vector};
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn spd() -> Vec<f64> {
        // Row-major [[4, 2, 2], [2, 5, 3], [2, 3, 6]]
        vec![4.0, 2.0, 2.0, 2.0, 5.0, 3.0, 2.0, 3.0, 6.0]
    }

    #[test]
    fn test_lower_in_place() {
        let mut a = MutMatrix::from_row_major(3, 3, spd());
        let l = cholesky_in_place(Herm::new(a.mat_view_mut(), Uplo::Lower).unwrap()).unwrap();
        assert_eq!(l.uplo(), Uplo::Lower);
        assert_relative_eq!(l.get(0, 0).unwrap(), 2.0);
        assert_relative_eq!(l.get(1, 0).unwrap(), 1.0);
        assert_relative_eq!(l.get(2, 0).unwrap(), 1.0);
        assert_relative_eq!(l.get(1, 1).unwrap(), 2.0);
        assert_relative_eq!(l.get(2, 1).unwrap(), 1.0);
        assert_relative_eq!(l.get(2, 2).unwrap(), 2.0);
        // Strict upper triangle untouched.
        assert_eq!(a.get(0, 2).unwrap(), 2.0);
    }

    #[test]
    fn test_upper_in_place() {
        let mut a = MutMatrix::from_row_major(3, 3, spd());
        let u = cholesky_in_place(Herm::new(a.mat_view_mut(), Uplo::Upper).unwrap()).unwrap();
        assert_eq!(u.uplo(), Uplo::Upper);
        let dense = u.to_dense();
        let back = dense.mat_view().herm().mul_matrix(&dense).unwrap();
        for (x, y) in back.to_row_major_vec().iter().zip(spd()) {
            assert_relative_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let mut a = MutMatrix::from_row_major(2, 2, [1.0, 2.0, 2.0, 1.0]);
        let err = cholesky_in_place(Herm::new(a.mat_view_mut(), Uplo::Lower).unwrap()).unwrap_err();
        assert_eq!(err, LinalgError::NotPositiveDefinite { column: 1 });

        let mut z = MutMatrix::<f64>::zeros(2, 2);
        let err = cholesky_in_place(Herm::new(z.mat_view_mut(), Uplo::Upper).unwrap()).unwrap_err();
        assert_eq!(err, LinalgError::NotPositiveDefinite { column: 0 });
    }

    #[test]
    fn test_solve() {
        let a = Matrix::from_row_major(3, 3, spd());
        let chol = Cholesky::factor(&Herm::new(a.clone(), Uplo::Upper).unwrap()).unwrap();
        assert_relative_eq!(chol.det(), 64.0, epsilon = 1e-10);
        let x = Vector::from_vec(vec![1.0, -1.0, 2.0]);
        let b = a.mul_vector(&x).unwrap();
        let solved = chol.solve_vector(&b).unwrap();
        for (s, e) in solved.iter().zip(x.iter()) {
            assert_relative_eq!(s, e, epsilon = 1e-12);
        }

        // A * X = A has X = I.
        let bm = a.mul_matrix(&Matrix::<f64>::identity(3, 3)).unwrap();
        let solved = chol.solve_matrix(&bm).unwrap();
        let eye = MutMatrix::<f64>::identity(3, 3);
        for (s, e) in solved.to_row_major_vec().iter().zip(eye.to_row_major_vec()) {
            assert_relative_eq!(*s, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_complex_factor() {
        let c = Complex64::new;
        let a = Matrix::from_row_major(
            2,
            2,
            [c(4.0, 0.0), c(1.0, 1.0), c(1.0, -1.0), c(3.0, 0.0)],
        );
        let chol = Cholesky::factor(&Herm::new(a.clone(), Uplo::Lower).unwrap()).unwrap();
        let l = chol.l();
        let back = l.mul_matrix(&l.mat_view().herm()).unwrap();
        for (x, y) in back.to_row_major_vec().iter().zip(a.to_row_major_vec()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
            assert_relative_eq!(x.im, y.im, epsilon = 1e-12);
        }
        assert_eq!(chol.lower().get(0, 1).unwrap(), c(0.0, 0.0));
    }
}
