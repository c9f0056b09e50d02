//! Hermitian (or real symmetric) matrices stored in one triangle.

use crate::dense::{MutMatrix, MutVector};
use crate::element_op::ElementOp;
use crate::kernel;
use crate::matrix::{MatrixView, ReadMatrix};
use crate::scalar::Scalar;
use crate::tri::Uplo;
use crate::vector::{ReadVector, WriteVector};
use crate::{check_same_len, LinalgError, Result};

/// A Hermitian matrix whose `uplo` logical triangle is authoritative.
///
/// Entries in the other triangle are reconstructed by conjugate symmetry and
/// the diagonal reads as real, whatever the storage holds there.
#[derive(Debug, Clone, PartialEq)]
pub struct Herm<M> {
    mat: M,
    uplo: Uplo,
}

impl<M> Herm<M> {
    /// Wrap a square matrix, failing with `NonSquare` otherwise.
    pub fn new<T: Scalar>(mat: M, uplo: Uplo) -> Result<Self>
    where
        M: ReadMatrix<T>,
    {
        let (rows, cols) = mat.shape();
        if rows != cols {
            return Err(LinalgError::NonSquare { rows, cols });
        }
        Ok(Self { mat, uplo })
    }

    pub fn uplo(&self) -> Uplo {
        self.uplo
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

    /// `H^H == H`.
    pub fn herm(self) -> Self {
        self
    }
}

impl<M> Herm<M> {
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
        if i == j {
            return T::from_real(self.mat.get_unchecked(i, i).re());
        }
        let stored = match self.uplo {
            Uplo::Upper => j > i,
            Uplo::Lower => j < i,
        };
        if stored {
            self.mat.get_unchecked(i, j)
        } else {
            self.mat.get_unchecked(j, i).conj()
        }
    }

    /// `H^T`, which equals `conj(H)`: a conjugated view of the same triangle.
    pub fn transpose<T: Scalar>(&self) -> Herm<MatrixView<'_, T>>
    where
        M: ReadMatrix<T>,
    {
        Herm {
            mat: self.mat.mat_view().conj(),
            uplo: self.uplo,
        }
    }

    /// `H * x`
    pub fn mul_vector<T: Scalar, X: ReadVector<T> + ?Sized>(&self, x: &X) -> Result<MutVector<T>>
    where
        M: ReadMatrix<T>,
    {
        let mut y = MutVector::zeros(self.dim());
        self.mul_vector_into(T::one(), x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// `y ← alpha * H * x + beta * y`
    pub fn mul_vector_into<T, X, Y>(&self, alpha: T, x: &X, beta: T, y: &mut Y) -> Result<()>
    where
        T: Scalar,
        M: ReadMatrix<T>,
        X: ReadVector<T> + ?Sized,
        Y: WriteVector<T> + ?Sized,
    {
        let a = self.mat.mat_view();
        let x = x.view();
        let mut y = y.view_mut();
        check_same_len(a.ncols(), x.len())?;
        check_same_len(a.nrows(), y.len())?;
        let layout = a.layout();
        let (alpha, beta, op, conjx) = if y.is_conj() {
            (alpha.conj(), beta.conj(), layout.op().conj(), !x.is_conj())
        } else {
            (alpha, beta, layout.op(), x.is_conj())
        };
        unsafe {
            kernel::hemv(
                self.uplo.through(layout.op()),
                a.nrows(),
                alpha,
                a.as_ptr(),
                layout.ld(),
                op,
                x.as_ptr(),
                x.stride(),
                conjx,
                beta,
                y.as_mut_ptr(),
                y.stride(),
            );
        }
        Ok(())
    }

    /// `H * b`
    pub fn mul_matrix<T: Scalar, B: ReadMatrix<T> + ?Sized>(&self, b: &B) -> Result<MutMatrix<T>>
    where
        M: ReadMatrix<T>,
    {
        let a = self.mat.mat_view();
        let b = b.mat_view();
        check_same_len(a.ncols(), b.nrows())?;
        let mut out = MutMatrix::zeros(a.nrows(), b.ncols());
        let layout = a.layout();
        let ldc = out.ld();
        unsafe {
            kernel::hemm(
                self.uplo.through(layout.op()),
                a.nrows(),
                b.ncols(),
                T::one(),
                a.as_ptr(),
                layout.ld(),
                layout.op(),
                b.as_ptr(),
                b.layout().ld(),
                b.layout().op(),
                T::zero(),
                out.as_mut_slice().as_mut_ptr(),
                ldc,
            );
        }
        Ok(out)
    }

    /// Dense copy with both triangles filled in.
    pub fn to_dense<T: Scalar>(&self) -> MutMatrix<T>
    where
        M: ReadMatrix<T>,
    {
        let n = self.dim();
        MutMatrix::from_fn(n, n, |i, j| unsafe { self.get_unchecked(i, j) })
    }
}

impl<M> Herm<M> {
    /// Element operation of the wrapped matrix.
    pub fn element_op<T: Scalar>(&self) -> ElementOp
    where
        M: ReadMatrix<T>,
    {
        self.mat.op()
    }
}
