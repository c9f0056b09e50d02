//! Diagonal matrices backed by a single vector.

use crate::dense::{MutMatrix, MutVector};
use crate::matrix::{ReadMatrix, WriteMatrix};
use crate::scalar::Scalar;
use crate::vector::{ReadVector, WriteVector};
use crate::{check_same_len, LinalgError, Result};
use num_traits::Zero;

/// A square matrix whose only stored entries are its diagonal.
///
/// Off-diagonal positions read as zero and cannot be written: the checked
/// [`set`](Diag::set) rejects them with `NotModifiable`, the unchecked
/// variant ignores them. Multiply and solve are elementwise, O(n).
#[derive(Debug, Clone, PartialEq)]
pub struct Diag<V> {
    diag: V,
}

impl<V> Diag<V> {
    pub fn new(diag: V) -> Self {
        Self { diag }
    }

    /// The stored diagonal.
    pub fn diagonal(&self) -> &V {
        &self.diag
    }

    pub fn diagonal_mut(&mut self) -> &mut V {
        &mut self.diag
    }

    pub fn into_inner(self) -> V {
        self.diag
    }
}

impl<V> Diag<V> {
    fn check<T: Scalar>(&self, i: usize, j: usize) -> Result<()>
    where
        V: ReadVector<T>,
    {
        let n = self.diag.dim();
        for index in [i, j] {
            if index >= n {
                return Err(LinalgError::IndexOutOfRange { index, len: n });
            }
        }
        Ok(())
    }

    /// `(n, n)`.
    pub fn shape<T: Scalar>(&self) -> (usize, usize)
    where
        V: ReadVector<T>,
    {
        let n = self.diag.dim();
        (n, n)
    }

    pub fn get<T: Scalar>(&self, i: usize, j: usize) -> Result<T>
    where
        V: ReadVector<T>,
    {
        self.check(i, j)?;
        if i == j {
            self.diag.get(i)
        } else {
            Ok(T::zero())
        }
    }

    /// Only in-range diagonal positions can be written.
    pub fn is_modifiable<T: Scalar>(&self, i: usize, j: usize) -> bool
    where
        V: ReadVector<T>,
    {
        i == j && i < self.diag.dim()
    }

    pub fn set<T: Scalar>(&mut self, i: usize, j: usize, value: T) -> Result<()>
    where
        V: WriteVector<T>,
    {
        self.check(i, j)?;
        if i != j {
            return Err(LinalgError::NotModifiable { row: i, col: j });
        }
        self.diag.set(i, value)
    }

    /// Write a diagonal entry; off-diagonal positions are silently ignored.
    ///
    /// # Safety
    /// `i` and `j` must both be less than the dimension.
    pub unsafe fn set_unchecked<T: Scalar>(&mut self, i: usize, j: usize, value: T)
    where
        V: WriteVector<T>,
    {
        if i == j {
            self.diag.set_unchecked(i, value);
        }
    }

    /// `D * x`
    pub fn mul_vector<T: Scalar, X: ReadVector<T> + ?Sized>(&self, x: &X) -> Result<MutVector<T>>
    where
        V: ReadVector<T>,
    {
        let mut y = x.view().to_owned_mut();
        self.mul_vector_in_place(&mut y)?;
        Ok(y)
    }

    /// `x ← D * x`
    pub fn mul_vector_in_place<T: Scalar, X: WriteVector<T> + ?Sized>(&self, x: &mut X) -> Result<()>
    where
        V: ReadVector<T>,
    {
        x.mul_assign(&self.diag)
    }

    /// `D^{-1} * b`. A zero on the diagonal divides through following `T`'s
    /// arithmetic.
    pub fn solve_vector<T: Scalar, B: ReadVector<T> + ?Sized>(&self, b: &B) -> Result<MutVector<T>>
    where
        V: ReadVector<T>,
    {
        let mut x = b.view().to_owned_mut();
        self.solve_vector_in_place(&mut x)?;
        Ok(x)
    }

    /// Like [`solve_vector`](Diag::solve_vector), but fails with
    /// `SingularMatrix` when a diagonal entry is exactly zero.
    pub fn checked_solve_vector<T: Scalar, B: ReadVector<T> + ?Sized>(&self, b: &B) -> Result<MutVector<T>>
    where
        V: ReadVector<T>,
    {
        if self.diag.iter().any(|d| d.is_zero()) {
            return Err(LinalgError::SingularMatrix);
        }
        self.solve_vector(b)
    }

    pub fn solve_vector_in_place<T: Scalar, X: WriteVector<T> + ?Sized>(&self, x: &mut X) -> Result<()>
    where
        V: ReadVector<T>,
    {
        x.div_assign(&self.diag)
    }

    /// `D * b`: row `i` of `b` scaled by `d_i`.
    pub fn mul_matrix<T: Scalar, M: ReadMatrix<T> + ?Sized>(&self, b: &M) -> Result<MutMatrix<T>>
    where
        V: ReadVector<T>,
    {
        let mut out = b.mat_view().to_owned_mut();
        out.scale_rows(&self.diag)?;
        Ok(out)
    }

    /// `D^{-1} * b`: row `i` of `b` divided by `d_i`.
    pub fn solve_matrix<T: Scalar, M: ReadMatrix<T> + ?Sized>(&self, b: &M) -> Result<MutMatrix<T>>
    where
        V: ReadVector<T>,
    {
        let mut out = b.mat_view().to_owned_mut();
        let (m, n) = out.shape();
        check_same_len(m, self.diag.dim())?;
        let d = self.diag.view();
        let data = out.as_mut_slice();
        for j in 0..n {
            for (i, di) in d.iter().enumerate() {
                data[i + j * m] = data[i + j * m] / di;
            }
        }
        Ok(out)
    }

    pub fn to_dense<T: Scalar>(&self) -> MutMatrix<T>
    where
        V: ReadVector<T>,
    {
        let n = self.diag.dim();
        let mut out = MutMatrix::zeros(n, n);
        for (i, di) in self.diag.iter().enumerate() {
            out.as_mut_slice()[i + i * n] = di;
        }
        out
    }
}
