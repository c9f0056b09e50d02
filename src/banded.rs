//! Band matrices in compact LAPACK-style storage.
//!
//! An `m x n` storage matrix with `kl` sub- and `ku` super-diagonals keeps
//! element `(i, j)`, `-kl <= j - i <= ku`, at `data[(ku + i - j) + j * ld]`
//! with `ld = kl + ku + 1`. Each stored diagonal is therefore a strided run
//! with stride `ld`. Transposed, conjugated and adjoint views only flip the
//! [`ElementOp`]; the storage never moves.

use crate::dense::{MutMatrix, MutVector};
use crate::element_op::ElementOp;
use crate::kernel;
use crate::matrix::ReadMatrix;
use crate::scalar::Scalar;
use crate::strided::Strided;
use crate::vector::{ReadVector, VectorView, VectorViewMut, WriteVector};
use crate::{check_same_len, LinalgError, Result};

/// An owned band matrix.
#[derive(Debug, Clone)]
pub struct Banded<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    kl: usize,
    ku: usize,
    op: ElementOp,
}

impl<T: Scalar> Banded<T> {
    /// All-zero `rows x cols` band matrix with `kl` sub- and `ku`
    /// super-diagonals.
    pub fn zeros(rows: usize, cols: usize, kl: usize, ku: usize) -> Self {
        Self {
            data: vec![T::zero(); (kl + ku + 1) * cols],
            rows,
            cols,
            kl,
            ku,
            op: ElementOp::Identity,
        }
    }

    /// Copy the band of a dense matrix, failing with `InvalidBandedMatrix`
    /// at the first nonzero entry outside it.
    pub fn from_dense<M: ReadMatrix<T> + ?Sized>(a: &M, kl: usize, ku: usize) -> Result<Self> {
        let a = a.mat_view();
        let (m, n) = (a.nrows(), a.ncols());
        let mut out = Self::zeros(m, n, kl, ku);
        for j in 0..n {
            for i in 0..m {
                let value = unsafe { a.get_unchecked(i, j) };
                match out.slot(i, j) {
                    Some(k) => out.data[k] = value,
                    None if value.is_zero() => {}
                    None => {
                        return Err(LinalgError::InvalidBandedMatrix {
                            row: i,
                            col: j,
                            kl,
                            ku,
                        })
                    }
                }
            }
        }
        Ok(out)
    }

    /// Build from the `kl + ku + 1` diagonals listed from offset `-kl` up to
    /// `ku`. Each one must have exactly the length of its diagonal.
    pub fn from_diags<V: ReadVector<T>>(
        rows: usize,
        cols: usize,
        kl: usize,
        ku: usize,
        diags: &[V],
    ) -> Result<Self> {
        check_same_len(kl + ku + 1, diags.len())?;
        let mut out = Self::zeros(rows, cols, kl, ku);
        for (d, values) in diags.iter().enumerate() {
            let k = d as isize - kl as isize;
            out.diag_mut(k)?.copy_from(values)?;
        }
        Ok(out)
    }
}

impl<T> Banded<T> {
    /// Leading dimension of the compact storage.
    #[inline]
    pub fn ld(&self) -> usize {
        self.kl + self.ku + 1
    }

    /// Logical shape.
    pub fn shape(&self) -> (usize, usize) {
        if self.op.is_transposed() {
            (self.cols, self.rows)
        } else {
            (self.rows, self.cols)
        }
    }

    pub fn nrows(&self) -> usize {
        self.shape().0
    }

    pub fn ncols(&self) -> usize {
        self.shape().1
    }

    /// Logical `(kl, ku)`.
    pub fn bandwidth(&self) -> (usize, usize) {
        if self.op.is_transposed() {
            (self.ku, self.kl)
        } else {
            (self.kl, self.ku)
        }
    }

    pub fn element_op(&self) -> ElementOp {
        self.op
    }

    /// The compact storage, `ld x cols` column-major.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn transpose(self) -> Self {
        Self {
            op: self.op.transpose(),
            ..self
        }
    }

    pub fn conj(self) -> Self {
        Self {
            op: self.op.conj(),
            ..self
        }
    }

    pub fn herm(self) -> Self {
        Self {
            op: self.op.adjoint(),
            ..self
        }
    }

    /// Storage index of in-range logical `(i, j)`, or `None` outside the band.
    #[inline]
    fn slot(&self, i: usize, j: usize) -> Option<usize> {
        let (r, c) = if self.op.is_transposed() { (j, i) } else { (i, j) };
        if c + self.kl >= r && r + self.ku >= c {
            Some(self.ku + r - c + c * self.ld())
        } else {
            None
        }
    }

    fn check(&self, i: usize, j: usize) -> Result<()> {
        let (m, n) = self.shape();
        if i >= m {
            return Err(LinalgError::IndexOutOfRange { index: i, len: m });
        }
        if j >= n {
            return Err(LinalgError::IndexOutOfRange { index: j, len: n });
        }
        Ok(())
    }

    /// Whether logical `(i, j)` is inside the shape and the band.
    pub fn is_modifiable(&self, i: usize, j: usize) -> bool {
        self.check(i, j).is_ok() && self.slot(i, j).is_some()
    }

    /// Storage offset and layout of logical diagonal `k`.
    fn diag_layout(&self, k: isize) -> Result<(usize, Strided)> {
        let ks = if self.op.is_transposed() { -k } else { k };
        if ks > self.ku as isize || -ks > self.kl as isize {
            let (kl, ku) = self.bandwidth();
            return Err(LinalgError::IndexOutOfRange {
                index: k.unsigned_abs(),
                len: if k >= 0 { ku } else { kl } + 1,
            });
        }
        let (i0, j0) = if ks >= 0 {
            (0, ks.unsigned_abs())
        } else {
            (ks.unsigned_abs(), 0)
        };
        let len = self.rows.saturating_sub(i0).min(self.cols.saturating_sub(j0));
        let offset = self.ku + i0 - j0 + j0 * self.ld();
        Ok((
            offset,
            Strided::new_unchecked(len, self.ld() as isize, self.op.is_conj()),
        ))
    }

    /// Logical diagonal `k` (`k > 0` above the main diagonal) as a strided
    /// view into the band storage. Diagonals outside the band are rejected.
    pub fn diag(&self, k: isize) -> Result<VectorView<'_, T>> {
        let (offset, layout) = self.diag_layout(k)?;
        // Elements offset + t * ld, t < len, lie inside storage column j0 + t.
        Ok(unsafe { VectorView::from_raw_parts(self.data.as_ptr().wrapping_add(offset), layout) })
    }

    pub fn diag_mut(&mut self, k: isize) -> Result<VectorViewMut<'_, T>> {
        let (offset, layout) = self.diag_layout(k)?;
        Ok(unsafe { VectorViewMut::from_raw_parts(self.data.as_mut_ptr().wrapping_add(offset), layout) })
    }
}

impl<T: Scalar> Banded<T> {
    #[inline]
    fn read(&self, i: usize, j: usize) -> T {
        match self.slot(i, j) {
            Some(k) => self.op.apply(self.data[k]),
            None => T::zero(),
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        self.check(i, j)?;
        Ok(self.read(i, j))
    }

    /// Write an in-band entry; positions outside the band fail with
    /// `NotModifiable`.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        self.check(i, j)?;
        match self.slot(i, j) {
            Some(k) => {
                self.data[k] = self.op.apply(value);
                Ok(())
            }
            None => Err(LinalgError::NotModifiable { row: i, col: j }),
        }
    }

    /// `A * x`
    pub fn mul_vector<X: ReadVector<T> + ?Sized>(&self, x: &X) -> Result<MutVector<T>> {
        let mut y = MutVector::zeros(self.nrows());
        self.mul_vector_into(T::one(), x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// `y ← alpha * A * x + beta * y`
    pub fn mul_vector_into<X, Y>(&self, alpha: T, x: &X, beta: T, y: &mut Y) -> Result<()>
    where
        X: ReadVector<T> + ?Sized,
        Y: WriteVector<T> + ?Sized,
    {
        let x = x.view();
        let mut y = y.view_mut();
        check_same_len(self.ncols(), x.len())?;
        check_same_len(self.nrows(), y.len())?;
        let (alpha, beta, op, conjx) = if y.is_conj() {
            (alpha.conj(), beta.conj(), self.op.conj(), !x.is_conj())
        } else {
            (alpha, beta, self.op, x.is_conj())
        };
        unsafe {
            kernel::gbmv(
                self.rows,
                self.cols,
                self.kl,
                self.ku,
                alpha,
                self.data.as_ptr(),
                self.ld(),
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

    /// Dense copy of the logical matrix.
    pub fn to_dense(&self) -> MutMatrix<T> {
        let (m, n) = self.shape();
        MutMatrix::from_fn(m, n, |i, j| self.read(i, j))
    }
}

impl<T: Scalar> PartialEq for Banded<T> {
    fn eq(&self, other: &Self) -> bool {
        let (m, n) = self.shape();
        if (m, n) != other.shape() {
            return false;
        }
        (0..n).all(|j| (0..m).all(|i| self.read(i, j) == other.read(i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::{Matrix, Vector};
    use num_complex::Complex64;

    fn tridiag() -> Matrix<f64> {
        Matrix::from_row_major(
            4,
            4,
            [
                2.0, -1.0, 0.0, 0.0, //
                -1.0, 2.0, -1.0, 0.0, //
                0.0, -1.0, 2.0, -1.0, //
                0.0, 0.0, -1.0, 2.0,
            ],
        )
    }

    #[test]
    fn test_from_dense_rejects_out_of_band() {
        let a = Matrix::from_row_major(2, 2, [1.0, 5.0, 0.0, 2.0]);
        assert_eq!(
            Banded::from_dense(&a, 0, 0),
            Err(LinalgError::InvalidBandedMatrix {
                row: 0,
                col: 1,
                kl: 0,
                ku: 0
            })
        );
        assert!(Banded::from_dense(&a, 0, 1).is_ok());
    }

    #[test]
    fn test_get_set_and_modifiability() {
        let mut b = Banded::from_dense(&tridiag(), 1, 1).unwrap();
        assert_eq!(b.get(1, 0).unwrap(), -1.0);
        assert_eq!(b.get(0, 3).unwrap(), 0.0);
        assert!(b.get(4, 0).is_err());
        assert!(b.is_modifiable(2, 3));
        assert!(!b.is_modifiable(0, 2));
        assert_eq!(
            b.set(0, 2, 1.0),
            Err(LinalgError::NotModifiable { row: 0, col: 2 })
        );
        b.set(2, 3, 7.0).unwrap();
        assert_eq!(b.get(2, 3).unwrap(), 7.0);
        assert_eq!(b.to_dense().get(2, 3).unwrap(), 7.0);
    }

    #[test]
    fn test_diag_views_share_storage() {
        let mut b = Banded::<f64>::zeros(3, 4, 1, 2);
        assert_eq!(b.diag(2).unwrap().len(), 2);
        assert_eq!(b.diag(-1).unwrap().len(), 2);
        assert_eq!(b.diag(0).unwrap().stride(), 4);
        assert!(b.diag(3).is_err());
        assert!(b.diag(-2).is_err());

        b.diag_mut(1).unwrap().fill(5.0);
        assert_eq!(b.get(0, 1).unwrap(), 5.0);
        assert_eq!(b.get(2, 3).unwrap(), 5.0);
        assert_eq!(b.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_from_diags() {
        let b = Banded::from_diags(
            4,
            4,
            1,
            1,
            &[
                Vector::constant(3, -1.0),
                Vector::constant(4, 2.0),
                Vector::constant(3, -1.0),
            ],
        )
        .unwrap();
        assert_eq!(b.to_dense(), tridiag().thaw());
        assert!(Banded::from_diags(4, 4, 1, 1, &[Vector::constant(4, 2.0)]).is_err());
        assert!(Banded::from_diags(
            4,
            4,
            0,
            0,
            &[Vector::constant(3, 2.0)]
        )
        .is_err());
    }

    #[test]
    fn test_mul_vector_matches_dense() {
        let dense = Matrix::from_fn(3, 4, |i, j| if j + 1 >= i && i + 2 >= j { (1 + i + 3 * j) as f64 } else { 0.0 });
        let b = Banded::from_dense(&dense, 1, 2).unwrap();
        let x = Vector::from_vec(vec![1.0, -2.0, 3.0, 0.5]);
        assert_eq!(b.mul_vector(&x).unwrap(), dense.mul_vector(&x).unwrap());

        let bt = b.clone().transpose();
        assert_eq!(bt.shape(), (4, 3));
        assert_eq!(bt.bandwidth(), (2, 1));
        let z = Vector::from_vec(vec![1.0, 1.0, -1.0]);
        assert_eq!(bt.mul_vector(&z).unwrap(), dense.transpose().mul_vector(&z).unwrap());
        assert_eq!(bt.diag(-1).unwrap().to_vec(), dense.diag(1).unwrap().to_vec());
        assert!(b.mul_vector(&z).is_err());
    }

    #[test]
    fn test_herm_view() {
        let dense = Matrix::from_row_major(
            2,
            2,
            [
                Complex64::new(1.0, 1.0),
                Complex64::new(2.0, -3.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(4.0, 0.5),
            ],
        );
        let b = Banded::from_dense(&dense, 0, 1).unwrap().herm();
        assert_eq!(b.get(1, 0).unwrap(), Complex64::new(2.0, 3.0));
        assert_eq!(b.to_dense(), dense.herm().thaw());
        let x = Vector::from_vec(vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)]);
        assert_eq!(b.mul_vector(&x).unwrap(), dense.herm().mul_vector(&x).unwrap());
        assert_eq!(b.diag(-1).unwrap().to_vec(), vec![Complex64::new(2.0, 3.0)]);
    }
}
