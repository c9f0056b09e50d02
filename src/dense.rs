//! Owned vectors and matrices, and the freeze/thaw conversions between them.
//!
//! [`MutVector`] / [`MutMatrix`] own a `Vec<T>` and are mutated in place.
//! [`Vector`] / [`Matrix`] are immutable values over an `Arc<Vec<T>>`;
//! cloning them and taking views of them (subvector, row, transpose, ...)
//! is O(1) and shares the allocation.
//!
//! Freezing and thawing come in two flavours:
//!
//! - `freeze` / `thaw` borrow the source and always copy;
//! - `into_frozen` / `into_thawed` consume the source. Freezing is always
//!   zero-copy since the move proves no mutable handle remains. Thawing is
//!   zero-copy when the allocation is uniquely owned and the value covers it
//!   exactly; otherwise it falls back to a copy.
//!
//! Borrowed views convert the same way: [`VectorViewMut::into_const`] and
//! [`VectorView::as_mut_unchecked`] (and the matrix analogues) reinterpret
//! memory without copying, the latter being `unsafe`.

use crate::element_op::ElementOp;
use crate::matrix::{fmt_matrix, mat_views_equal, MatrixView, MatrixViewMut, ReadMatrix, WriteMatrix};
use crate::scalar::Scalar;
use crate::strided::{MatLayout, Strided};
use crate::vector::{fmt_vector, views_equal, ReadVector, VectorView, VectorViewMut, WriteVector};
use crate::{LinalgError, Result};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// MutVector
// ============================================================================

/// An owned, contiguous, mutable vector.
#[derive(Debug, Clone, Default)]
pub struct MutVector<T> {
    data: Vec<T>,
}

impl<T: Scalar> MutVector<T> {
    pub fn zeros(n: usize) -> Self {
        Self::constant(n, T::zero())
    }

    pub fn constant(n: usize, value: T) -> Self {
        Self {
            data: vec![value; n],
        }
    }

    /// Unit vector with a one at index `i`.
    pub fn basis(n: usize, i: usize) -> Result<Self> {
        let mut v = Self::zeros(n);
        v.set(i, T::one())?;
        Ok(v)
    }

    /// Zeros except at the listed positions.
    ///
    /// Indices must not repeat; which value wins for a repeated index is
    /// unspecified.
    pub fn from_assocs(n: usize, assocs: &[(usize, T)]) -> Result<Self> {
        let mut v = Self::zeros(n);
        for &(i, value) in assocs {
            v.set(i, value)?;
        }
        Ok(v)
    }

    /// The first `n` items of `values`, padded with zeros.
    pub fn from_list(n: usize, values: impl IntoIterator<Item = T>) -> Self {
        let mut data: Vec<T> = values.into_iter().take(n).collect();
        data.resize(n, T::zero());
        Self { data }
    }

    pub fn from_fn(n: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            data: (0..n).map(f).collect(),
        }
    }

    /// Copy into an immutable vector.
    pub fn freeze(&self) -> Vector<T> {
        Vector::from_vec(self.data.clone())
    }
}

impl<T> MutVector<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Turn into an immutable vector without copying.
    pub fn into_frozen(self) -> Vector<T> {
        Vector {
            layout: Strided::contiguous(self.data.len()),
            data: Arc::new(self.data),
            base: 0,
        }
    }

    pub fn subvector_mut(&mut self, offset: usize, len: usize) -> Result<VectorViewMut<'_, T>> {
        VectorViewMut::from_slice(&mut self.data).subvector_mut(offset, len)
    }

    pub fn subvector_with_stride_mut(
        &mut self,
        step: isize,
        offset: usize,
        len: usize,
    ) -> Result<VectorViewMut<'_, T>> {
        VectorViewMut::from_slice(&mut self.data).subvector_with_stride_mut(step, offset, len)
    }

    pub fn split_at_mut(&mut self, k: usize) -> Result<(VectorViewMut<'_, T>, VectorViewMut<'_, T>)> {
        VectorViewMut::from_slice(&mut self.data).split_at_mut(k)
    }
}

impl<T: Scalar> ReadVector<T> for MutVector<T> {
    #[inline]
    fn view(&self) -> VectorView<'_, T> {
        VectorView::from_slice(&self.data)
    }
}

impl<T: Scalar> WriteVector<T> for MutVector<T> {
    #[inline]
    fn view_mut(&mut self) -> VectorViewMut<'_, T> {
        VectorViewMut::from_slice(&mut self.data)
    }
}

impl<T> From<Vec<T>> for MutVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

// ============================================================================
// Vector
// ============================================================================

/// An immutable vector sharing its allocation with every view taken of it.
#[derive(Debug, Clone)]
pub struct Vector<T> {
    data: Arc<Vec<T>>,
    base: usize,
    layout: Strided,
}

impl<T: Scalar> Vector<T> {
    pub fn zeros(n: usize) -> Self {
        MutVector::zeros(n).into_frozen()
    }

    pub fn constant(n: usize, value: T) -> Self {
        MutVector::constant(n, value).into_frozen()
    }

    pub fn basis(n: usize, i: usize) -> Result<Self> {
        Ok(MutVector::basis(n, i)?.into_frozen())
    }

    /// See [`MutVector::from_assocs`].
    pub fn from_assocs(n: usize, assocs: &[(usize, T)]) -> Result<Self> {
        Ok(MutVector::from_assocs(n, assocs)?.into_frozen())
    }

    pub fn from_list(n: usize, values: impl IntoIterator<Item = T>) -> Self {
        MutVector::from_list(n, values).into_frozen()
    }

    pub fn from_fn(n: usize, f: impl FnMut(usize) -> T) -> Self {
        MutVector::from_fn(n, f).into_frozen()
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        MutVector::from_vec(data).into_frozen()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    fn share(&self, shift: isize, layout: Strided) -> Self {
        Self {
            data: Arc::clone(&self.data),
            base: (self.base as isize + shift) as usize,
            layout,
        }
    }

    /// Elements `offset .. offset + len`, sharing storage.
    pub fn subvector(&self, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange(offset, len)?;
        Ok(self.share(shift, layout))
    }

    pub fn subvector_with_stride(&self, step: isize, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange_with_stride(step, offset, len)?;
        Ok(self.share(shift, layout))
    }

    pub fn conj(&self) -> Self {
        self.share(0, self.layout.with_conj())
    }

    pub fn reversed(&self) -> Self {
        let (shift, layout) = self.layout.reversed();
        self.share(shift, layout)
    }

    /// Copy into a mutable vector, materializing a pending conjugation.
    pub fn thaw(&self) -> MutVector<T> {
        self.view().to_owned_mut()
    }

    /// Turn into a mutable vector, reusing the allocation when this is its
    /// only owner and the value covers it contiguously.
    pub fn into_thawed(self) -> MutVector<T> {
        let Vector { data, base, layout } = self;
        let covers = base == 0
            && layout.stride() == 1
            && !layout.is_conj()
            && data.len() == layout.len();
        if covers {
            match Arc::try_unwrap(data) {
                Ok(data) => {
                    tracing::debug!(len = layout.len(), "thaw vector without copy");
                    return MutVector { data };
                }
                Err(data) => {
                    tracing::debug!(len = layout.len(), "vector storage is shared, thaw copies");
                    return Vector { data, base, layout }.thaw();
                }
            }
        }
        tracing::debug!(len = layout.len(), "vector is a strided view, thaw copies");
        Vector { data, base, layout }.thaw()
    }

    /// Copy the stored elements into fresh storage, keeping the conjugate
    /// flag pending.
    pub fn copy_view(&self) -> Self {
        let v = self.view();
        let data: Vec<T> = (0..v.len()).map(|i| unsafe { v.raw(i) }).collect();
        Self {
            layout: Strided::new_unchecked(data.len(), 1, v.is_conj()),
            data: Arc::new(data),
            base: 0,
        }
    }

    fn zip_with(&self, other: &impl ReadVector<T>, f: impl FnOnce(&mut MutVector<T>, VectorView<'_, T>) -> Result<()>) -> Result<Self> {
        let mut out = self.thaw();
        f(&mut out, other.view())?;
        Ok(out.into_frozen())
    }

    pub fn add(&self, other: &impl ReadVector<T>) -> Result<Self> {
        self.zip_with(other, |y, x| y.add_assign(&x))
    }

    pub fn sub(&self, other: &impl ReadVector<T>) -> Result<Self> {
        self.zip_with(other, |y, x| y.sub_assign(&x))
    }

    /// Elementwise product.
    pub fn mul(&self, other: &impl ReadVector<T>) -> Result<Self> {
        self.zip_with(other, |y, x| y.mul_assign(&x))
    }

    /// Elementwise quotient.
    pub fn div(&self, other: &impl ReadVector<T>) -> Result<Self> {
        self.zip_with(other, |y, x| y.div_assign(&x))
    }

    /// `alpha * x + self`
    pub fn axpy(&self, alpha: T, x: &impl ReadVector<T>) -> Result<Self> {
        self.zip_with(x, |y, x| y.axpy(alpha, &x))
    }

    pub fn scale(&self, k: T) -> Self {
        let mut out = self.thaw();
        out.scale_by(k);
        out.into_frozen()
    }

    pub fn shift(&self, k: T) -> Self {
        let mut out = self.thaw();
        out.shift_by(k);
        out.into_frozen()
    }
}

impl<T: Scalar> ReadVector<T> for Vector<T> {
    #[inline]
    fn view(&self) -> VectorView<'_, T> {
        unsafe { VectorView::from_raw_parts(self.data.as_ptr().wrapping_add(self.base), self.layout) }
    }
}

impl<T> From<MutVector<T>> for Vector<T> {
    fn from(v: MutVector<T>) -> Self {
        v.into_frozen()
    }
}

// ============================================================================
// Borrowed view conversions
// ============================================================================

impl<T: Scalar> VectorView<'_, T> {
    /// Copy the logical values into an owned vector.
    pub fn to_owned_mut(&self) -> MutVector<T> {
        MutVector { data: self.to_vec() }
    }

    pub fn freeze(&self) -> Vector<T> {
        self.to_owned_mut().into_frozen()
    }
}

impl<T: Scalar> VectorViewMut<'_, T> {
    pub fn freeze(&self) -> Vector<T> {
        self.rb().freeze()
    }
}

impl<T: Scalar> MatrixView<'_, T> {
    /// Copy the logical values into a dense owned matrix.
    pub fn to_owned_mut(&self) -> MutMatrix<T> {
        let (m, n) = self.layout().shape();
        let mut out = MutMatrix::zeros(m, n);
        for j in 0..n {
            for i in 0..m {
                out.data[i + j * m] = unsafe { self.read(i, j) };
            }
        }
        out
    }

    /// Copy the storage into a dense immutable matrix that keeps this
    /// view's element operation.
    pub fn freeze(&self) -> Matrix<T> {
        let op = self.layout().op();
        let storage = if op.is_transposed() {
            self.transpose()
        } else {
            *self
        };
        let (sm, sn) = storage.layout().shape();
        let mut data = Vec::with_capacity(sm * sn);
        for j in 0..sn {
            for i in 0..sm {
                data.push(unsafe { storage.raw(i, j) });
            }
        }
        let mut layout = MatLayout::col_major(sm, sn);
        if op.is_transposed() {
            layout = layout.transpose();
        }
        if op.is_conj() {
            layout = layout.conj();
        }
        Matrix {
            data: Arc::new(data),
            base: 0,
            layout,
        }
    }
}

impl<T: Scalar> MatrixViewMut<'_, T> {
    pub fn freeze(&self) -> Matrix<T> {
        self.rb().freeze()
    }
}

// ============================================================================
// MutMatrix
// ============================================================================

/// An owned, tightly packed, mutable matrix.
///
/// The storage is column-major with `ld` equal to its row count; the element
/// operation may still transpose or conjugate the logical view.
#[derive(Debug, Clone)]
pub struct MutMatrix<T> {
    data: Vec<T>,
    layout: MatLayout,
}

impl<T: Scalar> MutMatrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::constant(rows, cols, T::zero())
    }

    pub fn constant(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: vec![value; rows * cols],
            layout: MatLayout::col_major(rows, cols),
        }
    }

    /// Ones on the main diagonal.
    pub fn identity(rows: usize, cols: usize) -> Self {
        let mut a = Self::zeros(rows, cols);
        a.set_identity();
        a
    }

    /// Wrap column-major `data` of exactly `rows * cols` elements.
    pub fn from_col_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LinalgError::ShapeMismatch(vec![rows, cols], vec![data.len()]));
        }
        Ok(Self {
            data,
            layout: MatLayout::col_major(rows, cols),
        })
    }

    /// The first `rows * cols` items of `values` in row-major order, padded
    /// with zeros.
    pub fn from_row_major(rows: usize, cols: usize, values: impl IntoIterator<Item = T>) -> Self {
        let mut a = Self::zeros(rows, cols);
        for (k, value) in values.into_iter().take(rows * cols).enumerate() {
            let (i, j) = (k / cols, k % cols);
            a.data[i + j * rows] = value;
        }
        a
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for j in 0..cols {
            for i in 0..rows {
                data.push(f(i, j));
            }
        }
        Self {
            data,
            layout: MatLayout::col_major(rows, cols),
        }
    }

    /// Stack `rows` as the rows of a new matrix.
    ///
    /// # Errors
    /// `ShapeMismatch` if the vectors differ in length.
    pub fn from_rows<V: ReadVector<T>>(rows: &[V]) -> Result<Self> {
        let n = rows.first().map_or(0, |r| r.dim());
        let mut a = Self::zeros(rows.len(), n);
        for (i, r) in rows.iter().enumerate() {
            if r.dim() != n {
                return Err(LinalgError::ShapeMismatch(vec![n], vec![r.dim()]));
            }
            a.row_mut(i)?.copy_from(r)?;
        }
        Ok(a)
    }

    /// Stack `cols` as the columns of a new matrix.
    ///
    /// # Errors
    /// `ShapeMismatch` if the vectors differ in length.
    pub fn from_cols<V: ReadVector<T>>(cols: &[V]) -> Result<Self> {
        let m = cols.first().map_or(0, |c| c.dim());
        let mut a = Self::zeros(m, cols.len());
        for (j, c) in cols.iter().enumerate() {
            if c.dim() != m {
                return Err(LinalgError::ShapeMismatch(vec![m], vec![c.dim()]));
            }
            a.col_mut(j)?.copy_from(c)?;
        }
        Ok(a)
    }

    /// Zeros except at the listed positions.
    ///
    /// Positions must not repeat; which value wins for a repeated position
    /// is unspecified.
    pub fn from_assocs(shape: (usize, usize), assocs: &[((usize, usize), T)]) -> Result<Self> {
        let mut a = Self::zeros(shape.0, shape.1);
        for &((i, j), value) in assocs {
            a.set(i, j, value)?;
        }
        Ok(a)
    }

    /// Copy into an immutable matrix, keeping the element operation.
    pub fn freeze(&self) -> Matrix<T> {
        Matrix {
            data: Arc::new(self.data.clone()),
            base: 0,
            layout: self.layout,
        }
    }
}

impl<T> MutMatrix<T> {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.layout.cols()
    }

    /// Column-major storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Turn into an immutable matrix without copying.
    pub fn into_frozen(self) -> Matrix<T> {
        Matrix {
            data: Arc::new(self.data),
            base: 0,
            layout: self.layout,
        }
    }

    #[inline]
    fn raw_view_mut(&mut self) -> MatrixViewMut<'_, T> {
        unsafe { MatrixViewMut::from_raw_parts(self.data.as_mut_ptr(), self.layout) }
    }

    pub fn submatrix_mut(&mut self, origin: (usize, usize), shape: (usize, usize)) -> Result<MatrixViewMut<'_, T>> {
        self.raw_view_mut().submatrix_mut(origin, shape)
    }

    pub fn split_rows_at_mut(&mut self, k: usize) -> Result<(MatrixViewMut<'_, T>, MatrixViewMut<'_, T>)> {
        self.raw_view_mut().split_rows_at_mut(k)
    }

    pub fn split_cols_at_mut(&mut self, k: usize) -> Result<(MatrixViewMut<'_, T>, MatrixViewMut<'_, T>)> {
        self.raw_view_mut().split_cols_at_mut(k)
    }

    pub fn row_mut(&mut self, i: usize) -> Result<VectorViewMut<'_, T>> {
        self.raw_view_mut().row_mut(i)
    }

    pub fn col_mut(&mut self, j: usize) -> Result<VectorViewMut<'_, T>> {
        self.raw_view_mut().col_mut(j)
    }

    pub fn diag_mut(&mut self, k: isize) -> Result<VectorViewMut<'_, T>> {
        self.raw_view_mut().diag_mut(k)
    }

    pub fn transpose(self) -> Self {
        Self {
            layout: self.layout.transpose(),
            data: self.data,
        }
    }

    pub fn conj(self) -> Self {
        Self {
            layout: self.layout.conj(),
            data: self.data,
        }
    }

    pub fn herm(self) -> Self {
        Self {
            layout: self.layout.herm(),
            data: self.data,
        }
    }
}

impl<T: Scalar> ReadMatrix<T> for MutMatrix<T> {
    #[inline]
    fn mat_view(&self) -> MatrixView<'_, T> {
        unsafe { MatrixView::from_raw_parts(self.data.as_ptr(), self.layout) }
    }
}

impl<T: Scalar> WriteMatrix<T> for MutMatrix<T> {
    #[inline]
    fn mat_view_mut(&mut self) -> MatrixViewMut<'_, T> {
        self.raw_view_mut()
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// An immutable matrix sharing its allocation with every view taken of it.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    data: Arc<Vec<T>>,
    base: usize,
    layout: MatLayout,
}

impl<T: Scalar> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        MutMatrix::zeros(rows, cols).into_frozen()
    }

    pub fn constant(rows: usize, cols: usize, value: T) -> Self {
        MutMatrix::constant(rows, cols, value).into_frozen()
    }

    pub fn identity(rows: usize, cols: usize) -> Self {
        MutMatrix::identity(rows, cols).into_frozen()
    }

    pub fn from_col_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        Ok(MutMatrix::from_col_major(rows, cols, data)?.into_frozen())
    }

    pub fn from_row_major(rows: usize, cols: usize, values: impl IntoIterator<Item = T>) -> Self {
        MutMatrix::from_row_major(rows, cols, values).into_frozen()
    }

    pub fn from_fn(rows: usize, cols: usize, f: impl FnMut(usize, usize) -> T) -> Self {
        MutMatrix::from_fn(rows, cols, f).into_frozen()
    }

    pub fn from_rows<V: ReadVector<T>>(rows: &[V]) -> Result<Self> {
        Ok(MutMatrix::from_rows(rows)?.into_frozen())
    }

    pub fn from_cols<V: ReadVector<T>>(cols: &[V]) -> Result<Self> {
        Ok(MutMatrix::from_cols(cols)?.into_frozen())
    }

    /// See [`MutMatrix::from_assocs`].
    pub fn from_assocs(shape: (usize, usize), assocs: &[((usize, usize), T)]) -> Result<Self> {
        Ok(MutMatrix::from_assocs(shape, assocs)?.into_frozen())
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.layout.cols()
    }

    fn with(&self, shift: isize, layout: MatLayout) -> Self {
        Self {
            data: Arc::clone(&self.data),
            base: (self.base as isize + shift) as usize,
            layout,
        }
    }

    fn line(&self, shift: isize, layout: Strided) -> Vector<T> {
        Vector {
            data: Arc::clone(&self.data),
            base: (self.base as isize + shift) as usize,
            layout,
        }
    }

    pub fn submatrix(&self, origin: (usize, usize), shape: (usize, usize)) -> Result<Self> {
        let (shift, layout) = self.layout.submatrix(origin, shape)?;
        Ok(self.with(shift, layout))
    }

    pub fn split_rows_at(&self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let top = self.submatrix((0, 0), (k.min(m), n))?;
        let bottom = self.submatrix((k, 0), (m.saturating_sub(k), n))?;
        Ok((top, bottom))
    }

    pub fn split_cols_at(&self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let left = self.submatrix((0, 0), (m, k.min(n)))?;
        let right = self.submatrix((0, k), (m, n.saturating_sub(k)))?;
        Ok((left, right))
    }

    /// Row `i` as a vector sharing storage.
    pub fn row(&self, i: usize) -> Result<Vector<T>> {
        if i >= self.nrows() {
            return Err(LinalgError::IndexOutOfRange {
                index: i,
                len: self.nrows(),
            });
        }
        let (shift, layout) = self.layout.row(i);
        Ok(self.line(shift, layout))
    }

    /// Column `j` as a vector sharing storage.
    pub fn col(&self, j: usize) -> Result<Vector<T>> {
        if j >= self.ncols() {
            return Err(LinalgError::IndexOutOfRange {
                index: j,
                len: self.ncols(),
            });
        }
        let (shift, layout) = self.layout.col(j);
        Ok(self.line(shift, layout))
    }

    /// Diagonal at signed offset `k` as a vector sharing storage.
    pub fn diag(&self, k: isize) -> Result<Vector<T>> {
        let (shift, layout) = self.layout.diag(k)?;
        Ok(self.line(shift, layout))
    }

    pub fn transpose(&self) -> Self {
        self.with(0, self.layout.transpose())
    }

    pub fn conj(&self) -> Self {
        self.with(0, self.layout.conj())
    }

    pub fn herm(&self) -> Self {
        self.with(0, self.layout.herm())
    }

    /// Copy into a mutable matrix with the same element operation.
    pub fn thaw(&self) -> MutMatrix<T> {
        let frozen = self.mat_view().freeze();
        MutMatrix {
            layout: frozen.layout,
            data: frozen.data.to_vec(),
        }
    }

    /// Turn into a mutable matrix, reusing the allocation when this is its
    /// only owner and the storage is tightly packed.
    pub fn into_thawed(self) -> MutMatrix<T> {
        let Matrix { data, base, layout } = self;
        let (srows, scols) = layout.storage_shape();
        let packed = base == 0 && layout.ld() == srows.max(1) && data.len() == srows * scols;
        if packed {
            match Arc::try_unwrap(data) {
                Ok(data) => {
                    tracing::debug!(rows = layout.rows(), cols = layout.cols(), "thaw matrix without copy");
                    return MutMatrix { data, layout };
                }
                Err(data) => {
                    tracing::debug!("matrix storage is shared, thaw copies");
                    return Matrix { data, base, layout }.thaw();
                }
            }
        }
        tracing::debug!("matrix is a submatrix view, thaw copies");
        Matrix { data, base, layout }.thaw()
    }

    fn zip_with(
        &self,
        other: &impl ReadMatrix<T>,
        f: impl FnOnce(&mut MutMatrix<T>, MatrixView<'_, T>) -> Result<()>,
    ) -> Result<Self> {
        let mut out = self.mat_view().to_owned_mut();
        f(&mut out, other.mat_view())?;
        Ok(out.into_frozen())
    }

    pub fn add(&self, other: &impl ReadMatrix<T>) -> Result<Self> {
        self.zip_with(other, |a, b| a.add_assign(&b))
    }

    pub fn sub(&self, other: &impl ReadMatrix<T>) -> Result<Self> {
        self.zip_with(other, |a, b| a.sub_assign(&b))
    }

    /// Elementwise product.
    pub fn mul(&self, other: &impl ReadMatrix<T>) -> Result<Self> {
        self.zip_with(other, |a, b| a.mul_assign(&b))
    }

    /// Elementwise quotient.
    pub fn div(&self, other: &impl ReadMatrix<T>) -> Result<Self> {
        self.zip_with(other, |a, b| a.div_assign(&b))
    }

    pub fn scale(&self, k: T) -> Self {
        let mut out = self.mat_view().to_owned_mut();
        out.scale_by(k);
        out.into_frozen()
    }

    pub fn shift(&self, k: T) -> Self {
        let mut out = self.mat_view().to_owned_mut();
        out.shift_by(k);
        out.into_frozen()
    }
}

impl<T: Scalar> ReadMatrix<T> for Matrix<T> {
    #[inline]
    fn mat_view(&self) -> MatrixView<'_, T> {
        unsafe { MatrixView::from_raw_parts(self.data.as_ptr().wrapping_add(self.base), self.layout) }
    }
}

impl<T> From<MutMatrix<T>> for Matrix<T> {
    fn from(a: MutMatrix<T>) -> Self {
        a.into_frozen()
    }
}

// ============================================================================
// Equality and display
// ============================================================================

macro_rules! impl_vector_traits {
    ($($ty:ident),*) => {$(
        impl<T: Scalar> PartialEq for $ty<T> {
            fn eq(&self, other: &Self) -> bool {
                views_equal(self.view(), other.view())
            }
        }

        impl<T: Scalar> fmt::Display for $ty<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_vector(self.view(), f)
            }
        }
    )*};
}

macro_rules! impl_matrix_traits {
    ($($ty:ident),*) => {$(
        impl<T: Scalar> PartialEq for $ty<T> {
            fn eq(&self, other: &Self) -> bool {
                mat_views_equal(self.mat_view(), other.mat_view())
            }
        }

        impl<T: Scalar> fmt::Display for $ty<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_matrix(self.mat_view(), f)
            }
        }
    )*};
}

impl_vector_traits!(Vector, MutVector);
impl_matrix_traits!(Matrix, MutMatrix);

impl<T: Scalar> Matrix<T> {
    /// Element operation between the storage and the logical matrix.
    pub fn element_op(&self) -> ElementOp {
        self.layout.op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_basis() {
        let v = Vector::<f64>::basis(4, 2).unwrap();
        assert_eq!(v.to_vec(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(v.dim(), 4);
        assert_eq!(v.which_max_abs().unwrap(), (2, 1.0));
        assert!(matches!(
            Vector::<f64>::basis(4, 4),
            Err(LinalgError::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_constructors() {
        assert_eq!(MutVector::constant(2, 3.0).to_vec(), vec![3.0, 3.0]);
        assert_eq!(MutVector::from_list(4, [1.0, 2.0]).to_vec(), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(MutVector::from_list(1, [1.0, 2.0]).to_vec(), vec![1.0]);
        assert_eq!(MutVector::from_fn(3, |i| i as f64).to_vec(), vec![0.0, 1.0, 2.0]);
        let v = MutVector::from_assocs(3, &[(0, 5.0), (2, 7.0)]).unwrap();
        assert_eq!(v.to_vec(), vec![5.0, 0.0, 7.0]);
        assert!(MutVector::from_assocs(3, &[(3, 1.0)]).is_err());
    }

    #[test]
    fn test_freeze_copies() {
        let mut m = MutVector::from_vec(vec![1.0, 2.0]);
        let frozen = m.freeze();
        m.set(0, 9.0).unwrap();
        assert_eq!(frozen.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_into_frozen_and_into_thawed_reuse_allocation() {
        let m = MutVector::from_vec(vec![1.0, 2.0, 3.0]);
        let ptr = m.as_slice().as_ptr();
        let frozen = m.into_frozen();
        assert_eq!(frozen.view().as_ptr(), ptr);
        let thawed = frozen.into_thawed();
        assert_eq!(thawed.as_slice().as_ptr(), ptr);
    }

    #[test]
    fn test_into_thawed_copies_when_shared() {
        let frozen = Vector::from_vec(vec![1.0, 2.0]);
        let other = frozen.clone();
        let mut thawed = frozen.into_thawed();
        thawed.set(0, 5.0).unwrap();
        assert_eq!(other.to_vec(), vec![1.0, 2.0]);
        assert_eq!(thawed.to_vec(), vec![5.0, 2.0]);
    }

    #[test]
    fn test_thaw_materializes_conj() {
        let v = Vector::from_vec(vec![c(1.0, 1.0)]).conj();
        let t = v.thaw();
        assert!(!t.is_conj());
        assert_eq!(t.as_slice(), &[c(1.0, -1.0)]);
        let t = v.clone().into_thawed();
        assert_eq!(t.as_slice(), &[c(1.0, -1.0)]);
    }

    #[test]
    fn test_copy_view_keeps_conj() {
        let v = Vector::from_vec(vec![c(1.0, 1.0), c(2.0, 0.0)]).conj();
        let copy = v.copy_view();
        assert!(copy.is_conj());
        assert_eq!(copy, v);
        assert_eq!(copy.to_string(), "conj (vector 2 [1+1i, 2+0i])");
    }

    #[test]
    fn test_subvector_shares_storage() {
        let v = Vector::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let s = v.subvector_with_stride(2, 0, 3).unwrap();
        assert_eq!(s.to_vec(), vec![0.0, 2.0, 4.0]);
        assert_eq!(s.view().as_ptr(), v.view().as_ptr());
        assert_eq!(v.reversed().subvector(0, 2).unwrap().to_vec(), vec![4.0, 3.0]);
        assert!(v.subvector(4, 2).is_err());
    }

    #[test]
    fn test_pure_arithmetic() {
        let x = Vector::from_vec(vec![1.0, 2.0]);
        let y = Vector::from_vec(vec![3.0, 4.0]);
        assert_eq!(x.add(&y).unwrap().to_vec(), vec![4.0, 6.0]);
        assert_eq!(x.sub(&y).unwrap().to_vec(), vec![-2.0, -2.0]);
        assert_eq!(x.mul(&y).unwrap().to_vec(), vec![3.0, 8.0]);
        assert_eq!(y.div(&x).unwrap().to_vec(), vec![3.0, 2.0]);
        assert_eq!(x.axpy(2.0, &y).unwrap().to_vec(), vec![7.0, 10.0]);
        assert_eq!(x.scale(3.0).to_vec(), vec![3.0, 6.0]);
        assert_eq!(x.shift(1.0).to_vec(), vec![2.0, 3.0]);
        assert!(x.add(&Vector::from_vec(vec![1.0])).is_err());
        // inputs untouched
        assert_eq!(x.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_matrix_constructors() {
        let a = MutMatrix::from_row_major(2, 2, [1.0, 2.0, 3.0]);
        assert_eq!(a.to_row_major_vec(), vec![1.0, 2.0, 3.0, 0.0]);
        let rows = [Vector::from_vec(vec![1.0, 2.0]), Vector::from_vec(vec![3.0, 4.0])];
        let b = Matrix::from_rows(&rows).unwrap();
        assert_eq!(b.to_row_major_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::from_cols(&rows).unwrap();
        assert_eq!(b.to_row_major_vec(), vec![1.0, 3.0, 2.0, 4.0]);
        let ragged = [Vector::from_vec(vec![1.0, 2.0]), Vector::from_vec(vec![3.0])];
        assert!(matches!(
            Matrix::from_rows(&ragged),
            Err(LinalgError::ShapeMismatch(_, _))
        ));
        let id = Matrix::<f64>::identity(2, 3);
        assert_eq!(id.to_row_major_vec(), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let e = Matrix::from_assocs((2, 2), &[((1, 0), 4.0)]).unwrap();
        assert_eq!(e.get(1, 0).unwrap(), 4.0);
        assert!(Matrix::from_assocs((2, 2), &[((2, 0), 4.0)]).is_err());
        assert!(MutMatrix::from_col_major(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_matrix_views_share_storage() {
        let a = Matrix::from_row_major(3, 3, (0..9).map(|v| v as f64));
        let s = a.submatrix((1, 1), (2, 2)).unwrap();
        assert_eq!(s.to_row_major_vec(), vec![4.0, 5.0, 7.0, 8.0]);
        assert_eq!(a.row(1).unwrap().to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(a.col(1).unwrap().to_vec(), vec![1.0, 4.0, 7.0]);
        assert_eq!(a.diag(1).unwrap().to_vec(), vec![1.0, 5.0]);
        assert_eq!(a.transpose().row(1).unwrap(), a.col(1).unwrap());
        let (top, bottom) = a.split_rows_at(1).unwrap();
        assert_eq!((top.nrows(), bottom.nrows()), (1, 2));
        let (left, right) = a.split_cols_at(3).unwrap();
        assert_eq!((left.ncols(), right.ncols()), (3, 0));
        assert!(a.row(3).is_err());
    }

    #[test]
    fn test_frozen_herm_flag_is_observable() {
        let mut a = MutMatrix::<Complex64>::zeros(1, 2);
        a.set(0, 1, c(0.0, 1.0)).unwrap();
        let h = a.herm().into_frozen();
        assert!(h.is_herm());
        assert_eq!(h.shape(), (2, 1));
        assert_eq!(h.get(1, 0).unwrap(), c(0.0, -1.0));
        assert_eq!(h.to_string(), "herm (matrix (1,2) [[0+0i, 0+1i]])");
        let copy = h.thaw().freeze();
        assert!(copy.is_herm());
        assert_eq!(copy, h);
    }

    #[test]
    fn test_view_freeze_keeps_transpose() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let v = MatrixView::from_col_major(&data, 2, 2).unwrap().transpose();
        let frozen = v.freeze();
        assert_eq!(frozen.element_op(), ElementOp::Transpose);
        assert_eq!(frozen.to_row_major_vec(), v.to_row_major_vec());
        assert_eq!(frozen.to_string(), "trans (matrix (2,2) [[1, 3], [2, 4]])");
    }

    #[test]
    fn test_matrix_into_thawed() {
        let a = MutMatrix::from_row_major(2, 2, [1.0, 2.0, 3.0, 4.0]);
        let ptr = a.as_slice().as_ptr();
        let frozen = a.into_frozen();
        let sub = frozen.submatrix((0, 0), (1, 1)).unwrap();
        // shared: copies
        let thawed = sub.into_thawed();
        assert_eq!(thawed.as_slice(), &[1.0]);
        let thawed = frozen.into_thawed();
        assert_eq!(thawed.as_slice().as_ptr(), ptr);
    }

    #[test]
    fn test_matrix_pure_arithmetic() {
        let a = Matrix::from_row_major(2, 2, [1.0, 2.0, 3.0, 4.0]);
        let t = a.transpose();
        assert_eq!(a.add(&t).unwrap().to_row_major_vec(), vec![2.0, 5.0, 5.0, 8.0]);
        assert_eq!(a.sub(&a).unwrap(), Matrix::zeros(2, 2));
        assert_eq!(a.mul(&a).unwrap().to_row_major_vec(), vec![1.0, 4.0, 9.0, 16.0]);
        assert_eq!(a.div(&a).unwrap(), Matrix::constant(2, 2, 1.0));
        assert_eq!(a.scale(2.0).get(1, 1).unwrap(), 8.0);
        assert_eq!(a.shift(1.0).get(0, 0).unwrap(), 2.0);
        assert!(a.add(&Matrix::<f64>::zeros(2, 3)).is_err());
        let p = a.mul_matrix(&Matrix::<f64>::identity(2, 2)).unwrap();
        assert_eq!(p.to_row_major_vec(), a.to_row_major_vec());
        let y = a.mul_vector(&Vector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(y.to_vec(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_mut_matrix_views() {
        let mut a = MutMatrix::<f64>::zeros(3, 3);
        a.diag_mut(0).unwrap().fill(1.0);
        a.row_mut(0).unwrap().set(2, 5.0).unwrap();
        a.col_mut(0).unwrap().set(2, 6.0).unwrap();
        let (_, mut right) = a.split_cols_at_mut(2).unwrap();
        right.scale_by(2.0);
        assert_eq!(
            a.to_row_major_vec(),
            vec![1.0, 0.0, 10.0, 0.0, 1.0, 0.0, 6.0, 0.0, 2.0]
        );
    }
}
