//! Matrix engine: column-major views, capability traits and multiply dispatch.
//!
//! A matrix view is a base pointer plus a [`MatLayout`]: logical shape,
//! leading dimension and an [`ElementOp`]. Transpose, conjugate and
//! Hermitian transpose only rewrite the layout; rows, columns, diagonals and
//! submatrices are views into the same storage.
//!
//! The dispatch functions [`gemv`], [`gemm`] and [`rank1_update`] check
//! shapes, fold the output's element operation into the inputs and call the
//! [`kernel`](crate::kernel) routines with plain outputs.

use crate::dense::{MutMatrix, MutVector};
use crate::element_op::ElementOp;
use crate::kernel;
use crate::scalar::Scalar;
use crate::strided::{MatLayout, Strided};
use crate::vector::{ReadVector, VectorView, VectorViewMut, WriteVector};
use crate::{check_same_len, check_same_shape, LinalgError, Result};
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// MatrixView / MatrixViewMut
// ============================================================================

/// An immutable matrix view.
#[derive(Debug)]
pub struct MatrixView<'a, T> {
    ptr: *const T,
    layout: MatLayout,
    _marker: PhantomData<&'a [T]>,
}

/// A mutable matrix view.
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    ptr: *mut T,
    layout: MatLayout,
    _marker: PhantomData<&'a mut [T]>,
}

impl<T> Clone for MatrixView<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<'_, T> {}

unsafe impl<T: Sync> Send for MatrixView<'_, T> {}
unsafe impl<T: Sync> Sync for MatrixView<'_, T> {}
unsafe impl<T: Send> Send for MatrixViewMut<'_, T> {}
unsafe impl<T: Sync> Sync for MatrixViewMut<'_, T> {}

fn check_base(buf_len: usize, base: usize) -> Result<()> {
    if base > buf_len {
        return Err(LinalgError::IndexOutOfRange {
            index: base,
            len: buf_len,
        });
    }
    Ok(())
}

impl<'a, T> MatrixView<'a, T> {
    /// View `data` as a dense column-major `rows x cols` matrix.
    pub fn from_col_major(data: &'a [T], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, 0, MatLayout::col_major(rows, cols))
    }

    /// Create a view of `data` starting at element `base`.
    ///
    /// # Errors
    /// Returns an error if the leading dimension is too small or any element
    /// lies outside `data`.
    pub fn new(data: &'a [T], base: usize, layout: MatLayout) -> Result<Self> {
        check_base(data.len(), base)?;
        layout.validate(data.len(), base)?;
        Ok(Self {
            ptr: data.as_ptr().wrapping_add(base),
            layout,
            _marker: PhantomData,
        })
    }

    /// # Safety
    /// Every element addressed by `layout` from `ptr` must stay valid for
    /// reads for `'a` and must not be mutated through another handle.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *const T, layout: MatLayout) -> Self {
        Self {
            ptr,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn layout(&self) -> MatLayout {
        self.layout
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.layout.cols()
    }

    #[inline]
    fn with(self, shift: isize, layout: MatLayout) -> Self {
        Self {
            ptr: self.ptr.wrapping_offset(shift),
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn line(self, shift: isize, layout: Strided) -> VectorView<'a, T> {
        unsafe { VectorView::from_raw_parts(self.ptr.wrapping_offset(shift), layout) }
    }

    /// The `m x n` block with top-left corner `(i, j)`.
    pub fn submatrix(self, origin: (usize, usize), shape: (usize, usize)) -> Result<Self> {
        let (shift, layout) = self.layout.submatrix(origin, shape)?;
        Ok(self.with(shift, layout))
    }

    /// # Safety
    /// The block must lie inside the matrix.
    #[inline]
    pub unsafe fn submatrix_unchecked(self, (i, j): (usize, usize), (m, n): (usize, usize)) -> Self {
        let l = self.layout;
        let layout = MatLayout::new_unchecked(m, n, l.ld(), l.op());
        self.with(l.offset_of(i, j), layout)
    }

    /// Rows `[0, k)` and `[k, rows)`.
    pub fn split_rows_at(self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let (s0, l0) = self.layout.submatrix((0, 0), (k.min(m), n))?;
        let (s1, l1) = self.layout.submatrix((k, 0), (m.saturating_sub(k), n))?;
        Ok((self.with(s0, l0), self.with(s1, l1)))
    }

    /// Columns `[0, k)` and `[k, cols)`.
    pub fn split_cols_at(self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let (s0, l0) = self.layout.submatrix((0, 0), (m, k.min(n)))?;
        let (s1, l1) = self.layout.submatrix((0, k), (m, n.saturating_sub(k)))?;
        Ok((self.with(s0, l0), self.with(s1, l1)))
    }

    pub fn row(self, i: usize) -> Result<VectorView<'a, T>> {
        if i >= self.nrows() {
            return Err(LinalgError::IndexOutOfRange {
                index: i,
                len: self.nrows(),
            });
        }
        let (shift, layout) = self.layout.row(i);
        Ok(self.line(shift, layout))
    }

    pub fn col(self, j: usize) -> Result<VectorView<'a, T>> {
        if j >= self.ncols() {
            return Err(LinalgError::IndexOutOfRange {
                index: j,
                len: self.ncols(),
            });
        }
        let (shift, layout) = self.layout.col(j);
        Ok(self.line(shift, layout))
    }

    /// # Safety
    /// `i < self.nrows()`.
    #[inline]
    pub unsafe fn row_unchecked(self, i: usize) -> VectorView<'a, T> {
        let (shift, layout) = self.layout.row(i);
        self.line(shift, layout)
    }

    /// # Safety
    /// `j < self.ncols()`.
    #[inline]
    pub unsafe fn col_unchecked(self, j: usize) -> VectorView<'a, T> {
        let (shift, layout) = self.layout.col(j);
        self.line(shift, layout)
    }

    /// Diagonal at signed offset `k` (`k > 0` above the main diagonal).
    pub fn diag(self, k: isize) -> Result<VectorView<'a, T>> {
        let (shift, layout) = self.layout.diag(k)?;
        Ok(self.line(shift, layout))
    }

    pub fn rows(self) -> Lines<'a, T> {
        Lines::new(self, true)
    }

    pub fn cols(self) -> Lines<'a, T> {
        Lines::new(self, false)
    }

    #[inline]
    pub fn transpose(self) -> Self {
        let layout = self.layout.transpose();
        self.with(0, layout)
    }

    #[inline]
    pub fn conj(self) -> Self {
        let layout = self.layout.conj();
        self.with(0, layout)
    }

    /// Hermitian (conjugate) transpose.
    #[inline]
    pub fn herm(self) -> Self {
        let layout = self.layout.herm();
        self.with(0, layout)
    }

    /// Reinterpret the view as mutable without copying.
    ///
    /// # Safety
    /// The caller must guarantee exclusive access to every addressed element
    /// for `'a`.
    #[inline]
    pub unsafe fn as_mut_unchecked(self) -> MatrixViewMut<'a, T> {
        MatrixViewMut::from_raw_parts(self.ptr as *mut T, self.layout)
    }
}

impl<'a, T: Scalar> MatrixView<'a, T> {
    /// Stored value at logical `(i, j)`, before the element operation.
    #[inline(always)]
    pub(crate) unsafe fn raw(&self, i: usize, j: usize) -> T {
        *self.ptr.offset(self.layout.offset_of(i, j))
    }

    #[inline(always)]
    pub(crate) unsafe fn read(&self, i: usize, j: usize) -> T {
        self.layout.op().apply(self.raw(i, j))
    }
}

impl<'a, T> MatrixViewMut<'a, T> {
    /// View `data` as a dense column-major `rows x cols` matrix.
    pub fn from_col_major(data: &'a mut [T], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, 0, MatLayout::col_major(rows, cols))
    }

    pub fn new(data: &'a mut [T], base: usize, layout: MatLayout) -> Result<Self> {
        check_base(data.len(), base)?;
        layout.validate(data.len(), base)?;
        Ok(Self {
            ptr: data.as_mut_ptr().wrapping_add(base),
            layout,
            _marker: PhantomData,
        })
    }

    /// # Safety
    /// Every element addressed by `layout` from `ptr` must stay valid for
    /// reads and writes for `'a` with no other handle accessing them.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut T, layout: MatLayout) -> Self {
        Self {
            ptr,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn layout(&self) -> MatLayout {
        self.layout
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.layout.cols()
    }

    #[inline]
    fn with(self, shift: isize, layout: MatLayout) -> Self {
        Self {
            ptr: self.ptr.wrapping_offset(shift),
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn line(self, shift: isize, layout: Strided) -> VectorViewMut<'a, T> {
        unsafe { VectorViewMut::from_raw_parts(self.ptr.wrapping_offset(shift), layout) }
    }

    #[inline]
    pub fn rb(&self) -> MatrixView<'_, T> {
        unsafe { MatrixView::from_raw_parts(self.ptr, self.layout) }
    }

    #[inline]
    pub fn rb_mut(&mut self) -> MatrixViewMut<'_, T> {
        unsafe { MatrixViewMut::from_raw_parts(self.ptr, self.layout) }
    }

    /// Give up mutable access and keep reading the same memory.
    #[inline]
    pub fn into_const(self) -> MatrixView<'a, T> {
        unsafe { MatrixView::from_raw_parts(self.ptr, self.layout) }
    }

    pub fn submatrix_mut(self, origin: (usize, usize), shape: (usize, usize)) -> Result<Self> {
        let (shift, layout) = self.layout.submatrix(origin, shape)?;
        Ok(self.with(shift, layout))
    }

    /// # Safety
    /// The block must lie inside the matrix.
    #[inline]
    pub unsafe fn submatrix_mut_unchecked(self, (i, j): (usize, usize), (m, n): (usize, usize)) -> Self {
        let l = self.layout;
        let layout = MatLayout::new_unchecked(m, n, l.ld(), l.op());
        self.with(l.offset_of(i, j), layout)
    }

    /// Two disjoint mutable views over rows `[0, k)` and `[k, rows)`.
    pub fn split_rows_at_mut(self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let (s0, l0) = self.layout.submatrix((0, 0), (k.min(m), n))?;
        let (s1, l1) = self.layout.submatrix((k, 0), (m.saturating_sub(k), n))?;
        let ptr = self.ptr;
        Ok(unsafe {
            (
                Self::from_raw_parts(ptr.wrapping_offset(s0), l0),
                Self::from_raw_parts(ptr.wrapping_offset(s1), l1),
            )
        })
    }

    /// Two disjoint mutable views over columns `[0, k)` and `[k, cols)`.
    pub fn split_cols_at_mut(self, k: usize) -> Result<(Self, Self)> {
        let (m, n) = self.layout.shape();
        let (s0, l0) = self.layout.submatrix((0, 0), (m, k.min(n)))?;
        let (s1, l1) = self.layout.submatrix((0, k), (m, n.saturating_sub(k)))?;
        let ptr = self.ptr;
        Ok(unsafe {
            (
                Self::from_raw_parts(ptr.wrapping_offset(s0), l0),
                Self::from_raw_parts(ptr.wrapping_offset(s1), l1),
            )
        })
    }

    pub fn row_mut(self, i: usize) -> Result<VectorViewMut<'a, T>> {
        if i >= self.nrows() {
            return Err(LinalgError::IndexOutOfRange {
                index: i,
                len: self.nrows(),
            });
        }
        let (shift, layout) = self.layout.row(i);
        Ok(self.line(shift, layout))
    }

    pub fn col_mut(self, j: usize) -> Result<VectorViewMut<'a, T>> {
        if j >= self.ncols() {
            return Err(LinalgError::IndexOutOfRange {
                index: j,
                len: self.ncols(),
            });
        }
        let (shift, layout) = self.layout.col(j);
        Ok(self.line(shift, layout))
    }

    /// # Safety
    /// `i < self.nrows()`.
    #[inline]
    pub unsafe fn row_mut_unchecked(self, i: usize) -> VectorViewMut<'a, T> {
        let (shift, layout) = self.layout.row(i);
        self.line(shift, layout)
    }

    /// # Safety
    /// `j < self.ncols()`.
    #[inline]
    pub unsafe fn col_mut_unchecked(self, j: usize) -> VectorViewMut<'a, T> {
        let (shift, layout) = self.layout.col(j);
        self.line(shift, layout)
    }

    pub fn diag_mut(self, k: isize) -> Result<VectorViewMut<'a, T>> {
        let (shift, layout) = self.layout.diag(k)?;
        Ok(self.line(shift, layout))
    }

    #[inline]
    pub fn transpose(self) -> Self {
        let layout = self.layout.transpose();
        self.with(0, layout)
    }

    #[inline]
    pub fn conj(self) -> Self {
        let layout = self.layout.conj();
        self.with(0, layout)
    }

    #[inline]
    pub fn herm(self) -> Self {
        let layout = self.layout.herm();
        self.with(0, layout)
    }
}

/// Iterator over the rows or columns of a matrix view.
#[derive(Debug, Clone)]
pub struct Lines<'a, T> {
    mat: MatrixView<'a, T>,
    by_rows: bool,
    front: usize,
    back: usize,
}

impl<'a, T> Lines<'a, T> {
    fn new(mat: MatrixView<'a, T>, by_rows: bool) -> Self {
        let back = if by_rows { mat.nrows() } else { mat.ncols() };
        Self {
            mat,
            by_rows,
            front: 0,
            back,
        }
    }

    #[inline]
    fn at(&self, k: usize) -> VectorView<'a, T> {
        unsafe {
            if self.by_rows {
                self.mat.row_unchecked(k)
            } else {
                self.mat.col_unchecked(k)
            }
        }
    }
}

impl<'a, T> Iterator for Lines<'a, T> {
    type Item = VectorView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let v = self.at(self.front);
        self.front += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T> DoubleEndedIterator for Lines<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.at(self.back))
    }
}

impl<T> ExactSizeIterator for Lines<'_, T> {}

// ============================================================================
// Capability traits
// ============================================================================

/// Read-only matrix operations.
pub trait ReadMatrix<T: Scalar> {
    fn mat_view(&self) -> MatrixView<'_, T>;

    /// `(rows, cols)`.
    #[inline]
    fn shape(&self) -> (usize, usize) {
        self.mat_view().layout().shape()
    }

    #[inline]
    fn ld(&self) -> usize {
        self.mat_view().layout().ld()
    }

    #[inline]
    fn op(&self) -> ElementOp {
        self.mat_view().layout().op()
    }

    /// Whether this is a Hermitian-transpose view of its storage.
    #[inline]
    fn is_herm(&self) -> bool {
        self.op() == ElementOp::Adjoint
    }

    fn get(&self, i: usize, j: usize) -> Result<T> {
        let a = self.mat_view();
        a.layout().check_index(i, j)?;
        Ok(unsafe { a.read(i, j) })
    }

    /// # Safety
    /// `(i, j)` must be inside the shape.
    #[inline]
    unsafe fn get_unchecked(&self, i: usize, j: usize) -> T {
        self.mat_view().read(i, j)
    }

    /// Logical elements in row-major order.
    fn to_row_major_vec(&self) -> Vec<T> {
        let a = self.mat_view();
        let (m, n) = a.layout().shape();
        let mut out = Vec::with_capacity(m * n);
        for i in 0..m {
            for j in 0..n {
                out.push(unsafe { a.read(i, j) });
            }
        }
        out
    }

    /// `self * x` into a new vector.
    fn mul_vector<V: ReadVector<T> + ?Sized>(&self, x: &V) -> Result<MutVector<T>> {
        let mut y = MutVector::zeros(self.shape().0);
        gemv(T::one(), self, x, T::zero(), &mut y)?;
        Ok(y)
    }

    /// `self * b` into a new matrix.
    fn mul_matrix<M: ReadMatrix<T> + ?Sized>(&self, b: &M) -> Result<MutMatrix<T>> {
        let mut c = MutMatrix::zeros(self.shape().0, b.shape().1);
        gemm(T::one(), self, b, T::zero(), &mut c)?;
        Ok(c)
    }
}

/// In-place matrix operations.
///
/// Binary operations check shapes first; a failed call leaves `self`
/// unchanged.
pub trait WriteMatrix<T: Scalar>: ReadMatrix<T> {
    fn mat_view_mut(&mut self) -> MatrixViewMut<'_, T>;

    fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        self.mat_view().layout().check_index(i, j)?;
        unsafe { self.set_unchecked(i, j, value) };
        Ok(())
    }

    /// # Safety
    /// `(i, j)` must be inside the shape.
    unsafe fn set_unchecked(&mut self, i: usize, j: usize, value: T) {
        let mut a = self.mat_view_mut();
        let layout = a.layout();
        *a.as_mut_ptr().offset(layout.offset_of(i, j)) = layout.op().apply(value);
    }

    fn fill(&mut self, value: T) {
        for_each_line(self.mat_view_mut(), |mut v| v.fill(value));
    }

    /// Ones on the main diagonal, zeros elsewhere.
    fn set_identity(&mut self) {
        self.fill(T::zero());
        if let Ok(mut d) = self.mat_view_mut().diag_mut(0) {
            d.fill(T::one());
        }
    }

    fn scale_by(&mut self, k: T) {
        for_each_line(self.mat_view_mut(), |mut v| v.scale_by(k));
    }

    fn shift_by(&mut self, k: T) {
        for_each_line(self.mat_view_mut(), |mut v| v.shift_by(k));
    }

    fn copy_from<M: ReadMatrix<T> + ?Sized>(&mut self, src: &M) -> Result<()> {
        zip_lines(self.mat_view_mut(), src.mat_view(), |mut d, s| d.copy_from(&s))
    }

    fn add_assign<M: ReadMatrix<T> + ?Sized>(&mut self, other: &M) -> Result<()> {
        zip_lines(self.mat_view_mut(), other.mat_view(), |mut d, s| d.add_assign(&s))
    }

    fn sub_assign<M: ReadMatrix<T> + ?Sized>(&mut self, other: &M) -> Result<()> {
        zip_lines(self.mat_view_mut(), other.mat_view(), |mut d, s| d.sub_assign(&s))
    }

    /// Elementwise product.
    fn mul_assign<M: ReadMatrix<T> + ?Sized>(&mut self, other: &M) -> Result<()> {
        zip_lines(self.mat_view_mut(), other.mat_view(), |mut d, s| d.mul_assign(&s))
    }

    /// Elementwise quotient.
    fn div_assign<M: ReadMatrix<T> + ?Sized>(&mut self, other: &M) -> Result<()> {
        zip_lines(self.mat_view_mut(), other.mat_view(), |mut d, s| d.div_assign(&s))
    }

    /// Scale row `i` by `v[i]`.
    fn scale_rows<V: ReadVector<T> + ?Sized>(&mut self, v: &V) -> Result<()> {
        let v = v.view();
        let mut a = self.mat_view_mut();
        check_same_len(a.nrows(), v.len())?;
        for (i, k) in v.iter().enumerate() {
            unsafe { a.rb_mut().row_mut_unchecked(i) }.scale_by(k);
        }
        Ok(())
    }

    /// Scale column `j` by `v[j]`.
    fn scale_cols<V: ReadVector<T> + ?Sized>(&mut self, v: &V) -> Result<()> {
        let v = v.view();
        let mut a = self.mat_view_mut();
        check_same_len(a.ncols(), v.len())?;
        for (j, k) in v.iter().enumerate() {
            unsafe { a.rb_mut().col_mut_unchecked(j) }.scale_by(k);
        }
        Ok(())
    }

    /// `self ← alpha * a * b + beta * self`
    fn gemm<A, B>(&mut self, alpha: T, a: &A, b: &B, beta: T) -> Result<()>
    where
        A: ReadMatrix<T> + ?Sized,
        B: ReadMatrix<T> + ?Sized,
    {
        gemm(alpha, a, b, beta, self)
    }

    /// `self ← alpha * x * y^H + self`
    fn rank1_update<X, Y>(&mut self, alpha: T, x: &X, y: &Y) -> Result<()>
    where
        X: ReadVector<T> + ?Sized,
        Y: ReadVector<T> + ?Sized,
    {
        rank1_update(alpha, x, y, self)
    }
}

impl<T: Scalar> ReadMatrix<T> for MatrixView<'_, T> {
    #[inline]
    fn mat_view(&self) -> MatrixView<'_, T> {
        *self
    }
}

impl<T: Scalar> ReadMatrix<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn mat_view(&self) -> MatrixView<'_, T> {
        self.rb()
    }
}

impl<T: Scalar> WriteMatrix<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn mat_view_mut(&mut self) -> MatrixViewMut<'_, T> {
        self.rb_mut()
    }
}

impl<T: Scalar, M: ReadMatrix<T> + ?Sized> ReadMatrix<T> for &M {
    #[inline]
    fn mat_view(&self) -> MatrixView<'_, T> {
        (**self).mat_view()
    }
}

/// Run `f` on every storage-contiguous line of `a`.
fn for_each_line<T: Scalar>(mut a: MatrixViewMut<'_, T>, mut f: impl FnMut(VectorViewMut<'_, T>)) {
    let by_rows = a.layout().op().is_transposed();
    let count = if by_rows { a.nrows() } else { a.ncols() };
    for k in 0..count {
        let line = a.rb_mut();
        f(unsafe {
            if by_rows {
                line.row_mut_unchecked(k)
            } else {
                line.col_mut_unchecked(k)
            }
        });
    }
}

/// Pair up matching lines of `dst` and `src` after a shape check.
fn zip_lines<T: Scalar>(
    mut dst: MatrixViewMut<'_, T>,
    src: MatrixView<'_, T>,
    mut f: impl FnMut(VectorViewMut<'_, T>, VectorView<'_, T>) -> Result<()>,
) -> Result<()> {
    check_same_shape(dst.layout().shape(), src.layout().shape())?;
    let by_rows = dst.layout().op().is_transposed();
    let count = if by_rows { dst.nrows() } else { dst.ncols() };
    for k in 0..count {
        let line = dst.rb_mut();
        unsafe {
            if by_rows {
                f(line.row_mut_unchecked(k), src.row_unchecked(k))?;
            } else {
                f(line.col_mut_unchecked(k), src.col_unchecked(k))?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// Dispatch
// ============================================================================

/// `y ← alpha * a * x + beta * y`
///
/// # Errors
/// `ShapeMismatch` unless `a` is `y.dim() x x.dim()`.
pub fn gemv<T, A, X, Y>(alpha: T, a: &A, x: &X, beta: T, y: &mut Y) -> Result<()>
where
    T: Scalar,
    A: ReadMatrix<T> + ?Sized,
    X: ReadVector<T> + ?Sized,
    Y: WriteVector<T> + ?Sized,
{
    gemv_impl(alpha, a.mat_view(), x.view(), beta, y.view_mut())
}

fn gemv_impl<T: Scalar>(
    alpha: T,
    a: MatrixView<'_, T>,
    x: VectorView<'_, T>,
    beta: T,
    mut y: VectorViewMut<'_, T>,
) -> Result<()> {
    let (m, n) = a.layout().shape();
    if n != x.len() || m != y.len() {
        return Err(LinalgError::ShapeMismatch(vec![m, n], vec![y.len(), x.len()]));
    }
    let mut op = a.layout().op();
    let mut conjx = x.is_conj();
    let (mut alpha, mut beta) = (alpha, beta);
    if y.is_conj() {
        alpha = alpha.conj();
        beta = beta.conj();
        op = op.conj();
        conjx = !conjx;
    }
    let (ld, incy) = (a.layout().ld(), y.stride());
    unsafe {
        kernel::gemv(
            m,
            n,
            alpha,
            a.as_ptr(),
            ld,
            op,
            x.as_ptr(),
            x.stride(),
            conjx,
            beta,
            y.as_mut_ptr(),
            incy,
        )
    };
    Ok(())
}

/// `c ← alpha * a * b + beta * c`
///
/// # Errors
/// `ShapeMismatch` unless the inner dimensions agree and `c` is
/// `a.rows x b.cols`.
pub fn gemm<T, A, B, C>(alpha: T, a: &A, b: &B, beta: T, c: &mut C) -> Result<()>
where
    T: Scalar,
    A: ReadMatrix<T> + ?Sized,
    B: ReadMatrix<T> + ?Sized,
    C: WriteMatrix<T> + ?Sized,
{
    gemm_impl(alpha, a.mat_view(), b.mat_view(), beta, c.mat_view_mut())
}

fn gemm_impl<T: Scalar>(
    alpha: T,
    a: MatrixView<'_, T>,
    b: MatrixView<'_, T>,
    beta: T,
    mut c: MatrixViewMut<'_, T>,
) -> Result<()> {
    let (m, k) = a.layout().shape();
    let (kb, n) = b.layout().shape();
    if k != kb || c.layout().shape() != (m, n) {
        let (cm, cn) = c.layout().shape();
        return Err(LinalgError::ShapeMismatch(vec![m, k, kb, n], vec![cm, cn]));
    }
    let (mut al, mut bl, mut cl) = (a.layout(), b.layout(), c.layout());
    let (mut pa, mut pb) = (a.as_ptr(), b.as_ptr());
    let (mut alpha, mut beta) = (alpha, beta);
    if cl.op().is_conj() {
        alpha = alpha.conj();
        beta = beta.conj();
        al = al.conj();
        bl = bl.conj();
        cl = cl.conj();
    }
    if cl.op().is_transposed() {
        // C^T = B^T A^T
        (al, bl) = (bl.transpose(), al.transpose());
        (pa, pb) = (pb, pa);
        cl = cl.transpose();
    }
    unsafe {
        kernel::gemm(
            cl.rows(),
            cl.cols(),
            al.cols(),
            alpha,
            pa,
            al.ld(),
            al.op(),
            pb,
            bl.ld(),
            bl.op(),
            beta,
            c.as_mut_ptr(),
            cl.ld(),
        )
    };
    Ok(())
}

/// `a ← alpha * x * y^H + a`
///
/// # Errors
/// `ShapeMismatch` unless `a` is `x.dim() x y.dim()`.
pub fn rank1_update<T, X, Y, A>(alpha: T, x: &X, y: &Y, a: &mut A) -> Result<()>
where
    T: Scalar,
    X: ReadVector<T> + ?Sized,
    Y: ReadVector<T> + ?Sized,
    A: WriteMatrix<T> + ?Sized,
{
    let (x, y) = (x.view(), y.view());
    let mut a = a.mat_view_mut();
    let layout = a.layout();
    let (m, n) = layout.shape();
    if x.len() != m || y.len() != n {
        return Err(LinalgError::ShapeMismatch(vec![m, n], vec![x.len(), y.len()]));
    }
    let (mut fx, mut fy) = (x.is_conj(), !y.is_conj());
    let mut alpha = alpha;
    if layout.op().is_conj() {
        alpha = alpha.conj();
        fx = !fx;
        fy = !fy;
    }
    let pa = a.as_mut_ptr();
    unsafe {
        if layout.op().is_transposed() {
            kernel::ger(n, m, alpha, y.as_ptr(), y.stride(), fy, x.as_ptr(), x.stride(), fx, pa, layout.ld());
        } else {
            kernel::ger(m, n, alpha, x.as_ptr(), x.stride(), fx, y.as_ptr(), y.stride(), fy, pa, layout.ld());
        }
    }
    Ok(())
}

// ============================================================================
// Equality and display
// ============================================================================

pub(crate) fn mat_views_equal<T: Scalar>(a: MatrixView<'_, T>, b: MatrixView<'_, T>) -> bool {
    let shape = a.layout().shape();
    if shape != b.layout().shape() {
        return false;
    }
    (0..shape.1).all(|j| (0..shape.0).all(|i| unsafe { a.read(i, j) == b.read(i, j) }))
}

impl<'b, T: Scalar> PartialEq<MatrixView<'b, T>> for MatrixView<'_, T> {
    fn eq(&self, other: &MatrixView<'b, T>) -> bool {
        mat_views_equal(*self, *other)
    }
}

/// Renders `matrix (m,n) [[row], ...]` over the storage; a non-identity
/// element operation wraps it in `trans (...)`, `herm (...)` or `conj (...)`.
pub(crate) fn fmt_matrix<T: Scalar>(a: MatrixView<'_, T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let layout = a.layout();
    let tag = match layout.op() {
        ElementOp::Identity => None,
        ElementOp::Conj => Some("conj"),
        ElementOp::Transpose => Some("trans"),
        ElementOp::Adjoint => Some("herm"),
    };
    let storage = if layout.op().is_transposed() {
        a.transpose()
    } else {
        a
    };
    let (m, n) = storage.layout().shape();
    if let Some(tag) = tag {
        write!(f, "{tag} (")?;
    }
    write!(f, "matrix ({m},{n}) [")?;
    for i in 0..m {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "[")?;
        for j in 0..n {
            if j > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", unsafe { storage.raw(i, j) })?;
        }
        write!(f, "]")?;
    }
    write!(f, "]")?;
    if tag.is_some() {
        write!(f, ")")?;
    }
    Ok(())
}

impl<T: Scalar> fmt::Display for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(*self, f)
    }
}

impl<T: Scalar> fmt::Display for MatrixViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(self.rb(), f)
    }
}
