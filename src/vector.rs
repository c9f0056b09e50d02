//! Vector engine: borrowed strided views and the read/write capability traits.
//!
//! [`VectorView`] and [`VectorViewMut`] are a base pointer plus a
//! [`Strided`] descriptor. Every other vector type (owned or borrowed from a
//! matrix) hands out one of these through [`ReadVector::view`] /
//! [`WriteVector::view_mut`], and all arithmetic is written once against the
//! views.
//!
//! A conjugated view never rewrites memory: reads conjugate on the fly and
//! writes store `conj(v)` so the value reads back as `v`. Binary operations
//! fold the two flags into the kernel call (`dotc`/`dotu`, `axpy`/`acxpy`).

use crate::kernel;
use crate::scalar::Scalar;
use crate::strided::Strided;
use crate::{check_same_len, LinalgError, Result};
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// VectorView
// ============================================================================

/// An immutable strided vector view.
#[derive(Debug)]
pub struct VectorView<'a, T> {
    ptr: *const T,
    layout: Strided,
    _marker: PhantomData<&'a [T]>,
}

/// A mutable strided vector view.
///
/// Two mutable views never overlap unless one was obtained through an
/// `unsafe` constructor.
#[derive(Debug)]
pub struct VectorViewMut<'a, T> {
    ptr: *mut T,
    layout: Strided,
    _marker: PhantomData<&'a mut [T]>,
}

impl<T> Clone for VectorView<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorView<'_, T> {}

unsafe impl<T: Sync> Send for VectorView<'_, T> {}
unsafe impl<T: Sync> Sync for VectorView<'_, T> {}
unsafe impl<T: Send> Send for VectorViewMut<'_, T> {}
unsafe impl<T: Sync> Sync for VectorViewMut<'_, T> {}

fn check_base(buf_len: usize, base: usize) -> Result<()> {
    if base > buf_len {
        return Err(LinalgError::IndexOutOfRange {
            index: base,
            len: buf_len,
        });
    }
    Ok(())
}

impl<'a, T> VectorView<'a, T> {
    /// View a slice as a contiguous vector.
    #[inline]
    pub fn from_slice(data: &'a [T]) -> Self {
        Self {
            ptr: data.as_ptr(),
            layout: Strided::contiguous(data.len()),
            _marker: PhantomData,
        }
    }

    /// Create a view of `data` starting at element `base`.
    ///
    /// # Errors
    /// Returns an error if any element of the view lies outside `data`.
    pub fn new(data: &'a [T], base: usize, layout: Strided) -> Result<Self> {
        check_base(data.len(), base)?;
        layout.validate(data.len(), base)?;
        Ok(Self {
            ptr: data.as_ptr().wrapping_add(base),
            layout,
            _marker: PhantomData,
        })
    }

    /// Create a view from a raw pointer.
    ///
    /// # Safety
    /// Every element addressed by `layout` from `ptr` must stay valid for
    /// reads for `'a` and must not be mutated through another handle.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *const T, layout: Strided) -> Self {
        Self {
            ptr,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    #[inline]
    pub fn stride(&self) -> isize {
        self.layout.stride()
    }

    #[inline]
    pub fn is_conj(&self) -> bool {
        self.layout.is_conj()
    }

    #[inline]
    pub fn layout(&self) -> Strided {
        self.layout
    }

    /// Pointer to logical element 0.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    #[inline]
    fn shifted(self, shift: isize, layout: Strided) -> Self {
        Self {
            ptr: self.ptr.wrapping_offset(shift),
            layout,
            _marker: PhantomData,
        }
    }

    /// Elements `offset .. offset + len`.
    pub fn subvector(self, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange(offset, len)?;
        Ok(self.shifted(shift, layout))
    }

    /// Elements `offset .. offset + len` without bounds checks.
    ///
    /// # Safety
    /// `offset + len <= self.len()`.
    #[inline]
    pub unsafe fn subvector_unchecked(self, offset: usize, len: usize) -> Self {
        let layout = Strided::new_unchecked(len, self.stride(), self.is_conj());
        self.shifted(self.layout.offset_of(offset), layout)
    }

    /// Elements `offset, offset + step, ...`, `len` of them.
    pub fn subvector_with_stride(self, step: isize, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange_with_stride(step, offset, len)?;
        Ok(self.shifted(shift, layout))
    }

    /// Conjugated view. Applying it twice gives back the original view.
    #[inline]
    pub fn conj(self) -> Self {
        let layout = self.layout.with_conj();
        self.shifted(0, layout)
    }

    /// The same elements in reverse order.
    #[inline]
    pub fn reversed(self) -> Self {
        let (shift, layout) = self.layout.reversed();
        self.shifted(shift, layout)
    }

    /// Split into `[0, k)` and `[k, len)`.
    pub fn split_at(self, k: usize) -> Result<(Self, Self)> {
        let ((s0, l0), (s1, l1)) = self.layout.split_at(k)?;
        Ok((self.shifted(s0, l0), self.shifted(s1, l1)))
    }

    /// Reinterpret the view as mutable without copying.
    ///
    /// # Safety
    /// The caller must guarantee exclusive access to every addressed element
    /// for `'a`: no other view may read or write them meanwhile.
    #[inline]
    pub unsafe fn as_mut_unchecked(self) -> VectorViewMut<'a, T> {
        VectorViewMut::from_raw_parts(self.ptr as *mut T, self.layout)
    }
}

impl<'a, T: Scalar> VectorView<'a, T> {
    /// Stored value at `i`, ignoring the conjugate flag.
    #[inline(always)]
    pub(crate) unsafe fn raw(&self, i: usize) -> T {
        *self.ptr.offset(self.layout.offset_of(i))
    }

    /// Logical value at `i`.
    #[inline(always)]
    pub(crate) unsafe fn read(&self, i: usize) -> T {
        let v = self.raw(i);
        if self.is_conj() {
            v.conj()
        } else {
            v
        }
    }
}

impl<'a, T: Scalar> IntoIterator for VectorView<'a, T> {
    type Item = T;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        VectorIter {
            back: self.len(),
            front: 0,
            view: self,
        }
    }
}

// ============================================================================
// VectorViewMut
// ============================================================================

impl<'a, T> VectorViewMut<'a, T> {
    /// View a mutable slice as a contiguous vector.
    #[inline]
    pub fn from_slice(data: &'a mut [T]) -> Self {
        Self {
            ptr: data.as_mut_ptr(),
            layout: Strided::contiguous(data.len()),
            _marker: PhantomData,
        }
    }

    /// Create a mutable view of `data` starting at element `base`.
    ///
    /// # Errors
    /// Returns an error if any element of the view lies outside `data`.
    pub fn new(data: &'a mut [T], base: usize, layout: Strided) -> Result<Self> {
        check_base(data.len(), base)?;
        layout.validate(data.len(), base)?;
        Ok(Self {
            ptr: data.as_mut_ptr().wrapping_add(base),
            layout,
            _marker: PhantomData,
        })
    }

    /// Create a mutable view from a raw pointer.
    ///
    /// # Safety
    /// Every element addressed by `layout` from `ptr` must stay valid for
    /// reads and writes for `'a`, and no other handle may access them
    /// meanwhile. A negative or repeated stride must not make two logical
    /// indices address the same element.
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut T, layout: Strided) -> Self {
        Self {
            ptr,
            layout,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    #[inline]
    pub fn stride(&self) -> isize {
        self.layout.stride()
    }

    #[inline]
    pub fn is_conj(&self) -> bool {
        self.layout.is_conj()
    }

    #[inline]
    pub fn layout(&self) -> Strided {
        self.layout
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr
    }

    #[inline]
    fn shifted(self, shift: isize, layout: Strided) -> Self {
        Self {
            ptr: self.ptr.wrapping_offset(shift),
            layout,
            _marker: PhantomData,
        }
    }

    /// Shared reborrow.
    #[inline]
    pub fn rb(&self) -> VectorView<'_, T> {
        unsafe { VectorView::from_raw_parts(self.ptr, self.layout) }
    }

    /// Mutable reborrow.
    #[inline]
    pub fn rb_mut(&mut self) -> VectorViewMut<'_, T> {
        unsafe { VectorViewMut::from_raw_parts(self.ptr, self.layout) }
    }

    /// Give up mutable access and keep reading the same memory.
    #[inline]
    pub fn into_const(self) -> VectorView<'a, T> {
        unsafe { VectorView::from_raw_parts(self.ptr, self.layout) }
    }

    pub fn subvector_mut(self, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange(offset, len)?;
        Ok(self.shifted(shift, layout))
    }

    /// # Safety
    /// `offset + len <= self.len()`.
    #[inline]
    pub unsafe fn subvector_mut_unchecked(self, offset: usize, len: usize) -> Self {
        let layout = Strided::new_unchecked(len, self.stride(), self.is_conj());
        let shift = self.layout.offset_of(offset);
        self.shifted(shift, layout)
    }

    pub fn subvector_with_stride_mut(self, step: isize, offset: usize, len: usize) -> Result<Self> {
        let (shift, layout) = self.layout.subrange_with_stride(step, offset, len)?;
        Ok(self.shifted(shift, layout))
    }

    #[inline]
    pub fn conj(self) -> Self {
        let layout = self.layout.with_conj();
        self.shifted(0, layout)
    }

    #[inline]
    pub fn reversed(self) -> Self {
        let (shift, layout) = self.layout.reversed();
        self.shifted(shift, layout)
    }

    /// Split into two disjoint mutable views `[0, k)` and `[k, len)`.
    pub fn split_at_mut(self, k: usize) -> Result<(Self, Self)> {
        let ((s0, l0), (s1, l1)) = self.layout.split_at(k)?;
        let ptr = self.ptr;
        Ok((
            unsafe { Self::from_raw_parts(ptr.wrapping_offset(s0), l0) },
            unsafe { Self::from_raw_parts(ptr.wrapping_offset(s1), l1) },
        ))
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// Read-only vector operations.
///
/// Implementors only provide [`view`](ReadVector::view); everything else is
/// derived from it.
pub trait ReadVector<T: Scalar> {
    fn view(&self) -> VectorView<'_, T>;

    /// Number of elements.
    #[inline]
    fn dim(&self) -> usize {
        self.view().len()
    }

    #[inline]
    fn is_conj(&self) -> bool {
        self.view().is_conj()
    }

    /// Checked read of logical element `i`.
    fn get(&self, i: usize) -> Result<T> {
        let v = self.view();
        v.layout().check_index(i)?;
        Ok(unsafe { v.read(i) })
    }

    /// # Safety
    /// `i < self.dim()`.
    #[inline]
    unsafe fn get_unchecked(&self, i: usize) -> T {
        self.view().read(i)
    }

    fn iter(&self) -> VectorIter<'_, T> {
        self.view().into_iter()
    }

    fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    fn sum(&self) -> T {
        self.iter().fold(T::zero(), |acc, v| acc + v)
    }

    /// `sum |re| + |im|`.
    fn sum_abs(&self) -> T::Real {
        let v = self.view();
        unsafe { kernel::asum(v.len(), v.as_ptr(), v.stride()) }
    }

    /// Euclidean norm.
    fn norm2(&self) -> T::Real {
        let v = self.view();
        unsafe { kernel::nrm2(v.len(), v.as_ptr(), v.stride()) }
    }

    /// Index and value of the element with the largest `|re| + |im|`.
    ///
    /// Ties resolve to the smallest index. The result for vectors holding
    /// NaN is unspecified.
    fn which_max_abs(&self) -> Result<(usize, T)> {
        let v = self.view();
        if v.is_empty() {
            return Err(LinalgError::EmptyVector);
        }
        let i = unsafe { kernel::iamax(v.len(), v.as_ptr(), v.stride()) };
        Ok((i, unsafe { v.read(i) }))
    }

    /// Inner product `self^H * other`, conjugate-linear in `self`.
    fn dot<V: ReadVector<T> + ?Sized>(&self, other: &V) -> Result<T> {
        let x = self.view();
        let y = other.view();
        check_same_len(x.len(), y.len())?;
        let (n, px, ix, py, iy) = (x.len(), x.as_ptr(), x.stride(), y.as_ptr(), y.stride());
        Ok(unsafe {
            match (x.is_conj(), y.is_conj()) {
                (false, false) => kernel::dotc(n, px, ix, py, iy),
                (true, false) => kernel::dotu(n, px, ix, py, iy),
                (false, true) => kernel::dotu(n, px, ix, py, iy).conj(),
                (true, true) => kernel::dotc(n, px, ix, py, iy).conj(),
            }
        })
    }

    /// Bilinear product `sum self_i * other_i`.
    fn dotu<V: ReadVector<T> + ?Sized>(&self, other: &V) -> Result<T> {
        let x = self.view();
        let y = other.view();
        check_same_len(x.len(), y.len())?;
        let (n, px, ix, py, iy) = (x.len(), x.as_ptr(), x.stride(), y.as_ptr(), y.stride());
        Ok(unsafe {
            match (x.is_conj(), y.is_conj()) {
                (false, false) => kernel::dotu(n, px, ix, py, iy),
                (true, false) => kernel::dotc(n, px, ix, py, iy),
                (false, true) => kernel::dotc(n, py, iy, px, ix),
                (true, true) => kernel::dotu(n, px, ix, py, iy).conj(),
            }
        })
    }
}

/// In-place vector operations.
///
/// Binary operations check lengths before touching memory, so a failed call
/// leaves `self` unchanged.
pub trait WriteVector<T: Scalar>: ReadVector<T> {
    fn view_mut(&mut self) -> VectorViewMut<'_, T>;

    /// Checked write of logical element `i`.
    fn set(&mut self, i: usize, value: T) -> Result<()> {
        self.view().layout().check_index(i)?;
        unsafe { self.set_unchecked(i, value) };
        Ok(())
    }

    /// # Safety
    /// `i < self.dim()`.
    unsafe fn set_unchecked(&mut self, i: usize, value: T) {
        let mut v = self.view_mut();
        let stored = if v.is_conj() { value.conj() } else { value };
        let offset = v.layout().offset_of(i);
        *v.as_mut_ptr().offset(offset) = stored;
    }

    fn fill(&mut self, value: T) {
        let mut v = self.view_mut();
        let stored = if v.is_conj() { value.conj() } else { value };
        let (n, inc) = (v.len(), v.stride());
        let p = v.as_mut_ptr();
        for i in 0..n {
            unsafe { *p.offset(i as isize * inc) = stored };
        }
    }

    fn set_zero(&mut self) {
        self.fill(T::zero());
    }

    /// Multiply every element by `k`.
    fn scale_by(&mut self, k: T) {
        let mut v = self.view_mut();
        let k = if v.is_conj() { k.conj() } else { k };
        unsafe { kernel::scal(v.len(), k, v.as_mut_ptr(), v.stride()) };
    }

    /// Add `k` to every element.
    fn shift_by(&mut self, k: T) {
        let mut v = self.view_mut();
        let k = if v.is_conj() { k.conj() } else { k };
        unsafe { kernel::shift(v.len(), k, v.as_mut_ptr(), v.stride()) };
    }

    /// Conjugate every element in memory.
    fn conj_in_place(&mut self) {
        let mut v = self.view_mut();
        unsafe { kernel::conj(v.len(), v.as_mut_ptr(), v.stride()) };
    }

    /// Copy the logical values of `src` into `self`.
    fn copy_from<V: ReadVector<T> + ?Sized>(&mut self, src: &V) -> Result<()> {
        let x = src.view();
        let mut y = self.view_mut();
        check_same_len(y.len(), x.len())?;
        let conj = x.is_conj() ^ y.is_conj();
        unsafe { kernel::copy(x.len(), conj, x.as_ptr(), x.stride(), y.as_mut_ptr(), y.stride()) };
        Ok(())
    }

    /// `self ← alpha * x + self`
    fn axpy<V: ReadVector<T> + ?Sized>(&mut self, alpha: T, x: &V) -> Result<()> {
        let x = x.view();
        let mut y = self.view_mut();
        check_same_len(y.len(), x.len())?;
        let (n, px, ix, iy) = (x.len(), x.as_ptr(), x.stride(), y.stride());
        let py = y.as_mut_ptr();
        unsafe {
            match (x.is_conj(), y.is_conj()) {
                (false, false) => kernel::axpy(n, alpha, px, ix, py, iy),
                (true, false) => kernel::acxpy(n, alpha, px, ix, py, iy),
                (false, true) => kernel::acxpy(n, alpha.conj(), px, ix, py, iy),
                (true, true) => kernel::axpy(n, alpha.conj(), px, ix, py, iy),
            }
        }
        Ok(())
    }

    fn add_assign<V: ReadVector<T> + ?Sized>(&mut self, x: &V) -> Result<()> {
        self.axpy(T::one(), x)
    }

    fn sub_assign<V: ReadVector<T> + ?Sized>(&mut self, x: &V) -> Result<()> {
        self.axpy(-T::one(), x)
    }

    /// Elementwise `self_i ← self_i * x_i`.
    fn mul_assign<V: ReadVector<T> + ?Sized>(&mut self, x: &V) -> Result<()> {
        let x = x.view();
        let mut y = self.view_mut();
        check_same_len(y.len(), x.len())?;
        let conj = x.is_conj() ^ y.is_conj();
        unsafe { kernel::mul(x.len(), conj, x.as_ptr(), x.stride(), y.as_mut_ptr(), y.stride()) };
        Ok(())
    }

    /// Elementwise `self_i ← self_i / x_i`.
    fn div_assign<V: ReadVector<T> + ?Sized>(&mut self, x: &V) -> Result<()> {
        let x = x.view();
        let mut y = self.view_mut();
        check_same_len(y.len(), x.len())?;
        let conj = x.is_conj() ^ y.is_conj();
        unsafe { kernel::div(x.len(), conj, x.as_ptr(), x.stride(), y.as_mut_ptr(), y.stride()) };
        Ok(())
    }
}

impl<T: Scalar> ReadVector<T> for VectorView<'_, T> {
    #[inline]
    fn view(&self) -> VectorView<'_, T> {
        *self
    }
}

impl<T: Scalar> ReadVector<T> for VectorViewMut<'_, T> {
    #[inline]
    fn view(&self) -> VectorView<'_, T> {
        self.rb()
    }
}

impl<T: Scalar> WriteVector<T> for VectorViewMut<'_, T> {
    #[inline]
    fn view_mut(&mut self) -> VectorViewMut<'_, T> {
        self.rb_mut()
    }
}

impl<T: Scalar, V: ReadVector<T> + ?Sized> ReadVector<T> for &V {
    #[inline]
    fn view(&self) -> VectorView<'_, T> {
        (**self).view()
    }
}

// ============================================================================
// Iteration, equality, display
// ============================================================================

/// Iterator over the logical values of a vector view.
#[derive(Debug, Clone)]
pub struct VectorIter<'a, T> {
    view: VectorView<'a, T>,
    front: usize,
    back: usize,
}

impl<T: Scalar> Iterator for VectorIter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let v = unsafe { self.view.read(self.front) };
        self.front += 1;
        Some(v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T: Scalar> DoubleEndedIterator for VectorIter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.view.read(self.back) })
    }
}

impl<T: Scalar> ExactSizeIterator for VectorIter<'_, T> {}

/// Same length and same logical elements.
pub(crate) fn views_equal<T: Scalar>(a: VectorView<'_, T>, b: VectorView<'_, T>) -> bool {
    a.len() == b.len() && a.into_iter().zip(b).all(|(x, y)| x == y)
}

impl<'b, T: Scalar> PartialEq<VectorView<'b, T>> for VectorView<'_, T> {
    fn eq(&self, other: &VectorView<'b, T>) -> bool {
        views_equal(*self, *other)
    }
}

/// Renders `vector n [e0, e1, ...]` over the stored values, wrapped in
/// `conj (...)` for a conjugated view.
pub(crate) fn fmt_vector<T: Scalar>(v: VectorView<'_, T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_conj() {
        write!(f, "conj (")?;
    }
    write!(f, "vector {} [", v.len())?;
    for i in 0..v.len() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", unsafe { v.raw(i) })?;
    }
    write!(f, "]")?;
    if v.is_conj() {
        write!(f, ")")?;
    }
    Ok(())
}

impl<T: Scalar> fmt::Display for VectorView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_vector(*self, f)
    }
}

impl<T: Scalar> fmt::Display for VectorViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_vector(self.rb(), f)
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
    fn test_from_slice_and_get() {
        let data = [1.0, 2.0, 3.0];
        let v = VectorView::from_slice(&data);
        assert_eq!(v.dim(), 3);
        assert_eq!(v.get(2).unwrap(), 3.0);
        assert!(matches!(
            v.get(3),
            Err(LinalgError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let data = [0.0; 6];
        assert!(VectorView::new(&data, 1, Strided::new(3, 2, false).unwrap()).is_ok());
        assert!(VectorView::new(&data, 1, Strided::new(3, 3, false).unwrap()).is_err());
        assert!(VectorView::new(&data, 6, Strided::contiguous(0)).is_ok());
        assert!(VectorView::new(&data, 7, Strided::contiguous(0)).is_err());
    }

    #[test]
    fn test_negative_stride_reads_backwards() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let v = VectorView::new(&data, 3, Strided::new(4, -1, false).unwrap()).unwrap();
        assert_eq!(v.to_vec(), vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(VectorView::from_slice(&data).reversed().to_vec(), v.to_vec());
    }

    #[test]
    fn test_subvector_with_stride() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let v = VectorView::from_slice(&data);
        let s = v.subvector_with_stride(3, 1, 2).unwrap();
        assert_eq!(s.to_vec(), vec![1.0, 4.0]);
        assert!(matches!(
            v.subvector_with_stride(0, 0, 1),
            Err(LinalgError::InvalidStride(0))
        ));
        assert_eq!(v.subvector(2, 3).unwrap().to_vec(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_conj_view_reads_and_writes() {
        let mut data = [c(1.0, 2.0), c(3.0, 4.0)];
        {
            let v = VectorView::from_slice(&data).conj();
            assert_eq!(v.get(0).unwrap(), c(1.0, -2.0));
            assert_eq!(v.conj().get(0).unwrap(), c(1.0, 2.0));
        }
        let mut m = VectorViewMut::from_slice(&mut data).conj();
        m.set(1, c(5.0, 6.0)).unwrap();
        assert_eq!(m.get(1).unwrap(), c(5.0, 6.0));
        assert_eq!(data[1], c(5.0, -6.0));
    }

    #[test]
    fn test_dot_conj_combinations() {
        let xs = [c(1.0, 2.0), c(-1.0, 0.5)];
        let ys = [c(0.5, -1.0), c(2.0, 3.0)];
        let x = VectorView::from_slice(&xs);
        let y = VectorView::from_slice(&ys);
        let manual = |a: &[Complex64], b: &[Complex64]| {
            a.iter().zip(b).fold(c(0.0, 0.0), |acc, (p, q)| acc + p.conj() * q)
        };
        let xc: Vec<_> = xs.iter().map(|v| v.conj()).collect();
        let yc: Vec<_> = ys.iter().map(|v| v.conj()).collect();
        assert_eq!(x.dot(&y).unwrap(), manual(&xs, &ys));
        assert_eq!(x.conj().dot(&y).unwrap(), manual(&xc, &ys));
        assert_eq!(x.dot(&y.conj()).unwrap(), manual(&xs, &yc));
        assert_eq!(x.conj().dot(&y.conj()).unwrap(), manual(&xc, &yc));
    }

    #[test]
    fn test_dotu_conj_combinations() {
        let xs = [c(1.0, 2.0), c(-1.0, 0.5)];
        let ys = [c(0.5, -1.0), c(2.0, 3.0)];
        let x = VectorView::from_slice(&xs);
        let y = VectorView::from_slice(&ys);
        let bilinear = |a: VectorView<'_, Complex64>, b: VectorView<'_, Complex64>| {
            a.iter().zip(b.iter()).fold(c(0.0, 0.0), |acc, (p, q)| acc + p * q)
        };
        for (a, b) in [(x, y), (x.conj(), y), (x, y.conj()), (x.conj(), y.conj())] {
            assert_eq!(a.dotu(&b).unwrap(), bilinear(a, b));
        }
    }

    #[test]
    fn test_axpy_conj_combinations() {
        let xs = [c(1.0, 1.0), c(0.0, -2.0)];
        let alpha = c(2.0, -1.0);
        for (cx, cy) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut ys = [c(1.0, 0.0), c(0.0, 1.0)];
            let mut x = VectorView::from_slice(&xs);
            if cx {
                x = x.conj();
            }
            let mut y = VectorViewMut::from_slice(&mut ys);
            if cy {
                y = y.conj();
            }
            let before = y.to_vec();
            y.axpy(alpha, &x).unwrap();
            for i in 0..2 {
                let expected = alpha * x.get(i).unwrap() + before[i];
                assert_eq!(y.get(i).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_shape_mismatch_leaves_target_untouched() {
        let mut ys = [1.0, 2.0, 3.0];
        let xs = [1.0, 1.0];
        let x = VectorView::from_slice(&xs);
        let mut y = VectorViewMut::from_slice(&mut ys);
        assert!(matches!(
            y.add_assign(&x),
            Err(LinalgError::ShapeMismatch(_, _))
        ));
        assert!(y.mul_assign(&x).is_err());
        assert!(y.div_assign(&x).is_err());
        assert!(y.sub_assign(&x).is_err());
        assert!(y.dot(&x).is_err());
        assert_eq!(ys, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_elementwise_with_conj_target() {
        let xs = [c(0.0, 1.0)];
        let mut ys = [c(1.0, 1.0)];
        let mut y = VectorViewMut::from_slice(&mut ys).conj();
        // logical y = 1 - i
        y.mul_assign(&VectorView::from_slice(&xs)).unwrap();
        assert_eq!(y.get(0).unwrap(), c(1.0, -1.0) * c(0.0, 1.0));
    }

    #[test]
    fn test_scale_and_shift_through_conj() {
        let mut ys = [c(1.0, 0.0)];
        let mut y = VectorViewMut::from_slice(&mut ys).conj();
        y.scale_by(c(0.0, 1.0));
        assert_eq!(y.get(0).unwrap(), c(0.0, 1.0));
        y.shift_by(c(1.0, 1.0));
        assert_eq!(y.get(0).unwrap(), c(1.0, 2.0));
        y.conj_in_place();
        assert_eq!(y.get(0).unwrap(), c(1.0, -2.0));
    }

    #[test]
    fn test_reductions() {
        let xs = [3.0, -4.0, 0.0];
        let x = VectorView::from_slice(&xs);
        assert_eq!(x.sum(), -1.0);
        assert_eq!(x.sum_abs(), 7.0);
        assert_eq!(x.norm2(), 5.0);
        assert_eq!(x.which_max_abs().unwrap(), (1, -4.0));
        let empty: [f64; 0] = [];
        assert!(matches!(
            VectorView::from_slice(&empty).which_max_abs(),
            Err(LinalgError::EmptyVector)
        ));
    }

    #[test]
    fn test_split_at_mut_disjoint() {
        let mut data = [1.0, 2.0, 3.0, 4.0];
        let (mut a, mut b) = VectorViewMut::from_slice(&mut data).split_at_mut(1).unwrap();
        a.fill(0.0);
        b.scale_by(10.0);
        assert_eq!(data, [0.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_into_const_shares_memory() {
        let mut data = [1.0, 2.0];
        let mut m = VectorViewMut::from_slice(&mut data);
        m.set(0, 7.0).unwrap();
        let v = m.into_const();
        assert_eq!(v.get(0).unwrap(), 7.0);
    }

    #[test]
    fn test_iter_both_ends() {
        let data = [1.0, 2.0, 3.0];
        let v = VectorView::from_slice(&data);
        assert_eq!(v.iter().rev().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
        assert_eq!(v.iter().len(), 3);
    }

    #[test]
    fn test_display() {
        let data = [c(1.0, 2.0)];
        let v = VectorView::from_slice(&data);
        assert_eq!(v.to_string(), "vector 1 [1+2i]");
        assert_eq!(v.conj().to_string(), "conj (vector 1 [1+2i])");
        let r = [1.0, 2.5];
        assert_eq!(VectorView::from_slice(&r).to_string(), "vector 2 [1, 2.5]");
    }
}
