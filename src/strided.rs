//! Layout descriptors shared by every vector and matrix view.
//!
//! A view is a base pointer plus one of these descriptors. [`Strided`]
//! describes a one-dimensional run of `len` elements `stride` apart with a
//! lazy conjugate flag; [`MatLayout`] describes column-major storage with a
//! leading dimension plus an [`ElementOp`] for transpose/adjoint views.
//!
//! All offsets are relative to the view's base pointer and measured in
//! elements. Validation against an owning buffer happens once, when a view
//! is built through a checked constructor; the unchecked constructors trust
//! the caller.

use crate::element_op::ElementOp;
use crate::{LinalgError, Result};

// ============================================================================
// Strided
// ============================================================================

/// A strided run of elements with an optional conjugate flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strided {
    len: usize,
    stride: isize,
    conj: bool,
}

impl Strided {
    /// Create a layout, rejecting a zero stride.
    pub fn new(len: usize, stride: isize, conj: bool) -> Result<Self> {
        if stride == 0 {
            return Err(LinalgError::InvalidStride(stride));
        }
        Ok(Self { len, stride, conj })
    }

    /// Layout of `len` adjacent elements.
    #[inline]
    pub const fn contiguous(len: usize) -> Self {
        Self {
            len,
            stride: 1,
            conj: false,
        }
    }

    /// Create a layout without checking the stride.
    #[inline]
    pub(crate) const fn new_unchecked(len: usize, stride: isize, conj: bool) -> Self {
        Self { len, stride, conj }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn stride(&self) -> isize {
        self.stride
    }

    #[inline]
    pub const fn is_conj(&self) -> bool {
        self.conj
    }

    /// Toggle the conjugate flag. Applying it twice gives back `self`.
    #[inline]
    pub const fn with_conj(self) -> Self {
        Self {
            len: self.len,
            stride: self.stride,
            conj: !self.conj,
        }
    }

    /// The same elements in reverse order.
    #[inline]
    pub(crate) const fn reversed(self) -> (isize, Self) {
        let start = if self.len == 0 {
            0
        } else {
            (self.len as isize - 1) * self.stride
        };
        (
            start,
            Self {
                len: self.len,
                stride: -self.stride,
                conj: self.conj,
            },
        )
    }

    /// Offset of logical index `i` from the base pointer.
    #[inline(always)]
    pub const fn offset_of(&self, i: usize) -> isize {
        i as isize * self.stride
    }

    /// Fail with `IndexOutOfRange` unless `i < len`.
    #[inline]
    pub fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.len {
            return Err(LinalgError::IndexOutOfRange {
                index: i,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Smallest and largest offset touched, or `None` for an empty layout.
    pub fn extent(&self) -> Option<(isize, isize)> {
        if self.len == 0 {
            return None;
        }
        let last = (self.len as isize - 1)
            .checked_mul(self.stride)
            .unwrap_or(isize::MAX);
        Some((last.min(0), last.max(0)))
    }

    /// Check that every element lies inside a buffer of `buf_len` elements
    /// when the view starts at `base`.
    pub fn validate(&self, buf_len: usize, base: usize) -> Result<()> {
        if self.stride == 0 {
            return Err(LinalgError::InvalidStride(self.stride));
        }
        validate_span(self.extent(), buf_len, base)
    }

    /// Layout of `len` elements starting at logical index `offset`.
    ///
    /// Returns the base shift together with the new layout.
    pub fn subrange(&self, offset: usize, len: usize) -> Result<(isize, Self)> {
        let end = offset.checked_add(len).ok_or(LinalgError::OffsetOverflow)?;
        if end > self.len {
            return Err(LinalgError::IndexOutOfRange {
                index: end.saturating_sub(1).max(offset),
                len: self.len,
            });
        }
        Ok((
            self.offset_of(offset),
            Self {
                len,
                stride: self.stride,
                conj: self.conj,
            },
        ))
    }

    /// Layout of elements `offset, offset + step, ...`, `len` of them.
    pub fn subrange_with_stride(
        &self,
        step: isize,
        offset: usize,
        len: usize,
    ) -> Result<(isize, Self)> {
        if step <= 0 {
            return Err(LinalgError::InvalidStride(step));
        }
        if len > 0 {
            let last = (len - 1)
                .checked_mul(step as usize)
                .and_then(|d| d.checked_add(offset))
                .ok_or(LinalgError::OffsetOverflow)?;
            if last >= self.len {
                return Err(LinalgError::IndexOutOfRange {
                    index: last,
                    len: self.len,
                });
            }
        } else if offset > self.len {
            return Err(LinalgError::IndexOutOfRange {
                index: offset,
                len: self.len,
            });
        }
        Ok((
            self.offset_of(offset),
            Self {
                len,
                stride: self.stride * step,
                conj: self.conj,
            },
        ))
    }

    /// Split into `[0, k)` and `[k, len)`.
    pub(crate) fn split_at(&self, k: usize) -> Result<((isize, Self), (isize, Self))> {
        if k > self.len {
            return Err(LinalgError::IndexOutOfRange {
                index: k,
                len: self.len,
            });
        }
        Ok((
            (0, Self { len: k, ..*self }),
            (
                self.offset_of(k),
                Self {
                    len: self.len - k,
                    ..*self
                },
            ),
        ))
    }
}

fn validate_span(extent: Option<(isize, isize)>, buf_len: usize, base: usize) -> Result<()> {
    let Some((lo, hi)) = extent else {
        return Ok(());
    };
    let base = base as isize;
    let lo = base.checked_add(lo).ok_or(LinalgError::OffsetOverflow)?;
    let hi = base.checked_add(hi).ok_or(LinalgError::OffsetOverflow)?;
    if lo < 0 {
        return Err(LinalgError::OffsetOverflow);
    }
    if hi as usize >= buf_len {
        return Err(LinalgError::IndexOutOfRange {
            index: hi as usize,
            len: buf_len,
        });
    }
    Ok(())
}

// ============================================================================
// MatLayout
// ============================================================================

/// Column-major matrix storage seen through an [`ElementOp`].
///
/// `rows`/`cols` are the logical shape. The storage holds `rows x cols`
/// (or `cols x rows` when transposed) elements; storage element `(r, c)`
/// sits at offset `r + c * ld`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatLayout {
    rows: usize,
    cols: usize,
    ld: usize,
    op: ElementOp,
}

impl MatLayout {
    /// Dense column-major layout with `ld = max(1, rows)`.
    #[inline]
    pub const fn col_major(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ld: if rows == 0 { 1 } else { rows },
            op: ElementOp::Identity,
        }
    }

    /// Create a layout, checking the leading dimension against the storage
    /// row count.
    pub fn new(rows: usize, cols: usize, ld: usize, op: ElementOp) -> Result<Self> {
        let layout = Self { rows, cols, ld, op };
        let (srows, _) = layout.storage_shape();
        if ld < srows.max(1) {
            return Err(LinalgError::InvalidStride(ld as isize));
        }
        Ok(layout)
    }

    #[inline]
    pub(crate) const fn new_unchecked(rows: usize, cols: usize, ld: usize, op: ElementOp) -> Self {
        Self { rows, cols, ld, op }
    }

    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub const fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub const fn op(&self) -> ElementOp {
        self.op
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Shape of the underlying column-major storage.
    #[inline]
    pub const fn storage_shape(&self) -> (usize, usize) {
        if self.op.is_transposed() {
            (self.cols, self.rows)
        } else {
            (self.rows, self.cols)
        }
    }

    /// Logical `(row_stride, col_stride)`.
    #[inline(always)]
    pub const fn strides(&self) -> (isize, isize) {
        if self.op.is_transposed() {
            (self.ld as isize, 1)
        } else {
            (1, self.ld as isize)
        }
    }

    /// Offset of logical element `(i, j)` from the base pointer.
    #[inline(always)]
    pub const fn offset_of(&self, i: usize, j: usize) -> isize {
        let (rs, cs) = self.strides();
        i as isize * rs + j as isize * cs
    }

    /// Fail with `IndexOutOfRange` unless `(i, j)` is inside the shape.
    #[inline]
    pub fn check_index(&self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows {
            return Err(LinalgError::IndexOutOfRange {
                index: i,
                len: self.rows,
            });
        }
        if j >= self.cols {
            return Err(LinalgError::IndexOutOfRange {
                index: j,
                len: self.cols,
            });
        }
        Ok(())
    }

    /// Check that every element lies inside a buffer of `buf_len` elements
    /// when the view starts at `base`.
    pub fn validate(&self, buf_len: usize, base: usize) -> Result<()> {
        let (srows, scols) = self.storage_shape();
        if self.ld < srows.max(1) {
            return Err(LinalgError::InvalidStride(self.ld as isize));
        }
        let extent = if self.is_empty() {
            None
        } else {
            let hi = (scols - 1)
                .checked_mul(self.ld)
                .and_then(|v| v.checked_add(srows - 1))
                .ok_or(LinalgError::OffsetOverflow)?;
            Some((0, hi as isize))
        };
        validate_span(extent, buf_len, base)
    }

    #[inline]
    pub const fn transpose(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            ld: self.ld,
            op: self.op.transpose(),
        }
    }

    #[inline]
    pub const fn conj(self) -> Self {
        Self {
            op: self.op.conj(),
            ..self
        }
    }

    #[inline]
    pub const fn herm(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            ld: self.ld,
            op: self.op.adjoint(),
        }
    }

    /// Layout of logical row `i` (unchecked).
    #[inline]
    pub(crate) const fn row(&self, i: usize) -> (isize, Strided) {
        let (rs, cs) = self.strides();
        (
            i as isize * rs,
            Strided::new_unchecked(self.cols, cs, self.op.is_conj()),
        )
    }

    /// Layout of logical column `j` (unchecked).
    #[inline]
    pub(crate) const fn col(&self, j: usize) -> (isize, Strided) {
        let (rs, cs) = self.strides();
        (
            j as isize * cs,
            Strided::new_unchecked(self.rows, rs, self.op.is_conj()),
        )
    }

    /// Layout of the diagonal at signed offset `k` (`k > 0` above the main
    /// diagonal). Offsets outside the matrix yield an empty diagonal.
    pub(crate) fn diag(&self, k: isize) -> Result<(isize, Strided)> {
        let (rs, cs) = self.strides();
        let (i0, j0) = if k >= 0 {
            (0, k.unsigned_abs())
        } else {
            (k.unsigned_abs(), 0)
        };
        if (k > 0 && j0 > self.cols) || (k < 0 && i0 > self.rows) {
            return Err(LinalgError::IndexOutOfRange {
                index: k.unsigned_abs(),
                len: if k > 0 { self.cols } else { self.rows },
            });
        }
        let len = (self.rows - i0).min(self.cols - j0);
        Ok((
            self.offset_of(i0, j0),
            Strided::new_unchecked(len, rs + cs, self.op.is_conj()),
        ))
    }

    /// Layout of the `m x n` block whose top-left corner is `(i, j)`.
    pub(crate) fn submatrix(&self, (i, j): (usize, usize), (m, n): (usize, usize)) -> Result<(isize, Self)> {
        let row_end = i.checked_add(m).ok_or(LinalgError::OffsetOverflow)?;
        let col_end = j.checked_add(n).ok_or(LinalgError::OffsetOverflow)?;
        if row_end > self.rows {
            return Err(LinalgError::IndexOutOfRange {
                index: row_end.saturating_sub(1).max(i),
                len: self.rows,
            });
        }
        if col_end > self.cols {
            return Err(LinalgError::IndexOutOfRange {
                index: col_end.saturating_sub(1).max(j),
                len: self.cols,
            });
        }
        Ok((
            self.offset_of(i, j),
            Self {
                rows: m,
                cols: n,
                ..*self
            },
        ))
    }
}
