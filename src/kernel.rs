//! Strided numeric kernels with BLAS calling conventions.
//!
//! Every routine receives raw pointers together with explicit dimensions,
//! increments and leading dimensions, exactly like its BLAS counterpart.
//! Vector operands are `(ptr, inc)` pairs addressing logical element `i` at
//! `ptr + i * inc`; matrix operands are `(ptr, ld, op)` triples over
//! column-major storage read through an [`ElementOp`].
//!
//! Input operands may carry a conjugate flag; output operands never do. The
//! engines fold a conjugated output into the inputs before calling in (see
//! `vector` and `matrix`), so each kernel only needs the plain form.
//!
//! With the `blas` feature, contiguous positive-stride `f32`/`f64` calls to
//! `dot`, `axpy`, `nrm2`, `gemv` and `gemm` are forwarded to CBLAS. Every
//! other call runs the generic strided implementation below.
//!
//! # Safety
//!
//! All kernels are `unsafe`: the caller guarantees that every addressed
//! element is valid for reads (inputs) or reads and writes (outputs) and
//! that output operands do not overlap any other operand.

use crate::element_op::ElementOp;
use crate::scalar::Scalar;
use num_traits::{Float, One, Zero};

/// Which triangle of a square matrix holds meaningful entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uplo {
    Upper,
    Lower,
}

impl Uplo {
    /// The opposite triangle.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Uplo::Upper => Uplo::Lower,
            Uplo::Lower => Uplo::Upper,
        }
    }

    /// The triangle seen through `op`: transposition swaps upper and lower.
    #[inline]
    pub const fn through(self, op: ElementOp) -> Self {
        if op.is_transposed() {
            self.flip()
        } else {
            self
        }
    }
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagKind {
    Unit,
    NonUnit,
}

// ============================================================================
// Element access helpers
// ============================================================================

#[inline(always)]
unsafe fn at<T: Copy>(p: *const T, inc: isize, i: usize) -> T {
    *p.offset(i as isize * inc)
}

#[inline(always)]
unsafe fn at_mut<'a, T>(p: *mut T, inc: isize, i: usize) -> &'a mut T {
    &mut *p.offset(i as isize * inc)
}

#[inline(always)]
unsafe fn at_op<T: Scalar>(p: *const T, inc: isize, conj: bool, i: usize) -> T {
    let v = at(p, inc, i);
    if conj {
        v.conj()
    } else {
        v
    }
}

/// Logical element `(i, j)` of `op(A)`.
#[inline(always)]
unsafe fn mat_at<T: Scalar>(a: *const T, lda: usize, op: ElementOp, i: usize, j: usize) -> T {
    let offset = if op.is_transposed() {
        j + i * lda
    } else {
        i + j * lda
    };
    op.apply(*a.add(offset))
}

/// Logical element `(i, j)` of the Hermitian matrix whose `luplo` triangle
/// of `op(A)` is stored. The diagonal is read as real.
#[inline(always)]
unsafe fn herm_at<T: Scalar>(
    a: *const T,
    lda: usize,
    op: ElementOp,
    luplo: Uplo,
    i: usize,
    j: usize,
) -> T {
    if i == j {
        return T::from_real(mat_at(a, lda, op, i, i).re());
    }
    let stored = match luplo {
        Uplo::Upper => j > i,
        Uplo::Lower => j < i,
    };
    if stored {
        mat_at(a, lda, op, i, j)
    } else {
        mat_at(a, lda, op, j, i).conj()
    }
}

/// `y ← beta * y`, with `beta == 0` overwriting instead of multiplying.
#[inline]
unsafe fn scale_output<T: Scalar>(n: usize, beta: T, y: *mut T, incy: isize) {
    if beta.is_one() {
        return;
    }
    for i in 0..n {
        let yi = at_mut(y, incy, i);
        *yi = if beta.is_zero() { T::zero() } else { beta * *yi };
    }
}

// ============================================================================
// Level 1
// ============================================================================

/// `y ← x` (or `conj(x)` when `conj` is set).
pub unsafe fn copy<T: Scalar>(
    n: usize,
    conj: bool,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    for i in 0..n {
        *at_mut(y, incy, i) = at_op(x, incx, conj, i);
    }
}

/// `x ← alpha * x`
pub unsafe fn scal<T: Scalar>(n: usize, alpha: T, x: *mut T, incx: isize) {
    scale_output(n, alpha, x, incx);
}

/// `x ← x + alpha` elementwise.
pub unsafe fn shift<T: Scalar>(n: usize, alpha: T, x: *mut T, incx: isize) {
    if alpha.is_zero() {
        return;
    }
    for i in 0..n {
        let xi = at_mut(x, incx, i);
        *xi = *xi + alpha;
    }
}

/// `x ← conj(x)` in memory.
pub unsafe fn conj<T: Scalar>(n: usize, x: *mut T, incx: isize) {
    if T::is_real() {
        return;
    }
    for i in 0..n {
        let xi = at_mut(x, incx, i);
        *xi = xi.conj();
    }
}

/// `y ← alpha * x + y`
pub unsafe fn axpy<T: Scalar>(
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    if n == 0 || alpha.is_zero() {
        return;
    }
    #[cfg(feature = "blas")]
    if forward::axpy(n, alpha, x, incx, y, incy) {
        return;
    }
    if alpha.is_one() {
        for i in 0..n {
            let yi = at_mut(y, incy, i);
            *yi = at(x, incx, i) + *yi;
        }
    } else {
        for i in 0..n {
            let yi = at_mut(y, incy, i);
            *yi = alpha * at(x, incx, i) + *yi;
        }
    }
}

/// `y ← alpha * conj(x) + y`
pub unsafe fn acxpy<T: Scalar>(
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    if T::is_real() {
        return axpy(n, alpha, x, incx, y, incy);
    }
    if alpha.is_zero() {
        return;
    }
    for i in 0..n {
        let yi = at_mut(y, incy, i);
        *yi = alpha * at(x, incx, i).conj() + *yi;
    }
}

/// `y ← y * op(x)` elementwise.
pub unsafe fn mul<T: Scalar>(
    n: usize,
    conj: bool,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    for i in 0..n {
        let yi = at_mut(y, incy, i);
        *yi = *yi * at_op(x, incx, conj, i);
    }
}

/// `y ← y / op(x)` elementwise. Division by zero follows `T`'s arithmetic.
pub unsafe fn div<T: Scalar>(
    n: usize,
    conj: bool,
    x: *const T,
    incx: isize,
    y: *mut T,
    incy: isize,
) {
    for i in 0..n {
        let yi = at_mut(y, incy, i);
        *yi = *yi / at_op(x, incx, conj, i);
    }
}

/// `sum |re(x_i)| + |im(x_i)|`
pub unsafe fn asum<T: Scalar>(n: usize, x: *const T, incx: isize) -> T::Real {
    let mut acc = T::Real::zero();
    for i in 0..n {
        acc = acc + at(x, incx, i).abs1();
    }
    acc
}

/// Euclidean norm, accumulated with scaling to avoid overflow.
pub unsafe fn nrm2<T: Scalar>(n: usize, x: *const T, incx: isize) -> T::Real {
    #[cfg(feature = "blas")]
    if let Some(r) = forward::nrm2::<T>(n, x, incx) {
        return r;
    }
    let zero = T::Real::zero();
    let one = T::Real::one();
    let mut scale = zero;
    let mut ssq = one;
    let mut accumulate = |v: T::Real| {
        if v != zero {
            let a = v.abs();
            if scale < a {
                let r = scale / a;
                ssq = one + ssq * r * r;
                scale = a;
            } else {
                let r = a / scale;
                ssq = ssq + r * r;
            }
        }
    };
    for i in 0..n {
        let v = at(x, incx, i);
        accumulate(v.re());
        accumulate(v.im());
    }
    scale * ssq.sqrt()
}

/// Index of the first element with the largest `abs1`. Returns `0` for
/// `n == 0`; the result for NaN entries is unspecified.
pub unsafe fn iamax<T: Scalar>(n: usize, x: *const T, incx: isize) -> usize {
    let mut best = 0;
    let mut best_val = T::Real::neg_infinity();
    for i in 0..n {
        let v = at(x, incx, i).abs1();
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    best
}

/// Unconjugated dot product `sum x_i * y_i`.
pub unsafe fn dotu<T: Scalar>(n: usize, x: *const T, incx: isize, y: *const T, incy: isize) -> T {
    #[cfg(feature = "blas")]
    if let Some(r) = forward::dot(n, x, incx, y, incy) {
        return r;
    }
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + at(x, incx, i) * at(y, incy, i);
    }
    acc
}

/// Conjugated dot product `sum conj(x_i) * y_i`.
pub unsafe fn dotc<T: Scalar>(n: usize, x: *const T, incx: isize, y: *const T, incy: isize) -> T {
    if T::is_real() {
        return dotu(n, x, incx, y, incy);
    }
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + at(x, incx, i).conj() * at(y, incy, i);
    }
    acc
}

// ============================================================================
// Level 2
// ============================================================================

/// `y ← alpha * op(A) * op(x) + beta * y` where `op(A)` is `m x n`.
///
/// When `beta == 0`, `y` is overwritten without being read.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv<T: Scalar>(
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    x: *const T,
    incx: isize,
    conjx: bool,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    if m == 0 {
        return;
    }
    let opa = opa.normalize::<T>();
    #[cfg(feature = "blas")]
    if !conjx && forward::gemv(m, n, alpha, a, lda, opa, x, incx, beta, y, incy) {
        return;
    }
    if alpha.is_zero() || n == 0 {
        scale_output(m, beta, y, incy);
        return;
    }
    if opa.is_transposed() {
        // Rows of op(A) are contiguous storage columns: dot form.
        for i in 0..m {
            let mut acc = T::zero();
            for j in 0..n {
                acc = acc + mat_at(a, lda, opa, i, j) * at_op(x, incx, conjx, j);
            }
            let yi = at_mut(y, incy, i);
            *yi = if beta.is_zero() {
                alpha * acc
            } else {
                alpha * acc + beta * *yi
            };
        }
    } else {
        // Columns of op(A) are contiguous: axpy form.
        scale_output(m, beta, y, incy);
        for j in 0..n {
            let t = alpha * at_op(x, incx, conjx, j);
            if t.is_zero() {
                continue;
            }
            for i in 0..m {
                let yi = at_mut(y, incy, i);
                *yi = *yi + t * mat_at(a, lda, opa, i, j);
            }
        }
    }
}

/// Rank-1 update `A ← alpha * op(x) * op(y)^T + A` on plain `m x n`
/// column-major `A`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn ger<T: Scalar>(
    m: usize,
    n: usize,
    alpha: T,
    x: *const T,
    incx: isize,
    conjx: bool,
    y: *const T,
    incy: isize,
    conjy: bool,
    a: *mut T,
    lda: usize,
) {
    if alpha.is_zero() {
        return;
    }
    for j in 0..n {
        let t = alpha * at_op(y, incy, conjy, j);
        if t.is_zero() {
            continue;
        }
        let col = a.add(j * lda);
        for i in 0..m {
            let aij = &mut *col.add(i);
            *aij = *aij + at_op(x, incx, conjx, i) * t;
        }
    }
}

/// `x ← op(A) * x` for triangular `A`. `uplo` names the stored triangle of
/// `A`'s storage.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv<T: Scalar>(
    uplo: Uplo,
    diag: DiagKind,
    n: usize,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    x: *mut T,
    incx: isize,
) {
    let unit = diag == DiagKind::Unit;
    match uplo.through(opa) {
        Uplo::Upper => {
            for i in 0..n {
                let xi = at(x, incx, i);
                let mut acc = if unit {
                    xi
                } else {
                    mat_at(a, lda, opa, i, i) * xi
                };
                for j in i + 1..n {
                    acc = acc + mat_at(a, lda, opa, i, j) * at(x, incx, j);
                }
                *at_mut(x, incx, i) = acc;
            }
        }
        Uplo::Lower => {
            for i in (0..n).rev() {
                let xi = at(x, incx, i);
                let mut acc = if unit {
                    xi
                } else {
                    mat_at(a, lda, opa, i, i) * xi
                };
                for j in 0..i {
                    acc = acc + mat_at(a, lda, opa, i, j) * at(x, incx, j);
                }
                *at_mut(x, incx, i) = acc;
            }
        }
    }
}

/// Solve `op(A) * x = b` in place for triangular `A`. A zero pivot is
/// divided through following `T`'s arithmetic.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv<T: Scalar>(
    uplo: Uplo,
    diag: DiagKind,
    n: usize,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    x: *mut T,
    incx: isize,
) {
    let unit = diag == DiagKind::Unit;
    match uplo.through(opa) {
        Uplo::Lower => {
            for i in 0..n {
                let mut acc = at(x, incx, i);
                for j in 0..i {
                    acc = acc - mat_at(a, lda, opa, i, j) * at(x, incx, j);
                }
                *at_mut(x, incx, i) = if unit {
                    acc
                } else {
                    acc / mat_at(a, lda, opa, i, i)
                };
            }
        }
        Uplo::Upper => {
            for i in (0..n).rev() {
                let mut acc = at(x, incx, i);
                for j in i + 1..n {
                    acc = acc - mat_at(a, lda, opa, i, j) * at(x, incx, j);
                }
                *at_mut(x, incx, i) = if unit {
                    acc
                } else {
                    acc / mat_at(a, lda, opa, i, i)
                };
            }
        }
    }
}

/// `y ← alpha * H * op(x) + beta * y` where `H` is the Hermitian matrix
/// whose `uplo` storage triangle is read through `opa`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemv<T: Scalar>(
    uplo: Uplo,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    x: *const T,
    incx: isize,
    conjx: bool,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    if n == 0 {
        return;
    }
    if alpha.is_zero() {
        scale_output(n, beta, y, incy);
        return;
    }
    let luplo = uplo.through(opa);
    for i in 0..n {
        let mut acc = T::zero();
        for j in 0..n {
            acc = acc + herm_at(a, lda, opa, luplo, i, j) * at_op(x, incx, conjx, j);
        }
        let yi = at_mut(y, incy, i);
        *yi = if beta.is_zero() {
            alpha * acc
        } else {
            alpha * acc + beta * *yi
        };
    }
}

/// `y ← alpha * op(A) * op(x) + beta * y` for a band matrix `A` stored in
/// compact form.
///
/// `m`, `n`, `kl`, `ku` describe the storage matrix: element `(i, j)` with
/// `-kl <= j - i <= ku` sits at `a[(ku + i - j) + j * lda]`. `op(A)` is
/// `n x m` when `opa` transposes.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gbmv<T: Scalar>(
    m: usize,
    n: usize,
    kl: usize,
    ku: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    x: *const T,
    incx: isize,
    conjx: bool,
    beta: T,
    y: *mut T,
    incy: isize,
) {
    let transposed = opa.is_transposed();
    let leny = if transposed { n } else { m };
    scale_output(leny, beta, y, incy);
    if alpha.is_zero() {
        return;
    }
    for j in 0..n {
        let lo = j.saturating_sub(ku);
        let hi = (j + kl + 1).min(m);
        for i in lo..hi {
            let s = opa.apply(*a.add(ku + i - j + j * lda));
            if transposed {
                let yj = at_mut(y, incy, j);
                *yj = *yj + alpha * s * at_op(x, incx, conjx, i);
            } else {
                let yi = at_mut(y, incy, i);
                *yi = *yi + alpha * s * at_op(x, incx, conjx, j);
            }
        }
    }
}

// ============================================================================
// Level 3
// ============================================================================

/// `C ← alpha * op(A) * op(B) + beta * C` with `op(A)` `m x k`, `op(B)`
/// `k x n` and plain column-major `C`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm<T: Scalar>(
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    b: *const T,
    ldb: usize,
    opb: ElementOp,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    let opa = opa.normalize::<T>();
    let opb = opb.normalize::<T>();
    #[cfg(feature = "blas")]
    if forward::gemm(m, n, k, alpha, a, lda, opa, b, ldb, opb, beta, c, ldc) {
        return;
    }
    if alpha.is_zero() || k == 0 {
        for j in 0..n {
            scale_output(m, beta, c.add(j * ldc), 1);
        }
        return;
    }
    for j in 0..n {
        for i in 0..m {
            let mut acc = T::zero();
            for l in 0..k {
                acc = acc + mat_at(a, lda, opa, i, l) * mat_at(b, ldb, opb, l, j);
            }
            let cij = &mut *c.add(i + j * ldc);
            *cij = if beta.is_zero() {
                alpha * acc
            } else if beta.is_one() {
                alpha * acc + *cij
            } else {
                alpha * acc + beta * *cij
            };
        }
    }
}

/// `B ← alpha * op(A) * B` for triangular `m x m` `A` and plain `m x n` `B`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmm<T: Scalar>(
    uplo: Uplo,
    diag: DiagKind,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    b: *mut T,
    ldb: usize,
) {
    for j in 0..n {
        let col = b.add(j * ldb);
        trmv(uplo, diag, m, a, lda, opa, col, 1);
        scal(m, alpha, col, 1);
    }
}

/// `B ← alpha * op(A)^{-1} * B` for triangular `m x m` `A` and plain `m x n` `B`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsm<T: Scalar>(
    uplo: Uplo,
    diag: DiagKind,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    b: *mut T,
    ldb: usize,
) {
    for j in 0..n {
        let col = b.add(j * ldb);
        scal(m, alpha, col, 1);
        trsv(uplo, diag, m, a, lda, opa, col, 1);
    }
}

/// `C ← alpha * H * op(B) + beta * C` for Hermitian `m x m` `H`, with `C`
/// plain column-major.
#[allow(clippy::too_many_arguments)]
pub unsafe fn hemm<T: Scalar>(
    uplo: Uplo,
    m: usize,
    n: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    opa: ElementOp,
    b: *const T,
    ldb: usize,
    opb: ElementOp,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    let (rsb, csb) = if opb.is_transposed() {
        (ldb as isize, 1)
    } else {
        (1, ldb as isize)
    };
    for j in 0..n {
        hemv(
            uplo,
            m,
            alpha,
            a,
            lda,
            opa,
            b.offset(j as isize * csb),
            rsb,
            opb.is_conj(),
            beta,
            c.add(j * ldc),
            1,
        );
    }
}

// ============================================================================
// CBLAS forwarding
// ============================================================================

#[cfg(feature = "blas")]
mod forward {
    use super::*;
    use crate::scalar::ScalarKind;
    use cblas::{Layout, Transpose};
    use std::mem::transmute_copy;
    use std::slice::{from_raw_parts, from_raw_parts_mut};

    #[inline]
    fn span(n: usize, inc: isize) -> usize {
        if n == 0 {
            0
        } else {
            (n - 1) * inc.unsigned_abs() + 1
        }
    }

    #[inline]
    fn mat_span(srows: usize, scols: usize, ld: usize) -> usize {
        if srows == 0 || scols == 0 {
            0
        } else {
            (scols - 1) * ld + srows
        }
    }

    #[inline]
    fn fits(values: &[usize]) -> bool {
        values.iter().all(|&v| v <= i32::MAX as usize)
    }

    fn transpose_flag(op: ElementOp) -> Option<Transpose> {
        match op {
            ElementOp::Identity => Some(Transpose::None),
            ElementOp::Transpose => Some(Transpose::Ordinary),
            ElementOp::Adjoint => Some(Transpose::Conjugate),
            ElementOp::Conj => None,
        }
    }

    pub(super) unsafe fn dot<T: Scalar>(
        n: usize,
        x: *const T,
        incx: isize,
        y: *const T,
        incy: isize,
    ) -> Option<T> {
        if n == 0 || incx <= 0 || incy <= 0 || !fits(&[n, incx as usize, incy as usize]) {
            return None;
        }
        match T::KIND {
            ScalarKind::F64 => {
                tracing::trace!(n, "ddot");
                let r = cblas::ddot(
                    n as i32,
                    from_raw_parts(x as *const f64, span(n, incx)),
                    incx as i32,
                    from_raw_parts(y as *const f64, span(n, incy)),
                    incy as i32,
                );
                Some(transmute_copy(&r))
            }
            ScalarKind::F32 => {
                tracing::trace!(n, "sdot");
                let r = cblas::sdot(
                    n as i32,
                    from_raw_parts(x as *const f32, span(n, incx)),
                    incx as i32,
                    from_raw_parts(y as *const f32, span(n, incy)),
                    incy as i32,
                );
                Some(transmute_copy(&r))
            }
            _ => None,
        }
    }

    pub(super) unsafe fn nrm2<T: Scalar>(n: usize, x: *const T, incx: isize) -> Option<T::Real> {
        if n == 0 || incx <= 0 || !fits(&[n, incx as usize]) {
            return None;
        }
        match T::KIND {
            ScalarKind::F64 => {
                let r = cblas::dnrm2(
                    n as i32,
                    from_raw_parts(x as *const f64, span(n, incx)),
                    incx as i32,
                );
                Some(transmute_copy(&r))
            }
            ScalarKind::F32 => {
                let r = cblas::snrm2(
                    n as i32,
                    from_raw_parts(x as *const f32, span(n, incx)),
                    incx as i32,
                );
                Some(transmute_copy(&r))
            }
            _ => None,
        }
    }

    pub(super) unsafe fn axpy<T: Scalar>(
        n: usize,
        alpha: T,
        x: *const T,
        incx: isize,
        y: *mut T,
        incy: isize,
    ) -> bool {
        if incx <= 0 || incy <= 0 || !fits(&[n, incx as usize, incy as usize]) {
            return false;
        }
        match T::KIND {
            ScalarKind::F64 => {
                tracing::trace!(n, "daxpy");
                cblas::daxpy(
                    n as i32,
                    transmute_copy::<T, f64>(&alpha),
                    from_raw_parts(x as *const f64, span(n, incx)),
                    incx as i32,
                    from_raw_parts_mut(y as *mut f64, span(n, incy)),
                    incy as i32,
                );
                true
            }
            ScalarKind::F32 => {
                tracing::trace!(n, "saxpy");
                cblas::saxpy(
                    n as i32,
                    transmute_copy::<T, f32>(&alpha),
                    from_raw_parts(x as *const f32, span(n, incx)),
                    incx as i32,
                    from_raw_parts_mut(y as *mut f32, span(n, incy)),
                    incy as i32,
                );
                true
            }
            _ => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) unsafe fn gemv<T: Scalar>(
        m: usize,
        n: usize,
        alpha: T,
        a: *const T,
        lda: usize,
        opa: ElementOp,
        x: *const T,
        incx: isize,
        beta: T,
        y: *mut T,
        incy: isize,
    ) -> bool {
        let Some(trans) = transpose_flag(opa) else {
            return false;
        };
        if n == 0 || incx <= 0 || incy <= 0 {
            return false;
        }
        let (srows, scols) = if opa.is_transposed() { (n, m) } else { (m, n) };
        if lda < srows.max(1) || !fits(&[srows, scols, lda, incx as usize, incy as usize]) {
            return false;
        }
        let a_len = mat_span(srows, scols, lda);
        match T::KIND {
            ScalarKind::F64 => {
                tracing::trace!(m, n, "dgemv");
                cblas::dgemv(
                    Layout::ColumnMajor,
                    trans,
                    srows as i32,
                    scols as i32,
                    transmute_copy::<T, f64>(&alpha),
                    from_raw_parts(a as *const f64, a_len),
                    lda as i32,
                    from_raw_parts(x as *const f64, span(n, incx)),
                    incx as i32,
                    transmute_copy::<T, f64>(&beta),
                    from_raw_parts_mut(y as *mut f64, span(m, incy)),
                    incy as i32,
                );
                true
            }
            ScalarKind::F32 => {
                tracing::trace!(m, n, "sgemv");
                cblas::sgemv(
                    Layout::ColumnMajor,
                    trans,
                    srows as i32,
                    scols as i32,
                    transmute_copy::<T, f32>(&alpha),
                    from_raw_parts(a as *const f32, a_len),
                    lda as i32,
                    from_raw_parts(x as *const f32, span(n, incx)),
                    incx as i32,
                    transmute_copy::<T, f32>(&beta),
                    from_raw_parts_mut(y as *mut f32, span(m, incy)),
                    incy as i32,
                );
                true
            }
            _ => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) unsafe fn gemm<T: Scalar>(
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: *const T,
        lda: usize,
        opa: ElementOp,
        b: *const T,
        ldb: usize,
        opb: ElementOp,
        beta: T,
        c: *mut T,
        ldc: usize,
    ) -> bool {
        let (Some(ta), Some(tb)) = (transpose_flag(opa), transpose_flag(opb)) else {
            return false;
        };
        if k == 0 {
            return false;
        }
        let (ar, ac) = if opa.is_transposed() { (k, m) } else { (m, k) };
        let (br, bc) = if opb.is_transposed() { (n, k) } else { (k, n) };
        if lda < ar.max(1) || ldb < br.max(1) || ldc < m.max(1) {
            return false;
        }
        if !fits(&[m, n, k, lda, ldb, ldc]) {
            return false;
        }
        let a_len = mat_span(ar, ac, lda);
        let b_len = mat_span(br, bc, ldb);
        let c_len = mat_span(m, n, ldc);
        match T::KIND {
            ScalarKind::F64 => {
                tracing::trace!(m, n, k, "dgemm");
                cblas::dgemm(
                    Layout::ColumnMajor,
                    ta,
                    tb,
                    m as i32,
                    n as i32,
                    k as i32,
                    transmute_copy::<T, f64>(&alpha),
                    from_raw_parts(a as *const f64, a_len),
                    lda as i32,
                    from_raw_parts(b as *const f64, b_len),
                    ldb as i32,
                    transmute_copy::<T, f64>(&beta),
                    from_raw_parts_mut(c as *mut f64, c_len),
                    ldc as i32,
                );
                true
            }
            ScalarKind::F32 => {
                tracing::trace!(m, n, k, "sgemm");
                cblas::sgemm(
                    Layout::ColumnMajor,
                    ta,
                    tb,
                    m as i32,
                    n as i32,
                    k as i32,
                    transmute_copy::<T, f32>(&alpha),
                    from_raw_parts(a as *const f32, a_len),
                    lda as i32,
                    from_raw_parts(b as *const f32, b_len),
                    ldb as i32,
                    transmute_copy::<T, f32>(&beta),
                    from_raw_parts_mut(c as *mut f32, c_len),
                    ldc as i32,
                );
                true
            }
            _ => false,
        }
    }
}
