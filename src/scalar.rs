//! Element types accepted by the dense engines.
//!
//! The engines are restricted to the four BLAS element types: `f32`, `f64`,
//! `Complex32` and `Complex64`. [`Scalar`] bundles the arithmetic bounds the
//! kernels need with the handful of complex-aware helpers (conjugation,
//! magnitudes, real embedding) that the generic code paths call.

use num_complex::Complex;
use num_traits::{Float, One, Zero};
use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Runtime tag for the concrete element type.
///
/// Used by the kernel layer to decide whether a call can be forwarded to a
/// precision-specific CBLAS routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    F32,
    F64,
    C32,
    C64,
}

/// Element type of a dense vector or matrix.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + Debug
    + Display
    + PartialEq
    + Default
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Zero
    + One
{
    /// The underlying real type (`Self` for real types).
    type Real: Scalar<Real = Self::Real> + Float;

    /// Tag for the concrete type.
    const KIND: ScalarKind;

    /// Complex conjugate; identity for real types.
    fn conj(self) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Imaginary part; zero for real types.
    fn im(self) -> Self::Real;

    /// Embed a real value.
    fn from_real(re: Self::Real) -> Self;

    /// `|re| + |im|`, the magnitude used by `asum` and `iamax`.
    fn abs1(self) -> Self::Real;

    /// Euclidean modulus.
    fn modulus(self) -> Self::Real;

    /// Squared modulus, `re^2 + im^2`.
    fn norm_sqr(self) -> Self::Real;

    /// Whether conjugation is a no-op for this type.
    #[inline]
    fn is_real() -> bool {
        matches!(Self::KIND, ScalarKind::F32 | ScalarKind::F64)
    }
}

macro_rules! impl_scalar_real {
    ($t:ty, $kind:ident) => {
        impl Scalar for $t {
            type Real = $t;
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn re(self) -> Self::Real {
                self
            }
            #[inline(always)]
            fn im(self) -> Self::Real {
                0.0
            }
            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                re
            }
            #[inline(always)]
            fn abs1(self) -> Self::Real {
                self.abs()
            }
            #[inline(always)]
            fn modulus(self) -> Self::Real {
                self.abs()
            }
            #[inline(always)]
            fn norm_sqr(self) -> Self::Real {
                self * self
            }
        }
    };
}

macro_rules! impl_scalar_complex {
    ($t:ty, $kind:ident) => {
        impl Scalar for Complex<$t> {
            type Real = $t;
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline(always)]
            fn conj(self) -> Self {
                Complex::conj(&self)
            }
            #[inline(always)]
            fn re(self) -> Self::Real {
                self.re
            }
            #[inline(always)]
            fn im(self) -> Self::Real {
                self.im
            }
            #[inline(always)]
            fn from_real(re: Self::Real) -> Self {
                Complex::new(re, 0.0)
            }
            #[inline(always)]
            fn abs1(self) -> Self::Real {
                self.re.abs() + self.im.abs()
            }
            #[inline(always)]
            fn modulus(self) -> Self::Real {
                self.norm()
            }
            #[inline(always)]
            fn norm_sqr(self) -> Self::Real {
                Complex::norm_sqr(&self)
            }
        }
    };
}

impl_scalar_real!(f32, F32);
impl_scalar_real!(f64, F64);
impl_scalar_complex!(f32, C32);
impl_scalar_complex!(f64, C64);
