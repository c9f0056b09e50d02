//! Element operations applied lazily to vector and matrix views.
//!
//! Four operations form a group under composition:
//! - `Identity`: no transformation
//! - `Conj`: complex conjugate of every element
//! - `Transpose`: rows and columns swap roles (matrices only)
//! - `Adjoint`: conjugate transpose
//!
//! ```text
//!   ∘    | Id   | Conj | Trans | Adj
//! -------|------|------|-------|------
//!   Id   | Id   | Conj | Trans | Adj
//!   Conj | Conj | Id   | Adj   | Trans
//!   Trans| Trans| Adj  | Id    | Conj
//!   Adj  | Adj  | Trans| Conj  | Id
//! ```
//!
//! Every view stores one of these values next to its layout. Nothing ever
//! rewrites memory to apply an operation; reads go through [`ElementOp::apply`]
//! and writes through its inverse (each operation is its own inverse).

use crate::scalar::Scalar;

/// A lazily applied element operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ElementOp {
    #[default]
    Identity,
    Conj,
    Transpose,
    Adjoint,
}

impl ElementOp {
    /// Build an operation from its transpose and conjugate components.
    #[inline]
    pub const fn from_flags(transposed: bool, conj: bool) -> Self {
        match (transposed, conj) {
            (false, false) => ElementOp::Identity,
            (false, true) => ElementOp::Conj,
            (true, false) => ElementOp::Transpose,
            (true, true) => ElementOp::Adjoint,
        }
    }

    /// Whether reads return conjugated values.
    #[inline]
    pub const fn is_conj(self) -> bool {
        matches!(self, ElementOp::Conj | ElementOp::Adjoint)
    }

    /// Whether rows and columns are swapped.
    #[inline]
    pub const fn is_transposed(self) -> bool {
        matches!(self, ElementOp::Transpose | ElementOp::Adjoint)
    }

    /// Group composition `self ∘ other`.
    #[inline]
    pub const fn compose(self, other: ElementOp) -> Self {
        Self::from_flags(
            self.is_transposed() ^ other.is_transposed(),
            self.is_conj() ^ other.is_conj(),
        )
    }

    /// `self ∘ Conj`
    #[inline]
    pub const fn conj(self) -> Self {
        self.compose(ElementOp::Conj)
    }

    /// `self ∘ Transpose`
    #[inline]
    pub const fn transpose(self) -> Self {
        self.compose(ElementOp::Transpose)
    }

    /// `self ∘ Adjoint`
    #[inline]
    pub const fn adjoint(self) -> Self {
        self.compose(ElementOp::Adjoint)
    }

    /// The same operation with the conjugate component removed.
    #[inline]
    pub const fn without_conj(self) -> Self {
        Self::from_flags(self.is_transposed(), false)
    }

    /// Apply the element-level part of the operation to a value.
    #[inline(always)]
    pub fn apply<T: Scalar>(self, value: T) -> T {
        if self.is_conj() {
            value.conj()
        } else {
            value
        }
    }

    /// Drop the conjugate component when it cannot change any value of `T`.
    ///
    /// Real element types treat `Conj` as `Identity` and `Adjoint` as
    /// `Transpose`, which lets more calls reach a CBLAS routine.
    #[inline]
    pub fn normalize<T: Scalar>(self) -> Self {
        if T::is_real() {
            self.without_conj()
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_identity() {
        let x = Complex64::new(3.0, 4.0);
        assert_eq!(ElementOp::Identity.apply(x), x);
    }

    #[test]
    fn test_conj() {
        let x = Complex64::new(3.0, 4.0);
        assert_eq!(ElementOp::Conj.apply(x), Complex64::new(3.0, -4.0));
    }

    #[test]
    fn test_conj_real() {
        assert_eq!(ElementOp::Conj.apply(3.0f64), 3.0);
        assert_eq!(ElementOp::Adjoint.normalize::<f64>(), ElementOp::Transpose);
        assert_eq!(
            ElementOp::Adjoint.normalize::<Complex64>(),
            ElementOp::Adjoint
        );
    }

    #[test]
    fn test_adjoint_complex() {
        let x = Complex64::new(3.0, 4.0);
        assert_eq!(ElementOp::Adjoint.apply(x), Complex64::new(3.0, -4.0));
        assert_eq!(ElementOp::Transpose.apply(x), x);
    }

    #[test]
    fn test_composition_table() {
        use ElementOp::*;
        let ops = [Identity, Conj, Transpose, Adjoint];
        let table = [
            [Identity, Conj, Transpose, Adjoint],
            [Conj, Identity, Adjoint, Transpose],
            [Transpose, Adjoint, Identity, Conj],
            [Adjoint, Transpose, Conj, Identity],
        ];
        for (i, a) in ops.iter().enumerate() {
            for (j, b) in ops.iter().enumerate() {
                assert_eq!(a.compose(*b), table[i][j]);
            }
        }
    }

    #[test]
    fn test_every_op_is_an_involution() {
        for op in [
            ElementOp::Identity,
            ElementOp::Conj,
            ElementOp::Transpose,
            ElementOp::Adjoint,
        ] {
            assert_eq!(op.compose(op), ElementOp::Identity);
        }
        assert_eq!(ElementOp::Identity.conj().conj(), ElementOp::Identity);
        assert_eq!(ElementOp::Identity.transpose().conj(), ElementOp::Adjoint);
    }
}
