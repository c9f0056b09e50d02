//! Dense vectors and matrices over strided, conjugated and transposed views.
//!
//! The crate layers typed linear algebra over a BLAS-style kernel set.
//! Every value is a base pointer plus a layout descriptor, so slicing,
//! conjugation, transposition and diagonal extraction never copy.
//!
//! # Core Types
//!
//! - [`Vector`] / [`Matrix`]: immutable values sharing one allocation; views
//!   of them are again `Vector`s and `Matrix`es.
//! - [`MutVector`] / [`MutMatrix`]: owned buffers mutated in place.
//! - [`VectorView`] / [`VectorViewMut`], [`MatrixView`] / [`MatrixViewMut`]:
//!   borrowed zero-copy views with strides, leading dimension and a lazy
//!   [`ElementOp`].
//! - [`ReadVector`] / [`WriteVector`], [`ReadMatrix`] / [`WriteMatrix`]: the
//!   read-only and in-place capability sets.
//!
//! # Structured Matrices
//!
//! - [`Diag`]: a vector read as a diagonal matrix
//! - [`Tri`]: triangular multiply and solve
//! - [`Herm`]: Hermitian multiply from one stored triangle
//! - [`Banded`]: compact band storage
//!
//! Built on top: [`cholesky`] factorization and [`stats`] (mean/covariance).
//!
//! # Example
//!
//! ```rust
//! use strided_linalg::{MutMatrix, ReadMatrix, ReadVector, WriteMatrix, MutVector};
//!
//! let mut a = MutMatrix::<f64>::zeros(3, 3);
//! let x = MutVector::from_vec(vec![1.0, 0.0, 0.0]);
//! let y = MutVector::from_vec(vec![0.0, 1.0, 0.0]);
//! a.rank1_update(1.0, &x, &y).unwrap();
//! assert_eq!(a.get(0, 1).unwrap(), 1.0);
//!
//! // Transposition is a view: no copy, shared storage.
//! let t = a.mat_view().transpose();
//! assert_eq!(t.get(1, 0).unwrap(), 1.0);
//! assert_eq!(t.col(0).unwrap().to_vec(), vec![0.0, 1.0, 0.0]);
//! ```
//!
//! # Features
//!
//! - `blas`: forward contiguous `f32`/`f64` kernels to CBLAS.

mod banded;
pub mod cholesky;
mod dense;
mod diag;
mod element_op;
mod herm;
pub mod kernel;
mod matrix;
mod scalar;
pub mod stats;
mod strided;
mod tri;
mod vector;

// ============================================================================
// Element types and operations
// ============================================================================
pub use element_op::ElementOp;
pub use scalar::{Scalar, ScalarKind};
pub use strided::{MatLayout, Strided};

// ============================================================================
// Vector and matrix engines
// ============================================================================
pub use matrix::{gemm, gemv, rank1_update, Lines, MatrixView, MatrixViewMut, ReadMatrix, WriteMatrix};
pub use vector::{ReadVector, VectorIter, VectorView, VectorViewMut, WriteVector};

// ============================================================================
// Owned values and freeze/thaw
// ============================================================================
pub use dense::{Matrix, MutMatrix, MutVector, Vector};

// ============================================================================
// Structured adapters
// ============================================================================
pub use banded::Banded;
pub use diag::Diag;
pub use herm::Herm;
pub use tri::{DiagKind, Tri, Uplo};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by the checked API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinalgError {
    /// An index, offset or length falls outside the valid range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Operand shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// A stride or leading dimension is zero, negative or too small.
    #[error("invalid stride {0}")]
    InvalidStride(isize),

    /// A dense matrix has a nonzero entry outside the requested band.
    #[error("entry ({row}, {col}) lies outside the band (kl={kl}, ku={ku}) but is nonzero")]
    InvalidBandedMatrix {
        row: usize,
        col: usize,
        kl: usize,
        ku: usize,
    },

    /// The reduction needs at least one element.
    #[error("empty vector")]
    EmptyVector,

    /// A solve hit an exactly singular system.
    #[error("singular matrix")]
    SingularMatrix,

    /// The position is structurally fixed by the adapter.
    #[error("entry ({row}, {col}) is not modifiable")]
    NotModifiable { row: usize, col: usize },

    /// A square matrix was required.
    #[error("non-square matrix: rows={rows}, cols={cols}")]
    NonSquare { rows: usize, cols: usize },

    /// Cholesky factorization found a non-positive pivot.
    #[error("matrix is not positive definite (pivot at column {column})")]
    NotPositiveDefinite { column: usize },

    /// Integer overflow while computing an offset.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,
}

/// Result type for checked operations.
pub type Result<T> = std::result::Result<T, LinalgError>;

pub(crate) fn check_same_len(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(LinalgError::ShapeMismatch(vec![a], vec![b]));
    }
    Ok(())
}

pub(crate) fn check_same_shape(a: (usize, usize), b: (usize, usize)) -> Result<()> {
    if a != b {
        return Err(LinalgError::ShapeMismatch(vec![a.0, a.1], vec![b.0, b.1]));
    }
    Ok(())
}
