//! Sample statistics over collections of equal-length vectors.
//!
//! Every estimator is assembled from the vector and matrix engines alone:
//! `axpy` for accumulation, `scale_by` for normalization and
//! `rank1_update` for the outer products of the covariance.

use crate::dense::{Matrix, MutMatrix, MutVector};
use crate::herm::Herm;
use crate::matrix::WriteMatrix;
use crate::scalar::Scalar;
use crate::tri::Uplo;
use crate::vector::{ReadVector, WriteVector};
use crate::{LinalgError, Result};
use num_traits::{One, Zero};

/// Normalization of a covariance estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovMethod {
    /// Bessel-corrected: `1 / (n - 1)`, or `W / (W^2 - sum w^2)` when
    /// weighted.
    #[default]
    Unbiased,
    /// `1 / n`, or `1 / W` when weighted.
    MaximumLikelihood,
}

/// Elementwise sum of the samples.
///
/// # Errors
/// `EmptyVector` without samples, `ShapeMismatch` for ragged ones.
pub fn sum<T: Scalar, V: ReadVector<T>>(samples: &[V]) -> Result<MutVector<T>> {
    let p = samples.first().map(|v| v.dim()).ok_or(LinalgError::EmptyVector)?;
    let mut acc = MutVector::zeros(p);
    for v in samples {
        acc.axpy(T::one(), v)?;
    }
    Ok(acc)
}

/// Elementwise mean of the samples.
pub fn mean<T: Scalar, V: ReadVector<T>>(samples: &[V]) -> Result<MutVector<T>> {
    let mut acc = sum(samples)?;
    acc.scale_by(T::from_real(T::Real::one() / real_count::<T>(samples.len())));
    Ok(acc)
}

/// `sum w_i * x_i`
pub fn weighted_sum<T: Scalar, V: ReadVector<T>>(samples: &[(T::Real, V)]) -> Result<MutVector<T>> {
    let p = samples.first().map(|(_, v)| v.dim()).ok_or(LinalgError::EmptyVector)?;
    let mut acc = MutVector::zeros(p);
    for (w, v) in samples {
        acc.axpy(T::from_real(*w), v)?;
    }
    Ok(acc)
}

/// `sum w_i * x_i / sum w_i`
pub fn weighted_mean<T: Scalar, V: ReadVector<T>>(samples: &[(T::Real, V)]) -> Result<MutVector<T>> {
    let mut acc = weighted_sum(samples)?;
    acc.scale_by(T::from_real(T::Real::one() / total_weight::<T, V>(samples)));
    Ok(acc)
}

/// Sample covariance `sum (x_i - mu)(x_i - mu)^H`, normalized by `method`.
///
/// The result stores the full matrix and is tagged `Upper`. With a single
/// sample the unbiased estimate divides by zero and follows `T`'s arithmetic.
pub fn covariance<T: Scalar, V: ReadVector<T>>(samples: &[V], method: CovMethod) -> Result<Herm<Matrix<T>>> {
    let mu = mean(samples)?;
    let p = mu.len();
    let mut c = MutMatrix::zeros(p, p);
    let mut d = MutVector::zeros(p);
    for v in samples {
        d.copy_from(v)?;
        d.axpy(-T::one(), &mu)?;
        c.rank1_update(T::one(), &d, &d)?;
    }
    let n = real_count::<T>(samples.len());
    let scale = match method {
        CovMethod::Unbiased => T::Real::one() / (n - T::Real::one()),
        CovMethod::MaximumLikelihood => T::Real::one() / n,
    };
    c.scale_by(T::from_real(scale));
    Herm::new(c.into_frozen(), Uplo::Upper)
}

/// Weighted covariance `sum w_i (x_i - mu_w)(x_i - mu_w)^H`, normalized by
/// `W / (W^2 - sum w_i^2)` (unbiased, reliability weights) or `1 / W`.
pub fn weighted_covariance<T: Scalar, V: ReadVector<T>>(
    samples: &[(T::Real, V)],
    method: CovMethod,
) -> Result<Herm<Matrix<T>>> {
    let mu = weighted_mean(samples)?;
    let p = mu.len();
    let mut c = MutMatrix::zeros(p, p);
    let mut d = MutVector::zeros(p);
    for (w, v) in samples {
        d.copy_from(v)?;
        d.axpy(-T::one(), &mu)?;
        c.rank1_update(T::from_real(*w), &d, &d)?;
    }
    let total = total_weight::<T, V>(samples);
    let scale = match method {
        CovMethod::Unbiased => {
            let sum_sq = samples
                .iter()
                .fold(T::Real::zero(), |acc, (w, _)| acc + *w * *w);
            total / (total * total - sum_sq)
        }
        CovMethod::MaximumLikelihood => T::Real::one() / total,
    };
    c.scale_by(T::from_real(scale));
    Herm::new(c.into_frozen(), Uplo::Upper)
}

fn total_weight<T: Scalar, V>(samples: &[(T::Real, V)]) -> T::Real {
    samples.iter().fold(T::Real::zero(), |acc, (w, _)| acc + *w)
}

fn real_count<T: Scalar>(n: usize) -> T::Real {
    (0..n).fold(T::Real::zero(), |acc, _| acc + T::Real::one())
}
