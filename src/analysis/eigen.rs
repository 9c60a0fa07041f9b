use nalgebra::SymmetricEigen;

use super::covariance::CovarianceMatrix;
use crate::error::{AnalysisError, AnalysisResult};

/// QR sweeps allowed per matrix dimension before giving up.
const MAX_ITERATIONS_PER_DIM: usize = 64;

/// One eigenvalue with its unit-norm eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenPair {
    pub eigenvalue: f64,
    /// Entry `i` is the loading of feature `i`.
    pub eigenvector: Vec<f64>,
}

/// Eigen pairs sorted by eigenvalue, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    pub pairs: Vec<EigenPair>,
}

impl EigenDecomposition {
    /// Decompose a covariance matrix with the symmetric solver.
    ///
    /// Pairs are stably sorted by descending eigenvalue and every
    /// eigenvector is flipped so its largest-magnitude entry is positive.
    pub fn of(cov: &CovarianceMatrix) -> AnalysisResult<Self> {
        let dimension = cov.dimension();
        let eigen = SymmetricEigen::try_new(
            cov.as_matrix().clone(),
            f64::EPSILON,
            MAX_ITERATIONS_PER_DIM * dimension.max(1),
        )
        .ok_or(AnalysisError::DecompositionFailed { dimension })?;

        let mut order: Vec<usize> = (0..dimension).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let pairs = order
            .into_iter()
            .map(|k| {
                let mut eigenvector: Vec<f64> = eigen.eigenvectors.column(k).iter().copied().collect();
                normalize_sign(&mut eigenvector);
                EigenPair {
                    eigenvalue: eigen.eigenvalues[k],
                    eigenvector,
                }
            })
            .collect();

        Ok(Self { pairs })
    }

    pub fn eigenvalues(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.eigenvalue).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Make the largest-magnitude entry positive (first one on ties).
fn normalize_sign(v: &mut [f64]) {
    let mut pivot = 0.0_f64;
    for &x in v.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        v.iter_mut().for_each(|x| *x = -*x);
    }
}
