use crate::{DistMatrix, RazorError};
use log::warn;
use num_traits::Float;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatrixValidator<'a, T> {
    matrix: &'a DistMatrix<T>,
    tolerance: T,
}

impl<'a, T: Float> MatrixValidator<'a, T> {
    pub(crate) fn new(matrix: &'a DistMatrix<T>, tolerance: T) -> Self {
        Self { matrix, tolerance }
    }

    /// Checks the metric properties an input distance matrix must have
    /// before reconstruction starts: non-empty, finite, non-negative,
    /// symmetric within tolerance and zero on the diagonal. Returns the
    /// first violation found, so the engine fails fast before any mutation.
    /// Coincident taxa (zero off-diagonal entries) are legal and only draw
    /// a warning.
    pub(crate) fn validate(&self) -> Result<(), RazorError> {
        if self.matrix.is_empty() {
            return Err(RazorError::EmptyMatrix);
        }
        let n = self.matrix.size();
        for i in 0..n {
            for j in 0..n {
                let distance = self.matrix.get(i, j);
                if !distance.is_finite() {
                    return Err(RazorError::NonFiniteDistance(format!(
                        "entry ({i}, {j}) is not finite"
                    )));
                }
                if distance < T::zero() {
                    return Err(RazorError::NegativeWeight(format!(
                        "entry ({i}, {j}) is negative"
                    )));
                }
            }
            let diagonal = self.matrix.get(i, i);
            if diagonal.abs() > self.tolerance {
                return Err(RazorError::WrongShape(format!(
                    "diagonal entry ({i}, {i}) is non-zero"
                )));
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let forward = self.matrix.get(i, j);
                let backward = self.matrix.get(j, i);
                if (forward - backward).abs() > self.tolerance {
                    return Err(RazorError::AsymmetricMatrix(format!(
                        "entries ({i}, {j}) and ({j}, {i}) differ"
                    )));
                }
                if forward.abs() <= self.tolerance {
                    warn!(
                        "taxa {i} and {j} are at distance zero; edges rerouted \
                        through the pair may prune away and leave other vertices \
                        unreachable"
                    );
                }
            }
        }
        Ok(())
    }
}
