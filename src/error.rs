use thiserror::Error;

/// Possible errors that arise due to issues with input matrices and graphs,
/// or from a cooperative cancellation request.
#[derive(Debug, Clone, Error)]
pub enum RazorError {
    #[error("The distance matrix provided is empty")]
    EmptyMatrix,
    #[error("Input has the wrong shape: {0}")]
    WrongShape(String),
    #[error("Distance matrix is not symmetric: {0}")]
    AsymmetricMatrix(String),
    #[error("Non finite distance: {0}")]
    NonFiniteDistance(String),
    #[error("Negative edge weight: {0}")]
    NegativeWeight(String),
    #[error("Invalid edge: {0}")]
    InvalidEdge(String),
    #[error("The run was cancelled")]
    Cancelled,
}
