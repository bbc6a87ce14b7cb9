use std::error::Error as StdError;

/// Errors that can occur during an interior-point solve.
///
/// Failing to converge is not an error; it is reported through the
/// [`Solution`](super::Solution) status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("initial point has length {found}, expected {expected}")]
    InitialPoint { expected: usize, found: usize },

    #[error("constraint {index} is an inequality; only equality constraints are supported")]
    UnsupportedConstraints { index: usize },
}

impl Error {
    pub(crate) fn model<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Model(Box::new(err))
    }
}
