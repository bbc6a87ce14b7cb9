use std::error::Error as StdError;

/// Errors that can occur during a least-squares solve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model error: {0}")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("initial point has length {found}, expected {expected}")]
    InitialPoint { expected: usize, found: usize },
}

impl Error {
    pub(crate) fn model<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Model(Box::new(err))
    }
}
