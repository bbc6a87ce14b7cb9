use thiserror::Error;

use pdecon_core::MetaError;

/// Errors that can occur while building a [`PdeModel`](crate::PdeModel).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("domain bounds must be finite with min < max, got x {x:?}, y {y:?}")]
    InvalidDomain { x: [f64; 2], y: [f64; 2] },

    #[error("partition must have at least one cell per direction, got {0:?}")]
    EmptyPartition([usize; 2]),

    #[error("unsupported element order {order} (supported: 1..={max})")]
    UnsupportedOrder { order: usize, max: usize },

    #[error("unsupported quadrature size {points} (supported: 1..={max})")]
    InvalidQuadrature { points: usize, max: usize },

    #[error("the state space has no free degrees of freedom")]
    NoStateDofs,

    #[error("initial point has length {found}, but the spaces have {expected} degrees of freedom")]
    DofMismatch { expected: usize, found: usize },

    #[error("invalid model metadata: {0}")]
    Meta(#[from] MetaError),
}

/// Errors that can occur while evaluating a [`PdeModel`](crate::PdeModel).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("{what} has length {found}, expected {expected}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl EvalError {
    pub(crate) fn check(what: &'static str, expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(Self::Dimension {
                what,
                expected,
                found,
            })
        }
    }
}
