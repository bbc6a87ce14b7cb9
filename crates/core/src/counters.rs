use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of evaluation a model records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalKind {
    Obj,
    Grad,
    Cons,
    Jac,
    Jprod,
    Jtprod,
    Hess,
    Hprod,
    Residual,
    JprodResidual,
    JtprodResidual,
}

impl EvalKind {
    const ALL: [Self; 11] = [
        Self::Obj,
        Self::Grad,
        Self::Cons,
        Self::Jac,
        Self::Jprod,
        Self::Jtprod,
        Self::Hess,
        Self::Hprod,
        Self::Residual,
        Self::JprodResidual,
        Self::JtprodResidual,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-run evaluation counters owned by a model.
///
/// Models evaluate through `&self`, so counting uses interior mutability.
/// Counters are only meaningful between two calls to [`Counters::reset`]:
/// a caller comparing solvers resets before each run and never reads the
/// totals of an earlier run as if they belonged to the current one.
#[derive(Debug, Default)]
pub struct Counters {
    counts: [Cell<usize>; 11],
}

impl Counters {
    /// Creates a zeroed set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one evaluation of the given kind.
    pub fn record(&self, kind: EvalKind) {
        let cell = &self.counts[kind.index()];
        cell.set(cell.get() + 1);
    }

    /// Returns the number of recorded evaluations of the given kind.
    #[must_use]
    pub fn get(&self, kind: EvalKind) -> usize {
        self.counts[kind.index()].get()
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        for cell in &self.counts {
            cell.set(0);
        }
    }

    /// Captures the current counts as a plain value.
    #[must_use]
    pub fn snapshot(&self) -> EvalCounts {
        EvalCounts {
            obj: self.get(EvalKind::Obj),
            grad: self.get(EvalKind::Grad),
            cons: self.get(EvalKind::Cons),
            jac: self.get(EvalKind::Jac),
            jprod: self.get(EvalKind::Jprod),
            jtprod: self.get(EvalKind::Jtprod),
            hess: self.get(EvalKind::Hess),
            hprod: self.get(EvalKind::Hprod),
            residual: self.get(EvalKind::Residual),
            jprod_residual: self.get(EvalKind::JprodResidual),
            jtprod_residual: self.get(EvalKind::JtprodResidual),
        }
    }
}

/// A frozen copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCounts {
    pub obj: usize,
    pub grad: usize,
    pub cons: usize,
    pub jac: usize,
    pub jprod: usize,
    pub jtprod: usize,
    pub hess: usize,
    pub hprod: usize,
    pub residual: usize,
    pub jprod_residual: usize,
    pub jtprod_residual: usize,
}

impl EvalCounts {
    /// Total number of evaluations of any kind.
    #[must_use]
    pub fn total(&self) -> usize {
        EvalKind::ALL.iter().map(|&kind| self.get(kind)).sum()
    }

    /// Returns the count for one kind.
    #[must_use]
    pub fn get(&self, kind: EvalKind) -> usize {
        match kind {
            EvalKind::Obj => self.obj,
            EvalKind::Grad => self.grad,
            EvalKind::Cons => self.cons,
            EvalKind::Jac => self.jac,
            EvalKind::Jprod => self.jprod,
            EvalKind::Jtprod => self.jtprod,
            EvalKind::Hess => self.hess,
            EvalKind::Hprod => self.hprod,
            EvalKind::Residual => self.residual,
            EvalKind::JprodResidual => self.jprod_residual,
            EvalKind::JtprodResidual => self.jtprod_residual,
        }
    }
}

impl fmt::Display for EvalCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "obj={} grad={} cons={} jac={} jprod={} jtprod={} hess={} hprod={}",
            self.obj, self.grad, self.cons, self.jac, self.jprod, self.jtprod, self.hess, self.hprod
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_kind_independently() {
        let counters = Counters::new();
        counters.record(EvalKind::Obj);
        counters.record(EvalKind::Obj);
        counters.record(EvalKind::Hprod);

        assert_eq!(counters.get(EvalKind::Obj), 2);
        assert_eq!(counters.get(EvalKind::Hprod), 1);
        assert_eq!(counters.get(EvalKind::Grad), 0);
        assert_eq!(counters.snapshot().total(), 3);
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = Counters::new();
        for kind in EvalKind::ALL {
            counters.record(kind);
        }
        assert_eq!(counters.snapshot().total(), EvalKind::ALL.len());

        counters.reset();

        assert_eq!(counters.snapshot(), EvalCounts::default());
    }

    #[test]
    fn snapshot_is_detached_from_later_records() {
        let counters = Counters::new();
        counters.record(EvalKind::Cons);
        let before = counters.snapshot();
        counters.record(EvalKind::Cons);

        assert_eq!(before.cons, 1);
        assert_eq!(counters.snapshot().cons, 2);
    }
}
