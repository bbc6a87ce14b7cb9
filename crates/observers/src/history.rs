use pdecon_core::Observer;

use crate::traits::{HasFeasibility, HasIteration, HasObjective};

/// One recorded iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub iter: usize,
    pub objective: f64,
    pub primal_feas: f64,
    pub dual_feas: f64,
}

/// Records every iteration a solver reports.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<Record>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded iterations in the order they were observed.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The most recent record, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// True if the constraint violation never went up between records.
    #[must_use]
    pub fn primal_feas_non_increasing(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[1].primal_feas <= w[0].primal_feas)
    }
}

impl<E, A> Observer<E, A> for History
where
    E: HasIteration + HasObjective + HasFeasibility,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self.records.push(Record {
            iter: event.iteration(),
            objective: event.objective(),
            primal_feas: event.primal_feas(),
            dual_feas: event.dual_feas(),
        });
        None
    }
}

/// Allows `&mut History` to be passed to solvers that take an observer by
/// value, so the records can be read after the solve completes.
impl<E, A> Observer<E, A> for &mut History
where
    E: HasIteration + HasObjective + HasFeasibility,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        (*self).observe(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use pdecon_solvers::least_squares::{Action, Event};

    fn event(iter: usize, residual_norm: f64) -> Event<'static> {
        Event {
            iter,
            x: &[],
            residual_norm,
            gradient_norm: 0.1,
            radius: 1.0,
            ratio: 1.0,
            accepted: true,
            inner_iters: 1,
        }
    }

    #[test]
    fn records_least_squares_iterations() {
        let mut history = History::new();
        for (i, r) in [4.0, 2.0, 2.0].into_iter().enumerate() {
            let action: Option<Action> = history.observe(&event(i + 1, r));
            assert!(action.is_none());
        }

        assert_eq!(history.records().len(), 3);
        assert!(history.primal_feas_non_increasing());
        let last = history.last().unwrap();
        assert_eq!(last.iter, 3);
        assert_relative_eq!(last.objective, 2.0);
    }

    #[test]
    fn detects_increasing_violation() {
        let mut history = History::new();
        let _: Option<Action> = history.observe(&event(1, 1.0));
        let _: Option<Action> = history.observe(&event(2, 3.0));

        assert!(!history.primal_feas_non_increasing());
    }
}
