use pdecon_core::Observer;
use tracing::debug;

use crate::traits::{HasFeasibility, HasIteration, HasObjective};

/// Writes one `tracing` debug line per solver iteration.
///
/// A header line is written before the first iteration. The observer never
/// requests an action.
#[derive(Debug, Clone)]
pub struct LogObserver {
    label: String,
    header_written: bool,
}

impl LogObserver {
    /// Creates an observer that tags every line with `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            header_written: false,
        }
    }

    /// The label attached to each line.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<E, A> Observer<E, A> for LogObserver
where
    E: HasIteration + HasObjective + HasFeasibility,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        if !self.header_written {
            debug!(
                solver = %self.label,
                "{:>5}  {:>14}  {:>10}  {:>10}",
                "iter",
                "objective",
                "inf_pr",
                "inf_du"
            );
            self.header_written = true;
        }
        debug!(
            solver = %self.label,
            "{:>5}  {:>14.7e}  {:>10.2e}  {:>10.2e}",
            event.iteration(),
            event.objective(),
            event.primal_feas(),
            event.dual_feas()
        );
        None
    }
}
