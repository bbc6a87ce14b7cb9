/// Actions an observer can take during an interior-point solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the current iterate.
    StopEarly,
}
