/// Actions an observer can take during an augmented-Lagrangian solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current outer iteration and return its iterate.
    StopEarly,
}
