/// Counters accumulated while a query runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// State-machine transitions performed.
    pub steps: u64,
    /// Clause activations whose head unified with a goal.
    pub activations: u64,
    /// Solutions reported so far.
    pub solutions: u64,
}

impl SolveStats {
    pub fn new() -> Self {
        Self::default()
    }
}
