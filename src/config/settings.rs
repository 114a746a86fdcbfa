/// Knobs controlling query evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Total resolution steps a query may spend, nested searches included.
    /// `None` means unbounded.
    pub max_iterations: Option<u64>,
    /// Reuse the caller's variable slots when entering the last goal of a
    /// single-goal clause body. Saves frames on deterministic recursion but
    /// is not sound for every program; off by default.
    pub tail_call_reuse: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { max_iterations: None, tail_call_reuse: false }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, limit: u64) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    pub fn with_tail_call_reuse(mut self, enabled: bool) -> Self {
        self.tail_call_reuse = enabled;
        self
    }
}
