//! Configuration and accounting for query evaluation.

mod settings;
mod stats;

pub use settings::Settings;
pub use stats::SolveStats;
