pub mod calculator;

pub mod momentum;
pub mod trend;
pub mod structure;

pub use calculator::compute_indicator_set;
