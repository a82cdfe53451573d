//! Signal evaluation interfaces.

pub mod classification;
pub mod scoring;
pub mod decision;
pub mod engine;

pub use classification::*;
pub use scoring::*;
pub use decision::*;
pub use engine::SignalEngine;
