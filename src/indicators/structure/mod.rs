//! Market structure: reference levels

pub mod levels;

pub use levels::*;
