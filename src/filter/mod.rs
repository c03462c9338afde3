//! Trend/cycle decomposition.

pub mod hp;

pub use hp::*;
