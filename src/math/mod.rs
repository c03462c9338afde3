//! Mathematical utilities: banded solver, least squares, and sample moments.

pub mod banded;
pub mod moments;
pub mod ols;

pub use banded::*;
pub use moments::*;
pub use ols::*;
