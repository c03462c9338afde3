//! Input/output helpers.
//!
//! - FRED-style CSV ingest into series and bundles (`ingest`)
//! - decomposition CSV and comparison JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
