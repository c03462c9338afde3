//! Reporting utilities: plain-text tables and summaries.

pub mod format;

pub use format::*;
