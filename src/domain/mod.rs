//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed enumerations (`Variable`, `Economy`, `Frequency`, `StatisticKind`)
//! - series containers (`TimeSeries`, `VariableBundle`, `DecomposedSeries`)
//! - run configuration (`CycleConfig`) and outputs (`CycleStatistics`, `ComparisonTable`)

pub mod types;

pub use types::*;
