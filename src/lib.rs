//! `business-cycles` library crate.
//!
//! The binary (`bcycle`) is a thin wrapper around this library so that:
//!
//! - the HP filter and statistics engines are testable without spawning processes
//! - modules are reusable from other tools (notebooks, batch jobs)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod compare;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod math;
pub mod report;
pub mod stats;
pub mod transform;
