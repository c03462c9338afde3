//! Data sources that need no network: seeded synthetic bundles.

pub mod synthetic;

pub use synthetic::{SyntheticConfig, generate_bundle};
