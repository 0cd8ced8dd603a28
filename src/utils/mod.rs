//! Utility functions and types for the bounds estimator.

pub mod error;
mod logging;
pub mod stats;
pub mod types;

pub use error::Error;
pub use logging::init_logging;
pub use types::*;
