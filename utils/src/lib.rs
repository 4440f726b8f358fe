//! Shared utilities for the EDAO governance system.

pub mod logging;
pub mod stats;

pub use logging::{init_tracing, LogFormat, LoggingError};
pub use stats::ChainStats;
