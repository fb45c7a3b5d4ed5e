//! Shared utilities for moat-screen
//!
//! Logging setup used by the command-line front end and examples.

pub mod logging;

pub use logging::{DEFAULT_FILTER, init_tracing};
