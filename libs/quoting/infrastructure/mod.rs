//! Infrastructure Layer
//!
//! Configuration loading and logging setup for quoting binaries.

pub mod config;
pub mod logging;

pub use config::{ConfigError, QuoterConfig};
pub use logging::init_tracing;
