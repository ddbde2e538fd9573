//! RFQ Quoter - Main Library
//!
//! Re-exports the workspace libraries and hosts helpers shared by the
//! binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI)
//! - **quoting**: Signed quoting client (re-exported from workspace)
//! - **eventsocket**: Socket.IO transport (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use rfq_quoter::bin_common::{config_path_from_args, ConfigType};
//! use rfq_quoter::quoting::{QuoterConfig, QuotingClient};
//! ```

// Re-export workspace libraries for convenience
pub use eventsocket;
pub use quoting;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{config_path_from_args, load_config_from_env, parse_args, ConfigType};
}
