//! frontdesk-core: shared plumbing for the frontdesk workspace
//!
//! Holds the pieces every other crate needs: structured error types,
//! TOML configuration loading, and in-process password hashing.

pub mod config;
pub mod error;
pub mod password;

pub use config::{DatabaseConfig, FrontdeskConfig};
pub use error::{CoreError, Result};
