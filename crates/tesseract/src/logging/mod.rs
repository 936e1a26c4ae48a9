//! Logging setup.
//!
//! The library only emits through the `log` facade; binaries and tests call
//! [`init_logging`] once to install an `env_logger` backend.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
