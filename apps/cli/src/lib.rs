//! # billbook-cli
//!
//! Configuration, errors and command implementations behind the `billbook`
//! binary. The binary itself only parses arguments and prints.

pub mod commands;
pub mod config;
pub mod error;

pub use config::BillbookConfig;
pub use error::{CliError, CliResult};
