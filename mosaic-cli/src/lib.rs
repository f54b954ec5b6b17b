//! Command-line harness for mosaic
//!
//! This crate provides:
//! - `mosaic check` to evaluate a scope against a context and surface
//! - `mosaic conformance` to run a golden scope fixture table
//! - `mosaic assemble` to build a runtime context against a JSON world file

pub mod cli;
pub mod commands;
mod error;
pub mod logging;

pub use cli::{AssembleArgs, CheckArgs, Cli, Commands};
pub use error::CliError;
pub use logging::LogFormat;
