//! CLI module
//!
//! Command-line interface for running the job.
//!
//! # Usage
//!
//! ```text
//! songplay-etl [--config dl.yaml] [--input URL] [--output URL] [--compression C] [-v]
//! ```
//!
//! Flags override the config file, which overrides the built-in defaults.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
