//! swagprobe CLI library
//!
//! Command-line surface over the `swagprobe` harness: scenario selection,
//! layered configuration, browser lifecycle and text/JSON/TAP reporting.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, FormatArg, RunArgs, SelectArgs, UsersArgs};
pub use config::{CliConfig, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use output::{render_tap, JsonReport, OutputFormat, ProgressReporter, ScenarioEntry};
pub use runner::{build_filter, check_summary, select, ScenarioRunner};
