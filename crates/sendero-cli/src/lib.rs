//! Sendero CLI Library
//!
//! Command-line front end for the sendero journey harness: argument parsing,
//! credential resolution, and terminal or JSON reporting.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, LogFormatArg, RunArgs, ValidateArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_builtins, render_result, ProgressReporter};
pub use runner::{load_journey, resolve_credentials, CommandRunner, JourneySource, JourneySummary};
