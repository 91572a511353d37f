// CLI module for oxid3
//
// Command-line front end over the library: argument parsing, logging setup,
// output formatting and the subcommand implementations.

pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

pub use commands::run;
pub use config::{Commands, Config};
pub use output::OutputFormatter;
