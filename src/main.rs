// CLI binary entry point for oxid3
//
// This is the main entry point for the oxid3 command-line tool.

mod cli;

use clap::Parser;
use std::process;

use cli::logging::init_logging;
use cli::{Config, OutputFormatter};

fn main() {
    let config = Config::parse();
    init_logging(config.quiet, config.verbose);

    if let Err(e) = cli::run(&config) {
        OutputFormatter::new(config.format, config.quiet).print_error(&format!("{e:#}"));
        process::exit(1);
    }
}
