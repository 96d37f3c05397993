//! Hookcheck CLI entry point.

use clap::Parser;
use hookcheck::cli::{self, Cli, Commands, EXIT_ERROR};
use hookcheck::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    hookcheck::init();

    let result = match &cli.command {
        Commands::Lint(args) => cli::run_lint(args),
        Commands::Rules(args) => cli::run_rules(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
