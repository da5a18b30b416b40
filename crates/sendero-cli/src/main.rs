//! Sendero CLI: run synchronized browser journeys
//!
//! ## Usage
//!
//! ```bash
//! sendero list                               # Built-in scenarios
//! sendero run login                          # Log in to the OrangeHRM demo
//! sendero run admin --base-url http://localhost:8080/
//! sendero run journeys/pim.yaml --json       # Journey file, JSON result on stdout
//! sendero validate journeys/pim.yaml         # Check a journey file without a browser
//! sendero -v --log-format json run login     # Structured logs on stderr
//! ```
//!
//! Exit codes: 0 when the journey passed, 1 when it failed, 2 when it could
//! not be run at all (bad arguments, unreadable journey, browser launch).

use clap::Parser;
use sendero::logging::init_tracing;
use sendero_cli::{Cli, CliConfig, CliResult, ColorChoice, CommandRunner, Commands, Verbosity};
use std::process::ExitCode;

const EXIT_JOURNEY_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);

    let level = config.verbosity.log_level();
    if let Err(e) = init_tracing(level, config.log_format, config.use_color()) {
        eprintln!("Error: {e}");
        return ExitCode::from(EXIT_USAGE);
    }

    match run(cli.command, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_JOURNEY_FAILED),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(color)
        .with_log_format(cli.log_format.into())
}

async fn run(command: Commands, config: CliConfig) -> CliResult<bool> {
    let mut runner = CommandRunner::new(config);
    match command {
        Commands::Run(args) => runner.run(&args).await,
        Commands::Validate(args) => runner.validate(&args).map(|()| true),
        Commands::List => {
            runner.list();
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_quiet_wins() {
        let cli = Cli::parse_from(["sendero", "-vv", "-q", "--color", "never", "list"]);
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert!(!config.use_color());
    }

    #[test]
    fn test_build_config_json_logs() {
        let cli = Cli::parse_from(["sendero", "--log-format", "json", "list"]);
        assert_eq!(build_config(&cli).log_format, sendero::logging::LogFormat::Json);
    }

    #[test]
    fn test_build_config_debug() {
        let cli = Cli::parse_from(["sendero", "-vv", "list"]);
        assert_eq!(build_config(&cli).verbosity.log_level(), "debug");
    }
}
