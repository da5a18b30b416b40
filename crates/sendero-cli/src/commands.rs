//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sendero: run synchronized browser journeys and capture their failures
#[derive(Parser, Debug)]
#[command(name = "sendero")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a built-in scenario or a journey file in Chromium
    Run(RunArgs),

    /// Parse a journey file and print its steps
    Validate(ValidateArgs),

    /// List built-in scenarios
    List,
}

/// Arguments for `sendero run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Built-in scenario name, or path to a journey file (.yaml / .yml)
    pub journey: String,

    /// Application root, overriding the scenario's
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for snapshots and failure records
    #[arg(long, value_name = "DIR", default_value = sendero::DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium binary to launch
    #[arg(long, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Disable the Chromium sandbox (for containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Login username
    #[arg(long, env = "SENDERO_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "SENDERO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for `sendero validate`
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Journey file to check
    pub file: PathBuf,

    /// Print the resolved journey as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log format argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for sendero::logging::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_run_defaults() {
            let cli = Cli::parse_from(["sendero", "run", "login"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert_eq!(args.journey, "login");
            assert_eq!(args.artifacts, PathBuf::from("artifacts"));
            assert!(!args.headed);
            assert!(!args.json);
            assert!(args.base_url.is_none());
        }

        #[test]
        fn test_run_all_flags() {
            let cli = Cli::parse_from([
                "sendero",
                "run",
                "journeys/pim.yaml",
                "--base-url",
                "http://localhost:8080/",
                "--artifacts",
                "out",
                "--headed",
                "--chromium",
                "/usr/bin/chromium",
                "--no-sandbox",
                "--json",
                "--username",
                "Admin",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert_eq!(args.base_url.as_deref(), Some("http://localhost:8080/"));
            assert_eq!(args.artifacts, PathBuf::from("out"));
            assert!(args.headed && args.no_sandbox && args.json);
            assert_eq!(args.chromium, Some(PathBuf::from("/usr/bin/chromium")));
            assert_eq!(args.username.as_deref(), Some("Admin"));
        }

        #[test]
        fn test_validate_command() {
            let cli = Cli::parse_from(["sendero", "validate", "journey.yaml", "--json"]);
            let Commands::Validate(args) = cli.command else {
                panic!("expected Validate command");
            };
            assert_eq!(args.file, PathBuf::from("journey.yaml"));
            assert!(args.json);
        }

        #[test]
        fn test_list_command() {
            let cli = Cli::parse_from(["sendero", "list"]);
            assert!(matches!(cli.command, Commands::List));
        }

        #[test]
        fn test_global_verbose_flag() {
            let cli = Cli::parse_from(["sendero", "-vv", "list"]);
            assert_eq!(cli.verbose, 2);
        }

        #[test]
        fn test_global_quiet_flag() {
            let cli = Cli::parse_from(["sendero", "list", "-q"]);
            assert!(cli.quiet);
        }

        #[test]
        fn test_global_color_flag() {
            let cli = Cli::parse_from(["sendero", "--color", "never", "list"]);
            assert!(matches!(cli.color, ColorArg::Never));
        }

        #[test]
        fn test_log_format_flag() {
            use sendero::logging::LogFormat;

            let cli = Cli::parse_from(["sendero", "list"]);
            assert_eq!(LogFormat::from(cli.log_format), LogFormat::Text);
            let cli = Cli::parse_from(["sendero", "run", "login", "--log-format", "json"]);
            assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
        }

        #[test]
        fn test_run_requires_journey() {
            assert!(Cli::try_parse_from(["sendero", "run"]).is_err());
        }

        #[test]
        fn test_color_arg_conversion() {
            use crate::config::ColorChoice;

            let auto: ColorChoice = ColorArg::Auto.into();
            assert!(matches!(auto, ColorChoice::Auto));
            let never: ColorChoice = ColorArg::Never.into();
            assert!(matches!(never, ColorChoice::Never));
        }

        #[test]
        fn test_clap_definition_is_consistent() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }
}
