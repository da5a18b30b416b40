//! Command handlers

use crate::commands::{RunArgs, ValidateArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_builtins, render_result, ProgressReporter};
use sendero::scenarios::{self, BUILTINS};
use sendero::{
    Credentials, JourneyConfig, JourneyFile, ScenarioResult, Viewport, PASSWORD_ENV, USERNAME_ENV,
};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Where a journey comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneySource {
    /// Built-in scenario by name
    Builtin(&'static str),
    /// YAML journey file
    File(std::path::PathBuf),
}

impl JourneySource {
    /// Classify a `run` argument
    pub fn parse(arg: &str) -> CliResult<Self> {
        let path = Path::new(arg);
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml || path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }
        BUILTINS
            .iter()
            .find(|b| b.name == arg)
            .map(|b| Self::Builtin(b.name))
            .ok_or_else(|| {
                let known: Vec<_> = BUILTINS.iter().map(|b| b.name).collect();
                CliError::invalid_argument(format!(
                    "unknown scenario '{arg}' (built-ins: {}; or pass a .yaml file)",
                    known.join(", ")
                ))
            })
    }
}

/// Resolved journey as printed by `validate --json`
#[derive(Debug, Clone, Serialize)]
pub struct JourneySummary {
    /// Scenario name
    pub name: String,
    /// Application root
    pub base_url: String,
    /// Viewport
    pub viewport: Viewport,
    /// Journey deadline
    pub overall_timeout_ms: u64,
    /// Login steps, described
    pub login: Vec<String>,
    /// Login confirmation, described
    pub login_marker: Option<String>,
    /// Body steps, described
    pub body: Vec<String>,
}

impl JourneySummary {
    /// Summarize a runnable journey
    #[must_use]
    pub fn of(journey: &JourneyConfig) -> Self {
        let (login, login_marker) = journey.login.as_ref().map_or((Vec::new(), None), |l| {
            (
                l.steps.iter().map(ToString::to_string).collect(),
                Some(l.marker.to_string()),
            )
        });
        Self {
            name: journey.name.clone(),
            base_url: journey.base_url.clone(),
            viewport: journey.viewport,
            overall_timeout_ms: journey.overall_timeout_ms,
            login,
            login_marker,
            body: journey.body.iter().map(ToString::to_string).collect(),
        }
    }

    fn render(&self) -> String {
        let mut out = format!(
            "{} @ {} ({}x{}, deadline {}ms)\n",
            self.name,
            self.base_url,
            self.viewport.width,
            self.viewport.height,
            self.overall_timeout_ms
        );
        if let Some(marker) = &self.login_marker {
            out.push_str("login:\n");
            for step in &self.login {
                out.push_str(&format!("  - {step}\n"));
            }
            out.push_str(&format!("  confirmed by {marker}\n"));
        }
        out.push_str("body:\n");
        for step in &self.body {
            out.push_str(&format!("  - {step}\n"));
        }
        out
    }
}

/// Credentials from flags (which clap also fills from the environment),
/// falling back to `fallback`
pub fn resolve_credentials(args: &RunArgs, fallback: Option<&Credentials>) -> CliResult<Credentials> {
    let creds = Credentials::resolve_with(
        |key| match key {
            USERNAME_ENV => args.username.clone(),
            PASSWORD_ENV => args.password.clone(),
            _ => None,
        },
        fallback,
    )?;
    Ok(creds)
}

fn check_base_url(url: &str) -> CliResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(CliError::invalid_argument(format!(
            "--base-url must be an http(s) URL, got '{url}'"
        )))
    }
}

/// Build the journey `sendero run` will execute
pub fn load_journey(args: &RunArgs) -> CliResult<JourneyConfig> {
    if let Some(url) = &args.base_url {
        check_base_url(url)?;
    }

    let journey = match JourneySource::parse(&args.journey)? {
        JourneySource::Builtin(name) => {
            let base_url = args.base_url.as_deref().unwrap_or(scenarios::DEMO_URL);
            let journey = scenarios::builtin(name, base_url)
                .ok_or_else(|| CliError::invalid_argument(format!("unknown scenario '{name}'")))?;
            let credentials = resolve_credentials(args, Some(&scenarios::demo_credentials()))?;
            journey.with_credentials(credentials)
        }
        JourneySource::File(path) => {
            let file = JourneyFile::load(&path)?;
            let credentials = resolve_credentials(args, file.credentials.as_ref())?;
            let mut journey = file.to_journey(credentials, &args.artifacts)?;
            if let Some(url) = &args.base_url {
                journey.base_url.clone_from(url);
            }
            journey
        }
    };

    debug!(journey = %journey.name, base_url = %journey.base_url, "journey loaded");
    Ok(journey.with_artifacts_dir(&args.artifacts))
}

/// Dispatches CLI commands
#[derive(Debug)]
pub struct CommandRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl CommandRunner {
    /// Create a runner for the given CLI configuration
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = ProgressReporter::new(config.use_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// `sendero run`; `Ok(false)` when the journey failed
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<bool> {
        let journey = load_journey(args)?;
        let result = self.execute(&journey, args).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            self.reporter
                .block(&render_result(&result, self.reporter.use_color));
            self.reporter
                .info(&format!("artifacts in {}", journey.artifacts_dir.display()));
        }
        self.reporter.verdict(&result);
        Ok(result.passed())
    }

    #[cfg(feature = "browser")]
    async fn execute(&mut self, journey: &JourneyConfig, args: &RunArgs) -> CliResult<ScenarioResult> {
        let mut browser = sendero::BrowserConfig::default()
            .with_headless(!args.headed)
            .with_viewport(journey.viewport);
        if let Some(path) = &args.chromium {
            browser = browser.with_chromium_path(path);
        }
        if args.no_sandbox {
            browser = browser.with_no_sandbox();
        }

        self.reporter.header(&journey.name);
        // Progress logs and a spinner would interleave on stderr
        if !self.config.verbosity.is_verbose() {
            self.reporter
                .start_spinner(&format!("running {} against {}", journey.name, journey.base_url));
        }
        let result = sendero::run_journey(journey, &browser).await;
        self.reporter.finish();
        Ok(result?)
    }

    #[cfg(not(feature = "browser"))]
    #[allow(clippy::unused_async)]
    async fn execute(&mut self, _journey: &JourneyConfig, _args: &RunArgs) -> CliResult<ScenarioResult> {
        Err(CliError::config(
            "sendero was built without the `browser` feature; rebuild with --features browser",
        ))
    }

    /// `sendero validate`
    pub fn validate(&self, args: &ValidateArgs) -> CliResult<()> {
        let file = JourneyFile::load(&args.file)?;
        // Placeholders stay unsubstituted; validation never needs real secrets
        let journey = file.to_journey(Credentials::default(), sendero::DEFAULT_ARTIFACTS_DIR)?;
        let summary = JourneySummary::of(&journey);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", summary.render());
            self.reporter
                .success(&format!("{} is valid", args.file.display()));
        }
        Ok(())
    }

    /// `sendero list`
    pub fn list(&self) {
        print!("{}", render_builtins(&BUILTINS));
    }
}
