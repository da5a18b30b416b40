//! Output formatting and progress reporting

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use sendero::scenarios::Builtin;
use sendero::{Outcome, ScenarioResult};
use std::fmt::Write as _;
use std::time::Duration;

/// Progress reporter for journey execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner until [`finish`](Self::finish)
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    /// Clear the spinner
    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print a rendered block verbatim
    pub fn block(&self, text: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_str(text);
    }

    /// One-line verdict for a finished journey
    pub fn verdict(&self, result: &ScenarioResult) {
        let line = format!(
            "{} {} in {:.2}s",
            result.scenario,
            result.outcome,
            result.duration().as_secs_f64()
        );
        match result.outcome {
            Outcome::Passed => self.success(&line),
            Outcome::Failed => self.failure(&line),
        }
    }
}

/// Human-readable report of a journey run
#[must_use]
pub fn render_result(result: &ScenarioResult, use_color: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "run {}", result.run_id);
    let _ = writeln!(out, "steps ({}):", result.steps.len());
    for (i, step) in result.steps.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {step}", i + 1);
    }

    if let Some(failure) = &result.failure {
        if let Some(step) = &failure.step {
            let index = failure.step_index.map_or(String::new(), |i| format!("#{i} "));
            let line = format!("  failed at {index}{step}");
            let line = if use_color {
                style(line).red().to_string()
            } else {
                line
            };
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "state: {}", failure.state);
        let _ = writeln!(out, "error: {}", failure.message);
        if let Some(url) = &failure.url {
            let _ = writeln!(out, "url: {url}");
        }
    }

    if let Some(path) = &result.artifact {
        let _ = writeln!(out, "snapshot: {}", path.display());
    }

    out
}

/// Table of built-in scenarios
#[must_use]
pub fn render_builtins(builtins: &[Builtin]) -> String {
    let width = builtins.iter().map(|b| b.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for b in builtins {
        let _ = writeln!(
            out,
            "{:<width$}  {:>4}s  {}",
            b.name,
            b.deadline_ms / 1000,
            b.description
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sendero::{scenarios, JourneyConfig, JourneyRunner, Locator, MockDriver, Step};

    fn go_button() -> Locator {
        Locator::css("go button", "#go")
    }

    async fn run(journey: &JourneyConfig, driver: &mut MockDriver) -> ScenarioResult {
        JourneyRunner::new().run(driver, journey).await
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("login PASSED");
            reporter.failure("login FAILED");
            reporter.info("artifacts in out/");
            reporter.header("login");
            reporter.block("steps (0):\n");
        }

        #[test]
        fn test_spinner_lifecycle() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_spinner("running login");
            reporter.finish();
            reporter.finish();
            assert!(reporter.spinner.is_none());
        }

        #[test]
        fn test_quiet_mode_skips_spinner() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_spinner("hidden");
            assert!(reporter.spinner.is_none());
            reporter.failure("shown");
        }
    }

    mod render_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_render_passed_journey() {
            let dir = tempfile::tempdir().unwrap();
            let journey = JourneyConfig::new("plain", "http://app.test/")
                .step(Step::click(go_button()))
                .with_artifacts_dir(dir.path());
            let mut driver = MockDriver::new().with_element(&go_button(), Duration::ZERO);

            let result = run(&journey, &mut driver).await;
            let text = render_result(&result, false);

            assert!(result.passed());
            assert!(text.contains("click"));
            assert!(text.contains("plain_success.png"));
            assert!(!text.contains("error:"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_render_failed_journey_names_step() {
            let dir = tempfile::tempdir().unwrap();
            let journey = scenarios::login("http://app.test/")
                .with_credentials(scenarios::demo_credentials())
                .with_artifacts_dir(dir.path());
            let mut driver = MockDriver::new();

            let result = run(&journey, &mut driver).await;
            let text = render_result(&result, false);

            assert!(!result.passed());
            assert!(text.contains("failed at"));
            assert!(text.contains("state: logging in"));
            assert!(text.contains("error: "));
            assert!(text.contains("login_failed.png"));
            assert!(driver.was_called("screenshot"));
        }

        #[test]
        fn test_render_builtins_table() {
            let text = render_builtins(&scenarios::BUILTINS);
            let lines: Vec<_> = text.lines().collect();
            assert_eq!(lines.len(), 3);
            assert!(lines[0].starts_with("login "));
            assert!(lines[1].contains("120s"));
            assert!(lines[2].starts_with("pim_add_employee"));
        }
    }
}
